//! Typed access to record fields.
//!
//! [FieldValue] maps a Rust field type to its [FieldKind] and hands the engine
//! a borrowed view ([ValueRef]) for measuring and packing, or a mutable view
//! ([ValueMut]) for unpacking in place.
//!
//! | Rust type                      | Kind                         |
//! |--------------------------------|------------------------------|
//! | `bool`                         | boolean                      |
//! | `i8`, `u8`                     | byte                         |
//! | `u16`                          | char (UTF-16 code unit)      |
//! | `i16` / `i32` / `i64`          | short / int / long           |
//! | `f32` / `f64`                  | float / double               |
//! | `String`                       | string                       |
//! | `Vec<T>`, `[T; N]`             | array of `T`                 |
//! | `Option<Vec<T>>`               | array that may be unallocated|
//! | `Option<Box<R>>`               | nested record, may be unset  |
//! | types declared with `record!`  | nested record held by value  |

use std::borrow::Cow;

use crate::{
    field::{FieldKind, NestedType},
    primitive::{Primitive, PrimitiveKind},
    schema::{Record, Struct},
};

/// Borrowed view of a field value.
pub enum ValueRef<'a> {
    Primitive(Primitive<'a>),
    /// `None` when the container is unallocated.
    Array(Option<&'a dyn ArrayAccess>),
    /// `None` when the reference is unset.
    Nested(Option<&'a dyn Struct>),
}

/// Mutable view of a field value.
pub enum ValueMut<'a> {
    Primitive(&'a mut dyn PrimitiveSlot),
    /// `None` when the container is unallocated.
    Array(Option<&'a mut dyn ArrayAccess>),
    Nested(&'a mut dyn NestedSlot),
}

/// A Rust type that can back a marshalled field.
pub trait FieldValue {
    fn kind() -> FieldKind
    where
        Self: Sized;

    fn value_ref(&self) -> ValueRef<'_>;

    fn value_mut(&mut self) -> ValueMut<'_>;
}

/// Storage for a single primitive value.
pub trait PrimitiveSlot {
    fn primitive_kind(&self) -> PrimitiveKind;

    /// Replaces the stored value. Values of another kind are ignored; callers
    /// check [PrimitiveSlot::primitive_kind] first.
    fn store(&mut self, value: Primitive<'static>);
}

/// An allocated array; its length decides how many elements are marshalled.
pub trait ArrayAccess {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn element(&self, index: usize) -> ValueRef<'_>;

    fn element_mut(&mut self, index: usize) -> ValueMut<'_>;
}

/// A nested record reference that can be filled with a default value.
pub trait NestedSlot {
    fn is_set(&self) -> bool;

    fn get_or_instantiate(&mut self) -> &mut dyn Struct;
}

macro_rules! primitive_field {
    ($ty:ty, $variant:ident, |$out:ident| $to_wire:expr, |$in:ident| $from_wire:expr) => {
        impl PrimitiveSlot for $ty {
            fn primitive_kind(&self) -> PrimitiveKind {
                PrimitiveKind::$variant
            }

            fn store(&mut self, value: Primitive<'static>) {
                if let Primitive::$variant($in) = value {
                    *self = $from_wire;
                }
            }
        }

        impl FieldValue for $ty {
            fn kind() -> FieldKind {
                FieldKind::Primitive(PrimitiveKind::$variant)
            }

            fn value_ref(&self) -> ValueRef<'_> {
                let $out = *self;
                ValueRef::Primitive(Primitive::$variant($to_wire))
            }

            fn value_mut(&mut self) -> ValueMut<'_> {
                ValueMut::Primitive(self)
            }
        }
    };
}

primitive_field!(bool, Boolean, |v| v, |v| v);
primitive_field!(i8, Byte, |v| v, |v| v);
primitive_field!(u8, Byte, |v| v as i8, |v| v as u8);
primitive_field!(u16, Char, |v| v, |v| v);
primitive_field!(i16, Short, |v| v, |v| v);
primitive_field!(i32, Int, |v| v, |v| v);
primitive_field!(i64, Long, |v| v, |v| v);
primitive_field!(f32, Float, |v| v, |v| v);
primitive_field!(f64, Double, |v| v, |v| v);

impl PrimitiveSlot for String {
    fn primitive_kind(&self) -> PrimitiveKind {
        PrimitiveKind::String
    }

    fn store(&mut self, value: Primitive<'static>) {
        if let Primitive::String(s) = value {
            *self = s.into_owned();
        }
    }
}

impl FieldValue for String {
    fn kind() -> FieldKind {
        FieldKind::Primitive(PrimitiveKind::String)
    }

    fn value_ref(&self) -> ValueRef<'_> {
        ValueRef::Primitive(Primitive::String(Cow::Borrowed(self.as_str())))
    }

    fn value_mut(&mut self) -> ValueMut<'_> {
        ValueMut::Primitive(self)
    }
}

impl<T: FieldValue> ArrayAccess for Vec<T> {
    fn len(&self) -> usize {
        self.as_slice().len()
    }

    fn element(&self, index: usize) -> ValueRef<'_> {
        self[index].value_ref()
    }

    fn element_mut(&mut self, index: usize) -> ValueMut<'_> {
        self[index].value_mut()
    }
}

impl<T: FieldValue, const N: usize> ArrayAccess for [T; N] {
    fn len(&self) -> usize {
        N
    }

    fn element(&self, index: usize) -> ValueRef<'_> {
        self[index].value_ref()
    }

    fn element_mut(&mut self, index: usize) -> ValueMut<'_> {
        self[index].value_mut()
    }
}

impl<T: FieldValue> FieldValue for Vec<T> {
    fn kind() -> FieldKind {
        FieldKind::array_of(T::kind())
    }

    fn value_ref(&self) -> ValueRef<'_> {
        ValueRef::Array(Some(self))
    }

    fn value_mut(&mut self) -> ValueMut<'_> {
        ValueMut::Array(Some(self))
    }
}

impl<T: FieldValue, const N: usize> FieldValue for [T; N] {
    fn kind() -> FieldKind {
        FieldKind::array_of(T::kind())
    }

    fn value_ref(&self) -> ValueRef<'_> {
        ValueRef::Array(Some(self))
    }

    fn value_mut(&mut self) -> ValueMut<'_> {
        ValueMut::Array(Some(self))
    }
}

impl<T: FieldValue> FieldValue for Option<Vec<T>> {
    fn kind() -> FieldKind {
        FieldKind::array_of(T::kind())
    }

    fn value_ref(&self) -> ValueRef<'_> {
        ValueRef::Array(self.as_ref().map(|v| v as &dyn ArrayAccess))
    }

    fn value_mut(&mut self) -> ValueMut<'_> {
        ValueMut::Array(self.as_mut().map(|v| v as &mut dyn ArrayAccess))
    }
}

impl<R: Record> NestedSlot for Option<Box<R>> {
    fn is_set(&self) -> bool {
        self.is_some()
    }

    fn get_or_instantiate(&mut self) -> &mut dyn Struct {
        &mut **self.get_or_insert_with(Box::default)
    }
}

impl<R: Record> FieldValue for Option<Box<R>> {
    fn kind() -> FieldKind {
        FieldKind::Nested(NestedType::of::<R>())
    }

    fn value_ref(&self) -> ValueRef<'_> {
        ValueRef::Nested(self.as_deref().map(|r| r as &dyn Struct))
    }

    fn value_mut(&mut self) -> ValueMut<'_> {
        ValueMut::Nested(self)
    }
}
