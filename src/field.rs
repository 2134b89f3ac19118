//! Per-field marshalling directives used to build a [crate::schema::StructSchema].

use std::fmt;

use crate::{
    primitive::PrimitiveKind,
    schema::{Record, Struct},
    value::FieldValue,
};

/// One marshalled field of a record.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    /// Name used to look the field up on the record.
    pub name: &'static str,
    /// Explicit ordering key; ties keep declaration order.
    pub index: i32,
    /// Zero bytes written (or bytes discarded) before the value.
    pub skip: usize,
    /// Fixed wire size for strings; `0` means NUL-terminated.
    pub limit: usize,
    /// Advisory only: streams apply one byte order to every field.
    pub reverse: bool,
    /// An unallocated array in this field is legal and marshals to nothing.
    pub nullable: bool,
    /// Shape of the value on the wire.
    pub kind: FieldKind,
}

impl FieldDescriptor {
    pub fn new(name: &'static str, kind: FieldKind) -> Self {
        FieldDescriptor {
            name,
            index: 0,
            skip: 0,
            limit: 0,
            reverse: false,
            nullable: false,
            kind,
        }
    }

    /// Descriptor whose kind is derived from the Rust type of the field.
    pub fn of<T: FieldValue>(name: &'static str) -> Self {
        Self::new(name, T::kind())
    }

    pub fn index(mut self, index: i32) -> Self {
        self.index = index;
        self
    }

    pub fn skip(mut self, skip: usize) -> Self {
        self.skip = skip;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn reverse(mut self, reverse: bool) -> Self {
        self.reverse = reverse;
        self
    }

    pub fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }
}

/// What a field holds on the wire.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldKind {
    /// A single leaf value.
    Primitive(PrimitiveKind),
    /// Row-major nested arrays, innermost elements of `element` kind.
    Array {
        element: ElementKind,
        dimensions: usize,
    },
    /// Another record written inline, without a length prefix.
    Nested(NestedType),
}

impl FieldKind {
    /// Kind of an array whose elements have kind `inner`.
    pub fn array_of(inner: FieldKind) -> FieldKind {
        match inner {
            FieldKind::Primitive(kind) => FieldKind::Array {
                element: ElementKind::Primitive(kind),
                dimensions: 1,
            },
            FieldKind::Nested(nested) => FieldKind::Array {
                element: ElementKind::Nested(nested),
                dimensions: 1,
            },
            FieldKind::Array {
                element,
                dimensions,
            } => FieldKind::Array {
                element,
                dimensions: dimensions + 1,
            },
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            FieldKind::Primitive(kind) => kind.name(),
            FieldKind::Array { .. } => "array",
            FieldKind::Nested(_) => "nested record",
        }
    }
}

/// Innermost element of an array field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ElementKind {
    Primitive(PrimitiveKind),
    Nested(NestedType),
}

/// Reference to a record type used inline by another record.
#[derive(Clone, Copy)]
pub struct NestedType {
    type_name: &'static str,
    instantiate: fn() -> Box<dyn Struct>,
}

fn instantiate<R: Record>() -> Box<dyn Struct> {
    Box::new(R::default())
}

impl NestedType {
    /// Never resolves `R`'s schema, so records may refer to themselves.
    pub fn of<R: Record>() -> Self {
        NestedType {
            type_name: std::any::type_name::<R>(),
            instantiate: instantiate::<R>,
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// A default-constructed value of the nested type.
    pub fn instantiate(&self) -> Box<dyn Struct> {
        (self.instantiate)()
    }
}

impl fmt::Debug for NestedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("NestedType").field(&self.type_name).finish()
    }
}

impl PartialEq for NestedType {
    fn eq(&self, other: &Self) -> bool {
        self.type_name == other.type_name
    }
}
