//! Declarative record registration.

/// Declares a struct and registers its `#[wire]` fields for marshalling.
///
/// Only fields marked `#[wire]` or `#[wire(..)]` are part of the wire
/// format; the rest are invisible to the engine. Directives go inside the
/// attribute and use the builder methods of
/// [crate::field::FieldDescriptor]: `index`, `skip`, `limit`, `reverse` and
/// `nullable`. Other attributes, doc comments included, are kept on the
/// field. The struct must implement [Default], usually through
/// `#[derive(Default)]`.
///
/// ```
/// use structwire::{record, size_of, Size};
///
/// record! {
///     #[derive(Debug, Default)]
///     pub struct Point {
///         /// Vertical position.
///         #[wire(index = 1)]
///         pub y: i16,
///         #[wire]
///         pub x: i16,
///         /// Not marshalled.
///         pub label: String,
///     }
/// }
///
/// assert_eq!(size_of(&Point::default()).unwrap(), Size::Fixed(4));
/// ```
#[macro_export]
macro_rules! record {
    // `#[wire]` with every directive at its default.
    (@munch $head:tt fields [$($fields:tt)*] wire [$($wire:tt)*] attrs [$($attrs:tt)*] pending $pending:tt ;
        #[wire] $($rest:tt)*
    ) => {
        $crate::record!(@munch $head fields [$($fields)*] wire [$($wire)*] attrs [$($attrs)*] pending [()] ;
            $($rest)*);
    };
    (@munch $head:tt fields [$($fields:tt)*] wire [$($wire:tt)*] attrs [$($attrs:tt)*] pending $pending:tt ;
        #[wire($($directive:tt)*)] $($rest:tt)*
    ) => {
        $crate::record!(@munch $head fields [$($fields)*] wire [$($wire)*] attrs [$($attrs)*] pending [($($directive)*)] ;
            $($rest)*);
    };
    (@munch $head:tt fields [$($fields:tt)*] wire [$($wire:tt)*] attrs [$($attrs:tt)*] pending $pending:tt ;
        #[$attr:meta] $($rest:tt)*
    ) => {
        $crate::record!(@munch $head fields [$($fields)*] wire [$($wire)*] attrs [$($attrs)* #[$attr]] pending $pending ;
            $($rest)*);
    };
    (@munch $head:tt fields [$($fields:tt)*] wire [$($wire:tt)*] attrs [$($attrs:tt)*] pending [] ;
        $field_vis:vis $field:ident : $ty:ty $(, $($rest:tt)*)?
    ) => {
        $crate::record!(@munch $head
            fields [$($fields)* $($attrs)* $field_vis $field: $ty,]
            wire [$($wire)*]
            attrs [] pending [] ;
            $($($rest)*)?);
    };
    (@munch $head:tt fields [$($fields:tt)*] wire [$($wire:tt)*] attrs [$($attrs:tt)*] pending [($($directive:tt)*)] ;
        $field_vis:vis $field:ident : $ty:ty $(, $($rest:tt)*)?
    ) => {
        $crate::record!(@munch $head
            fields [$($fields)* $($attrs)* $field_vis $field: $ty,]
            wire [$($wire)* { $field ; $ty ; $($directive)* }]
            attrs [] pending [] ;
            $($($rest)*)?);
    };
    (@munch [[$(#[$meta:meta])*] [$vis:vis] $name:ident]
        fields [$($fields:tt)*]
        wire [$({ $field:ident ; $ty:ty ; $($directive:tt)* })*]
        attrs [] pending [] ;
    ) => {
        $(#[$meta])*
        $vis struct $name {
            $($fields)*
        }

        impl $crate::schema::Struct for $name {
            fn schema(&self) -> &'static $crate::schema::StructSchema {
                <Self as $crate::schema::Record>::resolve()
            }

            fn field(
                &self,
                name: &str,
            ) -> ::core::option::Option<&dyn $crate::value::FieldValue> {
                $(
                    if name == ::core::stringify!($field) {
                        return ::core::option::Option::Some(&self.$field);
                    }
                )*
                let _ = name;
                ::core::option::Option::None
            }

            fn field_mut(
                &mut self,
                name: &str,
            ) -> ::core::option::Option<&mut dyn $crate::value::FieldValue> {
                $(
                    if name == ::core::stringify!($field) {
                        return ::core::option::Option::Some(&mut self.$field);
                    }
                )*
                let _ = name;
                ::core::option::Option::None
            }
        }

        impl $crate::schema::Record for $name {
            fn resolve() -> &'static $crate::schema::StructSchema {
                static SCHEMA: ::std::sync::OnceLock<$crate::schema::StructSchema> =
                    ::std::sync::OnceLock::new();
                SCHEMA.get_or_init(|| {
                    $crate::schema::StructSchema::builder(::core::stringify!($name))
                        $(
                            .field($crate::record!(@descriptor
                                $crate::field::FieldDescriptor::of::<$ty>(::core::stringify!($field)) ;
                                $($directive)*
                            ))
                        )*
                        .build()
                })
            }
        }

        $crate::impl_nested!($name);
    };
    (@descriptor $descriptor:expr ; $($key:ident = $value:expr),* $(,)?) => {
        $descriptor $(.$key($value))*
    };
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $($body:tt)*
        }
    ) => {
        $crate::record!(@munch [[$(#[$meta])*] [$vis] $name]
            fields [] wire [] attrs [] pending [] ;
            $($body)*);
    };
}

/// Lets a [crate::schema::Record] type be held by value as a nested field of
/// another record. [record!] already does this for the types it declares.
#[macro_export]
macro_rules! impl_nested {
    ($name:ty) => {
        impl $crate::value::NestedSlot for $name {
            fn is_set(&self) -> bool {
                true
            }

            fn get_or_instantiate(&mut self) -> &mut dyn $crate::schema::Struct {
                self
            }
        }

        impl $crate::value::FieldValue for $name {
            fn kind() -> $crate::field::FieldKind {
                $crate::field::FieldKind::Nested($crate::field::NestedType::of::<Self>())
            }

            fn value_ref(&self) -> $crate::value::ValueRef<'_> {
                $crate::value::ValueRef::Nested(::core::option::Option::Some(self))
            }

            fn value_mut(&mut self) -> $crate::value::ValueMut<'_> {
                $crate::value::ValueMut::Nested(self)
            }
        }
    };
}
