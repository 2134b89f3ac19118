//! Measuring, packing and unpacking records.
//!
//! Every operation walks the schema in wire order and recurses depth first
//! into arrays (row-major, one dimension at a time) and nested records. The
//! wire format carries no length prefixes or type tags: arrays must already
//! be allocated to their true length and nested types are known statically.

use std::{
    io::{Read, Write},
    ops::Add,
};

use crate::{
    config::CodecConfig,
    errors::StructError,
    field::{ElementKind, FieldDescriptor, FieldKind, NestedType},
    primitive::PrimitiveKind,
    reader::OrderedReader,
    schema::{Struct, StructSchema},
    value::{ArrayAccess, FieldValue, ValueMut, ValueRef},
    writer::OrderedWriter,
};

/// Wire size of a record, or [Size::Dynamic] when it depends on string content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Size {
    /// Exact number of bytes [pack] writes.
    Fixed(usize),
    /// Depends on the content of an unbounded string.
    Dynamic,
}

impl Size {
    /// The byte count, if known without serializing.
    pub fn fixed(self) -> Option<usize> {
        match self {
            Size::Fixed(n) => Some(n),
            Size::Dynamic => None,
        }
    }

    /// True when the size is only known after packing.
    pub fn is_dynamic(self) -> bool {
        self == Size::Dynamic
    }

    fn clamp(self, limit: usize) -> Size {
        match self {
            Size::Fixed(n) if limit > 0 => Size::Fixed(n.min(limit)),
            other => other,
        }
    }
}

impl Add for Size {
    type Output = Size;

    fn add(self, rhs: Size) -> Size {
        match (self, rhs) {
            (Size::Fixed(a), Size::Fixed(b)) => Size::Fixed(a + b),
            _ => Size::Dynamic,
        }
    }
}

fn lookup<'a>(
    instance: &'a dyn Struct,
    schema: &StructSchema,
    field: &FieldDescriptor,
) -> Result<&'a dyn FieldValue, StructError> {
    instance.field(field.name).ok_or(StructError::UnknownField {
        type_name: schema.type_name(),
        field: field.name,
    })
}

fn mismatch(field: &FieldDescriptor, expected: &'static str) -> StructError {
    StructError::KindMismatch {
        field: field.name,
        expected,
    }
}

fn primitive_size(kind: PrimitiveKind, limit: usize) -> Size {
    match kind.size() {
        Some(n) => Size::Fixed(n).clamp(limit),
        None if limit > 0 => Size::Fixed(limit),
        None => Size::Dynamic,
    }
}

/// Computes the packed size of `instance` without writing anything.
///
/// Unset nested references are measured through a default value of their
/// type; `instance` itself is never modified. A default value that again
/// holds an unset reference to a type being measured fails with
/// [StructError::SchemaConstruction].
///
/// A `limit` on a fixed-width primitive or a nested record caps its measured
/// size at `limit` bytes, while [pack] still writes the full width. Only
/// string limits change what goes on the wire.
pub fn size_of(instance: &dyn Struct) -> Result<Size, StructError> {
    measure_record(instance, &mut Vec::new())
}

/// `placeholders` holds the nested types currently measured through a default value.
fn measure_record(
    instance: &dyn Struct,
    placeholders: &mut Vec<&'static str>,
) -> Result<Size, StructError> {
    let schema = instance.schema();
    let mut size = Size::Fixed(0);

    for field in schema.fields() {
        let value = lookup(instance, schema, field)?.value_ref();
        size = size + Size::Fixed(field.skip) + measure(field, value, placeholders)?;

        if size.is_dynamic() {
            return Ok(Size::Dynamic);
        }
    }

    Ok(size)
}

fn measure(
    field: &FieldDescriptor,
    value: ValueRef<'_>,
    placeholders: &mut Vec<&'static str>,
) -> Result<Size, StructError> {
    match (&field.kind, value) {
        (FieldKind::Primitive(kind), ValueRef::Primitive(p)) if p.kind() == *kind => {
            Ok(primitive_size(*kind, field.limit))
        }
        (FieldKind::Nested(nested), ValueRef::Nested(record)) => {
            measure_nested(field, nested, record, placeholders)
        }
        (
            FieldKind::Array {
                element,
                dimensions,
            },
            ValueRef::Array(array),
        ) => match array {
            Some(array) => measure_array(field, *element, *dimensions, array, placeholders),
            None if field.nullable => Ok(Size::Fixed(0)),
            None => Err(StructError::UninitializedContainer { field: field.name }),
        },
        (kind, _) => Err(mismatch(field, kind.describe())),
    }
}

fn measure_array(
    field: &FieldDescriptor,
    element: ElementKind,
    dimensions: usize,
    array: &dyn ArrayAccess,
    placeholders: &mut Vec<&'static str>,
) -> Result<Size, StructError> {
    let mut size = Size::Fixed(0);

    for i in 0..array.len() {
        let value = array.element(i);
        size = size
            + if dimensions > 1 {
                match value {
                    ValueRef::Array(Some(inner)) => {
                        measure_array(field, element, dimensions - 1, inner, placeholders)?
                    }
                    ValueRef::Array(None) => {
                        return Err(StructError::UninitializedContainer { field: field.name });
                    }
                    _ => return Err(mismatch(field, "array")),
                }
            } else {
                measure_element(field, element, value, placeholders)?
            };

        if size.is_dynamic() {
            return Ok(Size::Dynamic);
        }
    }

    Ok(size)
}

fn measure_element(
    field: &FieldDescriptor,
    element: ElementKind,
    value: ValueRef<'_>,
    placeholders: &mut Vec<&'static str>,
) -> Result<Size, StructError> {
    match (element, value) {
        (ElementKind::Primitive(kind), ValueRef::Primitive(p)) if p.kind() == kind => {
            Ok(primitive_size(kind, field.limit))
        }
        (ElementKind::Nested(nested), ValueRef::Nested(record)) => {
            measure_nested(field, &nested, record, placeholders)
        }
        (ElementKind::Primitive(kind), _) => Err(mismatch(field, kind.name())),
        (ElementKind::Nested(_), _) => Err(mismatch(field, "nested record")),
    }
}

fn measure_nested(
    field: &FieldDescriptor,
    nested: &NestedType,
    record: Option<&dyn Struct>,
    placeholders: &mut Vec<&'static str>,
) -> Result<Size, StructError> {
    let size = match record {
        Some(record) => measure_record(record, placeholders)?,
        None => {
            let type_name = nested.type_name();
            if placeholders.contains(&type_name) {
                return Err(StructError::SchemaConstruction {
                    type_name,
                    reason: "default value is recursive",
                });
            }

            tracing::debug!(type_name, "instantiating to measure");
            placeholders.push(type_name);
            let size = measure_record(nested.instantiate().as_ref(), placeholders);
            placeholders.pop();
            size?
        }
    };

    Ok(size.clamp(field.limit))
}

/// Writes `instance` field by field in wire order.
pub fn pack<W: Write>(
    instance: &dyn Struct,
    writer: &mut OrderedWriter<W>,
) -> Result<(), StructError> {
    let schema = instance.schema();

    for field in schema.fields() {
        let value = lookup(instance, schema, field)?.value_ref();
        tracing::trace!(
            type_name = schema.type_name(),
            field = field.name,
            skip = field.skip,
            "packing field"
        );
        writer.write_padding(field.skip)?;
        pack_value(field, value, writer)?;
    }

    Ok(())
}

fn pack_value<W: Write>(
    field: &FieldDescriptor,
    value: ValueRef<'_>,
    writer: &mut OrderedWriter<W>,
) -> Result<(), StructError> {
    match (&field.kind, value) {
        (FieldKind::Primitive(kind), ValueRef::Primitive(p)) if p.kind() == *kind => {
            p.write(writer, field.limit)?;
        }
        (FieldKind::Nested(nested), ValueRef::Nested(record)) => {
            pack_nested(nested, record, writer)?;
        }
        (
            FieldKind::Array {
                element,
                dimensions,
            },
            ValueRef::Array(array),
        ) => match array {
            Some(array) => pack_array(field, *element, *dimensions, array, writer)?,
            None if field.nullable => {}
            None => return Err(StructError::UninitializedContainer { field: field.name }),
        },
        (kind, _) => return Err(mismatch(field, kind.describe())),
    }

    Ok(())
}

fn pack_array<W: Write>(
    field: &FieldDescriptor,
    element: ElementKind,
    dimensions: usize,
    array: &dyn ArrayAccess,
    writer: &mut OrderedWriter<W>,
) -> Result<(), StructError> {
    for i in 0..array.len() {
        let value = array.element(i);

        if dimensions > 1 {
            match value {
                ValueRef::Array(Some(inner)) => {
                    pack_array(field, element, dimensions - 1, inner, writer)?
                }
                ValueRef::Array(None) => {
                    return Err(StructError::UninitializedContainer { field: field.name });
                }
                _ => return Err(mismatch(field, "array")),
            }
            continue;
        }

        match (element, value) {
            (ElementKind::Primitive(kind), ValueRef::Primitive(p)) if p.kind() == kind => {
                p.write(writer, field.limit)?;
            }
            (ElementKind::Nested(nested), ValueRef::Nested(record)) => {
                pack_nested(&nested, record, writer)?;
            }
            (ElementKind::Primitive(kind), _) => return Err(mismatch(field, kind.name())),
            (ElementKind::Nested(_), _) => return Err(mismatch(field, "nested record")),
        }
    }

    Ok(())
}

/// An unset reference is written as zeros, as many as a default value of the
/// nested type would occupy.
fn pack_nested<W: Write>(
    nested: &NestedType,
    record: Option<&dyn Struct>,
    writer: &mut OrderedWriter<W>,
) -> Result<(), StructError> {
    let Some(record) = record else {
        tracing::debug!(
            type_name = nested.type_name(),
            "instantiating to size placeholder"
        );
        let placeholder = nested.instantiate();
        return match size_of(placeholder.as_ref())? {
            Size::Fixed(n) => Ok(writer.write_padding(n)?),
            Size::Dynamic => Err(StructError::SchemaConstruction {
                type_name: nested.type_name(),
                reason: "default value has no fixed size to use as placeholder",
            }),
        };
    };

    pack(record, writer)
}

/// Reads `instance` field by field in wire order, overwriting it in place.
///
/// Arrays must already be allocated to the length to read. Unset nested
/// references are filled with a default value before being read into. On
/// error `instance` may be partially overwritten and should be discarded.
pub fn unpack<R: Read>(
    instance: &mut dyn Struct,
    reader: &mut OrderedReader<R>,
) -> Result<(), StructError> {
    let schema = instance.schema();

    for field in schema.fields() {
        tracing::trace!(
            type_name = schema.type_name(),
            field = field.name,
            skip = field.skip,
            "unpacking field"
        );
        reader.skip_bytes(field.skip)?;

        let slot = instance
            .field_mut(field.name)
            .ok_or(StructError::UnknownField {
                type_name: schema.type_name(),
                field: field.name,
            })?;
        unpack_value(field, slot.value_mut(), reader)?;
    }

    Ok(())
}

fn unpack_value<R: Read>(
    field: &FieldDescriptor,
    value: ValueMut<'_>,
    reader: &mut OrderedReader<R>,
) -> Result<(), StructError> {
    match (&field.kind, value) {
        (FieldKind::Primitive(kind), ValueMut::Primitive(slot)) => {
            if slot.primitive_kind() != *kind {
                return Err(StructError::primitive_mismatch(field.name, *kind));
            }
            slot.store(kind.read(reader, field.limit)?);
        }
        (FieldKind::Nested(nested), ValueMut::Nested(slot)) => {
            if !slot.is_set() {
                tracing::debug!(type_name = nested.type_name(), "instantiating to unpack");
            }
            unpack(slot.get_or_instantiate(), reader)?;
        }
        (
            FieldKind::Array {
                element,
                dimensions,
            },
            ValueMut::Array(array),
        ) => match array {
            Some(array) => unpack_array(field, *element, *dimensions, array, reader)?,
            None if field.nullable => {}
            None => return Err(StructError::UninitializedContainer { field: field.name }),
        },
        (kind, _) => return Err(mismatch(field, kind.describe())),
    }

    Ok(())
}

fn unpack_array<R: Read>(
    field: &FieldDescriptor,
    element: ElementKind,
    dimensions: usize,
    array: &mut dyn ArrayAccess,
    reader: &mut OrderedReader<R>,
) -> Result<(), StructError> {
    for i in 0..array.len() {
        let value = array.element_mut(i);

        if dimensions > 1 {
            match value {
                ValueMut::Array(Some(inner)) => {
                    unpack_array(field, element, dimensions - 1, inner, reader)?
                }
                ValueMut::Array(None) => {
                    return Err(StructError::UninitializedContainer { field: field.name });
                }
                _ => return Err(mismatch(field, "array")),
            }
            continue;
        }

        match (element, value) {
            (ElementKind::Primitive(kind), ValueMut::Primitive(slot))
                if slot.primitive_kind() == kind =>
            {
                slot.store(kind.read(reader, field.limit)?);
            }
            (ElementKind::Nested(nested), ValueMut::Nested(slot)) => {
                if !slot.is_set() {
                    tracing::debug!(type_name = nested.type_name(), "instantiating to unpack");
                }
                unpack(slot.get_or_instantiate(), reader)?;
            }
            (ElementKind::Primitive(kind), _) => {
                return Err(StructError::primitive_mismatch(field.name, kind));
            }
            (ElementKind::Nested(_), _) => return Err(mismatch(field, "nested record")),
        }
    }

    Ok(())
}

/// Packs `instance` into a new buffer.
pub fn pack_to_vec(instance: &dyn Struct, config: &CodecConfig) -> Result<Vec<u8>, StructError> {
    let mut writer = OrderedWriter::with_config(Vec::new(), config);
    pack(instance, &mut writer)?;
    Ok(writer.into_inner())
}

/// Unpacks `instance` from the front of `bytes` and returns how many bytes were consumed.
pub fn unpack_from_slice(
    instance: &mut dyn Struct,
    bytes: &[u8],
    config: &CodecConfig,
) -> Result<usize, StructError> {
    let mut reader = OrderedReader::with_config(bytes, config);
    unpack(instance, &mut reader)?;
    Ok(reader.position())
}

#[cfg(test)]
mod tests {
    use std::sync::OnceLock;

    use super::*;

    /// Hand-registered record: `scratch` is not part of the wire format.
    #[derive(Debug, Default, PartialEq)]
    struct Header {
        magic: i32,
        name: String,
        scratch: u64,
    }

    impl Struct for Header {
        fn schema(&self) -> &'static StructSchema {
            static SCHEMA: OnceLock<StructSchema> = OnceLock::new();
            SCHEMA.get_or_init(|| {
                StructSchema::builder("Header")
                    .field(FieldDescriptor::of::<String>("name").index(1).limit(4))
                    .field(FieldDescriptor::of::<i32>("magic").skip(2))
                    .build()
            })
        }

        fn field(&self, name: &str) -> Option<&dyn FieldValue> {
            match name {
                "magic" => Some(&self.magic),
                "name" => Some(&self.name),
                _ => None,
            }
        }

        fn field_mut(&mut self, name: &str) -> Option<&mut dyn FieldValue> {
            match name {
                "magic" => Some(&mut self.magic),
                "name" => Some(&mut self.name),
                _ => None,
            }
        }
    }

    /// Schema names a field the type does not expose.
    struct Broken;

    impl Struct for Broken {
        fn schema(&self) -> &'static StructSchema {
            static SCHEMA: OnceLock<StructSchema> = OnceLock::new();
            SCHEMA.get_or_init(|| {
                StructSchema::builder("Broken")
                    .field(FieldDescriptor::of::<i32>("ghost"))
                    .build()
            })
        }

        fn field(&self, _name: &str) -> Option<&dyn FieldValue> {
            None
        }

        fn field_mut(&mut self, _name: &str) -> Option<&mut dyn FieldValue> {
            None
        }
    }

    #[test]
    fn test_size_add() {
        assert_eq!(Size::Fixed(2) + Size::Fixed(3), Size::Fixed(5));
        assert_eq!(Size::Fixed(2) + Size::Dynamic, Size::Dynamic);
        assert_eq!(Size::Dynamic.fixed(), None);
    }

    #[test]
    fn test_hand_registered_record() {
        let header = Header {
            magic: 0x0A0B_0C0D,
            name: "ab".to_string(),
            scratch: 99,
        };

        assert_eq!(size_of(&header).unwrap(), Size::Fixed(10));

        let bytes = pack_to_vec(&header, &CodecConfig::default()).unwrap();
        assert_eq!(bytes, vec![0, 0, 0x0A, 0x0B, 0x0C, 0x0D, b'a', b'b', 0, 0]);

        let mut out = Header::default();
        let consumed = unpack_from_slice(&mut out, &bytes, &CodecConfig::default()).unwrap();
        assert_eq!(consumed, 10);
        assert_eq!(out.magic, header.magic);
        assert_eq!(out.name, header.name);
        assert_eq!(out.scratch, 0);
    }

    #[test]
    fn test_little_endian_config() {
        let header = Header {
            magic: 1,
            name: String::new(),
            scratch: 0,
        };
        let bytes = pack_to_vec(&header, &CodecConfig::little_endian()).unwrap();
        assert_eq!(&bytes[2..6], &[1, 0, 0, 0]);
    }

    #[test]
    fn test_unknown_field() {
        let err = size_of(&Broken).unwrap_err();
        assert!(matches!(
            err,
            StructError::UnknownField {
                type_name: "Broken",
                field: "ghost"
            }
        ));
    }

    #[test]
    fn test_truncated_input_is_io_error() {
        let mut out = Header::default();
        let err = unpack_from_slice(&mut out, &[0, 0, 1], &CodecConfig::default()).unwrap_err();
        match err {
            StructError::Io(e) => assert_eq!(e.kind(), std::io::ErrorKind::UnexpectedEof),
            other => panic!("unexpected error {other:?}"),
        }
    }
}
