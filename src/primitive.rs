//! The closed set of primitive kinds, their wire widths and their stream codecs.

use std::{
    borrow::Cow,
    io::{self, Read, Write},
};

use crate::{reader::OrderedReader, writer::OrderedWriter};

/// Leaf value kinds understood by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PrimitiveKind {
    /// One byte, non-zero reads as `true`.
    Boolean,
    /// Signed 8-bit integer.
    Byte,
    /// UTF-16 code unit.
    Char,
    /// Signed 16-bit integer.
    Short,
    /// Signed 32-bit integer.
    Int,
    /// Signed 64-bit integer.
    Long,
    /// IEEE-754 single precision.
    Float,
    /// IEEE-754 double precision.
    Double,
    /// NUL-terminated, or exactly `limit` bytes when the field sets one.
    String,
}

impl PrimitiveKind {
    pub const ALL: [PrimitiveKind; 9] = [
        PrimitiveKind::Boolean,
        PrimitiveKind::Byte,
        PrimitiveKind::Char,
        PrimitiveKind::Short,
        PrimitiveKind::Int,
        PrimitiveKind::Long,
        PrimitiveKind::Float,
        PrimitiveKind::Double,
        PrimitiveKind::String,
    ];

    /// Fixed wire width in bytes, or `None` for [PrimitiveKind::String] whose width depends on the field.
    pub const fn size(self) -> Option<usize> {
        match self {
            PrimitiveKind::Boolean | PrimitiveKind::Byte => Some(1),
            PrimitiveKind::Char | PrimitiveKind::Short => Some(2),
            PrimitiveKind::Int | PrimitiveKind::Float => Some(4),
            PrimitiveKind::Long | PrimitiveKind::Double => Some(8),
            PrimitiveKind::String => None,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            PrimitiveKind::Boolean => "boolean",
            PrimitiveKind::Byte => "byte",
            PrimitiveKind::Char => "char",
            PrimitiveKind::Short => "short",
            PrimitiveKind::Int => "int",
            PrimitiveKind::Long => "long",
            PrimitiveKind::Float => "float",
            PrimitiveKind::Double => "double",
            PrimitiveKind::String => "string",
        }
    }

    /// Reads one value of this kind.
    ///
    /// Strings with `limit > 0` occupy exactly `limit` bytes; otherwise they
    /// run up to and including a NUL terminator. `limit` is ignored for
    /// fixed-width kinds.
    pub fn read<R: Read>(
        self,
        reader: &mut OrderedReader<R>,
        limit: usize,
    ) -> io::Result<Primitive<'static>> {
        Ok(match self {
            PrimitiveKind::Boolean => Primitive::Boolean(reader.read_bool()?),
            PrimitiveKind::Byte => Primitive::Byte(reader.read_i8()?),
            PrimitiveKind::Char => Primitive::Char(reader.read_char()?),
            PrimitiveKind::Short => Primitive::Short(reader.read_i16()?),
            PrimitiveKind::Int => Primitive::Int(reader.read_i32()?),
            PrimitiveKind::Long => Primitive::Long(reader.read_i64()?),
            PrimitiveKind::Float => Primitive::Float(reader.read_f32()?),
            PrimitiveKind::Double => Primitive::Double(reader.read_f64()?),
            PrimitiveKind::String if limit > 0 => {
                Primitive::String(Cow::Owned(reader.read_fixed_string(limit)?))
            }
            PrimitiveKind::String => Primitive::String(Cow::Owned(reader.read_string()?)),
        })
    }
}

/// A single primitive value, borrowed when packing and owned when unpacking.
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive<'a> {
    Boolean(bool),
    Byte(i8),
    Char(u16),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(Cow<'a, str>),
}

impl Primitive<'_> {
    pub fn kind(&self) -> PrimitiveKind {
        match self {
            Primitive::Boolean(_) => PrimitiveKind::Boolean,
            Primitive::Byte(_) => PrimitiveKind::Byte,
            Primitive::Char(_) => PrimitiveKind::Char,
            Primitive::Short(_) => PrimitiveKind::Short,
            Primitive::Int(_) => PrimitiveKind::Int,
            Primitive::Long(_) => PrimitiveKind::Long,
            Primitive::Float(_) => PrimitiveKind::Float,
            Primitive::Double(_) => PrimitiveKind::Double,
            Primitive::String(_) => PrimitiveKind::String,
        }
    }

    /// Writes this value; see [PrimitiveKind::read] for how `limit` shapes strings.
    pub fn write<W: Write>(&self, writer: &mut OrderedWriter<W>, limit: usize) -> io::Result<()> {
        match self {
            Primitive::Boolean(v) => writer.write_bool(*v),
            Primitive::Byte(v) => writer.write_i8(*v),
            Primitive::Char(v) => writer.write_char(*v),
            Primitive::Short(v) => writer.write_i16(*v),
            Primitive::Int(v) => writer.write_i32(*v),
            Primitive::Long(v) => writer.write_i64(*v),
            Primitive::Float(v) => writer.write_f32(*v),
            Primitive::Double(v) => writer.write_f64(*v),
            Primitive::String(s) if limit > 0 => writer.write_fixed_string(s, limit),
            Primitive::String(s) => writer.write_string(s),
        }
    }
}
