//! Error types for marshalling records and reading bits.

use std::io;

use crate::primitive::PrimitiveKind;

/// Errors produced by [crate::engine] while measuring, packing or unpacking a record.
///
/// None of these are recovered locally: the record being unpacked must be
/// discarded once one is returned.
#[derive(Debug, thiserror::Error)]
pub enum StructError {
    /// An array field needs a pre-sized container but the container is unallocated.
    #[error("cannot marshal array of unknown length in field `{field}`")]
    UninitializedContainer { field: &'static str },
    /// A nested record type has no usable default value.
    #[error("cannot construct `{type_name}`: {reason}")]
    SchemaConstruction {
        type_name: &'static str,
        reason: &'static str,
    },
    /// The value behind a field does not have the kind its descriptor declares.
    #[error("field `{field}` does not hold a {expected}")]
    KindMismatch {
        field: &'static str,
        expected: &'static str,
    },
    /// The schema names a field the record does not expose.
    #[error("`{type_name}` has no field `{field}`")]
    UnknownField {
        type_name: &'static str,
        field: &'static str,
    },
    /// Failure of the underlying byte source or sink, including truncated input.
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl StructError {
    pub(crate) fn primitive_mismatch(field: &'static str, expected: PrimitiveKind) -> Self {
        StructError::KindMismatch {
            field,
            expected: expected.name(),
        }
    }
}

/// Errors produced by [crate::bit_buffer::BitBuffer] accesses.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RangeError {
    /// Requested more bits than remain before capacity.
    #[error("requested {requested} bits but only {remaining} remain")]
    OutOfBounds { requested: usize, remaining: usize },
    /// More than 64 bits were requested in a single read or write.
    #[error("cannot access {0} bits at once (max 64)")]
    TooManyBitsRead(usize),
    /// Seek target lies beyond the end of the buffer.
    #[error("position {byte_offset}:{bit_offset} is outside {capacity_bits} bits")]
    InvalidPosition {
        byte_offset: usize,
        bit_offset: usize,
        capacity_bits: usize,
    },
}
