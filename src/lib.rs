//! Declarative binary marshalling of typed records.
//!
//! A record's wire layout is described once, field by field, and the engine
//! measures, packs and unpacks instances from that description. The wire
//! format carries no tags or length prefixes: fields are written back to back
//! in index order, with fixed-width primitives in the stream's byte order and
//! strings either NUL-terminated or padded to a fixed limit.
//!
//! ```
//! use structwire::{record, pack_to_vec, unpack_from_slice, CodecConfig};
//!
//! record! {
//!     #[derive(Debug, Default, PartialEq)]
//!     pub struct Reading {
//!         #[wire(index = 0, limit = 4)]
//!         pub sensor: String,
//!         #[wire(index = 1, skip = 1)]
//!         pub value: i16,
//!     }
//! }
//!
//! let reading = Reading { sensor: "t1".into(), value: -2 };
//! let bytes = pack_to_vec(&reading, &CodecConfig::default()).unwrap();
//! assert_eq!(bytes, [b't', b'1', 0, 0, 0, 0xFF, 0xFE]);
//!
//! let mut decoded = Reading::default();
//! unpack_from_slice(&mut decoded, &bytes, &CodecConfig::default()).unwrap();
//! assert_eq!(decoded, reading);
//! ```
//!
//! [bit_buffer::BitBuffer] complements the byte streams with LSB-first,
//! bit-granular access to in-memory buffers.

mod macros;

pub mod bit_buffer;
pub mod bits;
pub mod config;
pub mod engine;
pub mod errors;
pub mod field;
pub mod primitive;
pub mod reader;
pub mod schema;
#[cfg(feature = "serde")]
pub mod serde;
pub mod value;
pub mod writer;

pub use bit_buffer::BitBuffer;
pub use config::{CodecConfig, Endianness};
pub use engine::{Size, pack, pack_to_vec, size_of, unpack, unpack_from_slice};
pub use errors::{RangeError, StructError};
pub use field::{FieldDescriptor, FieldKind};
pub use reader::OrderedReader;
pub use schema::{Record, Struct, StructSchema};
pub use writer::OrderedWriter;
