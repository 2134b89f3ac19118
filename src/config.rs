//! Stream-level settings shared by the reader, the writer and the engine entry points.

use std::{fmt, str::FromStr};

/// Byte order applied to every fixed-width primitive in one stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Endianness {
    /// Most significant byte first.
    #[default]
    Big,
    /// Least significant byte first.
    Little,
}

impl fmt::Display for Endianness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endianness::Big => f.write_str("big"),
            Endianness::Little => f.write_str("little"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown byte order `{0}`, expected `big` or `little`")]
pub struct ParseEndiannessError(String);

impl FromStr for Endianness {
    type Err = ParseEndiannessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "big" | "be" => Ok(Endianness::Big),
            "little" | "le" => Ok(Endianness::Little),
            _ => Err(ParseEndiannessError(s.to_string())),
        }
    }
}

/// Settings used to build a stream pair for one transfer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CodecConfig {
    #[cfg_attr(feature = "serde", serde(default))]
    pub byte_order: Endianness,
}

impl CodecConfig {
    pub fn new(byte_order: Endianness) -> Self {
        Self { byte_order }
    }

    pub fn little_endian() -> Self {
        Self::new(Endianness::Little)
    }
}
