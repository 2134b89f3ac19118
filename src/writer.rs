//! Sequential, position-tracked writer with a configurable byte order.

use std::io::{self, Read, Write};

use byteorder::{BigEndian, ByteOrder, LittleEndian};

use crate::{
    config::{CodecConfig, Endianness},
    engine,
    errors::StructError,
    schema::{Record, Struct},
};

macro_rules! write_fixed {
    ($name:ident, $ty:ty, $width:expr, $encode:ident) => {
        pub fn $name(&mut self, value: $ty) -> io::Result<()> {
            match self.order {
                Endianness::Big => BigEndian::$encode(&mut self.scratch[..$width], value),
                Endianness::Little => LittleEndian::$encode(&mut self.scratch[..$width], value),
            }
            self.emit($width)
        }
    };
}

/// Wraps a byte sink and encodes fixed-width primitives in one byte order.
pub struct OrderedWriter<W> {
    inner: W,
    order: Endianness,
    position: usize,
    scratch: [u8; 8],
}

impl<W: Write> OrderedWriter<W> {
    /// Big-endian writer over `inner`.
    pub fn new(inner: W) -> Self {
        Self::with_order(inner, Endianness::default())
    }

    /// Writer over `inner` using `order` for every fixed-width primitive.
    pub fn with_order(inner: W, order: Endianness) -> Self {
        Self {
            inner,
            order,
            position: 0,
            scratch: [0; 8],
        }
    }

    pub fn with_config(inner: W, config: &CodecConfig) -> Self {
        Self::with_order(inner, config.byte_order)
    }

    pub fn order(&self) -> Endianness {
        self.order
    }

    /// Changes the byte order for everything that follows.
    pub fn set_order(&mut self, order: Endianness) {
        self.order = order;
    }

    /// Number of bytes written so far.
    pub fn position(&self) -> usize {
        self.position
    }

    /// The wrapped sink.
    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    pub fn into_inner(self) -> W {
        self.inner
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }

    fn emit(&mut self, width: usize) -> io::Result<()> {
        self.inner.write_all(&self.scratch[..width])?;
        self.position += width;
        Ok(())
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.inner.write_all(bytes)?;
        self.position += bytes.len();
        Ok(())
    }

    /// Writes `n` zero bytes.
    pub fn write_padding(&mut self, n: usize) -> io::Result<()> {
        if n == 0 {
            return Ok(());
        }

        let written = io::copy(&mut io::repeat(0).take(n as u64), &mut self.inner)?;
        self.position += written as usize;
        Ok(())
    }

    pub fn write_bool(&mut self, value: bool) -> io::Result<()> {
        self.write_u8(value as u8)
    }

    pub fn write_u8(&mut self, value: u8) -> io::Result<()> {
        self.scratch[0] = value;
        self.emit(1)
    }

    pub fn write_i8(&mut self, value: i8) -> io::Result<()> {
        self.write_u8(value as u8)
    }

    /// Writes a UTF-16 code unit.
    pub fn write_char(&mut self, value: u16) -> io::Result<()> {
        self.write_u16(value)
    }

    write_fixed!(write_i16, i16, 2, write_i16);
    write_fixed!(write_u16, u16, 2, write_u16);
    write_fixed!(write_i32, i32, 4, write_i32);
    write_fixed!(write_i64, i64, 8, write_i64);
    write_fixed!(write_f32, f32, 4, write_f32);
    write_fixed!(write_f64, f64, 8, write_f64);

    /// Writes the UTF-8 bytes of `value` followed by one NUL.
    pub fn write_string(&mut self, value: &str) -> io::Result<()> {
        self.write_bytes(value.as_bytes())?;
        self.write_u8(0)
    }

    /// Writes exactly `len` bytes: `value` truncated or zero-padded to fit.
    pub fn write_fixed_string(&mut self, value: &str, len: usize) -> io::Result<()> {
        let bytes = value.as_bytes();
        let n = bytes.len().min(len);
        self.write_bytes(&bytes[..n])?;
        self.write_padding(len - n)
    }

    /// Packs a record inline at the current position.
    pub fn write_struct(&mut self, instance: &dyn Struct) -> Result<(), StructError> {
        engine::pack(instance, self)
    }

    /// Packs a freshly default-constructed `T`.
    pub fn write_default<T: Record>(&mut self) -> Result<(), StructError> {
        engine::pack(&T::default(), self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_big_endian() {
        let mut writer = OrderedWriter::new(Vec::new());
        writer.write_i16(1).unwrap();
        writer.write_i32(2).unwrap();
        assert_eq!(writer.position(), 6);
        assert_eq!(writer.into_inner(), vec![0, 1, 0, 0, 0, 2]);
    }

    #[test]
    fn test_write_little_endian() {
        let mut writer = OrderedWriter::with_order(Vec::new(), Endianness::Little);
        writer.write_char(2).unwrap();
        writer.write_i64(5).unwrap();
        assert_eq!(
            writer.into_inner(),
            vec![2, 0, 5, 0, 0, 0, 0, 0, 0, 0]
        );
    }

    #[test]
    fn test_write_floats() {
        let mut writer = OrderedWriter::new(Vec::new());
        writer.write_f32(6.0).unwrap();
        writer.write_f64(7.0).unwrap();
        assert_eq!(
            writer.into_inner(),
            vec![0x40, 0xC0, 0, 0, 0x40, 0x1C, 0, 0, 0, 0, 0, 0]
        );
    }

    #[test]
    fn test_write_string_appends_nul() {
        let mut writer = OrderedWriter::new(Vec::new());
        writer.write_string("ab").unwrap();
        assert_eq!(writer.position(), 3);
        assert_eq!(writer.into_inner(), b"ab\0");
    }

    #[test]
    fn test_write_fixed_string_pads() {
        let mut writer = OrderedWriter::new(Vec::new());
        writer.write_fixed_string("ab", 4).unwrap();
        assert_eq!(writer.into_inner(), b"ab\0\0");
    }

    #[test]
    fn test_write_fixed_string_truncates() {
        let mut writer = OrderedWriter::new(Vec::new());
        writer.write_fixed_string("abcdef", 3).unwrap();
        assert_eq!(writer.position(), 3);
        assert_eq!(writer.into_inner(), b"abc");
    }

    #[test]
    fn test_write_padding() {
        let mut writer = OrderedWriter::new(Vec::new());
        writer.write_u8(0xFF).unwrap();
        writer.write_padding(3).unwrap();
        assert_eq!(writer.position(), 4);
        assert_eq!(writer.into_inner(), vec![0xFF, 0, 0, 0]);
    }
}
