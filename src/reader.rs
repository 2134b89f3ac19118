//! Sequential, position-tracked reader with a configurable byte order.

use std::io::{self, Read};

use byteorder::{BigEndian, ByteOrder, LittleEndian};

use crate::{
    config::{CodecConfig, Endianness},
    engine,
    errors::StructError,
    schema::{Record, Struct},
};

macro_rules! read_fixed {
    ($(#[$doc:meta])* $name:ident, $ty:ty, $width:expr, $decode:ident) => {
        $(#[$doc])*
        pub fn $name(&mut self) -> io::Result<$ty> {
            let order = self.order;
            let bytes = self.fill($width)?;
            Ok(match order {
                Endianness::Big => BigEndian::$decode(bytes),
                Endianness::Little => LittleEndian::$decode(bytes),
            })
        }
    };
}

/// Wraps a byte source and decodes fixed-width primitives in one byte order.
///
/// The position counts bytes consumed through this reader only; it is
/// accurate as long as nothing else reads from the same source.
pub struct OrderedReader<R> {
    inner: R,
    order: Endianness,
    position: usize,
    scratch: [u8; 8],
}

impl<R: Read> OrderedReader<R> {
    /// Big-endian reader over `inner`.
    pub fn new(inner: R) -> Self {
        Self::with_order(inner, Endianness::default())
    }

    /// Reader over `inner` using `order` for every fixed-width primitive.
    pub fn with_order(inner: R, order: Endianness) -> Self {
        Self {
            inner,
            order,
            position: 0,
            scratch: [0; 8],
        }
    }

    pub fn with_config(inner: R, config: &CodecConfig) -> Self {
        Self::with_order(inner, config.byte_order)
    }

    pub fn order(&self) -> Endianness {
        self.order
    }

    /// Changes the byte order for everything that follows.
    pub fn set_order(&mut self, order: Endianness) {
        self.order = order;
    }

    /// Number of bytes consumed so far.
    pub fn position(&self) -> usize {
        self.position
    }

    /// The wrapped source.
    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    pub fn into_inner(self) -> R {
        self.inner
    }

    fn fill(&mut self, width: usize) -> io::Result<&[u8]> {
        self.inner.read_exact(&mut self.scratch[..width])?;
        self.position += width;
        Ok(&self.scratch[..width])
    }

    /// Fills `buf` completely or fails with [io::ErrorKind::UnexpectedEof].
    pub fn read_exact(&mut self, buf: &mut [u8]) -> io::Result<()> {
        self.inner.read_exact(buf)?;
        self.position += buf.len();
        Ok(())
    }

    pub fn read_bool(&mut self) -> io::Result<bool> {
        Ok(self.read_u8()? != 0)
    }

    pub fn read_u8(&mut self) -> io::Result<u8> {
        Ok(self.fill(1)?[0])
    }

    pub fn read_i8(&mut self) -> io::Result<i8> {
        Ok(self.read_u8()? as i8)
    }

    read_fixed!(
        /// Reads a UTF-16 code unit.
        read_char, u16, 2, read_u16
    );
    read_fixed!(read_i16, i16, 2, read_i16);
    read_fixed!(read_u16, u16, 2, read_u16);
    read_fixed!(read_i32, i32, 4, read_i32);
    read_fixed!(read_i64, i64, 8, read_i64);
    read_fixed!(read_f32, f32, 4, read_f32);
    read_fixed!(read_f64, f64, 8, read_f64);

    /// Reads a NUL-terminated string, discarding the terminator.
    pub fn read_string(&mut self) -> io::Result<String> {
        self.read_string_min(0)
    }

    /// Reads a NUL-terminated string, then skips ahead so that at least `min`
    /// bytes (terminator included) have been consumed.
    pub fn read_string_min(&mut self, min: usize) -> io::Result<String> {
        let mut content = Vec::new();
        loop {
            match self.read_u8()? {
                0 => break,
                c => content.push(c),
            }
        }

        let consumed = content.len() + 1;
        if min > consumed {
            let skip = min - consumed;
            tracing::trace!(skip, "skipping string remainder");
            self.skip_bytes(skip)?;
        }

        Ok(String::from_utf8_lossy(&content).into_owned())
    }

    /// Reads exactly `len` bytes; the value ends at the first NUL, if any.
    pub fn read_fixed_string(&mut self, len: usize) -> io::Result<String> {
        let mut buf = vec![0u8; len];
        self.read_exact(&mut buf)?;

        let end = buf.iter().position(|&b| b == 0).unwrap_or(len);
        Ok(String::from_utf8_lossy(&buf[..end]).into_owned())
    }

    /// Discards `n` bytes. Running out of input is an error, not a short skip.
    pub fn skip_bytes(&mut self, n: usize) -> io::Result<()> {
        if n == 0 {
            return Ok(());
        }

        let skipped = io::copy(&mut self.inner.by_ref().take(n as u64), &mut io::sink())? as usize;
        self.position += skipped;

        if skipped < n {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("tried to skip {n} bytes but only {skipped} were available"),
            ));
        }

        Ok(())
    }

    /// Skips forward to the absolute `offset`, which must not lie behind the current position.
    pub fn skip_to(&mut self, offset: usize) -> io::Result<()> {
        if offset < self.position {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!(
                    "cannot skip back to offset {offset} from position {}",
                    self.position
                ),
            ));
        }

        self.skip_bytes(offset - self.position)
    }

    /// Unpacks a record inline from the current position.
    pub fn read_struct(&mut self, instance: &mut dyn Struct) -> Result<(), StructError> {
        engine::unpack(instance, self)
    }

    /// Unpacks a freshly default-constructed `T`.
    pub fn read_record<T: Record>(&mut self) -> Result<T, StructError> {
        let mut instance = T::default();
        engine::unpack(&mut instance, self)?;
        Ok(instance)
    }
}
