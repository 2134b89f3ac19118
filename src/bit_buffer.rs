//! Random-access reader (and writer) of individual bits over an in-memory buffer.
//!
//! Bits are consumed LSB-first within each byte: the first bit read from a
//! byte is its lowest bit, and a multi-bit value is assembled starting from
//! its own lowest bit. Reading little-endian encoded integers therefore
//! yields their value directly.

use crate::{
    bits::{bit_at, sign_extend, with_bit},
    errors::RangeError,
};

/// Bit-granular cursor over a byte buffer of fixed capacity.
pub struct BitBuffer<B> {
    source: B,
    capacity_bits: usize,
    /// Position in bits.
    position: usize,
    /// Copy of the byte the position currently points into.
    current: u8,
}

impl<B: AsRef<[u8]>> BitBuffer<B> {
    pub fn new(source: B) -> Self {
        let capacity_bits = source.as_ref().len() * 8;
        Self {
            source,
            capacity_bits,
            position: 0,
            current: 0,
        }
    }

    pub fn into_inner(self) -> B {
        self.source
    }

    /// Capacity in bytes.
    pub fn capacity(&self) -> usize {
        self.capacity_bits / 8
    }

    /// Limit in bytes; always equal to the capacity.
    pub fn limit(&self) -> usize {
        self.capacity()
    }

    /// Position in whole bytes.
    pub fn position(&self) -> usize {
        self.position / 8
    }

    pub fn position_bits(&self) -> usize {
        self.position
    }

    pub fn remaining_bits(&self) -> usize {
        self.capacity_bits - self.position
    }

    /// Whole bytes remaining.
    pub fn remaining(&self) -> usize {
        self.remaining_bits() / 8
    }

    pub fn has_remaining(&self) -> bool {
        self.remaining() > 0
    }

    pub fn has_remaining_bits(&self) -> bool {
        self.remaining_bits() > 0
    }

    /// Moves to `byte_offset`, then consumes `bit_offset` bits from there.
    ///
    /// Nothing read before the seek is reused: the bits are taken from the
    /// buffer again.
    pub fn set_position(&mut self, byte_offset: usize, bit_offset: usize) -> Result<(), RangeError> {
        let target = byte_offset
            .checked_mul(8)
            .and_then(|bits| bits.checked_add(bit_offset));

        if target.is_none_or(|target| target > self.capacity_bits) {
            return Err(RangeError::InvalidPosition {
                byte_offset,
                bit_offset,
                capacity_bits: self.capacity_bits,
            });
        }

        self.position = byte_offset * 8;
        let mut pending = bit_offset;
        while pending > 0 {
            let n = pending.min(64);
            self.get_bits(n)?;
            pending -= n;
        }

        Ok(())
    }

    fn check(&self, n: usize) -> Result<(), RangeError> {
        if n > 64 {
            return Err(RangeError::TooManyBitsRead(n));
        }

        let remaining = self.remaining_bits();
        if n > remaining {
            return Err(RangeError::OutOfBounds {
                requested: n,
                remaining,
            });
        }

        Ok(())
    }

    /// Loads the byte under the position; only called on byte boundaries.
    fn next_byte(&mut self) {
        self.current = self.source.as_ref()[self.position / 8];
    }

    /// Reads `n` bits (at most 64). The read either succeeds completely or
    /// fails without moving the position.
    pub fn get_bits(&mut self, n: usize) -> Result<u64, RangeError> {
        self.check(n)?;

        let mut data = 0u64;
        for i in 0..n {
            let offset = self.position % 8;
            if offset == 0 {
                self.next_byte();
            }
            if bit_at(self.current, offset) {
                data |= 1 << i;
            }
            self.position += 1;
        }

        Ok(data)
    }

    /// Reads `n` bits and sign-extends them from bit `n - 1`.
    pub fn get_signed_bits(&mut self, n: usize) -> Result<i64, RangeError> {
        Ok(sign_extend(self.get_bits(n)?, n))
    }

    pub fn get_bool(&mut self) -> Result<bool, RangeError> {
        Ok(self.get_bits(1)? != 0)
    }

    pub fn get_byte(&mut self) -> Result<i8, RangeError> {
        Ok(self.get_bits(8)? as i8)
    }

    pub fn get_u8(&mut self) -> Result<u8, RangeError> {
        Ok(self.get_bits(8)? as u8)
    }

    pub fn get_short(&mut self) -> Result<i16, RangeError> {
        Ok(self.get_bits(16)? as i16)
    }

    pub fn get_int(&mut self) -> Result<i32, RangeError> {
        Ok(self.get_bits(32)? as i32)
    }

    pub fn get_long(&mut self) -> Result<i64, RangeError> {
        Ok(self.get_bits(64)? as i64)
    }

    pub fn get_float(&mut self) -> Result<f32, RangeError> {
        Ok(f32::from_bits(self.get_bits(32)? as u32))
    }

    pub fn get_double(&mut self) -> Result<f64, RangeError> {
        Ok(f64::from_bits(self.get_bits(64)?))
    }

    /// Fills `dst` with consecutive 8-bit reads.
    pub fn get_into(&mut self, dst: &mut [u8]) -> Result<(), RangeError> {
        self.check_bytes(dst.len())?;
        for byte in dst.iter_mut() {
            *byte = self.get_u8()?;
        }
        Ok(())
    }

    fn check_bytes(&self, n: usize) -> Result<(), RangeError> {
        let remaining = self.remaining_bits();
        match n.checked_mul(8) {
            Some(bits) if bits <= remaining => Ok(()),
            _ => Err(RangeError::OutOfBounds {
                requested: n.saturating_mul(8),
                remaining,
            }),
        }
    }

    /// Reads 8-bit characters up to a NUL or until `limit` bytes were
    /// consumed (`limit == 0` means no limit). With `exact`, keeps
    /// discarding bytes until exactly `limit` bytes have been consumed,
    /// terminator included.
    pub fn get_string(&mut self, limit: usize, exact: bool) -> Result<String, RangeError> {
        let mut content = Vec::new();
        let mut consumed = 0;

        while limit == 0 || consumed < limit {
            let c = self.get_u8()?;
            consumed += 1;
            if c == 0 {
                break;
            }
            content.push(c);
        }

        if exact && limit > consumed {
            let rest = limit - consumed;
            self.check_bytes(rest)?;
            for _ in 0..rest {
                self.get_u8()?;
            }
        }

        Ok(String::from_utf8_lossy(&content).into_owned())
    }
}

impl<B: AsRef<[u8]> + AsMut<[u8]>> BitBuffer<B> {
    /// Writes the low `n` bits of `value` (at most 64), LSB-first, leaving
    /// the other bits of touched bytes unchanged.
    pub fn put_bits(&mut self, n: usize, value: u64) -> Result<(), RangeError> {
        self.check(n)?;

        for i in 0..n {
            let offset = self.position % 8;
            let index = self.position / 8;
            if offset == 0 {
                self.next_byte();
            }
            self.current = with_bit(self.current, offset, (value >> i) & 1 != 0);
            self.source.as_mut()[index] = self.current;
            self.position += 1;
        }

        Ok(())
    }

    pub fn put_bool(&mut self, value: bool) -> Result<(), RangeError> {
        self.put_bits(1, value as u64)
    }

    pub fn put_byte(&mut self, value: i8) -> Result<(), RangeError> {
        self.put_bits(8, value as u8 as u64)
    }

    pub fn put_short(&mut self, value: i16) -> Result<(), RangeError> {
        self.put_bits(16, value as u16 as u64)
    }

    pub fn put_int(&mut self, value: i32) -> Result<(), RangeError> {
        self.put_bits(32, value as u32 as u64)
    }

    pub fn put_long(&mut self, value: i64) -> Result<(), RangeError> {
        self.put_bits(64, value as u64)
    }

    pub fn put_float(&mut self, value: f32) -> Result<(), RangeError> {
        self.put_bits(32, value.to_bits() as u64)
    }

    pub fn put_double(&mut self, value: f64) -> Result<(), RangeError> {
        self.put_bits(64, value.to_bits())
    }

    /// Writes the bytes of `value` followed by a NUL.
    pub fn put_string(&mut self, value: &str) -> Result<(), RangeError> {
        self.check_bytes(value.len() + 1)?;
        for &b in value.as_bytes() {
            self.put_bits(8, b as u64)?;
        }
        self.put_bits(8, 0)
    }
}

#[cfg(test)]
mod tests {
    use crate::bits::low_mask;

    use super::*;

    const CAFEBABE: [u8; 4] = [0xCA, 0xFE, 0xBA, 0xBE];

    #[test]
    fn test_get_bits_lsb_first() {
        let mut buffer = BitBuffer::new([0b1010_0110]);
        assert_eq!(buffer.get_bits(1).unwrap(), 0);
        assert_eq!(buffer.get_bits(2).unwrap(), 0b11);
        assert_eq!(buffer.get_bits(5).unwrap(), 0b10100);
        assert!(!buffer.has_remaining_bits());
    }

    #[test]
    fn test_get_zero_bits() {
        let mut buffer = BitBuffer::new([0xFF]);
        assert_eq!(buffer.get_bits(0).unwrap(), 0);
        assert_eq!(buffer.position_bits(), 0);
    }

    #[test]
    fn test_shift() {
        for i in 0..31 {
            let bytes = (1u32 << i).to_le_bytes();
            let mut buffer = BitBuffer::new(bytes);
            buffer.get_bits(i).unwrap();
            assert_eq!(buffer.get_bits(1).unwrap(), 1, "shift {i}");
        }
    }

    #[test]
    fn test_single_bits_rebuild_value() {
        let number: u32 = 0x5A3C_0F71;
        let mut buffer = BitBuffer::new(number.to_le_bytes());
        let mut rebuilt = 0u32;
        for i in 0..32 {
            rebuilt |= (buffer.get_bits(1).unwrap() as u32) << i;
        }
        assert_eq!(rebuilt, number);
    }

    #[test]
    fn test_split_reads_cross_byte_boundaries() {
        let number = u32::from_le_bytes(CAFEBABE) as u64;
        for n in 0..=32 {
            let mut buffer = BitBuffer::new(CAFEBABE);
            let low = buffer.get_bits(n).unwrap();
            let high = buffer.get_bits(32 - n).unwrap();
            assert_eq!(low, number & low_mask(n), "low {n}");
            assert_eq!(high, number >> n, "high {n}");
        }
    }

    #[test]
    fn test_split_reads_up_to_64() {
        let bytes = 0x0123_4567_89AB_CDEFu64.to_le_bytes();
        let number = u64::from_le_bytes(bytes);
        for n in 0..=64 {
            let mut buffer = BitBuffer::new(bytes);
            let low = buffer.get_bits(n).unwrap();
            let high = buffer.get_bits(64 - n).unwrap();
            assert_eq!(low, number & low_mask(n), "low {n}");
            let expected_high = if n == 64 { 0 } else { number >> n };
            assert_eq!(high, expected_high, "high {n}");
        }
    }

    #[test]
    fn test_reseek_is_repeatable() {
        let mut buffer = BitBuffer::new(CAFEBABE);
        buffer.set_position(0, 1).unwrap();
        let first = buffer.get_byte().unwrap();
        buffer.set_position(0, 1).unwrap();
        let second = buffer.get_byte().unwrap();
        assert_eq!(first, second);
        assert_eq!(first as u8, ((0xCAu16 | 0xFE << 8) >> 1) as u8);
    }

    #[test]
    fn test_seek_matches_sequential_reads() {
        for offset in 0..CAFEBABE.len() {
            let mut sequential = BitBuffer::new(CAFEBABE);
            for _ in 0..offset {
                sequential.get_u8().unwrap();
            }

            let mut seeking = BitBuffer::new(CAFEBABE);
            seeking.get_bits(13).unwrap();
            seeking.set_position(offset, 0).unwrap();

            while sequential.has_remaining() {
                assert_eq!(seeking.get_u8().unwrap(), sequential.get_u8().unwrap());
            }
            assert!(!seeking.has_remaining());
        }
    }

    #[test]
    fn test_set_position_out_of_range() {
        let mut buffer = BitBuffer::new([0u8; 2]);
        assert_eq!(
            buffer.set_position(2, 1).unwrap_err(),
            RangeError::InvalidPosition {
                byte_offset: 2,
                bit_offset: 1,
                capacity_bits: 16
            }
        );
        buffer.set_position(2, 0).unwrap();
        assert_eq!(buffer.remaining_bits(), 0);
    }

    #[test]
    fn test_read_past_capacity() {
        let mut buffer = BitBuffer::new(CAFEBABE);
        buffer.get_bits(30).unwrap();
        assert_eq!(
            buffer.get_bits(3).unwrap_err(),
            RangeError::OutOfBounds {
                requested: 3,
                remaining: 2
            }
        );
        assert_eq!(buffer.position_bits(), 30);
        assert_eq!(buffer.get_bits(2).unwrap(), 0b10);
    }

    #[test]
    fn test_too_many_bits() {
        let mut buffer = BitBuffer::new([0u8; 16]);
        assert_eq!(
            buffer.get_bits(65).unwrap_err(),
            RangeError::TooManyBitsRead(65)
        );
    }

    #[test]
    fn test_typed_getters() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&(-2i16).to_le_bytes());
        bytes.extend_from_slice(&6.0f32.to_le_bytes());
        bytes.extend_from_slice(&7.0f64.to_le_bytes());
        bytes.extend_from_slice(&(-5i64).to_le_bytes());

        let mut buffer = BitBuffer::new(bytes);
        assert_eq!(buffer.get_short().unwrap(), -2);
        assert_eq!(buffer.get_float().unwrap(), 6.0);
        assert_eq!(buffer.get_double().unwrap(), 7.0);
        assert_eq!(buffer.get_long().unwrap(), -5);
        assert_eq!(buffer.remaining(), 0);
    }

    #[test]
    fn test_get_signed_bits() {
        let mut buffer = BitBuffer::new([0b0000_1110]);
        assert_eq!(buffer.get_signed_bits(4).unwrap(), -2);
    }

    #[test]
    fn test_get_string_unbounded() {
        let mut buffer = BitBuffer::new(*b"abc\0de\0");
        assert_eq!(buffer.get_string(0, false).unwrap(), "abc");
        assert_eq!(buffer.get_string(0, false).unwrap(), "de");
        assert!(!buffer.has_remaining());
    }

    #[test]
    fn test_get_string_limit() {
        let mut buffer = BitBuffer::new(*b"abcdef\0");
        assert_eq!(buffer.get_string(2, false).unwrap(), "ab");
        assert_eq!(buffer.position(), 2);
    }

    #[test]
    fn test_get_string_exact_consumes_limit() {
        let mut buffer = BitBuffer::new(*b"ab\0xxZ");
        assert_eq!(buffer.get_string(5, true).unwrap(), "ab");
        assert_eq!(buffer.position(), 5);
        assert_eq!(buffer.get_u8().unwrap(), b'Z');
    }

    #[test]
    fn test_get_string_without_terminator_fails() {
        let mut buffer = BitBuffer::new(*b"abc");
        assert!(matches!(
            buffer.get_string(0, false),
            Err(RangeError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn test_get_into() {
        let mut buffer = BitBuffer::new(CAFEBABE);
        let mut dst = [0u8; 3];
        buffer.set_position(1, 0).unwrap();
        buffer.get_into(&mut dst).unwrap();
        assert_eq!(dst, [0xFE, 0xBA, 0xBE]);
        assert!(buffer.get_into(&mut [0u8; 1]).is_err());
    }

    #[test]
    fn test_put_then_get() {
        let mut buffer = BitBuffer::new(vec![0u8; 16]);
        buffer.put_bits(3, 0b101).unwrap();
        buffer.put_int(-7).unwrap();
        buffer.put_double(2.5).unwrap();
        buffer.put_bool(true).unwrap();

        buffer.set_position(0, 0).unwrap();
        assert_eq!(buffer.get_bits(3).unwrap(), 0b101);
        assert_eq!(buffer.get_int().unwrap(), -7);
        assert_eq!(buffer.get_double().unwrap(), 2.5);
        assert!(buffer.get_bool().unwrap());
    }

    #[test]
    fn test_put_preserves_neighbouring_bits() {
        let mut buffer = BitBuffer::new([0xFFu8; 2]);
        buffer.set_position(0, 4).unwrap();
        buffer.put_bits(8, 0).unwrap();
        assert_eq!(buffer.into_inner(), [0x0F, 0xF0]);
    }

    #[test]
    fn test_put_string() {
        let mut buffer = BitBuffer::new([0xAAu8; 4]);
        buffer.put_string("hi").unwrap();
        assert_eq!(buffer.position(), 3);
        assert!(buffer.put_string("x").is_err());
        assert_eq!(buffer.into_inner(), [b'h', b'i', 0, 0xAA]);
    }
}
