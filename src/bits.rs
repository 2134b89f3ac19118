//! Low-level bit helpers shared by [crate::bit_buffer::BitBuffer].
//!
//! Bits are addressed LSB-first: bit 0 is the low bit of a byte.

/// Returns bit `index` (0 = LSB) of `byte`.
#[inline]
pub fn bit_at(byte: u8, index: usize) -> bool {
    (byte >> index) & 1 != 0
}

/// Returns `byte` with bit `index` (0 = LSB) set to `bit`.
#[inline]
pub fn with_bit(byte: u8, index: usize, bit: bool) -> u8 {
    if bit {
        byte | (1 << index)
    } else {
        byte & !(1 << index)
    }
}

/// Mask covering the low `bits` bits.
pub fn low_mask(bits: usize) -> u64 {
    match bits {
        0 => 0,
        64.. => u64::MAX,
        n => (1u64 << n) - 1,
    }
}

/// Sign-extends the low `bits` of `value` to a full `i64`.
pub fn sign_extend(value: u64, bits: usize) -> i64 {
    match bits {
        0 => 0,
        64.. => value as i64,
        n => {
            let shift = 64 - n;
            ((value << shift) as i64) >> shift
        }
    }
}
