//! Zig-zag varint codec for the disk cache header.
//!
//! Signed values are zig-zag mapped then written as little-endian base-128
//! groups, 7 bits per byte, high bit set on every byte but the last.

use thiserror::Error;

/// Maximum encoded length of a 64-bit value.
pub const MAX_VARINT_LEN: usize = 10;

/// Varint decoding failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum VarintError {
    /// Input ended before the terminating byte.
    #[error("unexpected end of varint")]
    Truncated,
    /// Value does not fit in 64 bits.
    #[error("varint overflows a 64-bit integer")]
    Overflow,
}

/// Encodes `value` into `buf`, returning the number of bytes written.
///
/// `buf` must hold at least [`MAX_VARINT_LEN`] bytes.
pub fn encode(value: i64, buf: &mut [u8]) -> usize {
    #[allow(clippy::cast_sign_loss)]
    let mut zigzag = ((value << 1) ^ (value >> 63)) as u64;
    let mut written = 0;
    while zigzag >= 0x80 {
        #[allow(clippy::cast_possible_truncation)]
        {
            buf[written] = (zigzag as u8) | 0x80;
        }
        zigzag >>= 7;
        written += 1;
    }
    #[allow(clippy::cast_possible_truncation)]
    {
        buf[written] = zigzag as u8;
    }
    written + 1
}

/// Decodes a varint from the start of `buf`.
///
/// Returns the value and the number of bytes consumed.
///
/// # Errors
/// Returns [`VarintError`] if the input is truncated or overlong.
pub fn decode(buf: &[u8]) -> Result<(i64, usize), VarintError> {
    let mut zigzag: u64 = 0;
    let mut shift = 0u32;

    for (i, &byte) in buf.iter().enumerate() {
        if i == MAX_VARINT_LEN {
            return Err(VarintError::Overflow);
        }
        if byte < 0x80 {
            if i == MAX_VARINT_LEN - 1 && byte > 1 {
                return Err(VarintError::Overflow);
            }
            zigzag |= u64::from(byte) << shift;
            #[allow(clippy::cast_possible_wrap)]
            let value = ((zigzag >> 1) as i64) ^ -((zigzag & 1) as i64);
            return Ok((value, i + 1));
        }
        zigzag |= u64::from(byte & 0x7f) << shift;
        shift += 7;
    }

    Err(VarintError::Truncated)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_values() {
        let mut buf = [0u8; MAX_VARINT_LEN];

        assert_eq!(encode(0, &mut buf), 1);
        assert_eq!(buf[0], 0);

        assert_eq!(encode(2, &mut buf), 1);
        assert_eq!(buf[0], 4);

        assert_eq!(encode(-1, &mut buf), 1);
        assert_eq!(buf[0], 1);
    }

    #[test]
    fn test_extremes() {
        let mut buf = [0u8; MAX_VARINT_LEN];
        for value in [i64::MIN, i64::MAX, -300, 300] {
            let written = encode(value, &mut buf);
            assert_eq!(decode(&buf[..written]), Ok((value, written)));
        }
        assert_eq!(encode(i64::MIN, &mut buf), MAX_VARINT_LEN);
    }

    #[test]
    fn test_trailing_padding_ignored() {
        let buf = [0x0e, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0xff];
        assert_eq!(decode(&buf), Ok((7, 1)));
    }

    #[test]
    fn test_truncated() {
        assert_eq!(decode(&[]), Err(VarintError::Truncated));
        assert_eq!(decode(&[0x80, 0x80]), Err(VarintError::Truncated));
    }

    #[test]
    fn test_overlong() {
        assert_eq!(decode(&[0xff; 11]), Err(VarintError::Overflow));
        let mut tenth_too_big = [0xff; MAX_VARINT_LEN];
        tenth_too_big[MAX_VARINT_LEN - 1] = 0x02;
        assert_eq!(decode(&tenth_too_big), Err(VarintError::Overflow));
    }
}
