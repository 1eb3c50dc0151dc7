/*
    ALICE-ISO8583
    Copyright (C) 2026 Moroya Sakamoto
*/

//! Conversions between hexadecimal strings and bit sequences.
//!
//! ISO 8583 bitmaps travel on the wire as hexadecimal text: each hex digit
//! carries four bits, most-significant bit first. This module provides the
//! pure conversion functions used by the bitmap engine and the codec paths,
//! in two parallel forms:
//!
//! - **bit arrays** — `&[u8]` / `Vec<u8>` whose elements are `0` or `1`
//! - **bit strings** — `&str` / `String` of `'0'` / `'1'` characters
//!
//! Hex input is accepted as ASCII bytes in either case (`a-f` / `A-F`);
//! hex output is always lowercase.
//!
//! All functions are stateless and total over well-formed input; malformed
//! input is reported through [`BitConvError`].

use thiserror::Error;

/// Errors from hex/bit conversions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BitConvError {
    /// A byte in the hex input is not a hexadecimal digit.
    #[error("invalid hex character: {0:?}")]
    InvalidCharacter(char),
    /// The bit sequence length is not a valid multiple for hex conversion.
    #[error("invalid bit length: {0}")]
    InvalidBitLength(usize),
    /// A bit-array element is neither 0 nor 1.
    #[error("invalid bit value at index {index}: {value}")]
    InvalidBitValue {
        /// Position of the offending element.
        index: usize,
        /// The value found there.
        value: u8,
    },
}

/// Decode one ASCII hex digit to its 4-bit value.
#[inline(always)]
fn hex_digit(b: u8) -> Result<u8, BitConvError> {
    match b {
        b'0'..=b'9' => Ok(b - b'0'),
        b'a'..=b'f' => Ok(b - b'a' + 10),
        b'A'..=b'F' => Ok(b - b'A' + 10),
        _ => Err(BitConvError::InvalidCharacter(b as char)),
    }
}

/// Encode a 4-bit value as a lowercase ASCII hex digit.
#[inline(always)]
fn hex_char(nibble: u8) -> u8 {
    if nibble < 10 {
        b'0' + nibble
    } else {
        b'a' + (nibble - 10)
    }
}

/// Expand a hex string into a bit array (one `0`/`1` element per bit).
///
/// Each hex digit yields four elements, most-significant bit first:
/// `b"1f"` becomes `[0, 0, 0, 1, 1, 1, 1, 1]`.
pub fn hex_to_bit_array(hex: &[u8]) -> Result<Vec<u8>, BitConvError> {
    let mut bits = Vec::with_capacity(hex.len() * 4);
    for &b in hex {
        let value = hex_digit(b)?;
        bits.push((value >> 3) & 1);
        bits.push((value >> 2) & 1);
        bits.push((value >> 1) & 1);
        bits.push(value & 1);
    }
    Ok(bits)
}

/// Expand a hex string into a bit string of `'0'`/`'1'` characters.
///
/// Same expansion as [`hex_to_bit_array`] in character form:
/// `b"1fa3"` becomes `"0001111110100011"`.
pub fn hex_to_bit_string(hex: &[u8]) -> Result<String, BitConvError> {
    let mut bits = String::with_capacity(hex.len() * 4);
    for &b in hex {
        let value = hex_digit(b)?;
        for shift in (0..4).rev() {
            bits.push(if (value >> shift) & 1 == 1 { '1' } else { '0' });
        }
    }
    Ok(bits)
}

/// Collapse a bit array into a lowercase hex string.
///
/// The array length must be a multiple of 8: wire bitmaps are always whole
/// bytes, i.e. nibbles come in pairs. Fails with
/// [`BitConvError::InvalidBitLength`] otherwise, and with
/// [`BitConvError::InvalidBitValue`] on any element that is not 0 or 1.
pub fn bit_array_to_hex(bits: &[u8]) -> Result<String, BitConvError> {
    if bits.len() % 8 != 0 {
        return Err(BitConvError::InvalidBitLength(bits.len()));
    }

    let mut hex = String::with_capacity(bits.len() / 4);
    for (chunk_index, chunk) in bits.chunks_exact(4).enumerate() {
        let mut nibble: u8 = 0;
        for (offset, &bit) in chunk.iter().enumerate() {
            if bit > 1 {
                return Err(BitConvError::InvalidBitValue {
                    index: chunk_index * 4 + offset,
                    value: bit,
                });
            }
            nibble = (nibble << 1) | bit;
        }
        hex.push(hex_char(nibble) as char);
    }

    Ok(hex)
}

/// Collapse a bit string of `'0'`/`'1'` characters into a lowercase hex string.
///
/// The string length must be a multiple of 4 (whole nibbles). Fails with
/// [`BitConvError::InvalidBitLength`] otherwise, and with
/// [`BitConvError::InvalidBitValue`] on any character that is not `'0'`/`'1'`.
pub fn bit_string_to_hex(bits: &str) -> Result<String, BitConvError> {
    let bytes = bits.as_bytes();
    if bytes.len() % 4 != 0 {
        return Err(BitConvError::InvalidBitLength(bytes.len()));
    }

    let mut hex = String::with_capacity(bytes.len() / 4);
    for (chunk_index, chunk) in bytes.chunks_exact(4).enumerate() {
        let mut nibble: u8 = 0;
        for (offset, &ch) in chunk.iter().enumerate() {
            if ch != b'0' && ch != b'1' {
                return Err(BitConvError::InvalidBitValue {
                    index: chunk_index * 4 + offset,
                    value: ch,
                });
            }
            nibble = (nibble << 1) | (ch - b'0');
        }
        hex.push(hex_char(nibble) as char);
    }

    Ok(hex)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_to_bit_array_known_value() {
        let bits = hex_to_bit_array(b"1f").expect("valid hex");
        assert_eq!(bits, vec![0, 0, 0, 1, 1, 1, 1, 1]);
    }

    #[test]
    fn test_hex_to_bit_string_known_value() {
        let bits = hex_to_bit_string(b"1fa3").expect("valid hex");
        assert_eq!(bits, "0001111110100011");
    }

    #[test]
    fn test_hex_to_bit_array_uppercase() {
        assert_eq!(
            hex_to_bit_array(b"A0").expect("valid hex"),
            vec![1, 0, 1, 0, 0, 0, 0, 0],
        );
    }

    #[test]
    fn test_hex_to_bit_array_invalid_character() {
        assert_eq!(
            hex_to_bit_array(b"12g4"),
            Err(BitConvError::InvalidCharacter('g')),
        );
    }

    #[test]
    fn test_hex_to_bit_string_invalid_character() {
        assert_eq!(
            hex_to_bit_string(b"zz"),
            Err(BitConvError::InvalidCharacter('z')),
        );
    }

    #[test]
    fn test_bit_array_to_hex_known_value() {
        let hex = bit_array_to_hex(&[0, 0, 0, 1, 1, 1, 1, 1]).expect("valid bits");
        assert_eq!(hex, "1f");
    }

    #[test]
    fn test_bit_array_to_hex_rejects_partial_bytes() {
        // Four bits is a whole nibble but not a whole byte.
        assert_eq!(
            bit_array_to_hex(&[1, 0, 1, 0]),
            Err(BitConvError::InvalidBitLength(4)),
        );
        assert_eq!(
            bit_array_to_hex(&[1, 0, 1]),
            Err(BitConvError::InvalidBitLength(3)),
        );
    }

    #[test]
    fn test_bit_array_to_hex_invalid_bit_value() {
        let mut bits = vec![0u8; 8];
        bits[5] = 2;
        assert_eq!(
            bit_array_to_hex(&bits),
            Err(BitConvError::InvalidBitValue { index: 5, value: 2 }),
        );
    }

    #[test]
    fn test_bit_string_to_hex_known_value() {
        let hex = bit_string_to_hex("0001111110100011").expect("valid bits");
        assert_eq!(hex, "1fa3");
    }

    #[test]
    fn test_bit_string_to_hex_accepts_single_nibble() {
        // The string form only requires whole nibbles, not whole bytes.
        assert_eq!(bit_string_to_hex("1010").expect("valid bits"), "a");
    }

    #[test]
    fn test_bit_string_to_hex_rejects_partial_nibble() {
        assert_eq!(
            bit_string_to_hex("10110"),
            Err(BitConvError::InvalidBitLength(5)),
        );
    }

    #[test]
    fn test_bit_string_to_hex_invalid_character() {
        assert_eq!(
            bit_string_to_hex("1012"),
            Err(BitConvError::InvalidBitValue { index: 3, value: b'2' }),
        );
    }

    #[test]
    fn test_roundtrip_array_form() {
        let hex = "bf38404109e30000";
        let bits = hex_to_bit_array(hex.as_bytes()).expect("valid hex");
        assert_eq!(bits.len(), 64);
        assert_eq!(bit_array_to_hex(&bits).expect("valid bits"), hex);
    }

    #[test]
    fn test_roundtrip_string_form() {
        let hex = "8000000000000001";
        let bits = hex_to_bit_string(hex.as_bytes()).expect("valid hex");
        assert_eq!(bit_string_to_hex(&bits).expect("valid bits"), hex);
    }

    #[test]
    fn test_roundtrip_normalizes_case() {
        let bits = hex_to_bit_array(b"ABCDEF12").expect("valid hex");
        assert_eq!(bit_array_to_hex(&bits).expect("valid bits"), "abcdef12");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(hex_to_bit_array(b"").expect("empty is valid"), Vec::<u8>::new());
        assert_eq!(bit_array_to_hex(&[]).expect("empty is valid"), "");
        assert_eq!(bit_string_to_hex("").expect("empty is valid"), "");
    }
}
