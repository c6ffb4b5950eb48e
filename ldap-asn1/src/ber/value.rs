//! Conversions between BER value bytes and typed values
//!
//! Decoding is permissive where BER is (any nonzero boolean is true,
//! non-minimal integers are accepted); encoding is always canonical.

use ldap_core::error::{DecodeError, DecodeResult};

/// Canonical encoding of TRUE
pub const TRUE_VALUE: u8 = 0xFF;
/// Canonical encoding of FALSE
pub const FALSE_VALUE: u8 = 0x00;

/// Decode a BOOLEAN value
///
/// # Error Handling
/// Returns `InvalidBooleanLength` unless exactly one byte is given.
pub fn decode_boolean(bytes: &[u8]) -> DecodeResult<bool> {
    match bytes {
        [b] => Ok(*b != FALSE_VALUE),
        _ => Err(DecodeError::InvalidBooleanLength(bytes.len())),
    }
}

/// Encode a BOOLEAN value (DER form, `0x00` or `0xFF`)
pub fn encode_boolean(value: bool) -> u8 {
    if value { TRUE_VALUE } else { FALSE_VALUE }
}

/// Sign extending big-endian two's complement decode, at most `max_bytes`
fn decode_twos_complement(bytes: &[u8], max_bytes: usize) -> DecodeResult<i64> {
    if bytes.is_empty() {
        return Err(DecodeError::InvalidIntegerEncoding(
            "Empty integer encoding".to_string(),
        ));
    }

    if bytes.len() > max_bytes {
        return Err(DecodeError::InvalidIntegerEncoding(format!(
            "Integer too large: {} bytes (max {})",
            bytes.len(),
            max_bytes
        )));
    }

    let mut value = 0i64;
    for &byte in bytes {
        value = (value << 8) | byte as i64;
    }

    if bytes[0] & 0x80 != 0 && bytes.len() < 8 {
        let shift = 64 - bytes.len() * 8;
        value = (value << shift) >> shift;
    }

    Ok(value)
}

/// Decode an INTEGER or ENUMERATED value into an `i32`
///
/// # Arguments
/// * `bytes` - Value bytes, big-endian two's complement, 1 to 4 bytes
/// * `min` - Smallest accepted value
/// * `max` - Largest accepted value
///
/// # Error Handling
/// Returns `InvalidIntegerEncoding` on empty or oversized input and
/// `IntegerOutOfRange` if the value is outside `[min, max]`.
pub fn decode_integer(bytes: &[u8], min: i32, max: i32) -> DecodeResult<i32> {
    let value = decode_twos_complement(bytes, 4)?;
    if value < min as i64 || value > max as i64 {
        return Err(DecodeError::IntegerOutOfRange {
            value,
            min: min as i64,
            max: max as i64,
        });
    }
    Ok(value as i32)
}

/// Decode an INTEGER value into an `i64`, 1 to 8 bytes, without range check
pub fn decode_long(bytes: &[u8]) -> DecodeResult<i64> {
    decode_twos_complement(bytes, 8)
}

/// Minimal big-endian two's complement encoding of `value`
pub fn integer_bytes(value: i64) -> Vec<u8> {
    let len = nb_integer_bytes(value);
    value.to_be_bytes()[8 - len..].to_vec()
}

/// Number of bytes `integer_bytes` emits for `value`
pub fn nb_integer_bytes(value: i64) -> usize {
    // Redundant sign bits: leading zeros for positives, leading ones for negatives
    let redundant = if value < 0 {
        value.leading_ones()
    } else {
        value.leading_zeros()
    };
    let significant = 64 - redundant + 1;
    (significant as usize).div_ceil(8).clamp(1, 8)
}
