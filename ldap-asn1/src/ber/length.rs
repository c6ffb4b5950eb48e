//! BER length encoding

use bytes::{BufMut, BytesMut};
use ldap_core::error::{DecodeError, DecodeResult};

/// Maximum number of subsequent octets in a long form length
pub const MAX_LENGTH_OCTETS: usize = 4;

/// BER Length encoding
///
/// - **Short form**: For lengths 0-127 (1 byte)
/// - **Long form**: For lengths > 127, first byte `0x80 | n` followed by
///   the `n` byte big-endian length, using as few bytes as possible
///
/// ```text
/// Short form:  0 L L L L L L L
/// Long form:   1 N N N N N N N  L L L L L L L L ...
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BerLength {
    /// Short form: length 0-127
    Short(u8),
    /// Long form: length > 127, encoded with length-of-length
    Long(usize),
}

impl BerLength {
    /// Create a new BER length, choosing the short or long form
    pub fn new(length: usize) -> Self {
        if length < 128 {
            BerLength::Short(length as u8)
        } else {
            BerLength::Long(length)
        }
    }

    /// Get the length value
    pub fn value(&self) -> usize {
        match self {
            BerLength::Short(l) => *l as usize,
            BerLength::Long(l) => *l,
        }
    }

    /// Number of bytes `encode` emits for this length
    pub fn encoded_len(&self) -> usize {
        match self {
            BerLength::Short(_) => 1,
            BerLength::Long(length) => 1 + significant_bytes(*length),
        }
    }

    /// Write the length to a buffer
    pub fn write(&self, buf: &mut BytesMut) {
        match self {
            BerLength::Short(length) => buf.put_u8(*length),
            BerLength::Long(length) => {
                let num_bytes = significant_bytes(*length);
                buf.put_u8(0x80 | num_bytes as u8);
                for i in (0..num_bytes).rev() {
                    buf.put_u8(((*length >> (i * 8)) & 0xFF) as u8);
                }
            }
        }
    }

    /// Encode length to bytes
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = BytesMut::with_capacity(self.encoded_len());
        self.write(&mut buf);
        buf.to_vec()
    }

    /// Decode a complete length from the start of `data`
    ///
    /// # Returns
    /// Returns `Ok((BerLength, bytes_consumed))` if successful
    ///
    /// # Error Handling
    /// Returns `MalformedLength` if the buffer is too short, the length uses
    /// the indefinite or reserved form, or it needs more than
    /// `MAX_LENGTH_OCTETS` subsequent octets.
    pub fn decode(data: &[u8]) -> DecodeResult<(Self, usize)> {
        let first_byte = *data.first().ok_or_else(|| {
            DecodeError::MalformedLength("Empty buffer for length decoding".to_string())
        })?;

        let num_bytes = match long_form_octets(first_byte)? {
            None => return Ok((BerLength::Short(first_byte), 1)),
            Some(n) => n,
        };

        if data.len() < 1 + num_bytes {
            return Err(DecodeError::MalformedLength(format!(
                "Buffer too short for long form length: need {} bytes, got {}",
                1 + num_bytes,
                data.len()
            )));
        }

        let length = data[1..=num_bytes]
            .iter()
            .fold(0usize, |acc, &b| (acc << 8) | b as usize);
        Ok((BerLength::new(length), 1 + num_bytes))
    }
}

/// Classify the first length octet
///
/// Returns `None` for the short form, or the number of subsequent octets
/// for the long form.
pub(crate) fn long_form_octets(first_byte: u8) -> DecodeResult<Option<usize>> {
    if first_byte & 0x80 == 0 {
        return Ok(None);
    }
    match first_byte {
        0x80 => Err(DecodeError::MalformedLength(
            "Indefinite length encoding not supported".to_string(),
        )),
        0xFF => Err(DecodeError::MalformedLength(
            "Reserved length octet 0xFF".to_string(),
        )),
        _ => {
            let num_bytes = (first_byte & 0x7F) as usize;
            if num_bytes > MAX_LENGTH_OCTETS {
                return Err(DecodeError::MalformedLength(format!(
                    "Length encoding too large: {} bytes (max {})",
                    num_bytes, MAX_LENGTH_OCTETS
                )));
            }
            Ok(Some(num_bytes))
        }
    }
}

fn significant_bytes(length: usize) -> usize {
    let bits = usize::BITS - length.leading_zeros();
    (bits as usize).div_ceil(8).max(1)
}

/// Number of bytes needed to encode `length` as a BER length
pub fn nb_bytes(length: usize) -> usize {
    BerLength::new(length).encoded_len()
}

/// Encode `length` as a BER length
pub fn encode_length(length: usize) -> Vec<u8> {
    BerLength::new(length).encode()
}

/// Total size of a TLV with a single byte tag and `value_length` value bytes
pub fn tlv_length(value_length: usize) -> usize {
    1 + nb_bytes(value_length) + value_length
}
