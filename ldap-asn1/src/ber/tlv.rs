//! Incrementally assembled TLV unit

use ldap_core::error::{DecodeError, DecodeResult};
use ldap_core::hex::dump_bytes;
use std::fmt;

use crate::ber::length::long_form_octets;
use crate::ber::types::BerTag;

/// Result of feeding one length byte to a `Tlv`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthProgress {
    /// More length bytes are expected
    More,
    /// The length is complete
    Done(usize),
}

/// One Tag-Length-Value triple read from a byte stream
///
/// The unit is built byte by byte so that a TLV may straddle any number of
/// input buffers: the tag first, then the length bytes, then the value
/// bytes. Constructed TLVs never collect a value; their content is the
/// sequence of child TLVs.
#[derive(Debug, Clone, Default)]
pub struct Tlv {
    tag: u8,
    length: usize,
    /// Long form length octets still expected
    pending_length_octets: usize,
    length_octets: usize,
    length_complete: bool,
    value: Vec<u8>,
}

impl Tlv {
    /// Start a new TLV from its tag byte
    pub fn read_tag(tag: u8) -> Self {
        Self {
            tag,
            ..Default::default()
        }
    }

    /// Feed one length byte
    ///
    /// # Error Handling
    /// Returns `MalformedLength` for the indefinite form (`0x80`), the
    /// reserved `0xFF` first octet, more than four subsequent octets, or a
    /// byte fed after the length was already complete.
    pub fn read_length(&mut self, byte: u8) -> DecodeResult<LengthProgress> {
        if self.length_complete {
            return Err(DecodeError::MalformedLength(format!(
                "Length of TLV 0x{:02X} is already complete",
                self.tag
            )));
        }

        self.length_octets += 1;

        if self.length_octets == 1 {
            match long_form_octets(byte)? {
                None => {
                    self.length = byte as usize;
                    self.length_complete = true;
                }
                Some(n) => self.pending_length_octets = n,
            }
        } else {
            self.length = (self.length << 8) | byte as usize;
            self.pending_length_octets -= 1;
            if self.pending_length_octets == 0 {
                self.length_complete = true;
            }
        }

        if self.length_complete {
            Ok(LengthProgress::Done(self.length))
        } else {
            Ok(LengthProgress::More)
        }
    }

    /// Append value bytes, never past the declared length
    ///
    /// # Returns
    /// The number of bytes taken from `data`
    pub fn read_value_bytes(&mut self, data: &[u8]) -> usize {
        let n = self.remaining_value().min(data.len());
        self.value.extend_from_slice(&data[..n]);
        n
    }

    /// Get the tag byte
    pub fn tag(&self) -> u8 {
        self.tag
    }

    /// Get the tag split into class, form and number
    pub fn ber_tag(&self) -> BerTag {
        BerTag::from_byte(self.tag)
    }

    /// Check whether the tag announces a constructed encoding
    pub fn is_constructed(&self) -> bool {
        self.ber_tag().is_constructed()
    }

    /// Declared value length (valid once the length is complete)
    pub fn length(&self) -> usize {
        self.length
    }

    /// Check whether all length bytes were read
    pub fn is_length_complete(&self) -> bool {
        self.length_complete
    }

    /// Tag byte plus length bytes read so far
    pub fn header_length(&self) -> usize {
        1 + self.length_octets
    }

    /// Value bytes collected so far
    pub fn value(&self) -> &[u8] {
        &self.value
    }

    /// Value bytes still expected
    pub fn remaining_value(&self) -> usize {
        if self.length_complete {
            self.length - self.value.len()
        } else {
            0
        }
    }

    /// Check whether the whole TLV has been read
    pub fn is_complete(&self) -> bool {
        self.length_complete && self.value.len() == self.length
    }
}

impl fmt::Display for Tlv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TLV[tag=0x{:02X}, length={}", self.tag, self.length)?;
        if !self.value.is_empty() {
            write!(f, ", value={}", dump_bytes(&self.value))?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_form_length() {
        let mut tlv = Tlv::read_tag(0x04);
        assert_eq!(tlv.read_length(0x03).unwrap(), LengthProgress::Done(3));
        assert_eq!(tlv.header_length(), 2);
        assert_eq!(tlv.remaining_value(), 3);
        assert!(!tlv.is_complete());
    }

    #[test]
    fn test_long_form_length_across_calls() {
        let mut tlv = Tlv::read_tag(0x04);
        assert_eq!(tlv.read_length(0x82).unwrap(), LengthProgress::More);
        assert_eq!(tlv.read_length(0x01).unwrap(), LengthProgress::More);
        assert_eq!(tlv.read_length(0x2C).unwrap(), LengthProgress::Done(300));
        assert_eq!(tlv.header_length(), 4);
        assert!(tlv.read_length(0x00).is_err());
    }

    #[test]
    fn test_malformed_lengths() {
        for first in [0x80, 0xFF, 0x85] {
            let mut tlv = Tlv::read_tag(0x04);
            assert!(matches!(
                tlv.read_length(first),
                Err(DecodeError::MalformedLength(_))
            ));
        }
    }

    #[test]
    fn test_value_in_pieces() {
        let mut tlv = Tlv::read_tag(0x04);
        tlv.read_length(0x03).unwrap();
        assert_eq!(tlv.read_value_bytes(b"a"), 1);
        assert!(!tlv.is_complete());
        assert_eq!(tlv.read_value_bytes(b"bcdef"), 2);
        assert!(tlv.is_complete());
        assert_eq!(tlv.value(), b"abc");
        assert_eq!(tlv.to_string(), "TLV[tag=0x04, length=3, value=0x61 0x62 0x63]");
    }

    #[test]
    fn test_empty_value_is_complete() {
        let mut tlv = Tlv::read_tag(0x04);
        tlv.read_length(0x00).unwrap();
        assert!(tlv.is_complete());
        assert!(!tlv.is_constructed());
        assert!(Tlv::read_tag(0x30).is_constructed());
    }
}
