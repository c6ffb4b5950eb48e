//! BER encoder for LDAP control values
//!
//! # Usage Example
//!
//! ```rust,no_run
//! use bytes::BytesMut;
//! use ldap_asn1::ber::BerEncoder;
//!
//! let mut buf = BytesMut::new();
//! let mut encoder = BerEncoder::new(&mut buf);
//! encoder.encode_sequence_header(3);
//! encoder.encode_enumerated(1);
//! ```

use bytes::{BufMut, BytesMut};

use crate::ber::length::BerLength;
use crate::ber::types::{
    BOOLEAN_TAG, ENUMERATED_TAG, INTEGER_TAG, OCTET_STRING_TAG, SEQUENCE_TAG, SET_TAG,
};
use crate::ber::value::{encode_boolean, integer_bytes};

/// BER encoder writing TLVs into a caller owned buffer
///
/// Constructed values are written header first: the caller computes the
/// content length up front (see each control's `compute_length`) and then
/// encodes the children in order. Nothing is patched afterwards.
pub struct BerEncoder<'a> {
    buffer: &'a mut BytesMut,
    start: usize,
}

impl<'a> BerEncoder<'a> {
    /// Create a new BER encoder appending to `buffer`
    pub fn new(buffer: &'a mut BytesMut) -> Self {
        let start = buffer.len();
        Self { buffer, start }
    }

    /// Write a tag and a length
    pub fn encode_header(&mut self, tag: u8, length: usize) {
        self.buffer.put_u8(tag);
        BerLength::new(length).write(self.buffer);
    }

    /// Encode a TLV (Tag-Length-Value) triplet
    pub fn encode_tlv(&mut self, tag: u8, value: &[u8]) {
        self.encode_header(tag, value.len());
        self.buffer.put_slice(value);
    }

    /// Encode a BOOLEAN (`0xFF` for true, `0x00` for false)
    pub fn encode_boolean(&mut self, value: bool) {
        self.encode_tlv(BOOLEAN_TAG, &[encode_boolean(value)]);
    }

    /// Encode an INTEGER in its minimal two's complement form
    pub fn encode_integer(&mut self, value: i64) {
        self.encode_tlv(INTEGER_TAG, &integer_bytes(value));
    }

    /// Encode an ENUMERATED in its minimal two's complement form
    pub fn encode_enumerated(&mut self, value: i64) {
        self.encode_tlv(ENUMERATED_TAG, &integer_bytes(value));
    }

    /// Encode an OCTET STRING
    pub fn encode_octet_string(&mut self, value: &[u8]) {
        self.encode_tlv(OCTET_STRING_TAG, value);
    }

    /// Write a SEQUENCE header for `length` bytes of content
    pub fn encode_sequence_header(&mut self, length: usize) {
        self.encode_header(SEQUENCE_TAG, length);
    }

    /// Write a SET header for `length` bytes of content
    pub fn encode_set_header(&mut self, length: usize) {
        self.encode_header(SET_TAG, length);
    }

    /// Number of bytes written through this encoder
    pub fn written(&self) -> usize {
        self.buffer.len() - self.start
    }
}
