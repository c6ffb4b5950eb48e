//! BER (Basic Encoding Rules) primitives for LDAP control values
//!
//! Each ASN.1 value is encoded as a TLV (Tag-Length-Value) triplet:
//!
//! ```text
//! [Tag] [Length] [Value]
//! ```
//!
//! ## Tag Encoding
//!
//! ```text
//! Bits: 8 7 6 5 4 3 2 1
//!       C C P T T T T T
//! ```
//! Where:
//! - CC = Class (00=Universal, 01=Application, 10=Context, 11=Private)
//! - P = Primitive (0) or Constructed (1)
//! - TTTTT = Tag number (0-30); 11111 announces the high tag number form,
//!   which no LDAP control uses and which is rejected
//!
//! ## Length Encoding
//!
//! - **Short form** (1 byte): lengths 0-127, bit 7 = 0
//! - **Long form**: first byte `0x80 | n`, then `n` big-endian length bytes.
//!   `n` is limited to 4; `0x80` (indefinite) and `0xFF` (reserved) are
//!   malformed
//!
//! ## Value Encoding
//!
//! - BOOLEAN: one byte, `0x00` is false, anything else true; encoded as `0xFF`
//! - INTEGER / ENUMERATED: minimal big-endian two's complement
//! - OCTET STRING: raw bytes
//! - SEQUENCE / SET: concatenated child TLVs

pub mod encoder;
pub mod length;
pub mod tlv;
pub mod types;
pub mod value;

pub use encoder::BerEncoder;
pub use length::BerLength;
pub use tlv::{LengthProgress, Tlv};
pub use types::{BerTag, BerTagClass};
