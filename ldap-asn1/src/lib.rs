//! BER decoding engine for LDAP control values
//!
//! This crate provides the pieces shared by every control codec:
//!
//! - `ber`: TLV unit, length and value codecs, universal tags, `BerEncoder`
//! - `grammar`: state tables mapping (state, tag) to a transition
//! - `container`: mutable per-message parse context
//! - `decoder`: the driver loop feeding bytes through a container
//! - `stream`: async driver over `tokio::io::AsyncRead` (`tokio` feature)

pub mod ber;
pub mod config;
pub mod container;
pub mod decoder;
pub mod grammar;
#[cfg(feature = "tokio")]
pub mod stream;

pub use ber::{BerEncoder, BerLength, BerTag, BerTagClass, Tlv};
pub use config::DecoderConfig;
pub use container::{Asn1Container, ParseOutcome, ParseStack};
pub use decoder::{decode, decode_from_read, decode_with_config};
pub use grammar::{Decodable, Grammar, GrammarAction, GrammarBuilder, GrammarState, Transition};
pub use ldap_core::error::{
    DecodeError, DecodeResult, EncodeError, EncodeResult, LdapError, LdapResult,
};
#[cfg(feature = "tokio")]
pub use stream::decode_from_reader;
