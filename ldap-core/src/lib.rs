//! Core types and utilities for the LDAP control codec
//!
//! This crate provides the error taxonomy shared by the BER layer and the
//! control grammars, distinguished name validation, and byte dump helpers
//! used in diagnostics.

pub mod dn;
pub mod error;
pub mod hex;

pub use dn::{Ava, Dn, Rdn};
pub use error::{
    DecodeError, DecodeResult, EncodeError, EncodeResult, LdapError, LdapResult,
};
pub use hex::{dump_byte, dump_bytes};
