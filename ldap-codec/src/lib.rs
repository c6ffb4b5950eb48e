//! ldap-codec - BER codec for LDAP control values
//!
//! This library decodes and encodes the `controlValue` of LDAP controls with
//! a table-driven state machine over BER TLVs. Input may arrive in any number
//! of pieces; the decoder keeps its state between them.
//!
//! # Architecture
//!
//! This library is organized as a workspace with multiple crates:
//!
//! - `ldap-core`: Error taxonomy, DN validation, hex dumps
//! - `ldap-asn1`: TLV unit, value codec, grammar engine, decode container, drivers
//! - `ldap-controls`: SyncRequestValue, EntryChangeNotification and SyncInfoValue
//!
//! # Usage
//!
//! ```no_run
//! use ldap_codec::{decode, Control, SyncRequestValueControl, SynchronizationModes};
//!
//! let mut control = SyncRequestValueControl::new(SynchronizationModes::RefreshAndPersist);
//! control.set_cookie(Some(b"abc".to_vec()));
//! let value = control.get_value().unwrap();
//!
//! let decoded: SyncRequestValueControl = decode(&value).unwrap();
//! assert_eq!(decoded, control);
//! ```

// Re-export core types
pub use ldap_core::{
    DecodeError, DecodeResult, Dn, EncodeError, EncodeResult, LdapError, LdapResult,
};

// Re-export the decoding engine
pub use ldap_asn1::{
    decode, decode_from_read, decode_from_reader, decode_with_config, Asn1Container,
    Decodable, DecoderConfig, ParseOutcome,
};

// Re-export controls
pub use ldap_controls::{
    ChangeType, Control, EntryChangeControl, SyncInfoValueControl, SyncRequestValueControl,
    SynchronizationInfo, SynchronizationModes, ENTRY_CHANGE_OID, SYNC_INFO_OID,
    SYNC_REQUEST_OID,
};

pub mod ber {
    pub use ldap_asn1::ber::*;
}

pub mod grammar {
    pub use ldap_asn1::grammar::*;
}
