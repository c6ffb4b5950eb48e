//! LDAP control value codecs
//!
//! Each control is a typed value object paired with the grammar that decodes
//! its BER `controlValue`:
//!
//! - `sync_request`: SyncRequestValue (RFC 4533)
//! - `entry_change`: EntryChangeNotification (persistent search)
//! - `sync_info`: SyncInfoValue (RFC 4533 intermediate response)
//!
//! # Usage Example
//!
//! ```rust,ignore
//! use ldap_controls::{Control, SyncRequestValueControl, SynchronizationModes};
//!
//! let mut control = SyncRequestValueControl::new(SynchronizationModes::RefreshOnly);
//! control.set_cookie(Some(b"abc".to_vec()));
//! let value = control.get_value();
//!
//! let decoded: SyncRequestValueControl = ldap_asn1::decode(&value.unwrap())?;
//! ```

use bytes::{Bytes, BytesMut};
use ldap_asn1::Decodable;
use ldap_core::error::EncodeResult;

pub mod entry_change;
pub mod sync_info;
pub mod sync_request;

pub use entry_change::{ChangeType, EntryChangeControl};
pub use sync_info::{SyncInfoValueControl, SynchronizationInfo};
pub use sync_request::{SyncRequestValueControl, SynchronizationModes};

/// SyncRequestValue control OID
pub const SYNC_REQUEST_OID: &str = "1.3.6.1.4.1.4203.1.9.1.1";
/// EntryChangeNotification control OID
pub const ENTRY_CHANGE_OID: &str = "2.16.840.1.113730.3.4.7";
/// SyncInfoValue intermediate response OID
pub const SYNC_INFO_OID: &str = "1.3.6.1.4.1.4203.1.9.1.4";

/// Common interface of every control value
///
/// Encoding is two-pass: `compute_length` walks the fields bottom-up and
/// caches the lengths, then `encode` writes the TLVs header first. Any
/// setter invalidates the cached lengths and the cached value.
pub trait Control: Decodable {
    /// Control OID
    fn oid(&self) -> &'static str;

    /// Compute and cache the encoded lengths
    ///
    /// # Returns
    /// The length of the whole encoded control value
    fn compute_length(&mut self) -> usize;

    /// Encode the control value into `buffer`
    ///
    /// # Error Handling
    /// Returns `LengthNotComputed` if `compute_length` was not called since
    /// the last mutation.
    fn encode(&self, buffer: &mut BytesMut) -> EncodeResult<()>;

    /// Encode the control value, caching the result until the next mutation
    fn try_value(&mut self) -> EncodeResult<Bytes>;

    /// Encoded control value, or `None` if encoding failed
    ///
    /// The failure is only logged; use `try_value` to get the error.
    fn get_value(&mut self) -> Option<Bytes> {
        match self.try_value() {
            Ok(value) => Some(value),
            Err(e) => {
                log::warn!("{}: encoding failed, no value returned: {}", self.oid(), e);
                None
            }
        }
    }
}

/// Run both encoding passes into a fresh buffer
pub(crate) fn encode_value<C: Control>(control: &mut C) -> EncodeResult<Bytes> {
    let length = control.compute_length();
    let mut buffer = BytesMut::with_capacity(length);
    control.encode(&mut buffer)?;
    Ok(buffer.freeze())
}
