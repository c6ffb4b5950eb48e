use bytes::{Bytes, BytesMut};
use ldap_asn1::ber::length::tlv_length;
use ldap_asn1::ber::value::nb_integer_bytes;
use ldap_asn1::BerEncoder;
use ldap_core::error::{EncodeError, EncodeResult};
use ldap_core::hex::dump_bytes;
use std::fmt;

use crate::{encode_value, Control, SYNC_REQUEST_OID};

/// Synchronization mode requested by the client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum SynchronizationModes {
    /// Unused
    #[default]
    Unused = 0,
    /// refreshOnly
    RefreshOnly = 1,
    /// Reserved
    Reserved = 2,
    /// refreshAndPersist
    RefreshAndPersist = 3,
}

impl SynchronizationModes {
    /// Create from the ENUMERATED value
    pub fn from_value(value: i32) -> Option<Self> {
        match value {
            0 => Some(Self::Unused),
            1 => Some(Self::RefreshOnly),
            2 => Some(Self::Reserved),
            3 => Some(Self::RefreshAndPersist),
            _ => None,
        }
    }

    /// Get the ENUMERATED value
    pub fn value(self) -> i32 {
        self as i32
    }
}

/// SyncRequestValue control
///
/// `mode` is mandatory; `cookie` is only encoded when present and
/// `reload_hint` only when true.
#[derive(Debug, Clone, Default)]
pub struct SyncRequestValueControl {
    mode: SynchronizationModes,
    cookie: Option<Vec<u8>>,
    reload_hint: bool,
    /// Length of the SEQUENCE content, set by `compute_length`
    seq_length: Option<usize>,
    value: Option<Bytes>,
}

impl SyncRequestValueControl {
    /// Create a control with the given mode, no cookie and no reload hint
    pub fn new(mode: SynchronizationModes) -> Self {
        Self {
            mode,
            ..Default::default()
        }
    }

    /// Get the synchronization mode
    pub fn mode(&self) -> SynchronizationModes {
        self.mode
    }

    /// Set the synchronization mode
    pub fn set_mode(&mut self, mode: SynchronizationModes) {
        self.mode = mode;
        self.invalidate();
    }

    /// Get the cookie
    pub fn cookie(&self) -> Option<&[u8]> {
        self.cookie.as_deref()
    }

    /// Set the cookie
    pub fn set_cookie(&mut self, cookie: Option<Vec<u8>>) {
        self.cookie = cookie;
        self.invalidate();
    }

    /// Get the reload hint
    pub fn reload_hint(&self) -> bool {
        self.reload_hint
    }

    /// Set the reload hint
    pub fn set_reload_hint(&mut self, reload_hint: bool) {
        self.reload_hint = reload_hint;
        self.invalidate();
    }

    /// Multi-line description for diagnostics
    pub fn describe(&self) -> String {
        self.to_string()
    }

    fn invalidate(&mut self) {
        self.seq_length = None;
        self.value = None;
    }
}

impl Control for SyncRequestValueControl {
    fn oid(&self) -> &'static str {
        SYNC_REQUEST_OID
    }

    fn compute_length(&mut self) -> usize {
        let mut seq_length = tlv_length(nb_integer_bytes(self.mode.value() as i64));
        if let Some(cookie) = &self.cookie {
            seq_length += tlv_length(cookie.len());
        }
        if self.reload_hint {
            seq_length += tlv_length(1);
        }

        self.seq_length = Some(seq_length);
        tlv_length(seq_length)
    }

    fn encode(&self, buffer: &mut BytesMut) -> EncodeResult<()> {
        let seq_length = self.seq_length.ok_or(EncodeError::LengthNotComputed)?;

        let mut encoder = BerEncoder::new(buffer);
        encoder.encode_sequence_header(seq_length);
        encoder.encode_enumerated(self.mode.value() as i64);
        if let Some(cookie) = &self.cookie {
            encoder.encode_octet_string(cookie);
        }
        if self.reload_hint {
            encoder.encode_boolean(true);
        }

        let expected = tlv_length(seq_length);
        if encoder.written() != expected {
            return Err(EncodeError::LengthMismatch {
                expected,
                actual: encoder.written(),
            });
        }
        Ok(())
    }

    fn try_value(&mut self) -> EncodeResult<Bytes> {
        if let Some(value) = &self.value {
            return Ok(value.clone());
        }
        let value = encode_value(self)?;
        self.value = Some(value.clone());
        Ok(value)
    }
}

impl PartialEq for SyncRequestValueControl {
    fn eq(&self, other: &Self) -> bool {
        self.mode == other.mode
            && self.cookie == other.cookie
            && self.reload_hint == other.reload_hint
    }
}

impl Eq for SyncRequestValueControl {}

impl fmt::Display for SyncRequestValueControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "SyncRequestValue control :")?;
        writeln!(f, "    oid : {}", SYNC_REQUEST_OID)?;
        writeln!(f, "    mode : {:?}", self.mode)?;
        match &self.cookie {
            Some(cookie) => writeln!(f, "    cookie : '{}'", dump_bytes(cookie))?,
            None => writeln!(f, "    cookie : none")?,
        }
        write!(f, "    reloadHint : {}", self.reload_hint)
    }
}
