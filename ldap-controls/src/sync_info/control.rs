use bytes::{Bytes, BytesMut};
use ldap_asn1::ber::length::tlv_length;
use ldap_asn1::BerEncoder;
use ldap_core::error::{EncodeError, EncodeResult};
use ldap_core::hex::dump_bytes;
use std::fmt;

use crate::{encode_value, Control, SYNC_INFO_OID};

/// Size of a syncUUID
pub const UUID_LENGTH: usize = 16;

/// The CHOICE arm carried by a SyncInfoValue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum SynchronizationInfo {
    /// `[0] newcookie`
    #[default]
    NewCookie = 0,
    /// `[1] refreshDelete`
    RefreshDelete = 1,
    /// `[2] refreshPresent`
    RefreshPresent = 2,
    /// `[3] syncIdSet`
    SyncIdSet = 3,
}

impl SynchronizationInfo {
    /// Context specific tag byte of the arm
    pub fn tag(self) -> u8 {
        match self {
            Self::NewCookie => 0x80,
            Self::RefreshDelete => 0xA1,
            Self::RefreshPresent => 0xA2,
            Self::SyncIdSet => 0xA3,
        }
    }
}

/// SyncInfoValue control
///
/// Which fields are encoded depends on the arm: `refresh_done` belongs to
/// refreshDelete and refreshPresent, `refresh_deletes` and `sync_uuids` to
/// syncIdSet, and newcookie carries nothing but the cookie.
#[derive(Debug, Clone)]
pub struct SyncInfoValueControl {
    info_type: SynchronizationInfo,
    cookie: Option<Vec<u8>>,
    refresh_done: bool,
    refresh_deletes: bool,
    sync_uuids: Vec<[u8; UUID_LENGTH]>,
    /// Length of the arm content, set by `compute_length`
    content_length: Option<usize>,
    value: Option<Bytes>,
}

impl Default for SyncInfoValueControl {
    fn default() -> Self {
        Self {
            info_type: SynchronizationInfo::default(),
            cookie: None,
            refresh_done: true,
            refresh_deletes: false,
            sync_uuids: Vec::new(),
            content_length: None,
            value: None,
        }
    }
}

impl SyncInfoValueControl {
    /// Create a control for the given arm with default field values
    pub fn new(info_type: SynchronizationInfo) -> Self {
        Self {
            info_type,
            ..Default::default()
        }
    }

    /// Get the CHOICE arm
    pub fn info_type(&self) -> SynchronizationInfo {
        self.info_type
    }

    /// Set the CHOICE arm
    pub fn set_info_type(&mut self, info_type: SynchronizationInfo) {
        self.info_type = info_type;
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

    /// Get the refreshDone flag
    pub fn refresh_done(&self) -> bool {
        self.refresh_done
    }

    /// Set the refreshDone flag
    pub fn set_refresh_done(&mut self, refresh_done: bool) {
        self.refresh_done = refresh_done;
        self.invalidate();
    }

    /// Get the refreshDeletes flag
    pub fn refresh_deletes(&self) -> bool {
        self.refresh_deletes
    }

    /// Set the refreshDeletes flag
    pub fn set_refresh_deletes(&mut self, refresh_deletes: bool) {
        self.refresh_deletes = refresh_deletes;
        self.invalidate();
    }

    /// Get the syncUUIDs
    pub fn sync_uuids(&self) -> &[[u8; UUID_LENGTH]] {
        &self.sync_uuids
    }

    /// Append a syncUUID
    pub fn add_sync_uuid(&mut self, uuid: [u8; UUID_LENGTH]) {
        self.sync_uuids.push(uuid);
        self.invalidate();
    }

    /// Replace the syncUUIDs
    pub fn set_sync_uuids(&mut self, sync_uuids: Vec<[u8; UUID_LENGTH]>) {
        self.sync_uuids = sync_uuids;
        self.invalidate();
    }

    /// Multi-line description for diagnostics
    pub fn describe(&self) -> String {
        self.to_string()
    }

    fn invalidate(&mut self) {
        self.content_length = None;
        self.value = None;
    }

    fn cookie_length(&self) -> usize {
        self.cookie.as_ref().map_or(0, |cookie| tlv_length(cookie.len()))
    }

    fn uuid_set_length(&self) -> usize {
        self.sync_uuids.len() * tlv_length(UUID_LENGTH)
    }
}

impl Control for SyncInfoValueControl {
    fn oid(&self) -> &'static str {
        SYNC_INFO_OID
    }

    fn compute_length(&mut self) -> usize {
        let content_length = match self.info_type {
            SynchronizationInfo::NewCookie => self.cookie.as_ref().map_or(0, Vec::len),
            SynchronizationInfo::RefreshDelete | SynchronizationInfo::RefreshPresent => {
                let mut length = self.cookie_length();
                if !self.refresh_done {
                    length += tlv_length(1);
                }
                length
            }
            SynchronizationInfo::SyncIdSet => {
                let mut length = self.cookie_length();
                if self.refresh_deletes {
                    length += tlv_length(1);
                }
                length + tlv_length(self.uuid_set_length())
            }
        };

        self.content_length = Some(content_length);
        tlv_length(content_length)
    }

    fn encode(&self, buffer: &mut BytesMut) -> EncodeResult<()> {
        let content_length = self.content_length.ok_or(EncodeError::LengthNotComputed)?;

        let mut encoder = BerEncoder::new(buffer);
        match self.info_type {
            SynchronizationInfo::NewCookie => {
                let cookie = self.cookie.as_ref().ok_or(EncodeError::MissingField("cookie"))?;
                encoder.encode_tlv(self.info_type.tag(), cookie);
            }
            SynchronizationInfo::RefreshDelete | SynchronizationInfo::RefreshPresent => {
                encoder.encode_header(self.info_type.tag(), content_length);
                if let Some(cookie) = &self.cookie {
                    encoder.encode_octet_string(cookie);
                }
                if !self.refresh_done {
                    encoder.encode_boolean(false);
                }
            }
            SynchronizationInfo::SyncIdSet => {
                encoder.encode_header(self.info_type.tag(), content_length);
                if let Some(cookie) = &self.cookie {
                    encoder.encode_octet_string(cookie);
                }
                if self.refresh_deletes {
                    encoder.encode_boolean(true);
                }
                encoder.encode_set_header(self.uuid_set_length());
                for uuid in &self.sync_uuids {
                    encoder.encode_octet_string(uuid);
                }
            }
        }

        let expected = tlv_length(content_length);
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

impl PartialEq for SyncInfoValueControl {
    fn eq(&self, other: &Self) -> bool {
        self.info_type == other.info_type
            && self.cookie == other.cookie
            && self.refresh_done == other.refresh_done
            && self.refresh_deletes == other.refresh_deletes
            && self.sync_uuids == other.sync_uuids
    }
}

impl Eq for SyncInfoValueControl {}

impl fmt::Display for SyncInfoValueControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "SyncInfoValue control :")?;
        writeln!(f, "    oid : {}", SYNC_INFO_OID)?;
        write!(f, "    type : {:?}", self.info_type)?;
        if let Some(cookie) = &self.cookie {
            write!(f, "\n    cookie : '{}'", dump_bytes(cookie))?;
        }

        match self.info_type {
            SynchronizationInfo::NewCookie => Ok(()),
            SynchronizationInfo::RefreshDelete | SynchronizationInfo::RefreshPresent => {
                write!(f, "\n    refreshDone : {}", self.refresh_done)
            }
            SynchronizationInfo::SyncIdSet => {
                write!(f, "\n    refreshDeletes : {}", self.refresh_deletes)?;
                write!(f, "\n    syncUUIDs :")?;
                for uuid in &self.sync_uuids {
                    write!(f, "\n        {}", dump_bytes(uuid))?;
                }
                Ok(())
            }
        }
    }
}
