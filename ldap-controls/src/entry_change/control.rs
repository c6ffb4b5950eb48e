use bytes::{Bytes, BytesMut};
use ldap_asn1::ber::length::tlv_length;
use ldap_asn1::ber::value::nb_integer_bytes;
use ldap_asn1::BerEncoder;
use ldap_core::dn::Dn;
use ldap_core::error::{EncodeError, EncodeResult};
use std::fmt;

use crate::{encode_value, Control, ENTRY_CHANGE_OID};

/// Kind of change reported for an entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum ChangeType {
    /// Entry added
    #[default]
    Add = 1,
    /// Entry deleted
    Delete = 2,
    /// Entry modified
    Modify = 4,
    /// Entry renamed or moved
    ModDn = 8,
}

impl ChangeType {
    /// Create from the ENUMERATED value
    pub fn from_value(value: i32) -> Option<Self> {
        match value {
            1 => Some(Self::Add),
            2 => Some(Self::Delete),
            4 => Some(Self::Modify),
            8 => Some(Self::ModDn),
            _ => None,
        }
    }

    /// Get the ENUMERATED value
    pub fn value(self) -> i32 {
        self as i32
    }
}

/// EntryChangeNotification control
#[derive(Debug, Clone, Default)]
pub struct EntryChangeControl {
    change_type: ChangeType,
    previous_dn: Option<Dn>,
    change_number: Option<i64>,
    seq_length: Option<usize>,
    value: Option<Bytes>,
}

impl EntryChangeControl {
    /// Create a control for the given change type
    pub fn new(change_type: ChangeType) -> Self {
        Self {
            change_type,
            ..Default::default()
        }
    }

    /// Get the change type
    pub fn change_type(&self) -> ChangeType {
        self.change_type
    }

    /// Set the change type
    pub fn set_change_type(&mut self, change_type: ChangeType) {
        self.change_type = change_type;
        self.invalidate();
    }

    /// Get the DN the entry had before a modDN
    pub fn previous_dn(&self) -> Option<&Dn> {
        self.previous_dn.as_ref()
    }

    /// Set the previous DN; only encodable with `ChangeType::ModDn`
    pub fn set_previous_dn(&mut self, previous_dn: Option<Dn>) {
        self.previous_dn = previous_dn;
        self.invalidate();
    }

    /// Get the change number
    pub fn change_number(&self) -> Option<i64> {
        self.change_number
    }

    /// Set the change number
    pub fn set_change_number(&mut self, change_number: Option<i64>) {
        self.change_number = change_number;
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

impl Control for EntryChangeControl {
    fn oid(&self) -> &'static str {
        ENTRY_CHANGE_OID
    }

    fn compute_length(&mut self) -> usize {
        let mut seq_length = tlv_length(nb_integer_bytes(self.change_type.value() as i64));
        if let Some(dn) = &self.previous_dn {
            seq_length += tlv_length(dn.as_bytes().len());
        }
        if let Some(change_number) = self.change_number {
            seq_length += tlv_length(nb_integer_bytes(change_number));
        }

        self.seq_length = Some(seq_length);
        tlv_length(seq_length)
    }

    fn encode(&self, buffer: &mut BytesMut) -> EncodeResult<()> {
        let seq_length = self.seq_length.ok_or(EncodeError::LengthNotComputed)?;
        if self.previous_dn.is_some() && self.change_type != ChangeType::ModDn {
            return Err(EncodeError::InvalidField {
                field: "previousDN",
                reason: format!("not allowed with changeType {:?}", self.change_type),
            });
        }

        let mut encoder = BerEncoder::new(buffer);
        encoder.encode_sequence_header(seq_length);
        encoder.encode_enumerated(self.change_type.value() as i64);
        if let Some(dn) = &self.previous_dn {
            encoder.encode_octet_string(dn.as_bytes());
        }
        if let Some(change_number) = self.change_number {
            encoder.encode_integer(change_number);
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

impl PartialEq for EntryChangeControl {
    fn eq(&self, other: &Self) -> bool {
        self.change_type == other.change_type
            && self.previous_dn == other.previous_dn
            && self.change_number == other.change_number
    }
}

impl Eq for EntryChangeControl {}

impl fmt::Display for EntryChangeControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "EntryChangeNotification control :")?;
        writeln!(f, "    oid : {}", ENTRY_CHANGE_OID)?;
        write!(f, "    changeType : {:?}", self.change_type)?;
        if let Some(dn) = &self.previous_dn {
            write!(f, "\n    previousDN : '{}'", dn)?;
        }
        if let Some(change_number) = self.change_number {
            write!(f, "\n    changeNumber : {}", change_number)?;
        }
        Ok(())
    }
}
