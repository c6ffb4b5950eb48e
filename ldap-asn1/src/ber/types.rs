//! BER tag types and the universal tags used by LDAP controls

/// BOOLEAN (universal 1, primitive)
pub const BOOLEAN_TAG: u8 = 0x01;
/// INTEGER (universal 2, primitive)
pub const INTEGER_TAG: u8 = 0x02;
/// OCTET STRING (universal 4, primitive)
pub const OCTET_STRING_TAG: u8 = 0x04;
/// ENUMERATED (universal 10, primitive)
pub const ENUMERATED_TAG: u8 = 0x0A;
/// SEQUENCE / SEQUENCE OF (universal 16, constructed)
pub const SEQUENCE_TAG: u8 = 0x30;
/// SET / SET OF (universal 17, constructed)
pub const SET_TAG: u8 = 0x31;

const CONSTRUCTED_BIT: u8 = 0x20;
const TAG_NUMBER_MASK: u8 = 0x1F;

/// BER Tag Class
///
/// ASN.1 defines four tag classes:
/// - **Universal**: Standard ASN.1 types (INTEGER, OCTET STRING, etc.)
/// - **Application**: Application-specific types
/// - **Context-specific**: Context-dependent types (CHOICE arms, implicit tags)
/// - **Private**: Private/implementation-specific types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BerTagClass {
    /// Universal class (00)
    Universal = 0,
    /// Application class (01)
    Application = 1,
    /// Context-specific class (10)
    ContextSpecific = 2,
    /// Private class (11)
    Private = 3,
}

impl BerTagClass {
    /// Get tag class from bits 7-6 of a tag byte
    pub fn from_bits(bits: u8) -> Self {
        match (bits >> 6) & 0x03 {
            0 => BerTagClass::Universal,
            1 => BerTagClass::Application,
            2 => BerTagClass::ContextSpecific,
            _ => BerTagClass::Private,
        }
    }

    /// Convert tag class to bits (for encoding)
    pub fn to_bits(self) -> u8 {
        (self as u8) << 6
    }
}

/// Single byte BER tag
///
/// LDAP controls only use low tag numbers (0-30), so a tag always fits in
/// one byte and grammars dispatch on that raw byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BerTag {
    class: BerTagClass,
    constructed: bool,
    number: u8,
}

impl BerTag {
    /// Create a new BER tag
    ///
    /// # Arguments
    /// * `class` - Tag class
    /// * `constructed` - Whether this is a constructed type
    /// * `number` - Tag number, masked to 0-30
    pub const fn new(class: BerTagClass, constructed: bool, number: u8) -> Self {
        Self {
            class,
            constructed,
            number: number & TAG_NUMBER_MASK,
        }
    }

    /// Create a Universal class tag
    pub const fn universal(constructed: bool, number: u8) -> Self {
        Self::new(BerTagClass::Universal, constructed, number)
    }

    /// Create a Context-specific class tag
    pub const fn context_specific(constructed: bool, number: u8) -> Self {
        Self::new(BerTagClass::ContextSpecific, constructed, number)
    }

    /// Split a tag byte into class, form and number
    pub fn from_byte(byte: u8) -> Self {
        Self {
            class: BerTagClass::from_bits(byte),
            constructed: byte & CONSTRUCTED_BIT != 0,
            number: byte & TAG_NUMBER_MASK,
        }
    }

    /// Encode the tag to its single byte form
    pub fn to_byte(&self) -> u8 {
        let constructed_bit = if self.constructed { CONSTRUCTED_BIT } else { 0 };
        self.class.to_bits() | constructed_bit | self.number
    }

    /// Check whether a tag byte announces the (unsupported) high tag number form
    pub fn is_high_tag_number(byte: u8) -> bool {
        byte & TAG_NUMBER_MASK == TAG_NUMBER_MASK
    }

    /// Get tag class
    pub fn class(&self) -> BerTagClass {
        self.class
    }

    /// Check if tag is constructed
    pub fn is_constructed(&self) -> bool {
        self.constructed
    }

    /// Get tag number
    pub fn number(&self) -> u8 {
        self.number
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_universal_tags() {
        assert_eq!(BerTag::universal(false, 1).to_byte(), BOOLEAN_TAG);
        assert_eq!(BerTag::universal(false, 10).to_byte(), ENUMERATED_TAG);
        assert_eq!(BerTag::universal(true, 16).to_byte(), SEQUENCE_TAG);
        assert_eq!(BerTag::universal(true, 17).to_byte(), SET_TAG);
    }

    #[test]
    fn test_context_specific_tag() {
        let tag = BerTag::from_byte(0xA3);
        assert_eq!(tag.class(), BerTagClass::ContextSpecific);
        assert!(tag.is_constructed());
        assert_eq!(tag.number(), 3);
        assert_eq!(BerTag::context_specific(false, 0).to_byte(), 0x80);
    }

    #[test]
    fn test_high_tag_number_form() {
        assert!(BerTag::is_high_tag_number(0x1F));
        assert!(BerTag::is_high_tag_number(0xBF));
        assert!(!BerTag::is_high_tag_number(SEQUENCE_TAG));
    }
}
