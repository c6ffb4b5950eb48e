//! Decoder configuration

use serde::{Deserialize, Serialize};

/// Default upper bound for the outermost TLV length (2 MiB)
pub const DEFAULT_MAX_PDU_SIZE: usize = 0x200000;
/// Default maximum nesting depth of the parse stack
pub const DEFAULT_MAX_DEPTH: usize = 16;
/// Default chunk size used by the reader driven decoders
pub const DEFAULT_READ_BUFFER_SIZE: usize = 512;

/// Limits applied by an `Asn1Container` while decoding
///
/// # Example
///
/// ```rust,no_run
/// use ldap_asn1::DecoderConfig;
///
/// let config = DecoderConfig::default()
///     .with_max_pdu_size(64 * 1024)
///     .with_read_buffer_size(128);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecoderConfig {
    max_pdu_size: usize,
    max_depth: usize,
    read_buffer_size: usize,
}

impl DecoderConfig {
    /// Create a configuration with the default limits
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the largest length accepted for the outermost TLV
    pub fn with_max_pdu_size(mut self, max_pdu_size: usize) -> Self {
        self.max_pdu_size = max_pdu_size;
        self
    }

    /// Set the maximum nesting depth
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Set the read chunk size (at least one byte)
    pub fn with_read_buffer_size(mut self, read_buffer_size: usize) -> Self {
        self.read_buffer_size = read_buffer_size.max(1);
        self
    }

    /// Get the largest length accepted for the outermost TLV
    pub fn max_pdu_size(&self) -> usize {
        self.max_pdu_size
    }

    /// Get the maximum nesting depth
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Get the read chunk size
    pub fn read_buffer_size(&self) -> usize {
        self.read_buffer_size.max(1)
    }
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            max_pdu_size: DEFAULT_MAX_PDU_SIZE,
            max_depth: DEFAULT_MAX_DEPTH,
            read_buffer_size: DEFAULT_READ_BUFFER_SIZE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DecoderConfig::new();
        assert_eq!(config.max_pdu_size(), DEFAULT_MAX_PDU_SIZE);
        assert_eq!(config.max_depth(), DEFAULT_MAX_DEPTH);
        assert_eq!(config.read_buffer_size(), DEFAULT_READ_BUFFER_SIZE);
    }

    #[test]
    fn test_builder_setters() {
        let config = DecoderConfig::new()
            .with_max_pdu_size(10)
            .with_max_depth(2)
            .with_read_buffer_size(0);
        assert_eq!(config.max_pdu_size(), 10);
        assert_eq!(config.max_depth(), 2);
        assert_eq!(config.read_buffer_size(), 1);
    }
}
