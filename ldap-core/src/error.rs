use thiserror::Error;

/// Errors raised while decoding a BER encoded control value
///
/// Every variant is fatal for the message being decoded: the container
/// stops at the first error and the partially built control is discarded.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Malformed length: {0}")]
    MalformedLength(String),

    #[error("Length overflow: {length} bytes declared, only {available} available")]
    LengthOverflow { length: usize, available: usize },

    #[error("Unexpected tag 0x{tag:02X} in state {state}")]
    UnexpectedTag { tag: u8, state: String },

    #[error("Integer out of range: {value} not in [{min}, {max}]")]
    IntegerOutOfRange { value: i64, min: i64, max: i64 },

    #[error("Invalid integer encoding: {0}")]
    InvalidIntegerEncoding(String),

    #[error("Invalid boolean length: expected 1 byte, got {0}")]
    InvalidBooleanLength(usize),

    #[error("Incomplete grammar: {0}")]
    IncompleteGrammar(String),

    #[error("Invalid DN syntax: {0}")]
    InvalidDnSyntax(String),

    #[error("Semantic violation: {0}")]
    SemanticViolation(String),

    #[error("Trailing data: {0} bytes after the end of the control value")]
    TrailingData(usize),

    #[error("Nesting too deep: more than {0} levels")]
    NestingTooDeep(usize),

    /// The container already completed or failed and was not `clean()`ed
    #[error("Container already finished, clean() it before reuse")]
    ContainerFinished,
}

/// Errors raised while encoding a control value
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    #[error("Lengths must be computed before encoding")]
    LengthNotComputed,

    #[error("Missing field: {0}")]
    MissingField(&'static str),

    #[error("Invalid field {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("Length mismatch: computed {expected} bytes, wrote {actual}")]
    LengthMismatch { expected: usize, actual: usize },
}

/// Main error type for codec operations
#[derive(Error, Debug)]
pub enum LdapError {
    #[error("Decoding error: {0}")]
    Decode(#[from] DecodeError),

    #[error("Encoding error: {0}")]
    Encode(#[from] EncodeError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for decode operations
pub type DecodeResult<T> = Result<T, DecodeError>;

/// Result type alias for encode operations
pub type EncodeResult<T> = Result<T, EncodeError>;

/// Result type alias for codec operations
pub type LdapResult<T> = Result<T, LdapError>;
