//! Error types for tag tree operations
//!
//! Navigation mismatches are not errors: the navigator reports them as
//! `None`/`false`. The variants here cover codec failures and precondition
//! violations that indicate a programming mistake.

use thiserror::Error;

/// Result type alias for tag operations
pub type Result<T> = std::result::Result<T, TagError>;

/// Main error type for tag tree operations
#[derive(Error, Debug)]
pub enum TagError {
    /// A native value has no tag representation.
    #[error("unsupported value type: {type_name}")]
    UnsupportedValueType { type_name: &'static str },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Type id read from a stream is outside the known set.
    #[error("unknown tag type id {0}")]
    UnknownTagType(u8),

    #[error("invalid {what} length {length}")]
    InvalidLength { what: &'static str, length: i64 },

    #[error("string payload is not valid UTF-8")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),

    /// The root of a tree must be a compound for this operation.
    #[error("expected a compound root, found {found}")]
    NotACompound { found: &'static str },

    /// A skip position exceeded the length of the path it applies to.
    #[error("{what} position {position} is out of range for a path of length {length}")]
    PositionOutOfRange {
        what: &'static str,
        position: usize,
        length: usize,
    },

    #[error("base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("nesting deeper than {0} levels")]
    DepthLimitExceeded(usize),
}
