//! Error types for the migration engine

use tagshift_core::TagError;
use thiserror::Error;

/// Result type alias for migration operations
pub type Result<T> = std::result::Result<T, MigrationError>;

#[derive(Error, Debug)]
pub enum MigrationError {
    #[error(transparent)]
    Tag(#[from] TagError),

    /// A migrator gave up on a tree it was responsible for.
    #[error("migrator {name} failed: {message}")]
    Migrator { name: String, message: String },

    #[error("invalid schema version: {0}")]
    InvalidVersion(String),

    #[error("migration requires a compound tree, found {found}")]
    NotACompound { found: &'static str },

    /// Nested trees went deeper than the engine allows.
    #[error("nested migration deeper than {0} levels")]
    DepthLimitExceeded(usize),
}

impl MigrationError {
    pub fn migrator(name: impl Into<String>, message: impl Into<String>) -> Self {
        MigrationError::Migrator {
            name: name.into(),
            message: message.into(),
        }
    }
}
