use thiserror::Error;

use crate::validation::ValidationError;

/// Errors raised by the catalog, the cost engine and the session table.
#[derive(Debug, Error)]
pub enum CraftError {
    /// Malformed arguments, recipe text or amounts.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Returned when a lookup has no matching record.
    #[error("{0} not found.")]
    NotFound(String),

    /// Returned when inserting an item whose name is already taken.
    #[error("Item '{0}' already exists. Try updating it instead.")]
    DuplicateKey(String),

    /// A dialog is already open for this user in this channel.
    #[error("You already have a pending {kind} dialog in this channel. Finish or cancel it first.")]
    SessionConflict {
        owner: String,
        channel: String,
        kind: String,
    },

    /// Wrapper around sled's error type.
    #[error("Database error: {0}")]
    Store(#[from] sled::Error),

    /// Wrapper around bincode serialization and deserialization errors.
    #[error("Database error: serialization failed: {0}")]
    Serialization(#[from] bincode::Error),

    /// Wrapper around IO errors (directory creation, etc.).
    #[error("Database error: {0}")]
    Io(#[from] std::io::Error),

    /// Returned when deserializing a record with an unexpected schema version.
    #[error("Database error: schema mismatch for {entity}: expected {expected}, got {found}")]
    SchemaMismatch {
        entity: &'static str,
        expected: u8,
        found: u8,
    },
}

impl CraftError {
    /// True for failures of the underlying store rather than of user input.
    pub fn is_store_error(&self) -> bool {
        matches!(
            self,
            CraftError::Store(_)
                | CraftError::Serialization(_)
                | CraftError::Io(_)
                | CraftError::SchemaMismatch { .. }
        )
    }
}
