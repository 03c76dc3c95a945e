//! Error types for the history engine.

use thiserror::Error;

/// Main error type for history operations.
#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("Nothing to undo")]
    NothingToUndo,

    #[error("Nothing to redo")]
    NothingToRedo,

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Invalid position: {requested} (history length is {len})")]
    InvalidPosition { requested: usize, len: usize },

    #[error("Target rejected operation: {0}")]
    TargetRejected(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("Checksum mismatch: expected {expected}, got {got}")]
    ChecksumMismatch { expected: u32, got: u32 },
}

impl HistoryError {
    /// True for the expected boundary conditions a caller can simply report
    /// (e.g. by greying out an undo/redo affordance).
    pub fn is_boundary(&self) -> bool {
        matches!(self, HistoryError::NothingToUndo | HistoryError::NothingToRedo)
    }
}

impl From<serde_json::Error> for HistoryError {
    fn from(e: serde_json::Error) -> Self {
        HistoryError::Serialization(e.to_string())
    }
}

impl From<rmp_serde::encode::Error> for HistoryError {
    fn from(e: rmp_serde::encode::Error) -> Self {
        HistoryError::Serialization(e.to_string())
    }
}

impl From<rmp_serde::decode::Error> for HistoryError {
    fn from(e: rmp_serde::decode::Error) -> Self {
        HistoryError::Deserialization(e.to_string())
    }
}

/// Result type for history operations.
pub type Result<T> = std::result::Result<T, HistoryError>;
