//! Error types for seqfile
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using SeqFileError
pub type Result<T> = std::result::Result<T, SeqFileError>;

/// Unified error type for seqfile operations
#[derive(Debug, Error)]
pub enum SeqFileError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Record Errors
    // -------------------------------------------------------------------------
    #[error("Record too large: {span} bytes cannot fit in a {capacity}-byte block")]
    RecordTooLarge { span: usize, capacity: usize },

    #[error("Record {0} not found")]
    NotFound(i32),

    #[error("Insufficient space: need {needed} more bytes, block has {available} free")]
    InsufficientSpace { needed: usize, available: usize },

    #[error("Record id -1 is reserved for tombstones")]
    ReservedId,

    #[error("Out of order insert into ordered file: id {id} after {last}")]
    OutOfOrder { id: i32, last: i32 },

    #[error("Invalid range: start key {low} cannot be greater than end key {high}")]
    InvalidRange { low: i32, high: i32 },

    // -------------------------------------------------------------------------
    // Storage Errors
    // -------------------------------------------------------------------------
    #[error("Corrupted data: {0}")]
    Corrupted(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    InvalidConfig(String),
}
