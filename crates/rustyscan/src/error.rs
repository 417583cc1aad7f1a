//! Error types for the rustyscan library
//!
//! This module defines the error types used throughout the library.

use crate::hal::ClientId;
use thiserror::Error;

/// Errors that can occur while coordinating scans on the shared radio
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("controller cannot service the requested scan policy")]
    PolicyNotSupported,

    #[error("client {0} already has an active scan")]
    DuplicateClient(ClientId),

    #[error("no hardware filter slots left")]
    FilterSlotsExhausted,

    #[error("client {0} has no active scan")]
    UnknownClient(ClientId),

    #[error("admission worker is not running")]
    WorkerStopped,

    #[error("controller rejected command with status {0}")]
    CommandFailed(u8),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for scan coordination operations
pub type ScanResult<T> = std::result::Result<T, ScanError>;
