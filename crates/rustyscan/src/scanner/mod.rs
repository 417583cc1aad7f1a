//! LE scan coordination
//!
//! This module multiplexes concurrent client scan requests onto the one
//! shared radio. It is responsible for:
//! - Admitting or rejecting scan requests against controller capabilities
//! - Allocating and recycling the scarce hardware filter slots
//! - Negotiating the single shared batch-buffering configuration
//! - Scheduling periodic, jittered flushes of batched results
//! - Serializing every hardware reconfiguration through one worker

pub mod alarm;
pub mod batch;
pub mod constants;
pub mod filter;
pub mod manager;
pub mod registry;
pub mod types;
pub mod worker;

// Re-export the public API
pub use self::alarm::{ThreadWakeupScheduler, WakeupScheduler};
pub use self::batch::BatchScanParams;
pub use self::filter::FilterPool;
pub use self::manager::ScanManager;
pub use self::registry::ClientRegistry;
pub use self::types::*;
pub use self::worker::ScanCommand;
