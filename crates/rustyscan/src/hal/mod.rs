//! Radio hardware abstraction for scan offload
//!
//! This module covers everything that crosses the boundary to the radio:
//! - The configuration primitive set and its wire encoding
//! - The driver trait a controller backend implements
//! - The async-to-sync acknowledgment adapter used by the admission worker

pub mod command;
pub mod constants;
pub mod driver;
#[cfg(test)]
mod tests;

pub use command::{
    ms_to_scan_slots, BatchReadKind, DeliveryMode, FilterEntry, FilterFeatures, FilterParams,
    RadioCommand,
};
pub use driver::{AckSignal, ClientId, ControllerCapabilities, RadioCommander, RadioHal};
