//! RustyScan - LE scan coordination for a single shared radio
//!
//! This library multiplexes the scan intents of many independent clients
//! onto one Bluetooth LE controller. Per-client policies are admitted
//! against controller capabilities, concrete match filters are programmed
//! into the scarce pool of offloaded filter slots, heterogeneous batch
//! clients are merged into the one batching configuration the hardware
//! supports, and batched results are flushed on a jittered wall-clock
//! cadence. Every hardware reconfiguration flows through a single serialized
//! admission worker, one acknowledged primitive at a time.

pub mod adv;
pub mod error;
pub mod hal;
pub mod scanner;
pub mod uuid;

// Re-export common types for convenience
pub use adv::{extract_service_uuids, parse_ad_structures};
pub use error::{ScanError, ScanResult};
pub use hal::{
    AckSignal, BatchReadKind, ClientId, ControllerCapabilities, DeliveryMode, FilterEntry,
    FilterFeatures, FilterParams, RadioCommand, RadioHal,
};
pub use scanner::{
    AdvReport, AdvReportCallback, BatchScanParams, BdAddr, CallbackKind, ClientRole, DataFilter,
    FilterSpec, ManufacturerFilter, ResultKind, ScanClient, ScanClientKind, ScanManager, ScanMode,
    ScanPolicy, ThreadWakeupScheduler, UuidFilter, WakeupScheduler,
};
pub use uuid::Uuid;
