//! Type definitions for scan coordination
//!
//! This module contains the client-facing data structures: policies, match
//! filters, client records, and delivered reports.

use crate::hal::ClientId;
use crate::uuid::Uuid;
use bitflags::bitflags;
use std::fmt;
use std::sync::Arc;

/// A 48-bit Bluetooth device address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BdAddr {
    pub bytes: [u8; 6],
}

impl BdAddr {
    pub fn new(bytes: [u8; 6]) -> Self {
        Self { bytes }
    }

    pub fn from_slice(slice: &[u8]) -> Option<Self> {
        if slice.len() >= 6 {
            let mut bytes = [0u8; 6];
            bytes.copy_from_slice(&slice[0..6]);
            Some(Self { bytes })
        } else {
            None
        }
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }
}

impl fmt::Display for BdAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02X}:{:02X}:{:02X}:{:02X}:{:02X}:{:02X}",
            self.bytes[5],
            self.bytes[4],
            self.bytes[3],
            self.bytes[2],
            self.bytes[1],
            self.bytes[0]
        )
    }
}

/// Requested scanning power tier, ordered from least to most power-hungry
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ScanMode {
    LowPower,
    Balanced,
    LowLatency,
}

bitflags! {
    /// Which match events a client wants to hear about
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct CallbackKind: u8 {
        const ALL_MATCHES = 0x01;
        const FIRST_MATCH = 0x02;
        const MATCH_LOST = 0x04;
    }
}

/// Payload shape a batch client wants buffered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultKind {
    Full,
    Truncated,
    Both,
}

/// Origin of a scan request. Carried through for bookkeeping; admission
/// treats both the same.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientRole {
    Client,
    Server,
}

/// A service UUID match criterion with an optional bit mask
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UuidFilter {
    pub uuid: Uuid,
    pub mask: Option<Uuid>,
}

/// A raw data match criterion with an optional per-byte mask
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataFilter {
    pub data: Vec<u8>,
    pub mask: Option<Vec<u8>>,
}

/// A manufacturer data match criterion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManufacturerFilter {
    pub company_id: u16,
    pub data: Vec<u8>,
    pub mask: Option<Vec<u8>>,
}

/// One logical filter group; all present fields must match (AND)
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterSpec {
    pub device_address: Option<BdAddr>,
    pub service_uuid: Option<UuidFilter>,
    pub solicitation_uuid: Option<UuidFilter>,
    pub local_name: Option<String>,
    pub manufacturer_data: Option<ManufacturerFilter>,
    pub service_data: Option<DataFilter>,
}

impl FilterSpec {
    /// A group with no criteria matches everything and consumes no slot
    pub fn is_empty(&self) -> bool {
        self.device_address.is_none()
            && self.service_uuid.is_none()
            && self.solicitation_uuid.is_none()
            && self.local_name.is_none()
            && self.manufacturer_data.is_none()
            && self.service_data.is_none()
    }
}

/// Per-client scan intent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanPolicy {
    pub scan_mode: ScanMode,
    pub callback_kind: CallbackKind,
    /// How long the controller may buffer results before delivery.
    /// Zero means deliver every match immediately.
    pub report_delay_ms: u64,
    pub result_kind: ResultKind,
    pub filters: Vec<FilterSpec>,
}

impl ScanPolicy {
    pub fn new(scan_mode: ScanMode) -> Self {
        Self {
            scan_mode,
            callback_kind: CallbackKind::ALL_MATCHES,
            report_delay_ms: 0,
            result_kind: ResultKind::Full,
            filters: Vec::new(),
        }
    }

    /// Whether any filter group carries concrete criteria
    pub fn has_concrete_filters(&self) -> bool {
        self.filters.iter().any(|f| !f.is_empty())
    }
}

/// Whether a client's matches are delivered one-by-one or in bulk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanClientKind {
    Regular,
    Batch,
}

/// A delivered advertisement match
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdvReport {
    pub address: BdAddr,
    pub rssi: i8,
    pub data: Vec<u8>,
}

/// A callback function for delivering advertisement matches
pub type AdvReportCallback = Arc<dyn Fn(&AdvReport) + Send + Sync + 'static>;

/// A callback invoked when a dead client's identity must be unregistered
pub type UnregisterCallback = Box<dyn Fn(ClientId) + Send + 'static>;

/// One scanning application or profile
#[derive(Clone)]
pub struct ScanClient {
    pub id: ClientId,
    pub role: ClientRole,
    /// Service UUIDs the result fan-out checks for containment.
    /// Empty means deliver every result.
    pub match_uuids: Vec<Uuid>,
    pub policy: ScanPolicy,
    /// Set when the owning process has died; a stop for such a client also
    /// unregisters its identity.
    pub app_died: bool,
    pub callback: Option<AdvReportCallback>,
}

impl ScanClient {
    pub fn new(id: ClientId, policy: ScanPolicy) -> Self {
        Self {
            id,
            role: ClientRole::Client,
            match_uuids: Vec::new(),
            policy,
            app_died: false,
            callback: None,
        }
    }
}

impl fmt::Debug for ScanClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScanClient")
            .field("id", &self.id)
            .field("role", &self.role)
            .field("match_uuids", &self.match_uuids)
            .field("policy", &self.policy)
            .field("app_died", &self.app_died)
            .finish()
    }
}
