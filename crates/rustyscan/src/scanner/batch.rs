//! Batch scan parameter negotiation
//!
//! All batch clients share one hardware batching configuration. The merge is
//! a pure function of the active batch set: the most power-hungry mode wins,
//! and the storage split follows which payload shapes are wanted.

use super::constants::*;
use super::types::{ResultKind, ScanClient, ScanMode};
use crate::hal::{BatchReadKind, ClientId};

/// The single batching configuration derived from the active batch set
///
/// Two equal values mean the hardware needs no reconfiguration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchScanParams {
    pub scan_mode: ScanMode,
    /// Last-seen client wanting full payloads, if any
    pub full_client: Option<ClientId>,
    /// Last-seen client wanting anything else, if any
    pub truncated_client: Option<ClientId>,
}

impl BatchScanParams {
    /// Merge the active batch clients into one configuration
    ///
    /// Returns `None` when the set is empty and batching should stop.
    pub fn derive(batch_clients: &[ScanClient]) -> Option<Self> {
        let mut params: Option<Self> = None;

        for client in batch_clients {
            let entry = params.get_or_insert(Self {
                scan_mode: client.policy.scan_mode,
                full_client: None,
                truncated_client: None,
            });
            entry.scan_mode = entry.scan_mode.max(client.policy.scan_mode);
            match client.policy.result_kind {
                ResultKind::Full => entry.full_client = Some(client.id),
                _ => entry.truncated_client = Some(client.id),
            }
        }

        params
    }

    /// Storage percentages for the full and truncated result buffers
    pub fn storage_split(&self) -> (u8, u8) {
        match (self.full_client.is_some(), self.truncated_client.is_some()) {
            (true, true) => (50, 50),
            (true, false) => (100, 0),
            // Negotiation never yields a value with neither side configured
            _ => (0, 100),
        }
    }

    /// Which buffers a flush must drain, full first
    pub fn read_kinds(&self) -> Vec<BatchReadKind> {
        let mut kinds = Vec::new();
        if self.full_client.is_some() {
            kinds.push(BatchReadKind::Full);
        }
        if self.truncated_client.is_some() {
            kinds.push(BatchReadKind::Truncated);
        }
        kinds
    }

    /// Batch scan window and interval for the negotiated mode (ms)
    pub fn window_interval_ms(&self) -> (u32, u32) {
        match self.scan_mode {
            ScanMode::LowPower => (
                BATCH_SCAN_LOW_POWER_WINDOW_MS,
                BATCH_SCAN_LOW_POWER_INTERVAL_MS,
            ),
            ScanMode::Balanced => (
                BATCH_SCAN_BALANCED_WINDOW_MS,
                BATCH_SCAN_BALANCED_INTERVAL_MS,
            ),
            ScanMode::LowLatency => (
                BATCH_SCAN_LOW_LATENCY_WINDOW_MS,
                BATCH_SCAN_LOW_LATENCY_INTERVAL_MS,
            ),
        }
    }
}

/// Regular scan window and interval for a power tier (ms)
pub fn regular_window_interval_ms(mode: ScanMode) -> (u16, u16) {
    match mode {
        ScanMode::LowPower => (
            SCAN_MODE_LOW_POWER_WINDOW_MS,
            SCAN_MODE_LOW_POWER_INTERVAL_MS,
        ),
        ScanMode::Balanced => (SCAN_MODE_BALANCED_WINDOW_MS, SCAN_MODE_BALANCED_INTERVAL_MS),
        ScanMode::LowLatency => (
            SCAN_MODE_LOW_LATENCY_WINDOW_MS,
            SCAN_MODE_LOW_LATENCY_INTERVAL_MS,
        ),
    }
}
