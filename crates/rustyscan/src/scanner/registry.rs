//! Scan client registry
//!
//! Tracks which clients currently hold a regular or batch scan. Sets keep
//! arrival order so batch negotiation ("last seen wins") is deterministic.

use super::types::{CallbackKind, ClientRole, ScanClient, ScanClientKind, ScanMode, ScanPolicy};
use crate::error::{ScanError, ScanResult};
use crate::hal::{ClientId, ControllerCapabilities};

pub struct ClientRegistry {
    regular: Vec<ScanClient>,
    batch: Vec<ScanClient>,
}

impl ClientRegistry {
    pub fn new() -> Self {
        Self {
            regular: Vec::new(),
            batch: Vec::new(),
        }
    }

    /// Decide which set a policy belongs to, or reject it outright
    ///
    /// A client batches if and only if it asks for every match and allows a
    /// non-zero report delay. A controller without filter offload can only
    /// service plain always-on scans (all matches, zero delay).
    pub fn classify(
        policy: &ScanPolicy,
        caps: &ControllerCapabilities,
    ) -> ScanResult<ScanClientKind> {
        let plain = policy.callback_kind == CallbackKind::ALL_MATCHES && policy.report_delay_ms == 0;
        if !caps.filtering_supported && !plain {
            return Err(ScanError::PolicyNotSupported);
        }

        if policy.callback_kind.contains(CallbackKind::ALL_MATCHES) && policy.report_delay_ms > 0 {
            Ok(ScanClientKind::Batch)
        } else {
            Ok(ScanClientKind::Regular)
        }
    }

    pub fn contains(&self, id: ClientId, role: ClientRole) -> bool {
        self.regular
            .iter()
            .chain(self.batch.iter())
            .any(|c| c.id == id && c.role == role)
    }

    pub fn add(&mut self, client: ScanClient, kind: ScanClientKind) {
        match kind {
            ScanClientKind::Regular => self.regular.push(client),
            ScanClientKind::Batch => self.batch.push(client),
        }
    }

    /// Remove a client from whichever set holds it
    pub fn remove(&mut self, id: ClientId) -> Option<(ScanClient, ScanClientKind)> {
        if let Some(pos) = self.regular.iter().position(|c| c.id == id) {
            return Some((self.regular.remove(pos), ScanClientKind::Regular));
        }
        if let Some(pos) = self.batch.iter().position(|c| c.id == id) {
            return Some((self.batch.remove(pos), ScanClientKind::Batch));
        }
        None
    }

    pub fn get(&self, id: ClientId) -> Option<(&ScanClient, ScanClientKind)> {
        if let Some(client) = self.regular.iter().find(|c| c.id == id) {
            return Some((client, ScanClientKind::Regular));
        }
        self.batch
            .iter()
            .find(|c| c.id == id)
            .map(|c| (c, ScanClientKind::Batch))
    }

    pub fn regular_clients(&self) -> &[ScanClient] {
        &self.regular
    }

    pub fn batch_clients(&self) -> &[ScanClient] {
        &self.batch
    }

    /// Most power-hungry mode requested by any regular client
    pub fn max_regular_mode(&self) -> Option<ScanMode> {
        self.regular.iter().map(|c| c.policy.scan_mode).max()
    }

    /// Shortest buffering delay requested by any batch client
    pub fn min_batch_delay_ms(&self) -> Option<u64> {
        self.batch.iter().map(|c| c.policy.report_delay_ms).min()
    }
}

impl Default for ClientRegistry {
    fn default() -> Self {
        Self::new()
    }
}
