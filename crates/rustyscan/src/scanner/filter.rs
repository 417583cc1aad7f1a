//! Hardware filter slot management
//!
//! The controller exposes a small fixed number of match-filter slots. Slots
//! below [`FIRST_ALLOCATABLE_INDEX`](super::constants::FIRST_ALLOCATABLE_INDEX)
//! are reserved; the rest live on a free stack here and are lent to clients
//! that bring concrete match criteria. Clients with no criteria share one
//! reserved pass-all slot per scope, tracked by reference count.

use super::constants::*;
use super::types::{CallbackKind, FilterSpec, ScanClientKind, ScanPolicy};
use crate::error::{ScanError, ScanResult};
use crate::hal::{ClientId, DeliveryMode, FilterEntry, FilterFeatures, FilterParams};
use std::collections::HashMap;

/// Shared pass-all filter state for one scope (regular or batch)
#[derive(Debug, Clone, Copy, Default)]
pub struct AllPassState {
    pub ref_count: u32,
    pub programmed: bool,
}

pub struct FilterPool {
    free: Vec<u8>,
    allocations: HashMap<ClientId, Vec<u8>>,
    regular_all_pass: AllPassState,
    batch_all_pass: AllPassState,
}

impl FilterPool {
    /// Build the pool for a controller with `max_filter_slots` total slots
    pub fn new(max_filter_slots: u8) -> Self {
        // Stack is filled in reverse so the lowest slot is lent first
        let free = (FIRST_ALLOCATABLE_INDEX..max_filter_slots).rev().collect();
        Self {
            free,
            allocations: HashMap::new(),
            regular_all_pass: AllPassState::default(),
            batch_all_pass: AllPassState::default(),
        }
    }

    /// Lend `count` slots to a client, all or nothing
    pub fn reserve(&mut self, client: ClientId, count: usize) -> ScanResult<Vec<u8>> {
        if self.free.len() < count {
            return Err(ScanError::FilterSlotsExhausted);
        }

        let mut indices = Vec::with_capacity(count);
        for _ in 0..count {
            // Length checked above
            if let Some(index) = self.free.pop() {
                indices.push(index);
            }
        }
        self.allocations.insert(client, indices.clone());
        Ok(indices)
    }

    /// Return a client's slots to the pool
    ///
    /// Yields the slots that were held so the caller can tear down their
    /// hardware state; empty if the client held none.
    pub fn release(&mut self, client: ClientId) -> Vec<u8> {
        let indices = self.allocations.remove(&client).unwrap_or_default();
        for &index in &indices {
            self.free.push(index);
        }
        indices
    }

    pub fn allocation(&self, client: ClientId) -> Option<&[u8]> {
        self.allocations.get(&client).map(|v| v.as_slice())
    }

    pub fn free_indices(&self) -> &[u8] {
        &self.free
    }

    /// Take a reference on the shared pass-all filter for a scope
    ///
    /// Returns true when this is the first reference and the caller must
    /// program the reserved slot.
    pub fn acquire_all_pass(&mut self, kind: ScanClientKind) -> bool {
        let state = self.all_pass_mut(kind);
        state.ref_count += 1;
        if state.programmed {
            false
        } else {
            state.programmed = true;
            true
        }
    }

    /// Drop a reference on the shared pass-all filter for a scope
    ///
    /// Returns true when the last reference is gone and the caller must
    /// clear the reserved slot.
    pub fn release_all_pass(&mut self, kind: ScanClientKind) -> bool {
        let state = self.all_pass_mut(kind);
        if state.ref_count == 0 {
            return false;
        }
        state.ref_count -= 1;
        if state.ref_count == 0 && state.programmed {
            state.programmed = false;
            true
        } else {
            false
        }
    }

    pub fn all_pass(&self, kind: ScanClientKind) -> AllPassState {
        match kind {
            ScanClientKind::Regular => self.regular_all_pass,
            ScanClientKind::Batch => self.batch_all_pass,
        }
    }

    fn all_pass_mut(&mut self, kind: ScanClientKind) -> &mut AllPassState {
        match kind {
            ScanClientKind::Regular => &mut self.regular_all_pass,
            ScanClientKind::Batch => &mut self.batch_all_pass,
        }
    }
}

/// The reserved slot backing the shared pass-all filter of a scope
pub fn all_pass_index(kind: ScanClientKind) -> u8 {
    match kind {
        ScanClientKind::Regular => REGULAR_ALL_PASS_INDEX,
        ScanClientKind::Batch => BATCH_ALL_PASS_INDEX,
    }
}

/// How the controller should report matches for a policy
///
/// First criterion wins: found/lost notifications beat everything, an
/// undelayed client gets immediate reports, everyone else batches.
pub fn delivery_mode_for(policy: &ScanPolicy) -> DeliveryMode {
    if policy
        .callback_kind
        .intersects(CallbackKind::FIRST_MATCH | CallbackKind::MATCH_LOST)
    {
        DeliveryMode::OnFoundLost
    } else if policy.report_delay_ms == 0 {
        DeliveryMode::Immediate
    } else {
        DeliveryMode::Batch
    }
}

/// Expand one filter group into its hardware entries and feature mask
pub fn expand_filter(spec: &FilterSpec) -> (Vec<FilterEntry>, FilterFeatures) {
    let mut entries = Vec::new();
    let mut features = FilterFeatures::empty();

    if let Some(addr) = &spec.device_address {
        entries.push(FilterEntry::BroadcastAddress {
            addr: addr.bytes,
            addr_type: 0,
        });
        features |= FilterFeatures::BROADCAST_ADDRESS;
    }
    if let Some(filter) = &spec.service_uuid {
        entries.push(FilterEntry::ServiceUuid {
            uuid: *filter.uuid.as_bytes_le(),
            mask: uuid_mask(filter.mask.as_ref()),
        });
        features |= FilterFeatures::SERVICE_UUID;
    }
    if let Some(filter) = &spec.solicitation_uuid {
        entries.push(FilterEntry::SolicitUuid {
            uuid: *filter.uuid.as_bytes_le(),
            mask: uuid_mask(filter.mask.as_ref()),
        });
        features |= FilterFeatures::SOLICIT_UUID;
    }
    if let Some(name) = &spec.local_name {
        entries.push(FilterEntry::LocalName(name.clone()));
        features |= FilterFeatures::LOCAL_NAME;
    }
    if let Some(filter) = &spec.manufacturer_data {
        entries.push(FilterEntry::ManufacturerData {
            company_id: filter.company_id,
            data: filter.data.clone(),
            mask: data_mask(filter.mask.as_ref(), filter.data.len()),
        });
        features |= FilterFeatures::MANUFACTURER_DATA;
    }
    if let Some(filter) = &spec.service_data {
        entries.push(FilterEntry::ServiceData {
            data: filter.data.clone(),
            mask: data_mask(filter.mask.as_ref(), filter.data.len()),
        });
        features |= FilterFeatures::SERVICE_DATA;
    }

    (entries, features)
}

/// Build the filter parameter record tying a slot to a policy
pub fn params_for(index: u8, features: FilterFeatures, policy: &ScanPolicy) -> FilterParams {
    let timeout = policy.report_delay_ms.min(u16::MAX as u64) as u16;
    FilterParams {
        index,
        features,
        list_logic: LIST_LOGIC_TYPE_ALL,
        filter_logic: FILTER_LOGIC_TYPE_AND,
        rssi_high: RSSI_THRESHOLD_UNFILTERED,
        rssi_low: RSSI_THRESHOLD_UNFILTERED,
        delivery_mode: delivery_mode_for(policy),
        found_timeout_ms: timeout,
        found_timeout_count: ON_FOUND_SIGHTINGS,
        lost_timeout_ms: timeout,
    }
}

fn uuid_mask(mask: Option<&crate::uuid::Uuid>) -> [u8; 16] {
    match mask {
        Some(mask) => *mask.as_bytes_le(),
        None => [0xFF; 16],
    }
}

fn data_mask(mask: Option<&Vec<u8>>, len: usize) -> Vec<u8> {
    match mask {
        Some(mask) => mask.clone(),
        None => vec![0xFF; len],
    }
}
