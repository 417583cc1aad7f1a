//! Serialized admission worker
//!
//! All start/stop/flush requests funnel through one queue and are processed
//! strictly in arrival order on a single thread. The worker is the only
//! caller of the registry, the filter pool, the batch negotiator and the
//! radio commander, so no two hardware reconfigurations can ever race.

use super::alarm::WakeupScheduler;
use super::batch::{regular_window_interval_ms, BatchScanParams};
use super::constants::*;
use super::filter::{self, FilterPool};
use super::registry::ClientRegistry;
use super::types::{ScanClient, ScanClientKind, ScanMode, UnregisterCallback};
use crate::error::ScanResult;
use crate::hal::{ClientId, ControllerCapabilities, RadioCommand, RadioCommander};
use log::{debug, info, warn};
use std::sync::mpsc::{Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// One admission request
#[derive(Debug)]
pub enum ScanCommand {
    Start(ScanClient),
    Stop { id: ClientId, owner_died: bool },
    Flush { id: ClientId },
    Shutdown,
}

pub(crate) struct AdmissionWorker {
    registry: Arc<Mutex<ClientRegistry>>,
    pub(crate) pool: FilterPool,
    commander: RadioCommander,
    caps: ControllerCapabilities,
    scheduler: Arc<dyn WakeupScheduler>,
    /// Handle back onto the admission queue, used by the flush alarm
    queue: Sender<ScanCommand>,
    unregister: Arc<Mutex<Option<UnregisterCallback>>>,
    pub(crate) applied_batch: Option<BatchScanParams>,
    pub(crate) applied_regular_mode: Option<ScanMode>,
    pub(crate) scanning: bool,
}

impl AdmissionWorker {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        registry: Arc<Mutex<ClientRegistry>>,
        pool: FilterPool,
        commander: RadioCommander,
        caps: ControllerCapabilities,
        scheduler: Arc<dyn WakeupScheduler>,
        queue: Sender<ScanCommand>,
        unregister: Arc<Mutex<Option<UnregisterCallback>>>,
    ) -> Self {
        Self {
            registry,
            pool,
            commander,
            caps,
            scheduler,
            queue,
            unregister,
            applied_batch: None,
            applied_regular_mode: None,
            scanning: false,
        }
    }

    pub(crate) fn run(mut self, rx: Receiver<ScanCommand>) {
        loop {
            match rx.recv() {
                Ok(ScanCommand::Shutdown) | Err(_) => break,
                Ok(command) => self.handle(command),
            }
        }
        debug!("admission worker exiting");
    }

    pub(crate) fn handle(&mut self, command: ScanCommand) {
        match command {
            ScanCommand::Start(client) => self.handle_start(client),
            ScanCommand::Stop { id, owner_died } => self.handle_stop(id, owner_died),
            ScanCommand::Flush { id } => self.handle_flush(id),
            ScanCommand::Shutdown => {}
        }
    }

    fn handle_start(&mut self, client: ScanClient) {
        let kind = match ClientRegistry::classify(&client.policy, &self.caps) {
            Ok(kind) => kind,
            Err(e) => {
                warn!("client {}: scan start rejected: {}", client.id, e);
                return;
            }
        };

        if self
            .registry
            .lock()
            .unwrap()
            .contains(client.id, client.role)
        {
            warn!("client {}: already scanning, start ignored", client.id);
            return;
        }

        if let Err(e) = self.program_filters(&client, kind) {
            warn!("client {}: scan start rejected: {}", client.id, e);
            return;
        }

        info!("client {}: starting {:?} scan", client.id, kind);
        let id = client.id;
        self.registry.lock().unwrap().add(client, kind);

        match kind {
            ScanClientKind::Regular => self.refresh_regular_scan(id),
            ScanClientKind::Batch => {
                self.refresh_batch_scan(id);
                self.rearm_flush_alarm();
            }
        }
    }

    fn handle_stop(&mut self, id: ClientId, owner_died: bool) {
        let removed = self.registry.lock().unwrap().remove(id);
        let Some((client, kind)) = removed else {
            debug!("client {}: stop for unknown client", id);
            if owner_died {
                self.notify_unregister(id);
            }
            return;
        };

        info!("client {}: stopping {:?} scan", id, kind);
        self.clear_filters(&client, kind);

        match kind {
            ScanClientKind::Regular => self.refresh_regular_scan(id),
            ScanClientKind::Batch => {
                self.refresh_batch_scan(id);
                self.rearm_flush_alarm();
            }
        }

        if owner_died || client.app_died {
            info!("client {}: owner died, unregistering identity", id);
            self.notify_unregister(id);
        }
    }

    fn handle_flush(&mut self, id: ClientId) {
        let Some(params) = self.applied_batch else {
            debug!("client {}: flush requested with no batch scan active", id);
            return;
        };

        self.drain_batch_reports(id, &params);
        // Flushing does not stop batching; keep the cadence going
        self.rearm_flush_alarm();
    }

    /// Program the hardware filter state a new client needs
    ///
    /// Clients with concrete criteria borrow one slot per filter group; the
    /// rest share the reserved pass-all slot of their scope. Slot exhaustion
    /// rejects the start request before any state changes.
    fn program_filters(&mut self, client: &ScanClient, kind: ScanClientKind) -> ScanResult<()> {
        if !self.caps.filtering_supported {
            return Ok(());
        }

        if !client.policy.has_concrete_filters() {
            if self.pool.acquire_all_pass(kind) {
                let index = filter::all_pass_index(kind);
                let params =
                    filter::params_for(index, crate::hal::FilterFeatures::empty(), &client.policy);
                self.commander
                    .issue(client.id, RadioCommand::SetFilterParams(params));
            }
            return Ok(());
        }

        let groups: Vec<_> = client
            .policy
            .filters
            .iter()
            .filter(|spec| !spec.is_empty())
            .collect();
        let indices = self.pool.reserve(client.id, groups.len())?;

        for (&index, spec) in indices.iter().zip(&groups) {
            let (entries, features) = filter::expand_filter(spec);
            for entry in entries {
                self.commander
                    .issue(client.id, RadioCommand::AddFilterEntry { index, entry });
            }
            let params = filter::params_for(index, features, &client.policy);
            self.commander
                .issue(client.id, RadioCommand::SetFilterParams(params));
        }

        Ok(())
    }

    /// Tear down the hardware filter state a departing client held
    fn clear_filters(&mut self, client: &ScanClient, kind: ScanClientKind) {
        if !self.caps.filtering_supported {
            return;
        }

        if !client.policy.has_concrete_filters() {
            if self.pool.release_all_pass(kind) {
                let index = filter::all_pass_index(kind);
                self.commander
                    .issue(client.id, RadioCommand::ClearFilterParams { index });
            }
            return;
        }

        for index in self.pool.release(client.id) {
            self.commander
                .issue(client.id, RadioCommand::ClearFilterParams { index });
            self.commander
                .issue(client.id, RadioCommand::ClearFilterEntries { index });
        }
    }

    /// Bring the regular scan parameters in line with the regular set
    fn refresh_regular_scan(&mut self, id: ClientId) {
        let mode = self.registry.lock().unwrap().max_regular_mode();

        let Some(mode) = mode else {
            if self.scanning {
                self.commander.issue(
                    id,
                    RadioCommand::EnableScan {
                        enable: false,
                        filter_duplicates: false,
                    },
                );
                self.scanning = false;
            }
            self.applied_regular_mode = None;
            return;
        };

        if self.applied_regular_mode != Some(mode) {
            // Parameters may only change while scanning is off
            if self.scanning {
                self.commander.issue(
                    id,
                    RadioCommand::EnableScan {
                        enable: false,
                        filter_duplicates: false,
                    },
                );
                self.scanning = false;
            }
            let (window_ms, interval_ms) = regular_window_interval_ms(mode);
            self.commander.issue(
                id,
                RadioCommand::SetScanParams {
                    window_ms,
                    interval_ms,
                },
            );
            self.applied_regular_mode = Some(mode);
        }

        if !self.scanning {
            self.commander.issue(
                id,
                RadioCommand::EnableScan {
                    enable: true,
                    filter_duplicates: true,
                },
            );
            self.scanning = true;
        }
    }

    /// Bring the hardware batching configuration in line with the batch set
    ///
    /// An active configuration is stopped and its buffers drained before the
    /// storage split changes; reconfiguring storage while unread results sit
    /// in it loses them.
    fn refresh_batch_scan(&mut self, id: ClientId) {
        let desired = BatchScanParams::derive(self.registry.lock().unwrap().batch_clients());
        if desired == self.applied_batch {
            return;
        }

        if let Some(old) = self.applied_batch.take() {
            self.commander.issue(id, RadioCommand::StopBatchScan);
            self.drain_batch_reports(id, &old);
        }

        if let Some(new) = desired {
            let (full_pct, truncated_pct) = new.storage_split();
            self.commander.issue(
                id,
                RadioCommand::ConfigureBatchStorage {
                    full_pct,
                    truncated_pct,
                    notify_threshold_pct: BATCH_NOTIFY_THRESHOLD_PCT,
                },
            );
            let (window_ms, interval_ms) = new.window_interval_ms();
            self.commander.issue(
                id,
                RadioCommand::StartBatchScan {
                    window_ms,
                    interval_ms,
                    own_address_type: BATCH_OWN_ADDRESS_TYPE,
                    discard_rule: BATCH_DISCARD_OLDEST,
                },
            );
            self.applied_batch = Some(new);
        }
    }

    /// Read out every configured batch buffer, each gated on its own ack
    fn drain_batch_reports(&mut self, id: ClientId, params: &BatchScanParams) {
        for kind in params.read_kinds() {
            self.commander
                .issue(id, RadioCommand::ReadBatchReports { kind });
        }
    }

    /// Re-arm the flush alarm for the current batch set
    ///
    /// The trigger interval is the shortest buffering delay any batch client
    /// asked for; an empty set leaves no alarm armed.
    fn rearm_flush_alarm(&mut self) {
        self.scheduler.cancel();

        let (delay_ms, representative) = {
            let registry = self.registry.lock().unwrap();
            (
                registry.min_batch_delay_ms(),
                registry.batch_clients().first().map(|c| c.id),
            )
        };
        let (Some(delay_ms), Some(id)) = (delay_ms, representative) else {
            return;
        };

        let delay = Duration::from_millis(delay_ms);
        let window = delay / FLUSH_WINDOW_DIVISOR;
        debug!(
            "arming flush alarm: {} ms with {} ms window",
            delay.as_millis(),
            window.as_millis()
        );

        let queue = self.queue.clone();
        self.scheduler.arm(
            delay,
            window,
            Box::new(move || {
                let _ = queue.send(ScanCommand::Flush { id });
            }),
        );
    }

    fn notify_unregister(&self, id: ClientId) {
        if let Some(callback) = self.unregister.lock().unwrap().as_ref() {
            callback(id);
        }
    }
}
