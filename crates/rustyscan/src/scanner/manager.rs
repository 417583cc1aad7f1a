//! Scan coordination facade
//!
//! `ScanManager` owns the admission queue and worker thread, and is the
//! in-process surface the owning service talks to: it enqueues admission
//! requests, feeds hardware completions into the ack signal, and fans
//! delivered advertisements out to regular clients.

use super::alarm::{ThreadWakeupScheduler, WakeupScheduler};
use super::filter::FilterPool;
use super::registry::ClientRegistry;
use super::types::{AdvReport, BdAddr, ScanClient, UnregisterCallback};
use super::worker::{AdmissionWorker, ScanCommand};
use crate::adv;
use crate::error::{ScanError, ScanResult};
use crate::hal::{AckSignal, ClientId, RadioCommander, RadioHal};
use log::{debug, info, warn};
use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

pub struct ScanManager {
    queue: Sender<ScanCommand>,
    registry: Arc<Mutex<ClientRegistry>>,
    signal: Arc<AckSignal>,
    unregister: Arc<Mutex<Option<UnregisterCallback>>>,
    worker: Option<JoinHandle<()>>,
}

impl ScanManager {
    /// Create a coordinator over the given radio with the default
    /// thread-backed flush scheduler
    pub fn new(hal: Arc<dyn RadioHal>) -> ScanResult<Self> {
        Self::with_scheduler(hal, Arc::new(ThreadWakeupScheduler::new()))
    }

    /// Create a coordinator with a caller-supplied flush scheduler
    pub fn with_scheduler(
        hal: Arc<dyn RadioHal>,
        scheduler: Arc<dyn WakeupScheduler>,
    ) -> ScanResult<Self> {
        let caps = hal.capabilities();
        info!(
            "controller capabilities: filtering={}, filter slots={}",
            caps.filtering_supported, caps.max_filter_slots
        );

        let signal = Arc::new(AckSignal::new());
        let registry = Arc::new(Mutex::new(ClientRegistry::new()));
        let unregister: Arc<Mutex<Option<UnregisterCallback>>> = Arc::new(Mutex::new(None));
        let (queue, rx) = mpsc::channel();

        let worker = AdmissionWorker::new(
            Arc::clone(&registry),
            FilterPool::new(caps.max_filter_slots),
            RadioCommander::new(hal, Arc::clone(&signal)),
            caps,
            scheduler,
            queue.clone(),
            Arc::clone(&unregister),
        );
        let handle = std::thread::Builder::new()
            .name("scan-admission".into())
            .spawn(move || worker.run(rx))?;

        Ok(Self {
            queue,
            registry,
            signal,
            unregister,
            worker: Some(handle),
        })
    }

    /// Register a callback invoked when a dead client's identity must be
    /// unregistered upstream
    pub fn set_unregister_callback<F>(&self, callback: F)
    where
        F: Fn(ClientId) + Send + 'static,
    {
        *self.unregister.lock().unwrap() = Some(Box::new(callback));
    }

    /// Queue a scan start for a client
    pub fn start_scan(&self, client: ScanClient) -> ScanResult<()> {
        self.queue
            .send(ScanCommand::Start(client))
            .map_err(|_| ScanError::WorkerStopped)
    }

    /// Queue a scan stop for a client
    ///
    /// `owner_died` marks stops caused by the owning process dying; those
    /// additionally unregister the client's identity upstream.
    pub fn stop_scan(&self, id: ClientId, owner_died: bool) -> ScanResult<()> {
        self.queue
            .send(ScanCommand::Stop { id, owner_died })
            .map_err(|_| ScanError::WorkerStopped)
    }

    /// Queue a drain of the batch result buffers
    pub fn flush_batch(&self, id: ClientId) -> ScanResult<()> {
        self.queue
            .send(ScanCommand::Flush { id })
            .map_err(|_| ScanError::WorkerStopped)
    }

    /// Completion notification from the radio
    ///
    /// Resolves the outstanding primitive's signal on success; failures and
    /// stray completions are logged and dropped.
    pub fn on_hardware_ack(&self, client: ClientId, status: u8) {
        if status != 0 {
            warn!("client {}: controller reported status {}", client, status);
            return;
        }
        if !self.signal.complete() {
            debug!("client {}: ack with no primitive outstanding", client);
        }
    }

    /// Per-match delivery from the radio
    ///
    /// Fans the advertisement out to every regular client whose requested
    /// UUID set is contained in the payload's advertised services.
    pub fn on_scan_result(&self, address: BdAddr, rssi: i8, data: &[u8]) {
        let registry = self.registry.lock().unwrap();
        deliver_report(&registry, address, rssi, data);
    }

    /// Whether a client currently holds an active scan
    pub fn is_active(&self, id: ClientId) -> bool {
        self.registry.lock().unwrap().get(id).is_some()
    }
}

impl Drop for ScanManager {
    fn drop(&mut self) {
        let _ = self.queue.send(ScanCommand::Shutdown);
        if let Some(handle) = self.worker.take() {
            let _ = handle.join();
        }
    }
}

/// Deliver one advertisement to the matching regular clients
pub(crate) fn deliver_report(registry: &ClientRegistry, address: BdAddr, rssi: i8, data: &[u8]) {
    let report = AdvReport {
        address,
        rssi,
        data: data.to_vec(),
    };

    for client in registry.regular_clients() {
        if !adv::matches_uuid_filter(&client.match_uuids, data) {
            continue;
        }
        if let Some(callback) = &client.callback {
            callback(&report);
        }
    }
}
