//! Hardware protocol driver
//!
//! Every configuration primitive is asynchronous at the radio boundary: the
//! call returns as soon as the command is queued and a completion event
//! arrives later, keyed only by client identifier and status. This module
//! adapts that to the synchronous shape the admission worker needs: arm a
//! fresh single-shot signal, submit, block until the signal resolves or the
//! ack window lapses. The worker never has two primitives in flight, which is
//! what keeps the identifier-only correlation safe.

use super::command::RadioCommand;
use super::constants::ACK_TIMEOUT_MS;
use crate::error::ScanResult;
use log::{debug, warn};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Identifier the controller echoes back in completion events
pub type ClientId = u32;

/// Controller features discovered at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerCapabilities {
    /// Whether the controller offloads match filtering
    pub filtering_supported: bool,
    /// Total number of hardware filter slots, reserved slots included
    pub max_filter_slots: u8,
}

/// Interface to the radio
///
/// Implementations queue the command toward the controller and return
/// immediately; the completion for each command must be fed back through
/// [`crate::scanner::ScanManager::on_hardware_ack`].
pub trait RadioHal: Send + Sync {
    /// Query controller features. Called once at coordinator construction.
    fn capabilities(&self) -> ControllerCapabilities;

    /// Submit one configuration primitive on behalf of a client.
    fn submit(&self, client: ClientId, command: RadioCommand) -> ScanResult<()>;
}

/// Single-shot completion signal for the primitive currently in flight
///
/// Arming hands back a fresh receiver and invalidates any previous one, so a
/// stale completion from an earlier primitive can never satisfy a later
/// wait.
pub struct AckSignal {
    slot: Mutex<Option<Sender<()>>>,
}

impl AckSignal {
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(None),
        }
    }

    /// Re-arm the signal for the next primitive
    pub fn arm(&self) -> Receiver<()> {
        let (tx, rx) = mpsc::channel();
        *self.slot.lock().unwrap() = Some(tx);
        rx
    }

    /// Resolve the outstanding wait, if any
    ///
    /// Returns false when no primitive is outstanding or the waiter already
    /// gave up.
    pub fn complete(&self) -> bool {
        match self.slot.lock().unwrap().take() {
            Some(tx) => tx.send(()).is_ok(),
            None => false,
        }
    }
}

impl Default for AckSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// Issues primitives one at a time, gated on the controller's acknowledgment
pub struct RadioCommander {
    hal: Arc<dyn RadioHal>,
    signal: Arc<AckSignal>,
}

impl RadioCommander {
    pub fn new(hal: Arc<dyn RadioHal>, signal: Arc<AckSignal>) -> Self {
        Self { hal, signal }
    }

    pub fn capabilities(&self) -> ControllerCapabilities {
        self.hal.capabilities()
    }

    /// Issue one primitive and block until the controller acknowledges it or
    /// the ack window lapses.
    ///
    /// Returns true only on a confirmed acknowledgment. A timeout is logged
    /// and treated by callers as success; the controller is assumed to have
    /// applied the command even though it never said so.
    pub fn issue(&self, client: ClientId, command: RadioCommand) -> bool {
        let rx = self.signal.arm();
        debug!("client {}: issuing {:?}", client, command);

        if let Err(e) = self.hal.submit(client, command) {
            warn!("client {}: radio refused command: {}", client, e);
            return false;
        }

        match rx.recv_timeout(Duration::from_millis(ACK_TIMEOUT_MS)) {
            Ok(()) => true,
            Err(_) => {
                warn!(
                    "client {}: no ack within {} ms, proceeding",
                    client, ACK_TIMEOUT_MS
                );
                false
            }
        }
    }
}
