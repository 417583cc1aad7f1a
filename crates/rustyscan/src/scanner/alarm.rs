//! Deferred flush wake-ups
//!
//! At most one flush alarm is outstanding at a time; arming replaces any
//! previous one. The platform is free to fire anywhere inside the allowed
//! window so wake-ups can coalesce.

use rand::Rng;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Scheduler for a single outstanding deferred wake
pub trait WakeupScheduler: Send + Sync {
    /// Arm a wake `delay` from now, cancelling any outstanding one. The wake
    /// may fire anywhere in `[delay, delay + window]`.
    fn arm(&self, delay: Duration, window: Duration, wake: Box<dyn FnOnce() + Send>);

    /// Cancel the outstanding wake, if any
    fn cancel(&self);
}

/// Thread-backed scheduler
///
/// Each arm spawns a sleeper stamped with the current generation; bumping
/// the generation orphans older sleepers, which exit without firing.
pub struct ThreadWakeupScheduler {
    generation: Arc<AtomicU64>,
}

impl ThreadWakeupScheduler {
    pub fn new() -> Self {
        Self {
            generation: Arc::new(AtomicU64::new(0)),
        }
    }
}

impl Default for ThreadWakeupScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl WakeupScheduler for ThreadWakeupScheduler {
    fn arm(&self, delay: Duration, window: Duration, wake: Box<dyn FnOnce() + Send>) {
        let stamp = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let generation = Arc::clone(&self.generation);

        let jitter = if window.is_zero() {
            Duration::ZERO
        } else {
            window.mul_f64(rand::thread_rng().gen::<f64>())
        };

        thread::spawn(move || {
            thread::sleep(delay + jitter);
            if generation.load(Ordering::SeqCst) == stamp {
                wake();
            }
        });
    }

    fn cancel(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }
}
