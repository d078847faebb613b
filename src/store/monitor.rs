//! Periodic health scanning on a background thread

use std::io;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use super::SharedStore;

/// Runs [`super::PlantStore::scan_health`] once at start and then on every
/// interval until stopped
pub struct HealthMonitor {
    stop_tx: Option<mpsc::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl HealthMonitor {
    /// Spawns the monitor thread
    pub fn start(store: SharedStore, interval: Duration) -> io::Result<Self> {
        let (stop_tx, stop_rx) = mpsc::channel::<()>();

        let handle = thread::Builder::new()
            .name("health-monitor".to_string())
            .spawn(move || {
                tracing::debug!("Health monitor started, interval {:?}", interval);
                loop {
                    let changes = store.lock().scan_health();
                    tracing::debug!("Health scan finished with {} changes", changes.len());

                    match stop_rx.recv_timeout(interval) {
                        Err(RecvTimeoutError::Timeout) => continue,
                        // Explicit stop, or the monitor handle was dropped
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
                tracing::debug!("Health monitor stopped");
            })?;

        Ok(Self {
            stop_tx: Some(stop_tx),
            handle: Some(handle),
        })
    }

    /// Returns true until [`HealthMonitor::stop`] has been called
    pub fn is_running(&self) -> bool {
        self.handle
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Stops the thread and waits for an in-flight scan to finish
    pub fn stop(&mut self) {
        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::error!("Health monitor thread panicked");
            }
        }
    }
}

impl Drop for HealthMonitor {
    fn drop(&mut self) {
        self.stop();
    }
}
