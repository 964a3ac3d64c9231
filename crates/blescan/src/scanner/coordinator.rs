use crate::scanner::controller::ScannerController;
use crate::scanner::types::{BtStatus, ScannerHandle};
use log::{debug, warn};
use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

/// Owns the single on/off scan line shared by every scanner
///
/// The controller is toggled on when the first scanner starts and off when the
/// last one stops.
pub struct ScanCoordinator {
    controller: Arc<dyn ScannerController>,
    clients: Mutex<HashSet<ScannerHandle>>,
}

impl ScanCoordinator {
    pub fn new(controller: Arc<dyn ScannerController>) -> Self {
        Self {
            controller,
            clients: Mutex::new(HashSet::new()),
        }
    }

    /// Add `handle` to the scanning set
    ///
    /// Starting a scanner that is already scanning is a no-op.
    pub fn start(&self, handle: ScannerHandle) -> BtStatus {
        let mut clients = self.clients.lock().unwrap_or_else(PoisonError::into_inner);

        if clients.contains(&handle) {
            debug!("Scanner {} already scanning", handle);
            return BtStatus::Success;
        }

        if clients.is_empty() {
            let status = self.controller.scan(handle, true);
            if !status.is_success() {
                warn!("Enabling scan for scanner {} failed: {:?}", handle, status);
                return status;
            }
        }

        clients.insert(handle);
        BtStatus::Success
    }

    /// Remove `handle` from the scanning set
    ///
    /// The handle is removed even if disabling the scan fails.
    pub fn stop(&self, handle: ScannerHandle) -> BtStatus {
        let mut clients = self.clients.lock().unwrap_or_else(PoisonError::into_inner);

        if !clients.remove(&handle) {
            return BtStatus::Success;
        }

        if !clients.is_empty() {
            return BtStatus::Success;
        }

        let status = self.controller.scan(handle, false);
        if !status.is_success() {
            warn!("Disabling scan for scanner {} failed: {:?}", handle, status);
        }
        status
    }

    /// Number of scanners currently scanning
    pub fn active_count(&self) -> usize {
        self.clients
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
