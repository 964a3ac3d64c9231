use crate::error::ScanError;
use crate::scanner::registry::RegistryInner;
use crate::scanner::settings::{ScanFilter, ScanSettings};
use crate::scanner::types::{ScanResult, ScannerHandle};
use crate::uuid::Uuid;
use log::{debug, warn};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};

/// Receives scan results for a scanner
pub trait ScanDelegate: Send + Sync {
    /// Called once per report while the scanner is scanning
    fn on_scan_result(&self, scanner: ScannerHandle, result: &ScanResult);
}

/// State shared between a [`Scanner`] and the registry's report path
pub(crate) struct ScannerState {
    handle: ScannerHandle,
    app_uuid: Uuid,
    scanning: AtomicBool,
    delegate: Mutex<Option<Weak<dyn ScanDelegate>>>,
}

impl ScannerState {
    pub(crate) fn new(handle: ScannerHandle, app_uuid: Uuid) -> Self {
        Self {
            handle,
            app_uuid,
            scanning: AtomicBool::new(false),
            delegate: Mutex::new(None),
        }
    }

    /// Hand `result` to the delegate
    ///
    /// Dropped when not scanning, when no delegate is set, or when the
    /// delegate is gone. The delegate runs without any lock held.
    pub(crate) fn deliver(&self, result: &ScanResult) -> bool {
        if !self.scanning.load(Ordering::SeqCst) {
            return false;
        }

        let delegate = self
            .delegate
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .and_then(Weak::upgrade);

        match delegate {
            Some(delegate) => {
                delegate.on_scan_result(self.handle, result);
                true
            }
            None => false,
        }
    }

    fn replace_delegate(&self, delegate: Option<Weak<dyn ScanDelegate>>) {
        *self.delegate.lock().unwrap_or_else(PoisonError::into_inner) = delegate;
    }
}

/// A registered LE scanner
///
/// Handed out by [`ScannerRegistry`](crate::scanner::ScannerRegistry) once the
/// controller confirms a registration. Dropping it stops any scan it started
/// and unregisters it from the controller.
pub struct Scanner {
    state: Arc<ScannerState>,
    registry: Arc<RegistryInner>,
}

impl Scanner {
    pub(crate) fn new(state: Arc<ScannerState>, registry: Arc<RegistryInner>) -> Self {
        Self { state, registry }
    }

    /// Handle assigned by the controller
    pub fn handle(&self) -> ScannerHandle {
        self.state.handle
    }

    /// Identifier the scanner was registered with
    pub fn app_identifier(&self) -> Uuid {
        self.state.app_uuid
    }

    pub fn is_scanning(&self) -> bool {
        self.state.scanning.load(Ordering::SeqCst)
    }

    /// Start a scan session
    ///
    /// Fails without touching the controller when the adapter is disabled.
    pub fn start_scan(&self, settings: &ScanSettings, filters: &[ScanFilter]) -> Result<(), ScanError> {
        if !self.registry.adapter.is_enabled() {
            debug!("Scanner {}: adapter disabled, not scanning", self.handle());
            return Err(ScanError::AdapterDisabled);
        }

        let status = self
            .registry
            .controller
            .apply_scan_settings(self.handle(), settings, filters);
        if !status.is_success() {
            warn!("Scanner {}: scan settings rejected: {:?}", self.handle(), status);
            return Err(ScanError::ControllerStatus(status));
        }

        let status = self.registry.coordinator.start(self.handle());
        if !status.is_success() {
            return Err(ScanError::ControllerStatus(status));
        }

        self.state.scanning.store(true, Ordering::SeqCst);
        Ok(())
    }

    /// Stop the scan session
    ///
    /// The scanner stops receiving results even if the controller reports an error.
    pub fn stop_scan(&self) -> Result<(), ScanError> {
        self.state.scanning.store(false, Ordering::SeqCst);

        let status = self.registry.coordinator.stop(self.handle());
        if status.is_success() {
            Ok(())
        } else {
            Err(ScanError::ControllerStatus(status))
        }
    }

    /// Deliver results to `delegate` without keeping it alive
    pub fn set_delegate<D: ScanDelegate + 'static>(&self, delegate: &Arc<D>) {
        let weak = Arc::downgrade(delegate);
        let weak: Weak<dyn ScanDelegate> = weak;
        self.state.replace_delegate(Some(weak));
    }

    /// Detach the delegate; later results are dropped
    pub fn clear_delegate(&self) {
        self.state.replace_delegate(None);
    }
}

impl Drop for Scanner {
    fn drop(&mut self) {
        if self.is_scanning() {
            // Errors are logged by the coordinator
            let _ = self.stop_scan();
        }
        self.registry.unregister(self.handle());
    }
}

impl fmt::Debug for Scanner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scanner")
            .field("handle", &self.state.handle)
            .field("app_uuid", &self.state.app_uuid)
            .field("scanning", &self.is_scanning())
            .finish()
    }
}
