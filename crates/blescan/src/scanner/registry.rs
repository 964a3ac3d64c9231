//! Scanner registration
//!
//! Registration is a two-step exchange: the request is accepted (or refused)
//! right away, and the controller later reports the outcome together with the
//! handle it picked. The only link between the two is the application
//! identifier, so at most one registration per identifier may be in flight.

use crate::error::ScanError;
use crate::scanner::controller::{AdapterState, HalUuid, ScannerController};
use crate::scanner::coordinator::ScanCoordinator;
use crate::scanner::instance::{Scanner, ScannerState};
use crate::scanner::types::{BdAddr, BtStatus, ScanResult, ScannerHandle};
use crate::uuid::Uuid;
use log::{debug, error, info, trace, warn};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, Weak};

/// Callback receiving the outcome of a registration
pub type RegistrationCallback = Box<dyn FnOnce(Uuid, Result<Scanner, ScanError>) + Send + 'static>;

pub(crate) struct RegistryInner {
    pub(crate) controller: Arc<dyn ScannerController>,
    pub(crate) adapter: Arc<dyn AdapterState>,
    pub(crate) coordinator: ScanCoordinator,

    /// Registrations accepted by the controller but not completed
    pending: Mutex<HashMap<Uuid, RegistrationCallback>>,

    /// Scanners handed out, by controller handle
    live: Mutex<HashMap<ScannerHandle, Weak<ScannerState>>>,
}

impl RegistryInner {
    /// Forget `handle` and release it at the controller
    ///
    /// The controller's answer is only logged; the scanner is gone either way.
    pub(crate) fn unregister(&self, handle: ScannerHandle) {
        self.live
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&handle);

        let status = self.controller.unregister_scanner(handle);
        if status.is_success() {
            debug!("Unregistered scanner {}", handle);
        } else {
            warn!("Failed to unregister scanner {}: {:?}", handle, status);
        }
    }
}

/// Creates [`Scanner`]s and routes controller notifications to them
pub struct ScannerRegistry {
    inner: Arc<RegistryInner>,
}

impl ScannerRegistry {
    pub fn new(controller: Arc<dyn ScannerController>, adapter: Arc<dyn AdapterState>) -> Self {
        let coordinator = ScanCoordinator::new(Arc::clone(&controller));
        Self {
            inner: Arc::new(RegistryInner {
                controller,
                adapter,
                coordinator,
                pending: Mutex::new(HashMap::new()),
                live: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Request a scanner for `app_uuid`
    ///
    /// `Ok` means the controller accepted the request and `callback` will run
    /// once it completes. On `Err` the callback is dropped without being called.
    pub fn register_instance<F>(&self, app_uuid: Uuid, callback: F) -> Result<(), ScanError>
    where
        F: FnOnce(Uuid, Result<Scanner, ScanError>) + Send + 'static,
    {
        {
            let mut pending = self.pending();
            if pending.contains_key(&app_uuid) {
                debug!("Registration for {} already pending", app_uuid);
                return Err(ScanError::DuplicateRegistration(app_uuid));
            }
            // Reserved before calling out so a completion racing the return finds it
            pending.insert(app_uuid, Box::new(callback));
        }

        let status = self.inner.controller.register_scanner(&HalUuid::from(app_uuid));
        if !status.is_success() {
            warn!("Controller refused registration for {}: {:?}", app_uuid, status);
            self.pending().remove(&app_uuid);
            return Err(ScanError::ControllerStatus(status));
        }

        debug!("Registration for {} dispatched", app_uuid);
        Ok(())
    }

    /// Completion of a registration, as reported by the controller
    ///
    /// Completions for identifiers with nothing pending are ignored.
    pub fn on_registration_complete(&self, status: BtStatus, handle: ScannerHandle, app_uuid: HalUuid) {
        let app_uuid = Uuid::from(app_uuid);

        let callback = match self.pending().remove(&app_uuid) {
            Some(callback) => callback,
            None => {
                debug!("Ignoring registration completion for unknown app {}", app_uuid);
                return;
            }
        };

        if !status.is_success() {
            warn!("Registration for {} failed: {:?}", app_uuid, status);
            callback(app_uuid, Err(ScanError::RegistrationFailed(status)));
            return;
        }

        let state = Arc::new(ScannerState::new(handle, app_uuid));
        {
            let mut live = self.live();
            if live.get(&handle).is_some_and(|s| s.strong_count() > 0) {
                drop(live);
                error!("Controller assigned handle {} which is still in use", handle);
                callback(app_uuid, Err(ScanError::HandleInUse(handle)));
                return;
            }
            live.insert(handle, Arc::downgrade(&state));
        }

        info!("Registered scanner {} for app {}", handle, app_uuid);
        callback(app_uuid, Ok(Scanner::new(state, Arc::clone(&self.inner))));
    }

    /// An advertising report from the controller
    ///
    /// The report is decoded once and offered to every live scanner; returns
    /// how many delegates received it.
    pub fn on_scan_result(&self, address: BdAddr, rssi: i8, advertising_data: &[u8]) -> usize {
        let result = ScanResult::new(address, rssi, advertising_data);

        let scanners: Vec<_> = self.live().values().filter_map(Weak::upgrade).collect();

        let delivered = scanners.iter().filter(|s| s.deliver(&result)).count();
        trace!(
            "Scan result from {} delivered to {} scanner(s)",
            result.device_address(),
            delivered
        );
        delivered
    }

    /// Check whether a registration for `app_uuid` is in flight
    pub fn is_pending(&self, app_uuid: &Uuid) -> bool {
        self.pending().contains_key(app_uuid)
    }

    /// Number of registrations in flight
    pub fn pending_count(&self) -> usize {
        self.pending().len()
    }

    /// Number of scanners handed out and not yet dropped
    pub fn live_count(&self) -> usize {
        self.live().values().filter(|s| s.strong_count() > 0).count()
    }

    /// Number of scanners currently scanning
    pub fn scanning_count(&self) -> usize {
        self.inner.coordinator.active_count()
    }

    fn pending(&self) -> std::sync::MutexGuard<'_, HashMap<Uuid, RegistrationCallback>> {
        self.inner
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn live(&self) -> std::sync::MutexGuard<'_, HashMap<ScannerHandle, Weak<ScannerState>>> {
        self.inner.live.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
