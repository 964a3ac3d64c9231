//! Interfaces the scanner layer consumes
//!
//! Every request returns an immediate status. Registration completions and
//! advertising reports come back later through
//! [`ScannerRegistry::on_registration_complete`] and
//! [`ScannerRegistry::on_scan_result`].
//!
//! [`ScannerRegistry::on_registration_complete`]: crate::scanner::ScannerRegistry::on_registration_complete
//! [`ScannerRegistry::on_scan_result`]: crate::scanner::ScannerRegistry::on_scan_result

use crate::scanner::settings::{ScanFilter, ScanSettings};
use crate::scanner::types::{BtStatus, ScannerHandle};
use crate::uuid::Uuid;
use std::sync::atomic::{AtomicBool, Ordering};

/// Application identifier in the controller's representation (little-endian bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HalUuid(pub [u8; 16]);

impl From<Uuid> for HalUuid {
    fn from(uuid: Uuid) -> Self {
        HalUuid(*uuid.as_bytes_le())
    }
}

impl From<HalUuid> for Uuid {
    fn from(uuid: HalUuid) -> Self {
        Uuid::from_bytes_le(uuid.0)
    }
}

/// Scan primitives offered by a controller
pub trait ScannerController: Send + Sync {
    /// Ask for a scanner handle for `app_uuid`
    ///
    /// On success the outcome arrives later as a registration completion
    /// carrying the same identifier.
    fn register_scanner(&self, app_uuid: &HalUuid) -> BtStatus;

    /// Release a scanner handle
    fn unregister_scanner(&self, handle: ScannerHandle) -> BtStatus;

    /// Switch the shared LE scan on or off on behalf of `handle`
    fn scan(&self, handle: ScannerHandle, enable: bool) -> BtStatus;

    /// Hand scan parameters to the controller before a scan starts
    fn apply_scan_settings(
        &self,
        _handle: ScannerHandle,
        _settings: &ScanSettings,
        _filters: &[ScanFilter],
    ) -> BtStatus {
        BtStatus::Success
    }
}

/// Adapter power state, owned elsewhere
pub trait AdapterState: Send + Sync {
    fn is_enabled(&self) -> bool;
}

impl AdapterState for AtomicBool {
    fn is_enabled(&self) -> bool {
        self.load(Ordering::SeqCst)
    }
}
