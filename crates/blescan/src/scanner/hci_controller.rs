//! Scanner controller backed by a raw HCI socket
//!
//! The LE controller has a single scanner and no notion of scanner handles, so
//! handles are allocated here and the registration completion is queued until
//! the next [`HciScannerController::process_events`] call. Advertising reports
//! read from the socket are forwarded to the registry.

use crate::error::HciError;
use crate::hci::constants::*;
use crate::hci::socket::is_timeout;
use crate::hci::{HciChannel, HciCommand, HciEvent, HciSocket, LeAdvertisingReport};
use crate::scanner::controller::{HalUuid, ScannerController};
use crate::scanner::registry::ScannerRegistry;
use crate::scanner::settings::{ScanFilter, ScanResultType, ScanSettings};
use crate::scanner::types::{BdAddr, BtStatus, ScannerHandle};
use log::{debug, trace, warn};
use std::collections::{BTreeSet, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// Configuration for [`HciScannerController`]
#[derive(Debug, Clone)]
pub struct HciControllerConfig {
    /// HCI device index (0 for hci0)
    pub device_id: u16,
    /// Upper bound on simultaneously registered scanners
    pub max_scanners: u8,
    /// Ask the controller to drop duplicate advertisements
    pub filter_duplicates: bool,
    /// Own address type used in scan requests
    pub own_address_type: u8,
}

impl Default for HciControllerConfig {
    fn default() -> Self {
        Self {
            device_id: 0,
            max_scanners: 32,
            filter_duplicates: false,
            own_address_type: 0x00, // Public
        }
    }
}

struct RegistrationComplete {
    status: BtStatus,
    handle: ScannerHandle,
    app_uuid: HalUuid,
}

/// Production [`ScannerController`] talking to a local controller over HCI
pub struct HciScannerController<C = HciSocket> {
    channel: C,
    config: HciControllerConfig,
    handles: Mutex<BTreeSet<ScannerHandle>>,
    completions: Mutex<VecDeque<RegistrationComplete>>,
    scanning: AtomicBool,
}

impl HciScannerController<HciSocket> {
    /// Open the HCI device named in `config`
    pub fn open(config: HciControllerConfig) -> Result<Self, HciError> {
        let socket = HciSocket::open(config.device_id)?;
        socket.set_event_filter(&[EVT_CMD_COMPLETE, EVT_CMD_STATUS, EVT_LE_META_EVENT])?;

        debug!("Opened hci{} for LE scanning", config.device_id);
        Ok(Self::with_channel(socket, config))
    }
}

impl<C: HciChannel> HciScannerController<C> {
    /// Wrap an already configured channel
    pub fn with_channel(channel: C, config: HciControllerConfig) -> Self {
        Self {
            channel,
            config,
            handles: Mutex::new(BTreeSet::new()),
            completions: Mutex::new(VecDeque::new()),
            scanning: AtomicBool::new(false),
        }
    }

    pub fn config(&self) -> &HciControllerConfig {
        &self.config
    }

    pub fn channel(&self) -> &C {
        &self.channel
    }

    /// Deliver queued registration completions to `registry`
    pub fn dispatch_completions(&self, registry: &ScannerRegistry) -> usize {
        let completions: Vec<_> = self.completions().drain(..).collect();
        let count = completions.len();

        for completion in completions {
            registry.on_registration_complete(completion.status, completion.handle, completion.app_uuid);
        }

        count
    }

    /// Pump controller events into `registry` for `timeout`
    pub fn process_events(&self, registry: &ScannerRegistry, timeout: Duration) -> Result<(), HciError> {
        let start_time = Instant::now();

        loop {
            self.dispatch_completions(registry);

            let elapsed = start_time.elapsed();
            if elapsed >= timeout {
                break;
            }

            match self.channel.read_event_timeout(Some(timeout - elapsed)) {
                Ok(event) => self.handle_event(registry, &event),
                Err(e) if is_timeout(&e) => break,
                Err(HciError::InvalidPacketFormat) => trace!("Skipping malformed HCI packet"),
                Err(e) => return Err(e),
            }
        }

        // Completions queued by callbacks run during this call
        self.dispatch_completions(registry);
        Ok(())
    }

    fn handle_event(&self, registry: &ScannerRegistry, event: &HciEvent) {
        match event.event_code {
            EVT_LE_META_EVENT
                if event.parameters.first() == Some(&EVT_LE_ADVERTISING_REPORT) =>
            {
                match LeAdvertisingReport::parse_from_event(event) {
                    Ok(reports) => {
                        for report in reports {
                            registry.on_scan_result(BdAddr::new(report.address), report.rssi, &report.data);
                        }
                    }
                    Err(e) => warn!("Dropping advertising report: {}", e),
                }
            }
            EVT_CMD_COMPLETE | EVT_CMD_STATUS => {
                let status = event.get_status();
                if status != 0 {
                    warn!(
                        "Command 0x{:04X} failed with status 0x{:02X}",
                        event.command_opcode().unwrap_or_default(),
                        status
                    );
                }
            }
            code => trace!("Ignoring HCI event 0x{:02X}", code),
        }
    }

    fn allocate_handle(&self) -> Option<ScannerHandle> {
        let mut handles = self.handles();
        let handle = (1..=self.config.max_scanners)
            .map(ScannerHandle)
            .find(|h| !handles.contains(h))?;
        handles.insert(handle);
        Some(handle)
    }

    fn send(&self, command: &HciCommand) -> BtStatus {
        match self.channel.send_command(command) {
            Ok(()) => BtStatus::Success,
            Err(e) => {
                warn!("Sending HCI command 0x{:04X} failed: {}", command.opcode(), e);
                BtStatus::Fail
            }
        }
    }

    fn handles(&self) -> MutexGuard<'_, BTreeSet<ScannerHandle>> {
        self.handles.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn completions(&self) -> MutexGuard<'_, VecDeque<RegistrationComplete>> {
        self.completions.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<C: HciChannel> ScannerController for HciScannerController<C> {
    fn register_scanner(&self, app_uuid: &HalUuid) -> BtStatus {
        let Some(handle) = self.allocate_handle() else {
            warn!("No free scanner handles ({} in use)", self.config.max_scanners);
            return BtStatus::NoMemory;
        };

        self.completions().push_back(RegistrationComplete {
            status: BtStatus::Success,
            handle,
            app_uuid: *app_uuid,
        });
        BtStatus::Success
    }

    fn unregister_scanner(&self, handle: ScannerHandle) -> BtStatus {
        if self.handles().remove(&handle) {
            BtStatus::Success
        } else {
            BtStatus::InvalidParameter
        }
    }

    fn scan(&self, handle: ScannerHandle, enable: bool) -> BtStatus {
        debug!("Scanner {} turns LE scan {}", handle, if enable { "on" } else { "off" });

        let status = self.send(&HciCommand::LeSetScanEnable {
            enable,
            filter_duplicates: enable && self.config.filter_duplicates,
        });
        // A failed disable still ends the session on the host side
        if status.is_success() || !enable {
            self.scanning.store(enable, Ordering::SeqCst);
        }
        status
    }

    fn apply_scan_settings(
        &self,
        handle: ScannerHandle,
        settings: &ScanSettings,
        filters: &[ScanFilter],
    ) -> BtStatus {
        if self.scanning.load(Ordering::SeqCst) {
            // Parameters cannot change while the controller is scanning
            debug!("Scan running, scanner {} shares current parameters", handle);
            return BtStatus::Success;
        }

        if !filters.is_empty() {
            debug!("Legacy LE scan has no controller filtering; {} filter(s) ignored", filters.len());
        }

        let (scan_interval, scan_window) = settings.mode.interval_and_window();
        let scan_type = match settings.result_type {
            ScanResultType::Full => LE_SCAN_ACTIVE,
            ScanResultType::Abbreviated => LE_SCAN_PASSIVE,
        };

        self.send(&HciCommand::LeSetScanParameters {
            scan_type,
            scan_interval,
            scan_window,
            own_address_type: self.config.own_address_type,
            filter_policy: 0x00,
        })
    }
}
