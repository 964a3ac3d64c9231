//! LE scanner registration and scan sessions
//!
//! This module provides:
//! - Registration of scanners keyed by an application identifier
//! - Scan sessions sharing one controller-wide scan toggle
//! - Delivery of decoded advertising reports to per-scanner delegates
//! - A controller implementation backed by a raw HCI socket

pub mod controller;
pub mod coordinator;
pub mod hci_controller;
pub mod instance;
pub mod registry;
pub mod settings;
pub mod types;

pub use self::controller::{AdapterState, HalUuid, ScannerController};
pub use self::coordinator::ScanCoordinator;
pub use self::hci_controller::{HciControllerConfig, HciScannerController};
pub use self::instance::{ScanDelegate, Scanner};
pub use self::registry::{RegistrationCallback, ScannerRegistry};
pub use self::settings::{CallbackType, ScanFilter, ScanMode, ScanResultType, ScanSettings};
pub use self::types::{BdAddr, BtStatus, ScanResult, ScannerHandle};
