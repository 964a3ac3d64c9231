//! Scan settings and filters
//!
//! These are handed to the controller untouched; the registry and scanners
//! never interpret them.

use crate::scanner::types::BdAddr;
use crate::uuid::Uuid;
use bitflags::bitflags;
use std::time::Duration;

/// Duty cycle requested for a scan session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanMode {
    /// Long interval, short window
    #[default]
    LowPower,
    Balanced,
    /// Scan continuously
    LowLatency,
}

impl ScanMode {
    /// LE scan interval and window, in 0.625 ms units
    pub fn interval_and_window(self) -> (u16, u16) {
        match self {
            ScanMode::LowPower => (0x08C0, 0x00E0),  // 1400 ms / 140 ms
            ScanMode::Balanced => (0x0490, 0x0125),  // 730 ms / 183 ms
            ScanMode::LowLatency => (0x00A0, 0x00A0), // 100 ms / 100 ms
        }
    }
}

bitflags! {
    /// Which matches produce a callback
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct CallbackType: u8 {
        const ALL_MATCHES = 0x01;
        const FIRST_MATCH = 0x02;
        const MATCH_LOST = 0x04;
    }
}

impl Default for CallbackType {
    fn default() -> Self {
        CallbackType::ALL_MATCHES
    }
}

/// Amount of data requested per result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanResultType {
    /// Advertising data plus scan responses (active scanning)
    #[default]
    Full,
    Abbreviated,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ScanSettings {
    pub mode: ScanMode,
    pub callback_type: CallbackType,
    pub result_type: ScanResultType,
    /// Zero delivers results immediately
    pub report_delay: Duration,
}

/// Criteria a controller may use to filter advertisements
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ScanFilter {
    pub device_address: Option<BdAddr>,
    pub device_name: Option<String>,
    pub service_uuid: Option<Uuid>,
    pub service_uuid_mask: Option<Uuid>,
    pub manufacturer_id: Option<u16>,
    pub manufacturer_data: Vec<u8>,
    pub manufacturer_data_mask: Vec<u8>,
}
