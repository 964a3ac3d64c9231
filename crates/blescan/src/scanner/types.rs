use crate::advertising::{parse_advertising_data, trim_advertising_data};
use std::fmt;

/// Scanner handle assigned by the controller when a registration completes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScannerHandle(pub u8);

impl fmt::Display for ScannerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Status codes reported by the controller interface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BtStatus {
    Success,
    Fail,
    NotReady,
    NoMemory,
    Busy,
    Done,
    Unsupported,
    InvalidParameter,
    Unhandled,
}

impl BtStatus {
    pub fn is_success(self) -> bool {
        self == BtStatus::Success
    }
}

impl From<u8> for BtStatus {
    fn from(value: u8) -> Self {
        match value {
            0 => BtStatus::Success,
            2 => BtStatus::NotReady,
            3 => BtStatus::NoMemory,
            4 => BtStatus::Busy,
            5 => BtStatus::Done,
            6 => BtStatus::Unsupported,
            7 => BtStatus::InvalidParameter,
            8 => BtStatus::Unhandled,
            _ => BtStatus::Fail,
        }
    }
}

impl From<BtStatus> for u8 {
    fn from(value: BtStatus) -> Self {
        match value {
            BtStatus::Success => 0,
            BtStatus::Fail => 1,
            BtStatus::NotReady => 2,
            BtStatus::NoMemory => 3,
            BtStatus::Busy => 4,
            BtStatus::Done => 5,
            BtStatus::Unsupported => 6,
            BtStatus::InvalidParameter => 7,
            BtStatus::Unhandled => 8,
        }
    }
}

/// Bluetooth device address
///
/// Stored little-endian, the order HCI uses on the wire. Displayed most
/// significant byte first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BdAddr {
    pub bytes: [u8; 6],
}

impl BdAddr {
    /// Create an address from little-endian (HCI wire order) bytes
    pub fn new(bytes: [u8; 6]) -> Self {
        Self { bytes }
    }

    /// Create an address from bytes in display order, most significant first
    pub fn from_display_order(mut bytes: [u8; 6]) -> Self {
        bytes.reverse();
        Self { bytes }
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }
}

impl fmt::Display for BdAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02X}:{:02X}:{:02X}:{:02X}:{:02X}:{:02X}",
            self.bytes[5],
            self.bytes[4],
            self.bytes[3],
            self.bytes[2],
            self.bytes[1],
            self.bytes[0]
        )
    }
}

/// One observed advertisement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanResult {
    address: BdAddr,
    rssi: i8,
    scan_record: Vec<u8>,
}

impl ScanResult {
    /// Build a result from a raw report, trimming the advertising data
    pub fn new(address: BdAddr, rssi: i8, advertising_data: &[u8]) -> Self {
        Self {
            address,
            rssi,
            scan_record: trim_advertising_data(advertising_data).to_vec(),
        }
    }

    pub fn address(&self) -> BdAddr {
        self.address
    }

    /// Device address as colon-separated hex
    pub fn device_address(&self) -> String {
        self.address.to_string()
    }

    pub fn rssi(&self) -> i8 {
        self.rssi
    }

    /// Trimmed advertising data
    pub fn scan_record(&self) -> &[u8] {
        &self.scan_record
    }

    /// AD structures of the scan record as (type, data) pairs
    pub fn advertising_structures(&self) -> Vec<(u8, &[u8])> {
        parse_advertising_data(&self.scan_record)
    }
}
