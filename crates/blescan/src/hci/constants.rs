//! HCI protocol constants
//!
//! This module contains constants used in the Bluetooth HCI protocol.

// HCI packet types (H4 indicators)
pub const HCI_COMMAND_PKT: u8 = 0x01;
pub const HCI_ACL_PKT: u8 = 0x02;
pub const HCI_EVENT_PKT: u8 = 0x04;

// Header sizes, excluding the packet type byte
pub const HCI_COMMAND_HDR_SIZE: usize = 3;
pub const HCI_ACL_HDR_SIZE: usize = 4;
pub const HCI_EVENT_HDR_SIZE: usize = 2;

// Max event packet including the type byte
pub const HCI_MAX_EVENT_SIZE: usize = 258;

// OGF (Opcode Group Field) values
pub const OGF_HOST_CTL: u8 = 0x03;
pub const OGF_LE: u8 = 0x08;
pub const OGF_VENDOR: u8 = 0x3F;

// Host Controller Commands (OGF: 0x03)
pub const OCF_RESET: u16 = 0x0003;

// LE Command OCF values (OGF: 0x08)
pub const OCF_LE_SET_EVENT_MASK: u16 = 0x0001;
pub const OCF_LE_SET_SCAN_PARAMETERS: u16 = 0x000B;
pub const OCF_LE_SET_SCAN_ENABLE: u16 = 0x000C;

// HCI Events
pub const EVT_CMD_COMPLETE: u8 = 0x0E;
pub const EVT_CMD_STATUS: u8 = 0x0F;
pub const EVT_LE_META_EVENT: u8 = 0x3E;

// LE Meta Events
pub const EVT_LE_CONN_COMPLETE: u8 = 0x01;
pub const EVT_LE_ADVERTISING_REPORT: u8 = 0x02;

// LE event mask bit enabling advertising reports
pub const LE_EVENT_MASK_ADVERTISING_REPORT: u64 = 1 << 1;

// LE scan types
pub const LE_SCAN_PASSIVE: u8 = 0x00;
pub const LE_SCAN_ACTIVE: u8 = 0x01;

/// Combine OGF and OCF into a 16-bit opcode
pub const fn opcode(ogf: u8, ocf: u16) -> u16 {
    ((ogf as u16) << 10) | (ocf & 0x03FF)
}
