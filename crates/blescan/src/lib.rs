//! blescan - host-side Bluetooth LE scanning
//!
//! This library lets independent callers register LE scanners with a
//! controller, start and stop scanning without fighting over the shared scan
//! toggle, and receive decoded advertising reports. It also provides the HCI
//! packet layer and an opcode-keyed command dispatcher used to route
//! inbound commands to controller components.

pub mod advertising;
pub mod error;
pub mod hci;
pub mod scanner;
pub mod uuid;

// Re-export common types for convenience
pub use advertising::{parse_advertising_data, trim_advertising_data};
pub use error::{HciError, ScanError};
pub use hci::{CommandDispatcher, CommandPacket, H4Transport, HciSocket, HciTransport};
pub use scanner::{
    AdapterState, BdAddr, BtStatus, HciScannerController, ScanDelegate, ScanFilter, ScanResult,
    ScanSettings, Scanner, ScannerController, ScannerHandle, ScannerRegistry,
};
pub use uuid::Uuid;

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::unix::io::AsRawFd;

    #[test]
    fn test_open_hci_socket() {
        // Needs a Bluetooth adapter and CAP_NET_RAW; skipped otherwise
        if let Ok(socket) = HciSocket::open(0) {
            assert!(socket.as_raw_fd() > 0);
        }
    }
}
