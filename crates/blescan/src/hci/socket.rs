//! HCI Socket implementation for Bluetooth communication
//!
//! This module provides a wrapper around the raw HCI socket interface,
//! allowing for communication with Bluetooth controllers.

use crate::error::HciError;
use crate::hci::constants::{HCI_EVENT_PKT, HCI_MAX_EVENT_SIZE};
use crate::hci::packet::{HciCommand, HciEvent};
use log::trace;
use std::os::unix::io::{AsRawFd, RawFd};
use std::time::Duration;

// Bluetooth socket constants
const AF_BLUETOOTH: i32 = 31;
const BTPROTO_HCI: i32 = 1;
const HCI_CHANNEL_RAW: u16 = 0;
const SOL_HCI: i32 = 0;
const HCI_FILTER: i32 = 2;

/// Represents an HCI socket
#[derive(Debug)]
pub struct HciSocket {
    fd: RawFd,
}

#[repr(C)]
struct SockaddrHci {
    hci_family: libc::sa_family_t,
    hci_dev: u16,
    hci_channel: u16,
}

#[repr(C)]
struct HciFilter {
    type_mask: u32,
    event_mask: [u32; 2],
    opcode: u16,
}

impl HciSocket {
    /// Opens a new HCI socket
    ///
    /// # Arguments
    ///
    /// * `dev_id` - The device ID to open (0 for the first device)
    ///
    /// # Returns
    ///
    /// A new `HciSocket` instance or an error if the socket could not be opened
    pub fn open(dev_id: u16) -> Result<Self, HciError> {
        let fd = unsafe { libc::socket(AF_BLUETOOTH, libc::SOCK_RAW, BTPROTO_HCI) };

        if fd < 0 {
            return Err(HciError::SocketError(std::io::Error::last_os_error()));
        }

        let addr = SockaddrHci {
            hci_family: AF_BLUETOOTH as libc::sa_family_t,
            hci_dev: dev_id,
            hci_channel: HCI_CHANNEL_RAW,
        };

        let result = unsafe {
            libc::bind(
                fd,
                &addr as *const _ as *const libc::sockaddr,
                std::mem::size_of::<SockaddrHci>() as libc::socklen_t,
            )
        };

        if result < 0 {
            let err = std::io::Error::last_os_error();
            unsafe { libc::close(fd) };
            return Err(HciError::BindError(err));
        }

        Ok(HciSocket { fd })
    }

    /// Let the given event codes through the kernel's per-socket filter
    ///
    /// Raw HCI sockets deliver nothing until a filter is installed.
    pub fn set_event_filter(&self, event_codes: &[u8]) -> Result<(), HciError> {
        let mut filter = HciFilter {
            type_mask: 1 << HCI_EVENT_PKT,
            event_mask: [0; 2],
            opcode: 0,
        };
        for &code in event_codes {
            filter.event_mask[(code >> 5) as usize & 1] |= 1 << (code & 31);
        }

        let result = unsafe {
            libc::setsockopt(
                self.fd,
                SOL_HCI,
                HCI_FILTER,
                &filter as *const _ as *const libc::c_void,
                std::mem::size_of::<HciFilter>() as libc::socklen_t,
            )
        };

        if result < 0 {
            return Err(HciError::SocketError(std::io::Error::last_os_error()));
        }

        Ok(())
    }

    /// Read an HCI event from the socket
    pub fn read_event(&self) -> Result<HciEvent, HciError> {
        let mut buffer = [0u8; HCI_MAX_EVENT_SIZE];

        let bytes_read = unsafe {
            libc::read(
                self.fd,
                buffer.as_mut_ptr() as *mut libc::c_void,
                buffer.len(),
            )
        };

        if bytes_read < 0 {
            return Err(HciError::ReceiveError(std::io::Error::last_os_error()));
        }

        let bytes_read = bytes_read as usize;
        if bytes_read < 3 || buffer[0] != HCI_EVENT_PKT {
            return Err(HciError::InvalidPacketFormat);
        }

        HciEvent::parse(&buffer[1..bytes_read]).ok_or(HciError::InvalidPacketFormat)
    }

    /// Read an HCI event from the socket with a timeout
    pub fn read_event_timeout(&self, timeout: Option<Duration>) -> Result<HciEvent, HciError> {
        if let Some(timeout) = timeout {
            let mut read_fds: libc::fd_set = unsafe { std::mem::zeroed() };
            unsafe {
                libc::FD_ZERO(&mut read_fds);
                libc::FD_SET(self.fd, &mut read_fds);
            }

            let mut timeout_val = libc::timeval {
                tv_sec: timeout.as_secs() as libc::time_t,
                tv_usec: timeout.subsec_micros() as libc::suseconds_t,
            };

            let result = unsafe {
                libc::select(
                    self.fd + 1,
                    &mut read_fds,
                    std::ptr::null_mut(),
                    std::ptr::null_mut(),
                    &mut timeout_val,
                )
            };

            if result < 0 {
                return Err(HciError::ReceiveError(std::io::Error::last_os_error()));
            }

            if result == 0 {
                return Err(HciError::ReceiveError(std::io::Error::new(
                    std::io::ErrorKind::TimedOut,
                    "Timed out waiting for HCI event",
                )));
            }
        }

        self.read_event()
    }

    /// Sends an HCI command to the controller
    ///
    /// Completion arrives later as a Command Complete or Command Status event.
    pub fn send_command(&self, command: &HciCommand) -> Result<(), HciError> {
        let packet = command.to_packet();
        trace!("HCI command 0x{:04X} ({} bytes)", command.opcode(), packet.len());

        match unsafe {
            libc::write(
                self.fd,
                packet.as_ptr() as *const libc::c_void,
                packet.len(),
            )
        } {
            -1 => Err(HciError::SendError(std::io::Error::last_os_error())),
            _ => Ok(()),
        }
    }
}

impl AsRawFd for HciSocket {
    fn as_raw_fd(&self) -> RawFd {
        self.fd
    }
}

impl Drop for HciSocket {
    fn drop(&mut self) {
        unsafe {
            libc::close(self.fd);
        }
    }
}

/// Command/event exchange with a controller
pub trait HciChannel: Send + Sync {
    fn send_command(&self, command: &HciCommand) -> Result<(), HciError>;

    /// Wait up to `timeout` for the next event; `None` blocks
    fn read_event_timeout(&self, timeout: Option<Duration>) -> Result<HciEvent, HciError>;
}

impl HciChannel for HciSocket {
    fn send_command(&self, command: &HciCommand) -> Result<(), HciError> {
        HciSocket::send_command(self, command)
    }

    fn read_event_timeout(&self, timeout: Option<Duration>) -> Result<HciEvent, HciError> {
        HciSocket::read_event_timeout(self, timeout)
    }
}

/// Returns true if `err` is the timeout produced by [`HciSocket::read_event_timeout`]
pub fn is_timeout(err: &HciError) -> bool {
    matches!(err, HciError::ReceiveError(e) if e.kind() == std::io::ErrorKind::TimedOut)
}
