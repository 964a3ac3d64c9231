//! Error types for the blescan library
//!
//! This module defines the error types used throughout the library.

use crate::scanner::types::{BtStatus, ScannerHandle};
use crate::uuid::Uuid;
use thiserror::Error;

/// Errors that can occur when working with HCI sockets and transports
#[derive(Error, Debug)]
pub enum HciError {
    #[error("Failed to open HCI socket: {0}")]
    SocketError(#[from] std::io::Error),

    #[error("Failed to bind to HCI device: {0}")]
    BindError(std::io::Error),

    #[error("Failed to send HCI command: {0}")]
    SendError(std::io::Error),

    #[error("Failed to receive HCI packet: {0}")]
    ReceiveError(std::io::Error),

    #[error("Invalid parameter length: {0}")]
    InvalidParamLength(usize),

    #[error("Invalid HCI packet format")]
    InvalidPacketFormat,

    #[error("Unsupported packet type: 0x{0:02X}")]
    UnsupportedPacketType(u8),
}

/// Errors surfaced by scanner registration and scan sessions
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScanError {
    #[error("A registration for {0} is already pending")]
    DuplicateRegistration(Uuid),

    #[error("Controller rejected the request: {0:?}")]
    ControllerStatus(BtStatus),

    #[error("Controller failed to register scanner: {0:?}")]
    RegistrationFailed(BtStatus),

    #[error("Scanner handle {0} is already owned by a live scanner")]
    HandleInUse(ScannerHandle),

    #[error("Bluetooth adapter is not enabled")]
    AdapterDisabled,
}
