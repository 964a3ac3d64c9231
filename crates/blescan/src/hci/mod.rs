//! Bluetooth HCI (Host Controller Interface) implementation
//!
//! This module provides HCI packet handling, the raw socket used to talk to a
//! local controller, and the transport/dispatcher pair that routes inbound
//! command packets to per-opcode handlers.

pub mod constants;
pub mod dispatcher;
pub mod packet;
pub mod socket;
pub mod transport;

#[cfg(test)]
mod tests;

pub use dispatcher::{CommandDispatcher, CommandHandler};
pub use packet::{CommandPacket, DataPacket, HciCommand, HciEvent, LeAdvertisingReport};
pub use socket::{HciChannel, HciSocket};
pub use transport::{CommandCallback, DataCallback, H4Transport, HciTransport};
