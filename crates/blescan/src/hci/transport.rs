//! HCI transport abstraction
//!
//! A transport delivers inbound command and data packets to whoever registered
//! for them. Ownership of each packet moves to the callback.

use crate::error::HciError;
use crate::hci::constants::*;
use crate::hci::packet::{CommandPacket, DataPacket};
use byteorder::{LittleEndian, ReadBytesExt};
use log::{debug, trace};
use std::io::{ErrorKind, Read};

/// Callback receiving ownership of an inbound command packet
pub type CommandCallback = Box<dyn FnMut(CommandPacket) + Send + 'static>;

/// Callback receiving ownership of an inbound data packet
pub type DataCallback = Box<dyn FnMut(DataPacket) + Send + 'static>;

/// Registration point for inbound packet callbacks
pub trait HciTransport {
    /// Set the callback fired for every command packet
    fn register_command_handler(&mut self, callback: CommandCallback);

    /// Set the callback fired for every ACL data packet
    fn register_data_handler(&mut self, callback: DataCallback);
}

/// Transport reading H4-framed packets from a byte stream (UART, pipe, socket)
pub struct H4Transport<R> {
    reader: R,
    command_callback: Option<CommandCallback>,
    data_callback: Option<DataCallback>,
}

impl<R: Read> H4Transport<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            command_callback: None,
            data_callback: None,
        }
    }

    /// Read one packet and hand it to the matching callback
    ///
    /// Returns `Ok(false)` once the stream is exhausted. Packets arriving before
    /// a callback is registered are dropped.
    pub fn receive_packet(&mut self) -> Result<bool, HciError> {
        let indicator = match self.reader.read_u8() {
            Ok(indicator) => indicator,
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => return Ok(false),
            Err(e) => return Err(HciError::ReceiveError(e)),
        };

        match indicator {
            HCI_COMMAND_PKT => {
                let packet = self.read_command().map_err(HciError::ReceiveError)?;
                match self.command_callback.as_mut() {
                    Some(callback) => callback(packet),
                    None => trace!("No command handler, dropping 0x{:04X}", packet.opcode()),
                }
            }
            HCI_ACL_PKT => {
                let packet = self.read_data().map_err(HciError::ReceiveError)?;
                match self.data_callback.as_mut() {
                    Some(callback) => callback(packet),
                    None => trace!("No data handler, dropping {} bytes", packet.data.len()),
                }
            }
            other => {
                debug!("Unsupported H4 packet type 0x{:02X}", other);
                return Err(HciError::UnsupportedPacketType(other));
            }
        }

        Ok(true)
    }

    /// Pump packets until the stream ends
    pub fn run(&mut self) -> Result<(), HciError> {
        while self.receive_packet()? {}
        Ok(())
    }

    fn read_command(&mut self) -> std::io::Result<CommandPacket> {
        let opcode = self.reader.read_u16::<LittleEndian>()?;
        let param_len = self.reader.read_u8()?;

        let mut arguments = vec![0u8; param_len as usize];
        self.reader.read_exact(&mut arguments)?;

        Ok(CommandPacket::new(opcode, arguments))
    }

    fn read_data(&mut self) -> std::io::Result<DataPacket> {
        let handle_and_flags = self.reader.read_u16::<LittleEndian>()?;
        let data_len = self.reader.read_u16::<LittleEndian>()?;

        let mut data = vec![0u8; data_len as usize];
        self.reader.read_exact(&mut data)?;

        Ok(DataPacket {
            handle_and_flags,
            data,
        })
    }
}

impl<R: Read> HciTransport for H4Transport<R> {
    fn register_command_handler(&mut self, callback: CommandCallback) {
        self.command_callback = Some(callback);
    }

    fn register_data_handler(&mut self, callback: DataCallback) {
        self.data_callback = Some(callback);
    }
}
