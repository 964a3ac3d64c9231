//! HCI packet structures and parsing
//!
//! This module contains structures and methods for handling HCI packets.

use crate::error::HciError;
use crate::hci::constants::*;
use byteorder::{LittleEndian, ReadBytesExt};
use std::io::{Cursor, Read};

/// HCI commands issued by the scanner layer
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum HciCommand {
    // Host Controller Commands (OGF: 0x03)
    Reset,

    // LE Commands (OGF: 0x08)
    LeSetEventMask { event_mask: u64 },
    LeSetScanParameters {
        scan_type: u8,
        scan_interval: u16,
        scan_window: u16,
        own_address_type: u8,
        filter_policy: u8,
    },
    LeSetScanEnable { enable: bool, filter_duplicates: bool },

    /// Any other command, given as OGF, OCF and parameter bytes
    Raw { ogf: u8, ocf: u16, parameters: Vec<u8> },
}

impl HciCommand {
    /// Create a raw command
    pub fn new(ogf: u8, ocf: u16, parameters: Vec<u8>) -> Self {
        Self::Raw {
            ogf,
            ocf,
            parameters,
        }
    }

    /// Get the OGF and OCF for this command
    pub fn opcode_parts(&self) -> (u8, u16) {
        match self {
            Self::Reset => (OGF_HOST_CTL, OCF_RESET),
            Self::LeSetEventMask { .. } => (OGF_LE, OCF_LE_SET_EVENT_MASK),
            Self::LeSetScanParameters { .. } => (OGF_LE, OCF_LE_SET_SCAN_PARAMETERS),
            Self::LeSetScanEnable { .. } => (OGF_LE, OCF_LE_SET_SCAN_ENABLE),
            Self::Raw { ogf, ocf, .. } => (*ogf, *ocf),
        }
    }

    /// Get the 16-bit opcode for this command
    pub fn opcode(&self) -> u16 {
        let (ogf, ocf) = self.opcode_parts();
        opcode(ogf, ocf)
    }

    /// Convert the command to its raw parameter bytes
    fn parameters(&self) -> Vec<u8> {
        match self {
            Self::Reset => vec![],

            Self::LeSetEventMask { event_mask } => event_mask.to_le_bytes().to_vec(),

            Self::LeSetScanParameters {
                scan_type,
                scan_interval,
                scan_window,
                own_address_type,
                filter_policy,
            } => {
                let mut params = Vec::with_capacity(7);
                params.push(*scan_type);
                params.extend_from_slice(&scan_interval.to_le_bytes());
                params.extend_from_slice(&scan_window.to_le_bytes());
                params.push(*own_address_type);
                params.push(*filter_policy);
                params
            }

            Self::LeSetScanEnable {
                enable,
                filter_duplicates,
            } => vec![*enable as u8, *filter_duplicates as u8],

            Self::Raw { parameters, .. } => parameters.clone(),
        }
    }

    /// Convert the command to a raw HCI packet, type indicator included
    pub fn to_packet(&self) -> Vec<u8> {
        let params = self.parameters();

        let mut packet = vec![HCI_COMMAND_PKT];
        packet.extend_from_slice(&self.opcode().to_le_bytes());
        packet.push(params.len() as u8);
        packet.extend_from_slice(&params);
        packet
    }
}

/// An inbound HCI command packet: opcode plus argument bytes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandPacket {
    opcode: u16,
    arguments: Vec<u8>,
}

impl CommandPacket {
    pub fn new(opcode: u16, arguments: Vec<u8>) -> Self {
        Self { opcode, arguments }
    }

    /// Parse a command packet from its header and parameters (no type indicator)
    pub fn parse(data: &[u8]) -> Result<Self, HciError> {
        if data.len() < HCI_COMMAND_HDR_SIZE {
            return Err(HciError::InvalidPacketFormat);
        }

        let mut cursor = Cursor::new(data);
        let opcode = cursor.read_u16::<LittleEndian>()?;
        let param_len = cursor.read_u8()? as usize;

        if data.len() < HCI_COMMAND_HDR_SIZE + param_len {
            return Err(HciError::InvalidParamLength(param_len));
        }

        let mut arguments = vec![0u8; param_len];
        cursor.read_exact(&mut arguments)?;

        Ok(Self { opcode, arguments })
    }

    pub fn opcode(&self) -> u16 {
        self.opcode
    }

    pub fn ogf(&self) -> u8 {
        (self.opcode >> 10) as u8
    }

    pub fn ocf(&self) -> u16 {
        self.opcode & 0x03FF
    }

    pub fn arguments(&self) -> &[u8] {
        &self.arguments
    }
}

impl From<&HciCommand> for CommandPacket {
    fn from(command: &HciCommand) -> Self {
        Self::new(command.opcode(), command.parameters())
    }
}

/// An inbound ACL data packet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataPacket {
    /// Connection handle with packet boundary and broadcast flags
    pub handle_and_flags: u16,
    pub data: Vec<u8>,
}

impl DataPacket {
    /// Parse an ACL data packet from its header and payload (no type indicator)
    pub fn parse(data: &[u8]) -> Result<Self, HciError> {
        if data.len() < HCI_ACL_HDR_SIZE {
            return Err(HciError::InvalidPacketFormat);
        }

        let mut cursor = Cursor::new(data);
        let handle_and_flags = cursor.read_u16::<LittleEndian>()?;
        let data_len = cursor.read_u16::<LittleEndian>()? as usize;

        if data.len() < HCI_ACL_HDR_SIZE + data_len {
            return Err(HciError::InvalidParamLength(data_len));
        }

        let mut payload = vec![0u8; data_len];
        cursor.read_exact(&mut payload)?;

        Ok(Self {
            handle_and_flags,
            data: payload,
        })
    }

    /// Connection handle without the flag bits
    pub fn handle(&self) -> u16 {
        self.handle_and_flags & 0x0FFF
    }
}

/// HCI Event packet
#[derive(Debug, Clone)]
pub struct HciEvent {
    pub event_code: u8,
    pub parameter_total_length: u8,
    pub parameters: Vec<u8>,
}

impl HciEvent {
    /// Parse an HCI event from raw bytes (no type indicator)
    pub fn parse(data: &[u8]) -> Option<Self> {
        if data.len() < HCI_EVENT_HDR_SIZE {
            return None;
        }

        let event_code = data[0];
        let parameter_total_length = data[1];
        let end = parameter_total_length as usize + HCI_EVENT_HDR_SIZE;

        if data.len() < end {
            return None;
        }

        Some(HciEvent {
            event_code,
            parameter_total_length,
            parameters: data[HCI_EVENT_HDR_SIZE..end].to_vec(),
        })
    }

    /// Opcode of the command this Command Complete / Command Status event answers
    pub fn command_opcode(&self) -> Option<u16> {
        let bytes = match self.event_code {
            EVT_CMD_COMPLETE => self.parameters.get(1..3)?,
            EVT_CMD_STATUS => self.parameters.get(2..4)?,
            _ => return None,
        };
        Some(u16::from_le_bytes([bytes[0], bytes[1]]))
    }

    /// Check whether this is a Command Complete event for the given command
    pub fn is_command_complete(&self, ogf: u8, ocf: u16) -> bool {
        self.event_code == EVT_CMD_COMPLETE && self.command_opcode() == Some(opcode(ogf, ocf))
    }

    /// Status byte of a Command Complete or Command Status event
    ///
    /// Returns 0xFF when the event carries no status.
    pub fn get_status(&self) -> u8 {
        let status = match self.event_code {
            EVT_CMD_COMPLETE => self.parameters.get(3),
            EVT_CMD_STATUS => self.parameters.first(),
            _ => None,
        };
        status.copied().unwrap_or(0xFF)
    }
}

/// LE Advertising Report
#[derive(Debug, Clone)]
pub struct LeAdvertisingReport {
    pub event_type: u8,
    pub address_type: u8,
    /// Advertiser address, little-endian as sent by the controller
    pub address: [u8; 6],
    pub data_length: u8,
    pub data: Vec<u8>,
    pub rssi: i8,
}

impl LeAdvertisingReport {
    /// Parse every report carried by an LE Advertising Report meta event
    pub fn parse_from_event(event: &HciEvent) -> Result<Vec<Self>, HciError> {
        if event.event_code != EVT_LE_META_EVENT
            || event.parameters.first() != Some(&EVT_LE_ADVERTISING_REPORT)
        {
            return Err(HciError::InvalidPacketFormat);
        }

        let num_reports = *event
            .parameters
            .get(1)
            .ok_or(HciError::InvalidPacketFormat)? as usize;

        let mut reports = Vec::with_capacity(num_reports);
        let mut cursor = Cursor::new(&event.parameters[2..]);

        for _ in 0..num_reports {
            let report =
                Self::read_report(&mut cursor).map_err(|_| HciError::InvalidPacketFormat)?;
            reports.push(report);
        }

        Ok(reports)
    }

    fn read_report(cursor: &mut Cursor<&[u8]>) -> std::io::Result<Self> {
        let event_type = cursor.read_u8()?;
        let address_type = cursor.read_u8()?;

        let mut address = [0u8; 6];
        cursor.read_exact(&mut address)?;

        let data_length = cursor.read_u8()?;
        let mut data = vec![0u8; data_length as usize];
        cursor.read_exact(&mut data)?;

        let rssi = cursor.read_i8()?;

        Ok(LeAdvertisingReport {
            event_type,
            address_type,
            address,
            data_length,
            data,
            rssi,
        })
    }
}
