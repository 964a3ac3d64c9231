//! Unit tests for HCI packets, transport and dispatch

use super::constants::*;
use super::dispatcher::*;
use super::packet::*;
use super::transport::*;
use crate::error::HciError;
use std::io::Cursor;
use std::sync::{Arc, Mutex};

#[test]
fn test_hci_command_serialization() {
    // Test Reset command
    let packet = HciCommand::Reset.to_packet();

    assert_eq!(packet[0], HCI_COMMAND_PKT);
    assert_eq!(u16::from_le_bytes([packet[1], packet[2]]), 0x0C03);
    assert_eq!(packet[3], 0);

    // Test LE Set Scan Parameters command
    let command = HciCommand::LeSetScanParameters {
        scan_type: LE_SCAN_ACTIVE,
        scan_interval: 0x0010,
        scan_window: 0x0010,
        own_address_type: 0x00,
        filter_policy: 0x00,
    };

    let packet = command.to_packet();

    assert_eq!(packet[0], HCI_COMMAND_PKT);
    assert_eq!(u16::from_le_bytes([packet[1], packet[2]]), 0x200B);
    assert_eq!(packet[3], 7);
    assert_eq!(packet[4], 0x01); // scan_type
    assert_eq!(u16::from_le_bytes([packet[5], packet[6]]), 0x0010); // scan_interval
    assert_eq!(u16::from_le_bytes([packet[7], packet[8]]), 0x0010); // scan_window
    assert_eq!(packet[9], 0x00); // own_address_type
    assert_eq!(packet[10], 0x00); // filter_policy

    // Test LE Set Scan Enable command
    let command = HciCommand::LeSetScanEnable {
        enable: true,
        filter_duplicates: false,
    };
    assert_eq!(command.to_packet(), vec![HCI_COMMAND_PKT, 0x0C, 0x20, 2, 1, 0]);

    // Test Raw command
    let command = HciCommand::new(OGF_VENDOR, 0x0154, vec![0x01, 0x02, 0x03]);
    let packet = command.to_packet();

    assert_eq!(u16::from_le_bytes([packet[1], packet[2]]), 0xFD54);
    assert_eq!(packet[3], 3);
    assert_eq!(&packet[4..], &[0x01, 0x02, 0x03]);
}

#[test]
fn test_command_packet_parsing() {
    let command = HciCommand::LeSetEventMask {
        event_mask: LE_EVENT_MASK_ADVERTISING_REPORT,
    };
    let bytes = command.to_packet();

    let packet = CommandPacket::parse(&bytes[1..]).unwrap();
    assert_eq!(packet.opcode(), opcode(OGF_LE, OCF_LE_SET_EVENT_MASK));
    assert_eq!(packet.ogf(), OGF_LE);
    assert_eq!(packet.ocf(), OCF_LE_SET_EVENT_MASK);
    assert_eq!(packet.arguments(), &[0x02, 0, 0, 0, 0, 0, 0, 0]);
    assert_eq!(packet, CommandPacket::from(&command));

    assert!(matches!(
        CommandPacket::parse(&[0x03, 0x0C]),
        Err(HciError::InvalidPacketFormat)
    ));
    assert!(matches!(
        CommandPacket::parse(&[0x03, 0x0C, 0x04, 0x00]),
        Err(HciError::InvalidParamLength(4))
    ));
}

#[test]
fn test_data_packet_parsing() {
    let packet = DataPacket::parse(&[0x40, 0x20, 0x03, 0x00, 0xAA, 0xBB, 0xCC]).unwrap();
    assert_eq!(packet.handle(), 0x0040);
    assert_eq!(packet.data, vec![0xAA, 0xBB, 0xCC]);

    assert!(DataPacket::parse(&[0x40, 0x20, 0x03, 0x00, 0xAA]).is_err());
}

#[test]
fn test_hci_event_parsing() {
    // Command Complete for Reset
    let data = [
        EVT_CMD_COMPLETE, // Event code
        4,                // Parameter length
        1,                // Num_HCI_Command_Packets
        0x03,             // Command_Opcode (low byte)
        0x0C,             // Command_Opcode (high byte)
        0x00,             // Status
    ];

    let event = HciEvent::parse(&data).unwrap();

    assert_eq!(event.event_code, EVT_CMD_COMPLETE);
    assert_eq!(event.parameter_total_length, 4);
    assert_eq!(event.parameters, vec![1, 0x03, 0x0C, 0x00]);
    assert!(event.is_command_complete(OGF_HOST_CTL, OCF_RESET));
    assert!(!event.is_command_complete(OGF_LE, OCF_LE_SET_SCAN_ENABLE));
    assert_eq!(event.get_status(), 0x00);

    // Command Status for LE Set Scan Enable, failed
    let event = HciEvent::parse(&[EVT_CMD_STATUS, 4, 0x0C, 1, 0x0C, 0x20]).unwrap();
    assert_eq!(event.command_opcode(), Some(0x200C));
    assert_eq!(event.get_status(), 0x0C);
    assert!(!event.is_command_complete(OGF_LE, OCF_LE_SET_SCAN_ENABLE));

    // Invalid data
    assert!(HciEvent::parse(&[]).is_none());
    assert!(HciEvent::parse(&[EVT_CMD_COMPLETE, 10, 1, 2]).is_none());
}

#[test]
fn test_le_advertising_report_parsing() {
    let event = HciEvent {
        event_code: EVT_LE_META_EVENT,
        parameter_total_length: 15,
        parameters: vec![
            EVT_LE_ADVERTISING_REPORT, // Subevent code
            1,                         // Num_Reports
            0,                         // Event_Type
            0,                         // Address_Type
            0x01,
            0x02,
            0x03,
            0x04,
            0x05,
            0x06, // Address
            3,    // Data_Length
            0x02,
            0x09,
            0x54, // Data (Complete Local Name "T")
            0xC3, // RSSI (-61 dBm)
        ],
    };

    let reports = LeAdvertisingReport::parse_from_event(&event).unwrap();

    assert_eq!(reports.len(), 1);

    let report = &reports[0];
    assert_eq!(report.event_type, 0);
    assert_eq!(report.address_type, 0);
    assert_eq!(report.address, [0x01, 0x02, 0x03, 0x04, 0x05, 0x06]);
    assert_eq!(report.data_length, 3);
    assert_eq!(report.data, vec![0x02, 0x09, 0x54]);
    assert_eq!(report.rssi, -61);

    // Two reports, the second without data
    let mut parameters = vec![EVT_LE_ADVERTISING_REPORT, 2];
    parameters.extend_from_slice(&[0, 1, 0xA1, 0xA2, 0xA3, 0xA4, 0xA5, 0xA6, 1, 0x00, 0xD8]);
    parameters.extend_from_slice(&[4, 1, 0xB1, 0xB2, 0xB3, 0xB4, 0xB5, 0xB6, 0, 0xB0]);
    let event = HciEvent {
        event_code: EVT_LE_META_EVENT,
        parameter_total_length: parameters.len() as u8,
        parameters,
    };

    let reports = LeAdvertisingReport::parse_from_event(&event).unwrap();
    assert_eq!(reports.len(), 2);
    assert_eq!(reports[0].rssi, -40);
    assert_eq!(reports[1].event_type, 4);
    assert!(reports[1].data.is_empty());
    assert_eq!(reports[1].rssi, -80);

    // Not an LE Meta event
    let invalid_event = HciEvent {
        event_code: EVT_CMD_COMPLETE,
        parameter_total_length: 4,
        parameters: vec![1, 0x03, 0x0C, 0x00],
    };
    assert!(LeAdvertisingReport::parse_from_event(&invalid_event).is_err());

    // Not an Advertising Report subevent
    let invalid_event = HciEvent {
        event_code: EVT_LE_META_EVENT,
        parameter_total_length: 3,
        parameters: vec![EVT_LE_CONN_COMPLETE, 0x00, 0x00],
    };
    assert!(LeAdvertisingReport::parse_from_event(&invalid_event).is_err());

    // Report count larger than the payload
    let truncated = HciEvent {
        event_code: EVT_LE_META_EVENT,
        parameter_total_length: 5,
        parameters: vec![EVT_LE_ADVERTISING_REPORT, 1, 0, 0, 0x01],
    };
    assert!(LeAdvertisingReport::parse_from_event(&truncated).is_err());

    // No reports
    let empty = HciEvent {
        event_code: EVT_LE_META_EVENT,
        parameter_total_length: 2,
        parameters: vec![EVT_LE_ADVERTISING_REPORT, 0],
    };
    let result = LeAdvertisingReport::parse_from_event(&empty);
    assert!(result.is_ok());
    assert_eq!(result.unwrap().len(), 0);
}

#[test]
fn test_dispatcher_invokes_registered_handler() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let mut dispatcher = CommandDispatcher::new();

    let sink = Arc::clone(&seen);
    dispatcher.register_controller_command(0x0C03, move |args: &[u8]| {
        sink.lock().unwrap().push(args.to_vec());
    });
    assert!(dispatcher.has_handler(0x0C03));

    assert!(dispatcher.handle_command(CommandPacket::new(0x0C03, vec![0xAB])));
    assert!(dispatcher.handle_command(CommandPacket::new(0x0C03, vec![])));

    assert_eq!(*seen.lock().unwrap(), vec![vec![0xAB], vec![]]);
}

#[test]
fn test_dispatcher_ignores_unregistered_opcode() {
    let calls = Arc::new(Mutex::new(0));
    let mut dispatcher = CommandDispatcher::new();

    let counter = Arc::clone(&calls);
    dispatcher.register_controller_command(0x200C, move |_: &[u8]| {
        *counter.lock().unwrap() += 1;
    });

    assert!(!dispatcher.handle_command(CommandPacket::new(0x200B, vec![1, 2, 3])));
    assert_eq!(*calls.lock().unwrap(), 0);

    // Empty dispatcher
    assert!(!CommandDispatcher::new().handle_command(CommandPacket::new(0x0000, vec![])));
}

#[test]
fn test_dispatcher_replaces_handler() {
    let calls = Arc::new(Mutex::new(Vec::new()));
    let mut dispatcher = CommandDispatcher::new();

    let first = Arc::clone(&calls);
    dispatcher.register_controller_command(0x200C, move |_: &[u8]| {
        first.lock().unwrap().push("first");
    });
    let second = Arc::clone(&calls);
    dispatcher.register_controller_command(0x200C, move |_: &[u8]| {
        second.lock().unwrap().push("second");
    });

    dispatcher.handle_command(CommandPacket::new(0x200C, vec![1, 0]));
    assert_eq!(*calls.lock().unwrap(), vec!["second"]);
}

#[test]
fn test_h4_transport_feeds_dispatcher() {
    let enables = Arc::new(Mutex::new(Vec::new()));
    let dispatcher = Arc::new(Mutex::new(CommandDispatcher::new()));

    let sink = Arc::clone(&enables);
    dispatcher.lock().unwrap().register_controller_command(
        opcode(OGF_LE, OCF_LE_SET_SCAN_ENABLE),
        move |args: &[u8]| sink.lock().unwrap().push(args[0] == 1),
    );

    let mut stream = Vec::new();
    stream.extend(
        HciCommand::LeSetScanEnable {
            enable: true,
            filter_duplicates: true,
        }
        .to_packet(),
    );
    stream.extend(HciCommand::Reset.to_packet()); // no handler
    stream.extend([HCI_ACL_PKT, 0x01, 0x00, 0x02, 0x00, 0xDE, 0xAD]);
    stream.extend(
        HciCommand::LeSetScanEnable {
            enable: false,
            filter_duplicates: false,
        }
        .to_packet(),
    );

    let mut transport = H4Transport::new(Cursor::new(stream));
    CommandDispatcher::register_handlers_with_transport(&dispatcher, &mut transport);
    transport.run().unwrap();

    assert_eq!(*enables.lock().unwrap(), vec![true, false]);
}

#[test]
fn test_h4_transport_errors() {
    let mut transport = H4Transport::new(Cursor::new(vec![HCI_EVENT_PKT, 0x0E, 0x00]));
    assert!(matches!(
        transport.receive_packet(),
        Err(HciError::UnsupportedPacketType(HCI_EVENT_PKT))
    ));

    // Header cut short
    let mut transport = H4Transport::new(Cursor::new(vec![HCI_COMMAND_PKT, 0x03]));
    assert!(matches!(
        transport.receive_packet(),
        Err(HciError::ReceiveError(_))
    ));

    let mut transport = H4Transport::new(Cursor::new(Vec::new()));
    assert!(!transport.receive_packet().unwrap());
}

#[test]
fn test_h4_transport_without_handlers_drops_packets() {
    let mut transport = H4Transport::new(Cursor::new(HciCommand::Reset.to_packet()));
    assert!(transport.receive_packet().unwrap());
    assert!(!transport.receive_packet().unwrap());
}
