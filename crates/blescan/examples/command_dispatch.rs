//! Example: Command Dispatch
//!
//! Feeds H4 framed command packets from stdin through a dispatcher with a
//! handler for HCI Reset and LE Set Scan Enable. Try:
//!
//! printf '\x01\x03\x0c\x00\x01\x0c\x20\x02\x01\x00' | cargo run --example command_dispatch

use blescan::hci::constants::*;
use blescan::{CommandDispatcher, H4Transport};
use std::io;
use std::sync::{Arc, Mutex};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();

    let mut dispatcher = CommandDispatcher::new();
    dispatcher.register_controller_command(opcode(OGF_HOST_CTL, OCF_RESET), |_| {
        println!("Reset");
    });
    dispatcher.register_controller_command(opcode(OGF_LE, OCF_LE_SET_SCAN_ENABLE), |args| {
        match args {
            [enable, filter_duplicates, ..] => println!(
                "LE Set Scan Enable: enable={} filter_duplicates={}",
                enable, filter_duplicates
            ),
            _ => println!("LE Set Scan Enable with {} byte(s) of arguments", args.len()),
        }
    });

    let dispatcher = Arc::new(Mutex::new(dispatcher));
    let mut transport = H4Transport::new(io::stdin().lock());
    CommandDispatcher::register_handlers_with_transport(&dispatcher, &mut transport);

    transport.run()?;
    Ok(())
}
