//! Opcode-keyed command dispatch
//!
//! Controller components register one handler per opcode. Inbound command
//! packets are routed to the matching handler and released when it returns;
//! commands nobody registered for are ignored.

use crate::hci::packet::{CommandPacket, DataPacket};
use crate::hci::transport::HciTransport;
use log::{debug, trace};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

/// Handler invoked with the argument bytes of a command
pub type CommandHandler = Box<dyn FnMut(&[u8]) + Send + 'static>;

/// Routes command packets to per-opcode handlers
#[derive(Default)]
pub struct CommandDispatcher {
    commands: HashMap<u16, CommandHandler>,
}

impl CommandDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map `opcode` to `handler`, replacing any previous handler for it
    pub fn register_controller_command<F>(&mut self, opcode: u16, handler: F)
    where
        F: FnMut(&[u8]) + Send + 'static,
    {
        if self.commands.insert(opcode, Box::new(handler)).is_some() {
            debug!("Replaced handler for opcode 0x{:04X}", opcode);
        }
    }

    /// Check whether a handler is registered for `opcode`
    pub fn has_handler(&self, opcode: u16) -> bool {
        self.commands.contains_key(&opcode)
    }

    /// Dispatch a command packet, taking ownership of it
    ///
    /// The packet is dropped once the handler returns. Returns whether a
    /// handler ran.
    pub fn handle_command(&mut self, packet: CommandPacket) -> bool {
        match self.commands.get_mut(&packet.opcode()) {
            Some(handler) => {
                handler(packet.arguments());
                true
            }
            None => {
                trace!("No handler for opcode 0x{:04X}", packet.opcode());
                false
            }
        }
    }

    /// Accept an inbound data packet
    ///
    /// No controller component consumes ACL data, so the packet is released.
    pub fn handle_data(&mut self, packet: DataPacket) {
        trace!(
            "Data packet on handle 0x{:03X} ({} bytes) released",
            packet.handle(),
            packet.data.len()
        );
    }

    /// Subscribe the dispatcher's entry points on `transport`
    ///
    /// Handlers run with the dispatcher locked and must not register new
    /// handlers from inside a dispatch.
    pub fn register_handlers_with_transport<T>(dispatcher: &Arc<Mutex<Self>>, transport: &mut T)
    where
        T: HciTransport + ?Sized,
    {
        let commands = Arc::clone(dispatcher);
        transport.register_command_handler(Box::new(move |packet| {
            commands
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .handle_command(packet);
        }));

        let data = Arc::clone(dispatcher);
        transport.register_data_handler(Box::new(move |packet| {
            data.lock()
                .unwrap_or_else(PoisonError::into_inner)
                .handle_data(packet);
        }));
    }
}

impl fmt::Debug for CommandDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut opcodes: Vec<_> = self.commands.keys().collect();
        opcodes.sort();
        f.debug_struct("CommandDispatcher")
            .field("opcodes", &opcodes)
            .finish()
    }
}
