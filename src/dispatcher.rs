//! Connection-scoped dispatcher: the send and receive paths.
//!
//! A [`Dispatcher`] owns the two pieces of per-connection mutable state,
//! the handler registry and the reassembly store, and wires them together:
//!
//! ```text
//! broadcast:  serialize ─► chunk ─► one client message per chunk ─► flush
//! receive:    event ─► admission filter ─► reassembly ─► validate ─► fan-out
//! ```
//!
//! Everything runs synchronously on the thread that drives the display
//! connection's event loop. Callbacks are invoked from inside
//! [`Dispatcher::process_client_message`]; since that takes `&mut self`,
//! a callback cannot re-enter the dispatcher to register or unregister.
//! The borrow checker enforces what the protocol contract demands.
//!
//! # Example
//!
//! ```ignore
//! use launchwire::{broadcast_message, Dispatcher};
//! use launchwire::codec::Property;
//! use launchwire::handler::TypeAtoms;
//!
//! let mut dispatcher = Dispatcher::new();
//! dispatcher.add_handler(&mut conn, 0, "_NET_STARTUP_INFO", |message_type, text| {
//!     println!("{message_type}: {text}");
//! })?;
//!
//! let atoms = TypeAtoms::resolve(&mut conn, "_NET_STARTUP_INFO")?;
//! broadcast_message(&mut conn, 0, atoms, "new", &[Property::new("ID", "1_TIME123")])?;
//!
//! // ...in the event loop:
//! let handled = dispatcher.process_client_message(&event);
//! ```

use crate::codec::{serialize_message, Property};
use crate::error::{LaunchwireError, Result};
use crate::handler::{HandlerId, HandlerRegistry, TypeAtoms};
use crate::protocol::{chunk_payloads, AppendOutcome, ClientMessage, ReassemblyStore};
use crate::transport::WireConnection;

/// Broadcast one message to a screen's root window, fire-and-forget.
///
/// The text plus a trailing NUL terminator is split into fixed-size
/// fragments, each sent as a client-message event attributed to a
/// temporary never-mapped window: the first tagged with the begin atom,
/// the rest with the continuation atom. The temporary window is destroyed
/// and the connection flushed before returning.
///
/// Fails with [`LaunchwireError::EmbeddedNul`] if `text` contains a NUL
/// byte, which the wire cannot carry; nothing is sent in that case.
pub fn broadcast<C: WireConnection>(
    conn: &mut C,
    screen: usize,
    atoms: TypeAtoms,
    text: &str,
) -> Result<()> {
    if text.bytes().any(|b| b == 0) {
        tracing::warn!("refusing to broadcast text with an embedded NUL byte");
        return Err(LaunchwireError::EmbeddedNul);
    }

    let root = conn.root_window(screen)?;
    let window = conn.create_broadcast_window(screen)?;

    let mut type_atom = atoms.begin;
    let mut sent = Ok(());
    for chunk in chunk_payloads(text) {
        let event = ClientMessage {
            window,
            type_atom,
            data: chunk.data,
        };
        sent = conn.send_client_message(root, &event);
        if sent.is_err() {
            break;
        }
        type_atom = atoms.continuation;
    }

    // The courier window comes down even when a send failed mid-message.
    conn.destroy_window(window)?;
    conn.flush()?;
    sent
}

/// Serialize a prefix and properties, then [`broadcast`] the line.
pub fn broadcast_message<C: WireConnection>(
    conn: &mut C,
    screen: usize,
    atoms: TypeAtoms,
    prefix: &str,
    properties: &[Property],
) -> Result<()> {
    broadcast(conn, screen, atoms, &serialize_message(prefix, properties))
}

/// Per-connection message dispatcher.
///
/// Owns the handler registry and the reassembly store for one display
/// connection. Create one per connection; independent dispatchers (and
/// their tests) never interfere.
#[derive(Debug, Default)]
pub struct Dispatcher {
    handlers: HandlerRegistry,
    pending: ReassemblyStore,
}

impl Dispatcher {
    /// Create a dispatcher with no subscriptions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe `callback` to completed messages of `message_type` on
    /// `screen`.
    ///
    /// Resolves the screen's root window and the type's atom pair through
    /// the connection; the atom round trip is the one blocking call. On
    /// failure nothing is registered.
    pub fn add_handler<C, F>(
        &mut self,
        conn: &mut C,
        screen: usize,
        message_type: &str,
        callback: F,
    ) -> Result<HandlerId>
    where
        C: WireConnection,
        F: FnMut(&str, &str) + 'static,
    {
        let root = conn.root_window(screen)?;
        self.handlers.register(conn, root, message_type, callback)
    }

    /// Remove a subscription; silently a no-op for an unknown id.
    ///
    /// Pending reassembly buffers that no remaining subscription is
    /// interested in are dropped with it, so fragments buffered under a
    /// removed handler can never surface through a later registration
    /// with the same parameters.
    pub fn remove_handler(&mut self, id: HandlerId) -> bool {
        if !self.handlers.unregister(id) {
            return false;
        }

        let handlers = &self.handlers;
        self.pending
            .retain(|record| handlers.any_handler_wants(record.begin_atom()));
        true
    }

    /// Feed one incoming client-message event into the dispatcher.
    ///
    /// Returns whether the event belonged to this protocol, so a caller
    /// sharing the event stream knows if it still needs handling. `false`
    /// means no subscription wanted the event's atom and no state was
    /// touched.
    ///
    /// A fragment for a window with no pending record starts a new record
    /// under the event's atom, whether or not that atom is a begin atom.
    /// A record started by a stray continuation therefore reassembles but
    /// matches no handler at dispatch, which fans out by begin atom.
    pub fn process_client_message(&mut self, event: &ClientMessage) -> bool {
        if !self.handlers.any_handler_wants(event.type_atom) {
            return false;
        }

        match self
            .pending
            .append(event.window, event.type_atom, &event.data)
        {
            AppendOutcome::Continues => {}
            AppendOutcome::Discarded => {
                tracing::warn!(
                    window = event.window.0,
                    "dumping over-long message reassembly"
                );
            }
            AppendOutcome::Completed(message) => {
                let begin_atom = message.begin_atom();
                match message.into_text() {
                    Ok(text) => {
                        for registration in self.handlers.matching_mut(begin_atom) {
                            registration.deliver(&text);
                        }
                    }
                    Err(error) => {
                        tracing::error!(%error, "bad UTF-8 in reassembled message");
                    }
                }
            }
        }

        true
    }

    /// Number of live subscriptions.
    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    /// Number of in-progress reassemblies.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}
