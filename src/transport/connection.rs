//! Display-connection interface and protocol identifier types.
//!
//! The transport needs very little from a display server: atom interning,
//! the root window of a screen, a short-lived unmapped window to send
//! from, client-message delivery, and a flush. [`WireConnection`] captures
//! exactly that, so the dispatcher stays testable against a fake and
//! embedders can back it with whichever display library they already use.

use crate::error::Result;
use crate::protocol::ClientMessage;

/// An interned protocol atom.
///
/// Resolved once from a symbolic name by the display server, compared by
/// equality thereafter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Atom(pub u32);

/// A display-server window (surface) identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Window(pub u32);

/// The operations the transport needs from a display connection.
///
/// All methods return `Result`; implementations map their library's
/// failures into [`crate::LaunchwireError::Connection`]. Calls are made
/// only from the thread driving the connection's event loop, so
/// implementations need no internal synchronization.
pub trait WireConnection {
    /// Resolve a symbolic name to an atom.
    ///
    /// This is a synchronous round trip to the display server and the one
    /// blocking call in the crate; it happens during handler registration
    /// and when a sender resolves its message-type atoms.
    fn intern_atom(&mut self, name: &str) -> Result<Atom>;

    /// Root window of the given screen, the shared broadcast target.
    fn root_window(&mut self, screen: usize) -> Result<Window>;

    /// Create the temporary, never-mapped window that outgoing fragments
    /// are attributed to. Destroyed again before the broadcast returns.
    fn create_broadcast_window(&mut self, screen: usize) -> Result<Window>;

    /// Destroy a window created by [`create_broadcast_window`].
    ///
    /// [`create_broadcast_window`]: WireConnection::create_broadcast_window
    fn destroy_window(&mut self, window: Window) -> Result<()>;

    /// Deliver one client-message event to `destination`.
    fn send_client_message(&mut self, destination: Window, event: &ClientMessage) -> Result<()>;

    /// Force out any buffered events.
    fn flush(&mut self) -> Result<()>;
}
