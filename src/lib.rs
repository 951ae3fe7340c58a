//! # launchwire
//!
//! Wire-level transport and text codec for a small launch-notification
//! protocol carried over a display server's client-message events.
//!
//! An application announces lifecycle events by serializing a keyed
//! property set into one escaped text line, splitting it into fixed
//! 20-byte fragments and sending each as a client-message event to a
//! screen's root window. A launcher or window manager feeds the events it
//! receives into a [`Dispatcher`], which reassembles fragments per sending
//! window and fans completed messages out to subscribed handlers.
//!
//! ## Architecture
//!
//! - **codec**: the `prefix: NAME=VALUE ...` line format (pure text)
//! - **protocol**: fragment framing and per-window reassembly
//! - **handler**: subscriptions with their resolved atom pairs
//! - **transport**: the [`WireConnection`] seam to the display server
//!
//! [`WireConnection`]: transport::WireConnection
//!
//! ## Example
//!
//! ```ignore
//! use launchwire::{broadcast_message, Dispatcher};
//! use launchwire::codec::Property;
//! use launchwire::handler::TypeAtoms;
//!
//! // conn: your WireConnection implementation
//! let mut dispatcher = Dispatcher::new();
//! dispatcher.add_handler(&mut conn, 0, "_NET_STARTUP_INFO", |message_type, text| {
//!     println!("{message_type}: {text}");
//! })?;
//!
//! let atoms = TypeAtoms::resolve(&mut conn, "_NET_STARTUP_INFO")?;
//! broadcast_message(&mut conn, 0, atoms, "new", &[Property::new("ID", "1_TIME123")])?;
//!
//! // in the event loop, for every client-message event:
//! let handled = dispatcher.process_client_message(&event);
//! ```

pub mod codec;
pub mod error;
pub mod handler;
pub mod protocol;
pub mod transport;

mod dispatcher;

pub use codec::{parse_message, serialize_message, ParsedMessage, Property};
pub use dispatcher::{broadcast, broadcast_message, Dispatcher};
pub use error::LaunchwireError;
