//! Transport module - the seam to the display-server connection.
//!
//! Everything display-specific (connection setup, atom interning caches,
//! actual event delivery) lives behind [`WireConnection`], implemented by
//! the embedder; the crate itself never links a display library.

mod connection;

pub use connection::{Atom, WireConnection, Window};
