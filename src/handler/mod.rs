//! Handler module - subscriptions for incoming message types.
//!
//! Provides:
//! - [`HandlerRegistry`] - per-connection set of subscriptions
//! - [`TypeAtoms`] - the begin/continuation atom pair of a message type
//!
//! # Example
//!
//! ```ignore
//! use launchwire::handler::HandlerRegistry;
//!
//! let mut registry = HandlerRegistry::new();
//!
//! let id = registry.register(&mut conn, root, "_NET_STARTUP_INFO", |message_type, text| {
//!     println!("{message_type}: {text}");
//! })?;
//!
//! registry.unregister(id);
//! ```

mod registry;

pub use registry::{HandlerId, HandlerRegistry, MessageCallback, Registration, TypeAtoms};
