//! Codec module - text serialization/parsing for message lines.
//!
//! A message line is `prefix ":" (" " name "=" escaped-value)*`. The codec
//! is a pure text transform with no I/O and no knowledge of what any
//! property means; the transport layers above frame the line for the wire.
//!
//! # Example
//!
//! ```
//! use launchwire::codec::{parse_message, serialize_message, Property};
//!
//! let line = serialize_message("new", &[Property::new("ID", "1_TIME123")]);
//! assert_eq!(line, "new: ID=1_TIME123");
//!
//! let parsed = parse_message(&line).unwrap();
//! assert_eq!(parsed.prefix, "new");
//! assert_eq!(parsed.properties[0].value, "1_TIME123");
//! ```

mod text;

pub use text::{parse_message, serialize_message, ParsedMessage, Property};
