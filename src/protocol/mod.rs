//! Protocol module - wire framing and per-window reassembly.
//!
//! This module implements the fragment layer of the protocol:
//! - Fixed 20-byte client-message payloads and the chunk splitter
//! - Reassembly store accumulating partial messages per sending window

mod reassembly;
mod wire_format;

pub use reassembly::{AppendOutcome, CompletedMessage, PendingMessage, ReassemblyStore};
pub use wire_format::{chunk_payloads, Chunk, ClientMessage, CLIENT_MESSAGE_LEN, MAX_MESSAGE_LENGTH};
