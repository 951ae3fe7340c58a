//! Wire framing for the client-message transport.
//!
//! Each fragment travels as one display-server client-message event in
//! 8-bit format, which carries a fixed 20-byte payload:
//!
//! ```text
//! ┌──────────────┬───────────┬──────────────────────┐
//! │ window       │ type atom │ payload              │
//! │ (originator) │           │ 20 bytes, 8-bit      │
//! └──────────────┴───────────┴──────────────────────┘
//! ```
//!
//! There is no length field and no end marker: the serialized text is sent
//! with one trailing NUL byte, and the receiver knows the message is
//! complete when it copies that NUL out of a payload.

use crate::transport::{Atom, Window};

/// Payload size of an 8-bit-format client-message event (fixed, exactly 20).
pub const CLIENT_MESSAGE_LEN: usize = 20;

/// Cap on the length of one reassembled message.
///
/// A sender that never terminates its message must not be able to make the
/// receiver allocate without bound; a pending buffer already longer than
/// this is dumped instead of extended.
pub const MAX_MESSAGE_LENGTH: usize = 4096;

/// One client-message event as it crosses the wire.
///
/// Used both when emitting fragments (the window is the sender's temporary
/// surface) and when feeding received events into the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientMessage {
    /// Originating window; reassembly is keyed by it.
    pub window: Window,
    /// Begin atom on the first fragment of a message, continuation atom on
    /// every later one.
    pub type_atom: Atom,
    /// The fixed-size payload. Bytes past the meaningful length are zero.
    pub data: [u8; CLIENT_MESSAGE_LEN],
}

/// One fragment payload produced by [`chunk_payloads`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk {
    /// Payload block, zero-padded past `len`.
    pub data: [u8; CLIENT_MESSAGE_LEN],
    /// Number of meaningful bytes, terminator included; only the final
    /// chunk of a message may be short.
    pub len: usize,
}

/// Split a message into consecutive fixed-size payload blocks.
///
/// The text plus exactly one trailing NUL terminator is cut into
/// [`CLIENT_MESSAGE_LEN`]-byte chunks; the final chunk covers whatever
/// remains. Empty text still produces one chunk carrying just the
/// terminator.
///
/// # Example
///
/// ```
/// use launchwire::protocol::chunk_payloads;
///
/// let chunks = chunk_payloads("new: ID=1");
/// assert_eq!(chunks.len(), 1);
/// assert_eq!(chunks[0].len, 10); // 9 bytes of text + NUL
/// assert_eq!(chunks[0].data[9], 0);
/// ```
pub fn chunk_payloads(text: &str) -> Vec<Chunk> {
    let bytes = text.as_bytes();
    let total = bytes.len() + 1; // trailing NUL terminator

    let mut chunks = Vec::with_capacity(total.div_ceil(CLIENT_MESSAGE_LEN));
    let mut offset = 0;
    while offset < total {
        let take = (total - offset).min(CLIENT_MESSAGE_LEN);
        let mut data = [0u8; CLIENT_MESSAGE_LEN];

        // Everything beyond the text is left zeroed; the first such byte
        // is the terminator itself.
        let text_bytes = take.min(bytes.len().saturating_sub(offset));
        data[..text_bytes].copy_from_slice(&bytes[offset..offset + text_bytes]);

        chunks.push(Chunk { data, len: take });
        offset += take;
    }

    chunks
}
