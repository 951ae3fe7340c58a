//! Reassembly store for accumulating partial messages.
//!
//! Uses `bytes::BytesMut` for buffer management. Incoming fragments for a
//! window are appended to that window's pending record until a NUL byte
//! marks completion:
//! - `Continues`: fragment absorbed, message still open
//! - `Completed`: terminator seen, buffer ownership passes to the caller
//! - `Discarded`: buffer already over the size cap, record dumped
//!
//! The store exclusively owns every pending buffer; completion is the only
//! way bytes leave it.

use bytes::{BufMut, Bytes, BytesMut};

use super::wire_format::{CLIENT_MESSAGE_LEN, MAX_MESSAGE_LENGTH};
use crate::error::Result;
use crate::transport::{Atom, Window};

/// An in-progress message for one sending window.
///
/// Invariant: a store holds at most one record per window. A second
/// fragment for the same window extends the existing record, never creates
/// a second one.
#[derive(Debug)]
pub struct PendingMessage {
    window: Window,
    begin_atom: Atom,
    buf: BytesMut,
}

impl PendingMessage {
    fn new(window: Window, begin_atom: Atom) -> Self {
        Self {
            window,
            begin_atom,
            buf: BytesMut::new(),
        }
    }

    /// The window this record reassembles for.
    #[inline]
    pub fn window(&self) -> Window {
        self.window
    }

    /// The atom the first fragment arrived under.
    #[inline]
    pub fn begin_atom(&self) -> Atom {
        self.begin_atom
    }

    /// Bytes accumulated so far.
    #[inline]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether nothing has been accumulated yet.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Copy one fragment in, stopping the moment a NUL byte is copied.
    ///
    /// The NUL is retained as the terminator; returns whether it was seen.
    fn absorb(&mut self, chunk: &[u8; CLIENT_MESSAGE_LEN]) -> bool {
        for &byte in chunk {
            self.buf.put_u8(byte);
            if byte == 0 {
                return true;
            }
        }
        false
    }
}

/// Result of feeding one fragment into the store.
#[derive(Debug)]
pub enum AppendOutcome {
    /// Fragment absorbed; the record stays in the store for the next one.
    Continues,
    /// Terminator seen; the record left the store and its buffer is yours.
    Completed(CompletedMessage),
    /// The record was over the size cap and has been dumped. A later
    /// fragment for the same window starts a fresh record.
    Discarded,
}

/// A fully reassembled message, removed from the store.
#[derive(Debug)]
pub struct CompletedMessage {
    window: Window,
    begin_atom: Atom,
    bytes: Bytes,
}

impl CompletedMessage {
    /// The window the message was reassembled for.
    #[inline]
    pub fn window(&self) -> Window {
        self.window
    }

    /// The atom the first fragment arrived under; dispatch matches
    /// handlers against it.
    #[inline]
    pub fn begin_atom(&self) -> Atom {
        self.begin_atom
    }

    /// Raw message bytes without the terminator.
    pub fn as_bytes(&self) -> &[u8] {
        // absorb() stops right after the NUL, so it is always last.
        &self.bytes[..self.bytes.len() - 1]
    }

    /// Decode the message, validating it is well-formed UTF-8.
    pub fn into_text(self) -> Result<String> {
        let text = std::str::from_utf8(self.as_bytes())?;
        Ok(text.to_string())
    }
}

/// Per-connection store of in-progress messages, keyed by sending window.
///
/// Backed by a plain `Vec` with predicate searches; the set is small (one
/// entry per concurrently-sending window) and never hot.
#[derive(Debug, Default)]
pub struct ReassemblyStore {
    pending: Vec<PendingMessage>,
}

impl ReassemblyStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn position(&self, window: Window) -> Option<usize> {
        self.pending.iter().position(|m| m.window == window)
    }

    fn admit_index(&mut self, window: Window, begin_atom: Atom) -> usize {
        match self.position(window) {
            Some(index) => index,
            None => {
                self.pending.push(PendingMessage::new(window, begin_atom));
                self.pending.len() - 1
            }
        }
    }

    /// Record for `window`, creating an empty one under `begin_atom` if the
    /// window has none yet. An existing record keeps the atom it was first
    /// seen under.
    pub fn admit(&mut self, window: Window, begin_atom: Atom) -> &mut PendingMessage {
        let index = self.admit_index(window, begin_atom);
        &mut self.pending[index]
    }

    /// Feed one fragment for `window` into the store.
    ///
    /// The size cap is checked before anything is copied: a record whose
    /// buffer already exceeds [`MAX_MESSAGE_LENGTH`] is removed and freed
    /// instead of extended, and the fragment is dropped with it.
    pub fn append(
        &mut self,
        window: Window,
        begin_atom: Atom,
        chunk: &[u8; CLIENT_MESSAGE_LEN],
    ) -> AppendOutcome {
        let index = self.admit_index(window, begin_atom);

        if self.pending[index].len() > MAX_MESSAGE_LENGTH {
            self.pending.remove(index);
            return AppendOutcome::Discarded;
        }

        if self.pending[index].absorb(chunk) {
            let record = self.pending.remove(index);
            return AppendOutcome::Completed(CompletedMessage {
                window: record.window,
                begin_atom: record.begin_atom,
                bytes: record.buf.freeze(),
            });
        }

        AppendOutcome::Continues
    }

    /// Whether a record exists for `window`.
    pub fn contains(&self, window: Window) -> bool {
        self.position(window).is_some()
    }

    /// Number of in-progress messages.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Whether no message is in progress.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Drop every record failing the predicate, freeing its buffer.
    pub fn retain(&mut self, keep: impl FnMut(&PendingMessage) -> bool) {
        self.pending.retain(keep);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Window = Window(0x2a0001);
    const OTHER_WINDOW: Window = Window(0x2a0002);
    const BEGIN: Atom = Atom(71);

    /// Helper to build a full 20-byte fragment from a short byte string.
    fn chunk_of(bytes: &[u8]) -> [u8; CLIENT_MESSAGE_LEN] {
        let mut data = [b'x'; CLIENT_MESSAGE_LEN];
        data[..bytes.len()].copy_from_slice(bytes);
        data
    }

    #[test]
    fn test_admit_creates_once_per_window() {
        let mut store = ReassemblyStore::new();
        store.admit(WINDOW, BEGIN);
        store.admit(WINDOW, Atom(99));

        assert_eq!(store.len(), 1);
        // The atom of the first admission sticks.
        assert_eq!(store.admit(WINDOW, Atom(7)).begin_atom(), BEGIN);
    }

    #[test]
    fn test_append_without_terminator_continues() {
        let mut store = ReassemblyStore::new();
        let outcome = store.append(WINDOW, BEGIN, &[b'a'; CLIENT_MESSAGE_LEN]);

        assert!(matches!(outcome, AppendOutcome::Continues));
        assert!(store.contains(WINDOW));
        assert_eq!(store.admit(WINDOW, BEGIN).len(), CLIENT_MESSAGE_LEN);
    }

    #[test]
    fn test_append_stops_at_terminator_and_completes() {
        let mut store = ReassemblyStore::new();
        // NUL mid-chunk: bytes after it are padding and must be ignored.
        let outcome = store.append(WINDOW, BEGIN, &chunk_of(b"hello\0"));

        match outcome {
            AppendOutcome::Completed(message) => {
                assert_eq!(message.window(), WINDOW);
                assert_eq!(message.begin_atom(), BEGIN);
                assert_eq!(message.as_bytes(), b"hello");
                assert_eq!(message.into_text().unwrap(), "hello");
            }
            other => panic!("expected completion, got {:?}", other),
        }
        assert!(store.is_empty());
    }

    #[test]
    fn test_message_spanning_fragments() {
        let mut store = ReassemblyStore::new();

        let first = store.append(WINDOW, BEGIN, b"this text continues ");
        assert!(matches!(first, AppendOutcome::Continues));

        let second = store.append(WINDOW, BEGIN, &chunk_of(b"here\0"));
        match second {
            AppendOutcome::Completed(message) => {
                assert_eq!(message.into_text().unwrap(), "this text continues here");
            }
            other => panic!("expected completion, got {:?}", other),
        }
    }

    #[test]
    fn test_windows_reassemble_independently() {
        let mut store = ReassemblyStore::new();

        store.append(WINDOW, BEGIN, b"interleaved with the");
        let done = store.append(OTHER_WINDOW, BEGIN, &chunk_of(b"short\0"));

        match done {
            AppendOutcome::Completed(message) => {
                assert_eq!(message.window(), OTHER_WINDOW);
                assert_eq!(message.as_bytes(), b"short");
            }
            other => panic!("expected completion, got {:?}", other),
        }
        assert!(store.contains(WINDOW));
        assert!(!store.contains(OTHER_WINDOW));
    }

    #[test]
    fn test_oversized_record_is_discarded() {
        let mut store = ReassemblyStore::new();
        let fragment = [b'z'; CLIENT_MESSAGE_LEN];

        // Fill past the cap without ever sending a terminator.
        let mut discarded = false;
        for _ in 0..300 {
            match store.append(WINDOW, BEGIN, &fragment) {
                AppendOutcome::Continues => {}
                AppendOutcome::Discarded => {
                    discarded = true;
                    break;
                }
                AppendOutcome::Completed(_) => panic!("no terminator was sent"),
            }
        }

        assert!(discarded);
        assert!(store.is_empty());
    }

    #[test]
    fn test_discard_triggers_just_past_the_cap() {
        let mut store = ReassemblyStore::new();
        let fragment = [b'z'; CLIENT_MESSAGE_LEN];

        // 205 fragments put the buffer at 4100 bytes, the first length
        // over the cap; the 206th append must dump the record.
        for _ in 0..205 {
            assert!(matches!(
                store.append(WINDOW, BEGIN, &fragment),
                AppendOutcome::Continues
            ));
        }
        assert!(matches!(
            store.append(WINDOW, BEGIN, &fragment),
            AppendOutcome::Discarded
        ));
    }

    #[test]
    fn test_fresh_record_after_discard() {
        let mut store = ReassemblyStore::new();
        let fragment = [b'z'; CLIENT_MESSAGE_LEN];

        for _ in 0..205 {
            store.append(WINDOW, BEGIN, &fragment);
        }
        assert!(matches!(
            store.append(WINDOW, BEGIN, &fragment),
            AppendOutcome::Discarded
        ));

        // The next fragment starts over from empty.
        let outcome = store.append(WINDOW, BEGIN, &chunk_of(b"fresh\0"));
        match outcome {
            AppendOutcome::Completed(message) => {
                assert_eq!(message.as_bytes(), b"fresh")
            }
            other => panic!("expected completion, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_utf8_is_reported() {
        let mut store = ReassemblyStore::new();
        let outcome = store.append(WINDOW, BEGIN, &chunk_of(&[0xff, 0xfe, 0x00]));

        match outcome {
            AppendOutcome::Completed(message) => assert!(message.into_text().is_err()),
            other => panic!("expected completion, got {:?}", other),
        }
    }

    #[test]
    fn test_retain_prunes_records() {
        let mut store = ReassemblyStore::new();
        store.append(WINDOW, BEGIN, b"left around unfinish");
        store.append(OTHER_WINDOW, Atom(99), b"this one too, unfini");

        store.retain(|record| record.begin_atom() != BEGIN);

        assert!(!store.contains(WINDOW));
        assert!(store.contains(OTHER_WINDOW));
    }
}
