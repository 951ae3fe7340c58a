//! Handler registry for incoming message subscriptions.
//!
//! The registry holds one entry per (root window, message type, callback)
//! subscription. Both atoms for the message type are resolved once, at
//! registration time; every later lookup is an integer comparison. The
//! set is small (typically under a dozen entries), so lookups are linear
//! predicate searches over a `Vec` rather than anything indexed.

use crate::error::Result;
use crate::transport::{Atom, WireConnection, Window};

/// Callback invoked with the registered type name and the decoded text of
/// each completed message.
pub type MessageCallback = Box<dyn FnMut(&str, &str)>;

/// The two atoms that tag fragments of one message type on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeAtoms {
    /// Tags the first fragment of a message. Resolved from the type name
    /// with a `_BEGIN` suffix.
    pub begin: Atom,
    /// Tags every fragment after the first. Resolved from the type name
    /// itself.
    pub continuation: Atom,
}

impl TypeAtoms {
    /// Resolve both atoms for `message_type`.
    ///
    /// A synchronous round trip to the display server; a resolution
    /// failure propagates and nothing is cached.
    pub fn resolve<C: WireConnection>(conn: &mut C, message_type: &str) -> Result<Self> {
        let continuation = conn.intern_atom(message_type)?;
        let begin = conn.intern_atom(&format!("{message_type}_BEGIN"))?;
        Ok(Self {
            begin,
            continuation,
        })
    }
}

/// Opaque identity of one registration, returned by
/// [`HandlerRegistry::register`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId(u64);

/// One registered subscription.
pub struct Registration {
    id: HandlerId,
    root: Window,
    message_type: String,
    atoms: TypeAtoms,
    callback: MessageCallback,
}

impl Registration {
    /// The message-type name this subscription was registered under.
    #[inline]
    pub fn message_type(&self) -> &str {
        &self.message_type
    }

    /// Root window of the screen this subscription targets.
    #[inline]
    pub fn root(&self) -> Window {
        self.root
    }

    /// The resolved atom pair.
    #[inline]
    pub fn atoms(&self) -> TypeAtoms {
        self.atoms
    }

    /// Hand one decoded message to the callback.
    pub(crate) fn deliver(&mut self, text: &str) {
        (self.callback)(&self.message_type, text);
    }
}

impl std::fmt::Debug for Registration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registration")
            .field("id", &self.id)
            .field("root", &self.root)
            .field("message_type", &self.message_type)
            .field("atoms", &self.atoms)
            .finish_non_exhaustive()
    }
}

/// Per-connection registry of message subscriptions.
#[derive(Debug, Default)]
pub struct HandlerRegistry {
    registrations: Vec<Registration>,
    next_id: u64,
}

impl HandlerRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback for `message_type` on the screen owning `root`.
    ///
    /// Resolves the type's atom pair before anything is stored, so a
    /// resolution failure leaves the registry untouched. New registrations
    /// are prepended: fan-out visits the most recently registered entry
    /// first. Subscribers must not rely on that order.
    pub fn register<C, F>(
        &mut self,
        conn: &mut C,
        root: Window,
        message_type: &str,
        callback: F,
    ) -> Result<HandlerId>
    where
        C: WireConnection,
        F: FnMut(&str, &str) + 'static,
    {
        let atoms = TypeAtoms::resolve(conn, message_type)?;

        let id = HandlerId(self.next_id);
        self.next_id += 1;

        self.registrations.insert(
            0,
            Registration {
                id,
                root,
                message_type: message_type.to_string(),
                atoms,
                callback: Box::new(callback),
            },
        );

        tracing::debug!(message_type, ?root, "registered message handler");
        Ok(id)
    }

    /// Remove the registration behind `id`, dropping its callback.
    ///
    /// Silently a no-op when `id` is unknown; returns whether anything was
    /// removed.
    pub fn unregister(&mut self, id: HandlerId) -> bool {
        match self.registrations.iter().position(|r| r.id == id) {
            Some(index) => {
                let removed = self.registrations.remove(index);
                tracing::debug!(
                    message_type = removed.message_type.as_str(),
                    "unregistered message handler"
                );
                true
            }
            None => false,
        }
    }

    /// Whether any registration is interested in events tagged `atom`.
    ///
    /// True when `atom` is the begin or continuation atom of any entry.
    /// This is the admission filter: message types nobody subscribed to
    /// are rejected before the reassembly store allocates anything.
    pub fn any_handler_wants(&self, atom: Atom) -> bool {
        self.registrations
            .iter()
            .any(|r| r.atoms.begin == atom || r.atoms.continuation == atom)
    }

    /// Registrations whose begin atom equals `begin_atom`, in registration
    /// order, for fan-out.
    pub(crate) fn matching_mut(
        &mut self,
        begin_atom: Atom,
    ) -> impl Iterator<Item = &mut Registration> {
        self.registrations
            .iter_mut()
            .filter(move |r| r.atoms.begin == begin_atom)
    }

    /// Number of live registrations.
    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    /// Whether the registry has no registrations.
    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }
}
