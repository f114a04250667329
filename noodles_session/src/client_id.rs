//! The opaque per-client handle spec.md §5 requires ("per-client state is
//! owned by the session, keyed by an opaque client handle"). Unlike a
//! component [`noodles_core::id::Id`] this is never reused: a disconnected
//! client's id never refers to a later connection.
use core::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClientId(u64);

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "client#{}", self.0)
    }
}

/// Mints strictly increasing [`ClientId`]s for one server session.
#[derive(Debug, Default)]
pub struct ClientIdAllocator {
    next: u64,
}

impl ClientIdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&mut self) -> ClientId {
        let id = ClientId(self.next);
        self.next += 1;
        id
    }
}
