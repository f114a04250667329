//! The "active write context" of spec.md §4.3: whatever sink a mutation's
//! create/update/delete message gets appended to. In the common case this
//! is the server's broadcast writer; during client catch-up it is instead
//! a single new client's private writer, so the catch-up batch never
//! reaches already-introduced clients.
use noodles_core::AnyVar;
use noodles_serde::{Envelope, MessageTag};

/// Borrowed for the duration of exactly one mutation call, mirroring the
/// teacher's `io: &mut Io` parameter threaded through `NetServer::send`:
/// the registry never owns the sink, so document state and the emitted
/// message land in the same commit without the registry needing to know
/// anything about how messages ultimately reach a transport.
pub trait MessageSink {
    fn push(&mut self, tag: MessageTag, body: AnyVar);
}

/// A sink that buffers into a plain `Vec`, used by tests and by the
/// catch-up path (spec.md §4.5) to build one contiguous batch.
#[derive(Debug, Default)]
pub struct VecSink(pub Vec<Envelope>);

impl MessageSink for VecSink {
    fn push(&mut self, tag: MessageTag, body: AnyVar) {
        self.0.push(Envelope::new(tag, body));
    }
}

impl VecSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_inner(self) -> Vec<Envelope> {
        self.0
    }
}

/// A sink that drops everything written to it; used where a mutation must
/// be performed but its message is intentionally not observable (e.g.
/// rebuilding a clean arena before feeding it the same data again).
#[derive(Debug, Default)]
pub struct NullSink;

impl MessageSink for NullSink {
    fn push(&mut self, _tag: MessageTag, _body: AnyVar) {}
}
