//! Error taxonomy for the session layer, spec.md §7. Composes the lower
//! layers' error types the way `lightyear_connection`'s `ConnectionError`
//! composes transport/link failures.
use noodles_core::error::RefError;
use noodles_registry::{MutationError, UnsupportedUpdate};
use noodles_serde::DecodeError;

/// The peer violated the handshake or session state machine (spec.md §4.5,
/// §4.6, §7). Always terminal for the session it was raised on.
#[derive(thiserror::Error, Debug)]
pub enum ProtocolError {
    #[error("handshake timed out after {elapsed_secs}s (limit {limit_secs}s)")]
    HandshakeTimeout { elapsed_secs: u32, limit_secs: u32 },
    #[error("expected Introduction as the first message, got tag {0:?}")]
    IntroductionExpected(noodles_serde::MessageTag),
    #[error("client sent a server-only message (tag {0:?})")]
    ClientSentServerMessage(noodles_serde::MessageTag),
    #[error("server sent a client-only message (tag {0:?})")]
    ServerSentClientMessage(noodles_serde::MessageTag),
    #[error("malformed {what}: {reason}")]
    MalformedBody { what: &'static str, reason: String },
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

/// Failure of one method-dispatch attempt, spec.md §4.7. Distinct from
/// [`ProtocolError`]: a dispatch error never closes the session, it is
/// reported back to the invoking client as a `MethodReply` exception.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum DispatchError {
    #[error("method {0:?} not found")]
    MethodNotFound(noodles_core::AnyId),
    #[error("method {0:?} is not attached to the invocation context")]
    MethodNotAttached(noodles_core::AnyId),
    #[error("invocation context did not resolve")]
    #[allow(dead_code)]
    ContextNotFound,
    #[error(transparent)]
    Ref(#[from] RefError),
    #[error(transparent)]
    UnsupportedUpdate(#[from] UnsupportedUpdate),
    #[error(transparent)]
    Mutation(#[from] MutationError),
}

/// Top-level error composing every layer the session touches, mirroring
/// `lightyear`'s `shared/error.rs` pattern of one crate-wide enum built
/// from `#[from]` on each layer's error type.
#[derive(thiserror::Error, Debug)]
pub enum NoodlesError {
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
    #[error(transparent)]
    Decode(#[from] DecodeError),
}
