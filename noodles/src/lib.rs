//! Facade over the NOODLES protocol layers: `noodles_core` (ids/values),
//! `noodles_serde` (wire codec), `noodles_registry` (component arenas),
//! `noodles_session` (handshake/dispatch/broadcast). Applications embedding
//! the protocol depend on this crate alone; the reference CLI binary
//! (`src/bin/server.rs`) is a thin, non-core example of wiring it to a
//! transport.

pub mod config;

pub use config::ServerOptions;

pub use noodles_core::{AnyId, AnyVar, Id, Kind};
pub use noodles_registry::{Document, MutationError, Registry, RegistryOptions, UnsupportedUpdate};
pub use noodles_serde::{decode_frame, encode_frame, DecodeError, EncodeError, Envelope, MessageTag};
pub use noodles_session::{
    attach_table_builtins, install_entity_builtins, install_table_builtins, ClientId, ClientIdAllocator, ClientMirror, ClientPhase, Delegate,
    DelegateFactory, DispatchError, EntityCallbacks, Invoke, NoodlesError, ProtocolError, ServerSession, SessionOptions, TableBuiltins,
};
