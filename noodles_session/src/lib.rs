//! NOODLES session state machines (spec.md §4.5-§4.9): the server-side
//! handshake/catch-up/broadcast loop, the client-side mirror, method
//! dispatch, signal fan-out, and the built-in table/entity method surface.
//!
//! `noodles_registry` owns the document's arenas and referential invariants;
//! this crate owns the wire-facing protocol layered on top of it.

pub mod builtins;
pub mod client;
pub mod client_id;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod server;
pub mod signal;
pub mod wire;

pub use builtins::{attach_table_builtins, install_entity_builtins, install_table_builtins, EntityCallbacks, TableBuiltins};
pub use client::{ClientMirror, ClientPhase, Delegate, DelegateFactory};
pub use client_id::{ClientId, ClientIdAllocator};
pub use config::SessionOptions;
pub use error::{DispatchError, NoodlesError, ProtocolError};
pub use server::ServerSession;
pub use wire::Invoke;
