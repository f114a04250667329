//! The NOODLES component registry: slotted arenas per kind, the referential
//! invariants spec.md §3 requires of every mutation, and the create/update/
//! delete message bodies those mutations emit.

pub mod arena;
pub mod components;
pub mod config;
pub mod dispatch_ctx;
pub mod document;
pub mod error;
pub mod registry;
pub mod search;
pub mod wire;
pub mod writer;

pub use arena::Arena;
pub use config::RegistryOptions;
pub use document::Document;
pub use error::{MutationError, UnsupportedUpdate};
pub use registry::Registry;
pub use search::{AttachedMethods, AttachedSignals, AttachedSet};
pub use writer::{MessageSink, NullSink, VecSink};
