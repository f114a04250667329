//! Core types shared by every NOODLES protocol crate: the typed component
//! handle [`id::Id`], the dynamic value [`anyvar::AnyVar`], and the error
//! taxonomy used by the registry and session layers.

pub mod anyvar;
pub mod error;
pub mod id;

pub use anyvar::{AnyId, AnyVar};
pub use id::{Id, Kind};
