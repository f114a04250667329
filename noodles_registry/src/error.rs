pub use noodles_core::error::RefError;

/// Update sent for a kind that doesn't advertise update support
/// (spec.md §4.3 edge cases; only Entity, Plot, Material, Light, Table,
/// Document support update).
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("kind `{kind}` does not support update")]
pub struct UnsupportedUpdate {
    pub kind: &'static str,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MutationError {
    #[error(transparent)]
    Ref(#[from] RefError),
    #[error(transparent)]
    UnsupportedUpdate(#[from] UnsupportedUpdate),
    #[error("an acyclic-parent check failed: entity {0} would become its own ancestor")]
    CyclicParent(u32),
}
