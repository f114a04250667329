//! Error types shared by multiple layers of the protocol engine.
use core::fmt;

/// A reference to a component kind, used when reporting a dangling or
/// mistyped id without pulling in the concrete `Id<T>` type (which would
/// make this error generic over every kind).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KindRef {
    pub kind: &'static str,
    pub slot: u32,
    pub gen: u32,
}

impl fmt::Display for KindRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}, {}]", self.kind, self.slot, self.gen)
    }
}

/// A mutation referenced a component that does not resolve: either the slot
/// was never allocated, the generation is stale, or it belongs to the wrong
/// arena. Carries the dependent field name so the caller can tell which
/// attribute held the dangling reference (see SPEC_FULL.md's
/// `original_source/` supplement).
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("dangling reference in field `{field}`: {reference} does not resolve")]
pub struct RefError {
    pub field: &'static str,
    pub reference: KindRef,
}

impl RefError {
    pub fn new(field: &'static str, kind: &'static str, slot: u32, gen: u32) -> Self {
        Self {
            field,
            reference: KindRef { kind, slot, gen },
        }
    }
}

/// Raised when the coercion helpers on [`crate::anyvar::AnyVar`] (or a typed
/// argument adapter built on top of it) cannot interpret a value.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AnyVarError {
    #[error("expected a value coercible to a packed i64 list, found {found}")]
    NotI64List { found: &'static str },
    #[error("expected a value coercible to a packed f64 list, found {found}")]
    NotF64List { found: &'static str },
    #[error("expected a {expected}-component float vector, found {found}")]
    NotVecN {
        expected: usize,
        found: &'static str,
    },
    #[error("expected an id, found {found}")]
    NotId { found: &'static str },
}
