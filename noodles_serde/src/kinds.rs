//! The fixed table mapping component kind labels (from `noodles_core::id`)
//! to the single-byte wire code used when an `AnyVar::Id` is encoded. Order
//! matches the dependency order used for catch-up in spec.md §4.5.
use crate::error::DecodeError;

pub const KIND_TABLE: &[&str] = &[
    "method",
    "signal",
    "buffer",
    "buffer_view",
    "image",
    "sampler",
    "texture",
    "material",
    "geometry",
    "light",
    "entity",
    "plot",
    "table",
];

pub fn code_to_kind(code: u8) -> Result<&'static str, DecodeError> {
    KIND_TABLE
        .get(code as usize)
        .copied()
        .ok_or(DecodeError::UnknownKind(code))
}
