//! [`AnyVar`]: the tagged dynamic value carried by method arguments, signal
//! arguments, and table cells.
//!
//! The packed numeric list variants exist so that bulk numeric payloads
//! (vertex buffers pulled through a table column, big selections of keys)
//! can be decoded without allocating one boxed [`AnyVar`] per element — see
//! `noodles_serde`'s zero-copy packed-list decode.
use std::collections::BTreeMap;

use crate::error::AnyVarError;
use crate::id::{Id, Kind};

/// A type-erased component id: which kind it names plus its `(slot, gen)`.
///
/// `AnyVar` cannot hold an `Id<T>` directly because `T` would make the enum
/// generic over every component kind; this carries the same bits plus the
/// kind label needed to type-check it back into an `Id<T>` with
/// [`AnyVar::as_id`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnyId {
    pub kind: &'static str,
    pub slot: u32,
    pub gen: u32,
}

impl<T: Kind> From<Id<T>> for AnyId {
    fn from(id: Id<T>) -> Self {
        AnyId {
            kind: T::LABEL,
            slot: id.slot,
            gen: id.gen,
        }
    }
}

/// The tagged dynamic value used throughout the wire protocol.
#[derive(Debug, Clone, PartialEq)]
pub enum AnyVar {
    Null,
    Bool(bool),
    Int(i64),
    Real(f64),
    Text(String),
    Bytes(Vec<u8>),
    Id(AnyId),
    List(Vec<AnyVar>),
    Map(BTreeMap<String, AnyVar>),
    /// Zero-copy bulk-numeric fast path; distinct from `List` of `Int`.
    PackedI64(Vec<i64>),
    /// Zero-copy bulk-numeric fast path; distinct from `List` of `Real`.
    PackedF64(Vec<f64>),
}

impl AnyVar {
    pub fn is_null(&self) -> bool {
        matches!(self, AnyVar::Null)
    }

    pub fn as_id<T: Kind>(&self) -> Option<Id<T>> {
        match self {
            AnyVar::Id(any) if any.kind == T::LABEL => Some(Id::new(any.slot, any.gen)),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AnyVar::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            AnyVar::Int(v) => Some(*v),
            AnyVar::Real(v) => Some(*v as i64),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AnyVar::Real(v) => Some(*v),
            AnyVar::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    fn type_name(&self) -> &'static str {
        match self {
            AnyVar::Null => "null",
            AnyVar::Bool(_) => "bool",
            AnyVar::Int(_) => "i64",
            AnyVar::Real(_) => "f64",
            AnyVar::Text(_) => "string",
            AnyVar::Bytes(_) => "bytes",
            AnyVar::Id(_) => "id",
            AnyVar::List(_) => "list",
            AnyVar::Map(_) => "map",
            AnyVar::PackedI64(_) => "packed_i64",
            AnyVar::PackedF64(_) => "packed_f64",
        }
    }

    /// Returns the packed i64 list directly, or `None` if this value isn't
    /// list-shaped at all (use [`coerce_i64_list`](Self::coerce_i64_list)
    /// to also accept a generic list of numbers).
    pub fn as_i64_list(&self) -> Option<&[i64]> {
        match self {
            AnyVar::PackedI64(v) => Some(v.as_slice()),
            _ => None,
        }
    }

    pub fn as_f64_list(&self) -> Option<&[f64]> {
        match self {
            AnyVar::PackedF64(v) => Some(v.as_slice()),
            _ => None,
        }
    }

    /// Accepts either the packed i64 list or a generic list whose elements
    /// are numerically convertible, truncating f64 -> i64.
    pub fn coerce_i64_list(&self) -> Result<Vec<i64>, AnyVarError> {
        match self {
            AnyVar::PackedI64(v) => Ok(v.clone()),
            AnyVar::List(items) => items
                .iter()
                .map(|v| match v {
                    AnyVar::Int(i) => Ok(*i),
                    AnyVar::Real(f) => Ok(*f as i64),
                    other => Err(AnyVarError::NotI64List {
                        found: other.type_name(),
                    }),
                })
                .collect(),
            other => Err(AnyVarError::NotI64List {
                found: other.type_name(),
            }),
        }
    }

    /// Accepts either the packed f64 list or a generic list whose elements
    /// are numerically convertible, widening i64 -> f64.
    pub fn coerce_f64_list(&self) -> Result<Vec<f64>, AnyVarError> {
        match self {
            AnyVar::PackedF64(v) => Ok(v.clone()),
            AnyVar::List(items) => items
                .iter()
                .map(|v| match v {
                    AnyVar::Real(f) => Ok(*f),
                    AnyVar::Int(i) => Ok(*i as f64),
                    other => Err(AnyVarError::NotF64List {
                        found: other.type_name(),
                    }),
                })
                .collect(),
            other => Err(AnyVarError::NotF64List {
                found: other.type_name(),
            }),
        }
    }

    /// Extracts a fixed-size float vector (vec2/vec3/vec4/mat4 are all
    /// transported this way); accepts a packed or generic list of exactly
    /// `N` numbers. Grounded on `noo_any.cpp`'s `as_vec<T>` helpers.
    pub fn as_vec_n<const N: usize>(&self) -> Result<[f64; N], AnyVarError> {
        let list = self.coerce_f64_list().map_err(|_| AnyVarError::NotVecN {
            expected: N,
            found: self.type_name(),
        })?;
        if list.len() != N {
            return Err(AnyVarError::NotVecN {
                expected: N,
                found: self.type_name(),
            });
        }
        let mut out = [0f64; N];
        out.copy_from_slice(&list);
        Ok(out)
    }
}

impl From<()> for AnyVar {
    fn from(_: ()) -> Self {
        AnyVar::Null
    }
}
impl From<bool> for AnyVar {
    fn from(v: bool) -> Self {
        AnyVar::Bool(v)
    }
}
impl From<i64> for AnyVar {
    fn from(v: i64) -> Self {
        AnyVar::Int(v)
    }
}
impl From<f64> for AnyVar {
    fn from(v: f64) -> Self {
        AnyVar::Real(v)
    }
}
impl From<String> for AnyVar {
    fn from(v: String) -> Self {
        AnyVar::Text(v)
    }
}
impl From<&str> for AnyVar {
    fn from(v: &str) -> Self {
        AnyVar::Text(v.to_string())
    }
}
impl<T: Kind> From<Id<T>> for AnyVar {
    fn from(v: Id<T>) -> Self {
        AnyVar::Id(v.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::EntityTag;

    #[test]
    fn coerce_i64_list_accepts_generic_list() {
        let v = AnyVar::List(vec![AnyVar::Int(1), AnyVar::Real(2.9)]);
        assert_eq!(v.coerce_i64_list().unwrap(), vec![1, 2]);
    }

    #[test]
    fn coerce_f64_list_widens_ints() {
        let v = AnyVar::List(vec![AnyVar::Int(1), AnyVar::Real(2.5)]);
        assert_eq!(v.coerce_f64_list().unwrap(), vec![1.0, 2.5]);
    }

    #[test]
    fn packed_list_is_not_confused_with_generic_list() {
        let packed = AnyVar::PackedI64(vec![1, 2, 3]);
        assert_eq!(packed.as_i64_list(), Some(&[1, 2, 3][..]));
        let generic = AnyVar::List(vec![AnyVar::Int(1)]);
        assert_eq!(generic.as_i64_list(), None);
    }

    #[test]
    fn as_vec_n_validates_length() {
        let v = AnyVar::PackedF64(vec![1.0, 2.0, 3.0]);
        assert_eq!(v.as_vec_n::<3>().unwrap(), [1.0, 2.0, 3.0]);
        assert!(v.as_vec_n::<4>().is_err());
    }

    #[test]
    fn id_round_trips_through_anyvar() {
        let id: Id<EntityTag> = Id::new(4, 2);
        let v: AnyVar = id.into();
        assert_eq!(v.as_id::<EntityTag>(), Some(id));
    }
}
