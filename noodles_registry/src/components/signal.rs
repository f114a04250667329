//! `Signal`: a named, documented event that a scope can fire (spec.md §3,
//! §4.8). Unlike `Method`, a signal has no handler -- firing it is a
//! registry-level broadcast operation, not a dispatch.
use super::method::ArgDoc;

#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    pub name: String,
    pub doc: Option<String>,
    pub arg_docs: Vec<ArgDoc>,
}
