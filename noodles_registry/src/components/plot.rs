//! `Plot`: a data-driven or URL-driven visualization surface, spec.md §3.
use noodles_core::id::{Id, TableTag};

use crate::search::{AttachedMethods, AttachedSignals};

#[derive(Debug, Clone, PartialEq)]
pub enum PlotContent {
    SimpleString(String),
    Url(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Plot {
    pub table: Option<Id<TableTag>>,
    pub content: PlotContent,
    pub methods: AttachedMethods,
    pub signals: AttachedSignals,
}
