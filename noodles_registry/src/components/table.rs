//! `Table`: the only kind whose runtime row data is not owned by the
//! registry -- it's supplied by an application-provided [`TableSource`]
//! (spec.md §3, §4.9, §6).
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use noodles_core::AnyVar;

use crate::search::{AttachedMethods, AttachedSignals};

/// One column's declared shape, shown to clients before any row data
/// arrives.
#[derive(Debug, Clone, PartialEq)]
pub struct ColSpec {
    pub name: String,
    pub doc: Option<String>,
}

/// A named selection of row keys, e.g. "hovered" or "picked" -- spec.md's
/// open question fixes the named-map form as authoritative; unnamed
/// selections are not supported.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Selection {
    pub keys: Vec<i64>,
}

/// `action` parameter shared by the entity `select_*` built-ins and table
/// selection updates: spec.md's open question fixes the int form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectAction {
    Subtract,
    Replace,
    Add,
}

impl TryFrom<i64> for SelectAction {
    type Error = ();
    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            -1 => Ok(SelectAction::Subtract),
            0 => Ok(SelectAction::Replace),
            1 => Ok(SelectAction::Add),
            _ => Err(()),
        }
    }
}

/// Application-implemented backing store for a `Table`'s row data.
/// Mutation hooks are called by the built-in `noo::tbl_*` methods
/// (spec.md §4.9); the source itself emits signals back to the core on
/// successful mutation by returning the rows/keys the built-in should fire.
pub trait TableSource: Send {
    fn columns(&self) -> Vec<ColSpec>;
    fn num_rows(&self) -> usize;
    fn current_rows(&self) -> Vec<Vec<AnyVar>>;
    fn current_selections(&self) -> BTreeMap<String, Selection>;

    fn handle_insert(&mut self, rows: Vec<Vec<AnyVar>>) -> Result<(Vec<i64>, Vec<Vec<AnyVar>>), String>;
    fn handle_update(
        &mut self,
        keys: Vec<i64>,
        rows: Vec<Vec<AnyVar>>,
    ) -> Result<(Vec<i64>, Vec<Vec<AnyVar>>), String>;
    fn handle_deletion(&mut self, keys: Vec<i64>) -> Result<Vec<i64>, String>;
    fn handle_reset(&mut self) -> Result<(), String>;
    fn handle_set_selection(&mut self, name: String, sel: Selection) -> Result<(), String>;
}

#[derive(Clone)]
pub struct Table {
    pub metadata: Option<String>,
    pub source: Option<Arc<Mutex<dyn TableSource>>>,
    pub methods: AttachedMethods,
    pub signals: AttachedSignals,
}

impl std::fmt::Debug for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Table")
            .field("metadata", &self.metadata)
            .field("source", &self.source.is_some())
            .field("methods", &self.methods)
            .field("signals", &self.signals)
            .finish()
    }
}

impl Table {
    pub fn new(metadata: Option<String>, source: Option<Arc<Mutex<dyn TableSource>>>) -> Self {
        Self {
            metadata,
            source,
            methods: AttachedMethods::new(),
            signals: AttachedSignals::new(),
        }
    }
}
