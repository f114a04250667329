//! `Document`: the singleton root scope. Unlike every other kind it has no
//! `Id` of its own -- there is exactly one per `Registry` -- and it
//! supports update (its attached methods/signals can change) but never
//! create/delete.
use crate::search::{AttachedMethods, AttachedSignals};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    pub methods: AttachedMethods,
    pub signals: AttachedSignals,
}
