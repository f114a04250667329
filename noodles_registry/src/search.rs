//! Search lists: the unordered set of methods or signals attached to a
//! scope (Document/Entity/Table/Plot), spec.md §2 L2 "Search lists".
//!
//! The distilled spec only shows this as a static `attached methods[]`
//! field; `old_src/server_lib/noodlesstate.cpp`'s `attach_method` /
//! `detach_method` helpers treat it as a first-class mutable set, which
//! this module restores (SPEC_FULL.md supplement #1).
use noodles_core::id::{Id, Kind, MethodTag, SignalTag};

/// Attached method/signal ids for one scope. Backed by `Vec` rather than a
/// hash set: attach/detach/search-list sizes are small (a handful of
/// methods per entity) and contains()/iteration order stability is more
/// useful here than hashing overhead.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttachedSet<K: Kind> {
    ids: Vec<Id<K>>,
}

impl<K: Kind> AttachedSet<K> {
    pub fn new() -> Self {
        Self { ids: Vec::new() }
    }

    pub fn from_ids(ids: Vec<Id<K>>) -> Self {
        Self { ids }
    }

    pub fn contains(&self, id: Id<K>) -> bool {
        self.ids.contains(&id)
    }

    /// Attach `id`; a no-op (not an error) if already attached.
    pub fn attach(&mut self, id: Id<K>) {
        if !self.contains(id) {
            self.ids.push(id);
        }
    }

    /// Detach `id`; a no-op if it wasn't attached.
    pub fn detach(&mut self, id: Id<K>) {
        self.ids.retain(|&existing| existing != id);
    }

    pub fn iter(&self) -> impl Iterator<Item = Id<K>> + '_ {
        self.ids.iter().copied()
    }

    pub fn as_slice(&self) -> &[Id<K>] {
        &self.ids
    }
}

pub type AttachedMethods = AttachedSet<MethodTag>;
pub type AttachedSignals = AttachedSet<SignalTag>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attach_is_idempotent() {
        let mut set: AttachedMethods = AttachedSet::new();
        let id: Id<MethodTag> = Id::new(1, 0);
        set.attach(id);
        set.attach(id);
        assert_eq!(set.as_slice(), &[id]);
    }

    #[test]
    fn detach_removes_only_the_matching_generation() {
        let mut set: AttachedMethods = AttachedSet::new();
        let old: Id<MethodTag> = Id::new(1, 0);
        let new: Id<MethodTag> = Id::new(1, 1);
        set.attach(new);
        set.detach(old);
        assert!(set.contains(new));
    }
}
