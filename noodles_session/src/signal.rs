//! The signal broadcaster, spec.md §4.8: `fire(signal_id, scope, args)`
//! delivers a `SignalInvoke` to every client subscribed to `scope`. Document
//! and entity (and plot) scopes are implicit -- every Active client sees the
//! whole document -- while table subscription is explicit via
//! `noo::tbl_subscribe` (spec.md §4.9).
use hashbrown::HashSet;
use noodles_core::id::{Id, TableTag};
use noodles_registry::dispatch_ctx::Scope;

/// Whether a client subscribed to `client_tables` should receive a signal
/// fired against `scope`.
pub fn is_subscribed(scope: Scope, client_tables: &HashSet<Id<TableTag>>) -> bool {
    match scope {
        Scope::Table(id) => client_tables.contains(&id),
        Scope::Document | Scope::Entity(_) | Scope::Plot(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_scope_is_always_subscribed() {
        let empty = HashSet::new();
        assert!(is_subscribed(Scope::Document, &empty));
    }

    #[test]
    fn table_scope_requires_explicit_subscription() {
        let mut subs = HashSet::new();
        let t: Id<TableTag> = Id::new(0, 0);
        assert!(!is_subscribed(Scope::Table(t), &subs));
        subs.insert(t);
        assert!(is_subscribed(Scope::Table(t), &subs));
    }
}
