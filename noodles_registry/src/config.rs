//! Registry-level configuration: slot-preallocation hints. Follows the
//! plain-struct-of-fields style `lightyear/src/connection/netcode`'s
//! `NetcodeConfig` uses rather than a builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistryOptions {
    /// Expected number of live entities, used to presize the entity arena
    /// (and, as a rough proxy, the geometry/material/texture arenas it
    /// typically dominates) so a freshly populated document doesn't
    /// reallocate its `Vec`s slot-by-slot.
    pub entity_capacity_hint: usize,
    /// Expected number of live tables.
    pub table_capacity_hint: usize,
}

impl Default for RegistryOptions {
    fn default() -> Self {
        Self {
            entity_capacity_hint: 0,
            table_capacity_hint: 0,
        }
    }
}
