//! Built-in methods and signals, spec.md §4.9: the `noo::tbl_*` surface
//! every table exposes, and the per-entity callbacks surface.
pub mod entity;
pub mod table;

pub use entity::{install_entity_builtins, EntityCallbacks};
pub use table::{attach_table_builtins, install_table_builtins, TableBuiltins};
