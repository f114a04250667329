//! Built-in table methods and signals, spec.md §4.9. Created once per
//! registry and attached to every `Table` as it's created, so every table
//! exposes the same `noo::tbl_*` surface without per-table method objects.
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use noodles_core::error::RefError;
use noodles_core::id::{SignalTag, TableTag};
use noodles_core::{AnyVar, Id};
use noodles_registry::components::method::{ArgDoc, Method, MethodInit};
use noodles_registry::components::signal::Signal;
use noodles_registry::components::table::{Selection, TableSource};
use noodles_registry::dispatch_ctx::{DispatchContext, MethodException, MethodResult, Scope};
use noodles_registry::writer::MessageSink;
use noodles_registry::Registry;

/// Ids of the shared `noo::tbl_*` methods and signals. Created once (see
/// [`install_table_builtins`]) and attached to each table by
/// [`attach_table_builtins`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableBuiltins {
    pub subscribe: Id<noodles_core::id::MethodTag>,
    pub insert: Id<noodles_core::id::MethodTag>,
    pub update: Id<noodles_core::id::MethodTag>,
    pub remove: Id<noodles_core::id::MethodTag>,
    pub clear: Id<noodles_core::id::MethodTag>,
    pub update_selection: Id<noodles_core::id::MethodTag>,
    pub updated: Id<SignalTag>,
    pub rows_removed: Id<SignalTag>,
    pub reset: Id<SignalTag>,
    pub selection_updated: Id<SignalTag>,
}

fn table_id(scope: Scope) -> Result<Id<TableTag>, MethodException> {
    match scope {
        Scope::Table(id) => Ok(id),
        other => Err(MethodException::internal(format!(
            "noo::tbl_* invoked outside of table scope: {other:?}"
        ))),
    }
}

fn source(ctx: &DispatchContext<'_>, id: Id<TableTag>) -> Result<Arc<Mutex<dyn TableSource>>, MethodException> {
    ctx.registry
        .tables
        .get(id)
        .and_then(|t| t.source.clone())
        .ok_or_else(|| MethodException::internal("table has no source"))
}

fn source_err(what: &str, reason: String) -> MethodException {
    MethodException::internal(format!("{what}: {reason}"))
}

fn rows_to_anyvar(rows: Vec<Vec<AnyVar>>) -> AnyVar {
    AnyVar::List(rows.into_iter().map(AnyVar::List).collect())
}

fn keys_to_anyvar(keys: Vec<i64>) -> AnyVar {
    AnyVar::PackedI64(keys)
}

fn selection_to_anyvar(name: &str, sel: &Selection) -> AnyVar {
    let mut m = BTreeMap::new();
    m.insert("name".to_string(), AnyVar::Text(name.to_string()));
    m.insert("keys".to_string(), AnyVar::PackedI64(sel.keys.clone()));
    AnyVar::Map(m)
}

fn parse_selection(v: &AnyVar) -> Result<(String, Selection), MethodException> {
    let map = match v {
        AnyVar::Map(m) => m,
        _ => return Err(MethodException::invalid_params(0, "selection is not a map")),
    };
    let name = map
        .get("name")
        .and_then(AnyVar::as_str)
        .ok_or_else(|| MethodException::invalid_params(0, "selection.name missing"))?
        .to_string();
    let keys = map
        .get("keys")
        .ok_or_else(|| MethodException::invalid_params(0, "selection.keys missing"))?
        .coerce_i64_list()
        .map_err(|e| MethodException::invalid_params(0, e))?;
    Ok((name.clone(), Selection { keys }))
}

fn parse_rows(v: &AnyVar) -> Result<Vec<Vec<AnyVar>>, MethodException> {
    match v {
        AnyVar::List(rows) => rows
            .iter()
            .map(|r| match r {
                AnyVar::List(cells) => Ok(cells.clone()),
                _ => Err(MethodException::invalid_params(0, "row is not a list")),
            })
            .collect(),
        _ => Err(MethodException::invalid_params(0, "rows is not a list")),
    }
}

fn handler_subscribe() -> Arc<dyn Fn(DispatchContext<'_>, &[AnyVar]) -> MethodResult + Send + Sync> {
    Arc::new(|ctx, _args| {
        let table = table_id(ctx.scope)?;
        let src = source(&ctx, table)?;
        let src = src.lock().unwrap();
        let mut m = BTreeMap::new();
        m.insert(
            "columns".to_string(),
            AnyVar::List(
                src.columns()
                    .into_iter()
                    .map(|c| {
                        let mut cm = BTreeMap::new();
                        cm.insert("name".to_string(), AnyVar::Text(c.name));
                        cm.insert("doc".to_string(), c.doc.map(AnyVar::Text).unwrap_or(AnyVar::Null));
                        AnyVar::Map(cm)
                    })
                    .collect(),
            ),
        );
        m.insert("rows".to_string(), rows_to_anyvar(src.current_rows()));
        m.insert(
            "selections".to_string(),
            AnyVar::List(
                src.current_selections()
                    .iter()
                    .map(|(name, sel)| selection_to_anyvar(name, sel))
                    .collect(),
            ),
        );
        Ok(AnyVar::Map(m))
    })
}

fn handler_insert(
    updated: Id<SignalTag>,
) -> Arc<dyn Fn(DispatchContext<'_>, &[AnyVar]) -> MethodResult + Send + Sync> {
    Arc::new(move |mut ctx, args| {
        let table = table_id(ctx.scope)?;
        let rows = parse_rows(args.first().ok_or_else(|| MethodException::invalid_params(0, "missing rows"))?)?;
        let src = source(&ctx, table)?;
        let (keys, rows) = src
            .lock()
            .unwrap()
            .handle_insert(rows)
            .map_err(|e| source_err("tbl_insert", e))?;
        ctx.fire(updated, vec![keys_to_anyvar(keys), rows_to_anyvar(rows)]);
        Ok(AnyVar::Null)
    })
}

fn handler_update(
    updated: Id<SignalTag>,
) -> Arc<dyn Fn(DispatchContext<'_>, &[AnyVar]) -> MethodResult + Send + Sync> {
    Arc::new(move |mut ctx, args| {
        let table = table_id(ctx.scope)?;
        let keys = args
            .first()
            .ok_or_else(|| MethodException::invalid_params(0, "missing keys"))?
            .coerce_i64_list()
            .map_err(|e| MethodException::invalid_params(0, e))?;
        let rows = parse_rows(args.get(1).ok_or_else(|| MethodException::invalid_params(1, "missing rows"))?)?;
        let src = source(&ctx, table)?;
        let (keys, rows) = src
            .lock()
            .unwrap()
            .handle_update(keys, rows)
            .map_err(|e| source_err("tbl_update", e))?;
        ctx.fire(updated, vec![keys_to_anyvar(keys), rows_to_anyvar(rows)]);
        Ok(AnyVar::Null)
    })
}

fn handler_remove(
    rows_removed: Id<SignalTag>,
) -> Arc<dyn Fn(DispatchContext<'_>, &[AnyVar]) -> MethodResult + Send + Sync> {
    Arc::new(move |mut ctx, args| {
        let table = table_id(ctx.scope)?;
        let keys = args
            .first()
            .ok_or_else(|| MethodException::invalid_params(0, "missing keys"))?
            .coerce_i64_list()
            .map_err(|e| MethodException::invalid_params(0, e))?;
        let src = source(&ctx, table)?;
        let removed = src
            .lock()
            .unwrap()
            .handle_deletion(keys)
            .map_err(|e| source_err("tbl_remove", e))?;
        ctx.fire(rows_removed, vec![keys_to_anyvar(removed)]);
        Ok(AnyVar::Null)
    })
}

fn handler_clear(reset: Id<SignalTag>) -> Arc<dyn Fn(DispatchContext<'_>, &[AnyVar]) -> MethodResult + Send + Sync> {
    Arc::new(move |mut ctx, _args| {
        let table = table_id(ctx.scope)?;
        let src = source(&ctx, table)?;
        src.lock().unwrap().handle_reset().map_err(|e| source_err("tbl_clear", e))?;
        ctx.fire(reset, vec![]);
        Ok(AnyVar::Null)
    })
}

fn handler_update_selection(
    selection_updated: Id<SignalTag>,
) -> Arc<dyn Fn(DispatchContext<'_>, &[AnyVar]) -> MethodResult + Send + Sync> {
    Arc::new(move |mut ctx, args| {
        let table = table_id(ctx.scope)?;
        let (name, sel) = parse_selection(args.first().ok_or_else(|| MethodException::invalid_params(0, "missing selection"))?)?;
        let src = source(&ctx, table)?;
        src.lock()
            .unwrap()
            .handle_set_selection(name.clone(), sel.clone())
            .map_err(|e| source_err("tbl_update_selection", e))?;
        ctx.fire(selection_updated, vec![selection_to_anyvar(&name, &sel)]);
        Ok(AnyVar::Null)
    })
}

fn method(name: &str, doc: &str, arg_docs: Vec<ArgDoc>, handler: noodles_registry::components::method::HandlerFn) -> Method {
    Method::with_handler(
        MethodInit {
            name: name.to_string(),
            doc: Some(doc.to_string()),
            return_doc: None,
            arg_docs,
        },
        handler,
    )
}

fn arg(name: &str, doc: &str) -> ArgDoc {
    ArgDoc {
        name: name.to_string(),
        doc: Some(doc.to_string()),
    }
}

fn signal(name: &str, doc: &str, arg_docs: Vec<ArgDoc>) -> Signal {
    Signal {
        name: name.to_string(),
        doc: Some(doc.to_string()),
        arg_docs,
    }
}

/// Create the shared `noo::tbl_*` methods and signals once. Call this at
/// registry/server startup, before any table is created.
pub fn install_table_builtins(registry: &mut Registry, sink: &mut impl MessageSink) -> TableBuiltins {
    let updated = registry.create_signal(
        signal(
            "tbl_updated",
            "rows were inserted or updated",
            vec![arg("keys", "row keys"), arg("rows", "row values")],
        ),
        sink,
    );
    let rows_removed = registry.create_signal(
        signal("tbl_rows_removed", "rows were removed", vec![arg("keys", "removed row keys")]),
        sink,
    );
    let reset = registry.create_signal(signal("tbl_reset", "the table was cleared", vec![]), sink);
    let selection_updated = registry.create_signal(
        signal(
            "tbl_selection_updated",
            "a named selection changed",
            vec![arg("selection", "name and keys")],
        ),
        sink,
    );

    let subscribe = registry.create_method(
        method("noo::tbl_subscribe", "subscribe to this table", vec![], handler_subscribe()),
        sink,
    );
    let insert = registry.create_method(
        method(
            "noo::tbl_insert",
            "insert rows",
            vec![arg("rows", "rows to insert")],
            handler_insert(updated),
        ),
        sink,
    );
    let update = registry.create_method(
        method(
            "noo::tbl_update",
            "update rows by key",
            vec![arg("keys", "row keys"), arg("rows", "new row values")],
            handler_update(updated),
        ),
        sink,
    );
    let remove = registry.create_method(
        method("noo::tbl_remove", "remove rows by key", vec![arg("keys", "row keys")], handler_remove(rows_removed)),
        sink,
    );
    let clear = registry.create_method(method("noo::tbl_clear", "remove all rows", vec![], handler_clear(reset)), sink);
    let update_selection = registry.create_method(
        method(
            "noo::tbl_update_selection",
            "set a named selection",
            vec![arg("selection", "name and keys")],
            handler_update_selection(selection_updated),
        ),
        sink,
    );

    TableBuiltins {
        subscribe,
        insert,
        update,
        remove,
        clear,
        update_selection,
        updated,
        rows_removed,
        reset,
        selection_updated,
    }
}

/// Attach the shared built-ins to one table, after it's created.
pub fn attach_table_builtins(
    registry: &mut Registry,
    table: Id<TableTag>,
    builtins: &TableBuiltins,
    sink: &mut impl MessageSink,
) -> Result<(), RefError> {
    for m in [
        builtins.subscribe,
        builtins.insert,
        builtins.update,
        builtins.remove,
        builtins.clear,
        builtins.update_selection,
    ] {
        registry.table_attach_method(table, m, sink)?;
    }
    for s in [builtins.updated, builtins.rows_removed, builtins.reset, builtins.selection_updated] {
        registry.table_attach_signal(table, s, sink)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use noodles_registry::components::table::{ColSpec, Table};
    use noodles_registry::dispatch_ctx::Scope;
    use noodles_registry::NullSink;
    use std::collections::BTreeMap as StdBTreeMap;

    struct MemTable {
        rows: StdBTreeMap<i64, Vec<AnyVar>>,
        next_key: i64,
        selections: StdBTreeMap<String, Selection>,
    }

    impl TableSource for MemTable {
        fn columns(&self) -> Vec<ColSpec> {
            vec![ColSpec {
                name: "value".to_string(),
                doc: None,
            }]
        }
        fn num_rows(&self) -> usize {
            self.rows.len()
        }
        fn current_rows(&self) -> Vec<Vec<AnyVar>> {
            self.rows.values().cloned().collect()
        }
        fn current_selections(&self) -> StdBTreeMap<String, Selection> {
            self.selections.clone()
        }
        fn handle_insert(&mut self, rows: Vec<Vec<AnyVar>>) -> Result<(Vec<i64>, Vec<Vec<AnyVar>>), String> {
            let mut keys = Vec::new();
            for row in &rows {
                let key = self.next_key;
                self.next_key += 1;
                self.rows.insert(key, row.clone());
                keys.push(key);
            }
            Ok((keys, rows))
        }
        fn handle_update(&mut self, keys: Vec<i64>, rows: Vec<Vec<AnyVar>>) -> Result<(Vec<i64>, Vec<Vec<AnyVar>>), String> {
            for (k, r) in keys.iter().zip(rows.iter()) {
                self.rows.insert(*k, r.clone());
            }
            Ok((keys, rows))
        }
        fn handle_deletion(&mut self, keys: Vec<i64>) -> Result<Vec<i64>, String> {
            for k in &keys {
                self.rows.remove(k);
            }
            Ok(keys)
        }
        fn handle_reset(&mut self) -> Result<(), String> {
            self.rows.clear();
            Ok(())
        }
        fn handle_set_selection(&mut self, name: String, sel: Selection) -> Result<(), String> {
            self.selections.insert(name, sel);
            Ok(())
        }
    }

    fn fresh_table(registry: &mut Registry, builtins: &TableBuiltins, sink: &mut impl MessageSink) -> Id<TableTag> {
        let source = Arc::new(Mutex::new(MemTable {
            rows: StdBTreeMap::new(),
            next_key: 0,
            selections: StdBTreeMap::new(),
        }));
        let table = registry.create_table(Table::new(None, Some(source)), sink).unwrap();
        attach_table_builtins(registry, table, builtins, sink).unwrap();
        table
    }

    #[test]
    fn insert_fires_tbl_updated_with_keys_and_rows() {
        let mut registry = Registry::new();
        let mut sink = NullSink;
        let builtins = install_table_builtins(&mut registry, &mut sink);
        let table = fresh_table(&mut registry, &builtins, &mut sink);

        let handler = registry.methods.get(builtins.insert).unwrap().handler.clone().unwrap();
        let mut signals = Vec::new();
        let ctx = DispatchContext {
            scope: Scope::Table(table),
            registry: &mut registry,
            signals: &mut signals,
        };
        let args = [AnyVar::List(vec![AnyVar::List(vec![AnyVar::Int(42)])])];
        let result = handler(ctx, &args).unwrap();
        assert_eq!(result, AnyVar::Null);
        assert_eq!(signals.len(), 1);
        assert_eq!(signals[0].signal, builtins.updated);
        assert_eq!(signals[0].scope, Scope::Table(table));
    }

    #[test]
    fn subscribe_returns_current_snapshot() {
        let mut registry = Registry::new();
        let mut sink = NullSink;
        let builtins = install_table_builtins(&mut registry, &mut sink);
        let table = fresh_table(&mut registry, &builtins, &mut sink);

        let insert = registry.methods.get(builtins.insert).unwrap().handler.clone().unwrap();
        let mut signals = Vec::new();
        let ctx = DispatchContext {
            scope: Scope::Table(table),
            registry: &mut registry,
            signals: &mut signals,
        };
        insert(ctx, &[AnyVar::List(vec![AnyVar::List(vec![AnyVar::Int(1)])])]).unwrap();

        let subscribe = registry.methods.get(builtins.subscribe).unwrap().handler.clone().unwrap();
        let mut signals = Vec::new();
        let ctx = DispatchContext {
            scope: Scope::Table(table),
            registry: &mut registry,
            signals: &mut signals,
        };
        let snapshot = subscribe(ctx, &[]).unwrap();
        let AnyVar::Map(m) = snapshot else { panic!("expected map") };
        assert_eq!(m["rows"], AnyVar::List(vec![AnyVar::List(vec![AnyVar::Int(1)])]));
    }
}
