//! The server-side session state machine, spec.md §4.5: per-client
//! handshake → catch-up → active broadcast, method dispatch, and signal
//! fan-out filtered by table subscription.
use std::time::Instant;

use hashbrown::HashSet;
use indexmap::IndexMap;
use tracing::{debug, info, warn};

use noodles_core::error::RefError;
use noodles_core::id::{Id, TableTag};
use noodles_core::AnyId;
use noodles_registry::components::table::Table;
use noodles_registry::dispatch_ctx::{PendingSignal, Scope};
use noodles_registry::writer::{MessageSink, VecSink};
use noodles_registry::Registry;
use noodles_serde::{Envelope, MessageTag};

use crate::builtins::table::{attach_table_builtins, install_table_builtins, TableBuiltins};
use crate::client_id::{ClientId, ClientIdAllocator};
use crate::config::SessionOptions;
use crate::dispatch;
use crate::error::ProtocolError;
use crate::signal;
use crate::wire;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ClientPhase {
    Handshaking,
    Active,
    Closed,
}

struct ClientConn {
    phase: ClientPhase,
    connected_at: Instant,
    name: Option<String>,
    outbox: Vec<Envelope>,
    subscribed_tables: HashSet<Id<TableTag>>,
}

impl ClientConn {
    fn new(now: Instant) -> Self {
        Self {
            phase: ClientPhase::Handshaking,
            connected_at: now,
            name: None,
            outbox: Vec::new(),
            subscribed_tables: HashSet::new(),
        }
    }
}

/// Owns the registry and every connected client's state. Application code
/// drives document mutation through [`ServerSession::mutate`] so that the
/// resulting broadcast always reaches every Active client in the same
/// commit as the mutation (spec.md §4.1/§9 "ownership of arenas").
pub struct ServerSession {
    registry: Registry,
    clients: IndexMap<ClientId, ClientConn>,
    allocator: ClientIdAllocator,
    options: SessionOptions,
    table_builtins: Option<TableBuiltins>,
}

impl ServerSession {
    pub fn new(options: SessionOptions) -> Self {
        Self {
            registry: Registry::new(),
            clients: IndexMap::new(),
            allocator: ClientIdAllocator::new(),
            options,
            table_builtins: None,
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Run a document mutation and broadcast whatever messages it emits to
    /// every Active client. `f` returning `Err` is expected to have pushed
    /// nothing to `sink` -- every `Registry` mutator already upholds that
    /// (spec.md §4.10: "Arena invariant violation ... no message is
    /// emitted").
    pub fn mutate<F, T, E>(&mut self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut Registry, &mut VecSink) -> Result<T, E>,
    {
        let mut sink = VecSink::new();
        let result = f(&mut self.registry, &mut sink);
        self.broadcast(sink.into_inner());
        result
    }

    fn broadcast(&mut self, envelopes: Vec<Envelope>) {
        if envelopes.is_empty() {
            return;
        }
        for conn in self.clients.values_mut() {
            if conn.phase == ClientPhase::Active {
                conn.outbox.extend(envelopes.iter().cloned());
            }
        }
    }

    /// Install the shared `noo::tbl_*` methods/signals once. Call before
    /// creating any table.
    pub fn install_table_builtins(&mut self) -> TableBuiltins {
        let builtins = self.mutate(|registry, sink| Ok::<_, std::convert::Infallible>(install_table_builtins(registry, sink))).unwrap();
        self.table_builtins = Some(builtins);
        builtins
    }

    /// Create a table and attach the shared built-ins to it in the same
    /// broadcast commit. Panics if [`Self::install_table_builtins`] hasn't
    /// run yet.
    pub fn create_table_with_builtins(&mut self, table: Table) -> Result<Id<TableTag>, RefError> {
        let builtins = self.table_builtins.expect("install_table_builtins must run before creating tables");
        self.mutate(move |registry, sink| {
            let id = registry.create_table(table, sink)?;
            attach_table_builtins(registry, id, &builtins, sink)?;
            Ok(id)
        })
    }

    pub fn connect(&mut self, now: Instant) -> ClientId {
        let id = self.allocator.next();
        self.clients.insert(id, ClientConn::new(now));
        debug!(%id, "client connected, awaiting introduction");
        id
    }

    pub fn disconnect(&mut self, client: ClientId) {
        if self.clients.shift_remove(&client).is_some() {
            debug!(%client, "client disconnected");
        }
    }

    /// Clients still Handshaking whose deadline has passed, per E6. Each is
    /// closed and removed; nothing more is ever written to its outbox.
    pub fn poll_timeouts(&mut self, now: Instant) -> Vec<ClientId> {
        let limit = self.options.handshake_timeout_secs as u64;
        let timed_out: Vec<ClientId> = self
            .clients
            .iter()
            .filter(|(_, conn)| {
                conn.phase == ClientPhase::Handshaking && now.duration_since(conn.connected_at).as_secs() >= limit
            })
            .map(|(id, _)| *id)
            .collect();
        for id in &timed_out {
            warn!(client = %id, limit_secs = limit, "handshake timed out");
            self.clients.shift_remove(id);
        }
        timed_out
    }

    /// Handle one inbound frame entry from `client`. Returns the protocol
    /// error the session should close on, if any; the session state for
    /// `client` is left `Closed`-equivalent (removed) on error.
    pub fn handle_message(&mut self, client: ClientId, envelope: Envelope) -> Result<(), ProtocolError> {
        if envelope.tag.is_server_to_client() {
            self.clients.shift_remove(&client);
            return Err(ProtocolError::ClientSentServerMessage(envelope.tag));
        }

        let phase = match self.clients.get(&client) {
            Some(conn) => conn.phase,
            None => return Ok(()),
        };

        match (phase, envelope.tag) {
            (ClientPhase::Handshaking, MessageTag::Introduction) => {
                let name = wire::parse_introduction(&envelope.body)?;
                let mut sink = VecSink::new();
                self.registry.catch_up(&mut sink);
                let conn = self.clients.get_mut(&client).unwrap();
                conn.name = Some(name);
                conn.outbox.extend(sink.into_inner());
                conn.phase = ClientPhase::Active;
                info!(%client, name = ?conn.name, "client introduced, caught up");
                Ok(())
            }
            (ClientPhase::Handshaking, other) => {
                self.clients.shift_remove(&client);
                Err(ProtocolError::IntroductionExpected(other))
            }
            (ClientPhase::Active, MessageTag::MethodInvoke) => {
                let invoke = wire::parse_invoke(&envelope.body)?;
                let (result, signals) = dispatch::dispatch(&mut self.registry, &invoke);

                if let (Ok(_), Scope::Table(table_id)) = (&result, invoke.context) {
                    if self.table_builtins.map(|b| b.subscribe) == Some(invoke.method_id) {
                        if let Some(conn) = self.clients.get_mut(&client) {
                            conn.subscribed_tables.insert(table_id);
                        }
                    }
                }

                let reply = wire::reply_body(&invoke.invoke_id, result);
                if let Some(conn) = self.clients.get_mut(&client) {
                    conn.outbox.push(Envelope::new(MessageTag::MethodReply, reply));
                }
                self.fan_out_signals(signals);
                Ok(())
            }
            (ClientPhase::Active, MessageTag::Introduction) => Err(ProtocolError::MalformedBody {
                what: "Introduction",
                reason: "client already introduced".to_string(),
            }),
            (ClientPhase::Active, other) => Err(ProtocolError::ClientSentServerMessage(other)),
            (ClientPhase::Closed, _) => Ok(()),
        }
    }

    fn fan_out_signals(&mut self, signals: Vec<PendingSignal>) {
        for sig in signals {
            let scope_id: Option<AnyId> = match sig.scope {
                Scope::Document => None,
                Scope::Entity(id) => Some(AnyId::from(id)),
                Scope::Table(id) => Some(AnyId::from(id)),
                Scope::Plot(id) => Some(AnyId::from(id)),
            };
            let body = wire::signal_invoke_body(sig.signal, scope_id, &sig.args);
            for conn in self.clients.values_mut() {
                if conn.phase == ClientPhase::Active && signal::is_subscribed(sig.scope, &conn.subscribed_tables) {
                    conn.outbox.push(Envelope::new(MessageTag::SignalInvoke, body.clone()));
                }
            }
        }
    }

    /// Pull everything queued for `client` since the last drain.
    pub fn drain_outbox(&mut self, client: ClientId) -> Vec<Envelope> {
        self.clients.get_mut(&client).map(|c| std::mem::take(&mut c.outbox)).unwrap_or_default()
    }

    #[cfg(test)]
    fn is_active(&self, client: ClientId) -> bool {
        self.clients.get(&client).map(|c| c.phase == ClientPhase::Active).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use noodles_core::AnyVar;
    use noodles_registry::components::entity::Entity;
    use noodles_registry::components::method::{Method, MethodInit};
    use noodles_registry::components::table::{ColSpec, Selection, TableSource};
    use noodles_serde::MessageTag as Tag;
    use std::collections::BTreeMap;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    fn introduce(session: &mut ServerSession, client: ClientId, name: &str) {
        session
            .handle_message(client, Envelope::new(Tag::Introduction, wire::introduction_body(name)))
            .unwrap();
    }

    #[test]
    fn handshake_then_catch_up_then_active() {
        let mut session = ServerSession::new(SessionOptions::default());
        let now = Instant::now();
        session
            .mutate(|registry, sink| {
                registry.create_entity(Entity::default(), sink)?;
                Ok::<_, RefError>(())
            })
            .unwrap();

        let client = session.connect(now);
        introduce(&mut session, client, "viewer-1");
        assert!(session.is_active(client));

        let outbox = session.drain_outbox(client);
        assert!(outbox.iter().any(|e| e.tag == Tag::EntityCreate));
        assert!(outbox.iter().any(|e| e.tag == Tag::DocumentUpdate));
    }

    #[test]
    fn non_introduction_before_handshake_is_a_protocol_error() {
        let mut session = ServerSession::new(SessionOptions::default());
        let client = session.connect(Instant::now());
        let invoke = wire::Invoke {
            method_id: Id::new(0, 0),
            context: Scope::Document,
            invoke_id: "1".to_string(),
            args: vec![],
        };
        let err = session
            .handle_message(client, Envelope::new(Tag::MethodInvoke, wire::invoke_body(&invoke)))
            .unwrap_err();
        assert!(matches!(err, ProtocolError::IntroductionExpected(Tag::MethodInvoke)));
    }

    #[test]
    fn handshake_timeout_closes_the_client() {
        let mut session = ServerSession::new(SessionOptions {
            handshake_timeout_secs: 30,
        });
        let start = Instant::now();
        let client = session.connect(start);
        let later = start + Duration::from_secs(31);
        let timed_out = session.poll_timeouts(later);
        assert_eq!(timed_out, vec![client]);
        assert!(!session.is_active(client));
    }

    #[test]
    fn echo_method_replies_only_to_the_inviting_client() {
        let mut session = ServerSession::new(SessionOptions::default());
        let method_id = session
            .mutate(|registry, sink| {
                let id = registry.create_method(
                    Method::with_handler(
                        MethodInit {
                            name: "echo".to_string(),
                            doc: None,
                            return_doc: None,
                            arg_docs: vec![],
                        },
                        Arc::new(|_ctx, args| Ok(args.first().cloned().unwrap_or(AnyVar::Null))),
                    ),
                    sink,
                );
                registry.document_attach_method(id, sink)?;
                Ok::<_, RefError>(id)
            })
            .unwrap();

        let a = session.connect(Instant::now());
        let b = session.connect(Instant::now());
        introduce(&mut session, a, "a");
        introduce(&mut session, b, "b");
        session.drain_outbox(a);
        session.drain_outbox(b);

        let invoke = wire::Invoke {
            method_id,
            context: Scope::Document,
            invoke_id: "1".to_string(),
            args: vec![AnyVar::Text("hi".to_string())],
        };
        session
            .handle_message(a, Envelope::new(Tag::MethodInvoke, wire::invoke_body(&invoke)))
            .unwrap();

        let a_out = session.drain_outbox(a);
        assert_eq!(a_out.len(), 1);
        assert_eq!(a_out[0].tag, Tag::MethodReply);
        assert!(session.drain_outbox(b).is_empty());
    }

    struct MemTable {
        rows: BTreeMap<i64, Vec<AnyVar>>,
        next_key: i64,
    }

    impl TableSource for MemTable {
        fn columns(&self) -> Vec<ColSpec> {
            vec![ColSpec {
                name: "v".to_string(),
                doc: None,
            }]
        }
        fn num_rows(&self) -> usize {
            self.rows.len()
        }
        fn current_rows(&self) -> Vec<Vec<AnyVar>> {
            self.rows.values().cloned().collect()
        }
        fn current_selections(&self) -> BTreeMap<String, Selection> {
            BTreeMap::new()
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
            Ok((keys, rows))
        }
        fn handle_deletion(&mut self, keys: Vec<i64>) -> Result<Vec<i64>, String> {
            Ok(keys)
        }
        fn handle_reset(&mut self) -> Result<(), String> {
            Ok(())
        }
        fn handle_set_selection(&mut self, _name: String, _sel: Selection) -> Result<(), String> {
            Ok(())
        }
    }

    #[test]
    fn table_insert_fans_out_to_subscribers_only() {
        let mut session = ServerSession::new(SessionOptions::default());
        session.install_table_builtins();
        let table = session
            .create_table_with_builtins(Table::new(
                None,
                Some(Arc::new(Mutex::new(MemTable {
                    rows: BTreeMap::new(),
                    next_key: 0,
                }))),
            ))
            .unwrap();
        let builtins = session.table_builtins.unwrap();

        let a = session.connect(Instant::now());
        let b = session.connect(Instant::now());
        let c = session.connect(Instant::now());
        introduce(&mut session, a, "a");
        introduce(&mut session, b, "b");
        introduce(&mut session, c, "c");
        session.drain_outbox(a);
        session.drain_outbox(b);
        session.drain_outbox(c);

        let subscribe = wire::Invoke {
            method_id: builtins.subscribe,
            context: Scope::Table(table),
            invoke_id: "sub".to_string(),
            args: vec![],
        };
        session
            .handle_message(a, Envelope::new(Tag::MethodInvoke, wire::invoke_body(&subscribe)))
            .unwrap();
        session
            .handle_message(b, Envelope::new(Tag::MethodInvoke, wire::invoke_body(&subscribe)))
            .unwrap();
        session.drain_outbox(a);
        session.drain_outbox(b);

        let insert = wire::Invoke {
            method_id: builtins.insert,
            context: Scope::Table(table),
            invoke_id: "ins".to_string(),
            args: vec![AnyVar::List(vec![AnyVar::List(vec![AnyVar::Int(7)])])],
        };
        session
            .handle_message(a, Envelope::new(Tag::MethodInvoke, wire::invoke_body(&insert)))
            .unwrap();

        let a_out = session.drain_outbox(a);
        assert!(a_out.iter().any(|e| e.tag == Tag::SignalInvoke));
        assert!(a_out.iter().any(|e| e.tag == Tag::MethodReply));

        let b_out = session.drain_outbox(b);
        assert!(b_out.iter().any(|e| e.tag == Tag::SignalInvoke));

        // c never subscribed, so it doesn't see the fire.
        let c_out = session.drain_outbox(c);
        assert!(!c_out.iter().any(|e| e.tag == Tag::SignalInvoke));
    }

    #[test]
    fn disconnect_mid_flight_does_not_stop_other_subscribers_from_hearing_the_signal() {
        let mut session = ServerSession::new(SessionOptions::default());
        session.install_table_builtins();
        let table = session
            .create_table_with_builtins(Table::new(
                None,
                Some(Arc::new(Mutex::new(MemTable {
                    rows: BTreeMap::new(),
                    next_key: 0,
                }))),
            ))
            .unwrap();
        let builtins = session.table_builtins.unwrap();

        let a = session.connect(Instant::now());
        let b = session.connect(Instant::now());
        introduce(&mut session, a, "a");
        introduce(&mut session, b, "b");
        session.drain_outbox(a);
        session.drain_outbox(b);

        let subscribe = wire::Invoke {
            method_id: builtins.subscribe,
            context: Scope::Table(table),
            invoke_id: "sub".to_string(),
            args: vec![],
        };
        session
            .handle_message(a, Envelope::new(Tag::MethodInvoke, wire::invoke_body(&subscribe)))
            .unwrap();
        session
            .handle_message(b, Envelope::new(Tag::MethodInvoke, wire::invoke_body(&subscribe)))
            .unwrap();
        session.drain_outbox(a);
        session.drain_outbox(b);

        session.disconnect(b);

        let insert = wire::Invoke {
            method_id: builtins.insert,
            context: Scope::Table(table),
            invoke_id: "ins".to_string(),
            args: vec![AnyVar::List(vec![AnyVar::List(vec![AnyVar::Int(1)])])],
        };
        session
            .handle_message(a, Envelope::new(Tag::MethodInvoke, wire::invoke_body(&insert)))
            .unwrap();

        let a_out = session.drain_outbox(a);
        assert!(a_out.iter().any(|e| e.tag == Tag::SignalInvoke));
    }
}
