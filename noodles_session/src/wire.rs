//! Message bodies exchanged by the session layer itself (spec.md §4.5-§4.8):
//! `Introduction`, `MethodInvoke`, `MethodReply`, `SignalInvoke`. Distinct
//! from `noodles_registry::wire`, which only builds component create/update
//! bodies.
use std::collections::BTreeMap;

use noodles_core::id::*;
use noodles_core::{AnyId, AnyVar};
use noodles_registry::dispatch_ctx::{MethodException, Scope};

use crate::error::ProtocolError;

fn field<'a>(map: &'a BTreeMap<String, AnyVar>, what: &'static str, key: &str) -> Result<&'a AnyVar, ProtocolError> {
    map.get(key).ok_or_else(|| ProtocolError::MalformedBody {
        what,
        reason: format!("missing field `{key}`"),
    })
}

fn as_map<'a>(body: &'a AnyVar, what: &'static str) -> Result<&'a BTreeMap<String, AnyVar>, ProtocolError> {
    match body {
        AnyVar::Map(m) => Ok(m),
        _ => Err(ProtocolError::MalformedBody {
            what,
            reason: "body is not a map".to_string(),
        }),
    }
}

fn as_text<'a>(v: &'a AnyVar, what: &'static str, key: &str) -> Result<&'a str, ProtocolError> {
    v.as_str().ok_or_else(|| ProtocolError::MalformedBody {
        what,
        reason: format!("field `{key}` is not text"),
    })
}

// ---- Introduction (client -> server) --------------------------------------

pub fn introduction_body(client_name: &str) -> AnyVar {
    let mut m = BTreeMap::new();
    m.insert("client_name".to_string(), AnyVar::Text(client_name.to_string()));
    AnyVar::Map(m)
}

pub fn parse_introduction(body: &AnyVar) -> Result<String, ProtocolError> {
    let map = as_map(body, "Introduction")?;
    let name = as_text(field(map, "Introduction", "client_name")?, "Introduction", "client_name")?;
    Ok(name.to_string())
}

// ---- Scope (shared encoding for invoke context / signal scope) -----------

fn scope_to_anyvar(scope: Scope) -> AnyVar {
    let (kind, id) = match scope {
        Scope::Document => ("document", AnyVar::Null),
        Scope::Entity(id) => ("entity", AnyVar::Id(id.into())),
        Scope::Table(id) => ("table", AnyVar::Id(id.into())),
        Scope::Plot(id) => ("plot", AnyVar::Id(id.into())),
    };
    let mut m = BTreeMap::new();
    m.insert("kind".to_string(), AnyVar::Text(kind.to_string()));
    m.insert("id".to_string(), id);
    AnyVar::Map(m)
}

fn scope_from_anyvar(v: &AnyVar, what: &'static str) -> Result<Scope, ProtocolError> {
    let map = as_map(v, what)?;
    let kind = as_text(field(map, what, "kind")?, what, "kind")?;
    match kind {
        "document" => Ok(Scope::Document),
        "entity" => Ok(Scope::Entity(id_field::<EntityTag>(map, what, "id")?)),
        "table" => Ok(Scope::Table(id_field::<TableTag>(map, what, "id")?)),
        "plot" => Ok(Scope::Plot(id_field::<PlotTag>(map, what, "id")?)),
        other => Err(ProtocolError::MalformedBody {
            what,
            reason: format!("unknown scope kind `{other}`"),
        }),
    }
}

fn id_field<K: Kind>(map: &BTreeMap<String, AnyVar>, what: &'static str, key: &str) -> Result<Id<K>, ProtocolError> {
    field(map, what, key)?.as_id::<K>().ok_or_else(|| ProtocolError::MalformedBody {
        what,
        reason: format!("field `{key}` is not an id of kind `{}`", K::LABEL),
    })
}

// ---- MethodInvoke (client -> server) --------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Invoke {
    pub method_id: Id<MethodTag>,
    pub context: Scope,
    pub invoke_id: String,
    pub args: Vec<AnyVar>,
}

pub fn invoke_body(invoke: &Invoke) -> AnyVar {
    let mut m = BTreeMap::new();
    m.insert("method".to_string(), AnyVar::Id(invoke.method_id.into()));
    m.insert("context".to_string(), scope_to_anyvar(invoke.context));
    m.insert("invoke_id".to_string(), AnyVar::Text(invoke.invoke_id.clone()));
    m.insert("args".to_string(), AnyVar::List(invoke.args.clone()));
    AnyVar::Map(m)
}

pub fn parse_invoke(body: &AnyVar) -> Result<Invoke, ProtocolError> {
    let map = as_map(body, "MethodInvoke")?;
    let method_id = id_field::<MethodTag>(map, "MethodInvoke", "method")?;
    let context = scope_from_anyvar(field(map, "MethodInvoke", "context")?, "MethodInvoke.context")?;
    let invoke_id = as_text(field(map, "MethodInvoke", "invoke_id")?, "MethodInvoke", "invoke_id")?.to_string();
    let args = match field(map, "MethodInvoke", "args")? {
        AnyVar::List(items) => items.clone(),
        AnyVar::Null => Vec::new(),
        _ => {
            return Err(ProtocolError::MalformedBody {
                what: "MethodInvoke",
                reason: "field `args` is not a list".to_string(),
            })
        }
    };
    Ok(Invoke {
        method_id,
        context,
        invoke_id,
        args,
    })
}

// ---- MethodReply (server -> client) ---------------------------------------

pub fn method_exception_to_anyvar(exc: &MethodException) -> AnyVar {
    let mut m = BTreeMap::new();
    m.insert("code".to_string(), AnyVar::Int(exc.code));
    m.insert(
        "message".to_string(),
        exc.message.clone().map(AnyVar::Text).unwrap_or(AnyVar::Null),
    );
    m.insert("data".to_string(), exc.data.clone().unwrap_or(AnyVar::Null));
    AnyVar::Map(m)
}

pub fn reply_body(invoke_id: &str, outcome: Result<AnyVar, MethodException>) -> AnyVar {
    let mut m = BTreeMap::new();
    m.insert("invoke_id".to_string(), AnyVar::Text(invoke_id.to_string()));
    match outcome {
        Ok(result) => {
            m.insert("result".to_string(), result);
            m.insert("exception".to_string(), AnyVar::Null);
        }
        Err(exc) => {
            m.insert("result".to_string(), AnyVar::Null);
            m.insert("exception".to_string(), method_exception_to_anyvar(&exc));
        }
    }
    AnyVar::Map(m)
}

// ---- SignalInvoke (server -> client) ---------------------------------------

pub fn signal_invoke_body(signal: Id<SignalTag>, scope: Option<AnyId>, args: &[AnyVar]) -> AnyVar {
    let mut m = BTreeMap::new();
    m.insert("signal".to_string(), AnyVar::Id(signal.into()));
    m.insert("scope".to_string(), scope.map(AnyVar::Id).unwrap_or(AnyVar::Null));
    m.insert("args".to_string(), AnyVar::List(args.to_vec()));
    AnyVar::Map(m)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invoke_round_trips_through_its_own_wire_body() {
        let invoke = Invoke {
            method_id: Id::new(1, 0),
            context: Scope::Entity(Id::new(2, 0)),
            invoke_id: "abc".to_string(),
            args: vec![AnyVar::Int(7), AnyVar::Text("hi".to_string())],
        };
        let decoded = parse_invoke(&invoke_body(&invoke)).unwrap();
        assert_eq!(decoded, invoke);
    }

    #[test]
    fn introduction_round_trips() {
        let body = introduction_body("viewer-1");
        assert_eq!(parse_introduction(&body).unwrap(), "viewer-1");
    }
}
