//! Shared data types for method dispatch (spec.md §4.7). The actual routing
//! (resolve method id, check attachment, call handler, emit the reply) is
//! `noodles_session`'s job; these types live here because
//! [`crate::components::method::Method`] needs to name a handler function
//! signature, and that signature needs to reference the registry.
use noodles_core::id::{EntityTag, Id, PlotTag, SignalTag, TableTag};
use noodles_core::AnyVar;

use crate::Registry;

/// Exactly one of {document, entity, table, plot}, per spec.md invariant 7.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Document,
    Entity(Id<EntityTag>),
    Table(Id<TableTag>),
    Plot(Id<PlotTag>),
}

/// A signal fire requested by a handler while it ran, queued rather than
/// delivered immediately: only the session layer (`noodles_session`) knows
/// which clients are subscribed to the firing scope.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingSignal {
    pub signal: Id<SignalTag>,
    pub scope: Scope,
    pub args: Vec<AnyVar>,
}

/// What a handler receives: which scope it was invoked against, a
/// read/write handle on the registry so built-ins (and application
/// handlers) can resolve related components, and a place to queue signal
/// fires triggered by its own mutation (spec.md §4.9's `fires tbl_updated`
/// etc.).
pub struct DispatchContext<'a> {
    pub scope: Scope,
    pub registry: &'a mut Registry,
    pub signals: &'a mut Vec<PendingSignal>,
}

impl<'a> DispatchContext<'a> {
    /// Queue a signal fire against this invocation's own scope.
    pub fn fire(&mut self, signal: Id<SignalTag>, args: Vec<AnyVar>) {
        self.signals.push(PendingSignal {
            signal,
            scope: self.scope,
            args,
        });
    }
}

/// Standard JSON-RPC 2.0 codes, spec.md §4.7/§7.
pub mod error_code {
    pub const INVALID_REQUEST: i64 = -32600;
    pub const METHOD_NOT_FOUND: i64 = -32601;
    pub const INVALID_PARAMS: i64 = -32602;
    pub const INTERNAL_ERROR: i64 = -32603;
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodException {
    pub code: i64,
    pub message: Option<String>,
    pub data: Option<AnyVar>,
}

impl MethodException {
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: Some(message.into()),
            data: None,
        }
    }

    pub fn with_data(mut self, data: AnyVar) -> Self {
        self.data = Some(data);
        self
    }

    pub fn method_not_found(id: impl std::fmt::Debug) -> Self {
        Self::new(
            error_code::METHOD_NOT_FOUND,
            format!("method {id:?} not found"),
        )
    }

    pub fn method_not_attached(id: impl std::fmt::Debug) -> Self {
        Self::new(
            error_code::INVALID_REQUEST,
            format!("method {id:?} is not attached to the invocation context"),
        )
    }

    pub fn invalid_params(index: usize, reason: impl std::fmt::Display) -> Self {
        Self::new(
            error_code::INVALID_PARAMS,
            format!("argument {index}: {reason}"),
        )
    }

    pub fn internal(reason: impl std::fmt::Display) -> Self {
        Self::new(error_code::INTERNAL_ERROR, reason.to_string())
    }
}

pub type MethodResult = Result<AnyVar, MethodException>;
