//! The method dispatcher, spec.md §4.7: resolve `method_id`, check the
//! invocation context has it attached, call the handler, and produce the
//! reply outcome. Standard JSON-RPC 2.0 codes.
use noodles_core::AnyId;
use noodles_registry::dispatch_ctx::{error_code, DispatchContext, MethodException, PendingSignal, Scope};
use noodles_registry::Registry;

use crate::wire::Invoke;

fn scope_attached(registry: &Registry, scope: Scope, method: noodles_core::id::Id<noodles_core::id::MethodTag>) -> Option<bool> {
    match scope {
        Scope::Document => Some(registry.document.methods.contains(method)),
        Scope::Entity(id) => registry.entities.get(id).map(|e| e.methods.contains(method)),
        Scope::Table(id) => registry.tables.get(id).map(|t| t.methods.contains(method)),
        Scope::Plot(id) => registry.plots.get(id).map(|p| p.methods.contains(method)),
    }
}

/// Run one invocation to completion. Returns the outcome to reply with plus
/// any signals the handler fired along the way (spec.md §4.9's
/// `fires tbl_updated` etc.) -- the caller decides how to fan those out.
/// Per spec.md §4.7 this never fails the *session*: every error path here
/// becomes a `MethodException`, not a dropped connection.
pub fn dispatch(
    registry: &mut Registry,
    invoke: &Invoke,
) -> (Result<noodles_core::AnyVar, MethodException>, Vec<PendingSignal>) {
    let mut signals = Vec::new();

    let method = match registry.methods.get(invoke.method_id) {
        Some(m) => m,
        None => {
            return (
                Err(MethodException::method_not_found(AnyId::from(invoke.method_id))),
                signals,
            )
        }
    };
    let handler = match method.handler.clone() {
        Some(h) => h,
        None => {
            return (
                Err(MethodException::new(error_code::INTERNAL_ERROR, "method has no server-side handler")),
                signals,
            )
        }
    };

    match scope_attached(registry, invoke.context, invoke.method_id) {
        Some(true) => {}
        Some(false) => {
            return (
                Err(MethodException::method_not_attached(AnyId::from(invoke.method_id))),
                signals,
            )
        }
        None => {
            return (
                Err(MethodException::new(error_code::INVALID_REQUEST, "invocation context does not resolve")),
                signals,
            )
        }
    }

    let ctx = DispatchContext {
        scope: invoke.context,
        registry,
        signals: &mut signals,
    };
    let result = handler(ctx, &invoke.args);
    (result, signals)
}

#[cfg(test)]
mod tests {
    use super::*;
    use noodles_registry::components::method::{Method, MethodInit};
    use noodles_registry::dispatch_ctx::MethodResult;
    use noodles_registry::NullSink;
    use noodles_core::AnyVar;
    use std::sync::Arc;

    fn echo_handler() -> Arc<dyn Fn(DispatchContext<'_>, &[AnyVar]) -> MethodResult + Send + Sync> {
        Arc::new(|_ctx, args| Ok(args.first().cloned().unwrap_or(AnyVar::Null)))
    }

    #[test]
    fn dispatch_calls_handler_when_attached_to_document() {
        let mut registry = Registry::new();
        let mut sink = NullSink;
        let method_id = registry.create_method(
            Method::with_handler(
                MethodInit {
                    name: "echo".to_string(),
                    doc: None,
                    return_doc: None,
                    arg_docs: vec![],
                },
                echo_handler(),
            ),
            &mut sink,
        );
        registry.document_attach_method(method_id, &mut sink).unwrap();

        let invoke = Invoke {
            method_id,
            context: Scope::Document,
            invoke_id: "1".to_string(),
            args: vec![AnyVar::Text("hi".to_string())],
        };
        let (result, signals) = dispatch(&mut registry, &invoke);
        assert_eq!(result.unwrap(), AnyVar::Text("hi".to_string()));
        assert!(signals.is_empty());
    }

    #[test]
    fn dispatch_rejects_unattached_method() {
        let mut registry = Registry::new();
        let mut sink = NullSink;
        let method_id = registry.create_method(
            Method::with_handler(
                MethodInit {
                    name: "echo".to_string(),
                    doc: None,
                    return_doc: None,
                    arg_docs: vec![],
                },
                echo_handler(),
            ),
            &mut sink,
        );
        let invoke = Invoke {
            method_id,
            context: Scope::Document,
            invoke_id: "1".to_string(),
            args: vec![],
        };
        let (result, _signals) = dispatch(&mut registry, &invoke);
        assert_eq!(result.unwrap_err().code, error_code::INVALID_REQUEST);
    }
}
