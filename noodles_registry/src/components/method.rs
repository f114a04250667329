//! `Method`: a remotely-invocable operation, described for clients and
//! (server-side only) bound to a handler. Spec.md §3, §4.7.
use noodles_core::AnyVar;

/// A documented argument slot; `doc` is shown to users, `editor_hint` lets
/// a generic client build an input widget without hardcoding per-method
/// UI (grounded in the original's `noo_interface_types` arg metadata).
#[derive(Debug, Clone, PartialEq)]
pub struct ArgDoc {
    pub name: String,
    pub doc: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodInit {
    pub name: String,
    pub doc: Option<String>,
    pub return_doc: Option<String>,
    pub arg_docs: Vec<ArgDoc>,
}

/// `(ctx, args) -> Result<AnyVar, MethodException>`, spec.md §9 "Handler
/// dispatch". Only present on the server; clients only ever see
/// [`MethodInit`] metadata.
pub type HandlerFn = std::sync::Arc<
    dyn Fn(crate::dispatch_ctx::DispatchContext<'_>, &[AnyVar]) -> crate::dispatch_ctx::MethodResult
        + Send
        + Sync,
>;

#[derive(Clone)]
pub struct Method {
    pub init: MethodInit,
    pub handler: Option<HandlerFn>,
}

impl std::fmt::Debug for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Method")
            .field("init", &self.init)
            .field("handler", &self.handler.is_some())
            .finish()
    }
}

impl Method {
    pub fn new(init: MethodInit) -> Self {
        Self { init, handler: None }
    }

    pub fn with_handler(init: MethodInit, handler: HandlerFn) -> Self {
        Self {
            init,
            handler: Some(handler),
        }
    }
}
