//! Built-in entity methods, spec.md §4.9/§6: `activate`, `get_var_*`,
//! `set_var_value`, `set_position`/`set_rotation`/`set_scale`, `select_*`,
//! `probe_at`. Each delegates to an application-provided [`EntityCallbacks`]
//! impl; a method with no override for its callback returns `InternalError`,
//! per spec.md's explicit "unimplemented methods return InternalError".
use std::sync::Arc;

use noodles_core::error::RefError;
use noodles_core::id::EntityTag;
use noodles_core::{AnyVar, Id};
use noodles_registry::components::method::{ArgDoc, Method, MethodInit};
use noodles_registry::components::table::SelectAction;
use noodles_registry::dispatch_ctx::{DispatchContext, MethodException, MethodResult, Scope};
use noodles_registry::writer::MessageSink;
use noodles_registry::Registry;

/// Application hook for one entity's built-in methods (spec.md §6). Default
/// impls all return `InternalError`, so an application only has to
/// implement the subset of methods it actually supports.
pub trait EntityCallbacks: Send + Sync {
    fn activate(&self, _choice: AnyVar) -> MethodResult {
        Err(MethodException::internal("activate not implemented"))
    }
    fn get_activation_choices(&self) -> MethodResult {
        Err(MethodException::internal("get_activation_choices not implemented"))
    }
    fn get_var_keys(&self) -> MethodResult {
        Err(MethodException::internal("get_var_keys not implemented"))
    }
    fn get_var_options(&self, _key: &AnyVar) -> MethodResult {
        Err(MethodException::internal("get_var_options not implemented"))
    }
    fn get_var_value(&self, _key: &AnyVar) -> MethodResult {
        Err(MethodException::internal("get_var_value not implemented"))
    }
    fn set_var_value(&self, _value: &AnyVar, _key: &AnyVar) -> MethodResult {
        Err(MethodException::internal("set_var_value not implemented"))
    }
    fn set_position(&self, _pos: [f64; 3]) -> MethodResult {
        Err(MethodException::internal("set_position not implemented"))
    }
    fn set_rotation(&self, _quat: [f64; 4]) -> MethodResult {
        Err(MethodException::internal("set_rotation not implemented"))
    }
    fn set_scale(&self, _scale: [f64; 3]) -> MethodResult {
        Err(MethodException::internal("set_scale not implemented"))
    }
    fn select_region(&self, _min: [f64; 3], _max: [f64; 3], _action: SelectAction) -> MethodResult {
        Err(MethodException::internal("select_region not implemented"))
    }
    fn select_sphere(&self, _center: [f64; 3], _radius: f64, _action: SelectAction) -> MethodResult {
        Err(MethodException::internal("select_sphere not implemented"))
    }
    fn select_half_plane(&self, _point: [f64; 3], _normal: [f64; 3], _action: SelectAction) -> MethodResult {
        Err(MethodException::internal("select_half_plane not implemented"))
    }
    fn select_hull(&self, _points: Vec<[f64; 3]>, _triangles: Vec<i64>, _action: SelectAction) -> MethodResult {
        Err(MethodException::internal("select_hull not implemented"))
    }
    fn probe_at(&self, _point: [f64; 3]) -> MethodResult {
        Err(MethodException::internal("probe_at not implemented"))
    }
}

fn parse_action(v: &AnyVar) -> Result<SelectAction, MethodException> {
    let i = v.as_i64().ok_or_else(|| MethodException::invalid_params(0, "action is not an int"))?;
    SelectAction::try_from(i).map_err(|_| MethodException::invalid_params(0, format!("action {i} is not one of -1,0,1")))
}

fn vec3(v: &AnyVar) -> Result<[f64; 3], MethodException> {
    v.as_vec_n::<3>().map_err(|e| MethodException::invalid_params(0, e))
}

fn vec4(v: &AnyVar) -> Result<[f64; 4], MethodException> {
    v.as_vec_n::<4>().map_err(|e| MethodException::invalid_params(0, e))
}

fn points3(v: &AnyVar) -> Result<Vec<[f64; 3]>, MethodException> {
    let flat = v.coerce_f64_list().map_err(|e| MethodException::invalid_params(0, e))?;
    if flat.len() % 3 != 0 {
        return Err(MethodException::invalid_params(0, "points list length is not a multiple of 3"));
    }
    Ok(flat.chunks_exact(3).map(|c| [c[0], c[1], c[2]]).collect())
}

type Handler = Arc<dyn Fn(DispatchContext<'_>, &[AnyVar]) -> MethodResult + Send + Sync>;

fn arg0(args: &[AnyVar]) -> Result<&AnyVar, MethodException> {
    args.first().ok_or_else(|| MethodException::invalid_params(0, "missing argument"))
}
fn arg1(args: &[AnyVar]) -> Result<&AnyVar, MethodException> {
    args.get(1).ok_or_else(|| MethodException::invalid_params(1, "missing argument"))
}

fn handler_activate(callbacks: Arc<dyn EntityCallbacks>) -> Handler {
    Arc::new(move |_ctx, args| callbacks.activate(arg0(args)?.clone()))
}
fn handler_get_activation_choices(callbacks: Arc<dyn EntityCallbacks>) -> Handler {
    Arc::new(move |_ctx, _args| callbacks.get_activation_choices())
}
fn handler_get_var_keys(callbacks: Arc<dyn EntityCallbacks>) -> Handler {
    Arc::new(move |_ctx, _args| callbacks.get_var_keys())
}
fn handler_get_var_options(callbacks: Arc<dyn EntityCallbacks>) -> Handler {
    Arc::new(move |_ctx, args| callbacks.get_var_options(arg0(args)?))
}
fn handler_get_var_value(callbacks: Arc<dyn EntityCallbacks>) -> Handler {
    Arc::new(move |_ctx, args| callbacks.get_var_value(arg0(args)?))
}
fn handler_set_var_value(callbacks: Arc<dyn EntityCallbacks>) -> Handler {
    Arc::new(move |_ctx, args| callbacks.set_var_value(arg0(args)?, arg1(args)?))
}
fn handler_set_position(callbacks: Arc<dyn EntityCallbacks>) -> Handler {
    Arc::new(move |_ctx, args| callbacks.set_position(vec3(arg0(args)?)?))
}
fn handler_set_rotation(callbacks: Arc<dyn EntityCallbacks>) -> Handler {
    Arc::new(move |_ctx, args| callbacks.set_rotation(vec4(arg0(args)?)?))
}
fn handler_set_scale(callbacks: Arc<dyn EntityCallbacks>) -> Handler {
    Arc::new(move |_ctx, args| callbacks.set_scale(vec3(arg0(args)?)?))
}
fn handler_select_region(callbacks: Arc<dyn EntityCallbacks>) -> Handler {
    Arc::new(move |_ctx, args| {
        let min = vec3(arg0(args)?)?;
        let max = vec3(arg1(args)?)?;
        let action = parse_action(args.get(2).ok_or_else(|| MethodException::invalid_params(2, "missing action"))?)?;
        callbacks.select_region(min, max, action)
    })
}
fn handler_select_sphere(callbacks: Arc<dyn EntityCallbacks>) -> Handler {
    Arc::new(move |_ctx, args| {
        let center = vec3(arg0(args)?)?;
        let radius = arg1(args)?.as_f64().ok_or_else(|| MethodException::invalid_params(1, "radius is not numeric"))?;
        let action = parse_action(args.get(2).ok_or_else(|| MethodException::invalid_params(2, "missing action"))?)?;
        callbacks.select_sphere(center, radius, action)
    })
}
fn handler_select_half_plane(callbacks: Arc<dyn EntityCallbacks>) -> Handler {
    Arc::new(move |_ctx, args| {
        let point = vec3(arg0(args)?)?;
        let normal = vec3(arg1(args)?)?;
        let action = parse_action(args.get(2).ok_or_else(|| MethodException::invalid_params(2, "missing action"))?)?;
        callbacks.select_half_plane(point, normal, action)
    })
}
fn handler_select_hull(callbacks: Arc<dyn EntityCallbacks>) -> Handler {
    Arc::new(move |_ctx, args| {
        let points = points3(arg0(args)?)?;
        let triangles = arg1(args)?.coerce_i64_list().map_err(|e| MethodException::invalid_params(1, e))?;
        let action = parse_action(args.get(2).ok_or_else(|| MethodException::invalid_params(2, "missing action"))?)?;
        callbacks.select_hull(points, triangles, action)
    })
}
fn handler_probe_at(callbacks: Arc<dyn EntityCallbacks>) -> Handler {
    Arc::new(move |_ctx, args| callbacks.probe_at(vec3(arg0(args)?)?))
}

fn method(name: &str, arg_docs: Vec<ArgDoc>, handler: Handler) -> Method {
    Method::with_handler(
        MethodInit {
            name: name.to_string(),
            doc: None,
            return_doc: None,
            arg_docs,
        },
        handler,
    )
}

fn arg(name: &str) -> ArgDoc {
    ArgDoc { name: name.to_string(), doc: None }
}

/// Create and attach the built-in entity methods to `entity`, each calling
/// back into `callbacks`.
pub fn install_entity_builtins(
    registry: &mut Registry,
    entity: Id<EntityTag>,
    callbacks: Arc<dyn EntityCallbacks>,
    sink: &mut impl MessageSink,
) -> Result<(), RefError> {
    let defs: Vec<(&str, Vec<ArgDoc>, Handler)> = vec![
        ("activate", vec![arg("choice")], handler_activate(callbacks.clone())),
        ("get_activation_choices", vec![], handler_get_activation_choices(callbacks.clone())),
        ("get_var_keys", vec![], handler_get_var_keys(callbacks.clone())),
        ("get_var_options", vec![arg("key")], handler_get_var_options(callbacks.clone())),
        ("get_var_value", vec![arg("key")], handler_get_var_value(callbacks.clone())),
        ("set_var_value", vec![arg("value"), arg("key")], handler_set_var_value(callbacks.clone())),
        ("set_position", vec![arg("position")], handler_set_position(callbacks.clone())),
        ("set_rotation", vec![arg("rotation")], handler_set_rotation(callbacks.clone())),
        ("set_scale", vec![arg("scale")], handler_set_scale(callbacks.clone())),
        (
            "select_region",
            vec![arg("min"), arg("max"), arg("action")],
            handler_select_region(callbacks.clone()),
        ),
        (
            "select_sphere",
            vec![arg("center"), arg("radius"), arg("action")],
            handler_select_sphere(callbacks.clone()),
        ),
        (
            "select_half_plane",
            vec![arg("point"), arg("normal"), arg("action")],
            handler_select_half_plane(callbacks.clone()),
        ),
        (
            "select_hull",
            vec![arg("points"), arg("triangles"), arg("action")],
            handler_select_hull(callbacks.clone()),
        ),
        ("probe_at", vec![arg("point")], handler_probe_at(callbacks.clone())),
    ];

    for (name, arg_docs, handler) in defs {
        let method_id = registry.create_method(method(name, arg_docs, handler), sink);
        registry.entity_attach_method(entity, method_id, sink)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use noodles_registry::components::entity::Entity;
    use noodles_registry::NullSink;

    struct Probe;
    impl EntityCallbacks for Probe {
        fn probe_at(&self, point: [f64; 3]) -> MethodResult {
            Ok(AnyVar::List(vec![AnyVar::Text("hit".to_string()), AnyVar::Real(point[0])]))
        }
    }

    #[test]
    fn probe_at_delegates_to_callbacks() {
        let mut registry = Registry::new();
        let mut sink = NullSink;
        let entity = registry.create_entity(Entity::default(), &mut sink).unwrap();
        install_entity_builtins(&mut registry, entity, Arc::new(Probe), &mut sink).unwrap();

        let probe_id = registry
            .entities
            .get(entity)
            .unwrap()
            .methods
            .iter()
            .find(|&m| registry.methods.get(m).unwrap().init.name == "probe_at")
            .unwrap();
        let handler = registry.methods.get(probe_id).unwrap().handler.clone().unwrap();
        let mut signals = Vec::new();
        let ctx = DispatchContext {
            scope: Scope::Entity(entity),
            registry: &mut registry,
            signals: &mut signals,
        };
        let result = handler(ctx, &[AnyVar::PackedF64(vec![1.0, 2.0, 3.0])]).unwrap();
        assert_eq!(result, AnyVar::List(vec![AnyVar::Text("hit".to_string()), AnyVar::Real(1.0)]));
    }

    #[test]
    fn unimplemented_callback_returns_internal_error() {
        let mut registry = Registry::new();
        let mut sink = NullSink;
        let entity = registry.create_entity(Entity::default(), &mut sink).unwrap();
        install_entity_builtins(&mut registry, entity, Arc::new(Probe), &mut sink).unwrap();

        let set_pos_id = registry
            .entities
            .get(entity)
            .unwrap()
            .methods
            .iter()
            .find(|&m| registry.methods.get(m).unwrap().init.name == "set_position")
            .unwrap();
        let handler = registry.methods.get(set_pos_id).unwrap().handler.clone().unwrap();
        let mut signals = Vec::new();
        let ctx = DispatchContext {
            scope: Scope::Entity(entity),
            registry: &mut registry,
            signals: &mut signals,
        };
        let err = handler(ctx, &[AnyVar::PackedF64(vec![0.0, 0.0, 0.0])]).unwrap_err();
        assert_eq!(err.code, noodles_registry::dispatch_ctx::error_code::INTERNAL_ERROR);
    }
}
