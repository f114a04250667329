//! End-to-end scenarios from spec.md §8 (E3-E6). E1/E2 are core-registry
//! properties already covered by `noodles_core`/`noodles_registry` unit
//! tests (AnyVar round-trip, arena slot reuse).
use std::sync::Arc;
use std::time::{Duration, Instant};

use noodles_core::error::RefError;
use noodles_core::AnyVar;
use noodles_registry::components::buffer::Buffer;
use noodles_registry::components::buffer_view::{BufferView, ViewKind};
use noodles_registry::components::entity::{Entity, EntityRepresentation, RenderRep};
use noodles_registry::components::geometry::{Attribute, AttributeFormat, AttributeSemantic, Geometry, Patch, PrimitiveType};
use noodles_registry::components::material::Material;
use noodles_registry::components::method::{Method, MethodInit};
use noodles_registry::dispatch_ctx::Scope;
use noodles_session::{ServerSession, SessionOptions};
use noodles_session::wire;
use noodles_serde::{Envelope, MessageTag};

fn introduce(session: &mut ServerSession, client: noodles_session::ClientId, name: &str) {
    session
        .handle_message(client, Envelope::new(MessageTag::Introduction, wire::introduction_body(name)))
        .unwrap();
}

/// E3 - Catch-up order: Buffer -> BufferView -> Geometry -> Entity must
/// arrive to a freshly-introduced client in that relative order.
#[test]
fn catch_up_delivers_dependencies_before_dependents() {
    let mut session = ServerSession::new(SessionOptions::default());
    session
        .mutate(|registry, sink| {
            let buffer = registry.create_buffer(Buffer::inline(vec![0u8; 12]), sink);
            let view = registry.create_buffer_view(
                BufferView {
                    buffer,
                    offset: 0,
                    length: 12,
                    kind: ViewKind::Geometry,
                },
                sink,
            )?;
            let material = registry.create_material(Material::default(), sink)?;
            let geometry = registry.create_geometry(
                Geometry {
                    patches: vec![Patch {
                        attributes: vec![Attribute {
                            semantic: AttributeSemantic::Position,
                            format: AttributeFormat::F32Vec3,
                            view,
                            offset: 0,
                            stride: 12,
                            normalize: false,
                        }],
                        index: None,
                        primitive: PrimitiveType::Triangles,
                        material,
                    }],
                },
                sink,
            )?;
            registry.create_entity(
                Entity {
                    representation: EntityRepresentation::Render(RenderRep { geometry, instances: None }),
                    ..Entity::default()
                },
                sink,
            )?;
            Ok::<_, RefError>(())
        })
        .unwrap();

    let client = session.connect(Instant::now());
    introduce(&mut session, client, "viewer");
    let outbox = session.drain_outbox(client);

    let pos = |tag: MessageTag| outbox.iter().position(|e| e.tag == tag).expect("tag present in catch-up");
    let buffer_pos = pos(MessageTag::BufferCreate);
    let view_pos = pos(MessageTag::BufferViewCreate);
    let geometry_pos = pos(MessageTag::GeometryCreate);
    let entity_pos = pos(MessageTag::EntityCreate);

    assert!(buffer_pos < view_pos);
    assert!(view_pos < geometry_pos);
    assert!(geometry_pos < entity_pos);
}

/// E4 - a method reply only ever reaches the client that invoked it.
#[test]
fn method_reply_is_scoped_to_the_invoking_client() {
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
        .handle_message(a, Envelope::new(MessageTag::MethodInvoke, wire::invoke_body(&invoke)))
        .unwrap();

    let a_out = session.drain_outbox(a);
    assert_eq!(a_out.len(), 1);
    assert_eq!(a_out[0].tag, MessageTag::MethodReply);
    let reply = wire::reply_body("1", Ok(AnyVar::Text("hi".to_string())));
    assert_eq!(a_out[0].body, reply);
    assert!(session.drain_outbox(b).is_empty());
}

/// E6 - a client that never introduces is dropped after the handshake
/// deadline, and nothing is ever sent to it.
#[test]
fn handshake_timeout_drops_a_silent_client() {
    let mut session = ServerSession::new(SessionOptions {
        handshake_timeout_secs: 30,
    });
    let start = Instant::now();
    let client = session.connect(start);
    assert!(session.poll_timeouts(start + Duration::from_secs(29)).is_empty());

    let dropped = session.poll_timeouts(start + Duration::from_secs(31));
    assert_eq!(dropped, vec![client]);
    assert!(session.drain_outbox(client).is_empty());
}
