//! Builds the `AnyVar::Map` body for each create/update/delete message.
//! Per spec.md §4.4: "each create message carries the full initial state;
//! each update carries only changed optional fields; delete carries only
//! id."
use std::collections::BTreeMap;

use noodles_core::id::*;
use noodles_core::AnyVar;

use crate::components::buffer::BufferSource;
use crate::components::entity::EntityRepresentation;
use crate::components::geometry::{Attribute, Index, Patch};
use crate::components::image::ImageSource;
use crate::components::light::LightKind;
use crate::components::plot::PlotContent;
use crate::components::*;

macro_rules! amap {
    ($($k:expr => $v:expr),* $(,)?) => {{
        #[allow(unused_mut)]
        let mut m: BTreeMap<String, AnyVar> = BTreeMap::new();
        $( m.insert($k.to_string(), $v); )*
        AnyVar::Map(m)
    }};
}

fn opt(v: Option<AnyVar>) -> AnyVar {
    v.unwrap_or(AnyVar::Null)
}

pub fn delete_body<K: Kind>(id: Id<K>) -> AnyVar {
    amap! { "id" => AnyVar::Id(id.into()) }
}

pub fn method_create_body(id: Id<MethodTag>, m: &Method) -> AnyVar {
    amap! {
        "id" => AnyVar::Id(id.into()),
        "name" => AnyVar::Text(m.init.name.clone()),
        "doc" => opt(m.init.doc.clone().map(AnyVar::Text)),
        "return_doc" => opt(m.init.return_doc.clone().map(AnyVar::Text)),
        "arg_names" => AnyVar::List(
            m.init.arg_docs.iter().map(|a| AnyVar::Text(a.name.clone())).collect()
        ),
    }
}

pub fn signal_create_body(id: Id<SignalTag>, s: &Signal) -> AnyVar {
    amap! {
        "id" => AnyVar::Id(id.into()),
        "name" => AnyVar::Text(s.name.clone()),
        "doc" => opt(s.doc.clone().map(AnyVar::Text)),
    }
}

pub fn buffer_create_body(id: Id<BufferTag>, b: &Buffer) -> AnyVar {
    let (inline, uri) = match &b.source {
        BufferSource::Inline(bytes) => (Some(AnyVar::Bytes(bytes.clone())), None),
        BufferSource::Uri { uri, .. } => (None, Some(AnyVar::Text(uri.clone()))),
    };
    amap! {
        "id" => AnyVar::Id(id.into()),
        "size" => AnyVar::Int(b.size as i64),
        "inline_bytes" => opt(inline),
        "uri" => opt(uri),
    }
}

pub fn buffer_view_create_body(id: Id<BufferViewTag>, v: &BufferView) -> AnyVar {
    amap! {
        "id" => AnyVar::Id(id.into()),
        "buffer" => AnyVar::Id(v.buffer.into()),
        "offset" => AnyVar::Int(v.offset as i64),
        "length" => AnyVar::Int(v.length as i64),
        "kind" => AnyVar::Text(format!("{:?}", v.kind)),
    }
}

pub fn image_create_body(id: Id<ImageTag>, img: &Image) -> AnyVar {
    let (buffer_view, uri) = match &img.source {
        ImageSource::BufferView(v) => (Some(AnyVar::Id((*v).into())), None),
        ImageSource::Uri(uri) => (None, Some(AnyVar::Text(uri.clone()))),
    };
    amap! {
        "id" => AnyVar::Id(id.into()),
        "buffer_view" => opt(buffer_view),
        "uri" => opt(uri),
    }
}

pub fn sampler_create_body(id: Id<SamplerTag>, s: &Sampler) -> AnyVar {
    amap! {
        "id" => AnyVar::Id(id.into()),
        "min_filter" => AnyVar::Text(format!("{:?}", s.min_filter)),
        "mag_filter" => AnyVar::Text(format!("{:?}", s.mag_filter)),
        "wrap_s" => AnyVar::Text(format!("{:?}", s.wrap_s)),
        "wrap_t" => AnyVar::Text(format!("{:?}", s.wrap_t)),
    }
}

pub fn texture_create_body(id: Id<TextureTag>, t: &Texture) -> AnyVar {
    amap! {
        "id" => AnyVar::Id(id.into()),
        "image" => AnyVar::Id(t.image.into()),
        "sampler" => opt(t.sampler.map(|s| AnyVar::Id(s.into()))),
    }
}

fn texture_ref_to_anyvar(t: &material::TextureRef) -> AnyVar {
    amap! {
        "texture" => AnyVar::Id(t.texture.into()),
        "transform" => AnyVar::PackedF64(t.transform.to_vec()),
        "uv_slot" => AnyVar::Int(t.uv_slot as i64),
    }
}

pub fn material_create_body(id: Id<MaterialTag>, m: &Material) -> AnyVar {
    amap! {
        "id" => AnyVar::Id(id.into()),
        "base_color" => AnyVar::PackedF64(m.base_color.to_vec()),
        "base_color_texture" => opt(m.base_color_texture.as_ref().map(texture_ref_to_anyvar)),
        "metallic" => AnyVar::Real(m.metallic),
        "roughness" => AnyVar::Real(m.roughness),
        "metal_rough_texture" => opt(m.metal_rough_texture.as_ref().map(texture_ref_to_anyvar)),
        "normal_texture" => opt(m.normal_texture.as_ref().map(texture_ref_to_anyvar)),
        "occlusion_texture" => opt(m.occlusion_texture.as_ref().map(texture_ref_to_anyvar)),
        "emissive_factor" => AnyVar::PackedF64(m.emissive_factor.to_vec()),
        "emissive_texture" => opt(m.emissive_texture.as_ref().map(texture_ref_to_anyvar)),
        "alpha_mode" => AnyVar::Text(format!("{:?}", m.alpha_mode)),
        "alpha_cutoff" => AnyVar::Real(m.alpha_cutoff),
        "double_sided" => AnyVar::Bool(m.double_sided),
    }
}

fn attribute_to_anyvar(a: &Attribute) -> AnyVar {
    amap! {
        "semantic" => AnyVar::Text(format!("{:?}", a.semantic)),
        "format" => AnyVar::Text(format!("{:?}", a.format)),
        "view" => AnyVar::Id(a.view.into()),
        "offset" => AnyVar::Int(a.offset as i64),
        "stride" => AnyVar::Int(a.stride as i64),
        "normalize" => AnyVar::Bool(a.normalize),
    }
}

fn index_to_anyvar(i: &Index) -> AnyVar {
    amap! {
        "view" => AnyVar::Id(i.view.into()),
        "count" => AnyVar::Int(i.count as i64),
        "offset" => AnyVar::Int(i.offset as i64),
        "format" => AnyVar::Text(format!("{:?}", i.format)),
    }
}

fn patch_to_anyvar(p: &Patch) -> AnyVar {
    amap! {
        "attributes" => AnyVar::List(p.attributes.iter().map(attribute_to_anyvar).collect()),
        "index" => opt(p.index.as_ref().map(index_to_anyvar)),
        "primitive" => AnyVar::Text(format!("{:?}", p.primitive)),
        "material" => AnyVar::Id(p.material.into()),
    }
}

pub fn geometry_create_body(id: Id<GeometryTag>, g: &Geometry) -> AnyVar {
    amap! {
        "id" => AnyVar::Id(id.into()),
        "patches" => AnyVar::List(g.patches.iter().map(patch_to_anyvar).collect()),
    }
}

pub fn light_create_body(id: Id<LightTag>, l: &Light) -> AnyVar {
    let (kind, range, inner, outer) = match l.kind {
        LightKind::Point { range } => ("point", range, 0.0, 0.0),
        LightKind::Spot { range, inner, outer } => ("spot", range, inner, outer),
        LightKind::Directional { range } => ("directional", range, 0.0, 0.0),
    };
    amap! {
        "id" => AnyVar::Id(id.into()),
        "color" => AnyVar::PackedF64(l.color.to_vec()),
        "intensity" => AnyVar::Real(l.intensity),
        "kind" => AnyVar::Text(kind.to_string()),
        "range" => AnyVar::Real(range),
        "inner_cone" => AnyVar::Real(inner),
        "outer_cone" => AnyVar::Real(outer),
    }
}

pub fn light_update_body(id: Id<LightTag>, l: &Light) -> AnyVar {
    light_create_body(id, l)
}

pub fn entity_create_body(id: Id<EntityTag>, e: &Entity) -> AnyVar {
    let (rep_kind, rep_value) = match &e.representation {
        EntityRepresentation::Null => ("null", AnyVar::Null),
        EntityRepresentation::Text(s) => ("text", AnyVar::Text(s.clone())),
        EntityRepresentation::Web(s) => ("web", AnyVar::Text(s.clone())),
        EntityRepresentation::Render(r) => (
            "render",
            amap! {
                "geometry" => AnyVar::Id(r.geometry.into()),
                "instances" => opt(r.instances.map(|i| amap! {
                    "view" => AnyVar::Id(i.view.into()),
                    "count" => AnyVar::Int(i.count as i64),
                })),
            },
        ),
    };
    amap! {
        "id" => AnyVar::Id(id.into()),
        "parent" => opt(e.parent.map(|p| AnyVar::Id(p.into()))),
        "transform" => AnyVar::PackedF64(e.transform.to_vec()),
        "representation_kind" => AnyVar::Text(rep_kind.to_string()),
        "representation" => rep_value,
        "lights" => AnyVar::List(e.lights.iter().map(|l| AnyVar::Id((*l).into())).collect()),
        "tables" => AnyVar::List(e.tables.iter().map(|t| AnyVar::Id((*t).into())).collect()),
        "plots" => AnyVar::List(e.plots.iter().map(|p| AnyVar::Id((*p).into())).collect()),
        "tags" => AnyVar::List(e.tags.iter().map(|t| AnyVar::Text(t.clone())).collect()),
        "methods" => AnyVar::List(e.methods.iter().map(|m| AnyVar::Id(m.into())).collect()),
        "signals" => AnyVar::List(e.signals.iter().map(|s| AnyVar::Id(s.into())).collect()),
    }
}

pub fn entity_update_body(id: Id<EntityTag>, e: &Entity) -> AnyVar {
    entity_create_body(id, e)
}

pub fn plot_create_body(id: Id<PlotTag>, p: &Plot) -> AnyVar {
    let (content_kind, content_value) = match &p.content {
        PlotContent::SimpleString(s) => ("simple_string", AnyVar::Text(s.clone())),
        PlotContent::Url(u) => ("url", AnyVar::Text(u.clone())),
    };
    amap! {
        "id" => AnyVar::Id(id.into()),
        "table" => opt(p.table.map(|t| AnyVar::Id(t.into()))),
        "content_kind" => AnyVar::Text(content_kind.to_string()),
        "content" => content_value,
        "methods" => AnyVar::List(p.methods.iter().map(|m| AnyVar::Id(m.into())).collect()),
        "signals" => AnyVar::List(p.signals.iter().map(|s| AnyVar::Id(s.into())).collect()),
    }
}

pub fn plot_update_body(id: Id<PlotTag>, p: &Plot) -> AnyVar {
    plot_create_body(id, p)
}

pub fn table_create_body(id: Id<TableTag>, t: &Table) -> AnyVar {
    amap! {
        "id" => AnyVar::Id(id.into()),
        "metadata" => opt(t.metadata.clone().map(AnyVar::Text)),
        "methods" => AnyVar::List(t.methods.iter().map(|m| AnyVar::Id(m.into())).collect()),
        "signals" => AnyVar::List(t.signals.iter().map(|s| AnyVar::Id(s.into())).collect()),
    }
}

pub fn table_update_body(id: Id<TableTag>, t: &Table) -> AnyVar {
    table_create_body(id, t)
}

pub fn document_update_body(methods: &[Id<MethodTag>], signals: &[Id<SignalTag>]) -> AnyVar {
    amap! {
        "methods" => AnyVar::List(methods.iter().map(|m| AnyVar::Id((*m).into())).collect()),
        "signals" => AnyVar::List(signals.iter().map(|s| AnyVar::Id((*s).into())).collect()),
    }
}
