//! The component registry: one arena per kind, plus the referential checks
//! and message emission described in spec.md §4.3.
use tracing::{debug, warn};

use noodles_core::error::RefError;
use noodles_core::id::*;
use noodles_serde::MessageTag;

use crate::arena::Arena;
use crate::components::entity::EntityRepresentation;
use crate::components::*;
use crate::document::Document;
use crate::error::MutationError;
use crate::writer::MessageSink;
use crate::wire;

fn ref_ok<K: Kind, T>(arena: &Arena<T, K>, id: Id<K>, field: &'static str) -> Result<(), RefError> {
    if arena.contains(id) {
        Ok(())
    } else {
        Err(RefError::new(field, K::LABEL, id.slot, id.gen))
    }
}

fn ref_ok_opt<K: Kind, T>(
    arena: &Arena<T, K>,
    id: Option<Id<K>>,
    field: &'static str,
) -> Result<(), RefError> {
    match id {
        Some(id) => ref_ok(arena, id, field),
        None => Ok(()),
    }
}

#[derive(Default)]
pub struct Registry {
    pub methods: Arena<Method, MethodTag>,
    pub signals: Arena<Signal, SignalTag>,
    pub buffers: Arena<Buffer, BufferTag>,
    pub buffer_views: Arena<BufferView, BufferViewTag>,
    pub images: Arena<Image, ImageTag>,
    pub samplers: Arena<Sampler, SamplerTag>,
    pub textures: Arena<Texture, TextureTag>,
    pub materials: Arena<Material, MaterialTag>,
    pub geometries: Arena<Geometry, GeometryTag>,
    pub lights: Arena<Light, LightTag>,
    pub entities: Arena<Entity, EntityTag>,
    pub plots: Arena<Plot, PlotTag>,
    pub tables: Arena<Table, TableTag>,
    pub document: Document,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: crate::config::RegistryOptions) -> Self {
        let mut registry = Self::default();
        registry.entities.reserve(options.entity_capacity_hint);
        registry.tables.reserve(options.table_capacity_hint);
        registry
    }

    // ---- Method / Signal -------------------------------------------------

    pub fn create_method(&mut self, method: Method, sink: &mut impl MessageSink) -> Id<MethodTag> {
        let id = self.methods.create(method);
        let body = wire::method_create_body(id, self.methods.get(id).unwrap());
        sink.push(MessageTag::MethodCreate, body);
        id
    }

    pub fn delete_method(&mut self, id: Id<MethodTag>, sink: &mut impl MessageSink) -> bool {
        match self.methods.delete(id) {
            Some(_) => {
                sink.push(MessageTag::MethodDelete, wire::delete_body(id));
                true
            }
            None => {
                warn!(?id, "delete of non-existent or stale method id");
                false
            }
        }
    }

    pub fn create_signal(&mut self, signal: Signal, sink: &mut impl MessageSink) -> Id<SignalTag> {
        let id = self.signals.create(signal);
        let body = wire::signal_create_body(id, self.signals.get(id).unwrap());
        sink.push(MessageTag::SignalCreate, body);
        id
    }

    pub fn delete_signal(&mut self, id: Id<SignalTag>, sink: &mut impl MessageSink) -> bool {
        match self.signals.delete(id) {
            Some(_) => {
                sink.push(MessageTag::SignalDelete, wire::delete_body(id));
                true
            }
            None => {
                warn!(?id, "delete of non-existent or stale signal id");
                false
            }
        }
    }

    // ---- Buffer / BufferView / Image / Sampler / Texture -----------------

    pub fn create_buffer(&mut self, buffer: Buffer, sink: &mut impl MessageSink) -> Id<BufferTag> {
        let id = self.buffers.create(buffer);
        let body = wire::buffer_create_body(id, self.buffers.get(id).unwrap());
        sink.push(MessageTag::BufferCreate, body);
        id
    }

    pub fn delete_buffer(&mut self, id: Id<BufferTag>, sink: &mut impl MessageSink) -> bool {
        match self.buffers.delete(id) {
            Some(_) => {
                sink.push(MessageTag::BufferDelete, wire::delete_body(id));
                true
            }
            None => {
                warn!(?id, "delete of non-existent or stale buffer id");
                false
            }
        }
    }

    pub fn create_buffer_view(
        &mut self,
        view: BufferView,
        sink: &mut impl MessageSink,
    ) -> Result<Id<BufferViewTag>, RefError> {
        ref_ok(&self.buffers, view.buffer, "buffer")?;
        let id = self.buffer_views.create(view);
        let body = wire::buffer_view_create_body(id, self.buffer_views.get(id).unwrap());
        sink.push(MessageTag::BufferViewCreate, body);
        Ok(id)
    }

    pub fn delete_buffer_view(&mut self, id: Id<BufferViewTag>, sink: &mut impl MessageSink) -> bool {
        match self.buffer_views.delete(id) {
            Some(_) => {
                sink.push(MessageTag::BufferViewDelete, wire::delete_body(id));
                true
            }
            None => {
                warn!(?id, "delete of non-existent or stale buffer view id");
                false
            }
        }
    }

    pub fn create_image(
        &mut self,
        image: Image,
        sink: &mut impl MessageSink,
    ) -> Result<Id<ImageTag>, RefError> {
        if let image::ImageSource::BufferView(v) = &image.source {
            ref_ok(&self.buffer_views, *v, "buffer_view")?;
        }
        let id = self.images.create(image);
        let body = wire::image_create_body(id, self.images.get(id).unwrap());
        sink.push(MessageTag::ImageCreate, body);
        Ok(id)
    }

    pub fn delete_image(&mut self, id: Id<ImageTag>, sink: &mut impl MessageSink) -> bool {
        match self.images.delete(id) {
            Some(_) => {
                sink.push(MessageTag::ImageDelete, wire::delete_body(id));
                true
            }
            None => {
                warn!(?id, "delete of non-existent or stale image id");
                false
            }
        }
    }

    pub fn create_sampler(&mut self, sampler: Sampler, sink: &mut impl MessageSink) -> Id<SamplerTag> {
        let id = self.samplers.create(sampler);
        let body = wire::sampler_create_body(id, self.samplers.get(id).unwrap());
        sink.push(MessageTag::SamplerCreate, body);
        id
    }

    pub fn delete_sampler(&mut self, id: Id<SamplerTag>, sink: &mut impl MessageSink) -> bool {
        match self.samplers.delete(id) {
            Some(_) => {
                sink.push(MessageTag::SamplerDelete, wire::delete_body(id));
                true
            }
            None => {
                warn!(?id, "delete of non-existent or stale sampler id");
                false
            }
        }
    }

    pub fn create_texture(
        &mut self,
        texture: Texture,
        sink: &mut impl MessageSink,
    ) -> Result<Id<TextureTag>, RefError> {
        ref_ok(&self.images, texture.image, "image")?;
        ref_ok_opt(&self.samplers, texture.sampler, "sampler")?;
        let id = self.textures.create(texture);
        let body = wire::texture_create_body(id, self.textures.get(id).unwrap());
        sink.push(MessageTag::TextureCreate, body);
        Ok(id)
    }

    pub fn delete_texture(&mut self, id: Id<TextureTag>, sink: &mut impl MessageSink) -> bool {
        match self.textures.delete(id) {
            Some(_) => {
                sink.push(MessageTag::TextureDelete, wire::delete_body(id));
                true
            }
            None => {
                warn!(?id, "delete of non-existent or stale texture id");
                false
            }
        }
    }

    // ---- Material ----------------------------------------------------------

    fn check_material_refs(&self, m: &Material) -> Result<(), RefError> {
        for (field, tex_ref) in [
            ("base_color_texture", &m.base_color_texture),
            ("metal_rough_texture", &m.metal_rough_texture),
            ("normal_texture", &m.normal_texture),
            ("occlusion_texture", &m.occlusion_texture),
            ("emissive_texture", &m.emissive_texture),
        ] {
            if let Some(t) = tex_ref {
                ref_ok(&self.textures, t.texture, field)?;
            }
        }
        Ok(())
    }

    pub fn create_material(
        &mut self,
        material: Material,
        sink: &mut impl MessageSink,
    ) -> Result<Id<MaterialTag>, RefError> {
        self.check_material_refs(&material)?;
        let id = self.materials.create(material);
        let body = wire::material_create_body(id, self.materials.get(id).unwrap());
        sink.push(MessageTag::MaterialCreate, body);
        Ok(id)
    }

    pub fn update_material(
        &mut self,
        id: Id<MaterialTag>,
        material: Material,
        sink: &mut impl MessageSink,
    ) -> Result<(), MutationError> {
        ref_ok(&self.materials, id, "id")?;
        self.check_material_refs(&material)?;
        *self.materials.get_mut(id).unwrap() = material;
        let body = wire::material_create_body(id, self.materials.get(id).unwrap());
        sink.push(MessageTag::MaterialUpdate, body);
        Ok(())
    }

    pub fn delete_material(&mut self, id: Id<MaterialTag>, sink: &mut impl MessageSink) -> bool {
        match self.materials.delete(id) {
            Some(_) => {
                sink.push(MessageTag::MaterialDelete, wire::delete_body(id));
                true
            }
            None => {
                warn!(?id, "delete of non-existent or stale material id");
                false
            }
        }
    }

    // ---- Geometry ------------------------------------------------------

    fn check_geometry_refs(&self, g: &Geometry) -> Result<(), RefError> {
        for patch in &g.patches {
            for attr in &patch.attributes {
                ref_ok(&self.buffer_views, attr.view, "attribute.view")?;
            }
            if let Some(index) = &patch.index {
                ref_ok(&self.buffer_views, index.view, "index.view")?;
            }
            ref_ok(&self.materials, patch.material, "patch.material")?;
        }
        Ok(())
    }

    pub fn create_geometry(
        &mut self,
        geometry: Geometry,
        sink: &mut impl MessageSink,
    ) -> Result<Id<GeometryTag>, RefError> {
        self.check_geometry_refs(&geometry)?;
        let id = self.geometries.create(geometry);
        let body = wire::geometry_create_body(id, self.geometries.get(id).unwrap());
        sink.push(MessageTag::GeometryCreate, body);
        Ok(id)
    }

    pub fn delete_geometry(&mut self, id: Id<GeometryTag>, sink: &mut impl MessageSink) -> bool {
        match self.geometries.delete(id) {
            Some(_) => {
                sink.push(MessageTag::GeometryDelete, wire::delete_body(id));
                true
            }
            None => {
                warn!(?id, "delete of non-existent or stale geometry id");
                false
            }
        }
    }

    // ---- Light -----------------------------------------------------------

    pub fn create_light(&mut self, light: Light, sink: &mut impl MessageSink) -> Id<LightTag> {
        let id = self.lights.create(light);
        let body = wire::light_create_body(id, self.lights.get(id).unwrap());
        sink.push(MessageTag::LightCreate, body);
        id
    }

    pub fn update_light(
        &mut self,
        id: Id<LightTag>,
        light: Light,
        sink: &mut impl MessageSink,
    ) -> Result<(), RefError> {
        ref_ok(&self.lights, id, "id")?;
        *self.lights.get_mut(id).unwrap() = light;
        let body = wire::light_update_body(id, self.lights.get(id).unwrap());
        sink.push(MessageTag::LightUpdate, body);
        Ok(())
    }

    pub fn delete_light(&mut self, id: Id<LightTag>, sink: &mut impl MessageSink) -> bool {
        match self.lights.delete(id) {
            Some(_) => {
                sink.push(MessageTag::LightDelete, wire::delete_body(id));
                true
            }
            None => {
                warn!(?id, "delete of non-existent or stale light id");
                false
            }
        }
    }

    // ---- Entity ------------------------------------------------------------

    /// Walk the parent chain starting at `start`; returns `true` if
    /// `candidate` is ever encountered (invariant 4: acyclic parent chain).
    fn parent_chain_contains(&self, start: Option<Id<EntityTag>>, candidate: Id<EntityTag>) -> bool {
        let mut current = start;
        // bounded by arena size so a pre-existing corrupt chain can't spin forever
        let mut steps = 0usize;
        let limit = self.entities.len() + 1;
        while let Some(id) = current {
            if id == candidate {
                return true;
            }
            steps += 1;
            if steps > limit {
                return true;
            }
            current = self.entities.get(id).and_then(|e| e.parent);
        }
        false
    }

    fn check_entity_refs(&self, e: &Entity) -> Result<(), RefError> {
        ref_ok_opt(&self.entities, e.parent, "parent")?;
        if let EntityRepresentation::Render(r) = &e.representation {
            ref_ok(&self.geometries, r.geometry, "representation.geometry")?;
        }
        for light in &e.lights {
            ref_ok(&self.lights, *light, "lights")?;
        }
        for table in &e.tables {
            ref_ok(&self.tables, *table, "tables")?;
        }
        for plot in &e.plots {
            ref_ok(&self.plots, *plot, "plots")?;
        }
        for m in e.methods.iter() {
            ref_ok(&self.methods, m, "methods")?;
        }
        for s in e.signals.iter() {
            ref_ok(&self.signals, s, "signals")?;
        }
        Ok(())
    }

    pub fn create_entity(
        &mut self,
        entity: Entity,
        sink: &mut impl MessageSink,
    ) -> Result<Id<EntityTag>, RefError> {
        self.check_entity_refs(&entity)?;
        let id = self.entities.create(entity);
        let body = wire::entity_create_body(id, self.entities.get(id).unwrap());
        sink.push(MessageTag::EntityCreate, body);
        Ok(id)
    }

    pub fn update_entity(
        &mut self,
        id: Id<EntityTag>,
        entity: Entity,
        sink: &mut impl MessageSink,
    ) -> Result<(), MutationError> {
        ref_ok(&self.entities, id, "id")?;
        self.check_entity_refs(&entity)?;
        if self.parent_chain_contains(entity.parent, id) {
            return Err(MutationError::CyclicParent(id.slot));
        }
        *self.entities.get_mut(id).unwrap() = entity;
        let body = wire::entity_update_body(id, self.entities.get(id).unwrap());
        sink.push(MessageTag::EntityUpdate, body);
        Ok(())
    }

    pub fn delete_entity(&mut self, id: Id<EntityTag>, sink: &mut impl MessageSink) -> bool {
        match self.entities.delete(id) {
            Some(_) => {
                sink.push(MessageTag::EntityDelete, wire::delete_body(id));
                true
            }
            None => {
                warn!(?id, "delete of non-existent or stale entity id");
                false
            }
        }
    }

    pub fn entity_attach_method(
        &mut self,
        entity: Id<EntityTag>,
        method: Id<MethodTag>,
        sink: &mut impl MessageSink,
    ) -> Result<(), RefError> {
        ref_ok(&self.entities, entity, "id")?;
        ref_ok(&self.methods, method, "methods")?;
        self.entities.get_mut(entity).unwrap().methods.attach(method);
        let body = wire::entity_update_body(entity, self.entities.get(entity).unwrap());
        sink.push(MessageTag::EntityUpdate, body);
        Ok(())
    }

    pub fn entity_detach_method(
        &mut self,
        entity: Id<EntityTag>,
        method: Id<MethodTag>,
        sink: &mut impl MessageSink,
    ) -> Result<(), RefError> {
        ref_ok(&self.entities, entity, "id")?;
        self.entities.get_mut(entity).unwrap().methods.detach(method);
        let body = wire::entity_update_body(entity, self.entities.get(entity).unwrap());
        sink.push(MessageTag::EntityUpdate, body);
        Ok(())
    }

    // ---- Plot --------------------------------------------------------------

    fn check_plot_refs(&self, p: &Plot) -> Result<(), RefError> {
        ref_ok_opt(&self.tables, p.table, "table")?;
        for m in p.methods.iter() {
            ref_ok(&self.methods, m, "methods")?;
        }
        for s in p.signals.iter() {
            ref_ok(&self.signals, s, "signals")?;
        }
        Ok(())
    }

    pub fn create_plot(
        &mut self,
        plot: Plot,
        sink: &mut impl MessageSink,
    ) -> Result<Id<PlotTag>, RefError> {
        self.check_plot_refs(&plot)?;
        let id = self.plots.create(plot);
        let body = wire::plot_create_body(id, self.plots.get(id).unwrap());
        sink.push(MessageTag::PlotCreate, body);
        Ok(id)
    }

    pub fn update_plot(
        &mut self,
        id: Id<PlotTag>,
        plot: Plot,
        sink: &mut impl MessageSink,
    ) -> Result<(), RefError> {
        ref_ok(&self.plots, id, "id")?;
        self.check_plot_refs(&plot)?;
        *self.plots.get_mut(id).unwrap() = plot;
        let body = wire::plot_update_body(id, self.plots.get(id).unwrap());
        sink.push(MessageTag::PlotUpdate, body);
        Ok(())
    }

    pub fn delete_plot(&mut self, id: Id<PlotTag>, sink: &mut impl MessageSink) -> bool {
        match self.plots.delete(id) {
            Some(_) => {
                sink.push(MessageTag::PlotDelete, wire::delete_body(id));
                true
            }
            None => {
                warn!(?id, "delete of non-existent or stale plot id");
                false
            }
        }
    }

    pub fn plot_attach_method(
        &mut self,
        plot: Id<PlotTag>,
        method: Id<MethodTag>,
        sink: &mut impl MessageSink,
    ) -> Result<(), RefError> {
        ref_ok(&self.plots, plot, "id")?;
        ref_ok(&self.methods, method, "methods")?;
        self.plots.get_mut(plot).unwrap().methods.attach(method);
        let body = wire::plot_update_body(plot, self.plots.get(plot).unwrap());
        sink.push(MessageTag::PlotUpdate, body);
        Ok(())
    }

    pub fn plot_detach_method(&mut self, plot: Id<PlotTag>, method: Id<MethodTag>, sink: &mut impl MessageSink) -> Result<(), RefError> {
        ref_ok(&self.plots, plot, "id")?;
        self.plots.get_mut(plot).unwrap().methods.detach(method);
        let body = wire::plot_update_body(plot, self.plots.get(plot).unwrap());
        sink.push(MessageTag::PlotUpdate, body);
        Ok(())
    }

    // ---- Table ---------------------------------------------------------

    fn check_table_refs(&self, t: &Table) -> Result<(), RefError> {
        for m in t.methods.iter() {
            ref_ok(&self.methods, m, "methods")?;
        }
        for s in t.signals.iter() {
            ref_ok(&self.signals, s, "signals")?;
        }
        Ok(())
    }

    pub fn create_table(
        &mut self,
        table: Table,
        sink: &mut impl MessageSink,
    ) -> Result<Id<TableTag>, RefError> {
        self.check_table_refs(&table)?;
        let id = self.tables.create(table);
        let body = wire::table_create_body(id, self.tables.get(id).unwrap());
        sink.push(MessageTag::TableCreate, body);
        Ok(id)
    }

    pub fn table_attach_method(
        &mut self,
        table: Id<TableTag>,
        method: Id<MethodTag>,
        sink: &mut impl MessageSink,
    ) -> Result<(), RefError> {
        ref_ok(&self.tables, table, "id")?;
        ref_ok(&self.methods, method, "methods")?;
        self.tables.get_mut(table).unwrap().methods.attach(method);
        let body = wire::table_update_body(table, self.tables.get(table).unwrap());
        sink.push(MessageTag::TableUpdate, body);
        Ok(())
    }

    pub fn table_attach_signal(
        &mut self,
        table: Id<TableTag>,
        signal: Id<SignalTag>,
        sink: &mut impl MessageSink,
    ) -> Result<(), RefError> {
        ref_ok(&self.tables, table, "id")?;
        ref_ok(&self.signals, signal, "signals")?;
        self.tables.get_mut(table).unwrap().signals.attach(signal);
        let body = wire::table_update_body(table, self.tables.get(table).unwrap());
        sink.push(MessageTag::TableUpdate, body);
        Ok(())
    }

    pub fn update_table(
        &mut self,
        id: Id<TableTag>,
        table: Table,
        sink: &mut impl MessageSink,
    ) -> Result<(), RefError> {
        ref_ok(&self.tables, id, "id")?;
        self.check_table_refs(&table)?;
        *self.tables.get_mut(id).unwrap() = table;
        let body = wire::table_update_body(id, self.tables.get(id).unwrap());
        sink.push(MessageTag::TableUpdate, body);
        Ok(())
    }

    pub fn delete_table(&mut self, id: Id<TableTag>, sink: &mut impl MessageSink) -> bool {
        match self.tables.delete(id) {
            Some(_) => {
                sink.push(MessageTag::TableDelete, wire::delete_body(id));
                true
            }
            None => {
                warn!(?id, "delete of non-existent or stale table id");
                false
            }
        }
    }

    // ---- Document --------------------------------------------------------

    pub fn document_attach_method(&mut self, method: Id<MethodTag>, sink: &mut impl MessageSink) -> Result<(), RefError> {
        ref_ok(&self.methods, method, "methods")?;
        self.document.methods.attach(method);
        self.emit_document_update(sink);
        Ok(())
    }

    pub fn document_detach_method(&mut self, method: Id<MethodTag>, sink: &mut impl MessageSink) {
        self.document.methods.detach(method);
        self.emit_document_update(sink);
    }

    pub fn document_attach_signal(&mut self, signal: Id<SignalTag>, sink: &mut impl MessageSink) -> Result<(), RefError> {
        ref_ok(&self.signals, signal, "signals")?;
        self.document.signals.attach(signal);
        self.emit_document_update(sink);
        Ok(())
    }

    pub fn document_detach_signal(&mut self, signal: Id<SignalTag>, sink: &mut impl MessageSink) {
        self.document.signals.detach(signal);
        self.emit_document_update(sink);
    }

    fn emit_document_update(&self, sink: &mut impl MessageSink) {
        let body = wire::document_update_body(
            self.document.methods.as_slice(),
            self.document.signals.as_slice(),
        );
        sink.push(MessageTag::DocumentUpdate, body);
    }

    /// Clear every arena and reset the document, per spec.md §6's
    /// `DocumentReset` tag (SPEC_FULL.md supplement #4).
    pub fn reset(&mut self, sink: &mut impl MessageSink) {
        self.methods.clear();
        self.signals.clear();
        self.buffers.clear();
        self.buffer_views.clear();
        self.images.clear();
        self.samplers.clear();
        self.textures.clear();
        self.materials.clear();
        self.geometries.clear();
        self.lights.clear();
        self.entities.clear();
        self.plots.clear();
        self.tables.clear();
        self.document = Document::default();
        sink.push(MessageTag::DocumentReset, noodles_core::AnyVar::Null);
        debug!("registry reset");
    }

    /// Write every live component, in the dependency order spec.md §4.5
    /// requires for catch-up, followed by a `DocumentUpdate`.
    pub fn catch_up(&self, sink: &mut impl MessageSink) {
        for (id, b) in self.buffers.iter() {
            sink.push(MessageTag::BufferCreate, wire::buffer_create_body(id, b));
        }
        for (id, v) in self.buffer_views.iter() {
            sink.push(MessageTag::BufferViewCreate, wire::buffer_view_create_body(id, v));
        }
        for (id, i) in self.images.iter() {
            sink.push(MessageTag::ImageCreate, wire::image_create_body(id, i));
        }
        for (id, s) in self.samplers.iter() {
            sink.push(MessageTag::SamplerCreate, wire::sampler_create_body(id, s));
        }
        for (id, t) in self.textures.iter() {
            sink.push(MessageTag::TextureCreate, wire::texture_create_body(id, t));
        }
        for (id, m) in self.materials.iter() {
            sink.push(MessageTag::MaterialCreate, wire::material_create_body(id, m));
        }
        for (id, g) in self.geometries.iter() {
            sink.push(MessageTag::GeometryCreate, wire::geometry_create_body(id, g));
        }
        for (id, l) in self.lights.iter() {
            sink.push(MessageTag::LightCreate, wire::light_create_body(id, l));
        }
        for (id, t) in self.tables.iter() {
            sink.push(MessageTag::TableCreate, wire::table_create_body(id, t));
        }
        for (id, p) in self.plots.iter() {
            sink.push(MessageTag::PlotCreate, wire::plot_create_body(id, p));
        }
        for (id, e) in self.entities.iter() {
            sink.push(MessageTag::EntityCreate, wire::entity_create_body(id, e));
        }
        for (id, m) in self.methods.iter() {
            sink.push(MessageTag::MethodCreate, wire::method_create_body(id, m));
        }
        for (id, s) in self.signals.iter() {
            sink.push(MessageTag::SignalCreate, wire::signal_create_body(id, s));
        }
        self.emit_document_update(sink);
    }
}
