//! `Material`: PBR surface parameters, spec.md §3.
use noodles_core::id::{Id, TextureTag};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextureRef {
    pub texture: Id<TextureTag>,
    /// 3x2 uv transform, row-major.
    pub transform: [f64; 6],
    pub uv_slot: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlphaMode {
    Opaque,
    Mask,
    Blend,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub base_color: [f64; 4],
    pub base_color_texture: Option<TextureRef>,
    pub metallic: f64,
    pub roughness: f64,
    pub metal_rough_texture: Option<TextureRef>,
    pub normal_texture: Option<TextureRef>,
    pub occlusion_texture: Option<TextureRef>,
    pub emissive_factor: [f64; 3],
    pub emissive_texture: Option<TextureRef>,
    pub alpha_mode: AlphaMode,
    pub alpha_cutoff: f64,
    pub double_sided: bool,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            base_color: [1.0, 1.0, 1.0, 1.0],
            base_color_texture: None,
            metallic: 1.0,
            roughness: 1.0,
            metal_rough_texture: None,
            normal_texture: None,
            occlusion_texture: None,
            emissive_factor: [0.0, 0.0, 0.0],
            emissive_texture: None,
            alpha_mode: AlphaMode::Opaque,
            alpha_cutoff: 0.5,
            double_sided: false,
        }
    }
}
