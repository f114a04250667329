//! `Texture`: an [`super::image::Image`] plus optional [`super::sampler::Sampler`].
use noodles_core::id::{ImageTag, Id, SamplerTag};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Texture {
    pub image: Id<ImageTag>,
    pub sampler: Option<Id<SamplerTag>>,
}
