//! `Image`: pixel data, either packed in a [`super::buffer_view::BufferView`]
//! or fetched from a URI.
use noodles_core::id::{BufferViewTag, Id};

#[derive(Debug, Clone, PartialEq)]
pub enum ImageSource {
    BufferView(Id<BufferViewTag>),
    Uri(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    pub source: ImageSource,
}
