//! `BufferView`: a typed window into a [`super::buffer::Buffer`].
use noodles_core::id::{BufferTag, Id};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewKind {
    Unknown,
    Geometry,
    Image,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BufferView {
    pub buffer: Id<BufferTag>,
    pub offset: u64,
    pub length: u64,
    pub kind: ViewKind,
}
