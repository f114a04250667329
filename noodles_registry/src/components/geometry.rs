//! `Geometry`: vertex-attribute patches plus an optional index and
//! material, spec.md §3.
use noodles_core::id::{BufferViewTag, Id, MaterialTag};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeSemantic {
    Position,
    Normal,
    Tangent,
    Color,
    TexCoord0,
    TexCoord1,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeFormat {
    U8,
    U16,
    U32,
    F32Vec2,
    F32Vec3,
    F32Vec4,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attribute {
    pub semantic: AttributeSemantic,
    pub format: AttributeFormat,
    pub view: Id<BufferViewTag>,
    pub offset: u64,
    pub stride: u64,
    pub normalize: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexFormat {
    U16,
    U32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Index {
    pub view: Id<BufferViewTag>,
    pub count: u64,
    pub offset: u64,
    pub format: IndexFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveType {
    Points,
    Lines,
    LineStrip,
    Triangles,
    TriangleStrip,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Patch {
    pub attributes: Vec<Attribute>,
    pub index: Option<Index>,
    pub primitive: PrimitiveType,
    pub material: Id<MaterialTag>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Geometry {
    pub patches: Vec<Patch>,
}
