//! `Light`: point/spot/directional light parameters, spec.md §3.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LightKind {
    Point { range: f64 },
    Spot { range: f64, inner: f64, outer: f64 },
    Directional { range: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Light {
    pub color: [f64; 3],
    pub intensity: f64,
    pub kind: LightKind,
}
