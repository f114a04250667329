//! Stable handles to components: `(slot, generation)` pairs typed by the
//! component kind they address.
use core::fmt;
use core::marker::PhantomData;

/// Marker types identifying a component kind at the type level, so that an
/// `Id<MethodTag>` can never be mixed up with an `Id<EntityTag>`.
macro_rules! kind_tags {
    ($($name:ident => $label:literal),* $(,)?) => {
        $(
            #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
            pub enum $name {}
            impl Kind for $name {
                const LABEL: &'static str = $label;
            }
        )*
    };
}

/// Implemented by the zero-variant marker types produced by [`kind_tags`].
pub trait Kind: 'static {
    const LABEL: &'static str;
}

kind_tags! {
    MethodTag => "method",
    SignalTag => "signal",
    BufferTag => "buffer",
    BufferViewTag => "buffer_view",
    ImageTag => "image",
    SamplerTag => "sampler",
    TextureTag => "texture",
    MaterialTag => "material",
    GeometryTag => "geometry",
    LightTag => "light",
    EntityTag => "entity",
    PlotTag => "plot",
    TableTag => "table",
}

/// A handle to a live component of kind `T`.
///
/// The sentinel `(u32::MAX, u32::MAX)` never addresses a live slot and is
/// used to represent "no reference" on the wire and in Rust APIs alike.
pub struct Id<T: Kind> {
    pub slot: u32,
    pub gen: u32,
    _kind: PhantomData<fn() -> T>,
}

impl<T: Kind> Id<T> {
    pub const INVALID: Id<T> = Id {
        slot: u32::MAX,
        gen: u32::MAX,
        _kind: PhantomData,
    };

    pub const fn new(slot: u32, gen: u32) -> Self {
        Self {
            slot,
            gen,
            _kind: PhantomData,
        }
    }

    pub const fn is_invalid(&self) -> bool {
        self.slot == u32::MAX && self.gen == u32::MAX
    }
}

impl<T: Kind> Clone for Id<T> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<T: Kind> Copy for Id<T> {}

impl<T: Kind> PartialEq for Id<T> {
    fn eq(&self, other: &Self) -> bool {
        self.slot == other.slot && self.gen == other.gen
    }
}
impl<T: Kind> Eq for Id<T> {}

impl<T: Kind> core::hash::Hash for Id<T> {
    fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
        self.slot.hash(state);
        self.gen.hash(state);
    }
}

impl<T: Kind> fmt::Debug for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_invalid() {
            write!(f, "Id<{}>(invalid)", T::LABEL)
        } else {
            write!(f, "Id<{}>({}, {})", T::LABEL, self.slot, self.gen)
        }
    }
}

impl<T: Kind> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.slot, self.gen)
    }
}

impl<T: Kind> Default for Id<T> {
    fn default() -> Self {
        Self::INVALID
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinel_is_invalid() {
        let id: Id<EntityTag> = Id::INVALID;
        assert!(id.is_invalid());
        assert_eq!(id.slot, u32::MAX);
        assert_eq!(id.gen, u32::MAX);
    }

    #[test]
    fn fresh_id_is_valid() {
        let id: Id<EntityTag> = Id::new(0, 0);
        assert!(!id.is_invalid());
    }

    #[test]
    fn equality_requires_matching_generation() {
        let a: Id<BufferTag> = Id::new(3, 1);
        let b: Id<BufferTag> = Id::new(3, 2);
        assert_ne!(a, b);
    }
}
