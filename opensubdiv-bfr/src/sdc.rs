//! Subdivision scheme traits.
use num_enum::TryFromPrimitive;

/// Subdivision scheme.
#[derive(TryFromPrimitive, Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum Scheme {
    /// Bilinear interpolation.
    Bilinear,
    /// [Catmull-Clark](https://en.wikipedia.org/wiki/Catmull%E2%80%93Clark_subdivision_surface)
    /// subdivision.
    #[default]
    CatmullClark,
    /// [Loop](https://en.wikipedia.org/wiki/Loop_subdivision_surface)
    /// subdivision.
    Loop,
}

impl Scheme {
    /// The size of a face the scheme considers regular.
    ///
    /// Quads for [`Bilinear`](Scheme::Bilinear) and
    /// [`CatmullClark`](Scheme::CatmullClark), triangles for
    /// [`Loop`](Scheme::Loop).
    pub fn regular_face_size(self) -> usize {
        match self {
            Scheme::Bilinear | Scheme::CatmullClark => 4,
            Scheme::Loop => 3,
        }
    }

    /// Whether the limit surface of the scheme interpolates its control
    /// points.
    pub fn is_linear(self) -> bool {
        self == Scheme::Bilinear
    }
}
