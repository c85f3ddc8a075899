//! Patch types and their control point counts.
use crate::sdc::Scheme;
use num_enum::{IntoPrimitive, TryFromPrimitive};

/// Type of a patch.
///
/// Variants are ordered: everything after
/// [`Triangles`](PatchType::Triangles) is an *adaptive* patch type.
#[derive(
    TryFromPrimitive,
    IntoPrimitive,
    Copy,
    Clone,
    Debug,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
)]
#[repr(u32)]
pub enum PatchType {
    /// Not a patch.
    #[default]
    NonPatch,
    /// Point patches (1 control vertex).
    Points,
    /// Line patches (2 control vertices).
    Lines,
    /// Bilinear quad patches (4 control vertices).
    Quads,
    /// Linear triangle patches (3 control vertices).
    Triangles,
    /// Quartic box-spline triangle patches (12 control vertices).
    Loop,
    /// Regular patches (16 control vertices, bi-cubic B-spline).
    Regular,
    /// Legacy Gregory patches (4 control vertices).
    Gregory,
    /// Legacy boundary Gregory patches (4 control vertices).
    GregoryBoundary,
    /// Cubic Gregory patches (20 control vertices).
    GregoryBasis,
    /// Quartic Gregory triangle patches (18 control vertices).
    GregoryTriangle,
}

/// Describes a patch type and its number of control vertices.
///
/// # Examples
///
/// ```
/// use opensubdiv_bfr::far::{PatchDescriptor, PatchType};
///
/// let descriptor = PatchDescriptor::new(PatchType::GregoryBasis);
/// assert_eq!(descriptor.control_vertices_len(), 20);
/// assert!(descriptor.is_adaptive());
/// ```
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PatchDescriptor {
    patch_type: PatchType,
}

const CATMULL_CLARK_DESCRIPTORS: [PatchDescriptor; 4] = [
    PatchDescriptor::new(PatchType::Regular),
    PatchDescriptor::new(PatchType::Gregory),
    PatchDescriptor::new(PatchType::GregoryBoundary),
    PatchDescriptor::new(PatchType::GregoryBasis),
];

const LOOP_DESCRIPTORS: [PatchDescriptor; 2] = [
    PatchDescriptor::new(PatchType::Loop),
    PatchDescriptor::new(PatchType::GregoryTriangle),
];

impl PatchDescriptor {
    pub const fn new(patch_type: PatchType) -> Self {
        Self { patch_type }
    }

    #[inline]
    pub fn patch_type(&self) -> PatchType {
        self.patch_type
    }

    /// Number of control vertices of a patch of this type.
    #[inline]
    pub fn control_vertices_len(&self) -> usize {
        Self::control_vertices_len_for(self.patch_type)
    }

    /// Number of control vertices of a patch of the given type.
    pub const fn control_vertices_len_for(patch_type: PatchType) -> usize {
        match patch_type {
            PatchType::NonPatch => 0,
            PatchType::Points => 1,
            PatchType::Lines => 2,
            PatchType::Quads => 4,
            PatchType::Triangles => 3,
            PatchType::Loop => 12,
            PatchType::Regular => 16,
            PatchType::Gregory | PatchType::GregoryBoundary => 4,
            PatchType::GregoryBasis => 20,
            PatchType::GregoryTriangle => 18,
        }
    }

    /// Whether the type is one of the adaptive (feature-adaptive
    /// refinement) patch types.
    #[inline]
    pub fn is_adaptive(&self) -> bool {
        self.patch_type > PatchType::Triangles
    }

    /// Whether the patch is parameterized over a triangle.
    #[inline]
    pub fn is_triangular(&self) -> bool {
        matches!(
            self.patch_type,
            PatchType::Triangles | PatchType::Loop | PatchType::GregoryTriangle
        )
    }

    /// Whether a basis evaluator exists for the type.
    #[inline]
    pub fn is_evaluable(&self) -> bool {
        matches!(
            self.patch_type,
            PatchType::Quads
                | PatchType::Triangles
                | PatchType::Loop
                | PatchType::Regular
                | PatchType::GregoryBasis
                | PatchType::GregoryTriangle
        )
    }

    /// Number of control vertices of a regular B-spline patch.
    #[inline]
    pub const fn regular_patch_size() -> usize {
        16
    }

    /// Number of control vertices of a cubic Gregory patch.
    #[inline]
    pub const fn gregory_basis_patch_size() -> usize {
        20
    }

    /// The patch types adaptive refinement produces for a scheme.
    ///
    /// Empty for [`Scheme::Bilinear`].
    pub fn adaptive_patch_descriptors(scheme: Scheme) -> &'static [PatchDescriptor] {
        match scheme {
            Scheme::Bilinear => &[],
            Scheme::CatmullClark => &CATMULL_CLARK_DESCRIPTORS,
            Scheme::Loop => &LOOP_DESCRIPTORS,
        }
    }
}

impl From<PatchType> for PatchDescriptor {
    fn from(patch_type: PatchType) -> Self {
        Self::new(patch_type)
    }
}
