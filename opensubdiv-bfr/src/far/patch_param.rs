//! Compact per-patch parameterization record.
//!
//! A [`PatchParam`] locates a patch inside the parametric domain of the
//! face it was refined from: its sub-domain origin `(u, v)` in units of
//! `1 / 2^depth`, the refinement depth, the boundary mask and whether the
//! face was split into sub-faces first ("non-quad root").
//!
//! Two 32 bit words hold everything:
//!
//! | word | bits  | field         |
//! |------|-------|---------------|
//! | 0    | 0–27  | face id       |
//! | 0    | 28–31 | transition    |
//! | 1    | 0–3   | depth         |
//! | 1    | 4     | non-quad root |
//! | 1    | 5     | regular       |
//! | 1    | 7–11  | boundary      |
//! | 1    | 12–21 | v             |
//! | 1    | 22–31 | u             |
use crate::{Error, Real, Result};
use bytemuck::{Pod, Zeroable};

const FACE_ID_BITS: u32 = 28;
const TRANSITION_BITS: u32 = 4;
const UV_BITS: u32 = 10;
const BOUNDARY_BITS: u32 = 5;
const DEPTH_BITS: u32 = 4;

const TRANSITION_OFFSET: u32 = 28;
const U_OFFSET: u32 = 22;
const V_OFFSET: u32 = 12;
const BOUNDARY_OFFSET: u32 = 7;
const REGULAR_OFFSET: u32 = 5;
const NON_QUAD_OFFSET: u32 = 4;

#[inline]
const fn mask(bits: u32) -> u32 {
    (1 << bits) - 1
}

#[inline]
const fn pack(value: u32, bits: u32, offset: u32) -> u32 {
    (value & mask(bits)) << offset
}

#[inline]
const fn unpack(word: u32, bits: u32, offset: u32) -> u32 {
    (word >> offset) & mask(bits)
}

/// Fields a [`PatchParam`] is built from.
///
/// Uses the [init struct pattern](https://xaeroxe.github.io/init-struct-pattern/).
///
/// | Field           | Default |
/// |-----------------|---------|
/// | `face_id`       | `0`     |
/// | `u`             | `0`     |
/// | `v`             | `0`     |
/// | `depth`         | `0`     |
/// | `non_quad_root` | `false` |
/// | `boundary`      | `0`     |
/// | `transition`    | `0`     |
/// | `regular`       | `false` |
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct PatchParamFields {
    /// Index of the face (or sub-face) the patch belongs to (28 bits).
    pub face_id: u32,
    /// Horizontal origin of the patch, in units of `1 / 2^depth` (10 bits).
    pub u: u32,
    /// Vertical origin of the patch, in units of `1 / 2^depth` (10 bits).
    pub v: u32,
    /// Refinement depth (4 bits).
    pub depth: u32,
    /// The root face was split into sub-faces before refinement.
    pub non_quad_root: bool,
    /// Boundary edge (and vertex) mask (5 bits).
    pub boundary: u32,
    /// Transition edge mask (4 bits).
    pub transition: u32,
    /// The patch is a regular patch.
    pub regular: bool,
}

/// Bit-packed patch parameterization.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
#[repr(C)]
pub struct PatchParam {
    field0: u32,
    field1: u32,
}

impl PatchParam {
    /// Pack `fields`, silently truncating values that do not fit their bit
    /// width.
    pub fn new(fields: PatchParamFields) -> Self {
        Self {
            field0: pack(fields.face_id, FACE_ID_BITS, 0)
                | pack(fields.transition, TRANSITION_BITS, TRANSITION_OFFSET),
            field1: pack(fields.u, UV_BITS, U_OFFSET)
                | pack(fields.v, UV_BITS, V_OFFSET)
                | pack(fields.boundary, BOUNDARY_BITS, BOUNDARY_OFFSET)
                | pack(fields.regular as u32, 1, REGULAR_OFFSET)
                | pack(fields.non_quad_root as u32, 1, NON_QUAD_OFFSET)
                | pack(fields.depth, DEPTH_BITS, 0),
        }
    }

    /// Pack `fields`, rejecting values that do not fit their bit width or
    /// an origin outside the `2^depth` grid.
    pub fn try_new(fields: PatchParamFields) -> Result<Self> {
        Self::check_fields(&fields)?;
        Ok(Self::new(fields))
    }

    fn check_fields(fields: &PatchParamFields) -> Result<()> {
        let check = |name: &str, value: u32, bits: u32| {
            if value > mask(bits) {
                Err(Error::InvalidPatch(format!(
                    "{name} {value} does not fit into {bits} bits"
                )))
            } else {
                Ok(())
            }
        };
        check("face id", fields.face_id, FACE_ID_BITS)?;
        check("u", fields.u, UV_BITS)?;
        check("v", fields.v, UV_BITS)?;
        check("depth", fields.depth, DEPTH_BITS)?;
        check("boundary", fields.boundary, BOUNDARY_BITS)?;
        check("transition", fields.transition, TRANSITION_BITS)?;

        let grid = 1u32 << fields.depth.min(mask(DEPTH_BITS));
        if fields.u >= grid || fields.v >= grid {
            return Err(Error::InvalidPatch(format!(
                "origin ({}, {}) outside the grid of depth {}",
                fields.u, fields.v, fields.depth
            )));
        }
        Ok(())
    }

    /// Reconstruct from the two raw words.
    pub fn from_raw(field0: u32, field1: u32) -> Self {
        Self { field0, field1 }
    }

    /// The two raw words.
    pub fn raw(&self) -> (u32, u32) {
        (self.field0, self.field1)
    }

    /// Unpack all fields.
    pub fn fields(&self) -> PatchParamFields {
        PatchParamFields {
            face_id: self.face_id(),
            u: self.u(),
            v: self.v(),
            depth: self.depth(),
            non_quad_root: self.non_quad_root(),
            boundary: self.boundary(),
            transition: self.transition(),
            regular: self.is_regular(),
        }
    }

    #[inline]
    pub fn face_id(&self) -> u32 {
        unpack(self.field0, FACE_ID_BITS, 0)
    }

    #[inline]
    pub fn transition(&self) -> u32 {
        unpack(self.field0, TRANSITION_BITS, TRANSITION_OFFSET)
    }

    #[inline]
    pub fn u(&self) -> u32 {
        unpack(self.field1, UV_BITS, U_OFFSET)
    }

    #[inline]
    pub fn v(&self) -> u32 {
        unpack(self.field1, UV_BITS, V_OFFSET)
    }

    #[inline]
    pub fn boundary(&self) -> u32 {
        unpack(self.field1, BOUNDARY_BITS, BOUNDARY_OFFSET)
    }

    #[inline]
    pub fn is_regular(&self) -> bool {
        unpack(self.field1, 1, REGULAR_OFFSET) != 0
    }

    #[inline]
    pub fn non_quad_root(&self) -> bool {
        unpack(self.field1, 1, NON_QUAD_OFFSET) != 0
    }

    #[inline]
    pub fn depth(&self) -> u32 {
        unpack(self.field1, DEPTH_BITS, 0)
    }

    /// Depth relative to the root of the parameterization, i.e. one less
    /// for patches of a sub-face.
    #[inline]
    fn parametric_depth(&self) -> u32 {
        self.depth().saturating_sub(self.non_quad_root() as u32)
    }

    /// Edge length of the patch in the parametric space of its face.
    #[inline]
    pub fn param_fraction<R: Real>(&self) -> R {
        R::ONE / R::from_usize(1 << self.parametric_depth())
    }

    /// A triangular patch whose domain is point-reflected about its
    /// hypotenuse.
    #[inline]
    pub fn is_triangle_rotated(&self) -> bool {
        self.u() + self.v() >= (1 << self.depth())
    }

    /// Map face coordinates into the unit domain of this patch.
    pub fn normalize<R: Real>(&self, u: R, v: R) -> (R, R) {
        let frac_inv = R::from_usize(1 << self.parametric_depth());
        (
            u * frac_inv - R::from_usize(self.u() as usize),
            v * frac_inv - R::from_usize(self.v() as usize),
        )
    }

    /// Map coordinates of the unit domain of this patch to face coordinates.
    pub fn unnormalize<R: Real>(&self, u: R, v: R) -> (R, R) {
        let frac = self.param_fraction::<R>();
        (
            (u + R::from_usize(self.u() as usize)) * frac,
            (v + R::from_usize(self.v() as usize)) * frac,
        )
    }

    /// [`normalize`](Self::normalize) for triangular patches, undoing the
    /// rotation of rotated sub-triangles.
    pub fn normalize_triangle<R: Real>(&self, u: R, v: R) -> (R, R) {
        if self.is_triangle_rotated() {
            let frac_inv = R::from_usize(1 << self.parametric_depth());
            let depth_factor = 1usize << self.depth();
            (
                R::from_usize(depth_factor - self.u() as usize) - u * frac_inv,
                R::from_usize(depth_factor - self.v() as usize) - v * frac_inv,
            )
        } else {
            self.normalize(u, v)
        }
    }

    /// Inverse of [`normalize_triangle`](Self::normalize_triangle).
    pub fn unnormalize_triangle<R: Real>(&self, u: R, v: R) -> (R, R) {
        if self.is_triangle_rotated() {
            let frac = self.param_fraction::<R>();
            let depth_factor = 1usize << self.depth();
            (
                (R::from_usize(depth_factor - self.u() as usize) - u) * frac,
                (R::from_usize(depth_factor - self.v() as usize) - v) * frac,
            )
        } else {
            self.unnormalize(u, v)
        }
    }
}
