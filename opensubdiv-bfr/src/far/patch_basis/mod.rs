//! Basis functions of all evaluable patch types.
//!
//! Every evaluator writes the weights of the position and, optionally, of
//! the first and second partial derivatives into a [`BasisWeights`] and
//! returns the number of control points of the patch. Weights are given
//! for coordinates `(s, t)` in the unit domain of the patch (the unit
//! square, or the unit triangle `s + t <= 1` for triangular types).
//!
//! [`evaluate_patch_basis`] takes coordinates in the parameterization of
//! the *face* instead and maps them into the patch domain using its
//! [`PatchParam`], scaling derivatives accordingly.
use crate::{
    far::{PatchParam, PatchType},
    Real,
};

mod bezier;
mod bezier_tri;
mod box_spline_tri;
mod bspline;
mod gregory;
mod gregory_tri;
mod linear;

pub use bezier::eval_basis_bezier;
pub use bezier_tri::eval_basis_bezier_tri;
pub use box_spline_tri::{bound_basis_box_spline_tri, eval_basis_box_spline_tri};
pub use bspline::{bound_basis_bspline, eval_basis_bspline};
pub use gregory::eval_basis_gregory;
pub use gregory_tri::eval_basis_gregory_tri;
pub use linear::{eval_basis_linear, eval_basis_linear_tri};

/// Largest number of control points of any evaluable patch (the cubic
/// Gregory patch).
pub const MAX_PATCH_POINTS: usize = 20;

/// Which partial derivatives to evaluate along with the position.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Derivatives {
    /// Position only.
    #[default]
    None,
    /// Position, `∂/∂u` and `∂/∂v`.
    First,
    /// Position, first derivatives, `∂²/∂u²`, `∂²/∂u∂v` and `∂²/∂v²`.
    Second,
}

impl Derivatives {
    /// Number of results: 1, 3 or 6.
    #[inline]
    pub fn len(self) -> usize {
        match self {
            Derivatives::None => 1,
            Derivatives::First => 3,
            Derivatives::Second => 6,
        }
    }

    #[inline]
    pub fn has_first(self) -> bool {
        self >= Derivatives::First
    }

    #[inline]
    pub fn has_second(self) -> bool {
        self == Derivatives::Second
    }

    /// The highest tier that fits into `rows` result rows.
    pub fn fitting(rows: usize) -> Self {
        match rows {
            0..=2 => Derivatives::None,
            3..=5 => Derivatives::First,
            _ => Derivatives::Second,
        }
    }
}

/// Basis weights of a patch and their partial derivatives.
///
/// Rows are `[point, ds, dt, dss, dst, dtt]`; only the first
/// [`Derivatives::len`] rows and the first *patch size* entries of each
/// row are written by an evaluator.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BasisWeights<R: Real> {
    rows: [[R; MAX_PATCH_POINTS]; 6],
}

impl<R: Real> Default for BasisWeights<R> {
    fn default() -> Self {
        Self {
            rows: [[R::ZERO; MAX_PATCH_POINTS]; 6],
        }
    }
}

impl<R: Real> BasisWeights<R> {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn point(&self) -> &[R; MAX_PATCH_POINTS] {
        &self.rows[0]
    }

    #[inline]
    pub fn ds(&self) -> &[R; MAX_PATCH_POINTS] {
        &self.rows[1]
    }

    #[inline]
    pub fn dt(&self) -> &[R; MAX_PATCH_POINTS] {
        &self.rows[2]
    }

    #[inline]
    pub fn dss(&self) -> &[R; MAX_PATCH_POINTS] {
        &self.rows[3]
    }

    #[inline]
    pub fn dst(&self) -> &[R; MAX_PATCH_POINTS] {
        &self.rows[4]
    }

    #[inline]
    pub fn dtt(&self) -> &[R; MAX_PATCH_POINTS] {
        &self.rows[5]
    }

    /// All six rows.
    #[inline]
    pub fn rows(&self) -> &[[R; MAX_PATCH_POINTS]; 6] {
        &self.rows
    }

    #[inline]
    pub fn rows_mut(&mut self) -> &mut [[R; MAX_PATCH_POINTS]; 6] {
        &mut self.rows
    }

    /// Multiply the first `len` entries of the rows in `range` by `scale`.
    pub(crate) fn scale_rows(&mut self, range: std::ops::Range<usize>, len: usize, scale: R) {
        for row in &mut self.rows[range] {
            row[..len].iter_mut().for_each(|w| *w *= scale);
        }
    }
}

/// Cubic curve weights and their first and second derivatives.
pub(crate) type CurveWeights<R> = [[R; 4]; 3];

/// Tensor product of two cubic curves into the 4×4 rows of `weights`.
///
/// Entry `4 * i + j` combines the `j`-th `s` weight with the `i`-th `t`
/// weight.
pub(crate) fn tensor_product<R: Real>(
    s: &CurveWeights<R>,
    t: &CurveWeights<R>,
    derivatives: Derivatives,
    weights: &mut BasisWeights<R>,
) {
    let [p, ds, dt, dss, dst, dtt] = weights.rows_mut();
    for i in 0..4 {
        for j in 0..4 {
            let k = 4 * i + j;
            p[k] = s[0][j] * t[0][i];
            if derivatives.has_first() {
                ds[k] = s[1][j] * t[0][i];
                dt[k] = s[0][j] * t[1][i];
                if derivatives.has_second() {
                    dss[k] = s[2][j] * t[0][i];
                    dst[k] = s[1][j] * t[1][i];
                    dtt[k] = s[0][j] * t[2][i];
                }
            }
        }
    }
}

#[inline]
pub(crate) fn c<R: Real>(value: f64) -> R {
    R::from_f64(value)
}

#[inline]
fn is_triangular(patch_type: PatchType) -> bool {
    matches!(
        patch_type,
        PatchType::Loop | PatchType::GregoryTriangle | PatchType::Triangles
    )
}

/// Evaluate the basis of `patch_type` at coordinates in the unit domain
/// of the patch, applying the boundary mask of `param` to the types that
/// have one (`Regular` and `Loop`).
///
/// Returns the number of control points, or `0` for a type without a
/// basis evaluator (nothing is written then).
pub fn evaluate_patch_basis_normalized<R: Real>(
    patch_type: PatchType,
    param: &PatchParam,
    s: R,
    t: R,
    derivatives: Derivatives,
    weights: &mut BasisWeights<R>,
) -> usize {
    let boundary = param.boundary();

    match patch_type {
        PatchType::Regular => {
            let n = eval_basis_bspline(s, t, derivatives, weights);
            if boundary != 0 {
                bound_basis_bspline(boundary, derivatives, weights);
            }
            n
        }
        PatchType::Loop => {
            let n = eval_basis_box_spline_tri(s, t, derivatives, weights);
            if boundary != 0 {
                bound_basis_box_spline_tri(boundary, derivatives, weights);
            }
            n
        }
        PatchType::GregoryBasis => eval_basis_gregory(s, t, derivatives, weights),
        PatchType::GregoryTriangle => eval_basis_gregory_tri(s, t, derivatives, weights),
        PatchType::Quads => eval_basis_linear(s, t, derivatives, weights),
        PatchType::Triangles => eval_basis_linear_tri(s, t, derivatives, weights),
        _ => 0,
    }
}

/// Evaluate the basis of `patch_type` at coordinates in the
/// parameterization of the face the patch belongs to.
///
/// The coordinates are normalized into the patch domain with `param`
/// (undoing the rotation of rotated sub-triangles). First derivatives are
/// scaled by `±2^depth`, second derivatives by `(2^depth)²`, so all
/// derivatives are with respect to the face parameterization.
pub fn evaluate_patch_basis<R: Real>(
    patch_type: PatchType,
    param: &PatchParam,
    s: R,
    t: R,
    derivatives: Derivatives,
    weights: &mut BasisWeights<R>,
) -> usize {
    let mut sign = R::ONE;
    let (s, t) = if is_triangular(patch_type) {
        if param.is_triangle_rotated() {
            sign = -R::ONE;
        }
        param.normalize_triangle(s, t)
    } else {
        param.normalize(s, t)
    };

    let n = evaluate_patch_basis_normalized(patch_type, param, s, t, derivatives, weights);

    if derivatives.has_first() {
        let d1_scale = sign * R::from_usize(1 << param.depth());
        weights.scale_rows(1..3, n, d1_scale);
        if derivatives.has_second() {
            weights.scale_rows(3..6, n, d1_scale * d1_scale);
        }
    }
    n
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derivative_tiers() {
        assert_eq!(Derivatives::None.len(), 1);
        assert_eq!(Derivatives::First.len(), 3);
        assert_eq!(Derivatives::Second.len(), 6);
        assert_eq!(Derivatives::fitting(1), Derivatives::None);
        assert_eq!(Derivatives::fitting(3), Derivatives::First);
        assert_eq!(Derivatives::fitting(6), Derivatives::Second);
        assert!(Derivatives::Second.has_first());
        assert!(!Derivatives::First.has_second());
    }
}
