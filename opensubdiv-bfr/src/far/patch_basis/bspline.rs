use super::{c, tensor_product, BasisWeights, CurveWeights, Derivatives};
use crate::Real;

/// Uniform cubic B-spline weights at `t` with first and second
/// derivatives.
fn bspline_curve<R: Real>(t: R) -> CurveWeights<R> {
    let t2 = t * t;
    let t3 = t2 * t;
    let one_sixth = c::<R>(1.0 / 6.0);
    let half = R::HALF;

    [
        [
            one_sixth * (R::ONE - c::<R>(3.0) * (t - t2) - t3),
            one_sixth * (c::<R>(4.0) - c::<R>(6.0) * t2 + c::<R>(3.0) * t3),
            one_sixth * (R::ONE + c::<R>(3.0) * (t + t2 - t3)),
            one_sixth * t3,
        ],
        [
            -half * t2 + t - half,
            c::<R>(1.5) * t2 - c::<R>(2.0) * t,
            -c::<R>(1.5) * t2 + t + half,
            half * t2,
        ],
        [
            -t + R::ONE,
            c::<R>(3.0) * t - c::<R>(2.0),
            -c::<R>(3.0) * t + R::ONE,
            t,
        ],
    ]
}

/// Bicubic B-spline basis (16 points, row-major from the origin).
pub fn eval_basis_bspline<R: Real>(
    s: R,
    t: R,
    derivatives: Derivatives,
    weights: &mut BasisWeights<R>,
) -> usize {
    tensor_product(&bspline_curve(s), &bspline_curve(t), derivatives, weights);
    16
}

/// Fold the weights of the phantom points beyond a boundary edge into the
/// points they are extrapolated from, `P = 2 * B - I`.
///
/// Bits of `mask`: 1 = bottom row, 2 = right column, 4 = top row,
/// 8 = left column.
fn fold_boundary<R: Real>(mask: u32, w: &mut [R]) {
    let two = c::<R>(2.0);
    if mask & 1 != 0 {
        for i in 0..4 {
            w[i + 8] -= w[i];
            w[i + 4] += two * w[i];
            w[i] = R::ZERO;
        }
    }
    if mask & 2 != 0 {
        for i in (0..16).step_by(4) {
            w[i + 1] -= w[i + 3];
            w[i + 2] += two * w[i + 3];
            w[i + 3] = R::ZERO;
        }
    }
    if mask & 4 != 0 {
        for i in 0..4 {
            w[i + 4] -= w[i + 12];
            w[i + 8] += two * w[i + 12];
            w[i + 12] = R::ZERO;
        }
    }
    if mask & 8 != 0 {
        for i in (0..16).step_by(4) {
            w[i + 2] -= w[i];
            w[i + 1] += two * w[i];
            w[i] = R::ZERO;
        }
    }
}

/// Apply a 4 bit boundary edge mask to B-spline weights.
pub fn bound_basis_bspline<R: Real>(
    mask: u32,
    derivatives: Derivatives,
    weights: &mut BasisWeights<R>,
) {
    for row in &mut weights.rows_mut()[..derivatives.len()] {
        fold_boundary(mask, &mut row[..16]);
    }
}
