use super::{c, tensor_product, BasisWeights, CurveWeights, Derivatives};
use crate::Real;

/// Cubic Bernstein weights at `t` with first and second derivatives.
pub(super) fn bezier_curve<R: Real>(t: R) -> CurveWeights<R> {
    let t_c = R::ONE - t;
    let t2 = t * t;
    let three = c::<R>(3.0);

    [
        [t_c * t_c * t_c, three * t * t_c * t_c, three * t2 * t_c, t2 * t],
        [
            -three * t_c * t_c,
            c::<R>(9.0) * t2 - c::<R>(12.0) * t + three,
            -c::<R>(9.0) * t2 + c::<R>(6.0) * t,
            three * t2,
        ],
        [
            c::<R>(6.0) * t_c,
            c::<R>(18.0) * t - c::<R>(12.0),
            -c::<R>(18.0) * t + c::<R>(6.0),
            c::<R>(6.0) * t,
        ],
    ]
}

/// Bicubic Bezier basis (16 points, row-major from the origin).
pub fn eval_basis_bezier<R: Real>(
    s: R,
    t: R,
    derivatives: Derivatives,
    weights: &mut BasisWeights<R>,
) -> usize {
    tensor_product(&bezier_curve(s), &bezier_curve(t), derivatives, weights);
    16
}
