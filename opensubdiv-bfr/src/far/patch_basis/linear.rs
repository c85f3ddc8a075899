use super::{BasisWeights, Derivatives};
use crate::Real;

/// Bilinear quad basis (4 points, counter-clockwise from the origin).
pub fn eval_basis_linear<R: Real>(
    s: R,
    t: R,
    derivatives: Derivatives,
    weights: &mut BasisWeights<R>,
) -> usize {
    let s_c = R::ONE - s;
    let t_c = R::ONE - t;

    let [p, ds, dt, dss, dst, dtt] = weights.rows_mut();
    p[..4].copy_from_slice(&[s_c * t_c, s * t_c, s * t, s_c * t]);

    if derivatives.has_first() {
        ds[..4].copy_from_slice(&[-t_c, t_c, t, -t]);
        dt[..4].copy_from_slice(&[-s_c, -s, s, s_c]);

        if derivatives.has_second() {
            dss[..4].fill(R::ZERO);
            dst[..4].copy_from_slice(&[R::ONE, -R::ONE, R::ONE, -R::ONE]);
            dtt[..4].fill(R::ZERO);
        }
    }
    4
}

/// Linear triangle basis (3 points).
pub fn eval_basis_linear_tri<R: Real>(
    s: R,
    t: R,
    derivatives: Derivatives,
    weights: &mut BasisWeights<R>,
) -> usize {
    let [p, ds, dt, dss, dst, dtt] = weights.rows_mut();
    p[..3].copy_from_slice(&[R::ONE - s - t, s, t]);

    if derivatives.has_first() {
        ds[..3].copy_from_slice(&[-R::ONE, R::ONE, R::ZERO]);
        dt[..3].copy_from_slice(&[-R::ONE, R::ZERO, R::ONE]);

        if derivatives.has_second() {
            dss[..3].fill(R::ZERO);
            dst[..3].fill(R::ZERO);
            dtt[..3].fill(R::ZERO);
        }
    }
    3
}
