use super::{bezier::bezier_curve, c, BasisWeights, Derivatives};
use crate::Real;

// The 12 boundary points coincide with points of the bicubic Bezier
// patch; listed as (gregory index, bezier column, bezier row).
const BOUNDARY: [(usize, usize, usize); 12] = [
    (0, 0, 0),
    (1, 1, 0),
    (7, 2, 0),
    (5, 3, 0),
    (2, 0, 1),
    (6, 3, 1),
    (16, 0, 2),
    (12, 3, 2),
    (15, 0, 3),
    (17, 1, 3),
    (11, 2, 3),
    (10, 3, 3),
];

// Each of the 4 interior Bezier points is split into a pair of face
// points blended by rational weights.
const INTERIOR: [(usize, usize, usize); 8] = [
    (3, 1, 1),
    (4, 1, 1),
    (8, 2, 1),
    (9, 2, 1),
    (13, 2, 2),
    (14, 2, 2),
    (18, 1, 2),
    (19, 1, 2),
];

// Partial derivatives of numerator and denominator of each rational
// weight.
const NUMERATOR_DS: [f64; 8] = [1.0, 0.0, 0.0, -1.0, -1.0, 0.0, 0.0, 1.0];
const NUMERATOR_DT: [f64; 8] = [0.0, 1.0, 1.0, 0.0, 0.0, -1.0, -1.0, 0.0];
const DENOMINATOR_DS: [f64; 8] = [1.0, 1.0, -1.0, -1.0, -1.0, -1.0, 1.0, 1.0];
const DENOMINATOR_DT: [f64; 8] = [1.0, 1.0, 1.0, 1.0, -1.0, -1.0, -1.0, -1.0];

#[inline]
fn reciprocal<R: Real>(denominator: R) -> R {
    if denominator <= R::ZERO {
        R::ONE
    } else {
        R::ONE / denominator
    }
}

/// Cubic Gregory basis (20 points).
///
/// Derivatives are the exact derivatives of the rational basis.
pub fn eval_basis_gregory<R: Real>(
    s: R,
    t: R,
    derivatives: Derivatives,
    weights: &mut BasisWeights<R>,
) -> usize {
    let s_c = R::ONE - s;
    let t_c = R::ONE - t;

    let d0 = reciprocal(s + t);
    let d1 = reciprocal(s_c + t);
    let d2 = reciprocal(s_c + t_c);
    let d3 = reciprocal(s + t_c);

    let g = [
        s * d0,
        R::ONE - s * d0,
        t * d1,
        R::ONE - t * d1,
        s_c * d2,
        R::ONE - s_c * d2,
        t_c * d3,
        R::ONE - t_c * d3,
    ];
    let d = [d0, d0, d1, d1, d2, d2, d3, d3];

    let [bs, bds, bdss] = bezier_curve(s);
    let [bt, bdt, bdtt] = bezier_curve(t);

    let [p, ds, dt, dss, dst, dtt] = weights.rows_mut();

    for &(k, col, row) in &BOUNDARY {
        p[k] = bs[col] * bt[row];
        if derivatives.has_first() {
            ds[k] = bds[col] * bt[row];
            dt[k] = bs[col] * bdt[row];
            if derivatives.has_second() {
                dss[k] = bdss[col] * bt[row];
                dst[k] = bds[col] * bdt[row];
                dtt[k] = bs[col] * bdtt[row];
            }
        }
    }

    let two = c::<R>(2.0);
    for (i, &(k, col, row)) in INTERIOR.iter().enumerate() {
        p[k] = bs[col] * bt[row] * g[i];

        if !derivatives.has_first() {
            continue;
        }
        let n_ds = c::<R>(NUMERATOR_DS[i]);
        let n_dt = c::<R>(NUMERATOR_DT[i]);
        let d_ds = c::<R>(DENOMINATOR_DS[i]);
        let d_dt = c::<R>(DENOMINATOR_DT[i]);

        let g_ds = (n_ds - d_ds * g[i]) * d[i];
        let g_dt = (n_dt - d_dt * g[i]) * d[i];

        ds[k] = (bds[col] * g[i] + bs[col] * g_ds) * bt[row];
        dt[k] = (bdt[row] * g[i] + bt[row] * g_dt) * bs[col];

        if derivatives.has_second() {
            let d_sq = d[i] * d[i];
            let g_dss = two * d_ds * d_sq * (g[i] * d_ds - n_ds);
            let g_dst = d_sq * (two * g[i] * d_ds * d_dt - n_ds * d_dt - n_dt * d_ds);
            let g_dtt = two * d_dt * d_sq * (g[i] * d_dt - n_dt);

            dss[k] = (bdss[col] * g[i] + two * bds[col] * g_ds + bs[col] * g_dss) * bt[row];
            dst[k] = bt[row] * (bs[col] * g_dst + bds[col] * g_dt)
                + bdt[row] * (bds[col] * g[i] + bs[col] * g_ds);
            dtt[k] = (bdtt[row] * g[i] + two * bdt[row] * g_dt + bt[row] * g_dtt) * bs[col];
        }
    }
    20
}
