use super::{c, eval_basis_bezier_tri, BasisWeights, Derivatives};
use crate::Real;

// Source of each Gregory triangle point: a quartic Bezier triangle point,
// optionally blended by one of the six rational weights.
const FROM_BEZIER: [(usize, Option<usize>); 18] = [
    (0, None),
    (1, None),
    (5, None),
    (6, Some(0)),
    (6, Some(1)),
    (4, None),
    (8, None),
    (3, None),
    (7, Some(2)),
    (7, Some(3)),
    (14, None),
    (12, None),
    (13, None),
    (10, Some(4)),
    (10, Some(5)),
    (2, None),
    (11, None),
    (9, None),
];

/// A rational weight `n / d` with `n` and `d` linear in `(s, t)`, and its
/// partial derivatives `[g, gs, gt, gss, gst, gtt]`.
fn rational<R: Real>(
    numerator: R,
    denominator: R,
    dn: (f64, f64),
    dd: (f64, f64),
    fallback: R,
) -> [R; 6] {
    if denominator <= R::ZERO {
        return [fallback, R::ZERO, R::ZERO, R::ZERO, R::ZERO, R::ZERO];
    }
    let inv = R::ONE / denominator;
    let (n_s, n_t) = (c::<R>(dn.0), c::<R>(dn.1));
    let (d_s, d_t) = (c::<R>(dd.0), c::<R>(dd.1));
    let two = c::<R>(2.0);

    let g = numerator * inv;
    let g_s = (n_s - d_s * g) * inv;
    let g_t = (n_t - d_t * g) * inv;
    [
        g,
        g_s,
        g_t,
        -two * g_s * d_s * inv,
        -(g_s * d_t + g_t * d_s) * inv,
        -two * g_t * d_t * inv,
    ]
}

/// Quartic Gregory triangle basis (18 points).
///
/// Derivatives are the exact derivatives of the rational basis.
pub fn eval_basis_gregory_tri<R: Real>(
    s: R,
    t: R,
    derivatives: Derivatives,
    weights: &mut BasisWeights<R>,
) -> usize {
    let u = s;
    let v = t;
    let w = R::ONE - u - v;

    let blend = [
        rational(u, u + v, (1.0, 0.0), (1.0, 1.0), R::ONE),
        rational(v, u + v, (0.0, 1.0), (1.0, 1.0), R::ZERO),
        rational(v, v + w, (0.0, 1.0), (-1.0, 0.0), R::ONE),
        rational(w, v + w, (-1.0, -1.0), (-1.0, 0.0), R::ZERO),
        rational(w, w + u, (-1.0, -1.0), (0.0, -1.0), R::ONE),
        rational(u, w + u, (1.0, 0.0), (0.0, -1.0), R::ZERO),
    ];

    // Positions are needed for the product rule of every derivative.
    let mut bezier = BasisWeights::default();
    eval_basis_bezier_tri(s, t, derivatives, &mut bezier);
    let [bp, bs, bt, bss, bst, btt] = bezier.rows();

    let two = c::<R>(2.0);
    let [p, ds, dt, dss, dst, dtt] = weights.rows_mut();

    for (k, &(b, split)) in FROM_BEZIER.iter().enumerate() {
        let Some(pair) = split else {
            p[k] = bp[b];
            if derivatives.has_first() {
                ds[k] = bs[b];
                dt[k] = bt[b];
                if derivatives.has_second() {
                    dss[k] = bss[b];
                    dst[k] = bst[b];
                    dtt[k] = btt[b];
                }
            }
            continue;
        };

        let [g, g_s, g_t, g_ss, g_st, g_tt] = blend[pair];
        p[k] = bp[b] * g;
        if derivatives.has_first() {
            ds[k] = bs[b] * g + bp[b] * g_s;
            dt[k] = bt[b] * g + bp[b] * g_t;
            if derivatives.has_second() {
                dss[k] = bss[b] * g + two * bs[b] * g_s + bp[b] * g_ss;
                dst[k] = bst[b] * g + bs[b] * g_t + bt[b] * g_s + bp[b] * g_st;
                dtt[k] = btt[b] * g + two * bt[b] * g_t + bp[b] * g_tt;
            }
        }
    }
    18
}
