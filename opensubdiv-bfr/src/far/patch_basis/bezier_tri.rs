use super::{c, BasisWeights, Derivatives};
use crate::Real;

/// Quartic Bezier triangle basis (15 points, rows of decreasing length
/// from the `u` axis).
pub fn eval_basis_bezier_tri<R: Real>(
    s: R,
    t: R,
    derivatives: Derivatives,
    weights: &mut BasisWeights<R>,
) -> usize {
    let u = s;
    let v = t;
    let w = R::ONE - u - v;

    let uu = u * u;
    let vv = v * v;
    let ww = w * w;

    let uv = u * v;
    let vw = v * w;
    let uw = u * w;

    let n = |x: f64| c::<R>(x);
    let z = R::ZERO;

    let [p, ds, dt, dss, dst, dtt] = weights.rows_mut();

    p[..15].copy_from_slice(&[
        ww * ww,
        n(4.0) * uw * ww,
        n(6.0) * uw * uw,
        n(4.0) * uw * uu,
        uu * uu,
        n(4.0) * vw * ww,
        n(12.0) * ww * uv,
        n(12.0) * uu * vw,
        n(4.0) * uv * uu,
        n(6.0) * vw * vw,
        n(12.0) * vv * uw,
        n(6.0) * uv * uv,
        n(4.0) * vw * vv,
        n(4.0) * uv * vv,
        vv * vv,
    ]);

    if derivatives.has_first() {
        ds[..15].copy_from_slice(&[
            -n(4.0) * ww * w,
            n(4.0) * ww * (w - n(3.0) * u),
            n(12.0) * uw * (w - u),
            n(4.0) * uu * (n(3.0) * w - u),
            n(4.0) * uu * u,
            -n(12.0) * vw * w,
            n(12.0) * vw * (w - n(2.0) * u),
            n(12.0) * uv * (n(2.0) * w - u),
            n(12.0) * uv * u,
            -n(12.0) * vv * w,
            n(12.0) * vv * (w - u),
            n(12.0) * vv * u,
            -n(4.0) * vv * v,
            n(4.0) * vv * v,
            z,
        ]);
        dt[..15].copy_from_slice(&[
            -n(4.0) * ww * w,
            -n(12.0) * ww * u,
            -n(12.0) * uu * w,
            -n(4.0) * uu * u,
            z,
            n(4.0) * ww * (w - n(3.0) * v),
            n(12.0) * uw * (w - n(2.0) * v),
            n(12.0) * uu * (w - v),
            n(4.0) * uu * u,
            n(12.0) * vw * (w - v),
            n(12.0) * uv * (n(2.0) * w - v),
            n(12.0) * uv * u,
            n(4.0) * vv * (n(3.0) * w - v),
            n(12.0) * vv * u,
            n(4.0) * vv * v,
        ]);

        if derivatives.has_second() {
            dss[..15].copy_from_slice(&[
                n(12.0) * ww,
                n(24.0) * (uw - ww),
                n(12.0) * (uu - n(4.0) * uw + ww),
                n(24.0) * (uw - uu),
                n(12.0) * uu,
                n(24.0) * vw,
                n(24.0) * (uv - n(2.0) * vw),
                n(24.0) * (vw - n(2.0) * uv),
                n(24.0) * uv,
                n(12.0) * vv,
                -n(24.0) * vv,
                n(12.0) * vv,
                z,
                z,
                z,
            ]);

            // Mixed partials, most derived from their neighbours.
            let w0 = n(12.0) * ww;
            let w3 = -n(12.0) * uu;
            let w13 = n(12.0) * vv;
            let w11 = n(24.0) * uv;
            let w1 = n(24.0) * uw - w0;
            let w2 = -n(24.0) * uw - w3;
            let w5 = n(24.0) * vw - w0;
            let w6 = -n(24.0) * vw + w11 - w1;
            let w8 = -w3;
            let w7 = -(w11 + w2);
            let w9 = w13 - w5 - w0;
            let w10 = -(w9 + w11);
            let w12 = -w13;
            dst[..15].copy_from_slice(&[
                w0, w1, w2, w3, z, w5, w6, w7, w8, w9, w10, w11, w12, w13, z,
            ]);

            dtt[..15].copy_from_slice(&[
                n(12.0) * ww,
                n(24.0) * uw,
                n(12.0) * uu,
                z,
                z,
                n(24.0) * (vw - ww),
                n(24.0) * (uv - n(2.0) * uw),
                -n(24.0) * uu,
                z,
                n(12.0) * (vv - n(4.0) * vw + ww),
                n(24.0) * (uw - n(2.0) * uv),
                n(12.0) * uu,
                n(24.0) * (vw - vv),
                n(24.0) * uv,
                n(12.0) * vv,
            ]);
        }
    }
    15
}
