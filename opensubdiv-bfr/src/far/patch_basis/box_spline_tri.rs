//! Quartic box-spline triangle (the regular Loop patch).
//!
//! Each of the 12 basis functions is a quartic polynomial in `(u, v)`,
//! stored as coefficients of the 15 bivariate monomials
//! `1, u, v, u², uv, v², u³, u²v, uv², v³, u⁴, u³v, u²v², uv³, v⁴`
//! (scaled by 12). Derivatives differentiate the monomials.
use super::{c, BasisWeights, Derivatives};
use crate::Real;

const MONOMIALS: usize = 15;

#[rustfmt::skip]
const COEFFICIENTS: [[f64; MONOMIALS]; 12] = [
    [1.0, -2.0, -4.0,   0.0,   6.0,   6.0,  2.0,   0.0,  -6.0, -4.0, -1.0, -2.0, 0.0,  2.0,  1.0],
    [1.0,  2.0, -2.0,   0.0,  -6.0,   0.0, -4.0,   0.0,   6.0,  2.0,  2.0,  4.0, 0.0, -2.0, -1.0],
    [0.0,  0.0,  0.0,   0.0,   0.0,   0.0,  2.0,   0.0,   0.0,  0.0, -1.0, -2.0, 0.0,  0.0,  0.0],
    [1.0, -4.0, -2.0,   6.0,   6.0,   0.0, -4.0,  -6.0,   0.0,  2.0,  1.0,  2.0, 0.0, -2.0, -1.0],
    [6.0,  0.0,  0.0, -12.0, -12.0, -12.0,  8.0,  12.0,  12.0,  8.0, -1.0, -2.0, 0.0, -2.0, -1.0],
    [1.0,  4.0,  2.0,   6.0,   6.0,   0.0, -4.0,  -6.0, -12.0, -4.0, -1.0, -2.0, 0.0,  4.0,  2.0],
    [0.0,  0.0,  0.0,   0.0,   0.0,   0.0,  0.0,   0.0,   0.0,  0.0,  1.0,  2.0, 0.0,  0.0,  0.0],
    [1.0, -2.0,  2.0,   0.0,  -6.0,   0.0,  2.0,   6.0,   0.0, -4.0, -1.0, -2.0, 0.0,  4.0,  2.0],
    [1.0,  2.0,  4.0,   0.0,   6.0,   6.0, -4.0, -12.0,  -6.0, -4.0,  2.0,  4.0, 0.0, -2.0, -1.0],
    [0.0,  0.0,  0.0,   0.0,   0.0,   0.0,  2.0,   6.0,   6.0,  2.0, -1.0, -2.0, 0.0, -2.0, -1.0],
    [0.0,  0.0,  0.0,   0.0,   0.0,   0.0,  0.0,   0.0,   0.0,  2.0,  0.0,  0.0, 0.0, -2.0, -1.0],
    [0.0,  0.0,  0.0,   0.0,   0.0,   0.0,  0.0,   0.0,   0.0,  0.0,  0.0,  0.0, 0.0,  2.0,  1.0],
];

/// The monomials and their partial derivatives at `(u, v)`, in the order
/// `[m, ∂u, ∂v, ∂uu, ∂uv, ∂vv]`.
fn monomials<R: Real>(u: R, v: R, derivatives: Derivatives) -> [[R; MONOMIALS]; 6] {
    let z = R::ZERO;
    let one = R::ONE;
    let n = |x: f64| c::<R>(x);

    let uu = u * u;
    let uv = u * v;
    let vv = v * v;

    let mut m = [[z; MONOMIALS]; 6];
    m[0] = [
        one,
        u,
        v,
        uu,
        uv,
        vv,
        uu * u,
        uu * v,
        u * vv,
        vv * v,
        uu * uu,
        uu * uv,
        uu * vv,
        uv * vv,
        vv * vv,
    ];
    if derivatives.has_first() {
        m[1] = [
            z,
            one,
            z,
            n(2.0) * u,
            v,
            z,
            n(3.0) * uu,
            n(2.0) * uv,
            vv,
            z,
            n(4.0) * uu * u,
            n(3.0) * uu * v,
            n(2.0) * u * vv,
            vv * v,
            z,
        ];
        m[2] = [
            z,
            z,
            one,
            z,
            u,
            n(2.0) * v,
            z,
            uu,
            n(2.0) * uv,
            n(3.0) * vv,
            z,
            uu * u,
            n(2.0) * uu * v,
            n(3.0) * u * vv,
            n(4.0) * vv * v,
        ];
    }
    if derivatives.has_second() {
        m[3] = [
            z,
            z,
            z,
            n(2.0),
            z,
            z,
            n(6.0) * u,
            n(2.0) * v,
            z,
            z,
            n(12.0) * uu,
            n(6.0) * uv,
            n(2.0) * vv,
            z,
            z,
        ];
        m[4] = [
            z,
            z,
            z,
            z,
            one,
            z,
            z,
            n(2.0) * u,
            n(2.0) * v,
            z,
            z,
            n(3.0) * uu,
            n(4.0) * uv,
            n(3.0) * vv,
            z,
        ];
        m[5] = [
            z,
            z,
            z,
            z,
            z,
            n(2.0),
            z,
            z,
            n(2.0) * u,
            n(6.0) * v,
            z,
            z,
            n(2.0) * uu,
            n(6.0) * uv,
            n(12.0) * vv,
        ];
    }
    m
}

/// Quartic box-spline triangle basis (12 points).
pub fn eval_basis_box_spline_tri<R: Real>(
    s: R,
    t: R,
    derivatives: Derivatives,
    weights: &mut BasisWeights<R>,
) -> usize {
    let m = monomials(s, t, derivatives);
    let scale = c::<R>(1.0 / 12.0);

    for (row, monomial) in weights.rows_mut()[..derivatives.len()].iter_mut().zip(&m) {
        for (w, coefficients) in row.iter_mut().zip(&COEFFICIENTS) {
            *w = scale
                * coefficients
                    .iter()
                    .zip(monomial)
                    .map(|(&k, &x)| c::<R>(k) * x)
                    .sum::<R>();
        }
    }
    12
}

// A phantom point `P = B + (X - I)` beyond a boundary: (phantom, b, x, i).
type Phantom = (usize, usize, usize, usize);

// Phantom points beyond each boundary edge. The first and last are
// extrapolated differently when the adjacent edge is a boundary as well:
// (adjacent edge, i) then gives `P = 2 * B - I`.
const EDGE_PHANTOMS: [[(Phantom, Option<(usize, usize)>); 3]; 3] = [
    [
        ((0, 4, 3, 7), Some((2, 8))),
        ((1, 4, 5, 8), None),
        ((2, 5, 6, 9), Some((1, 8))),
    ],
    [
        ((6, 5, 2, 1), Some((0, 4))),
        ((9, 5, 8, 4), None),
        ((11, 8, 10, 7), Some((2, 4))),
    ],
    [
        ((10, 8, 11, 9), Some((1, 5))),
        ((7, 8, 4, 5), None),
        ((3, 4, 0, 1), Some((0, 5))),
    ],
];

// Phantom points adjacent to each boundary vertex.
const VERTEX_PHANTOMS: [[Phantom; 2]; 3] = [
    [(3, 4, 7, 8), (0, 4, 1, 5)],
    [(2, 5, 1, 4), (6, 5, 9, 8)],
    [(11, 8, 9, 5), (10, 8, 7, 4)],
];

#[inline]
fn fold<R: Real>(w: &mut [R], (phantom, b, x, i): Phantom) {
    let wp = w[phantom];
    w[b] += wp;
    w[x] += wp;
    w[i] -= wp;
}

/// Edge and vertex bits of a 5 bit triangle boundary mask.
///
/// The upper two bits select how the lower three are read: edges (0),
/// vertices only (1), or edges with the vertex opposite each edge (2).
fn split_mask(mask: u32) -> (u32, u32) {
    let upper = (mask >> 3) & 0x3;
    let lower = mask & 0x7;
    match upper {
        1 => (0, lower),
        2 => (lower, ((lower & 1) << 2) | (lower >> 1)),
        _ => (lower, 0),
    }
}

fn fold_boundary<R: Real>(mask: u32, w: &mut [R]) {
    let (edges, vertices) = split_mask(mask);

    for (edge, phantoms) in EDGE_PHANTOMS.iter().enumerate() {
        if edges & (1 << edge) == 0 {
            continue;
        }
        for &((phantom, b, x, i), corner) in phantoms {
            match corner {
                Some((adjacent, corner_i)) if edges & (1 << adjacent) != 0 => {
                    fold(w, (phantom, b, b, corner_i))
                }
                _ => fold(w, (phantom, b, x, i)),
            }
        }
        for &((phantom, ..), _) in phantoms {
            w[phantom] = R::ZERO;
        }
    }

    for (vertex, phantoms) in VERTEX_PHANTOMS.iter().enumerate() {
        if vertices & (1 << vertex) == 0 {
            continue;
        }
        for &phantom in phantoms {
            fold(w, phantom);
        }
        for &(phantom, ..) in phantoms {
            w[phantom] = R::ZERO;
        }
    }
}

/// Apply a 5 bit triangle boundary mask to box-spline weights.
pub fn bound_basis_box_spline_tri<R: Real>(
    mask: u32,
    derivatives: Derivatives,
    weights: &mut BasisWeights<R>,
) {
    for row in &mut weights.rows_mut()[..derivatives.len()] {
        fold_boundary(mask, &mut row[..12]);
    }
}
