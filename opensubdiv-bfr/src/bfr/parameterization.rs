//! Parameterization of the limit surface of a face.
//!
//! Regular faces are parameterized over the unit square (quads) or the unit
//! triangle (triangles). Any other face of a quad-based scheme is split
//! into one quad sub-face per face-vertex; sub-faces are laid out in a grid
//! of `ceil(sqrt(N))` columns of unit tiles, each sub-face covering the
//! lower-left half-unit square of its tile. The corner at the tile origin
//! is the face-vertex, the opposite corner at `(+0.5, +0.5)` is the face
//! center.
use crate::{sdc::Scheme, Error, Real, Result};

/// Largest supported face size.
pub const MAX_FACE_SIZE: usize = u16::MAX as usize;

/// Shape of the parametric domain.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ParameterizationType {
    /// The unit square.
    Quad,
    /// The unit triangle.
    Tri,
    /// Tiled quad sub-faces of an N-sided face.
    QuadSubFaces,
}

/// Parametric domain of a face.
///
/// # Examples
///
/// ```
/// use opensubdiv_bfr::{bfr::Parameterization, sdc::Scheme};
///
/// let pentagon = Parameterization::new(Scheme::CatmullClark, 5).unwrap();
/// assert!(pentagon.has_sub_faces());
///
/// // Vertex 4 is the origin of the tile in column 1, row 1.
/// assert_eq!(pentagon.vertex_coord::<f32>(4), [1.0, 1.0]);
/// assert_eq!(pentagon.sub_face([1.2f32, 1.3]), 4);
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Parameterization {
    kind: ParameterizationType,
    face_size: u16,
    u_dim: u8,
}

#[inline]
fn c<R: Real>(value: f64) -> R {
    R::from_f64(value)
}

impl Parameterization {
    /// The parameterization of a face of `face_size` vertices.
    ///
    /// Fails for faces of less than 3 vertices, for non-triangles of
    /// triangle-based schemes, and for faces larger than
    /// [`MAX_FACE_SIZE`].
    pub fn new(scheme: Scheme, face_size: usize) -> Result<Self> {
        let regular_size = scheme.regular_face_size();
        let invalid = || Error::InvalidParameterization { scheme, face_size };

        if face_size == regular_size {
            return Ok(Self {
                kind: if regular_size == 4 {
                    ParameterizationType::Quad
                } else {
                    ParameterizationType::Tri
                },
                face_size: face_size as u16,
                u_dim: 0,
            });
        }
        if face_size < 3 || face_size > MAX_FACE_SIZE || regular_size == 3 {
            return Err(invalid());
        }

        // Smallest square grid holding all sub-faces.
        let mut u_dim = (face_size as f64).sqrt().ceil() as usize;
        while u_dim * u_dim < face_size {
            u_dim += 1;
        }
        while (u_dim - 1) * (u_dim - 1) >= face_size {
            u_dim -= 1;
        }
        Ok(Self {
            kind: ParameterizationType::QuadSubFaces,
            face_size: face_size as u16,
            u_dim: u8::try_from(u_dim).map_err(|_| invalid())?,
        })
    }

    #[inline]
    pub fn kind(&self) -> ParameterizationType {
        self.kind
    }

    #[inline]
    pub fn face_size(&self) -> usize {
        self.face_size as usize
    }

    #[inline]
    pub fn has_sub_faces(&self) -> bool {
        self.kind == ParameterizationType::QuadSubFaces
    }

    /// Number of columns of the sub-face grid, 0 without sub-faces.
    #[inline]
    pub fn u_dim(&self) -> usize {
        self.u_dim as usize
    }

    #[inline]
    fn sub_face_origin<R: Real>(&self, sub_face: usize) -> [R; 2] {
        let u_dim = self.u_dim();
        [
            R::from_usize(sub_face % u_dim),
            R::from_usize(sub_face / u_dim),
        ]
    }

    /// Coordinate of the face-vertex `vertex`.
    pub fn vertex_coord<R: Real>(&self, vertex: usize) -> [R; 2] {
        let one = R::ONE;
        let zero = R::ZERO;
        match self.kind {
            ParameterizationType::Quad => [
                if vertex == 1 || vertex == 2 { one } else { zero },
                if vertex >= 2 { one } else { zero },
            ],
            ParameterizationType::Tri => [
                if vertex == 1 { one } else { zero },
                if vertex == 2 { one } else { zero },
            ],
            ParameterizationType::QuadSubFaces => self.sub_face_origin(vertex),
        }
    }

    /// Coordinate at parameter `t` along the edge from face-vertex `edge`
    /// to the next one.
    pub fn edge_coord<R: Real>(&self, edge: usize, t: R) -> [R; 2] {
        let one = R::ONE;
        let zero = R::ZERO;
        match self.kind {
            ParameterizationType::Quad => match edge {
                0 => [t, zero],
                1 => [one, t],
                2 => [one - t, one],
                _ => [zero, one - t],
            },
            ParameterizationType::Tri => match edge {
                0 => [t, zero],
                1 => [one - t, t],
                _ => [zero, one - t],
            },
            // The first half lies on the sub-face of the edge, the second
            // on the sub-face of the next vertex.
            ParameterizationType::QuadSubFaces => {
                if t < R::HALF {
                    let [u, v] = self.sub_face_origin::<R>(edge);
                    [u + t, v]
                } else {
                    let [u, v] = self.sub_face_origin::<R>((edge + 1) % self.face_size());
                    [u, v + one - t]
                }
            }
        }
    }

    /// Coordinate of the center of the face.
    pub fn center_coord<R: Real>(&self) -> [R; 2] {
        match self.kind {
            ParameterizationType::Tri => [c(1.0 / 3.0), c(1.0 / 3.0)],
            ParameterizationType::Quad | ParameterizationType::QuadSubFaces => {
                [R::HALF, R::HALF]
            }
        }
    }

    /// The sub-face containing `uv`.
    #[inline]
    pub fn sub_face<R: Real>(&self, uv: [R; 2]) -> usize {
        self.to_sub_face(uv).0
    }

    fn to_sub_face<R: Real>(&self, uv: [R; 2]) -> (usize, [R; 2]) {
        let mut tile = [uv[0].floor(), uv[1].floor()];
        let mut frac = [uv[0] - tile[0], uv[1] - tile[1]];

        // Coordinates just short of the next tile (e.g. 0.999999) belong to
        // its sub-face.
        let edge = c::<R>(0.75);
        for k in 0..2 {
            if frac[k] > edge {
                tile[k] += R::ONE;
                frac[k] -= R::ONE;
            }
        }
        let u_tile = tile[0].max(R::ZERO).to_f64() as usize;
        let v_tile = tile[1].max(R::ZERO).to_f64() as usize;
        (self.u_dim() * v_tile + u_tile, frac)
    }

    /// Split `uv` into a sub-face and the coordinate within it (in
    /// `[0, 0.5]²`).
    pub fn convert_coord_to_sub_face<R: Real>(&self, uv: [R; 2]) -> (usize, [R; 2]) {
        debug_assert!(self.has_sub_faces());
        self.to_sub_face(uv)
    }

    /// Split `uv` into a sub-face and the coordinate within it scaled to
    /// the unit square.
    pub fn convert_coord_to_normalized_sub_face<R: Real>(&self, uv: [R; 2]) -> (usize, [R; 2]) {
        debug_assert!(self.has_sub_faces());
        let two = c::<R>(2.0);
        let (sub_face, [u, v]) = self.to_sub_face(uv);
        (sub_face, [u * two, v * two])
    }

    /// Inverse of [`convert_coord_to_sub_face`](Self::convert_coord_to_sub_face).
    pub fn convert_sub_face_to_coord<R: Real>(&self, sub_face: usize, sub_uv: [R; 2]) -> [R; 2] {
        debug_assert!(self.has_sub_faces());
        let [u, v] = self.sub_face_origin::<R>(sub_face);
        [u + sub_uv[0], v + sub_uv[1]]
    }

    /// Inverse of
    /// [`convert_coord_to_normalized_sub_face`](Self::convert_coord_to_normalized_sub_face).
    pub fn convert_normalized_sub_face_to_coord<R: Real>(
        &self,
        sub_face: usize,
        sub_uv: [R; 2],
    ) -> [R; 2] {
        debug_assert!(self.has_sub_faces());
        let [u, v] = self.sub_face_origin::<R>(sub_face);
        [u + R::HALF * sub_uv[0], v + R::HALF * sub_uv[1]]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_columns() {
        let u_dim = |n| Parameterization::new(Scheme::CatmullClark, n).unwrap().u_dim();
        assert_eq!(u_dim(3), 2);
        assert_eq!(u_dim(5), 3);
        assert_eq!(u_dim(9), 3);
        assert_eq!(u_dim(10), 4);
        assert_eq!(u_dim(16), 4);
        assert_eq!(u_dim(17), 5);
    }

    #[test]
    fn near_tile_boundary_rounds_up() {
        let p = Parameterization::new(Scheme::CatmullClark, 3).unwrap();
        let (sub_face, uv) = p.convert_coord_to_sub_face([0.999_999f64, 0.25]);
        assert_eq!(sub_face, 1);
        assert!(uv[0].abs() < 1e-5);
        assert_eq!(uv[1], 0.25);
    }
}
