//! Evaluation of the limit surface of a single face.
//!
//! A [`Surface`] is created once per face and selects one of three
//! strategies when it is constructed:
//!
//! * **Regular** – the face is a single patch whose points are the
//!   control points of the face.
//! * **Multi-linear** – an N-sided face without a smooth limit, evaluated
//!   as the bilinear quad of the sub-face containing the coordinate.
//! * **Irregular** – the face is represented by the patches of a shared
//!   [`PatchTree`].
//!
//! Evaluation happens in two steps. The *control points* of the face are
//! gathered from a mesh buffer and the *patch points* computed from them
//! ([`Surface::prepare_patch_points`]); the patch points are then combined
//! with basis weights for any number of coordinates
//! ([`Surface::evaluate`]). Alternatively, [`Surface::evaluate_stencil`]
//! returns weights of the control points directly.
use crate::{
    bfr::{
        point_operations::{
            combine1, combine3, combine_consecutive, combine_multiple, copy_consecutive,
            split_face,
        },
        Parameterization, ParameterizationType, PatchTree, PointDescriptor, Sources,
    },
    far::{
        evaluate_patch_basis_normalized, BasisWeights, Derivatives, PatchDescriptor, PatchParam,
        PatchParamFields, PatchType,
    },
    Error, Index, Real, Result,
};
use std::{borrow::Cow, marker::PhantomData, sync::Arc};

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Position and derivatives of a point with three components.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct PatchEvalResult<R: Real> {
    /// Evaluated point position
    pub point: [R; 3],
    /// First derivative with respect to u
    pub du: [R; 3],
    /// First derivative with respect to v
    pub dv: [R; 3],
    /// Second derivative with respect to u
    pub duu: [R; 3],
    /// Mixed second derivative
    pub duv: [R; 3],
    /// Second derivative with respect to v
    pub dvv: [R; 3],
}

#[derive(Clone, Debug)]
enum Strategy {
    Regular {
        patch_type: PatchType,
        param: PatchParam,
    },
    MultiLinear,
    Irregular(Arc<PatchTree>),
}

/// The limit surface of a face, evaluated in precision `R`.
///
/// The result rows passed to [`evaluate`](Self::evaluate) and
/// [`evaluate_stencil`](Self::evaluate_stencil) select what is computed:
///
/// | Rows | Results                                    |
/// |------|--------------------------------------------|
/// | 1    | position                                   |
/// | 3    | position, `∂/∂u`, `∂/∂v`                   |
/// | 6    | position, `∂/∂u`, `∂/∂v`, `∂²/∂u²`, `∂²/∂u∂v`, `∂²/∂v²` |
///
/// # Preconditions
///
/// Coordinates must lie in the domain of the face's
/// [`Parameterization`] and all buffers must be large enough for the
/// points they are described to hold. Evaluation does not check either;
/// violations panic on out of bounds access or produce meaningless
/// results.
///
/// # Examples
///
/// A bilinear quad:
///
/// ```
/// use opensubdiv_bfr::{
///     bfr::{Parameterization, PointDescriptor, Surface},
///     far::PatchType,
///     sdc::Scheme,
///     Index,
/// };
///
/// let param = Parameterization::new(Scheme::Bilinear, 4)?;
/// let surface = Surface::<f32>::regular(
///     param,
///     (0..4u32).map(Index).collect(),
///     PatchType::Quads,
///     0,
/// )?;
///
/// let mesh = [0.0, 0.0, 0.0, 2.0, 0.0, 0.0, 2.0, 2.0, 0.0, 0.0, 2.0, 0.0f32];
/// let desc = PointDescriptor::new(3);
///
/// let mut patch_points = vec![0.0f32; surface.patch_point_count() * 3];
/// surface.prepare_patch_points(&mesh, desc, &mut patch_points, desc);
///
/// let mut position = [0.0f32; 3];
/// surface.evaluate_position([0.25, 0.5], &patch_points, desc, &mut position);
/// assert_eq!(position, [0.5, 1.0, 0.0]);
/// # Ok::<(), opensubdiv_bfr::Error>(())
/// ```
#[derive(Clone, Debug)]
pub struct Surface<R: Real> {
    cv_indices: Vec<Index>,
    param: Parameterization,
    strategy: Strategy,
    _precision: PhantomData<R>,
}

impl<R: Real> Surface<R> {
    /// A face that is a single regular patch of `patch_type`.
    ///
    /// `cv_indices` are the mesh indices of the patch's control points, in
    /// the order of the patch type. `boundary_mask` is the boundary mask of
    /// the patch (see [`PatchParam::boundary`]); it is ignored by types
    /// without boundary handling.
    pub fn regular(
        param: Parameterization,
        cv_indices: Vec<Index>,
        patch_type: PatchType,
        boundary_mask: u32,
    ) -> Result<Self> {
        let descriptor = PatchDescriptor::new(patch_type);
        if !descriptor.is_evaluable() {
            return Err(Error::UnsupportedPatchType(patch_type));
        }
        let triangular = param.kind() == ParameterizationType::Tri;
        if param.has_sub_faces() || descriptor.is_triangular() != triangular {
            return Err(Error::InvalidPatch(format!(
                "{patch_type:?} patch for a {:?} parameterization",
                param.kind()
            )));
        }
        Error::check_buffer_size(descriptor.control_vertices_len(), cv_indices.len())?;

        let patch_param = PatchParam::try_new(PatchParamFields {
            boundary: boundary_mask,
            regular: true,
            ..Default::default()
        })?;

        Ok(Self {
            cv_indices,
            param,
            strategy: Strategy::Regular {
                patch_type,
                param: patch_param,
            },
            _precision: PhantomData,
        })
    }

    /// An N-sided face evaluated as N bilinear sub-faces.
    ///
    /// `cv_indices` are the mesh indices of the face-vertices.
    pub fn multi_linear(param: Parameterization, cv_indices: Vec<Index>) -> Result<Self> {
        if !param.has_sub_faces() {
            return Err(Error::InvalidPatch(format!(
                "multi-linear surface for a {:?} parameterization",
                param.kind()
            )));
        }
        Error::check_buffer_size(param.face_size(), cv_indices.len())?;

        Ok(Self {
            cv_indices,
            param,
            strategy: Strategy::MultiLinear,
            _precision: PhantomData,
        })
    }

    /// A face represented by the patches of `tree`.
    ///
    /// `cv_indices` are the mesh indices of the control points the tree's
    /// stencils refer to.
    pub fn irregular(
        param: Parameterization,
        cv_indices: Vec<Index>,
        tree: Arc<PatchTree>,
    ) -> Result<Self> {
        Error::check_buffer_size(tree.control_point_count(), cv_indices.len())?;

        let sub_faces = if param.has_sub_faces() {
            param.face_size()
        } else {
            0
        };
        if tree.sub_face_count() != sub_faces {
            return Err(Error::InvalidTopology(format!(
                "patch tree with {} sub-faces for a face with {sub_faces}",
                tree.sub_face_count()
            )));
        }
        if tree.patches_are_triangular() != (param.kind() == ParameterizationType::Tri) {
            return Err(Error::InvalidPatch(format!(
                "{:?} patch tree for a {:?} parameterization",
                tree.regular_patch_type(),
                param.kind()
            )));
        }

        Ok(Self {
            cv_indices,
            param,
            strategy: Strategy::Irregular(tree),
            _precision: PhantomData,
        })
    }

    #[inline]
    pub fn parameterization(&self) -> Parameterization {
        self.param
    }

    #[inline]
    pub fn face_size(&self) -> usize {
        self.param.face_size()
    }

    #[inline]
    pub fn is_regular(&self) -> bool {
        matches!(self.strategy, Strategy::Regular { .. })
    }

    #[inline]
    pub fn is_linear(&self) -> bool {
        matches!(self.strategy, Strategy::MultiLinear)
    }

    /// Whether the surface evaluates in double precision.
    #[inline]
    pub fn is_double(&self) -> bool {
        R::IS_DOUBLE
    }

    /// The patch tree of an irregular surface.
    pub fn patch_tree(&self) -> Option<&Arc<PatchTree>> {
        match &self.strategy {
            Strategy::Irregular(tree) => Some(tree),
            _ => None,
        }
    }

    #[inline]
    pub fn control_point_count(&self) -> usize {
        self.cv_indices.len()
    }

    #[inline]
    pub fn control_point_indices(&self) -> &[Index] {
        &self.cv_indices
    }

    /// Copy the control point indices into `indices`, returning their
    /// number.
    pub fn copy_control_point_indices(&self, indices: &mut [Index]) -> usize {
        let n = self.cv_indices.len();
        indices[..n].copy_from_slice(&self.cv_indices);
        n
    }

    /// Number of patch points: the control points followed by the points
    /// computed from them.
    pub fn patch_point_count(&self) -> usize {
        match &self.strategy {
            Strategy::Regular { .. } => self.control_point_count(),
            // Face center and edge midpoints.
            Strategy::MultiLinear => 2 * self.control_point_count() + 1,
            Strategy::Irregular(tree) => tree.point_total_count(),
        }
    }

    /// Copy the control points of the face from `mesh_points` into
    /// consecutive points of `control_points`, converting precision.
    pub fn gather_control_points<M: Real>(
        &self,
        mesh_points: &[M],
        mesh_desc: PointDescriptor,
        control_points: &mut [R],
        control_desc: PointDescriptor,
    ) {
        debug_assert_eq!(mesh_desc.size, control_desc.size);
        copy_consecutive(
            mesh_points,
            mesh_desc,
            &self.cv_indices,
            control_points,
            control_desc.stride,
        );
    }

    /// Axis-aligned bounds of the gathered control points.
    pub fn bound_control_points(
        &self,
        control_points: &[R],
        desc: PointDescriptor,
        min: &mut [R],
        max: &mut [R],
    ) {
        bound_points(control_points, desc, 0..self.control_point_count(), min, max);
    }

    /// Axis-aligned bounds of the control points, read from the mesh.
    pub fn bound_control_points_from_mesh<M: Real>(
        &self,
        mesh_points: &[M],
        desc: PointDescriptor,
        min: &mut [M],
        max: &mut [M],
    ) {
        bound_points(
            mesh_points,
            desc,
            self.cv_indices.iter().map(|&i| usize::from(i)),
            min,
            max,
        );
    }

    /// Gather the control points and compute the remaining patch points.
    ///
    /// `patch_points` must hold
    /// [`patch_point_count`](Self::patch_point_count) points.
    pub fn prepare_patch_points<M: Real>(
        &self,
        mesh_points: &[M],
        mesh_desc: PointDescriptor,
        patch_points: &mut [R],
        patch_desc: PointDescriptor,
    ) {
        self.gather_control_points(mesh_points, mesh_desc, patch_points, patch_desc);
        self.compute_patch_points(patch_points, patch_desc);
    }

    /// Compute the patch points following the control points, which must
    /// already be in place at the start of `patch_points`.
    pub fn compute_patch_points(&self, patch_points: &mut [R], desc: PointDescriptor) {
        let ncp = self.control_point_count();
        match &self.strategy {
            Strategy::Regular { .. } => {}
            Strategy::MultiLinear => {
                let (control, derived) = patch_points.split_at_mut(ncp * desc.stride);
                split_face(control, desc, ncp, derived);
            }
            Strategy::Irregular(tree) => {
                if tree.sub_patch_point_count() == 0 {
                    return;
                }
                let matrix = tree.stencil_matrix();
                let weights = match matrix.as_slice::<R>() {
                    Some(weights) => Cow::Borrowed(weights),
                    None => Cow::Owned(matrix.to_vec::<R>()),
                };
                let (control, derived) = patch_points.split_at_mut(ncp * desc.stride);
                combine_consecutive(control, desc, ncp, &weights, derived);
            }
        }
    }

    /// Evaluate the basis at `uv`, returning the points it applies to.
    fn evaluate_basis(
        &self,
        uv: [R; 2],
        derivatives: Derivatives,
        weights: &mut BasisWeights<R>,
    ) -> Support<'_> {
        match &self.strategy {
            Strategy::Regular { patch_type, param } => {
                let n = evaluate_patch_basis_normalized(
                    *patch_type,
                    param,
                    uv[0],
                    uv[1],
                    derivatives,
                    weights,
                );
                Support::Consecutive(n)
            }
            Strategy::MultiLinear => {
                let sub_face = self.evaluate_multi_linear_basis(uv, derivatives, weights);
                let n = self.control_point_count();
                Support::Quad([
                    Index::from(sub_face),
                    Index::from(n + 1 + sub_face),
                    Index::from(n),
                    Index::from(n + 1 + (sub_face + n - 1) % n),
                ])
            }
            Strategy::Irregular(tree) => {
                let (sub_face, [u, v]) = self.irregular_coord(uv);
                let patch = tree.find_sub_patch(u, v, sub_face, None);
                tree.eval_sub_patch_basis(patch, u, v, derivatives, weights);
                Support::Indexed(tree.sub_patch_points(patch))
            }
        }
    }

    #[inline]
    fn irregular_coord(&self, uv: [R; 2]) -> (usize, [R; 2]) {
        if self.param.has_sub_faces() {
            self.param.convert_coord_to_normalized_sub_face(uv)
        } else {
            (0, uv)
        }
    }

    /// Bilinear weights of the sub-face containing `uv`, with derivatives
    /// with respect to the face parameterization.
    fn evaluate_multi_linear_basis(
        &self,
        uv: [R; 2],
        derivatives: Derivatives,
        weights: &mut BasisWeights<R>,
    ) -> usize {
        let (sub_face, [u, v]) = self.param.convert_coord_to_normalized_sub_face(uv);
        let n = evaluate_patch_basis_normalized(
            PatchType::Quads,
            &PatchParam::default(),
            u,
            v,
            derivatives,
            weights,
        );
        // Sub-faces span half a unit.
        let two = R::ONE + R::ONE;
        if derivatives.has_first() {
            weights.scale_rows(1..3, n, two);
            if derivatives.has_second() {
                weights.scale_rows(3..6, n, two * two);
            }
        }
        sub_face
    }

    /// Evaluate position and, depending on the number of `results` rows,
    /// derivatives at `uv`.
    ///
    /// `patch_points` are the points prepared with
    /// [`prepare_patch_points`](Self::prepare_patch_points).
    pub fn evaluate(
        &self,
        uv: [R; 2],
        patch_points: &[R],
        desc: PointDescriptor,
        results: &mut [&mut [R]],
    ) {
        let derivatives = Derivatives::fitting(results.len());
        let mut weights = BasisWeights::default();
        let support = self.evaluate_basis(uv, derivatives, &mut weights);
        let sources = support.sources();
        let n = sources.len();
        let rows = weights.rows();

        match derivatives {
            Derivatives::None => {
                combine1(patch_points, desc, sources, &rows[0][..n], &mut *results[0]);
            }
            Derivatives::First => {
                let [p, du, dv, ..] = results else {
                    return;
                };
                combine3(
                    patch_points,
                    desc,
                    sources,
                    [&rows[0][..n], &rows[1][..n], &rows[2][..n]],
                    [&mut **p, &mut **du, &mut **dv],
                );
            }
            Derivatives::Second => {
                let weights: [&[R]; 6] = std::array::from_fn(|k| &rows[k][..n]);
                combine_multiple(patch_points, desc, sources, &weights, &mut results[..6]);
            }
        }
    }

    pub fn evaluate_position(
        &self,
        uv: [R; 2],
        patch_points: &[R],
        desc: PointDescriptor,
        position: &mut [R],
    ) {
        self.evaluate(uv, patch_points, desc, &mut [position]);
    }

    pub fn evaluate_derivatives(
        &self,
        uv: [R; 2],
        patch_points: &[R],
        desc: PointDescriptor,
        position: &mut [R],
        du: &mut [R],
        dv: &mut [R],
    ) {
        self.evaluate(uv, patch_points, desc, &mut [position, du, dv]);
    }

    #[allow(clippy::too_many_arguments)]
    pub fn evaluate_second_derivatives(
        &self,
        uv: [R; 2],
        patch_points: &[R],
        desc: PointDescriptor,
        position: &mut [R],
        du: &mut [R],
        dv: &mut [R],
        duu: &mut [R],
        duv: &mut [R],
        dvv: &mut [R],
    ) {
        self.evaluate(
            uv,
            patch_points,
            desc,
            &mut [position, du, dv, duu, duv, dvv],
        );
    }

    /// Position and all derivatives of a surface with three component
    /// points.
    pub fn evaluate_point(&self, uv: [R; 2], patch_points: &[[R; 3]]) -> PatchEvalResult<R> {
        let mut result = PatchEvalResult::default();
        let PatchEvalResult {
            point,
            du,
            dv,
            duu,
            duv,
            dvv,
        } = &mut result;
        let mut rows: [&mut [R]; 6] = [point, du, dv, duu, duv, dvv];
        self.evaluate(
            uv,
            bytemuck::cast_slice(patch_points),
            PointDescriptor::new(3),
            &mut rows,
        );
        result
    }

    /// Evaluate the positions at all `uvs` into consecutive, tightly
    /// packed points of `positions`.
    ///
    /// Runs in parallel with the `rayon` feature.
    pub fn evaluate_positions(
        &self,
        uvs: &[[R; 2]],
        patch_points: &[R],
        desc: PointDescriptor,
        positions: &mut [R],
    ) {
        debug_assert!(positions.len() >= uvs.len() * desc.size);

        #[cfg(feature = "rayon")]
        {
            positions
                .par_chunks_mut(desc.size)
                .zip(uvs.par_iter())
                .for_each(|(position, &uv)| {
                    self.evaluate(uv, patch_points, desc, &mut [position]);
                });
        }

        #[cfg(not(feature = "rayon"))]
        {
            positions
                .chunks_mut(desc.size)
                .zip(uvs)
                .for_each(|(position, &uv)| {
                    self.evaluate(uv, patch_points, desc, &mut [position]);
                });
        }
    }

    /// Evaluate the weights of the control points for the limit at `uv`.
    ///
    /// Each row of `stencils` needs room for
    /// [`control_point_count`](Self::control_point_count) weights. Returns
    /// the number of weights per row.
    pub fn evaluate_stencil(&self, uv: [R; 2], stencils: &mut [&mut [R]]) -> usize {
        let derivatives = Derivatives::fitting(stencils.len());
        let rows = &mut stencils[..derivatives.len()];

        match &self.strategy {
            Strategy::Regular { .. } => {
                let mut weights = BasisWeights::default();
                let n = match self.evaluate_basis(uv, derivatives, &mut weights) {
                    Support::Consecutive(n) => n,
                    _ => 0,
                };
                for (row, w) in rows.iter_mut().zip(weights.rows()) {
                    row[..n].copy_from_slice(&w[..n]);
                }
                n
            }
            Strategy::MultiLinear => {
                let mut weights = BasisWeights::default();
                let origin = self.evaluate_multi_linear_basis(uv, derivatives, &mut weights);
                let n = self.control_point_count();
                let next = (origin + 1) % n;
                let prev = (origin + n - 1) % n;

                for (row, w) in rows.iter_mut().zip(weights.rows()) {
                    let [w_origin, w_next, w_center, w_prev] = linear_quad_stencil(
                        [w[0], w[1], w[2], w[3]],
                        n,
                    );
                    for (i, s) in row[..n].iter_mut().enumerate() {
                        *s = if i == origin {
                            w_origin
                        } else if i == next {
                            w_next
                        } else if i == prev {
                            w_prev
                        } else {
                            w_center
                        };
                    }
                }
                n
            }
            Strategy::Irregular(tree) => {
                let (sub_face, [u, v]) = self.irregular_coord(uv);
                let patch = tree.find_sub_patch(u, v, sub_face, None);
                tree.eval_sub_patch_stencils(patch, u, v, rows)
            }
        }
    }

    /// Apply a stencil to the gathered control points.
    pub fn apply_stencil(
        &self,
        stencil: &[R],
        control_points: &[R],
        desc: PointDescriptor,
        result: &mut [R],
    ) {
        let n = self.control_point_count();
        combine1(
            control_points,
            desc,
            Sources::Consecutive(n),
            &stencil[..n],
            result,
        );
    }

    /// Apply a stencil to the control points, read from the mesh.
    pub fn apply_stencil_from_mesh(
        &self,
        stencil: &[R],
        mesh_points: &[R],
        desc: PointDescriptor,
        result: &mut [R],
    ) {
        combine1(
            mesh_points,
            desc,
            Sources::Indexed(&self.cv_indices),
            &stencil[..self.cv_indices.len()],
            result,
        );
    }
}

/// The patch points a basis applies to.
enum Support<'a> {
    Consecutive(usize),
    Indexed(&'a [Index]),
    Quad([Index; 4]),
}

impl Support<'_> {
    fn sources(&self) -> Sources<'_> {
        match self {
            Support::Consecutive(n) => Sources::Consecutive(*n),
            Support::Indexed(indices) => Sources::Indexed(indices),
            Support::Quad(indices) => Sources::Indexed(indices),
        }
    }
}

/// Distribute the weights of a bilinear sub-face `[origin, next edge
/// midpoint, center, previous edge midpoint]` over the face-vertices.
///
/// Returns the weights of the origin, the next vertex, every vertex not
/// adjacent to the origin, and the previous vertex.
fn linear_quad_stencil<R: Real>(w: [R; 4], face_size: usize) -> [R; 4] {
    let origin = w[0];
    let next = w[1] * R::HALF;
    let center = w[2] / R::from_usize(face_size);
    let prev = w[3] * R::HALF;

    [
        center + next + prev + origin,
        center + next,
        center,
        center + prev,
    ]
}

fn bound_points<T: Real>(
    points: &[T],
    desc: PointDescriptor,
    indices: impl Iterator<Item = usize>,
    min: &mut [T],
    max: &mut [T],
) {
    let n = desc.size;
    let mut first = true;
    for index in indices {
        let start = index * desc.stride;
        let point = &points[start..start + n];
        if first {
            min[..n].copy_from_slice(point);
            max[..n].copy_from_slice(point);
            first = false;
            continue;
        }
        for k in 0..n {
            min[k] = min[k].min(point[k]);
            max[k] = max[k].max(point[k]);
        }
    }
}
