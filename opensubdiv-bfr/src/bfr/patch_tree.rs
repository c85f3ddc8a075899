//! Hierarchy of the patches of an irregular face.
//!
//! The limit surface of a face that is not a single regular patch is
//! represented by the patches of its adaptive refinement. A [`PatchTree`]
//! holds those patches, a quadtree per (sub-)face to locate the patch
//! containing a parametric coordinate, and the stencil matrix expressing
//! the points of refined patches in terms of the control points of the
//! face.
//!
//! Patch points are numbered over the control points of the face first,
//! followed by the points the stencil matrix computes ("sub-patch
//! points"). A point index below [`control_point_count`] refers to a
//! control point, any other to row `index - control_point_count` of the
//! stencil matrix.
//!
//! Trees are assembled with a
//! [`PatchTreeBuilder`](crate::bfr::PatchTreeBuilder) and immutable once
//! built, so they can be shared between surfaces.
//!
//! [`control_point_count`]: PatchTree::control_point_count
use crate::{
    far::{evaluate_patch_basis, BasisWeights, Derivatives, PatchParam, PatchType},
    Error, Index, Real, Result,
};
use derive_more::{Display, From, Into};
use log::{trace, warn};

/// Index of a patch in a [`PatchTree`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, From, Into, Display)]
pub struct PatchId(pub usize);

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
struct NodeId(usize);

/// A quadrant of a tree node.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
enum Child {
    #[default]
    Empty,
    Leaf(PatchId),
    Node(NodeId),
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
struct TreeNode {
    /// Patch covering the whole node, if interior patches are kept or the
    /// node is a root without refinement.
    patch: Option<PatchId>,
    children: [Child; 4],
}

/// Dense matrix of stencil weights, one row of
/// [`control_point_count`](PatchTree::control_point_count) weights per
/// sub-patch point.
#[derive(Clone, Debug, PartialEq, From)]
pub enum StencilMatrix {
    Float(Vec<f32>),
    Double(Vec<f64>),
}

impl Default for StencilMatrix {
    fn default() -> Self {
        StencilMatrix::Float(Vec::new())
    }
}

impl StencilMatrix {
    pub fn is_double(&self) -> bool {
        matches!(self, StencilMatrix::Double(_))
    }

    /// Total number of weights.
    pub fn len(&self) -> usize {
        match self {
            StencilMatrix::Float(m) => m.len(),
            StencilMatrix::Double(m) => m.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The weights, if stored in precision `R`.
    pub fn as_slice<R: Real>(&self) -> Option<&[R]> {
        match self {
            StencilMatrix::Float(m) if !R::IS_DOUBLE => bytemuck::try_cast_slice(m).ok(),
            StencilMatrix::Double(m) if R::IS_DOUBLE => bytemuck::try_cast_slice(m).ok(),
            _ => None,
        }
    }

    /// The weights converted to precision `R`.
    pub fn to_vec<R: Real>(&self) -> Vec<R> {
        match self {
            StencilMatrix::Float(m) => m.iter().map(|&w| R::from_real(w)).collect(),
            StencilMatrix::Double(m) => m.iter().map(|&w| R::from_real(w)).collect(),
        }
    }

    /// `dst += weight * row`, for a row of `dst.len()` weights.
    #[inline]
    fn accumulate_row<R: Real>(&self, row: usize, weight: R, dst: &mut [R]) {
        let n = dst.len();
        match self {
            StencilMatrix::Float(m) => {
                for (d, &s) in dst.iter_mut().zip(&m[row * n..(row + 1) * n]) {
                    *d += weight * R::from_real(s);
                }
            }
            StencilMatrix::Double(m) => {
                for (d, &s) in dst.iter_mut().zip(&m[row * n..(row + 1) * n]) {
                    *d += weight * R::from_real(s);
                }
            }
        }
    }
}

/// Patches of the adaptive refinement of a face, with a quadtree per
/// (sub-)face to locate them.
#[derive(Clone, Debug, Default)]
pub struct PatchTree {
    pub(crate) patches_include_non_leaf: bool,
    pub(crate) patches_are_triangular: bool,

    pub(crate) reg_patch_type: PatchType,
    pub(crate) irreg_patch_type: PatchType,
    pub(crate) reg_patch_size: usize,
    pub(crate) irreg_patch_size: usize,
    pub(crate) patch_point_stride: usize,

    pub(crate) num_sub_faces: usize,
    pub(crate) num_control_points: usize,
    pub(crate) num_sub_patch_points: usize,
    pub(crate) num_irreg_patches: usize,

    pub(crate) patch_points: Vec<Index>,
    pub(crate) patch_params: Vec<PatchParam>,

    tree_nodes: Vec<TreeNode>,
    tree_depth: usize,

    pub(crate) stencil_matrix: StencilMatrix,
}

#[inline]
fn quad_quadrant<R: Real>(median: R, u: &mut R, v: &mut R) -> usize {
    let mut quadrant = 0;
    if *u >= median {
        *u -= median;
        quadrant |= 1;
    }
    if *v >= median {
        *v -= median;
        quadrant |= 2;
    }
    quadrant
}

/// Quadrant of a triangle split at its edge midpoints: 0, 1 and 3 at the
/// corners, 2 the rotated middle triangle. Coordinates are made local to
/// the quadrant, `rotated` tracks the orientation of the current
/// triangle.
#[inline]
fn tri_quadrant<R: Real>(median: R, u: &mut R, v: &mut R, rotated: &mut bool) -> usize {
    if !*rotated {
        if *u >= median {
            *u -= median;
            return 1;
        }
        if *v >= median {
            *v -= median;
            return 3;
        }
        if *u + *v >= median {
            *rotated = true;
            return 2;
        }
        0
    } else {
        if *u < median {
            *v -= median;
            return 1;
        }
        if *v < median {
            *u -= median;
            return 3;
        }
        *u -= median;
        *v -= median;
        if *u + *v < median {
            *rotated = false;
            return 2;
        }
        0
    }
}

impl PatchTree {
    /// Number of control points of the face.
    #[inline]
    pub fn control_point_count(&self) -> usize {
        self.num_control_points
    }

    /// Number of points computed from the control points by the stencil
    /// matrix.
    #[inline]
    pub fn sub_patch_point_count(&self) -> usize {
        self.num_sub_patch_points
    }

    /// Control points plus sub-patch points.
    #[inline]
    pub fn point_total_count(&self) -> usize {
        self.num_control_points + self.num_sub_patch_points
    }

    #[inline]
    pub fn patch_count(&self) -> usize {
        self.patch_params.len()
    }

    /// Number of irregular patches.
    #[inline]
    pub fn irregular_patch_count(&self) -> usize {
        self.num_irreg_patches
    }

    /// Deepest refinement level of any patch.
    #[inline]
    pub fn depth(&self) -> usize {
        self.tree_depth
    }

    /// Number of sub-faces, 0 if the face was not split.
    #[inline]
    pub fn sub_face_count(&self) -> usize {
        self.num_sub_faces
    }

    #[inline]
    pub fn uses_double_precision(&self) -> bool {
        self.stencil_matrix.is_double()
    }

    #[inline]
    pub fn patches_are_triangular(&self) -> bool {
        self.patches_are_triangular
    }

    /// Whether patches of interior nodes are kept, allowing searches
    /// limited in depth.
    #[inline]
    pub fn includes_interior_patches(&self) -> bool {
        self.patches_include_non_leaf
    }

    #[inline]
    pub fn regular_patch_type(&self) -> PatchType {
        self.reg_patch_type
    }

    #[inline]
    pub fn irregular_patch_type(&self) -> PatchType {
        self.irreg_patch_type
    }

    #[inline]
    pub fn stencil_matrix(&self) -> &StencilMatrix {
        &self.stencil_matrix
    }

    #[inline]
    pub fn sub_patch_param(&self, patch: PatchId) -> PatchParam {
        self.patch_params[patch.0]
    }

    #[inline]
    fn patch_type(&self, param: &PatchParam) -> PatchType {
        if param.is_regular() {
            self.reg_patch_type
        } else {
            self.irreg_patch_type
        }
    }

    /// Indices of the points of a patch.
    pub fn sub_patch_points(&self, patch: PatchId) -> &[Index] {
        let size = if self.patch_params[patch.0].is_regular() {
            self.reg_patch_size
        } else {
            self.irreg_patch_size
        };
        let start = patch.0 * self.patch_point_stride;
        &self.patch_points[start..start + size]
    }

    /// Locate the patch containing `(u, v)`.
    ///
    /// The coordinates are in the unit domain of `sub_face` (normalized
    /// sub-face coordinates for faces with sub-faces, face coordinates
    /// otherwise). `max_depth` limits the search when interior patches are
    /// kept and is ignored otherwise.
    ///
    /// A validated tree always yields a patch: every node is either a
    /// leaf or has all four quadrants, and every root has a patch or
    /// children. If a tree built without `topology_validation` has a hole,
    /// the patch of the deepest enclosing node that has one is returned,
    /// and the first patch of the tree if there is none.
    pub fn find_sub_patch<R: Real>(
        &self,
        u: R,
        v: R,
        sub_face: usize,
        max_depth: Option<usize>,
    ) -> PatchId {
        let mut node = &self.tree_nodes[sub_face];
        let root_depth = (self.num_sub_faces > 0) as usize;

        let max_depth = match max_depth {
            Some(depth) if self.patches_include_non_leaf => depth.min(self.tree_depth),
            _ => self.tree_depth,
        };

        let mut fallback = node.patch;
        let mut u = u;
        let mut v = v;
        let mut median = R::HALF;
        let mut rotated = false;

        for _ in root_depth + 1..=max_depth {
            let quadrant = if self.patches_are_triangular {
                tri_quadrant(median, &mut u, &mut v, &mut rotated)
            } else {
                quad_quadrant(median, &mut u, &mut v)
            };
            match node.children[quadrant] {
                Child::Leaf(patch) => return patch,
                Child::Node(child) => {
                    node = &self.tree_nodes[child.0];
                    fallback = node.patch.or(fallback);
                }
                Child::Empty => break,
            }
            median *= R::HALF;
        }
        let patch = node.patch.or(fallback);
        debug_assert!(patch.is_some(), "no patch at ({u:?}, {v:?}) of sub-face {sub_face}");
        patch.unwrap_or(PatchId(0))
    }

    /// Evaluate the basis of a patch at `(u, v)`, with derivatives with
    /// respect to the domain `(u, v)` is given in.
    pub fn eval_sub_patch_basis<R: Real>(
        &self,
        patch: PatchId,
        u: R,
        v: R,
        derivatives: Derivatives,
        weights: &mut BasisWeights<R>,
    ) -> usize {
        let param = self.patch_params[patch.0];
        evaluate_patch_basis(self.patch_type(&param), &param, u, v, derivatives, weights)
    }

    /// Evaluate the weights of the control points of the face for the
    /// limit at `(u, v)` of a patch.
    ///
    /// `stencils` holds one row of at least
    /// [`control_point_count`](Self::control_point_count) weights for the
    /// position and each derivative: 1, 3 or 6 rows.
    pub fn eval_sub_patch_stencils<R: Real>(
        &self,
        patch: PatchId,
        u: R,
        v: R,
        stencils: &mut [&mut [R]],
    ) -> usize {
        let derivatives = Derivatives::fitting(stencils.len());
        let rows = &mut stencils[..derivatives.len()];
        let ncp = self.num_control_points;

        let mut basis = BasisWeights::default();
        let n = self.eval_sub_patch_basis(patch, u, v, derivatives, &mut basis);
        let points = self.sub_patch_points(patch);

        // A patch on the control points themselves needs no stencils.
        if n == ncp && points.iter().enumerate().all(|(i, &p)| p.0 as usize == i) {
            for (row, weights) in rows.iter_mut().zip(basis.rows()) {
                row[..ncp].copy_from_slice(&weights[..ncp]);
            }
            return ncp;
        }

        for row in rows.iter_mut() {
            row[..ncp].fill(R::ZERO);
        }
        for (i, &point) in points.iter().enumerate() {
            let point = usize::from(point);
            for (row, weights) in rows.iter_mut().zip(basis.rows()) {
                if point < ncp {
                    row[point] += weights[i];
                } else {
                    self.stencil_matrix
                        .accumulate_row(point - ncp, weights[i], &mut row[..ncp]);
                }
            }
        }
        ncp
    }

    fn push_node(&mut self, patch: Option<PatchId>) -> NodeId {
        self.tree_nodes.push(TreeNode {
            patch,
            ..Default::default()
        });
        NodeId(self.tree_nodes.len() - 1)
    }

    /// Assign a patch to a quadrant of `node`: as a leaf if it is at the
    /// depth of the patch, otherwise as (or through) an interior node.
    /// Returns the node to continue from.
    fn assign_leaf_or_child_node(
        &mut self,
        node: NodeId,
        is_leaf: bool,
        quadrant: usize,
        patch: PatchId,
    ) -> NodeId {
        match self.tree_nodes[node.0].children[quadrant] {
            Child::Empty if is_leaf => {
                self.tree_nodes[node.0].children[quadrant] = Child::Leaf(patch);
                node
            }
            Child::Empty => {
                let child = self.push_node(None);
                self.tree_nodes[node.0].children[quadrant] = Child::Node(child);
                child
            }
            Child::Leaf(existing) if is_leaf => {
                warn!("Patches {existing} and {patch} cover the same quadrant, keeping {patch}");
                self.tree_nodes[node.0].children[quadrant] = Child::Leaf(patch);
                node
            }
            Child::Leaf(existing) => {
                trace!("Promoting leaf patch {existing} to an interior node");
                let child = self.push_node(Some(existing));
                self.tree_nodes[node.0].children[quadrant] = Child::Node(child);
                child
            }
            Child::Node(child) => {
                if is_leaf {
                    self.tree_nodes[child.0].patch = Some(patch);
                }
                child
            }
        }
    }

    /// Build the quadtrees from the patch params.
    ///
    /// Fails if a patch names a sub-face the tree does not have, or
    /// disagrees with the tree about being part of a sub-face.
    pub(crate) fn build_quadtree(&mut self) -> Result<()> {
        let root_count = self.num_sub_faces.max(1);
        self.tree_nodes.clear();
        self.tree_nodes.resize(root_count, TreeNode::default());
        self.tree_depth = 0;

        for index in 0..self.patch_params.len() {
            let patch = PatchId(index);
            let param = self.patch_params[index];

            if param.non_quad_root() != (self.num_sub_faces > 0) {
                return Err(Error::InvalidPatch(format!(
                    "patch of face {} disagrees with the sub-face count {}",
                    param.face_id(),
                    self.num_sub_faces
                )));
            }
            let sub_face = if self.num_sub_faces > 0 {
                Error::check_index(param.face_id() as usize, self.num_sub_faces)?;
                param.face_id() as usize
            } else {
                0
            };

            let depth = param.depth() as usize;
            let root_depth = param.non_quad_root() as usize;
            let mut node = NodeId(sub_face);
            self.tree_depth = self.tree_depth.max(depth);

            if depth <= root_depth {
                self.tree_nodes[sub_face].patch = Some(patch);
                continue;
            }

            if !self.patches_are_triangular {
                for level in root_depth + 1..=depth {
                    let u_bit = (param.u() >> (depth - level)) & 1;
                    let v_bit = (param.v() >> (depth - level)) & 1;
                    let quadrant = ((v_bit << 1) | u_bit) as usize;
                    node = self.assign_leaf_or_child_node(node, level == depth, quadrant, patch);
                }
            } else {
                // Walk down with a point inside the patch.
                let (mut u, mut v) = param.unnormalize_triangle(0.25f64, 0.25);
                let mut median = 0.5;
                let mut rotated = false;
                for level in root_depth + 1..=depth {
                    let quadrant = tri_quadrant(median, &mut u, &mut v, &mut rotated);
                    node = self.assign_leaf_or_child_node(node, level == depth, quadrant, patch);
                    median *= 0.5;
                }
            }
        }
        Ok(())
    }

    /// Check that every node either has a patch and no children, or all
    /// four children.
    pub(crate) fn validate_quadtree(&self) -> Result<()> {
        let root_count = self.num_sub_faces.max(1);
        for sub_face in 0..root_count {
            let mut stack = vec![NodeId(sub_face)];
            while let Some(node) = stack.pop() {
                let node = &self.tree_nodes[node.0];
                let set = node
                    .children
                    .iter()
                    .filter(|child| **child != Child::Empty)
                    .count();
                let complete = match set {
                    0 => node.patch.is_some(),
                    4 => true,
                    _ => false,
                };
                if !complete {
                    return Err(Error::IncompleteQuadtree { sub_face });
                }
                stack.extend(node.children.iter().filter_map(|child| match child {
                    Child::Node(id) => Some(*id),
                    _ => None,
                }));
            }
        }
        Ok(())
    }

    /// Number of nodes of all quadtrees.
    pub(crate) fn node_count(&self) -> usize {
        self.tree_nodes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quad_quadrants() {
        let (mut u, mut v) = (0.75f64, 0.25);
        assert_eq!(quad_quadrant(0.5, &mut u, &mut v), 1);
        assert_eq!((u, v), (0.25, 0.25));

        let (mut u, mut v) = (0.25f64, 0.5);
        assert_eq!(quad_quadrant(0.5, &mut u, &mut v), 2);
        assert_eq!((u, v), (0.25, 0.0));
    }

    #[test]
    fn tri_quadrants() {
        let mut rotated = false;
        let (mut u, mut v) = (0.3f64, 0.3);
        assert_eq!(tri_quadrant(0.5, &mut u, &mut v, &mut rotated), 2);
        assert!(rotated);

        // Inside the rotated middle triangle, its corner quadrants sit
        // opposite the corners of the parent.
        let (mut u, mut v) = (0.3f64, 0.45);
        assert_eq!(tri_quadrant(0.25, &mut u, &mut v, &mut rotated), 0);
        assert!(rotated);
    }

    #[test]
    fn stencil_matrix_precision() {
        let matrix = StencilMatrix::from(vec![0.5f32, 0.25]);
        assert!(!matrix.is_double());
        assert_eq!(matrix.as_slice::<f32>(), Some(&[0.5f32, 0.25][..]));
        assert!(matrix.as_slice::<f64>().is_none());
        assert_eq!(matrix.to_vec::<f64>(), vec![0.5, 0.25]);
    }
}
