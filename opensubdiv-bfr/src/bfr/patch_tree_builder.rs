//! Assembly of a [`PatchTree`] from the patches of a refined face.
use crate::{
    bfr::{PatchId, PatchTree, StencilMatrix},
    far::{PatchDescriptor, PatchParam, PatchType},
    Error, Index, Result,
};
use log::debug;
use std::sync::Arc;

/// Options for a [`PatchTreeBuilder`].
///
/// Uses the [init struct pattern](https://xaeroxe.github.io/init-struct-pattern/).
///
/// | Field                      | Default        |
/// |----------------------------|----------------|
/// | `regular_patch_type`       | `Regular`      |
/// | `irregular_patch_type`     | `GregoryBasis` |
/// | `include_interior_patches` | `false`        |
/// | `sub_face_count`           | `0`            |
/// | `control_point_count`      | `0`            |
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct PatchTreeOptions {
    /// Type of the patches flagged regular in their [`PatchParam`].
    pub regular_patch_type: PatchType,
    /// Type of all other patches.
    pub irregular_patch_type: PatchType,
    /// Patches are given for interior nodes too, not just the leaves.
    pub include_interior_patches: bool,
    /// Number of sub-faces the face was split into; 0 if it was not.
    pub sub_face_count: usize,
    /// Number of control points of the face.
    pub control_point_count: usize,
}

impl Default for PatchTreeOptions {
    fn default() -> Self {
        Self {
            regular_patch_type: PatchType::Regular,
            irregular_patch_type: PatchType::GregoryBasis,
            include_interior_patches: false,
            sub_face_count: 0,
            control_point_count: 0,
        }
    }
}

/// Collects the patches and stencils of a face and publishes them as an
/// immutable, shareable [`PatchTree`].
///
/// # Examples
///
/// A quad refined once into four bilinear patches. Patch points past the
/// four control points are computed by the stencil matrix (here the edge
/// midpoints and the center).
///
/// ```
/// use opensubdiv_bfr::{
///     bfr::{PatchTreeBuilder, PatchTreeOptions},
///     far::{PatchParam, PatchParamFields, PatchType},
///     Index,
/// };
///
/// let mut builder = PatchTreeBuilder::new(PatchTreeOptions {
///     regular_patch_type: PatchType::Quads,
///     irregular_patch_type: PatchType::Quads,
///     control_point_count: 4,
///     ..Default::default()
/// })?;
///
/// // Points 4..=7: edge midpoints, 8: center.
/// #[rustfmt::skip]
/// let matrix = vec![
///     0.5f32, 0.5, 0.0, 0.0,
///     0.0, 0.5, 0.5, 0.0,
///     0.0, 0.0, 0.5, 0.5,
///     0.5, 0.0, 0.0, 0.5,
///     0.25, 0.25, 0.25, 0.25,
/// ];
/// builder.set_stencil_matrix(matrix);
///
/// let quadrants = [[0, 4, 8, 7], [4, 1, 5, 8], [8, 5, 2, 6], [7, 8, 6, 3]];
/// for (i, points) in quadrants.iter().enumerate() {
///     let param = PatchParam::new(PatchParamFields {
///         u: (i == 1 || i == 2) as u32,
///         v: (i >= 2) as u32,
///         depth: 1,
///         regular: true,
///         ..Default::default()
///     });
///     let points: Vec<Index> = points.iter().map(|&p| Index(p)).collect();
///     builder.add_patch(param, &points)?;
/// }
///
/// let tree = builder.build()?;
/// assert_eq!(tree.patch_count(), 4);
/// assert_eq!(tree.point_total_count(), 9);
/// assert_eq!(tree.depth(), 1);
/// # Ok::<(), opensubdiv_bfr::Error>(())
/// ```
#[derive(Clone, Debug)]
pub struct PatchTreeBuilder {
    options: PatchTreeOptions,
    reg_patch_size: usize,
    irreg_patch_size: usize,
    patch_point_stride: usize,
    patch_points: Vec<Index>,
    patch_params: Vec<PatchParam>,
    stencil_matrix: StencilMatrix,
}

impl PatchTreeBuilder {
    pub fn new(options: PatchTreeOptions) -> Result<Self> {
        let regular = PatchDescriptor::new(options.regular_patch_type);
        let irregular = PatchDescriptor::new(options.irregular_patch_type);

        for descriptor in [regular, irregular] {
            if !descriptor.is_evaluable() {
                return Err(Error::UnsupportedPatchType(descriptor.patch_type()));
            }
        }
        if regular.is_triangular() != irregular.is_triangular() {
            return Err(Error::InvalidPatch(format!(
                "{:?} and {:?} patches can not be mixed",
                options.regular_patch_type, options.irregular_patch_type
            )));
        }
        if options.control_point_count == 0 {
            return Err(Error::InvalidTopology("face without control points".into()));
        }
        if options.sub_face_count > 0 && regular.is_triangular() {
            return Err(Error::InvalidTopology(
                "triangular patches can not have sub-faces".into(),
            ));
        }

        let reg_patch_size = regular.control_vertices_len();
        let irreg_patch_size = irregular.control_vertices_len();

        Ok(Self {
            options,
            reg_patch_size,
            irreg_patch_size,
            patch_point_stride: reg_patch_size.max(irreg_patch_size),
            patch_points: Vec::new(),
            patch_params: Vec::new(),
            stencil_matrix: StencilMatrix::default(),
        })
    }

    /// Add a patch; its type is chosen by [`PatchParam::is_regular`].
    ///
    /// Patches of interior nodes must only be added with
    /// [`include_interior_patches`](PatchTreeOptions::include_interior_patches).
    pub fn add_patch(&mut self, param: PatchParam, points: &[Index]) -> Result<PatchId> {
        let size = if param.is_regular() {
            self.reg_patch_size
        } else {
            self.irreg_patch_size
        };
        Error::check_buffer_size(size, points.len())?;

        let id = PatchId(self.patch_params.len());
        self.patch_points.extend_from_slice(points);
        self.patch_points
            .resize(self.patch_points.len() + self.patch_point_stride - size, Index(0));
        self.patch_params.push(param);
        Ok(id)
    }

    /// Set the stencils of the sub-patch points, one row of
    /// [`control_point_count`](PatchTreeOptions::control_point_count)
    /// weights each. The precision of the matrix is that of the tree.
    pub fn set_stencil_matrix(&mut self, matrix: impl Into<StencilMatrix>) {
        self.stencil_matrix = matrix.into();
    }

    /// Build the quadtrees and publish the tree.
    pub fn build(self) -> Result<Arc<PatchTree>> {
        let Self {
            options,
            reg_patch_size,
            irreg_patch_size,
            patch_point_stride,
            patch_points,
            patch_params,
            stencil_matrix,
        } = self;

        if patch_params.is_empty() {
            return Err(Error::InvalidTopology("patch tree without patches".into()));
        }
        let ncp = options.control_point_count;

        let mut tree = PatchTree::default();
        tree.patches_include_non_leaf = options.include_interior_patches;
        tree.patches_are_triangular =
            PatchDescriptor::new(options.regular_patch_type).is_triangular();
        tree.reg_patch_type = options.regular_patch_type;
        tree.irreg_patch_type = options.irregular_patch_type;
        tree.reg_patch_size = reg_patch_size;
        tree.irreg_patch_size = irreg_patch_size;
        tree.patch_point_stride = patch_point_stride;
        tree.num_sub_faces = options.sub_face_count;
        tree.num_control_points = ncp;
        tree.num_sub_patch_points = stencil_matrix.len() / ncp;
        tree.num_irreg_patches = patch_params.iter().filter(|p| !p.is_regular()).count();
        tree.patch_points = patch_points;
        tree.patch_params = patch_params;
        tree.stencil_matrix = stencil_matrix;
        tree.build_quadtree()?;

        #[cfg(feature = "topology_validation")]
        validate(&tree)?;

        debug!(
            "Built patch tree: {} patches ({} irregular), depth {}, {} nodes, {} sub-faces, {} sub-patch points, {} precision",
            tree.patch_count(),
            tree.irregular_patch_count(),
            tree.depth(),
            tree.node_count(),
            tree.sub_face_count(),
            tree.sub_patch_point_count(),
            if tree.uses_double_precision() { "double" } else { "single" },
        );
        Ok(Arc::new(tree))
    }
}

#[cfg(feature = "topology_validation")]
fn validate(tree: &PatchTree) -> Result<()> {
    let ncp = tree.control_point_count();
    let matrix_len = tree.stencil_matrix().len();
    if matrix_len % ncp != 0 {
        return Err(Error::InvalidBufferSize {
            expected: tree.sub_patch_point_count() * ncp,
            actual: matrix_len,
        });
    }

    let point_total = tree.point_total_count();
    for patch in 0..tree.patch_count() {
        for &point in tree.sub_patch_points(PatchId(patch)) {
            Error::check_index(point.into(), point_total)?;
        }
    }

    tree.validate_quadtree()
}
