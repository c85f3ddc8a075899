//! Tests for patch trees and their builder.


use opensubdiv_bfr::bfr::*;
use opensubdiv_bfr::far::*;
use opensubdiv_bfr::{Error, Index};
use std::sync::Arc;
use test_utils::*;

/// A triangle split once at its edge midpoints into four linear
/// triangles, the middle one rotated.
fn split_triangle_tree() -> anyhow::Result<Arc<PatchTree>> {
    let mut builder = PatchTreeBuilder::new(PatchTreeOptions {
        regular_patch_type: PatchType::Triangles,
        irregular_patch_type: PatchType::Triangles,
        control_point_count: 3,
        ..Default::default()
    })?;

    // Points 3, 4, 5: midpoints of the edges 0-1, 1-2 and 2-0.
    #[rustfmt::skip]
    let matrix = vec![
        0.5, 0.5, 0.0,
        0.0, 0.5, 0.5,
        0.5, 0.0, 0.5f64,
    ];
    builder.set_stencil_matrix(matrix);

    for ((u, v), points) in [
        ((0, 0), [0, 3, 5]),
        ((1, 0), [3, 1, 4]),
        ((0, 1), [5, 4, 2]),
        ((1, 1), [4, 5, 3]),
    ] {
        let param = PatchParam::new(PatchParamFields {
            u,
            v,
            depth: 1,
            regular: true,
            ..Default::default()
        });
        let points: Vec<Index> = points.iter().map(|&p| Index(p)).collect();
        builder.add_patch(param, &points)?;
    }
    Ok(builder.build()?)
}

#[test]
fn test_patch_tree_queries() -> anyhow::Result<()> {
    let tree = multi_linear_tree(5, true)?;
    assert_eq!(tree.control_point_count(), 5);
    assert_eq!(tree.sub_patch_point_count(), 45);
    assert_eq!(tree.point_total_count(), 50);
    assert_eq!(tree.patch_count(), 20);
    assert_eq!(tree.irregular_patch_count(), 0);
    assert_eq!(tree.depth(), 2);
    assert_eq!(tree.sub_face_count(), 5);
    assert!(tree.uses_double_precision());
    assert!(!tree.patches_are_triangular());
    assert!(!tree.includes_interior_patches());
    assert_eq!(tree.regular_patch_type(), PatchType::Quads);

    let param = tree.sub_patch_param(PatchId(6));
    assert_eq!(param.face_id(), 1);
    assert_eq!((param.u(), param.v()), (1, 1));
    assert_eq!(
        tree.sub_patch_points(PatchId(6)),
        &[Index(5 + 9 + 4), Index(5 + 9 + 5), Index(5 + 9 + 8), Index(5 + 9 + 7)]
    );

    let single = multi_linear_tree(3, false)?;
    assert!(!single.uses_double_precision());
    assert_eq!(single.stencil_matrix().len(), 27 * 3);
    Ok(())
}

#[test]
fn test_find_sub_patch_covers_every_sub_face() -> anyhow::Result<()> {
    let tree = multi_linear_tree(5, true)?;
    let steps = 8;

    for sub_face in 0..5 {
        for j in 0..=steps {
            for i in 0..=steps {
                let (u, v) = (i as f64 / steps as f64, j as f64 / steps as f64);
                let patch = tree.find_sub_patch(u, v, sub_face, None);
                let param = tree.sub_patch_param(patch);
                assert_eq!(param.face_id() as usize, sub_face);

                let (s, t) = param.normalize(u, v);
                assert!(
                    (0.0..=1.0).contains(&s) && (0.0..=1.0).contains(&t),
                    "({u}, {v}) on sub-face {sub_face} maps to ({s}, {t})"
                );
            }
        }
    }
    Ok(())
}

#[test]
fn test_find_sub_patch_with_interior_patches() -> anyhow::Result<()> {
    let tree = split_quad_tree(true)?;
    assert!(tree.includes_interior_patches());
    assert_eq!(tree.patch_count(), 5);

    assert_eq!(tree.find_sub_patch(0.75f64, 0.25, 0, Some(0)), PatchId(0));
    assert_eq!(tree.find_sub_patch(0.75f64, 0.25, 0, Some(1)), PatchId(2));
    assert_eq!(tree.find_sub_patch(0.75f64, 0.25, 0, None), PatchId(2));
    assert_eq!(tree.find_sub_patch(0.25f64, 0.75, 0, None), PatchId(4));

    // The limit is only honored with interior patches.
    let leaves = split_quad_tree(false)?;
    assert_eq!(leaves.find_sub_patch(0.75f64, 0.25, 0, Some(0)), PatchId(1));
    assert_eq!(leaves.find_sub_patch(0.75f64, 0.75, 0, None), PatchId(2));
    Ok(())
}

#[test]
fn test_find_sub_patch_in_triangles() -> anyhow::Result<()> {
    let tree = split_triangle_tree()?;
    assert!(tree.patches_are_triangular());

    assert_eq!(tree.find_sub_patch(0.1f64, 0.1, 0, None), PatchId(0));
    assert_eq!(tree.find_sub_patch(0.7f64, 0.1, 0, None), PatchId(1));
    assert_eq!(tree.find_sub_patch(0.1f64, 0.7, 0, None), PatchId(2));
    assert_eq!(tree.find_sub_patch(0.3f64, 0.3, 0, None), PatchId(3));
    assert_eq!(tree.find_sub_patch(0.3f32, 0.3, 0, None), PatchId(3));
    Ok(())
}

#[test]
fn test_triangle_stencils_are_barycentric() -> anyhow::Result<()> {
    let tree = split_triangle_tree()?;

    for (u, v) in [(0.3, 0.3), (0.1, 0.2), (0.6, 0.15), (0.2, 0.7)] {
        let patch = tree.find_sub_patch(u, v, 0, None);
        let mut rows = [[0.0f64; 3]; 3];
        let [p, du, dv] = &mut rows;
        let n = tree.eval_sub_patch_stencils(patch, u, v, &mut [&mut p[..], &mut du[..], &mut dv[..]]);
        assert_eq!(n, 3);

        assert_all_close(&rows[0], &[1.0 - u - v, u, v], EPSILON);
        assert_all_close(&rows[1], &[-1.0, 1.0, 0.0], EPSILON);
        assert_all_close(&rows[2], &[-1.0, 0.0, 1.0], EPSILON);
    }
    Ok(())
}

#[test]
fn test_stencils_of_control_point_patch_are_the_basis() -> anyhow::Result<()> {
    let mut builder = PatchTreeBuilder::new(PatchTreeOptions {
        control_point_count: 16,
        ..Default::default()
    })?;
    let param = PatchParam::new(PatchParamFields {
        regular: true,
        ..Default::default()
    });
    let points: Vec<Index> = (0..16u32).map(Index).collect();
    let patch = builder.add_patch(param, &points)?;
    let tree = builder.build()?;
    assert_eq!(tree.sub_patch_point_count(), 0);

    let (u, v) = (0.3f64, 0.6);
    let mut basis = BasisWeights::new();
    evaluate_patch_basis_normalized(PatchType::Regular, &param, u, v, Derivatives::Second, &mut basis);

    let mut stencils = vec![vec![0.0f64; 16]; 6];
    let mut rows: Vec<&mut [f64]> = stencils.iter_mut().map(|r| r.as_mut_slice()).collect();
    assert_eq!(tree.eval_sub_patch_stencils(patch, u, v, &mut rows), 16);

    for (stencil, weights) in stencils.iter().zip(basis.rows()) {
        assert_all_close(stencil, &weights[..16], EPSILON);
    }
    Ok(())
}

#[test]
fn test_split_quad_stencils_are_bilinear() -> anyhow::Result<()> {
    let tree = split_quad_tree(false)?;
    assert!(!tree.uses_double_precision());

    for (u, v) in unit_square_grid(4) {
        let patch = tree.find_sub_patch(u, v, 0, None);
        let mut rows = [[0.0f64; 4]; 6];
        let [p, du, dv, duu, duv, dvv] = &mut rows;
        tree.eval_sub_patch_stencils(
            patch,
            u,
            v,
            &mut [&mut p[..], &mut du[..], &mut dv[..], &mut duu[..], &mut duv[..], &mut dvv[..]],
        );

        let (uc, vc) = (1.0 - u, 1.0 - v);
        assert_all_close(&rows[0], &[uc * vc, u * vc, u * v, uc * v], EPSILON);
        assert_all_close(&rows[1], &[-vc, vc, v, -v], EPSILON);
        assert_all_close(&rows[2], &[-uc, -u, u, uc], EPSILON);
        assert_all_close(&rows[3], &[0.0; 4], EPSILON);
        assert_all_close(&rows[4], &[1.0, -1.0, 1.0, -1.0], EPSILON);
        assert_all_close(&rows[5], &[0.0; 4], EPSILON);
    }
    Ok(())
}

#[test]
fn test_sub_patch_basis_is_in_face_units() -> anyhow::Result<()> {
    let tree = multi_linear_tree(5, true)?;

    // A depth 2 patch of a sub-face spans a quarter of the face domain.
    let patch = tree.find_sub_patch(0.2f64, 0.3, 0, None);
    let mut weights = BasisWeights::new();
    tree.eval_sub_patch_basis(patch, 0.2, 0.3, Derivatives::First, &mut weights);
    let sum: f64 = weights.ds()[..4].iter().map(|w: &f64| w.abs()).sum();
    assert_close(sum, 4.0 * 2.0, EPSILON);
    Ok(())
}

#[test]
fn test_builder_rejects_invalid_options() {
    let unsupported = PatchTreeBuilder::new(PatchTreeOptions {
        irregular_patch_type: PatchType::Gregory,
        control_point_count: 4,
        ..Default::default()
    });
    assert!(matches!(
        unsupported,
        Err(Error::UnsupportedPatchType(PatchType::Gregory))
    ));

    let mixed = PatchTreeBuilder::new(PatchTreeOptions {
        regular_patch_type: PatchType::Quads,
        irregular_patch_type: PatchType::Loop,
        control_point_count: 4,
        ..Default::default()
    });
    assert!(matches!(mixed, Err(Error::InvalidPatch(_))));

    let empty = PatchTreeBuilder::new(PatchTreeOptions::default());
    assert!(matches!(empty, Err(Error::InvalidTopology(_))));

    let split_triangle = PatchTreeBuilder::new(PatchTreeOptions {
        regular_patch_type: PatchType::Loop,
        irregular_patch_type: PatchType::GregoryTriangle,
        sub_face_count: 3,
        control_point_count: 12,
        ..Default::default()
    });
    assert!(matches!(split_triangle, Err(Error::InvalidTopology(_))));
}

#[test]
fn test_builder_rejects_invalid_patches() -> anyhow::Result<()> {
    let options = PatchTreeOptions {
        regular_patch_type: PatchType::Quads,
        irregular_patch_type: PatchType::Quads,
        control_point_count: 4,
        ..Default::default()
    };
    let param = PatchParam::new(PatchParamFields {
        regular: true,
        ..Default::default()
    });

    let mut builder = PatchTreeBuilder::new(options)?;
    let short = builder.add_patch(param, &[Index(0), Index(1), Index(2)]);
    assert!(matches!(
        short,
        Err(Error::InvalidBufferSize {
            expected: 4,
            actual: 3
        })
    ));
    assert!(matches!(builder.build(), Err(Error::InvalidTopology(_))));
    Ok(())
}

#[test]
fn test_builder_rejects_patches_outside_sub_faces() -> anyhow::Result<()> {
    let options = PatchTreeOptions {
        regular_patch_type: PatchType::Quads,
        irregular_patch_type: PatchType::Quads,
        control_point_count: 4,
        ..Default::default()
    };
    let quad = [Index(0), Index(1), Index(2), Index(3)];

    // A sub-face the face does not have.
    let mut builder = PatchTreeBuilder::new(PatchTreeOptions {
        sub_face_count: 3,
        ..options
    })?;
    builder.add_patch(
        PatchParam::new(PatchParamFields {
            face_id: 7,
            depth: 1,
            non_quad_root: true,
            regular: true,
            ..Default::default()
        }),
        &quad,
    )?;
    assert!(matches!(
        builder.build(),
        Err(Error::IndexOutOfBounds { index: 7, max: 3 })
    ));

    // Sub-face patches in a tree without sub-faces.
    let mut builder = PatchTreeBuilder::new(options)?;
    builder.add_patch(
        PatchParam::new(PatchParamFields {
            non_quad_root: true,
            depth: 1,
            regular: true,
            ..Default::default()
        }),
        &quad,
    )?;
    assert!(matches!(builder.build(), Err(Error::InvalidPatch(_))));

    // A whole-face patch in a tree with sub-faces.
    let mut builder = PatchTreeBuilder::new(PatchTreeOptions {
        sub_face_count: 3,
        ..options
    })?;
    builder.add_patch(
        PatchParam::new(PatchParamFields {
            depth: 1,
            regular: true,
            ..Default::default()
        }),
        &quad,
    )?;
    assert!(matches!(builder.build(), Err(Error::InvalidPatch(_))));
    Ok(())
}

#[cfg(feature = "topology_validation")]
#[test]
fn test_builder_validates_topology() -> anyhow::Result<()> {
    let options = PatchTreeOptions {
        regular_patch_type: PatchType::Quads,
        irregular_patch_type: PatchType::Quads,
        control_point_count: 4,
        ..Default::default()
    };

    // A point past the control points without a stencil matrix.
    let mut builder = PatchTreeBuilder::new(options)?;
    builder.add_patch(
        PatchParam::new(PatchParamFields {
            regular: true,
            ..Default::default()
        }),
        &[Index(0), Index(1), Index(2), Index(7)],
    )?;
    assert!(matches!(
        builder.build(),
        Err(Error::IndexOutOfBounds { index: 7, max: 4 })
    ));

    // Three of four quadrants.
    let mut builder = PatchTreeBuilder::new(options)?;
    builder.set_stencil_matrix(vec![0.25f32; 5 * 4]);
    for (u, v) in [(0, 0), (1, 0), (1, 1)] {
        let param = PatchParam::new(PatchParamFields {
            u,
            v,
            depth: 1,
            regular: true,
            ..Default::default()
        });
        builder.add_patch(param, &[Index(0), Index(4), Index(8), Index(7)])?;
    }
    assert!(matches!(
        builder.build(),
        Err(Error::IncompleteQuadtree { sub_face: 0 })
    ));

    // A matrix whose rows do not match the control points.
    let mut builder = PatchTreeBuilder::new(options)?;
    builder.set_stencil_matrix(vec![0.5f64; 6]);
    builder.add_patch(
        PatchParam::new(PatchParamFields {
            regular: true,
            ..Default::default()
        }),
        &[Index(0), Index(1), Index(2), Index(3)],
    )?;
    assert!(matches!(
        builder.build(),
        Err(Error::InvalidBufferSize { actual: 6, .. })
    ));
    Ok(())
}

/// Points of the `k`-th patch of a fixture: a spread over all `total`
/// points, control points and sub-patch points alike.
fn spread_points(k: usize, size: usize, total: usize) -> Vec<Index> {
    (0..size).map(|i| Index(((5 * k + 3 * i) % total) as u32)).collect()
}

/// A stencil matrix of `rows` rows over `control_point_count` points
/// with distinct weights summing to one per row.
fn spread_matrix(rows: usize, control_point_count: usize) -> Vec<f64> {
    (0..rows)
        .flat_map(|r| {
            let row: Vec<f64> = (0..control_point_count)
                .map(|c| 1.0 + ((7 * r + 3 * c) % 11) as f64)
                .collect();
            let sum: f64 = row.iter().sum();
            row.into_iter().map(move |w| w / sum)
        })
        .collect()
}

/// Stencils of `patch` at `(u, v)` computed the long way: the basis of the
/// patch applied to the stencil of each of its points.
fn expected_stencils(tree: &PatchTree, matrix: &[f64], patch: PatchId, u: f64, v: f64) -> Vec<Vec<f64>> {
    let ncp = tree.control_point_count();
    let mut basis = BasisWeights::new();
    let n = tree.eval_sub_patch_basis(patch, u, v, Derivatives::Second, &mut basis);
    let points = tree.sub_patch_points(patch);
    assert_eq!(n, points.len());

    basis
        .rows()
        .iter()
        .map(|weights| {
            let mut stencil = vec![0.0; ncp];
            for (&point, &w) in points.iter().zip(&weights[..n]) {
                let point = usize::from(point);
                if point < ncp {
                    stencil[point] += w;
                } else {
                    let row = &matrix[(point - ncp) * ncp..(point - ncp + 1) * ncp];
                    for (s, m) in stencil.iter_mut().zip(row) {
                        *s += w * m;
                    }
                }
            }
            stencil
        })
        .collect()
}

fn assert_stencils_match(tree: &PatchTree, matrix: &[f64], patch: PatchId, u: f64, v: f64) {
    let ncp = tree.control_point_count();
    let mut stencils = vec![vec![0.0f64; ncp]; 6];
    let mut rows: Vec<&mut [f64]> = stencils.iter_mut().map(|r| r.as_mut_slice()).collect();
    assert_eq!(tree.eval_sub_patch_stencils(patch, u, v, &mut rows), ncp);

    for (actual, expected) in stencils.iter().zip(expected_stencils(tree, matrix, patch, u, v)) {
        assert_all_close(actual, &expected, 1e-9);
    }
}

const MIXED_SUB_PATCH_POINTS: usize = 24;

/// A quad face with 16 control points refined to depth 2 in its upper
/// right quadrant only. The deepest patch at the extraordinary corner
/// `(2, 2)` and, with interior patches, its depth 1 parent are Gregory
/// patches; all others are regular B-spline patches.
///
/// Patches are added top-down, so interior patches precede their
/// children. Returns the tree, the stencil matrix and the points of each
/// patch.
fn mixed_depth_tree(
    include_interior_patches: bool,
) -> anyhow::Result<(Arc<PatchTree>, Vec<f64>, Vec<Vec<Index>>)> {
    let ncp = 16;
    let total = ncp + MIXED_SUB_PATCH_POINTS;
    let mut builder = PatchTreeBuilder::new(PatchTreeOptions {
        include_interior_patches,
        control_point_count: ncp,
        ..Default::default()
    })?;
    let matrix = spread_matrix(MIXED_SUB_PATCH_POINTS, ncp);
    builder.set_stencil_matrix(matrix.clone());

    let mut patches: Vec<(u32, u32, u32, bool)> = Vec::new();
    if include_interior_patches {
        patches.push((0, 0, 0, true));
    }
    patches.extend([(0, 0, 1, true), (1, 0, 1, true), (0, 1, 1, true)]);
    if include_interior_patches {
        patches.push((1, 1, 1, false));
    }
    patches.extend([(2, 2, 2, false), (3, 2, 2, true), (2, 3, 2, true), (3, 3, 2, true)]);

    let mut all_points = Vec::new();
    for (k, &(u, v, depth, regular)) in patches.iter().enumerate() {
        let param = PatchParam::try_new(PatchParamFields {
            u,
            v,
            depth,
            regular,
            ..Default::default()
        })?;
        // The root patch is the face itself.
        let points = if depth == 0 {
            (0..16u32).map(Index).collect()
        } else {
            spread_points(k, if regular { 16 } else { 20 }, total)
        };
        assert_eq!(builder.add_patch(param, &points)?, PatchId(k));
        all_points.push(points);
    }
    Ok((builder.build()?, matrix, all_points))
}

#[test]
fn test_mixed_depth_tree() -> anyhow::Result<()> {
    let (tree, _, points) = mixed_depth_tree(false)?;
    assert_eq!(tree.patch_count(), 7);
    assert_eq!(tree.irregular_patch_count(), 1);
    assert_eq!(tree.depth(), 2);
    assert_eq!(tree.point_total_count(), 16 + MIXED_SUB_PATCH_POINTS);

    // Patches of 16 and 20 points share one table.
    for (k, expected) in points.iter().enumerate() {
        assert_eq!(tree.sub_patch_points(PatchId(k)), expected.as_slice());
    }
    assert_eq!(tree.sub_patch_points(PatchId(3)).len(), 20);

    assert_eq!(tree.find_sub_patch(0.2f64, 0.3, 0, None), PatchId(0));
    assert_eq!(tree.find_sub_patch(0.7f64, 0.3, 0, None), PatchId(1));
    assert_eq!(tree.find_sub_patch(0.3f64, 0.7, 0, None), PatchId(2));
    assert_eq!(tree.find_sub_patch(0.6f64, 0.6, 0, None), PatchId(3));
    assert_eq!(tree.find_sub_patch(0.9f64, 0.6, 0, None), PatchId(4));
    assert_eq!(tree.find_sub_patch(0.6f64, 0.9, 0, None), PatchId(5));
    assert_eq!(tree.find_sub_patch(0.9f64, 0.9, 0, None), PatchId(6));

    // Without interior patches a depth limit is ignored.
    assert_eq!(tree.find_sub_patch(0.6f64, 0.6, 0, Some(1)), PatchId(3));
    Ok(())
}

#[test]
fn test_find_sub_patch_at_every_depth() -> anyhow::Result<()> {
    let (tree, _, _) = mixed_depth_tree(true)?;
    assert_eq!(tree.patch_count(), 9);
    assert_eq!(tree.irregular_patch_count(), 2);
    assert_eq!(tree.sub_patch_points(PatchId(4)).len(), 20);

    // The depth 1 patch was a leaf until its children were added.
    assert_eq!(tree.find_sub_patch(0.6f64, 0.6, 0, Some(0)), PatchId(0));
    assert_eq!(tree.find_sub_patch(0.6f64, 0.6, 0, Some(1)), PatchId(4));
    assert_eq!(tree.find_sub_patch(0.6f64, 0.6, 0, Some(2)), PatchId(5));
    assert_eq!(tree.find_sub_patch(0.6f64, 0.6, 0, None), PatchId(5));
    assert_eq!(tree.find_sub_patch(0.9f64, 0.6, 0, Some(1)), PatchId(4));
    assert_eq!(tree.find_sub_patch(0.9f64, 0.6, 0, None), PatchId(6));
    assert_eq!(tree.find_sub_patch(0.2f64, 0.7, 0, Some(0)), PatchId(0));
    assert_eq!(tree.find_sub_patch(0.2f64, 0.7, 0, None), PatchId(3));

    for (u, v) in unit_square_grid(8) {
        let leaf_depth = if u >= 0.5 && v >= 0.5 { 2 } else { 1 };
        for max_depth in [Some(0), Some(1), Some(2), None] {
            let patch = tree.find_sub_patch(u, v, 0, max_depth);
            let param = tree.sub_patch_param(patch);
            let expected_depth = max_depth.map_or(leaf_depth, |d| d.min(leaf_depth));
            assert_eq!(param.depth() as usize, expected_depth, "({u}, {v}) limited to {max_depth:?}");

            let (s, t) = param.normalize(u, v);
            assert!((0.0..=1.0).contains(&s) && (0.0..=1.0).contains(&t));
        }
    }
    Ok(())
}

#[test]
fn test_mixed_depth_stencils_apply_the_basis() -> anyhow::Result<()> {
    for include_interior_patches in [false, true] {
        let (tree, matrix, _) = mixed_depth_tree(include_interior_patches)?;
        for (u, v) in unit_square_grid(4) {
            for max_depth in [Some(0), Some(1), None] {
                let patch = tree.find_sub_patch(u, v, 0, max_depth);
                assert_stencils_match(&tree, &matrix, patch, u, v);
            }
        }
    }
    Ok(())
}

#[test]
fn test_loop_tree_with_gregory_triangle() -> anyhow::Result<()> {
    let ncp = 12;
    let sub_patch_points = 10;
    let mut builder = PatchTreeBuilder::new(PatchTreeOptions {
        regular_patch_type: PatchType::Loop,
        irregular_patch_type: PatchType::GregoryTriangle,
        control_point_count: ncp,
        ..Default::default()
    })?;
    let matrix = spread_matrix(sub_patch_points, ncp);
    builder.set_stencil_matrix(matrix.clone());

    // The rotated middle triangle is irregular.
    for (k, (u, v, regular)) in [(0, 0, true), (1, 0, true), (0, 1, true), (1, 1, false)]
        .into_iter()
        .enumerate()
    {
        let param = PatchParam::new(PatchParamFields {
            u,
            v,
            depth: 1,
            regular,
            ..Default::default()
        });
        let points = spread_points(k, if regular { 12 } else { 18 }, ncp + sub_patch_points);
        builder.add_patch(param, &points)?;
    }
    let tree = builder.build()?;
    assert!(tree.patches_are_triangular());
    assert_eq!(tree.irregular_patch_type(), PatchType::GregoryTriangle);
    assert_eq!(tree.irregular_patch_count(), 1);
    assert_eq!(tree.sub_patch_points(PatchId(2)).len(), 12);
    assert_eq!(tree.sub_patch_points(PatchId(3)).len(), 18);

    for ((u, v), expected) in [
        ((0.1, 0.1), PatchId(0)),
        ((0.7, 0.1), PatchId(1)),
        ((0.1, 0.7), PatchId(2)),
        ((0.3, 0.3), PatchId(3)),
        ((0.45, 0.4), PatchId(3)),
    ] {
        let patch = tree.find_sub_patch(u, v, 0, None);
        assert_eq!(patch, expected);
        assert_stencils_match(&tree, &matrix, patch, u, v);

        // Position stencils of a point in the face partition unity.
        let mut stencil = vec![0.0f64; ncp];
        tree.eval_sub_patch_stencils(patch, u, v, &mut [stencil.as_mut_slice()]);
        assert_close(stencil.iter().sum(), 1.0, 1e-9);
    }
    Ok(())
}

#[test]
fn test_patch_tree_is_shareable() -> anyhow::Result<()> {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<PatchTree>();

    let tree = multi_linear_tree(3, true)?;
    let handles: Vec<_> = (0..3)
        .map(|sub_face| {
            let tree = Arc::clone(&tree);
            std::thread::spawn(move || tree.find_sub_patch(0.75f64, 0.75, sub_face, None))
        })
        .collect();
    for (sub_face, handle) in handles.into_iter().enumerate() {
        let patch = handle.join().expect("search thread panicked");
        assert_eq!(tree.sub_patch_param(patch).face_id() as usize, sub_face);
    }
    Ok(())
}
