//! Tests for the bit-packed patch parameterization.


use opensubdiv_bfr::far::*;
use opensubdiv_bfr::Error;
use test_utils::*;

#[test]
fn test_patch_param_fields() {
    let fields = PatchParamFields {
        face_id: (1 << 28) - 1,
        u: 5,
        v: 11,
        depth: 4,
        non_quad_root: true,
        boundary: 0b10110,
        transition: 0b1001,
        regular: true,
    };
    let param = PatchParam::new(fields);

    assert_eq!(param.face_id(), (1 << 28) - 1);
    assert_eq!(param.u(), 5);
    assert_eq!(param.v(), 11);
    assert_eq!(param.depth(), 4);
    assert!(param.non_quad_root());
    assert_eq!(param.boundary(), 0b10110);
    assert_eq!(param.transition(), 0b1001);
    assert!(param.is_regular());
    assert_eq!(param.fields(), fields);

    let (field0, field1) = param.raw();
    assert_eq!(PatchParam::from_raw(field0, field1), param);
}

#[test]
fn test_patch_param_default_is_empty() {
    let param = PatchParam::default();
    assert_eq!(param.raw(), (0, 0));
    assert_eq!(param.fields(), PatchParamFields::default());
}

#[test]
fn test_patch_param_truncates() {
    let param = PatchParam::new(PatchParamFields {
        u: (1 << 10) + 3,
        depth: 17,
        boundary: 0b100001,
        ..Default::default()
    });
    assert_eq!(param.u(), 3);
    assert_eq!(param.depth(), 1);
    assert_eq!(param.boundary(), 1);
    // Truncation must not leak into neighbouring fields.
    assert_eq!(param.v(), 0);
    assert!(!param.is_regular());
}

#[test]
fn test_patch_param_try_new() -> anyhow::Result<()> {
    let param = PatchParam::try_new(PatchParamFields {
        face_id: 7,
        u: 3,
        v: 2,
        depth: 2,
        ..Default::default()
    })?;
    assert_eq!((param.u(), param.v()), (3, 2));

    let too_deep = PatchParam::try_new(PatchParamFields {
        depth: 16,
        ..Default::default()
    });
    assert!(matches!(too_deep, Err(Error::InvalidPatch(_))));

    let outside = PatchParam::try_new(PatchParamFields {
        u: 4,
        depth: 2,
        ..Default::default()
    });
    assert!(matches!(outside, Err(Error::InvalidPatch(_))));

    let boundary = PatchParam::try_new(PatchParamFields {
        boundary: 32,
        ..Default::default()
    });
    assert!(matches!(boundary, Err(Error::InvalidPatch(_))));
    Ok(())
}

#[test]
fn test_param_fraction() {
    let param = PatchParam::new(PatchParamFields {
        depth: 3,
        ..Default::default()
    });
    assert_eq!(param.param_fraction::<f32>(), 0.125);

    // Patches of sub-faces start one level deeper.
    let param = PatchParam::new(PatchParamFields {
        depth: 3,
        non_quad_root: true,
        ..Default::default()
    });
    assert_eq!(param.param_fraction::<f64>(), 0.25);
}

#[test]
fn test_normalize() {
    let param = PatchParam::new(PatchParamFields {
        u: 2,
        v: 1,
        depth: 2,
        ..Default::default()
    });
    let (s, t) = param.normalize(0.625f64, 0.375);
    assert_close(s, 0.5, EPSILON);
    assert_close(t, 0.5, EPSILON);

    let (u, v) = param.unnormalize(0.0f64, 1.0);
    assert_close(u, 0.5, EPSILON);
    assert_close(v, 0.5, EPSILON);
}

#[test]
fn test_normalize_round_trip() {
    let params = [
        PatchParamFields {
            u: 3,
            v: 1,
            depth: 2,
            ..Default::default()
        },
        PatchParamFields {
            u: 1,
            v: 0,
            depth: 2,
            non_quad_root: true,
            ..Default::default()
        },
        PatchParamFields {
            u: 5,
            v: 9,
            depth: 4,
            ..Default::default()
        },
    ];
    for fields in params {
        let param = PatchParam::new(fields);
        for (s, t) in unit_square_grid(5) {
            let (u, v) = param.unnormalize(s, t);
            let (s2, t2) = param.normalize(u, v);
            assert_close(s2, s, EPSILON);
            assert_close(t2, t, EPSILON);
        }
    }
}

#[test]
fn test_triangle_rotation() {
    let corner = PatchParam::new(PatchParamFields {
        u: 1,
        v: 0,
        depth: 1,
        ..Default::default()
    });
    let middle = PatchParam::new(PatchParamFields {
        u: 1,
        v: 1,
        depth: 1,
        ..Default::default()
    });
    assert!(!corner.is_triangle_rotated());
    assert!(middle.is_triangle_rotated());

    // The origin of the middle triangle is the midpoint of the
    // hypotenuse of the face.
    let (u, v) = middle.unnormalize_triangle(0.0f64, 0.0);
    assert_close(u, 0.5, EPSILON);
    assert_close(v, 0.5, EPSILON);
    let (u, v) = middle.unnormalize_triangle(1.0f64, 0.0);
    assert_close(u, 0.0, EPSILON);
    assert_close(v, 0.5, EPSILON);
}

#[test]
fn test_normalize_triangle_round_trip() {
    for (u, v) in [(0, 0), (1, 0), (0, 1), (2, 2), (3, 1), (1, 3)] {
        let param = PatchParam::new(PatchParamFields {
            u,
            v,
            depth: 2,
            ..Default::default()
        });
        for (s, t) in unit_triangle_grid(5) {
            let (fu, fv) = param.unnormalize_triangle(s, t);
            let (s2, t2) = param.normalize_triangle(fu, fv);
            assert_close(s2, s, EPSILON);
            assert_close(t2, t, EPSILON);
        }
    }
}

#[test]
fn test_patch_param_is_pod() {
    let params = [
        PatchParam::new(PatchParamFields {
            face_id: 3,
            ..Default::default()
        }),
        PatchParam::new(PatchParamFields {
            depth: 2,
            regular: true,
            ..Default::default()
        }),
    ];
    let words: &[u32] = bytemuck::cast_slice(&params);
    assert_eq!(words.len(), 4);
    assert_eq!(words[0], 3);
    assert_eq!(words[3] & 0xf, 2);
}
