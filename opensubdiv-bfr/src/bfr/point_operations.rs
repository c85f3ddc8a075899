//! Primitive operations on arrays of points.
//!
//! A "point" is a tuple of `size` floating point values; consecutive points
//! in a buffer start `stride` values apart (see [`PointDescriptor`]). Every
//! operation is specialized for point sizes 1–4 and falls back to a loop
//! over `size` for anything larger.
//!
//! Sources and destinations are separate slices. Where results are
//! computed from points of the same buffer, split it first (e.g. with
//! [`slice::split_at_mut`]).
//!
//! # Panics
//!
//! All operations index their buffers directly and panic if a source
//! index, count or stride reaches past the end of a buffer.
use crate::{Index, Real};

/// Layout of the points in a buffer.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct PointDescriptor {
    /// Number of values per point.
    pub size: usize,
    /// Distance, in values, between the starts of consecutive points.
    pub stride: usize,
}

impl PointDescriptor {
    /// Tightly packed points of `size` values.
    pub fn new(size: usize) -> Self {
        Self { size, stride: size }
    }

    /// Points of `size` values, `stride` values apart.
    pub fn with_stride(size: usize, stride: usize) -> Self {
        debug_assert!(stride >= size);
        Self { size, stride }
    }

    /// Number of values a buffer of `count` points needs.
    #[inline]
    pub fn buffer_len(&self, count: usize) -> usize {
        if count == 0 {
            0
        } else {
            (count - 1) * self.stride + self.size
        }
    }

    #[inline]
    fn point<'a, R>(&self, data: &'a [R], index: usize) -> &'a [R] {
        let start = index * self.stride;
        &data[start..start + self.size]
    }

    #[inline]
    fn point_mut<'a, R>(&self, data: &'a mut [R], index: usize) -> &'a mut [R] {
        let start = index * self.stride;
        &mut data[start..start + self.size]
    }
}

/// The source points of a combination.
#[derive(Copy, Clone, Debug)]
pub enum Sources<'a> {
    /// The first `n` points of the buffer.
    Consecutive(usize),
    /// The points at the given indices.
    Indexed(&'a [Index]),
}

impl Sources<'_> {
    #[inline]
    pub fn len(&self) -> usize {
        match self {
            Sources::Consecutive(n) => *n,
            Sources::Indexed(indices) => indices.len(),
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    fn get(&self, i: usize) -> usize {
        match self {
            Sources::Consecutive(_) => i,
            Sources::Indexed(indices) => indices[i].into(),
        }
    }
}

// Run `$apply::<_, SIZE>` with SIZE = the point size for sizes 1–4, 0 for
// the general case.
macro_rules! specialize_size {
    ($size:expr, $apply:ident($($arg:expr),* $(,)?)) => {
        match $size {
            1 => $apply::<_, 1>($($arg),*),
            2 => $apply::<_, 2>($($arg),*),
            3 => $apply::<_, 3>($($arg),*),
            4 => $apply::<_, 4>($($arg),*),
            _ => $apply::<_, 0>($($arg),*),
        }
    };
}

#[inline(always)]
fn point_len<const SIZE: usize>(size: usize) -> usize {
    if SIZE == 0 {
        size
    } else {
        SIZE
    }
}

#[inline(always)]
fn set<R: Real>(dst: &mut [R], w: R, src: &[R], n: usize) {
    for (d, &s) in dst[..n].iter_mut().zip(&src[..n]) {
        *d = w * s;
    }
}

#[inline(always)]
fn add<R: Real>(dst: &mut [R], w: R, src: &[R], n: usize) {
    for (d, &s) in dst[..n].iter_mut().zip(&src[..n]) {
        *d += w * s;
    }
}

fn combine_apply<R: Real, const SIZE: usize>(
    points: &[R],
    desc: PointDescriptor,
    sources: Sources,
    weights: &[&[R]],
    results: &mut [&mut [R]],
) {
    let n = point_len::<SIZE>(desc.size);
    let results = &mut results[..weights.len()];

    if sources.is_empty() {
        results.iter_mut().for_each(|r| r[..n].fill(R::ZERO));
        return;
    }

    // Each source point is applied to all results at once.
    let first = desc.point(points, sources.get(0));
    for (result, w) in results.iter_mut().zip(weights) {
        set(result, w[0], first, n);
    }
    for i in 1..sources.len() {
        let src = desc.point(points, sources.get(i));
        for (result, w) in results.iter_mut().zip(weights) {
            add(result, w[i], src, n);
        }
    }
}

/// Combine the source points into one result, `result = Σ wᵢ·pᵢ`.
pub fn combine1<R: Real>(
    points: &[R],
    desc: PointDescriptor,
    sources: Sources,
    weights: &[R],
    result: &mut [R],
) {
    specialize_size!(
        desc.size,
        combine_apply(points, desc, sources, &[weights], &mut [result])
    )
}

/// Combine the source points into three results at once (position and
/// first derivatives).
pub fn combine3<R: Real>(
    points: &[R],
    desc: PointDescriptor,
    sources: Sources,
    weights: [&[R]; 3],
    results: [&mut [R]; 3],
) {
    let mut results = results;
    specialize_size!(
        desc.size,
        combine_apply(points, desc, sources, &weights, &mut results)
    )
}

/// Combine the source points into one result per weight row.
pub fn combine_multiple<R: Real>(
    points: &[R],
    desc: PointDescriptor,
    sources: Sources,
    weights: &[&[R]],
    results: &mut [&mut [R]],
) {
    debug_assert!(results.len() >= weights.len());
    specialize_size!(
        desc.size,
        combine_apply(points, desc, sources, weights, results)
    )
}

fn combine_consecutive_apply<R: Real, const SIZE: usize>(
    points: &[R],
    desc: PointDescriptor,
    source_count: usize,
    weights: &[R],
    results: &mut [R],
) {
    let n = point_len::<SIZE>(desc.size);
    if source_count == 0 {
        return;
    }
    for (i, w) in weights.chunks_exact(source_count).enumerate() {
        let result = desc.point_mut(results, i);
        set(result, w[0], desc.point(points, 0), n);
        for (j, &wj) in w.iter().enumerate().skip(1) {
            add(result, wj, desc.point(points, j), n);
        }
    }
}

/// Combine the first `source_count` points into consecutive results.
///
/// `weights` holds `source_count` weights per result, one result after the
/// other; results are written `desc.stride` apart.
pub fn combine_consecutive<R: Real>(
    points: &[R],
    desc: PointDescriptor,
    source_count: usize,
    weights: &[R],
    results: &mut [R],
) {
    specialize_size!(
        desc.size,
        combine_consecutive_apply(points, desc, source_count, weights, results)
    )
}

fn split_face_apply<R: Real, const SIZE: usize>(
    points: &[R],
    desc: PointDescriptor,
    face_size: usize,
    results: &mut [R],
) {
    let n = point_len::<SIZE>(desc.size);
    let inv_n = R::ONE / R::from_usize(face_size);

    desc.point_mut(results, 0)[..n].fill(R::ZERO);
    for i in 0..face_size {
        let j = if i + 1 < face_size { i + 1 } else { 0 };
        let pi = desc.point(points, i);
        let pj = desc.point(points, j);

        add(desc.point_mut(results, 0), inv_n, pi, n);

        let edge = desc.point_mut(results, 1 + i);
        set(edge, R::HALF, pi, n);
        add(edge, R::HALF, pj, n);
    }
}

/// Split the face formed by the first `face_size` points.
///
/// Writes the face center followed by the midpoint of each edge `i`
/// (between points `i` and `i + 1`), `desc.stride` apart.
pub fn split_face<R: Real>(
    points: &[R],
    desc: PointDescriptor,
    face_size: usize,
    results: &mut [R],
) {
    specialize_size!(
        desc.size,
        split_face_apply(points, desc, face_size, results)
    )
}

fn copy_consecutive_apply<D: Real, S: Real, const SIZE: usize>(
    points: &[S],
    desc: PointDescriptor,
    indices: &[Index],
    results: &mut [D],
    result_stride: usize,
) {
    let n = point_len::<SIZE>(desc.size);
    for (i, &index) in indices.iter().enumerate() {
        let src = desc.point(points, index.into());
        let dst = &mut results[i * result_stride..i * result_stride + n];
        for (d, &s) in dst.iter_mut().zip(&src[..n]) {
            *d = D::from_real(s);
        }
    }
}

/// Copy the points at `indices` to consecutive locations `result_stride`
/// apart, converting precision if needed.
pub fn copy_consecutive<D: Real, S: Real>(
    points: &[S],
    desc: PointDescriptor,
    indices: &[Index],
    results: &mut [D],
    result_stride: usize,
) {
    match desc.size {
        1 => copy_consecutive_apply::<D, S, 1>(points, desc, indices, results, result_stride),
        2 => copy_consecutive_apply::<D, S, 2>(points, desc, indices, results, result_stride),
        3 => copy_consecutive_apply::<D, S, 3>(points, desc, indices, results, result_stride),
        4 => copy_consecutive_apply::<D, S, 4>(points, desc, indices, results, result_stride),
        _ => copy_consecutive_apply::<D, S, 0>(points, desc, indices, results, result_stride),
    }
}
