#![doc(
    html_logo_url = "https://raw.githubusercontent.com/virtualritz/opensubdiv/master/osd-logo.png"
)]
//! # Limit Surface Evaluation
//!
//! A pure Rust implementation of the patch evaluation machinery of [*Pixar’s
//! OpenSubdiv*](https://graphics.pixar.com/opensubdiv/): the basis functions
//! of all evaluable patch types, the bit-packed patch parameterization, the
//! adaptive patch tree of irregular faces and the per-face [`Surface`]
//! evaluator.
//!
//! Given the patches a refinement layer produced for a face, a surface
//! evaluates position and up to second order derivatives of the face's
//! limit surface at arbitrary parametric coordinates, without subdividing
//! at evaluation time.
//!
//! [`Surface`]: bfr::Surface
//!
//! ## Modules
//!
//! * [`sdc`] – subdivision schemes.
//! * [`far`] – patch types, patch parameters and basis evaluation.
//! * [`bfr`] – face parameterization, patch trees, surfaces and the point
//!   operations they use.
//!
//! ## Precision
//!
//! Everything that evaluates is generic over [`Real`], i.e. [`f32`] or
//! [`f64`]. A patch tree stores its stencil matrix in either precision and
//! can be shared by surfaces of both.
//!
//! ## Concurrency
//!
//! Patch trees are immutable once built and are handed out as
//! [`Arc`](std::sync::Arc)s. Surfaces are read-only after construction.
//! All evaluation methods take `&self` and write only to caller provided
//! buffers, so any number of threads may evaluate the same surface.
//!
//! ## API Changes From C++
//!
//! * Nullable derivative output pointers are replaced by the number of
//!   result rows passed (1, 3 or 6), see [`far::Derivatives`].
//! * Option structs use the [init struct
//!   pattern](https://xaeroxe.github.io/init-struct-pattern/).
//! * Use unsigned integer types, specifically `usize` and `u32`, instead of
//!   signed ones (`i32`) for anything that can only contain positive values
//!   (indices, sizes/lengths/counts, etc.).
//!
//! ## Cargo Features
#![doc = document_features::document_features!()]

pub mod bfr;
pub mod error;
pub mod far;
pub mod real;
pub mod sdc;

pub use error::{Error, Result};
pub use real::Real;

/// A vertex, point or patch point index.
///
/// # Examples
///
/// ```
/// use opensubdiv_bfr::Index;
///
/// // Create an index from a u32
/// let idx = Index::from(42u32);
/// assert_eq!(idx.0, 42);
///
/// // Convert back to u32
/// let value: u32 = idx.into();
/// assert_eq!(value, 42);
///
/// // Create from usize
/// let idx = Index::from(100usize);
/// let as_usize: usize = idx.into();
/// assert_eq!(as_usize, 100);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Index(pub u32);

impl From<u32> for Index {
    fn from(value: u32) -> Self {
        Index(value)
    }
}

impl From<Index> for u32 {
    fn from(index: Index) -> Self {
        index.0
    }
}

impl From<usize> for Index {
    fn from(value: usize) -> Self {
        Index(value as u32)
    }
}

impl From<Index> for usize {
    fn from(index: Index) -> Self {
        index.0 as usize
    }
}
