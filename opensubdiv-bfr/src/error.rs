//! Error types for the opensubdiv-bfr crate.

use crate::far::PatchType;
use thiserror::Error;

/// Main error type for opensubdiv-bfr operations.
///
/// Errors are only ever returned when something is *constructed*
/// ([`Parameterization`](crate::bfr::Parameterization),
/// [`PatchTree`](crate::bfr::PatchTree),
/// [`Surface`](crate::bfr::Surface), [`PatchParam`](crate::far::PatchParam)).
/// Evaluation never fails.
#[derive(Debug, Error)]
pub enum Error {
    /// The face size is not supported by the subdivision scheme.
    #[error("Invalid parameterization: face of size {face_size} for {scheme:?}")]
    InvalidParameterization {
        scheme: crate::sdc::Scheme,
        face_size: usize,
    },

    /// Invalid patch configuration.
    #[error("Invalid patch configuration: {0}")]
    InvalidPatch(String),

    /// The patch type has no basis evaluator.
    #[error("Patch type {0:?} can not be evaluated")]
    UnsupportedPatchType(PatchType),

    /// A patch tree quadtree has an unset quadrant.
    #[error("Patch tree for sub-face {sub_face} does not cover its domain")]
    IncompleteQuadtree { sub_face: usize },

    /// Invalid topology.
    #[error("Invalid topology: {0}")]
    InvalidTopology(String),

    /// Index out of bounds.
    #[error("Index {index} out of bounds (max: {max})")]
    IndexOutOfBounds { index: usize, max: usize },

    /// Invalid buffer size.
    #[error("Invalid buffer size: expected {expected}, got {actual}")]
    InvalidBufferSize { expected: usize, actual: usize },
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Check that `index` is below `max`.
    pub(crate) fn check_index(index: usize, max: usize) -> Result<()> {
        if index < max {
            Ok(())
        } else {
            Err(Error::IndexOutOfBounds { index, max })
        }
    }

    /// Check that a buffer holds exactly `expected` elements.
    pub(crate) fn check_buffer_size(expected: usize, actual: usize) -> Result<()> {
        if expected == actual {
            Ok(())
        } else {
            Err(Error::InvalidBufferSize { expected, actual })
        }
    }
}
