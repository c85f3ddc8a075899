//! # Feature Adaptive Representation
//!
//! The parts of `Far` patch evaluation rests on:
//! * **Patch types** – [`PatchType`] and [`PatchDescriptor`] describe the
//!   kind of a patch and how many control points it has.
//! * **Patch parameterization** – [`PatchParam`] locates a patch inside the
//!   domain of the face it was refined from.
//! * **Basis evaluation** – [`patch_basis`] holds the weights of all
//!   evaluable patch types and their derivatives.
pub mod patch_basis;
pub use patch_basis::{
    evaluate_patch_basis, evaluate_patch_basis_normalized, BasisWeights, Derivatives,
    MAX_PATCH_POINTS,
};

pub mod patch_descriptor;
pub use patch_descriptor::*;

pub mod patch_param;
pub use patch_param::*;
