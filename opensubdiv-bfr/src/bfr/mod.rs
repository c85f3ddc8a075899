//! # Base Face Representation
//!
//! Evaluation of the limit surface of individual faces of a mesh.
//!
//! * **Parameterization** – [`Parameterization`] defines the parametric
//!   domain of a face, including the sub-faces of N-sided faces.
//! * **Patch trees** – a [`PatchTree`], assembled with a
//!   [`PatchTreeBuilder`], holds the patches of the adaptive refinement of
//!   an irregular face. Trees are immutable once built and are shared
//!   between all faces with the same topology.
//! * **Surfaces** – a [`Surface`] evaluates positions, derivatives and
//!   stencils of one face.
//! * **Point operations** – the [`point_operations`] the above use to
//!   combine points of any size.
pub mod parameterization;
pub use parameterization::*;

pub mod patch_tree;
pub use patch_tree::*;

pub mod patch_tree_builder;
pub use patch_tree_builder::*;

pub mod point_operations;
pub use point_operations::{PointDescriptor, Sources};

pub mod surface;
pub use surface::*;
