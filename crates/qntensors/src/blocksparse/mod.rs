//! Block-sparse tensors with quantum-number labels.
//!
//! # Core Types
//!
//! - [`Block`] - one dense array plus one quantum label per leg
//! - [`BlockTensor`] - the nonzero blocks of one tensor, with its [`ShapeTag`]
//! - [`group_by_boundary`] - partition blocks by a boundary-leg label
//!
//! Contraction lives in [`crate::contract`]; canonicalization, compression
//! and carry application in [`crate::decomposition`].

mod block;
mod grouping;
mod shape_tag;
mod tensor;

pub use block::{Block, Labels};
pub use grouping::{Boundary, LabelGroup, group_by_boundary};
pub use shape_tag::ShapeTag;
pub use tensor::BlockTensor;
