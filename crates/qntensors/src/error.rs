//! Error types for qntensors.

use thiserror::Error;

/// Errors that can occur in block-sparse tensor operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TensorError {
    /// Data length does not match the element count implied by a shape.
    #[error("shape mismatch: expected {expected} elements, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    /// Index out of bounds.
    #[error("index out of bounds: index {index} is out of range for dimension {dim_size}")]
    IndexOutOfBounds { index: usize, dim_size: usize },

    /// A tensor, block or shape tag has the wrong number of legs.
    #[error("expected tensor of rank {expected}, got rank {actual}")]
    RankMismatch { expected: usize, actual: usize },

    /// Invalid permutation.
    #[error("invalid permutation {perm:?} for tensor with {ndim} dimensions")]
    InvalidPermutation { perm: Vec<usize>, ndim: usize },

    /// Leg position out of range, or listed twice in one contraction.
    #[error("invalid leg {leg} for tensor of rank {rank}")]
    InvalidLeg { leg: isize, rank: usize },

    /// The two operands of a contraction name a different number of legs.
    #[error("contracted leg lists differ in length: {left} vs {right}")]
    LegCountMismatch { left: usize, right: usize },

    /// Paired contracted legs have different dimensions.
    #[error("cannot contract leg {leg_a} (dim {dim_a}) with leg {leg_b} (dim {dim_b})")]
    ContractedDimMismatch {
        leg_a: usize,
        dim_a: usize,
        leg_b: usize,
        dim_b: usize,
    },

    /// No shape tag was supplied and none can be inferred from the rank.
    #[error("cannot determine shape tag for block tensor of rank {rank}")]
    UndeterminedShapeTag { rank: usize },

    /// The same label carries two different dimensions on one leg.
    #[error("label {label} on leg {leg} has dimension {actual}, previously seen as {expected}")]
    InconsistentLegDimension {
        leg: usize,
        label: String,
        expected: usize,
        actual: usize,
    },

    /// Truncation parameters out of range.
    #[error("invalid truncation cutoff {cutoff}")]
    InvalidCutoff { cutoff: f64 },

    /// SVD computation error.
    #[error("SVD error: {message}")]
    SvdError { message: String },
}
