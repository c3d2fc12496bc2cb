//! Structural transforms of block tensors along a tensor train.
//!
//! Each transform groups the blocks by the label on one boundary leg,
//! flattens every group into a single matrix, decomposes it with faer, and
//! splits the factor back into blocks:
//!
//! - [`BlockTensor::left_canonicalize`] / [`BlockTensor::right_canonicalize`]:
//!   thin QR, leaving the tensor orthonormal on one side
//! - [`BlockTensor::left_compress`] / [`BlockTensor::right_compress`]:
//!   thin SVD plus a global truncation of the boundary bond
//! - [`BlockTensor::left_multiply`] / [`BlockTensor::right_multiply`]:
//!   absorb the resulting [`CarryMap`] into the neighbouring tensor
//!
//! # Example
//!
//! ```
//! use qntensors::blocksparse::{Block, BlockTensor};
//! use qntensors::symmetry::SZ;
//! use qntensors::DenseTensor;
//!
//! let q = SZ::default();
//! let site = |v: Vec<f64>| {
//!     let data = DenseTensor::from_vec(v, &[1, 2, 1]).unwrap();
//!     BlockTensor::<SZ>::new(vec![Block::new([q, q, q], data).unwrap()], None).unwrap()
//! };
//! let mut first = site(vec![1.0, 1.0]);
//! let mut second = site(vec![2.0, 0.0]);
//!
//! // Move the norm of `first` into `second`.
//! let r = first.left_canonicalize().unwrap();
//! second.left_multiply(&r).unwrap();
//! assert!((first.norm() - 1.0).abs() < 1e-12);
//! assert!((second.norm() - 2.0 * 2f64.sqrt()).abs() < 1e-12);
//! ```

mod canonicalize;
mod compress;
mod multiply;
mod truncation;
mod util;

use std::collections::HashMap;

use crate::tensor::DenseTensor;

pub use compress::Compressed;
pub use truncation::{Truncation, TruncationParams, truncate_singular_values};

/// Boundary label to the rank-2 matrix carried across a bond.
pub type CarryMap<Q, ElT> = HashMap<Q, DenseTensor<ElT>>;
