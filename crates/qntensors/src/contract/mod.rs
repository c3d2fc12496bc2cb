//! Tensor contraction operations.
//!
//! - `dense`: GEMM-based contraction of two dense tensors over paired axes
//! - `blocksparse`: symmetry-aware contraction of two block tensors, pairing
//!   only blocks whose contracted labels agree
//! - `sign`: the fermionic sign rules consulted by the block engine
//!
//! # Example
//!
//! ```
//! use qntensors::DenseTensor;
//! use qntensors::contract::tensordot;
//!
//! let a = DenseTensor::from_vec(vec![1.0, 2.0, 3.0, 4.0], &[2, 2]).unwrap();
//! let b = DenseTensor::from_vec(vec![1.0, 0.0, 0.0, 1.0], &[2, 2]).unwrap();
//! let c = tensordot(&a, &[1], &b, &[0]).unwrap();
//! assert_eq!(c.data(), a.data());
//! ```

mod blocksparse;
mod dense;
mod sign;

pub use blocksparse::{Contracted, contract, contract_with, contract_with_tag};
pub use dense::tensordot;
pub use sign::{LegList, SignFn, SignRule, SignRuleRegistry, mpo_on_mps_sign};
