//! qntensors - block-sparse tensors for quantum-number-symmetric tensor trains
//!
//! A tensor that commutes with a symmetry is zero except on blocks whose
//! quantum-number labels are compatible. This crate stores only those
//! blocks and implements the operations a tensor-train code needs on them.
//!
//! # Architecture
//!
//! ```text
//! Level 1: Block-sparse operations
//!     → contract (hash join on contracted labels, fermionic signs)
//!     → left/right canonicalize (QR), left/right compress (SVD + truncation)
//!     → left/right multiply (absorb carry matrices)
//!
//! Level 2: Block-sparse data model (blocksparse module)
//!     → Block, BlockTensor, ShapeTag, label grouping
//!
//! Level 3: Dense kernels (tensor, contract::tensordot, backend)
//!     → column-major DenseTensor, faer GEMM / QR / SVD
//! ```
//!
//! # Example
//!
//! ```
//! use qntensors::blocksparse::BlockTensor;
//! use qntensors::symmetry::{SZ, StateInfo};
//!
//! let vac = SZ::default();
//! let up = SZ::new(1, 1, 0);
//! let down = SZ::new(1, -1, 0);
//!
//! let left = StateInfo::from_pairs([(vac, 1)]);
//! let phys = StateInfo::from_pairs([(vac, 1), (up, 1), (down, 1)]);
//! let right = StateInfo::from_pairs([(vac, 1), (up, 1), (down, 1)]);
//!
//! let mut mps: BlockTensor<SZ> = BlockTensor::init_from_state_info(&left, &phys, &right);
//! mps.randomize(0.0, 1.0);
//! assert_eq!(mps.n_blocks(), 3);
//!
//! let carry = mps.left_canonicalize().unwrap();
//! assert_eq!(carry.len(), 3);
//! ```

pub mod backend;
pub mod blocksparse;
pub mod contract;
pub mod decomposition;
pub mod error;
pub mod random;
pub mod scalar;
pub mod symmetry;
pub mod tensor;

pub use blocksparse::{Block, BlockTensor, ShapeTag};
pub use contract::{Contracted, contract, tensordot};
pub use decomposition::{CarryMap, Compressed, TruncationParams};
pub use error::TensorError;
pub use scalar::{Scalar, c64};
pub use symmetry::{QuantumLabel, SZ, StateInfo};
pub use tensor::DenseTensor;
