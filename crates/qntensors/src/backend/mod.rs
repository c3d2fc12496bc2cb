//! Linear-algebra backend glue.
//!
//! Blocks are column-major, like faer, so a rank-2 `DenseTensor` can be
//! viewed as a faer matrix without copying. All GEMM, QR and SVD work goes
//! through faer.

mod faer_interop;

pub use faer_interop::{AsFaerMat, tensor_from_faer_mat};
