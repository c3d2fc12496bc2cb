//! GEMM-based dense contraction over paired axes.

use faer::linalg::matmul::matmul;
use faer::{Accum, Par};

use crate::backend::AsFaerMat;
use crate::error::TensorError;
use crate::scalar::Scalar;
use crate::tensor::DenseTensor;

/// Contract `a` and `b` over the paired axes `axes_a[i] <-> axes_b[i]`.
///
/// The output legs are the uncontracted legs of `a` in ascending order,
/// followed by the uncontracted legs of `b` in ascending order. Contracting
/// every leg yields a rank-0 tensor.
///
/// The operands are permuted to `a[free, contracted]` and
/// `b[contracted, free]`, reshaped to matrices and multiplied with faer.
///
/// # Example
///
/// ```
/// use qntensors::DenseTensor;
/// use qntensors::contract::tensordot;
///
/// // Matrix multiplication: C[i,k] = A[i,j] * B[j,k]
/// let a = DenseTensor::from_vec(vec![1.0; 6], &[2, 3]).unwrap();
/// let b = DenseTensor::from_vec(vec![1.0; 12], &[3, 4]).unwrap();
/// let c = tensordot(&a, &[1], &b, &[0]).unwrap();
/// assert_eq!(c.shape(), &[2, 4]);
/// assert_eq!(c.get(&[1, 3]), Some(&3.0));
/// ```
pub fn tensordot<ElT: Scalar>(
    a: &DenseTensor<ElT>,
    axes_a: &[usize],
    b: &DenseTensor<ElT>,
    axes_b: &[usize],
) -> Result<DenseTensor<ElT>, TensorError> {
    if axes_a.len() != axes_b.len() {
        return Err(TensorError::LegCountMismatch {
            left: axes_a.len(),
            right: axes_b.len(),
        });
    }
    let free_a = free_axes(axes_a, a.ndim())?;
    let free_b = free_axes(axes_b, b.ndim())?;

    for (&ia, &ib) in axes_a.iter().zip(axes_b) {
        if a.shape()[ia] != b.shape()[ib] {
            return Err(TensorError::ContractedDimMismatch {
                leg_a: ia,
                dim_a: a.shape()[ia],
                leg_b: ib,
                dim_b: b.shape()[ib],
            });
        }
    }

    let m: usize = free_a.iter().map(|&i| a.shape()[i]).product();
    let k: usize = axes_a.iter().map(|&i| a.shape()[i]).product();
    let n: usize = free_b.iter().map(|&j| b.shape()[j]).product();

    let perm_a: Vec<usize> = free_a.iter().chain(axes_a).copied().collect();
    let perm_b: Vec<usize> = axes_b.iter().chain(&free_b).copied().collect();
    let a_work = a.permutedims(&perm_a)?;
    let b_work = b.permutedims(&perm_b)?;

    let mut output_shape: Vec<usize> = free_a.iter().map(|&i| a.shape()[i]).collect();
    output_shape.extend(free_b.iter().map(|&j| b.shape()[j]));

    let mut c = DenseTensor::<ElT>::zeros(&[m, n]);
    {
        let a_mat = a_work.as_faer_mat(m, k);
        let b_mat = b_work.as_faer_mat(k, n);
        let mut c_mat = c.as_faer_mat_mut(m, n);
        matmul(
            c_mat.as_mut(),
            Accum::Replace,
            a_mat,
            b_mat,
            ElT::one(),
            Par::Seq,
        );
    }

    c.reshape(&output_shape)
}

/// Legs of a rank-`ndim` tensor not listed in `axes`, ascending.
fn free_axes(axes: &[usize], ndim: usize) -> Result<Vec<usize>, TensorError> {
    let mut used = vec![false; ndim];
    for &axis in axes {
        if axis >= ndim || used[axis] {
            return Err(TensorError::InvalidLeg {
                leg: axis as isize,
                rank: ndim,
            });
        }
        used[axis] = true;
    }
    Ok((0..ndim).filter(|&i| !used[i]).collect())
}
