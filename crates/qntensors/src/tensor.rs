//! Dense n-dimensional array used as the payload of every block.
//!
//! Data is stored in column-major (Fortran) order so that any rank-2 view
//! can be handed to faer without copying. Flattening the leading legs of a
//! block into matrix rows, or its trailing legs into matrix columns, is
//! therefore a pure reinterpretation of the same buffer.

use crate::error::TensorError;
use crate::scalar::Scalar;

/// Default relative tolerance of [`DenseTensor::approx_eq`].
pub const DEFAULT_RTOL: f64 = 1e-5;
/// Default absolute tolerance of [`DenseTensor::approx_eq`].
pub const DEFAULT_ATOL: f64 = 1e-8;

/// An owned dense tensor in column-major order.
///
/// A rank-0 tensor (empty shape) holds exactly one element.
///
/// # Example
///
/// ```
/// use qntensors::DenseTensor;
///
/// let t = DenseTensor::from_vec(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3]).unwrap();
/// assert_eq!(t.get(&[1, 0]), Some(&2.0)); // column-major
/// assert_eq!(t.get(&[0, 1]), Some(&3.0));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct DenseTensor<ElT: Scalar> {
    data: Vec<ElT>,
    shape: Vec<usize>,
}

impl<ElT: Scalar> DenseTensor<ElT> {
    /// Create a zero-filled tensor with the given shape.
    pub fn zeros(shape: &[usize]) -> Self {
        Self {
            data: vec![ElT::zero(); shape.iter().product()],
            shape: shape.to_vec(),
        }
    }

    /// Create a rank-0 tensor holding a single value.
    pub fn scalar(value: ElT) -> Self {
        Self {
            data: vec![value],
            shape: Vec::new(),
        }
    }

    /// Create a tensor from column-major data.
    ///
    /// # Errors
    ///
    /// Returns `TensorError::ShapeMismatch` if data length doesn't match shape.
    pub fn from_vec(data: Vec<ElT>, shape: &[usize]) -> Result<Self, TensorError> {
        let expected: usize = shape.iter().product();
        if data.len() != expected {
            return Err(TensorError::ShapeMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            data,
            shape: shape.to_vec(),
        })
    }

    /// Assemble a tensor whose data length is known to match `shape`.
    pub(crate) fn from_raw(data: Vec<ElT>, shape: Vec<usize>) -> Self {
        debug_assert_eq!(data.len(), shape.iter().product::<usize>());
        Self { data, shape }
    }

    #[inline]
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Number of legs.
    #[inline]
    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    /// Total number of elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn data(&self) -> &[ElT] {
        &self.data
    }

    #[inline]
    pub fn data_mut(&mut self) -> &mut [ElT] {
        &mut self.data
    }

    pub fn into_vec(self) -> Vec<ElT> {
        self.data
    }

    /// Get element by cartesian indices.
    ///
    /// Returns `None` if indices are out of bounds or wrong number of indices.
    pub fn get(&self, indices: &[usize]) -> Option<&ElT> {
        let linear = self.linear_index(indices)?;
        self.data.get(linear)
    }

    /// Set element by cartesian indices.
    pub fn set(&mut self, indices: &[usize], value: ElT) -> Result<(), TensorError> {
        if indices.len() != self.ndim() {
            return Err(TensorError::RankMismatch {
                expected: self.ndim(),
                actual: indices.len(),
            });
        }
        for (&index, &dim_size) in indices.iter().zip(&self.shape) {
            if index >= dim_size {
                return Err(TensorError::IndexOutOfBounds { index, dim_size });
            }
        }
        if let Some(linear) = self.linear_index(indices) {
            self.data[linear] = value;
        }
        Ok(())
    }

    fn linear_index(&self, indices: &[usize]) -> Option<usize> {
        if indices.len() != self.ndim() {
            return None;
        }
        let mut linear = 0;
        let mut stride = 1;
        for (&idx, &dim) in indices.iter().zip(&self.shape) {
            if idx >= dim {
                return None;
            }
            linear += idx * stride;
            stride *= dim;
        }
        Some(linear)
    }

    /// Fill all elements with a value.
    pub fn fill(&mut self, value: ElT) {
        self.data.fill(value);
    }

    /// Multiply every element by `factor`, returning a new tensor.
    pub fn scale(&self, factor: ElT) -> Self {
        Self {
            data: self.data.iter().map(|&x| x * factor).collect(),
            shape: self.shape.clone(),
        }
    }

    /// Frobenius norm.
    pub fn norm(&self) -> f64 {
        self.norm_sqr().sqrt()
    }

    /// Squared Frobenius norm.
    pub fn norm_sqr(&self) -> f64 {
        self.data
            .iter()
            .map(|&x| {
                let m = x.modulus();
                m * m
            })
            .sum()
    }

    /// Reinterpret the data with a new shape of equal element count.
    pub fn reshape(self, new_shape: &[usize]) -> Result<Self, TensorError> {
        let new_len: usize = new_shape.iter().product();
        if new_len != self.len() {
            return Err(TensorError::ShapeMismatch {
                expected: self.len(),
                actual: new_len,
            });
        }
        Ok(Self {
            data: self.data,
            shape: new_shape.to_vec(),
        })
    }

    /// Permute the legs. `perm[i]` is the source leg of output leg `i`.
    ///
    /// # Example
    ///
    /// ```
    /// use qntensors::DenseTensor;
    ///
    /// let t = DenseTensor::from_vec(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3]).unwrap();
    /// let t2 = t.permutedims(&[1, 0]).unwrap();
    /// assert_eq!(t2.shape(), &[3, 2]);
    /// assert_eq!(t.get(&[0, 2]), t2.get(&[2, 0]));
    /// ```
    pub fn permutedims(&self, perm: &[usize]) -> Result<Self, TensorError> {
        validate_permutation(perm, self.ndim())?;
        if perm.iter().enumerate().all(|(i, &p)| i == p) {
            return Ok(self.clone());
        }

        let new_shape: Vec<usize> = perm.iter().map(|&p| self.shape[p]).collect();
        let new_strides = column_major_strides(&new_shape);
        // Stride in the output of each source leg.
        let mut dest_stride = vec![0; self.ndim()];
        for (i, &p) in perm.iter().enumerate() {
            dest_stride[p] = new_strides[i];
        }

        let mut data = vec![ElT::zero(); self.len()];
        let mut index = vec![0usize; self.ndim()];
        for &value in &self.data {
            let linear_new: usize = index.iter().zip(&dest_stride).map(|(i, s)| i * s).sum();
            data[linear_new] = value;
            // Advance the column-major odometer over the source shape.
            for (leg, idx) in index.iter_mut().enumerate() {
                *idx += 1;
                if *idx < self.shape[leg] {
                    break;
                }
                *idx = 0;
            }
        }

        Ok(Self {
            data,
            shape: new_shape,
        })
    }

    /// Elementwise closeness with numpy `allclose` semantics:
    /// `|a - b| <= atol + rtol * |b|` for every element, and equal shapes.
    pub fn approx_eq(&self, other: &Self, rtol: f64, atol: f64) -> bool {
        self.shape == other.shape
            && self
                .data
                .iter()
                .zip(&other.data)
                .all(|(&a, &b)| (a - b).modulus() <= atol + rtol * b.modulus())
    }
}

/// Column-major strides for a shape: `[1, d0, d0*d1, ...]`.
pub(crate) fn column_major_strides(shape: &[usize]) -> Vec<usize> {
    let mut strides = Vec::with_capacity(shape.len());
    let mut stride = 1;
    for &dim in shape {
        strides.push(stride);
        stride *= dim;
    }
    strides
}

fn validate_permutation(perm: &[usize], ndim: usize) -> Result<(), TensorError> {
    let invalid = || TensorError::InvalidPermutation {
        perm: perm.to_vec(),
        ndim,
    };
    if perm.len() != ndim {
        return Err(invalid());
    }
    let mut seen = vec![false; ndim];
    for &p in perm {
        if p >= ndim || seen[p] {
            return Err(invalid());
        }
        seen[p] = true;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scalar::c64;

    #[test]
    fn test_zeros() {
        let t: DenseTensor<f64> = DenseTensor::zeros(&[2, 3, 4]);
        assert_eq!(t.shape(), &[2, 3, 4]);
        assert_eq!(t.len(), 24);
        assert!(t.data().iter().all(|&x| x == 0.0));
    }

    #[test]
    fn test_rank_zero_holds_one_element() {
        let t: DenseTensor<f64> = DenseTensor::zeros(&[]);
        assert_eq!(t.ndim(), 0);
        assert_eq!(t.len(), 1);
        let s = DenseTensor::scalar(2.5);
        assert_eq!(s.get(&[]), Some(&2.5));
    }

    #[test]
    fn test_zero_sized_leg() {
        let t: DenseTensor<f64> = DenseTensor::zeros(&[3, 0]);
        assert!(t.is_empty());
        assert!(DenseTensor::<f64>::from_vec(vec![], &[0, 5]).is_ok());
    }

    #[test]
    fn test_from_vec_length_checked() {
        let err = DenseTensor::from_vec(vec![1.0, 2.0], &[3]).unwrap_err();
        assert_eq!(
            err,
            TensorError::ShapeMismatch {
                expected: 3,
                actual: 2
            }
        );
    }

    #[test]
    fn test_set_get() {
        let mut t: DenseTensor<f64> = DenseTensor::zeros(&[2, 3]);
        t.set(&[1, 2], 7.0).unwrap();
        assert_eq!(t.get(&[1, 2]), Some(&7.0));
        assert_eq!(t.data()[1 + 2 * 2], 7.0);
        assert_eq!(t.get(&[2, 0]), None);
        assert!(t.set(&[0], 1.0).is_err());
    }

    #[test]
    fn test_reshape_preserves_data() {
        let t = DenseTensor::from_vec((0..6).map(f64::from).collect(), &[2, 3]).unwrap();
        let r = t.clone().reshape(&[6]).unwrap();
        assert_eq!(r.data(), t.data());
        assert!(t.reshape(&[4]).is_err());
    }

    #[test]
    fn test_permutedims_3d() {
        let mut src: DenseTensor<f64> = DenseTensor::zeros(&[2, 3, 4]);
        for i in 0..2 {
            for j in 0..3 {
                for k in 0..4 {
                    src.set(&[i, j, k], (i * 100 + j * 10 + k) as f64).unwrap();
                }
            }
        }
        let dest = src.permutedims(&[2, 0, 1]).unwrap();
        assert_eq!(dest.shape(), &[4, 2, 3]);
        for i in 0..2 {
            for j in 0..3 {
                for k in 0..4 {
                    assert_eq!(src.get(&[i, j, k]), dest.get(&[k, i, j]));
                }
            }
        }
    }

    #[test]
    fn test_permutedims_invalid() {
        let t: DenseTensor<f64> = DenseTensor::zeros(&[2, 3]);
        assert!(t.permutedims(&[0, 0]).is_err());
        assert!(t.permutedims(&[0]).is_err());
        assert!(t.permutedims(&[0, 2]).is_err());
    }

    #[test]
    fn test_norm() {
        let t = DenseTensor::from_vec(vec![3.0, 4.0], &[2]).unwrap();
        assert_eq!(t.norm(), 5.0);
        let z = DenseTensor::from_vec(vec![c64::new(3.0, 4.0)], &[1]).unwrap();
        assert_eq!(z.norm(), 5.0);
    }

    #[test]
    fn test_approx_eq() {
        let a = DenseTensor::from_vec(vec![1.0, 2.0], &[2]).unwrap();
        let b = DenseTensor::from_vec(vec![1.0 + 1e-10, 2.0], &[2]).unwrap();
        let c = DenseTensor::from_vec(vec![1.1, 2.0], &[2]).unwrap();
        assert!(a.approx_eq(&b, DEFAULT_RTOL, DEFAULT_ATOL));
        assert!(!a.approx_eq(&c, DEFAULT_RTOL, DEFAULT_ATOL));
        let d = a.clone().reshape(&[1, 2]).unwrap();
        assert!(!a.approx_eq(&d, DEFAULT_RTOL, DEFAULT_ATOL));
    }
}
