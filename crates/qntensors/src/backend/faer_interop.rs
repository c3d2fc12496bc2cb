//! Conversion between `DenseTensor` and faer matrices.

use faer::{MatMut, MatRef};

use crate::scalar::Scalar;
use crate::tensor::DenseTensor;

/// View a tensor's column-major buffer as a faer matrix.
pub trait AsFaerMat<T: Scalar> {
    /// View tensor data as an immutable `rows x cols` faer matrix (zero-copy).
    ///
    /// # Panics
    ///
    /// Panics if `rows * cols != tensor.len()`.
    ///
    /// # Example
    ///
    /// ```
    /// use qntensors::DenseTensor;
    /// use qntensors::backend::AsFaerMat;
    ///
    /// let t = DenseTensor::from_vec(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3]).unwrap();
    /// let mat = t.as_faer_mat(2, 3);
    /// assert_eq!(mat[(1, 2)], 6.0);
    /// ```
    fn as_faer_mat(&self, rows: usize, cols: usize) -> MatRef<'_, T>;

    /// View tensor data as a mutable `rows x cols` faer matrix (zero-copy).
    ///
    /// # Panics
    ///
    /// Panics if `rows * cols != tensor.len()`.
    fn as_faer_mat_mut(&mut self, rows: usize, cols: usize) -> MatMut<'_, T>;
}

impl<T: Scalar> AsFaerMat<T> for DenseTensor<T> {
    fn as_faer_mat(&self, rows: usize, cols: usize) -> MatRef<'_, T> {
        assert_eq!(
            rows * cols,
            self.len(),
            "matrix dimensions ({} x {}) must match tensor size ({})",
            rows,
            cols,
            self.len()
        );
        MatRef::from_column_major_slice(self.data(), rows, cols)
    }

    fn as_faer_mat_mut(&mut self, rows: usize, cols: usize) -> MatMut<'_, T> {
        assert_eq!(
            rows * cols,
            self.len(),
            "matrix dimensions ({} x {}) must match tensor size ({})",
            rows,
            cols,
            self.len()
        );
        MatMut::from_column_major_slice_mut(self.data_mut(), rows, cols)
    }
}

/// Copy a faer matrix into a rank-2 tensor of shape `[rows, cols]`.
pub fn tensor_from_faer_mat<T: Scalar>(mat: MatRef<'_, T>) -> DenseTensor<T> {
    let rows = mat.nrows();
    let cols = mat.ncols();
    let mut data = Vec::with_capacity(rows * cols);
    for j in 0..cols {
        for i in 0..rows {
            data.push(mat[(i, j)]);
        }
    }
    DenseTensor::from_raw(data, vec![rows, cols])
}
