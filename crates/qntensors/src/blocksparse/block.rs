//! A single nonzero block: one dense array plus its per-leg labels.

use std::fmt;
use std::ops::{Mul, Neg};

use rand::Rng;
use smallvec::SmallVec;

use crate::error::TensorError;
use crate::random::RandomUniform;
use crate::scalar::Scalar;
use crate::symmetry::QuantumLabel;
use crate::tensor::{DEFAULT_ATOL, DEFAULT_RTOL, DenseTensor};

/// Per-leg quantum labels of a block.
///
/// Inline storage covers every tag up to six legs without allocating.
pub type Labels<Q> = SmallVec<[Q; 6]>;

/// A dense block tagged with one quantum label per leg.
///
/// Invariant: `data.ndim() == labels.len()`. A rank-0 block holds a
/// single scalar.
///
/// # Example
///
/// ```
/// use qntensors::blocksparse::Block;
/// use qntensors::symmetry::SZ;
///
/// let q = SZ::new(1, 1, 0);
/// let block: Block<SZ> = Block::zeros([SZ::default(), q, q], &[1, 2, 2]).unwrap();
/// assert_eq!(block.rank(), 3);
/// assert_eq!(block.shape(), &[1, 2, 2]);
/// ```
#[derive(Clone, Debug)]
pub struct Block<Q: QuantumLabel, ElT: Scalar = f64> {
    labels: Labels<Q>,
    data: DenseTensor<ElT>,
}

impl<Q: QuantumLabel, ElT: Scalar> Block<Q, ElT> {
    /// Create a block from its labels and data.
    ///
    /// # Errors
    ///
    /// Returns `TensorError::RankMismatch` if the data rank differs from
    /// the number of labels.
    pub fn new<I: IntoIterator<Item = Q>>(
        labels: I,
        data: DenseTensor<ElT>,
    ) -> Result<Self, TensorError> {
        let labels: Labels<Q> = labels.into_iter().collect();
        if labels.len() != data.ndim() {
            return Err(TensorError::RankMismatch {
                expected: labels.len(),
                actual: data.ndim(),
            });
        }
        Ok(Self { labels, data })
    }

    /// Create a zero-filled block with the given leg dimensions.
    pub fn zeros<I: IntoIterator<Item = Q>>(labels: I, shape: &[usize]) -> Result<Self, TensorError> {
        Self::new(labels, DenseTensor::zeros(shape))
    }

    /// Zero block whose label count is known to equal `shape.len()`.
    pub(crate) fn zeros_unchecked(labels: Labels<Q>, shape: &[usize]) -> Self {
        debug_assert_eq!(labels.len(), shape.len());
        Self {
            labels,
            data: DenseTensor::zeros(shape),
        }
    }

    #[inline]
    pub fn labels(&self) -> &[Q] {
        &self.labels
    }

    #[inline]
    pub fn rank(&self) -> usize {
        self.labels.len()
    }

    #[inline]
    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    #[inline]
    pub fn data(&self) -> &DenseTensor<ElT> {
        &self.data
    }

    /// Mutable access to the block values; the shape stays fixed.
    #[inline]
    pub fn values_mut(&mut self) -> &mut [ElT] {
        self.data.data_mut()
    }

    /// Replace the block data, keeping the labels.
    ///
    /// The new data may have different leg dimensions but must have the
    /// same rank.
    pub fn set_data(&mut self, data: DenseTensor<ElT>) -> Result<(), TensorError> {
        if data.ndim() != self.rank() {
            return Err(TensorError::RankMismatch {
                expected: self.rank(),
                actual: data.ndim(),
            });
        }
        self.data = data;
        Ok(())
    }

    pub fn into_parts(self) -> (Labels<Q>, DenseTensor<ElT>) {
        (self.labels, self.data)
    }

    /// Set every element to zero.
    pub fn clear(&mut self) {
        self.data.fill(ElT::zero());
    }

    /// Multiply by a scalar, returning a new block with the same labels.
    pub fn scale(&self, factor: ElT) -> Self {
        Self {
            labels: self.labels.clone(),
            data: self.data.scale(factor),
        }
    }

    /// Same labels and same array shape; values are not compared.
    pub fn equal_shape(&self, other: &Self) -> bool {
        self.labels == other.labels && self.shape() == other.shape()
    }

    pub fn norm(&self) -> f64 {
        self.data.norm()
    }
}

impl<Q: QuantumLabel, ElT: RandomUniform> Block<Q, ElT> {
    /// Fill with uniform random values in `[low, high)`.
    pub fn randomize(&mut self, low: f64, high: f64) {
        self.randomize_with_rng(&mut rand::rng(), low, high);
    }

    /// Fill with uniform random values in `[low, high)` from a given RNG.
    pub fn randomize_with_rng<R: Rng>(&mut self, rng: &mut R, low: f64, high: f64) {
        for x in self.data.data_mut() {
            *x = ElT::sample_range(rng, low, high);
        }
    }
}

impl<Q: QuantumLabel, ElT: Scalar> PartialEq for Block<Q, ElT> {
    /// Equal labels and values equal within the default `allclose` tolerance.
    fn eq(&self, other: &Self) -> bool {
        self.labels == other.labels && self.data.approx_eq(&other.data, DEFAULT_RTOL, DEFAULT_ATOL)
    }
}

impl<Q: QuantumLabel, ElT: Scalar> Mul<ElT> for &Block<Q, ElT> {
    type Output = Block<Q, ElT>;

    fn mul(self, factor: ElT) -> Block<Q, ElT> {
        self.scale(factor)
    }
}

impl<Q: QuantumLabel, ElT: Scalar> Neg for &Block<Q, ElT> {
    type Output = Block<Q, ElT>;

    fn neg(self) -> Block<Q, ElT> {
        self.scale(-ElT::one())
    }
}

impl<Q: QuantumLabel, ElT: Scalar> fmt::Display for Block<Q, ElT> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "(Q=) {:?} (R=) {:?} {:?}",
            self.labels.as_slice(),
            self.shape(),
            self.data.data()
        )
    }
}
