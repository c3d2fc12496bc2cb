//! BlockTensor - the set of nonzero blocks representing one tensor.
//!
//! Blocks whose label tuple is forbidden by symmetry are implicitly zero
//! and never stored. All blocks share one rank; the [`ShapeTag`] records
//! what each leg means, and `delta_quantum` the net quantum number an
//! operator tensor carries.

use std::fmt;
use std::ops::{Mul, Neg};

use rand::Rng;

use super::block::Block;
use super::shape_tag::ShapeTag;
use crate::error::TensorError;
use crate::random::RandomUniform;
use crate::scalar::Scalar;
use crate::symmetry::{QuantumLabel, StateInfo};

/// A block-sparse tensor.
///
/// # Example
///
/// ```
/// use qntensors::blocksparse::{Block, BlockTensor, ShapeTag};
/// use qntensors::symmetry::SZ;
///
/// let vac = SZ::default();
/// let up = SZ::new(1, 1, 0);
/// let blocks = vec![
///     Block::zeros([vac, vac, vac], &[1, 1, 1]).unwrap(),
///     Block::zeros([vac, up, up], &[1, 1, 2]).unwrap(),
/// ];
/// let mps: BlockTensor<SZ> = BlockTensor::new(blocks, None).unwrap();
/// assert_eq!(mps.shape_tag(), ShapeTag::ThreeIndexMps);
/// assert_eq!(mps.n_blocks(), 2);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct BlockTensor<Q: QuantumLabel, ElT: Scalar = f64> {
    blocks: Vec<Block<Q, ElT>>,
    rank: usize,
    shape_tag: ShapeTag,
    delta_quantum: Option<Q>,
}

impl<Q: QuantumLabel, ElT: Scalar> BlockTensor<Q, ElT> {
    /// Create a block tensor.
    ///
    /// Without an explicit tag, rank-3 blocks default to
    /// [`ShapeTag::ThreeIndexMps`] and rank-4 blocks to
    /// [`ShapeTag::FourIndexMpo`]. An explicit tag is taken as given; it
    /// only selects sign rules, so blocks of any rank may carry any tag.
    ///
    /// # Errors
    ///
    /// - `RankMismatch` if blocks disagree on rank
    /// - `UndeterminedShapeTag` if no tag is given and the rank is neither
    ///   3 nor 4 (this includes an empty block list)
    pub fn new(
        blocks: Vec<Block<Q, ElT>>,
        shape_tag: Option<ShapeTag>,
    ) -> Result<Self, TensorError> {
        let rank = blocks.first().map(Block::rank);
        if let Some(rank) = rank {
            if let Some(bad) = blocks.iter().find(|b| b.rank() != rank) {
                return Err(TensorError::RankMismatch {
                    expected: rank,
                    actual: bad.rank(),
                });
            }
        }
        let shape_tag = match shape_tag {
            Some(tag) => tag,
            None => {
                let rank = rank.unwrap_or(0);
                ShapeTag::default_for_rank(rank)
                    .ok_or(TensorError::UndeterminedShapeTag { rank })?
            }
        };
        Ok(Self {
            blocks,
            rank: rank.unwrap_or(shape_tag.rank()),
            shape_tag,
            delta_quantum: None,
        })
    }

    /// An empty tensor with the given tag, of the tag's nominal rank.
    pub fn empty(shape_tag: ShapeTag) -> Self {
        Self::empty_with_rank(shape_tag, shape_tag.rank())
    }

    pub(crate) fn empty_with_rank(shape_tag: ShapeTag, rank: usize) -> Self {
        Self {
            blocks: Vec::new(),
            rank,
            shape_tag,
            delta_quantum: None,
        }
    }

    /// Attach the net quantum number carried by the tensor.
    pub fn with_delta_quantum(mut self, delta_quantum: Q) -> Self {
        self.delta_quantum = Some(delta_quantum);
        self
    }

    /// Allocate a zero-filled three-leg state tensor.
    ///
    /// Every `(l, m)` label pair whose fusion `l + m` appears in `right`
    /// gets a `dim(l) x dim(m) x dim(l + m)` zero block labelled
    /// `(l, m, l + m)`.
    ///
    /// # Example
    ///
    /// ```
    /// use qntensors::blocksparse::BlockTensor;
    /// use qntensors::symmetry::{SZ, StateInfo};
    ///
    /// let vac = SZ::default();
    /// let up = SZ::new(1, 1, 0);
    /// let left = StateInfo::from_pairs([(vac, 1)]);
    /// let mid = StateInfo::from_pairs([(vac, 1), (up, 1)]);
    /// let right = StateInfo::from_pairs([(up, 3)]);
    ///
    /// let mps: BlockTensor<SZ> = BlockTensor::init_from_state_info(&left, &mid, &right);
    /// assert_eq!(mps.n_blocks(), 1);
    /// assert_eq!(mps.blocks()[0].shape(), &[1, 1, 3]);
    /// ```
    pub fn init_from_state_info(
        left: &StateInfo<Q>,
        mid: &StateInfo<Q>,
        right: &StateInfo<Q>,
    ) -> Self {
        let mut blocks = Vec::new();
        for (ql, dl) in left.iter() {
            for (qm, dm) in mid.iter() {
                let qr = ql.clone() + qm.clone();
                if let Some(dr) = right.dim(&qr) {
                    let labels = [ql.clone(), qm.clone(), qr].into_iter().collect();
                    blocks.push(Block::zeros_unchecked(labels, &[dl, dm, dr]));
                }
            }
        }
        Self {
            blocks,
            rank: 3,
            shape_tag: ShapeTag::ThreeIndexMps,
            delta_quantum: Some(Q::default()),
        }
    }

    /// Rank shared by all blocks, kept when the tensor has none.
    #[inline]
    pub fn rank(&self) -> usize {
        self.rank
    }

    /// Number of stored (nonzero) blocks.
    #[inline]
    pub fn n_blocks(&self) -> usize {
        self.blocks.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    #[inline]
    pub fn blocks(&self) -> &[Block<Q, ElT>] {
        &self.blocks
    }

    /// Mutable access to the blocks; the block list itself is fixed.
    #[inline]
    pub fn blocks_mut(&mut self) -> &mut [Block<Q, ElT>] {
        &mut self.blocks
    }

    pub fn into_blocks(self) -> Vec<Block<Q, ElT>> {
        self.blocks
    }

    #[inline]
    pub fn shape_tag(&self) -> ShapeTag {
        self.shape_tag
    }

    #[inline]
    pub fn delta_quantum(&self) -> Option<&Q> {
        self.delta_quantum.as_ref()
    }

    /// Find the block with exactly these labels.
    pub fn find_block(&self, labels: &[Q]) -> Option<&Block<Q, ElT>> {
        self.blocks.iter().find(|b| b.labels() == labels)
    }

    /// Set every element of every block to zero.
    pub fn clear(&mut self) {
        for block in &mut self.blocks {
            block.clear();
        }
    }

    /// Frobenius norm over all blocks.
    pub fn norm(&self) -> f64 {
        self.blocks
            .iter()
            .map(|b| b.data().norm_sqr())
            .sum::<f64>()
            .sqrt()
    }

    /// Multiply every block by a scalar.
    pub fn scale(&self, factor: ElT) -> Self {
        self.map_blocks(|b| b.scale(factor))
    }

    /// Derive the leg-shape map of leg `leg`: every label seen there and
    /// its dimension.
    ///
    /// # Errors
    ///
    /// - `InvalidLeg` if `leg` is out of range
    /// - `InconsistentLegDimension` if two blocks disagree on the dimension
    ///   of the same label
    pub fn get_state_info(&self, leg: usize) -> Result<StateInfo<Q>, TensorError> {
        if leg >= self.rank() {
            return Err(TensorError::InvalidLeg {
                leg: leg as isize,
                rank: self.rank(),
            });
        }
        let mut info = StateInfo::new();
        for block in &self.blocks {
            let label = &block.labels()[leg];
            let dim = block.shape()[leg];
            match info.dim(label) {
                Some(expected) if expected != dim => {
                    return Err(TensorError::InconsistentLegDimension {
                        leg,
                        label: format!("{:?}", label),
                        expected,
                        actual: dim,
                    });
                }
                Some(_) => {}
                None => {
                    info.insert(label.clone(), dim);
                }
            }
        }
        Ok(info)
    }

    pub(crate) fn set_blocks(&mut self, blocks: Vec<Block<Q, ElT>>) {
        self.blocks = blocks;
    }

    /// A tensor with the same tag and `delta_quantum` but new blocks.
    pub(crate) fn with_blocks(&self, blocks: Vec<Block<Q, ElT>>) -> Self {
        Self {
            blocks,
            rank: self.rank,
            shape_tag: self.shape_tag,
            delta_quantum: self.delta_quantum.clone(),
        }
    }

    fn map_blocks<F: Fn(&Block<Q, ElT>) -> Block<Q, ElT>>(&self, f: F) -> Self {
        self.with_blocks(self.blocks.iter().map(f).collect())
    }
}

impl<Q: QuantumLabel, ElT: RandomUniform> BlockTensor<Q, ElT> {
    /// Fill every block with uniform random values in `[low, high)`.
    pub fn randomize(&mut self, low: f64, high: f64) {
        self.randomize_with_rng(&mut rand::rng(), low, high);
    }

    pub fn randomize_with_rng<R: Rng>(&mut self, rng: &mut R, low: f64, high: f64) {
        for block in &mut self.blocks {
            block.randomize_with_rng(rng, low, high);
        }
    }
}

impl<Q: QuantumLabel, ElT: Scalar> Mul<ElT> for &BlockTensor<Q, ElT> {
    type Output = BlockTensor<Q, ElT>;

    fn mul(self, factor: ElT) -> BlockTensor<Q, ElT> {
        self.scale(factor)
    }
}

impl<Q: QuantumLabel, ElT: Scalar> Neg for &BlockTensor<Q, ElT> {
    type Output = BlockTensor<Q, ElT>;

    fn neg(self) -> BlockTensor<Q, ElT> {
        self.map_blocks(|b| -b)
    }
}

impl<Q: QuantumLabel, ElT: Scalar> fmt::Display for BlockTensor<Q, ElT> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, block) in self.blocks.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{:3} {}", i, block)?;
        }
        Ok(())
    }
}
