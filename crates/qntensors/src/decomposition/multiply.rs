//! Absorb carry matrices into a neighbouring tensor.

use log::debug;

use super::CarryMap;
use crate::blocksparse::{Block, BlockTensor};
use crate::contract::tensordot;
use crate::error::TensorError;
use crate::scalar::Scalar;
use crate::symmetry::QuantumLabel;

impl<Q: QuantumLabel, ElT: Scalar> BlockTensor<Q, ElT> {
    /// Multiply each block on its first leg by the carry matrix of its
    /// first-leg label: `block <- mat · block`.
    ///
    /// Blocks whose first-leg label has no carry entry are dropped.
    ///
    /// # Errors
    ///
    /// Returns `ContractedDimMismatch` if a carry matrix's column count
    /// differs from the block's first-leg dimension. The tensor is
    /// unchanged on error.
    pub fn left_multiply(&mut self, carry: &CarryMap<Q, ElT>) -> Result<(), TensorError> {
        let mut blocks = Vec::with_capacity(self.n_blocks());
        for block in self.blocks() {
            let Some(mat) = block.labels().first().and_then(|q| carry.get(q)) else {
                continue;
            };
            let data = tensordot(mat, &[1], block.data(), &[0])?;
            blocks.push(Block::new(block.labels().iter().cloned(), data)?);
        }
        debug!(
            before = self.n_blocks(),
            after = blocks.len();
            "Left-multiplied carry into block tensor"
        );
        self.set_blocks(blocks);
        Ok(())
    }

    /// Multiply each block on its last leg by the carry matrix of its
    /// last-leg label: `block <- block · mat`.
    ///
    /// Blocks whose last-leg label has no carry entry are dropped.
    pub fn right_multiply(&mut self, carry: &CarryMap<Q, ElT>) -> Result<(), TensorError> {
        let mut blocks = Vec::with_capacity(self.n_blocks());
        for block in self.blocks() {
            let Some(mat) = block.labels().last().and_then(|q| carry.get(q)) else {
                continue;
            };
            let data = tensordot(block.data(), &[block.rank() - 1], mat, &[0])?;
            blocks.push(Block::new(block.labels().iter().cloned(), data)?);
        }
        debug!(
            before = self.n_blocks(),
            after = blocks.len();
            "Right-multiplied carry into block tensor"
        );
        self.set_blocks(blocks);
        Ok(())
    }
}
