//! Partition blocks by the label on a boundary leg.
//!
//! QR and SVD treat every block sharing a boundary label as one matrix;
//! this module finds those groups.

use std::collections::HashMap;

use super::block::Block;
use crate::error::TensorError;
use crate::scalar::Scalar;
use crate::symmetry::QuantumLabel;

/// Which outer leg to group on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Boundary {
    /// Leg 0 (the left bond of a tensor-train site).
    First,
    /// The last leg (the right bond of a tensor-train site).
    Last,
}

impl Boundary {
    /// Position of this boundary on a tensor of the given rank.
    #[inline]
    pub fn leg(self, rank: usize) -> usize {
        match self {
            Boundary::First => 0,
            Boundary::Last => rank.saturating_sub(1),
        }
    }
}

/// The blocks sharing one boundary label, as indices into the block list.
#[derive(Clone, Debug, PartialEq)]
pub struct LabelGroup<Q> {
    pub label: Q,
    pub members: Vec<usize>,
}

/// Group blocks by their label on `boundary`.
///
/// Groups appear in order of first appearance of their label, and members
/// keep their block order within each group.
///
/// # Errors
///
/// Returns `TensorError::InvalidLeg` if any block has rank 0.
///
/// # Example
///
/// ```
/// use qntensors::blocksparse::{Block, Boundary, group_by_boundary};
/// use qntensors::symmetry::SZ;
///
/// let (a, b) = (SZ::new(0, 0, 0), SZ::new(1, 1, 0));
/// let blocks: Vec<Block<SZ>> = vec![
///     Block::zeros([a, b, b], &[1, 1, 1]).unwrap(),
///     Block::zeros([b, a, b], &[1, 1, 1]).unwrap(),
///     Block::zeros([a, a, a], &[1, 1, 1]).unwrap(),
/// ];
/// let groups = group_by_boundary(&blocks, Boundary::Last).unwrap();
/// assert_eq!(groups.len(), 2);
/// assert_eq!(groups[0].label, b);
/// assert_eq!(groups[0].members, vec![0, 1]);
/// ```
pub fn group_by_boundary<Q: QuantumLabel, ElT: Scalar>(
    blocks: &[Block<Q, ElT>],
    boundary: Boundary,
) -> Result<Vec<LabelGroup<Q>>, TensorError> {
    let mut groups: Vec<LabelGroup<Q>> = Vec::new();
    let mut position: HashMap<Q, usize> = HashMap::new();
    for (index, block) in blocks.iter().enumerate() {
        if block.rank() == 0 {
            return Err(TensorError::InvalidLeg { leg: 0, rank: 0 });
        }
        let label = &block.labels()[boundary.leg(block.rank())];
        match position.get(label) {
            Some(&g) => groups[g].members.push(index),
            None => {
                position.insert(label.clone(), groups.len());
                groups.push(LabelGroup {
                    label: label.clone(),
                    members: vec![index],
                });
            }
        }
    }
    Ok(groups)
}
