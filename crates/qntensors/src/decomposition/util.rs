//! Flatten a label group into one matrix, and split factors back into blocks.
//!
//! For the `Last` boundary every block is viewed as a `(leading, bond)`
//! matrix and the group is stacked vertically. For the `First` boundary
//! every block is a `(bond, trailing)` matrix and the group is stacked
//! horizontally. The "stacked axis" below is the row axis in the first case
//! and the column axis in the second.

use crate::blocksparse::{Block, Boundary, LabelGroup};
use crate::error::TensorError;
use crate::scalar::Scalar;
use crate::symmetry::QuantumLabel;
use crate::tensor::DenseTensor;

/// A label group flattened into one matrix.
pub(crate) struct Stacked<ElT: Scalar> {
    /// Rank-2, `(sum(extents), bond)` or `(bond, sum(extents))`.
    pub matrix: DenseTensor<ElT>,
    /// Length of each member along the stacked axis, in member order.
    pub extents: Vec<usize>,
    /// Original shape of each member.
    pub shapes: Vec<Vec<usize>>,
    /// Dimension of the shared boundary leg.
    pub bond: usize,
}

impl<ElT: Scalar> Stacked<ElT> {
    pub fn stacked_len(&self) -> usize {
        self.extents.iter().sum()
    }

    /// Start of each member along the stacked axis.
    pub fn offsets(&self) -> Vec<usize> {
        self.extents
            .iter()
            .scan(0, |acc, &e| {
                let start = *acc;
                *acc += e;
                Some(start)
            })
            .collect()
    }
}

/// Flatten the members of `group` around their boundary leg.
///
/// # Errors
///
/// Returns `InconsistentLegDimension` if two members disagree on the
/// dimension of the boundary leg.
pub(crate) fn stack_group<Q: QuantumLabel, ElT: Scalar>(
    blocks: &[Block<Q, ElT>],
    group: &LabelGroup<Q>,
    boundary: Boundary,
) -> Result<Stacked<ElT>, TensorError> {
    let first = &blocks[group.members[0]];
    let leg = boundary.leg(first.rank());
    let bond = first.shape()[leg];

    let mut extents = Vec::with_capacity(group.members.len());
    let mut shapes = Vec::with_capacity(group.members.len());
    for &m in &group.members {
        let block = &blocks[m];
        let dim = block.shape()[leg];
        if dim != bond {
            return Err(TensorError::InconsistentLegDimension {
                leg,
                label: format!("{:?}", group.label),
                expected: bond,
                actual: dim,
            });
        }
        extents.push(free_dims(block.shape(), boundary).iter().product());
        shapes.push(block.shape().to_vec());
    }
    let total: usize = extents.iter().sum();

    let mut data = Vec::with_capacity(total * bond);
    let (shape, matrix) = match boundary {
        Boundary::Last => {
            // Column j of the stack is column j of every member in turn.
            for j in 0..bond {
                for (&m, &e) in group.members.iter().zip(&extents) {
                    data.extend_from_slice(&blocks[m].data().data()[j * e..(j + 1) * e]);
                }
            }
            ([total, bond], data)
        }
        Boundary::First => {
            for &m in &group.members {
                data.extend_from_slice(blocks[m].data().data());
            }
            ([bond, total], data)
        }
    };

    Ok(Stacked {
        matrix: DenseTensor::from_raw(matrix, shape.to_vec()),
        extents,
        shapes,
        bond,
    })
}

/// The legs of a block other than its boundary leg.
pub(crate) fn free_dims(shape: &[usize], boundary: Boundary) -> &[usize] {
    match boundary {
        Boundary::Last => &shape[..shape.len() - 1],
        Boundary::First => &shape[1..],
    }
}

/// Rebuild one member's data from a factor of the stacked matrix.
///
/// `value(p, a)` is the factor entry at stacked position `p` and new bond
/// index `a`; the member occupies `offset..offset + extent` of the stacked
/// axis. The result has the member's free legs and a boundary leg of
/// dimension `new_bond`.
pub(crate) fn unstack_member<ElT: Scalar>(
    free: &[usize],
    boundary: Boundary,
    offset: usize,
    extent: usize,
    new_bond: usize,
    value: impl Fn(usize, usize) -> ElT,
) -> DenseTensor<ElT> {
    let mut data = Vec::with_capacity(extent * new_bond);
    let shape = match boundary {
        Boundary::Last => {
            for a in 0..new_bond {
                for p in offset..offset + extent {
                    data.push(value(p, a));
                }
            }
            let mut shape = free.to_vec();
            shape.push(new_bond);
            shape
        }
        Boundary::First => {
            for p in offset..offset + extent {
                for a in 0..new_bond {
                    data.push(value(p, a));
                }
            }
            let mut shape = vec![new_bond];
            shape.extend_from_slice(free);
            shape
        }
    };
    DenseTensor::from_raw(data, shape)
}

/// A `rows x cols` matrix with entries `value(i, j)`.
pub(crate) fn matrix_from_fn<ElT: Scalar>(
    rows: usize,
    cols: usize,
    value: impl Fn(usize, usize) -> ElT,
) -> DenseTensor<ElT> {
    let mut data = Vec::with_capacity(rows * cols);
    for j in 0..cols {
        for i in 0..rows {
            data.push(value(i, j));
        }
    }
    DenseTensor::from_raw(data, vec![rows, cols])
}
