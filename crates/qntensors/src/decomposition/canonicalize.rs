//! QR canonicalization of block tensors.

use faer::linalg::solvers::Qr;
use log::{debug, trace};

use super::CarryMap;
use super::util::{Stacked, free_dims, stack_group, unstack_member};
use crate::backend::{AsFaerMat, tensor_from_faer_mat};
use crate::blocksparse::{Block, BlockTensor, Boundary, group_by_boundary};
use crate::error::TensorError;
use crate::scalar::Scalar;
use crate::symmetry::QuantumLabel;
use crate::tensor::DenseTensor;

impl<Q: QuantumLabel, ElT: Scalar> BlockTensor<Q, ElT> {
    /// Make the tensor left-orthonormal with respect to its last leg.
    ///
    /// Blocks sharing a last-leg label are flattened to `(leading, bond)`,
    /// stacked vertically and QR-decomposed together. Each block is replaced
    /// by its slice of `Q`; the last-leg dimension becomes `min(rows, bond)`.
    /// The `R` factor of each group is returned under the group's label and
    /// should be applied to the next tensor with
    /// [`left_multiply`](Self::left_multiply).
    ///
    /// # Errors
    ///
    /// Returns `InconsistentLegDimension` if blocks sharing a label disagree
    /// on the dimension of the last leg. The tensor is unchanged on error.
    ///
    /// # Example
    ///
    /// ```
    /// use qntensors::blocksparse::{Block, BlockTensor};
    /// use qntensors::symmetry::SZ;
    /// use qntensors::DenseTensor;
    ///
    /// let q = SZ::default();
    /// let data = DenseTensor::from_vec(vec![3.0, 4.0], &[2, 1, 1]).unwrap();
    /// let mut mps: BlockTensor<SZ> =
    ///     BlockTensor::new(vec![Block::new([q, q, q], data).unwrap()], None).unwrap();
    ///
    /// let carry = mps.left_canonicalize().unwrap();
    /// assert!((carry[&q].data()[0].abs() - 5.0).abs() < 1e-12);
    /// assert!((mps.norm() - 1.0).abs() < 1e-12);
    /// ```
    pub fn left_canonicalize(&mut self) -> Result<CarryMap<Q, ElT>, TensorError> {
        self.canonicalize(Boundary::Last)
    }

    /// Make the tensor right-orthonormal with respect to its first leg.
    ///
    /// Mirror of [`left_canonicalize`](Self::left_canonicalize): blocks are
    /// grouped by first-leg label, flattened to `(bond, trailing)` and
    /// stacked horizontally, and the QR is taken of the transpose. The
    /// returned carry is `L = Rᵀ` of shape `(bond, k)`, to be applied to the
    /// previous tensor with [`right_multiply`](Self::right_multiply).
    pub fn right_canonicalize(&mut self) -> Result<CarryMap<Q, ElT>, TensorError> {
        self.canonicalize(Boundary::First)
    }

    fn canonicalize(&mut self, boundary: Boundary) -> Result<CarryMap<Q, ElT>, TensorError> {
        let groups = group_by_boundary(self.blocks(), boundary)?;
        debug!(
            boundary:? = boundary,
            blocks = self.n_blocks(),
            groups = groups.len();
            "Canonicalizing block tensor"
        );

        let mut replaced: Vec<Option<Block<Q, ElT>>> = vec![None; self.n_blocks()];
        let mut carry = CarryMap::with_capacity(groups.len());
        for group in &groups {
            let stacked = stack_group(self.blocks(), group, boundary)?;
            let (factors, carry_mat) = qr_group(&stacked, boundary);
            trace!(
                label:? = group.label,
                members = group.members.len(),
                stacked = stacked.stacked_len(),
                bond = stacked.bond;
                "QR of label group"
            );
            for (member, data) in group.members.iter().zip(factors) {
                let block = &self.blocks()[*member];
                replaced[*member] = Some(Block::new(block.labels().iter().cloned(), data)?);
            }
            carry.insert(group.label.clone(), carry_mat);
        }

        self.set_blocks(replaced.into_iter().flatten().collect());
        debug!(carry = carry.len(); "Canonicalized block tensor");
        Ok(carry)
    }
}

/// Thin QR of one stacked group: the orthonormal slice for each member and
/// the group's carry matrix.
fn qr_group<ElT: Scalar>(
    stacked: &Stacked<ElT>,
    boundary: Boundary,
) -> (Vec<DenseTensor<ElT>>, DenseTensor<ElT>) {
    let n = stacked.stacked_len();
    let bond = stacked.bond;
    // Rows of the decomposed matrix run along the stacked axis either way.
    let qr: Qr<ElT> = match boundary {
        Boundary::Last => Qr::new(stacked.matrix.as_faer_mat(n, bond)),
        Boundary::First => Qr::new(stacked.matrix.as_faer_mat(bond, n).transpose()),
    };
    let q = qr.compute_thin_Q();
    let r = qr.thin_R();
    let k = n.min(bond);

    let factors = stacked
        .offsets()
        .into_iter()
        .zip(&stacked.extents)
        .zip(&stacked.shapes)
        .map(|((offset, &extent), shape)| {
            unstack_member(free_dims(shape, boundary), boundary, offset, extent, k, |p, a| {
                q[(p, a)]
            })
        })
        .collect();
    let carry = match boundary {
        Boundary::Last => tensor_from_faer_mat(r),
        Boundary::First => tensor_from_faer_mat(r.transpose()),
    };
    (factors, carry)
}
