//! Truncated-SVD compression of block tensors.
//!
//! Grouping and flattening are the same as for canonicalization; each group
//! is decomposed with a thin SVD instead of QR, and the singular values of
//! all groups are truncated together by [`truncate_singular_values`].

use faer::linalg::solvers::{Svd, SvdError};
use log::{debug, trace};

use super::CarryMap;
use super::truncation::{TruncationParams, truncate_singular_values};
use super::util::{Stacked, free_dims, matrix_from_fn, stack_group, unstack_member};
use crate::backend::AsFaerMat;
use crate::blocksparse::{Block, BlockTensor, Boundary, group_by_boundary};
use crate::error::TensorError;
use crate::scalar::Scalar;
use crate::symmetry::QuantumLabel;
use crate::tensor::DenseTensor;

/// Result of [`BlockTensor::left_compress`] or
/// [`BlockTensor::right_compress`].
#[derive(Clone, Debug)]
pub struct Compressed<Q: QuantumLabel, ElT: Scalar> {
    /// The compressed tensor, with the input's tag and `delta_quantum`.
    pub tensor: BlockTensor<Q, ElT>,
    /// Carry matrix per surviving boundary label.
    pub carry: CarryMap<Q, ElT>,
    /// Frobenius norm of the discarded singular values.
    pub error: f64,
}

/// Thin SVD factors of one group, with singular values as `f64`.
struct GroupSvd<ElT: Scalar> {
    stacked: Stacked<ElT>,
    svd: Svd<ElT>,
    singular_values: Vec<f64>,
}

impl<Q: QuantumLabel, ElT: Scalar> BlockTensor<Q, ElT> {
    /// Compress the last leg.
    ///
    /// For each last-leg label group the stacked `(leading, bond)` matrix is
    /// decomposed as `U S Vᴴ`. Kept columns of `U` become the new blocks and
    /// `diag(S) · Vᴴ` restricted to the kept rows is the group's carry, to be
    /// absorbed by the next tensor with
    /// [`left_multiply`](Self::left_multiply). Groups with no surviving
    /// singular value lose all their blocks and have no carry entry.
    ///
    /// # Errors
    ///
    /// - `InvalidCutoff` for a negative or NaN cutoff
    /// - `InconsistentLegDimension` if blocks sharing a label disagree on
    ///   the last-leg dimension
    /// - `SvdError` if an SVD fails to converge
    ///
    /// # Example
    ///
    /// ```
    /// use qntensors::blocksparse::{Block, BlockTensor};
    /// use qntensors::decomposition::TruncationParams;
    /// use qntensors::symmetry::SZ;
    /// use qntensors::DenseTensor;
    ///
    /// let q = SZ::default();
    /// // Rank-1 2x2 matrix on the (left, right) legs.
    /// let data = DenseTensor::from_vec(vec![1.0, 2.0, 2.0, 4.0], &[2, 1, 2]).unwrap();
    /// let mps: BlockTensor<SZ> =
    ///     BlockTensor::new(vec![Block::new([q, q, q], data).unwrap()], None).unwrap();
    ///
    /// let out = mps.left_compress(&TruncationParams::default().with_cutoff(1e-10)).unwrap();
    /// assert_eq!(out.tensor.blocks()[0].shape(), &[2, 1, 1]);
    /// assert!(out.error < 1e-10);
    /// ```
    pub fn left_compress(
        &self,
        params: &TruncationParams,
    ) -> Result<Compressed<Q, ElT>, TensorError> {
        self.compress(params, Boundary::Last)
    }

    /// Compress the first leg.
    ///
    /// Mirror of [`left_compress`](Self::left_compress): groups by first-leg
    /// label, stacks `(bond, trailing)` horizontally, keeps rows of `Vᴴ` as
    /// the new blocks and returns `U · diag(S)` on the kept columns as the
    /// carry, to be absorbed by the previous tensor with
    /// [`right_multiply`](Self::right_multiply).
    pub fn right_compress(
        &self,
        params: &TruncationParams,
    ) -> Result<Compressed<Q, ElT>, TensorError> {
        self.compress(params, Boundary::First)
    }

    fn compress(
        &self,
        params: &TruncationParams,
        boundary: Boundary,
    ) -> Result<Compressed<Q, ElT>, TensorError> {
        params.validate()?;
        let groups = group_by_boundary(self.blocks(), boundary)?;
        debug!(
            boundary:? = boundary,
            blocks = self.n_blocks(),
            groups = groups.len(),
            max_bond_dim:? = params.max_bond_dim,
            cutoff = params.cutoff;
            "Compressing block tensor"
        );

        let mut decomposed = Vec::with_capacity(groups.len());
        for group in &groups {
            let stacked = stack_group(self.blocks(), group, boundary)?;
            let group_svd = svd_group(stacked, boundary)?;
            trace!(
                label:? = group.label,
                members = group.members.len(),
                rank = group_svd.singular_values.len();
                "SVD of label group"
            );
            decomposed.push(group_svd);
        }

        let spectra: Vec<Vec<f64>> = decomposed
            .iter()
            .map(|d| d.singular_values.clone())
            .collect();
        let truncation = truncate_singular_values(&spectra, params)?;

        let mut replaced: Vec<Option<Block<Q, ElT>>> = vec![None; self.n_blocks()];
        let mut carry = CarryMap::with_capacity(groups.len());
        for ((group, d), kept) in groups.iter().zip(&decomposed).zip(&truncation.kept) {
            let Some(kept) = kept else {
                trace!(label:? = group.label; "Label group truncated away");
                continue;
            };
            let (factors, carry_mat) = truncated_factors(d, kept, boundary);
            for (&member, data) in group.members.iter().zip(factors) {
                let labels = self.blocks()[member].labels().iter().cloned();
                replaced[member] = Some(Block::new(labels, data)?);
            }
            carry.insert(group.label.clone(), carry_mat);
        }

        let tensor = self.with_blocks(replaced.into_iter().flatten().collect());
        debug!(
            blocks = tensor.n_blocks(),
            bond_dim = truncation.bond_dim(),
            error = truncation.error;
            "Compressed block tensor"
        );
        Ok(Compressed {
            tensor,
            carry,
            error: truncation.error,
        })
    }
}

/// Thin SVD of a stacked group, rows along the stacked axis for `Last` and
/// along the bond for `First`.
fn svd_group<ElT: Scalar>(
    stacked: Stacked<ElT>,
    boundary: Boundary,
) -> Result<GroupSvd<ElT>, TensorError> {
    let n = stacked.stacked_len();
    let (rows, cols) = match boundary {
        Boundary::Last => (n, stacked.bond),
        Boundary::First => (stacked.bond, n),
    };
    let svd: Svd<ElT> = Svd::new_thin(stacked.matrix.as_faer_mat(rows, cols)).map_err(
        |e: SvdError| TensorError::SvdError {
            message: format!("{:?}", e),
        },
    )?;
    let s = svd.S();
    let singular_values = (0..rows.min(cols)).map(|k| s[k].modulus()).collect();
    Ok(GroupSvd {
        stacked,
        svd,
        singular_values,
    })
}

/// New member data and the carry matrix of one group after truncation.
fn truncated_factors<ElT: Scalar>(
    d: &GroupSvd<ElT>,
    kept: &[usize],
    boundary: Boundary,
) -> (Vec<DenseTensor<ElT>>, DenseTensor<ElT>) {
    let u = d.svd.U();
    let v = d.svd.V();
    let sigma: Vec<ElT> = kept
        .iter()
        .map(|&k| ElT::from_f64(d.singular_values[k]))
        .collect();
    let new_bond = kept.len();
    let stacked = &d.stacked;

    let members = stacked
        .offsets()
        .into_iter()
        .zip(&stacked.extents)
        .zip(&stacked.shapes);
    match boundary {
        Boundary::Last => {
            let factors = members
                .map(|((offset, &extent), shape)| {
                    unstack_member(
                        free_dims(shape, boundary),
                        boundary,
                        offset,
                        extent,
                        new_bond,
                        |p, a| u[(p, kept[a])],
                    )
                })
                .collect();
            // diag(S) · Vᴴ[kept, :]
            let carry = matrix_from_fn(new_bond, stacked.bond, |a, j| {
                sigma[a] * v[(j, kept[a])].conjugate()
            });
            (factors, carry)
        }
        Boundary::First => {
            // Rows of Vᴴ: Vᴴ[a, p] = conj(V[p, a]).
            let factors = members
                .map(|((offset, &extent), shape)| {
                    unstack_member(
                        free_dims(shape, boundary),
                        boundary,
                        offset,
                        extent,
                        new_bond,
                        |p, a| v[(p, kept[a])].conjugate(),
                    )
                })
                .collect();
            // U[:, kept] · diag(S)
            let carry = matrix_from_fn(stacked.bond, new_bond, |i, a| u[(i, kept[a])] * sigma[a]);
            (factors, carry)
        }
    }
}
