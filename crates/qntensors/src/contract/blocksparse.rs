//! Block-sparse tensor contraction.
//!
//! The algorithm is a hash join on the labels of the contracted legs:
//!
//! 1. Index the blocks of `b` by their labels on `legs_b`
//! 2. For each block of `a`, look up the `b` blocks whose contracted labels
//!    equal its own labels on `legs_a`; any other pair is zero by symmetry
//!    and is never visited
//! 3. Contract each matching pair densely, apply the fermionic sign
//! 4. Sum contributions that land on the same output labels
//!
//! Several internal label combinations can funnel into the same external
//! labels, so step 4 must accumulate rather than overwrite.

use std::collections::HashMap;

use log::{debug, trace};

use super::dense::tensordot;
use super::sign::{LegList, SignRuleRegistry};
use crate::blocksparse::{Block, BlockTensor, Labels, ShapeTag};
use crate::error::TensorError;
use crate::scalar::Scalar;
use crate::symmetry::QuantumLabel;
use crate::tensor::DenseTensor;

/// Result of a block-sparse contraction.
#[derive(Clone, Debug, PartialEq)]
pub enum Contracted<Q: QuantumLabel, ElT: Scalar> {
    /// Some legs remain.
    Tensor(BlockTensor<Q, ElT>),
    /// Every leg was contracted.
    Scalar(ElT),
}

impl<Q: QuantumLabel, ElT: Scalar> Contracted<Q, ElT> {
    pub fn into_tensor(self) -> Option<BlockTensor<Q, ElT>> {
        match self {
            Contracted::Tensor(t) => Some(t),
            Contracted::Scalar(_) => None,
        }
    }

    pub fn into_scalar(self) -> Option<ElT> {
        match self {
            Contracted::Scalar(s) => Some(s),
            Contracted::Tensor(_) => None,
        }
    }
}

/// Contract two block tensors using the standard sign rules.
///
/// `legs_a[i]` of `a` is contracted with `legs_b[i]` of `b`; negative
/// positions count from the end. The output legs are the remaining legs of
/// `a` in ascending order followed by the remaining legs of `b`.
///
/// The output tag comes from the matching sign rule, otherwise from the
/// output rank (3 or 4); see [`contract_with`] to supply it explicitly.
///
/// # Example
///
/// ```
/// use qntensors::blocksparse::{Block, BlockTensor};
/// use qntensors::contract::contract;
/// use qntensors::symmetry::SZ;
/// use qntensors::DenseTensor;
///
/// let q = SZ::default();
/// let data = DenseTensor::from_vec(vec![2.0, 3.0], &[1, 1, 2]).unwrap();
/// let mps: BlockTensor<SZ> = BlockTensor::new(vec![Block::new([q, q, q], data).unwrap()], None).unwrap();
///
/// // <mps|mps>
/// let norm_sqr = contract(&mps, &mps, &[0, 1, 2], &[0, 1, 2]).unwrap();
/// assert_eq!(norm_sqr.into_scalar(), Some(13.0));
/// ```
pub fn contract<Q: QuantumLabel, ElT: Scalar>(
    a: &BlockTensor<Q, ElT>,
    b: &BlockTensor<Q, ElT>,
    legs_a: &[isize],
    legs_b: &[isize],
) -> Result<Contracted<Q, ElT>, TensorError> {
    contract_with(&SignRuleRegistry::standard(), a, b, legs_a, legs_b, None)
}

/// Contract with the standard sign rules and a caller-supplied output tag.
pub fn contract_with_tag<Q: QuantumLabel, ElT: Scalar>(
    a: &BlockTensor<Q, ElT>,
    b: &BlockTensor<Q, ElT>,
    legs_a: &[isize],
    legs_b: &[isize],
    output_tag: ShapeTag,
) -> Result<Contracted<Q, ElT>, TensorError> {
    contract_with(
        &SignRuleRegistry::standard(),
        a,
        b,
        legs_a,
        legs_b,
        Some(output_tag),
    )
}

/// Contract two block tensors with an explicit sign-rule registry.
///
/// `output_tag` overrides the tag declared by the matching rule.
///
/// # Errors
///
/// - `LegCountMismatch` if the leg lists differ in length
/// - `InvalidLeg` for an out-of-range or repeated leg
/// - `ContractedDimMismatch` if a matched block pair disagrees on the
///   dimension of a contracted leg
/// - `UndeterminedShapeTag` if no tag is supplied, no rule matches, and
///   the output rank is neither 3 nor 4
pub fn contract_with<Q: QuantumLabel, ElT: Scalar>(
    registry: &SignRuleRegistry<Q>,
    a: &BlockTensor<Q, ElT>,
    b: &BlockTensor<Q, ElT>,
    legs_a: &[isize],
    legs_b: &[isize],
    output_tag: Option<ShapeTag>,
) -> Result<Contracted<Q, ElT>, TensorError> {
    if legs_a.len() != legs_b.len() {
        return Err(TensorError::LegCountMismatch {
            left: legs_a.len(),
            right: legs_b.len(),
        });
    }
    let idx_a = normalize_legs(legs_a, a.rank())?;
    let idx_b = normalize_legs(legs_b, b.rank())?;
    let out_a: Vec<usize> = (0..a.rank()).filter(|i| !idx_a.contains(i)).collect();
    let out_b: Vec<usize> = (0..b.rank()).filter(|i| !idx_b.contains(i)).collect();

    let rule = registry.lookup(a.shape_tag(), &idx_a, b.shape_tag(), &idx_b);
    debug!(
        blocks_a = a.n_blocks(),
        blocks_b = b.n_blocks(),
        legs = idx_a.len(),
        signed = rule.is_some();
        "Contracting block tensors"
    );

    let mut index_b: HashMap<Labels<Q>, Vec<&Block<Q, ElT>>> = HashMap::new();
    for block_b in b.blocks() {
        index_b
            .entry(select(block_b.labels(), &idx_b))
            .or_default()
            .push(block_b);
    }

    let mut out_blocks: Vec<Block<Q, ElT>> = Vec::new();
    let mut out_index: HashMap<Labels<Q>, usize> = HashMap::new();
    let mut pairs = 0usize;
    for block_a in a.blocks() {
        let Some(partners) = index_b.get(&select(block_a.labels(), &idx_a)) else {
            continue;
        };
        let labels_a = select(block_a.labels(), &out_a);
        for block_b in partners {
            pairs += 1;
            let mut labels = labels_a.clone();
            labels.extend(out_b.iter().map(|&j| block_b.labels()[j].clone()));

            let mut mat = tensordot(block_a.data(), &idx_a, block_b.data(), &idx_b)?;
            if rule.is_some_and(|r| (r.sign)(block_a.labels(), block_b.labels())) {
                mat = mat.scale(-ElT::one());
            }

            match out_index.get(&labels) {
                Some(&i) => accumulate(&mut out_blocks[i], &mat)?,
                None => {
                    out_index.insert(labels.clone(), out_blocks.len());
                    out_blocks.push(Block::new(labels, mat)?);
                }
            }
        }
    }
    debug!(pairs = pairs, blocks_out = out_blocks.len(); "Contracted block tensors");

    if out_a.is_empty() && out_b.is_empty() {
        let value = out_blocks
            .first()
            .map_or_else(ElT::zero, |block| block.data().data()[0]);
        return Ok(Contracted::Scalar(value));
    }

    let rank = out_a.len() + out_b.len();
    let tag = output_tag
        .or(rule.map(|r| r.output_tag))
        .or_else(|| ShapeTag::default_for_rank(rank))
        .ok_or(TensorError::UndeterminedShapeTag { rank })?;
    trace!(tag:? = tag, rank = rank; "Resolved contraction output tag");

    let tensor = if out_blocks.is_empty() {
        BlockTensor::empty_with_rank(tag, rank)
    } else {
        BlockTensor::new(out_blocks, Some(tag))?
    };
    let tensor = match (a.delta_quantum(), b.delta_quantum()) {
        (Some(da), Some(db)) => tensor.with_delta_quantum(da.clone() + db.clone()),
        _ => tensor,
    };
    Ok(Contracted::Tensor(tensor))
}

/// Resolve negative leg positions and reject out-of-range or repeated legs.
fn normalize_legs(legs: &[isize], rank: usize) -> Result<LegList, TensorError> {
    let mut normalized = LegList::new();
    for &leg in legs {
        let resolved = if leg < 0 { leg + rank as isize } else { leg };
        if resolved < 0 || resolved as usize >= rank || normalized.contains(&(resolved as usize)) {
            return Err(TensorError::InvalidLeg { leg, rank });
        }
        normalized.push(resolved as usize);
    }
    Ok(normalized)
}

fn select<Q: QuantumLabel>(labels: &[Q], legs: &[usize]) -> Labels<Q> {
    legs.iter().map(|&i| labels[i].clone()).collect()
}

fn accumulate<Q: QuantumLabel, ElT: Scalar>(
    block: &mut Block<Q, ElT>,
    contribution: &DenseTensor<ElT>,
) -> Result<(), TensorError> {
    if block.shape() != contribution.shape() {
        return Err(TensorError::ShapeMismatch {
            expected: block.data().len(),
            actual: contribution.len(),
        });
    }
    for (x, &y) in block.values_mut().iter_mut().zip(contribution.data()) {
        *x += y;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symmetry::SZ;
    use approx::assert_relative_eq;

    const VAC: SZ = SZ::new(0, 0, 0);
    const UP: SZ = SZ::new(1, 1, 0);
    const DOWN: SZ = SZ::new(1, -1, 0);

    fn block(labels: &[SZ], shape: &[usize], seed: f64) -> Block<SZ> {
        let n: usize = shape.iter().product();
        let data = DenseTensor::from_vec((0..n).map(|x| seed + x as f64).collect(), shape)
            .unwrap();
        Block::new(labels.iter().copied(), data).unwrap()
    }

    #[test]
    fn test_normalize_legs() {
        assert_eq!(normalize_legs(&[-1, 0], 3).unwrap().as_slice(), &[2, 0]);
        assert!(normalize_legs(&[3], 3).is_err());
        assert!(normalize_legs(&[-4], 3).is_err());
        assert!(normalize_legs(&[1, -2], 3).is_err());
    }

    #[test]
    fn test_leg_count_mismatch() {
        let t = BlockTensor::new(vec![block(&[VAC, VAC, VAC], &[1, 1, 1], 1.0)], None).unwrap();
        let err = contract(&t, &t, &[0, 1], &[0]).unwrap_err();
        assert_eq!(err, TensorError::LegCountMismatch { left: 2, right: 1 });
    }

    #[test]
    fn test_scalar_from_empty_match_is_zero() {
        let a = BlockTensor::new(vec![block(&[VAC, UP, UP], &[1, 1, 2], 1.0)], None).unwrap();
        let b = BlockTensor::new(vec![block(&[VAC, DOWN, DOWN], &[1, 1, 2], 1.0)], None).unwrap();
        let result = contract(&a, &b, &[0, 1, 2], &[0, 1, 2]).unwrap();
        assert_eq!(result, Contracted::Scalar(0.0));
    }

    #[test]
    fn test_unregistered_rank_falls_back_or_fails() {
        let a = BlockTensor::new(vec![block(&[VAC, UP, UP], &[1, 1, 2], 1.0)], None).unwrap();
        // Contract the bond: rank 2 + 2 = 4 -> default four-leg tag.
        let four = contract(&a, &a, &[2], &[2]).unwrap().into_tensor().unwrap();
        assert_eq!(four.shape_tag(), ShapeTag::FourIndexMpo);

        // Rank 1 + 1 = 2 output has no default.
        let err = contract(&a, &a, &[0, 1], &[0, 1]).unwrap_err();
        assert_eq!(err, TensorError::UndeterminedShapeTag { rank: 2 });

        // ... unless the caller names it.
        let fused = contract_with_tag(&a, &a, &[0, 1], &[0, 1], ShapeTag::LeftFusedMps)
            .unwrap()
            .into_tensor()
            .unwrap();
        assert_eq!(fused.rank(), 2);
        assert_eq!(fused.blocks()[0].shape(), &[2, 2]);
    }

    #[test]
    fn test_sign_applied_only_for_odd_pairs() {
        // Creation operator c^dagger_up: up = UP, down = VAC, left/right bond VAC -> UP.
        let op = BlockTensor::new(vec![block(&[VAC, UP, VAC, UP], &[1, 1, 1, 1], 1.0)], None)
            .unwrap();
        // Site tensor with an odd left bond, and with an even one.
        let odd = BlockTensor::new(vec![block(&[UP, VAC, UP], &[1, 1, 1], 2.0)], None).unwrap();
        let even = BlockTensor::new(vec![block(&[VAC, VAC, VAC], &[1, 1, 1], 2.0)], None).unwrap();

        let r_odd = contract(&op, &odd, &[2], &[1]).unwrap().into_tensor().unwrap();
        let r_even = contract(&op, &even, &[2], &[1]).unwrap().into_tensor().unwrap();
        assert_eq!(r_odd.shape_tag(), ShapeTag::UnfusedThreeIndexMps);
        assert_eq!(r_odd.rank(), 5);
        assert_relative_eq!(r_odd.blocks()[0].data().data()[0], -2.0);
        assert_relative_eq!(r_even.blocks()[0].data().data()[0], 2.0);
        assert_eq!(r_odd.blocks()[0].labels(), &[VAC, UP, UP, UP, UP]);
    }

    #[test]
    fn test_empty_registry_is_bosonic() {
        let op = BlockTensor::new(vec![block(&[VAC, UP, VAC, UP], &[1, 1, 1, 1], 1.0)], None)
            .unwrap();
        let odd = BlockTensor::new(vec![block(&[UP, VAC, UP], &[1, 1, 1], 2.0)], None).unwrap();
        let result = contract_with(
            &SignRuleRegistry::empty(),
            &op,
            &odd,
            &[2],
            &[1],
            Some(ShapeTag::UnfusedThreeIndexMps),
        )
        .unwrap()
        .into_tensor()
        .unwrap();
        assert_relative_eq!(result.blocks()[0].data().data()[0], 2.0);
    }

    #[test]
    fn test_empty_output_keeps_output_rank() {
        let a = BlockTensor::new(vec![block(&[VAC, UP, UP], &[1, 1, 2], 1.0)], None).unwrap();
        let b = BlockTensor::new(vec![block(&[DOWN, DOWN, DOWN], &[1, 1, 2], 1.0)], None).unwrap();
        let out = contract_with_tag(&a, &b, &[1, 2], &[1, 2], ShapeTag::TwoSiteMpo)
            .unwrap()
            .into_tensor()
            .unwrap();
        assert!(out.is_empty());
        assert_eq!(out.rank(), 2);
        assert_eq!(out.shape_tag(), ShapeTag::TwoSiteMpo);
    }

    #[test]
    fn test_delta_quantum_combines() {
        let op = BlockTensor::new(vec![block(&[VAC, UP, VAC, UP], &[1, 1, 1, 1], 1.0)], None)
            .unwrap()
            .with_delta_quantum(UP);
        let site = BlockTensor::new(vec![block(&[VAC, VAC, VAC], &[1, 1, 1], 1.0)], None)
            .unwrap()
            .with_delta_quantum(VAC);
        let result = contract(&op, &site, &[2], &[1]).unwrap().into_tensor().unwrap();
        assert_eq!(result.delta_quantum(), Some(&UP));
    }
}
