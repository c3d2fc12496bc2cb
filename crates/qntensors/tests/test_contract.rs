//! Tests for block-sparse contraction.
//!
//! Covers:
//! - matching and accumulation against a dense per-block reference
//! - empty and scalar outcomes
//! - the fermionic sign of an operator applied to a site tensor
//! - bilinearity (property test)

use approx::assert_relative_eq;
use proptest::prelude::*;
use qntensors::blocksparse::{Block, BlockTensor, ShapeTag};
use qntensors::contract::{Contracted, SignRuleRegistry, contract, contract_with, contract_with_tag};
use qntensors::symmetry::{SZ, StateInfo};
use qntensors::{DenseTensor, TensorError, c64, tensordot};
use rand::SeedableRng;
use rand::rngs::StdRng;

const VAC: SZ = SZ::new(0, 0, 0);
const UP: SZ = SZ::new(1, 1, 0);
const DOWN: SZ = SZ::new(1, -1, 0);
const PAIR: SZ = SZ::new(2, 0, 0);

fn random_mps(seed: u64) -> BlockTensor<SZ> {
    let left = StateInfo::from_pairs([(VAC, 2), (UP, 1), (DOWN, 1)]);
    let phys = StateInfo::from_pairs([(VAC, 1), (UP, 1), (DOWN, 1), (PAIR, 1)]);
    let right = StateInfo::from_pairs([(VAC, 2), (UP, 3), (DOWN, 3), (PAIR, 2)]);
    let mut mps = BlockTensor::init_from_state_info(&left, &phys, &right);
    mps.randomize_with_rng(&mut StdRng::seed_from_u64(seed), -1.0, 1.0);
    mps
}

fn block(labels: &[SZ], values: Vec<f64>, shape: &[usize]) -> Block<SZ> {
    Block::new(labels.iter().copied(), DenseTensor::from_vec(values, shape).unwrap()).unwrap()
}

/// Sum of `tensordot` over every block pair whose contracted labels agree
/// and whose free labels equal `out_labels`.
fn reference_block(
    a: &BlockTensor<SZ>,
    b: &BlockTensor<SZ>,
    legs_a: &[usize],
    legs_b: &[usize],
    out_labels: &[SZ],
) -> DenseTensor<f64> {
    let free_a: Vec<usize> = (0..a.rank()).filter(|i| !legs_a.contains(i)).collect();
    let free_b: Vec<usize> = (0..b.rank()).filter(|i| !legs_b.contains(i)).collect();
    let mut total: Option<DenseTensor<f64>> = None;
    for ba in a.blocks() {
        for bb in b.blocks() {
            let matched = legs_a
                .iter()
                .zip(legs_b)
                .all(|(&i, &j)| ba.labels()[i] == bb.labels()[j]);
            let labels: Vec<SZ> = free_a
                .iter()
                .map(|&i| ba.labels()[i])
                .chain(free_b.iter().map(|&j| bb.labels()[j]))
                .collect();
            if !matched || labels != out_labels {
                continue;
            }
            let term = tensordot(ba.data(), legs_a, bb.data(), legs_b).unwrap();
            total = Some(match total {
                None => term,
                Some(mut acc) => {
                    for (x, y) in acc.data_mut().iter_mut().zip(term.data()) {
                        *x += y;
                    }
                    acc
                }
            });
        }
    }
    total.unwrap()
}

#[test]
fn test_bond_contraction_matches_reference() {
    let a = random_mps(1);
    // Neighbour whose left leg is `a`'s right leg.
    let left = a.get_state_info(2).unwrap();
    let phys = StateInfo::from_pairs([(VAC, 1), (UP, 1), (DOWN, 1)]);
    let right = StateInfo::from_pairs([(UP, 2), (DOWN, 2), (PAIR, 2), (SZ::new(3, 1, 0), 1)]);
    let mut b = BlockTensor::init_from_state_info(&left, &phys, &right);
    b.randomize_with_rng(&mut StdRng::seed_from_u64(2), -1.0, 1.0);

    let ab = contract(&a, &b, &[2], &[0]).unwrap().into_tensor().unwrap();
    assert_eq!(ab.rank(), 4);
    assert!(!ab.is_empty());
    for out in ab.blocks() {
        let expected = reference_block(&a, &b, &[2], &[0], out.labels());
        assert!(out.data().approx_eq(&expected, 1e-12, 1e-12));
    }
}

#[test]
fn test_accumulation_over_internal_labels() {
    let a = random_mps(3);
    let b = random_mps(4);
    // Contract physical and right legs: (left_a, left_b) survives, and every
    // (phys, right) pair with the same left labels lands in one output block.
    let overlap = contract_with_tag(&a, &b, &[1, 2], &[1, 2], ShapeTag::LeftFusedMps)
        .unwrap()
        .into_tensor()
        .unwrap();
    assert_eq!(overlap.shape_tag(), ShapeTag::LeftFusedMps);

    let vac_vac = overlap.find_block(&[VAC, VAC]).unwrap();
    assert_eq!(vac_vac.shape(), &[2, 2]);
    let expected = reference_block(&a, &b, &[1, 2], &[1, 2], &[VAC, VAC]);
    assert!(vac_vac.data().approx_eq(&expected, 1e-12, 1e-12));

    // Output labels are unique.
    let mut labels: Vec<Vec<SZ>> = overlap.blocks().iter().map(|b| b.labels().to_vec()).collect();
    let n = labels.len();
    labels.sort();
    labels.dedup();
    assert_eq!(labels.len(), n);
}

#[test]
fn test_negative_legs() {
    let a = random_mps(5);
    let b = random_mps(6);
    let pos = contract(&a, &b, &[1], &[1]).unwrap();
    let neg = contract(&a, &b, &[-2], &[-2]).unwrap();
    assert_eq!(pos.clone().into_tensor().unwrap().rank(), 4);
    assert_eq!(pos, neg);
}

#[test]
fn test_no_matching_blocks() {
    let a = BlockTensor::new(vec![block(&[VAC, UP, UP], vec![1.0, 2.0], &[1, 1, 2])], None).unwrap();
    let b =
        BlockTensor::new(vec![block(&[DOWN, DOWN, PAIR], vec![3.0, 4.0], &[1, 1, 2])], None).unwrap();

    let partial = contract(&a, &b, &[2], &[0]).unwrap().into_tensor().unwrap();
    assert!(partial.is_empty());
    assert_eq!(partial.shape_tag(), ShapeTag::FourIndexMpo);

    let full = contract(&a, &b, &[0, 1, 2], &[0, 1, 2]).unwrap();
    assert_eq!(full, Contracted::Scalar(0.0));
}

#[test]
fn test_full_contraction_of_single_elements() {
    let a = BlockTensor::new(vec![block(&[VAC, VAC, VAC], vec![3.0], &[1, 1, 1])], None).unwrap();
    let b = BlockTensor::new(vec![block(&[VAC, VAC, VAC], vec![-2.5], &[1, 1, 1])], None).unwrap();
    let value = contract(&a, &b, &[0, 1, 2], &[0, 1, 2]).unwrap();
    assert_eq!(value.into_scalar(), Some(-7.5));
}

#[test]
fn test_full_contraction_of_one_leg_blocks() {
    // One-leg tensors have no leg-role tag of their own; any tag is accepted.
    let a = BlockTensor::new(vec![block(&[UP], vec![3.0], &[1])], Some(ShapeTag::LeftFusedMps))
        .unwrap();
    let b = BlockTensor::new(vec![block(&[UP], vec![-1.5], &[1])], Some(ShapeTag::LeftFusedMps))
        .unwrap();
    assert_eq!(a.rank(), 1);

    assert_eq!(contract(&a, &a, &[0], &[0]).unwrap(), Contracted::Scalar(9.0));
    assert_eq!(contract(&a, &b, &[-1], &[-1]).unwrap(), Contracted::Scalar(-4.5));

    let other = BlockTensor::new(vec![block(&[DOWN], vec![2.0], &[1])], Some(ShapeTag::LeftFusedMps))
        .unwrap();
    assert_eq!(contract(&a, &other, &[0], &[0]).unwrap(), Contracted::Scalar(0.0));
}

#[test]
fn test_full_contraction_is_norm_squared() {
    let a = random_mps(7);
    let value = contract(&a, &a, &[0, 1, 2], &[0, 1, 2])
        .unwrap()
        .into_scalar()
        .unwrap();
    assert_relative_eq!(value, a.norm() * a.norm(), max_relative = 1e-12);
}

#[test]
fn test_mpo_on_mps_sign() {
    // c^dagger_up as a one-site operator: (left, up, down, right).
    let op = BlockTensor::new(
        vec![block(&[VAC, UP, VAC, UP], vec![1.0], &[1, 1, 1, 1])],
        Some(ShapeTag::FourIndexMpo),
    )
    .unwrap()
    .with_delta_quantum(UP);
    // Site tensors with odd (DOWN) and even (VAC) left bond.
    let site = BlockTensor::new(
        vec![
            block(&[DOWN, VAC, DOWN], vec![2.0], &[1, 1, 1]),
            block(&[VAC, VAC, VAC], vec![5.0], &[1, 1, 1]),
        ],
        None,
    )
    .unwrap();

    let signed = contract(&op, &site, &[2], &[1]).unwrap().into_tensor().unwrap();
    assert_eq!(signed.shape_tag(), ShapeTag::UnfusedThreeIndexMps);
    assert_eq!(signed.delta_quantum(), None);
    let odd = signed.find_block(&[VAC, UP, UP, DOWN, DOWN]).unwrap();
    let even = signed.find_block(&[VAC, UP, UP, VAC, VAC]).unwrap();
    assert_eq!(odd.data().data(), &[-2.0]);
    assert_eq!(even.data().data(), &[5.0]);

    // Without sign rules the same contraction is plain tensordot.
    let bosonic = contract_with(
        &SignRuleRegistry::empty(),
        &op,
        &site,
        &[2],
        &[1],
        Some(ShapeTag::UnfusedThreeIndexMps),
    )
    .unwrap()
    .into_tensor()
    .unwrap();
    assert_eq!(bosonic.find_block(&[VAC, UP, UP, DOWN, DOWN]).unwrap().data().data(), &[2.0]);
}

#[test]
fn test_contracted_dimension_mismatch() {
    let a = BlockTensor::new(vec![block(&[VAC, VAC, VAC], vec![1.0, 2.0], &[1, 1, 2])], None).unwrap();
    let b = BlockTensor::new(vec![block(&[VAC, VAC, VAC], vec![1.0; 3], &[3, 1, 1])], None).unwrap();
    let err = contract(&a, &b, &[2], &[0]).unwrap_err();
    assert_eq!(
        err,
        TensorError::ContractedDimMismatch {
            leg_a: 2,
            dim_a: 2,
            leg_b: 0,
            dim_b: 3
        }
    );
}

#[test]
fn test_complex_blocks() {
    let z = |re: f64, im: f64| c64::new(re, im);
    let data = DenseTensor::from_vec(vec![z(1.0, 1.0), z(0.0, 2.0)], &[1, 1, 2]).unwrap();
    let a: BlockTensor<SZ, c64> =
        BlockTensor::new(vec![Block::new([VAC, VAC, VAC], data).unwrap()], None).unwrap();
    // Bilinear, no conjugation: (1+i)^2 + (2i)^2 = 2i - 4.
    let value = contract(&a, &a, &[0, 1, 2], &[0, 1, 2]).unwrap().into_scalar().unwrap();
    assert_relative_eq!(value.re, -4.0, epsilon = 1e-12);
    assert_relative_eq!(value.im, 2.0, epsilon = 1e-12);
}

proptest! {
    /// Property: contraction is linear in each operand.
    #[test]
    fn prop_contraction_bilinear(seed in 0u64..500, factor in -3.0f64..3.0) {
        let a = random_mps(seed);
        let b = random_mps(seed + 1000);
        let base = contract(&a, &b, &[2], &[2]).unwrap().into_tensor().unwrap();
        let scaled = contract(&(&a * factor), &b, &[2], &[2])
            .unwrap()
            .into_tensor()
            .unwrap();
        prop_assert_eq!(base.n_blocks(), scaled.n_blocks());
        for (x, y) in base.blocks().iter().zip(scaled.blocks()) {
            prop_assert_eq!(x.labels(), y.labels());
            for (&u, &v) in x.data().data().iter().zip(y.data().data()) {
                prop_assert!((u * factor - v).abs() <= 1e-12 * (1.0 + v.abs()));
            }
        }
    }

    /// Property: the overlap of a tensor with itself is its squared norm.
    #[test]
    fn prop_self_overlap(seed in 0u64..500) {
        let a = random_mps(seed);
        let value = contract(&a, &a, &[0, 1, 2], &[0, 1, 2]).unwrap().into_scalar().unwrap();
        let norm_sqr = a.norm() * a.norm();
        prop_assert!((value - norm_sqr).abs() <= 1e-12 * (1.0 + norm_sqr));
    }
}
