//! Fermionic sign rules for block contraction.
//!
//! Swapping two fermionic legs past each other costs a factor of -1. Which
//! legs get swapped depends on what the legs of each operand mean, so the
//! rule is looked up by the pair of [`ShapeTag`]s and the contracted leg
//! positions. Combinations without a registered rule are bosonic (no sign)
//! and leave the output tag to the caller or to the rank-based default.

use std::collections::HashMap;
use std::fmt;

use smallvec::SmallVec;

use crate::blocksparse::ShapeTag;
use crate::symmetry::QuantumLabel;

/// Decide from the full label tuples of a matching block pair whether the
/// pair's contribution flips sign.
pub type SignFn<Q> = fn(&[Q], &[Q]) -> bool;

/// Contracted leg positions, normalized to be non-negative.
pub type LegList = SmallVec<[usize; 4]>;

/// A registered contraction pattern: its sign function and the tag of the
/// tensor it produces.
pub struct SignRule<Q> {
    pub sign: SignFn<Q>,
    pub output_tag: ShapeTag,
}

impl<Q> Clone for SignRule<Q> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<Q> Copy for SignRule<Q> {}

impl<Q> fmt::Debug for SignRule<Q> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignRule")
            .field("output_tag", &self.output_tag)
            .finish_non_exhaustive()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct RuleKey {
    tag_a: ShapeTag,
    tag_b: ShapeTag,
    legs_a: LegList,
    legs_b: LegList,
}

/// Dispatch table from `(tag_a, tag_b, legs_a, legs_b)` to a [`SignRule`].
///
/// # Example
///
/// ```
/// use qntensors::blocksparse::ShapeTag;
/// use qntensors::contract::{SignRule, SignRuleRegistry};
/// use qntensors::symmetry::{QuantumLabel, SZ};
///
/// fn never<Q: QuantumLabel>(_: &[Q], _: &[Q]) -> bool {
///     false
/// }
///
/// let mut registry: SignRuleRegistry<SZ> = SignRuleRegistry::standard();
/// registry.register(
///     ShapeTag::ThreeIndexMps,
///     &[0, 1],
///     ShapeTag::ThreeIndexMps,
///     &[0, 1],
///     SignRule { sign: never::<SZ>, output_tag: ShapeTag::LeftFusedMps },
/// );
/// assert!(registry
///     .lookup(ShapeTag::ThreeIndexMps, &[0, 1], ShapeTag::ThreeIndexMps, &[0, 1])
///     .is_some());
/// ```
pub struct SignRuleRegistry<Q> {
    rules: HashMap<RuleKey, SignRule<Q>>,
}

impl<Q: QuantumLabel> SignRuleRegistry<Q> {
    /// A registry with no rules: every contraction is bosonic.
    pub fn empty() -> Self {
        Self {
            rules: HashMap::new(),
        }
    }

    /// The rules for the standard tensor-train operations.
    ///
    /// - MPO (down leg, 2) on MPS (mid leg, 1): [`mpo_on_mps_sign`],
    ///   producing an [`ShapeTag::UnfusedThreeIndexMps`].
    pub fn standard() -> Self {
        let mut registry = Self::empty();
        registry.register(
            ShapeTag::FourIndexMpo,
            &[2],
            ShapeTag::ThreeIndexMps,
            &[1],
            SignRule {
                sign: mpo_on_mps_sign::<Q>,
                output_tag: ShapeTag::UnfusedThreeIndexMps,
            },
        );
        registry
    }

    /// Register a rule, returning the one it replaces.
    pub fn register(
        &mut self,
        tag_a: ShapeTag,
        legs_a: &[usize],
        tag_b: ShapeTag,
        legs_b: &[usize],
        rule: SignRule<Q>,
    ) -> Option<SignRule<Q>> {
        self.rules.insert(key(tag_a, legs_a, tag_b, legs_b), rule)
    }

    /// Look up the rule for a contraction, with legs already normalized.
    pub fn lookup(
        &self,
        tag_a: ShapeTag,
        legs_a: &[usize],
        tag_b: ShapeTag,
        legs_b: &[usize],
    ) -> Option<&SignRule<Q>> {
        self.rules.get(&key(tag_a, legs_a, tag_b, legs_b))
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl<Q: QuantumLabel> Default for SignRuleRegistry<Q> {
    fn default() -> Self {
        Self::standard()
    }
}

fn key(tag_a: ShapeTag, legs_a: &[usize], tag_b: ShapeTag, legs_b: &[usize]) -> RuleKey {
    RuleKey {
        tag_a,
        tag_b,
        legs_a: legs_a.iter().copied().collect(),
        legs_b: legs_b.iter().copied().collect(),
    }
}

/// Sign of an operator (legs `left, up, down, right`) acting on a site
/// tensor (legs `left, mid, right`).
///
/// Moving the operator past the site's left bond reorders two groups of
/// fermion operators, so the sign is `(-1)^(p_op * p_left)` where `p_op`
/// is the parity of the operator (`up + down`) and `p_left` the parity of
/// the site's left label: negative exactly when both are odd.
pub fn mpo_on_mps_sign<Q: QuantumLabel>(labels_a: &[Q], labels_b: &[Q]) -> bool {
    (labels_a[1].clone() + labels_a[2].clone()).is_fermion() && labels_b[0].is_fermion()
}
