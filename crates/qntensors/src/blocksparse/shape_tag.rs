//! Leg-role tags of block tensors.

use std::fmt;

/// The semantic role of each leg of a block tensor.
///
/// Tags select fermionic sign rules during contraction and label the
/// result; they never change how blocks are stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ShapeTag {
    /// No legs; produced by MPS @ MPS.
    Scalar,
    /// left - mid - right
    ThreeIndexMps,
    /// left1 - left2 - mid - right1 - right2; produced by MPO @ MPS.
    UnfusedThreeIndexMps,
    /// (left, mid) - right
    LeftFusedMps,
    /// left - (mid, right)
    RightFusedMps,
    /// left - mid1 - mid2 - right
    TwoSiteMps,
    /// left - up - down - right
    FourIndexMpo,
    /// left1 - left2 - up - down - right1 - right2; produced by MPO @ MPO.
    UnfusedFourIndexMpo,
    /// left - up1 - down1 - up2 - down2 - right
    TwoSiteMpo,
}

impl ShapeTag {
    /// Tag assumed when a tensor is built without one.
    pub fn default_for_rank(rank: usize) -> Option<Self> {
        match rank {
            3 => Some(ShapeTag::ThreeIndexMps),
            4 => Some(ShapeTag::FourIndexMpo),
            _ => None,
        }
    }

    /// Nominal leg count of a tensor with this tag; used for empty tensors.
    pub fn rank(self) -> usize {
        match self {
            ShapeTag::Scalar => 0,
            ShapeTag::LeftFusedMps | ShapeTag::RightFusedMps => 2,
            ShapeTag::ThreeIndexMps => 3,
            ShapeTag::TwoSiteMps | ShapeTag::FourIndexMpo => 4,
            ShapeTag::UnfusedThreeIndexMps => 5,
            ShapeTag::UnfusedFourIndexMpo | ShapeTag::TwoSiteMpo => 6,
        }
    }
}

impl fmt::Display for ShapeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_for_rank() {
        assert_eq!(ShapeTag::default_for_rank(3), Some(ShapeTag::ThreeIndexMps));
        assert_eq!(ShapeTag::default_for_rank(4), Some(ShapeTag::FourIndexMpo));
        assert_eq!(ShapeTag::default_for_rank(2), None);
        assert_eq!(ShapeTag::default_for_rank(0), None);
    }

    #[test]
    fn test_default_tags_match_rank() {
        for rank in [3, 4] {
            assert_eq!(ShapeTag::default_for_rank(rank).unwrap().rank(), rank);
        }
    }
}
