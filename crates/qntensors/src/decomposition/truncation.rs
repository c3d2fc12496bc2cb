//! Global truncation policy for block-wise SVD.
//!
//! Singular values from every label group compete for one shared budget:
//! a value survives when it is at least `cutoff` and among the
//! `max_bond_dim` largest values across all groups.

use crate::error::TensorError;

/// Bond-dimension bound and singular-value floor for compression.
///
/// # Example
///
/// ```
/// use qntensors::decomposition::TruncationParams;
///
/// let params = TruncationParams::default().with_max_bond_dim(16).with_cutoff(1e-12);
/// assert_eq!(params.max_bond_dim, Some(16));
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TruncationParams {
    /// Maximum total number of kept singular values; `None` is unbounded.
    pub max_bond_dim: Option<usize>,
    /// Singular values below this are discarded.
    pub cutoff: f64,
}

impl Default for TruncationParams {
    fn default() -> Self {
        Self {
            max_bond_dim: None,
            cutoff: 0.0,
        }
    }
}

impl TruncationParams {
    pub fn with_max_bond_dim(mut self, max_bond_dim: usize) -> Self {
        self.max_bond_dim = Some(max_bond_dim);
        self
    }

    pub fn with_cutoff(mut self, cutoff: f64) -> Self {
        self.cutoff = cutoff;
        self
    }

    /// Reject a negative or NaN cutoff.
    pub fn validate(&self) -> Result<(), TensorError> {
        if self.cutoff.is_nan() || self.cutoff < 0.0 {
            return Err(TensorError::InvalidCutoff {
                cutoff: self.cutoff,
            });
        }
        Ok(())
    }
}

/// Outcome of [`truncate_singular_values`].
#[derive(Clone, Debug, PartialEq)]
pub struct Truncation {
    /// Kept local indices per group, ascending; `None` when nothing in the
    /// group survived.
    pub kept: Vec<Option<Vec<usize>>>,
    /// `sqrt` of the sum of squares of every discarded value.
    pub error: f64,
}

impl Truncation {
    /// Total number of kept values.
    pub fn bond_dim(&self) -> usize {
        self.kept.iter().flatten().map(Vec::len).sum()
    }
}

/// Choose which singular values to keep across all groups.
///
/// Ties are broken by group order, then by position inside the group.
///
/// # Errors
///
/// Returns `InvalidCutoff` if the cutoff is negative or NaN.
///
/// # Example
///
/// ```
/// use qntensors::decomposition::{TruncationParams, truncate_singular_values};
///
/// let groups = vec![vec![5.0, 3.0, 1.0], vec![4.0, 2.0]];
/// let params = TruncationParams::default().with_max_bond_dim(3);
/// let t = truncate_singular_values(&groups, &params).unwrap();
/// assert_eq!(t.kept, vec![Some(vec![0, 1]), Some(vec![0])]);
/// assert!((t.error - 5.0f64.sqrt()).abs() < 1e-12);
/// ```
pub fn truncate_singular_values(
    singular_values: &[Vec<f64>],
    params: &TruncationParams,
) -> Result<Truncation, TensorError> {
    params.validate()?;

    let mut ranked: Vec<(usize, usize, f64)> = singular_values
        .iter()
        .enumerate()
        .flat_map(|(g, values)| values.iter().enumerate().map(move |(j, &v)| (g, j, v)))
        .collect();
    ranked.sort_by(|x, y| y.2.total_cmp(&x.2));

    let budget = params.max_bond_dim.unwrap_or(usize::MAX);
    let mut survivors: Vec<(usize, usize)> = ranked
        .into_iter()
        .filter(|&(_, _, v)| v >= params.cutoff)
        .take(budget)
        .map(|(g, j, _)| (g, j))
        .collect();
    survivors.sort_unstable();

    let mut kept: Vec<Option<Vec<usize>>> = vec![None; singular_values.len()];
    for (g, j) in survivors {
        kept[g].get_or_insert_with(Vec::new).push(j);
    }

    let mut discarded = 0.0;
    for (values, keep) in singular_values.iter().zip(&kept) {
        let keep = keep.as_deref().unwrap_or(&[]);
        discarded += values
            .iter()
            .enumerate()
            .filter(|(j, _)| keep.binary_search(j).is_err())
            .map(|(_, &v)| v * v)
            .sum::<f64>();
    }

    Ok(Truncation {
        kept,
        error: discarded.sqrt(),
    })
}
