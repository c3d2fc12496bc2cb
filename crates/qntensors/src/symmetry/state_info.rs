//! Leg-shape maps: label to leg dimension.

use std::collections::HashMap;

use crate::symmetry::QuantumLabel;

/// The dimension carried by each quantum label on one tensor leg.
///
/// Iteration follows insertion order, so tensors allocated from a
/// `StateInfo` have a reproducible block order.
///
/// # Example
///
/// ```
/// use qntensors::symmetry::{SZ, StateInfo};
///
/// let info = StateInfo::from_pairs([(SZ::new(0, 0, 0), 1), (SZ::new(1, 1, 0), 2)]);
/// assert_eq!(info.dim(&SZ::new(1, 1, 0)), Some(2));
/// assert_eq!(info.total_dim(), 3);
/// ```
#[derive(Clone, Debug)]
pub struct StateInfo<Q: QuantumLabel> {
    labels: Vec<Q>,
    dims: HashMap<Q, usize>,
}

impl<Q: QuantumLabel> StateInfo<Q> {
    pub fn new() -> Self {
        Self {
            labels: Vec::new(),
            dims: HashMap::new(),
        }
    }

    /// Build from `(label, dim)` pairs; a repeated label keeps its last dimension.
    pub fn from_pairs<I: IntoIterator<Item = (Q, usize)>>(pairs: I) -> Self {
        let mut info = Self::new();
        for (q, d) in pairs {
            info.insert(q, d);
        }
        info
    }

    /// Set the dimension of `label`, returning the previous one.
    pub fn insert(&mut self, label: Q, dim: usize) -> Option<usize> {
        let previous = self.dims.insert(label.clone(), dim);
        if previous.is_none() {
            self.labels.push(label);
        }
        previous
    }

    pub fn dim(&self, label: &Q) -> Option<usize> {
        self.dims.get(label).copied()
    }

    pub fn contains(&self, label: &Q) -> bool {
        self.dims.contains_key(label)
    }

    /// Number of distinct labels.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Sum of all label dimensions.
    pub fn total_dim(&self) -> usize {
        self.dims.values().sum()
    }

    /// `(label, dim)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&Q, usize)> + '_ {
        self.labels.iter().map(move |q| (q, self.dims[q]))
    }
}

impl<Q: QuantumLabel> Default for StateInfo<Q> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Q: QuantumLabel> PartialEq for StateInfo<Q> {
    /// Equal label sets with equal dimensions, regardless of order.
    fn eq(&self, other: &Self) -> bool {
        self.dims == other.dims
    }
}

impl<Q: QuantumLabel> FromIterator<(Q, usize)> for StateInfo<Q> {
    fn from_iter<I: IntoIterator<Item = (Q, usize)>>(iter: I) -> Self {
        Self::from_pairs(iter)
    }
}
