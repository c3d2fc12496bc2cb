//! Quantum labels attached to tensor legs.

use std::fmt;
use std::hash::Hash;
use std::ops::Add;

/// A conserved quantity attached to one leg of a block.
///
/// `+` is the fusion rule. `Default` must be the vacuum (the identity of
/// `+`). Labels only need equality and hashing to act as block keys.
pub trait QuantumLabel: Clone + Eq + Hash + fmt::Debug + Default + Add<Output = Self> {
    /// Whether the label carries odd fermion parity.
    fn is_fermion(&self) -> bool;
}

/// Particle number, twice the spin projection, and point-group irrep.
///
/// Fusion adds `n` and `twos` and multiplies abelian irreps, which for
/// the D2h-type groups in use is the XOR of the irrep indices.
///
/// # Example
///
/// ```
/// use qntensors::symmetry::{QuantumLabel, SZ};
///
/// let up = SZ::new(1, 1, 0);
/// let down = SZ::new(1, -1, 0);
/// assert_eq!(up + down, SZ::new(2, 0, 0));
/// assert!(up.is_fermion());
/// assert!(!(up + down).is_fermion());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SZ {
    pub n: i32,
    pub twos: i32,
    pub pg: u8,
}

impl SZ {
    pub const fn new(n: i32, twos: i32, pg: u8) -> Self {
        Self { n, twos, pg }
    }
}

impl Add for SZ {
    type Output = SZ;

    fn add(self, other: SZ) -> SZ {
        SZ {
            n: self.n + other.n,
            twos: self.twos + other.twos,
            pg: self.pg ^ other.pg,
        }
    }
}

impl QuantumLabel for SZ {
    fn is_fermion(&self) -> bool {
        self.n % 2 != 0
    }
}

impl fmt::Display for SZ {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "< N={} SZ=", self.n)?;
        if self.twos % 2 == 0 {
            write!(f, "{}", self.twos / 2)?;
        } else {
            write!(f, "{}/2", self.twos)?;
        }
        write!(f, " PG={} >", self.pg)
    }
}
