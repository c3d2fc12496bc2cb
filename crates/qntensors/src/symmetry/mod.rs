//! Quantum-number symmetry layer.
//!
//! The block engines are generic over any [`QuantumLabel`]; [`SZ`] is the
//! particle-number / spin-projection / point-group label used by
//! spin-orbital tensor trains. [`StateInfo`] records the dimension carried
//! by each label on one leg.

mod label;
mod state_info;

pub use label::{QuantumLabel, SZ};
pub use state_info::StateInfo;
