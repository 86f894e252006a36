// This code is part of Qiskit.
//
// (C) Copyright IBM 2025
//
// This code is licensed under the Apache License, Version 2.0. You may
// obtain a copy of this license in the LICENSE.txt file in the root directory
// of this source tree or at http://www.apache.org/licenses/LICENSE-2.0.
//
// Any modifications or derivative works of this code must retain this
// copyright notice, and modified files need to carry a notice indicating
// that they have been altered from the originals.

//! Sums of products of single-site operators, over the Pauli and fermionic alphabets, and the
//! maps between them.

use std::env;

pub mod dense;
pub mod fermion;
pub mod jordan_wigner;
pub mod operator_sum;
pub mod pauli;
pub mod symbol;
pub mod term;
pub mod util;

#[cfg(test)]
mod test;

pub use fermion::{FermionSymbol, Ladder};
pub use operator_sum::{FermionOperator, OperatorSum, PauliOperator};
pub use pauli::Pauli;
pub use symbol::Symbol;
pub use term::{Term, TermView};

/// Should the current context use multiple threads for the large-operator paths?
///
/// Threading is on unless `QISKIT_ALT_IN_PARALLEL` is `TRUE`, which marks a process that is
/// already one of many parallel workers.  `QISKIT_ALT_FORCE_THREADS=TRUE` overrides that.
#[inline]
pub fn getenv_use_multiple_threads() -> bool {
    let parallel_context = env::var("QISKIT_ALT_IN_PARALLEL")
        .unwrap_or_else(|_| "FALSE".to_string())
        .to_uppercase()
        == "TRUE";
    let force_threads = env::var("QISKIT_ALT_FORCE_THREADS")
        .unwrap_or_else(|_| "FALSE".to_string())
        .to_uppercase()
        == "TRUE";
    !parallel_context || force_threads
}
