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

use num_complex::Complex64;
use thiserror::Error;
use tracing::debug;

use qiskit_alt_quantum_ops::fermion::{Ladder, LadderError};
use qiskit_alt_quantum_ops::jordan_wigner::{jordan_wigner, JordanWignerError};
use qiskit_alt_quantum_ops::operator_sum::ArithmeticError;
use qiskit_alt_quantum_ops::util::C_ZERO;
use qiskit_alt_quantum_ops::{FermionOperator, FermionSymbol, PauliOperator, Term};

use crate::integrals::MolecularIntegrals;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HamiltonianError {
    #[error(transparent)]
    Ladder(#[from] LadderError),
    #[error(transparent)]
    Arithmetic(#[from] ArithmeticError),
    #[error(transparent)]
    JordanWigner(#[from] JordanWignerError),
}

/// How spatial orbitals and spins are laid out on fermionic modes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SpinOrdering {
    /// All alpha spin-orbitals first, at modes `0..n`, then all beta ones at `n..2n`.
    #[default]
    Block,
    /// Orbital `p` has alpha spin at mode `2p` and beta spin at mode `2p + 1`.
    Interleaved,
}

impl SpinOrdering {
    /// The mode of spatial orbital `orbital` with spin `spin` (0 for alpha, 1 for beta), out of
    /// `num_orbitals` spatial orbitals.
    #[inline]
    pub fn mode(&self, num_orbitals: usize, orbital: usize, spin: usize) -> u32 {
        match self {
            Self::Block => (orbital + spin * num_orbitals) as u32,
            Self::Interleaved => (2 * orbital + spin) as u32,
        }
    }
}

/// Build the second-quantized electronic Hamiltonian
///
/// ```text
/// H = E_nuc + Σ h_pq a†_pσ a_qσ + ½ Σ (pq|rs) a†_pσ a†_rτ a_sτ a_qσ
/// ```
///
/// on `2 * num_orbitals` modes, summed over spatial orbitals and over the spins `σ` and `τ`.  The
/// nuclear repulsion is the coefficient of the all-identity term.  Integrals that are exactly zero
/// contribute nothing, and neither do products that vanish (such as `a†_pσ a†_pσ`).
pub fn fermionic_hamiltonian(
    integrals: &MolecularIntegrals,
    ordering: SpinOrdering,
) -> Result<FermionOperator, HamiltonianError> {
    let n = integrals.num_orbitals();
    let num_modes = 2 * n as u32;
    debug!(num_orbitals = n, ?ordering, "building fermionic Hamiltonian");
    let mode = |orbital, spin| ordering.mode(n, orbital, spin);

    let mut terms = Vec::new();
    let mut push = |ops: &[Ladder], coeff: Complex64| -> Result<(), LadderError> {
        let term = Term::<FermionSymbol>::from_ladder_ops(num_modes, ops, coeff)?;
        if term.coeff() != C_ZERO {
            terms.push(term);
        }
        Ok(())
    };

    push(&[], Complex64::new(integrals.nuclear_repulsion(), 0.0))?;
    for ((p, q), &h) in integrals.one_body().indexed_iter() {
        if h == C_ZERO {
            continue;
        }
        for spin in 0..2 {
            push(
                &[Ladder::Create(mode(p, spin)), Ladder::Annihilate(mode(q, spin))],
                h,
            )?;
        }
    }
    for ((p, q, r, s), &g) in integrals.two_body().indexed_iter() {
        if g == C_ZERO {
            continue;
        }
        for sigma in 0..2 {
            for tau in 0..2 {
                push(
                    &[
                        Ladder::Create(mode(p, sigma)),
                        Ladder::Create(mode(r, tau)),
                        Ladder::Annihilate(mode(s, tau)),
                        Ladder::Annihilate(mode(q, sigma)),
                    ],
                    0.5 * g,
                )?;
            }
        }
    }

    let out = FermionOperator::from_terms(num_modes, terms)?;
    debug!(num_terms = out.num_terms(), "built fermionic Hamiltonian");
    Ok(out)
}

/// The Jordan-Wigner image of [fermionic_hamiltonian], on `2 * num_orbitals` qubits.
pub fn qubit_hamiltonian(
    integrals: &MolecularIntegrals,
    ordering: SpinOrdering,
) -> Result<PauliOperator, HamiltonianError> {
    let fermionic = fermionic_hamiltonian(integrals, ordering)?;
    let out = jordan_wigner(&fermionic)?;
    debug!(
        num_qubits = out.num_modes(),
        num_terms = out.num_terms(),
        "mapped Hamiltonian to qubits"
    );
    Ok(out)
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use ndarray::{arr2, Array4};

    use super::*;

    fn one_orbital(h: f64, g: f64, nuclear: f64) -> MolecularIntegrals {
        MolecularIntegrals::from_real(arr2(&[[h]]), Array4::from_elem((1, 1, 1, 1), g), nuclear)
            .unwrap()
    }

    #[test]
    fn spin_orderings_place_modes() {
        assert_eq!(SpinOrdering::default(), SpinOrdering::Block);
        assert_eq!(SpinOrdering::Block.mode(3, 1, 0), 1);
        assert_eq!(SpinOrdering::Block.mode(3, 1, 1), 4);
        assert_eq!(SpinOrdering::Interleaved.mode(3, 1, 0), 2);
        assert_eq!(SpinOrdering::Interleaved.mode(3, 1, 1), 3);
    }

    #[test]
    fn one_orbital_hamiltonian() {
        // H = E + h (N_a + N_b) + g N_a N_b: the same-spin two-body terms vanish.
        let op = fermionic_hamiltonian(&one_orbital(-1.25, 0.5, 0.75), SpinOrdering::Block).unwrap();
        let expected = FermionOperator::from_list(
            2,
            [
                ("II", Complex64::new(0.75, 0.0)),
                ("IN", Complex64::new(-1.25, 0.0)),
                ("NI", Complex64::new(-1.25, 0.0)),
                ("NN", Complex64::new(0.5, 0.0)),
            ],
        )
        .unwrap();
        assert_eq!(op, expected);
    }

    #[test]
    fn zero_nuclear_repulsion_has_no_constant() {
        let op = fermionic_hamiltonian(&one_orbital(-1.0, 0.0, 0.0), SpinOrdering::Block).unwrap();
        assert_eq!(op.num_terms(), 2);
        assert_eq!(op.identity_coeff(), C_ZERO);
    }

    #[test]
    fn spin_orderings_agree_up_to_relabelling() {
        let ints = crate::molecules::h2_sto3g();
        let block = fermionic_hamiltonian(&ints, SpinOrdering::Block).unwrap();
        let interleaved = fermionic_hamiltonian(&ints, SpinOrdering::Interleaved).unwrap();
        assert_eq!(block.num_terms(), interleaved.num_terms());
        assert_eq!(block.identity_coeff(), interleaved.identity_coeff());

        // Moving modes past each other can flip signs, so compare magnitudes.
        let mut block_coeffs = block.coeffs().iter().map(|c| c.norm()).collect::<Vec<_>>();
        let mut interleaved_coeffs = interleaved
            .coeffs()
            .iter()
            .map(|c| c.norm())
            .collect::<Vec<_>>();
        block_coeffs.sort_by(f64::total_cmp);
        interleaved_coeffs.sort_by(f64::total_cmp);
        for (b, i) in block_coeffs.iter().zip(&interleaved_coeffs) {
            assert_abs_diff_eq!(b, i, epsilon = 1e-12);
        }
    }

    #[test]
    fn qubit_hamiltonian_of_one_orbital() {
        // N = (I - Z) / 2 on each qubit.
        let op = qubit_hamiltonian(&one_orbital(-1.0, 0.0, 0.0), SpinOrdering::Block).unwrap();
        let expected = PauliOperator::from_list(
            2,
            [
                ("II", Complex64::new(-1.0, 0.0)),
                ("IZ", Complex64::new(0.5, 0.0)),
                ("ZI", Complex64::new(0.5, 0.0)),
            ],
        )
        .unwrap();
        assert_eq!(op, expected);
    }
}
