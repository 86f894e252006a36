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

//! Reference molecular integrals.

use ndarray::{arr2, Array4};

use crate::integrals::MolecularIntegrals;

/// Exact ground-state energy of [h2_sto3g], in Hartree.
pub const H2_STO3G_GROUND_STATE_ENERGY: f64 = -1.1373060357533993;

/// Write `(pq|rs)` into all eight index orders that real orbitals make equal.
fn set_two_body(two_body: &mut Array4<f64>, [p, q, r, s]: [usize; 4], value: f64) {
    for [a, b, c, d] in [
        [p, q, r, s],
        [q, p, r, s],
        [p, q, s, r],
        [q, p, s, r],
        [r, s, p, q],
        [s, r, p, q],
        [r, s, q, p],
        [s, r, q, p],
    ] {
        two_body[[a, b, c, d]] = value;
    }
}

/// H₂ in the STO-3G basis at a bond length of 0.735 Å, in the basis of its two Hartree-Fock
/// molecular orbitals.
///
/// With [SpinOrdering::Block](crate::SpinOrdering::Block) its qubit Hamiltonian has 15 Pauli
/// terms, and its lowest eigenvalue is [H2_STO3G_GROUND_STATE_ENERGY].
pub fn h2_sto3g() -> MolecularIntegrals {
    let one_body = arr2(&[[-1.2563390730032498, 0.0], [0.0, -0.4718960072811421]]);
    let mut two_body = Array4::zeros((2, 2, 2, 2));
    set_two_body(&mut two_body, [0, 0, 0, 0], 0.6757101548035161);
    set_two_body(&mut two_body, [1, 1, 1, 1], 0.6985737227320183);
    set_two_body(&mut two_body, [0, 0, 1, 1], 0.6645817302552968);
    set_two_body(&mut two_body, [0, 1, 0, 1], 0.1809311997842315);
    // The shapes are fixed above.
    match MolecularIntegrals::from_real(one_body, two_body, 0.7199689944489797) {
        Ok(integrals) => integrals,
        Err(err) => unreachable!("{err}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_body_integrals_are_symmetric() {
        let ints = h2_sto3g();
        let g = ints.two_body();
        for ((p, q, r, s), value) in g.indexed_iter() {
            assert_eq!(*value, g[[q, p, r, s]]);
            assert_eq!(*value, g[[r, s, p, q]]);
        }
        assert_eq!(g.iter().filter(|value| value.re != 0.0).count(), 8);
    }
}
