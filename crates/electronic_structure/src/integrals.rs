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

use ndarray::{Array2, Array4};
use num_complex::Complex64;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IntegralError {
    #[error("one-body integrals must be square, not {0:?}")]
    BadOneBodyShape([usize; 2]),
    #[error("two-body integrals must have shape {expected:?} to match the one-body integrals, not {found:?}")]
    BadTwoBodyShape {
        expected: [usize; 4],
        found: [usize; 4],
    },
}

/// Molecular-orbital integrals of an electronic-structure problem.
///
/// The one-body integrals are `h[[p, q]]` over spatial orbitals.  The two-body integrals are in
/// chemists' notation, `two_body[[p, q, r, s]] = (pq|rs)`, the integral of
/// `φ_p*(1) φ_q(1) φ_r*(2) φ_s(2) / r_12`.
#[derive(Clone, Debug, PartialEq)]
pub struct MolecularIntegrals {
    one_body: Array2<Complex64>,
    two_body: Array4<Complex64>,
    nuclear_repulsion: f64,
}

impl MolecularIntegrals {
    pub fn new(
        one_body: Array2<Complex64>,
        two_body: Array4<Complex64>,
        nuclear_repulsion: f64,
    ) -> Result<Self, IntegralError> {
        let n = one_body.nrows();
        if one_body.ncols() != n {
            return Err(IntegralError::BadOneBodyShape([n, one_body.ncols()]));
        }
        let expected = [n; 4];
        let found = [
            two_body.len_of(ndarray::Axis(0)),
            two_body.len_of(ndarray::Axis(1)),
            two_body.len_of(ndarray::Axis(2)),
            two_body.len_of(ndarray::Axis(3)),
        ];
        if found != expected {
            return Err(IntegralError::BadTwoBodyShape { expected, found });
        }
        Ok(Self {
            one_body,
            two_body,
            nuclear_repulsion,
        })
    }

    /// Build from real integrals, the usual output of a closed-shell SCF calculation.
    pub fn from_real(
        one_body: Array2<f64>,
        two_body: Array4<f64>,
        nuclear_repulsion: f64,
    ) -> Result<Self, IntegralError> {
        Self::new(
            one_body.mapv(|x| Complex64::new(x, 0.0)),
            two_body.mapv(|x| Complex64::new(x, 0.0)),
            nuclear_repulsion,
        )
    }

    /// The number of spatial orbitals.
    #[inline]
    pub fn num_orbitals(&self) -> usize {
        self.one_body.nrows()
    }

    #[inline]
    pub fn one_body(&self) -> &Array2<Complex64> {
        &self.one_body
    }

    #[inline]
    pub fn two_body(&self) -> &Array4<Complex64> {
        &self.two_body
    }

    #[inline]
    pub fn nuclear_repulsion(&self) -> f64 {
        self.nuclear_repulsion
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shapes_are_checked() {
        let ok = MolecularIntegrals::from_real(Array2::zeros((2, 2)), Array4::zeros((2, 2, 2, 2)), 0.5)
            .unwrap();
        assert_eq!(ok.num_orbitals(), 2);
        assert_eq!(ok.nuclear_repulsion(), 0.5);

        assert_eq!(
            MolecularIntegrals::from_real(Array2::zeros((2, 3)), Array4::zeros((2, 2, 2, 2)), 0.0)
                .unwrap_err(),
            IntegralError::BadOneBodyShape([2, 3])
        );
        assert_eq!(
            MolecularIntegrals::from_real(Array2::zeros((2, 2)), Array4::zeros((2, 2, 2, 3)), 0.0)
                .unwrap_err(),
            IntegralError::BadTwoBodyShape {
                expected: [2, 2, 2, 2],
                found: [2, 2, 2, 3]
            }
        );
    }

    #[test]
    fn real_integrals_become_complex() {
        let one_body = ndarray::arr2(&[[-1.5]]);
        let two_body = Array4::from_elem((1, 1, 1, 1), 0.25);
        let ints = MolecularIntegrals::from_real(one_body, two_body, 0.0).unwrap();
        assert_eq!(ints.one_body()[[0, 0]], Complex64::new(-1.5, 0.0));
        assert_eq!(ints.two_body()[[0, 0, 0, 0]], Complex64::new(0.25, 0.0));
    }
}
