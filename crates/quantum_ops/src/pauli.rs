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

use thiserror::Error;

use crate::symbol::Symbol;

/// Named handle to the single-qubit Pauli alphabet.
///
/// # Representation
///
/// The `u8` value of each variant is its ASCII label letter.  This is part of the public API: it
/// makes label parsing a checked cast, and it makes the derived `Ord` (declaration order, which is
/// also value order) agree with the lexicographical order of labels, `I < X < Y < Z`.
///
/// Unlike the ZX-convention storage elsewhere in the ecosystem, `Pauli::Y` is exactly the Pauli Y
/// matrix; there is no hidden phase of `-i` attached to it.
#[repr(u8)]
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum Pauli {
    /// Identity.
    I = b'I',
    /// Pauli X.
    X = b'X',
    /// Pauli Y.
    Y = b'Y',
    /// Pauli Z.
    Z = b'Z',
}
impl From<Pauli> for u8 {
    fn from(value: Pauli) -> u8 {
        value as u8
    }
}
unsafe impl ::bytemuck::CheckedBitPattern for Pauli {
    type Bits = u8;

    #[inline(always)]
    fn is_valid_bit_pattern(bits: &Self::Bits) -> bool {
        matches!(*bits, b'I' | b'X' | b'Y' | b'Z')
    }
}
unsafe impl ::bytemuck::NoUninit for Pauli {}

/// The error type for a failed conversion into [Pauli].
#[derive(Error, Debug)]
#[error("{0:?} is not a valid letter of the Pauli alphabet 'IXYZ'")]
pub struct PauliFromU8Error(pub char);

impl ::std::convert::TryFrom<u8> for Pauli {
    type Error = PauliFromU8Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        ::bytemuck::checked::try_cast(value).map_err(|_| PauliFromU8Error(value as char))
    }
}

impl Pauli {
    /// Build a Pauli from its symplectic components.
    #[inline]
    pub fn from_zx(z: bool, x: bool) -> Self {
        match (z, x) {
            (false, false) => Pauli::I,
            (false, true) => Pauli::X,
            (true, true) => Pauli::Y,
            (true, false) => Pauli::Z,
        }
    }

    /// Does this Pauli include an X component in its ZX representation?
    #[inline]
    pub fn has_x_component(&self) -> bool {
        matches!(self, Pauli::X | Pauli::Y)
    }

    /// Does this Pauli include a Z component in its ZX representation?
    #[inline]
    pub fn has_z_component(&self) -> bool {
        matches!(self, Pauli::Y | Pauli::Z)
    }

    /// Multiply two single-qubit Paulis.
    ///
    /// Returns the product letter and the phase as a power of `i`, so `X.multiply(Y)` is
    /// `(Z, 1)` (`XY = iZ`) and `Y.multiply(X)` is `(Z, 3)` (`YX = -iZ`).
    #[inline]
    pub fn multiply(self, other: Pauli) -> (Pauli, u8) {
        match (self, other) {
            (Pauli::I, p) | (p, Pauli::I) => (p, 0),
            (Pauli::X, Pauli::X) | (Pauli::Y, Pauli::Y) | (Pauli::Z, Pauli::Z) => (Pauli::I, 0),
            (Pauli::X, Pauli::Y) => (Pauli::Z, 1),
            (Pauli::Y, Pauli::X) => (Pauli::Z, 3),
            (Pauli::Y, Pauli::Z) => (Pauli::X, 1),
            (Pauli::Z, Pauli::Y) => (Pauli::X, 3),
            (Pauli::Z, Pauli::X) => (Pauli::Y, 1),
            (Pauli::X, Pauli::Z) => (Pauli::Y, 3),
        }
    }
}

impl Symbol for Pauli {
    const IDENTITY: Self = Pauli::I;
    const ALPHABET: &'static str = "IXYZ";
    const ALGEBRA: &'static str = "Pauli";

    #[inline]
    fn label(self) -> u8 {
        self as u8
    }

    #[inline]
    fn try_from_label(letter: u8) -> Option<Self> {
        Self::try_from(letter).ok()
    }

    fn multiply_into(left: &[Self], right: &[Self], out: &mut Vec<Self>) -> Option<u8> {
        debug_assert_eq!(left.len(), right.len());
        out.clear();
        out.reserve(left.len());
        let mut phase = 0u8;
        for (l, r) in left.iter().zip(right) {
            let (product, local) = l.multiply(*r);
            phase = (phase + local) % 4;
            out.push(product);
        }
        Some(phase)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Pauli; 4] = [Pauli::I, Pauli::X, Pauli::Y, Pauli::Z];

    /// Dense 2x2 matrices, for checking the multiplication table against the definition.
    fn matrix(pauli: Pauli) -> [[num_complex::Complex64; 2]; 2] {
        use crate::util::{C_IM, C_M_IM, C_M_ONE, C_ONE, C_ZERO};
        match pauli {
            Pauli::I => [[C_ONE, C_ZERO], [C_ZERO, C_ONE]],
            Pauli::X => [[C_ZERO, C_ONE], [C_ONE, C_ZERO]],
            Pauli::Y => [[C_ZERO, C_M_IM], [C_IM, C_ZERO]],
            Pauli::Z => [[C_ONE, C_ZERO], [C_ZERO, C_M_ONE]],
        }
    }

    #[test]
    fn multiplication_table_matches_matrices() {
        for left in ALL {
            for right in ALL {
                let (product, phase) = left.multiply(right);
                let (l, r) = (matrix(left), matrix(right));
                let p = matrix(product);
                for row in 0..2 {
                    for col in 0..2 {
                        let direct = l[row][0] * r[0][col] + l[row][1] * r[1][col];
                        let table = crate::util::mul_i_pow(p[row][col], phase as u32);
                        assert_eq!(direct, table, "{left:?} * {right:?}");
                    }
                }
            }
        }
    }

    #[test]
    fn labels_roundtrip_through_u8() {
        for pauli in ALL {
            assert_eq!(Pauli::try_from(u8::from(pauli)).unwrap(), pauli);
        }
        assert!(Pauli::try_from(b'x').is_err());
        assert!(Pauli::try_from(b'+').is_err());
    }

    #[test]
    fn ordering_agrees_with_labels() {
        for left in ALL {
            for right in ALL {
                assert_eq!(left.cmp(&right), left.label().cmp(&right.label()));
            }
        }
    }

    #[test]
    fn zx_components_roundtrip() {
        for pauli in ALL {
            assert_eq!(
                Pauli::from_zx(pauli.has_z_component(), pauli.has_x_component()),
                pauli
            );
        }
    }

    #[test]
    fn string_product_accumulates_phase() {
        // Site by site, X*Y = iZ and Y*Z = iX, so the string picks up i*i = -1.
        let mut out = Vec::new();
        let phase = Pauli::multiply_into(&[Pauli::X, Pauli::Y], &[Pauli::Y, Pauli::Z], &mut out);
        assert_eq!(phase, Some(2));
        assert_eq!(out, [Pauli::Z, Pauli::X]);
    }
}
