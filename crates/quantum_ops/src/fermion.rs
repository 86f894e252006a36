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

use crate::symbol::Symbol;
use crate::term::Term;
use crate::util::C_ZERO;

/// The single-mode fermionic alphabet.
///
/// Every letter other than the identity is a matrix unit on the two-dimensional occupation space
/// `{|0⟩, |1⟩}` of one mode:
///
/// | letter | operator | matrix |
/// |---|---|---|
/// | `+` | `a†` | `|1⟩⟨0|` |
/// | `-` | `a` | `|0⟩⟨1|` |
/// | `E` | `a a†` | `|0⟩⟨0|` |
/// | `I` | `1` | |
/// | `N` | `a† a` | `|1⟩⟨1|` |
///
/// # Representation
///
/// As with [Pauli](crate::pauli::Pauli), the `u8` value of each variant is its label letter, and
/// the variants are declared in the byte order of those letters, so the derived `Ord` agrees with
/// label order.
#[repr(u8)]
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum FermionSymbol {
    /// Creation operator.
    Create = b'+',
    /// Annihilation operator.
    Annihilate = b'-',
    /// Projector onto the empty state.
    Hole = b'E',
    /// Identity.
    Identity = b'I',
    /// Number operator; projector onto the occupied state.
    Number = b'N',
}
impl From<FermionSymbol> for u8 {
    fn from(value: FermionSymbol) -> u8 {
        value as u8
    }
}
unsafe impl ::bytemuck::CheckedBitPattern for FermionSymbol {
    type Bits = u8;

    #[inline(always)]
    fn is_valid_bit_pattern(bits: &Self::Bits) -> bool {
        matches!(*bits, b'+' | b'-' | b'E' | b'I' | b'N')
    }
}
unsafe impl ::bytemuck::NoUninit for FermionSymbol {}

/// The error type for a failed conversion into [FermionSymbol].
#[derive(Error, Debug)]
#[error("{0:?} is not a valid letter of the fermionic alphabet '+-EIN'")]
pub struct FermionSymbolFromU8Error(pub char);

impl ::std::convert::TryFrom<u8> for FermionSymbol {
    type Error = FermionSymbolFromU8Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        ::bytemuck::checked::try_cast(value).map_err(|_| FermionSymbolFromU8Error(value as char))
    }
}

impl FermionSymbol {
    /// Does this letter contain an odd number of ladder operators?
    ///
    /// Odd letters anticommute with each other across different modes.
    #[inline]
    pub fn is_odd(&self) -> bool {
        matches!(self, Self::Create | Self::Annihilate)
    }

    /// The `(row, column)` of the matrix unit this letter is, or `None` for the identity.
    #[inline]
    fn matrix_unit(self) -> Option<(u8, u8)> {
        match self {
            Self::Create => Some((1, 0)),
            Self::Annihilate => Some((0, 1)),
            Self::Hole => Some((0, 0)),
            Self::Number => Some((1, 1)),
            Self::Identity => None,
        }
    }

    #[inline]
    fn from_matrix_unit(row: u8, col: u8) -> Self {
        match (row, col) {
            (1, 0) => Self::Create,
            (0, 1) => Self::Annihilate,
            (0, 0) => Self::Hole,
            _ => Self::Number,
        }
    }

    /// Multiply two letters acting on the same mode.
    ///
    /// Returns `None` if the product is zero, such as `a† a†`.
    #[inline]
    pub fn multiply(self, other: FermionSymbol) -> Option<FermionSymbol> {
        match (self.matrix_unit(), other.matrix_unit()) {
            (None, _) => Some(other),
            (_, None) => Some(self),
            (Some((row, inner_left)), Some((inner_right, col))) => {
                (inner_left == inner_right).then(|| Self::from_matrix_unit(row, col))
            }
        }
    }
}

impl Symbol for FermionSymbol {
    const IDENTITY: Self = FermionSymbol::Identity;
    const ALPHABET: &'static str = "+-EIN";
    const ALGEBRA: &'static str = "fermionic";

    #[inline]
    fn label(self) -> u8 {
        self as u8
    }

    #[inline]
    fn try_from_label(letter: u8) -> Option<Self> {
        Self::try_from(letter).ok()
    }

    /// Multiply two mode-ordered products.
    ///
    /// `(A_0 ⋯ A_{n-1}) · (B_0 ⋯ B_{n-1})` is brought to `(A_0 B_0) ⋯ (A_{n-1} B_{n-1})` by moving
    /// each `B_k` leftwards past every `A_j` with `j > k`.  Each such move past two odd letters
    /// contributes a factor of -1.
    fn multiply_into(left: &[Self], right: &[Self], out: &mut Vec<Self>) -> Option<u8> {
        debug_assert_eq!(left.len(), right.len());
        out.clear();
        out.reserve(left.len());
        // Parity of the number of odd letters of `right` on the lower modes.
        let mut right_odd_below = false;
        let mut negative = false;
        for (l, r) in left.iter().zip(right) {
            if l.is_odd() && right_odd_below {
                negative = !negative;
            }
            if r.is_odd() {
                right_odd_below = !right_odd_below;
            }
            out.push(l.multiply(*r)?);
        }
        Some(if negative { 2 } else { 0 })
    }
}

/// A single creation or annihilation operator on a given mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Ladder {
    Create(u32),
    Annihilate(u32),
}
impl Ladder {
    #[inline]
    pub fn mode(&self) -> u32 {
        match self {
            Self::Create(mode) | Self::Annihilate(mode) => *mode,
        }
    }

    #[inline]
    fn symbol(&self) -> FermionSymbol {
        match self {
            Self::Create(_) => FermionSymbol::Create,
            Self::Annihilate(_) => FermionSymbol::Annihilate,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LadderError {
    #[error("mode {mode} is out of range for a {num_modes}-mode operator")]
    ModeOutOfRange { mode: u32, num_modes: u32 },
}

impl Term<FermionSymbol> {
    /// Build a term from a product of ladder operators, written left to right.
    ///
    /// The product is reordered into mode order, picking up a factor of -1 for every exchange of
    /// two operators, and the operators that land on the same mode are multiplied together in
    /// their original relative order.  For example `a_1 a†_0` becomes `-(a†_0)(a_1)`, and
    /// `a†_2 a_2` becomes the number operator on mode 2.  If the product vanishes (such as
    /// `a†_0 a†_0`), the result is the identity term with a zero coefficient.
    pub fn from_ladder_ops(
        num_modes: u32,
        ops: &[Ladder],
        coeff: Complex64,
    ) -> Result<Self, LadderError> {
        if let Some(bad) = ops.iter().find(|op| op.mode() >= num_modes) {
            return Err(LadderError::ModeOutOfRange {
                mode: bad.mode(),
                num_modes,
            });
        }
        // Every ladder operator is odd, so the sign is the parity of the permutation that a stable
        // sort by mode applies.
        let inversions = ops
            .iter()
            .enumerate()
            .map(|(i, earlier)| {
                ops[i + 1..]
                    .iter()
                    .filter(|later| later.mode() < earlier.mode())
                    .count()
            })
            .sum::<usize>();
        let mut symbols = vec![FermionSymbol::Identity; num_modes as usize];
        for op in ops {
            let slot = &mut symbols[op.mode() as usize];
            match slot.multiply(op.symbol()) {
                Some(product) => *slot = product,
                None => return Ok(Self::identity(num_modes, C_ZERO)),
            }
        }
        let coeff = if inversions % 2 == 1 { -coeff } else { coeff };
        Ok(Self::new(symbols, coeff))
    }
}
