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

use std::cmp::Ordering;

use num_complex::Complex64;
use thiserror::Error;

use crate::operator_sum::{ArithmeticError, OperatorSum};
use crate::symbol::{self, Symbol};
use crate::util::{mul_i_pow, C_ZERO};

/// An error related to processing of a string label.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LabelError {
    #[error("label with length {label} cannot be added to a {num_modes}-mode operator")]
    WrongLength { num_modes: u32, label: usize },
    #[error("label with length {label} does not match indices of length {indices}")]
    WrongLengthIndices { label: usize, indices: usize },
    #[error("index {index} is out of range for a {num_modes}-mode operator")]
    BadIndex { index: u32, num_modes: u32 },
    #[error("index {index} is duplicated in a single specifier")]
    DuplicateIndex { index: u32 },
    #[error(
        "character {letter:?} at position {position} is not in the {algebra} alphabet '{alphabet}'"
    )]
    OutsideAlphabet {
        letter: char,
        position: usize,
        algebra: &'static str,
        alphabet: &'static str,
    },
}

/// Parse a label onto the end of `out`, in site order.
///
/// The reported position of a bad letter is its character index in `label`, reading left to
/// right.  On failure, `out` is restored to its length on entry.
pub(crate) fn extend_from_label<S: Symbol>(label: &str, out: &mut Vec<S>) -> Result<(), LabelError> {
    let start = out.len();
    for (position, letter) in label.chars().enumerate() {
        match u8::try_from(letter).ok().and_then(S::try_from_label) {
            Some(symbol) => out.push(symbol),
            None => {
                out.truncate(start);
                return Err(LabelError::OutsideAlphabet {
                    letter,
                    position,
                    algebra: S::ALGEBRA,
                    alphabet: S::ALPHABET,
                });
            }
        }
    }
    // Labels put site 0 on the right.
    out[start..].reverse();
    Ok(())
}

/// A view object onto a single term of an [OperatorSum].
///
/// `symbols` is in site order: `symbols[i]` acts on mode (or qubit) `i`.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct TermView<'a, S: Symbol> {
    pub coeff: Complex64,
    pub symbols: &'a [S],
}
impl<S: Symbol> TermView<'_, S> {
    /// Convert this `TermView` into an owning [Term] of the same data.
    pub fn to_term(&self) -> Term<S> {
        Term {
            coeff: self.coeff,
            symbols: self.symbols.into(),
        }
    }

    #[inline]
    pub fn num_modes(&self) -> u32 {
        self.symbols.len() as u32
    }

    pub fn to_label(&self) -> String {
        symbol::to_label(self.symbols)
    }

    #[inline]
    pub fn is_identity(&self) -> bool {
        symbol::is_identity(self.symbols)
    }
}

/// A single product of one letter per site, with a complex coefficient.
///
/// For the Pauli alphabet this is a Pauli string.  For the fermionic alphabet it is the
/// mode-ordered product `op_0 · op_1 · … · op_{n-1}`, with mode 0 leftmost in the product.
///
/// The [Display] form of a term is its label, which does not include the coefficient.
///
/// [Display]: std::fmt::Display
#[derive(Clone, Debug, PartialEq)]
pub struct Term<S: Symbol> {
    coeff: Complex64,
    symbols: Box<[S]>,
}
impl<S: Symbol> Term<S> {
    /// Create a term from its letters in site order.
    pub fn new(symbols: impl Into<Box<[S]>>, coeff: Complex64) -> Self {
        Self {
            coeff,
            symbols: symbols.into(),
        }
    }

    /// The all-identity term on `num_modes` sites.
    pub fn identity(num_modes: u32, coeff: Complex64) -> Self {
        Self {
            coeff,
            symbols: vec![S::IDENTITY; num_modes as usize].into(),
        }
    }

    /// Parse a term from its label.
    ///
    /// The label has one character per site, with site 0 as the rightmost character, so the
    /// number of sites is the length of the label.
    pub fn from_label(label: &str, coeff: Complex64) -> Result<Self, LabelError> {
        let mut symbols = Vec::with_capacity(label.len());
        extend_from_label(label, &mut symbols)?;
        Ok(Self::new(symbols, coeff))
    }

    #[inline]
    pub fn num_modes(&self) -> u32 {
        self.symbols.len() as u32
    }

    #[inline]
    pub fn coeff(&self) -> Complex64 {
        self.coeff
    }

    /// The letters of the term, in site order.
    #[inline]
    pub fn symbols(&self) -> &[S] {
        &self.symbols
    }

    pub fn view(&self) -> TermView<'_, S> {
        TermView {
            coeff: self.coeff,
            symbols: &self.symbols,
        }
    }

    pub fn to_label(&self) -> String {
        symbol::to_label(&self.symbols)
    }

    #[inline]
    pub fn is_identity(&self) -> bool {
        symbol::is_identity(&self.symbols)
    }

    /// Compare two terms by their labels only.
    ///
    /// This is the canonical order of terms in an [OperatorSum].  Terms with equal labels compare
    /// equal regardless of their coefficients.
    pub fn cmp_label(&self, other: &Self) -> Ordering {
        symbol::cmp_labels(&self.symbols, &other.symbols)
    }

    /// The same term with the order of its sites reversed.
    ///
    /// This converts between the convention used here (site 0 is the rightmost letter of a label)
    /// and the opposite one.  It is a relabelling only; the coefficient is unchanged.
    pub fn reversed(&self) -> Self {
        let mut symbols = self.symbols.clone();
        symbols.reverse();
        Self {
            coeff: self.coeff,
            symbols,
        }
    }

    /// The operator product `self · other`.
    ///
    /// Any scalar the product of the letters produces (the Pauli phases, or the fermionic
    /// reordering sign) is folded into the coefficient.  If the product vanishes, the result is
    /// the identity term with a zero coefficient.
    pub fn multiply(&self, other: &Self) -> Result<Self, ArithmeticError> {
        if self.num_modes() != other.num_modes() {
            return Err(ArithmeticError::MismatchedWidths {
                left: self.num_modes(),
                right: other.num_modes(),
            });
        }
        let mut symbols = Vec::with_capacity(self.symbols.len());
        match S::multiply_into(&self.symbols, &other.symbols, &mut symbols) {
            Some(phase) => Ok(Self {
                coeff: mul_i_pow(self.coeff * other.coeff, phase as u32),
                symbols: symbols.into(),
            }),
            None => Ok(Self::identity(self.num_modes(), C_ZERO)),
        }
    }

    /// Convert this term into a single-term [OperatorSum].
    ///
    /// A term with a zero coefficient becomes the zero operator.
    pub fn to_operator(&self) -> OperatorSum<S> {
        OperatorSum::from_view(self.view())
    }
}

impl<S: Symbol> ::std::fmt::Display for Term<S> {
    fn fmt(&self, f: &mut ::std::fmt::Formatter) -> ::std::fmt::Result {
        f.write_str(&self.to_label())
    }
}
