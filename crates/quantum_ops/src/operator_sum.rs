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

use approx::AbsDiffEq;
use itertools::Itertools;
use num_complex::Complex64;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;
use tracing::warn;

use crate::fermion::FermionSymbol;
use crate::pauli::Pauli;
use crate::symbol::{self, Symbol};
use crate::term::{self, LabelError, Term, TermView};
use crate::util::{mul_i_pow, total_cmp_c64, C_ONE, C_ZERO};

/// A sum of Pauli strings.
pub type PauliOperator = OperatorSum<Pauli>;
/// A sum of mode-ordered products of fermionic letters.
pub type FermionOperator = OperatorSum<FermionSymbol>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArithmeticError {
    #[error("mismatched numbers of modes: {left}, {right}")]
    MismatchedWidths { left: u32, right: u32 },
}

/// An error related to the coherence of user-provided flat arrays.
///
/// These appear during [OperatorSum::from_raw_parts].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoherenceError {
    #[error("`symbols` ({symbols}) must hold {num_modes} letters for each of the {coeffs} coefficients")]
    MismatchedItemCount {
        symbols: usize,
        num_modes: u32,
        coeffs: usize,
    },
}

/// What a call to [OperatorSum::simplify_with_report] discarded.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SimplifyReport {
    /// The number of non-zero terms removed for being within tolerance of zero.
    pub dropped: usize,
}

/// Is a summed coefficient small enough to be removed from a sum?
///
/// Exact zeros are always removed, even for a negative or NaN tolerance.
#[inline]
fn is_negligible(coeff: Complex64, tol: f64) -> bool {
    coeff == C_ZERO || coeff.norm() <= tol
}

/// One part of the type of the iteration value from [PairwiseOrdered].
///
/// The struct iterates over two sorted lists, and returns values from the left iterator, the right
/// iterator, or both simultaneously, depending on some "ordering" key attached to each.  This
/// `enum` is to pass on the information on which iterator is being returned from.
enum Paired<T> {
    Left(T),
    Right(T),
    Both(T, T),
}

/// An iterator combinator that zip-merges two sorted iterators.
///
/// This is created by [pairwise_ordered]; see that method for the description.
struct PairwiseOrdered<C, T, I1, I2>
where
    C: Ord,
    I1: Iterator<Item = (C, T)>,
    I2: Iterator<Item = (C, T)>,
{
    left: ::std::iter::Peekable<I1>,
    right: ::std::iter::Peekable<I2>,
}
impl<C, T, I1, I2> Iterator for PairwiseOrdered<C, T, I1, I2>
where
    C: Ord,
    I1: Iterator<Item = (C, T)>,
    I2: Iterator<Item = (C, T)>,
{
    type Item = (C, Paired<T>);

    fn next(&mut self) -> Option<Self::Item> {
        let order = match (self.left.peek(), self.right.peek()) {
            (None, None) => return None,
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (Some((left, _)), Some((right, _))) => left.cmp(right),
        };
        match order {
            Ordering::Less => self.left.next().map(|(i, value)| (i, Paired::Left(value))),
            Ordering::Greater => self
                .right
                .next()
                .map(|(i, value)| (i, Paired::Right(value))),
            Ordering::Equal => {
                let (index, left) = self.left.next()?;
                let (_, right) = self.right.next()?;
                Some((index, Paired::Both(left, right)))
            }
        }
    }
    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.left.size_hint();
        let right = self.right.size_hint();
        (
            left.0.max(right.0),
            left.1.and_then(|left| right.1.map(|right| left + right)),
        )
    }
}
/// An iterator combinator that zip-merges two sorted iterators.
///
/// The two iterators must yield the same items, where each item comprises some totally ordered
/// index, and an associated value.  Both input iterators must be sorted in terms of the index.  The
/// output iteration is over 2-tuples, also in sorted order, of the seen ordered index values, and a
/// [Paired] object indicating which iterator (or both) the values were drawn from.
fn pairwise_ordered<C, T, I1, I2>(
    left: I1,
    right: I2,
) -> PairwiseOrdered<C, T, <I1 as IntoIterator>::IntoIter, <I2 as IntoIterator>::IntoIter>
where
    C: Ord,
    I1: IntoIterator<Item = (C, T)>,
    I2: IntoIterator<Item = (C, T)>,
{
    PairwiseOrdered {
        left: left.into_iter().peekable(),
        right: right.into_iter().peekable(),
    }
}

/// The letters of one term, ordered by label.
#[derive(Clone, Copy, PartialEq, Eq)]
struct LabelKey<'a, S>(&'a [S]);
impl<S: Symbol> Ord for LabelKey<'_, S> {
    fn cmp(&self, other: &Self) -> Ordering {
        symbol::cmp_labels(self.0, other.0)
    }
}
impl<S: Symbol> PartialOrd for LabelKey<'_, S> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A linear combination of terms over one alphabet, all on the same number of modes.
///
/// The sum is always held in canonical form:
///
/// * terms are sorted by label;
/// * no two terms have the same letters;
/// * no stored coefficient is exactly zero.
///
/// Every constructor and every operation that returns an [OperatorSum] upholds these, so derived
/// equality is equality of the represented operators (up to floating-point rounding).
///
/// # Representation
///
/// The terms are stored flat.  Term `i` has coefficient `coeffs[i]` and letters
/// `symbols[i * num_modes..(i + 1) * num_modes]`, in site order.  Identities are stored
/// explicitly, since every letter of both alphabets is a full-width entry in a label.
///
/// # Summation order
///
/// When several input terms share letters, their coefficients are summed in a fixed order (by
/// real part, then by imaginary part, under [f64::total_cmp]).  Any permutation of the same input
/// therefore produces a bit-identical sum.
#[derive(Clone, Debug, PartialEq)]
pub struct OperatorSum<S: Symbol> {
    /// The number of sites each term acts on.
    num_modes: u32,
    /// One coefficient per term.
    coeffs: Vec<Complex64>,
    /// `num_modes` letters per term, flattened.
    symbols: Vec<S>,
}

impl<S: Symbol> OperatorSum<S> {
    fn with_capacity(num_modes: u32, num_terms: usize) -> Self {
        Self {
            num_modes,
            coeffs: Vec::with_capacity(num_terms),
            symbols: Vec::with_capacity(num_terms * num_modes as usize),
        }
    }

    /// Create a zero operator on `num_modes` sites.
    pub fn zero(num_modes: u32) -> Self {
        Self::with_capacity(num_modes, 0)
    }

    /// Create an identity operator on `num_modes` sites.
    pub fn identity(num_modes: u32) -> Self {
        Self {
            num_modes,
            coeffs: vec![C_ONE],
            symbols: vec![S::IDENTITY; num_modes as usize],
        }
    }

    pub(crate) fn from_view(view: TermView<S>) -> Self {
        let mut out = Self::zero(view.num_modes());
        if view.coeff != C_ZERO {
            out.coeffs.push(view.coeff);
            out.symbols.extend_from_slice(view.symbols);
        }
        out
    }

    /// Wrap flat data that the caller has already produced in canonical form.
    pub(crate) fn from_canonical_parts(
        num_modes: u32,
        symbols: Vec<S>,
        coeffs: Vec<Complex64>,
    ) -> Self {
        let out = Self {
            num_modes,
            coeffs,
            symbols,
        };
        debug_assert_eq!(out.symbols.len(), out.coeffs.len() * num_modes as usize);
        debug_assert!((1..out.num_terms()).all(|i| {
            symbol::cmp_labels(out.term_symbols(i - 1), out.term_symbols(i)) == Ordering::Less
        }));
        debug_assert!(out.coeffs.iter().all(|coeff| *coeff != C_ZERO));
        out
    }

    /// Sort and merge flat, unchecked data into canonical form.
    pub(crate) fn canonicalized(
        num_modes: u32,
        symbols: Vec<S>,
        coeffs: Vec<Complex64>,
        tol: f64,
    ) -> Self {
        let width = num_modes as usize;
        let flat = symbols.as_slice();
        let key = move |i: usize| &flat[i * width..(i + 1) * width];
        let mut order = (0..coeffs.len()).collect::<Vec<_>>();
        order.sort_unstable_by(|&a, &b| {
            symbol::cmp_labels(key(a), key(b)).then_with(|| total_cmp_c64(&coeffs[a], &coeffs[b]))
        });
        let mut out = Self::with_capacity(num_modes, order.len());
        for (letters, group) in &order.iter().chunk_by(|&&i| key(i)) {
            let coeff = group.fold(C_ZERO, |acc, &i| acc + coeffs[i]);
            if is_negligible(coeff, tol) {
                continue;
            }
            out.coeffs.push(coeff);
            out.symbols.extend_from_slice(letters);
        }
        out
    }

    /// Create a sum from flat arrays, in the same layout as the internal storage.
    ///
    /// The input need not be sorted or free of duplicates; it is canonicalized.
    pub fn from_raw_parts(
        num_modes: u32,
        symbols: Vec<S>,
        coeffs: Vec<Complex64>,
    ) -> Result<Self, CoherenceError> {
        if symbols.len() != coeffs.len() * num_modes as usize {
            return Err(CoherenceError::MismatchedItemCount {
                symbols: symbols.len(),
                num_modes,
                coeffs: coeffs.len(),
            });
        }
        Ok(Self::canonicalized(num_modes, symbols, coeffs, 0.0))
    }

    /// Create a sum from owned terms, merging like terms and dropping exact zeros.
    pub fn from_terms<I>(num_modes: u32, terms: I) -> Result<Self, ArithmeticError>
    where
        I: IntoIterator<Item = Term<S>>,
    {
        let terms = terms.into_iter();
        let mut coeffs = Vec::with_capacity(terms.size_hint().0);
        // Storage grows only as terms are accepted, so a mismatched `num_modes` fails on the first
        // term rather than on a huge up-front allocation.
        let mut symbols = Vec::new();
        for term in terms {
            if term.num_modes() != num_modes {
                return Err(ArithmeticError::MismatchedWidths {
                    left: num_modes,
                    right: term.num_modes(),
                });
            }
            coeffs.push(term.coeff());
            symbols.extend_from_slice(term.symbols());
        }
        Ok(Self::canonicalized(num_modes, symbols, coeffs, 0.0))
    }

    /// Create a sum from `(label, coefficient)` pairs.
    ///
    /// Like terms are summed and terms whose summed coefficient is exactly zero are dropped.
    pub fn from_list<L, I>(num_modes: u32, terms: I) -> Result<Self, LabelError>
    where
        L: AsRef<str>,
        I: IntoIterator<Item = (L, Complex64)>,
    {
        Self::from_list_with_tolerance(num_modes, terms, 0.0)
    }

    /// Create a sum from `(label, coefficient)` pairs, dropping any term whose summed coefficient
    /// has magnitude at most `tol`.
    pub fn from_list_with_tolerance<L, I>(
        num_modes: u32,
        terms: I,
        tol: f64,
    ) -> Result<Self, LabelError>
    where
        L: AsRef<str>,
        I: IntoIterator<Item = (L, Complex64)>,
    {
        let width = num_modes as usize;
        let terms = terms.into_iter();
        let mut coeffs = Vec::with_capacity(terms.size_hint().0);
        let mut symbols = Vec::new();
        for (label, coeff) in terms {
            let label = label.as_ref();
            // Only reserve for a label that can fit.
            if label.len() < width {
                let found = label.chars().count();
                return Err(LabelError::WrongLength {
                    num_modes,
                    label: found,
                });
            }
            let start = symbols.len();
            term::extend_from_label(label, &mut symbols)?;
            if symbols.len() - start != width {
                return Err(LabelError::WrongLength {
                    num_modes,
                    label: symbols.len() - start,
                });
            }
            coeffs.push(coeff);
        }
        Ok(Self::canonicalized(num_modes, symbols, coeffs, tol))
    }

    /// Create a sum from `(letters, indices, coefficient)` triples.
    ///
    /// `letters[k]` acts on site `indices[k]`, and every site not named is the identity.  This is
    /// the inverse of [to_sparse_list](Self::to_sparse_list).
    pub fn from_sparse_list<L, I>(num_modes: u32, terms: I) -> Result<Self, LabelError>
    where
        L: AsRef<str>,
        I: IntoIterator<Item = (L, Vec<u32>, Complex64)>,
    {
        let width = num_modes as usize;
        let mut coeffs = Vec::new();
        let mut symbols = Vec::new();
        let mut letters = Vec::new();
        let mut sorted_indices = Vec::new();
        for (label, indices, coeff) in terms {
            letters.clear();
            term::extend_from_label(label.as_ref(), &mut letters)?;
            if letters.len() != indices.len() {
                return Err(LabelError::WrongLengthIndices {
                    label: letters.len(),
                    indices: indices.len(),
                });
            }
            // `extend_from_label` stores site order, which reverses the letters as written; this
            // form pairs them with `indices` as written.
            letters.reverse();
            if let Some(&index) = indices.iter().find(|index| **index >= num_modes) {
                return Err(LabelError::BadIndex { index, num_modes });
            }
            sorted_indices.clear();
            sorted_indices.extend_from_slice(&indices);
            sorted_indices.sort_unstable();
            if let Some(pair) = sorted_indices.windows(2).find(|pair| pair[0] == pair[1]) {
                return Err(LabelError::DuplicateIndex { index: pair[0] });
            }
            // The term is valid, so its full width is needed.
            let start = symbols.len();
            symbols.resize(start + width, S::IDENTITY);
            for (letter, index) in letters.iter().zip(&indices) {
                symbols[start + *index as usize] = *letter;
            }
            coeffs.push(coeff);
        }
        Ok(Self::canonicalized(num_modes, symbols, coeffs, 0.0))
    }

    /// Get the number of sites the operator is defined on.
    #[inline]
    pub fn num_modes(&self) -> u32 {
        self.num_modes
    }

    /// Get the number of terms in the sum.
    #[inline]
    pub fn num_terms(&self) -> usize {
        self.coeffs.len()
    }

    /// Get the coefficients of the terms, in canonical order.
    #[inline]
    pub fn coeffs(&self) -> &[Complex64] {
        &self.coeffs
    }

    /// Get the flat letters of every term.  See the type-level documentation for the layout.
    #[inline]
    pub fn symbols(&self) -> &[S] {
        &self.symbols
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.coeffs.is_empty()
    }

    #[inline]
    fn term_symbols(&self, index: usize) -> &[S] {
        let width = self.num_modes as usize;
        &self.symbols[index * width..(index + 1) * width]
    }

    /// Get the `index`th term in canonical order.
    ///
    /// # Panics
    ///
    /// If `index` is out of range.
    pub fn term(&self, index: usize) -> TermView<'_, S> {
        TermView {
            coeff: self.coeffs[index],
            symbols: self.term_symbols(index),
        }
    }

    /// Get the `index`th term in canonical order, or `None` if out of range.
    pub fn get(&self, index: usize) -> Option<TermView<'_, S>> {
        (index < self.num_terms()).then(|| self.term(index))
    }

    /// Get an iterator over the individual terms of the operator, in canonical order.
    pub fn iter(&'_ self) -> impl ExactSizeIterator<Item = TermView<'_, S>> + '_ {
        self.coeffs
            .iter()
            .enumerate()
            .map(|(i, coeff)| TermView {
                coeff: *coeff,
                symbols: self.term_symbols(i),
            })
    }

    /// Binary search for the term with the given letters.
    fn position(&self, symbols: &[S]) -> Option<usize> {
        if symbols.len() != self.num_modes as usize {
            return None;
        }
        let (mut lo, mut hi) = (0, self.num_terms());
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            match symbol::cmp_labels(self.term_symbols(mid), symbols) {
                Ordering::Less => lo = mid + 1,
                Ordering::Greater => hi = mid,
                Ordering::Equal => return Some(mid),
            }
        }
        None
    }

    /// The coefficient of the term with the given letters (in site order), or zero if there is no
    /// such term.
    pub fn coeff_of(&self, symbols: &[S]) -> Complex64 {
        self.position(symbols)
            .map_or(C_ZERO, |index| self.coeffs[index])
    }

    /// The coefficient of the term with the given label, or zero if there is no such term.
    pub fn coeff_of_label(&self, label: &str) -> Result<Complex64, LabelError> {
        let mut symbols = Vec::with_capacity(label.len());
        term::extend_from_label(label, &mut symbols)?;
        if symbols.len() != self.num_modes as usize {
            return Err(LabelError::WrongLength {
                num_modes: self.num_modes,
                label: symbols.len(),
            });
        }
        Ok(self.coeff_of(&symbols))
    }

    /// The coefficient of the all-identity term, or zero if it is not present.
    pub fn identity_coeff(&self) -> Complex64 {
        self.coeff_of(&vec![S::IDENTITY; self.num_modes as usize])
    }

    /// This operator with the all-identity term removed.
    pub fn without_identity(&self) -> Self {
        self.split_identity().1
    }

    /// Separate the all-identity term from the rest of the sum.
    ///
    /// Returns the identity coefficient (zero if absent) and the remaining operator.  Adding the
    /// two back together recovers this operator.
    pub fn split_identity(&self) -> (Complex64, Self) {
        let identity = vec![S::IDENTITY; self.num_modes as usize];
        match self.position(&identity) {
            None => (C_ZERO, self.clone()),
            Some(index) => {
                let width = self.num_modes as usize;
                let mut rest = self.clone();
                rest.coeffs.remove(index);
                rest.symbols.drain(index * width..(index + 1) * width);
                (self.coeffs[index], rest)
            }
        }
    }

    /// Return a suitable error if two operators do not have equal numbers of modes.
    pub fn check_equal_widths(&self, other: &Self) -> Result<(), ArithmeticError> {
        if self.num_modes != other.num_modes {
            Err(ArithmeticError::MismatchedWidths {
                left: self.num_modes,
                right: other.num_modes,
            })
        } else {
            Ok(())
        }
    }

    /// Merge two canonical sums, applying `rhs_map` to the coefficients of `other`.
    fn merge(
        &self,
        other: &Self,
        rhs_map: impl Fn(Complex64) -> Complex64,
    ) -> Result<Self, ArithmeticError> {
        self.check_equal_widths(other)?;
        let mut out = Self::with_capacity(self.num_modes, self.num_terms() + other.num_terms());
        let left = self.iter().map(|term| (LabelKey(term.symbols), term.coeff));
        let right = other
            .iter()
            .map(|term| (LabelKey(term.symbols), rhs_map(term.coeff)));
        for (LabelKey(letters), paired) in pairwise_ordered(left, right) {
            let coeff = match paired {
                Paired::Left(coeff) | Paired::Right(coeff) => coeff,
                Paired::Both(left, right) => left + right,
            };
            if coeff == C_ZERO {
                continue;
            }
            out.coeffs.push(coeff);
            out.symbols.extend_from_slice(letters);
        }
        Ok(out)
    }

    /// Sum of two operators on the same number of modes.
    pub fn checked_add(&self, other: &Self) -> Result<Self, ArithmeticError> {
        self.merge(other, |coeff| coeff)
    }

    /// Difference of two operators on the same number of modes.
    pub fn checked_sub(&self, other: &Self) -> Result<Self, ArithmeticError> {
        self.merge(other, |coeff| -coeff)
    }

    /// The operator product `self · other`.
    ///
    /// Every pair of terms is multiplied, and the products are merged into canonical form.  Pairs
    /// whose product vanishes (possible in the fermionic alphabet) contribute nothing.
    pub fn compose(&self, other: &Self) -> Result<Self, ArithmeticError> {
        self.check_equal_widths(other)?;
        let width = self.num_modes as usize;
        let num_products = self.num_terms() * other.num_terms();
        let mut coeffs = Vec::with_capacity(num_products);
        let mut symbols = Vec::with_capacity(num_products * width);
        let mut scratch = Vec::with_capacity(width);
        for left in self.iter() {
            for right in other.iter() {
                if let Some(phase) = S::multiply_into(left.symbols, right.symbols, &mut scratch) {
                    coeffs.push(mul_i_pow(left.coeff * right.coeff, phase as u32));
                    symbols.extend_from_slice(&scratch);
                }
            }
        }
        Ok(Self::canonicalized(self.num_modes, symbols, coeffs, 0.0))
    }

    /// Remove every term whose coefficient has magnitude at most `tol`.
    ///
    /// This function is idempotent.
    pub fn simplify(&self, tol: f64) -> Self {
        self.simplify_with_report(tol).0
    }

    /// [simplify](Self::simplify), also reporting how many terms were dropped.
    ///
    /// All stored coefficients are non-zero, so every dropped term is a loss of information; each
    /// call that drops anything emits a `WARN` event.
    pub fn simplify_with_report(&self, tol: f64) -> (Self, SimplifyReport) {
        let mut out = Self::with_capacity(self.num_modes, self.num_terms());
        let mut report = SimplifyReport::default();
        for term in self.iter() {
            if is_negligible(term.coeff, tol) {
                report.dropped += 1;
                continue;
            }
            out.coeffs.push(term.coeff);
            out.symbols.extend_from_slice(term.symbols);
        }
        if report.dropped > 0 {
            warn!(
                dropped = report.dropped,
                tol,
                num_terms = self.num_terms(),
                "simplify dropped non-zero terms within tolerance"
            );
        }
        (out, report)
    }

    /// Reverse the site order of every term.
    ///
    /// This converts to and from the labelling convention in which site 0 is the leftmost letter.
    pub fn reverse_modes(&self) -> Self {
        let width = self.num_modes as usize;
        let mut symbols = self.symbols.clone();
        if width > 1 {
            symbols
                .chunks_exact_mut(width)
                .for_each(|letters| letters.reverse());
        }
        Self::canonicalized(self.num_modes, symbols, self.coeffs.clone(), 0.0)
    }

    /// Export the sum as `(label, coefficient)` pairs, in canonical order.
    pub fn to_list(&self) -> Vec<(String, Complex64)> {
        self.iter()
            .map(|term| (term.to_label(), term.coeff))
            .collect()
    }

    /// Export the sum as `(letters, indices, coefficient)` triples, in canonical order.
    ///
    /// Only the non-identity letters are written out, paired with the sites they act on in
    /// increasing order.
    pub fn to_sparse_list(&self) -> Vec<(String, Vec<u32>, Complex64)> {
        self.iter()
            .map(|term| {
                let (letters, indices): (String, Vec<u32>) = term
                    .symbols
                    .iter()
                    .enumerate()
                    .filter(|(_, letter)| **letter != S::IDENTITY)
                    .map(|(index, letter)| (letter.label() as char, index as u32))
                    .unzip();
                (letters, indices, term.coeff)
            })
            .collect()
    }

    /// Remove any coefficient that arithmetic has rounded to exactly zero.
    fn drop_exact_zeros(&mut self) {
        if self.coeffs.iter().all(|coeff| *coeff != C_ZERO) {
            return;
        }
        let width = self.num_modes as usize;
        let mut write = 0;
        for read in 0..self.coeffs.len() {
            if self.coeffs[read] == C_ZERO {
                continue;
            }
            self.coeffs[write] = self.coeffs[read];
            self.symbols
                .copy_within(read * width..(read + 1) * width, write * width);
            write += 1;
        }
        self.coeffs.truncate(write);
        self.symbols.truncate(write * width);
    }
}

impl<S: Symbol> ::std::fmt::Display for OperatorSum<S> {
    fn fmt(&self, f: &mut ::std::fmt::Formatter) -> ::std::fmt::Result {
        if self.is_zero() {
            return write!(f, "0");
        }
        for (i, term) in self.iter().enumerate() {
            if i > 0 {
                write!(f, " + ")?;
            }
            write!(f, "({})({})", term.coeff, term.to_label())?;
        }
        Ok(())
    }
}

impl<S: Symbol> AbsDiffEq for OperatorSum<S> {
    type Epsilon = f64;

    fn default_epsilon() -> f64 {
        f64::EPSILON
    }

    /// Equal widths, and every label's coefficient within `epsilon`, where a term missing from one
    /// side counts as a zero coefficient.
    fn abs_diff_eq(&self, other: &Self, epsilon: f64) -> bool {
        if self.num_modes != other.num_modes {
            return false;
        }
        let left = self.iter().map(|term| (LabelKey(term.symbols), term.coeff));
        let right = other.iter().map(|term| (LabelKey(term.symbols), term.coeff));
        pairwise_ordered(left, right).all(|(_, paired)| match paired {
            Paired::Left(coeff) | Paired::Right(coeff) => coeff.abs_diff_eq(&C_ZERO, epsilon),
            Paired::Both(left, right) => left.abs_diff_eq(&right, epsilon),
        })
    }
}

/// Interchange form: `{"num_modes": n, "terms": [[label, [re, im]], ...]}`.
#[derive(Serialize, Deserialize)]
struct OperatorSumRepr {
    num_modes: u32,
    terms: Vec<(String, Complex64)>,
}

impl<S: Symbol> Serialize for OperatorSum<S> {
    fn serialize<Ser: Serializer>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error> {
        OperatorSumRepr {
            num_modes: self.num_modes,
            terms: self.to_list(),
        }
        .serialize(serializer)
    }
}

impl<'de, S: Symbol> Deserialize<'de> for OperatorSum<S> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let repr = OperatorSumRepr::deserialize(deserializer)?;
        Self::from_list(repr.num_modes, repr.terms).map_err(::serde::de::Error::custom)
    }
}

impl<S: Symbol> ::std::ops::Add<&OperatorSum<S>> for OperatorSum<S> {
    type Output = OperatorSum<S>;

    fn add(self, rhs: &OperatorSum<S>) -> OperatorSum<S> {
        &self + rhs
    }
}
impl<S: Symbol> ::std::ops::Add for &OperatorSum<S> {
    type Output = OperatorSum<S>;

    fn add(self, rhs: &OperatorSum<S>) -> OperatorSum<S> {
        match self.checked_add(rhs) {
            Ok(out) => out,
            Err(_) => panic!("attempt to add two operators with incompatible mode counts"),
        }
    }
}
impl<S: Symbol> ::std::ops::AddAssign<&OperatorSum<S>> for OperatorSum<S> {
    fn add_assign(&mut self, rhs: &OperatorSum<S>) {
        *self = &*self + rhs;
    }
}

impl<S: Symbol> ::std::ops::Sub<&OperatorSum<S>> for OperatorSum<S> {
    type Output = OperatorSum<S>;

    fn sub(self, rhs: &OperatorSum<S>) -> OperatorSum<S> {
        &self - rhs
    }
}
impl<S: Symbol> ::std::ops::Sub for &OperatorSum<S> {
    type Output = OperatorSum<S>;

    fn sub(self, rhs: &OperatorSum<S>) -> OperatorSum<S> {
        match self.checked_sub(rhs) {
            Ok(out) => out,
            Err(_) => panic!("attempt to subtract two operators with incompatible mode counts"),
        }
    }
}
impl<S: Symbol> ::std::ops::SubAssign<&OperatorSum<S>> for OperatorSum<S> {
    fn sub_assign(&mut self, rhs: &OperatorSum<S>) {
        *self = &*self - rhs;
    }
}

impl<S: Symbol> ::std::ops::Mul for &OperatorSum<S> {
    type Output = OperatorSum<S>;

    fn mul(self, rhs: &OperatorSum<S>) -> OperatorSum<S> {
        match self.compose(rhs) {
            Ok(out) => out,
            Err(_) => panic!("attempt to multiply two operators with incompatible mode counts"),
        }
    }
}

impl<S: Symbol> ::std::ops::Mul<Complex64> for OperatorSum<S> {
    type Output = OperatorSum<S>;

    fn mul(mut self, rhs: Complex64) -> OperatorSum<S> {
        self *= rhs;
        self
    }
}
impl<S: Symbol> ::std::ops::Mul<Complex64> for &OperatorSum<S> {
    type Output = OperatorSum<S>;

    fn mul(self, rhs: Complex64) -> OperatorSum<S> {
        if rhs == C_ZERO {
            OperatorSum::zero(self.num_modes)
        } else {
            let mut out = OperatorSum {
                num_modes: self.num_modes,
                coeffs: self.coeffs.iter().map(|c| c * rhs).collect(),
                symbols: self.symbols.clone(),
            };
            out.drop_exact_zeros();
            out
        }
    }
}
impl<S: Symbol> ::std::ops::Mul<OperatorSum<S>> for Complex64 {
    type Output = OperatorSum<S>;

    fn mul(self, mut rhs: OperatorSum<S>) -> OperatorSum<S> {
        rhs *= self;
        rhs
    }
}
impl<S: Symbol> ::std::ops::Mul<&OperatorSum<S>> for Complex64 {
    type Output = OperatorSum<S>;

    fn mul(self, rhs: &OperatorSum<S>) -> OperatorSum<S> {
        rhs * self
    }
}
impl<S: Symbol> ::std::ops::MulAssign<Complex64> for OperatorSum<S> {
    fn mul_assign(&mut self, rhs: Complex64) {
        if rhs == C_ZERO {
            self.coeffs.clear();
            self.symbols.clear();
        } else {
            self.coeffs.iter_mut().for_each(|c| *c *= rhs);
            self.drop_exact_zeros();
        }
    }
}

impl<S: Symbol> ::std::ops::Div<Complex64> for OperatorSum<S> {
    type Output = OperatorSum<S>;

    fn div(mut self, rhs: Complex64) -> OperatorSum<S> {
        self /= rhs;
        self
    }
}
impl<S: Symbol> ::std::ops::Div<Complex64> for &OperatorSum<S> {
    type Output = OperatorSum<S>;

    fn div(self, rhs: Complex64) -> OperatorSum<S> {
        self.clone() / rhs
    }
}
impl<S: Symbol> ::std::ops::DivAssign<Complex64> for OperatorSum<S> {
    fn div_assign(&mut self, rhs: Complex64) {
        self.coeffs.iter_mut().for_each(|c| *c /= rhs);
        self.drop_exact_zeros();
    }
}

impl<S: Symbol> ::std::ops::Neg for &OperatorSum<S> {
    type Output = OperatorSum<S>;

    fn neg(self) -> OperatorSum<S> {
        OperatorSum {
            num_modes: self.num_modes,
            coeffs: self.coeffs.iter().map(|c| -c).collect(),
            symbols: self.symbols.clone(),
        }
    }
}
impl<S: Symbol> ::std::ops::Neg for OperatorSum<S> {
    type Output = OperatorSum<S>;

    fn neg(mut self) -> OperatorSum<S> {
        self.coeffs.iter_mut().for_each(|c| *c = -*c);
        self
    }
}
