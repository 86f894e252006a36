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
use std::fmt::Debug;
use std::hash::Hash;

/// The capabilities a single-site alphabet needs to be used as the letters of a [Term] or an
/// [OperatorSum].
///
/// Both the Pauli alphabet and the fermionic alphabet implement this independently; every
/// container is generic over it and monomorphised, so the multiplication and merge hot loops never
/// go through dynamic dispatch.
///
/// # Ordering
///
/// The `Ord` implementation of a symbol must agree with the byte ordering of its [label]s.  Terms
/// and sums compare their labels lexicographically, and they do it by comparing symbols rather
/// than by formatting strings.
///
/// [Term]: crate::term::Term
/// [OperatorSum]: crate::operator_sum::OperatorSum
/// [label]: Symbol::label
pub trait Symbol: Copy + Eq + Ord + Hash + Debug + Send + Sync + 'static {
    /// The letter that acts as the identity on a single site.
    const IDENTITY: Self;
    /// Every valid label letter, for error messages.
    const ALPHABET: &'static str;
    /// Human-readable name of the algebra, for error messages and logging.
    const ALGEBRA: &'static str;

    /// The single-byte label of this letter.
    fn label(self) -> u8;

    /// Attempt to convert a label byte back into a letter.
    fn try_from_label(letter: u8) -> Option<Self>;

    /// Multiply two full-width symbol strings site by site, writing the product string into `out`.
    ///
    /// Both slices are in site order (`slice[i]` acts on site `i`) and must be the same length;
    /// `out` is cleared first.  The return value is the accumulated scalar factor as a power of
    /// the imaginary unit (so `Some(2)` means the product picked up a factor of -1), or `None` if
    /// the product vanishes identically.  If the product vanishes, the contents of `out` are
    /// unspecified.
    fn multiply_into(left: &[Self], right: &[Self], out: &mut Vec<Self>) -> Option<u8>;
}

/// Compare two symbol strings (stored in site order) by their labels.
///
/// Labels are written with site 0 as the rightmost character, so label order is the reverse
/// lexicographical order of the stored slices.
#[inline]
pub fn cmp_labels<S: Symbol>(left: &[S], right: &[S]) -> Ordering {
    left.iter().rev().cmp(right.iter().rev())
}

/// Is this symbol string the identity on every site?
#[inline]
pub fn is_identity<S: Symbol>(symbols: &[S]) -> bool {
    symbols.iter().all(|symbol| *symbol == S::IDENTITY)
}

/// Write the label of a symbol string (stored in site order) into a new `String`.
pub fn to_label<S: Symbol>(symbols: &[S]) -> String {
    // All label letters are ASCII, so this is a valid UTF-8 construction.
    symbols.iter().rev().map(|s| s.label() as char).collect()
}
