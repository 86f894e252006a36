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

//! The Jordan-Wigner mapping from fermionic operators to qubit operators.
//!
//! Mode `j` maps to qubit `j`.  Each odd letter (`+` or `-`) on mode `j` also carries a string of
//! `Z` on every qubit below `j`, which accounts for the anticommutation of the fermionic
//! operators.

use num_complex::Complex64;
use once_cell::sync::Lazy;
use rayon::prelude::*;
use thiserror::Error;
use tracing::debug;

use crate::c64;
use crate::fermion::FermionSymbol;
use crate::getenv_use_multiple_threads;
use crate::operator_sum::{FermionOperator, PauliOperator};
use crate::pauli::Pauli;
use crate::symbol::Symbol;
use crate::term::TermView;
use crate::util::C_ONE;

/// Expand terms in parallel from this many input terms upwards.
const PARALLEL_THRESHOLD: usize = 128;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum JordanWignerError {
    #[error("term {term} has {found} modes, but the operator has {expected}")]
    MismatchedWidths {
        expected: u32,
        found: usize,
        term: usize,
    },
    #[error("letter {letter:?} at position {position} has no Jordan-Wigner mapping")]
    UnsupportedSymbol { letter: char, position: usize },
}

/// The image of one fermionic letter on its own mode.
#[derive(Debug)]
struct Mapping {
    /// Whether the letter brings a `Z` string on the lower modes.
    odd: bool,
    /// The single-qubit expansion on the letter's own mode.
    local: Box<[(Pauli, Complex64)]>,
}

/// Mapping table, indexed by label byte.
static JW_TABLE: Lazy<[Option<Mapping>; 256]> = Lazy::new(|| {
    let mut table: [Option<Mapping>; 256] = ::std::array::from_fn(|_| None);
    let mut set = |symbol: FermionSymbol, local: &[(Pauli, Complex64)]| {
        table[symbol.label() as usize] = Some(Mapping {
            odd: symbol.is_odd(),
            local: local.into(),
        });
    };
    // a† = |1⟩⟨0| = (X - iY) / 2
    set(
        FermionSymbol::Create,
        &[(Pauli::X, c64!(0.5, 0)), (Pauli::Y, c64!(0, -0.5))],
    );
    // a = |0⟩⟨1| = (X + iY) / 2
    set(
        FermionSymbol::Annihilate,
        &[(Pauli::X, c64!(0.5, 0)), (Pauli::Y, c64!(0, 0.5))],
    );
    // a† a = |1⟩⟨1| = (I - Z) / 2
    set(
        FermionSymbol::Number,
        &[(Pauli::I, c64!(0.5, 0)), (Pauli::Z, c64!(-0.5, 0))],
    );
    // a a† = |0⟩⟨0| = (I + Z) / 2
    set(
        FermionSymbol::Hole,
        &[(Pauli::I, c64!(0.5, 0)), (Pauli::Z, c64!(0.5, 0))],
    );
    set(FermionSymbol::Identity, &[(Pauli::I, C_ONE)]);
    table
});

#[inline]
fn lookup(letter: u8) -> Option<&'static Mapping> {
    JW_TABLE[letter as usize].as_ref()
}

/// Expand one fermionic term and append its Pauli strings to the flat buffers.
///
/// `mappings` is in site order.  In the mode-ordered product `J(op_0) J(op_1) ⋯`, qubit `q` sees
/// its own local expansion followed by one `Z` for every odd letter above it, so each qubit
/// contributes an independent factor and the expansion is their tensor product.
fn expand_into(
    mappings: &[&Mapping],
    coeff: Complex64,
    symbols: &mut Vec<Pauli>,
    coeffs: &mut Vec<Complex64>,
) {
    let width = mappings.len();
    let base = coeffs.len();
    debug_assert_eq!(symbols.len(), base * width);
    coeffs.push(C_ONE);
    symbols.resize(symbols.len() + width, Pauli::I);

    let mut odd_above = false;
    let mut factor = Vec::with_capacity(2);
    for qubit in (0..width).rev() {
        let mapping = mappings[qubit];
        factor.clear();
        factor.extend(mapping.local.iter().map(|&(pauli, value)| {
            if odd_above {
                let (product, phase) = pauli.multiply(Pauli::Z);
                (product, crate::util::mul_i_pow(value, phase as u32))
            } else {
                (pauli, value)
            }
        }));
        if mapping.odd {
            odd_above = !odd_above;
        }

        // Every option after the first duplicates the strings built so far.
        let count = coeffs.len() - base;
        for &(pauli, value) in &factor[1..] {
            for k in 0..count {
                let row = base + k;
                coeffs.push(coeffs[row] * value);
                symbols.extend_from_within(row * width..(row + 1) * width);
                let last = symbols.len() - width;
                symbols[last + qubit] = pauli;
            }
        }
        let (pauli, value) = factor[0];
        for row in base..base + count {
            coeffs[row] *= value;
            symbols[row * width + qubit] = pauli;
        }
    }
    for value in &mut coeffs[base..] {
        *value *= coeff;
    }
}

/// Expand a typed term.  Every fermionic letter is in the table.
fn expand_term(
    term: TermView<FermionSymbol>,
) -> Result<(Vec<Pauli>, Vec<Complex64>), JordanWignerError> {
    let width = term.symbols.len();
    let mappings = term
        .symbols
        .iter()
        .enumerate()
        .map(|(site, letter)| {
            lookup(letter.label()).ok_or(JordanWignerError::UnsupportedSymbol {
                letter: letter.label() as char,
                position: width - 1 - site,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    let mut symbols = Vec::new();
    let mut coeffs = Vec::new();
    expand_into(&mappings, term.coeff, &mut symbols, &mut coeffs);
    Ok((symbols, coeffs))
}

/// Map a single fermionic term to a Pauli operator.
pub fn jordan_wigner_term(
    term: TermView<FermionSymbol>,
) -> Result<PauliOperator, JordanWignerError> {
    let (symbols, coeffs) = expand_term(term)?;
    Ok(PauliOperator::canonicalized(
        term.num_modes(),
        symbols,
        coeffs,
        0.0,
    ))
}

/// Map a fermionic operator to a Pauli operator on the same number of qubits.
///
/// Each term is expanded independently, then every Pauli string is merged into one canonical sum.
/// The result is bit-for-bit independent of the order of the input terms, and the all-identity
/// term passes through as the all-identity Pauli string.
///
/// The per-term expansion runs in parallel for large inputs, unless threading is disabled by the
/// environment.
pub fn jordan_wigner(operator: &FermionOperator) -> Result<PauliOperator, JordanWignerError> {
    let parallel =
        operator.num_terms() >= PARALLEL_THRESHOLD && getenv_use_multiple_threads();
    jordan_wigner_inner(operator, parallel)
}

fn jordan_wigner_inner(
    operator: &FermionOperator,
    parallel: bool,
) -> Result<PauliOperator, JordanWignerError> {
    debug!(
        num_terms = operator.num_terms(),
        num_modes = operator.num_modes(),
        parallel,
        "starting Jordan-Wigner transform"
    );
    let pieces = if parallel {
        (0..operator.num_terms())
            .into_par_iter()
            .map(|index| expand_term(operator.term(index)))
            .collect::<Result<Vec<_>, _>>()?
    } else {
        operator
            .iter()
            .map(expand_term)
            .collect::<Result<Vec<_>, _>>()?
    };
    let (symbols, coeffs) = pieces.into_iter().fold(
        (Vec::new(), Vec::new()),
        |(mut symbols, mut coeffs), (piece_symbols, piece_coeffs)| {
            symbols.extend(piece_symbols);
            coeffs.extend(piece_coeffs);
            (symbols, coeffs)
        },
    );
    let out = PauliOperator::canonicalized(operator.num_modes(), symbols, coeffs, 0.0);
    debug!(num_terms = out.num_terms(), "finished Jordan-Wigner transform");
    Ok(out)
}

/// Map fermionic terms given as raw `(label, coefficient)` pairs to a Pauli operator.
///
/// Labels use the fermionic alphabet with mode 0 as the rightmost character.  Every label must be
/// exactly `num_modes` characters long, and every letter must have a mapping.
pub fn jordan_wigner_from_list<L, I>(
    num_modes: u32,
    terms: I,
) -> Result<PauliOperator, JordanWignerError>
where
    L: AsRef<str>,
    I: IntoIterator<Item = (L, Complex64)>,
{
    let width = num_modes as usize;
    let mut symbols = Vec::new();
    let mut coeffs = Vec::new();
    let mut mappings = Vec::with_capacity(width);
    for (term, (label, coeff)) in terms.into_iter().enumerate() {
        let label = label.as_ref();
        let found = label.chars().count();
        if found != width {
            return Err(JordanWignerError::MismatchedWidths {
                expected: num_modes,
                found,
                term,
            });
        }
        mappings.clear();
        for (position, letter) in label.chars().enumerate() {
            let mapping = u8::try_from(letter)
                .ok()
                .and_then(lookup)
                .ok_or(JordanWignerError::UnsupportedSymbol { letter, position })?;
            mappings.push(mapping);
        }
        mappings.reverse();
        expand_into(&mappings, coeff, &mut symbols, &mut coeffs);
    }
    Ok(PauliOperator::canonicalized(num_modes, symbols, coeffs, 0.0))
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::dense::to_matrix_dense;
    use crate::fermion::Ladder;
    use crate::term::Term;
    use crate::test::in_scoped_thread_pool;
    use crate::util::C_ZERO;

    fn fermion(num_modes: u32, terms: &[(&str, Complex64)]) -> FermionOperator {
        FermionOperator::from_list(num_modes, terms.iter().copied()).unwrap()
    }

    fn pauli(num_qubits: u32, terms: &[(&str, Complex64)]) -> PauliOperator {
        PauliOperator::from_list(num_qubits, terms.iter().copied()).unwrap()
    }

    #[test]
    fn single_letters_map_to_table() {
        let cases = [
            ("+", pauli(1, &[("X", c64!(0.5, 0)), ("Y", c64!(0, -0.5))])),
            ("-", pauli(1, &[("X", c64!(0.5, 0)), ("Y", c64!(0, 0.5))])),
            ("N", pauli(1, &[("I", c64!(0.5, 0)), ("Z", c64!(-0.5, 0))])),
            ("E", pauli(1, &[("I", c64!(0.5, 0)), ("Z", c64!(0.5, 0))])),
            ("I", pauli(1, &[("I", C_ONE)])),
        ];
        for (label, expected) in cases {
            let out = jordan_wigner(&fermion(1, &[(label, C_ONE)])).unwrap();
            assert_eq!(out, expected, "{label}");
        }
    }

    #[test]
    fn odd_letters_carry_z_strings() {
        // a†_2 on three modes is Z_0 Z_1 (X_2 - i Y_2) / 2.
        let out = jordan_wigner(&fermion(3, &[("+II", C_ONE)])).unwrap();
        assert_eq!(
            out,
            pauli(3, &[("XZZ", c64!(0.5, 0)), ("YZZ", c64!(0, -0.5))])
        );
    }

    #[test]
    fn hopping_term_is_hermitian_pair() {
        // a†_1 a_0 + a†_0 a_1 = (X_0 X_1 + Y_0 Y_1) / 2.
        let hop = Term::from_ladder_ops(2, &[Ladder::Create(1), Ladder::Annihilate(0)], C_ONE)
            .unwrap();
        let back = Term::from_ladder_ops(2, &[Ladder::Create(0), Ladder::Annihilate(1)], C_ONE)
            .unwrap();
        let op = FermionOperator::from_terms(2, [hop, back]).unwrap();
        let out = jordan_wigner(&op).unwrap();
        assert_eq!(
            out,
            pauli(2, &[("XX", c64!(0.5, 0)), ("YY", c64!(0.5, 0))])
        );
    }

    #[test]
    fn identity_term_passes_through() {
        let op = fermion(4, &[("IIII", c64!(0.75, 0)), ("NIII", C_ONE)]);
        let out = jordan_wigner(&op).unwrap();
        assert_eq!(out.identity_coeff(), c64!(1.25, 0));
        assert_eq!(out.coeff_of_label("ZIII").unwrap(), c64!(-0.5, 0));
    }

    #[test]
    fn number_operators_cancel_hole_operators() {
        // N + E is the identity on the mode.
        let op = fermion(2, &[("NI", C_ONE), ("EI", C_ONE)]);
        assert_eq!(jordan_wigner(&op).unwrap(), pauli(2, &[("II", C_ONE)]));
    }

    #[test]
    fn canonical_anticommutation_relations() {
        let n = 3;
        let ladder = |op: Ladder| {
            let term = Term::from_ladder_ops(n, &[op], C_ONE).unwrap();
            jordan_wigner_term(term.view()).unwrap()
        };
        for p in 0..n {
            for q in 0..n {
                let a_p = ladder(Ladder::Annihilate(p));
                let a_dag_q = ladder(Ladder::Create(q));
                let anticommutator = &(&a_p * &a_dag_q) + &(&a_dag_q * &a_p);
                let expected = if p == q {
                    PauliOperator::identity(n)
                } else {
                    PauliOperator::zero(n)
                };
                assert_eq!(anticommutator, expected, "{{a_{p}, a†_{q}}}");

                let a_q = ladder(Ladder::Annihilate(q));
                assert!((&(&a_p * &a_q) + &(&a_q * &a_p)).is_zero());
            }
        }
    }

    #[test]
    fn mapping_is_a_homomorphism() {
        // J(A B) = J(A) J(B), checked through the fermionic product.
        let a = fermion(3, &[("+-I", c64!(0.5, 0.25)), ("IN+", c64!(-1, 0))]);
        let b = fermion(3, &[("-IE", c64!(2, 0)), ("I+-", c64!(0, 1))]);
        let direct = jordan_wigner(&a.compose(&b).unwrap()).unwrap();
        let mapped = jordan_wigner(&a)
            .unwrap()
            .compose(&jordan_wigner(&b).unwrap())
            .unwrap();
        assert_abs_diff_eq!(direct, mapped, epsilon = 1e-12);
    }

    #[test]
    fn matrices_of_ladder_operators() {
        // a_1 on two qubits lowers bit 1, with a sign from the occupation of qubit 0.
        let op = jordan_wigner(&fermion(2, &[("-I", C_ONE)])).unwrap();
        let matrix = to_matrix_dense(&op).unwrap();
        // |10> -> |00>, |11> -> -|01>.
        assert_eq!(matrix[[0b00, 0b10]], C_ONE);
        assert_eq!(matrix[[0b01, 0b11]], -C_ONE);
        assert_eq!(matrix[[0b10, 0b00]], C_ZERO);
    }

    #[test]
    fn raw_labels_are_checked() {
        assert_eq!(
            jordan_wigner_from_list(2, [("+-", C_ONE), ("+", C_ONE)]).unwrap_err(),
            JordanWignerError::MismatchedWidths {
                expected: 2,
                found: 1,
                term: 1
            }
        );
        assert_eq!(
            jordan_wigner_from_list(3, [("+X-", C_ONE)]).unwrap_err(),
            JordanWignerError::UnsupportedSymbol {
                letter: 'X',
                position: 1
            }
        );
        let raw = jordan_wigner_from_list(2, [("+-", c64!(0.5, 0)), ("NN", C_ONE)]).unwrap();
        let typed = jordan_wigner(&fermion(2, &[("+-", c64!(0.5, 0)), ("NN", C_ONE)])).unwrap();
        assert_eq!(raw, typed);
    }

    #[test]
    fn term_order_does_not_matter() {
        let terms = [
            ("+-II", c64!(0.1, 0)),
            ("IN+-", c64!(-0.3, 0.2)),
            ("NNII", c64!(0.7, 0)),
            ("-+II", c64!(0.1, 0)),
            ("IIII", c64!(0.9, 0)),
        ];
        let forward = jordan_wigner_from_list(4, terms).unwrap();
        let mut reversed = terms;
        reversed.reverse();
        assert_eq!(jordan_wigner_from_list(4, reversed).unwrap(), forward);
    }

    #[test]
    fn parallel_expansion_matches_serial() {
        let op = fermion(
            4,
            &[
                ("+-II", c64!(0.1, 0)),
                ("IN+-", c64!(-0.3, 0.2)),
                ("NNII", c64!(0.7, 0)),
                ("-+EI", c64!(0.1, 0)),
                ("IIII", c64!(0.9, 0)),
            ],
        );
        let serial = jordan_wigner_inner(&op, false).unwrap();
        let parallel = in_scoped_thread_pool(|| jordan_wigner_inner(&op, true))
            .expect("failed to create thread pool")
            .unwrap();
        assert_eq!(serial, parallel);
    }
}
