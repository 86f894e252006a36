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

//! Conversion between dense computational-basis matrices and [PauliOperator]s.

use ndarray::{Array2, ArrayView2, ArrayViewMut1, Axis};
use num_complex::Complex64;
use rayon::prelude::*;
use thiserror::Error;
use tracing::debug;

use crate::getenv_use_multiple_threads;
use crate::operator_sum::PauliOperator;
use crate::pauli::Pauli;
use crate::util::{mul_i_pow, C_ZERO};

/// The largest number of qubits either direction of conversion will handle.
///
/// The symplectic bits of a decomposed string are packed into `usize`s, one bit per qubit.  The
/// limit is far beyond the size of a matrix that fits in memory.
pub const MAX_DENSE_QUBITS: u32 = 30;

/// Build matrices row-parallel from this many qubits upwards.
const PARALLEL_THRESHOLD: u32 = 10;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecomposeError {
    #[error("operators must be square with a power-of-two side length, not {0:?}")]
    BadShape([usize; 2]),
    #[error("{0} qubits is more than the dense-matrix limit of {MAX_DENSE_QUBITS}")]
    TooManyQubits(u32),
}

#[derive(Clone, Debug)]
struct DecomposeOut {
    symbols: Vec<Pauli>,
    coeffs: Vec<Complex64>,
    scale: f64,
    tol: f64,
    num_qubits: usize,
}

/// Decompose a dense complex operator into a sum of Pauli strings.
///
/// The coefficient of each Pauli string `P` is `Tr(P M) / 2**n`.  Any coefficient whose magnitude
/// is at most `tolerance` is omitted, and exact zeros are always omitted, so a tolerance of zero
/// keeps every term that is numerically present.
///
/// This is an implementation of the "tensorized Pauli decomposition" presented in
/// `Hantzko, Binkowski and Gupta (2023) <https://arxiv.org/abs/2310.13421>`__.
///
/// Implementation
/// --------------
///
/// The paper's algorithm is recursive, allocating new matrices for each of the block-wise sums
/// (e.g. `op[top_left] + op[bottom_right]`).  Here the input is copied once into contiguous
/// scratch space, every block sum overwrites that copy in place, and the recursion is an explicit
/// depth-first stack of [Block]s.  Blocks whose sums are entirely zero are never visited.
///
/// Each level handles one qubit, from the most significant down.  At each step a submatrix is
/// decomposed blockwise like this:
///
///   +---------+---------+          +---------+---------+
///   |         |         |          |         |         |
///   |    I    |    X    |          |  I + Z  |  X + Y  |
///   |         |         |          |         |         |
///   +---------+---------+  =====>  +---------+---------+
///   |         |         |          |         |         |
///   |    Y    |    Z    |          |  X - Y  |  I - Z  |
///   |         |         |          |         |         |
///   +---------+---------+          +---------+---------+
///
/// Each element is used exactly twice per step (once in a sum, once in a difference) with the same
/// partner, so iterating through the coupled blocks in lockstep lets us overwrite in place.  The
/// factors of 1/2 are all skipped and applied once at the end, as is the factor of `i` that each
/// `Y` contributes through its `X - Y` block.
///
/// The strings come out in label order (the most significant qubit is the leftmost letter, and
/// `I < X < Y < Z`), so the result needs no sorting.
pub fn decompose_dense(
    operator: ArrayView2<Complex64>,
    tolerance: f64,
) -> Result<PauliOperator, DecomposeError> {
    let out = decompose_dense_inner(operator, tolerance)?;
    debug!(
        num_qubits = out.num_qubits,
        num_terms = out.coeffs.len(),
        "decomposed dense operator"
    );
    Ok(PauliOperator::from_canonical_parts(
        out.num_qubits as u32,
        out.symbols,
        out.coeffs,
    ))
}

fn decompose_dense_inner(
    operator: ArrayView2<Complex64>,
    tolerance: f64,
) -> Result<DecomposeOut, DecomposeError> {
    let op_shape = [operator.nrows(), operator.ncols()];
    if op_shape[0] == 0 {
        return Err(DecomposeError::BadShape(op_shape));
    }
    let num_qubits = op_shape[0].ilog2() as usize;
    if num_qubits > MAX_DENSE_QUBITS as usize {
        return Err(DecomposeError::TooManyQubits(num_qubits as u32));
    }
    let side = 1 << num_qubits;
    if op_shape != [side, side] {
        return Err(DecomposeError::BadShape(op_shape));
    }
    let mut out = DecomposeOut {
        symbols: Vec::new(),
        coeffs: Vec::new(),
        scale: 0.5f64.powi(num_qubits as i32),
        tol: tolerance,
        num_qubits,
    };
    if num_qubits == 0 {
        // There is no block to split, so the scalar is the identity coefficient.
        push_pauli_if_nonzero(0, 0, 0, operator[[0, 0]], &mut out);
        return Ok(out);
    }
    // The input view may be strided and is not ours to modify.  `iter` is in logical row-major
    // order, so the copy is laid out with row stride `side`.
    let mut scratch = operator.iter().copied().collect::<Vec<_>>();
    let leaves = split_to_leaves(&mut scratch, Block::whole(num_qubits));
    emit_leaves(&leaves, &mut scratch, &mut out);
    Ok(out)
}

/// Split `root` down to its 2x2 blocks, returning the ones that may hold non-zero terms in label
/// order.
///
/// Depth-first, so `stack` stays at most `3 * qubit + 1` long.  The returned list can reach
/// `4 ** qubit` entries for an operator that is dense in the Pauli basis.
fn split_to_leaves(scratch: &mut [Complex64], root: Block) -> Vec<Block> {
    let mut leaves = Vec::new();
    if root.qubit == 0 {
        leaves.push(root);
        return leaves;
    }
    let side = root.side();
    let mut stack = vec![root];
    while let Some(block) = stack.pop() {
        let nonzero = split_block(scratch, side, block);
        schedule(block, nonzero, &mut stack, &mut leaves);
    }
    leaves
}

/// Queue the non-zero child blocks of `block`.
///
/// `stack` is a LIFO, so the children go on in ZYXI order to be visited in IXYZ (label) order.
/// 2x2 children are finished with and go straight to `leaves`, which is already in label order.
#[inline(always)]
fn schedule(block: Block, nonzero: [bool; 4], stack: &mut Vec<Block>, leaves: &mut Vec<Block>) {
    let children = [Pauli::I, Pauli::X, Pauli::Y, Pauli::Z]
        .into_iter()
        .zip(nonzero)
        .filter_map(|(pauli, keep)| keep.then(|| block.child(pauli)));
    if block.qubit == 1 {
        leaves.extend(children);
    } else {
        stack.extend(children.rev());
    }
}

/// Decompose one block in place, one qubit deep, as drawn on [decompose_dense].  Returns which
/// quadrants are non-zero, in `[I, X, Y, Z]` order.
fn split_block(scratch: &mut [Complex64], side: usize, block: Block) -> [bool; 4] {
    let half = 1 << block.qubit;
    let top_left = (block.row, block.col);
    let top_right = (block.row, block.col + half);
    let bottom_left = (block.row + half, block.col);
    let bottom_right = (block.row + half, block.col + half);
    let (i_nonzero, z_nonzero) = butterfly(scratch, side, half, top_left, bottom_right);
    let (x_nonzero, y_nonzero) = butterfly(scratch, side, half, top_right, bottom_left);
    [i_nonzero, x_nonzero, y_nonzero, z_nonzero]
}

/// The multiple assignment `(a, b) = (a + b, a - b)` over two `half`-square submatrices with the
/// given top-left corners.  Returns whether the sum and the difference have any non-zero entry.
fn butterfly(
    scratch: &mut [Complex64],
    side: usize,
    half: usize,
    (a_row, a_col): (usize, usize),
    (b_row, b_col): (usize, usize),
) -> (bool, bool) {
    let mut sum_nonzero = false;
    let mut diff_nonzero = false;
    for off_row in 0..half {
        let a_start = (a_row + off_row) * side + a_col;
        let b_start = (b_row + off_row) * side + b_col;
        for off_col in 0..half {
            let a = scratch[a_start + off_col];
            let b = scratch[b_start + off_col];
            let (sum, diff) = (a + b, a - b);
            scratch[a_start + off_col] = sum;
            scratch[b_start + off_col] = diff;
            sum_nonzero = sum_nonzero || (sum != C_ZERO);
            diff_nonzero = diff_nonzero || (diff != C_ZERO);
        }
    }
    (sum_nonzero, diff_nonzero)
}

/// Split each 2x2 leaf on the least significant qubit and write out its Pauli strings.
fn emit_leaves(leaves: &[Block], scratch: &mut [Complex64], out: &mut DecomposeOut) {
    let side = 1 << out.num_qubits;
    out.symbols.reserve(4 * out.num_qubits * leaves.len());
    out.coeffs.reserve(4 * leaves.len());
    for &leaf in leaves {
        split_block(scratch, side, leaf);
        let base = leaf.row * side + leaf.col;
        // Symplectic bits of the higher qubits; the number of `Y`s among them is `x & z`.
        let x = leaf.row ^ leaf.col;
        let z = leaf.row;
        let num_ys = (x & z).count_ones();
        push_pauli_if_nonzero(x, z, num_ys, scratch[base], out);
        push_pauli_if_nonzero(x | 1, z, num_ys, scratch[base + 1], out);
        push_pauli_if_nonzero(x | 1, z | 1, num_ys + 1, scratch[base + side], out);
        push_pauli_if_nonzero(x, z | 1, num_ys, scratch[base + side + 1], out);
    }
}

/// Push a complete Pauli string into the output if its coefficient survives the tolerance.
///
/// `x` and `z` are the symplectic bitvectors packed into `usize`, where bit `n` is qubit `n`.
/// `value` is the unscaled block sum; the deferred factors of 1/2 and `i` are applied here.
fn push_pauli_if_nonzero(x: usize, z: usize, num_ys: u32, value: Complex64, out: &mut DecomposeOut) {
    let coeff = mul_i_pow(value * out.scale, num_ys);
    if coeff == C_ZERO || coeff.norm() <= out.tol {
        return;
    }
    out.symbols.extend(
        (0..out.num_qubits).map(|qubit| Pauli::from_zx((z >> qubit) & 1 == 1, (x >> qubit) & 1 == 1)),
    );
    out.coeffs.push(coeff);
}

/// A square block of the scratch matrix still to be decomposed.
///
/// The block has side `2 ** (qubit + 1)` and its top-left corner at `(row, col)`.  The bits of
/// `row` and `col` above `qubit` record the Pauli letters already chosen for the higher qubits:
/// `I` sets neither, `X` sets the column bit, `Y` the row bit and `Z` both.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Block {
    row: usize,
    col: usize,
    qubit: usize,
}

impl Block {
    /// The entire matrix of an operator on `num_qubits >= 1` qubits.
    #[inline]
    fn whole(num_qubits: usize) -> Self {
        Self {
            row: 0,
            col: 0,
            qubit: num_qubits - 1,
        }
    }

    #[inline]
    fn side(&self) -> usize {
        2 << self.qubit
    }

    /// The quadrant holding the sums for `pauli` on the current qubit, after [split_block].
    #[inline]
    fn child(&self, pauli: Pauli) -> Self {
        let half = 1 << self.qubit;
        let (row_bit, col_bit) = match pauli {
            Pauli::I => (0, 0),
            Pauli::X => (0, half),
            Pauli::Y => (half, 0),
            Pauli::Z => (half, half),
        };
        Self {
            row: self.row | row_bit,
            col: self.col | col_bit,
            qubit: self.qubit - 1,
        }
    }
}

/// Build the dense computational-basis matrix of a Pauli operator.
///
/// Row `r` of the matrix has qubit `q` in the state given by bit `q` of `r`.  Rows are filled in
/// parallel for larger operators unless threading is disabled by the environment.
pub fn to_matrix_dense(operator: &PauliOperator) -> Result<Array2<Complex64>, DecomposeError> {
    let parallel = operator.num_modes() >= PARALLEL_THRESHOLD && getenv_use_multiple_threads();
    to_matrix_dense_inner(operator, parallel)
}

fn to_matrix_dense_inner(
    operator: &PauliOperator,
    parallel: bool,
) -> Result<Array2<Complex64>, DecomposeError> {
    let num_qubits = operator.num_modes();
    if num_qubits > MAX_DENSE_QUBITS {
        return Err(DecomposeError::TooManyQubits(num_qubits));
    }
    let side = 1usize << num_qubits;
    // Each term is `i**num_ys * X**x * Z**z` (with `Z` applied first), so its only non-zero in
    // row `r` is at column `r ^ x`, with value `i**num_ys * (-1)**popcount((r ^ x) & z)`.
    let terms = operator
        .iter()
        .map(|term| {
            let (mut x, mut z, mut num_ys) = (0usize, 0usize, 0u32);
            for (qubit, pauli) in term.symbols.iter().enumerate() {
                if pauli.has_x_component() {
                    x |= 1 << qubit;
                }
                if pauli.has_z_component() {
                    z |= 1 << qubit;
                }
                if *pauli == Pauli::Y {
                    num_ys += 1;
                }
            }
            (x, z, mul_i_pow(term.coeff, num_ys))
        })
        .collect::<Vec<_>>();
    let fill_row = |row: usize, mut out_row: ArrayViewMut1<Complex64>| {
        for &(x, z, coeff) in &terms {
            let col = row ^ x;
            if (col & z).count_ones() % 2 == 1 {
                out_row[col] -= coeff;
            } else {
                out_row[col] += coeff;
            }
        }
    };
    let mut out = Array2::<Complex64>::zeros((side, side));
    if parallel {
        out.axis_iter_mut(Axis(0))
            .into_par_iter()
            .enumerate()
            .for_each(|(row, out_row)| fill_row(row, out_row));
    } else {
        out.axis_iter_mut(Axis(0))
            .enumerate()
            .for_each(|(row, out_row)| fill_row(row, out_row));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use ndarray::aview2;

    use super::*;
    use crate::c64;
    use crate::test::in_scoped_thread_pool;
    use crate::util::{C_IM, C_M_IM, C_M_ONE, C_ONE};

    fn pauli(num_qubits: u32, terms: &[(&str, Complex64)]) -> PauliOperator {
        PauliOperator::from_list(num_qubits, terms.iter().copied()).unwrap()
    }

    #[test]
    fn decompose_empty_operator_fails() {
        assert_eq!(
            decompose_dense(aview2::<Complex64, 0>(&[]), 0.0).unwrap_err(),
            DecomposeError::BadShape([0, 0])
        );
    }

    #[test]
    fn decompose_bad_shapes_fail() {
        let rectangle = [[C_ONE, C_ZERO], [C_ZERO, C_ONE], [C_ZERO, C_ZERO]];
        assert_eq!(
            decompose_dense(aview2(&rectangle), 0.0).unwrap_err(),
            DecomposeError::BadShape([3, 2])
        );
        let not_power_of_two = [[C_ONE; 3]; 3];
        assert_eq!(
            decompose_dense(aview2(&not_power_of_two), 0.0).unwrap_err(),
            DecomposeError::BadShape([3, 3])
        );
    }

    #[test]
    fn decompose_0q_operator() {
        let coeff = c64!(1.5, -0.5);
        let out = decompose_dense(aview2(&[[coeff]]), 0.0).unwrap();
        assert_eq!(out.num_modes(), 0);
        assert_eq!(out.to_list(), vec![("".to_owned(), coeff)]);
        assert!(decompose_dense(aview2(&[[C_ZERO]]), 0.0).unwrap().is_zero());
    }

    #[test]
    fn decompose_single_paulis_exactly() {
        let cases = [
            ("I", [[C_ONE, C_ZERO], [C_ZERO, C_ONE]]),
            ("X", [[C_ZERO, C_ONE], [C_ONE, C_ZERO]]),
            ("Y", [[C_ZERO, C_M_IM], [C_IM, C_ZERO]]),
            ("Z", [[C_ONE, C_ZERO], [C_ZERO, C_M_ONE]]),
        ];
        for (label, matrix) in cases {
            let out = decompose_dense(aview2(&matrix), 0.0).unwrap();
            assert_eq!(out, pauli(1, &[(label, C_ONE)]), "{label}");
        }
    }

    #[test]
    fn zero_quadrants_are_not_split() {
        assert_eq!(
            Block::whole(3).child(Pauli::Y),
            Block {
                row: 4,
                col: 0,
                qubit: 1
            }
        );
        // Only the `Z` quadrant of `ZI` survives the first split.
        let matrix = to_matrix_dense(&pauli(2, &[("ZI", C_ONE)])).unwrap();
        let mut scratch = matrix.iter().copied().collect::<Vec<_>>();
        let leaves = split_to_leaves(&mut scratch, Block::whole(2));
        assert_eq!(
            leaves,
            vec![Block {
                row: 2,
                col: 2,
                qubit: 0
            }]
        );
    }

    #[test]
    fn decompose_3q_roundtrip() {
        let ops = [
            pauli(3, &[("III", c64!(1.5, -0.5))]),
            pauli(3, &[("IIX", c64!(-0.25, 2.0))]),
            pauli(3, &[("YYY", c64!(0.75, 0.75))]),
            pauli(
                3,
                &[
                    ("IIY", c64!(1.5, -0.5)),
                    ("YYI", c64!(-0.25, 2.0)),
                    ("YYY", c64!(0.75, 0.75)),
                ],
            ),
            pauli(
                3,
                &[
                    ("IIX", c64!(1.5, -0.5)),
                    ("IYI", c64!(-0.25, 2.0)),
                    ("ZII", c64!(0.75, 0.75)),
                    ("XZY", c64!(0.0, 0.125)),
                ],
            ),
        ];
        for op in ops {
            let matrix = to_matrix_dense(&op).unwrap();
            let back = decompose_dense(matrix.view(), 0.0).unwrap();
            assert_abs_diff_eq!(back, op, epsilon = 1e-10);
            assert_eq!(back.num_terms(), op.num_terms());
        }
    }

    #[test]
    fn decompose_strided_view() {
        // A transposed view is not contiguous; Y is antisymmetric so Y^T = -Y.
        let y = [[C_ZERO, C_M_IM], [C_IM, C_ZERO]];
        let view = aview2(&y).reversed_axes();
        assert_eq!(
            decompose_dense(view, 0.0).unwrap(),
            pauli(1, &[("Y", C_M_ONE)])
        );
    }

    #[test]
    fn decompose_tolerance_drops_small_terms() {
        let op = pauli(2, &[("XZ", c64!(1e-12, 0)), ("ZZ", C_ONE)]);
        let matrix = to_matrix_dense(&op).unwrap();
        let kept = decompose_dense(matrix.view(), 0.0).unwrap();
        assert_eq!(kept.num_terms(), 2);
        let dropped = decompose_dense(matrix.view(), 1e-10).unwrap();
        assert_eq!(dropped, pauli(2, &[("ZZ", C_ONE)]));
    }

    #[test]
    fn matrix_follows_little_endian_rows() {
        // X on qubit 0 swaps rows that differ in their least significant bit.
        let matrix = to_matrix_dense(&pauli(2, &[("IX", C_ONE)])).unwrap();
        assert_eq!(matrix[[0, 1]], C_ONE);
        assert_eq!(matrix[[2, 3]], C_ONE);
        assert_eq!(matrix[[0, 2]], C_ZERO);
        let matrix = to_matrix_dense(&pauli(2, &[("ZI", C_ONE)])).unwrap();
        assert_eq!(matrix[[1, 1]], C_ONE);
        assert_eq!(matrix[[2, 2]], C_M_ONE);
    }

    #[test]
    fn matrix_too_large_fails() {
        let op = PauliOperator::identity(MAX_DENSE_QUBITS + 1);
        assert_eq!(
            to_matrix_dense(&op).unwrap_err(),
            DecomposeError::TooManyQubits(MAX_DENSE_QUBITS + 1)
        );
    }

    #[test]
    fn parallel_matrix_matches_serial() {
        let op = pauli(
            4,
            &[
                ("XYZI", c64!(0.5, 0.25)),
                ("IIII", c64!(-1, 0)),
                ("YYXZ", c64!(0, 2)),
                ("ZIIZ", c64!(0.125, 0)),
            ],
        );
        let serial = to_matrix_dense_inner(&op, false).unwrap();
        let parallel = in_scoped_thread_pool(|| to_matrix_dense_inner(&op, true))
            .expect("failed to create thread pool")
            .unwrap();
        assert_eq!(serial, parallel);
    }
}
