//! Dense complex matrices.
//!
//! Sized for gate semantics: the largest matrix the simulator builds during
//! verification is 8x8 (a three-wire operator), so everything here is a
//! straightforward row-major loop.

use std::fmt;
use std::ops::{Add, Mul};

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::complex::{I, ONE, ZERO};

/// A dense complex matrix in row-major order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<Complex64>,
}

impl Matrix {
    /// Create a matrix from row-major data.
    ///
    /// # Panics
    ///
    /// Panics if `data.len()` is not `rows * cols`.
    pub fn new(rows: usize, cols: usize, data: Vec<Complex64>) -> Self {
        assert_eq!(
            data.len(),
            rows * cols,
            "Matrix data length {} does not match {}x{}",
            data.len(),
            rows,
            cols
        );
        Self { rows, cols, data }
    }

    /// Create a square matrix from row-major data.
    ///
    /// # Panics
    ///
    /// Panics if `data.len()` is not a perfect square.
    pub fn square(data: Vec<Complex64>) -> Self {
        let dim = (data.len() as f64).sqrt().round() as usize;
        assert_eq!(
            dim * dim,
            data.len(),
            "Square matrix needs a perfect-square number of entries, got {}",
            data.len()
        );
        Self::new(dim, dim, data)
    }

    /// Create a 2x2 matrix `[[a, b], [c, d]]`.
    pub fn square2(a: Complex64, b: Complex64, c: Complex64, d: Complex64) -> Self {
        Self::new(2, 2, vec![a, b, c, d])
    }

    /// Create an all-zero matrix.
    pub fn zero(rows: usize, cols: usize) -> Self {
        Self::new(rows, cols, vec![ZERO; rows * cols])
    }

    /// Create the `dim`x`dim` identity matrix.
    pub fn identity(dim: usize) -> Self {
        let mut m = Self::zero(dim, dim);
        for i in 0..dim {
            m.data[i * dim + i] = ONE;
        }
        m
    }

    /// Create a column vector.
    pub fn column(entries: Vec<Complex64>) -> Self {
        let rows = entries.len();
        Self::new(rows, 1, entries)
    }

    /// Build the permutation matrix sending basis state `x` to `f(x)`.
    ///
    /// # Panics
    ///
    /// Panics if `f` maps any input outside `0..dim`.
    pub fn from_permutation(dim: usize, f: impl Fn(usize) -> usize) -> Self {
        let mut m = Self::zero(dim, dim);
        for x in 0..dim {
            let y = f(x);
            assert!(y < dim, "Permutation maps {x} to {y}, outside 0..{dim}");
            m.data[y * dim + x] = ONE;
        }
        m
    }

    /// The Pauli X (NOT) matrix.
    pub fn pauli_x() -> Self {
        Self::square2(ZERO, ONE, ONE, ZERO)
    }

    /// The Pauli Y matrix.
    pub fn pauli_y() -> Self {
        Self::square2(ZERO, -I, I, ZERO)
    }

    /// The Pauli Z matrix.
    pub fn pauli_z() -> Self {
        Self::square2(ONE, ZERO, ZERO, -ONE)
    }

    /// The Hadamard matrix.
    pub fn hadamard() -> Self {
        let s = Complex64::new(std::f64::consts::FRAC_1_SQRT_2, 0.0);
        Self::square2(s, s, s, -s)
    }

    /// The phase matrix `diag(1, e^(iθ))`.
    pub fn phase(theta: f64) -> Self {
        Self::square2(ONE, ZERO, ZERO, Complex64::from_polar(1.0, theta))
    }

    /// `Z^t`, with `t = 1` giving Pauli Z and `t = 2` the identity.
    pub fn power_of_pauli_z(t: f64) -> Self {
        Self::power_of_pauli(&Self::pauli_z(), t)
    }

    /// `X^t`, with `t = 1` giving Pauli X.
    pub fn power_of_pauli_x(t: f64) -> Self {
        Self::power_of_pauli(&Self::pauli_x(), t)
    }

    /// `Y^t`, with `t = 1` giving Pauli Y.
    pub fn power_of_pauli_y(t: f64) -> Self {
        Self::power_of_pauli(&Self::pauli_y(), t)
    }

    // P^t = (I + P)/2 + e^(iπt) (I - P)/2 for any Pauli P.
    fn power_of_pauli(pauli: &Self, t: f64) -> Self {
        let half = Complex64::new(0.5, 0.0);
        let turn = Complex64::from_polar(0.5, std::f64::consts::PI * t);
        let id = Self::identity(2);
        let plus = &id + pauli;
        let minus = &id + &pauli.scaled(-ONE);
        &plus.scaled(half) + &minus.scaled(turn)
    }

    /// Number of rows.
    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Whether the matrix is square.
    #[inline]
    pub fn is_square(&self) -> bool {
        self.rows == self.cols
    }

    /// Entry at `(row, col)`.
    ///
    /// # Panics
    ///
    /// Panics if the position is out of bounds.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Complex64 {
        assert!(
            row < self.rows && col < self.cols,
            "Index ({row}, {col}) out of bounds for {}x{} matrix",
            self.rows,
            self.cols
        );
        self.data[row * self.cols + col]
    }

    /// Row-major entries.
    pub fn data(&self) -> &[Complex64] {
        &self.data
    }

    /// Matrix product `self * other`.
    ///
    /// # Panics
    ///
    /// Panics if the inner dimensions differ.
    pub fn multiply(&self, other: &Self) -> Self {
        assert_eq!(
            self.cols, other.rows,
            "Cannot multiply {}x{} by {}x{}",
            self.rows, self.cols, other.rows, other.cols
        );
        let mut out = Self::zero(self.rows, other.cols);
        for r in 0..self.rows {
            for k in 0..self.cols {
                let a = self.data[r * self.cols + k];
                if a == ZERO {
                    continue;
                }
                for c in 0..other.cols {
                    out.data[r * other.cols + c] += a * other.data[k * other.cols + c];
                }
            }
        }
        out
    }

    /// Kronecker product `self ⊗ other`.
    ///
    /// With little-endian wire numbering, `self` acts on the higher wires.
    pub fn tensor_product(&self, other: &Self) -> Self {
        let rows = self.rows * other.rows;
        let cols = self.cols * other.cols;
        let mut out = Self::zero(rows, cols);
        for r1 in 0..self.rows {
            for c1 in 0..self.cols {
                let a = self.data[r1 * self.cols + c1];
                for r2 in 0..other.rows {
                    for c2 in 0..other.cols {
                        let r = r1 * other.rows + r2;
                        let c = c1 * other.cols + c2;
                        out.data[r * cols + c] = a * other.data[r2 * other.cols + c2];
                    }
                }
            }
        }
        out
    }

    /// Conjugate transpose.
    pub fn adjoint(&self) -> Self {
        let mut out = Self::zero(self.cols, self.rows);
        for r in 0..self.rows {
            for c in 0..self.cols {
                out.data[c * self.rows + r] = self.data[r * self.cols + c].conj();
            }
        }
        out
    }

    /// Multiply every entry by `factor`.
    #[must_use]
    pub fn scaled(&self, factor: Complex64) -> Self {
        Self {
            rows: self.rows,
            cols: self.cols,
            data: self.data.iter().map(|v| v * factor).collect(),
        }
    }

    /// Apply the matrix to a column vector given as a slice.
    ///
    /// # Panics
    ///
    /// Panics if `vector.len()` differs from the column count.
    pub fn apply(&self, vector: &[Complex64]) -> Vec<Complex64> {
        assert_eq!(
            vector.len(),
            self.cols,
            "Cannot apply {}x{} matrix to vector of length {}",
            self.rows,
            self.cols,
            vector.len()
        );
        (0..self.rows)
            .map(|r| {
                self.data[r * self.cols..(r + 1) * self.cols]
                    .iter()
                    .zip(vector)
                    .map(|(m, v)| m * v)
                    .sum()
            })
            .collect()
    }

    /// Entry-wise comparison within `tolerance`.
    pub fn approx_eq(&self, other: &Self, tolerance: f64) -> bool {
        self.rows == other.rows
            && self.cols == other.cols
            && self
                .data
                .iter()
                .zip(&other.data)
                .all(|(a, b)| (a - b).norm() <= tolerance)
    }

    /// Check whether this is the identity within `tolerance`.
    pub fn is_approx_identity(&self, tolerance: f64) -> bool {
        self.is_square() && self.approx_eq(&Self::identity(self.rows), tolerance)
    }

    /// Check whether `U† U = I` within `tolerance`.
    pub fn is_unitary(&self, tolerance: f64) -> bool {
        self.is_square() && self.adjoint().multiply(self).is_approx_identity(tolerance)
    }

    /// Check whether the matrix is a projector (`P P = P`, `P† = P`).
    pub fn is_projector(&self, tolerance: f64) -> bool {
        self.is_square()
            && self.multiply(self).approx_eq(self, tolerance)
            && self.adjoint().approx_eq(self, tolerance)
    }
}

impl Mul for &Matrix {
    type Output = Matrix;

    fn mul(self, rhs: Self) -> Matrix {
        Matrix::multiply(self, rhs)
    }
}

impl Mul for Matrix {
    type Output = Matrix;

    #[allow(clippy::needless_pass_by_value)]
    fn mul(self, rhs: Self) -> Matrix {
        Matrix::multiply(&self, &rhs)
    }
}

impl Add for &Matrix {
    type Output = Matrix;

    fn add(self, rhs: Self) -> Matrix {
        assert!(
            self.rows == rhs.rows && self.cols == rhs.cols,
            "Cannot add {}x{} to {}x{}",
            self.rows,
            self.cols,
            rhs.rows,
            rhs.cols
        );
        Matrix {
            rows: self.rows,
            cols: self.cols,
            data: self.data.iter().zip(&rhs.data).map(|(a, b)| a + b).collect(),
        }
    }
}

impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for r in 0..self.rows {
            if r > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{{")?;
            for c in 0..self.cols {
                if c > 0 {
                    write!(f, ", ")?;
                }
                let v = self.data[r * self.cols + c];
                write!(f, "{}{:+}i", v.re, v.im)?;
            }
            write!(f, "}}")?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DEFAULT_TOLERANCE as TOL;
    use std::f64::consts::PI;

    #[test]
    fn test_paulis_square_to_identity() {
        for m in [Matrix::pauli_x(), Matrix::pauli_y(), Matrix::pauli_z(), Matrix::hadamard()] {
            assert!((&m * &m).is_approx_identity(TOL), "{m} squared is not identity");
            assert!(m.is_unitary(TOL));
        }
    }

    #[test]
    fn test_xyz_relation() {
        // XY = iZ
        let xy = &Matrix::pauli_x() * &Matrix::pauli_y();
        assert!(xy.approx_eq(&Matrix::pauli_z().scaled(I), TOL));
    }

    #[test]
    fn test_tensor_product_wire_order() {
        // X on the high wire: |00> -> |10> (index 2).
        let m = Matrix::pauli_x().tensor_product(&Matrix::identity(2));
        let out = m.apply(&[ONE, ZERO, ZERO, ZERO]);
        assert_eq!(out[2], ONE);
        assert_eq!(out[0], ZERO);
    }

    #[test]
    fn test_tensor_product_dimensions() {
        let m = Matrix::hadamard()
            .tensor_product(&Matrix::hadamard())
            .tensor_product(&Matrix::pauli_x());
        assert_eq!((m.rows(), m.cols()), (8, 8));
        assert!(m.is_unitary(TOL));
    }

    #[test]
    fn test_adjoint_of_phase() {
        let p = Matrix::phase(PI / 3.0);
        assert!((&p * &p.adjoint()).is_approx_identity(TOL));
        assert!(p.adjoint().approx_eq(&Matrix::phase(-PI / 3.0), TOL));
    }

    #[test]
    fn test_pauli_powers() {
        assert!(Matrix::power_of_pauli_z(1.0).approx_eq(&Matrix::pauli_z(), TOL));
        assert!(Matrix::power_of_pauli_x(1.0).approx_eq(&Matrix::pauli_x(), TOL));
        assert!(Matrix::power_of_pauli_y(1.0).approx_eq(&Matrix::pauli_y(), TOL));
        assert!(Matrix::power_of_pauli_z(0.5).approx_eq(&Matrix::phase(PI / 2.0), TOL));
        assert!(Matrix::power_of_pauli_y(2.0).is_approx_identity(TOL));
        let root = Matrix::power_of_pauli_x(0.5);
        assert!((&root * &root).approx_eq(&Matrix::pauli_x(), TOL));
        assert!(root.is_unitary(TOL));
    }

    #[test]
    fn test_from_permutation() {
        let m = Matrix::from_permutation(4, |x| (x + 1) % 4);
        let out = m.apply(&[ZERO, ONE, ZERO, ZERO]);
        assert_eq!(out[2], ONE);
        assert!(m.is_unitary(TOL));
    }

    #[test]
    fn test_projector() {
        let off = Matrix::square2(ONE, ZERO, ZERO, ZERO);
        assert!(off.is_projector(TOL));
        assert!(!off.is_unitary(TOL));
        assert!(!Matrix::hadamard().is_projector(TOL));
    }

    #[test]
    #[should_panic(expected = "Cannot multiply")]
    fn test_dimension_mismatch_panics() {
        let _ = Matrix::identity(2).multiply(&Matrix::identity(4));
    }

    #[test]
    fn test_display() {
        assert_eq!(Matrix::pauli_x().to_string(), "{{0+0i, 1+0i}, {1+0i, 0+0i}}");
    }
}
