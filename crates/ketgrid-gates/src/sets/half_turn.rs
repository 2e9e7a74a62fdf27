//! Half-turn gates: 180° rotations that are their own inverses.

use std::sync::Arc;

use num_complex::Complex64;

use ketgrid_math::Matrix;

use crate::error::GateResult;
use crate::gate::{Gate, GateBuilder};

/// The NOT gate. Runs as a permutation kernel.
pub fn x() -> GateResult<Gate> {
    GateBuilder::new()
        .serialized_id_and_symbol("X")
        .title("Pauli X Gate")
        .blurb("The NOT gate.\nToggles between ON and OFF.")
        .known_matrix(Matrix::pauli_x())
        .permutation_kernel(Arc::new(|t: u64, _: &[u64]| 1 - t))
        .build()
}

/// Pauli Y.
pub fn y() -> GateResult<Gate> {
    GateBuilder::new()
        .serialized_id_and_symbol("Y")
        .title("Pauli Y Gate")
        .blurb("A combination of the X and Z gates.")
        .known_matrix(Matrix::pauli_y())
        .matrix_kernel(|_| {
            let i = Complex64::new(0.0, 1.0);
            Matrix::square2(Complex64::new(0.0, 0.0), -i, i, Complex64::new(0.0, 0.0))
        })
        .build()
}

/// Pauli Z.
pub fn z() -> GateResult<Gate> {
    GateBuilder::new()
        .serialized_id_and_symbol("Z")
        .title("Pauli Z Gate")
        .blurb("The phase flip gate.\nNegates phases when the qubit is ON.")
        .known_matrix(Matrix::pauli_z())
        .matrix_kernel(|_| Matrix::phase(std::f64::consts::PI))
        .build()
}

/// Hadamard.
pub fn h() -> GateResult<Gate> {
    GateBuilder::new()
        .serialized_id_and_symbol("H")
        .title("Hadamard Gate")
        .blurb("Creates simple superpositions.\nMaps ON to ON + OFF.\nMaps OFF to ON - OFF.")
        .known_matrix(Matrix::hadamard())
        .matrix_kernel(|_| {
            let x = Matrix::pauli_x();
            let z = Matrix::pauli_z();
            (&x + &z).scaled(Complex64::new(std::f64::consts::FRAC_1_SQRT_2, 0.0))
        })
        .build()
}

/// X, Y, Z and H.
pub fn all() -> GateResult<Vec<Gate>> {
    Ok(vec![x()?, y()?, z()?, h()?])
}
