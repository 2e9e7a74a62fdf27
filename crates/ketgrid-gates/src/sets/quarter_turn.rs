//! Quarter and eighth turns around the X, Y and Z axes.

use std::f64::consts::PI;

use ketgrid_math::Matrix;

use crate::error::GateResult;
use crate::gate::{Gate, GateBuilder};

/// `H · diag(1, e^(iθ)) · H`.
pub(crate) fn x_phase(theta: f64) -> Matrix {
    let h = Matrix::hadamard();
    &(&h * &Matrix::phase(theta)) * &h
}

/// `S · X-phase(θ) · S†`.
pub(crate) fn y_phase(theta: f64) -> Matrix {
    let s = Matrix::phase(PI / 2.0);
    &(&s * &x_phase(theta)) * &s.adjoint()
}

fn z_turn(id: &str, title: &str, exponent: f64) -> GateBuilder {
    GateBuilder::new()
        .serialized_id_and_symbol(id)
        .title(title)
        .blurb("Phases the ON state, leaving OFF alone.")
        .known_matrix(Matrix::power_of_pauli_z(exponent))
        .matrix_kernel(move |_| Matrix::phase(PI * exponent))
}

fn x_turn(id: &str, title: &str, exponent: f64) -> GateBuilder {
    GateBuilder::new()
        .serialized_id_and_symbol(id)
        .title(title)
        .blurb("Partial rotation around the X axis of the Bloch sphere.")
        .known_matrix(Matrix::power_of_pauli_x(exponent))
        .matrix_kernel(move |_| x_phase(PI * exponent))
}

fn y_turn(id: &str, title: &str, exponent: f64) -> GateBuilder {
    GateBuilder::new()
        .serialized_id_and_symbol(id)
        .title(title)
        .blurb("Partial rotation around the Y axis of the Bloch sphere.")
        .known_matrix(Matrix::power_of_pauli_y(exponent))
        .matrix_kernel(move |_| y_phase(PI * exponent))
}

/// The S, S†, T, T†, √X, √X†, √Y and √Y† gates, each inverse paired with its
/// forward gate.
pub fn all() -> GateResult<Vec<Gate>> {
    Ok(vec![
        z_turn("Z^½", "√Z Gate", 0.5).build()?,
        z_turn("Z^-½", "Z^-½ Gate", -0.5).alternate("Z^½").build()?,
        z_turn("Z^¼", "∜Z Gate", 0.25).build()?,
        z_turn("Z^-¼", "Z^-¼ Gate", -0.25).alternate("Z^¼").build()?,
        x_turn("X^½", "√X Gate", 0.5).build()?,
        x_turn("X^-½", "X^-½ Gate", -0.5).alternate("X^½").build()?,
        y_turn("Y^½", "√Y Gate", 0.5).build()?,
        y_turn("Y^-½", "Y^-½ Gate", -0.5).alternate("Y^½").build()?,
    ])
}
