//! Gates that rotate continuously, one full turn per animation cycle.

use std::f64::consts::TAU;

use ketgrid_math::Matrix;

use crate::error::GateResult;
use crate::gate::{Gate, GateBuilder};
use crate::sets::quarter_turn::{x_phase, y_phase};

#[derive(Clone, Copy)]
enum Axis {
    X,
    Y,
    Z,
}

fn spinning(axis: Axis, sign: f64) -> GateBuilder {
    let (name, id) = match (axis, sign > 0.0) {
        (Axis::X, true) => ("X", "X^t"),
        (Axis::X, false) => ("X", "X^-t"),
        (Axis::Y, true) => ("Y", "Y^t"),
        (Axis::Y, false) => ("Y", "Y^-t"),
        (Axis::Z, true) => ("Z", "Z^t"),
        (Axis::Z, false) => ("Z", "Z^-t"),
    };
    let builder = GateBuilder::new()
        .serialized_id_and_symbol(id)
        .title(format!("{name}-Raising Gate"))
        .blurb(format!("Rotates around the {name} axis, one full turn per cycle."));
    // Exponent 2 is a full turn: P^2 = I.
    match axis {
        Axis::X => builder
            .known_time_matrix(move |t| Matrix::power_of_pauli_x(2.0 * sign * t))
            .matrix_kernel(move |t| x_phase(TAU * sign * t)),
        Axis::Y => builder
            .known_time_matrix(move |t| Matrix::power_of_pauli_y(2.0 * sign * t))
            .matrix_kernel(move |t| y_phase(TAU * sign * t)),
        Axis::Z => builder
            .known_time_matrix(move |t| Matrix::power_of_pauli_z(2.0 * sign * t))
            .matrix_kernel(move |t| Matrix::phase(TAU * sign * t)),
    }
}

/// `Z^t`, `Z^-t`, `X^t`, `X^-t`, `Y^t`, `Y^-t`.
pub fn all() -> GateResult<Vec<Gate>> {
    Ok(vec![
        spinning(Axis::Z, 1.0).build()?,
        spinning(Axis::Z, -1.0).alternate("Z^t").build()?,
        spinning(Axis::X, 1.0).build()?,
        spinning(Axis::X, -1.0).alternate("X^t").build()?,
        spinning(Axis::Y, 1.0).build()?,
        spinning(Axis::Y, -1.0).alternate("Y^t").build()?,
    ])
}
