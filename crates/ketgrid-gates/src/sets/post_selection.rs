//! Post-selection projectors.
//!
//! The declared effect is the literal projector; the kernel builds the same
//! projector as `|v⟩⟨v|` from the kept state, so the two are checked against
//! each other.

use std::f64::consts::FRAC_1_SQRT_2;

use num_complex::Complex64;

use ketgrid_math::{I, Matrix, ONE, ZERO};

use crate::error::GateResult;
use crate::gate::{Gate, GateBuilder, GateRole};

fn outer(kept: [Complex64; 2]) -> Matrix {
    let v = Matrix::column(kept.to_vec());
    &v * &v.adjoint()
}

fn post_select(
    id: &str,
    symbol: &str,
    title: &str,
    blurb: &str,
    declared: Matrix,
    kept: [Complex64; 2],
) -> GateBuilder {
    GateBuilder::new()
        .serialized_id(id)
        .symbol(symbol)
        .title(title)
        .blurb(blurb)
        .role(GateRole::PostSelection)
        .known_matrix(declared)
        .matrix_kernel(move |_| outer(kept))
}

/// The six single-wire post-selections.
pub fn all() -> GateResult<Vec<Gate>> {
    let half = Complex64::new(0.5, 0.0);
    let s = Complex64::new(FRAC_1_SQRT_2, 0.0);
    let si = Complex64::new(0.0, FRAC_1_SQRT_2);
    Ok(vec![
        post_select(
            "|0⟩⟨0|",
            "|0⟩⟨0|",
            "Postselect Off",
            "Keeps OFF states, discards/retries ON states.",
            Matrix::square2(ONE, ZERO, ZERO, ZERO),
            [ONE, ZERO],
        )
        .build()?,
        post_select(
            "|1⟩⟨1|",
            "|1⟩⟨1|",
            "Postselect On",
            "Keeps On states, discards/retries Off states.",
            Matrix::square2(ZERO, ZERO, ZERO, ONE),
            [ZERO, ONE],
        )
        .alternate("|0⟩⟨0|")
        .build()?,
        post_select(
            "|+⟩⟨+|",
            "|+⟩⟨+|",
            "Postselect X-Off",
            "Keeps ON+OFF states, discards/retries ON-OFF states.",
            Matrix::square2(ONE, ONE, ONE, ONE).scaled(half),
            [s, s],
        )
        .build()?,
        post_select(
            "|-⟩⟨-|",
            "|-⟩⟨-|",
            "Postselect X-On",
            "Keeps ON-OFF states, discards/retries ON+OFF states.",
            Matrix::square2(ONE, -ONE, -ONE, ONE).scaled(half),
            [s, -s],
        )
        .alternate("|+⟩⟨+|")
        .build()?,
        post_select(
            "|X⟩⟨X|",
            "|i⟩⟨i|",
            "Postselect Y-Off",
            "Keeps ON+iOFF states, discards ON-iOFF states.",
            Matrix::square2(ONE, -I, I, ONE).scaled(half),
            [s, si],
        )
        .build()?,
        post_select(
            "|/⟩⟨/|",
            "|-i⟩⟨-i|",
            "Postselect Y-On",
            "Keeps ON-iOFF states, discards/retries ON+iOFF states.",
            Matrix::square2(ONE, I, -I, ONE).scaled(half),
            [s, -si],
        )
        .alternate("|X⟩⟨X|")
        .build()?,
    ])
}
