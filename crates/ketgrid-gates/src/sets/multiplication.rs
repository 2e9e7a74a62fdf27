//! Multiplication by input register A, modulo `2^span`.
//!
//! Even multipliers have no inverse modulo a power of two; both families are
//! then a no-op rather than an error.

use std::sync::Arc;

use tracing::trace;

use ketgrid_kernel::{Kernel, KernelContext, KernelResult};

use crate::arith::{modular_inverse, modular_multiply, modular_unmultiply, mul_mod};
use crate::error::GateResult;
use crate::family::GateFamily;
use crate::sets::inputs::FAMILY_SPANS;

/// Permutation kernel for `x ↦ x · A^sign` on a target of `span` wires.
///
/// The gather runs the inverse map: multiplying reads from `out · A⁻¹`.
fn multiply_kernel(ctx: &KernelContext, span: usize, inverse: bool) -> KernelResult<Kernel> {
    trace!(span, inverse, "compiling multiplication kernel (identity for even multipliers)");
    let modulus = 1u64 << span;
    Kernel::permutation_with_inputs(
        ctx,
        &['A'],
        Arc::new(move |out: u64, inputs: &[u64]| {
            let a = inputs[0] % modulus;
            match modular_inverse(a, modulus) {
                None => out,
                Some(_) if inverse => mul_mod(out, a, modulus),
                Some(inv) => mul_mod(out, inv, modulus),
            }
        }),
    )
}

/// The `*A1..*A16` family and its inverse `/A1../A16`, paired by span.
pub fn families() -> GateResult<(GateFamily, GateFamily)> {
    let times = GateFamily::build("*A", FAMILY_SPANS, |span, builder| {
        builder
            .serialized_id(format!("*A{span}"))
            .symbol("×A")
            .title("Multiplication Gate")
            .blurb("Multiplies the target by input A.\nNo effect if the input is even (would be irreversible).")
            .required_input('A')
            .known_permutation(move |x, inputs| modular_multiply(x, inputs[0], span))
            .kernel(Arc::new(move |ctx: &KernelContext| multiply_kernel(ctx, span, false)))
    })?;
    let divide = GateFamily::build_alternate_of(&times, "/A", FAMILY_SPANS, |span, builder| {
        builder
            .serialized_id(format!("/A{span}"))
            .symbol("×A^-1")
            .title("Inverse Multiplication Gate")
            .blurb("Inverse-multiplies the target by input A (modulo 2^n).\nNo effect if the input is even (would be irreversible).")
            .required_input('A')
            .known_permutation(move |x, inputs| modular_unmultiply(x, inputs[0], span))
            .kernel(Arc::new(move |ctx: &KernelContext| multiply_kernel(ctx, span, true)))
    })?;
    Ok((times, divide))
}
