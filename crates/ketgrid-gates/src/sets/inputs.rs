//! Input register markers.

use crate::error::GateResult;
use crate::family::GateFamily;
use crate::gate::GateRole;

/// Spans covered by the input and arithmetic families.
pub const FAMILY_SPANS: std::ops::RangeInclusive<usize> = 1..=16;

/// `inputA1` through `inputA16`: mark wires as input register A.
pub fn input_a_family() -> GateResult<GateFamily> {
    GateFamily::build("inputA", FAMILY_SPANS, |span, builder| {
        builder
            .serialized_id(format!("inputA{span}"))
            .symbol("input A")
            .title("Input Gate [A]")
            .blurb("Marks some qubits as input 'A'.")
            .role(GateRole::Input { key: 'A' })
    })
}
