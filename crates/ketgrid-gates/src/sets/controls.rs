//! Control and anti-control markers.

use crate::error::GateResult;
use crate::gate::{Gate, GateBuilder, GateRole};

/// Conditions the column on the wire being ON.
pub fn control() -> GateResult<Gate> {
    GateBuilder::new()
        .serialized_id_and_symbol("•")
        .title("Control")
        .blurb("Conditions on a qubit being ON.\nGates in the same column only apply to states meeting the condition.")
        .role(GateRole::Control { desired: true })
        .build()
}

/// Conditions the column on the wire being OFF.
pub fn anti_control() -> GateResult<Gate> {
    GateBuilder::new()
        .serialized_id_and_symbol("◦")
        .title("Anti-Control")
        .blurb("Conditions on a qubit being OFF.\nGates in the same column only apply to states meeting the condition.")
        .role(GateRole::Control { desired: false })
        .alternate("•")
        .build()
}

/// Both control markers.
pub fn all() -> GateResult<Vec<Gate>> {
    Ok(vec![control()?, anti_control()?])
}
