//! Circuit model: wires, columns and gate placements.
//!
//! A circuit is a wire count plus an ordered list of [`Column`]s. Each
//! column holds gates placed at a lowest wire; a gate of span `s` placed at
//! wire `w` covers wires `w..w+s`.
//!
//! # Text form
//!
//! Circuits serialize to the column layout of the original sharing format:
//!
//! ```json
//! {"cols": [["H", 1, "X"], ["•", "X"]]}
//! ```
//!
//! Entry `i` of a column is the serialized id of the gate whose body starts
//! at wire `i`, or `1` for an empty cell. The wires covered by a multi-wire
//! gate after its first one are written as `1`. An optional `"wires"` field
//! fixes the width.

use std::fmt;
use std::sync::Arc;

use ketgrid_gates::{Gate, GateRegistry, GateRole};
use ketgrid_kernel::WireRange;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::LimitsConfig;
use crate::error::{SimError, SimResult};

/// A gate placed in a column.
#[derive(Debug, Clone)]
pub struct Placement {
    /// The placed gate.
    pub gate: Arc<Gate>,
    /// Lowest wire covered by the gate body.
    pub wire: usize,
}

impl Placement {
    /// Place `gate` with its body starting at `wire`.
    pub fn new(gate: Arc<Gate>, wire: usize) -> Self {
        Self { gate, wire }
    }

    /// Wires covered by the gate body.
    pub fn range(&self) -> WireRange {
        WireRange::new(self.wire, self.gate.span())
    }
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.gate.serialized_id(), self.range())
    }
}

/// One time step: a set of simultaneous placements.
#[derive(Debug, Clone, Default)]
pub struct Column {
    placements: Vec<Placement>,
}

impl Column {
    /// An empty column.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `gate` at `wire`.
    #[must_use]
    pub fn with(mut self, wire: usize, gate: Arc<Gate>) -> Self {
        self.push(wire, gate);
        self
    }

    /// Add `gate` at `wire` in place.
    pub fn push(&mut self, wire: usize, gate: Arc<Gate>) {
        self.placements.push(Placement::new(gate, wire));
        self.placements.sort_by_key(|p| p.wire);
    }

    /// Placements, ordered by wire.
    pub fn placements(&self) -> &[Placement] {
        &self.placements
    }

    /// Whether the column has no placements.
    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }

    /// Placements whose gates act on the state.
    pub fn operations(&self) -> impl Iterator<Item = &Placement> {
        self.placements
            .iter()
            .filter(|p| p.gate.role().acts_on_state())
    }

    /// Placements of control gates.
    pub fn controls(&self) -> impl Iterator<Item = &Placement> {
        self.placements.iter().filter(|p| p.gate.is_control())
    }

    /// The input register declared with `key`, if any.
    pub fn input(&self, key: char) -> Option<WireRange> {
        self.placements.iter().find_map(|p| match p.gate.role() {
            GateRole::Input { key: k } if k == key => Some(p.range()),
            _ => None,
        })
    }

    /// Highest wire end over all placements.
    pub fn width(&self) -> usize {
        self.placements
            .iter()
            .map(|p| p.range().end())
            .max()
            .unwrap_or(0)
    }
}

/// A wire count and an ordered list of columns.
#[derive(Debug, Clone, Default)]
pub struct Circuit {
    /// Number of wires.
    pub num_wires: usize,
    /// Columns, in evaluation order.
    pub columns: Vec<Column>,
}

impl Circuit {
    /// An empty circuit on `num_wires` wires.
    pub fn new(num_wires: usize) -> Self {
        Self {
            num_wires,
            columns: Vec::new(),
        }
    }

    /// Append a column.
    #[must_use]
    pub fn with_column(mut self, column: Column) -> Self {
        self.columns.push(column);
        self
    }

    /// Append a column in place.
    pub fn push(&mut self, column: Column) {
        self.columns.push(column);
    }

    /// Check that every placement fits the wire count, that bodies in a
    /// column are disjoint, and that required input registers are declared.
    pub fn validate(&self) -> SimResult<()> {
        for (c, column) in self.columns.iter().enumerate() {
            let invalid = |p: &Placement, reason: String| SimError::InvalidPlacement {
                column: c,
                wire: p.wire,
                gate: p.gate.serialized_id().to_string(),
                reason,
            };

            let mut occupied: Vec<WireRange> = Vec::with_capacity(column.placements.len());
            for p in &column.placements {
                let range = p.range();
                if range.end() > self.num_wires {
                    return Err(invalid(
                        p,
                        format!("covers {range} but the circuit has {} wires", self.num_wires),
                    ));
                }
                if let Some(wire) = occupied.iter().find_map(|o| o.overlap(&range)) {
                    return Err(invalid(p, format!("wire {wire} is already occupied")));
                }
                occupied.push(range);
            }

            let mut keys: Vec<char> = Vec::new();
            for p in &column.placements {
                if let GateRole::Input { key } = p.gate.role() {
                    if keys.contains(&key) {
                        return Err(invalid(p, format!("input register '{key}' is declared twice")));
                    }
                    keys.push(key);
                }
            }

            for p in column.operations() {
                if let Some(&key) = p
                    .gate
                    .required_inputs()
                    .iter()
                    .find(|key| !keys.contains(key))
                {
                    return Err(SimError::MissingInput {
                        column: c,
                        gate: p.gate.serialized_id().to_string(),
                        key,
                    });
                }
            }
        }
        Ok(())
    }

    /// Every placement with its column index.
    pub fn gates(&self) -> impl Iterator<Item = (usize, &Placement)> {
        self.columns
            .iter()
            .enumerate()
            .flat_map(|(c, column)| column.placements.iter().map(move |p| (c, p)))
    }

    /// Whether any placed gate changes with time.
    pub fn is_time_dependent(&self) -> bool {
        self.gates().any(|(_, p)| p.gate.is_time_dependent())
    }

    /// Parse circuit text, inferring the width with the default limits.
    pub fn from_json(text: &str, registry: &GateRegistry) -> SimResult<Self> {
        Self::from_json_with_limits(text, registry, &LimitsConfig::default())
    }

    /// Parse circuit text.
    ///
    /// Without a `"wires"` field the width is the widest column, but at
    /// least `limits.editor_min_wire_count`.
    pub fn from_json_with_limits(
        text: &str,
        registry: &GateRegistry,
        limits: &LimitsConfig,
    ) -> SimResult<Self> {
        let raw: CircuitText = serde_json::from_str(text)?;

        let mut columns = Vec::with_capacity(raw.cols.len());
        for (c, cells) in raw.cols.iter().enumerate() {
            let mut column = Column::new();
            for (wire, cell) in cells.iter().enumerate() {
                match cell {
                    Value::Number(n) if n.as_u64() == Some(1) => {}
                    Value::String(id) => column.push(wire, registry.resolve(id)?),
                    other => {
                        return Err(SimError::CircuitText(format!(
                            "column {c}, wire {wire}: expected a gate id or 1, got {other}"
                        )));
                    }
                }
            }
            columns.push(column);
        }

        let num_wires = raw.wires.unwrap_or_else(|| {
            columns
                .iter()
                .map(Column::width)
                .max()
                .unwrap_or(0)
                .max(limits.editor_min_wire_count)
        });

        let circuit = Self { num_wires, columns };
        circuit.validate()?;
        Ok(circuit)
    }

    /// Serialize to circuit text. Trailing empty cells are dropped and the
    /// wire count is always written.
    pub fn to_json(&self) -> SimResult<String> {
        let cols = self
            .columns
            .iter()
            .map(|column| {
                let len = column.placements.last().map_or(0, |p| p.wire + 1);
                let mut cells = vec![Value::from(1); len];
                for p in &column.placements {
                    cells[p.wire] = Value::from(p.gate.serialized_id());
                }
                cells
            })
            .collect();
        let text = CircuitText {
            wires: Some(self.num_wires),
            cols,
        };
        Ok(serde_json::to_string(&text)?)
    }
}

#[derive(Serialize, Deserialize)]
struct CircuitText {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    wires: Option<usize>,
    cols: Vec<Vec<Value>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> GateRegistry {
        GateRegistry::standard().unwrap()
    }

    #[test]
    fn test_column_keeps_wire_order() {
        let r = registry();
        let column = Column::new()
            .with(2, r.get("X").unwrap())
            .with(0, r.get("•").unwrap());
        let wires: Vec<usize> = column.placements().iter().map(|p| p.wire).collect();
        assert_eq!(wires, vec![0, 2]);
        assert_eq!(column.controls().count(), 1);
        assert_eq!(column.operations().count(), 1);
        assert_eq!(column.width(), 3);
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        let r = registry();
        let circuit = Circuit::new(2).with_column(Column::new().with(2, r.get("H").unwrap()));
        assert!(matches!(
            circuit.validate(),
            Err(SimError::InvalidPlacement { column: 0, wire: 2, .. })
        ));
    }

    #[test]
    fn test_validate_rejects_overlap() {
        let r = registry();
        let circuit = Circuit::new(4).with_column(
            Column::new()
                .with(0, r.get("*A2").unwrap())
                .with(1, r.get("X").unwrap()),
        );
        assert!(matches!(
            circuit.validate(),
            Err(SimError::InvalidPlacement { wire: 1, .. })
        ));
    }

    #[test]
    fn test_validate_requires_inputs() {
        let r = registry();
        let circuit = Circuit::new(4).with_column(Column::new().with(0, r.get("*A2").unwrap()));
        assert!(matches!(
            circuit.validate(),
            Err(SimError::MissingInput { key: 'A', .. })
        ));

        let circuit = Circuit::new(4).with_column(
            Column::new()
                .with(0, r.get("*A2").unwrap())
                .with(2, r.get("inputA2").unwrap()),
        );
        circuit.validate().unwrap();
        assert_eq!(
            circuit.columns[0].input('A'),
            Some(WireRange::new(2, 2))
        );
    }

    #[test]
    fn test_from_json() {
        let r = registry();
        let circuit = Circuit::from_json(r#"{"cols":[["H",1,"X"],["•","X"]]}"#, &r).unwrap();
        assert_eq!(circuit.num_wires, 3);
        assert_eq!(circuit.columns.len(), 2);
        assert_eq!(circuit.columns[0].placements()[1].wire, 2);
        assert!(!circuit.is_time_dependent());
        assert_eq!(circuit.gates().count(), 4);
    }

    #[test]
    fn test_from_json_uses_editor_minimum() {
        let r = registry();
        let circuit = Circuit::from_json(r#"{"cols":[["H"]]}"#, &r).unwrap();
        assert_eq!(circuit.num_wires, 2);
        let circuit = Circuit::from_json(r#"{"wires":1,"cols":[["H"]]}"#, &r).unwrap();
        assert_eq!(circuit.num_wires, 1);
    }

    #[test]
    fn test_from_json_errors() {
        let r = registry();
        assert!(matches!(
            Circuit::from_json(r#"{"cols":[["Nope"]]}"#, &r),
            Err(SimError::Gate(_))
        ));
        assert!(matches!(
            Circuit::from_json(r#"{"cols":[[2]]}"#, &r),
            Err(SimError::CircuitText(_))
        ));
        assert!(matches!(
            Circuit::from_json("not json", &r),
            Err(SimError::Json(_))
        ));
    }

    #[test]
    fn test_json_round_trip_preserves_ids() {
        let r = registry();
        let text = r#"{"wires":5,"cols":[["Z^t",1,"|+⟩⟨+|"],["*A2",1,"inputA2"],[]]}"#;
        let circuit = Circuit::from_json(text, &r).unwrap();
        assert!(circuit.is_time_dependent());
        assert_eq!(circuit.to_json().unwrap(), text);
    }

    #[test]
    fn test_to_json_drops_cells_under_wide_gates() {
        let r = registry();
        let circuit = Circuit::from_json(r#"{"wires":4,"cols":[["*A2",1,"inputA2"]]}"#, &r).unwrap();
        assert_eq!(circuit.columns[0].width(), 4);
        assert_eq!(
            circuit.to_json().unwrap(),
            r#"{"wires":4,"cols":[["*A2",1,"inputA2"]]}"#
        );

        let circuit = Circuit::new(3).with_column(Column::new().with(1, r.get("X^½").unwrap()));
        assert_eq!(
            circuit.to_json().unwrap(),
            r#"{"wires":3,"cols":[[1,"X^½"]]}"#
        );
    }
}
