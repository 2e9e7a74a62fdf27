//! Property tests over random circuits.

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use ketgrid_gates::GateRegistry;
use ketgrid_math::DEFAULT_TOLERANCE;
use ketgrid_sim::{Circuit, Column, SimConfig, Simulator};
use proptest::prelude::*;

const UNITARY_GATES: &[&str] = &[
    "X", "Y", "Z", "H", "Z^½", "Z^-½", "Z^¼", "Z^-¼", "X^½", "X^-½", "Y^½", "Y^-½", "Z^t", "X^-t",
    "Y^t",
];

fn simulator() -> &'static Simulator {
    static SIM: OnceLock<Simulator> = OnceLock::new();
    SIM.get_or_init(|| {
        let registry = Arc::new(GateRegistry::standard().expect("standard gates must validate"));
        Simulator::new(registry, SimConfig::default()).expect("default config is valid")
    })
}

/// One column: a gate on `target`, optionally controlled by another wire.
#[derive(Debug, Clone)]
struct Step {
    gate: usize,
    target: usize,
    control: Option<(usize, bool)>,
}

fn steps(num_wires: usize) -> impl Strategy<Value = Vec<Step>> {
    prop::collection::vec(
        (
            0..UNITARY_GATES.len(),
            0..num_wires,
            prop::option::of((0..num_wires, any::<bool>())),
        )
            .prop_map(|(gate, target, control)| Step {
                gate,
                target,
                control: control.filter(|(wire, _)| *wire != target),
            }),
        0..12,
    )
}

fn build(num_wires: usize, steps: &[Step]) -> Circuit {
    let registry = simulator().registry();
    steps.iter().fold(Circuit::new(num_wires), |circuit, step| {
        let mut column = Column::new().with(
            step.target,
            registry.resolve(UNITARY_GATES[step.gate]).unwrap(),
        );
        if let Some((wire, on)) = step.control {
            column.push(wire, registry.resolve(if on { "•" } else { "◦" }).unwrap());
        }
        circuit.with_column(column)
    })
}

fn circuit_strategy() -> impl Strategy<Value = (usize, Vec<Step>)> {
    (2_usize..=7).prop_flat_map(|n| (Just(n), steps(n)))
}

proptest! {
    /// Without post-selection the state stays normalized after every column.
    #[test]
    fn unitary_circuits_preserve_norm((n, steps) in circuit_strategy(), ms in 0_u64..16_000) {
        let circuit = build(n, &steps);
        let stats = simulator().evaluate(&circuit, Duration::from_millis(ms)).unwrap();
        prop_assert!((stats.final_state().norm_sqr() - 1.0).abs() < DEFAULT_TOLERANCE);
        for c in 0..stats.num_columns() {
            let survival = stats.column_stats(c).unwrap().survival_probability;
            prop_assert!((survival - 1.0).abs() < DEFAULT_TOLERANCE);
        }
        prop_assert!((stats.probabilities().iter().sum::<f64>() - 1.0).abs() < DEFAULT_TOLERANCE);
    }

    /// Reduced single-wire states lie inside the Bloch ball and agree with
    /// the marginal probabilities.
    #[test]
    fn wire_summaries_are_consistent((n, steps) in circuit_strategy()) {
        let circuit = build(n, &steps);
        let stats = simulator().evaluate(&circuit, Duration::ZERO).unwrap();
        for wire in 0..n {
            let bloch = stats.bloch_vector(wire).unwrap();
            prop_assert!(bloch.length() <= 1.0 + DEFAULT_TOLERANCE);
            let p_on = stats.wire_probability(wire).unwrap();
            prop_assert!((bloch.z - (1.0 - 2.0 * p_on)).abs() < DEFAULT_TOLERANCE);
            prop_assert!(stats.coherence(wire).unwrap() <= 0.5 + DEFAULT_TOLERANCE);
        }
    }

    /// Circuit text round-trips through the registry.
    #[test]
    fn text_round_trip((n, steps) in circuit_strategy()) {
        let circuit = build(n, &steps);
        let text = circuit.to_json().unwrap();
        let parsed = simulator().parse(&text).unwrap();
        prop_assert_eq!(parsed.to_json().unwrap(), text);
        prop_assert_eq!(parsed.num_wires, n);
    }

    /// Applying a circuit followed by its mirror with every gate replaced by
    /// its alternate returns to the ground state.
    #[test]
    fn alternates_undo_rotations((n, steps) in circuit_strategy()) {
        let registry = simulator().registry();
        let reversible: Vec<Step> = steps
            .into_iter()
            .filter(|s| {
                let id = UNITARY_GATES[s.gate];
                id.contains('^') && !id.ends_with('t')
            })
            .collect();
        let forward = build(n, &reversible);
        let mut circuit = forward.clone();
        for column in forward.columns.iter().rev() {
            let mut undo = Column::new();
            for p in column.placements() {
                let gate = registry
                    .alternate_of(p.gate.serialized_id())
                    .filter(|_| !p.gate.is_control())
                    .unwrap_or_else(|| Arc::clone(&p.gate));
                undo.push(p.wire, gate);
            }
            circuit.push(undo);
        }
        let stats = simulator().evaluate(&circuit, Duration::ZERO).unwrap();
        prop_assert!((stats.probability(0) - 1.0).abs() < DEFAULT_TOLERANCE);
    }
}
