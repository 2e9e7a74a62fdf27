//! Evaluation results and derived statistics.
//!
//! Stored amplitudes are never renormalized. Post-selection shrinks the
//! norm of the state, and the lost weight is reported as the survival
//! probability; every probability exposed here divides by it.

use std::sync::Arc;

use ketgrid_math::{Complex64, phase_angle};
use serde::Serialize;

use crate::config::HistoryMode;

/// Immutable view of one state vector.
///
/// Basis index bit `i` is wire `i`.
#[derive(Debug, Clone, PartialEq)]
pub struct AmplitudeVector {
    num_wires: usize,
    amplitudes: Arc<[Complex64]>,
}

impl AmplitudeVector {
    pub(crate) fn new(num_wires: usize, amplitudes: Vec<Complex64>) -> Self {
        debug_assert_eq!(amplitudes.len(), 1 << num_wires);
        Self {
            num_wires,
            amplitudes: amplitudes.into(),
        }
    }

    /// Number of basis states.
    pub fn len(&self) -> usize {
        self.amplitudes.len()
    }

    /// Whether the vector has no entries.
    pub fn is_empty(&self) -> bool {
        self.amplitudes.is_empty()
    }

    /// Number of wires.
    pub fn num_wires(&self) -> usize {
        self.num_wires
    }

    /// Amplitude of basis state `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range.
    pub fn amplitude(&self, index: usize) -> Complex64 {
        self.amplitudes[index]
    }

    /// Unnormalized probability `|a|²` of basis state `index`.
    pub fn probability(&self, index: usize) -> f64 {
        self.amplitudes[index].norm_sqr()
    }

    /// Phase of basis state `index` in `(-π, π]`; zero for a zero amplitude.
    pub fn phase(&self, index: usize) -> f64 {
        phase_angle(self.amplitudes[index])
    }

    /// Sum of squared magnitudes.
    pub fn norm_sqr(&self) -> f64 {
        self.amplitudes.iter().map(Complex64::norm_sqr).sum()
    }

    /// Amplitudes in basis order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = Complex64> + '_ {
        self.amplitudes.iter().copied()
    }

    pub(crate) fn as_slice(&self) -> &[Complex64] {
        &self.amplitudes
    }
}

/// Statistics recorded after one column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnStats {
    /// Column index.
    pub column: usize,
    /// Probability that every post-selection up to and including this
    /// column succeeds.
    pub survival_probability: f64,
    /// Renormalized `P(wire is ON)` for each wire.
    pub wire_probabilities: Vec<f64>,
}

impl ColumnStats {
    pub(crate) fn measure(column: usize, state: &[Complex64], num_wires: usize) -> Self {
        let survival: f64 = state.iter().map(Complex64::norm_sqr).sum();
        let wire_probabilities = (0..num_wires)
            .map(|wire| renormalize(on_weight(state, wire), survival))
            .collect();
        Self {
            column,
            survival_probability: survival,
            wire_probabilities,
        }
    }
}

/// One bar of the state histogram.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateBar {
    /// Basis index.
    pub index: usize,
    /// Index in binary, most significant wire first.
    pub label: String,
    /// Renormalized probability.
    pub probability: f64,
    /// Amplitude phase in `(-π, π]`.
    pub phase: f64,
}

/// Reduced single-wire state as a point in the Bloch ball.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BlochVector {
    /// `⟨X⟩`.
    pub x: f64,
    /// `⟨Y⟩`.
    pub y: f64,
    /// `⟨Z⟩`; `+1` is OFF.
    pub z: f64,
}

impl BlochVector {
    /// Distance from the origin; 1 for a pure unentangled wire.
    pub fn length(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }
}

/// Result of evaluating a circuit.
#[derive(Debug, Clone)]
pub struct CircuitStats {
    num_wires: usize,
    time: f64,
    history_mode: HistoryMode,
    history: Vec<AmplitudeVector>,
    columns: Vec<ColumnStats>,
}

impl CircuitStats {
    pub(crate) fn new(
        num_wires: usize,
        time: f64,
        history_mode: HistoryMode,
        history: Vec<AmplitudeVector>,
        columns: Vec<ColumnStats>,
    ) -> Self {
        debug_assert!(!history.is_empty());
        Self {
            num_wires,
            time,
            history_mode,
            history,
            columns,
        }
    }

    /// Number of wires.
    pub fn num_wires(&self) -> usize {
        self.num_wires
    }

    /// Number of evaluated columns.
    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    /// Quantized cycle fraction the circuit was evaluated at.
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Which state vectors were kept.
    pub fn history_mode(&self) -> HistoryMode {
        self.history_mode
    }

    /// The `|0…0⟩` starting state.
    pub fn initial_state(&self) -> &AmplitudeVector {
        &self.history[0]
    }

    /// State after the last column.
    pub fn final_state(&self) -> &AmplitudeVector {
        &self.history[self.history.len() - 1]
    }

    /// State after `column`.
    ///
    /// With [`HistoryMode::Endpoints`] only the last column is available.
    pub fn state_at(&self, column: usize) -> Option<&AmplitudeVector> {
        if column >= self.columns.len() {
            return None;
        }
        match self.history_mode {
            HistoryMode::Full => self.history.get(column + 1),
            HistoryMode::Endpoints if column + 1 == self.columns.len() => Some(self.final_state()),
            HistoryMode::Endpoints => None,
        }
    }

    /// Statistics recorded after `column`.
    pub fn column_stats(&self, column: usize) -> Option<&ColumnStats> {
        self.columns.get(column)
    }

    /// Probability that every post-selection in the circuit succeeds.
    pub fn survival_probability(&self) -> f64 {
        self.final_state().norm_sqr()
    }

    /// Renormalized probability of basis state `index`.
    pub fn probability(&self, index: usize) -> f64 {
        renormalize(self.final_state().probability(index), self.survival_probability())
    }

    /// Phase of basis state `index`.
    pub fn phase(&self, index: usize) -> f64 {
        self.final_state().phase(index)
    }

    /// Renormalized distribution over all basis states.
    pub fn probabilities(&self) -> Vec<f64> {
        let survival = self.survival_probability();
        self.final_state()
            .iter()
            .map(|a| renormalize(a.norm_sqr(), survival))
            .collect()
    }

    /// Renormalized probability that `wire` is ON, or `None` past the last
    /// wire.
    pub fn wire_probability(&self, wire: usize) -> Option<f64> {
        if wire >= self.num_wires {
            return None;
        }
        let state = self.final_state().as_slice();
        Some(renormalize(on_weight(state, wire), self.survival_probability()))
    }

    /// Bloch vector of the reduced state of `wire`.
    pub fn bloch_vector(&self, wire: usize) -> Option<BlochVector> {
        let (rho00, rho11, rho01) = self.reduced(wire)?;
        Some(BlochVector {
            x: 2.0 * rho01.re,
            y: -2.0 * rho01.im,
            z: rho00 - rho11,
        })
    }

    /// `|ρ01|` of the reduced state of `wire`: 0.5 for an equal
    /// superposition, 0 for a basis state or a maximally entangled wire.
    pub fn coherence(&self, wire: usize) -> Option<f64> {
        self.reduced(wire).map(|(_, _, rho01)| rho01.norm())
    }

    /// One bar per basis state, in index order.
    pub fn stateogram(&self) -> Vec<StateBar> {
        let survival = self.survival_probability();
        let state = self.final_state();
        (0..state.len())
            .map(|index| StateBar {
                index,
                label: self.label(index),
                probability: renormalize(state.probability(index), survival),
                phase: state.phase(index),
            })
            .collect()
    }

    /// Labels of basis states with exactly zero amplitude.
    pub fn zero_amplitude_labels(&self) -> Vec<String> {
        self.final_state()
            .iter()
            .enumerate()
            .filter(|(_, a)| a.norm_sqr() == 0.0)
            .map(|(index, _)| self.label(index))
            .collect()
    }

    /// Binary label of `index`, most significant wire first.
    pub fn label(&self, index: usize) -> String {
        format!("{index:0width$b}", width = self.num_wires)
    }

    /// Renormalized `(ρ00, ρ11, ρ01)` of the reduced state of `wire`.
    fn reduced(&self, wire: usize) -> Option<(f64, f64, Complex64)> {
        if wire >= self.num_wires {
            return None;
        }
        let state = self.final_state().as_slice();
        let survival = self.survival_probability();
        if survival <= 0.0 {
            return Some((0.0, 0.0, Complex64::new(0.0, 0.0)));
        }
        let bit = 1 << wire;
        let mut rho00 = 0.0;
        let mut rho11 = 0.0;
        let mut rho01 = Complex64::new(0.0, 0.0);
        for (index, a) in state.iter().enumerate() {
            if index & bit == 0 {
                let b = state[index | bit];
                rho00 += a.norm_sqr();
                rho11 += b.norm_sqr();
                rho01 += a * b.conj();
            }
        }
        Some((rho00 / survival, rho11 / survival, rho01 / survival))
    }
}

fn on_weight(state: &[Complex64], wire: usize) -> f64 {
    let bit = 1 << wire;
    state
        .iter()
        .enumerate()
        .filter(|(index, _)| index & bit != 0)
        .map(|(_, a)| a.norm_sqr())
        .sum()
}

fn renormalize(weight: f64, survival: f64) -> f64 {
    if survival > 0.0 { weight / survival } else { 0.0 }
}
