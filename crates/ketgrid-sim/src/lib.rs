//! State-vector evaluation of ketgrid circuits.
//!
//! A [`Circuit`] is a wire count and an ordered list of [`Column`]s of gate
//! placements. [`Simulator::evaluate`] starts from `|0…0⟩`, applies each
//! column's kernels in turn and returns [`CircuitStats`]: the final
//! amplitudes, optional per-column history, and renormalized measurement
//! statistics.
//!
//! Post-selection gates remove weight from the state without renormalizing
//! it. The remaining weight is reported as
//! [`CircuitStats::survival_probability`], and every reported probability
//! is conditioned on it.
//!
//! Time-dependent gates are evaluated at a quantized phase of the animation
//! cycle and their kernels are memoized per bucket in a [`TimeCache`].
//!
//! # Example
//!
//! ```rust
//! use std::time::Duration;
//! use ketgrid_sim::Simulator;
//!
//! let sim = Simulator::standard().unwrap();
//! let circuit = sim.parse(r#"{"cols":[["H"],["•","X"]]}"#).unwrap();
//! let stats = sim.evaluate(&circuit, Duration::ZERO).unwrap();
//!
//! assert!((stats.probability(0b00) - 0.5).abs() < 1e-9);
//! assert!((stats.probability(0b11) - 0.5).abs() < 1e-9);
//! assert_eq!(stats.zero_amplitude_labels(), vec!["01", "10"]);
//! ```

pub mod circuit;
pub mod config;
pub mod error;
pub mod evaluator;
pub mod stats;
pub mod time_cache;
pub mod tracing_config;

pub use circuit::{Circuit, Column, Placement};
pub use config::{
    ConfigError, EvaluationConfig, HistoryMode, LimitsConfig, LoggingConfig, SimConfig,
    TimeConfig,
};
pub use error::{SimError, SimResult};
pub use evaluator::{CancelFlag, Simulator};
pub use stats::{AmplitudeVector, BlochVector, CircuitStats, ColumnStats, StateBar};
pub use time_cache::{TimeBucket, TimeCache};
pub use tracing_config::{TracingConfig, TracingFormat, init_tracing};
