//! Error types for the simulator crate.

use ketgrid_gates::GateError;
use ketgrid_kernel::KernelError;
use thiserror::Error;

use crate::config::ConfigError;

/// Errors that can occur while building or evaluating a circuit.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SimError {
    /// The circuit is wider than the configured ceiling. Reported before
    /// any amplitude buffer is allocated.
    #[error("Circuit has {wires} wires, but at most {max} can be simulated")]
    TooManyWires {
        /// Wires requested.
        wires: usize,
        /// Configured ceiling.
        max: usize,
    },

    /// The circuit has fewer wires than the engine floor.
    #[error("Circuit has {wires} wires, at least {min} are required")]
    NoWires {
        /// Wires requested.
        wires: usize,
        /// Configured floor.
        min: usize,
    },

    /// An amplitude became NaN or infinite.
    #[error("Numerical instability in column {column} at basis index {index}")]
    NumericalInstability {
        /// Column whose output was non-finite.
        column: usize,
        /// First offending basis index.
        index: usize,
    },

    /// A placement does not fit the circuit or collides with another one.
    #[error("Invalid placement of '{gate}' at column {column}, wire {wire}: {reason}")]
    InvalidPlacement {
        /// Column index.
        column: usize,
        /// Lowest wire of the placement.
        wire: usize,
        /// Serialized id of the placed gate.
        gate: String,
        /// What is wrong.
        reason: String,
    },

    /// A gate needs an input register that its column does not declare.
    #[error("Gate '{gate}' in column {column} needs input register '{key}'")]
    MissingInput {
        /// Column index.
        column: usize,
        /// Serialized id of the gate.
        gate: String,
        /// Missing register key.
        key: char,
    },

    /// The evaluation was abandoned through its cancel flag.
    #[error("Evaluation cancelled before column {column}")]
    Cancelled {
        /// First column that was not evaluated.
        column: usize,
    },

    /// Circuit text could not be interpreted.
    #[error("Invalid circuit text: {0}")]
    CircuitText(String),

    /// Circuit text is not valid JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Gate lookup or construction failed.
    #[error(transparent)]
    Gate(#[from] GateError),

    /// Kernel instantiation failed.
    #[error(transparent)]
    Kernel(#[from] KernelError),

    /// Configuration is unusable.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Result type for simulator operations.
pub type SimResult<T> = Result<T, SimError>;
