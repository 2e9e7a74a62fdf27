//! Error types for gate construction and lookup.

use ketgrid_kernel::KernelError;
use thiserror::Error;

/// Errors raised while building, validating or registering gates.
///
/// Every variant except [`GateError::UnknownGate`] indicates a defect in a
/// gate definition and is raised before the gate can reach evaluation.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GateError {
    /// The builder was finished without a serialized id.
    #[error("Gate has no serialized id")]
    MissingSerializedId,

    /// An operation gate has no kernel provider.
    #[error("Gate '{0}' operates on the state but has no kernel")]
    MissingKernel(String),

    /// The kernel's numerical effect disagrees with the declared effect.
    #[error("Gate '{id}' kernel disagrees with its declared effect: {detail}")]
    EffectMismatch {
        /// Serialized id of the gate.
        id: String,
        /// Which sample disagreed and how.
        detail: String,
    },

    /// A declared permutation maps two inputs to the same output.
    #[error("Gate '{id}' permutation is not bijective: {first} and {second} both map to {image}")]
    NotBijective {
        /// Serialized id of the gate.
        id: String,
        /// First colliding input.
        first: u64,
        /// Second colliding input.
        second: u64,
        /// Shared image.
        image: u64,
    },

    /// A declared matrix does not fit the gate's span.
    #[error("Gate '{id}' spans {span} wires but its matrix is {rows}x{cols}")]
    MatrixSize {
        /// Serialized id of the gate.
        id: String,
        /// Wire span.
        span: usize,
        /// Matrix rows.
        rows: usize,
        /// Matrix columns.
        cols: usize,
    },

    /// A gate span of zero, or one too wide to simulate.
    #[error("Gate '{id}' has invalid span {span}")]
    InvalidSpan {
        /// Serialized id of the gate.
        id: String,
        /// Offending span.
        span: usize,
    },

    /// Two gates share a serialized id.
    #[error("Serialized id '{0}' is already registered")]
    DuplicateId(String),

    /// A gate names an alternate that conflicts with an existing pairing.
    #[error("Gate '{id}' cannot pair with '{requested}': already paired with '{existing}'")]
    AlternateConflict {
        /// Gate being registered.
        id: String,
        /// Alternate it asked for.
        requested: String,
        /// Alternate already on record.
        existing: String,
    },

    /// No gate with this serialized id is registered.
    #[error("Unknown gate '{0}'")]
    UnknownGate(String),

    /// A kernel could not be compiled during validation.
    #[error("Kernel error: {0}")]
    Kernel(#[from] KernelError),
}

/// Result type for gate operations.
pub type GateResult<T> = Result<T, GateError>;
