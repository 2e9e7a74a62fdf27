//! Error types for the kernel crate.

use thiserror::Error;

/// Errors produced while instantiating a kernel for a placement.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum KernelError {
    /// A wire range does not fit in the register.
    #[error("Wire range {offset}..{end} does not fit in {num_wires} wires", end = .offset + .span)]
    RangeOutOfBounds {
        /// First wire of the range.
        offset: usize,
        /// Number of wires in the range.
        span: usize,
        /// Number of wires in the register.
        num_wires: usize,
    },

    /// A wire range has no wires.
    #[error("Wire range at offset {0} is empty")]
    EmptyRange(usize),

    /// Two ranges that must be disjoint share a wire.
    #[error("Wire ranges overlap on wire {wire}")]
    Overlap {
        /// A shared wire.
        wire: usize,
    },

    /// A gate asked for an input register that the context does not provide.
    #[error("Input register '{0}' is not present in this column")]
    MissingInput(char),

    /// More auxiliary input registers than a permutation kernel supports.
    #[error("Kernel supports at most {max} input registers, got {got}")]
    TooManyInputs {
        /// Supported maximum.
        max: usize,
        /// Requested count.
        got: usize,
    },

    /// A general kernel's matrix does not match its target span.
    #[error("Kernel matrix must be {expected}x{expected}, got {rows}x{cols}")]
    MatrixDimension {
        /// Required dimension (2^span).
        expected: usize,
        /// Provided rows.
        rows: usize,
        /// Provided columns.
        cols: usize,
    },
}

/// Result type for kernel operations.
pub type KernelResult<T> = Result<T, KernelError>;
