//! Complex algebra for the ketgrid simulator.
//!
//! This crate is the ground truth layer for gate semantics. Every gate in
//! `ketgrid-gates` states its effect either as a [`Matrix`] built here or as
//! a permutation, and the execution kernels are checked against that
//! statement when the gate is constructed.
//!
//! # Conventions
//!
//! - Matrices are dense and row-major over [`Complex64`].
//! - Basis index bit `i` is wire `i` (little-endian). Consequently a two-wire
//!   operator acting as `A` on wire 1 and `B` on wire 0 is
//!   `A.tensor_product(&B)`.
//! - Dimension mismatches are programmer errors and panic.
//!
//! # Example
//!
//! ```rust
//! use ketgrid_math::{Matrix, DEFAULT_TOLERANCE};
//!
//! let h = Matrix::hadamard();
//! assert!((&h * &h).is_approx_identity(DEFAULT_TOLERANCE));
//!
//! let cnot_like = Matrix::pauli_x().tensor_product(&Matrix::identity(2));
//! assert_eq!(cnot_like.rows(), 4);
//! ```

pub mod complex;
pub mod matrix;

pub use complex::{I, ONE, ZERO, approx_eq, phase_angle};
pub use matrix::Matrix;
pub use num_complex::Complex64;

/// Tolerance used when comparing numerically derived amplitudes.
pub const DEFAULT_TOLERANCE: f64 = 1e-6;
