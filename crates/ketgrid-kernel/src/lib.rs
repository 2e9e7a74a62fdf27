//! Kernel compiler for the ketgrid statevector engine.
//!
//! A kernel is a function from a basis index and the full current amplitude
//! buffer to the new amplitude at that index. Because every output index is
//! computed independently, applying a kernel is embarrassingly parallel and
//! is dispatched across the `rayon` thread pool.
//!
//! Two shapes exist:
//!
//! - [`PermutationKernel`]: pure address remapping. `out[i] = in[src(i)]`
//!   where `src` rewrites only the target wire bits. Used for reversible
//!   classical-like gates (NOT, modular multiplication, ...).
//! - [`GeneralKernel`]: a linear combination of the `2^span` amplitudes that
//!   differ only in the target wires, weighted by a matrix row.
//!
//! Both honour a [`ControlMask`]: indices whose control bits do not match are
//! passed through unchanged.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use ketgrid_kernel::{ControlMask, Kernel, KernelContext, KetKernel, WireRange};
//! use ketgrid_math::{ONE, ZERO};
//!
//! // NOT on wire 1, controlled by wire 0.
//! let ctx = KernelContext::new(2, WireRange::single(1))
//!     .unwrap()
//!     .with_controls(ControlMask::NONE.with(0, true));
//! let cnot = Kernel::permutation(&ctx, Arc::new(|t: u64, _: &[u64]| 1 - t)).unwrap();
//!
//! let out = cnot.apply(&[ZERO, ONE, ZERO, ZERO]);
//! assert_eq!(out[3], ONE);
//! ```

pub mod cache;
pub mod context;
pub mod error;
pub mod kernel;
pub mod wires;

pub use cache::{KernelCache, KernelKey};
pub use context::{InputRange, KernelContext};
pub use error::{KernelError, KernelResult};
pub use kernel::{GatherFn, GeneralKernel, Kernel, KetKernel, MAX_INPUTS, PermutationKernel};
pub use wires::{ControlMask, WireRange};
