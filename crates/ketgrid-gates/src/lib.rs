//! Gate descriptors for the ketgrid simulator.
//!
//! A [`Gate`] carries two independent descriptions of what it does:
//!
//! - a declared [`GateEffect`]: a matrix, a permutation of basis values, or a
//!   time-dependent matrix;
//! - a kernel provider that compiles an executable
//!   [`Kernel`](ketgrid_kernel::Kernel) for a concrete placement.
//!
//! [`GateBuilder::build`] cross-checks the two on a small register (with a
//! control wire and any required input registers attached) and refuses to
//! produce the gate if they disagree. A [`Gate`] value is therefore always
//! consistent.
//!
//! Span-parametrized gates are generated with [`GateFamily`]; toolbox
//! alternates (a gate and its inverse or negation) are recorded by serialized
//! id and resolved symmetrically by [`GateRegistry::alternate_of`].
//!
//! # Example
//!
//! ```rust
//! use ketgrid_gates::GateRegistry;
//!
//! let registry = GateRegistry::standard().unwrap();
//! let h = registry.get("H").unwrap();
//! assert_eq!(h.span(), 1);
//! assert_eq!(registry.alternate_of("/A4").unwrap().serialized_id(), "*A4");
//! ```

pub mod arith;
pub mod error;
pub mod family;
pub mod gate;
pub mod registry;
pub mod sets;

mod validate;

pub use error::{GateError, GateResult};
pub use family::GateFamily;
pub use gate::{
    FamilyTag, Gate, GateBuilder, GateEffect, GateRole, KernelProvider, MAX_GATE_SPAN,
    PermutationFn, TimeMatrixFn,
};
pub use registry::GateRegistry;
