//! Kernel shapes and the shared execution contract.

use std::fmt;
use std::sync::Arc;

use num_complex::Complex64;
use rayon::prelude::*;

use ketgrid_math::{Matrix, ZERO};

use crate::context::KernelContext;
use crate::error::{KernelError, KernelResult};
use crate::wires::{ControlMask, WireRange};

/// Maximum number of input registers a permutation kernel can read.
pub const MAX_INPUTS: usize = 4;

/// Buffers shorter than this are evaluated on the calling thread.
const PARALLEL_THRESHOLD: usize = 1 << 12;

/// Gather function of a permutation kernel.
///
/// Receives the value of the target wires at an *output* index and the
/// values of the requested input registers, and returns the target value of
/// the *input* index the amplitude is read from.
pub type GatherFn = Arc<dyn Fn(u64, &[u64]) -> u64 + Send + Sync>;

/// The execution contract shared by every kernel shape.
pub trait KetKernel: Send + Sync {
    /// New amplitude at `index`, given the full current state.
    fn amplitude_at(&self, index: usize, state: &[Complex64]) -> Complex64;

    /// Evaluate [`amplitude_at`](Self::amplitude_at) for every index.
    fn apply(&self, state: &[Complex64]) -> Vec<Complex64> {
        if state.len() < PARALLEL_THRESHOLD {
            (0..state.len())
                .map(|i| self.amplitude_at(i, state))
                .collect()
        } else {
            (0..state.len())
                .into_par_iter()
                .map(|i| self.amplitude_at(i, state))
                .collect()
        }
    }
}

/// Pure address remapping: `out[i] = in[source_index(i)]`.
#[derive(Clone)]
pub struct PermutationKernel {
    target: WireRange,
    controls: ControlMask,
    inputs: Vec<WireRange>,
    gather: GatherFn,
}

impl PermutationKernel {
    /// Build a permutation kernel reading the input registers `keys`, in order.
    pub fn new(ctx: &KernelContext, keys: &[char], gather: GatherFn) -> KernelResult<Self> {
        if keys.len() > MAX_INPUTS {
            return Err(KernelError::TooManyInputs {
                max: MAX_INPUTS,
                got: keys.len(),
            });
        }
        let inputs = keys
            .iter()
            .map(|&key| ctx.require_input(key))
            .collect::<KernelResult<Vec<_>>>()?;
        Ok(Self {
            target: ctx.target,
            controls: ctx.controls,
            inputs,
            gather,
        })
    }

    /// Index whose amplitude lands at `index`.
    ///
    /// Indices rejected by the control mask map to themselves.
    #[inline]
    pub fn source_index(&self, index: usize) -> usize {
        if !self.controls.allows(index) {
            return index;
        }
        let mut values = [0u64; MAX_INPUTS];
        for (slot, range) in values.iter_mut().zip(&self.inputs) {
            *slot = range.read(index) as u64;
        }
        let target = self.target.read(index) as u64;
        let source = (self.gather)(target, &values[..self.inputs.len()]);
        self.target.write(index, source as usize)
    }

    /// Wires the kernel rewrites.
    pub fn target(&self) -> WireRange {
        self.target
    }
}

impl KetKernel for PermutationKernel {
    #[inline]
    fn amplitude_at(&self, index: usize, state: &[Complex64]) -> Complex64 {
        state[self.source_index(index)]
    }
}

impl fmt::Debug for PermutationKernel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PermutationKernel")
            .field("target", &self.target)
            .field("controls", &self.controls)
            .field("inputs", &self.inputs)
            .finish_non_exhaustive()
    }
}

/// Linear recombination of the amplitudes that differ only in the target wires.
#[derive(Debug, Clone)]
pub struct GeneralKernel {
    target: WireRange,
    controls: ControlMask,
    matrix: Matrix,
}

impl GeneralKernel {
    /// Build a general kernel; `matrix` must be `2^span` square.
    pub fn new(ctx: &KernelContext, matrix: Matrix) -> KernelResult<Self> {
        let expected = ctx.target.dim();
        if matrix.rows() != expected || matrix.cols() != expected {
            return Err(KernelError::MatrixDimension {
                expected,
                rows: matrix.rows(),
                cols: matrix.cols(),
            });
        }
        Ok(Self {
            target: ctx.target,
            controls: ctx.controls,
            matrix,
        })
    }

    /// The matrix applied to the target wires.
    pub fn matrix(&self) -> &Matrix {
        &self.matrix
    }
}

impl KetKernel for GeneralKernel {
    fn amplitude_at(&self, index: usize, state: &[Complex64]) -> Complex64 {
        if !self.controls.allows(index) {
            return state[index];
        }
        let row = self.target.read(index);
        let dim = self.target.dim();
        let weights = &self.matrix.data()[row * dim..(row + 1) * dim];
        weights
            .iter()
            .enumerate()
            .filter(|(_, w)| **w != ZERO)
            .fold(ZERO, |acc, (col, w)| {
                acc + w * state[self.target.write(index, col)]
            })
    }
}

/// Any kernel the compiler can produce.
#[derive(Debug, Clone)]
pub enum Kernel {
    /// Address remapping.
    Permutation(PermutationKernel),
    /// Matrix recombination.
    General(GeneralKernel),
    /// Leaves the state untouched.
    Identity,
}

impl Kernel {
    /// Permutation kernel that reads no input registers.
    pub fn permutation(ctx: &KernelContext, gather: GatherFn) -> KernelResult<Self> {
        Self::permutation_with_inputs(ctx, &[], gather)
    }

    /// Permutation kernel reading the input registers `keys`.
    pub fn permutation_with_inputs(
        ctx: &KernelContext,
        keys: &[char],
        gather: GatherFn,
    ) -> KernelResult<Self> {
        PermutationKernel::new(ctx, keys, gather).map(Self::Permutation)
    }

    /// General kernel for `matrix` on the context's target.
    pub fn general(ctx: &KernelContext, matrix: Matrix) -> KernelResult<Self> {
        GeneralKernel::new(ctx, matrix).map(Self::General)
    }

    /// The no-op kernel.
    pub fn identity() -> Self {
        Self::Identity
    }

    /// Whether this kernel is the no-op kernel.
    pub fn is_identity(&self) -> bool {
        matches!(self, Self::Identity)
    }
}

impl KetKernel for Kernel {
    #[inline]
    fn amplitude_at(&self, index: usize, state: &[Complex64]) -> Complex64 {
        match self {
            Self::Permutation(k) => k.amplitude_at(index, state),
            Self::General(k) => k.amplitude_at(index, state),
            Self::Identity => state[index],
        }
    }

    fn apply(&self, state: &[Complex64]) -> Vec<Complex64> {
        match self {
            Self::Identity => state.to_vec(),
            Self::Permutation(k) => k.apply(state),
            Self::General(k) => k.apply(state),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ketgrid_math::{ONE, approx_eq};

    fn basis(n: usize, index: usize) -> Vec<Complex64> {
        let mut v = vec![ZERO; 1 << n];
        v[index] = ONE;
        v
    }

    #[test]
    fn test_not_gate_swaps_wire_zero() {
        let ctx = KernelContext::new(1, WireRange::single(0)).unwrap();
        let k = Kernel::permutation(&ctx, Arc::new(|t: u64, _: &[u64]| 1 - t)).unwrap();
        assert_eq!(k.apply(&basis(1, 0)), basis(1, 1));
        assert_eq!(k.apply(&basis(1, 1)), basis(1, 0));
    }

    #[test]
    fn test_controlled_not_respects_control() {
        let ctx = KernelContext::new(2, WireRange::single(1))
            .unwrap()
            .with_controls(ControlMask::NONE.with(0, true));
        let k = Kernel::permutation(&ctx, Arc::new(|t: u64, _: &[u64]| 1 - t)).unwrap();
        assert_eq!(k.apply(&basis(2, 0)), basis(2, 0));
        assert_eq!(k.apply(&basis(2, 1)), basis(2, 3));
        assert_eq!(k.apply(&basis(2, 3)), basis(2, 1));
    }

    #[test]
    fn test_permutation_reads_input_register() {
        // Target on wires 0..2, input A on wires 2..4: out = in + A (mod 4).
        let ctx = KernelContext::new(4, WireRange::new(0, 2))
            .unwrap()
            .with_input('A', WireRange::new(2, 2))
            .unwrap();
        let k = PermutationKernel::new(
            &ctx,
            &['A'],
            Arc::new(|t: u64, inputs: &[u64]| (t + 4 - inputs[0]) % 4),
        )
        .unwrap();
        // A = 3, target = 1 reads from target = 2.
        let index = (3 << 2) | 1;
        assert_eq!(k.source_index(index), (3 << 2) | 2);
    }

    #[test]
    fn test_permutation_missing_input() {
        let ctx = KernelContext::new(2, WireRange::single(0)).unwrap();
        let err = Kernel::permutation_with_inputs(&ctx, &['A'], Arc::new(|t: u64, _: &[u64]| t))
            .unwrap_err();
        assert!(matches!(err, KernelError::MissingInput('A')));
    }

    #[test]
    fn test_too_many_inputs() {
        let ctx = KernelContext::new(2, WireRange::single(0)).unwrap();
        let keys = ['A', 'B', 'C', 'D', 'E'];
        let err = PermutationKernel::new(&ctx, &keys, Arc::new(|t: u64, _: &[u64]| t)).unwrap_err();
        assert!(matches!(err, KernelError::TooManyInputs { max: 4, got: 5 }));
    }

    #[test]
    fn test_hadamard_on_upper_wire() {
        let ctx = KernelContext::new(2, WireRange::single(1)).unwrap();
        let k = Kernel::general(&ctx, Matrix::hadamard()).unwrap();
        let out = k.apply(&basis(2, 0));
        let s = std::f64::consts::FRAC_1_SQRT_2;
        assert!(approx_eq(out[0], Complex64::new(s, 0.0), 1e-12));
        assert!(approx_eq(out[2], Complex64::new(s, 0.0), 1e-12));
        assert_eq!(out[1], ZERO);
        assert_eq!(out[3], ZERO);
    }

    #[test]
    fn test_general_kernel_matches_dense_matrix() {
        // Y on wire 0 of a two-wire register equals (I ⊗ Y) applied densely.
        let ctx = KernelContext::new(2, WireRange::single(0)).unwrap();
        let k = Kernel::general(&ctx, Matrix::pauli_y()).unwrap();
        let dense = Matrix::identity(2).tensor_product(&Matrix::pauli_y());
        let state = vec![
            Complex64::new(0.5, 0.0),
            Complex64::new(0.0, 0.5),
            Complex64::new(-0.5, 0.0),
            Complex64::new(0.0, -0.5),
        ];
        let expected = dense.apply(&state);
        for (a, b) in k.apply(&state).iter().zip(&expected) {
            assert!(approx_eq(*a, *b, 1e-12));
        }
    }

    #[test]
    fn test_general_kernel_rejects_wrong_dimension() {
        let ctx = KernelContext::new(3, WireRange::new(0, 2)).unwrap();
        let err = Kernel::general(&ctx, Matrix::hadamard()).unwrap_err();
        assert!(matches!(
            err,
            KernelError::MatrixDimension {
                expected: 4,
                rows: 2,
                cols: 2
            }
        ));
    }

    #[test]
    fn test_identity_kernel() {
        let state = basis(3, 5);
        assert_eq!(Kernel::identity().apply(&state), state);
        assert!(Kernel::identity().is_identity());
    }

    #[test]
    fn test_parallel_path_agrees_with_sequential() {
        let n = 13;
        let ctx = KernelContext::new(n, WireRange::single(7)).unwrap();
        let k = Kernel::permutation(&ctx, Arc::new(|t: u64, _: &[u64]| 1 - t)).unwrap();
        let state: Vec<Complex64> = (0..1 << n)
            .map(|i| Complex64::new(i as f64, 0.0))
            .collect();
        let out = k.apply(&state);
        for (i, amp) in out.iter().enumerate() {
            assert_eq!(amp.re as usize, i ^ (1 << 7));
        }
    }
}
