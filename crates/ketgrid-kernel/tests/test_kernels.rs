//! Tests for kernel construction and application.

use std::sync::Arc;

use ketgrid_kernel::{
    ControlMask, Kernel, KernelCache, KernelContext, KernelError, KernelKey, KetKernel,
    PermutationKernel, WireRange,
};
use ketgrid_math::{Complex64, Matrix, ONE, ZERO, approx_eq};
use proptest::prelude::*;

fn basis(n: usize, index: usize) -> Vec<Complex64> {
    let mut v = vec![ZERO; 1 << n];
    v[index] = ONE;
    v
}

fn norm_sqr(v: &[Complex64]) -> f64 {
    v.iter().map(|a| a.norm_sqr()).sum()
}

// ---------------------------------------------------------------------------
// Controls
// ---------------------------------------------------------------------------

#[test]
fn cnot_on_ground_state_is_unchanged() {
    let ctx = KernelContext::new(2, WireRange::single(1))
        .unwrap()
        .with_controls(ControlMask::NONE.with(0, true));
    let cnot = Kernel::permutation(&ctx, Arc::new(|t: u64, _: &[u64]| 1 - t)).unwrap();
    assert_eq!(cnot.apply(&[ONE, ZERO, ZERO, ZERO]), vec![ONE, ZERO, ZERO, ZERO]);
}

#[test]
fn anti_control_fires_on_off() {
    let ctx = KernelContext::new(2, WireRange::single(1))
        .unwrap()
        .with_controls(ControlMask::NONE.with(0, false));
    let k = Kernel::general(&ctx, Matrix::pauli_x()).unwrap();
    assert_eq!(k.apply(&basis(2, 0)), basis(2, 2));
    assert_eq!(k.apply(&basis(2, 1)), basis(2, 1));
}

#[test]
fn general_kernel_with_controls_passes_through_unmet_indices() {
    let ctx = KernelContext::new(3, WireRange::single(0))
        .unwrap()
        .with_controls(ControlMask::NONE.with(1, true).with(2, true));
    let k = Kernel::general(&ctx, Matrix::hadamard()).unwrap();
    for index in 0..8 {
        let out = k.apply(&basis(3, index));
        if index & 0b110 == 0b110 {
            assert!((out[index].norm_sqr() - 0.5).abs() < 1e-12);
        } else {
            assert_eq!(out, basis(3, index));
        }
    }
}

// ---------------------------------------------------------------------------
// Multi-wire targets
// ---------------------------------------------------------------------------

#[test]
fn two_wire_general_kernel_matches_dense() {
    // CNOT as a 4x4 matrix on wires 1..3 of a three-wire register.
    let cnot = Matrix::from_permutation(4, |x| if x & 1 == 1 { x ^ 2 } else { x });
    let ctx = KernelContext::new(3, WireRange::new(1, 2)).unwrap();
    let k = Kernel::general(&ctx, cnot.clone()).unwrap();
    let dense = cnot.tensor_product(&Matrix::identity(2));
    for index in 0..8 {
        let expected = dense.apply(&basis(3, index));
        let actual = k.apply(&basis(3, index));
        for (a, b) in actual.iter().zip(&expected) {
            assert!(approx_eq(*a, *b, 1e-12), "index {index}");
        }
    }
}

#[test]
fn permutation_kernel_matches_permutation_matrix() {
    // Increment mod 8 on a three-wire target.
    let ctx = KernelContext::new(4, WireRange::new(1, 3)).unwrap();
    let k = Kernel::permutation(&ctx, Arc::new(|t: u64, _: &[u64]| (t + 7) % 8)).unwrap();
    let general =
        Kernel::general(&ctx, Matrix::from_permutation(8, |x| (x + 1) % 8)).unwrap();
    for index in 0..16 {
        assert_eq!(k.apply(&basis(4, index)), general.apply(&basis(4, index)));
    }
}

// ---------------------------------------------------------------------------
// Cache
// ---------------------------------------------------------------------------

#[test]
fn cache_shares_compiled_kernels() {
    let cache = KernelCache::new(16);
    let ctx = KernelContext::new(3, WireRange::single(2)).unwrap();
    let key = KernelKey::new("H", &ctx);
    let a = cache
        .get_or_try_insert_with(&key, || Kernel::general(&ctx, Matrix::hadamard()))
        .unwrap();
    let b = cache
        .get_or_try_insert_with(&key, || -> Result<Kernel, KernelError> {
            panic!("should not recompile")
        })
        .unwrap();
    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(cache.hits(), 1);
}

#[test]
fn cache_key_distinguishes_controls() {
    let ctx = KernelContext::new(3, WireRange::single(2)).unwrap();
    let plain = KernelKey::new("X", &ctx);
    let controlled = KernelKey::new("X", &ctx.clone().with_controls(ControlMask::NONE.with(0, true)));
    assert_ne!(plain, controlled);
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    /// A gather built from an odd multiplier is a bijection on every target
    /// span and every placement.
    #[test]
    fn odd_multiplier_gather_is_bijective(
        span in 1_usize..=6,
        offset in 0_usize..=2,
        factor in any::<u64>(),
    ) {
        let factor = factor | 1;
        let n = span + offset;
        let modulus = 1u64 << span;
        let ctx = KernelContext::new(n, WireRange::new(offset, span)).unwrap();
        let k = PermutationKernel::new(
            &ctx,
            &[],
            Arc::new(move |t: u64, _: &[u64]| t.wrapping_mul(factor) % modulus),
        )
        .unwrap();
        let mut seen = vec![false; 1 << n];
        for index in 0..1 << n {
            let src = k.source_index(index);
            prop_assert!(!seen[src], "source {} hit twice", src);
            seen[src] = true;
        }
    }

    /// Unitary single-wire kernels preserve the norm.
    #[test]
    fn unitary_kernel_preserves_norm(
        wire in 0_usize..4,
        theta in 0.0_f64..std::f64::consts::TAU,
        amps in prop::collection::vec((-1.0_f64..1.0, -1.0_f64..1.0), 16),
    ) {
        let state: Vec<Complex64> = amps.iter().map(|&(re, im)| Complex64::new(re, im)).collect();
        let ctx = KernelContext::new(4, WireRange::single(wire)).unwrap();
        let gate = &Matrix::hadamard() * &Matrix::phase(theta);
        let k = Kernel::general(&ctx, gate).unwrap();
        let before = norm_sqr(&state);
        let after = norm_sqr(&k.apply(&state));
        prop_assert!((before - after).abs() < 1e-9);
    }
}
