//! Construction-time cross-check of a gate's declared effect against its kernel.
//!
//! Gates are checked on a small register laid out as
//!
//! ```text
//! wire 0            control (desired ON)
//! wires 1..1+s      target
//! next s wires      input register, one block per required input
//! ```
//!
//! so the check also covers control handling and input plumbing. Small
//! gates are checked exhaustively; wide permutation families fall back to a
//! seeded random sample plus edge values.

use num_complex::Complex64;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rustc_hash::FxHashMap;

use ketgrid_kernel::{ControlMask, Kernel, KernelContext, KetKernel, WireRange};
use ketgrid_math::{DEFAULT_TOLERANCE, Matrix, ONE, ZERO, approx_eq};

use crate::error::{GateError, GateResult};
use crate::gate::{Gate, GateEffect, MAX_GATE_SPAN, PermutationFn};

/// Widest register on which dense amplitude checks are run.
const DENSE_LIMIT: usize = 10;

/// Target spans up to this are checked over every value.
const EXHAUSTIVE_SPAN: usize = 10;

/// Input registers totalling up to this many bits are checked over every value.
const EXHAUSTIVE_INPUT_BITS: usize = 6;

const SAMPLED_VALUES: usize = 256;
const SAMPLED_INPUT_TUPLES: usize = 8;
const SAMPLE_SEED: u64 = 0x6b65_7467_7269_64;

/// Cycle fractions at which time-dependent matrices are checked.
const TIME_SAMPLES: [f64; 6] = [0.0, 0.125, 0.3, 0.5, 0.75, 0.9];

/// Validate a freshly built gate.
pub(crate) fn check_gate(gate: &Gate) -> GateResult<()> {
    let span = gate.span();
    if span == 0 || span > MAX_GATE_SPAN {
        return Err(GateError::InvalidSpan {
            id: gate.serialized_id().to_string(),
            span,
        });
    }
    if gate.role().acts_on_state() && !gate.has_kernel() {
        return Err(GateError::MissingKernel(gate.serialized_id().to_string()));
    }

    match gate.effect() {
        GateEffect::Matrix(m) => check_matrix(gate, m, 0.0),
        GateEffect::TimeMatrix(f) => TIME_SAMPLES
            .iter()
            .try_for_each(|&t| check_matrix(gate, &f(t), t)),
        GateEffect::Permutation(f) => check_permutation(gate, f),
        GateEffect::None => Ok(()),
    }
}

/// Register layout used for validation.
struct Layout {
    num_wires: usize,
    target: WireRange,
    inputs: Vec<WireRange>,
}

impl Layout {
    fn for_gate(gate: &Gate) -> Self {
        let span = gate.span();
        let target = WireRange::new(1, span);
        let inputs = (0..gate.required_inputs().len())
            .map(|k| WireRange::new(1 + span * (k + 1), span))
            .collect::<Vec<_>>();
        Self {
            num_wires: 1 + span * (1 + inputs.len()),
            target,
            inputs,
        }
    }

    fn context(&self, gate: &Gate, time: f64) -> GateResult<KernelContext> {
        let mut ctx = KernelContext::new(self.num_wires, self.target)?
            .with_controls(ControlMask::NONE.with(0, true))
            .with_time(time);
        for (&key, &range) in gate.required_inputs().iter().zip(&self.inputs) {
            ctx = ctx.with_input(key, range)?;
        }
        Ok(ctx)
    }

    fn compose(&self, control: bool, target: u64, inputs: &[u64]) -> usize {
        let mut index = usize::from(control);
        index = self.target.write(index, target as usize);
        for (range, &value) in self.inputs.iter().zip(inputs) {
            index = range.write(index, value as usize);
        }
        index
    }
}

fn basis(num_wires: usize, index: usize) -> Vec<Complex64> {
    let mut v = vec![ZERO; 1 << num_wires];
    v[index] = ONE;
    v
}

fn mismatch(gate: &Gate, detail: String) -> GateError {
    GateError::EffectMismatch {
        id: gate.serialized_id().to_string(),
        detail,
    }
}

fn check_matrix(gate: &Gate, matrix: &Matrix, time: f64) -> GateResult<()> {
    let dim = 1usize << gate.span();
    if matrix.rows() != dim || matrix.cols() != dim {
        return Err(GateError::MatrixSize {
            id: gate.serialized_id().to_string(),
            span: gate.span(),
            rows: matrix.rows(),
            cols: matrix.cols(),
        });
    }
    let layout = Layout::for_gate(gate);
    if layout.num_wires > DENSE_LIMIT {
        return Err(mismatch(
            gate,
            format!("{} wires is too wide for a dense check", layout.num_wires),
        ));
    }
    let kernel = gate.kernel(&layout.context(gate, time)?)?;

    for index in 0..1usize << layout.num_wires {
        let actual = kernel.apply(&basis(layout.num_wires, index));
        let mut expected = vec![ZERO; actual.len()];
        if index & 1 == 0 {
            expected[index] = ONE;
        } else {
            let col = layout.target.read(index);
            for row in 0..dim {
                expected[layout.target.write(index, row)] = matrix.get(row, col);
            }
        }
        if let Some((out, (a, e))) = actual
            .iter()
            .zip(&expected)
            .enumerate()
            .find(|(_, (a, e))| !approx_eq(**a, **e, DEFAULT_TOLERANCE))
        {
            return Err(mismatch(
                gate,
                format!("t={time}: basis {index:#b} gives {a} at {out:#b}, expected {e}"),
            ));
        }
    }
    Ok(())
}

/// Whether `kernel` moves the amplitude at `from` to `to`.
fn moves_to(kernel: &Kernel, num_wires: usize, from: usize, to: usize) -> Option<bool> {
    match kernel {
        Kernel::Permutation(k) => Some(k.source_index(to) == from),
        Kernel::Identity => Some(from == to),
        Kernel::General(_) if num_wires <= DENSE_LIMIT => {
            let out = kernel.apply(&basis(num_wires, from));
            let total: f64 = out.iter().map(|a| a.norm_sqr()).sum();
            Some(approx_eq(out[to], ONE, DEFAULT_TOLERANCE) && (total - 1.0).abs() <= DEFAULT_TOLERANCE)
        }
        Kernel::General(_) => None,
    }
}

fn edge_values(modulus: u64) -> [u64; 4] {
    [0, 1, modulus - 1, modulus / 2]
}

fn sample_values(rng: &mut StdRng, bits: usize, exhaustive_up_to: usize, count: usize) -> Vec<u64> {
    let modulus = 1u64 << bits;
    if bits <= exhaustive_up_to {
        return (0..modulus).collect();
    }
    let mut values = edge_values(modulus).to_vec();
    values.extend((0..count).map(|_| rng.gen_range(0..modulus)));
    values.sort_unstable();
    values.dedup();
    values
}

fn input_tuples(rng: &mut StdRng, span: usize, count: usize) -> Vec<Vec<u64>> {
    if count == 0 {
        return vec![Vec::new()];
    }
    let modulus = 1u64 << span;
    if span * count <= EXHAUSTIVE_INPUT_BITS {
        let mut tuples = vec![Vec::new()];
        for _ in 0..count {
            tuples = tuples
                .into_iter()
                .flat_map(|t| {
                    (0..modulus).map(move |v| {
                        let mut next = t.clone();
                        next.push(v);
                        next
                    })
                })
                .collect();
        }
        return tuples;
    }
    let mut tuples: Vec<Vec<u64>> = edge_values(modulus)
        .iter()
        .map(|&v| vec![v; count])
        .collect();
    tuples.extend(
        (0..SAMPLED_INPUT_TUPLES).map(|_| (0..count).map(|_| rng.gen_range(0..modulus)).collect()),
    );
    tuples
}

fn check_permutation(gate: &Gate, f: &PermutationFn) -> GateResult<()> {
    let span = gate.span();
    let modulus = 1u64 << span;
    let layout = Layout::for_gate(gate);
    let kernel = gate.kernel(&layout.context(gate, 0.0)?)?;
    let mut rng = StdRng::seed_from_u64(SAMPLE_SEED);

    let tuples = input_tuples(&mut rng, span, gate.required_inputs().len());
    for inputs in &tuples {
        let xs = sample_values(&mut rng, span, EXHAUSTIVE_SPAN, SAMPLED_VALUES);
        let mut preimages: FxHashMap<u64, u64> = FxHashMap::default();
        for &x in &xs {
            let y = f(x, inputs);
            if y >= modulus {
                return Err(mismatch(
                    gate,
                    format!("declared permutation maps {x} to {y}, outside 0..{modulus}"),
                ));
            }
            if let Some(first) = preimages.insert(y, x) {
                return Err(GateError::NotBijective {
                    id: gate.serialized_id().to_string(),
                    first,
                    second: x,
                    image: y,
                });
            }

            let from = layout.compose(true, x, inputs);
            let to = layout.compose(true, y, inputs);
            match moves_to(&kernel, layout.num_wires, from, to) {
                Some(true) => {}
                Some(false) => {
                    return Err(mismatch(
                        gate,
                        format!("inputs {inputs:?}: kernel does not move {x} to {y}"),
                    ));
                }
                None => {
                    return Err(mismatch(
                        gate,
                        "general kernel too wide to check against a permutation".to_string(),
                    ));
                }
            }

            let blocked = layout.compose(false, x, inputs);
            if moves_to(&kernel, layout.num_wires, blocked, blocked) == Some(false) {
                return Err(mismatch(
                    gate,
                    format!("inputs {inputs:?}: kernel ignores an unmet control at {x}"),
                ));
            }
        }
    }
    Ok(())
}
