//! Column-by-column state-vector evaluation.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use ketgrid_gates::{Gate, GateRegistry, GateRole};
use ketgrid_kernel::{ControlMask, Kernel, KernelCache, KernelContext, KernelKey, KetKernel};
use ketgrid_math::{Complex64, ONE, ZERO};
use tracing::{debug, instrument, trace, warn};

use crate::circuit::{Circuit, Column, Placement};
use crate::config::{HistoryMode, SimConfig};
use crate::error::{SimError, SimResult};
use crate::stats::{AmplitudeVector, CircuitStats, ColumnStats};
use crate::time_cache::TimeCache;

/// Shared flag for abandoning an in-flight evaluation.
///
/// Checked between columns. Cancelling never touches shared caches, so a
/// newer evaluation is unaffected.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    /// A flag that is not set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// State-vector evaluator.
///
/// Each evaluation owns its amplitude buffers. The kernel cache and the
/// time cache are the only state shared between evaluations, so a
/// `Simulator` can be used from several threads at once.
#[derive(Debug)]
pub struct Simulator {
    registry: Arc<GateRegistry>,
    config: SimConfig,
    kernels: KernelCache,
    timed: TimeCache<KernelKey, Arc<Kernel>>,
}

impl Simulator {
    /// Create a simulator. The configuration is validated.
    pub fn new(registry: Arc<GateRegistry>, config: SimConfig) -> SimResult<Self> {
        config.validate()?;
        Ok(Self {
            kernels: KernelCache::new(config.evaluation.kernel_cache_capacity),
            timed: TimeCache::new(config.time),
            registry,
            config,
        })
    }

    /// A simulator over the standard gates with default settings.
    pub fn standard() -> SimResult<Self> {
        Self::new(Arc::new(GateRegistry::standard()?), SimConfig::default())
    }

    /// Gate lookup table.
    pub fn registry(&self) -> &Arc<GateRegistry> {
        &self.registry
    }

    /// Active configuration.
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Compiled time-independent kernels.
    pub fn kernel_cache(&self) -> &KernelCache {
        &self.kernels
    }

    /// Compiled time-dependent kernels.
    pub fn time_cache(&self) -> &TimeCache<KernelKey, Arc<Kernel>> {
        &self.timed
    }

    /// Parse circuit text against this simulator's registry and limits.
    pub fn parse(&self, text: &str) -> SimResult<Circuit> {
        Circuit::from_json_with_limits(text, &self.registry, &self.config.limits)
    }

    /// Evaluate `circuit` at `elapsed` time since the animation started.
    pub fn evaluate(&self, circuit: &Circuit, elapsed: Duration) -> SimResult<CircuitStats> {
        self.evaluate_with_cancel(circuit, elapsed, &CancelFlag::new())
    }

    /// Evaluate `circuit`, giving up before the next column once `cancel`
    /// is set.
    #[instrument(skip(self, circuit, cancel), fields(wires = circuit.num_wires, columns = circuit.columns.len()))]
    pub fn evaluate_with_cancel(
        &self,
        circuit: &Circuit,
        elapsed: Duration,
        cancel: &CancelFlag,
    ) -> SimResult<CircuitStats> {
        let started = Instant::now();
        self.check_capacity(circuit.num_wires)?;
        circuit.validate()?;

        let n = circuit.num_wires;
        let time = self.timed.phase_of(self.timed.bucket_of(elapsed));
        if circuit.is_time_dependent() {
            let purged = self.timed.purge_stale(elapsed);
            if purged > 0 {
                trace!(purged, "dropped stale time-dependent kernels");
            }
        }

        let mut initial = vec![ZERO; 1 << n];
        initial[0] = ONE;
        let mut current = AmplitudeVector::new(n, initial);

        let keep_all = self.config.evaluation.history == HistoryMode::Full;
        let mut history = vec![current.clone()];
        let mut column_stats = Vec::with_capacity(circuit.columns.len());

        for (c, column) in circuit.columns.iter().enumerate() {
            if cancel.is_cancelled() {
                debug!(column = c, "evaluation cancelled");
                return Err(SimError::Cancelled { column: c });
            }

            if let Some(next) = self.apply_column(n, c, column, current.as_slice(), elapsed, time)? {
                current = AmplitudeVector::new(n, next);
            }
            if let Some(index) = first_non_finite(current.as_slice()) {
                warn!(column = c, index, "non-finite amplitude");
                return Err(SimError::NumericalInstability { column: c, index });
            }

            column_stats.push(ColumnStats::measure(c, current.as_slice(), n));
            if keep_all {
                history.push(current.clone());
            }
        }
        if !keep_all {
            history.push(current);
        }

        let stats = CircuitStats::new(n, time, self.config.evaluation.history, history, column_stats);
        debug!(
            survival = stats.survival_probability(),
            elapsed_ms = started.elapsed().as_secs_f64() * 1000.0,
            "evaluated circuit"
        );
        Ok(stats)
    }

    fn check_capacity(&self, wires: usize) -> SimResult<()> {
        let limits = &self.config.limits;
        if wires > limits.max_wire_count {
            return Err(SimError::TooManyWires {
                wires,
                max: limits.max_wire_count,
            });
        }
        let min = limits.min_wire_count;
        if wires < min {
            return Err(SimError::NoWires { wires, min });
        }
        Ok(())
    }

    /// Apply every state-acting placement of `column`. Returns `None` when
    /// nothing changed the state.
    fn apply_column(
        &self,
        n: usize,
        c: usize,
        column: &Column,
        state: &[Complex64],
        elapsed: Duration,
        time: f64,
    ) -> SimResult<Option<Vec<Complex64>>> {
        let controls = column_controls(column);
        let mut next: Option<Vec<Complex64>> = None;
        for placement in column.operations() {
            let ctx = placement_context(n, c, column, placement, controls, time)?;
            let kernel = self.kernel_for(&placement.gate, &ctx, elapsed)?;
            if kernel.is_identity() {
                continue;
            }
            let input = next.as_deref().unwrap_or(state);
            next = Some(kernel.apply(input));
        }
        Ok(next)
    }

    fn kernel_for(
        &self,
        gate: &Gate,
        ctx: &KernelContext,
        elapsed: Duration,
    ) -> SimResult<Arc<Kernel>> {
        let key = KernelKey::new(gate.serialized_id(), ctx);
        if gate.is_time_dependent() {
            let bucket = self.timed.bucket_of(elapsed).bucket;
            let kernel = self.timed.get_or_try_compute(
                key.with_time_bucket(bucket),
                elapsed,
                |phase| gate.kernel(&ctx.clone().with_time(phase)).map(Arc::new),
            )?;
            Ok(kernel)
        } else {
            Ok(self.kernels.get_or_try_insert_with(&key, || gate.kernel(ctx))?)
        }
    }
}

fn column_controls(column: &Column) -> ControlMask {
    column
        .controls()
        .fold(ControlMask::NONE, |mask, p| match p.gate.role() {
            GateRole::Control { desired } => p
                .range()
                .wires()
                .fold(mask, |mask, wire| mask.with(wire, desired)),
            _ => mask,
        })
}

fn placement_context(
    n: usize,
    c: usize,
    column: &Column,
    placement: &Placement,
    controls: ControlMask,
    time: f64,
) -> SimResult<KernelContext> {
    let mut ctx = KernelContext::new(n, placement.range())?
        .with_controls(controls)
        .with_time(time);
    for &key in placement.gate.required_inputs() {
        let range = column.input(key).ok_or_else(|| SimError::MissingInput {
            column: c,
            gate: placement.gate.serialized_id().to_string(),
            key,
        })?;
        ctx = ctx.with_input(key, range)?;
    }
    Ok(ctx)
}

fn first_non_finite(state: &[Complex64]) -> Option<usize> {
    state
        .iter()
        .position(|a| !a.re.is_finite() || !a.im.is_finite())
}
