//! Compile-once kernel cache.
//!
//! Circuits are re-evaluated on every edit and every animation frame, but the
//! set of distinct placements changes slowly. Kernels are keyed by everything
//! that influences their construction and shared via `Arc`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use rustc_hash::FxHashMap;
use tracing::trace;

use crate::context::{InputRange, KernelContext};
use crate::kernel::Kernel;
use crate::wires::{ControlMask, WireRange};

/// Everything that determines a compiled kernel.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KernelKey {
    /// Serialized id of the gate.
    pub gate_id: String,
    /// Register width.
    pub num_wires: usize,
    /// Gate body placement.
    pub target: WireRange,
    /// Column controls.
    pub controls: ControlMask,
    /// Column input registers.
    pub inputs: Vec<InputRange>,
    /// Time bucket within the cycle, for time-dependent gates.
    pub time_bucket: Option<u64>,
}

impl KernelKey {
    /// Key for `gate_id` placed according to `ctx`.
    pub fn new(gate_id: impl Into<String>, ctx: &KernelContext) -> Self {
        Self {
            gate_id: gate_id.into(),
            num_wires: ctx.num_wires,
            target: ctx.target,
            controls: ctx.controls,
            inputs: ctx.inputs.clone(),
            time_bucket: None,
        }
    }

    /// Attach a time bucket.
    #[must_use]
    pub fn with_time_bucket(mut self, bucket: u64) -> Self {
        self.time_bucket = Some(bucket);
        self
    }
}

/// Bounded, thread-safe map from [`KernelKey`] to compiled kernels.
///
/// When full, the cache is cleared before inserting. Compilation runs outside
/// the lock, so two threads missing on the same key both compile and the
/// second insert wins; kernels for equal keys are interchangeable.
#[derive(Debug)]
pub struct KernelCache {
    entries: Mutex<FxHashMap<KernelKey, Arc<Kernel>>>,
    capacity: usize,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl KernelCache {
    /// Create a cache holding at most `capacity` kernels.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Mutex::new(FxHashMap::default()),
            capacity: capacity.max(1),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Look up `key`, compiling with `compile` on a miss.
    pub fn get_or_try_insert_with<E>(
        &self,
        key: &KernelKey,
        compile: impl FnOnce() -> Result<Kernel, E>,
    ) -> Result<Arc<Kernel>, E> {
        if let Some(kernel) = self.get(key) {
            return Ok(kernel);
        }
        self.misses.fetch_add(1, Ordering::Relaxed);
        trace!(gate = %key.gate_id, target = %key.target, "kernel cache miss");

        let kernel = Arc::new(compile()?);
        let mut entries = self
            .entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if entries.len() >= self.capacity && !entries.contains_key(key) {
            entries.clear();
        }
        entries.insert(key.clone(), Arc::clone(&kernel));
        Ok(kernel)
    }

    /// Look up `key` without compiling. Counts a hit when found.
    pub fn get(&self, key: &KernelKey) -> Option<Arc<Kernel>> {
        let entries = self
            .entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let found = entries.get(key).cloned();
        if found.is_some() {
            self.hits.fetch_add(1, Ordering::Relaxed);
        }
        found
    }

    /// Number of cached kernels.
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every cached kernel. Counters are kept.
    pub fn clear(&self) {
        self.entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clear();
    }

    /// Lookups answered from the cache.
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    /// Lookups that required compilation.
    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    /// Fraction of lookups answered from the cache, 0 when nothing was looked up.
    pub fn hit_rate(&self) -> f64 {
        let hits = self.hits() as f64;
        let total = hits + self.misses() as f64;
        if total == 0.0 { 0.0 } else { hits / total }
    }
}

impl Default for KernelCache {
    fn default() -> Self {
        Self::new(512)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::KernelError;

    fn key(gate: &str, wire: usize) -> KernelKey {
        let ctx = KernelContext::new(4, WireRange::single(wire)).unwrap();
        KernelKey::new(gate, &ctx)
    }

    #[test]
    fn test_compiles_once() {
        let cache = KernelCache::new(8);
        let mut compiled = 0;
        for _ in 0..3 {
            cache
                .get_or_try_insert_with(&key("X", 0), || {
                    compiled += 1;
                    Ok::<_, KernelError>(Kernel::identity())
                })
                .unwrap();
        }
        assert_eq!(compiled, 1);
        assert_eq!(cache.misses(), 1);
        assert_eq!(cache.hits(), 2);
        assert!((cache.hit_rate() - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_distinct_placements_are_distinct_entries() {
        let cache = KernelCache::new(8);
        for wire in 0..3 {
            cache
                .get_or_try_insert_with(&key("H", wire), || Ok::<_, KernelError>(Kernel::identity()))
                .unwrap();
        }
        assert_eq!(cache.len(), 3);
        assert_ne!(key("H", 0), key("H", 0).with_time_bucket(3));
    }

    #[test]
    fn test_capacity_bound() {
        let cache = KernelCache::new(2);
        for wire in 0..4 {
            cache
                .get_or_try_insert_with(&key("Z", wire), || Ok::<_, KernelError>(Kernel::identity()))
                .unwrap();
        }
        assert!(cache.len() <= 2);
    }

    #[test]
    fn test_failed_compile_is_not_cached() {
        let cache = KernelCache::new(2);
        let err = cache
            .get_or_try_insert_with(&key("*A1", 0), || Err(KernelError::MissingInput('A')))
            .unwrap_err();
        assert!(matches!(err, KernelError::MissingInput('A')));
        assert!(cache.is_empty());
        assert_eq!(cache.hit_rate(), 0.0);
    }
}
