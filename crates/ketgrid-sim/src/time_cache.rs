//! Quantized memoization for time-dependent values.
//!
//! Animated gates only need a bounded number of distinguishable phases per
//! cycle. [`TimeCache`] maps elapsed time to a [`TimeBucket`] and keeps one
//! computed value per key for the current bucket.

use std::hash::Hash;
use std::sync::Mutex;
use std::time::Duration;

use rustc_hash::FxHashMap;
use tracing::trace;

use crate::config::TimeConfig;

/// Position of an instant on the animation timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimeBucket {
    /// Completed cycles since the start of the timeline.
    pub cycle: u64,
    /// Bucket within the cycle, in `0..granularity`.
    pub bucket: u64,
}

/// Thread-safe cache of values computed per `(key, time bucket)`.
///
/// Within one bucket every lookup of a key returns a clone of the same
/// stored value. An entry computed for another bucket, including the same
/// bucket of an earlier cycle, is recomputed on access.
#[derive(Debug)]
pub struct TimeCache<K, V> {
    config: TimeConfig,
    entries: Mutex<FxHashMap<K, (TimeBucket, V)>>,
}

impl<K, V> TimeCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    /// Create an empty cache. A zero cycle length or granularity is treated
    /// as one.
    pub fn new(config: TimeConfig) -> Self {
        Self {
            config: TimeConfig {
                cycle_duration_ms: config.cycle_duration_ms.max(1),
                granularity: config.granularity.max(1),
            },
            entries: Mutex::new(FxHashMap::default()),
        }
    }

    /// Cycle settings in use.
    pub fn config(&self) -> TimeConfig {
        self.config
    }

    /// Bucket containing `elapsed`.
    ///
    /// `bucket = floor(ms_within_cycle / cycle_ms * granularity)`, so the
    /// buckets of one cycle partition it into equal slices.
    pub fn bucket_of(&self, elapsed: Duration) -> TimeBucket {
        let cycle_ms = u128::from(self.config.cycle_duration_ms);
        let ms = elapsed.as_millis();
        let within = ms % cycle_ms;
        let bucket = within * u128::from(self.config.granularity) / cycle_ms;
        TimeBucket {
            cycle: u64::try_from(ms / cycle_ms).unwrap_or(u64::MAX),
            bucket: bucket as u64,
        }
    }

    /// Quantized cycle fraction of `bucket`, in `[0, 1)`.
    pub fn phase_of(&self, bucket: TimeBucket) -> f64 {
        bucket.bucket as f64 / self.config.granularity as f64
    }

    /// Value for `key` at `elapsed`, computing it with `compute` if the
    /// stored one belongs to another bucket.
    ///
    /// `compute` receives the quantized phase and runs outside the lock.
    pub fn get_or_compute(&self, key: K, elapsed: Duration, compute: impl FnOnce(f64) -> V) -> V {
        match self.get_or_try_compute::<std::convert::Infallible>(key, elapsed, |phase| {
            Ok(compute(phase))
        }) {
            Ok(value) => value,
            Err(never) => match never {},
        }
    }

    /// Fallible form of [`get_or_compute`](Self::get_or_compute). Errors are
    /// not cached.
    pub fn get_or_try_compute<E>(
        &self,
        key: K,
        elapsed: Duration,
        compute: impl FnOnce(f64) -> Result<V, E>,
    ) -> Result<V, E> {
        let stamp = self.bucket_of(elapsed);
        {
            let entries = self.lock();
            if let Some((at, value)) = entries.get(&key) {
                if *at == stamp {
                    return Ok(value.clone());
                }
            }
        }

        trace!(cycle = stamp.cycle, bucket = stamp.bucket, "time cache miss");
        let value = compute(self.phase_of(stamp))?;

        let mut entries = self.lock();
        // A concurrent caller may have filled this bucket first; keep its
        // value so every caller in the bucket sees the same one.
        if let Some((at, existing)) = entries.get(&key) {
            if *at == stamp {
                return Ok(existing.clone());
            }
        }
        entries.insert(key, (stamp, value.clone()));
        Ok(value)
    }

    /// Drop every entry not computed for the bucket containing `elapsed`.
    /// Returns the number of entries removed.
    pub fn purge_stale(&self, elapsed: Duration) -> usize {
        let stamp = self.bucket_of(elapsed);
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|_, (at, _)| *at == stamp);
        before - entries.len()
    }

    /// Number of stored entries, stale ones included.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FxHashMap<K, (TimeBucket, V)>> {
        self.entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}
