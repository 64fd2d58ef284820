//! Sweep orchestrator (C11): generate logarithmically-spaced working-set
//! sizes, pin to a single core, run the read-latency kernel at each size,
//! and hand the samples to the cache-capacity inferrer.

use crate::cache_detect::{self, CacheEstimate};
use crate::config::{IterationTargets, SweepConfig};
use crate::iterplan::{plan_iterations, Kernel};
use crate::latency;
use crate::platform;
use crate::result::CacheInfo;
use log::{debug, warn};

/// Generate sizes from `cfg.min_size_bytes` to `cfg.max_size_bytes`,
/// multiplying by `2^(1/steps_per_octave)` each step, deduplicating
/// consecutive sizes that round to the same byte count.
pub fn generate_sizes(cfg: &SweepConfig) -> Vec<usize> {
    let factor = 2f64.powf(1.0 / cfg.steps_per_octave as f64);
    let mut sizes = Vec::new();
    let mut sz = cfg.min_size_bytes as f64;
    let mut prev = 0usize;

    while sz <= cfg.max_size_bytes as f64 {
        let bytes = sz as usize;
        if bytes != prev {
            sizes.push(bytes);
            prev = bytes;
        }
        sz *= factor;
    }

    sizes
}

/// Run the full auto-detect sweep: pin to core 0, measure read latency at
/// every generated size, restore affinity, and infer cache capacities.
/// Never fails fatally — a sample that errors is recorded as a `-1.0`
/// sentinel and excluded from the inference.
pub fn detect_cache() -> CacheInfo {
    detect_cache_with_config(SweepConfig::default())
}

pub fn detect_cache_with_config(cfg: SweepConfig) -> CacheInfo {
    let sizes = generate_sizes(&cfg);
    let cache_line_size = platform::cache_line_size();
    let targets = IterationTargets::default();

    debug!(
        "sweeping {} buffer sizes from {} KiB to {} MiB",
        sizes.len(),
        sizes.first().copied().unwrap_or(0) / 1024,
        sizes.last().copied().unwrap_or(0) / (1024 * 1024)
    );

    let guard = platform::set_affinity_single_core(0);

    let latencies: Vec<f64> = sizes
        .iter()
        .map(|&size| {
            let iters = plan_iterations(Kernel::CacheSweep, size, cache_line_size, targets);
            match latency::read_latency(size, iters) {
                Ok(r) => r.avg_latency_ns,
                Err(e) => {
                    warn!("sample at {size} bytes failed: {e}; recording sentinel");
                    -1.0
                }
            }
        })
        .collect();

    platform::restore_affinity(guard);

    let CacheEstimate { l1, l2, l3 } = cache_detect::detect_boundaries(&sizes, &latencies, cfg);

    CacheInfo {
        l1,
        l2,
        l3,
        sweep_sizes: sizes,
        sweep_latencies: latencies,
    }
}
