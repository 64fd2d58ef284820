//! Result contracts (C12): plain data shapes consumed by the formatter
//! collaborator (table/CSV/JSON — out of scope for this crate).

/// Result of a single latency measurement (read or write).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatencyResult {
    pub buffer_size: usize,
    pub avg_latency_ns: f64,
    pub accesses: u64,
}

/// Result of a single bandwidth measurement (read or write).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandwidthResult {
    pub buffer_size: usize,
    pub bandwidth_gb_per_s: f64,
    pub bytes_moved: u64,
}

/// Output of the cache-capacity inferrer plus the raw sweep it was derived
/// from. Any of `l1`/`l2`/`l3` may be zero, meaning "not detected with
/// confidence". Ownership of `sweep_sizes`/`sweep_latencies` is plain Rust
/// ownership — there is no separate dispose operation (see DESIGN.md for
/// why this supersedes spec.md's explicit `dispose_cache_info`).
#[derive(Debug, Clone, PartialEq)]
pub struct CacheInfo {
    pub l1: usize,
    pub l2: usize,
    pub l3: usize,
    pub sweep_sizes: Vec<usize>,
    pub sweep_latencies: Vec<f64>,
}

/// Fixed-point default sweep sizes the original CLI's non-auto-detect mode
/// used for a quick latency/bandwidth table (supplemented from
/// `examples/original_source/src/main.c`). A collaborator driver may use
/// these instead of the full auto-detect sweep when it only wants a
/// handful of representative points.
pub const DEFAULT_LATENCY_SIZES: [usize; 8] = [
    16 * 1024,
    32 * 1024,
    128 * 1024,
    512 * 1024,
    4 * 1024 * 1024,
    32 * 1024 * 1024,
    64 * 1024 * 1024,
    256 * 1024 * 1024,
];

pub const DEFAULT_BW_SIZES: [usize; 8] = DEFAULT_LATENCY_SIZES;
