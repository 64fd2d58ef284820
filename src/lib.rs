//! Measurement core for the volatile memory hierarchy: per-core L1/L2,
//! shared L3, and main DRAM latency and bandwidth, plus automatic cache
//! capacity inference from a latency sweep.
//!
//! This crate is the core only — CLI parsing, the interactive TTY menu,
//! table/CSV/JSON formatting, the system-info banner, and the GPU backend
//! are external collaborators that consume the result shapes in
//! [`result`].
//!
//! ## Quick start
//!
//! ```no_run
//! memlat::init().expect("platform init");
//!
//! let read = memlat::read_latency(4 * 1024 * 1024, 10_000).unwrap();
//! println!("{:.2} ns/access at {} bytes", read.avg_latency_ns, read.buffer_size);
//!
//! let info = memlat::detect_cache();
//! println!("L1={} L2={} L3={}", info.l1, info.l2, info.l3);
//! ```
//!
//! ## Single-threaded only
//!
//! The entire core is single-threaded (spec §5): no operation suspends on
//! I/O in a hot path, and concurrent invocation of the measurement kernels
//! from two threads in the same process is not supported — they would
//! contend for core-0 pinning and mutually corrupt cache state.

pub mod alloc;
pub mod bandwidth;
pub mod cache_detect;
pub mod chase;
pub mod config;
pub mod error;
pub mod fence;
pub mod iterplan;
pub mod latency;
pub mod platform;
pub mod result;
pub mod sweep;
pub mod timer;
pub mod warmup;

pub use error::{MembenchError, Result};
pub use result::{BandwidthResult, CacheInfo, LatencyResult, DEFAULT_BW_SIZES, DEFAULT_LATENCY_SIZES};

/// Initialize the platform timer and run the one-shot frequency warmup.
/// Call once at process start, before any measurement function. Idempotent.
pub fn init() -> Result<()> {
    timer::init()?;
    warmup::warmup_once();
    Ok(())
}

/// Measure read-only pointer-chase latency over `size` bytes, averaging
/// `iterations` traversals. Fails with [`MembenchError::InvalidArgument`]
/// when `size` is below the cache line size, or
/// [`MembenchError::OutOfMemory`] on allocation failure.
pub fn read_latency(size: usize, iterations: u64) -> Result<LatencyResult> {
    latency::read_latency(size, iterations)
}

/// Like [`read_latency`], auto-sizing the iteration count to the measured
/// timer resolution.
pub fn read_latency_auto(size: usize) -> Result<LatencyResult> {
    latency::read_latency_auto(size)
}

/// Measure dependent read-write pointer-chase latency over `size` bytes.
/// Same failure modes as [`read_latency`].
pub fn write_latency(size: usize, iterations: u64) -> Result<LatencyResult> {
    latency::write_latency(size, iterations)
}

/// Like [`write_latency`], auto-sizing the iteration count.
pub fn write_latency_auto(size: usize) -> Result<LatencyResult> {
    latency::write_latency_auto(size)
}

/// Measure sequential read bandwidth over `size` bytes. Fails with
/// [`MembenchError::InvalidArgument`] when `size < 8`.
pub fn read_bandwidth(size: usize, iterations: u64) -> Result<BandwidthResult> {
    bandwidth::read_bandwidth(size, iterations)
}

/// Like [`read_bandwidth`], auto-sizing the iteration count.
pub fn read_bandwidth_auto(size: usize) -> Result<BandwidthResult> {
    bandwidth::read_bandwidth_auto(size)
}

/// Measure sequential write bandwidth over `size` bytes. Same failure
/// modes as [`read_bandwidth`].
pub fn write_bandwidth(size: usize, iterations: u64) -> Result<BandwidthResult> {
    bandwidth::write_bandwidth(size, iterations)
}

/// Like [`write_bandwidth`], auto-sizing the iteration count.
pub fn write_bandwidth_auto(size: usize) -> Result<BandwidthResult> {
    bandwidth::write_bandwidth_auto(size)
}

/// Auto-detect the cache hierarchy by sweeping working-set sizes. Never
/// fails fatally: undetected levels are reported as capacity `0`.
pub fn detect_cache() -> CacheInfo {
    sweep::detect_cache()
}

/// Release the sweep arrays inside a [`CacheInfo`]. Rust's ownership model
/// makes this a no-op beyond taking `info` by value and letting it drop —
/// there is no separate free-list to walk — but the operation is kept for
/// contract parity with spec.md §6's external interface list, and so a
/// collaborator can release a `CacheInfo` explicitly rather than relying on
/// scope exit.
pub fn dispose_cache_info(info: CacheInfo) {
    drop(info);
}
