//! Bandwidth kernel (C7): sequential streaming read/write bandwidth.

use crate::alloc::PageBuffer;
use crate::config::{IterationTargets, SweepConfig};
use crate::error::{MembenchError, Result};
use crate::fence::full_fence;
use crate::iterplan::{plan_iterations, Kernel};
use crate::platform;
use crate::result::BandwidthResult;
use log::trace;

const GIB: f64 = 1024.0 * 1024.0 * 1024.0;

/// Cap a requested bandwidth buffer size at `cfg.ram_cap_fraction` of
/// physical RAM, so a sweep never thrashes swap. Per spec.md §9's open
/// question, this cap applies to the bandwidth kernels only — the latency
/// sweep is left uncapped, matching the original C implementation. Returns
/// `requested` unchanged if physical RAM cannot be determined.
pub fn ram_capped_size(requested: usize, cfg: SweepConfig) -> usize {
    let ram = platform::physical_ram_bytes();
    if ram == 0 {
        return requested;
    }
    let cap = (ram as f64 * cfg.ram_cap_fraction) as usize;
    requested.min(cap.max(8))
}

fn word_count(buffer_size: usize) -> Result<usize> {
    if buffer_size < 8 {
        return Err(MembenchError::InvalidArgument {
            reason: format!("buffer_size {buffer_size} must be at least 8 bytes"),
        });
    }
    Ok(buffer_size / 8)
}

fn words_mut(buf: &mut PageBuffer) -> &mut [u64] {
    let bytes = buf.as_mut_slice();
    let count = bytes.len() / 8;
    unsafe { std::slice::from_raw_parts_mut(bytes.as_mut_ptr() as *mut u64, count) }
}

fn words(buf: &PageBuffer) -> &[u64] {
    let bytes = buf.as_slice();
    let count = bytes.len() / 8;
    unsafe { std::slice::from_raw_parts(bytes.as_ptr() as *const u64, count) }
}

/// Measure sequential read bandwidth over `buffer_size` bytes of 64-bit
/// words, summing the buffer `iterations` times.
pub fn read_bandwidth(buffer_size: usize, iterations: u64) -> Result<BandwidthResult> {
    let count = word_count(buffer_size)?;
    let mut buf = PageBuffer::alloc(count * 8)?;
    trace!("read_bandwidth: buffer_size={buffer_size} count={count} iterations={iterations}");

    for (i, w) in words_mut(&mut buf).iter_mut().enumerate() {
        *w = i as u64;
    }

    // Warmup pass: sum everything into a sink so the compiler can't prove
    // the buffer is dead before timing starts.
    {
        let mut sink: u64 = 0;
        for &w in words(&buf) {
            sink = sink.wrapping_add(w);
        }
        std::hint::black_box(sink);
    }

    let words_ref = words(&buf);
    let mut sink: u64 = 0;

    full_fence();
    let start = crate::timer::now_ns();

    for _ in 0..iterations {
        let mut local_sum: u64 = 0;
        for &w in words_ref {
            local_sum = local_sum.wrapping_add(w);
        }
        sink = sink.wrapping_add(std::hint::black_box(local_sum));
    }

    full_fence();
    let end = crate::timer::now_ns();
    std::hint::black_box(sink);

    let total_bytes = iterations * count as u64 * 8;
    let elapsed_s = (end - start) as f64 / 1e9;

    Ok(BandwidthResult {
        buffer_size,
        bandwidth_gb_per_s: (total_bytes as f64 / GIB) / elapsed_s,
        bytes_moved: total_bytes,
    })
}

/// Like [`read_bandwidth`], auto-sizing the iteration count.
pub fn read_bandwidth_auto(buffer_size: usize) -> Result<BandwidthResult> {
    let iters = plan_iterations(
        Kernel::Bandwidth,
        buffer_size,
        platform::cache_line_size(),
        IterationTargets::default(),
    );
    read_bandwidth(buffer_size, iters)
}

/// Measure sequential write bandwidth over `buffer_size` bytes, writing
/// `iter + i` into word `i` on each of `iterations` passes.
pub fn write_bandwidth(buffer_size: usize, iterations: u64) -> Result<BandwidthResult> {
    let count = word_count(buffer_size)?;
    let mut buf = PageBuffer::alloc(count * 8)?;
    trace!("write_bandwidth: buffer_size={buffer_size} count={count} iterations={iterations}");

    let total_bytes = iterations * count as u64 * 8;

    full_fence();
    let start = crate::timer::now_ns();

    {
        let words_ref = words_mut(&mut buf);
        for iter in 0..iterations {
            for (i, w) in words_ref.iter_mut().enumerate() {
                *w = iter + i as u64;
            }
        }
    }

    full_fence();
    let end = crate::timer::now_ns();

    // Read one word back through a volatile reference so the compiler
    // cannot prove the stores are dead and eliminate the loop entirely.
    let check = unsafe { std::ptr::read_volatile(&words(&buf)[count / 2]) };
    std::hint::black_box(check);

    let elapsed_s = (end - start) as f64 / 1e9;

    Ok(BandwidthResult {
        buffer_size,
        bandwidth_gb_per_s: (total_bytes as f64 / GIB) / elapsed_s,
        bytes_moved: total_bytes,
    })
}

/// Like [`write_bandwidth`], auto-sizing the iteration count.
pub fn write_bandwidth_auto(buffer_size: usize) -> Result<BandwidthResult> {
    let iters = plan_iterations(
        Kernel::Bandwidth,
        buffer_size,
        platform::cache_line_size(),
        IterationTargets::default(),
    );
    write_bandwidth(buffer_size, iters)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ensure_timer() {
        let _ = crate::timer::init();
    }

    #[test]
    fn rejects_tiny_buffer() {
        ensure_timer();
        let err = read_bandwidth(4, 10).unwrap_err();
        assert!(matches!(err, MembenchError::InvalidArgument { .. }));
    }

    #[test]
    fn read_bandwidth_is_positive() {
        ensure_timer();
        let r = read_bandwidth(1024 * 1024, 50).unwrap();
        assert!(r.bandwidth_gb_per_s > 0.0);
        assert_eq!(r.bytes_moved, 50 * 1024 * 1024);
    }

    #[test]
    fn write_bandwidth_is_positive() {
        ensure_timer();
        let r = write_bandwidth(1024 * 1024, 50).unwrap();
        assert!(r.bandwidth_gb_per_s > 0.0);
    }
}
