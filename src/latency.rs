//! Latency kernel (C6): read and write pointer-chase latency measurements.
//!
//! Both variants share the same chase setup; only the per-node timed body
//! differs. See `chase.rs` for why one node per cache line is mandatory.

use crate::alloc::PageBuffer;
use crate::chase::{self, SCRATCH_OFFSET};
use crate::config::{IterationTargets, CHASE_SEED};
use crate::error::{MembenchError, Result};
use crate::fence::full_fence;
use crate::iterplan::{plan_iterations, Kernel};
use crate::platform;
use crate::result::LatencyResult;
use log::trace;

fn node_count_for(buffer_size: usize, cache_line_size: usize) -> usize {
    (buffer_size / cache_line_size).max(2)
}

fn setup_chase(buffer_size: usize, cache_line_size: usize) -> Result<(PageBuffer, usize)> {
    if buffer_size < cache_line_size {
        return Err(MembenchError::InvalidArgument {
            reason: format!(
                "buffer_size {buffer_size} is below the cache line size {cache_line_size}"
            ),
        });
    }

    let node_count = node_count_for(buffer_size, cache_line_size);
    let alloc_size = node_count * cache_line_size;
    let buf = PageBuffer::alloc(alloc_size)?;

    chase::build_cycle(buf.as_mut_ptr(), node_count, cache_line_size, CHASE_SEED);

    // Warm the chain: one full traversal loads every node into cache and
    // trains the TLB before timing starts.
    let mut p = buf.as_mut_ptr();
    for _ in 0..node_count {
        p = unsafe { chase::chase_load(p) };
    }
    full_fence();
    std::hint::black_box(p);

    Ok((buf, node_count))
}

/// Measure read-only pointer-chase latency over `buffer_size` bytes,
/// averaging `iterations` full traversals of the chain.
pub fn read_latency(buffer_size: usize, iterations: u64) -> Result<LatencyResult> {
    let cl = platform::cache_line_size();
    let (buf, node_count) = setup_chase(buffer_size, cl)?;
    trace!("read_latency: buffer_size={buffer_size} node_count={node_count} iterations={iterations}");

    let total_accesses = iterations * node_count as u64;
    let mut p = buf.as_mut_ptr();

    full_fence();
    let start = crate::timer::now_ns();

    for _ in 0..iterations {
        for _ in 0..node_count {
            p = unsafe { chase::chase_load(p) };
        }
    }

    full_fence();
    let end = crate::timer::now_ns();
    std::hint::black_box(p);

    Ok(LatencyResult {
        buffer_size,
        avg_latency_ns: (end - start) as f64 / total_accesses as f64,
        accesses: total_accesses,
    })
}

/// Like [`read_latency`], auto-sizing the iteration count to the timer's
/// resolution instead of taking one explicitly.
pub fn read_latency_auto(buffer_size: usize) -> Result<LatencyResult> {
    let cl = platform::cache_line_size();
    let iters = plan_iterations(Kernel::Latency, buffer_size, cl, IterationTargets::default());
    read_latency(buffer_size, iters)
}

/// Measure write-latency: at each hop, write to the node's scratch word
/// (depending on the loop counter so it can't be hoisted) before following
/// the pointer. The read-after-write on the same line forces it into this
/// core's L1 in exclusive state on every hop, and the dependent load
/// afterward prevents the store buffer from masking the cost.
pub fn write_latency(buffer_size: usize, iterations: u64) -> Result<LatencyResult> {
    let cl = platform::cache_line_size();
    if cl < SCRATCH_OFFSET + std::mem::size_of::<usize>() {
        return Err(MembenchError::InvalidArgument {
            reason: "cache line too small to hold a scratch word".to_string(),
        });
    }
    let (buf, node_count) = setup_chase(buffer_size, cl)?;
    trace!("write_latency: buffer_size={buffer_size} node_count={node_count} iterations={iterations}");

    // Warmup already ran inside setup_chase for the read path; additionally
    // warm the scratch word writes so the first timed write isn't a cold
    // line fault that setup_chase's read-only warmup didn't trigger.
    {
        let mut p = buf.as_mut_ptr();
        for i in 0..node_count {
            unsafe {
                chase::write_scratch(p, i ^ 1);
                p = chase::chase_load(p);
            }
        }
        full_fence();
    }

    let total_accesses = iterations * node_count as u64;
    let mut p = buf.as_mut_ptr();

    full_fence();
    let start = crate::timer::now_ns();

    for iter in 0..iterations {
        for i in 0..node_count as u64 {
            unsafe {
                chase::write_scratch(p, (iter + i) as usize);
                p = chase::chase_load(p);
            }
        }
    }

    full_fence();
    let end = crate::timer::now_ns();
    std::hint::black_box(p);

    Ok(LatencyResult {
        buffer_size,
        avg_latency_ns: (end - start) as f64 / total_accesses as f64,
        accesses: total_accesses,
    })
}

/// Like [`write_latency`], auto-sizing the iteration count.
pub fn write_latency_auto(buffer_size: usize) -> Result<LatencyResult> {
    let cl = platform::cache_line_size();
    let iters = plan_iterations(Kernel::Latency, buffer_size, cl, IterationTargets::default());
    write_latency(buffer_size, iters)
}
