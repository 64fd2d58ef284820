//! Auto-iteration planner (C9): choose iteration counts so each measurement
//! runs well above timer resolution, even for buffers tiny enough to
//! traverse in nanoseconds.

use crate::config::IterationTargets;

/// Which kernel an iteration count is being planned for, since each has a
/// different "elements per iteration" divisor (spec.md §4.8 table).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kernel {
    Latency,
    Bandwidth,
    CacheSweep,
}

/// Iterations to run `kernel` over a `buffer_size`-byte working set so the
/// total element-visits reach the per-kernel target, never below the
/// per-kernel minimum.
pub fn plan_iterations(
    kernel: Kernel,
    buffer_size: usize,
    cache_line_size: usize,
    targets: IterationTargets,
) -> u64 {
    let (elements_per_iter, target_total, min_iters) = match kernel {
        Kernel::Latency => (
            (buffer_size / cache_line_size).max(1) as u64,
            targets.latency_total_accesses,
            targets.min_iterations,
        ),
        Kernel::Bandwidth => (
            (buffer_size / 8).max(1) as u64,
            targets.bandwidth_total_elements,
            targets.min_iterations,
        ),
        Kernel::CacheSweep => (
            (buffer_size / cache_line_size).max(1) as u64,
            targets.sweep_total_accesses,
            4,
        ),
    };

    let iters = target_total / elements_per_iter;
    iters.max(min_iters)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiny_buffer_gets_many_iterations() {
        let targets = IterationTargets::default();
        let iters = plan_iterations(Kernel::Latency, 1024, 64, targets);
        // 1024/64 = 16 nodes/iter; 20e6/16 ~= 1.25M iterations.
        assert!(iters > 1_000_000);
    }

    #[test]
    fn huge_buffer_never_drops_below_minimum() {
        let targets = IterationTargets::default();
        let iters = plan_iterations(Kernel::Latency, 512 * 1024 * 1024, 64, targets);
        assert!(iters >= targets.min_iterations);
    }

    #[test]
    fn cache_sweep_minimum_is_four() {
        let targets = IterationTargets::default();
        let iters = plan_iterations(Kernel::CacheSweep, 512 * 1024 * 1024, 64, targets);
        assert!(iters >= 4);
    }
}
