//! Tunable constants collected in one place rather than scattered as magic
//! numbers through the kernels. Not read from the environment or a file —
//! spec.md §6 rules out both as sources of core configuration.

/// Sweep geometry and cache-detection thresholds.
#[derive(Debug, Clone, Copy)]
pub struct SweepConfig {
    /// Smallest working-set size swept, in bytes.
    pub min_size_bytes: usize,
    /// Largest working-set size swept, in bytes.
    pub max_size_bytes: usize,
    /// Logarithmic steps per octave (doubling).
    pub steps_per_octave: u32,
    /// Derivative peaks below this magnitude are not transitions.
    pub peak_threshold: f64,
    /// Peaks within this many sample indices are merged.
    pub merge_distance: usize,
    /// Plateau sample cap per side of a transition.
    pub plateau_cap: usize,
    /// Fraction of physical RAM the bandwidth sweep is allowed to touch.
    pub ram_cap_fraction: f64,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            min_size_bytes: 1024,
            max_size_bytes: 512 * 1024 * 1024,
            steps_per_octave: 4,
            peak_threshold: 0.10,
            merge_distance: 5,
            plateau_cap: 40,
            ram_cap_fraction: 0.5,
        }
    }
}

/// Auto-iteration-count planning targets (spec.md §4.8).
#[derive(Debug, Clone, Copy)]
pub struct IterationTargets {
    pub latency_total_accesses: u64,
    pub bandwidth_total_elements: u64,
    pub sweep_total_accesses: u64,
    pub min_iterations: u64,
}

impl Default for IterationTargets {
    fn default() -> Self {
        Self {
            latency_total_accesses: 20_000_000,
            bandwidth_total_elements: 5_000_000,
            sweep_total_accesses: 100_000_000,
            min_iterations: 2,
        }
    }
}

/// Duration of the frequency/power-state warmup spin.
pub const WARMUP_MILLIS: u64 = 200;

/// Deterministic Fisher–Yates seed. Reproducibility is a correctness
/// property (spec.md §9), never a system-entropy source.
pub const CHASE_SEED: u64 = 42;
