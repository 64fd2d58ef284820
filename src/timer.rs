//! Monotonic high-resolution timer (C2).
//!
//! `init()` is idempotent and process-wide, modeled as an eagerly computed
//! `OnceLock` rather than a mutable global flag (spec.md §9's guidance on
//! modeling one-time process singletons in a language with explicit
//! lifetimes). `now_ns()` returns a strictly non-decreasing count; only
//! differences between two calls carry meaning.

use crate::error::{MembenchError, Result};
use std::sync::OnceLock;

#[cfg(target_os = "macos")]
struct Timebase {
    numer: u64,
    denom: u64,
}

#[cfg(target_os = "macos")]
static TIMEBASE: OnceLock<Timebase> = OnceLock::new();

static RESOLUTION_NS: OnceLock<f64> = OnceLock::new();

/// Initialize the timer subsystem. Safe to call more than once; the second
/// and subsequent calls are no-ops on success. Measurement functions must
/// not be called if this returns an error.
pub fn init() -> Result<()> {
    #[cfg(target_os = "macos")]
    {
        if TIMEBASE.get().is_none() {
            let mut info = libc::mach_timebase_info_data_t { numer: 0, denom: 0 };
            let ret = unsafe { libc::mach_timebase_info(&mut info) };
            if ret != 0 {
                return Err(MembenchError::PlatformInitFailure {
                    reason: format!("mach_timebase_info failed with code {ret}"),
                });
            }
            let _ = TIMEBASE.set(Timebase {
                numer: info.numer as u64,
                denom: info.denom as u64,
            });
        }
        let tb = TIMEBASE.get().unwrap();
        let _ = RESOLUTION_NS.set(tb.numer as f64 / tb.denom as f64);
    }

    #[cfg(not(target_os = "macos"))]
    {
        // clock_gettime(CLOCK_MONOTONIC) is always available on the
        // platforms this crate targets; there is nothing to initialize,
        // but we still probe it once so a broken clock source surfaces as
        // PlatformInitFailure instead of silently returning garbage later.
        let mut ts = libc::timespec { tv_sec: 0, tv_nsec: 0 };
        let ret = unsafe { libc::clock_gettime(libc::CLOCK_MONOTONIC, &mut ts) };
        if ret != 0 {
            return Err(MembenchError::PlatformInitFailure {
                reason: "clock_gettime(CLOCK_MONOTONIC) failed".to_string(),
            });
        }
        let mut res = libc::timespec { tv_sec: 0, tv_nsec: 0 };
        let res_ret = unsafe { libc::clock_getres(libc::CLOCK_MONOTONIC, &mut res) };
        let ns = if res_ret == 0 {
            (res.tv_sec as f64) * 1e9 + res.tv_nsec as f64
        } else {
            1.0
        };
        let _ = RESOLUTION_NS.set(ns.max(1.0));
    }

    Ok(())
}

/// A strictly non-decreasing nanosecond timestamp. The absolute value is
/// meaningless; only `now_ns() - earlier_now_ns()` is.
pub fn now_ns() -> u64 {
    #[cfg(target_os = "macos")]
    {
        let ticks = unsafe { libc::mach_absolute_time() };
        let tb = TIMEBASE.get().expect("timer::init() must run before now_ns()");
        ticks * tb.numer / tb.denom
    }
    #[cfg(not(target_os = "macos"))]
    {
        let mut ts = libc::timespec { tv_sec: 0, tv_nsec: 0 };
        unsafe { libc::clock_gettime(libc::CLOCK_MONOTONIC, &mut ts) };
        ts.tv_sec as u64 * 1_000_000_000 + ts.tv_nsec as u64
    }
}

/// Smallest measurable tick, in nanoseconds. `init()` must have succeeded.
pub fn resolution_ns() -> f64 {
    *RESOLUTION_NS.get().unwrap_or(&1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn monotonic_and_resolved() {
        init().expect("timer init");
        let t1 = now_ns();
        // Burn a little wall time so t2 is guaranteed to differ.
        let mut acc: u64 = 0;
        for i in 0..100_000u64 {
            acc = acc.wrapping_add(i);
        }
        std::hint::black_box(acc);
        let t2 = now_ns();
        assert!(t2 > t1);
        let res = resolution_ns();
        assert!(res > 0.0 && res <= 1000.0);
    }
}
