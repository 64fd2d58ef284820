//! Frequency warmup (C8): spin the CPU until it leaves low-power idle
//! states, once per process lifetime, before any measurement begins.
//!
//! Observed roughly a 3x throughput shift on Apple M-series between idle
//! and active clock states — skipping this would bias the very first
//! sweep sample low.

use crate::config::WARMUP_MILLIS;
use crate::timer;
use log::debug;
use std::sync::Once;

static WARMUP_ONCE: Once = Once::new();

/// Busy-spin performing integer multiplies on a volatile accumulator until
/// monotonic time has advanced by [`WARMUP_MILLIS`]. Idempotent: only the
/// first call in a process actually spins.
pub fn warmup_once() {
    WARMUP_ONCE.call_once(|| {
        debug!("warming up CPU for {WARMUP_MILLIS}ms before first measurement");
        let mut acc: u64 = 0x9E3779B97F4A7C15;
        let start = timer::now_ns();
        let budget_ns = WARMUP_MILLIS * 1_000_000;
        loop {
            for _ in 0..1024u32 {
                acc = acc.wrapping_mul(2862933555777941757).wrapping_add(3037000493);
            }
            // Escape the accumulator so the loop body can't be eliminated.
            unsafe {
                std::ptr::write_volatile(&mut acc as *mut u64, acc);
            }
            if timer::now_ns() - start >= budget_ns {
                break;
            }
        }
    });
}
