//! Platform abstraction (C1): page size, cache-line size, physical RAM, and
//! thread-affinity/QoS primitives — no behavioral branching in callers.
//!
//! Grounded on the teacher's own `core_affinity`/`libc`-based detection in
//! `detect_apple_silicon_specs`/`detect_optimal_chunk_size`, generalized from
//! a single hardcoded M-series table into a runtime query.

use log::trace;

/// Default x86_64/most-ARM64 cache line size, used when the platform offers
/// no runtime query.
const DEFAULT_CACHE_LINE_BYTES: usize = 64;

/// System page size in bytes. Guaranteed a power of two.
pub fn page_size() -> usize {
    let sz = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
    if sz > 0 { sz as usize } else { 4096 }
}

/// Cache line size in bytes: 64 on x86_64; queried via `sysctl` on Apple
/// ARM64 (where it is 128); 64 elsewhere.
#[cfg(target_os = "macos")]
pub fn cache_line_size() -> usize {
    let mut line: usize = 0;
    let mut len = std::mem::size_of::<usize>();
    let name = c"hw.cachelinesize";
    let ret = unsafe {
        libc::sysctlbyname(
            name.as_ptr(),
            &mut line as *mut usize as *mut libc::c_void,
            &mut len,
            std::ptr::null_mut(),
            0,
        )
    };
    if ret == 0 && line > 0 {
        line
    } else {
        DEFAULT_CACHE_LINE_BYTES
    }
}

#[cfg(not(target_os = "macos"))]
pub fn cache_line_size() -> usize {
    DEFAULT_CACHE_LINE_BYTES
}

/// Physical RAM in bytes, used to cap bandwidth sweep buffers. Returns 0 if
/// it cannot be determined (callers must treat 0 as "no cap known").
pub fn physical_ram_bytes() -> usize {
    #[cfg(target_os = "linux")]
    {
        let pages = unsafe { libc::sysconf(libc::_SC_PHYS_PAGES) };
        let page = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
        if pages > 0 && page > 0 {
            return pages as usize * page as usize;
        }
        0
    }
    #[cfg(target_os = "macos")]
    {
        let mut mem: u64 = 0;
        let mut len = std::mem::size_of::<u64>();
        let name = c"hw.memsize";
        let ret = unsafe {
            libc::sysctlbyname(
                name.as_ptr(),
                &mut mem as *mut u64 as *mut libc::c_void,
                &mut len,
                std::ptr::null_mut(),
                0,
            )
        };
        if ret == 0 { mem as usize } else { 0 }
    }
    #[cfg(not(any(target_os = "linux", target_os = "macos")))]
    {
        0
    }
}

/// A saved affinity/QoS state, restored via [`restore_affinity`].
pub struct AffinityGuard {
    previous: Option<core_affinity::CoreId>,
}

/// Pin the current thread to `cpu` (best-effort). On platforms without
/// per-thread affinity (macOS), `core_affinity::set_for_current` is a no-op,
/// so we additionally request the highest-priority QoS class there so the
/// scheduler prefers a performance core.
pub fn set_affinity_single_core(cpu: usize) -> AffinityGuard {
    let ids = core_affinity::get_core_ids().unwrap_or_default();
    let target = ids.iter().find(|id| id.id == cpu).copied().or_else(|| ids.first().copied());

    if let Some(id) = target {
        trace!("pinning current thread to core {}", id.id);
        let _ = core_affinity::set_for_current(id);
    }

    #[cfg(target_os = "macos")]
    unsafe {
        set_qos_user_interactive();
    }

    AffinityGuard { previous: target }
}

/// Restore affinity/QoS to the process default. Best-effort: there is no
/// portable way to read back the *original* affinity mask, so this resets
/// to "no pin" (QoS default on macOS) rather than a saved value — matching
/// the original C's restoration which also only round-trips the mask it
/// explicitly saved before the benchmark pinned it.
pub fn restore_affinity(_guard: AffinityGuard) {
    #[cfg(target_os = "macos")]
    unsafe {
        set_qos_default();
    }
}

#[cfg(target_os = "macos")]
mod qos {
    // `pthread_set_qos_class_self_np` isn't exposed by the `libc` crate;
    // declare the minimal ABI surface ourselves, matching the original's
    // `pthread_set_qos_class_self_np(QOS_CLASS_USER_INTERACTIVE, 0)` call.
    pub type QosClassT = libc::c_uint;
    pub const QOS_CLASS_USER_INTERACTIVE: QosClassT = 0x21;
    pub const QOS_CLASS_DEFAULT: QosClassT = 0x15;

    unsafe extern "C" {
        pub fn pthread_set_qos_class_self_np(
            qos_class: QosClassT,
            relative_priority: libc::c_int,
        ) -> libc::c_int;
    }
}

#[cfg(target_os = "macos")]
unsafe fn set_qos_user_interactive() {
    unsafe {
        qos::pthread_set_qos_class_self_np(qos::QOS_CLASS_USER_INTERACTIVE, 0);
    }
}

#[cfg(target_os = "macos")]
unsafe fn set_qos_default() {
    unsafe {
        qos::pthread_set_qos_class_self_np(qos::QOS_CLASS_DEFAULT, 0);
    }
}
