//! Pointer-chase builder (C5): a random Hamiltonian cycle over `N`
//! cache-line-spaced nodes.
//!
//! One node per cache line, never more: packing several nodes per line would
//! let the hardware prefetcher (or simply cache locality) amortize the miss
//! cost across every pointer stored in that line — on a 64-bit/64-byte
//! system that's roughly 8 pointers per line, so a diluted measurement would
//! report about 1/8th of the true cold-line latency. Cache-line stride
//! makes every dereference a fresh line fetch.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::Rng;

/// Byte offset of the write-latency scratch word within a node, right after
/// the `next` pointer.
pub const SCRATCH_OFFSET: usize = std::mem::size_of::<*mut u8>();

/// Address of node `index` within a chase buffer laid out with the given
/// `stride` (normally the platform cache-line size).
#[inline]
pub fn node_ptr(base: *mut u8, index: usize, stride: usize) -> *mut u8 {
    unsafe { base.add(index * stride) }
}

/// Volatile-qualified load of a node's `next` pointer. This is the one
/// access the optimizer must never be allowed to eliminate or hoist: it is
/// the dependent load the entire latency measurement rests on.
#[inline(always)]
pub unsafe fn chase_load(p: *mut u8) -> *mut u8 {
    unsafe { std::ptr::read_volatile(p as *const *mut u8) }
}

/// Volatile-qualified store to a node's scratch word, used by the
/// write-latency kernel.
#[inline(always)]
pub unsafe fn write_scratch(p: *mut u8, value: usize) {
    unsafe {
        let scratch = p.add(SCRATCH_OFFSET) as *mut usize;
        std::ptr::write_volatile(scratch, value);
    }
}

/// Build a random Hamiltonian cycle over `node_count` cache-line-spaced
/// nodes inside `base`, seeded deterministically so reruns with the same
/// `node_count` produce the identical graph — required for the
/// cache-detection inference to be stable across runs.
///
/// `base` must point to at least `node_count * stride` zero-initialized,
/// writable bytes, and `node_count` must be at least 2.
pub fn build_cycle(base: *mut u8, node_count: usize, stride: usize, seed: u64) {
    assert!(node_count >= 2, "pointer chase needs at least 2 nodes");

    // Step 1: identity permutation.
    let mut perm: Vec<usize> = (0..node_count).collect();

    // Step 2: Fisher-Yates shuffle, deterministically seeded.
    let mut rng = StdRng::seed_from_u64(seed);
    for i in (1..node_count).rev() {
        let j = rng.random_range(0..=i);
        perm.swap(i, j);
    }

    // Step 3: wire up the cycle: node[perm[w]].next = &node[perm[w+1 mod N]].
    for w in 0..node_count {
        let cur = perm[w];
        let next = perm[(w + 1) % node_count];
        let cur_ptr = node_ptr(base, cur, stride);
        let next_ptr = node_ptr(base, next, stride);
        unsafe {
            (cur_ptr as *mut *mut u8).write(next_ptr);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn alloc_raw(node_count: usize, stride: usize) -> Vec<u8> {
        vec![0u8; node_count * stride]
    }

    #[test]
    fn cycle_of_two_returns_to_start() {
        let stride = 64;
        let mut buf = alloc_raw(2, stride);
        let base = buf.as_mut_ptr();
        build_cycle(base, 2, stride, 42);

        let start = node_ptr(base, 0, stride);
        let mut p = start;
        for _ in 0..2 {
            p = unsafe { chase_load(p) };
        }
        assert_eq!(p, start);
    }

    #[test]
    fn cyclicity_visits_every_node_exactly_once() {
        let stride = 64;
        let node_count = 257;
        let mut buf = alloc_raw(node_count, stride);
        let base = buf.as_mut_ptr();
        build_cycle(base, node_count, stride, 42);

        let start = node_ptr(base, 0, stride);
        let mut p = start;
        let mut visited = HashSet::new();
        for _ in 0..node_count {
            visited.insert(p as usize);
            p = unsafe { chase_load(p) };
        }
        assert_eq!(p, start, "cycle must close after N hops");
        assert_eq!(visited.len(), node_count, "every node visited exactly once");
    }

    #[test]
    fn determinism_same_seed_same_edges() {
        let stride = 64;
        let node_count = 513;

        let mut buf_a = alloc_raw(node_count, stride);
        let base_a = buf_a.as_mut_ptr();
        build_cycle(base_a, node_count, stride, 42);

        let mut buf_b = alloc_raw(node_count, stride);
        let base_b = buf_b.as_mut_ptr();
        build_cycle(base_b, node_count, stride, 42);

        // Compare edges as relative node indices, not raw addresses (the
        // two buffers live at different addresses).
        for i in 0..node_count {
            let next_a = unsafe { chase_load(node_ptr(base_a, i, stride)) };
            let next_b = unsafe { chase_load(node_ptr(base_b, i, stride)) };
            let rel_a = (next_a as usize - base_a as usize) / stride;
            let rel_b = (next_b as usize - base_b as usize) / stride;
            assert_eq!(rel_a, rel_b, "edge from node {i} must match across builds");
        }
    }
}
