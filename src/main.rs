//! Thin demo binary: runs the core measurement operations once and prints
//! the raw result shapes. Table/CSV/JSON formatting, CLI flags, and the
//! interactive TTY menu are collaborator concerns this crate deliberately
//! does not own — this binary exists only to exercise the library outside
//! of `cargo test`.

use memlat::result::DEFAULT_LATENCY_SIZES;

fn main() {
    env_logger::init();

    if let Err(e) = memlat::init() {
        eprintln!("platform init failed: {e}");
        std::process::exit(1);
    }

    println!("Fixed-point latency table:");
    for &size in DEFAULT_LATENCY_SIZES.iter() {
        match memlat::read_latency_auto(size) {
            Ok(r) => println!(
                "  {:>10} KiB  read={:>8.2} ns/access",
                size / 1024,
                r.avg_latency_ns
            ),
            Err(e) => println!("  {:>10} KiB  read=FAILED ({e})", size / 1024),
        }
    }

    println!("\nBandwidth at 16 MiB:");
    match memlat::read_bandwidth_auto(16 * 1024 * 1024) {
        Ok(r) => println!("  read  {:.2} GB/s", r.bandwidth_gb_per_s),
        Err(e) => println!("  read  FAILED ({e})"),
    }
    match memlat::write_bandwidth_auto(16 * 1024 * 1024) {
        Ok(r) => println!("  write {:.2} GB/s", r.bandwidth_gb_per_s),
        Err(e) => println!("  write FAILED ({e})"),
    }

    println!("\nDetecting cache hierarchy (this sweeps 1 KiB .. 512 MiB)...");
    let info = memlat::detect_cache();
    println!(
        "  L1 = {} KiB, L2 = {} KiB, L3 = {} KiB ({} samples)",
        info.l1 / 1024,
        info.l2 / 1024,
        info.l3 / 1024,
        info.sweep_sizes.len()
    );
    memlat::dispose_cache_info(info);
}
