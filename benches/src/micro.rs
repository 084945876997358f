/// Microbenchmarks for safemem.
///
/// Plain timing loops rather than a harness, so the numbers reflect the
/// allocator alone. Run with `cargo run --release -p safemem-benches --bin micro`.

use std::hint::black_box;
use std::time::Instant;

const ITERATIONS: usize = 1_000_000;

/// Measure allocate/release latency for a given size, N iterations.
fn bench_allocate_release(size: usize, iterations: usize) -> f64 {
    // Warmup: also pays the one-time slab refill for small sizes.
    for _ in 0..1000 {
        let p = safemem::allocate(black_box(size));
        unsafe { safemem::release(black_box(p)) };
    }
    let start = Instant::now();
    for _ in 0..iterations {
        let p = safemem::allocate(black_box(size));
        unsafe { safemem::release(black_box(p)) };
    }
    start.elapsed().as_nanos() as f64 / iterations as f64
}

/// Each thread runs the 16-byte allocate/release loop; returns ops/sec.
/// Per-thread caches mean this should scale with the thread count.
fn bench_thread_scaling(num_threads: usize, ops_per_thread: usize) -> f64 {
    let start = Instant::now();
    let handles: Vec<_> = (0..num_threads)
        .map(|_| {
            std::thread::spawn(move || {
                for _ in 0..ops_per_thread {
                    let p = safemem::allocate(black_box(16));
                    unsafe { safemem::release(black_box(p)) };
                }
            })
        })
        .collect();

    for h in handles {
        h.join().unwrap();
    }
    let total_ops = num_threads * ops_per_thread;
    total_ops as f64 / start.elapsed().as_secs_f64()
}

/// Allocate N blocks in order, release them in shuffled order. Returns
/// microseconds per round.
fn bench_random_fragmentation(rounds: usize) -> f64 {
    const N: usize = 1000;
    let mut ptrs = vec![std::ptr::null_mut::<u8>(); N];
    let mut order: Vec<usize> = (0..N).collect();
    let mut rng: u64 = 0x5EED;

    let start = Instant::now();
    for _ in 0..rounds {
        for p in ptrs.iter_mut() {
            *p = safemem::allocate(black_box(16));
        }
        shuffle(&mut order, &mut rng);
        for &i in &order {
            unsafe { safemem::release(ptrs[i]) };
        }
    }
    start.elapsed().as_secs_f64() * 1e6 / rounds as f64
}

/// Repeat the 16-byte latency loop and report the spread, to show whether
/// slab refills (pre-warmed or not) cause latency spikes.
fn bench_jitter(repetitions: usize, iterations: usize) -> (f64, f64, f64) {
    let samples: Vec<f64> = (0..repetitions)
        .map(|_| bench_allocate_release(16, iterations))
        .collect();
    let mean = samples.iter().sum::<f64>() / samples.len() as f64;
    let var = samples.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / samples.len() as f64;
    let max = samples.iter().cloned().fold(f64::MIN, f64::max);
    (mean, var.sqrt(), max)
}

/// Fisher-Yates with an LCG.
fn shuffle(v: &mut [usize], rng: &mut u64) {
    for i in (1..v.len()).rev() {
        *rng = rng
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        let j = ((*rng >> 33) as usize) % (i + 1);
        v.swap(i, j);
    }
}

fn main() {
    println!("=== safemem microbenchmarks ===\n");

    let mut latencies: Vec<(usize, f64)> = Vec::new();

    println!("--- allocate/release latency (ns/op) ---");
    for &size in &[8, 16, 32, 64, 128, 129, 4096, 65536] {
        let iters = if size > 128 { ITERATIONS / 100 } else { ITERATIONS };
        let ns = bench_allocate_release(size, iters);
        println!("  size={:>8}: {:>8.1} ns", size, ns);
        latencies.push((size, ns));
    }

    println!("\n--- thread scaling, 16 bytes (Mops/sec) ---");
    let mut throughput = Vec::new();
    for &threads in &[1, 2, 4, 8] {
        let mops = bench_thread_scaling(threads, ITERATIONS) / 1_000_000.0;
        println!("  threads={}: {:>7.2} Mops/sec", threads, mops);
        throughput.push((threads, mops));
    }

    println!("\n--- random-order release, 1000 x 16 bytes (us/round) ---");
    println!("  {:.1} us", bench_random_fragmentation(1000));

    println!("\n--- jitter, 10 x 16-byte loops (ns/op) ---");
    let (mean, stddev, max) = bench_jitter(10, ITERATIONS / 10);
    println!("  mean={:.2} stddev={:.2} max={:.2}", mean, stddev, max);

    let stats = safemem::stats::snapshot();
    println!(
        "\n--- allocator counters ---\n  slabs={} large_mapped={} hugepage_fallbacks={}",
        stats.slabs_mapped, stats.large_mapped, stats.hugepage_fallbacks
    );

    // Machine-parseable summary line
    print!("\nSUMMARY|safemem");
    for &(size, ns) in &latencies {
        print!("|latency_{}={:.1}", size, ns);
    }
    for &(threads, mops) in &throughput {
        print!("|throughput_{}t={:.2}", threads, mops);
    }
    println!();
}
