/// Larson benchmark: multi-threaded replace-one-block workload with
/// cross-thread releases.
///
/// Each worker keeps a batch of live blocks and repeatedly releases a random
/// one and allocates a replacement. Every so often it hands half its batch
/// to the next worker, which releases those blocks on its own thread, so
/// blocks migrate between per-thread caches the way they do in servers.
///
/// Ported from the mimalloc-bench Larson benchmark concept.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

const DEFAULT_DURATION_SECS: u64 = 5;
const BATCH_SIZE: usize = 1000;
const HANDOFF_EVERY: usize = 50_000;
const MIN_SIZE: usize = 8;
const MAX_SIZE: usize = 512;

/// Blocks in flight between two workers.
struct Handoff(Mutex<Vec<usize>>);

fn main() {
    let num_threads: usize = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(4);
    let duration_secs: u64 = std::env::args()
        .nth(2)
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_DURATION_SECS);

    println!(
        "Larson benchmark: {} threads, {} seconds",
        num_threads, duration_secs
    );

    let running = Arc::new(AtomicBool::new(true));
    let total_ops = Arc::new(AtomicUsize::new(0));
    let mailboxes: Arc<Vec<Handoff>> = Arc::new(
        (0..num_threads)
            .map(|_| Handoff(Mutex::new(Vec::new())))
            .collect(),
    );

    let handles: Vec<_> = (0..num_threads)
        .map(|tid| {
            let running = Arc::clone(&running);
            let total_ops = Arc::clone(&total_ops);
            let mailboxes = Arc::clone(&mailboxes);
            std::thread::spawn(move || {
                larson_worker(tid, &running, &total_ops, &mailboxes);
            })
        })
        .collect();

    let start = Instant::now();
    std::thread::sleep(Duration::from_secs(duration_secs));
    running.store(false, Ordering::Release);

    for h in handles {
        h.join().unwrap();
    }

    // Anything still in a mailbox is released here, on the main thread.
    for mailbox in mailboxes.iter() {
        for addr in mailbox.0.lock().unwrap().drain(..) {
            unsafe { safemem::release(addr as *mut u8) };
        }
    }

    let elapsed = start.elapsed().as_secs_f64();
    let ops = total_ops.load(Ordering::Relaxed);
    let mops = ops as f64 / elapsed / 1_000_000.0;

    println!("Total operations: {}", ops);
    println!("Throughput: {:.2} Mops/sec", mops);
    println!("Per-thread: {:.2} Mops/sec", mops / num_threads as f64);

    let stats = safemem::stats::snapshot();
    println!(
        "Slabs mapped: {} ({} MiB), corruption reports: {}",
        stats.slabs_mapped,
        stats.slabs_mapped * 2,
        stats.corruption_reports
    );
}

fn larson_worker(tid: usize, running: &AtomicBool, total_ops: &AtomicUsize, mailboxes: &[Handoff]) {
    let mut rng = (tid as u64).wrapping_mul(6364136223846793005).wrapping_add(1);
    let next = (tid + 1) % mailboxes.len();

    let mut batch: Vec<*mut u8> = Vec::with_capacity(BATCH_SIZE);
    for _ in 0..BATCH_SIZE {
        let size = random_size(&mut rng);
        let p = safemem::allocate(size);
        if !p.is_null() {
            unsafe { std::ptr::write_bytes(p, 0xAB, std::cmp::min(size, 16)) };
            batch.push(p);
        }
    }

    let mut ops = 0usize;

    while running.load(Ordering::Relaxed) {
        if !batch.is_empty() {
            let idx = (next_random(&mut rng) as usize) % batch.len();
            unsafe { safemem::release(batch[idx]) };

            let size = random_size(&mut rng);
            let p = safemem::allocate(size);
            if !p.is_null() {
                unsafe { std::ptr::write_bytes(p, 0xCD, std::cmp::min(size, 16)) };
                batch[idx] = p;
            } else {
                batch.swap_remove(idx);
            }
            ops += 2; // one release + one allocate
        }

        if ops % HANDOFF_EVERY == 0 {
            // Release what the previous worker handed us...
            let inbox: Vec<usize> = mailboxes[tid].0.lock().unwrap().drain(..).collect();
            for addr in inbox {
                unsafe { safemem::release(addr as *mut u8) };
                ops += 1;
            }
            // ...and hand half our batch to the next one.
            let half = batch.len() / 2;
            let outgoing: Vec<usize> = batch.drain(..half).map(|p| p as usize).collect();
            mailboxes[next].0.lock().unwrap().extend(outgoing);
            while batch.len() < BATCH_SIZE {
                let size = random_size(&mut rng);
                let p = safemem::allocate(size);
                if p.is_null() {
                    break;
                }
                batch.push(p);
                ops += 1;
            }
        }

        if ops % 10000 == 0 {
            total_ops.fetch_add(10000, Ordering::Relaxed);
        }
    }

    total_ops.fetch_add(ops % 10000, Ordering::Relaxed);

    for p in batch {
        unsafe { safemem::release(p) };
    }
}

fn random_size(rng: &mut u64) -> usize {
    let r = next_random(rng);
    MIN_SIZE + (r as usize) % (MAX_SIZE - MIN_SIZE)
}

fn next_random(rng: &mut u64) -> u64 {
    *rng = rng
        .wrapping_mul(6364136223846793005)
        .wrapping_add(1442695040888963407);
    *rng >> 33
}
