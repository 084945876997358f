//! Process-wide slow-path counters.
//!
//! Only refill, the large-object path and corruption reports touch these;
//! the cache-hit path never does.

use core::sync::atomic::{AtomicU64, Ordering};

static SLABS_MAPPED: AtomicU64 = AtomicU64::new(0);
static SLAB_MAP_FAILURES: AtomicU64 = AtomicU64::new(0);
static HUGEPAGE_FALLBACKS: AtomicU64 = AtomicU64::new(0);
static LARGE_MAPPED: AtomicU64 = AtomicU64::new(0);
static LARGE_UNMAPPED: AtomicU64 = AtomicU64::new(0);
static CORRUPTION_REPORTS: AtomicU64 = AtomicU64::new(0);

/// Snapshot of the counters.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Stats {
    pub slabs_mapped: u64,
    pub slab_map_failures: u64,
    pub hugepage_fallbacks: u64,
    pub large_mapped: u64,
    pub large_unmapped: u64,
    pub corruption_reports: u64,
}

impl Stats {
    /// Large blocks currently mapped.
    pub fn large_live(&self) -> u64 {
        self.large_mapped.saturating_sub(self.large_unmapped)
    }
}

pub fn snapshot() -> Stats {
    Stats {
        slabs_mapped: SLABS_MAPPED.load(Ordering::Relaxed),
        slab_map_failures: SLAB_MAP_FAILURES.load(Ordering::Relaxed),
        hugepage_fallbacks: HUGEPAGE_FALLBACKS.load(Ordering::Relaxed),
        large_mapped: LARGE_MAPPED.load(Ordering::Relaxed),
        large_unmapped: LARGE_UNMAPPED.load(Ordering::Relaxed),
        corruption_reports: CORRUPTION_REPORTS.load(Ordering::Relaxed),
    }
}

#[inline]
pub(crate) fn record_slab_mapped() {
    SLABS_MAPPED.fetch_add(1, Ordering::Relaxed);
}

#[inline]
pub(crate) fn record_slab_map_failure() {
    SLAB_MAP_FAILURES.fetch_add(1, Ordering::Relaxed);
}

#[inline]
pub(crate) fn record_hugepage_fallback() {
    HUGEPAGE_FALLBACKS.fetch_add(1, Ordering::Relaxed);
}

#[inline]
pub(crate) fn record_large_mapped() {
    LARGE_MAPPED.fetch_add(1, Ordering::Relaxed);
}

#[inline]
pub(crate) fn record_large_unmapped() {
    LARGE_UNMAPPED.fetch_add(1, Ordering::Relaxed);
}

#[inline]
pub(crate) fn record_corruption() {
    CORRUPTION_REPORTS.fetch_add(1, Ordering::Relaxed);
}
