use core::sync::atomic::{AtomicUsize, Ordering};

/// Align `value` up to the next multiple of `align`, or `None` if that
/// overflows. `align` must be a power of two.
#[inline(always)]
pub const fn checked_align_up(value: usize, align: usize) -> Option<usize> {
    match value.checked_add(align - 1) {
        Some(v) => Some(v & !(align - 1)),
        None => None,
    }
}

/// Check if `value` is aligned to `align`.
#[inline(always)]
pub const fn is_aligned(value: usize, align: usize) -> bool {
    value & (align - 1) == 0
}

/// Minimum alignment for all allocations (matches max_align_t on 64-bit).
pub const MIN_ALIGN: usize = 16;

/// Size of one hardware cache line; per-thread caches are padded to it.
pub const CACHE_LINE: usize = 64;

/// Target size of one slab mapping.
pub const SLAB_SIZE: usize = 2 * 1024 * 1024; // 2 MiB

/// Stride of the pre-warm loop: one touch per standard page.
pub const PREWARM_STRIDE: usize = 4096;

/// Hugepage size assumed for `MAP_HUGETLB` mappings (x86_64 / aarch64 default).
pub const HUGE_PAGE_SIZE: usize = 2 * 1024 * 1024;

/// Runtime page size, initialized from sysconf(_SC_PAGESIZE) at startup.
/// Starts at 4096 so `page_size()` never returns zero before init.
static PAGE_SIZE_CACHED: AtomicUsize = AtomicUsize::new(4096);

/// Initialize the page size from the OS. Called once during init.
///
/// # Safety
/// Must be called from the init path.
pub unsafe fn init_page_size() {
    let ps = libc::sysconf(libc::_SC_PAGESIZE);
    let ps = if ps > 0 { ps as usize } else { 4096 };
    PAGE_SIZE_CACHED.store(ps, Ordering::Release);
}

/// Get the system page size (4096 until init has run).
#[inline(always)]
pub fn page_size() -> usize {
    PAGE_SIZE_CACHED.load(Ordering::Relaxed)
}
