//! Slab refill: the slow path behind an empty per-thread free list.

use super::free_list::{self, FreeList};
use super::size_class::class_size;
use crate::util::{PREWARM_STRIDE, SLAB_SIZE};
use crate::{config, init, platform, stats};
use core::ptr::NonNull;

/// Refill `list` (the calling thread's list for `class_index`) from a new
/// slab. Returns false if the slab could not be mapped; the list then stays
/// empty and the caller reports out-of-memory.
///
/// The slab is never unmapped: its blocks are owned one by one by whichever
/// free list or caller holds them.
#[cold]
#[inline(never)]
pub fn refill(class_index: usize, list: &FreeList) -> bool {
    init::ensure_initialized();

    let mapping = match platform::map(SLAB_SIZE) {
        Some(m) => m,
        None => {
            stats::record_slab_map_failure();
            return false;
        }
    };
    stats::record_slab_mapped();

    if config::prewarm_enabled() {
        // SAFETY: the mapping is at least SLAB_SIZE bytes and unshared.
        unsafe { prewarm(mapping.base, SLAB_SIZE) };
    }

    // SAFETY: fresh page-aligned mapping, exclusively ours.
    match unsafe { free_list::carve(mapping.base, SLAB_SIZE, class_size(class_index)) } {
        Some(chain) => {
            list.install(chain);
            true
        }
        None => false,
    }
}

/// Touch one byte per 4 KiB window so the kernel backs the whole slab now
/// instead of on the first allocations from it.
///
/// # Safety
/// `[base, base + len)` must be writable and not yet handed out.
unsafe fn prewarm(base: NonNull<u8>, len: usize) {
    let mut offset = 0;
    while offset < len {
        base.as_ptr().add(offset).write_volatile(0);
        offset += PREWARM_STRIDE;
    }
}
