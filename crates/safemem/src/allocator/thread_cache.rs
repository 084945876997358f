//! Per-thread free-list heads.
//!
//! Each thread owns one [`ThreadCache`]: eight free-list heads, one per size
//! class, packed into a single cache line of their own.
//! - allocate: pop from the caller's list (refill from a new slab on miss)
//! - release: push onto the *caller's* list, whichever thread allocated it
//!
//! No thread ever reads another thread's cache, so nothing here locks.
//! Caches are never torn down: slab memory still on a list when its thread
//! exits stays mapped for the life of the process.

use crate::hardening::header;
use crate::slab::{self, class_size, FreeList, NUM_SIZE_CLASSES};
use crate::util::CACHE_LINE;
use core::ptr::NonNull;

/// One thread's free-list heads, aligned so no two threads' caches share a
/// cache line.
#[repr(C, align(64))]
pub struct ThreadCache {
    lists: [FreeList; NUM_SIZE_CLASSES],
}

const _: () = assert!(core::mem::align_of::<ThreadCache>() == CACHE_LINE);

impl ThreadCache {
    #[allow(clippy::new_without_default)]
    pub const fn new() -> Self {
        #[allow(clippy::declare_interior_mutable_const)]
        const EMPTY: FreeList = FreeList::new();
        ThreadCache {
            lists: [EMPTY; NUM_SIZE_CLASSES],
        }
    }

    /// Pop a block of `class_index`, refilling from a new slab if the list
    /// is empty. Stamps the block's header. `None` means the slab mapping
    /// failed.
    #[inline(always)]
    pub fn allocate(&self, class_index: usize) -> Option<NonNull<u8>> {
        let list = &self.lists[class_index];
        if list.is_empty() && !slab::refill(class_index, list) {
            return None;
        }
        // SAFETY: the list only ever holds carved or released blocks of
        // this class, and this thread is its only user.
        unsafe {
            let block = list.pop()?;
            header::write_small(block, class_size(class_index));
            Some(block)
        }
    }

    /// Put a released block on this thread's list for `class_index`.
    ///
    /// # Safety
    /// `block` must be a small block of `class_index` whose header was just
    /// retired by `header::take_live`.
    #[inline(always)]
    pub unsafe fn release(&self, class_index: usize, block: NonNull<u8>) {
        self.lists[class_index].push(block);
    }

    /// Number of blocks cached for a class. Walks the list.
    #[cfg(test)]
    fn cached(&self, class_index: usize) -> usize {
        // SAFETY: see `allocate`.
        unsafe { self.lists[class_index].count() }
    }
}

/// Access the calling thread's cache, creating it on first use. Returns
/// `None` once the thread-local is no longer accessible (thread teardown).
#[inline(always)]
pub fn with_thread_cache<F, R>(f: F) -> Option<R>
where
    F: FnOnce(&ThreadCache) -> R,
{
    thread_local! {
        static CACHE: ThreadCache = const { ThreadCache::new() };
    }

    CACHE.try_with(|cache| f(cache)).ok()
}
