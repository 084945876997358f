//! Allocation and release routing.
//!
//! `allocate` picks a size class and serves small requests from the calling
//! thread's cache, large ones from their own mapping. `release` retires the
//! header in front of the pointer and routes the block back the same way.

use super::thread_cache;
use crate::error::{AllocError, ReleaseError};
use crate::hardening::header::{self, BlockKind};
use crate::slab::{class_size, size_class_index};
use crate::util::MIN_ALIGN;
use crate::{large, stats};
use core::ptr::NonNull;

/// What `release` did with a pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Released {
    /// Null pointer; nothing to do.
    Null,
    /// Pushed onto the calling thread's free list for this class.
    Small { class_index: usize },
    /// Small block released on a thread whose cache is gone; kept off every
    /// list.
    Retired { class_index: usize },
    /// Mapping returned to the OS.
    Large { size: usize },
}

/// Allocate `size` bytes, 16-byte aligned.
#[inline]
pub fn allocate(size: usize) -> Result<NonNull<u8>, AllocError> {
    if size == 0 {
        return Err(AllocError::ZeroSize);
    }
    match size_class_index(size) {
        Some(class_index) => allocate_small(class_index),
        None => large::allocate(size),
    }
}

#[inline(always)]
fn allocate_small(class_index: usize) -> Result<NonNull<u8>, AllocError> {
    match thread_cache::with_thread_cache(|cache| cache.allocate(class_index)) {
        Some(Some(block)) => Ok(block),
        Some(None) => Err(AllocError::OutOfMemory),
        // Thread is tearing down; its cache is gone.
        None => large::allocate(class_size(class_index)),
    }
}

/// Allocate `size` bytes aligned to `align` (a power of two).
pub fn allocate_aligned(size: usize, align: usize) -> Result<NonNull<u8>, AllocError> {
    if size == 0 {
        return Err(AllocError::ZeroSize);
    }
    if !align.is_power_of_two() {
        return Err(AllocError::UnsupportedAlignment(align));
    }
    if align <= MIN_ALIGN {
        return allocate(size);
    }
    large::allocate_aligned(size, align)
}

/// Release a pointer obtained from `allocate`.
///
/// A pointer whose header does not carry the live tag is refused without
/// touching any allocator state.
///
/// # Safety
/// `ptr` must be null or a pointer returned by `allocate`/`allocate_aligned`
/// whose memory is still mapped. Releasing twice is detected as long as the
/// block has not been handed out again in between.
pub unsafe fn release(ptr: *mut u8) -> Result<Released, ReleaseError> {
    let user = match NonNull::new(ptr) {
        Some(p) => p,
        None => return Ok(Released::Null),
    };

    let kind = match header::take_live(user) {
        Ok(kind) => kind,
        Err(err) => {
            stats::record_corruption();
            return Err(err);
        }
    };

    match kind {
        BlockKind::Large(block) => {
            let size = block.size;
            large::release(block);
            Ok(Released::Large { size })
        }
        BlockKind::Small { class_index } => {
            match thread_cache::with_thread_cache(|cache| cache.release(class_index, user)) {
                Some(()) => Ok(Released::Small { class_index }),
                None => Ok(Released::Retired { class_index }),
            }
        }
    }
}
