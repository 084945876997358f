//! Large-object path: one mapping per allocation, one unmap per release.
//!
//! Layout: `[lead padding][header][payload ...]`. `lead` is zero for plain
//! allocations and `align - HEADER_SIZE` for over-aligned ones, so the user
//! pointer lands on the requested alignment inside a page-aligned mapping.

use crate::error::AllocError;
use crate::hardening::header::{self, LargeBlock, HEADER_SIZE};
use crate::platform::{self, Mapping};
use crate::util::{page_size, MIN_ALIGN};
use crate::{init, stats};
use core::ptr::NonNull;

/// Map a block for `size` payload bytes, 16-byte aligned.
pub fn allocate(size: usize) -> Result<NonNull<u8>, AllocError> {
    allocate_aligned(size, MIN_ALIGN)
}

/// Map a block for `size` payload bytes aligned to `align`.
///
/// `align` must be a power of two no larger than the page size (and at
/// most 64 KiB, the largest lead a header can record).
pub fn allocate_aligned(size: usize, align: usize) -> Result<NonNull<u8>, AllocError> {
    init::ensure_initialized();

    let align = align.max(MIN_ALIGN);
    if !align.is_power_of_two() || align > page_size() || align > u16::MAX as usize + 1 {
        return Err(AllocError::UnsupportedAlignment(align));
    }
    let lead = align - HEADER_SIZE;

    let total = lead
        .checked_add(HEADER_SIZE)
        .and_then(|n| n.checked_add(size))
        .ok_or(AllocError::OutOfMemory)?;
    let mapping = platform::map(total).ok_or(AllocError::OutOfMemory)?;
    stats::record_large_mapped();

    // SAFETY: the mapping is page-aligned and at least `total` bytes long,
    // so the header at `lead` and the payload after it are in bounds.
    unsafe {
        let header_at = NonNull::new_unchecked(mapping.base.as_ptr().add(lead));
        Ok(header::write_large(header_at, size, mapping.huge, lead as u16))
    }
}

/// Unmap a large block whose header was retired by `header::take_live`.
///
/// # Safety
/// `block` must describe a live large mapping; no pointer into it may be
/// used afterwards.
pub unsafe fn release(block: LargeBlock) {
    let len = match platform::mapped_len(block.requested_len(), block.huge) {
        Some(len) => len,
        // Cannot happen for a header we wrote: `allocate` already rounded
        // this length successfully.
        None => return,
    };
    platform::unmap(Mapping {
        base: NonNull::new_unchecked(block.mapping_base()),
        len,
        huge: block.huge,
    });
    stats::record_large_unmapped();
}
