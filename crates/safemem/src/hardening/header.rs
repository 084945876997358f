//! Block header protocol.
//!
//! Every block handed out by the allocator is preceded by a 16-byte
//! [`BlockHeader`]. This module and `slab::free_list` are the only places
//! that turn a user pointer into a header pointer or reinterpret raw block
//! memory; everything above them works with `NonNull<u8>` user pointers.
//!
//! ```text
//!   small:  [ header | payload (class size) ][ header | payload ] ...   (slab)
//!   large:  [ lead padding | header | payload ... ]                     (own mapping)
//!                                    ^ user pointer
//! ```

use crate::error::ReleaseError;
use crate::slab::size_class;
use crate::util::{is_aligned, MIN_ALIGN};
use core::mem::size_of;
use core::ptr::{self, NonNull};

/// Sentinel stored in the header of every live block.
pub const LIVE_TAG: u32 = 0xDEAD_BEEF;

/// Block is an individual mapping.
const FLAG_LARGE: u16 = 1 << 0;
/// That mapping is hugepage-backed.
const FLAG_HUGE: u16 = 1 << 1;

#[repr(C, align(16))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockHeader {
    /// Class size for small blocks, exact requested size for large ones.
    pub size: usize,
    /// `LIVE_TAG` while allocated, zero once released.
    pub tag: u32,
    pub flags: u16,
    /// Bytes between the mapping base and this header (large blocks only).
    pub lead: u16,
}

pub const HEADER_SIZE: usize = size_of::<BlockHeader>();

// User pointers stay 16-byte aligned only if the header is exactly one granule.
const _: () = assert!(HEADER_SIZE == MIN_ALIGN);

impl BlockHeader {
    pub fn is_live(&self) -> bool {
        self.tag == LIVE_TAG
    }

    pub fn is_large(&self) -> bool {
        self.flags & FLAG_LARGE != 0
    }

    pub fn is_huge(&self) -> bool {
        self.flags & FLAG_HUGE != 0
    }
}

/// A large block whose header has just been retired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LargeBlock {
    /// Address of the header.
    pub header: NonNull<u8>,
    /// Requested payload size.
    pub size: usize,
    pub huge: bool,
    pub lead: usize,
}

impl LargeBlock {
    /// Base address of the mapping holding this block.
    pub fn mapping_base(&self) -> *mut u8 {
        self.header.as_ptr().wrapping_sub(self.lead)
    }

    /// Bytes originally requested from the address-space provider.
    pub fn requested_len(&self) -> usize {
        self.lead + HEADER_SIZE + self.size
    }
}

/// Where a validated block goes on release.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Small { class_index: usize },
    Large(LargeBlock),
}

#[inline(always)]
fn header_of(user: NonNull<u8>) -> *mut BlockHeader {
    user.as_ptr().wrapping_sub(HEADER_SIZE).cast()
}

/// Stamp the header in front of a small block popped from a free list.
///
/// # Safety
/// `user` must be a block carved by `slab::free_list::carve`, i.e. preceded
/// by `HEADER_SIZE` bytes the allocator owns.
#[inline(always)]
pub unsafe fn write_small(user: NonNull<u8>, class_size: usize) {
    header_of(user).write(BlockHeader {
        size: class_size,
        tag: LIVE_TAG,
        flags: 0,
        lead: 0,
    });
}

/// Stamp a large-block header at `header` and return the user pointer.
///
/// # Safety
/// `header` must be 16-byte aligned and point to at least
/// `HEADER_SIZE + size` writable bytes of a mapping owned by the caller.
pub unsafe fn write_large(header: NonNull<u8>, size: usize, huge: bool, lead: u16) -> NonNull<u8> {
    let flags = if huge { FLAG_LARGE | FLAG_HUGE } else { FLAG_LARGE };
    header.as_ptr().cast::<BlockHeader>().write(BlockHeader {
        size,
        tag: LIVE_TAG,
        flags,
        lead,
    });
    NonNull::new_unchecked(header.as_ptr().add(HEADER_SIZE))
}

/// Read the header in front of `user` without changing it.
///
/// # Safety
/// The `HEADER_SIZE` bytes before `user` must be readable.
pub unsafe fn peek(user: NonNull<u8>) -> BlockHeader {
    header_of(user).read()
}

/// Validate the header in front of `user` and clear its tag.
///
/// On any mismatch the header is left exactly as found and an error is
/// returned; nothing else is read or written.
///
/// # Safety
/// If `user` is 16-byte aligned, the `HEADER_SIZE` bytes before it must be
/// readable and writable. Pointers from `allocate` (live or released, but
/// not unmapped) satisfy this.
pub unsafe fn take_live(user: NonNull<u8>) -> Result<BlockKind, ReleaseError> {
    let addr = user.as_ptr() as usize;
    if !is_aligned(addr, MIN_ALIGN) || addr < HEADER_SIZE {
        return Err(ReleaseError::Misaligned(addr));
    }

    let h = header_of(user);
    let header = h.read();
    if !header.is_live() {
        return Err(ReleaseError::InvalidTag {
            ptr: addr,
            found: header.tag,
        });
    }

    let kind = if header.is_large() {
        BlockKind::Large(LargeBlock {
            header: NonNull::new_unchecked(h.cast()),
            size: header.size,
            huge: header.is_huge(),
            lead: header.lead as usize,
        })
    } else {
        match size_class::class_of_block_size(header.size) {
            Some(class_index) => BlockKind::Small { class_index },
            None => {
                return Err(ReleaseError::CorruptHeader {
                    ptr: addr,
                    size: header.size,
                })
            }
        }
    };

    ptr::addr_of_mut!((*h).tag).write(0);
    Ok(kind)
}
