//! Intrusive singly linked free lists overlaid on free blocks' payloads.

use crate::hardening::header::HEADER_SIZE;
use core::cell::Cell;
use core::ptr::{self, NonNull};

/// Payload bytes in front of the link. They are never written while the
/// block is free, so the first 8 bytes a caller wrote survive a
/// release/allocate cycle. Every class is at least 16 bytes wide.
const LINK_OFFSET: usize = 8;

/// Overlay on the payload of a free block. Only valid while the block sits
/// on a free list; once popped the memory belongs to the caller. Only the
/// `next` field is ever read or written.
#[repr(C)]
#[allow(dead_code)] // only reached through raw pointers
struct FreeNode {
    _untouched: [u8; LINK_OFFSET],
    next: Option<NonNull<FreeNode>>,
}

const _: () = assert!(core::mem::size_of::<FreeNode>() <= super::size_class::CLASS_GRANULE);

#[inline(always)]
unsafe fn next_of(node: *mut FreeNode) -> Option<NonNull<FreeNode>> {
    ptr::addr_of!((*node).next).read()
}

#[inline(always)]
unsafe fn set_next(node: *mut FreeNode, next: Option<NonNull<FreeNode>>) {
    ptr::addr_of_mut!((*node).next).write(next);
}

/// A chain of blocks freshly carved out of a slab.
#[derive(Debug)]
pub struct Chain {
    head: NonNull<FreeNode>,
}

/// Carve `region` into `region_len / (HEADER_SIZE + class_size)` blocks and
/// link them in address order. Returns `None` if not even one block fits.
///
/// # Safety
/// `[base, base + region_len)` must be writable, 16-byte aligned at `base`,
/// and exclusively owned by the caller; ownership moves to the chain.
pub unsafe fn carve(base: NonNull<u8>, region_len: usize, class_size: usize) -> Option<Chain> {
    let block_size = HEADER_SIZE + class_size;
    let count = region_len / block_size;
    if count == 0 {
        return None;
    }

    let base = base.as_ptr();
    let first = base.add(HEADER_SIZE).cast::<FreeNode>();
    let mut current = first;
    for i in 1..count {
        let next = base.add(i * block_size + HEADER_SIZE).cast::<FreeNode>();
        set_next(current, Some(NonNull::new_unchecked(next)));
        current = next;
    }
    set_next(current, None);

    Some(Chain {
        head: NonNull::new_unchecked(first),
    })
}

/// LIFO list of free blocks of one size class.
///
/// Holds raw pointers in a `Cell`, so it is neither `Send` nor `Sync`: a
/// list is only ever reached from the thread that owns it.
pub struct FreeList {
    head: Cell<Option<NonNull<FreeNode>>>,
}

impl FreeList {
    pub const fn new() -> Self {
        FreeList {
            head: Cell::new(None),
        }
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.head.get().is_none()
    }

    /// Pop the most recently pushed block.
    ///
    /// # Safety
    /// Every node reachable from the head must be a free block owned by
    /// this list.
    #[inline(always)]
    pub unsafe fn pop(&self) -> Option<NonNull<u8>> {
        let node = self.head.get()?;
        self.head.set(next_of(node.as_ptr()));
        Some(node.cast())
    }

    /// Push a released block; it becomes the next one popped.
    ///
    /// # Safety
    /// `block` must be a 16-byte aligned block of at least 16 bytes that the
    /// caller owns and will no longer touch.
    #[inline(always)]
    pub unsafe fn push(&self, block: NonNull<u8>) {
        let node = block.cast::<FreeNode>();
        set_next(node.as_ptr(), self.head.get());
        self.head.set(Some(node));
    }

    /// Make a fresh chain the list's contents. Only called on an empty list.
    pub fn install(&self, chain: Chain) {
        debug_assert!(self.is_empty(), "installing a slab over a non-empty list");
        self.head.set(Some(chain.head));
    }

    /// Count the blocks on the list by walking it.
    ///
    /// # Safety
    /// Same as [`FreeList::pop`].
    #[cfg(test)]
    pub unsafe fn count(&self) -> usize {
        let mut n = 0;
        let mut cursor = self.head.get();
        while let Some(node) = cursor {
            n += 1;
            cursor = next_of(node.as_ptr());
        }
        n
    }
}
