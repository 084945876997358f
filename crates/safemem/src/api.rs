//! Public entry points.
//!
//! `allocate`/`release` are the drop-in pair: null on failure, diagnostics
//! on misuse. The `try_` forms return the typed outcome they are built on.
//! `safe_malloc`/`safe_free` export the same pair over the C ABI.

use crate::allocator::{engine, Released};
use crate::error::{AllocError, ReleaseError};
use crate::hardening;
use core::ffi::c_void;
use core::ptr::{self, NonNull};

/// Allocate `size` bytes. Returns null for `size == 0` or when the address
/// space is exhausted. The pointer is always 16-byte aligned.
#[inline]
pub fn allocate(size: usize) -> *mut u8 {
    match engine::allocate(size) {
        Ok(p) => p.as_ptr(),
        Err(_) => ptr::null_mut(),
    }
}

#[inline]
pub fn try_allocate(size: usize) -> Result<NonNull<u8>, AllocError> {
    engine::allocate(size)
}

/// Allocate `size` bytes aligned to `align` (a power of two no larger than
/// the page size). Null on failure.
pub fn allocate_aligned(size: usize, align: usize) -> *mut u8 {
    match engine::allocate_aligned(size, align) {
        Ok(p) => p.as_ptr(),
        Err(_) => ptr::null_mut(),
    }
}

pub fn try_allocate_aligned(size: usize, align: usize) -> Result<NonNull<u8>, AllocError> {
    engine::allocate_aligned(size, align)
}

/// Release a pointer from `allocate`. Null is a no-op. A pointer whose
/// header fails the integrity check (double release, corruption) is
/// reported on stderr and otherwise ignored.
///
/// # Safety
/// `ptr` must be null or come from this allocator and still be mapped.
/// Releasing a small block twice is detected and reported. Releasing a large
/// block (over 128 bytes, or over-aligned) twice is undefined behaviour: the
/// first release unmaps it, so the second reads unmapped memory and will
/// usually fault.
#[inline]
pub unsafe fn release(ptr: *mut u8) {
    if let Err(err) = engine::release(ptr) {
        hardening::report(&err);
    }
}

/// Like [`release`], but hands the refusal back instead of reporting it.
///
/// # Safety
/// Same as [`release`], including the undefined behaviour of releasing a
/// large block twice.
#[inline]
pub unsafe fn try_release(ptr: *mut u8) -> Result<Released, ReleaseError> {
    engine::release(ptr)
}

// ============================================================================
// C ABI
// ============================================================================

#[no_mangle]
pub unsafe extern "C" fn safe_malloc(size: usize) -> *mut c_void {
    allocate(size) as *mut c_void
}

#[no_mangle]
pub unsafe extern "C" fn safe_free(ptr: *mut c_void) {
    release(ptr as *mut u8);
}

// ============================================================================
// Owned block
// ============================================================================

/// An owned allocation of `len` bytes, released on drop.
///
/// Fresh slab blocks are zeroed by the kernel, but recycled ones keep
/// whatever their previous owner wrote, so contents start unspecified.
pub struct Block {
    ptr: NonNull<u8>,
    len: usize,
}

impl Block {
    pub fn new(len: usize) -> Result<Block, AllocError> {
        let ptr = engine::allocate(len)?;
        Ok(Block { ptr, len })
    }

    /// Allocate and zero-fill.
    pub fn zeroed(len: usize) -> Result<Block, AllocError> {
        let block = Block::new(len)?;
        // SAFETY: the block owns `len` writable bytes.
        unsafe { ptr::write_bytes(block.ptr.as_ptr(), 0, len) };
        Ok(block)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn as_ptr(&self) -> *mut u8 {
        self.ptr.as_ptr()
    }

    pub fn as_slice(&self) -> &[u8] {
        // SAFETY: `len` bytes owned by this block; u8 has no invalid values
        // and mapped memory is always initialized.
        unsafe { core::slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }

    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        // SAFETY: as above, and `&mut self` makes the access unique.
        unsafe { core::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }

    /// Give up ownership without releasing.
    pub fn into_raw(self) -> *mut u8 {
        let p = self.ptr.as_ptr();
        core::mem::forget(self);
        p
    }
}

impl Drop for Block {
    fn drop(&mut self) {
        // SAFETY: the pointer came from `allocate` and is released once.
        unsafe { release(self.ptr.as_ptr()) }
    }
}

// A block is plain owned memory; any thread may release it.
unsafe impl Send for Block {}

impl core::fmt::Debug for Block {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Block")
            .field("ptr", &self.ptr)
            .field("len", &self.len)
            .finish()
    }
}
