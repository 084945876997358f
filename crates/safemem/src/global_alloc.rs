//! `#[global_allocator]` support for safemem.
//!
//! ```rust,ignore
//! use safemem::SafeMem;
//!
//! #[global_allocator]
//! static GLOBAL: SafeMem = SafeMem;
//! ```

use crate::allocator::engine;
use crate::hardening;
use crate::util::MIN_ALIGN;
use core::alloc::{GlobalAlloc, Layout};
use core::ptr;

/// A zero-sized unit struct that implements [`GlobalAlloc`] on top of
/// `allocate`/`release`. Alignments above 16 bytes are served from
/// individual mappings, up to the page size.
pub struct SafeMem;

unsafe impl GlobalAlloc for SafeMem {
    #[inline]
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        let size = layout.size();
        let align = layout.align();

        // Zero-size types: return a well-aligned dangling pointer.
        if size == 0 {
            return align as *mut u8;
        }

        let result = if align <= MIN_ALIGN {
            engine::allocate(size)
        } else {
            engine::allocate_aligned(size, align)
        };
        match result {
            Ok(p) => p.as_ptr(),
            Err(_) => ptr::null_mut(),
        }
    }

    #[inline]
    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        if layout.size() == 0 {
            return;
        }
        if let Err(err) = engine::release(ptr) {
            hardening::report(&err);
        }
    }
}
