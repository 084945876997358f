//! Address-space provider: anonymous private mappings straight from the OS.
//!
//! `map` tries a hugepage-backed mapping first and falls back to standard
//! pages. The returned [`Mapping`] records the exact length the kernel was
//! given, which is also the only length `unmap` may be called with.

#[cfg(target_os = "linux")]
pub mod linux;
#[cfg(target_os = "linux")]
pub use linux as sys;

#[cfg(target_os = "macos")]
pub mod macos;
#[cfg(target_os = "macos")]
pub use macos as sys;

use crate::util::{checked_align_up, page_size, HUGE_PAGE_SIZE};
use crate::{config, stats};
use core::ptr::NonNull;

/// A live anonymous mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mapping {
    pub base: NonNull<u8>,
    /// Length passed to the kernel, rounded to the backing page size.
    pub len: usize,
    /// Backed by hugepages.
    pub huge: bool,
}

/// Length the kernel is given for a request of `len` bytes.
///
/// Hugepage mappings must be unmapped in whole hugepages, so both `map` and
/// every later `unmap` go through this rounding.
#[inline]
pub fn mapped_len(len: usize, huge: bool) -> Option<usize> {
    if huge {
        checked_align_up(len, HUGE_PAGE_SIZE)
    } else {
        checked_align_up(len, page_size())
    }
}

/// Map `len` bytes of zeroed, private, read-write memory.
///
/// Returns `None` only if both the hugepage and the standard-page attempt
/// fail (or `len` is zero / overflows when rounded).
pub fn map(len: usize) -> Option<Mapping> {
    if len == 0 {
        return None;
    }

    if sys::SUPPORTS_HUGE_PAGES && config::hugepages_enabled() {
        if let Some(huge_len) = mapped_len(len, true) {
            // SAFETY: huge_len is a non-zero multiple of the hugepage size.
            let base = unsafe { sys::map_huge(huge_len) };
            if let Some(base) = NonNull::new(base) {
                return Some(Mapping {
                    base,
                    len: huge_len,
                    huge: true,
                });
            }
            stats::record_hugepage_fallback();
        }
    }

    let std_len = mapped_len(len, false)?;
    // SAFETY: std_len is a non-zero multiple of the page size.
    let base = unsafe { sys::map_anonymous(std_len) };
    NonNull::new(base).map(|base| Mapping {
        base,
        len: std_len,
        huge: false,
    })
}

/// Release a mapping previously returned by [`map`].
///
/// # Safety
/// `mapping` must come from `map` and must not have been unmapped already.
/// No pointer into it may be used afterwards.
#[inline]
pub unsafe fn unmap(mapping: Mapping) {
    sys::unmap(mapping.base.as_ptr(), mapping.len);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_returns_zeroed_writable_memory() {
        let m = map(100).expect("mapping failed");
        assert!(m.len >= 100);
        unsafe {
            let p = m.base.as_ptr();
            assert_eq!(*p, 0);
            assert_eq!(*p.add(99), 0);
            p.write(0xAB);
            p.add(99).write(0xCD);
            assert_eq!(*p, 0xAB);
            assert_eq!(*p.add(99), 0xCD);
            unmap(m);
        }
    }

    #[test]
    fn map_zero_fails() {
        assert!(map(0).is_none());
    }

    #[test]
    fn mapped_len_rounds_to_backing_page() {
        assert_eq!(mapped_len(1, true), Some(HUGE_PAGE_SIZE));
        assert_eq!(mapped_len(HUGE_PAGE_SIZE + 1, true), Some(2 * HUGE_PAGE_SIZE));
        assert_eq!(mapped_len(1, false), Some(page_size()));
        assert_eq!(mapped_len(usize::MAX, false), None);
    }

    #[test]
    fn mapping_length_matches_rounding() {
        let m = map(5016).expect("mapping failed");
        assert_eq!(Some(m.len), mapped_len(5016, m.huge));
        unsafe { unmap(m) };
    }

    #[test]
    fn hugepage_attempt_maps_huge_or_counts_fallback() {
        if !sys::SUPPORTS_HUGE_PAGES {
            return;
        }
        config::set_hugepages_enabled(true);
        let before = stats::snapshot().hugepage_fallbacks;
        let m = map(5000).expect("mapping failed");
        let after = stats::snapshot().hugepage_fallbacks;
        if m.huge {
            assert_eq!(m.len, HUGE_PAGE_SIZE);
        } else {
            assert!(after > before, "standard pages used without a recorded fallback");
            assert_eq!(Some(m.len), mapped_len(5000, false));
        }
        unsafe {
            m.base.as_ptr().add(4999).write(0x5A);
            unmap(m);
        }
    }
}
