use core::ptr;

/// `MAP_HUGETLB` anonymous mappings are available on Linux.
pub const SUPPORTS_HUGE_PAGES: bool = true;

/// Map anonymous read-write memory backed by standard pages.
///
/// # Safety
/// `size` must be page-aligned and non-zero.
pub unsafe fn map_anonymous(size: usize) -> *mut u8 {
    mmap_with_flags(size, libc::MAP_PRIVATE | libc::MAP_ANONYMOUS)
}

/// Map anonymous read-write memory backed by 2 MiB hugepages.
/// Fails (null) when hugepages are disabled or the 2 MiB pool is exhausted.
///
/// The page size is pinned with `MAP_HUGE_2MB`: without it the kernel uses
/// the default hugepage size, which may be 1 GiB, and `unmap` with a 2 MiB
/// rounded length would then fail.
///
/// # Safety
/// `size` must be a non-zero multiple of `HUGE_PAGE_SIZE`.
pub unsafe fn map_huge(size: usize) -> *mut u8 {
    mmap_with_flags(
        size,
        libc::MAP_PRIVATE | libc::MAP_ANONYMOUS | libc::MAP_HUGETLB | libc::MAP_HUGE_2MB,
    )
}

unsafe fn mmap_with_flags(size: usize, flags: libc::c_int) -> *mut u8 {
    let result = libc::mmap(
        ptr::null_mut(),
        size,
        libc::PROT_READ | libc::PROT_WRITE,
        flags,
        -1,
        0,
    );
    if result == libc::MAP_FAILED {
        ptr::null_mut()
    } else {
        result as *mut u8
    }
}

/// Unmap memory.
///
/// # Safety
/// `ptr` must have been returned by one of the map functions with the same `size`.
pub unsafe fn unmap(ptr: *mut u8, size: usize) {
    let ret = libc::munmap(ptr as *mut libc::c_void, size);
    debug_assert!(ret == 0, "munmap failed");
}
