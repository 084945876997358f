use crate::util::MIN_ALIGN;

/// Eight fixed-width classes of 16, 32, ... 128 bytes.
pub const NUM_SIZE_CLASSES: usize = 8;

/// Width of every class step; also the minimum payload size.
pub const CLASS_GRANULE: usize = MIN_ALIGN;

/// Largest payload served from slabs. Anything above goes to the large path.
pub const MAX_SMALL_SIZE: usize = NUM_SIZE_CLASSES * CLASS_GRANULE;

/// Class index for a request of `size` bytes: `ceil(size / 16) - 1`.
/// Returns `None` for zero and for anything above [`MAX_SMALL_SIZE`].
#[inline(always)]
pub const fn size_class_index(size: usize) -> Option<usize> {
    if size == 0 || size > MAX_SMALL_SIZE {
        return None;
    }
    Some((size + CLASS_GRANULE - 1) / CLASS_GRANULE - 1)
}

/// Payload size of a class.
#[inline(always)]
pub const fn class_size(class_index: usize) -> usize {
    (class_index + 1) * CLASS_GRANULE
}

/// Recover the class from the size recorded in a small block's header.
/// Only exact class sizes map back to a class.
#[inline]
pub const fn class_of_block_size(size: usize) -> Option<usize> {
    if size == 0 || size % CLASS_GRANULE != 0 || size > MAX_SMALL_SIZE {
        return None;
    }
    Some(size / CLASS_GRANULE - 1)
}
