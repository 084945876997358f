use thiserror::Error;

/// Why `allocate` returned no memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AllocError {
    #[error("zero-size allocation request")]
    ZeroSize,
    #[error("out of address space")]
    OutOfMemory,
    #[error("unsupported alignment {0}")]
    UnsupportedAlignment(usize),
}

/// Why `release` refused a pointer. The allocator state is untouched in
/// every case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ReleaseError {
    #[error("corruption or double free detected at {ptr:#x} (tag {found:#x})")]
    InvalidTag { ptr: usize, found: u32 },
    #[error("pointer {0:#x} was not returned by allocate (misaligned)")]
    Misaligned(usize),
    #[error("corrupt block header at {ptr:#x} (size {size})")]
    CorruptHeader { ptr: usize, size: usize },
}
