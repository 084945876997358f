//! Size-class slabs: eight fixed classes, each refilled by slicing a fresh
//! 2 MiB mapping into equal header-prefixed blocks.

pub mod free_list;
pub mod refill;
pub mod size_class;

pub use free_list::FreeList;
pub use refill::refill;
pub use size_class::{class_size, size_class_index, MAX_SMALL_SIZE, NUM_SIZE_CLASSES};
