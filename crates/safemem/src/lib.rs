//! safemem: a thread-caching slab allocator.
//!
//! Requests of up to 128 bytes are served from eight 16-byte-wide size
//! classes, each backed by per-thread free lists refilled from 2 MiB
//! (hugepage-backed when available) slabs. Larger requests get their own
//! mapping. Every block carries a 16-byte header with an integrity tag, so
//! `release` can detect double frees and gross corruption cheaply.

extern crate libc;

pub mod allocator;
pub mod api;
pub mod config;
pub mod error;
pub mod hardening;
pub mod init;
pub mod large;
pub mod platform;
pub mod slab;
pub mod stats;
pub mod util;

#[cfg(feature = "global-allocator")]
pub mod global_alloc;

pub use allocator::Released;
pub use api::{
    allocate, allocate_aligned, release, try_allocate, try_allocate_aligned, try_release, Block,
};
pub use error::{AllocError, ReleaseError};
pub use stats::Stats;

#[cfg(feature = "global-allocator")]
pub use global_alloc::SafeMem;
