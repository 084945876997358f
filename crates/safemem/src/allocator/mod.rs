pub mod engine;
pub mod thread_cache;

pub use engine::Released;
