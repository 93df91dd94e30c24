//! Host environment adapters

pub mod memory;

pub use memory::MemoryHost;
