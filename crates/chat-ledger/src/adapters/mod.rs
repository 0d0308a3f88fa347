//! # Adapters Layer (Outer Hexagon)
//!
//! Concrete implementations of the outbound ports.
//!
//! - `memory` / `file`: `KeyValueStore` backends
//! - `publisher`: `EventPublisher` sinks

pub mod file;
pub mod memory;
pub mod publisher;

pub use file::FileBackedKVStore;
pub use memory::InMemoryKVStore;
pub use publisher::{NoOpPublisher, RecordingPublisher};
