//! In-memory state store.

pub mod store;

pub use store::MemoryStore;
