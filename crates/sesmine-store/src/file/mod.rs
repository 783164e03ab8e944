//! File-backed state store.

pub mod store;

pub use store::FileStore;
