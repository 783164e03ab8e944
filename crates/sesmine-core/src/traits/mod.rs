//! Core trait definitions shared across SESMine crates.

pub mod clock;
pub mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use store::{StateStore, StateStoreExt};
