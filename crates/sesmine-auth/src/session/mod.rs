//! Session lifecycle: issuance, sliding expiry, restore and invalidation.

pub mod manager;
pub mod monitor;
pub mod token;

pub use manager::{Invalidation, SessionManager};
pub use monitor::{MonitorHandle, SessionMonitor};
