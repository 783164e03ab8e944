//! Access policy table: level ranking, hub permissions and page requirements.

pub mod table;

pub use table::{AccessPolicy, Hub, LevelProfile, Requirement, SecurityParameters};
