//! Session-lifecycle events and their subscribers.

pub mod analytics;
pub mod bus;
pub mod event;
pub mod notice;

pub use analytics::AnalyticsRecorder;
pub use bus::{EventNotifier, EventSubscriber, SubscriptionId};
pub use event::{AuthEvent, AuthEventKind, SessionSummary, UserSummary};
pub use notice::{Notice, NoticeSink, NoticeSubscriber, Severity};
