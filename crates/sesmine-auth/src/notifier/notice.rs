//! User-visible notices derived from lifecycle events and errors.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use sesmine_core::result::AppResult;

use super::bus::EventSubscriber;
use super::event::{AuthEvent, AuthEventKind};
use crate::error::AuthError;

/// Notice severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Neutral information.
    Info,
    /// A completed action.
    Success,
    /// Something the user should act on.
    Warning,
    /// A failed action.
    Error,
}

/// A message for the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    /// Text to show.
    pub message: String,
    /// Severity.
    pub severity: Severity,
    /// Whether the user may close it.
    pub dismissible: bool,
}

impl Notice {
    /// Creates a dismissible notice.
    pub fn new(message: impl Into<String>, severity: Severity) -> Self {
        Self {
            message: message.into(),
            severity,
            dismissible: true,
        }
    }

    /// Sets whether the notice can be dismissed.
    pub fn dismissible(mut self, dismissible: bool) -> Self {
        self.dismissible = dismissible;
        self
    }
}

/// The presentation collaborator that renders notices.
pub trait NoticeSink: Send + Sync {
    /// Shows a notice.
    fn show(&self, notice: &Notice);
}

/// Turns lifecycle events into notices for a [`NoticeSink`].
///
/// Failed logins are not forwarded; the caller renders `AuthError::notice`
/// for those.
pub struct NoticeSubscriber {
    sink: Arc<dyn NoticeSink>,
}

impl NoticeSubscriber {
    /// Creates a subscriber forwarding to `sink`.
    pub fn new(sink: Arc<dyn NoticeSink>) -> Self {
        Self { sink }
    }

    /// The notice shown for `event`, if any.
    pub fn notice_for(event: &AuthEvent) -> Option<Notice> {
        let name = event
            .user
            .as_ref()
            .and_then(|user| user.full_name.as_deref());

        match event.kind {
            AuthEventKind::LoginSuccess => Some(Notice::new(
                match name {
                    Some(name) => format!("Welcome back, {name}!"),
                    None => "Welcome back!".to_string(),
                },
                Severity::Success,
            )),
            AuthEventKind::Logout => Some(Notice::new(
                "You have been logged out successfully.",
                Severity::Info,
            )),
            AuthEventKind::SessionExpired => Some(AuthError::SessionExpired.notice()),
            AuthEventKind::RegistrationSubmitted => Some(Notice::new(
                "Registration submitted successfully! You will receive an email once your account is approved.",
                Severity::Success,
            )),
            AuthEventKind::SessionRestored | AuthEventKind::LoginFailed => None,
        }
    }
}

impl EventSubscriber for NoticeSubscriber {
    fn name(&self) -> &str {
        "notices"
    }

    fn on_event(&self, event: &AuthEvent) -> AppResult<()> {
        if let Some(notice) = Self::notice_for(event) {
            self.sink.show(&notice);
        }
        Ok(())
    }
}
