//! Toast-style user feedback.
//!
//! Action execution reports progress and outcomes as [`Feedback`] values
//! delivered through a [`Notifier`] capability, so front ends decide how to
//! render them and tests can record them.

/// Visual style of a feedback notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackStyle {
    Success,
    Failure,
    /// An operation is still running (e.g. a privileged retry in flight).
    Progress,
}

/// One transient status notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feedback {
    pub style: FeedbackStyle,
    pub title: String,
    pub message: Option<String>,
}

impl Feedback {
    pub fn success(title: impl Into<String>) -> Self {
        Self {
            style: FeedbackStyle::Success,
            title: title.into(),
            message: None,
        }
    }

    pub fn failure(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            style: FeedbackStyle::Failure,
            title: title.into(),
            message: Some(message.into()),
        }
    }

    pub fn progress(title: impl Into<String>) -> Self {
        Self {
            style: FeedbackStyle::Progress,
            title: title.into(),
            message: None,
        }
    }

    /// True for success-styled feedback.
    pub fn is_success(&self) -> bool {
        self.style == FeedbackStyle::Success
    }
}

/// Capability for delivering feedback to the user.
pub trait Notifier {
    fn notify(&self, feedback: Feedback);
}

/// Notifier that forwards feedback to the tracing subscriber.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, feedback: Feedback) {
        let message = feedback.message.as_deref().unwrap_or_default();
        match feedback.style {
            FeedbackStyle::Failure => {
                tracing::error!(title = %feedback.title, %message, "notification")
            }
            _ => tracing::info!(title = %feedback.title, %message, "notification"),
        }
    }
}
