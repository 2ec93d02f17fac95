//! Transient user-visible messages ("toasts").

use serde::Serialize;
use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToastLevel {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Toast {
    pub level: ToastLevel,
    pub text: String,
}

impl Toast {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            level: ToastLevel::Success,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: ToastLevel::Error,
            text: text.into(),
        }
    }
}

/// Where toasts go. The presentation layer typically drains a channel.
pub trait FeedbackSink: Send + Sync + 'static {
    fn show(&self, toast: Toast);
}

impl FeedbackSink for mpsc::UnboundedSender<Toast> {
    fn show(&self, toast: Toast) {
        if self.send(toast).is_err() {
            tracing::debug!("Toast dropped, receiver gone");
        }
    }
}

/// Sink for headless sessions: toasts only reach the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogFeedback;

impl FeedbackSink for LogFeedback {
    fn show(&self, toast: Toast) {
        match toast.level {
            ToastLevel::Success => tracing::info!(text = %toast.text, "Toast"),
            ToastLevel::Error => tracing::warn!(text = %toast.text, "Toast"),
        }
    }
}
