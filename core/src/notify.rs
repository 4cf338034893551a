//! Notification sink — where manager reports leave the engine.
//!
//! The engine only builds report payloads. Delivery is delegated to a
//! `NotificationSink`; the bundled `LogSink` writes to the log and never
//! contacts a mail server.

use crate::error::TriageResult;
use serde::{Deserialize, Serialize};

/// Result of handing one manager report to the sink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub success:       bool,
    pub email_content: String,
    pub recipient:     Option<String>,
    pub subject:       String,
}

pub trait NotificationSink: Send {
    fn deliver(&self, recipient: &str, subject: &str, body: &str) -> TriageResult<()>;
}

/// Logs every message instead of sending it.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl NotificationSink for LogSink {
    fn deliver(&self, recipient: &str, subject: &str, body: &str) -> TriageResult<()> {
        log::info!("Email to be sent to {recipient}: {subject}");
        log::debug!("{body}");
        Ok(())
    }
}
