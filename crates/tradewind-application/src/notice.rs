//! User-visible notices.
//!
//! Notices are a presentation concern. The store emits them on a channel
//! next to the `Result` it returns; whether and how they are shown is up to
//! whoever holds the receiver.

use serde::Serialize;
use strum::Display;
use tokio::sync::mpsc;
use tradewind_core::TradewindError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    ConnectionFailed,
    SessionExpired,
    ViewingKeysRejected,
    PartialAuthorization,
    TradeFailed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn new(kind: NoticeKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Notice for a failed connect sequence.
    pub fn connect_failed(err: &TradewindError) -> Self {
        if err.is_auth() {
            Self::new(NoticeKind::SessionExpired, "Session expired. Logging out.")
        } else {
            Self::new(NoticeKind::ConnectionFailed, err.to_string())
        }
    }
}

/// Optional, best-effort notice channel.
#[derive(Debug, Clone, Default)]
pub struct NoticeSink {
    sender: Option<mpsc::UnboundedSender<Notice>>,
}

impl NoticeSink {
    pub fn new(sender: mpsc::UnboundedSender<Notice>) -> Self {
        Self {
            sender: Some(sender),
        }
    }

    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn emit(&self, notice: Notice) {
        tracing::info!("[Notice] {}: {}", notice.kind, notice.message);
        if let Some(sender) = &self.sender {
            // A dropped receiver just means nobody is listening.
            let _ = sender.send(notice);
        }
    }
}
