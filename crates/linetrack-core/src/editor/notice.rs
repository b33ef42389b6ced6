// ── Notices and confirmations ──
//
// Alerts and yes/no prompts are plain values the editor hands to its
// caller. The UI renders them; tests inspect them.

use std::fmt;

use linetrack_api::RecordId;

/// Severity of a user-visible notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// A message for the operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
    /// The failed action can be re-issued with
    /// [`retry_last_failed`](super::SettingsEditor::retry_last_failed).
    pub retryable: bool,
}

impl Notice {
    pub fn success(msg: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: msg.into(),
            retryable: false,
        }
    }

    /// Validation problem: nothing was sent.
    pub fn warning(msg: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: msg.into(),
            retryable: false,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: msg.into(),
            retryable: false,
        }
    }

    pub fn info(msg: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: msg.into(),
            retryable: false,
        }
    }

    #[must_use]
    pub fn with_retry(mut self) -> Self {
        self.retryable = true;
        self
    }
}

/// A destructive action waiting for a yes/no answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Confirmation {
    DeleteStation {
        id: RecordId,
        business_id: RecordId,
        name: String,
    },
}

impl fmt::Display for Confirmation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DeleteStation { name, .. } => {
                write!(f, "Are you sure you want to delete station {name}?")
            }
        }
    }
}
