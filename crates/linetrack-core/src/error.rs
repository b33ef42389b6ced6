// ── Core error types ──
//
// User-facing errors from linetrack-core. These are NOT API-specific:
// consumers never see reqwest errors or JSON parse failures directly.
// The `From<linetrack_api::Error>` impl translates transport-layer errors
// into domain-appropriate variants.

use thiserror::Error;

/// Unified error type for the core crate.
///
/// Every variant carries owned strings only, so errors can ride inside
/// cloned UI actions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot reach line server at {url}: {reason}")]
    Unreachable { url: String, reason: String },

    #[error("Line server timed out")]
    Timeout,

    // ── Server answers ───────────────────────────────────────────────
    #[error("Request rejected (HTTP {status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Not found: {identifier}")]
    NotFound { identifier: String },

    #[error("Unexpected response: {message}")]
    Decode { message: String },

    // ── Client-side errors ───────────────────────────────────────────
    #[error("Validation failed: {message}")]
    Validation { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl CoreError {
    /// Returns `true` if re-issuing the same request might succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Unreachable { .. } | Self::Timeout => true,
            Self::Rejected { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<linetrack_api::Error> for CoreError {
    fn from(err: linetrack_api::Error) -> Self {
        match err {
            linetrack_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout
                } else if e.is_connect() {
                    CoreError::Unreachable {
                        url: e
                            .url()
                            .map_or_else(|| "<unknown>".into(), ToString::to_string),
                        reason: e.to_string(),
                    }
                } else if e.is_decode() {
                    CoreError::Decode {
                        message: e.to_string(),
                    }
                } else {
                    CoreError::Rejected {
                        status: e.status().map_or(0, |s| s.as_u16()),
                        message: e.to_string(),
                    }
                }
            }
            linetrack_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            linetrack_api::Error::CannotBeABase(url) => CoreError::Config {
                message: format!("Base URL cannot carry API paths: {url}"),
            },
            linetrack_api::Error::Tls(msg) => CoreError::Unreachable {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            linetrack_api::Error::Status { status: 404, body } => CoreError::NotFound {
                identifier: if body.is_empty() {
                    "resource".into()
                } else {
                    body
                },
            },
            linetrack_api::Error::Status { status, body } => CoreError::Rejected {
                status,
                message: body,
            },
            linetrack_api::Error::Deserialization { message, body: _ } => {
                CoreError::Decode { message }
            }
        }
    }
}
