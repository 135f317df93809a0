//! Shared error types for the services crate.

use thiserror::Error;

/// Errors surfaced by the remote HTTP boundary.
///
/// Every non-2xx response becomes `Status` (carrying the response body's
/// `error` field when one is present) except 401, which gets its own variant
/// so callers can tear down the session instead of rendering a stale
/// authenticated view.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ApiError {
    #[error("unauthorized")]
    Unauthorized,

    #[error("{message}")]
    Status { status: u16, message: String },

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

impl ApiError {
    /// Builds the error for a non-2xx response, preferring the remote
    /// service's `error` field over the generic message.
    #[must_use]
    pub fn from_status(status: u16, error_body: Option<String>) -> Self {
        if status == 401 {
            return Self::Unauthorized;
        }
        let message =
            error_body.unwrap_or_else(|| format!("HTTP error, status {status}"));
        Self::Status { status, message }
    }

    /// True when the caller should clear its session and log out.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }
}
