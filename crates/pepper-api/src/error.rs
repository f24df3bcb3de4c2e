use thiserror::Error;

/// Top-level error type for the `pepper-api` crate.
///
/// Covers every failure mode of the two salt-api calls this crate makes:
/// authentication, transport, and remote execution. The `pepper` binary
/// maps these into user-facing diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Login rejected, or the login response could not be understood.
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// An execute call was attempted before a successful login.
    #[error("Not authenticated -- call login first")]
    NotAuthenticated,

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ── Remote execution ────────────────────────────────────────────
    /// The server accepted the request but reported a failure.
    ///
    /// `payload` holds whatever `return` data came back alongside the
    /// failure, so callers can still show it.
    #[error("Remote execution failed: {message}")]
    RemoteExecution {
        message: String,
        payload: Option<serde_json::Value>,
    },
}

impl Error {
    /// Returns `true` if this error came from the network layer rather
    /// than from the server's answer.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// Partial result data attached to a remote failure, if any.
    pub fn payload(&self) -> Option<&serde_json::Value> {
        match self {
            Self::RemoteExecution { payload, .. } => payload.as_ref(),
            _ => None,
        }
    }
}
