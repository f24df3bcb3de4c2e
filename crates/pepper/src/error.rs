//! CLI error types with miette diagnostics.
//!
//! Maps `pepper_api::Error` and `pepper_config::ConfigError` into
//! user-facing errors with actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use pepper_config::ConfigError;

/// Process exit codes.
pub mod exit_code {
    /// Success, or a clean exit after Ctrl-C.
    pub const SUCCESS: i32 = 0;
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Configuration ────────────────────────────────────────────────
    #[error(transparent)]
    #[diagnostic(
        code(pepper::config),
        help("Check the [main] section of your config file (-c, PEPPERRC, or ~/.pepperrc).")
    )]
    Config(#[from] ConfigError),

    #[error("Invalid salt-api URL: {url}")]
    #[diagnostic(
        code(pepper::invalid_url),
        help("Set SALTAPI_URL in the environment or the [main] section, e.g. https://salt.example.com:8000/")
    )]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed against {url}")]
    #[diagnostic(
        code(pepper::auth_failed),
        help(
            "Verify SALTAPI_USER, SALTAPI_PASS and SALTAPI_EAUTH, \
             or pass -a <backend> to be prompted for credentials."
        )
    )]
    AuthFailed {
        url: String,
        #[source]
        source: pepper_api::Error,
    },

    // ── Execution ────────────────────────────────────────────────────
    #[error("Could not reach salt-api at {url}")]
    #[diagnostic(
        code(pepper::transport),
        help("Check that salt-api is running and reachable.")
    )]
    Transport {
        url: String,
        #[source]
        source: pepper_api::Error,
    },

    #[error("Remote execution failed")]
    #[diagnostic(code(pepper::remote_execution))]
    RemoteExecution {
        #[source]
        source: pepper_api::Error,
    },

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Could not render result as JSON: {0}")]
    #[diagnostic(code(pepper::json))]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_)
            | Self::InvalidUrl { .. }
            | Self::AuthFailed { .. }
            | Self::Transport { .. }
            | Self::RemoteExecution { .. }
            | Self::Io(_)
            | Self::Json(_) => exit_code::GENERAL,
        }
    }

    /// Ctrl-C caught inside a credential prompt.
    pub fn is_interrupted(&self) -> bool {
        matches!(
            self,
            Self::Config(ConfigError::Prompt(err)) if err.kind() == std::io::ErrorKind::Interrupted
        )
    }

    /// Classify a failure of the execute call.
    pub fn from_execution(url: &str, source: pepper_api::Error) -> Self {
        if source.is_transport() {
            Self::Transport {
                url: url.to_owned(),
                source,
            }
        } else {
            Self::RemoteExecution { source }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn execution_failures_are_classified() {
        let remote = CliError::from_execution(
            "http://salt/",
            pepper_api::Error::RemoteExecution {
                message: "HTTP 500".into(),
                payload: None,
            },
        );
        assert!(matches!(remote, CliError::RemoteExecution { .. }));

        let unauthenticated =
            CliError::from_execution("http://salt/", pepper_api::Error::NotAuthenticated);
        assert!(matches!(unauthenticated, CliError::RemoteExecution { .. }));
    }

    #[test]
    fn interrupted_prompt_is_recognised() {
        use std::io::ErrorKind;

        let interrupted = CliError::Config(ConfigError::Prompt(ErrorKind::Interrupted.into()));
        assert!(interrupted.is_interrupted());

        let eof = CliError::Config(ConfigError::Prompt(ErrorKind::UnexpectedEof.into()));
        assert!(!eof.is_interrupted());
        assert!(!CliError::Io(ErrorKind::Interrupted.into()).is_interrupted());
    }

    #[test]
    fn runtime_failures_exit_with_general_code() {
        let err = CliError::AuthFailed {
            url: "http://salt/".into(),
            source: pepper_api::Error::Authentication {
                message: "denied".into(),
            },
        };
        assert_eq!(err.exit_code(), exit_code::GENERAL);
    }
}
