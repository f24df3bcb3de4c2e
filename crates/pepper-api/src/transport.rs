// Transport configuration for building the reqwest::Client used against
// salt-api, plus the header tracing behind `--debug-http`.

use std::time::Duration;

use reqwest::header::HeaderMap;
use tracing::debug;

/// Tracing target for request/response header dumps.
pub const HTTP_TRACE_TARGET: &str = "pepper_api::http";

const REDACTED_HEADERS: &[&str] = &["x-auth-token", "authorization", "cookie", "set-cookie"];

/// Transport configuration for building HTTP clients.
#[derive(Debug, Clone, Default)]
pub struct TransportConfig {
    /// Per-request timeout. `None` leaves requests unbounded.
    pub timeout: Option<Duration>,
    /// Log every request and response header set.
    pub debug_http: bool,
}

impl TransportConfig {
    /// Build a `reqwest::Client` from this config.
    pub fn build_client(&self) -> Result<reqwest::Client, crate::error::Error> {
        let mut builder = reqwest::Client::builder()
            .user_agent(concat!("pepper/", env!("CARGO_PKG_VERSION")));

        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        builder.build().map_err(crate::error::Error::Transport)
    }

    /// Enable or disable header tracing.
    pub fn with_debug_http(mut self, enabled: bool) -> Self {
        self.debug_http = enabled;
        self
    }

    /// Dump a request's method, URL, and headers when header tracing is on.
    pub(crate) fn trace_request(&self, request: &reqwest::Request) {
        if !self.debug_http {
            return;
        }
        debug!(target: HTTP_TRACE_TARGET, "> {} {}", request.method(), request.url());
        trace_headers(">", request.headers());
    }

    /// Dump a response's status and headers when header tracing is on.
    pub(crate) fn trace_response(&self, response: &reqwest::Response) {
        if !self.debug_http {
            return;
        }
        debug!(target: HTTP_TRACE_TARGET, "< {:?} {}", response.version(), response.status());
        trace_headers("<", response.headers());
    }
}

fn trace_headers(direction: &str, headers: &HeaderMap) {
    for (name, value) in headers {
        let shown = if REDACTED_HEADERS.contains(&name.as_str()) {
            "<redacted>"
        } else {
            value.to_str().unwrap_or("<binary>")
        };
        debug!(target: HTTP_TRACE_TARGET, "{direction} {name}: {shown}");
    }
}
