//! Process-wide logging setup.
//!
//! `Observability` is built once in `main`, installs the tracing
//! subscriber, and is handed to the driver so the HTTP header switch
//! reaches the session client.

use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::Directive;

use pepper_api::HTTP_TRACE_TARGET;

#[derive(Debug, Clone, Copy)]
pub struct Observability {
    level: LevelFilter,
    debug_http: bool,
}

impl Observability {
    /// Describe the logging setup for a verbosity count and header tracing flag.
    pub fn new(verbosity: u8, debug_http: bool) -> Self {
        Self {
            level: level_for(verbosity),
            debug_http,
        }
    }

    /// Install the global subscriber. Logs go to stderr; stdout carries
    /// only the command result.
    pub fn init(self) -> Self {
        let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();

        tracing_subscriber::fmt()
            .with_env_filter(self.filter(rust_log.as_deref()))
            .with_writer(std::io::stderr)
            .with_target(self.debug_http)
            .init();
        self
    }

    pub fn level(&self) -> LevelFilter {
        self.level
    }

    pub fn debug_http(&self) -> bool {
        self.debug_http
    }

    /// `RUST_LOG` replaces the verbosity level. The HTTP header target is
    /// enabled on top of either when `--debug-http` is set.
    fn filter(&self, rust_log: Option<&str>) -> EnvFilter {
        let filter = match rust_log.map(str::trim).filter(|s| !s.is_empty()) {
            Some(directives) => EnvFilter::new(directives),
            None => EnvFilter::new(self.level.to_string().to_lowercase()),
        };
        if !self.debug_http {
            return filter;
        }
        match format!("{HTTP_TRACE_TARGET}=debug").parse::<Directive>() {
            Ok(directive) => filter.add_directive(directive),
            Err(_) => filter,
        }
    }
}

/// Each `-v` drops the threshold by one level, starting from errors only.
pub fn level_for(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::ERROR,
        1 => LevelFilter::WARN,
        2 => LevelFilter::INFO,
        3 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}
