//! Clap derive structures for the `pepper` CLI.
//!
//! Flat option set: global flags, targeting flags, auth flags, then the
//! target, function, and function arguments as positionals.

use std::path::PathBuf;

use clap::builder::NonEmptyStringValueParser;
use clap::{ArgAction, Parser};

/// pepper -- run salt commands through salt-api
#[derive(Debug, Parser)]
#[command(
    name = "pepper",
    version,
    about = "Run a salt command on remote minions through salt-api",
    long_about = "Authenticates against a salt-api endpoint, runs one command through the \
        `local` client, and prints the result as JSON.\n\n\
        Login details come from ~/.pepperrc ([main] section), then SALTAPI_URL, \
        SALTAPI_USER, SALTAPI_PASS and SALTAPI_EAUTH, then built-in defaults.",
    override_usage = "pepper [OPTIONS] <TARGET> <FUNCTION> [ARGS]..."
)]
pub struct Cli {
    // ── Global Options ──────────────────────────────────────────────
    /// Configuration file location [default: ~/.pepperrc]
    #[arg(long, short = 'c', env = "PEPPERRC", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv, -vvvv)
    #[arg(long, short = 'v', action = ArgAction::Count)]
    pub verbose: u8,

    /// Trace HTTP request and response headers to stderr
    #[arg(long, short = 'H')]
    pub debug_http: bool,

    /// Accepted for compatibility; no timeout is applied
    #[arg(long, short = 't')]
    pub timeout: bool,

    /// Output format hint
    #[arg(long = "output", visible_alias = "out", value_name = "FMT")]
    pub output: Option<String>,

    /// Returner the server should also send results to
    #[arg(long = "return", value_name = "NAME", default_value = "")]
    pub returner: String,

    // ── Targeting Options ───────────────────────────────────────────
    /// Target minions with a PCRE regular expression
    #[arg(
        long,
        short = 'E',
        help_heading = "Targeting Options",
        overrides_with_all = ["list", "grain", "grain_pcre"]
    )]
    pub pcre: bool,

    /// Target minions with a comma-separated list of ids
    #[arg(
        long,
        short = 'L',
        help_heading = "Targeting Options",
        overrides_with_all = ["pcre", "grain", "grain_pcre"]
    )]
    pub list: bool,

    /// Target minions by grain glob (key:value)
    #[arg(
        long,
        short = 'G',
        help_heading = "Targeting Options",
        overrides_with_all = ["pcre", "list", "grain_pcre"]
    )]
    pub grain: bool,

    /// Target minions by grain regular expression (key:regex)
    #[arg(
        long = "grain-pcre",
        help_heading = "Targeting Options",
        overrides_with_all = ["pcre", "list", "grain"]
    )]
    pub grain_pcre: bool,

    // ── Authentication Options ──────────────────────────────────────
    /// External auth backend; prompts for username and password
    #[arg(
        long = "auth",
        short = 'a',
        visible_aliases = ["eauth", "extended-auth"],
        value_name = "BACKEND",
        help_heading = "Authentication Options"
    )]
    pub eauth: Option<String>,

    // ── Positionals ─────────────────────────────────────────────────
    /// Target expression (glob by default)
    #[arg(value_parser = NonEmptyStringValueParser::new())]
    pub target: String,

    /// Salt function to run, e.g. test.ping
    #[arg(value_parser = NonEmptyStringValueParser::new())]
    pub function: String,

    /// Arguments passed to the function
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}
