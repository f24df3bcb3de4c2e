//! Login detail resolution for pepper.
//!
//! Builds the salt-api URL, username, password, and eauth backend from
//! three typed layers (hardcoded defaults, the `[main]` section of the
//! ini config file, and `SALTAPI_*` environment variables), then swaps in
//! interactively prompted credentials when an eauth backend is forced on
//! the command line.

pub mod ini;

use std::io;
use std::path::{Path, PathBuf};

use directories::BaseDirs;
use secrecy::SecretString;
use thiserror::Error;
use tracing::debug;

// ── Constants ───────────────────────────────────────────────────────

pub const DEFAULT_URL: &str = "http://localhost:8000/";
pub const DEFAULT_USER: &str = "saltdev";
pub const DEFAULT_PASS: &str = "saltdev";
pub const DEFAULT_EAUTH: &str = "auto";

pub const ENV_URL: &str = "SALTAPI_URL";
pub const ENV_USER: &str = "SALTAPI_USER";
pub const ENV_PASS: &str = "SALTAPI_PASS";
pub const ENV_EAUTH: &str = "SALTAPI_EAUTH";

/// Environment variable naming the config file.
pub const ENV_CONFIG_PATH: &str = "PEPPERRC";

/// Config file section that carries login details.
pub const CONFIG_SECTION: &str = "main";

const CONFIG_FILE_NAME: &str = ".pepperrc";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ini::IniError,
    },

    #[error("credential prompt failed: {0}")]
    Prompt(#[source] io::Error),
}

// ── Layers ──────────────────────────────────────────────────────────

/// One source's contribution to the login details.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginLayer {
    pub url: Option<String>,
    pub user: Option<String>,
    pub pass: Option<String>,
    pub eauth: Option<String>,
}

impl LoginLayer {
    /// Read the `[main]` section of an ini config file.
    ///
    /// A missing or unreadable file yields an empty layer.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(err) => {
                debug!("config file {} not read: {err}", path.display());
                return Ok(Self::default());
            }
        };
        Self::from_ini_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parse ini text. Keys match case-insensitively; unknown keys are ignored.
    pub fn from_ini_str(contents: &str) -> Result<Self, ini::IniError> {
        let mut layer = Self::default();
        let Some(pairs) = ini::read_section(contents, CONFIG_SECTION)? else {
            debug!("config has no [{CONFIG_SECTION}] section");
            return Ok(layer);
        };

        for (key, value) in pairs {
            match layer.slot(&key.to_ascii_uppercase()) {
                Some(slot) => *slot = Some(value),
                None => debug!("ignoring unknown config key {key}"),
            }
        }
        Ok(layer)
    }

    /// Read the four `SALTAPI_*` variables from the process environment.
    pub fn from_env() -> Self {
        Self::from_env_with(|key| std::env::var(key).ok())
    }

    /// Read the four `SALTAPI_*` variables through `lookup`.
    pub fn from_env_with(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            url: lookup(ENV_URL),
            user: lookup(ENV_USER),
            pass: lookup(ENV_PASS),
            eauth: lookup(ENV_EAUTH),
        }
    }

    fn slot(&mut self, key: &str) -> Option<&mut Option<String>> {
        match key {
            ENV_URL => Some(&mut self.url),
            ENV_USER => Some(&mut self.user),
            ENV_PASS => Some(&mut self.pass),
            ENV_EAUTH => Some(&mut self.eauth),
            _ => None,
        }
    }
}

// ── Resolved details ────────────────────────────────────────────────

/// Fully resolved login details. Every field is always populated.
#[derive(Debug, Clone)]
pub struct LoginDetails {
    pub url: String,
    pub user: String,
    pub pass: SecretString,
    pub eauth: String,
}

impl Default for LoginDetails {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.into(),
            user: DEFAULT_USER.into(),
            pass: SecretString::from(DEFAULT_PASS.to_owned()),
            eauth: DEFAULT_EAUTH.into(),
        }
    }
}

impl LoginDetails {
    /// Merge layers over the defaults: environment beats file, file beats default.
    pub fn layered(file: LoginLayer, env: LoginLayer) -> Self {
        let defaults = Self::default();
        Self {
            url: env.url.or(file.url).unwrap_or(defaults.url),
            user: env.user.or(file.user).unwrap_or(defaults.user),
            pass: env
                .pass
                .or(file.pass)
                .map_or(defaults.pass, SecretString::from),
            eauth: env.eauth.or(file.eauth).unwrap_or(defaults.eauth),
        }
    }
}

// ── Prompting ───────────────────────────────────────────────────────

/// Interactive credential input.
pub trait CredentialPrompt {
    /// Ask for a value that may be echoed (the username).
    fn prompt_visible(&self, label: &str) -> io::Result<String>;

    /// Ask for a value without echoing it (the password).
    fn prompt_masked(&self, label: &str) -> io::Result<SecretString>;
}

// ── Resolution ──────────────────────────────────────────────────────

/// Inputs to resolution that come from the command line.
#[derive(Debug, Clone)]
pub struct ResolveOptions {
    pub config_path: PathBuf,
    /// Eauth backend forced with `-a`. A non-empty value triggers prompting.
    pub eauth: Option<String>,
}

/// Resolve login details against the process environment.
pub fn resolve(
    options: &ResolveOptions,
    prompt: &dyn CredentialPrompt,
) -> Result<LoginDetails, ConfigError> {
    resolve_with(options, |key| std::env::var(key).ok(), prompt)
}

/// Resolve login details with an explicit environment lookup.
pub fn resolve_with(
    options: &ResolveOptions,
    env: impl Fn(&str) -> Option<String>,
    prompt: &dyn CredentialPrompt,
) -> Result<LoginDetails, ConfigError> {
    let file = LoginLayer::from_file(&options.config_path)?;
    let env = LoginLayer::from_env_with(env);
    let mut details = LoginDetails::layered(file, env);

    if let Some(eauth) = options.eauth.as_deref().filter(|e| !e.is_empty()) {
        debug!("eauth backend {eauth} forced, prompting for credentials");
        details.user = prompt.prompt_visible("Username").map_err(ConfigError::Prompt)?;
        details.pass = prompt.prompt_masked("Password").map_err(ConfigError::Prompt)?;
        details.eauth = eauth.to_owned();
    }

    Ok(details)
}

// ── Config file path ────────────────────────────────────────────────

/// `<home>/.pepperrc`.
pub fn default_config_path() -> PathBuf {
    BaseDirs::new().map_or_else(
        || home_fallback().join(CONFIG_FILE_NAME),
        |dirs| dirs.home_dir().join(CONFIG_FILE_NAME),
    )
}

fn home_fallback() -> PathBuf {
    PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()))
}
