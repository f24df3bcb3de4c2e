// salt-api request and response types
//
// Every salt-api response wraps its payload in a `{ "return": [...] }`
// envelope. Requests to the root endpoint are "lowstate" lists: one
// dictionary per command, tagged with the client interface to use.

use std::fmt;

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ── Response Envelope ────────────────────────────────────────────────

/// Standard salt-api response envelope.
///
/// ```json
/// { "return": [ ... ] }
/// ```
#[derive(Debug, Deserialize)]
pub struct SaltResponse<T> {
    #[serde(rename = "return")]
    pub data: Vec<T>,
}

// ── Targeting ────────────────────────────────────────────────────────

/// How the server should interpret a target string.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExprForm {
    /// Shell-style glob over minion ids.
    #[default]
    Glob,
    /// Perl-compatible regular expression over minion ids.
    Pcre,
    /// Comma-separated list of minion ids.
    List,
    /// `key:value` glob match against a grain.
    Grain,
    /// `key:regex` match against a grain.
    GrainPcre,
}

impl ExprForm {
    /// The wire name sent as `expr_form`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Glob => "glob",
            Self::Pcre => "pcre",
            Self::List => "list",
            Self::Grain => "grain",
            Self::GrainPcre => "grain_pcre",
        }
    }
}

impl fmt::Display for ExprForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A target string together with its matching mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetExpr {
    pub target: String,
    pub expr_form: ExprForm,
}

impl TargetExpr {
    pub fn new(target: impl Into<String>, expr_form: ExprForm) -> Self {
        Self {
            target: target.into(),
            expr_form,
        }
    }
}

// ── Command invocation ───────────────────────────────────────────────

/// One remote-execution command: who to target, what to run, with what.
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    pub target: TargetExpr,
    pub function: String,
    pub args: Vec<String>,
    pub kwargs: Map<String, Value>,
    /// Returner the server should also send results to.
    pub returner: Option<String>,
}

impl Invocation {
    pub fn new(target: TargetExpr, function: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            target,
            function: function.into(),
            args,
            kwargs: Map::new(),
            returner: None,
        }
    }

    /// Set the returner; empty names are treated as unset.
    pub fn with_returner(mut self, returner: impl Into<String>) -> Self {
        let returner = returner.into();
        self.returner = (!returner.is_empty()).then_some(returner);
        self
    }

    /// The lowstate chunk posted to the root endpoint.
    pub fn to_lowstate(&self) -> LowState<'_> {
        LowState {
            client: "local",
            tgt: &self.target.target,
            fun: &self.function,
            arg: &self.args,
            kwarg: &self.kwargs,
            expr_form: self.target.expr_form,
            ret: self.returner.as_deref(),
        }
    }
}

/// Wire form of a single `local` client command.
#[derive(Debug, Serialize)]
pub struct LowState<'a> {
    pub client: &'static str,
    pub tgt: &'a str,
    pub fun: &'a str,
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    pub arg: &'a [String],
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub kwarg: &'a Map<String, Value>,
    pub expr_form: ExprForm,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ret: Option<&'a str>,
}

// ── Authentication ───────────────────────────────────────────────────

/// Username, password, and eauth backend sent to `/login`.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: SecretString,
    pub eauth: String,
}

/// Body of a successful `/login` response (first element of `return`).
#[derive(Debug, Deserialize)]
pub(crate) struct LoginReturn {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub expire: Option<f64>,
    #[serde(default)]
    pub start: Option<f64>,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub eauth: Option<String>,
    #[serde(default)]
    pub perms: Vec<Value>,
}

/// Session state handed back by a successful login.
///
/// The token itself stays inside the client; callers only see the
/// descriptive fields the server reported.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub(crate) token: SecretString,
    pub user: Option<String>,
    pub eauth: Option<String>,
    pub start: Option<f64>,
    pub expire: Option<f64>,
    pub perms: Vec<Value>,
}
