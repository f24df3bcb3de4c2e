// salt-api session client
//
// Wraps `reqwest::Client` with the two calls pepper needs: `/login` to
// obtain a token and the root endpoint to run a `local` command. The token
// lives inside the client for the rest of the process and is attached to
// every execute call as `X-Auth-Token`.

use std::sync::RwLock;

use secrecy::{ExposeSecret, SecretString};
use serde_json::{Value, json};
use tracing::{debug, trace};
use url::Url;

use crate::error::Error;
use crate::models::{AuthContext, Credentials, Invocation, LoginReturn, SaltResponse};
use crate::transport::TransportConfig;

const AUTH_TOKEN_HEADER: &str = "X-Auth-Token";

/// Stateful client for one salt-api endpoint.
pub struct SessionClient {
    http: reqwest::Client,
    base_url: Url,
    transport: TransportConfig,
    token: RwLock<Option<SecretString>>,
}

impl SessionClient {
    /// Create a new client from a `TransportConfig`.
    ///
    /// `base_url` is the salt-api root, e.g. `http://localhost:8000/`.
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self::with_client(http, base_url, transport.clone()))
    }

    /// Create a client around a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url, transport: TransportConfig) -> Self {
        Self {
            http,
            base_url,
            transport,
            token: RwLock::new(None),
        }
    }

    /// Whether a login has succeeded on this client.
    pub fn is_authenticated(&self) -> bool {
        self.token.read().is_ok_and(|guard| guard.is_some())
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// `{base}/{path}`, tolerating a base with or without a trailing slash.
    fn endpoint(&self, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!("{base}/{path}"))?)
    }

    // ── Calls ────────────────────────────────────────────────────────

    /// Authenticate and keep the returned token for later calls.
    ///
    /// Any non-2xx answer or a body without a usable token is reported as
    /// `Error::Authentication`; only network failures surface as
    /// `Error::Transport`.
    pub async fn login(&self, credentials: &Credentials) -> Result<AuthContext, Error> {
        let url = self.endpoint("login")?;
        debug!("logging in at {url} (eauth={})", credentials.eauth);

        let body = json!({
            "username": credentials.username,
            "password": credentials.password.expose_secret(),
            "eauth": credentials.eauth,
        });

        let request = self
            .http
            .post(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&body)
            .build()?;
        let resp = self.send(request).await?;

        let status = resp.status();
        let header_token = resp
            .headers()
            .get(AUTH_TOKEN_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        let text = resp.text().await.map_err(Error::Transport)?;

        if !status.is_success() {
            return Err(Error::Authentication {
                message: format!("login failed (HTTP {status}): {}", preview(&text)),
            });
        }

        let envelope: SaltResponse<LoginReturn> =
            serde_json::from_str(&text).map_err(|e| Error::Authentication {
                message: format!("malformed login response: {e} (body preview: {:?})", preview(&text)),
            })?;

        let login = envelope.data.into_iter().next().ok_or_else(|| Error::Authentication {
            message: "login response contained no session".into(),
        })?;

        let token = login
            .token
            .filter(|t| !t.is_empty())
            .or(header_token)
            .ok_or_else(|| Error::Authentication {
                message: "login response contained no token".into(),
            })?;

        let context = AuthContext {
            token: SecretString::from(token),
            user: login.user,
            eauth: login.eauth,
            start: login.start,
            expire: login.expire,
            perms: login.perms,
        };
        self.store_token(context.token.clone());

        debug!(user = ?context.user, expire = ?context.expire, "login successful");
        Ok(context)
    }

    /// Run a command through the `local` client interface.
    ///
    /// Returns the first element of the response's `return` list, which maps
    /// minion ids to their results.
    pub async fn local(&self, invocation: &Invocation) -> Result<Value, Error> {
        let token = self.current_token().ok_or(Error::NotAuthenticated)?;
        let url = self.endpoint("")?;
        debug!(
            "POST {url} (tgt={}, fun={}, expr_form={})",
            invocation.target.target, invocation.function, invocation.target.expr_form
        );

        let lowstate = [invocation.to_lowstate()];
        let request = self
            .http
            .post(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .header(AUTH_TOKEN_HEADER, token.expose_secret())
            .json(&lowstate)
            .build()?;
        let resp = self.send(request).await?;

        let status = resp.status();
        let text = resp.text().await.map_err(Error::Transport)?;
        let envelope = serde_json::from_str::<SaltResponse<Value>>(&text);

        if !status.is_success() {
            return Err(Error::RemoteExecution {
                message: format!("HTTP {status}: {}", preview(&text)),
                payload: envelope.ok().and_then(|e| e.data.into_iter().next()),
            });
        }

        let envelope = envelope.map_err(|e| Error::RemoteExecution {
            message: format!("malformed response: {e} (body preview: {:?})", preview(&text)),
            payload: None,
        })?;

        envelope
            .data
            .into_iter()
            .next()
            .ok_or_else(|| Error::RemoteExecution {
                message: "response contained an empty return list".into(),
                payload: None,
            })
    }

    // ── Internals ────────────────────────────────────────────────────

    async fn send(&self, request: reqwest::Request) -> Result<reqwest::Response, Error> {
        self.transport.trace_request(&request);
        let resp = self.http.execute(request).await.map_err(Error::Transport)?;
        self.transport.trace_response(&resp);
        Ok(resp)
    }

    fn store_token(&self, token: SecretString) {
        trace!("storing session token");
        if let Ok(mut guard) = self.token.write() {
            *guard = Some(token);
        }
    }

    fn current_token(&self) -> Option<SecretString> {
        self.token.read().ok().and_then(|guard| guard.clone())
    }
}

fn preview(body: &str) -> &str {
    let end = body
        .char_indices()
        .nth(200)
        .map_or(body.len(), |(idx, _)| idx);
    &body[..end]
}
