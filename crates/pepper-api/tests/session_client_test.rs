#![allow(clippy::unwrap_used)]
// Integration tests for `SessionClient` using wiremock.

use secrecy::SecretString;
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use pepper_api::{
    Credentials, Error, ExprForm, Invocation, SessionClient, TargetExpr, TransportConfig,
};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, SessionClient) {
    let server = MockServer::start().await;
    let base_url = Url::parse(&format!("{}/", server.uri())).unwrap();
    let client = SessionClient::new(base_url, &TransportConfig::default()).unwrap();
    (server, client)
}

fn credentials() -> Credentials {
    Credentials {
        username: "saltdev".into(),
        password: SecretString::from("saltdev".to_owned()),
        eauth: "auto".into(),
    }
}

fn ping() -> Invocation {
    Invocation::new(TargetExpr::new("myhost", ExprForm::Glob), "test.ping", Vec::new())
}

async fn mount_login(server: &MockServer, token: &str) {
    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "return": [{
                "token": token,
                "start": 1_700_000_000.0,
                "expire": 1_700_043_200.0,
                "user": "saltdev",
                "eauth": "auto",
                "perms": [".*"]
            }]
        })))
        .mount(server)
        .await;
}

// ── Authentication tests ────────────────────────────────────────────

#[tokio::test]
async fn test_login_success() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/login"))
        .and(body_json(json!({
            "username": "saltdev",
            "password": "saltdev",
            "eauth": "auto"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "return": [{ "token": "abc123", "user": "saltdev", "eauth": "auto", "perms": [".*"] }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let context = client.login(&credentials()).await.unwrap();

    assert_eq!(context.user.as_deref(), Some("saltdev"));
    assert_eq!(context.eauth.as_deref(), Some("auto"));
    assert_eq!(context.perms, vec![json!(".*")]);
    assert!(client.is_authenticated());
}

#[tokio::test]
async fn test_login_failure() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Could not authenticate"))
        .mount(&server)
        .await;

    let result = client.login(&credentials()).await;

    match result {
        Err(Error::Authentication { ref message }) => {
            assert!(message.contains("401"), "expected status in message, got: {message}");
        }
        other => panic!("expected Authentication error, got: {other:?}"),
    }
    assert!(!client.is_authenticated());
}

#[tokio::test]
async fn test_login_malformed_body() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&server)
        .await;

    let result = client.login(&credentials()).await;

    assert!(
        matches!(result, Err(Error::Authentication { .. })),
        "expected Authentication error, got: {result:?}"
    );
}

#[tokio::test]
async fn test_login_token_from_header() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("X-Auth-Token", "from-header")
                .set_body_json(json!({ "return": [{ "user": "saltdev" }] })),
        )
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/"))
        .and(header("X-Auth-Token", "from-header"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "return": [{}] })))
        .expect(1)
        .mount(&server)
        .await;

    client.login(&credentials()).await.unwrap();
    client.local(&ping()).await.unwrap();
}

#[tokio::test]
async fn test_login_unreachable() {
    // Nothing listens on the discard port.
    let base_url = Url::parse("http://127.0.0.1:9/").unwrap();
    let client = SessionClient::new(base_url, &TransportConfig::default()).unwrap();

    let result = client.login(&credentials()).await;

    assert!(
        matches!(result, Err(ref e) if e.is_transport()),
        "expected Transport error, got: {result:?}"
    );
}

// ── Execution tests ─────────────────────────────────────────────────

#[tokio::test]
async fn test_local_sends_lowstate_with_token() {
    let (server, client) = setup().await;
    mount_login(&server, "abc123").await;

    Mock::given(method("POST"))
        .and(path("/"))
        .and(header("X-Auth-Token", "abc123"))
        .and(body_json(json!([{
            "client": "local",
            "tgt": "myhost",
            "fun": "test.ping",
            "expr_form": "glob"
        }])))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "return": [{ "minion1": true }] })),
        )
        .expect(1)
        .mount(&server)
        .await;

    client.login(&credentials()).await.unwrap();
    let result = client.local(&ping()).await.unwrap();

    assert_eq!(result, json!({ "minion1": true }));
}

#[tokio::test]
async fn test_local_grain_target_with_args() {
    let (server, client) = setup().await;
    mount_login(&server, "abc123").await;

    Mock::given(method("POST"))
        .and(path("/"))
        .and(body_json(json!([{
            "client": "local",
            "tgt": "os:Debian",
            "fun": "cmd.run",
            "arg": ["uname -a"],
            "expr_form": "grain",
            "ret": "mysql"
        }])))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "return": [{ "web1": "Linux web1", "web2": "Linux web2" }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    client.login(&credentials()).await.unwrap();
    let invocation = Invocation::new(
        TargetExpr::new("os:Debian", ExprForm::Grain),
        "cmd.run",
        vec!["uname -a".into()],
    )
    .with_returner("mysql");
    let result = client.local(&invocation).await.unwrap();

    assert_eq!(result["web2"], json!("Linux web2"));
}

#[tokio::test]
async fn test_local_requires_login() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let result = client.local(&ping()).await;

    assert!(
        matches!(result, Err(Error::NotAuthenticated)),
        "expected NotAuthenticated, got: {result:?}"
    );
}

#[tokio::test]
async fn test_local_server_error() {
    let (server, client) = setup().await;
    mount_login(&server, "abc123").await;

    Mock::given(method("POST"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .mount(&server)
        .await;

    client.login(&credentials()).await.unwrap();
    let result = client.local(&ping()).await;

    match result {
        Err(Error::RemoteExecution { ref message, ref payload }) => {
            assert!(message.contains("500"), "expected status in message, got: {message}");
            assert!(payload.is_none());
        }
        other => panic!("expected RemoteExecution error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_local_failure_keeps_partial_payload() {
    let (server, client) = setup().await;
    mount_login(&server, "abc123").await;

    Mock::given(method("POST"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(500)
                .set_body_json(json!({ "return": [{ "minion1": "Minion did not return" }] })),
        )
        .mount(&server)
        .await;

    client.login(&credentials()).await.unwrap();
    let err = client.local(&ping()).await.unwrap_err();

    assert_eq!(err.payload(), Some(&json!({ "minion1": "Minion did not return" })));
}

#[tokio::test]
async fn test_local_empty_return() {
    let (server, client) = setup().await;
    mount_login(&server, "abc123").await;

    Mock::given(method("POST"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "return": [] })))
        .mount(&server)
        .await;

    client.login(&credentials()).await.unwrap();
    let result = client.local(&ping()).await;

    assert!(
        matches!(result, Err(Error::RemoteExecution { .. })),
        "expected RemoteExecution error, got: {result:?}"
    );
}

// ── Transport tests ─────────────────────────────────────────────────

#[tokio::test]
async fn test_base_url_without_trailing_slash() {
    let server = MockServer::start().await;
    let base_url = Url::parse(&format!("{}/salt", server.uri())).unwrap();
    let client = SessionClient::new(base_url, &TransportConfig::default()).unwrap();

    Mock::given(method("POST"))
        .and(path("/salt/login"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "return": [{ "token": "t" }] })),
        )
        .expect(1)
        .mount(&server)
        .await;

    client.login(&credentials()).await.unwrap();
}

#[tokio::test]
async fn test_debug_http_does_not_change_results() {
    let server = MockServer::start().await;
    let base_url = Url::parse(&server.uri()).unwrap();
    let transport = TransportConfig::default().with_debug_http(true);
    let client = SessionClient::new(base_url, &transport).unwrap();
    mount_login(&server, "abc123").await;

    Mock::given(method("POST"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "return": [{ "minion1": true }] })),
        )
        .mount(&server)
        .await;

    client.login(&credentials()).await.unwrap();
    let result = client.local(&ping()).await.unwrap();

    assert_eq!(result, json!({ "minion1": true }));
}
