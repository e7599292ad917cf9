//! Pairing flow tests
//!
//! Exercise the poll loop against a mock passport host: confirmation
//! after repeated waits, expiry, ceiling exhaustion, and persistence.

use std::sync::Mutex;
use std::time::Duration;

use bilitask_core::client::BilibiliClient;
use bilitask_core::config::EndpointsConfig;
use bilitask_core::error::Error;
use bilitask_core::pairing::{pair, PairingOptions, PairingPrompt};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const AUTH_URL: &str =
    "https://passport.bilibili.com/h5-app/passport/login/scan?navhide=1&qrcode_key=key123";
const CONFIRM_URL: &str =
    "https://passport.biligame.com/x/passport-login/web/crossDomain?DedeUserID=123456&SESSDATA=abc&bili_jct=tok";

struct RecordingPrompt(Mutex<Option<String>>);

impl RecordingPrompt {
    fn new() -> Self {
        Self(Mutex::new(None))
    }
}

impl PairingPrompt for RecordingPrompt {
    fn show_authorization_url(&self, url: &str) {
        *self.0.lock().unwrap() = Some(url.to_string());
    }
}

fn endpoints(server: &MockServer) -> EndpointsConfig {
    EndpointsConfig {
        api_base: server.uri(),
        passport_base: server.uri(),
        live_base: server.uri(),
        manga_base: server.uri(),
    }
}

fn fast_options(dir: &tempfile::TempDir) -> PairingOptions {
    PairingOptions {
        attempts: 120,
        interval: Duration::ZERO,
        cookie_file: dir.path().join("cookie.txt"),
        audit_file: dir.path().join("auth.json"),
    }
}

async fn mount_generate(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/x/passport-login/web/qrcode/generate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 0,
            "message": "0",
            "data": {"url": AUTH_URL, "qrcode_key": "key123"}
        })))
        .mount(server)
        .await;
}

fn waiting_body() -> serde_json::Value {
    json!({
        "code": 0,
        "message": "0",
        "data": {
            "url": "",
            "refresh_token": "",
            "timestamp": 0,
            "code": 86090,
            "message": "scanned, awaiting confirmation"
        }
    })
}

fn confirmed_body() -> serde_json::Value {
    json!({
        "code": 0,
        "message": "0",
        "data": {
            "url": CONFIRM_URL,
            "refresh_token": "refresh",
            "timestamp": 1,
            "code": 0,
            "message": ""
        }
    })
}

#[tokio::test]
async fn test_pairing_confirms_after_repeated_waits() {
    let server = MockServer::start().await;
    mount_generate(&server).await;
    Mock::given(method("GET"))
        .and(path("/x/passport-login/web/qrcode/poll"))
        .respond_with(ResponseTemplate::new(200).set_body_json(waiting_body()))
        .up_to_n_times(119)
        .expect(119)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/x/passport-login/web/qrcode/poll"))
        .respond_with(ResponseTemplate::new(200).set_body_json(confirmed_body()))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let options = fast_options(&dir);
    let client = BilibiliClient::new(endpoints(&server)).unwrap();
    let prompt = RecordingPrompt::new();

    let credential = pair(&client, &prompt, &options).await.unwrap();

    assert_eq!(
        credential.as_str(),
        "DedeUserID=123456; SESSDATA=abc; bili_jct=tok"
    );
    assert_eq!(credential.csrf(), Some("tok"));
    assert_eq!(prompt.0.lock().unwrap().as_deref(), Some(AUTH_URL));

    // Both files are written on success
    let persisted = std::fs::read_to_string(&options.cookie_file).unwrap();
    assert_eq!(persisted, credential.as_str());
    let audit: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&options.audit_file).unwrap()).unwrap();
    assert_eq!(audit["data"]["code"], 0);
}

#[tokio::test]
async fn test_pairing_expires_on_expired_code() {
    let server = MockServer::start().await;
    mount_generate(&server).await;
    Mock::given(method("GET"))
        .and(path("/x/passport-login/web/qrcode/poll"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 0,
            "message": "0",
            "data": {"url": "", "refresh_token": "", "timestamp": 0, "code": 86038, "message": "expired"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let options = fast_options(&dir);
    let client = BilibiliClient::new(endpoints(&server)).unwrap();

    let err = pair(&client, &RecordingPrompt::new(), &options).await.unwrap_err();
    match err {
        Error::Pairing(detail) => assert_eq!(detail, "authorization code expired"),
        other => panic!("expected pairing error, got {other:?}"),
    }
    assert!(!options.cookie_file.exists());
}

#[tokio::test]
async fn test_pairing_expires_after_attempt_ceiling() {
    let server = MockServer::start().await;
    mount_generate(&server).await;
    Mock::given(method("GET"))
        .and(path("/x/passport-login/web/qrcode/poll"))
        .respond_with(ResponseTemplate::new(200).set_body_json(waiting_body()))
        .expect(120)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let options = fast_options(&dir);
    let client = BilibiliClient::new(endpoints(&server)).unwrap();

    let err = pair(&client, &RecordingPrompt::new(), &options).await.unwrap_err();
    match err {
        Error::Pairing(detail) => assert_eq!(detail, "authorization code expired"),
        other => panic!("expected pairing error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_transient_poll_failures_consume_attempts() {
    let server = MockServer::start().await;
    mount_generate(&server).await;
    Mock::given(method("GET"))
        .and(path("/x/passport-login/web/qrcode/poll"))
        .respond_with(ResponseTemplate::new(500))
        .expect(120)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let options = fast_options(&dir);
    let client = BilibiliClient::new(endpoints(&server)).unwrap();

    let err = pair(&client, &RecordingPrompt::new(), &options).await.unwrap_err();
    assert!(matches!(err, Error::Pairing(_)));
}

#[tokio::test]
async fn test_pairing_init_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/x/passport-login/web/qrcode/generate"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"code": -1, "message": "rejected"})),
        )
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let options = fast_options(&dir);
    let client = BilibiliClient::new(endpoints(&server)).unwrap();

    let err = pair(&client, &RecordingPrompt::new(), &options).await.unwrap_err();
    match err {
        Error::Pairing(detail) => assert_eq!(detail, "failed to obtain pairing code"),
        other => panic!("expected pairing error, got {other:?}"),
    }
}
