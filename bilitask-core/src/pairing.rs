//! Interactive device pairing
//!
//! Exchanges a user's confirmation on a secondary device for a session
//! credential: request a pairing code, surface its authorization URL,
//! then poll until the code is confirmed or expires.
//!
//! Flow states: Requested -> AwaitingScan -> Confirmed | Expired | Error.

use std::path::PathBuf;
use std::time::Duration;

use tracing::{debug, info};

use crate::client::BilibiliClient;
use crate::config::CredentialConfig;
use crate::credential::Credential;
use crate::error::{Error, Result};
use crate::types::QrcodePollResp;

// Nested poll status codes:
// 0: confirmed
// 86038: expired
// 86090: scanned, awaiting confirmation
const CODE_CONFIRMED: i64 = 0;
const CODE_EXPIRED: i64 = 86038;
const CODE_AWAITING_CONFIRM: i64 = 86090;

const EXPIRED_DETAIL: &str = "authorization code expired";

/// How the authorization URL is surfaced to the user.
///
/// Rendering the URL as a scannable image is the implementor's business;
/// the console implementation just prints it.
pub trait PairingPrompt {
    fn show_authorization_url(&self, url: &str);
}

/// Prompt that logs the authorization URL to the console
pub struct ConsolePrompt;

impl PairingPrompt for ConsolePrompt {
    fn show_authorization_url(&self, url: &str) {
        info!("open or scan this URL with the companion app to authorize: {url}");
    }
}

#[derive(Debug, Clone)]
pub struct PairingOptions {
    /// Poll ceiling; with the default interval this is ~2 minutes
    pub attempts: u32,
    pub interval: Duration,
    /// Where the derived credential is persisted for later runs
    pub cookie_file: PathBuf,
    /// Where the raw confirmation response is persisted
    pub audit_file: PathBuf,
}

impl Default for PairingOptions {
    fn default() -> Self {
        Self {
            attempts: 120,
            interval: Duration::from_secs(1),
            cookie_file: PathBuf::from("cookie.txt"),
            audit_file: PathBuf::from("auth.json"),
        }
    }
}

impl From<&CredentialConfig> for PairingOptions {
    fn from(config: &CredentialConfig) -> Self {
        Self {
            cookie_file: PathBuf::from(&config.cookie_file),
            audit_file: PathBuf::from(&config.audit_file),
            ..Self::default()
        }
    }
}

/// Run the pairing flow to completion.
///
/// Transient poll failures are swallowed and retried; every iteration,
/// failed or not, consumes one attempt from the ceiling. The returned
/// credential has already been persisted.
pub async fn pair<P: PairingPrompt>(
    client: &BilibiliClient,
    prompt: &P,
    options: &PairingOptions,
) -> Result<Credential> {
    let (authorization_url, exchange_key) = client
        .generate_qrcode()
        .await
        .map_err(|e| {
            debug!("pairing init failed: {e}");
            Error::Pairing("failed to obtain pairing code".to_string())
        })?;

    prompt.show_authorization_url(&authorization_url);
    info!("waiting for authorization, polling up to {} times", options.attempts);

    for _ in 0..options.attempts {
        let body = match client.poll_qrcode(&exchange_key).await {
            Ok(body) => body,
            Err(e) => {
                debug!("pairing poll failed, retrying: {e}");
                tokio::time::sleep(options.interval).await;
                continue;
            }
        };

        let resp: QrcodePollResp = match serde_json::from_str(&body) {
            Ok(resp) => resp,
            Err(e) => {
                debug!("pairing poll body malformed, retrying: {e}");
                tokio::time::sleep(options.interval).await;
                continue;
            }
        };

        if resp.code == 0 {
            match resp.data {
                Some(data) if data.code == CODE_CONFIRMED => {
                    return confirm(&body, &data.url, options);
                }
                Some(data) if data.code == CODE_EXPIRED => {
                    return Err(Error::Pairing(EXPIRED_DETAIL.to_string()));
                }
                Some(data) if data.code == CODE_AWAITING_CONFIRM => {
                    info!("code scanned, waiting for confirmation...");
                }
                _ => {}
            }
        }

        tokio::time::sleep(options.interval).await;
    }

    Err(Error::Pairing(EXPIRED_DETAIL.to_string()))
}

/// Derive and persist the credential from a confirmed poll response
fn confirm(raw_body: &str, confirm_url: &str, options: &PairingOptions) -> Result<Credential> {
    let credential = Credential::from_confirm_url(confirm_url)
        .map_err(|e| Error::Pairing(format!("failed to parse authorization response: {e}")))?;

    // Best-effort persistence: a failure here is the pairing outcome's
    // failure reason, even though the in-memory credential would still
    // work for the current run.
    std::fs::write(&options.audit_file, raw_body)
        .map_err(|e| Error::Pairing(format!("failed to persist pairing record: {e}")))?;
    credential
        .persist(&options.cookie_file)
        .map_err(|e| Error::Pairing(format!("failed to persist credential: {e}")))?;

    info!("pairing confirmed, credential saved to {}", options.cookie_file.display());
    Ok(credential)
}
