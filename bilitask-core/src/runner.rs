//! Task Runner orchestration
//!
//! Verify the credential, run the fixed task sequence, fetch the profile
//! snapshot, render the report. Only credential verification can abort;
//! everything after it degrades per step.

use indexmap::IndexMap;
use tracing::{debug, info, warn};

use crate::client::BilibiliClient;
use crate::config::Config;
use crate::credential::Credential;
use crate::error::{Error, Result};
use crate::report;
use crate::tasks::{self, TaskResult};
use crate::types::{NavData, ProfileSnapshot};

/// Application status the nav endpoint returns for a rejected credential
const CODE_NOT_AUTHENTICATED: i64 = -101;

pub struct TaskRunner {
    client: BilibiliClient,
    credential: Credential,
    watch_bvid: String,
}

/// Everything one run produces
pub struct RunOutcome {
    pub results: IndexMap<String, TaskResult>,
    pub snapshot: Option<ProfileSnapshot>,
    pub report: String,
}

impl TaskRunner {
    /// Build a runner from explicit configuration and a resolved credential
    pub fn new(config: &Config, credential: Credential) -> Result<Self> {
        let client = BilibiliClient::with_credential(config.endpoints.clone(), &credential)?;
        Ok(Self {
            client,
            credential,
            watch_bvid: config.tasks.watch_bvid.clone(),
        })
    }

    /// Confirm the credential is still accepted before spending effort on
    /// tasks. Any status other than "not authenticated" counts as valid;
    /// the payload shape is not inspected here.
    pub async fn verify_login(&self) -> Result<()> {
        let resp = self.client.nav().await?;
        if resp.code == CODE_NOT_AUTHENTICATED {
            return Err(Error::Authentication("account is not logged in".to_string()));
        }
        Ok(())
    }

    /// Best-effort profile fetch; any problem yields no snapshot
    async fn snapshot(&self) -> Option<ProfileSnapshot> {
        let resp = match self.client.nav().await {
            Ok(resp) => resp,
            Err(e) => {
                debug!("profile lookup failed: {e}");
                return None;
            }
        };
        if resp.code != 0 {
            debug!("profile lookup returned code {}", resp.code);
            return None;
        }

        resp.data
            .and_then(|data| serde_json::from_value::<NavData>(data).ok())
            .map(ProfileSnapshot::from)
    }

    pub async fn run(&self) -> Result<RunOutcome> {
        self.verify_login().await?;
        info!("login verified, running daily tasks");

        let results = tasks::run_all(&self.client, &self.credential, &self.watch_bvid).await;
        for (name, result) in &results {
            if result.succeeded {
                info!("{name}: succeeded");
            } else {
                warn!(
                    "{name}: failed, reason: {}",
                    result.detail.as_deref().unwrap_or("unknown error")
                );
            }
        }

        let snapshot = self.snapshot().await;
        if snapshot.is_none() {
            debug!("no profile snapshot available, report omits the account section");
        }

        let report = report::render_report(&results, snapshot.as_ref());
        Ok(RunOutcome {
            results,
            snapshot,
            report,
        })
    }
}
