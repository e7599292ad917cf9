//! Daily task execution
//!
//! Four independent, single-attempt remote actions run in a fixed order.
//! Each task catches everything it raises and folds it into its own
//! `TaskResult`; no failure ever reaches a sibling task or the caller.

use indexmap::IndexMap;

use crate::client::BilibiliClient;
use crate::credential::Credential;
use crate::error::{Error, Result};
use crate::types::ActionResp;

pub const TASK_SHARE: &str = "share video";
pub const TASK_WATCH: &str = "watch video";
pub const TASK_LIVE: &str = "live check-in";
pub const TASK_COMIC: &str = "comic check-in";

/// Discovery query for the share task: one video from region 1
const DISCOVERY_PAGE_SIZE: u32 = 1;
const DISCOVERY_REGION: u32 = 1;

/// Nominal watched duration reported to the heartbeat endpoint
const WATCH_PLAYED_TIME: u32 = 2;

const MISSING_CSRF_DETAIL: &str = "credential has no bili_jct segment";

/// Outcome of one task. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskResult {
    pub succeeded: bool,
    pub detail: Option<String>,
}

impl TaskResult {
    fn ok() -> Self {
        Self {
            succeeded: true,
            detail: None,
        }
    }

    fn failed(detail: impl Into<String>) -> Self {
        Self {
            succeeded: false,
            detail: Some(detail.into()),
        }
    }

    /// Map an action response: `code == 0` is success, anything else is a
    /// failure carrying the response message.
    fn from_action(resp: &ActionResp) -> Self {
        if resp.code == 0 {
            Self::ok()
        } else {
            Self::failed(
                resp.message
                    .clone()
                    .unwrap_or_else(|| "unknown error".to_string()),
            )
        }
    }
}

/// Execute the fixed task sequence, preserving its order in the result map.
pub async fn run_all(
    client: &BilibiliClient,
    credential: &Credential,
    watch_bvid: &str,
) -> IndexMap<String, TaskResult> {
    let mut results = IndexMap::new();
    results.insert(TASK_SHARE.to_string(), share_video(client, credential).await);
    results.insert(
        TASK_WATCH.to_string(),
        watch_video(client, credential, watch_bvid).await,
    );
    results.insert(TASK_LIVE.to_string(), live_checkin(client).await);
    results.insert(TASK_COMIC.to_string(), comic_checkin(client).await);
    results
}

/// Share the first video the discovery endpoint offers.
///
/// Needs the anti-forgery token; without it the task fails locally
/// instead of sending a request the platform would reject.
async fn share_video(client: &BilibiliClient, credential: &Credential) -> TaskResult {
    let Some(csrf) = credential.csrf() else {
        return TaskResult::failed(MISSING_CSRF_DETAIL);
    };

    match try_share(client, csrf).await {
        Ok(result) => result,
        Err(e) => TaskResult::failed(e.to_string()),
    }
}

async fn try_share(client: &BilibiliClient, csrf: &str) -> Result<TaskResult> {
    let region = client
        .region_videos(DISCOVERY_PAGE_SIZE, DISCOVERY_REGION)
        .await?;
    let bvid = region
        .data
        .as_ref()
        .and_then(|d| d.archives.first())
        .map(|a| a.bvid.clone())
        .ok_or_else(|| Error::Parse("discovery returned no videos".to_string()))?;

    let resp = client.share_video(&bvid, csrf).await?;
    Ok(TaskResult::from_action(&resp))
}

/// Report a nominal watch of the configured video
async fn watch_video(
    client: &BilibiliClient,
    credential: &Credential,
    bvid: &str,
) -> TaskResult {
    let Some(csrf) = credential.csrf() else {
        return TaskResult::failed(MISSING_CSRF_DETAIL);
    };

    match client.report_watch(bvid, csrf, WATCH_PLAYED_TIME).await {
        Ok(resp) => TaskResult::from_action(&resp),
        Err(e) => TaskResult::failed(e.to_string()),
    }
}

async fn live_checkin(client: &BilibiliClient) -> TaskResult {
    match client.live_checkin().await {
        Ok(resp) => TaskResult::from_action(&resp),
        Err(e) => TaskResult::failed(e.to_string()),
    }
}

async fn comic_checkin(client: &BilibiliClient) -> TaskResult {
    match client.comic_checkin().await {
        Ok(resp) => TaskResult::from_action(&resp),
        Err(e) => TaskResult::failed(e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_action_success_has_no_detail() {
        let resp = ActionResp {
            code: 0,
            message: None,
        };
        assert_eq!(TaskResult::from_action(&resp), TaskResult::ok());
    }

    #[test]
    fn test_from_action_failure_carries_message() {
        let resp = ActionResp {
            code: -111,
            message: Some("M".to_string()),
        };
        let result = TaskResult::from_action(&resp);
        assert!(!result.succeeded);
        assert_eq!(result.detail.as_deref(), Some("M"));
    }

    #[test]
    fn test_from_action_failure_without_message_uses_default() {
        let resp = ActionResp {
            code: 1,
            message: None,
        };
        let result = TaskResult::from_action(&resp);
        assert!(!result.succeeded);
        assert_eq!(result.detail.as_deref(), Some("unknown error"));
    }
}
