//! Bilibili HTTP Client

use reqwest::Client;

use crate::config::EndpointsConfig;
use crate::credential::Credential;
use crate::error::{Error, Result};
use crate::types::{ActionResp, NavResp, QrcodeResp, RegionResp};

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) Chrome/120.0.0.0";
const REFERER: &str = "https://www.bilibili.com";
const PASSPORT_REFERER: &str = "https://passport.bilibili.com/login";

/// Bilibili HTTP Client
///
/// One shared `reqwest::Client`; the session cookie, when present, is
/// attached verbatim to every request.
pub struct BilibiliClient {
    client: Client,
    endpoints: EndpointsConfig,
    cookie: Option<String>,
}

impl BilibiliClient {
    /// Create an unauthenticated client (pairing only needs this much)
    pub fn new(endpoints: EndpointsConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| Error::Network(e.to_string()))?;

        Ok(Self {
            client,
            endpoints,
            cookie: None,
        })
    }

    /// Create a client that sends the given credential with every request
    pub fn with_credential(endpoints: EndpointsConfig, credential: &Credential) -> Result<Self> {
        let mut client = Self::new(endpoints)?;
        client.cookie = Some(credential.as_str().to_string());
        Ok(client)
    }

    fn add_cookie(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if let Some(cookie) = &self.cookie {
            req.header("Cookie", cookie)
        } else {
            req
        }
    }

    /// Authenticated profile lookup
    ///
    /// Serves both login verification (`code` only) and the best-effort
    /// profile snapshot (lenient decode of `data` at the call site).
    pub async fn nav(&self) -> Result<NavResp> {
        let url = format!("{}/x/web-interface/nav", self.endpoints.api_base);
        let req = self.add_cookie(self.client.get(&url).header("Referer", REFERER));

        let resp = req.send().await?.error_for_status()?;
        Ok(resp.json().await?)
    }

    /// Fetch candidate videos from the region discovery endpoint
    pub async fn region_videos(&self, page_size: u32, region_id: u32) -> Result<RegionResp> {
        let url = format!(
            "{}/x/web-interface/dynamic/region?ps={page_size}&rid={region_id}",
            self.endpoints.api_base
        );
        let req = self.add_cookie(self.client.get(&url).header("Referer", REFERER));

        let resp = req.send().await?.error_for_status()?;
        Ok(resp.json().await?)
    }

    /// Submit a share action for a video
    pub async fn share_video(&self, bvid: &str, csrf: &str) -> Result<ActionResp> {
        let url = format!("{}/x/web-interface/share/add", self.endpoints.api_base);
        let params = [("bvid", bvid), ("csrf", csrf)];
        let req = self.add_cookie(self.client.post(&url).header("Referer", REFERER).form(&params));

        let resp = req.send().await?.error_for_status()?;
        Ok(resp.json().await?)
    }

    /// Report watch progress to the heartbeat endpoint
    pub async fn report_watch(&self, bvid: &str, csrf: &str, played_time: u32) -> Result<ActionResp> {
        let url = format!("{}/x/click-interface/web/heartbeat", self.endpoints.api_base);
        let played_time = played_time.to_string();
        let params = [
            ("bvid", bvid),
            ("csrf", csrf),
            ("played_time", played_time.as_str()),
        ];
        let req = self.add_cookie(self.client.post(&url).header("Referer", REFERER).form(&params));

        let resp = req.send().await?.error_for_status()?;
        Ok(resp.json().await?)
    }

    /// Daily live check-in
    pub async fn live_checkin(&self) -> Result<ActionResp> {
        let url = format!(
            "{}/xlive/web-ucenter/v1/sign/DoSign",
            self.endpoints.live_base
        );
        let req = self.add_cookie(self.client.get(&url).header("Referer", REFERER));

        let resp = req.send().await?.error_for_status()?;
        Ok(resp.json().await?)
    }

    /// Daily comic check-in
    pub async fn comic_checkin(&self) -> Result<ActionResp> {
        let url = format!(
            "{}/twirp/activity.v1.Activity/ClockIn",
            self.endpoints.manga_base
        );
        let params = [("platform", "ios")];
        let req = self.add_cookie(self.client.post(&url).header("Referer", REFERER).form(&params));

        let resp = req.send().await?.error_for_status()?;
        Ok(resp.json().await?)
    }

    /// Request a pairing code, returning `(authorization_url, exchange_key)`
    pub async fn generate_qrcode(&self) -> Result<(String, String)> {
        let url = format!(
            "{}/x/passport-login/web/qrcode/generate",
            self.endpoints.passport_base
        );
        let req = self.client.get(&url).header("Referer", PASSPORT_REFERER);

        let resp = req.send().await?.error_for_status()?;
        let json: QrcodeResp = resp.json().await?;

        if json.code != 0 {
            return Err(Error::Pairing(
                json.message.unwrap_or_else(|| "unknown error".to_string()),
            ));
        }

        let data = json
            .data
            .ok_or_else(|| Error::Parse("missing pairing code data".to_string()))?;
        Ok((data.url, data.qrcode_key))
    }

    /// Poll the pairing status endpoint, returning the raw body
    ///
    /// The body is kept as text so a confirmation can be written verbatim
    /// to the audit file; the pairing flow decodes it.
    pub async fn poll_qrcode(&self, key: &str) -> Result<String> {
        let url = format!(
            "{}/x/passport-login/web/qrcode/poll?qrcode_key={key}",
            self.endpoints.passport_base
        );
        let req = self.client.get(&url).header("Referer", PASSPORT_REFERER);

        let resp = req.send().await?.error_for_status()?;
        Ok(resp.text().await?)
    }
}
