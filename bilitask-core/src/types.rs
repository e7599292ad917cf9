//! Bilibili API Data Structures

use serde::Deserialize;

/// Generic envelope for side-effecting actions (share, heartbeat, check-ins)
#[derive(Debug, Clone, Deserialize)]
pub struct ActionResp {
    pub code: i64,
    #[serde(default)]
    pub message: Option<String>,
}

/// Nav (profile lookup) response
///
/// `data` stays untyped here: login verification only needs `code`,
/// while the snapshot path decodes `data` leniently on its own.
#[derive(Debug, Clone, Deserialize)]
pub struct NavResp {
    pub code: i64,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NavData {
    pub uname: String,
    pub mid: u64,
    pub level_info: LevelInfo,
    pub money: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LevelInfo {
    pub current_level: u32,
    pub current_exp: u64,
}

/// Discovery (region dynamic) response
#[derive(Debug, Clone, Deserialize)]
pub struct RegionResp {
    pub code: i64,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<RegionData>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegionData {
    pub archives: Vec<Archive>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Archive {
    pub bvid: String,
}

/// QR pairing-init response
#[derive(Debug, Clone, Deserialize)]
pub struct QrcodeResp {
    pub code: i64,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<QrcodeData>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QrcodeData {
    pub url: String,
    pub qrcode_key: String,
}

/// QR pairing-poll response
#[derive(Debug, Clone, Deserialize)]
pub struct QrcodePollResp {
    pub code: i64,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<QrcodePollData>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QrcodePollData {
    pub code: i64,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub message: Option<String>,
}

/// Read-only profile display data for the final report
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileSnapshot {
    pub display_name: String,
    pub user_id: u64,
    pub level: u32,
    pub experience: u64,
    pub coin_balance: f64,
}

impl From<NavData> for ProfileSnapshot {
    fn from(data: NavData) -> Self {
        Self {
            display_name: data.uname,
            user_id: data.mid,
            level: data.level_info.current_level,
            experience: data.level_info.current_exp,
            coin_balance: data.money,
        }
    }
}
