use config::{Config as ConfigBuilder, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub credential: CredentialConfig,
    pub tasks: TasksConfig,
    pub endpoints: EndpointsConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CredentialConfig {
    /// Environment variable consulted first for the session cookie
    pub env_var: String,
    /// File a previously persisted credential is read from (and pairing writes to)
    pub cookie_file: String,
    /// File the raw pairing confirmation response is written to
    pub audit_file: String,
    /// Whether interactive pairing may be started when no credential exists
    pub allow_pairing: bool,
}

impl Default for CredentialConfig {
    fn default() -> Self {
        Self {
            env_var: "BILIBILI_COOKIE".to_string(),
            cookie_file: "cookie.txt".to_string(),
            audit_file: "auth.json".to_string(),
            allow_pairing: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TasksConfig {
    /// Video reported to the watch-heartbeat endpoint
    pub watch_bvid: String,
}

impl Default for TasksConfig {
    fn default() -> Self {
        Self {
            watch_bvid: "BV1rtkiYUEvy".to_string(),
        }
    }
}

/// Remote API hosts. Overridable so tests can point the client at a mock server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointsConfig {
    pub api_base: String,
    pub passport_base: String,
    pub live_base: String,
    pub manga_base: String,
}

impl Default for EndpointsConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.bilibili.com".to_string(),
            passport_base: "https://passport.bilibili.com".to_string(),
            live_base: "https://api.live.bilibili.com".to_string(),
            manga_base: "https://manga.bilibili.com".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String, // "json" or "pretty"
    pub file_path: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            file_path: None,
        }
    }
}

impl Config {
    /// Load configuration from multiple sources with priority:
    /// 1. Environment variables (highest priority)
    /// 2. Config file (if provided)
    /// 3. Defaults (lowest priority)
    pub fn load(config_file: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = ConfigBuilder::builder();

        if let Some(path) = config_file {
            if Path::new(path).exists() {
                builder = builder.add_source(File::with_name(path));
            }
        }

        // Override with environment variables (BILITASK_LOGGING_LEVEL, etc.)
        builder = builder.add_source(
            Environment::with_prefix("BILITASK")
                .separator("_")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Load from environment variables only
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::load(None)
    }

    /// Load from file path
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        Self::load(Some(path))
    }

    /// Validate configuration, collecting every problem found
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.credential.env_var.is_empty() {
            errors.push("credential.env_var must not be empty".to_string());
        }
        if self.credential.cookie_file.is_empty() {
            errors.push("credential.cookie_file must not be empty".to_string());
        }
        if self.tasks.watch_bvid.is_empty() {
            errors.push("tasks.watch_bvid must not be empty".to_string());
        }
        for (name, base) in [
            ("endpoints.api_base", &self.endpoints.api_base),
            ("endpoints.passport_base", &self.endpoints.passport_base),
            ("endpoints.live_base", &self.endpoints.live_base),
            ("endpoints.manga_base", &self.endpoints.manga_base),
        ] {
            if !base.starts_with("http://") && !base.starts_with("https://") {
                errors.push(format!("{name} must be an http(s) URL, got {base:?}"));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Load configuration from config file or environment variables
///
/// Config file search order:
/// 1. BILITASK_CONFIG_PATH environment variable (explicit path)
/// 2. ./config.yaml (current working directory)
/// 3. Fall back to environment variables only
pub fn load_config() -> anyhow::Result<Config> {
    let config_path = std::env::var("BILITASK_CONFIG_PATH")
        .ok()
        .filter(|p| Path::new(p).exists())
        .or_else(|| {
            let cwd = "config.yaml";
            if Path::new(cwd).exists() {
                Some(cwd.to_string())
            } else {
                None
            }
        });

    let config = if let Some(path) = config_path {
        eprintln!("Loading config from {path}");
        Config::from_file(&path)
            .map_err(|e| anyhow::anyhow!("failed to load config from {path}: {e}"))?
    } else {
        Config::from_env().unwrap_or_default()
    };

    if let Err(errors) = config.validate() {
        return Err(anyhow::anyhow!(
            "Configuration validation failed with {} error(s): {}",
            errors.len(),
            errors.join("; ")
        ));
    }

    Ok(config)
}
