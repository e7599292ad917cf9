//! Session credential handling
//!
//! A credential is the raw cookie string the platform hands out after
//! login: `"; "`-joined `key=value` pairs, sent back verbatim in the
//! `Cookie` header. The anti-forgery token (`bili_jct`) is re-derived
//! from the string on every use, never stored on its own.

use std::path::Path;

use url::Url;

use crate::error::{Error, Result};

/// Key of the cookie segment carrying the anti-forgery token
const CSRF_COOKIE_KEY: &str = "bili_jct";

/// An opaque session cookie proving the caller is an authenticated account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Read the credential from an environment variable.
    ///
    /// Returns `None` when the variable is unset or empty.
    pub fn from_env(var: &str) -> Option<Self> {
        std::env::var(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(Self)
    }

    /// Read a previously persisted credential file, trimmed of
    /// surrounding whitespace.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            Error::Configuration(format!("cannot read credential file {}: {e}", path.display()))
        })?;
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(Error::Configuration(format!(
                "credential file {} is empty",
                path.display()
            )));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Derive a credential from the pairing confirmation URL.
    ///
    /// The URL's query string encodes the session as ordered `key=value`
    /// pairs; they are kept raw (percent-encoding included) and re-joined
    /// with `"; "`, which is exactly the form the `Cookie` header wants.
    pub fn from_confirm_url(confirm_url: &str) -> Result<Self> {
        let parsed = Url::parse(confirm_url)
            .map_err(|e| Error::Parse(format!("invalid authorization url: {e}")))?;
        let query = parsed
            .query()
            .ok_or_else(|| Error::Parse("authorization url carries no session data".to_string()))?;

        let pairs: Vec<&str> = query
            .split('&')
            .filter(|segment| segment.contains('='))
            .collect();
        if pairs.is_empty() {
            return Err(Error::Parse(
                "authorization url carries no session data".to_string(),
            ));
        }

        Ok(Self(pairs.join("; ")))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Extract the anti-forgery token by scanning the semicolon-delimited
    /// cookie segments for `bili_jct`.
    ///
    /// A credential without that segment yields `None`; deciding what to
    /// do about the absence is the caller's business.
    #[must_use]
    pub fn csrf(&self) -> Option<&str> {
        self.0
            .split(';')
            .map(str::trim)
            .find_map(|segment| segment.strip_prefix(CSRF_COOKIE_KEY)?.strip_prefix('='))
    }

    /// Persist the credential as a single-line plain text file.
    pub fn persist(&self, path: &Path) -> Result<()> {
        std::fs::write(path, &self.0)?;
        Ok(())
    }
}
