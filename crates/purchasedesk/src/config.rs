use std::env;
use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use crate::error::{AppError, AppResult};

const DEFAULT_API_URL: &str = "http://localhost:8080";
const DEFAULT_TOAST_TTL_SECS: u64 = 6;
const DEFAULT_HISTORY_LIMIT: usize = 5;

/// How a failed backend call is recovered from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorPolicy {
    /// Every failure sends the user back to login.
    #[default]
    Blanket,
    /// Only an unauthorized response sends the user back to login.
    PerKind,
}

impl ErrorPolicy {
    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "per-kind" | "per_kind" | "perkind" => Some(Self::PerKind),
            "blanket" => Some(Self::Blanket),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: Url,
    pub token_path: PathBuf,
    pub toast_ttl: Duration,
    pub error_policy: ErrorPolicy,
    pub history_limit: usize,
}

impl Config {
    pub fn from_env() -> AppResult<Self> {
        let api_url =
            env::var("PURCHASEDESK_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());

        Ok(Self {
            api_url: parse_api_url(&api_url)?,
            token_path: env::var("PURCHASEDESK_TOKEN_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| default_token_path()),
            toast_ttl: Duration::from_secs(
                env::var("PURCHASEDESK_TOAST_TTL_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(DEFAULT_TOAST_TTL_SECS),
            ),
            error_policy: env::var("PURCHASEDESK_ERROR_POLICY")
                .ok()
                .and_then(|v| ErrorPolicy::parse(&v))
                .unwrap_or_default(),
            history_limit: env::var("PURCHASEDESK_HISTORY_LIMIT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_HISTORY_LIMIT),
        })
    }

    /// Configuration for a given backend with every other setting at its default.
    pub fn for_api(api_url: &str, token_path: impl Into<PathBuf>) -> AppResult<Self> {
        Ok(Self {
            api_url: parse_api_url(api_url)?,
            token_path: token_path.into(),
            toast_ttl: Duration::from_secs(DEFAULT_TOAST_TTL_SECS),
            error_policy: ErrorPolicy::default(),
            history_limit: DEFAULT_HISTORY_LIMIT,
        })
    }

    pub fn with_api_url(mut self, api_url: &str) -> AppResult<Self> {
        self.api_url = parse_api_url(api_url)?;
        Ok(self)
    }
}

pub fn parse_api_url(raw: &str) -> AppResult<Url> {
    Url::parse(raw.trim_end_matches('/'))
        .map_err(|e| AppError::Config(format!("PURCHASEDESK_API_URL {raw:?}: {e}")))
}

fn default_token_path() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join("purchasedesk"))
        .unwrap_or_else(|| PathBuf::from(".purchasedesk"))
        .join("session.json")
}
