//! Process-wide configuration.
//!
//! Loaded once at startup (usually from the environment) and passed
//! explicitly into [`CommandHandler`](crate::CommandHandler). Nothing in the
//! pipeline reads the environment on its own.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{ActionError, ActionResult};

/// Default spell endpoint (JSON API).
pub const DEFAULT_SPELL_ENDPOINT: &str = "https://api.open5e.com/spells/";

/// Prefix for Slack incoming webhook paths.
pub const SLACK_WEBHOOK_BASE: &str = "https://hooks.slack.com/services/";

/// Default upstream timeout in seconds.
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 5;

/// Shape of the documents served by the spell endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceFormat {
    /// JSON API (open5e style).
    #[default]
    Json,
    /// HTML page with statblock markup.
    Html,
}

impl std::str::FromStr for SourceFormat {
    type Err = ActionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "html" => Ok(Self::Html),
            other => Err(ActionError::Config(format!(
                "unknown spell source format '{}', expected json or html",
                other
            ))),
        }
    }
}

/// Configuration for the command pipeline.
#[derive(Clone)]
pub struct MaestroConfig {
    /// Base URL the spell slug is appended to.
    spell_endpoint: String,
    /// Document shape served by `spell_endpoint`.
    spell_format: SourceFormat,
    /// Optional incoming webhook receiving a copy of every result.
    webhook_url: Option<SecretString>,
    /// Timeout for every outbound request.
    fetch_timeout: Duration,
    /// Deployment stage (informational).
    stage: Option<String>,
    /// Deployment region (informational).
    region: Option<String>,
}

impl std::fmt::Debug for MaestroConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MaestroConfig")
            .field("spell_endpoint", &self.spell_endpoint)
            .field("spell_format", &self.spell_format)
            .field("webhook_url", &self.webhook_url.as_ref().map(|_| "[REDACTED]"))
            .field("fetch_timeout", &self.fetch_timeout)
            .field("stage", &self.stage)
            .field("region", &self.region)
            .finish()
    }
}

impl Default for MaestroConfig {
    fn default() -> Self {
        Self::new(DEFAULT_SPELL_ENDPOINT, SourceFormat::Json)
    }
}

impl MaestroConfig {
    /// Create a configuration for the given spell endpoint.
    pub fn new(spell_endpoint: impl Into<String>, spell_format: SourceFormat) -> Self {
        Self {
            spell_endpoint: spell_endpoint.into(),
            spell_format,
            webhook_url: None,
            fetch_timeout: Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
            stage: None,
            region: None,
        }
    }

    /// Send a copy of every successful result to this webhook.
    pub fn with_webhook_url(mut self, url: impl Into<String>) -> Self {
        self.webhook_url = Some(SecretString::from(url.into()));
        self
    }

    /// Set the upstream timeout.
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    /// Set deployment stage and region.
    pub fn with_deployment(mut self, stage: Option<String>, region: Option<String>) -> Self {
        self.stage = stage;
        self.region = region;
        self
    }

    /// Load configuration from environment variables.
    ///
    /// All variables are optional:
    /// - `MAESTRO_SPELL_ENDPOINT`
    /// - `MAESTRO_SPELL_FORMAT` (`json` or `html`)
    /// - `MAESTRO_SLACK_WEBHOOK_URL`, or `MAESTRO_SLACK_WEBHOOK_PATH` which is
    ///   appended to `https://hooks.slack.com/services/`
    /// - `MAESTRO_FETCH_TIMEOUT_SECS`
    /// - `MAESTRO_STAGE`, `MAESTRO_REGION`
    pub fn from_env() -> ActionResult<Self> {
        let endpoint = env_non_empty("MAESTRO_SPELL_ENDPOINT")
            .unwrap_or_else(|| DEFAULT_SPELL_ENDPOINT.to_string());

        let format = match env_non_empty("MAESTRO_SPELL_FORMAT") {
            Some(raw) => raw.parse()?,
            None => SourceFormat::default(),
        };

        let mut config = Self::new(endpoint, format)
            .with_deployment(env_non_empty("MAESTRO_STAGE"), env_non_empty("MAESTRO_REGION"));

        if let Some(url) = env_non_empty("MAESTRO_SLACK_WEBHOOK_URL") {
            config = config.with_webhook_url(url);
        } else if let Some(path) = env_non_empty("MAESTRO_SLACK_WEBHOOK_PATH") {
            config = config.with_webhook_url(format!(
                "{}{}",
                SLACK_WEBHOOK_BASE,
                path.trim_start_matches('/')
            ));
        } else {
            debug!("No Slack webhook configured, results will not be mirrored");
        }

        if let Some(raw) = env_non_empty("MAESTRO_FETCH_TIMEOUT_SECS") {
            let secs: u64 = raw.parse().map_err(|_| {
                ActionError::Config(format!("MAESTRO_FETCH_TIMEOUT_SECS is not a number: {}", raw))
            })?;
            config = config.with_fetch_timeout(Duration::from_secs(secs));
        }

        if config.spell_format == SourceFormat::Html && config.spell_endpoint.contains("open5e") {
            warn!("HTML source format configured with an open5e endpoint, this is likely wrong");
        }

        Ok(config)
    }

    /// Spell endpoint base URL.
    pub fn spell_endpoint(&self) -> &str {
        &self.spell_endpoint
    }

    /// Spell endpoint document format.
    pub fn spell_format(&self) -> SourceFormat {
        self.spell_format
    }

    /// Webhook URL, if configured.
    pub fn webhook_url(&self) -> Option<&str> {
        self.webhook_url.as_ref().map(|s| s.expose_secret())
    }

    /// Upstream timeout.
    pub fn fetch_timeout(&self) -> Duration {
        self.fetch_timeout
    }

    /// Deployment stage.
    pub fn stage(&self) -> Option<&str> {
        self.stage.as_deref()
    }

    /// Deployment region.
    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }

    /// Validate the configuration.
    pub fn validate(&self) -> ActionResult<()> {
        if self.spell_endpoint.trim().is_empty() {
            return Err(ActionError::Config("Spell endpoint is empty".to_string()));
        }
        if !is_http_url(&self.spell_endpoint) {
            return Err(ActionError::Config(format!(
                "Spell endpoint must be an http(s) URL: {}",
                self.spell_endpoint
            )));
        }
        if let Some(url) = self.webhook_url()
            && !is_http_url(url)
        {
            return Err(ActionError::Config(
                "Webhook URL must be an http(s) URL".to_string(),
            ));
        }
        if self.fetch_timeout.is_zero() {
            return Err(ActionError::Config(
                "Fetch timeout must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

fn env_non_empty(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn is_http_url(s: &str) -> bool {
    s.starts_with("http://") || s.starts_with("https://")
}
