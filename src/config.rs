// =============================================================================
// Signal Configuration — read once at startup, injected everywhere else
// =============================================================================
//
// Sourced from the process environment (after `.env` is loaded). Nothing in
// the request path reads the environment; the pipeline and the engine client
// receive this struct at construction.
//
// Variables:
//   OPENAI_API_KEY                 reasoning-engine credential
//   OPENAI_MODEL                   model identifier
//   OPENAI_BASE_URL                API root (OpenAI-compatible)
//   SIGNAL_BIND_ADDR               HTTP listen address
//   SIGNAL_INFERENCE_TIMEOUT_SECS  hard bound on one engine call
//   SIGNAL_LOCAL_UTC_OFFSET_HOURS  local clock shown in the prompt
//   SIGNAL_LOCAL_TZ_LABEL          label for that clock
// =============================================================================

use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::contract::LocalClock;

// =============================================================================
// SignalConfig
// =============================================================================

#[derive(Clone)]
pub struct SignalConfig {
    /// Never logged in full.
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub bind_addr: String,
    pub inference_timeout_secs: u64,
    pub local_utc_offset_hours: i32,
    pub local_tz_label: String,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: "gpt-4o-2024-08-06".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            bind_addr: "0.0.0.0:8000".to_string(),
            inference_timeout_secs: 30,
            local_utc_offset_hours: 8,
            local_tz_label: "MYT".to_string(),
        }
    }
}

impl std::fmt::Debug for SignalConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignalConfig")
            .field("api_key", &self.key_preview())
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("bind_addr", &self.bind_addr)
            .field("inference_timeout_secs", &self.inference_timeout_secs)
            .field("local_utc_offset_hours", &self.local_utc_offset_hours)
            .field("local_tz_label", &self.local_tz_label)
            .finish()
    }
}

impl SignalConfig {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using an arbitrary variable lookup. Unset or blank variables keep
    /// their defaults; present-but-unparseable numbers are an error.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let mut config = Self::default();

        if let Some(v) = get("OPENAI_API_KEY") {
            config.api_key = v;
        }
        if let Some(v) = get("OPENAI_MODEL") {
            config.model = v;
        }
        if let Some(v) = get("OPENAI_BASE_URL") {
            config.base_url = v.trim_end_matches('/').to_string();
        }
        if let Some(v) = get("SIGNAL_BIND_ADDR") {
            config.bind_addr = v;
        }
        if let Some(v) = get("SIGNAL_INFERENCE_TIMEOUT_SECS") {
            config.inference_timeout_secs = v
                .parse()
                .with_context(|| format!("SIGNAL_INFERENCE_TIMEOUT_SECS={v} is not an integer"))?;
        }
        if let Some(v) = get("SIGNAL_LOCAL_UTC_OFFSET_HOURS") {
            config.local_utc_offset_hours = v
                .parse()
                .with_context(|| format!("SIGNAL_LOCAL_UTC_OFFSET_HOURS={v} is not an integer"))?;
        }
        if let Some(v) = get("SIGNAL_LOCAL_TZ_LABEL") {
            config.local_tz_label = v;
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject settings the pipeline cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.inference_timeout_secs == 0 {
            bail!("inference timeout must be greater than zero");
        }
        if !(-23..=23).contains(&self.local_utc_offset_hours) {
            bail!(
                "local UTC offset {}h is outside -23..=23",
                self.local_utc_offset_hours
            );
        }
        if self.model.is_empty() {
            bail!("model identifier must not be empty");
        }
        Ok(())
    }

    pub fn inference_timeout(&self) -> Duration {
        Duration::from_secs(self.inference_timeout_secs)
    }

    pub fn local_clock(&self) -> LocalClock {
        LocalClock {
            offset_hours: self.local_utc_offset_hours,
            label: self.local_tz_label.clone(),
        }
    }

    /// `sk-abcde...wxyz`, or `NOT SET` for short or missing keys.
    pub fn key_preview(&self) -> String {
        let key = &self.api_key;
        if key.chars().count() > 12 {
            let head: String = key.chars().take(8).collect();
            let tail: String = key
                .chars()
                .rev()
                .take(4)
                .collect::<Vec<_>>()
                .into_iter()
                .rev()
                .collect();
            format!("{head}...{tail}")
        } else {
            "NOT SET".to_string()
        }
    }
}
