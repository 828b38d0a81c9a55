//! Runtime configuration, read from the environment.

use anyhow::Context;
use figment::{Figment, providers::Env};
use fundu::{DurationParser, TimeUnit};
use serde::{Deserialize, Deserializer};
use std::time::Duration;

use crate::renaissance::Session;

const DEFAULT_BASE_URL: &str = "https://global-zone60.renaissance-go.com";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Base level for this crate's log targets; `RUST_LOG` overrides it.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_base_url")]
    pub renaissance_base_url: String,
    #[serde(default, deserialize_with = "deserialize_text")]
    pub renaissance_token: Option<String>,
    #[serde(default, deserialize_with = "deserialize_text")]
    pub renaissance_client_id: Option<String>,
    #[serde(default, deserialize_with = "deserialize_text")]
    pub renaissance_user_id: Option<String>,
    /// Per-request timeout, e.g. `15s`.
    #[serde(
        default = "default_request_timeout",
        deserialize_with = "deserialize_duration"
    )]
    pub request_timeout: Duration,
    /// Pause between consecutive report fetches, e.g. `200ms`.
    #[serde(
        default = "default_request_delay",
        deserialize_with = "deserialize_duration"
    )]
    pub request_delay: Duration,
}

fn default_log_level() -> String {
    "info".to_owned()
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_owned()
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(15)
}

fn default_request_delay() -> Duration {
    Duration::from_millis(200)
}

/// Parse a human duration such as `200ms`, `15s` or `1m`. Bare numbers are seconds.
fn parse_duration(raw: &str) -> Result<Duration, String> {
    let parser = DurationParser::with_time_units(&[
        TimeUnit::MilliSecond,
        TimeUnit::Second,
        TimeUnit::Minute,
    ]);

    let parsed = parser
        .parse(raw.trim())
        .map_err(|e| format!("invalid duration {raw:?}: {e}"))?;
    Duration::try_from(parsed).map_err(|e| format!("invalid duration {raw:?}: {e}"))
}

fn deserialize_duration<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
    // The env provider hands bare numbers over as integers.
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawDuration {
        Seconds(u64),
        Text(String),
    }

    match RawDuration::deserialize(deserializer)? {
        RawDuration::Seconds(secs) => Ok(Duration::from_secs(secs)),
        RawDuration::Text(text) => parse_duration(&text).map_err(serde::de::Error::custom),
    }
}

/// Numeric-looking env values arrive as numbers; ids are kept as text.
fn deserialize_text<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawText {
        Text(String),
        Integer(i64),
        Float(f64),
    }

    Ok(Option::<RawText>::deserialize(deserializer)?.map(|raw| match raw {
        RawText::Text(s) => s,
        RawText::Integer(n) => n.to_string(),
        RawText::Float(n) => n.to_string(),
    }))
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> anyhow::Result<Self> {
        Self::from_figment(Figment::new().merge(Env::raw()))
    }

    fn from_figment(figment: Figment) -> anyhow::Result<Self> {
        figment.extract().context("Failed to load config")
    }

    /// Portal credentials, required by the `fetch` command.
    pub fn session(&self) -> anyhow::Result<Session> {
        fn require(value: &Option<String>, key: &str) -> anyhow::Result<String> {
            match value.as_deref().map(str::trim) {
                Some(v) if !v.is_empty() => Ok(v.to_owned()),
                _ => anyhow::bail!("{key} must be set to fetch reports"),
            }
        }

        Ok(Session {
            bearer_token: require(&self.renaissance_token, "RENAISSANCE_TOKEN")?,
            client_id: require(&self.renaissance_client_id, "RENAISSANCE_CLIENT_ID")?,
            user_id: require(&self.renaissance_user_id, "RENAISSANCE_USER_ID")?,
        })
    }
}
