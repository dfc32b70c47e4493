//! Purpose: Resolve runtime configuration from flags and environment variables.
//! Exports: `TourConfig`, `parse_duration`, env var names.
//! Role: Single place where the binary turns CLI input into walkthrough settings.
//! Invariants: Flags win over environment; environment wins over built-in defaults.
use std::path::PathBuf;
use std::time::Duration;

use crate::core::error::{Error, ErrorKind};
use crate::files::bundle::RESOURCES_ENV;

pub const ECHO_URL_ENV: &str = "PLAYGROUNDS_ECHO_URL";
pub const DEFAULT_ECHO_URL: &str = "http://httpbin.org";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone, Debug, PartialEq)]
pub struct TourConfig {
    pub resources: Option<PathBuf>,
    pub echo_url: String,
    pub timeout: Duration,
}

impl Default for TourConfig {
    fn default() -> Self {
        Self {
            resources: None,
            echo_url: DEFAULT_ECHO_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl TourConfig {
    pub fn from_env() -> Self {
        Self::resolve(|name| std::env::var(name).ok())
    }

    /// Builds a config from an arbitrary variable lookup; blank values count as unset.
    pub fn resolve(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        let mut config = Self::default();
        if let Some(dir) = var(RESOURCES_ENV) {
            config.resources = Some(PathBuf::from(dir));
        }
        if let Some(url) = var(ECHO_URL_ENV) {
            config.echo_url = url;
        }
        config
    }

    pub fn with_resources(mut self, dir: Option<PathBuf>) -> Self {
        if dir.is_some() {
            self.resources = dir;
        }
        self
    }

    pub fn with_echo_url(mut self, url: Option<String>) -> Self {
        if let Some(url) = url {
            self.echo_url = url;
        }
        self
    }

    pub fn with_timeout(mut self, timeout: Option<&str>) -> Result<Self, Error> {
        if let Some(raw) = timeout {
            self.timeout = parse_duration(raw)?;
        }
        Ok(self)
    }
}

pub fn parse_duration(input: &str) -> Result<Duration, Error> {
    let invalid = || {
        Error::new(ErrorKind::Usage)
            .with_message(format!("invalid duration '{input}'"))
            .with_hint("Use a number plus ms|s|m|h (e.g. 10s).")
    };
    let trimmed = input.trim();
    let split = trimmed.find(|ch: char| !ch.is_ascii_digit());
    let (num_str, unit) = match split {
        Some(idx) => trimmed.split_at(idx),
        None => return Err(invalid()),
    };
    if num_str.is_empty() {
        return Err(invalid());
    }
    let value: u64 = num_str.parse().map_err(|_| invalid())?;
    let millis = match unit {
        "ms" => value,
        "s" => value.saturating_mul(1_000),
        "m" => value.saturating_mul(60_000),
        "h" => value.saturating_mul(3_600_000),
        _ => return Err(invalid()),
    };
    if millis == 0 {
        return Err(invalid().with_hint("Timeouts must be greater than zero."));
    }
    Ok(Duration::from_millis(millis))
}
