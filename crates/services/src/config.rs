use std::env;
use std::time::Duration;

use url::Url;

use crate::error::ConfigError;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const DEFAULT_REVEAL_DELAY: Duration = Duration::from_millis(500);

/// Where the practice backend lives and how the client talks to it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiConfig {
    pub base_url: Url,
    /// Pause between a confirmed submission and showing the explanation.
    pub reveal_delay: Duration,
    /// Transport timeout; `None` leaves it to the HTTP client defaults.
    pub timeout: Option<Duration>,
}

impl ApiConfig {
    /// # Errors
    ///
    /// Returns `ConfigError` if `base_url` is not an absolute http(s) url.
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: parse_base_url(base_url)?,
            reveal_delay: DEFAULT_REVEAL_DELAY,
            timeout: None,
        })
    }

    #[must_use]
    pub fn with_reveal_delay(mut self, delay: Duration) -> Self {
        self.reveal_delay = delay;
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Read `QUIZ_API_URL`, `QUIZ_REVEAL_DELAY_MS` and `QUIZ_HTTP_TIMEOUT_SECS`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when a variable is set but malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub(crate) fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let base_url = lookup("QUIZ_API_URL")
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.into());
        let mut config = Self::new(&base_url)?;

        if let Some(raw) = lookup("QUIZ_REVEAL_DELAY_MS") {
            let millis = parse_number("QUIZ_REVEAL_DELAY_MS", &raw)?;
            config.reveal_delay = Duration::from_millis(millis);
        }
        if let Some(raw) = lookup("QUIZ_HTTP_TIMEOUT_SECS") {
            let secs = parse_number("QUIZ_HTTP_TIMEOUT_SECS", &raw)?;
            config.timeout = (secs > 0).then(|| Duration::from_secs(secs));
        }
        Ok(config)
    }
}

/// Parse `raw` and make sure relative joins append to its path.
///
/// # Errors
///
/// Returns `ConfigError` if the url is malformed or cannot carry a path.
pub fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let trimmed = raw.trim();
    let mut url = Url::parse(trimmed).map_err(|source| ConfigError::InvalidUrl {
        raw: trimmed.to_string(),
        source,
    })?;
    if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::NotABase(trimmed.to_string()));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

fn parse_number(var: &'static str, raw: &str) -> Result<u64, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::InvalidNumber {
        var,
        raw: raw.to_string(),
    })
}
