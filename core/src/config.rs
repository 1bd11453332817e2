//! Run settings and the API token.
//!
//! Values arrive as raw strings from the environment; this module validates
//! them into typed settings. The token is kept apart from `Settings` so a
//! dry run can build requests without one.

use std::fmt;

use chrono_tz::Tz;

use crate::builder::DEFAULT_PRIORITY;
use crate::error::ConfigError;

pub const DEFAULT_ENDPOINT: &str = "https://api.todoist.com/sync/v8/sync";
pub const DEFAULT_TIMEZONE: &str = "Asia/Singapore";
pub const DEFAULT_LANG: &str = "en";

/// Bearer token for the sync API. `Debug` never prints the value.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiToken(String);

impl ApiToken {
    /// Accepts the raw environment value; absent or blank is an error.
    pub fn new(raw: Option<String>) -> Result<Self, ConfigError> {
        match raw {
            Some(token) if !token.trim().is_empty() => Ok(Self(token.trim().to_string())),
            _ => Err(ConfigError::MissingToken),
        }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiToken(<redacted>)")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub endpoint: String,
    pub timezone: Tz,
    pub lang: String,
    pub priority: u8,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timezone: chrono_tz::Asia::Singapore,
            lang: DEFAULT_LANG.to_string(),
            priority: DEFAULT_PRIORITY,
        }
    }
}

impl Settings {
    pub fn new(endpoint: &str, timezone: &str, lang: &str, priority: u8) -> Result<Self, ConfigError> {
        Ok(Self {
            endpoint: endpoint.to_string(),
            timezone: parse_timezone(timezone)?,
            lang: lang.to_string(),
            priority: validate_priority(priority)?,
        })
    }
}

/// Parse an IANA zone name such as `Asia/Singapore`.
pub fn parse_timezone(name: &str) -> Result<Tz, ConfigError> {
    name.trim()
        .parse::<Tz>()
        .map_err(|_| ConfigError::UnknownTimezone(name.to_string()))
}

fn validate_priority(priority: u8) -> Result<u8, ConfigError> {
    if (1..=4).contains(&priority) {
        Ok(priority)
    } else {
        Err(ConfigError::InvalidPriority(priority))
    }
}
