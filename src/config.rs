//! Environment-driven settings.
//!
//! Read after `dotenvy` has loaded any `.env` file:
//! - `LOG_FILE_PATH`: JSON log file (default `logs/call_log_analytics.log`)
//! - `CALL_ANALYTICS_UTC_OFFSET`: bucket hours at a fixed offset such as
//!   `+05:30` instead of the host's local zone

use chrono::FixedOffset;

use crate::analyzers::classify::HourZone;
use crate::error::{Error, Result};

pub const DEFAULT_LOG_FILE_PATH: &str = "logs/call_log_analytics.log";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub log_file_path: String,
    pub hour_zone: HourZone,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_file_path: DEFAULT_LOG_FILE_PATH.to_string(),
            hour_zone: HourZone::Local,
        }
    }
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds settings from any variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut settings = Settings::default();

        if let Some(path) = lookup("LOG_FILE_PATH").filter(|p| !p.trim().is_empty()) {
            settings.log_file_path = path;
        }

        if let Some(raw) = lookup("CALL_ANALYTICS_UTC_OFFSET").filter(|v| !v.trim().is_empty()) {
            settings.hour_zone = HourZone::Fixed(parse_utc_offset(&raw)?);
        }

        Ok(settings)
    }
}

/// Parses `+HH:MM`, `-HH:MM`, `+HH` or `Z`.
pub fn parse_utc_offset(raw: &str) -> Result<FixedOffset> {
    let raw = raw.trim();
    let invalid = || Error::Config(format!("invalid UTC offset '{raw}', expected e.g. +05:30"));

    if raw.eq_ignore_ascii_case("z") {
        return FixedOffset::east_opt(0).ok_or_else(invalid);
    }

    let (sign, rest) = match raw.as_bytes().first() {
        Some(b'+') => (1, &raw[1..]),
        Some(b'-') => (-1, &raw[1..]),
        _ => return Err(invalid()),
    };

    let (hours, minutes) = match rest.split_once(':') {
        Some((h, m)) => (h, m),
        None => (rest, "0"),
    };
    let hours: i32 = hours.parse().map_err(|_| invalid())?;
    let minutes: i32 = minutes.parse().map_err(|_| invalid())?;
    if !(0..24).contains(&hours) || !(0..60).contains(&minutes) {
        return Err(invalid());
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60)).ok_or_else(invalid)
}
