use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use chrono_tz::Tz;
use common::{DEFAULT_CHART_WINDOW, DEFAULT_LATEST_API_URL};

use crate::history::HistoryPolicy;

const DEFAULT_REFRESH_MS: u64 = 2500;
const DEFAULT_CLOCK_MS: u64 = 1000;
const DEFAULT_FRAME_MS: u64 = 100;
const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 8000;
const DEFAULT_HISTORY_GUARD_SECS: u64 = 60;
const DEFAULT_HISTORY_LIMIT: usize = 6;
const DEFAULT_TIMEZONE: &str = "Asia/Bangkok";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub api_url: String,
    pub refresh_interval: Duration,
    pub clock_interval: Duration,
    pub frame_interval: Duration,
    pub request_timeout: Duration,
    pub chart_window: usize,
    pub history: HistoryPolicy,
    pub timezone: Tz,
    pub chart_output: Option<PathBuf>,
    pub chart_font_path: Option<PathBuf>,
}

impl Config {
    /// Reads the process environment, after merging `.env` when present.
    pub fn from_env() -> Result<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            log::debug!("Loaded environment from {}", path.display());
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let timezone_name = get("DISPLAY_TIMEZONE").unwrap_or_else(|| DEFAULT_TIMEZONE.to_string());
        let timezone = timezone_name
            .trim()
            .parse::<Tz>()
            .map_err(|e| anyhow!("Invalid DISPLAY_TIMEZONE '{timezone_name}': {e}"))?;

        let chart_window = parse_or(&get, "CHART_WINDOW", DEFAULT_CHART_WINDOW)?;
        if chart_window == 0 {
            bail!("CHART_WINDOW must be at least 1");
        }
        let history_limit = parse_or(&get, "HISTORY_LIMIT", DEFAULT_HISTORY_LIMIT)?;
        if history_limit == 0 {
            bail!("HISTORY_LIMIT must be at least 1");
        }

        Ok(Config {
            api_url: get("LATEST_API_URL").unwrap_or_else(|| DEFAULT_LATEST_API_URL.to_string()),
            refresh_interval: millis_or(&get, "REFRESH_INTERVAL_MS", DEFAULT_REFRESH_MS)?,
            clock_interval: millis_or(&get, "CLOCK_INTERVAL_MS", DEFAULT_CLOCK_MS)?,
            frame_interval: millis_or(&get, "FRAME_INTERVAL_MS", DEFAULT_FRAME_MS)?,
            request_timeout: millis_or(&get, "REQUEST_TIMEOUT_MS", DEFAULT_REQUEST_TIMEOUT_MS)?,
            chart_window,
            history: HistoryPolicy {
                guard: Duration::from_secs(parse_or(
                    &get,
                    "HISTORY_GUARD_SECS",
                    DEFAULT_HISTORY_GUARD_SECS,
                )?),
                limit: history_limit,
                hourly_only: flag_or(&get, "HISTORY_HOURLY_ONLY", true)?,
                timezone,
            },
            timezone,
            chart_output: get("CHART_OUTPUT").map(PathBuf::from),
            chart_font_path: get("CHART_FONT_PATH").map(PathBuf::from),
        })
    }
}

fn parse_or<G, T>(get: &G, key: &str, default: T) -> Result<T>
where
    G: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match get(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Invalid {key}: '{raw}'")),
        None => Ok(default),
    }
}

fn millis_or<G>(get: &G, key: &str, default: u64) -> Result<Duration>
where
    G: Fn(&str) -> Option<String>,
{
    let millis: u64 = parse_or(get, key, default)?;
    if millis == 0 {
        bail!("{key} must be greater than 0");
    }
    Ok(Duration::from_millis(millis))
}

fn flag_or<G>(get: &G, key: &str, default: bool) -> Result<bool>
where
    G: Fn(&str) -> Option<String>,
{
    match get(key).map(|v| v.trim().to_lowercase()) {
        None => Ok(default),
        Some(v) => match v.as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => bail!("Invalid {key}: '{v}', expected true or false"),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();

        assert_eq!(config.api_url, "http://127.0.0.1:5001/api/latest");
        assert_eq!(config.refresh_interval, Duration::from_millis(2500));
        assert_eq!(config.clock_interval, Duration::from_secs(1));
        assert_eq!(config.chart_window, 6);
        assert_eq!(config.history.guard, Duration::from_secs(60));
        assert_eq!(config.history.limit, 6);
        assert!(config.history.hourly_only);
        assert_eq!(config.timezone, chrono_tz::Asia::Bangkok);
        assert_eq!(config.chart_output, None);
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("LATEST_API_URL", "http://gold.local/api/latest"),
            ("REFRESH_INTERVAL_MS", "10000"),
            ("CHART_WINDOW", "8"),
            ("HISTORY_GUARD_SECS", "120"),
            ("HISTORY_HOURLY_ONLY", "no"),
            ("DISPLAY_TIMEZONE", "Europe/London"),
            ("CHART_OUTPUT", "/tmp/live.png"),
            ("CHART_FONT_PATH", "  "),
        ])
        .unwrap();

        assert_eq!(config.api_url, "http://gold.local/api/latest");
        assert_eq!(config.refresh_interval, Duration::from_secs(10));
        assert_eq!(config.chart_window, 8);
        assert_eq!(config.history.guard, Duration::from_secs(120));
        assert!(!config.history.hourly_only);
        assert_eq!(config.history.timezone, chrono_tz::Europe::London);
        assert_eq!(config.chart_output, Some(PathBuf::from("/tmp/live.png")));
        assert_eq!(config.chart_font_path, None);
    }

    #[test]
    fn test_invalid_values() {
        let error = config_from(&[("REFRESH_INTERVAL_MS", "fast")]).unwrap_err();
        assert!(error.to_string().contains("REFRESH_INTERVAL_MS"));

        assert!(config_from(&[("REFRESH_INTERVAL_MS", "0")]).is_err());
        assert!(config_from(&[("CHART_WINDOW", "0")]).is_err());
        assert!(config_from(&[("HISTORY_HOURLY_ONLY", "maybe")]).is_err());
        assert!(config_from(&[("DISPLAY_TIMEZONE", "Mars/Olympus")]).is_err());
    }
}
