//! Batch settings: what to download, where to, and how the client behaves.
//!
//! Settings come from defaults, optionally overlaid by a TOML file named in
//! `HKEX_REPORTS_CONFIG`, and finally by individual environment variables.
//!
//! ```toml
//! output_dir = "out"
//! tickers = [1, 5, 700]
//! error_policy = "continue"
//! match_policy = "exact_code"
//!
//! [window]
//! kind = "fixed"
//! from = "2023-01-01"
//! to = "2023-12-31"
//!
//! [client]
//! user_agent = "reports-bot/1.0 (ops@example.com)"
//! rate_limit = 2
//!
//! [[categories]]
//! name = "Annual Report"
//! t2code = 40100
//! ```

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::config::{HkexConfig, HkexUrls};
use super::error::{HkexError, Result};
use super::options::{DateWindow, ErrorPolicy, MatchPolicy};
use super::query::CategoryTable;

pub const CONFIG_PATH_VAR: &str = "HKEX_REPORTS_CONFIG";
pub const OUTPUT_DIR_VAR: &str = "HKEX_OUTPUT_DIR";
pub const USER_AGENT_VAR: &str = "HKEX_USER_AGENT";
pub const TIMEOUT_VAR: &str = "HKEX_TIMEOUT_SECS";
pub const RATE_LIMIT_VAR: &str = "HKEX_RATE_LIMIT";

/// Stock codes tracked by default (Hang Seng Index constituents).
pub const DEFAULT_TICKERS: &[u32] = &[
    1, 2, 3, 5, 6, 11, 12, 16, 17, 27, 66, 101, 175, 241, 267, 288, 291, 316, 322, 386, 388, 669,
    688, 700, 762, 823, 836, 857, 868, 881, 883, 939, 941, 960, 968, 981, 992, 1038, 1044, 1088,
    1093, 1099, 1109, 1113, 1177, 1209, 1211, 1299, 1378, 1398, 1810, 1876, 1928, 1929, 1997,
    2015, 2020, 2269, 2313, 2318, 2319, 2331, 2359, 2382, 2388, 2628, 2688, 2899, 3690, 3692, 3968,
    3988, 6098, 6618, 6690, 6862, 9618, 9633, 9888, 9961, 9988, 9999,
];

/// Everything one batch run needs besides the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Root of the output tree
    pub output_dir: PathBuf,
    /// Exchange codes to process, in order
    pub tickers: Vec<u32>,
    /// Report categories to search for each ticker, in order
    pub categories: CategoryTable,
    pub window: DateWindow,
    pub error_policy: ErrorPolicy,
    pub match_policy: MatchPolicy,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("out"),
            tickers: DEFAULT_TICKERS.to_vec(),
            categories: CategoryTable::default(),
            window: DateWindow::default(),
            error_policy: ErrorPolicy::default(),
            match_policy: MatchPolicy::default(),
        }
    }
}

impl RunConfig {
    /// Checks the batch definition before any request is made.
    pub fn validate(&self) -> Result<()> {
        if self.tickers.is_empty() {
            return Err(HkexError::ConfigError("No tickers configured".to_string()));
        }
        if self.tickers.contains(&0) {
            return Err(HkexError::ConfigError(
                "Ticker codes must be positive".to_string(),
            ));
        }
        if self.categories.is_empty() {
            return Err(HkexError::ConfigError(
                "No report categories configured".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for category in self.categories.iter() {
            if category.name.trim().is_empty() {
                return Err(HkexError::ConfigError(
                    "Report category with empty name".to_string(),
                ));
            }
            if !seen.insert(category.name.as_str()) {
                return Err(HkexError::ConfigError(format!(
                    "Duplicate report category: {}",
                    category.name
                )));
            }
        }

        // Only the shape of the window matters here; the run date is supplied later.
        self.window.resolve(chrono::NaiveDate::MAX)?;
        Ok(())
    }
}

/// Client knobs as they appear in the settings file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientSettings {
    pub user_agent: String,
    pub rate_limit: u32,
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
    /// Alternative portal origin, e.g. a local mirror
    pub base_url: Option<String>,
}

impl Default for ClientSettings {
    fn default() -> Self {
        let defaults = HkexConfig::default();
        Self {
            user_agent: defaults.user_agent,
            rate_limit: defaults.rate_limit,
            timeout_secs: defaults.timeout.as_secs(),
            connect_timeout_secs: defaults.connect_timeout.as_secs(),
            base_url: None,
        }
    }
}

impl ClientSettings {
    pub fn to_config(&self) -> HkexConfig {
        HkexConfig {
            user_agent: self.user_agent.clone(),
            rate_limit: self.rate_limit,
            timeout: Duration::from_secs(self.timeout_secs),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            base_urls: self
                .base_url
                .as_deref()
                .map(HkexUrls::with_base)
                .unwrap_or_default(),
        }
    }
}

/// Root of the settings file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub client: ClientSettings,
    #[serde(flatten)]
    pub run: RunConfig,
}

impl Settings {
    /// Loads settings from a TOML file; absent keys keep their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            HkexError::ConfigError(format!("Cannot read {}: {}", path.display(), e))
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Loads settings the way the binary does: file named by
    /// `HKEX_REPORTS_CONFIG` if set, then environment overrides.
    pub fn from_env() -> Result<Self> {
        let mut settings = match std::env::var(CONFIG_PATH_VAR) {
            Ok(path) => {
                tracing::info!(%path, "loading settings file");
                Self::load(path)?
            }
            Err(_) => Self::default(),
        };
        settings.apply_overrides(|name| std::env::var(name).ok())?;
        Ok(settings)
    }

    /// Applies `HKEX_*` overrides looked up through `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup(OUTPUT_DIR_VAR) {
            self.run.output_dir = PathBuf::from(dir);
        }
        if let Some(agent) = lookup(USER_AGENT_VAR) {
            self.client.user_agent = agent;
        }
        if let Some(timeout) = parse_override(&lookup, TIMEOUT_VAR)? {
            self.client.timeout_secs = timeout;
        }
        if let Some(rate) = parse_override(&lookup, RATE_LIMIT_VAR)? {
            self.client.rate_limit = rate;
        }
        Ok(())
    }
}

fn parse_override<F, T>(lookup: &F, name: &str) -> Result<Option<T>>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name) {
        Some(raw) => raw.trim().parse().map(Some).map_err(|e| {
            HkexError::ConfigError(format!("Invalid value for {} = '{}': {}", name, raw, e))
        }),
        None => Ok(None),
    }
}
