use chrono::{Duration, NaiveDate};
use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::model::{ConfigError, DateQuery, FailurePolicy};
use crate::provider::{Provider, ProviderAdapter};
use crate::utils::{join_dates, DATE_FORMAT};

/// Config file picked up from the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "fixture-feed.json";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StandingsConfig {
    /// football-data.org competition id (2014 is La Liga).
    pub competition_id: u32,
    pub output: PathBuf,
}

impl Default for StandingsConfig {
    fn default() -> Self {
        Self {
            competition_id: 2014,
            output: PathBuf::from("football_standings.json"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub provider: Provider,
    /// Overrides the provider's API root, e.g. for a proxy.
    pub base_url: Option<String>,
    pub competitions: Vec<String>,
    pub window_offsets: Vec<i64>,
    pub output: PathBuf,
    /// Overrides the generated provenance label.
    pub source: Option<String>,
    pub user_agent: String,
    pub standings: StandingsConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            provider: Provider::ApiFootball,
            base_url: None,
            competitions: ["PL", "PD", "SA", "BL1", "FL1", "CL", "EC", "WC"]
                .iter()
                .map(|c| c.to_string())
                .collect(),
            window_offsets: vec![-1, 0, 1],
            output: PathBuf::from("matches.json"),
            source: None,
            user_agent: format!("fixture-feed/{}", env!("CARGO_PKG_VERSION")),
            standings: StandingsConfig::default(),
        }
    }
}

pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Explicit path must exist; otherwise the default file is used when present.
pub fn load_config_or_default(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    match path {
        Some(path) => load_config(path),
        None if Path::new(DEFAULT_CONFIG_FILE).exists() => load_config(Path::new(DEFAULT_CONFIG_FILE)),
        None => Ok(AppConfig::default()),
    }
}

/// Static API credential. Never printed.
#[derive(Clone)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

/// Reads the provider credential through `lookup` (the environment in
/// production). Missing and blank values are both rejected.
pub fn resolve_api_key<F>(adapter: &dyn ProviderAdapter, lookup: F) -> Result<ApiKey, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let var = adapter.credential_var();
    match lookup(var) {
        Some(key) if !key.trim().is_empty() => Ok(ApiKey::new(key.trim())),
        _ => Err(ConfigError::MissingCredential { var }),
    }
}

/// Which dates to request in one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryPlan {
    /// One request per `today + offset` day.
    Window(Vec<i64>),
    /// One `dateFrom`/`dateTo` request.
    Range { from: NaiveDate, to: NaiveDate },
    /// One `date` request.
    Date(NaiveDate),
}

impl QueryPlan {
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self {
            QueryPlan::Window(offsets) if offsets.is_empty() => Err(ConfigError::EmptyWindow),
            QueryPlan::Range { from, to } if from > to => {
                Err(ConfigError::InvalidRange { from: *from, to: *to })
            }
            _ => Ok(()),
        }
    }

    pub fn queries(&self, today: NaiveDate) -> Vec<DateQuery> {
        match self {
            QueryPlan::Window(_) => self.window_dates(today).into_iter().map(DateQuery::Single).collect(),
            QueryPlan::Range { from, to } if from == to => vec![DateQuery::Single(*from)],
            QueryPlan::Range { from, to } => vec![DateQuery::Range { from: *from, to: *to }],
            QueryPlan::Date(date) => vec![DateQuery::Single(*date)],
        }
    }

    pub fn failure_policy(&self) -> FailurePolicy {
        match self {
            QueryPlan::Window(_) => FailurePolicy::SkipFailed,
            _ => FailurePolicy::Abort,
        }
    }

    /// Provenance label such as `api-football (dates: 2024-05-01,2024-05-02)`.
    pub fn describe(&self, provider_name: &str, today: NaiveDate) -> String {
        match self {
            QueryPlan::Window(_) => {
                format!("{} (dates: {})", provider_name, join_dates(&self.window_dates(today)))
            }
            QueryPlan::Range { from, to } => format!(
                "{} (dateFrom: {}, dateTo: {})",
                provider_name,
                from.format(DATE_FORMAT),
                to.format(DATE_FORMAT)
            ),
            QueryPlan::Date(date) => format!("{} (date: {})", provider_name, date.format(DATE_FORMAT)),
        }
    }

    fn window_dates(&self, today: NaiveDate) -> Vec<NaiveDate> {
        match self {
            QueryPlan::Window(offsets) => offsets
                .iter()
                .filter_map(|offset| today.checked_add_signed(Duration::days(*offset)))
                .collect(),
            _ => Vec::new(),
        }
    }
}
