// Core structs: NormalizedMatch, OutputBatch, DateQuery, error types
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

use crate::utils::{serialize_timestamp, DATE_FORMAT};

/// One fixture in the provider-agnostic shape the front-end reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedMatch {
    pub fixture: FixtureInfo,
    pub league: LeagueInfo,
    pub teams: Teams,
    pub goals: Goals,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixtureInfo {
    pub id: Option<i64>,
    pub date: Option<String>,
    pub venue: Option<String>,
    pub status: MatchStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchStatus {
    pub short: StatusCode,
    pub long: String,
    pub elapsed: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeagueInfo {
    pub id: Option<i64>,
    pub code: Option<String>,
    pub name: String,
    pub logo: String,
    pub country: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Teams {
    pub home: TeamInfo,
    pub away: TeamInfo,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamInfo {
    pub id: Option<i64>,
    pub name: String,
    pub logo: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Goals {
    pub home: Option<i64>,
    pub away: Option<i64>,
}

/// Short status code shown by the front-end. Unknown provider values are
/// carried through untouched in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum StatusCode {
    NotStarted,
    Live,
    HalfTime,
    FullTime,
    AfterExtraTime,
    Cancelled,
    Other(String),
}

impl StatusCode {
    pub fn as_str(&self) -> &str {
        match self {
            StatusCode::NotStarted => "NS",
            StatusCode::Live => "LIVE",
            StatusCode::HalfTime => "HT",
            StatusCode::FullTime => "FT",
            StatusCode::AfterExtraTime => "AET",
            StatusCode::Cancelled => "CANC",
            StatusCode::Other(raw) => raw,
        }
    }
}

impl From<String> for StatusCode {
    fn from(code: String) -> Self {
        match code.as_str() {
            "NS" => StatusCode::NotStarted,
            "LIVE" => StatusCode::Live,
            "HT" => StatusCode::HalfTime,
            "FT" => StatusCode::FullTime,
            "AET" => StatusCode::AfterExtraTime,
            "CANC" => StatusCode::Cancelled,
            _ => StatusCode::Other(code),
        }
    }
}

impl From<StatusCode> for String {
    fn from(code: StatusCode) -> Self {
        match code {
            StatusCode::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The document written to the output file once per run.
#[derive(Debug, Clone, Serialize)]
pub struct OutputBatch {
    #[serde(serialize_with = "serialize_timestamp")]
    pub generated_at: DateTime<Utc>,
    pub source: String,
    pub response: Vec<NormalizedMatch>,
}

impl OutputBatch {
    pub fn new(source: String, response: Vec<NormalizedMatch>) -> Self {
        Self { generated_at: Utc::now(), source, response }
    }
}

/// Value used to detect the same fixture across overlapping queries.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IdentityKey {
    Native(i64),
    /// Compact JSON array of (competition, home id, away id, kickoff).
    Composite(String),
}

/// Dates sent to the upstream API in a single request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DateQuery {
    Single(NaiveDate),
    Range { from: NaiveDate, to: NaiveDate },
}

impl fmt::Display for DateQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateQuery::Single(date) => write!(f, "{}", date.format(DATE_FORMAT)),
            DateQuery::Range { from, to } => {
                write!(f, "{}..{}", from.format(DATE_FORMAT), to.format(DATE_FORMAT))
            }
        }
    }
}

/// What to do when one of several requests fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Log the failed request and keep the others; fatal only if all fail.
    SkipFailed,
    /// Any failure ends the run.
    Abort,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("API key not found: set the {var} environment variable")]
    MissingCredential { var: &'static str },
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid date range: {from} is after {to}")]
    InvalidRange { from: NaiveDate, to: NaiveDate },
    #[error("no day offsets configured for the date window")]
    EmptyWindow,
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP {status} from {url}: {body}")]
    Transport { url: String, status: u16, body: String },
    #[error("request to {url} failed: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("unreadable JSON body from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("provider returned errors for {url}: {payload}")]
    Provider { url: String, payload: Value },
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

/// A raw record that could not be fully read. Never fatal: the record is
/// kept with default fields.
#[derive(Debug, Error)]
#[error("malformed record #{index}: {reason}")]
pub struct MalformedRecord {
    pub index: usize,
    pub reason: String,
}

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("failed to serialize output: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("all {attempted} requests failed, last error: {last}")]
    AllRequestsFailed { attempted: usize, last: FetchError },
    #[error(transparent)]
    Output(#[from] OutputError),
}
