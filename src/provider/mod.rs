// Provider adapters: one per upstream JSON shape
pub mod api_football;
pub mod football_data;
pub mod lenient;

use crate::model::{DateQuery, IdentityKey, MalformedRecord, NormalizedMatch};
use crate::utils::DATE_FORMAT;
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

pub use api_football::{ApiFootball, ApiFootballFixture};
pub use football_data::{FootballData, FootballDataMatch};

/// Upstream selected by configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Provider {
    ApiFootball,
    FootballData,
}

impl Provider {
    pub fn adapter(self) -> &'static dyn ProviderAdapter {
        match self {
            Provider::ApiFootball => &ApiFootball,
            Provider::FootballData => &FootballData,
        }
    }
}

/// Everything that differs between upstream fixture APIs.
pub trait ProviderAdapter: Send + Sync {
    /// Label used in logs and in the output `source` field.
    fn name(&self) -> &'static str;
    fn credential_var(&self) -> &'static str;
    fn auth_header(&self) -> &'static str;
    fn default_base_url(&self) -> &'static str;
    fn matches_path(&self) -> &'static str;
    /// Key of the match array in the response body.
    fn list_key(&self) -> &'static str;
    fn supports_competition_filter(&self) -> bool;

    fn decode_record(&self, value: Value) -> Result<RawMatch, serde_json::Error>;
    /// Record used in place of one that could not be decoded at all.
    fn empty_record(&self) -> RawMatch;

    fn query_params(&self, query: &DateQuery, competitions: &[String]) -> Vec<(&'static str, String)> {
        let mut params = match query {
            DateQuery::Single(date) => vec![("date", date.format(DATE_FORMAT).to_string())],
            DateQuery::Range { from, to } => vec![
                ("dateFrom", from.format(DATE_FORMAT).to_string()),
                ("dateTo", to.format(DATE_FORMAT).to_string()),
            ],
        };
        if self.supports_competition_filter() && !competitions.is_empty() {
            params.push(("competitions", competitions.join(",")));
        }
        params
    }
}

/// A raw upstream record, tagged with the shape it came in.
#[derive(Debug, Clone)]
pub enum RawMatch {
    ApiFootball(ApiFootballFixture),
    FootballData(FootballDataMatch),
}

impl RawMatch {
    pub fn identity_key(&self) -> IdentityKey {
        match self {
            RawMatch::ApiFootball(raw) => raw.identity_key(),
            RawMatch::FootballData(raw) => raw.identity_key(),
        }
    }

    /// Kickoff exactly as the provider sent it.
    pub fn kickoff(&self) -> Option<&str> {
        match self {
            RawMatch::ApiFootball(raw) => raw.kickoff(),
            RawMatch::FootballData(raw) => raw.kickoff(),
        }
    }

    pub fn normalize(&self) -> NormalizedMatch {
        match self {
            RawMatch::ApiFootball(raw) => raw.normalize(),
            RawMatch::FootballData(raw) => raw.normalize(),
        }
    }
}

/// Builds crest URLs as `<host>/<id>.<ext>`.
#[derive(Debug, Clone, Copy)]
pub struct CrestTemplate {
    pub host: &'static str,
    pub ext: &'static str,
}

impl CrestTemplate {
    /// Provided URL when non-empty, otherwise synthesized from the id, otherwise `""`.
    pub fn resolve(&self, provided: Option<&str>, id: Option<i64>) -> String {
        match (provided.map(str::trim).filter(|url| !url.is_empty()), id) {
            (Some(url), _) => url.to_string(),
            (None, Some(id)) => format!("{}/{}.{}", self.host, id, self.ext),
            (None, None) => String::new(),
        }
    }
}

/// Decodes the provider list, keeping every element.
pub fn decode_records(adapter: &dyn ProviderAdapter, items: Vec<Value>) -> Vec<RawMatch> {
    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| match adapter.decode_record(item) {
            Ok(raw) => raw,
            Err(e) => {
                let malformed = MalformedRecord { index, reason: e.to_string() };
                warn!("{} ({}): keeping it with default fields", malformed, adapter.name());
                adapter.empty_record()
            }
        })
        .collect()
}

/// Compact JSON array used as a fallback identity.
pub(crate) fn composite_key(parts: [Value; 4]) -> IdentityKey {
    IdentityKey::Composite(Value::Array(parts.to_vec()).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    #[test]
    fn crest_prefers_provided_url() {
        let template = CrestTemplate { host: "https://crests.example", ext: "png" };
        assert_eq!(template.resolve(Some("https://cdn/x.svg"), Some(1)), "https://cdn/x.svg");
        assert_eq!(template.resolve(Some(" "), Some(57)), "https://crests.example/57.png");
        assert_eq!(template.resolve(None, None), "");
    }

    #[test]
    fn competition_filter_only_where_supported() {
        let competitions = vec!["PL".to_string(), "CL".to_string()];
        let range = DateQuery::Range { from: day(1), to: day(3) };

        let params = FootballData.query_params(&range, &competitions);
        assert_eq!(
            params,
            vec![
                ("dateFrom", "2024-05-01".to_string()),
                ("dateTo", "2024-05-03".to_string()),
                ("competitions", "PL,CL".to_string()),
            ]
        );

        let params = ApiFootball.query_params(&DateQuery::Single(day(2)), &competitions);
        assert_eq!(params, vec![("date", "2024-05-02".to_string())]);
    }

    #[test]
    fn non_object_elements_are_kept_as_defaults() {
        let records = decode_records(
            Provider::FootballData.adapter(),
            vec![json!({ "id": 1, "status": "FINISHED" }), json!("garbage"), json!(null)],
        );
        assert_eq!(records.len(), 3);
        let second = records[1].normalize();
        assert_eq!(second.fixture.id, None);
        assert_eq!(second.teams.home.name, "Home");
        assert_eq!(second.teams.away.name, "Away");
    }

    #[test]
    fn composite_key_is_deterministic() {
        let a = composite_key([json!(2021), json!(57), json!(65), json!("2024-05-01T12:00:00Z")]);
        let b = composite_key([json!(2021), json!(57), json!(65), json!("2024-05-01T12:00:00Z")]);
        assert_eq!(a, b);
        assert_eq!(
            a,
            IdentityKey::Composite(r#"[2021,57,65,"2024-05-01T12:00:00Z"]"#.to_string())
        );
    }
}
