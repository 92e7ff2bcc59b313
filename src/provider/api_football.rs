// api-football (v3.football.api-sports.io) fixture shape
use serde::Deserialize;
use serde_json::{json, Value};

use super::lenient;
use super::{composite_key, CrestTemplate, ProviderAdapter, RawMatch};
use crate::model::{
    DateQuery, FixtureInfo, Goals, IdentityKey, LeagueInfo, NormalizedMatch, TeamInfo, Teams,
};
use crate::normalizer::{map_status, normalize_kickoff};
use crate::utils::DATE_FORMAT;

const TEAM_CRESTS: CrestTemplate =
    CrestTemplate { host: "https://media.api-sports.io/football/teams", ext: "png" };
const LEAGUE_CRESTS: CrestTemplate =
    CrestTemplate { host: "https://media.api-sports.io/football/leagues", ext: "png" };

pub struct ApiFootball;

impl ProviderAdapter for ApiFootball {
    fn name(&self) -> &'static str {
        "api-football"
    }

    fn credential_var(&self) -> &'static str {
        "API_FOOTBALL_KEY"
    }

    fn auth_header(&self) -> &'static str {
        "x-apisports-key"
    }

    fn default_base_url(&self) -> &'static str {
        "https://v3.football.api-sports.io"
    }

    fn matches_path(&self) -> &'static str {
        "/fixtures"
    }

    fn list_key(&self) -> &'static str {
        "response"
    }

    fn supports_competition_filter(&self) -> bool {
        false
    }

    fn decode_record(&self, value: Value) -> Result<RawMatch, serde_json::Error> {
        ApiFootballFixture::deserialize(value).map(RawMatch::ApiFootball)
    }

    fn empty_record(&self) -> RawMatch {
        RawMatch::ApiFootball(ApiFootballFixture::default())
    }

    // The fixtures endpoint names its range parameters `from`/`to`.
    fn query_params(&self, query: &DateQuery, _competitions: &[String]) -> Vec<(&'static str, String)> {
        match query {
            DateQuery::Single(date) => vec![("date", date.format(DATE_FORMAT).to_string())],
            DateQuery::Range { from, to } => vec![
                ("from", from.format(DATE_FORMAT).to_string()),
                ("to", to.format(DATE_FORMAT).to_string()),
            ],
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ApiFootballFixture {
    #[serde(deserialize_with = "lenient::object")]
    pub fixture: Option<FixtureBlock>,
    #[serde(deserialize_with = "lenient::object")]
    pub league: Option<LeagueBlock>,
    #[serde(deserialize_with = "lenient::object")]
    pub teams: Option<TeamsBlock>,
    #[serde(deserialize_with = "lenient::object")]
    pub goals: Option<GoalsBlock>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FixtureBlock {
    #[serde(deserialize_with = "lenient::int")]
    pub id: Option<i64>,
    #[serde(deserialize_with = "lenient::text")]
    pub date: Option<String>,
    #[serde(deserialize_with = "lenient::object")]
    pub venue: Option<VenueBlock>,
    #[serde(deserialize_with = "lenient::object")]
    pub status: Option<StatusBlock>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct VenueBlock {
    #[serde(deserialize_with = "lenient::text")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StatusBlock {
    #[serde(deserialize_with = "lenient::text")]
    pub short: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub long: Option<String>,
    #[serde(deserialize_with = "lenient::int")]
    pub elapsed: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LeagueBlock {
    #[serde(deserialize_with = "lenient::int")]
    pub id: Option<i64>,
    #[serde(deserialize_with = "lenient::text")]
    pub name: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub logo: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub country: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TeamsBlock {
    #[serde(deserialize_with = "lenient::object")]
    pub home: Option<TeamBlock>,
    #[serde(deserialize_with = "lenient::object")]
    pub away: Option<TeamBlock>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TeamBlock {
    #[serde(deserialize_with = "lenient::int")]
    pub id: Option<i64>,
    #[serde(deserialize_with = "lenient::text")]
    pub name: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub logo: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GoalsBlock {
    #[serde(deserialize_with = "lenient::int")]
    pub home: Option<i64>,
    #[serde(deserialize_with = "lenient::int")]
    pub away: Option<i64>,
}

impl ApiFootballFixture {
    fn home(&self) -> Option<&TeamBlock> {
        self.teams.as_ref().and_then(|t| t.home.as_ref())
    }

    fn away(&self) -> Option<&TeamBlock> {
        self.teams.as_ref().and_then(|t| t.away.as_ref())
    }

    /// Provider id; `0` means no id.
    fn native_id(&self) -> Option<i64> {
        self.fixture.as_ref().and_then(|f| f.id).filter(|&id| id != 0)
    }

    pub fn identity_key(&self) -> IdentityKey {
        match self.native_id() {
            Some(id) => IdentityKey::Native(id),
            None => composite_key([
                json!(self.league.as_ref().and_then(|l| l.id)),
                json!(self.home().and_then(|t| t.id)),
                json!(self.away().and_then(|t| t.id)),
                json!(self.kickoff()),
            ]),
        }
    }

    pub fn kickoff(&self) -> Option<&str> {
        self.fixture.as_ref().and_then(|f| f.date.as_deref())
    }

    pub fn normalize(&self) -> NormalizedMatch {
        let fixture = self.fixture.as_ref();
        let status = fixture.and_then(|f| f.status.as_ref());
        let league = self.league.as_ref();
        let league_id = league.and_then(|l| l.id);

        NormalizedMatch {
            fixture: FixtureInfo {
                id: self.native_id(),
                date: normalize_kickoff(self.kickoff()),
                venue: fixture
                    .and_then(|f| f.venue.as_ref())
                    .and_then(|v| v.name.clone()),
                status: map_status(
                    status.and_then(|s| s.short.as_deref()),
                    status.and_then(|s| s.long.as_deref()),
                    status.and_then(|s| s.elapsed),
                ),
            },
            league: LeagueInfo {
                id: league_id,
                code: None,
                name: league.and_then(|l| l.name.clone()).unwrap_or_default(),
                logo: LEAGUE_CRESTS.resolve(league.and_then(|l| l.logo.as_deref()), league_id),
                country: league.and_then(|l| l.country.clone()).unwrap_or_default(),
            },
            teams: Teams {
                home: team_info(self.home(), "Home"),
                away: team_info(self.away(), "Away"),
            },
            goals: self
                .goals
                .as_ref()
                .map(|g| Goals { home: g.home, away: g.away })
                .unwrap_or_default(),
        }
    }
}

fn team_info(team: Option<&TeamBlock>, fallback: &str) -> TeamInfo {
    let id = team.and_then(|t| t.id);
    TeamInfo {
        id,
        name: team
            .and_then(|t| t.name.clone())
            .unwrap_or_else(|| fallback.to_string()),
        logo: TEAM_CRESTS.resolve(team.and_then(|t| t.logo.as_deref()), id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::StatusCode;
    use serde_json::json;

    fn decode(value: Value) -> ApiFootballFixture {
        ApiFootballFixture::deserialize(value).unwrap()
    }

    #[test]
    fn projects_full_fixture() {
        let raw = decode(json!({
            "fixture": {
                "id": 1035046,
                "date": "2024-08-17T14:00:00+00:00",
                "venue": { "id": 556, "name": "Old Trafford", "city": "Manchester" },
                "status": { "long": "Match Finished", "short": "FT", "elapsed": 90 }
            },
            "league": { "id": 39, "name": "Premier League", "country": "England",
                        "logo": "https://media.api-sports.io/football/leagues/39.png" },
            "teams": {
                "home": { "id": 33, "name": "Manchester United", "logo": null },
                "away": { "id": 36, "name": "Fulham" }
            },
            "goals": { "home": 1, "away": 0 }
        }));

        let normalized = raw.normalize();
        assert_eq!(normalized.fixture.id, Some(1035046));
        assert_eq!(normalized.fixture.date.as_deref(), Some("2024-08-17T14:00:00Z"));
        assert_eq!(normalized.fixture.venue.as_deref(), Some("Old Trafford"));
        assert_eq!(normalized.fixture.status.short, StatusCode::FullTime);
        assert_eq!(normalized.fixture.status.long, "Match Finished");
        assert_eq!(normalized.fixture.status.elapsed, Some(90));
        assert_eq!(normalized.league.code, None);
        assert_eq!(normalized.league.country, "England");
        assert_eq!(
            normalized.teams.home.logo,
            "https://media.api-sports.io/football/teams/33.png"
        );
        assert_eq!(normalized.teams.away.name, "Fulham");
        assert_eq!(normalized.goals, Goals { home: Some(1), away: Some(0) });
        assert_eq!(raw.identity_key(), IdentityKey::Native(1035046));
    }

    #[test]
    fn provider_codes_pass_through() {
        let raw = decode(json!({
            "fixture": { "id": 7, "status": { "short": "1H", "long": "First Half", "elapsed": 23 } }
        }));
        let status = raw.normalize().fixture.status;
        assert_eq!(status.short, StatusCode::Other("1H".to_string()));
        assert_eq!(status.long, "First Half");
        assert_eq!(status.elapsed, Some(23));
    }

    #[test]
    fn zero_id_falls_back_to_composite_key() {
        let raw = decode(json!({
            "fixture": { "id": 0, "date": "2024-08-17T14:00:00+00:00" },
            "league": { "id": 39 },
            "teams": { "home": { "id": 33 }, "away": { "id": 36 } }
        }));
        assert_eq!(
            raw.identity_key(),
            IdentityKey::Composite(r#"[39,33,36,"2024-08-17T14:00:00+00:00"]"#.to_string())
        );
        assert_eq!(raw.normalize().fixture.id, None);
    }

    #[test]
    fn range_uses_from_and_to() {
        let from = chrono::NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let to = chrono::NaiveDate::from_ymd_opt(2024, 5, 3).unwrap();
        let params = ApiFootball.query_params(&DateQuery::Range { from, to }, &["PL".to_string()]);
        assert_eq!(params, vec![("from", "2024-05-01".to_string()), ("to", "2024-05-03".to_string())]);
    }
}
