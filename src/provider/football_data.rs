// football-data.org (v4) match shape
use serde::Deserialize;
use serde_json::{json, Value};

use super::lenient;
use super::{composite_key, CrestTemplate, ProviderAdapter, RawMatch};
use crate::model::{FixtureInfo, Goals, IdentityKey, LeagueInfo, NormalizedMatch, TeamInfo, Teams};
use crate::normalizer::{map_status, normalize_kickoff};

const CRESTS: CrestTemplate = CrestTemplate { host: "https://crests.football-data.org", ext: "png" };

pub struct FootballData;

impl ProviderAdapter for FootballData {
    fn name(&self) -> &'static str {
        "football-data.org"
    }

    fn credential_var(&self) -> &'static str {
        "FOOTBALL_DATA_API_KEY"
    }

    fn auth_header(&self) -> &'static str {
        "X-Auth-Token"
    }

    fn default_base_url(&self) -> &'static str {
        "https://api.football-data.org/v4"
    }

    fn matches_path(&self) -> &'static str {
        "/matches"
    }

    fn list_key(&self) -> &'static str {
        "matches"
    }

    fn supports_competition_filter(&self) -> bool {
        true
    }

    fn decode_record(&self, value: Value) -> Result<RawMatch, serde_json::Error> {
        FootballDataMatch::deserialize(value).map(RawMatch::FootballData)
    }

    fn empty_record(&self) -> RawMatch {
        RawMatch::FootballData(FootballDataMatch::default())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FootballDataMatch {
    #[serde(deserialize_with = "lenient::int")]
    pub id: Option<i64>,
    #[serde(deserialize_with = "lenient::text")]
    pub utc_date: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub status: Option<String>,
    #[serde(deserialize_with = "lenient::int")]
    pub minute: Option<i64>,
    #[serde(deserialize_with = "lenient::text")]
    pub venue: Option<String>,
    #[serde(deserialize_with = "lenient::object")]
    pub competition: Option<Competition>,
    #[serde(deserialize_with = "lenient::object")]
    pub area: Option<Area>,
    #[serde(deserialize_with = "lenient::object")]
    pub home_team: Option<Team>,
    #[serde(deserialize_with = "lenient::object")]
    pub away_team: Option<Team>,
    #[serde(deserialize_with = "lenient::object")]
    pub score: Option<Score>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Competition {
    #[serde(deserialize_with = "lenient::int")]
    pub id: Option<i64>,
    #[serde(deserialize_with = "lenient::text")]
    pub code: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub name: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub emblem: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Area {
    #[serde(deserialize_with = "lenient::text")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Team {
    #[serde(deserialize_with = "lenient::int")]
    pub id: Option<i64>,
    #[serde(deserialize_with = "lenient::text")]
    pub name: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub short_name: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub crest: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Score {
    #[serde(deserialize_with = "lenient::object")]
    pub full_time: Option<ScoreLine>,
}

/// v4 uses `home`/`away`; v2 payloads used `homeTeam`/`awayTeam`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ScoreLine {
    #[serde(alias = "homeTeam", deserialize_with = "lenient::int")]
    pub home: Option<i64>,
    #[serde(alias = "awayTeam", deserialize_with = "lenient::int")]
    pub away: Option<i64>,
}

impl FootballDataMatch {
    /// Provider id; `0` means no id.
    fn native_id(&self) -> Option<i64> {
        self.id.filter(|&id| id != 0)
    }

    pub fn identity_key(&self) -> IdentityKey {
        match self.native_id() {
            Some(id) => IdentityKey::Native(id),
            None => {
                let competition = self.competition.as_ref();
                let competition_ref = match competition.and_then(|c| c.id) {
                    Some(id) => json!(id),
                    None => json!(competition.and_then(|c| c.code.as_deref())),
                };
                composite_key([
                    competition_ref,
                    json!(self.home_team.as_ref().and_then(|t| t.id)),
                    json!(self.away_team.as_ref().and_then(|t| t.id)),
                    json!(self.kickoff()),
                ])
            }
        }
    }

    pub fn kickoff(&self) -> Option<&str> {
        self.utc_date.as_deref()
    }

    pub fn normalize(&self) -> NormalizedMatch {
        let competition = self.competition.as_ref();
        let competition_id = competition.and_then(|c| c.id);

        NormalizedMatch {
            fixture: FixtureInfo {
                id: self.native_id(),
                date: normalize_kickoff(self.kickoff()),
                venue: self.venue.clone(),
                status: map_status(self.status.as_deref(), None, self.minute),
            },
            league: LeagueInfo {
                id: competition_id,
                code: competition.and_then(|c| c.code.clone()),
                name: competition.and_then(|c| c.name.clone()).unwrap_or_default(),
                logo: CRESTS.resolve(competition.and_then(|c| c.emblem.as_deref()), competition_id),
                country: self
                    .area
                    .as_ref()
                    .and_then(|a| a.name.clone())
                    .unwrap_or_default(),
            },
            teams: Teams {
                home: team_info(self.home_team.as_ref(), "Home"),
                away: team_info(self.away_team.as_ref(), "Away"),
            },
            goals: self
                .score
                .as_ref()
                .and_then(|s| s.full_time.as_ref())
                .map(|line| Goals { home: line.home, away: line.away })
                .unwrap_or_default(),
        }
    }
}

fn team_info(team: Option<&Team>, fallback: &str) -> TeamInfo {
    let id = team.and_then(|t| t.id);
    TeamInfo {
        id,
        name: team
            .and_then(|t| t.name.clone().or_else(|| t.short_name.clone()))
            .unwrap_or_else(|| fallback.to_string()),
        logo: CRESTS.resolve(team.and_then(|t| t.crest.as_deref()), id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::StatusCode;

    fn decode(value: Value) -> FootballDataMatch {
        FootballDataMatch::deserialize(value).unwrap()
    }

    #[test]
    fn projects_v4_match() {
        let raw = decode(json!({
            "area": { "id": 2072, "name": "England" },
            "competition": { "id": 2021, "name": "Premier League", "code": "PL",
                             "emblem": "https://crests.football-data.org/PL.png" },
            "id": 497410,
            "utcDate": "2024-08-16T19:00:00Z",
            "status": "FINISHED",
            "venue": "Old Trafford",
            "homeTeam": { "id": 66, "name": "Manchester United FC", "shortName": "Man United",
                          "crest": "https://crests.football-data.org/66.png" },
            "awayTeam": { "id": 63, "shortName": "Fulham" },
            "score": { "winner": "HOME_TEAM", "fullTime": { "home": 1, "away": 0 } }
        }));

        let normalized = raw.normalize();
        assert_eq!(normalized.fixture.id, Some(497410));
        assert_eq!(normalized.fixture.date.as_deref(), Some("2024-08-16T19:00:00Z"));
        assert_eq!(normalized.fixture.venue.as_deref(), Some("Old Trafford"));
        assert_eq!(normalized.fixture.status.short, StatusCode::FullTime);
        assert_eq!(normalized.fixture.status.long, "Match Finished");
        assert_eq!(normalized.league.code.as_deref(), Some("PL"));
        assert_eq!(normalized.league.country, "England");
        assert_eq!(normalized.league.logo, "https://crests.football-data.org/PL.png");
        assert_eq!(normalized.teams.home.name, "Manchester United FC");
        assert_eq!(normalized.teams.away.name, "Fulham");
        assert_eq!(normalized.teams.away.logo, "https://crests.football-data.org/63.png");
        assert_eq!(normalized.goals, Goals { home: Some(1), away: Some(0) });
    }

    #[test]
    fn empty_record_degrades_to_defaults() {
        let normalized = decode(json!({ "status": "SCHEDULED" })).normalize();
        assert_eq!(normalized.league.name, "");
        assert_eq!(normalized.league.logo, "");
        assert_eq!(normalized.league.code, None);
        assert_eq!(normalized.teams.home.name, "Home");
        assert_eq!(normalized.teams.away.name, "Away");
        assert_eq!(normalized.teams.home.logo, "");
        assert_eq!(normalized.goals, Goals { home: None, away: None });
        assert_eq!(normalized.fixture.date, None);
        assert_eq!(normalized.fixture.status.short, StatusCode::NotStarted);
    }

    #[test]
    fn zero_id_is_written_as_null() {
        let raw = decode(json!({
            "id": 0,
            "utcDate": "2024-08-16T19:00:00Z",
            "competition": { "id": 2021 },
            "homeTeam": { "id": 66 },
            "awayTeam": { "id": 63 }
        }));
        assert!(matches!(raw.identity_key(), IdentityKey::Composite(_)));
        assert_eq!(raw.normalize().fixture.id, None);
    }

    #[test]
    fn legacy_score_keys_are_read() {
        let raw = decode(json!({
            "id": 1,
            "score": { "fullTime": { "homeTeam": 2, "awayTeam": 2 } }
        }));
        assert_eq!(raw.normalize().goals, Goals { home: Some(2), away: Some(2) });
    }

    #[test]
    fn composite_key_uses_competition_code_without_id() {
        let raw = decode(json!({
            "competition": { "code": "CL" },
            "homeTeam": { "id": 5 },
            "awayTeam": { "id": 6 },
            "utcDate": "2024-09-17T19:00:00Z"
        }));
        assert_eq!(
            raw.identity_key(),
            IdentityKey::Composite(r#"["CL",5,6,"2024-09-17T19:00:00Z"]"#.to_string())
        );
    }
}
