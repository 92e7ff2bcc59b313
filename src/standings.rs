// League table for one football-data.org competition
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::fetcher::http::{HttpFetcher, JsonResponse};
use crate::model::FetchError;
use crate::provider::lenient;
use crate::utils::serialize_timestamp;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct StandingsResponse {
    #[serde(deserialize_with = "lenient::object")]
    pub competition: Option<CompetitionInfo>,
    #[serde(deserialize_with = "lenient::list")]
    pub standings: Vec<StandingGroup>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CompetitionInfo {
    #[serde(deserialize_with = "lenient::text")]
    pub name: Option<String>,
    #[serde(deserialize_with = "lenient::object")]
    pub area: Option<AreaInfo>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AreaInfo {
    #[serde(deserialize_with = "lenient::text")]
    pub name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct StandingGroup {
    /// TOTAL, HOME or AWAY.
    #[serde(rename = "type", deserialize_with = "lenient::text")]
    pub kind: Option<String>,
    #[serde(deserialize_with = "lenient::list")]
    pub table: Vec<TableRow>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TableRow {
    #[serde(deserialize_with = "lenient::int")]
    pub position: Option<i64>,
    #[serde(deserialize_with = "lenient::object")]
    pub team: Option<TeamRef>,
    #[serde(deserialize_with = "lenient::int")]
    pub played_games: Option<i64>,
    #[serde(deserialize_with = "lenient::int")]
    pub won: Option<i64>,
    #[serde(deserialize_with = "lenient::int")]
    pub draw: Option<i64>,
    #[serde(deserialize_with = "lenient::int")]
    pub lost: Option<i64>,
    #[serde(deserialize_with = "lenient::int")]
    pub points: Option<i64>,
    #[serde(deserialize_with = "lenient::int")]
    pub goals_for: Option<i64>,
    #[serde(deserialize_with = "lenient::int")]
    pub goals_against: Option<i64>,
    #[serde(deserialize_with = "lenient::int")]
    pub goal_difference: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TeamRef {
    #[serde(deserialize_with = "lenient::int")]
    pub id: Option<i64>,
    #[serde(deserialize_with = "lenient::text")]
    pub name: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub crest: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StandingRow {
    pub position: Option<i64>,
    pub team_id: Option<i64>,
    pub team_name: Option<String>,
    pub team_crest: Option<String>,
    pub played_games: Option<i64>,
    pub won: Option<i64>,
    pub draw: Option<i64>,
    pub lost: Option<i64>,
    pub points: Option<i64>,
    pub goals_for: Option<i64>,
    pub goals_against: Option<i64>,
    pub goal_difference: Option<i64>,
}

/// Document written by the `standings` command.
#[derive(Debug, Clone, Serialize)]
pub struct StandingsBatch {
    #[serde(serialize_with = "serialize_timestamp")]
    pub generated_at: DateTime<Utc>,
    pub source: String,
    pub competition_name: Option<String>,
    pub competition_area: Option<String>,
    pub standings: Vec<StandingRow>,
}

impl StandingsResponse {
    /// Rows of the overall (`TOTAL`) table; empty when there is none.
    pub fn total_table(&self) -> Vec<StandingRow> {
        self.standings
            .iter()
            .find(|group| group.kind.as_deref() == Some("TOTAL"))
            .map(|group| group.table.iter().map(StandingRow::from).collect())
            .unwrap_or_default()
    }

    pub fn into_batch(self, source: String) -> StandingsBatch {
        let standings = self.total_table();
        let competition = self.competition;
        StandingsBatch {
            generated_at: Utc::now(),
            source,
            competition_area: competition
                .as_ref()
                .and_then(|c| c.area.as_ref())
                .and_then(|a| a.name.clone()),
            competition_name: competition.and_then(|c| c.name),
            standings,
        }
    }
}

impl From<&TableRow> for StandingRow {
    fn from(row: &TableRow) -> Self {
        let team = row.team.as_ref();
        Self {
            position: row.position,
            team_id: team.and_then(|t| t.id),
            team_name: team.and_then(|t| t.name.clone()),
            team_crest: team.and_then(|t| t.crest.clone()),
            played_games: row.played_games,
            won: row.won,
            draw: row.draw,
            lost: row.lost,
            points: row.points,
            goals_for: row.goals_for,
            goals_against: row.goals_against,
            goal_difference: row.goal_difference,
        }
    }
}

/// GET `/competitions/{id}/standings` and decode the table groups.
pub async fn fetch_standings(
    fetcher: &HttpFetcher,
    competition_id: u32,
) -> Result<StandingsResponse, FetchError> {
    info!("🔄 Fetching standings for competition {}...", competition_id);
    let path = format!("/competitions/{}/standings", competition_id);
    let JsonResponse { url, body } = fetcher.get_json(&path, &[]).await?;

    let response: StandingsResponse =
        serde_json::from_value(body).map_err(|source| FetchError::Decode { url, source })?;
    info!("✅ Fetched {} teams standings.", response.total_table().len());
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> StandingsResponse {
        serde_json::from_value(json!({
            "competition": { "id": 2014, "name": "Primera Division", "area": { "name": "Spain" } },
            "standings": [
                { "type": "HOME", "table": [{ "position": 1, "team": { "id": 1, "name": "Wrong" } }] },
                { "type": "TOTAL", "table": [
                    { "position": 1, "team": { "id": 86, "name": "Real Madrid CF",
                      "crest": "https://crests.football-data.org/86.png" },
                      "playedGames": 38, "won": 29, "draw": 8, "lost": 1, "points": 95,
                      "goalsFor": 87, "goalsAgainst": 26, "goalDifference": 61 },
                    { "position": 2, "team": null, "points": "85" }
                ]}
            ]
        }))
        .unwrap()
    }

    #[test]
    fn picks_total_table() {
        let rows = sample().total_table();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].team_name.as_deref(), Some("Real Madrid CF"));
        assert_eq!(rows[0].goal_difference, Some(61));
        assert_eq!(rows[1].team_id, None);
        assert_eq!(rows[1].points, Some(85));
    }

    #[test]
    fn batch_keeps_competition_details() {
        let batch = sample().into_batch("football-data.org".into());
        assert_eq!(batch.competition_name.as_deref(), Some("Primera Division"));
        assert_eq!(batch.competition_area.as_deref(), Some("Spain"));

        let value = serde_json::to_value(&batch).unwrap();
        assert_eq!(value["standings"][1]["team_crest"], serde_json::Value::Null);
        assert_eq!(value["source"], "football-data.org");
    }

    #[test]
    fn no_total_table_yields_empty_rows() {
        let response: StandingsResponse =
            serde_json::from_value(json!({ "standings": "unexpected" })).unwrap();
        assert!(response.total_table().is_empty());
        assert!(response.into_batch("x".into()).competition_name.is_none());
    }
}
