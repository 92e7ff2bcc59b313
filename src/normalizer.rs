use crate::model::{IdentityKey, MalformedRecord, MatchStatus, NormalizedMatch, StatusCode};
use crate::provider::RawMatch;
use crate::utils::parse_datetime;
use chrono::SecondsFormat;
use std::collections::HashMap;
use tracing::{debug, warn};

/// Merges raw lists, drops duplicates, sorts by kickoff and projects every
/// record into the output schema.
pub fn aggregate(batches: Vec<Vec<RawMatch>>) -> Vec<NormalizedMatch> {
    let merged: Vec<RawMatch> = batches.into_iter().flatten().collect();
    let total = merged.len();

    let mut unique = dedupe(merged);
    debug!("Deduplicated {} raw records into {}", total, unique.len());

    sort_by_kickoff(&mut unique);
    normalize_all(&unique)
}

/// Keeps one record per identity key. A recurring key overwrites the earlier
/// record in place, so the last occurrence wins but keeps the first slot.
pub fn dedupe(records: Vec<RawMatch>) -> Vec<RawMatch> {
    let mut slots: HashMap<IdentityKey, usize> = HashMap::new();
    let mut unique: Vec<RawMatch> = Vec::with_capacity(records.len());

    for record in records {
        let key = record.identity_key();
        match slots.get(&key) {
            Some(&slot) => {
                debug!("Duplicate fixture {:?}, keeping the later record", key);
                unique[slot] = record;
            }
            None => {
                slots.insert(key, unique.len());
                unique.push(record);
            }
        }
    }

    unique
}

/// Stable ascending sort by kickoff instant. Missing or unparseable kickoffs
/// go first, in their original order.
pub fn sort_by_kickoff(records: &mut [RawMatch]) {
    records.sort_by_cached_key(|record| record.kickoff().and_then(parse_datetime));
}

pub fn normalize_all(records: &[RawMatch]) -> Vec<NormalizedMatch> {
    records
        .iter()
        .enumerate()
        .map(|(index, record)| normalize_match(index, record))
        .collect()
}

fn normalize_match(index: usize, record: &RawMatch) -> NormalizedMatch {
    if let Some(raw) = record.kickoff() {
        if parse_datetime(raw).is_none() {
            let malformed = MalformedRecord {
                index,
                reason: format!("unparseable kickoff {:?}", raw),
            };
            warn!("{}: date set to null", malformed);
        }
    }
    if let IdentityKey::Composite(key) = record.identity_key() {
        debug!("Record #{} has no native id, identified by {}", index, key);
    }
    record.normalize()
}

/// Kickoff rewritten as a UTC RFC 3339 timestamp (`Z` suffix), so sorted
/// output is also in string order. Unparseable values become `None`.
pub fn normalize_kickoff(raw: Option<&str>) -> Option<String> {
    raw.and_then(parse_datetime)
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::AutoSi, true))
}

/// Maps a provider status onto the canonical short codes.
///
/// | raw (case-insensitive) | short |
/// |---|---|
/// | SCHEDULED, TIMED, POSTPONED | NS |
/// | IN_PLAY, LIVE | LIVE |
/// | PAUSED | HT |
/// | FINISHED | FT |
/// | AWARDED | AET |
/// | CANCELLED | CANC |
///
/// Anything else passes through unchanged, so api-football's own codes
/// (`FT`, `NS`...) land on the matching known variant. `provider_long` wins over the
/// built-in description when present.
pub fn map_status(raw: Option<&str>, provider_long: Option<&str>, elapsed: Option<i64>) -> MatchStatus {
    let raw = raw.map(str::trim).unwrap_or_default();
    let (short, label) = match raw.to_uppercase().as_str() {
        "" | "SCHEDULED" | "TIMED" => (StatusCode::NotStarted, "Not Started"),
        "POSTPONED" => (StatusCode::NotStarted, "Postponed"),
        "IN_PLAY" | "LIVE" => (StatusCode::Live, "In Play"),
        "PAUSED" => (StatusCode::HalfTime, "Halftime"),
        "FINISHED" => (StatusCode::FullTime, "Match Finished"),
        "AWARDED" => (StatusCode::AfterExtraTime, "Awarded"),
        "CANCELLED" => (StatusCode::Cancelled, "Cancelled"),
        _ => (StatusCode::from(raw.to_string()), raw),
    };

    MatchStatus {
        short,
        long: provider_long.unwrap_or(label).to_string(),
        elapsed,
    }
}
