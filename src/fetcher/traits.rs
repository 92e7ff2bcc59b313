use crate::model::{DateQuery, FetchError};
use crate::provider::RawMatch;

/// Anything that can answer a date query with raw provider records.
#[async_trait::async_trait]
pub trait FixtureSource: Send + Sync {
    async fn fetch_matches(&self, query: &DateQuery) -> Result<Vec<RawMatch>, FetchError>;
}
