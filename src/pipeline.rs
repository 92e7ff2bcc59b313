// One run: credential check, fetch, aggregate, write
use chrono::{Local, NaiveDate};
use std::path::PathBuf;
use tracing::{error, info, warn};

use crate::config::{resolve_api_key, AppConfig, QueryPlan};
use crate::fetcher::{FixtureSource, HttpFetcher};
use crate::model::{DateQuery, FailurePolicy, OutputBatch, RunError};
use crate::normalizer::aggregate;
use crate::provider::{Provider, RawMatch};
use crate::standings::fetch_standings;
use crate::storage::write_json;

/// Summary of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub path: PathBuf,
    pub records: usize,
    pub failed_requests: usize,
}

/// Runs the queries one after another. With `SkipFailed` a failing query is
/// logged and skipped unless every query fails.
pub async fn collect_matches<S>(
    source: &S,
    queries: &[DateQuery],
    policy: FailurePolicy,
) -> Result<(Vec<Vec<RawMatch>>, usize), RunError>
where
    S: FixtureSource + ?Sized,
{
    let mut batches = Vec::with_capacity(queries.len());
    let mut last_error = None;
    let mut failed = 0;

    for query in queries {
        match source.fetch_matches(query).await {
            Ok(records) => {
                info!("⤷ {} matches on {}", records.len(), query);
                batches.push(records);
            }
            Err(e) if policy == FailurePolicy::SkipFailed => {
                warn!("⚠️ Failed to fetch {}: {}", query, e);
                failed += 1;
                last_error = Some(e);
            }
            Err(e) => return Err(e.into()),
        }
    }

    match last_error {
        Some(last) if batches.is_empty() => Err(RunError::AllRequestsFailed {
            attempted: queries.len(),
            last,
        }),
        _ => Ok((batches, failed)),
    }
}

/// Fetches every query, normalizes the result and writes the output batch.
pub async fn run_matches<S>(
    source: &S,
    queries: &[DateQuery],
    policy: FailurePolicy,
    source_label: String,
    output: PathBuf,
) -> Result<RunReport, RunError>
where
    S: FixtureSource + ?Sized,
{
    let (batches, failed_requests) = collect_matches(source, queries, policy).await?;

    let response = aggregate(batches);
    info!("✅ Total unique matches gathered: {}", response.len());

    let batch = OutputBatch::new(source_label, response);
    write_json(&output, &batch)?;

    Ok(RunReport { path: output, records: batch.response.len(), failed_requests })
}

/// The `matches` command. The credential is checked before anything touches
/// the network.
pub async fn matches_command<F>(config: &AppConfig, plan: &QueryPlan, lookup: F) -> Result<RunReport, RunError>
where
    F: Fn(&str) -> Option<String>,
{
    matches_command_on(config, plan, lookup, Local::now().date_naive()).await
}

pub async fn matches_command_on<F>(
    config: &AppConfig,
    plan: &QueryPlan,
    lookup: F,
    today: NaiveDate,
) -> Result<RunReport, RunError>
where
    F: Fn(&str) -> Option<String>,
{
    let adapter = config.provider.adapter();
    let api_key = resolve_api_key(adapter, lookup)?;
    plan.validate()?;

    let fetcher = HttpFetcher::new(
        adapter,
        api_key,
        config.base_url.as_deref(),
        config.competitions.clone(),
        &config.user_agent,
    )?;

    let queries = plan.queries(today);
    let label = config
        .source
        .clone()
        .unwrap_or_else(|| plan.describe(adapter.name(), today));
    info!("🔄 Start fetching matches from {} ({} requests)...", adapter.name(), queries.len());

    run_matches(&fetcher, &queries, plan.failure_policy(), label, config.output.clone()).await
}

/// The `standings` command, always against football-data.org.
pub async fn standings_command<F>(config: &AppConfig, lookup: F) -> Result<RunReport, RunError>
where
    F: Fn(&str) -> Option<String>,
{
    let adapter = Provider::FootballData.adapter();
    let api_key = resolve_api_key(adapter, lookup)?;

    // base_url belongs to the configured matches provider
    let base_url = match config.provider {
        Provider::FootballData => config.base_url.as_deref(),
        Provider::ApiFootball => None,
    };
    let fetcher = HttpFetcher::new(adapter, api_key, base_url, Vec::new(), &config.user_agent)?;

    let response = fetch_standings(&fetcher, config.standings.competition_id).await?;
    let batch = response.into_batch(adapter.name().to_string());
    let records = batch.standings.len();
    write_json(&config.standings.output, &batch)?;

    Ok(RunReport { path: config.standings.output.clone(), records, failed_requests: 0 })
}

/// Logs a fatal run error with whatever context it carries.
pub fn report_failure(err: &RunError) {
    match err {
        RunError::AllRequestsFailed { attempted, last } => {
            error!("❌ All {} requests failed; last error: {}", attempted, last)
        }
        other => error!("❌ Fatal error: {}", other),
    }
}
