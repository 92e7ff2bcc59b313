use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use fixture_feed::config::{load_config_or_default, AppConfig, QueryPlan};
use fixture_feed::pipeline::{matches_command, report_failure, standings_command};
use fixture_feed::provider::Provider;

#[derive(Debug, Parser)]
#[command(author, version, about = "Fetch football fixtures into a normalized JSON file", long_about = None)]
struct Cli {
    /// JSON config file (defaults to ./fixture-feed.json when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Fetch fixtures and write the matches file (default)
    Matches(MatchesArgs),
    /// Fetch a football-data.org league table
    Standings {
        /// football-data.org competition id
        #[arg(long)]
        competition: Option<u32>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Debug, Default, Args)]
struct MatchesArgs {
    #[arg(short, long, value_enum)]
    provider: Option<Provider>,
    /// Single day, YYYY-MM-DD
    #[arg(long, conflicts_with_all = ["from", "to", "offsets"])]
    date: Option<NaiveDate>,
    /// Range start, YYYY-MM-DD
    #[arg(long, requires = "to", conflicts_with = "offsets")]
    from: Option<NaiveDate>,
    /// Range end, YYYY-MM-DD
    #[arg(long, requires = "from")]
    to: Option<NaiveDate>,
    /// Day offsets around today, e.g. -1,0,1
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    offsets: Vec<i64>,
    /// Competition codes sent to providers that support filtering
    #[arg(long, value_delimiter = ',')]
    competitions: Vec<String>,
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Provenance label written to the `source` field
    #[arg(long)]
    source: Option<String>,
}

impl MatchesArgs {
    fn apply(self, config: &mut AppConfig) -> QueryPlan {
        if let Some(provider) = self.provider {
            config.provider = provider;
        }
        if !self.competitions.is_empty() {
            config.competitions = self.competitions;
        }
        if let Some(output) = self.output {
            config.output = output;
        }
        if self.source.is_some() {
            config.source = self.source;
        }

        match (self.date, self.from, self.to) {
            (Some(date), _, _) => QueryPlan::Date(date),
            (None, Some(from), Some(to)) => QueryPlan::Range { from, to },
            _ if !self.offsets.is_empty() => QueryPlan::Window(self.offsets),
            _ => QueryPlan::Window(config.window_offsets.clone()),
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Errors and progress both go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("😱 Panic occurred: {:?}", panic_info);
    }));

    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            warn!("Ignoring unreadable .env file: {}", e);
        }
    }

    let cli = Cli::parse();

    let mut config = match load_config_or_default(cli.config.as_deref()) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("❌ Config load error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let lookup = |name: &str| std::env::var(name).ok();
    let result = match cli.command.unwrap_or(Commands::Matches(MatchesArgs::default())) {
        Commands::Matches(args) => {
            let plan = args.apply(&mut config);
            matches_command(&config, &plan, lookup).await
        }
        Commands::Standings { competition, output } => {
            if let Some(competition) = competition {
                config.standings.competition_id = competition;
            }
            if let Some(output) = output {
                config.standings.output = output;
            }
            standings_command(&config, lookup).await
        }
    };

    match result {
        Ok(report) => {
            if report.failed_requests > 0 {
                warn!("{} request(s) failed and were skipped", report.failed_requests);
            }
            info!("🏁 {} records written to {}", report.records, report.path.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            report_failure(&e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_is_well_formed() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn range_flags_build_a_range_plan() {
        let cli = Cli::parse_from([
            "fixture-feed", "matches", "--provider", "football-data",
            "--from", "2024-05-01", "--to", "2024-05-07", "--competitions", "PL,CL",
        ]);
        let Some(Commands::Matches(args)) = cli.command else {
            panic!("expected matches command");
        };

        let mut config = AppConfig::default();
        let plan = args.apply(&mut config);
        assert_eq!(config.provider, Provider::FootballData);
        assert_eq!(config.competitions, vec!["PL".to_string(), "CL".to_string()]);
        assert_eq!(
            plan,
            QueryPlan::Range {
                from: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
                to: NaiveDate::from_ymd_opt(2024, 5, 7).unwrap(),
            }
        );
    }

    #[test]
    fn negative_offsets_parse() {
        let cli = Cli::parse_from(["fixture-feed", "matches", "--offsets", "-2,-1,0"]);
        let Some(Commands::Matches(args)) = cli.command else {
            panic!("expected matches command");
        };
        assert_eq!(args.apply(&mut AppConfig::default()), QueryPlan::Window(vec![-2, -1, 0]));
    }

    #[test]
    fn no_subcommand_uses_configured_window() {
        let cli = Cli::parse_from(["fixture-feed"]);
        assert!(cli.command.is_none());
        let plan = MatchesArgs::default().apply(&mut AppConfig::default());
        assert_eq!(plan, QueryPlan::Window(vec![-1, 0, 1]));
    }
}
