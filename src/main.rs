use std::io;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use indicatif::ProgressBar;
use league_insight::analysis::champion_stats::aggregate;
use league_insight::analysis::metrics::MatchMetrics;
use league_insight::analysis::report::{build_report, collect_mastery_aggregates};
use league_insight::api::RiotApiClient;
use league_insight::cache::ChampionCatalog;
use league_insight::config::Config;
use league_insight::display::output::{
    display_aggregates, display_champion_report, display_error, display_info,
    display_live_report, display_match_history, display_success,
};
use league_insight::error::ApiError;
use league_insight::export::write_summaries;
use league_insight::fetcher::MatchFetcher;
use league_insight::identity::{resolve_account, AccountId, PlayerIdentity};
use league_insight::live::track_resolved_live_game;
use league_insight::logging;
use league_insight::prompt::{Prompter, ReportMode};

#[derive(Parser, Debug)]
#[command(name = "League Insight")]
#[command(about = "Champion performance and live game estimates from your match history", long_about = None)]
struct Args {
    /// Riot game name (prompted when omitted)
    #[arg(short, long)]
    name: Option<String>,

    /// Riot tag line, without '#' (prompted when omitted)
    #[arg(short, long)]
    tag: Option<String>,

    /// Platform, e.g. na1, euw, kr (prompted when omitted)
    #[arg(short, long)]
    region: Option<String>,

    /// Number of recent matches to analyze (prompted when omitted or zero)
    #[arg(short, long)]
    matches: Option<usize>,

    /// Report to show after the match history
    #[arg(long, value_enum)]
    mode: Option<ReportMode>,

    /// CSV file for the match history (overwritten each run)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Download the champion catalog even if a cached copy is fresh
    #[arg(long)]
    refresh_catalog: bool,
}

fn main() {
    logging::init();
    let args = Args::parse();

    if let Err(e) = run(args) {
        display_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

fn run(args: Args) -> anyhow::Result<()> {
    let mut config = Config::from_env()?;
    if let Some(path) = args.output {
        config.export_path = path;
    }

    let stdin = io::stdin();
    let mut prompter = Prompter::new(stdin.lock(), io::stdout());

    let platform = prompter.platform_or_ask(args.region.as_deref(), config.platform)?;
    let name = match args.name {
        Some(name) => name,
        None => prompter.ask_text("Game name:")?,
    };
    let tag = match args.tag {
        Some(tag) => tag,
        None => prompter.ask_text("Tag line:")?,
    };
    let count = prompter.match_count_or_ask(args.matches)?;

    let identity = PlayerIdentity::new(&name, &tag, platform);
    let client = RiotApiClient::from_config(&config);

    display_info(&format!("Fetching data for {}", identity));

    // Step 1: Riot ID -> PUUID
    let account = match resolve_account(&client, &identity) {
        Ok(account) => account,
        Err(e) => return abort_branch("account lookup", e),
    };
    let short_id: String = account.as_str().chars().take(8).collect();
    display_success(&format!("Found PUUID: {}", short_id));

    let catalog = match ChampionCatalog::load_or_fetch(
        &client,
        &ChampionCatalog::default_dir(),
        config.ddragon_version.as_deref(),
        &config.ddragon_locale,
        args.refresh_catalog,
    ) {
        Ok(catalog) => Some(catalog),
        Err(e) => {
            display_error(&format!("champion catalog unavailable, showing ids: {}", e));
            None
        }
    };

    // Step 2: recent match history
    let fetcher = MatchFetcher::new(&client, config.concurrency);
    let match_ids = match fetcher.list_recent_match_ids(&account, platform, count) {
        Ok(ids) => ids,
        Err(e) => return abort_branch("match history lookup", e),
    };
    display_success(&format!("Found {} matches to analyze", match_ids.len()));

    let pb = ProgressBar::new(match_ids.len() as u64);
    pb.set_message("Fetching match details");
    let fetched = MatchFetcher::new(&client, config.concurrency)
        .with_progress(pb.clone())
        .fetch_summaries(&match_ids, &account, platform);
    let summaries = match fetched {
        Ok(summaries) => summaries,
        Err(e) => {
            pb.abandon();
            return abort_branch("match detail lookup", e);
        }
    };
    pb.finish_with_message("✓ Match data fetched");

    write_summaries(&config.export_path, &summaries)
        .with_context(|| format!("writing {}", config.export_path.display()))?;
    display_success(&format!(
        "Match data saved to {}",
        config.export_path.display()
    ));

    let metrics = MatchMetrics::from_summaries(&summaries);
    display_match_history(&summaries, &metrics, catalog.as_ref());
    display_aggregates(&aggregate(&summaries), catalog.as_ref());

    // Step 3: follow-up report
    let mode = match args.mode {
        Some(mode) => mode,
        None => prompter.ask_mode()?,
    };
    display_info(&format!("Building {} report...", mode));

    match mode {
        ReportMode::Mastery => mastery_report(
            &client,
            &config,
            &identity,
            &account,
            catalog.unwrap_or_default(),
        ),
        ReportMode::Live => {
            let report = track_resolved_live_game(&client, &account, platform);
            if let Some(failure) = report.failure.clone().filter(ApiError::is_fatal) {
                return Err(anyhow::Error::new(failure).context("live game lookup failed"));
            }
            display_live_report(&report, &identity.to_string());
            Ok(())
        }
    }
}

fn mastery_report(
    client: &RiotApiClient,
    config: &Config,
    identity: &PlayerIdentity,
    account: &AccountId,
    catalog: ChampionCatalog,
) -> anyhow::Result<()> {
    let mut masteries = match client.get_champion_masteries(account.as_str(), identity.platform) {
        Ok(masteries) => masteries,
        Err(e) => return abort_branch("champion mastery lookup", e),
    };
    if config.mastery_champions > 0 {
        masteries.truncate(config.mastery_champions);
    }

    let spinner = ProgressBar::new_spinner();
    spinner.set_message(format!(
        "Sampling {} games on {} champions",
        config.champion_sample_size,
        masteries.len()
    ));
    let fetcher = MatchFetcher::new(client, config.concurrency).with_progress(spinner.clone());

    let aggregates = collect_mastery_aggregates(
        &fetcher,
        account,
        identity.platform,
        &masteries,
        config.champion_sample_size,
        config.champion_pool_multiplier,
    )
    .context("champion sampling failed")?;
    spinner.finish_and_clear();

    let report = build_report(&masteries, &aggregates, &catalog);
    display_champion_report(&report, &identity.to_string());
    Ok(())
}

/// Stops the run on a credential failure; any other failure only ends the
/// current branch after a one-line diagnostic.
fn abort_branch(what: &str, err: ApiError) -> anyhow::Result<()> {
    if err.is_fatal() {
        return Err(anyhow::Error::new(err).context(format!("{} failed", what)));
    }

    display_error(&format!("{} failed: {}", what, err));
    Ok(())
}
