use crate::analysis::champion_stats::ChampionAggregate;
use crate::analysis::metrics::MatchMetrics;
use crate::analysis::report::ChampionStat;
use crate::analysis::summary::MatchSummary;
use crate::cache::ChampionCatalog;
use crate::live::{LiveFlowState, LiveReport};
use colored::*;
use std::collections::HashMap;
use tabled::{settings::Style, Table, Tabled};

#[derive(Tabled)]
struct MatchRow {
    #[tabled(rename = "#")]
    number: String,
    champion: String,
    role: String,
    result: String,
    kda: String,
    duration: String,
    vision: String,
}

#[derive(Tabled)]
struct AggregateRow {
    champion: String,
    games: String,
    win_rate: String,
    kda: String,
}

#[derive(Tabled)]
struct MasteryRow {
    rank: String,
    champion: String,
    mastery: String,
    points: String,
    games: String,
    win_rate: String,
    kda: String,
    #[tabled(rename = "avg K/D/A")]
    averages: String,
}

fn rounded(table: &mut Table) -> String {
    table.with(Style::rounded());
    table.to_string()
}

pub fn render_match_history(summaries: &[MatchSummary], catalog: Option<&ChampionCatalog>) -> String {
    let rows: Vec<MatchRow> = summaries
        .iter()
        .enumerate()
        .map(|(idx, s)| MatchRow {
            number: format!("{}", idx + 1),
            champion: champion_label(s.champion_id, catalog),
            role: s.role.to_string(),
            result: if s.win {
                "WIN".green().to_string()
            } else {
                "LOSS".red().to_string()
            },
            kda: format!("{}/{}/{} ({:.2})", s.kills, s.deaths, s.assists, s.kda()),
            duration: format!("{}:{:02}", s.duration_seconds / 60, s.duration_seconds % 60),
            vision: s.vision_score.to_string(),
        })
        .collect();

    rounded(&mut Table::new(rows))
}

/// Most played first, then by champion id for a stable layout.
pub fn render_aggregates(
    aggregates: &HashMap<i64, ChampionAggregate>,
    catalog: Option<&ChampionCatalog>,
) -> String {
    let mut entries: Vec<(&i64, &ChampionAggregate)> = aggregates.iter().collect();
    entries.sort_by(|a, b| b.1.games.cmp(&a.1.games).then(a.0.cmp(b.0)));

    let rows: Vec<AggregateRow> = entries
        .into_iter()
        .map(|(champion_id, stats)| AggregateRow {
            champion: champion_label(*champion_id, catalog),
            games: stats.games.to_string(),
            win_rate: format!("{:.1}%", stats.win_rate() * 100.0),
            kda: format!("{:.2}", stats.kda()),
        })
        .collect();

    rounded(&mut Table::new(rows))
}

pub fn render_champion_report(report: &[ChampionStat]) -> String {
    let rows: Vec<MasteryRow> = report
        .iter()
        .enumerate()
        .map(|(idx, stat)| MasteryRow {
            rank: format!("#{}", idx + 1),
            champion: stat.champion_name.clone(),
            mastery: stat.mastery_level.to_string(),
            points: stat.mastery_points.to_string(),
            games: stat.games_analyzed.to_string(),
            win_rate: format!("{:.1}%", stat.win_rate * 100.0),
            kda: format!("{:.2}", stat.kda),
            averages: format!(
                "{:.1}/{:.1}/{:.1}",
                stat.avg_kills, stat.avg_deaths, stat.avg_assists
            ),
        })
        .collect();

    rounded(&mut Table::new(rows))
}

fn champion_label(champion_id: i64, catalog: Option<&ChampionCatalog>) -> String {
    match catalog {
        Some(catalog) => catalog.name_of(champion_id),
        None => format!("#{}", champion_id),
    }
}

pub fn display_match_history(
    summaries: &[MatchSummary],
    metrics: &MatchMetrics,
    catalog: Option<&ChampionCatalog>,
) {
    let wins = summaries.iter().filter(|s| s.win).count();
    let losses = summaries.len() - wins;

    println!(
        "\n{}",
        format!("📊 MATCH HISTORY (Last {} Games)", metrics.games)
            .bold()
            .cyan()
    );
    println!("{}\n", "=".repeat(80).cyan());
    println!(
        "{} {} W / {} L ({:.1}% WR, avg {:.1} min)\n",
        "📈 Overall:".bold(),
        wins.to_string().green(),
        losses.to_string().red(),
        metrics.win_rate,
        metrics.average_duration_minutes()
    );

    if summaries.is_empty() {
        println!("{}", "No matches could be analyzed".yellow());
        return;
    }

    println!("{}\n", render_match_history(summaries, catalog));
}

pub fn display_aggregates(
    aggregates: &HashMap<i64, ChampionAggregate>,
    catalog: Option<&ChampionCatalog>,
) {
    if aggregates.is_empty() {
        return;
    }

    println!("{}", "🏆 CHAMPION BREAKDOWN".bold().cyan());
    println!("{}\n", "=".repeat(60).cyan());
    println!("{}\n", render_aggregates(aggregates, catalog));
}

pub fn display_champion_report(report: &[ChampionStat], player_name: &str) {
    println!(
        "\n{}",
        format!("🎮 Champion Mastery Report for {} ", player_name)
            .bold()
            .cyan()
    );
    println!("{}\n", "=".repeat(60).cyan());

    if report.is_empty() {
        println!(
            "{}",
            "No recent games found on the top mastery champions".yellow()
        );
        return;
    }

    println!("{}", render_champion_report(report));

    println!("\n{}", "Interpretation".bold().yellow());
    println!("• Win Rate / KDA: over the sampled recent games on that champion");
    println!("• Sorted by win rate; equal rates keep mastery order\n");
}

pub fn display_live_report(report: &LiveReport, player_name: &str) {
    println!(
        "\n{}",
        format!("🔴 Live Game for {} ", player_name).bold().cyan()
    );
    println!("{}\n", "=".repeat(60).cyan());

    match (report.reached, &report.state) {
        (LiveFlowState::InGame, Some(state)) => {
            println!("  Players in snapshot: {}", state.team_composition.len());
            println!("  Gold lead:           {:+}", state.gold_lead);
            println!(
                "  Team K/D/A:          {}/{}/{}",
                state.total_kills, state.total_deaths, state.total_assists
            );
            println!(
                "  Objectives:          {} towers, {} dragons, {} barons",
                state.objectives.towers, state.objectives.dragons, state.objectives.barons
            );
            println!("  Team CS:             {}", state.total_cs);
            println!("  Avg champion level:  {:.1}", state.avg_champion_level);
            println!("  Team vision score:   {}", state.total_vision_score);

            if let Some(p) = report.win_probability {
                let pct = format!("{:.0}%", p * 100.0);
                let pct = if p > 0.5 { pct.green() } else { pct.normal() };
                println!(
                    "\n  {} {} {}",
                    "Estimated win chance:".bold(),
                    pct,
                    "(heuristic, not a calibrated model)".dimmed()
                );
            }
        }
        (LiveFlowState::NotInGame, _) => {
            println!("{}", "Player is not currently in a game".yellow());
        }
        (reached, _) => {
            let reason = report
                .failure
                .as_ref()
                .map(|e| e.to_string())
                .unwrap_or_else(|| "unknown failure".to_string());
            display_error(&format!("live lookup stopped at '{}': {}", reached, reason));
        }
    }

    println!();
}

pub fn display_error(error: &str) {
    eprintln!("{} {}", "❌ Error:".red().bold(), error);
}

pub fn display_info(message: &str) {
    println!("{} {}", "ℹ️".cyan(), message);
}

pub fn display_success(message: &str) {
    println!("{} {}", "✓".green(), message);
}
