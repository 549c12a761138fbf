use std::cmp::Ordering;
use std::collections::HashMap;

use super::champion_stats::{aggregate, ChampionAggregate};
use crate::api::models::ChampionMasteryDto;
use crate::cache::ChampionCatalog;
use crate::error::ApiError;
use crate::fetcher::MatchFetcher;
use crate::identity::AccountId;
use crate::region::Platform;

/// One row of the mastery report.
#[derive(Debug, Clone, PartialEq)]
pub struct ChampionStat {
    pub champion_id: i64,
    pub champion_name: String,
    pub mastery_level: i64,
    pub mastery_points: i64,
    pub win_rate: f64,
    pub games_analyzed: u32,
    pub kda: f64,
    pub avg_kills: f64,
    pub avg_deaths: f64,
    pub avg_assists: f64,
}

impl ChampionStat {
    fn new(mastery: &ChampionMasteryDto, name: String, stats: &ChampionAggregate) -> Self {
        ChampionStat {
            champion_id: mastery.champion_id,
            champion_name: name,
            mastery_level: mastery.champion_level,
            mastery_points: mastery.champion_points,
            win_rate: stats.win_rate(),
            games_analyzed: stats.games,
            kda: stats.kda(),
            avg_kills: stats.avg_kills(),
            avg_deaths: stats.avg_deaths(),
            avg_assists: stats.avg_assists(),
        }
    }
}

/// Joins mastery entries with their aggregates and names.
///
/// Champions without analysed games are left out. The result is sorted by
/// win rate, highest first; ties keep mastery order.
pub fn build_report(
    masteries: &[ChampionMasteryDto],
    aggregates: &HashMap<i64, ChampionAggregate>,
    catalog: &ChampionCatalog,
) -> Vec<ChampionStat> {
    let mut report: Vec<ChampionStat> = masteries
        .iter()
        .filter_map(|mastery| {
            let stats = aggregates.get(&mastery.champion_id)?;
            if stats.games == 0 {
                return None;
            }
            Some(ChampionStat::new(
                mastery,
                catalog.name_of(mastery.champion_id),
                stats,
            ))
        })
        .collect();

    // sort_by is stable
    report.sort_by(|a, b| b.win_rate.partial_cmp(&a.win_rate).unwrap_or(Ordering::Equal));
    report
}

/// Samples recent games for each mastery entry, in mastery order, and folds
/// each sample into that champion's aggregate.
///
/// A failed sample is logged and the champion is left out; only an
/// unauthorized key aborts the report.
pub fn collect_mastery_aggregates(
    fetcher: &MatchFetcher<'_>,
    account: &AccountId,
    platform: Platform,
    masteries: &[ChampionMasteryDto],
    sample_size: usize,
    pool_multiplier: usize,
) -> Result<HashMap<i64, ChampionAggregate>, ApiError> {
    let mut aggregates = HashMap::new();

    for mastery in masteries {
        match fetcher.fetch_champion_matches(
            account,
            platform,
            mastery.champion_id,
            sample_size,
            pool_multiplier,
        ) {
            Ok(sample) => {
                if let Some(stats) = aggregate(&sample).remove(&mastery.champion_id) {
                    aggregates.insert(mastery.champion_id, stats);
                }
            }
            Err(ApiError::Unauthorized) => return Err(ApiError::Unauthorized),
            Err(e) => {
                tracing::warn!(champion_id = mastery.champion_id, error = %e, "champion sample failed");
            }
        }
    }

    Ok(aggregates)
}
