use std::collections::HashMap;

use super::summary::MatchSummary;

/// Running totals for one champion. Rates are derived on read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChampionAggregate {
    pub games: u32,
    pub wins: u32,
    pub kills: u32,
    pub deaths: u32,
    pub assists: u32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChampionRates {
    pub win_rate: f64,
    pub kda: f64,
}

impl ChampionAggregate {
    pub fn add(&mut self, summary: &MatchSummary) {
        self.games += 1;
        if summary.win {
            self.wins += 1;
        }
        self.kills += summary.kills;
        self.deaths += summary.deaths;
        self.assists += summary.assists;
    }

    /// 0 when no games have been folded in.
    pub fn win_rate(&self) -> f64 {
        if self.games == 0 {
            0.0
        } else {
            self.wins as f64 / self.games as f64
        }
    }

    /// Deaths are floored at 1 so a deathless record stays finite.
    pub fn kda(&self) -> f64 {
        (self.kills + self.assists) as f64 / self.deaths.max(1) as f64
    }

    pub fn rates(&self) -> ChampionRates {
        ChampionRates {
            win_rate: self.win_rate(),
            kda: self.kda(),
        }
    }

    pub fn avg_kills(&self) -> f64 {
        per_game(self.kills, self.games)
    }

    pub fn avg_deaths(&self) -> f64 {
        per_game(self.deaths, self.games)
    }

    pub fn avg_assists(&self) -> f64 {
        per_game(self.assists, self.games)
    }
}

fn per_game(total: u32, games: u32) -> f64 {
    if games == 0 {
        0.0
    } else {
        total as f64 / games as f64
    }
}

/// Count-and-sum fold by champion id; input order does not matter.
pub fn aggregate<'a, I>(summaries: I) -> HashMap<i64, ChampionAggregate>
where
    I: IntoIterator<Item = &'a MatchSummary>,
{
    let mut stats: HashMap<i64, ChampionAggregate> = HashMap::new();
    for summary in summaries {
        stats.entry(summary.champion_id).or_default().add(summary);
    }
    stats
}
