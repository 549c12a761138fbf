use super::summary::MatchSummary;

/// Headline numbers for a batch of matches.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchMetrics {
    pub games: usize,
    /// Percentage, 0-100.
    pub win_rate: f64,
    pub average_duration_secs: f64,
}

impl MatchMetrics {
    pub fn from_summaries(summaries: &[MatchSummary]) -> Self {
        if summaries.is_empty() {
            return MatchMetrics {
                games: 0,
                win_rate: 0.0,
                average_duration_secs: 0.0,
            };
        }

        let games = summaries.len();
        let wins = summaries.iter().filter(|s| s.win).count();
        let total_duration: i64 = summaries.iter().map(|s| s.duration_seconds).sum();

        MatchMetrics {
            games,
            win_rate: wins as f64 / games as f64 * 100.0,
            average_duration_secs: total_duration as f64 / games as f64,
        }
    }

    pub fn average_duration_minutes(&self) -> f64 {
        self.average_duration_secs / 60.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::summary::Role;

    fn summary(win: bool, duration_seconds: i64) -> MatchSummary {
        MatchSummary {
            match_id: "m".into(),
            win,
            duration_seconds,
            kills: 0,
            deaths: 0,
            assists: 0,
            champion_id: 1,
            role: Role::Top,
            vision_score: 0,
        }
    }

    #[test]
    fn win_rate_is_a_percentage() {
        let metrics = MatchMetrics::from_summaries(&[
            summary(true, 1200),
            summary(false, 1800),
            summary(true, 2400),
            summary(true, 1800),
        ]);
        assert_eq!(metrics.games, 4);
        assert_eq!(metrics.win_rate, 75.0);
        assert_eq!(metrics.average_duration_secs, 1800.0);
        assert_eq!(metrics.average_duration_minutes(), 30.0);
    }

    #[test]
    fn empty_batch_is_all_zero() {
        let metrics = MatchMetrics::from_summaries(&[]);
        assert_eq!(metrics.games, 0);
        assert_eq!(metrics.win_rate, 0.0);
    }
}
