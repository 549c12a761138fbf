//! Live game snapshot, team aggregation and the heuristic win estimate.

use std::fmt;

use crate::api::models::{CurrentGameInfoDto, CurrentGameParticipantDto};
use crate::api::RiotApiClient;
use crate::error::ApiError;
use crate::identity::{resolve_account, resolve_summoner, AccountId, PlayerIdentity, SummonerId};
use crate::region::Platform;

const BASELINE_PROBABILITY: f64 = 0.5;
const GOLD_LEAD_THRESHOLD: i64 = 2000;
const DRAGON_THRESHOLD: u32 = 1;
const VISION_THRESHOLD: u32 = 30;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveParticipant {
    pub riot_id: String,
    pub champion_id: i64,
    pub team_id: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ObjectiveCounts {
    pub towers: u32,
    pub dragons: u32,
    pub barons: u32,
}

/// One poll of an in-progress game, from the tracked player's team.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LiveGameState {
    pub team_composition: Vec<LiveParticipant>,
    pub gold_lead: i64,
    pub total_kills: u32,
    pub total_deaths: u32,
    pub total_assists: u32,
    pub objectives: ObjectiveCounts,
    pub total_cs: u32,
    pub avg_champion_level: f64,
    pub total_vision_score: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LiveGameStatus {
    InGame(LiveGameState),
    NotInGame,
}

/// Sums the team's numeric fields and averages champion level over the
/// whole roster, whatever its size.
///
/// `team_id = None`, or a team nobody is on, treats the full roster as the
/// team with no gold lead.
pub fn reduce_team(participants: &[CurrentGameParticipantDto], team_id: Option<i64>) -> LiveGameState {
    let team = team_id.filter(|team| participants.iter().any(|p| p.team_id == *team));
    let on_team = |p: &CurrentGameParticipantDto| team.map_or(true, |team| p.team_id == team);

    let mut state = LiveGameState {
        team_composition: participants
            .iter()
            .map(|p| LiveParticipant {
                riot_id: p.riot_id.clone(),
                champion_id: p.champion_id,
                team_id: p.team_id,
            })
            .collect(),
        ..LiveGameState::default()
    };

    for p in participants.iter().filter(|p| on_team(p)) {
        state.total_kills += p.kills;
        state.total_deaths += p.deaths;
        state.total_assists += p.assists;
        state.total_cs += p.creep_score;
        state.total_vision_score += p.vision_score;
        state.objectives.towers += p.tower_kills;
        state.objectives.dragons += p.dragon_kills;
        state.objectives.barons += p.baron_kills;
    }

    if team.is_some() {
        state.gold_lead = participants
            .iter()
            .map(|p| {
                let gold = i64::from(p.gold);
                if on_team(p) { gold } else { -gold }
            })
            .sum();
    }

    if !participants.is_empty() {
        let levels: u32 = participants.iter().map(|p| p.level).sum();
        state.avg_champion_level = f64::from(levels) / participants.len() as f64;
    }

    state
}

/// Heuristic, uncalibrated win chance for the tracked team.
///
/// Starts at 0.5 and adds 0.10 for a gold lead above 2000, 0.05 for more
/// kills than deaths, 0.05 for more than one dragon and 0.05 for a vision
/// score above 30, clamped to [0, 1]. Pure and deterministic.
pub fn estimate_win_probability(state: &LiveGameState) -> f64 {
    let mut probability = BASELINE_PROBABILITY;

    if state.gold_lead > GOLD_LEAD_THRESHOLD {
        probability += 0.10;
    }
    if state.total_kills > state.total_deaths {
        probability += 0.05;
    }
    if state.objectives.dragons > DRAGON_THRESHOLD {
        probability += 0.05;
    }
    if state.total_vision_score > VISION_THRESHOLD {
        probability += 0.05;
    }

    probability.clamp(0.0, 1.0)
}

/// Single spectator poll. A 404 means the player is not in a game.
pub fn poll_live_state(
    client: &RiotApiClient,
    summoner: &SummonerId,
    platform: Platform,
) -> Result<LiveGameStatus, ApiError> {
    match client.get_active_game(summoner.as_str(), platform) {
        Ok(game) => Ok(LiveGameStatus::InGame(snapshot(&game, summoner))),
        Err(ApiError::NotFound(_)) => Ok(LiveGameStatus::NotInGame),
        Err(e) => Err(e),
    }
}

fn snapshot(game: &CurrentGameInfoDto, summoner: &SummonerId) -> LiveGameState {
    let team_id = game
        .participants
        .iter()
        .find(|p| p.summoner_id == summoner.as_str())
        .map(|p| p.team_id);

    if team_id.is_none() {
        tracing::debug!(game_id = game.game_id, "tracked summoner missing from roster");
    }

    reduce_team(&game.participants, team_id)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiveFlowState {
    Unresolved,
    AccountResolved,
    SummonerResolved,
    InGame,
    NotInGame,
}

impl fmt::Display for LiveFlowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LiveFlowState::Unresolved => "unresolved",
            LiveFlowState::AccountResolved => "account resolved",
            LiveFlowState::SummonerResolved => "summoner resolved",
            LiveFlowState::InGame => "in game",
            LiveFlowState::NotInGame => "not in game",
        };
        f.write_str(name)
    }
}

/// Where the identity → live flow ended, and what it found.
#[derive(Debug, Clone, PartialEq)]
pub struct LiveReport {
    pub reached: LiveFlowState,
    pub state: Option<LiveGameState>,
    pub win_probability: Option<f64>,
    pub failure: Option<ApiError>,
}

impl LiveReport {
    fn halted(reached: LiveFlowState, failure: ApiError) -> Self {
        tracing::warn!(%reached, error = %failure, "live lookup halted");
        LiveReport {
            reached,
            state: None,
            win_probability: None,
            failure: Some(failure),
        }
    }
}

/// Walks UNRESOLVED → ACCOUNT_RESOLVED → SUMMONER_RESOLVED → IN_GAME | NOT_IN_GAME,
/// stopping at the first failure.
pub fn track_live_game(client: &RiotApiClient, identity: &PlayerIdentity) -> LiveReport {
    match resolve_account(client, identity) {
        Ok(account) => track_resolved_live_game(client, &account, identity.platform),
        Err(e) => LiveReport::halted(LiveFlowState::Unresolved, e),
    }
}

/// Same flow entered at ACCOUNT_RESOLVED, for callers that already hold the
/// account id.
pub fn track_resolved_live_game(
    client: &RiotApiClient,
    account: &AccountId,
    platform: Platform,
) -> LiveReport {
    let summoner = match resolve_summoner(client, account, platform) {
        Ok(summoner) => summoner,
        Err(e) => return LiveReport::halted(LiveFlowState::AccountResolved, e),
    };

    match poll_live_state(client, &summoner, platform) {
        Ok(LiveGameStatus::InGame(state)) => LiveReport {
            reached: LiveFlowState::InGame,
            win_probability: Some(estimate_win_probability(&state)),
            state: Some(state),
            failure: None,
        },
        Ok(LiveGameStatus::NotInGame) => LiveReport {
            reached: LiveFlowState::NotInGame,
            state: None,
            win_probability: None,
            failure: None,
        },
        Err(e) => LiveReport::halted(LiveFlowState::SummonerResolved, e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player(team_id: i64, kills: u32, deaths: u32, gold: u32) -> CurrentGameParticipantDto {
        CurrentGameParticipantDto {
            team_id,
            kills,
            deaths,
            gold,
            level: 10,
            ..Default::default()
        }
    }

    fn state(gold_lead: i64, kills: u32, deaths: u32, dragons: u32, vision: u32) -> LiveGameState {
        LiveGameState {
            gold_lead,
            total_kills: kills,
            total_deaths: deaths,
            objectives: ObjectiveCounts { dragons, ..Default::default() },
            total_vision_score: vision,
            ..LiveGameState::default()
        }
    }

    #[test]
    fn all_factors_add_up() {
        let p = estimate_win_probability(&state(5000, 10, 2, 3, 50));
        assert!((p - 0.75).abs() < 1e-9);
    }

    #[test]
    fn neutral_state_is_even() {
        assert_eq!(estimate_win_probability(&state(0, 4, 4, 1, 30)), 0.5);
    }

    #[test]
    fn thresholds_are_strict() {
        assert_eq!(estimate_win_probability(&state(2000, 0, 0, 0, 0)), 0.5);
        assert!((estimate_win_probability(&state(2001, 0, 0, 0, 0)) - 0.6).abs() < 1e-9);
        assert!((estimate_win_probability(&state(0, 0, 0, 2, 31)) - 0.6).abs() < 1e-9);
    }

    #[test]
    fn each_factor_never_lowers_the_estimate() {
        let base = estimate_win_probability(&state(0, 0, 0, 0, 0));
        for improved in [state(3000, 0, 0, 0, 0), state(0, 1, 0, 0, 0), state(0, 0, 0, 2, 0), state(0, 0, 0, 0, 40)] {
            let p = estimate_win_probability(&improved);
            assert!(p >= base);
            assert!((0.0..=1.0).contains(&p));
        }
    }

    #[test]
    fn reduce_team_sums_own_team_and_averages_roster_level() {
        let mut roster = vec![
            player(100, 5, 1, 9000),
            player(100, 3, 2, 8000),
            player(200, 1, 4, 6000),
            player(200, 2, 3, 7000),
        ];
        roster[0].dragon_kills = 2;
        roster[1].vision_score = 25;
        roster[2].level = 14;

        let state = reduce_team(&roster, Some(100));

        assert_eq!(state.team_composition.len(), 4);
        assert_eq!(state.total_kills, 8);
        assert_eq!(state.total_deaths, 3);
        assert_eq!(state.gold_lead, 4000);
        assert_eq!(state.objectives.dragons, 2);
        assert_eq!(state.total_vision_score, 25);
        assert_eq!(state.avg_champion_level, 11.0);
    }

    #[test]
    fn partial_roster_is_tolerated() {
        let roster = vec![player(100, 2, 1, 5000), player(100, 1, 1, 4000), player(100, 0, 0, 3000)];
        let state = reduce_team(&roster, None);

        assert_eq!(state.team_composition.len(), 3);
        assert_eq!(state.total_kills, 3);
        assert_eq!(state.gold_lead, 0);
        assert_eq!(state.avg_champion_level, 10.0);
    }

    #[test]
    fn empty_roster_is_neutral() {
        let state = reduce_team(&[], Some(100));
        assert_eq!(state.avg_champion_level, 0.0);
        assert_eq!(estimate_win_probability(&state), 0.5);
    }
}
