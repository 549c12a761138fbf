use std::fmt;
use std::str::FromStr;

use crate::api::models::MatchDto;
use crate::identity::AccountId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Top,
    Jungle,
    Mid,
    Bottom,
    Support,
    Unknown,
}

impl Role {
    /// Maps Match-v5 `teamPosition` values; anything else is `Unknown`.
    pub fn from_team_position(position: &str) -> Self {
        match position {
            "TOP" => Role::Top,
            "JUNGLE" => Role::Jungle,
            "MIDDLE" | "MID" => Role::Mid,
            "BOTTOM" => Role::Bottom,
            "UTILITY" | "SUPPORT" => Role::Support,
            _ => Role::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Top => "TOP",
            Role::Jungle => "JUNGLE",
            Role::Mid => "MID",
            Role::Bottom => "BOTTOM",
            Role::Support => "SUPPORT",
            Role::Unknown => "UNKNOWN",
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "TOP" => Ok(Role::Top),
            "JUNGLE" => Ok(Role::Jungle),
            "MID" => Ok(Role::Mid),
            "BOTTOM" => Ok(Role::Bottom),
            "SUPPORT" => Ok(Role::Support),
            "UNKNOWN" => Ok(Role::Unknown),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One match seen from the queried player's seat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchSummary {
    pub match_id: String,
    pub win: bool,
    pub duration_seconds: i64,
    pub kills: u32,
    pub deaths: u32,
    pub assists: u32,
    pub champion_id: i64,
    pub role: Role,
    pub vision_score: u32,
}

impl MatchSummary {
    /// (kills + assists) / max(1, deaths)
    pub fn kda(&self) -> f64 {
        (self.kills + self.assists) as f64 / self.deaths.max(1) as f64
    }
}

/// Picks the participant whose PUUID is `account`. A match without that
/// participant yields `None`.
pub fn extract_summary(detail: &MatchDto, account: &AccountId) -> Option<MatchSummary> {
    let participant = detail
        .info
        .participants
        .iter()
        .find(|p| p.puuid == account.as_str())?;

    Some(MatchSummary {
        match_id: detail.metadata.match_id.clone(),
        win: participant.win,
        duration_seconds: detail.info.duration_seconds(),
        kills: participant.kills,
        deaths: participant.deaths,
        assists: participant.assists,
        champion_id: participant.champion_id,
        role: Role::from_team_position(&participant.team_position),
        vision_score: participant.vision_score,
    })
}
