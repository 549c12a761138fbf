use serde::Deserialize;
use std::collections::HashMap;

// Account V1 response
#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct AccountDto {
    pub puuid: String,
    #[serde(default)]
    pub game_name: Option<String>,
    #[serde(default)]
    pub tag_line: Option<String>,
}

// Summoner V4 response
#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SummonerDto {
    #[serde(default)]
    pub id: String,
    pub puuid: String,
    #[serde(default)]
    pub summoner_level: i64,
}

// Match V5 response
#[derive(Debug, Deserialize, Clone)]
pub struct MatchDto {
    pub metadata: MatchMetadata,
    pub info: MatchInfo,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct MatchMetadata {
    pub match_id: String,
    #[serde(default)]
    pub participants: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct MatchInfo {
    pub game_duration: i64,
    /// Absent on records from before patch 11.20, where `game_duration` is in milliseconds.
    #[serde(default)]
    pub game_end_timestamp: Option<i64>,
    pub participants: Vec<ParticipantDto>,
}

impl MatchInfo {
    pub fn duration_seconds(&self) -> i64 {
        match self.game_end_timestamp {
            Some(_) => self.game_duration,
            None => self.game_duration / 1000,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantDto {
    pub puuid: String,
    pub champion_id: i64,
    #[serde(default)]
    pub champion_name: String,
    #[serde(default)]
    pub team_id: i64,
    pub win: bool,
    #[serde(default)]
    pub kills: u32,
    #[serde(default)]
    pub deaths: u32,
    #[serde(default)]
    pub assists: u32,
    #[serde(default)]
    pub vision_score: u32,
    #[serde(default)]
    pub team_position: String, // TOP, JUNGLE, MIDDLE, BOTTOM, UTILITY
}

// Spectator V4 response. The numeric in-game fields are only present on
// feeds that expose them and default to zero otherwise.
#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CurrentGameInfoDto {
    #[serde(default)]
    pub game_id: i64,
    #[serde(default)]
    pub game_mode: String,
    #[serde(default)]
    pub game_length: i64,
    pub participants: Vec<CurrentGameParticipantDto>,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct CurrentGameParticipantDto {
    pub summoner_id: String,
    pub puuid: String,
    pub riot_id: String,
    pub champion_id: i64,
    pub team_id: i64,
    pub kills: u32,
    pub deaths: u32,
    pub assists: u32,
    pub gold: u32,
    pub creep_score: u32,
    pub level: u32,
    pub vision_score: u32,
    pub tower_kills: u32,
    pub dragon_kills: u32,
    pub baron_kills: u32,
}

// Champion Mastery V4 response
#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ChampionMasteryDto {
    pub champion_id: i64,
    pub champion_level: i64,
    pub champion_points: i64,
}

// Data Dragon Champion response
#[derive(Debug, Deserialize)]
pub struct DataDragonChampions {
    #[serde(default)]
    pub version: String,
    pub data: HashMap<String, ChampionInfo>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChampionInfo {
    pub id: String,
    pub name: String,
    /// Numeric champion id, as a string.
    pub key: String,
}
