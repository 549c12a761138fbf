// URL builders for the Riot API routes used by the client

use crate::region::{Platform, Region};

pub const MAX_MATCH_IDS_PER_PAGE: usize = 100;

const DDRAGON_BASE: &str = "https://ddragon.leagueoflegends.com";

fn encode(segment: &str) -> String {
    urlencoding::encode(segment).into_owned()
}

pub fn account_by_riot_id(region: Region, game_name: &str, tag_line: &str) -> String {
    format!(
        "{}/riot/account/v1/accounts/by-riot-id/{}/{}",
        region.base_url(),
        encode(game_name),
        encode(tag_line)
    )
}

pub fn summoner_by_puuid(platform: Platform, puuid: &str) -> String {
    format!(
        "{}/lol/summoner/v4/summoners/by-puuid/{}",
        platform.base_url(),
        encode(puuid)
    )
}

pub fn match_ids_by_puuid(region: Region, puuid: &str, start: usize, count: usize) -> String {
    format!(
        "{}/lol/match/v5/matches/by-puuid/{}/ids?start={}&count={}",
        region.base_url(),
        encode(puuid),
        start,
        count
    )
}

pub fn match_by_id(region: Region, match_id: &str) -> String {
    format!(
        "{}/lol/match/v5/matches/{}",
        region.base_url(),
        encode(match_id)
    )
}

pub fn active_game_by_summoner(platform: Platform, summoner_id: &str) -> String {
    format!(
        "{}/lol/spectator/v4/active-games/by-summoner/{}",
        platform.base_url(),
        encode(summoner_id)
    )
}

pub fn champion_masteries_by_puuid(platform: Platform, puuid: &str) -> String {
    format!(
        "{}/lol/champion-mastery/v4/champion-masteries/by-puuid/{}",
        platform.base_url(),
        encode(puuid)
    )
}

pub fn ddragon_versions() -> String {
    format!("{}/api/versions.json", DDRAGON_BASE)
}

pub fn ddragon_champions(version: &str, locale: &str) -> String {
    format!(
        "{}/cdn/{}/data/{}/champion.json",
        DDRAGON_BASE, version, locale
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn riot_id_segments_are_encoded() {
        let url = account_by_riot_id(Region::Europe, "Le Conservateur", "3012");
        assert_eq!(
            url,
            "https://europe.api.riotgames.com/riot/account/v1/accounts/by-riot-id/Le%20Conservateur/3012"
        );
    }

    #[test]
    fn match_ids_carry_paging() {
        let url = match_ids_by_puuid(Region::Americas, "abc", 100, 50);
        assert!(url.ends_with("/by-puuid/abc/ids?start=100&count=50"));
    }

    #[test]
    fn champion_catalog_is_versioned_and_localized() {
        assert_eq!(
            ddragon_champions("14.25.1", "en_US"),
            "https://ddragon.leagueoflegends.com/cdn/14.25.1/data/en_US/champion.json"
        );
    }
}
