use crate::config::Config;
use crate::error::ApiError;
use crate::region::Platform;
use governor::{
    clock::{Clock, DefaultClock},
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use serde::de::DeserializeOwned;
use std::num::NonZeroU32;
use std::thread;
use std::time::Duration;

use super::endpoints;
use super::models::*;
use super::transport::{Transport, UreqTransport};

const MAX_RETRIES: u32 = 3;

pub struct RiotApiClient {
    transport: Box<dyn Transport>,
    api_key: Option<String>,
    rate_limiter: RateLimiter<NotKeyed, InMemoryState, DefaultClock>,
    retry_backoff: Duration,
}

impl RiotApiClient {
    pub fn new(
        transport: Box<dyn Transport>,
        api_key: Option<String>,
        requests_per_second: NonZeroU32,
    ) -> Self {
        RiotApiClient {
            transport,
            api_key,
            rate_limiter: RateLimiter::direct(Quota::per_second(requests_per_second)),
            retry_backoff: Duration::from_millis(2000),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            Box::new(UreqTransport::new(config.request_timeout)),
            config.api_key.clone(),
            config.rate_limit_per_second,
        )
    }

    /// Base delay between 429 retries; the n-th retry waits `n * backoff`.
    pub fn with_retry_backoff(mut self, backoff: Duration) -> Self {
        self.retry_backoff = backoff;
        self
    }

    fn wait_for_quota(&self) {
        while let Err(not_until) = self.rate_limiter.check() {
            thread::sleep(not_until.wait_time_from(self.rate_limiter.clock().now()));
        }
    }

    fn execute_request(&self, url: &str) -> Result<String, ApiError> {
        let api_key = self.api_key.as_deref().ok_or(ApiError::Unauthorized)?;

        let mut retry_count = 0;
        loop {
            self.wait_for_quota();
            tracing::trace!(url, "riot api request");

            let response = self
                .transport
                .get(url, Some(api_key))
                .map_err(|e| ApiError::Transient(format!("network error: {}", e)))?;

            match response.status {
                _ if response.is_success() => return Ok(response.body),
                404 => return Err(ApiError::NotFound(strip_host(url).to_string())),
                401 => return Err(ApiError::Unauthorized),
                429 => {
                    if retry_count >= MAX_RETRIES {
                        return Err(ApiError::Transient("rate limited (HTTP 429)".into()));
                    }
                    retry_count += 1;
                    let wait = self.retry_backoff * retry_count;
                    tracing::warn!(?wait, attempt = retry_count, "rate limited, retrying");
                    thread::sleep(wait);
                }
                status => return Err(ApiError::Transient(format!("HTTP {}", status))),
            }
        }
    }

    /// Unauthenticated GET for the static Data Dragon catalog.
    fn execute_static_request(&self, url: &str) -> Result<String, ApiError> {
        tracing::trace!(url, "ddragon request");
        let response = self
            .transport
            .get(url, None)
            .map_err(|e| ApiError::Transient(format!("network error: {}", e)))?;

        match response.status {
            _ if response.is_success() => Ok(response.body),
            404 => Err(ApiError::NotFound(strip_host(url).to_string())),
            status => Err(ApiError::Transient(format!("HTTP {}", status))),
        }
    }

    fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, ApiError> {
        let body = self.execute_request(url)?;
        parse_json(&body)
    }

    pub fn get_account(
        &self,
        game_name: &str,
        tag_line: &str,
        platform: Platform,
    ) -> Result<AccountDto, ApiError> {
        self.get_json(&endpoints::account_by_riot_id(
            platform.to_region(),
            game_name,
            tag_line,
        ))
    }

    pub fn get_summoner(&self, puuid: &str, platform: Platform) -> Result<SummonerDto, ApiError> {
        self.get_json(&endpoints::summoner_by_puuid(platform, puuid))
    }

    /// Most recent first. Counts above one page are fetched page by page and
    /// stop early once the history runs out.
    pub fn get_match_ids(
        &self,
        puuid: &str,
        platform: Platform,
        count: usize,
    ) -> Result<Vec<String>, ApiError> {
        let region = platform.to_region();
        let mut ids: Vec<String> = Vec::with_capacity(count);

        while ids.len() < count {
            let page_size = (count - ids.len()).min(endpoints::MAX_MATCH_IDS_PER_PAGE);
            let page: Vec<String> = self.get_json(&endpoints::match_ids_by_puuid(
                region,
                puuid,
                ids.len(),
                page_size,
            ))?;

            let exhausted = page.len() < page_size;
            ids.extend(page);
            if exhausted {
                break;
            }
        }

        ids.truncate(count);
        Ok(ids)
    }

    pub fn get_match(&self, match_id: &str, platform: Platform) -> Result<MatchDto, ApiError> {
        self.get_json(&endpoints::match_by_id(platform.to_region(), match_id))
    }

    pub fn get_active_game(
        &self,
        summoner_id: &str,
        platform: Platform,
    ) -> Result<CurrentGameInfoDto, ApiError> {
        self.get_json(&endpoints::active_game_by_summoner(platform, summoner_id))
    }

    /// Ordered as the mastery service reports them (highest points first).
    pub fn get_champion_masteries(
        &self,
        puuid: &str,
        platform: Platform,
    ) -> Result<Vec<ChampionMasteryDto>, ApiError> {
        self.get_json(&endpoints::champion_masteries_by_puuid(platform, puuid))
    }

    pub fn get_latest_version(&self) -> Result<String, ApiError> {
        let body = self.execute_static_request(&endpoints::ddragon_versions())?;
        let versions: Vec<String> = parse_json(&body)?;
        versions
            .into_iter()
            .next()
            .ok_or_else(|| ApiError::Transient("empty Data Dragon version list".into()))
    }

    pub fn get_champion_data(
        &self,
        version: &str,
        locale: &str,
    ) -> Result<DataDragonChampions, ApiError> {
        let body = self.execute_static_request(&endpoints::ddragon_champions(version, locale))?;
        parse_json(&body)
    }
}

fn parse_json<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::Transient(format!("malformed payload: {}", e)))
}

fn strip_host(url: &str) -> &str {
    url.find(".com/")
        .map(|idx| &url[idx + 4..])
        .unwrap_or(url)
}
