use crate::error::AppError;
use crate::region::Platform;
use std::env;
use std::num::NonZeroU32;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_REGION: &str = "na1";
const DEFAULT_CONCURRENCY: usize = 5;
const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_RATE_LIMIT_PER_SECOND: u32 = 20;
const DEFAULT_CHAMPION_SAMPLE_SIZE: usize = 5;
const DEFAULT_CHAMPION_POOL_MULTIPLIER: usize = 10;
const DEFAULT_MASTERY_CHAMPIONS: usize = 5;
const DEFAULT_DDRAGON_LOCALE: &str = "en_US";
const DEFAULT_EXPORT_PATH: &str = "match_history.csv";

#[derive(Debug, Clone)]
pub struct Config {
    /// Riot API key. `None` makes every authenticated call fail as unauthorized.
    pub api_key: Option<String>,
    pub platform: Platform,
    pub concurrency: usize,
    pub request_timeout: Duration,
    pub rate_limit_per_second: NonZeroU32,
    pub champion_sample_size: usize,
    pub champion_pool_multiplier: usize,
    pub mastery_champions: usize,
    pub ddragon_version: Option<String>,
    pub ddragon_locale: String,
    pub export_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_key: None,
            platform: Platform::NA1,
            concurrency: DEFAULT_CONCURRENCY,
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            rate_limit_per_second: NonZeroU32::new(DEFAULT_RATE_LIMIT_PER_SECOND)
                .unwrap_or(NonZeroU32::MIN),
            champion_sample_size: DEFAULT_CHAMPION_SAMPLE_SIZE,
            champion_pool_multiplier: DEFAULT_CHAMPION_POOL_MULTIPLIER,
            mastery_champions: DEFAULT_MASTERY_CHAMPIONS,
            ddragon_version: None,
            ddragon_locale: DEFAULT_DDRAGON_LOCALE.to_string(),
            export_path: PathBuf::from(DEFAULT_EXPORT_PATH),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let api_key = env::var("RIOT_API_KEY")
            .ok()
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty());

        if api_key.is_none() {
            tracing::warn!("RIOT_API_KEY is not set, Riot API calls will be rejected");
        }

        let platform = env::var("RIOT_REGION")
            .unwrap_or_else(|_| DEFAULT_REGION.to_string())
            .parse::<Platform>()
            .map_err(|e| AppError::ConfigError(format!("RIOT_REGION: {}", e)))?;

        let rate_limit_per_second = parse_var("RIOT_RATE_LIMIT_PER_SECOND")
            .and_then(NonZeroU32::new)
            .unwrap_or_else(|| {
                NonZeroU32::new(DEFAULT_RATE_LIMIT_PER_SECOND).unwrap_or(NonZeroU32::MIN)
            });

        Ok(Config {
            api_key,
            platform,
            concurrency: parse_var("MATCH_FETCH_CONCURRENCY")
                .unwrap_or(DEFAULT_CONCURRENCY)
                .max(1),
            request_timeout: Duration::from_secs(
                parse_var("REQUEST_TIMEOUT_SECS").unwrap_or(DEFAULT_TIMEOUT_SECS),
            ),
            rate_limit_per_second,
            champion_sample_size: parse_var("CHAMPION_SAMPLE_SIZE")
                .unwrap_or(DEFAULT_CHAMPION_SAMPLE_SIZE)
                .max(1),
            champion_pool_multiplier: parse_var("CHAMPION_POOL_MULTIPLIER")
                .unwrap_or(DEFAULT_CHAMPION_POOL_MULTIPLIER)
                .max(1),
            mastery_champions: parse_var("MASTERY_CHAMPIONS").unwrap_or(DEFAULT_MASTERY_CHAMPIONS),
            ddragon_version: env::var("DDRAGON_VERSION").ok().filter(|v| !v.is_empty()),
            ddragon_locale: env::var("DDRAGON_LOCALE")
                .unwrap_or_else(|_| DEFAULT_DDRAGON_LOCALE.to_string()),
            export_path: env::var("MATCH_EXPORT_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_EXPORT_PATH)),
        })
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}
