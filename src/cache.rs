use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use chrono::{DateTime, Duration, Utc};
use crate::api::models::DataDragonChampions;
use crate::api::RiotApiClient;
use crate::error::AppError;

const MAX_CATALOG_AGE_DAYS: i64 = 7;

/// Champion id → display name for one Data Dragon version and locale.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct ChampionCatalog {
    pub version: String,
    pub locale: String,
    pub fetched_at: DateTime<Utc>,
    pub names: HashMap<i64, String>,
}

impl ChampionCatalog {
    pub fn from_ddragon(data: DataDragonChampions, version: &str, locale: &str) -> Self {
        let names = data
            .data
            .into_values()
            .filter_map(|champ| match champ.key.parse::<i64>() {
                Ok(id) => Some((id, champ.name)),
                Err(_) => {
                    tracing::debug!(champion = %champ.id, key = %champ.key, "non-numeric champion key");
                    None
                }
            })
            .collect();

        ChampionCatalog {
            version: version.to_string(),
            locale: locale.to_string(),
            fetched_at: Utc::now(),
            names,
        }
    }

    pub fn name_of(&self, champion_id: i64) -> String {
        self.names
            .get(&champion_id)
            .cloned()
            .unwrap_or_else(|| format!("Champion {}", champion_id))
    }

    pub fn is_stale(&self, max_age: Duration) -> bool {
        Utc::now().signed_duration_since(self.fetched_at) > max_age
    }

    pub fn default_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".league_insight")
    }

    pub fn cache_path(dir: &Path, version: &str, locale: &str) -> PathBuf {
        dir.join(format!("champions_{}_{}.json", version, locale))
    }

    /// `Ok(None)` when nothing is cached for this version and locale yet.
    pub fn load(dir: &Path, version: &str, locale: &str) -> Result<Option<Self>, AppError> {
        let path = Self::cache_path(dir, version, locale);

        match fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).map(Some).map_err(|e| {
                AppError::CacheError(format!("Failed to parse {}: {}", path.display(), e))
            }),
            Err(_) => Ok(None),
        }
    }

    pub fn save(&self, dir: &Path) -> Result<(), AppError> {
        fs::create_dir_all(dir)
            .map_err(|e| AppError::CacheError(format!("Failed to create cache dir: {}", e)))?;

        let path = Self::cache_path(dir, &self.version, &self.locale);
        let json = serde_json::to_string_pretty(self).map_err(|e| {
            AppError::CacheError(format!("Failed to serialize catalog: {}", e))
        })?;

        fs::write(&path, json).map_err(|e| {
            AppError::CacheError(format!("Failed to write {}: {}", path.display(), e))
        })?;

        Ok(())
    }

    /// Cached catalog when fresh, otherwise downloaded and written back.
    /// `version = None` resolves the latest Data Dragon version first.
    pub fn load_or_fetch(
        client: &RiotApiClient,
        dir: &Path,
        version: Option<&str>,
        locale: &str,
        refresh: bool,
    ) -> Result<Self, AppError> {
        let version = match version {
            Some(v) => v.to_string(),
            None => client.get_latest_version()?,
        };

        if !refresh {
            match Self::load(dir, &version, locale) {
                Ok(Some(cached)) if !cached.is_stale(Duration::days(MAX_CATALOG_AGE_DAYS)) => {
                    tracing::debug!(%version, "champion catalog served from cache");
                    return Ok(cached);
                }
                Ok(_) => {}
                Err(e) => tracing::warn!(error = %e, "ignoring unreadable catalog cache"),
            }
        }

        let data = client.get_champion_data(&version, locale)?;
        let catalog = Self::from_ddragon(data, &version, locale);

        if let Err(e) = catalog.save(dir) {
            tracing::warn!(error = %e, "could not cache champion catalog");
        }

        Ok(catalog)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockTransport;
    use std::num::NonZeroU32;
    use std::sync::Arc;
    use tempfile::tempdir;

    const CHAMPIONS: &str = r#"{
        "version": "14.25.1",
        "data": {
            "Annie": {"id": "Annie", "name": "Annie", "key": "1"},
            "MonkeyKing": {"id": "MonkeyKing", "name": "Wukong", "key": "62"}
        }
    }"#;

    #[test]
    fn catalog_maps_numeric_keys_to_names() {
        let data: DataDragonChampions = serde_json::from_str(CHAMPIONS).unwrap();
        let catalog = ChampionCatalog::from_ddragon(data, "14.25.1", "en_US");

        assert_eq!(catalog.name_of(62), "Wukong");
        assert_eq!(catalog.name_of(1), "Annie");
        assert_eq!(catalog.name_of(9999), "Champion 9999");
    }

    #[test]
    fn saved_catalog_reloads() {
        let dir = tempdir().unwrap();
        let data: DataDragonChampions = serde_json::from_str(CHAMPIONS).unwrap();
        let catalog = ChampionCatalog::from_ddragon(data, "14.25.1", "en_US");
        catalog.save(dir.path()).unwrap();

        let loaded = ChampionCatalog::load(dir.path(), "14.25.1", "en_US")
            .unwrap()
            .expect("catalog should be cached");
        assert_eq!(loaded.names, catalog.names);
        assert!(ChampionCatalog::load(dir.path(), "14.24.1", "en_US").unwrap().is_none());
    }

    #[test]
    fn fresh_cache_avoids_download() {
        let dir = tempdir().unwrap();
        let transport = Arc::new(
            MockTransport::new()
                .with_json("/api/versions.json", r#"["14.25.1"]"#)
                .with_json("/cdn/14.25.1/data/en_US/champion.json", CHAMPIONS),
        );
        let client = RiotApiClient::new(
            Box::new(transport.clone()),
            Some("TEST_KEY".into()),
            NonZeroU32::new(1000).unwrap(),
        );

        let first = ChampionCatalog::load_or_fetch(&client, dir.path(), None, "en_US", false).unwrap();
        let second = ChampionCatalog::load_or_fetch(&client, dir.path(), None, "en_US", false).unwrap();

        assert_eq!(first.names, second.names);
        assert_eq!(transport.request_count("champion.json"), 1);
        assert_eq!(transport.request_count("versions.json"), 2);
    }

    #[test]
    fn old_catalog_is_stale() {
        let mut catalog = ChampionCatalog {
            version: "1".into(),
            locale: "en_US".into(),
            fetched_at: Utc::now(),
            names: HashMap::new(),
        };
        assert!(!catalog.is_stale(Duration::days(7)));
        catalog.fetched_at = Utc::now() - Duration::days(8);
        assert!(catalog.is_stale(Duration::days(7)));
    }
}
