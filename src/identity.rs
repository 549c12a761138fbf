//! Riot ID → account id (PUUID) → region-scoped summoner id.

use std::fmt;

use crate::api::RiotApiClient;
use crate::error::ApiError;
use crate::region::Platform;

/// A player as typed by the user: `display_name#tag_line` on a platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerIdentity {
    pub display_name: String,
    pub tag_line: String,
    pub platform: Platform,
}

impl PlayerIdentity {
    pub fn new(display_name: &str, tag_line: &str, platform: Platform) -> Self {
        PlayerIdentity {
            display_name: display_name.trim().to_string(),
            tag_line: tag_line.trim().trim_start_matches('#').to_string(),
            platform,
        }
    }
}

impl fmt::Display for PlayerIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{} ({})", self.display_name, self.tag_line, self.platform)
    }
}

/// Provider-stable player id (PUUID), unaffected by renames.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AccountId(pub String);

impl AccountId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Region-scoped summoner id used by the spectator endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SummonerId(pub String);

impl SummonerId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

pub fn resolve_account(
    client: &RiotApiClient,
    identity: &PlayerIdentity,
) -> Result<AccountId, ApiError> {
    let account = client
        .get_account(&identity.display_name, &identity.tag_line, identity.platform)
        .map_err(|e| match e {
            ApiError::NotFound(_) => ApiError::NotFound(format!(
                "no account for {}#{}",
                identity.display_name, identity.tag_line
            )),
            other => other,
        })?;

    tracing::debug!(player = %identity, "account resolved");
    Ok(AccountId(account.puuid))
}

pub fn resolve_summoner(
    client: &RiotApiClient,
    account: &AccountId,
    platform: Platform,
) -> Result<SummonerId, ApiError> {
    let summoner = client
        .get_summoner(account.as_str(), platform)
        .map_err(|e| match e {
            ApiError::NotFound(_) => {
                ApiError::NotFound(format!("no summoner on {} for this account", platform))
            }
            other => other,
        })?;

    if summoner.id.is_empty() {
        return Err(ApiError::NotFound(format!(
            "summoner on {} has no summoner id",
            platform
        )));
    }

    Ok(SummonerId(summoner.id))
}
