//! Provider status detection
//!
//! Classifies the chain query service by how far its tip trails wall-clock time.

use serde::{Deserialize, Serialize};

use crate::responses::ChainTip;

/// Tip older than this is considered lagging
const MAX_TIP_AGE_SECS: u64 = 600;

/// Status tier based on tip freshness
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum StatusTier {
    /// Tip within ten minutes of now
    Synced,
    /// Reachable but the tip is stale
    Lagging,
    /// Not reachable
    Offline,
}

impl StatusTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Synced => "Synced",
            Self::Lagging => "Lagging",
            Self::Offline => "Offline",
        }
    }
}

/// Provider status detected through `/tip`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderStatus {
    pub is_online: bool,
    pub tip_height: Option<u64>,
    pub tip_time: Option<u64>,
    /// Seconds between the tip block and the check
    pub tip_age_secs: Option<u64>,
    pub tier: StatusTier,
}

impl ProviderStatus {
    pub fn offline() -> Self {
        Self {
            is_online: false,
            tip_height: None,
            tip_time: None,
            tip_age_secs: None,
            tier: StatusTier::Offline,
        }
    }

    /// Build from a tip observed at unix time `now`
    pub fn from_tip(tip: &ChainTip, now: u64) -> Self {
        let age = now.saturating_sub(tip.block_time);
        let tier = if age <= MAX_TIP_AGE_SECS {
            StatusTier::Synced
        } else {
            StatusTier::Lagging
        };
        Self {
            is_online: true,
            tip_height: Some(tip.block_height),
            tip_time: Some(tip.block_time),
            tip_age_secs: Some(age),
            tier,
        }
    }

    pub fn is_synced(&self) -> bool {
        self.tier == StatusTier::Synced
    }
}
