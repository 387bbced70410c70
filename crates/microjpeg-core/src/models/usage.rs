use serde::{Deserialize, Serialize};

/// Account tier, consumption and limits as reported by `GET usage`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageInfo {
    pub tier: String,
    pub usage: UsageStats,
    pub limits: UsageLimits,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageStats {
    #[serde(default)]
    pub compressions: u64,
    #[serde(default)]
    pub background_removals: u64,
    #[serde(default)]
    pub enhancements: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageLimits {
    #[serde(default)]
    pub compression_limit: u64,
    #[serde(default)]
    pub background_removal_limit: u64,
    #[serde(default)]
    pub enhancement_limit: u64,
}
