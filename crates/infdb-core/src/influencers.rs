use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Instagram,
    Youtube,
    Tiktok,
    Threads,
    Other,
}

impl Platform {
    pub const ALL: [Platform; 5] = [
        Platform::Instagram,
        Platform::Youtube,
        Platform::Tiktok,
        Platform::Threads,
        Platform::Other,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Platform::Instagram => "instagram",
            Platform::Youtube => "youtube",
            Platform::Tiktok => "tiktok",
            Platform::Threads => "threads",
            Platform::Other => "other",
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses only the canonical lower-case token. Aliases such as "인스타" are
/// resolved by the import pipeline's platform normalizer, not here.
impl FromStr for Platform {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Platform::ALL
            .iter()
            .copied()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| CoreError::InvalidPlatform(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InfluencerStatus {
    #[default]
    Candidate,
    Active,
    Blacklist,
}

impl InfluencerStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            InfluencerStatus::Candidate => "candidate",
            InfluencerStatus::Active => "active",
            InfluencerStatus::Blacklist => "blacklist",
        }
    }
}

impl std::fmt::Display for InfluencerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InfluencerStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "candidate" => Ok(InfluencerStatus::Candidate),
            "active" => Ok(InfluencerStatus::Active),
            "blacklist" => Ok(InfluencerStatus::Blacklist),
            other => Err(CoreError::InvalidStatus(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    Staff,
}

impl UserRole {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Staff => "staff",
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(UserRole::Admin),
            "staff" => Ok(UserRole::Staff),
            other => Err(CoreError::InvalidRole(other.to_string())),
        }
    }
}

/// A fully validated influencer record ready to be inserted.
///
/// Identity and timestamps are assigned by the store.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewInfluencer {
    pub name: String,
    pub platform: Platform,
    pub handle: String,
    pub profile_url: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub languages: Vec<String>,
    pub followers: Option<i64>,
    pub avg_likes: Option<i64>,
    pub avg_comments: Option<i64>,
    pub avg_shares: Option<i64>,
    pub engagement_rate: Option<Decimal>,
    pub main_category: Option<String>,
    pub sub_categories: Vec<String>,
    pub collab_types: Vec<String>,
    pub base_price_text: Option<String>,
    pub contact_email: Option<String>,
    pub contact_dm: Option<String>,
    pub status: InfluencerStatus,
    pub tags: Vec<String>,
    pub notes_summary: Option<String>,
    pub created_by: Uuid,
}
