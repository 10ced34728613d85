//! Canonical influencer attribute names.
//!
//! These are the keys a column mapping is expressed in, and the names used in
//! per-row error messages (`"followers must be a number"`).

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    Name,
    Platform,
    Handle,
    ProfileUrl,
    Country,
    City,
    Languages,
    Followers,
    AvgLikes,
    AvgComments,
    AvgShares,
    EngagementRate,
    MainCategory,
    SubCategories,
    CollabTypes,
    BasePriceText,
    ContactEmail,
    ContactDm,
    Status,
    Tags,
    NotesSummary,
}

impl Field {
    pub const ALL: [Field; 21] = [
        Field::Name,
        Field::Platform,
        Field::Handle,
        Field::ProfileUrl,
        Field::Country,
        Field::City,
        Field::Languages,
        Field::Followers,
        Field::AvgLikes,
        Field::AvgComments,
        Field::AvgShares,
        Field::EngagementRate,
        Field::MainCategory,
        Field::SubCategories,
        Field::CollabTypes,
        Field::BasePriceText,
        Field::ContactEmail,
        Field::ContactDm,
        Field::Status,
        Field::Tags,
        Field::NotesSummary,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Platform => "platform",
            Field::Handle => "handle",
            Field::ProfileUrl => "profileUrl",
            Field::Country => "country",
            Field::City => "city",
            Field::Languages => "languages",
            Field::Followers => "followers",
            Field::AvgLikes => "avgLikes",
            Field::AvgComments => "avgComments",
            Field::AvgShares => "avgShares",
            Field::EngagementRate => "engagementRate",
            Field::MainCategory => "mainCategory",
            Field::SubCategories => "subCategories",
            Field::CollabTypes => "collabTypes",
            Field::BasePriceText => "basePriceText",
            Field::ContactEmail => "contactEmail",
            Field::ContactDm => "contactDm",
            Field::Status => "status",
            Field::Tags => "tags",
            Field::NotesSummary => "notesSummary",
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Field {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Field::ALL
            .iter()
            .copied()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| CoreError::UnknownField(s.to_string()))
    }
}
