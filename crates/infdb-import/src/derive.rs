//! Values computed from other fields when a row leaves them blank.

use rust_decimal::{Decimal, RoundingStrategy};
use url::Url;

/// What a profile URL yields as a handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileHandle {
    Parsed(String),
    /// Valid URL whose path has no usable segment.
    NoPath,
    NotAUrl,
}

/// Takes the last non-empty path segment of `profile_url`, without a leading
/// `@`. `https://instagram.com/@jane/` yields `jane`.
#[must_use]
pub fn handle_from_profile_url(profile_url: &str) -> ProfileHandle {
    let Ok(url) = Url::parse(profile_url) else {
        return ProfileHandle::NotAUrl;
    };

    let segment = url
        .path_segments()
        .and_then(|mut segments| segments.rfind(|s| !s.is_empty()))
        .map(|s| s.trim_start_matches('@'))
        .filter(|s| !s.is_empty());

    match segment {
        Some(handle) => ProfileHandle::Parsed(handle.to_string()),
        None => ProfileHandle::NoPath,
    }
}

/// Handle used when the row does not supply one: the profile URL's last path
/// segment, else the name lower-cased with whitespace removed, else `"user"`.
#[must_use]
pub fn derive_handle(profile_url: Option<&str>, name: &str) -> String {
    if let Some(ProfileHandle::Parsed(handle)) = profile_url.map(handle_from_profile_url) {
        return handle;
    }

    let compact: String = name
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect();
    if compact.is_empty() {
        "user".to_string()
    } else {
        compact
    }
}

/// Rounds a rate to two decimal places, halves away from zero, always keeping
/// a scale of two so it renders as e.g. `5.00`.
#[must_use]
pub fn round_rate(rate: Decimal) -> Decimal {
    let mut rounded = rate.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded
}

/// `(likes + comments + shares) / followers × 100`, missing counts taken as
/// zero. `None` when followers is absent or zero, or when the sum is zero.
#[must_use]
pub fn derive_engagement_rate(
    followers: Option<i64>,
    avg_likes: Option<i64>,
    avg_comments: Option<i64>,
    avg_shares: Option<i64>,
) -> Option<Decimal> {
    let followers = followers.filter(|&f| f > 0)?;
    let interactions = [avg_likes, avg_comments, avg_shares]
        .into_iter()
        .flatten()
        .map(i128::from)
        .sum::<i128>();
    if interactions == 0 {
        return None;
    }

    let rate = Decimal::from_i128_with_scale(interactions, 0)
        .checked_mul(Decimal::ONE_HUNDRED)?
        .checked_div(Decimal::from(followers))?;
    Some(round_rate(rate))
}
