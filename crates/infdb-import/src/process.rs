//! Per-row coercion and validation.
//!
//! [`process_row`] is pure: it reads one [`Row`] and decides whether it
//! becomes a [`NewInfluencer`] or a list of field errors. Persistence is the
//! batch importer's job.

use infdb_core::{Field, InfluencerStatus, NewInfluencer, Platform};
use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use crate::columns::ColumnMapping;
use crate::derive::{derive_engagement_rate, derive_handle, round_rate};
use crate::dictionary::Dictionary;
use crate::number::{parse_decimal, parse_korean_number};
use crate::platform::normalize_platform;
use crate::row::{extract_field, Row};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("{0} is required")]
    Required(Field),
    #[error("Invalid platform: {0}")]
    InvalidPlatform(String),
    #[error("Invalid status: {0}")]
    InvalidStatus(String),
    #[error("{0} must be a number")]
    NotANumber(Field),
}

#[derive(Debug, Clone, PartialEq)]
pub enum RowOutcome {
    Accepted(Box<NewInfluencer>),
    Rejected(Vec<FieldError>),
}

impl RowOutcome {
    /// Field errors joined with `"; "`, or `None` for an accepted row.
    #[must_use]
    pub fn message(&self) -> Option<String> {
        match self {
            RowOutcome::Accepted(_) => None,
            RowOutcome::Rejected(errors) => Some(
                errors
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("; "),
            ),
        }
    }
}

/// Reads fields out of one row, accumulating errors instead of stopping at
/// the first one.
struct Extractor<'a> {
    row: &'a Row,
    mapping: &'a ColumnMapping,
    dict: &'a Dictionary,
    errors: Vec<FieldError>,
}

impl<'a> Extractor<'a> {
    fn raw(&self, field: Field) -> Option<&'a str> {
        extract_field(
            self.row,
            field,
            self.mapping.get(field),
            self.dict.alternatives(field),
        )
    }

    fn text(&self, field: Field) -> Option<String> {
        self.raw(field).map(str::to_string)
    }

    fn list(&self, field: Field) -> Vec<String> {
        self.raw(field).map(split_list).unwrap_or_default()
    }

    fn count(&mut self, field: Field) -> Option<i64> {
        let raw = self.raw(field)?;
        match parse_korean_number(raw) {
            Some(n) if n >= 0 => Some(n),
            _ => {
                self.errors.push(FieldError::NotANumber(field));
                None
            }
        }
    }

    fn rate(&mut self) -> Option<Decimal> {
        let raw = self.raw(Field::EngagementRate)?;
        match parse_decimal(raw) {
            Some(rate) if !rate.is_sign_negative() => Some(round_rate(rate)),
            _ => {
                self.errors.push(FieldError::NotANumber(Field::EngagementRate));
                None
            }
        }
    }

    fn required(&mut self, field: Field) -> Option<&'a str> {
        let value = self.raw(field);
        if value.is_none() {
            self.errors.push(FieldError::Required(field));
        }
        value
    }

    fn platform(&mut self) -> Option<Platform> {
        let raw = self.required(Field::Platform)?;
        match normalize_platform(self.dict, raw) {
            Ok(platform) => Some(platform),
            Err(invalid) => {
                self.errors.push(FieldError::InvalidPlatform(invalid.to_string()));
                None
            }
        }
    }

    fn status(&mut self) -> InfluencerStatus {
        let Some(raw) = self.raw(Field::Status) else {
            return InfluencerStatus::default();
        };
        raw.to_lowercase().parse().unwrap_or_else(|_| {
            self.errors.push(FieldError::InvalidStatus(raw.to_string()));
            InfluencerStatus::default()
        })
    }
}

/// Splits a list cell on `,` or `;`, trimming tokens and dropping empty
/// ones. Order and duplicates are preserved.
fn split_list(raw: &str) -> Vec<String> {
    raw.split([',', ';'])
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

/// Coerces and validates one row.
///
/// `name` and `platform` are required; every other field is optional. All
/// field errors are collected so one rejection reports every problem in the
/// row. A missing handle or engagement rate is derived after extraction.
#[must_use]
pub fn process_row(
    row: &Row,
    mapping: &ColumnMapping,
    dict: &Dictionary,
    created_by: Uuid,
) -> RowOutcome {
    let mut ex = Extractor {
        row,
        mapping,
        dict,
        errors: Vec::new(),
    };

    let name = ex.required(Field::Name);
    let platform = ex.platform();

    let handle = ex.text(Field::Handle);
    let profile_url = ex.text(Field::ProfileUrl);
    let country = ex.text(Field::Country);
    let city = ex.text(Field::City);
    let languages = ex.list(Field::Languages);
    let followers = ex.count(Field::Followers);
    let avg_likes = ex.count(Field::AvgLikes);
    let avg_comments = ex.count(Field::AvgComments);
    let avg_shares = ex.count(Field::AvgShares);
    let engagement_rate = ex.rate();
    let main_category = ex.text(Field::MainCategory);
    let sub_categories = ex.list(Field::SubCategories);
    let collab_types = ex.list(Field::CollabTypes);
    let base_price_text = ex.text(Field::BasePriceText);
    let contact_email = ex.text(Field::ContactEmail);
    let contact_dm = ex.text(Field::ContactDm);
    let status = ex.status();
    let tags = ex.list(Field::Tags);
    let notes_summary = ex.text(Field::NotesSummary);

    let (Some(name), Some(platform), true) = (name, platform, ex.errors.is_empty()) else {
        return RowOutcome::Rejected(ex.errors);
    };

    let handle = handle.unwrap_or_else(|| derive_handle(profile_url.as_deref(), name));
    let engagement_rate = engagement_rate
        .or_else(|| derive_engagement_rate(followers, avg_likes, avg_comments, avg_shares));

    RowOutcome::Accepted(Box::new(NewInfluencer {
        name: name.to_string(),
        platform,
        handle,
        profile_url,
        country,
        city,
        languages,
        followers,
        avg_likes,
        avg_comments,
        avg_shares,
        engagement_rate,
        main_category,
        sub_categories,
        collab_types,
        base_price_text,
        contact_email,
        contact_dm,
        status,
        tags,
        notes_summary,
        created_by,
    }))
}

#[cfg(test)]
#[path = "process_test.rs"]
mod tests;
