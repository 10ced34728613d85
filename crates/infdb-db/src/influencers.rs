//! Database operations for the `influencers` table: insert, lookup, filtered
//! listing, sparse update, delete, and the dashboard/export read models.

use chrono::{DateTime, Utc};
use infdb_core::{InfluencerStatus, NewInfluencer, Platform};
use rust_decimal::Decimal;
use sqlx::postgres::Postgres;
use sqlx::query_builder::{QueryBuilder, Separated};
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

/// Hard cap on rows returned by [`export_influencers`].
pub const EXPORT_ROW_LIMIT: i64 = 10_000;

const DASHBOARD_RECENT_LIMIT: i64 = 10;
const DASHBOARD_TOP_CATEGORIES: i64 = 3;

const COLUMNS: &str = "id, name, platform, handle, profile_url, country, city, languages, \
     followers, avg_likes, avg_comments, avg_shares, engagement_rate, main_category, \
     sub_categories, collab_types, base_price_text, contact_email, contact_dm, status, tags, \
     notes_summary, created_by, created_at, updated_at";

// ---------------------------------------------------------------------------
// Row and parameter types
// ---------------------------------------------------------------------------

/// A row from the `influencers` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct InfluencerRow {
    pub id: Uuid,
    pub name: String,
    pub platform: String,
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
    pub status: String,
    pub tags: Vec<String>,
    pub notes_summary: Option<String>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// AND-combined listing filters. Empty vectors and `None` mean "no
/// constraint".
#[derive(Debug, Clone, Default)]
pub struct InfluencerFilters {
    pub search: Option<String>,
    pub platforms: Vec<String>,
    pub countries: Vec<String>,
    pub cities: Vec<String>,
    pub main_categories: Vec<String>,
    pub statuses: Vec<String>,
    pub collab_types: Vec<String>,
    pub tags: Vec<String>,
    pub followers_min: Option<i64>,
    pub followers_max: Option<i64>,
    pub avg_likes_min: Option<i64>,
    pub avg_likes_max: Option<i64>,
    pub engagement_rate_min: Option<Decimal>,
    pub engagement_rate_max: Option<Decimal>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortField {
    Followers,
    EngagementRate,
    #[default]
    CreatedAt,
}

impl SortField {
    /// Unknown or missing values fall back to `created_at`.
    #[must_use]
    pub fn from_param(value: Option<&str>) -> Self {
        match value {
            Some("followers") => SortField::Followers,
            Some("engagement_rate") => SortField::EngagementRate,
            _ => SortField::CreatedAt,
        }
    }

    fn column(self) -> &'static str {
        match self {
            SortField::Followers => "followers",
            SortField::EngagementRate => "engagement_rate",
            SortField::CreatedAt => "created_at",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    /// Unknown or missing values fall back to descending.
    #[must_use]
    pub fn from_param(value: Option<&str>) -> Self {
        match value {
            Some("asc") => SortDirection::Asc,
            _ => SortDirection::Desc,
        }
    }

    fn keyword(self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone)]
pub struct InfluencerPage {
    pub items: Vec<InfluencerRow>,
    pub total: i64,
}

/// Sparse update. `None` keeps the column; `Some(None)` clears a nullable
/// column; list fields are replaced wholesale.
#[derive(Debug, Clone, Default)]
pub struct InfluencerUpdate {
    pub name: Option<String>,
    pub platform: Option<Platform>,
    pub handle: Option<String>,
    pub profile_url: Option<Option<String>>,
    pub country: Option<Option<String>>,
    pub city: Option<Option<String>>,
    pub languages: Option<Vec<String>>,
    pub followers: Option<Option<i64>>,
    pub avg_likes: Option<Option<i64>>,
    pub avg_comments: Option<Option<i64>>,
    pub avg_shares: Option<Option<i64>>,
    pub engagement_rate: Option<Option<Decimal>>,
    pub main_category: Option<Option<String>>,
    pub sub_categories: Option<Vec<String>>,
    pub collab_types: Option<Vec<String>>,
    pub base_price_text: Option<Option<String>>,
    pub contact_email: Option<Option<String>>,
    pub contact_dm: Option<Option<String>>,
    pub status: Option<InfluencerStatus>,
    pub tags: Option<Vec<String>>,
    pub notes_summary: Option<Option<String>>,
}

/// Distinct values present in the store, each sorted, for filter dropdowns.
#[derive(Debug, Clone, Default)]
pub struct FilterOptions {
    pub platforms: Vec<String>,
    pub countries: Vec<String>,
    pub cities: Vec<String>,
    pub main_categories: Vec<String>,
    pub collab_types: Vec<String>,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PlatformCount {
    pub platform: String,
    pub count: i64,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CategoryCount {
    pub main_category: String,
    pub count: i64,
}

#[derive(Debug, Clone)]
pub struct DashboardStats {
    pub total: i64,
    pub by_platform: Vec<PlatformCount>,
    pub top_categories: Vec<CategoryCount>,
    pub created_last_30_days: i64,
    pub recent: Vec<InfluencerRow>,
}

// ---------------------------------------------------------------------------
// Query building
// ---------------------------------------------------------------------------

/// `%term%` for ILIKE with the pattern metacharacters escaped.
fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

fn non_empty(values: &[String]) -> Option<Vec<String>> {
    (!values.is_empty()).then(|| values.to_vec())
}

/// Appends ` WHERE ...` for `filters` to `qb`.
fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, filters: &InfluencerFilters) {
    qb.push(" WHERE TRUE");

    if let Some(term) = filters.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        let pattern = like_pattern(term);
        qb.push(" AND (name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR handle ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR notes_summary ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR array_to_string(tags, ' ') ILIKE ")
            .push_bind(pattern)
            .push(")");
    }

    for (column, values) in [
        ("platform", &filters.platforms),
        ("country", &filters.countries),
        ("city", &filters.cities),
        ("main_category", &filters.main_categories),
        ("status", &filters.statuses),
    ] {
        if let Some(values) = non_empty(values) {
            qb.push(format_args!(" AND {column} = ANY("))
                .push_bind(values)
                .push(")");
        }
    }

    for (column, values) in [("collab_types", &filters.collab_types), ("tags", &filters.tags)] {
        if let Some(values) = non_empty(values) {
            qb.push(format_args!(" AND {column} && "))
                .push_bind(values)
                .push("::TEXT[]");
        }
    }

    for (column, min, max) in [
        ("followers", filters.followers_min, filters.followers_max),
        ("avg_likes", filters.avg_likes_min, filters.avg_likes_max),
    ] {
        if let Some(min) = min {
            qb.push(format_args!(" AND {column} >= ")).push_bind(min);
        }
        if let Some(max) = max {
            qb.push(format_args!(" AND {column} <= ")).push_bind(max);
        }
    }

    if let Some(min) = filters.engagement_rate_min {
        qb.push(" AND engagement_rate >= ").push_bind(min);
    }
    if let Some(max) = filters.engagement_rate_max {
        qb.push(" AND engagement_rate <= ").push_bind(max);
    }
}

fn set_column<'args, T>(
    set: &mut Separated<'_, 'args, Postgres, &'static str>,
    column: &str,
    value: T,
)
where
    T: 'args + sqlx::Encode<'args, Postgres> + sqlx::Type<Postgres> + Send,
{
    set.push(format_args!("{column} = "));
    set.push_bind_unseparated(value);
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Inserts a validated record and returns the created row.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails, including check-constraint
/// violations.
pub async fn insert_influencer(
    pool: &PgPool,
    record: &NewInfluencer,
) -> Result<InfluencerRow, DbError> {
    let row = sqlx::query_as::<_, InfluencerRow>(&format!(
        "INSERT INTO influencers \
           (name, platform, handle, profile_url, country, city, languages, followers, \
            avg_likes, avg_comments, avg_shares, engagement_rate, main_category, \
            sub_categories, collab_types, base_price_text, contact_email, contact_dm, \
            status, tags, notes_summary, created_by) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, \
                 $17, $18, $19, $20, $21, $22) \
         RETURNING {COLUMNS}"
    ))
    .bind(&record.name)
    .bind(record.platform.as_str())
    .bind(&record.handle)
    .bind(&record.profile_url)
    .bind(&record.country)
    .bind(&record.city)
    .bind(&record.languages)
    .bind(record.followers)
    .bind(record.avg_likes)
    .bind(record.avg_comments)
    .bind(record.avg_shares)
    .bind(record.engagement_rate)
    .bind(&record.main_category)
    .bind(&record.sub_categories)
    .bind(&record.collab_types)
    .bind(&record.base_price_text)
    .bind(&record.contact_email)
    .bind(&record.contact_dm)
    .bind(record.status.as_str())
    .bind(&record.tags)
    .bind(&record.notes_summary)
    .bind(record.created_by)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_influencer(pool: &PgPool, id: Uuid) -> Result<Option<InfluencerRow>, DbError> {
    let row = sqlx::query_as::<_, InfluencerRow>(&format!(
        "SELECT {COLUMNS} FROM influencers WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Returns one page of influencers matching `filters` plus the total match
/// count. `page` is 1-based.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if either query fails.
pub async fn list_influencers(
    pool: &PgPool,
    filters: &InfluencerFilters,
    sort: SortField,
    direction: SortDirection,
    page: i64,
    page_size: i64,
) -> Result<InfluencerPage, DbError> {
    let mut count = QueryBuilder::new("SELECT COUNT(*) FROM influencers");
    push_filters(&mut count, filters);
    let total: i64 = count.build_query_scalar().fetch_one(pool).await?;

    let mut qb = QueryBuilder::new(format!("SELECT {COLUMNS} FROM influencers"));
    push_filters(&mut qb, filters);
    qb.push(format_args!(
        " ORDER BY {} {} NULLS LAST, id ",
        sort.column(),
        direction.keyword()
    ))
    .push(direction.keyword())
    .push(" LIMIT ")
    .push_bind(page_size)
    .push(" OFFSET ")
    .push_bind((page.max(1) - 1).saturating_mul(page_size));

    let items = qb
        .build_query_as::<InfluencerRow>()
        .fetch_all(pool)
        .await?;

    Ok(InfluencerPage { items, total })
}

/// All influencers matching `filters`, newest first, capped at
/// [`EXPORT_ROW_LIMIT`].
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn export_influencers(
    pool: &PgPool,
    filters: &InfluencerFilters,
) -> Result<Vec<InfluencerRow>, DbError> {
    let mut qb = QueryBuilder::new(format!("SELECT {COLUMNS} FROM influencers"));
    push_filters(&mut qb, filters);
    qb.push(" ORDER BY created_at DESC, id DESC LIMIT ")
        .push_bind(EXPORT_ROW_LIMIT);

    let rows = qb
        .build_query_as::<InfluencerRow>()
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Applies a sparse update and refreshes `updated_at`.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no influencer has `id`, or
/// [`DbError::Sqlx`] if the update fails.
pub async fn update_influencer(
    pool: &PgPool,
    id: Uuid,
    update: InfluencerUpdate,
) -> Result<InfluencerRow, DbError> {
    let mut qb = QueryBuilder::new("UPDATE influencers SET ");
    let mut set = qb.separated(", ");

    if let Some(v) = update.name {
        set_column(&mut set, "name", v);
    }
    if let Some(v) = update.platform {
        set_column(&mut set, "platform", v.as_str());
    }
    if let Some(v) = update.handle {
        set_column(&mut set, "handle", v);
    }
    for (column, value) in [
        ("profile_url", update.profile_url),
        ("country", update.country),
        ("city", update.city),
        ("main_category", update.main_category),
        ("base_price_text", update.base_price_text),
        ("contact_email", update.contact_email),
        ("contact_dm", update.contact_dm),
        ("notes_summary", update.notes_summary),
    ] {
        if let Some(v) = value {
            set_column(&mut set, column, v);
        }
    }
    for (column, value) in [
        ("followers", update.followers),
        ("avg_likes", update.avg_likes),
        ("avg_comments", update.avg_comments),
        ("avg_shares", update.avg_shares),
    ] {
        if let Some(v) = value {
            set_column(&mut set, column, v);
        }
    }
    if let Some(v) = update.engagement_rate {
        set_column(&mut set, "engagement_rate", v);
    }
    for (column, value) in [
        ("languages", update.languages),
        ("sub_categories", update.sub_categories),
        ("collab_types", update.collab_types),
        ("tags", update.tags),
    ] {
        if let Some(v) = value {
            set_column(&mut set, column, v);
        }
    }
    if let Some(v) = update.status {
        set_column(&mut set, "status", v.as_str());
    }
    set.push("updated_at = NOW()");

    qb.push(" WHERE id = ")
        .push_bind(id)
        .push(format_args!(" RETURNING {COLUMNS}"));

    qb.build_query_as::<InfluencerRow>()
        .fetch_optional(pool)
        .await?
        .ok_or(DbError::NotFound)
}

/// Hard-deletes an influencer; its notes cascade.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no influencer has `id`, or
/// [`DbError::Sqlx`] if the delete fails.
pub async fn delete_influencer(pool: &PgPool, id: Uuid) -> Result<(), DbError> {
    let result = sqlx::query("DELETE FROM influencers WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }
    Ok(())
}

/// # Errors
///
/// Returns [`DbError::Sqlx`] if any query fails.
pub async fn filter_options(pool: &PgPool) -> Result<FilterOptions, DbError> {
    async fn distinct(pool: &PgPool, sql: &str) -> Result<Vec<String>, DbError> {
        Ok(sqlx::query_scalar::<_, String>(sql).fetch_all(pool).await?)
    }

    Ok(FilterOptions {
        platforms: distinct(
            pool,
            "SELECT DISTINCT platform FROM influencers ORDER BY platform",
        )
        .await?,
        countries: distinct(
            pool,
            "SELECT DISTINCT country FROM influencers \
             WHERE country IS NOT NULL AND country <> '' ORDER BY country",
        )
        .await?,
        cities: distinct(
            pool,
            "SELECT DISTINCT city FROM influencers \
             WHERE city IS NOT NULL AND city <> '' ORDER BY city",
        )
        .await?,
        main_categories: distinct(
            pool,
            "SELECT DISTINCT main_category FROM influencers \
             WHERE main_category IS NOT NULL AND main_category <> '' ORDER BY main_category",
        )
        .await?,
        collab_types: distinct(
            pool,
            "SELECT DISTINCT value FROM influencers, unnest(collab_types) AS value ORDER BY value",
        )
        .await?,
        tags: distinct(
            pool,
            "SELECT DISTINCT value FROM influencers, unnest(tags) AS value ORDER BY value",
        )
        .await?,
    })
}

/// # Errors
///
/// Returns [`DbError::Sqlx`] if any query fails.
pub async fn dashboard_stats(pool: &PgPool) -> Result<DashboardStats, DbError> {
    let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM influencers")
        .fetch_one(pool)
        .await?;

    let by_platform = sqlx::query_as::<_, PlatformCount>(
        "SELECT platform, COUNT(*) AS count \
         FROM influencers \
         GROUP BY platform \
         ORDER BY count DESC, platform",
    )
    .fetch_all(pool)
    .await?;

    let top_categories = sqlx::query_as::<_, CategoryCount>(
        "SELECT main_category, COUNT(*) AS count \
         FROM influencers \
         WHERE main_category IS NOT NULL AND main_category <> '' \
         GROUP BY main_category \
         ORDER BY count DESC, main_category \
         LIMIT $1",
    )
    .bind(DASHBOARD_TOP_CATEGORIES)
    .fetch_all(pool)
    .await?;

    let created_last_30_days = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM influencers WHERE created_at >= NOW() - INTERVAL '30 days'",
    )
    .fetch_one(pool)
    .await?;

    let recent = sqlx::query_as::<_, InfluencerRow>(&format!(
        "SELECT {COLUMNS} FROM influencers ORDER BY created_at DESC, id DESC LIMIT $1"
    ))
    .bind(DASHBOARD_RECENT_LIMIT)
    .fetch_all(pool)
    .await?;

    Ok(DashboardStats {
        total,
        by_platform,
        top_categories,
        created_last_30_days,
        recent,
    })
}
