//! Database operations for the append-only `influencer_notes` table.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

/// A note joined with its author's display name.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct NoteRow {
    pub id: Uuid,
    pub influencer_id: Uuid,
    pub author_id: Option<Uuid>,
    pub author_name: Option<String>,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Notes for one influencer, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_notes(pool: &PgPool, influencer_id: Uuid) -> Result<Vec<NoteRow>, DbError> {
    let rows = sqlx::query_as::<_, NoteRow>(
        "SELECT n.id, n.influencer_id, n.author_id, u.name AS author_name, n.content, n.created_at \
         FROM influencer_notes n \
         LEFT JOIN users u ON u.id = n.author_id \
         WHERE n.influencer_id = $1 \
         ORDER BY n.created_at DESC, n.id DESC",
    )
    .bind(influencer_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Appends a note. The caller trims and validates `content`.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if the influencer does not exist, or
/// [`DbError::Sqlx`] if the insert fails.
pub async fn create_note(
    pool: &PgPool,
    influencer_id: Uuid,
    author_id: Uuid,
    content: &str,
) -> Result<NoteRow, DbError> {
    // Inserting from a SELECT on influencers turns a missing parent into zero
    // rows instead of a foreign-key error.
    sqlx::query_as::<_, NoteRow>(
        "WITH inserted AS ( \
             INSERT INTO influencer_notes (influencer_id, author_id, content) \
             SELECT i.id, $2, $3 FROM influencers i WHERE i.id = $1 \
             RETURNING id, influencer_id, author_id, content, created_at \
         ) \
         SELECT ins.id, ins.influencer_id, ins.author_id, u.name AS author_name, \
                ins.content, ins.created_at \
         FROM inserted ins \
         LEFT JOIN users u ON u.id = ins.author_id",
    )
    .bind(influencer_id)
    .bind(author_id)
    .bind(content)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)
}
