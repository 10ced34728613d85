//! Live integration tests for infdb-db using `#[sqlx::test]`.
//!
//! Each test gets a fresh, fully-migrated Postgres database spun up by the
//! sqlx test harness. The `migrations` path is relative to the crate root
//! (`crates/infdb-db/`), so `"../../migrations"` resolves to the workspace
//! migration directory.

use infdb_core::{InfluencerStatus, NewInfluencer, Platform, UserRole};
use infdb_db::{
    create_note, create_user, dashboard_stats, delete_influencer, export_influencers,
    filter_options, find_user_by_token_hash, get_import_batch, get_influencer, hash_token,
    insert_influencer, list_import_batches, list_import_errors, list_influencers, list_notes,
    rotate_user_token, update_influencer, DbError, InfluencerFilters, InfluencerUpdate,
    PgImportStore, SortDirection, SortField,
};
use infdb_import::{run_import, ColumnMapping, Dictionary, Row};
use rust_decimal::Decimal;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn insert_test_user(pool: &sqlx::PgPool, username: &str, role: UserRole) -> Uuid {
    create_user(pool, username, "Test User", role, &hash_token("salt", username))
        .await
        .unwrap_or_else(|e| panic!("create_user failed for '{username}': {e}"))
        .id
}

fn make_influencer(name: &str, platform: Platform, created_by: Uuid) -> NewInfluencer {
    NewInfluencer {
        name: name.to_string(),
        platform,
        handle: name.to_lowercase(),
        profile_url: None,
        country: Some("KR".to_string()),
        city: None,
        languages: vec!["ko".to_string()],
        followers: Some(1_000),
        avg_likes: Some(40),
        avg_comments: None,
        avg_shares: None,
        engagement_rate: Some(Decimal::new(400, 2)),
        main_category: Some("beauty".to_string()),
        sub_categories: vec![],
        collab_types: vec!["sponsored".to_string()],
        base_price_text: None,
        contact_email: None,
        contact_dm: None,
        status: InfluencerStatus::Candidate,
        tags: vec!["skincare".to_string()],
        notes_summary: None,
        created_by,
    }
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn token_lookup_and_rotation(pool: sqlx::PgPool) {
    let id = insert_test_user(&pool, "ops", UserRole::Admin).await;

    let found = find_user_by_token_hash(&pool, &hash_token("salt", "ops"))
        .await
        .expect("lookup failed")
        .expect("user missing");
    assert_eq!(found.id, id);
    assert_eq!(found.role().unwrap(), UserRole::Admin);

    rotate_user_token(&pool, "ops", &hash_token("salt", "new-token"))
        .await
        .expect("rotate failed");
    assert!(find_user_by_token_hash(&pool, &hash_token("salt", "ops"))
        .await
        .unwrap()
        .is_none());

    let err = rotate_user_token(&pool, "nobody", "x").await.unwrap_err();
    assert!(matches!(err, DbError::NotFound));
}

#[sqlx::test(migrations = "../../migrations")]
async fn duplicate_username_is_a_unique_violation(pool: sqlx::PgPool) {
    insert_test_user(&pool, "dup", UserRole::Staff).await;
    let err = create_user(&pool, "dup", "Again", UserRole::Staff, "other-hash")
        .await
        .unwrap_err();
    assert!(err.is_unique_violation());
}

// ---------------------------------------------------------------------------
// Influencers
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn insert_get_update_delete_round_trip(pool: sqlx::PgPool) {
    let user = insert_test_user(&pool, "ops", UserRole::Admin).await;
    let row = insert_influencer(&pool, &make_influencer("Jane", Platform::Instagram, user))
        .await
        .expect("insert failed");
    assert_eq!(row.platform, "instagram");
    assert_eq!(row.status, "candidate");
    assert_eq!(row.engagement_rate.map(|r| r.to_string()).as_deref(), Some("4.00"));

    let updated = update_influencer(
        &pool,
        row.id,
        InfluencerUpdate {
            status: Some(InfluencerStatus::Active),
            country: Some(None),
            tags: Some(vec!["a".to_string(), "b".to_string()]),
            followers: Some(Some(2_000)),
            ..InfluencerUpdate::default()
        },
    )
    .await
    .expect("update failed");
    assert_eq!(updated.status, "active");
    assert_eq!(updated.country, None);
    assert_eq!(updated.tags, vec!["a", "b"]);
    assert_eq!(updated.followers, Some(2_000));
    assert_eq!(updated.name, "Jane");
    assert_eq!(updated.engagement_rate, row.engagement_rate);
    assert!(updated.updated_at >= row.updated_at);

    delete_influencer(&pool, row.id).await.expect("delete failed");
    assert!(get_influencer(&pool, row.id).await.unwrap().is_none());
    assert!(matches!(
        delete_influencer(&pool, row.id).await,
        Err(DbError::NotFound)
    ));
}

#[sqlx::test(migrations = "../../migrations")]
async fn update_of_missing_influencer_is_not_found(pool: sqlx::PgPool) {
    let err = update_influencer(&pool, Uuid::new_v4(), InfluencerUpdate::default())
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::NotFound));
}

#[sqlx::test(migrations = "../../migrations")]
async fn negative_followers_violate_check_constraint(pool: sqlx::PgPool) {
    let user = insert_test_user(&pool, "ops", UserRole::Admin).await;
    let mut record = make_influencer("Neg", Platform::Youtube, user);
    record.followers = Some(-1);
    assert!(insert_influencer(&pool, &record).await.is_err());
}

#[sqlx::test(migrations = "../../migrations")]
async fn listing_filters_sorts_and_paginates(pool: sqlx::PgPool) {
    let user = insert_test_user(&pool, "ops", UserRole::Admin).await;
    for (i, platform) in [Platform::Instagram, Platform::Youtube, Platform::Instagram]
        .into_iter()
        .enumerate()
    {
        let mut record = make_influencer(&format!("Creator{i}"), platform, user);
        record.followers = Some(1_000 * (i64::try_from(i).unwrap() + 1));
        insert_influencer(&pool, &record).await.unwrap();
    }

    let filters = InfluencerFilters {
        platforms: vec!["instagram".to_string()],
        ..InfluencerFilters::default()
    };
    let page = list_influencers(&pool, &filters, SortField::Followers, SortDirection::Asc, 1, 20)
        .await
        .unwrap();
    assert_eq!(page.total, 2);
    let names: Vec<&str> = page.items.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["Creator0", "Creator2"]);

    let second = list_influencers(
        &pool,
        &InfluencerFilters::default(),
        SortField::Followers,
        SortDirection::Desc,
        2,
        2,
    )
    .await
    .unwrap();
    assert_eq!(second.total, 3);
    assert_eq!(second.items.len(), 1);
    assert_eq!(second.items[0].name, "Creator0");

    let search = InfluencerFilters {
        search: Some("creator1".to_string()),
        followers_min: Some(1_500),
        ..InfluencerFilters::default()
    };
    let found = list_influencers(&pool, &search, SortField::default(), SortDirection::default(), 1, 20)
        .await
        .unwrap();
    assert_eq!(found.total, 1);

    let by_tag = InfluencerFilters {
        tags: vec!["skincare".to_string(), "unused".to_string()],
        ..InfluencerFilters::default()
    };
    assert_eq!(export_influencers(&pool, &by_tag).await.unwrap().len(), 3);
}

#[sqlx::test(migrations = "../../migrations")]
async fn options_and_dashboard_reflect_stored_rows(pool: sqlx::PgPool) {
    let user = insert_test_user(&pool, "ops", UserRole::Admin).await;
    insert_influencer(&pool, &make_influencer("A", Platform::Tiktok, user))
        .await
        .unwrap();
    let mut other = make_influencer("B", Platform::Instagram, user);
    other.main_category = Some("food".to_string());
    other.tags = vec!["mukbang".to_string()];
    insert_influencer(&pool, &other).await.unwrap();

    let options = filter_options(&pool).await.unwrap();
    assert_eq!(options.platforms, vec!["instagram", "tiktok"]);
    assert_eq!(options.main_categories, vec!["beauty", "food"]);
    assert_eq!(options.tags, vec!["mukbang", "skincare"]);
    assert_eq!(options.countries, vec!["KR"]);

    let stats = dashboard_stats(&pool).await.unwrap();
    assert_eq!(stats.total, 2);
    assert_eq!(stats.by_platform.len(), 2);
    assert_eq!(stats.top_categories.len(), 2);
    assert_eq!(stats.created_last_30_days, 2);
    assert_eq!(stats.recent.len(), 2);
}

// ---------------------------------------------------------------------------
// Notes
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn notes_are_listed_newest_first_and_cascade(pool: sqlx::PgPool) {
    let user = insert_test_user(&pool, "ops", UserRole::Staff).await;
    let influencer = insert_influencer(&pool, &make_influencer("N", Platform::Other, user))
        .await
        .unwrap();

    create_note(&pool, influencer.id, user, "first").await.unwrap();
    let second = create_note(&pool, influencer.id, user, "second").await.unwrap();
    assert_eq!(second.author_name.as_deref(), Some("Test User"));

    let notes = list_notes(&pool, influencer.id).await.unwrap();
    assert_eq!(notes.len(), 2);
    assert_eq!(notes[0].content, "second");

    let missing = create_note(&pool, Uuid::new_v4(), user, "x").await.unwrap_err();
    assert!(matches!(missing, DbError::NotFound));

    delete_influencer(&pool, influencer.id).await.unwrap();
    assert!(list_notes(&pool, influencer.id).await.unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// Import batches
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn import_persists_rows_errors_and_batch_counts(pool: sqlx::PgPool) {
    let user = insert_test_user(&pool, "ops", UserRole::Admin).await;
    let rows: Vec<Row> = vec![
        [("이름", "A"), ("플랫폼", "인스타")].into_iter().collect(),
        [("이름", "B"), ("플랫폼", "badvalue")].into_iter().collect(),
        [("이름", "C"), ("플랫폼", "youtube"), ("팔로워", "3.1만")]
            .into_iter()
            .collect(),
    ];
    let store = PgImportStore::new(pool.clone());

    let summary = run_import(
        &store,
        Dictionary::standard(),
        "list.csv",
        user,
        &rows,
        &ColumnMapping::new(),
    )
    .await
    .expect("import failed");

    assert_eq!((summary.total, summary.success, summary.errors), (3, 2, 1));

    let batch = get_import_batch(&pool, summary.batch_id)
        .await
        .unwrap()
        .expect("batch missing");
    assert_eq!(batch.total_rows, 3);
    assert_eq!(batch.success_count, 2);
    assert_eq!(batch.error_count, 1);
    assert!(batch.completed_at.is_some());
    assert_eq!(batch.uploaded_by_username.as_deref(), Some("ops"));

    let errors = list_import_errors(&pool, summary.batch_id).await.unwrap();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].row_index, 1);
    assert_eq!(errors[0].raw_data["플랫폼"], "badvalue");

    let page = list_influencers(
        &pool,
        &InfluencerFilters {
            platforms: vec!["youtube".to_string()],
            ..InfluencerFilters::default()
        },
        SortField::default(),
        SortDirection::default(),
        1,
        20,
    )
    .await
    .unwrap();
    assert_eq!(page.items[0].followers, Some(31_000));

    assert_eq!(list_import_batches(&pool, 50).await.unwrap().len(), 1);
}

#[sqlx::test(migrations = "../../migrations")]
async fn constraint_failure_on_one_row_does_not_abort_batch(pool: sqlx::PgPool) {
    let user = insert_test_user(&pool, "ops", UserRole::Admin).await;
    // NUMERIC(10, 2) overflows on the second row.
    let rows: Vec<Row> = vec![
        [("name", "A"), ("platform", "instagram")].into_iter().collect(),
        [("name", "B"), ("platform", "youtube"), ("engagementRate", "123456789012")]
            .into_iter()
            .collect(),
        [("name", "C"), ("platform", "tiktok")].into_iter().collect(),
    ];
    let store = PgImportStore::new(pool.clone());

    let summary = run_import(
        &store,
        Dictionary::standard(),
        "list.csv",
        user,
        &rows,
        &ColumnMapping::new(),
    )
    .await
    .expect("import failed");

    assert_eq!(summary.success, 2);
    assert_eq!(summary.errors, 1);
    assert_eq!(summary.error_rows[0].row_index, 1);
}
