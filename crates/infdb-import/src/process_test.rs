use super::*;

fn user() -> Uuid {
    Uuid::nil()
}

fn run(row: &Row) -> RowOutcome {
    process_row(row, &ColumnMapping::new(), Dictionary::standard(), user())
}

fn accepted(row: &Row) -> NewInfluencer {
    match run(row) {
        RowOutcome::Accepted(record) => *record,
        RowOutcome::Rejected(errors) => panic!("row rejected: {errors:?}"),
    }
}

fn rejected(row: &Row) -> Vec<FieldError> {
    match run(row) {
        RowOutcome::Rejected(errors) => errors,
        RowOutcome::Accepted(record) => panic!("row accepted: {record:?}"),
    }
}

// -----------------------------------------------------------------------
// required fields
// -----------------------------------------------------------------------

#[test]
fn minimal_row_is_accepted_with_defaults() {
    let row: Row = [("이름", "A"), ("플랫폼", "인스타")].into_iter().collect();
    let record = accepted(&row);
    assert_eq!(record.name, "A");
    assert_eq!(record.platform, Platform::Instagram);
    assert_eq!(record.handle, "a");
    assert_eq!(record.status, InfluencerStatus::Candidate);
    assert_eq!(record.followers, None);
    assert_eq!(record.engagement_rate, None);
    assert_eq!(record.created_by, user());
}

#[test]
fn missing_name_and_platform_are_both_reported() {
    let row: Row = [("팔로워", "100")].into_iter().collect();
    assert_eq!(
        rejected(&row),
        vec![
            FieldError::Required(Field::Name),
            FieldError::Required(Field::Platform)
        ]
    );
}

#[test]
fn invalid_platform_is_rejected_with_its_value() {
    let row: Row = [("name", "B"), ("platform", "badvalue")].into_iter().collect();
    let outcome = run(&row);
    assert_eq!(
        outcome.message().as_deref(),
        Some("Invalid platform: badvalue")
    );
}

#[test]
fn errors_are_joined_with_semicolons() {
    let row: Row = [
        ("name", "B"),
        ("platform", "myspace"),
        ("followers", "many"),
        ("status", "vip"),
    ]
    .into_iter()
    .collect();
    assert_eq!(
        run(&row).message().as_deref(),
        Some("Invalid platform: myspace; followers must be a number; Invalid status: vip")
    );
}

// -----------------------------------------------------------------------
// numeric coercion
// -----------------------------------------------------------------------

#[test]
fn counts_accept_korean_units() {
    let row: Row = [
        ("name", "C"),
        ("platform", "youtube"),
        ("followers", "3.1만"),
        ("좋아요", "1.3천"),
        ("댓글", "1,234"),
    ]
    .into_iter()
    .collect();
    let record = accepted(&row);
    assert_eq!(record.followers, Some(31_000));
    assert_eq!(record.avg_likes, Some(1_300));
    assert_eq!(record.avg_comments, Some(1_234));
}

#[test]
fn negative_counts_are_rejected() {
    let row: Row = [("name", "C"), ("platform", "youtube"), ("avgShares", "-5")]
        .into_iter()
        .collect();
    assert_eq!(rejected(&row), vec![FieldError::NotANumber(Field::AvgShares)]);
}

#[test]
fn unparseable_engagement_rate_is_an_error() {
    let row: Row = [("name", "C"), ("platform", "youtube"), ("참여율", "high")]
        .into_iter()
        .collect();
    assert_eq!(
        rejected(&row),
        vec![FieldError::NotANumber(Field::EngagementRate)]
    );
}

#[test]
fn supplied_engagement_rate_is_rounded() {
    let row: Row = [("name", "C"), ("platform", "youtube"), ("참여율", "4.567%")]
        .into_iter()
        .collect();
    assert_eq!(accepted(&row).engagement_rate, Some(Decimal::new(457, 2)));
}

#[test]
fn fractional_engagement_rate_is_taken_at_face_value() {
    let row: Row = [("name", "C"), ("platform", "youtube"), ("참여율", "0.052")]
        .into_iter()
        .collect();
    assert_eq!(accepted(&row).engagement_rate, Some(Decimal::new(5, 2)));
}

#[test]
fn supplied_engagement_rate_wins_over_derivation() {
    let row: Row = [
        ("name", "C"),
        ("platform", "youtube"),
        ("followers", "1000"),
        ("avgLikes", "40"),
        ("engagementRate", "1.5"),
    ]
    .into_iter()
    .collect();
    assert_eq!(accepted(&row).engagement_rate, Some(Decimal::new(150, 2)));
}

#[test]
fn absent_engagement_rate_is_derived() {
    let row: Row = [
        ("name", "C"),
        ("platform", "youtube"),
        ("followers", "1000"),
        ("avgLikes", "40"),
        ("avgComments", "5"),
        ("avgShares", "5"),
    ]
    .into_iter()
    .collect();
    let rate = accepted(&row).engagement_rate;
    assert_eq!(rate.map(|r| r.to_string()).as_deref(), Some("5.00"));
}

#[test]
fn zero_followers_leave_rate_absent() {
    let row: Row = [
        ("name", "C"),
        ("platform", "youtube"),
        ("followers", "0"),
        ("avgLikes", "40"),
    ]
    .into_iter()
    .collect();
    assert_eq!(accepted(&row).engagement_rate, None);
}

// -----------------------------------------------------------------------
// text, lists, status, handle
// -----------------------------------------------------------------------

#[test]
fn lists_split_on_commas_and_semicolons() {
    let row: Row = [
        ("name", "D"),
        ("platform", "tiktok"),
        ("tags", " beauty, ;daily; beauty ,"),
        ("언어", "ko;en"),
    ]
    .into_iter()
    .collect();
    let record = accepted(&row);
    assert_eq!(record.tags, vec!["beauty", "daily", "beauty"]);
    assert_eq!(record.languages, vec!["ko", "en"]);
    assert!(record.collab_types.is_empty());
}

#[test]
fn status_is_case_insensitive() {
    let row: Row = [("name", "D"), ("platform", "tiktok"), ("상태", " Active ")]
        .into_iter()
        .collect();
    assert_eq!(accepted(&row).status, InfluencerStatus::Active);
}

#[test]
fn handle_is_derived_from_profile_url() {
    let row: Row = [
        ("name", "Jane Doe"),
        ("platform", "instagram"),
        ("profileUrl", "https://instagram.com/foo_bar"),
    ]
    .into_iter()
    .collect();
    assert_eq!(accepted(&row).handle, "foo_bar");
}

#[test]
fn explicit_handle_is_kept() {
    let row: Row = [
        ("name", "Jane Doe"),
        ("platform", "instagram"),
        ("handle", "jd"),
        ("profileUrl", "https://instagram.com/foo_bar"),
    ]
    .into_iter()
    .collect();
    assert_eq!(accepted(&row).handle, "jd");
}

#[test]
fn mapped_header_takes_precedence_over_dictionary() {
    let row: Row = [("name", "Dictionary"), ("Creator", "Mapped"), ("platform", "threads")]
        .into_iter()
        .collect();
    let mut mapping = ColumnMapping::new();
    mapping.insert(Field::Name, "Creator");
    let outcome = process_row(&row, &mapping, Dictionary::standard(), user());
    match outcome {
        RowOutcome::Accepted(record) => assert_eq!(record.name, "Mapped"),
        RowOutcome::Rejected(errors) => panic!("row rejected: {errors:?}"),
    }
}

#[test]
fn text_values_are_trimmed() {
    let row: Row = [
        ("name", "  E "),
        ("platform", "other"),
        ("국가", " KR "),
        ("메모", " note "),
    ]
    .into_iter()
    .collect();
    let record = accepted(&row);
    assert_eq!(record.name, "E");
    assert_eq!(record.country.as_deref(), Some("KR"));
    assert_eq!(record.notes_summary.as_deref(), Some("note"));
}
