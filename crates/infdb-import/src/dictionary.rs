//! Static synonym tables for header and platform recognition.
//!
//! Built once per process and only ever read; every pipeline function takes
//! a `&Dictionary` so tests can reason about a fixed table.

use std::collections::HashMap;
use std::sync::LazyLock;

use infdb_core::{Field, Platform};

/// Header spellings recognized per field, in priority order.
///
/// The first entry matching a header wins, so more specific spellings come
/// first. Every export header is listed so exported files re-import cleanly.
const HEADER_ALIASES: &[(&str, Field)] = &[
    ("이름", Field::Name),
    ("성명", Field::Name),
    ("인플루언서명", Field::Name),
    ("name", Field::Name),
    ("Name", Field::Name),
    ("플랫폼", Field::Platform),
    ("platform", Field::Platform),
    ("Platform", Field::Platform),
    ("SNS", Field::Platform),
    ("핸들", Field::Handle),
    ("아이디", Field::Handle),
    ("계정", Field::Handle),
    ("handle", Field::Handle),
    ("Handle", Field::Handle),
    ("프로필URL", Field::ProfileUrl),
    ("프로필 URL", Field::ProfileUrl),
    ("프로필url", Field::ProfileUrl),
    ("프로필링크", Field::ProfileUrl),
    ("profileUrl", Field::ProfileUrl),
    ("Profile URL", Field::ProfileUrl),
    ("URL", Field::ProfileUrl),
    ("국가", Field::Country),
    ("country", Field::Country),
    ("Country", Field::Country),
    ("도시", Field::City),
    ("지역", Field::City),
    ("city", Field::City),
    ("City", Field::City),
    ("언어", Field::Languages),
    ("languages", Field::Languages),
    ("Languages", Field::Languages),
    ("팔로워", Field::Followers),
    ("팔로워수", Field::Followers),
    ("팔로워 수", Field::Followers),
    ("구독자", Field::Followers),
    ("구독자수", Field::Followers),
    ("followers", Field::Followers),
    ("Followers", Field::Followers),
    ("평균좋아요", Field::AvgLikes),
    ("평균 좋아요", Field::AvgLikes),
    ("좋아요", Field::AvgLikes),
    ("avgLikes", Field::AvgLikes),
    ("Avg Likes", Field::AvgLikes),
    ("평균댓글", Field::AvgComments),
    ("평균 댓글", Field::AvgComments),
    ("댓글", Field::AvgComments),
    ("avgComments", Field::AvgComments),
    ("Avg Comments", Field::AvgComments),
    ("평균공유수", Field::AvgShares),
    ("평균 공유수", Field::AvgShares),
    ("평균공유", Field::AvgShares),
    ("공유", Field::AvgShares),
    ("avgShares", Field::AvgShares),
    ("Avg Shares", Field::AvgShares),
    ("참여율", Field::EngagementRate),
    ("인게이지먼트", Field::EngagementRate),
    ("engagementRate", Field::EngagementRate),
    ("Engagement Rate", Field::EngagementRate),
    ("카테고리", Field::MainCategory),
    ("주카테고리", Field::MainCategory),
    ("mainCategory", Field::MainCategory),
    ("Main Category", Field::MainCategory),
    ("서브카테고리", Field::SubCategories),
    ("하위카테고리", Field::SubCategories),
    ("subCategories", Field::SubCategories),
    ("Sub Categories", Field::SubCategories),
    ("협업유형", Field::CollabTypes),
    ("협업 유형", Field::CollabTypes),
    ("collabTypes", Field::CollabTypes),
    ("Collab Types", Field::CollabTypes),
    ("단가", Field::BasePriceText),
    ("가격", Field::BasePriceText),
    ("basePriceText", Field::BasePriceText),
    ("Base Price", Field::BasePriceText),
    ("연락처", Field::ContactEmail),
    ("이메일", Field::ContactEmail),
    ("contactEmail", Field::ContactEmail),
    ("Contact Email", Field::ContactEmail),
    ("Email", Field::ContactEmail),
    ("DM", Field::ContactDm),
    ("contactDm", Field::ContactDm),
    ("Contact DM", Field::ContactDm),
    ("상태", Field::Status),
    ("status", Field::Status),
    ("Status", Field::Status),
    ("태그", Field::Tags),
    ("tags", Field::Tags),
    ("Tags", Field::Tags),
    ("메모", Field::NotesSummary),
    ("비고", Field::NotesSummary),
    ("notesSummary", Field::NotesSummary),
    ("Notes Summary", Field::NotesSummary),
];

/// Platform spellings seen in uploads. Lower-cased canonical tokens resolve
/// without an entry here.
const PLATFORM_ALIASES: &[(&str, Platform)] = &[
    ("인스타그램", Platform::Instagram),
    ("인스타", Platform::Instagram),
    ("Instagram", Platform::Instagram),
    ("insta", Platform::Instagram),
    ("유튜브", Platform::Youtube),
    ("유투브", Platform::Youtube),
    ("YouTube", Platform::Youtube),
    ("틱톡", Platform::Tiktok),
    ("티크톡", Platform::Tiktok),
    ("TikTok", Platform::Tiktok),
    ("스레드", Platform::Threads),
    ("쓰레드", Platform::Threads),
    ("Threads", Platform::Threads),
    ("기타", Platform::Other),
];

static STANDARD: LazyLock<Dictionary> = LazyLock::new(|| {
    Dictionary::new(HEADER_ALIASES.to_vec(), PLATFORM_ALIASES.iter().copied())
});

#[derive(Debug, Clone)]
pub struct Dictionary {
    headers: Vec<(&'static str, Field)>,
    alternatives: HashMap<Field, Vec<&'static str>>,
    platforms: HashMap<&'static str, Platform>,
}

impl Dictionary {
    pub fn new(
        headers: Vec<(&'static str, Field)>,
        platforms: impl IntoIterator<Item = (&'static str, Platform)>,
    ) -> Self {
        let mut alternatives: HashMap<Field, Vec<&'static str>> = HashMap::new();
        for &(header, field) in &headers {
            alternatives.entry(field).or_default().push(header);
        }
        Self {
            headers,
            alternatives,
            platforms: platforms.into_iter().collect(),
        }
    }

    /// The process-wide dictionary used by the server and CLI.
    #[must_use]
    pub fn standard() -> &'static Dictionary {
        &STANDARD
    }

    /// Every `(header, field)` pair in priority order.
    #[must_use]
    pub fn headers(&self) -> &[(&'static str, Field)] {
        &self.headers
    }

    /// Fallback header names for `field`, in listed order.
    #[must_use]
    pub fn alternatives(&self, field: Field) -> &[&'static str] {
        self.alternatives.get(&field).map_or(&[][..], Vec::as_slice)
    }

    #[must_use]
    pub fn platform_alias(&self, raw: &str) -> Option<Platform> {
        self.platforms.get(raw).copied()
    }
}
