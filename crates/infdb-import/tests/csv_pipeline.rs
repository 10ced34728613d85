//! End-to-end tests: CSV bytes through the file reader, column mapper and
//! batch importer, against an in-memory store.

use std::sync::Mutex;

use async_trait::async_trait;
use infdb_core::{NewInfluencer, Platform};
use infdb_import::{
    auto_map_columns, read_file, run_import, ColumnMapping, Dictionary, ImportError, ImportStore,
    RowError, StoreError,
};
use uuid::Uuid;

#[derive(Default)]
struct MemoryStore {
    inserted: Mutex<Vec<NewInfluencer>>,
    errors: Mutex<Vec<RowError>>,
}

#[async_trait]
impl ImportStore for MemoryStore {
    async fn create_batch(&self, _: &str, _: Uuid, _: usize) -> Result<Uuid, StoreError> {
        Ok(Uuid::new_v4())
    }

    async fn insert_influencer(&self, record: &NewInfluencer) -> Result<Uuid, StoreError> {
        self.inserted.lock().unwrap().push(record.clone());
        Ok(Uuid::new_v4())
    }

    async fn record_error(&self, _: Uuid, error: &RowError) -> Result<(), StoreError> {
        self.errors.lock().unwrap().push(error.clone());
        Ok(())
    }

    async fn finalize_batch(&self, _: Uuid, _: usize, _: usize) -> Result<(), StoreError> {
        Ok(())
    }
}

async fn import_csv(
    store: &MemoryStore,
    csv: &str,
) -> Result<infdb_import::ImportSummary, ImportError> {
    let dict = Dictionary::standard();
    let sheet = read_file("influencers.csv", csv.as_bytes())?;
    let mapping = auto_map_columns(dict, &sheet.headers);
    run_import(store, dict, "influencers.csv", Uuid::nil(), &sheet.rows, &mapping).await
}

#[tokio::test]
async fn korean_sheet_imports_with_automatic_mapping() {
    let csv = "이름,플랫폼,팔로워\nA,인스타,\nB,badvalue,\nC,youtube,3.1만\n";
    let store = MemoryStore::default();

    let summary = import_csv(&store, csv).await.unwrap();

    assert_eq!((summary.total, summary.success, summary.errors), (3, 2, 1));
    assert_eq!(summary.error_rows[0].row_index, 1);
    assert!(summary.error_rows[0].message.starts_with("Invalid platform"));

    let inserted = store.inserted.lock().unwrap();
    assert_eq!(inserted[0].platform, Platform::Instagram);
    assert_eq!(inserted[1].followers, Some(31_000));
}

#[tokio::test]
async fn padded_english_headers_still_map() {
    let csv = " Name ,PLATFORM, Profile URL \nJane Doe,TikTok,https://tiktok.com/@jane\n";
    let store = MemoryStore::default();

    let summary = import_csv(&store, csv).await.unwrap();

    assert_eq!(summary.success, 1);
    let inserted = store.inserted.lock().unwrap();
    assert_eq!(inserted[0].name, "Jane Doe");
    assert_eq!(inserted[0].handle, "jane");
}

#[tokio::test]
async fn caller_mapping_rescues_unrecognized_headers() {
    let csv = "Creator,Network\nZed,threads\n";
    let dict = Dictionary::standard();
    let sheet = read_file("custom.csv", csv.as_bytes()).unwrap();

    let automatic = auto_map_columns(dict, &sheet.headers);
    assert!(automatic.is_empty());

    let (caller, unknown) = ColumnMapping::from_caller(
        [("name", "Creator"), ("platform", "Network")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
    );
    assert!(unknown.is_empty());

    let store = MemoryStore::default();
    let summary = run_import(
        &store,
        dict,
        "custom.csv",
        Uuid::nil(),
        &sheet.rows,
        &automatic.override_with(caller),
    )
    .await
    .unwrap();

    assert_eq!(summary.success, 1);
    assert_eq!(store.inserted.lock().unwrap()[0].platform, Platform::Threads);
}

#[tokio::test]
async fn header_only_csv_fails_before_import() {
    let store = MemoryStore::default();
    let err = import_csv(&store, "이름,플랫폼\n").await.unwrap_err();
    assert!(matches!(err, ImportError::EmptyFile));
    assert!(store.errors.lock().unwrap().is_empty());
}
