//! `import` command: runs a local file through the same batch importer the
//! HTTP endpoint uses.

use std::collections::HashMap;
use std::path::Path;

use anyhow::Context;
use infdb_db::PgImportStore;
use infdb_import::{parse_caller_mapping, read_file, resolve_mapping, run_import, Dictionary};

/// Reads a `--mapping` file: a JSON object of field name to header.
pub(crate) fn load_mapping(path: &Path) -> anyhow::Result<HashMap<String, String>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read mapping file {}", path.display()))?;
    parse_caller_mapping(&text)
        .with_context(|| format!("invalid mapping file {}", path.display()))
}

/// Imports `path` on behalf of `username` and prints the batch summary.
///
/// # Errors
///
/// Returns an error if the user does not exist, the file cannot be read or
/// parsed, or the batch cannot be recorded. Rejected rows are reported in
/// the summary, not as an error.
pub(crate) async fn run_import_file(
    pool: &sqlx::PgPool,
    path: &Path,
    username: &str,
    mapping_path: Option<&Path>,
) -> anyhow::Result<()> {
    let user = infdb_db::find_user_by_username(pool, username)
        .await?
        .ok_or_else(|| anyhow::anyhow!("no user named '{username}'"))?;

    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| anyhow::anyhow!("{} is not a file path", path.display()))?
        .to_string();
    let bytes =
        std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;

    let parse_name = file_name.clone();
    let sheet = tokio::task::spawn_blocking(move || read_file(&parse_name, &bytes)).await??;

    let dict = Dictionary::standard();
    let caller = mapping_path.map(load_mapping).transpose()?;
    let mapping = resolve_mapping(dict, &sheet.headers, caller);
    let unmapped = mapping.unmapped(&sheet.headers);
    if !unmapped.is_empty() {
        println!("unmapped columns: {}", unmapped.join(", "));
    }

    let store = PgImportStore::new(pool.clone());
    let summary = run_import(&store, dict, &file_name, user.id, &sheet.rows, &mapping).await?;

    println!(
        "batch {}: {} of {} rows imported, {} errors",
        summary.batch_id, summary.success, summary.total, summary.errors
    );
    for error in &summary.error_rows {
        println!("  row {:>5}: {}", error.row_index, error.message);
    }
    let hidden = summary.errors - summary.error_rows.len();
    if hidden > 0 {
        println!("  ... {hidden} more; see import_errors for batch {}", summary.batch_id);
    }

    Ok(())
}
