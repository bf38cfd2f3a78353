//! The two file-backed stores.
//!
//! [`StructuredStore`] is a pretty-printed JSON array rewritten in full on
//! every append. [`RowStore`] is a headerless CSV file that only ever grows
//! by appending, except when [`RowStore::replace`] rebuilds it wholesale.
//! Neither type locks anything; callers serialize access.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use csv::ReaderBuilder;
use serde_json::Value;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::warn;

use crate::codec::{self, ProfileRow};
use crate::error::Result;

// ── StructuredStore ──────────────────────────────────────────────────────────

/// `profiles.json`: every record ever submitted, as one JSON array.
///
/// Records are kept as raw JSON values so an entry written by an older
/// deployment, or edited by hand, is carried forward untouched.
#[derive(Debug)]
pub struct StructuredStore {
    path: PathBuf,
}

impl StructuredStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path { &self.path }

    /// Creates the file as an empty array if it does not exist.
    pub async fn ensure(&self) -> Result<()> {
        if fs::metadata(&self.path).await.is_err() {
            self.save(&[]).await?;
        }
        Ok(())
    }

    /// Strict read. A missing or blank file is an empty store.
    pub async fn load(&self) -> Result<Vec<Value>> {
        let data = match fs::read(&self.path).await {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        if data.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_slice(&data)?)
    }

    /// Best-effort read used on the submission path: anything that cannot
    /// be loaded counts as an empty store and is overwritten by the next save.
    pub async fn load_or_empty(&self) -> Vec<Value> {
        self.load().await.unwrap_or_else(|e| {
            warn!(path = %self.path.display(), error = %e, "structured store unreadable, starting from empty");
            Vec::new()
        })
    }

    /// Rewrites the whole file through a temp file and a rename, so a
    /// failed write leaves the previous contents in place.
    pub async fn save(&self, records: &[Value]) -> Result<()> {
        let json = serde_json::to_vec_pretty(records)?;
        write_replacing(&self.path, &json).await
    }
}

// ── RowStore ─────────────────────────────────────────────────────────────────

/// `profiles.csv`: one headerless row per record.
#[derive(Debug)]
pub struct RowStore {
    path: PathBuf,
}

impl RowStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path { &self.path }

    /// Creates the file empty if it does not exist.
    pub async fn ensure(&self) -> Result<()> {
        OpenOptions::new().create(true).append(true).open(&self.path).await?;
        Ok(())
    }

    /// Appends already encoded rows at the end of the file.
    pub async fn append(&self, rows: &[u8]) -> Result<()> {
        let mut file = OpenOptions::new().create(true).append(true).open(&self.path).await?;
        file.write_all(rows).await?;
        file.flush().await?;
        Ok(())
    }

    /// Reads and decodes every row in file order. A first row equal to the
    /// column names is skipped. Any unreadable or malformed row fails the
    /// whole read; a missing file is an error too.
    pub async fn read_all(&self) -> Result<Vec<ProfileRow>> {
        let data = fs::read(&self.path).await?;
        let mut rdr = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(data.as_slice());

        let mut rows = Vec::new();
        for (i, record) in rdr.records().enumerate() {
            let record = record?;
            if i == 0 && codec::is_header(&record) {
                continue;
            }
            rows.push(codec::decode(&record)?);
        }
        Ok(rows)
    }

    /// Replaces the whole file with `rows`.
    pub async fn replace(&self, rows: &[u8]) -> Result<()> {
        write_replacing(&self.path, rows).await
    }
}

/// Writes `contents` to a sibling `<name>.tmp` and renames it over `path`,
/// so readers only ever see the old or the new file.
async fn write_replacing(path: &Path, contents: &[u8]) -> Result<()> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    fs::write(&tmp, contents).await?;
    if let Err(e) = fs::rename(&tmp, path).await {
        let _ = fs::remove_file(&tmp).await;
        return Err(e.into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[tokio::test]
    async fn structured_store_round_trips_records() {
        let dir = tempfile::tempdir().unwrap();
        let store = StructuredStore::new(dir.path().join("profiles.json"));

        assert!(store.load().await.unwrap().is_empty());
        store.save(&[json!({ "Name": "A" })]).await.unwrap();

        let text = std::fs::read_to_string(store.path()).unwrap();
        assert_eq!(text, "[\n  {\n    \"Name\": \"A\"\n  }\n]");
        assert_eq!(store.load().await.unwrap(), vec![json!({ "Name": "A" })]);
    }

    #[tokio::test]
    async fn failed_save_keeps_previous_contents() {
        let dir = tempfile::tempdir().unwrap();
        let store = StructuredStore::new(dir.path().join("profiles.json"));
        store.save(&[json!({ "Name": "A" })]).await.unwrap();

        // A directory squatting on the temp name makes the write fail.
        std::fs::create_dir(dir.path().join("profiles.json.tmp")).unwrap();
        assert!(store.save(&[json!({ "Name": "B" })]).await.is_err());

        assert_eq!(store.load().await.unwrap(), vec![json!({ "Name": "A" })]);
    }

    #[tokio::test]
    async fn save_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = StructuredStore::new(dir.path().join("profiles.json"));
        store.save(&[]).await.unwrap();
        store.save(&[json!({ "Name": "A" })]).await.unwrap();

        assert!(!dir.path().join("profiles.json.tmp").exists());
        assert_eq!(store.load().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn corrupt_structured_store_loads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = StructuredStore::new(dir.path().join("profiles.json"));
        std::fs::write(store.path(), "{ not json").unwrap();

        assert!(store.load().await.is_err());
        assert!(store.load_or_empty().await.is_empty());
    }

    #[tokio::test]
    async fn ensure_leaves_existing_files_alone() {
        let dir = tempfile::tempdir().unwrap();
        let structured = StructuredStore::new(dir.path().join("profiles.json"));
        let rows = RowStore::new(dir.path().join("profiles.csv"));
        std::fs::write(structured.path(), "[{\"Name\":\"A\"}]").unwrap();
        std::fs::write(rows.path(), "A,Eng,x,BS,none,c\n").unwrap();

        structured.ensure().await.unwrap();
        rows.ensure().await.unwrap();

        assert_eq!(structured.load().await.unwrap().len(), 1);
        assert_eq!(rows.read_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn row_store_appends_and_reads_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let rows = RowStore::new(dir.path().join("profiles.csv"));
        rows.ensure().await.unwrap();
        assert!(rows.read_all().await.unwrap().is_empty());

        rows.append(b"A,Eng,\"x,y\",BS,none,a@b.com\n").await.unwrap();
        rows.append(b"B,PM,z,MS,PMP,b@c.com\n").await.unwrap();

        let all = rows.read_all().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].targeted_keywords, "x,y");
        assert_eq!(all[1].name, "B");
    }

    #[tokio::test]
    async fn row_store_skips_leading_header_row() {
        let dir = tempfile::tempdir().unwrap();
        let rows = RowStore::new(dir.path().join("profiles.csv"));
        std::fs::write(
            rows.path(),
            "Name,Title,Targeted Keywords,Education,Certification,Contact\nA,Eng,x,BS,none,c\n",
        )
        .unwrap();

        let all = rows.read_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].name, "A");
    }

    #[tokio::test]
    async fn row_store_read_fails_on_missing_file_or_short_row() {
        let dir = tempfile::tempdir().unwrap();
        let rows = RowStore::new(dir.path().join("profiles.csv"));
        assert!(rows.read_all().await.is_err());

        std::fs::write(rows.path(), "A,Eng,x,BS,none,c\nB,PM\n").unwrap();
        assert!(rows.read_all().await.is_err());
    }

    #[tokio::test]
    async fn replace_swaps_contents() {
        let dir = tempfile::tempdir().unwrap();
        let rows = RowStore::new(dir.path().join("profiles.csv"));
        rows.append(b"A,Eng,x,BS,none,c\n").await.unwrap();

        rows.replace(b"B,PM,z,MS,PMP,d\n").await.unwrap();

        let all = rows.read_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].name, "B");
        assert!(!dir.path().join("profiles.csv.tmp").exists());
    }
}
