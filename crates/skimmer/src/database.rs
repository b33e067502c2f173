//! Local SQLite record store for paper records.
//!
//! One table, `papers`, keyed by the namespaced record id. The store has
//! exactly the operations the pipeline needs:
//!
//! - [`Database::upsert`] — full-row insert-or-replace, used when a search
//!   persists stubs (re-searching a paper replaces the prior row wholesale)
//! - [`Database::patch`] — partial update of only the named status fields,
//!   used by pipeline stages so one stage never clobbers another's columns
//! - [`Database::set_summary`] — writes the ten summary columns
//! - [`Database::fetch_all`] / [`Database::get`] — fully materialized reads
//!
//! The schema is applied idempotently on every open and is never migrated.
//!
//! # Examples
//!
//! ```no_run
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let db = skimmer::database::Database::open("data/paper_db.sqlite").await?;
//! for record in db.fetch_all().await? {
//!   println!("{}: {}", record.id, record.title);
//! }
//! # Ok(())
//! # }
//! ```

use rusqlite::params;
use tokio_rusqlite::Connection;

use super::*;

/// Handle for interacting with the paper record store.
///
/// Manages an async connection to a SQLite database. Operations are never
/// issued concurrently by the pipeline, so no locking beyond SQLite's own
/// defaults is involved.
pub struct Database {
  /// Async SQLite connection handle
  conn: Connection,
}

/// A partial update of a record's status fields.
///
/// Only the fields set to `Some` are written; everything else on the row is
/// left untouched. An all-`None` patch is a no-op, and patching an id that
/// does not exist changes nothing (it never creates a row).
#[derive(Debug, Clone, Default)]
pub struct StatusPatch {
  /// New value for the `pdf_path` column
  pub pdf_path:     Option<String>,
  /// New value for the `text_path` column
  pub text_path:    Option<String>,
  /// New value for the `summary_path` column
  pub summary_path: Option<String>,
  /// New value for the `downloaded` flag
  pub downloaded:   Option<bool>,
  /// New value for the `summarized` flag
  pub summarized:   Option<bool>,
}

impl StatusPatch {
  /// True when no field is set; such a patch is skipped entirely.
  pub fn is_empty(&self) -> bool {
    self.pdf_path.is_none()
      && self.text_path.is_none()
      && self.summary_path.is_none()
      && self.downloaded.is_none()
      && self.summarized.is_none()
  }
}

/// Column list shared by every full-row read.
const RECORD_COLUMNS: &str = "id, title, authors, year, source, query, searched_at, url, pdf_url, \
                              pdf_path, text_path, summary_path, downloaded, summarized, \
                              background, purpose, novelty, method, results, discussion, \
                              concerns, conclusion, future_work, keywords";

impl Database {
  /// Opens an existing record store or creates a new one at `path`.
  ///
  /// Parent directories are created as needed and the schema is applied
  /// idempotently. This is the only operation whose failure is fatal to a
  /// run; everything later is recoverable per paper.
  ///
  /// # Examples
  ///
  /// ```no_run
  /// # use skimmer::database::Database;
  /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
  /// let db = Database::open(Database::default_path()).await?;
  /// # Ok(())
  /// # }
  /// ```
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
      if !parent.as_os_str().is_empty() {
        std::fs::create_dir_all(parent)?;
      }
    }

    let conn = Connection::open(path.to_path_buf()).await?;

    // Initialize schema
    conn
      .call(|conn| {
        conn.execute_batch(include_str!(concat!(
          env!("CARGO_MANIFEST_DIR"),
          "/migrations/init.sql"
        )))?;
        Ok(())
      })
      .await?;

    Ok(Self { conn })
  }

  /// Returns the fixed relative path of the record store,
  /// `data/paper_db.sqlite`.
  pub fn default_path() -> PathBuf { PathBuf::from("data").join("paper_db.sqlite") }

  /// Inserts a record, replacing any existing row with the same id
  /// wholesale.
  pub async fn upsert(&self, record: &PaperRecord) -> Result<()> {
    let record = record.clone();
    let keywords = serde_json::to_string(&record.summary.keywords)?;

    self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare_cached(
          "INSERT OR REPLACE INTO papers (
                        id, title, authors, year, source, query, searched_at,
                        url, pdf_url, pdf_path, text_path, summary_path,
                        downloaded, summarized,
                        background, purpose, novelty, method, results,
                        discussion, concerns, conclusion, future_work, keywords
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12,
                              ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21, ?22, ?23, ?24)",
        )?;

        stmt.execute(params![
          &record.id,
          &record.title,
          &record.authors,
          &record.year,
          record.source.to_string(),
          &record.query,
          &record.searched_at,
          &record.url,
          &record.pdf_url,
          &record.pdf_path,
          &record.text_path,
          &record.summary_path,
          record.downloaded,
          record.summarized,
          &record.summary.background,
          &record.summary.purpose,
          &record.summary.novelty,
          &record.summary.method,
          &record.summary.results,
          &record.summary.discussion,
          &record.summary.concerns,
          &record.summary.conclusion,
          &record.summary.future_work,
          keywords,
        ])?;
        Ok(())
      })
      .await
      .map_err(SkimmerError::from)
  }

  /// Applies a partial status update to the record with the given id.
  ///
  /// Builds the `SET` clause from exactly the fields present in `patch`.
  /// An empty patch returns immediately; an unknown id updates zero rows
  /// and is not an error.
  pub async fn patch(&self, id: &str, patch: StatusPatch) -> Result<()> {
    if patch.is_empty() {
      return Ok(());
    }

    let id = id.to_string();
    self
      .conn
      .call(move |conn| {
        let mut sets: Vec<&str> = Vec::new();
        let mut values: Vec<(&str, &dyn rusqlite::ToSql)> = Vec::new();

        if let Some(pdf_path) = &patch.pdf_path {
          sets.push("pdf_path = :pdf_path");
          values.push((":pdf_path", pdf_path));
        }
        if let Some(text_path) = &patch.text_path {
          sets.push("text_path = :text_path");
          values.push((":text_path", text_path));
        }
        if let Some(summary_path) = &patch.summary_path {
          sets.push("summary_path = :summary_path");
          values.push((":summary_path", summary_path));
        }
        if let Some(downloaded) = &patch.downloaded {
          sets.push("downloaded = :downloaded");
          values.push((":downloaded", downloaded));
        }
        if let Some(summarized) = &patch.summarized {
          sets.push("summarized = :summarized");
          values.push((":summarized", summarized));
        }
        values.push((":id", &id));

        let sql = format!("UPDATE papers SET {} WHERE id = :id", sets.join(", "));
        conn.execute(&sql, values.as_slice())?;
        Ok(())
      })
      .await
      .map_err(SkimmerError::from)
  }

  /// Writes the ten summary columns for an existing record.
  pub async fn set_summary(&self, id: &str, summary: &Summary) -> Result<()> {
    let id = id.to_string();
    let summary = summary.clone();
    let keywords = serde_json::to_string(&summary.keywords)?;

    self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare_cached(
          "UPDATE papers SET
                        background = ?1, purpose = ?2, novelty = ?3, method = ?4,
                        results = ?5, discussion = ?6, concerns = ?7,
                        conclusion = ?8, future_work = ?9, keywords = ?10
                     WHERE id = ?11",
        )?;

        stmt.execute(params![
          &summary.background,
          &summary.purpose,
          &summary.novelty,
          &summary.method,
          &summary.results,
          &summary.discussion,
          &summary.concerns,
          &summary.conclusion,
          &summary.future_work,
          keywords,
          id,
        ])?;
        Ok(())
      })
      .await
      .map_err(SkimmerError::from)
  }

  /// Returns every record, most recently searched first.
  pub async fn fetch_all(&self) -> Result<Vec<PaperRecord>> {
    self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare_cached(&format!(
          "SELECT {RECORD_COLUMNS} FROM papers ORDER BY searched_at DESC"
        ))?;

        let records =
          stmt.query_map([], record_from_row)?.collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(records)
      })
      .await
      .map_err(SkimmerError::from)
  }

  /// Looks up a single record by id.
  pub async fn get(&self, id: &str) -> Result<Option<PaperRecord>> {
    let id = id.to_string();
    self
      .conn
      .call(move |conn| {
        let mut stmt =
          conn.prepare_cached(&format!("SELECT {RECORD_COLUMNS} FROM papers WHERE id = ?1"))?;

        match stmt.query_row([id], record_from_row) {
          Ok(record) => Ok(Some(record)),
          Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
          Err(e) => Err(e.into()),
        }
      })
      .await
      .map_err(SkimmerError::from)
  }
}

/// Maps one `papers` row onto a [`PaperRecord`].
fn record_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<PaperRecord> {
  let source = PaperSource::from_str(&row.get::<_, String>(4)?).map_err(|e| {
    rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(e))
  })?;

  let keywords: Vec<String> =
    serde_json::from_str(&row.get::<_, String>(23)?).map_err(|e| {
      rusqlite::Error::FromSqlConversionFailure(23, rusqlite::types::Type::Text, Box::new(e))
    })?;

  Ok(PaperRecord {
    id: row.get(0)?,
    title: row.get(1)?,
    authors: row.get(2)?,
    year: row.get(3)?,
    source,
    query: row.get(5)?,
    searched_at: row.get(6)?,
    url: row.get(7)?,
    pdf_url: row.get(8)?,
    pdf_path: row.get(9)?,
    text_path: row.get(10)?,
    summary_path: row.get(11)?,
    downloaded: row.get(12)?,
    summarized: row.get(13)?,
    summary: Summary {
      background: row.get(14)?,
      purpose: row.get(15)?,
      novelty: row.get(16)?,
      method: row.get(17)?,
      results: row.get(18)?,
      discussion: row.get(19)?,
      concerns: row.get(20)?,
      conclusion: row.get(21)?,
      future_work: row.get(22)?,
      keywords,
    },
  })
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  /// Helper function to set up a test database
  async fn setup_test_db() -> (Database, PathBuf, tempfile::TempDir) {
    let dir = tempdir().unwrap();
    let path = dir.path().join("test.db");
    let db = Database::open(&path).await.unwrap();
    (db, path, dir)
  }

  /// A stub record with a deterministic timestamp offset for ordering tests.
  fn sample_record(id: &str, title: &str, minutes: u32) -> PaperRecord {
    PaperRecord {
      id:           id.to_string(),
      title:        title.to_string(),
      authors:      "A. Author, B. Author".to_string(),
      year:         "2024".to_string(),
      source:       PaperSource::Arxiv,
      query:        "testing".to_string(),
      searched_at:  Utc.with_ymd_and_hms(2024, 5, 1, 12, minutes, 0).unwrap(),
      url:          format!("http://arxiv.org/abs/{id}"),
      pdf_url:      format!("http://arxiv.org/pdf/{id}"),
      pdf_path:     None,
      text_path:    None,
      summary_path: None,
      downloaded:   false,
      summarized:   false,
      summary:      Summary::default(),
    }
  }

  #[traced_test]
  #[tokio::test]
  async fn test_database_creation() {
    let (_db, path, _dir) = setup_test_db().await;
    assert!(path.exists());
  }

  #[traced_test]
  #[tokio::test]
  async fn open_creates_missing_parent_directories() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("data").join("paper_db.sqlite");
    let _db = Database::open(&path).await.unwrap();
    assert!(path.exists());
  }

  #[traced_test]
  #[tokio::test]
  async fn upsert_twice_keeps_exactly_one_row_with_the_new_title() {
    let (db, _path, _dir) = setup_test_db().await;

    db.upsert(&sample_record("arXiv:1", "First Title", 0)).await.unwrap();
    db.upsert(&sample_record("arXiv:1", "Second Title", 1)).await.unwrap();

    let records = db.fetch_all().await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].title, "Second Title");
  }

  #[traced_test]
  #[tokio::test]
  async fn round_trip_preserves_every_field() {
    let (db, _path, _dir) = setup_test_db().await;

    let mut record = sample_record("arXiv:2", "Round Trip", 0);
    record.pdf_path = Some("data/pdf/x.pdf".to_string());
    record.downloaded = true;
    record.summary.keywords = vec!["a".to_string(), "b".to_string()];

    db.upsert(&record).await.unwrap();
    let restored = db.get("arXiv:2").await.unwrap().unwrap();
    assert_eq!(restored, record);
  }

  #[traced_test]
  #[tokio::test]
  async fn empty_patch_is_a_no_op() {
    let (db, _path, _dir) = setup_test_db().await;

    let record = sample_record("arXiv:3", "Patched", 0);
    db.upsert(&record).await.unwrap();

    db.patch("arXiv:3", StatusPatch::default()).await.unwrap();
    assert_eq!(db.get("arXiv:3").await.unwrap().unwrap(), record);
  }

  #[traced_test]
  #[tokio::test]
  async fn patch_updates_only_the_named_fields() {
    let (db, _path, _dir) = setup_test_db().await;

    let record = sample_record("arXiv:4", "Partial", 0);
    db.upsert(&record).await.unwrap();

    db.patch("arXiv:4", StatusPatch {
      pdf_path: Some("data/pdf/partial.pdf".to_string()),
      downloaded: Some(true),
      ..Default::default()
    })
    .await
    .unwrap();

    let updated = db.get("arXiv:4").await.unwrap().unwrap();
    assert_eq!(updated.pdf_path.as_deref(), Some("data/pdf/partial.pdf"));
    assert!(updated.downloaded);
    // everything else untouched
    assert_eq!(updated.title, record.title);
    assert_eq!(updated.text_path, None);
    assert!(!updated.summarized);
  }

  #[traced_test]
  #[tokio::test]
  async fn patching_an_unknown_id_creates_nothing() {
    let (db, _path, _dir) = setup_test_db().await;

    db.patch("arXiv:ghost", StatusPatch { downloaded: Some(true), ..Default::default() })
      .await
      .unwrap();

    assert!(db.fetch_all().await.unwrap().is_empty());
    assert!(db.get("arXiv:ghost").await.unwrap().is_none());
  }

  #[traced_test]
  #[tokio::test]
  async fn set_summary_fills_all_ten_columns() {
    let (db, _path, _dir) = setup_test_db().await;

    db.upsert(&sample_record("arXiv:5", "Summarized", 0)).await.unwrap();

    let summary = Summary {
      background: "背景".to_string(),
      purpose: "目的".to_string(),
      novelty: "新規性".to_string(),
      method: "方法".to_string(),
      results: "結果".to_string(),
      discussion: "考察".to_string(),
      concerns: "懸念点".to_string(),
      conclusion: "結論".to_string(),
      future_work: "展望".to_string(),
      keywords: vec!["キーワード1".to_string(), "キーワード2".to_string()],
    };
    db.set_summary("arXiv:5", &summary).await.unwrap();

    let restored = db.get("arXiv:5").await.unwrap().unwrap();
    assert_eq!(restored.summary, summary);
  }

  #[traced_test]
  #[tokio::test]
  async fn fetch_all_orders_by_most_recent_search() {
    let (db, _path, _dir) = setup_test_db().await;

    db.upsert(&sample_record("arXiv:old", "Old", 0)).await.unwrap();
    db.upsert(&sample_record("arXiv:new", "New", 30)).await.unwrap();
    db.upsert(&sample_record("arXiv:mid", "Mid", 15)).await.unwrap();

    let ids: Vec<String> =
      db.fetch_all().await.unwrap().into_iter().map(|record| record.id).collect();
    assert_eq!(ids, vec!["arXiv:new", "arXiv:mid", "arXiv:old"]);
  }
}
