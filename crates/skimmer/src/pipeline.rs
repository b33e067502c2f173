//! The per-paper stage orchestrator.
//!
//! [`Pipeline`] drives each paper through the fixed stage sequence —
//! download PDF, extract text, summarize, persist — committing a record
//! store update after every stage so partial progress survives a later
//! failure. There is no explicit state machine: a paper's position in the
//! sequence is exactly what its `downloaded`/`summarized` flags and path
//! columns say it is.
//!
//! Failure isolation is the orchestrator's one real job. A stage failure
//! aborts only the paper it happened to; [`Pipeline::process_batch`]
//! catches everything at the per-paper boundary, records the failure as a
//! [`PaperOutcome`] for display, and continues with the next paper.
//! Processing is strictly sequential: one outbound connection, one model
//! call in flight, one paper fully settled before the next begins.

use std::io::Write;

use tempfile::NamedTempFile;

use super::*;
use crate::{
  database::{Database, StatusPatch},
  extract::TextCleaner,
  search::{ArxivSearch, SearchAdapter, SemanticScholarSearch},
  summary::Summarizer,
};

/// Fixed relative layout for downloaded and derived artifacts.
#[derive(Debug, Clone)]
pub struct DataLayout {
  /// Where downloaded (and uploaded) PDFs are stored
  pub pdf_dir:     PathBuf,
  /// Where extracted text files are stored
  pub text_dir:    PathBuf,
  /// Where summary JSON documents are stored
  pub summary_dir: PathBuf,
}

impl Default for DataLayout {
  fn default() -> Self {
    let data = PathBuf::from("data");
    Self {
      pdf_dir:     data.join("pdf"),
      text_dir:    data.join("text"),
      summary_dir: data.join("summaries"),
    }
  }
}

/// What a keyword search produced across all providers.
#[derive(Debug)]
pub struct SearchOutcome {
  /// Candidates from every provider that answered, in provider order
  pub candidates: Vec<PaperMeta>,
  /// One human-readable warning per provider that failed
  pub warnings:   Vec<String>,
}

/// Terminal status of one paper's trip through the stage sequence.
#[derive(Debug)]
pub enum PaperOutcome {
  /// All stages completed; the record is summarized.
  Summarized {
    /// Record id
    id:    String,
    /// Paper title, for display
    title: String,
  },
  /// The PDF could not be fetched. The paper is skipped and the user
  /// should download the file manually and use the upload entry point.
  PdfUnavailable {
    /// Record id
    id:    String,
    /// Paper title, for display
    title: String,
  },
  /// A stage failed; the error is carried for display alongside the title.
  Failed {
    /// Record id
    id:    String,
    /// Paper title, for display
    title: String,
    /// What went wrong
    error: SkimmerError,
  },
}

/// How far [`Pipeline::process`] got.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageProgress {
  /// Every stage ran; the record is fully summarized.
  Summarized,
  /// The fetch came back empty; nothing past the download stage ran.
  PdfUnavailable,
}

/// Drives papers through the stage sequence against a shared record store.
pub struct Pipeline<'a> {
  /// The record store updated after every stage
  db:       &'a Database,
  /// Shared HTTP client for PDF downloads
  client:   reqwest::Client,
  /// Metadata providers queried by [`Pipeline::search`]
  adapters: Vec<Box<dyn SearchAdapter>>,
  /// Cleaner applied to extracted text
  cleaner:  TextCleaner,
  /// On-disk artifact layout
  layout:   DataLayout,
}

impl<'a> Pipeline<'a> {
  /// Creates a pipeline over the given record store with both default
  /// providers, the default cleaner, and the `data/` layout.
  pub fn new(db: &'a Database) -> Self {
    Self {
      db,
      client: reqwest::Client::new(),
      adapters: vec![Box::new(ArxivSearch::new()), Box::new(SemanticScholarSearch::new())],
      cleaner: TextCleaner::default(),
      layout: DataLayout::default(),
    }
  }

  /// Replaces the provider set, mainly for tests.
  pub fn with_adapters(mut self, adapters: Vec<Box<dyn SearchAdapter>>) -> Self {
    self.adapters = adapters;
    self
  }

  /// Replaces the artifact layout, mainly for tests.
  pub fn with_layout(mut self, layout: DataLayout) -> Self {
    self.layout = layout;
    self
  }

  /// Replaces the text cleaner, e.g. for a non-Japanese corpus.
  pub fn with_cleaner(mut self, cleaner: TextCleaner) -> Self {
    self.cleaner = cleaner;
    self
  }

  /// Runs the keyword search against every provider.
  ///
  /// `limit` applies independently per provider. A provider failing is not
  /// an error: its failure becomes a warning in the outcome and the
  /// candidates from the providers that answered are returned as usual.
  pub async fn search(&self, keyword: &str, limit: usize) -> SearchOutcome {
    let mut candidates = Vec::new();
    let mut warnings = Vec::new();

    for adapter in &self.adapters {
      match adapter.search(keyword, limit).await {
        Ok(found) => candidates.extend(found),
        Err(e) => {
          warn!("{} search failed, continuing without it: {e}", adapter.provider());
          warnings.push(format!("{} search skipped: {e}", adapter.provider()));
        },
      }
    }

    SearchOutcome { candidates, warnings }
  }

  /// Persists one stub record per candidate and returns the stubs.
  ///
  /// Stubs are upserted: re-running a search replaces any prior row for
  /// the same paper wholesale, resetting its progress.
  pub async fn persist_stubs(
    &self,
    keyword: &str,
    candidates: &[PaperMeta],
  ) -> Result<Vec<PaperRecord>> {
    let mut stubs = Vec::with_capacity(candidates.len());
    for meta in candidates {
      let stub = PaperRecord::stub(meta, keyword);
      self.db.upsert(&stub).await?;
      stubs.push(stub);
    }
    Ok(stubs)
  }

  /// Runs one paper through download, extraction, and summarization,
  /// committing a store update after each stage.
  pub async fn process(
    &self,
    summarizer: &Summarizer,
    record: &PaperRecord,
  ) -> Result<StageProgress> {
    let stem = record.file_stem();

    // Stage: download
    let filename = format!("{stem}.pdf");
    let Some(pdf_path) =
      download::fetch_pdf(&self.client, &record.pdf_url, &self.layout.pdf_dir, Some(&filename))
        .await?
    else {
      return Ok(StageProgress::PdfUnavailable);
    };
    self
      .db
      .patch(&record.id, StatusPatch {
        pdf_path: Some(pdf_path.display().to_string()),
        downloaded: Some(true),
        ..Default::default()
      })
      .await?;

    // Stage: extract
    let text = extract::extract_text(&pdf_path, &self.cleaner)?;
    let text_path = extract::save_text(&text, self.layout.text_dir.join(&stem))?;
    self
      .db
      .patch(&record.id, StatusPatch {
        text_path: Some(text_path.display().to_string()),
        ..Default::default()
      })
      .await?;

    // Stage: summarize
    let summary = summarizer.summarize(&text).await?;
    let summary_path = summary::save_summary(&summary, &pdf_path, &self.layout.summary_dir)?;
    self.db.set_summary(&record.id, &summary).await?;
    self
      .db
      .patch(&record.id, StatusPatch {
        summary_path: Some(summary_path.display().to_string()),
        summarized: Some(true),
        ..Default::default()
      })
      .await?;

    debug!("Summarized {} -> {}", record.id, summary_path.display());
    Ok(StageProgress::Summarized)
  }

  /// Processes a batch of records sequentially, isolating failures.
  ///
  /// Every record gets an outcome; an error on one paper never prevents
  /// the remaining papers from being processed.
  pub async fn process_batch(
    &self,
    summarizer: &Summarizer,
    records: &[PaperRecord],
  ) -> Vec<PaperOutcome> {
    let mut outcomes = Vec::with_capacity(records.len());

    for record in records {
      let outcome = match self.process(summarizer, record).await {
        Ok(StageProgress::Summarized) =>
          PaperOutcome::Summarized { id: record.id.clone(), title: record.title.clone() },
        Ok(StageProgress::PdfUnavailable) =>
          PaperOutcome::PdfUnavailable { id: record.id.clone(), title: record.title.clone() },
        Err(error) => {
          warn!("Processing failed for {:?}: {error}", record.title);
          PaperOutcome::Failed { id: record.id.clone(), title: record.title.clone(), error }
        },
      };
      outcomes.push(outcome);
    }

    outcomes
  }

  /// Ingests a user-supplied PDF: extract, summarize, persist.
  ///
  /// The upload is staged through a scoped temp file that is removed on
  /// every exit path; the bytes are kept permanently under the pdf
  /// directory so the record's `pdf_path` outlives the call. The record id
  /// is the sanitized filename stem, or a timestamp token when the name
  /// sanitizes away to nothing.
  pub async fn ingest_upload(
    &self,
    summarizer: &Summarizer,
    original_name: &str,
    bytes: &[u8],
  ) -> Result<PaperRecord> {
    let mut staged = NamedTempFile::new()?;
    staged.write_all(bytes)?;

    let text = extract::extract_text(staged.path(), &self.cleaner)?;

    let stem = upload_stem(original_name);
    let text_path = extract::save_text(&text, self.layout.text_dir.join(&stem))?;

    let summary = summarizer.summarize(&text).await?;

    std::fs::create_dir_all(&self.layout.pdf_dir)?;
    let pdf_path = self.layout.pdf_dir.join(format!("{stem}.pdf"));
    std::fs::write(&pdf_path, bytes)?;

    let summary_path = summary::save_summary(&summary, &pdf_path, &self.layout.summary_dir)?;

    let record = PaperRecord {
      id: stem,
      title: original_name.to_string(),
      authors: String::new(),
      year: String::new(),
      source: PaperSource::UploadedPdf,
      query: String::new(),
      searched_at: Utc::now(),
      url: String::new(),
      pdf_url: String::new(),
      pdf_path: Some(pdf_path.display().to_string()),
      text_path: Some(text_path.display().to_string()),
      summary_path: Some(summary_path.display().to_string()),
      downloaded: true,
      summarized: true,
      summary,
    };
    self.db.upsert(&record).await?;
    Ok(record)
  }
}

/// Record id / filename stem for an uploaded file: the sanitized name stem,
/// or a timestamp token for names that sanitize away entirely.
fn upload_stem(original_name: &str) -> String {
  // sanitize first so a name with path separators keeps all its parts
  let name = format::sanitize_filename(original_name);
  let stem = Path::new(&name)
    .file_stem()
    .map(|stem| stem.to_string_lossy().into_owned())
    .unwrap_or_default();
  let stem = format::format_title(&stem, Some(30));

  if stem.trim_matches('_').is_empty() {
    format!("upload_{}", Utc::now().timestamp_millis())
  } else {
    stem
  }
}
