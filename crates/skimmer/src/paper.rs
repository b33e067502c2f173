//! Core record and candidate-metadata types.
//!
//! This module defines the three shapes data takes on its way through the
//! pipeline:
//!
//! - [`PaperMeta`]: candidate metadata as normalized by a search adapter,
//!   prior to persistence
//! - [`PaperRecord`]: the persisted record, one row per paper, mutated by
//!   each pipeline stage in turn
//! - [`Summary`]: the fixed ten-field structured summary
//!
//! # Record lifecycle
//!
//! A record is created at search time as a stub (metadata filled, summary
//! empty, both flags false) and then mutated strictly in stage order:
//! `pdf_path` + `downloaded`, then `text_path`, then the summary fields and
//! `summary_path` + `summarized`. Records are never deleted by the system.

use super::*;

/// Origin of a paper record.
///
/// The display form is what gets persisted in the record store, so the
/// `Display`/`FromStr` pair must round-trip exactly.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub enum PaperSource {
  /// Found via arXiv keyword search
  Arxiv,
  /// Found via Semantic Scholar keyword search
  SemanticScholar,
  /// Supplied directly by the user as a PDF upload
  UploadedPdf,
}

impl Display for PaperSource {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      PaperSource::Arxiv => write!(f, "arXiv"),
      PaperSource::SemanticScholar => write!(f, "SemanticScholar"),
      PaperSource::UploadedPdf => write!(f, "uploaded_pdf"),
    }
  }
}

impl FromStr for PaperSource {
  type Err = SkimmerError;

  fn from_str(s: &str) -> Result<Self> {
    match &s.to_lowercase() as &str {
      "arxiv" => Ok(PaperSource::Arxiv),
      "semanticscholar" => Ok(PaperSource::SemanticScholar),
      "uploaded_pdf" => Ok(PaperSource::UploadedPdf),
      s => Err(SkimmerError::InvalidSource(s.to_owned())),
    }
  }
}

/// Candidate metadata for one paper, as returned by a search adapter.
///
/// Adapters only emit candidates whose open-access PDF URL resolved, so
/// `pdf_url` is always present here; candidates without one are dropped
/// before this type is ever constructed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaperMeta {
  /// Provider that returned this candidate
  pub source:        PaperSource,
  /// The paper's full title
  pub title:         String,
  /// Comma-joined author display string
  pub authors:       String,
  /// Publication year as a display string (may be empty)
  pub year:          String,
  /// Venue or journal name
  pub venue:         String,
  /// Landing page URL
  pub url:           String,
  /// Resolved open-access PDF URL
  pub pdf_url:       String,
  /// Abstract text as supplied by the provider
  pub abstract_text: String,
}

/// The fixed ten-field structured summary of a paper.
///
/// Field names serialize to the Japanese labels the model is instructed to
/// emit, so this one definition doubles as the validation schema for model
/// output and the on-disk shape of the summary JSON document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Summary {
  /// 背景 — the problem context the paper starts from
  #[serde(rename = "背景")]
  pub background:  String,
  /// 目的 — what the paper sets out to do
  #[serde(rename = "目的")]
  pub purpose:     String,
  /// 新規性 — what is claimed to be new
  #[serde(rename = "新規性")]
  pub novelty:     String,
  /// 方法 — how the work was carried out
  #[serde(rename = "方法")]
  pub method:      String,
  /// 結果 — what was measured or observed
  #[serde(rename = "結果")]
  pub results:     String,
  /// 考察 — the authors' interpretation
  #[serde(rename = "考察")]
  pub discussion:  String,
  /// 懸念点 — weaknesses and threats to validity
  #[serde(rename = "懸念点")]
  pub concerns:    String,
  /// 結論 — the takeaway
  #[serde(rename = "結論")]
  pub conclusion:  String,
  /// 今後の展望 — future work
  #[serde(rename = "今後の展望")]
  pub future_work: String,
  /// キーワード — ordered keyword list
  #[serde(rename = "キーワード")]
  pub keywords:    Vec<String>,
}

/// Complete persisted representation of one paper.
///
/// Summary fields default to empty strings rather than being optional, so
/// display code never has to branch on presence. The two flags together
/// with the three path fields carry the paper's implicit pipeline state:
/// searched, downloaded, extracted, summarized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaperRecord {
  /// Unique identifier, namespaced by source (e.g. `arXiv:2301.07041`)
  pub id:           String,
  /// The paper's full title
  pub title:        String,
  /// Comma-joined author display string
  pub authors:      String,
  /// Publication year as a display string
  pub year:         String,
  /// Where the record came from
  pub source:       PaperSource,
  /// The keyword that surfaced this paper (empty for uploads)
  pub query:        String,
  /// When the search that produced this record ran
  pub searched_at:  DateTime<Utc>,
  /// Landing page URL
  pub url:          String,
  /// Open-access PDF URL
  pub pdf_url:      String,
  /// Where the downloaded PDF lives, once the download stage has run
  pub pdf_path:     Option<String>,
  /// Where the extracted text lives, once the extraction stage has run
  pub text_path:    Option<String>,
  /// Where the summary JSON document lives, once summarization has run
  pub summary_path: Option<String>,
  /// Whether the PDF download stage completed
  pub downloaded:   bool,
  /// Whether the summarization stage completed
  pub summarized:   bool,
  /// The structured summary (all fields empty until `summarized`)
  pub summary:      Summary,
}

impl PaperRecord {
  /// Builds a stub record from candidate metadata.
  ///
  /// The stub carries the search metadata, an empty summary, and both
  /// status flags cleared; pipeline stages fill in the rest.
  pub fn stub(meta: &PaperMeta, keyword: &str) -> Self {
    Self {
      id:           record_id(meta.source, &meta.url),
      title:        meta.title.clone(),
      authors:      meta.authors.clone(),
      year:         meta.year.clone(),
      source:       meta.source,
      query:        keyword.to_string(),
      searched_at:  Utc::now(),
      url:          meta.url.clone(),
      pdf_url:      meta.pdf_url.clone(),
      pdf_path:     None,
      text_path:    None,
      summary_path: None,
      downloaded:   false,
      summarized:   false,
      summary:      Summary::default(),
    }
  }

  /// The filename stem under which this paper's artifacts are stored,
  /// `source_year_title` with the title clipped to a sane length.
  pub fn file_stem(&self) -> String {
    format!("{}_{}_{}", self.source, self.year, format::format_title(&self.title, Some(30)))
  }
}

/// Derives a record identifier from a paper's landing page URL.
///
/// Takes the URL's trailing path segment (query string stripped) and
/// prefixes it with the source name, so two providers that happen to share
/// a trailing segment can never collide.
pub fn record_id(source: PaperSource, url: &str) -> String {
  let tail = url.trim_end_matches('/').rsplit('/').next().unwrap_or(url);
  let tail = tail.split('?').next().unwrap_or(tail);
  format!("{source}:{tail}")
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn source_display_round_trips_through_from_str() {
    for source in [PaperSource::Arxiv, PaperSource::SemanticScholar, PaperSource::UploadedPdf] {
      assert_eq!(PaperSource::from_str(&source.to_string()).unwrap(), source);
    }
  }

  #[test]
  fn unknown_source_is_rejected() {
    assert!(matches!(PaperSource::from_str("zenodo"), Err(SkimmerError::InvalidSource(_))));
  }

  #[test]
  fn record_id_uses_trailing_segment_and_source_namespace() {
    assert_eq!(
      record_id(PaperSource::Arxiv, "http://arxiv.org/abs/2301.07041v1"),
      "arXiv:2301.07041v1"
    );
    assert_eq!(
      record_id(PaperSource::SemanticScholar, "https://www.semanticscholar.org/paper/af123?utm=x"),
      "SemanticScholar:af123"
    );
    // same tail, different providers, still distinct
    assert_ne!(
      record_id(PaperSource::Arxiv, "https://a.org/x/1234"),
      record_id(PaperSource::SemanticScholar, "https://b.org/y/1234")
    );
  }

  #[test]
  fn stub_starts_with_empty_summary_and_cleared_flags() {
    let meta = PaperMeta {
      source:        PaperSource::Arxiv,
      title:         "Attention Is All You Need".into(),
      authors:       "Ashish Vaswani, Noam Shazeer".into(),
      year:          "2017".into(),
      venue:         "arXiv".into(),
      url:           "http://arxiv.org/abs/1706.03762".into(),
      pdf_url:       "http://arxiv.org/pdf/1706.03762.pdf".into(),
      abstract_text: "The dominant sequence transduction models...".into(),
    };
    let stub = PaperRecord::stub(&meta, "transformers");
    assert_eq!(stub.id, "arXiv:1706.03762");
    assert_eq!(stub.query, "transformers");
    assert!(!stub.downloaded && !stub.summarized);
    assert_eq!(stub.summary, Summary::default());
    assert_eq!(stub.file_stem(), "arXiv_2017_Attention_Is_All_You_Need");
  }
}
