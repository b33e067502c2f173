//! PDF text extraction and cleaning.
//!
//! Extraction pulls the text layer out of a downloaded PDF page by page and
//! then runs it through a [`TextCleaner`] before it is handed to the
//! summarizer. Cleaning is deliberately lossy: academic PDFs are full of
//! layout artifacts (hard-wrapped lines, citation markers, stray glyphs
//! from equations) that only waste model context.
//!
//! The default cleaner targets a Japanese-language corpus: it keeps ASCII,
//! the two Japanese syllabaries, CJK ideographs, and common Japanese
//! punctuation, and drops everything else. Use
//! [`TextCleaner::with_allowed`] to clean for a different corpus.

use lopdf::Document;

use super::*;

/// Character classes kept by the default cleaner: ASCII, hiragana,
/// katakana, CJK ideographs, and the usual Japanese punctuation.
pub const JAPANESE_ACADEMIC_ALLOW: &str =
  r"\x00-\x7Fぁ-んァ-ン一-龥。、．，：；！？「」『』（）【】";

lazy_static! {
  /// Runs of whitespace, collapsed to a single space.
  static ref WHITESPACE_RUNS: Regex = Regex::new(r"\s+").unwrap();
  /// Bracketed numeric citation markers such as `[12]`.
  static ref CITATION_MARKERS: Regex = Regex::new(r"\[\d+\]").unwrap();
  /// Complement of [`JAPANESE_ACADEMIC_ALLOW`].
  static ref DEFAULT_DISALLOWED: Regex =
    Regex::new(&format!("[^{JAPANESE_ACADEMIC_ALLOW}]")).unwrap();
}

/// Normalizes extracted PDF text down to a fixed character repertoire.
///
/// # Examples
///
/// ```
/// use skimmer::extract::TextCleaner;
///
/// let cleaner = TextCleaner::default();
/// assert_eq!(cleaner.clean("model \n outperforms [3]  baselines"), "model outperforms baselines");
/// ```
#[derive(Debug, Clone)]
pub struct TextCleaner {
  /// Matches every character that gets dropped.
  disallowed: Regex,
}

impl Default for TextCleaner {
  fn default() -> Self { Self { disallowed: DEFAULT_DISALLOWED.clone() } }
}

impl TextCleaner {
  /// Builds a cleaner for a custom character allow-list.
  ///
  /// `classes` is the body of a regex character class, e.g.
  /// `r"\x00-\x7F"` for ASCII-only output.
  pub fn with_allowed(classes: &str) -> Result<Self> {
    let disallowed = Regex::new(&format!("[^{classes}]"))
      .map_err(|e| SkimmerError::Config(format!("invalid character allow-list: {e}")))?;
    Ok(Self { disallowed })
  }

  /// Cleans raw extracted text: newlines and whitespace runs become single
  /// spaces, `[12]`-style citation markers disappear, and characters
  /// outside the allow-list are dropped.
  pub fn clean(&self, text: &str) -> String {
    let text = text.replace('\n', " ");
    let text = CITATION_MARKERS.replace_all(&text, "");
    let text = WHITESPACE_RUNS.replace_all(&text, " ");
    let text = self.disallowed.replace_all(&text, "");
    text.trim().to_string()
  }
}

/// Extracts and cleans the text layer of the PDF at `path`.
///
/// # Errors
///
/// - [`SkimmerError::PdfNotFound`] if `path` does not exist
/// - [`SkimmerError::Pdf`] if the document cannot be opened or its text
///   layer cannot be decoded
pub fn extract_text(path: impl AsRef<Path>, cleaner: &TextCleaner) -> Result<String> {
  let path = path.as_ref();
  if !path.exists() {
    return Err(SkimmerError::PdfNotFound(path.to_path_buf()));
  }

  let doc = Document::load(path)?;
  let pages: Vec<u32> = doc.get_pages().keys().copied().collect();
  let raw = doc.extract_text(&pages)?;
  trace!("Extracted {} raw characters from {path:?}", raw.len());

  Ok(cleaner.clean(&raw))
}

/// Writes extracted text to `path`, appending a `.txt` suffix when missing
/// and creating parent directories as needed. Returns the path written.
pub fn save_text(text: &str, path: impl AsRef<Path>) -> Result<PathBuf> {
  let mut path = path.as_ref().to_path_buf();
  match path.extension() {
    Some(ext) if ext.eq_ignore_ascii_case("txt") => {},
    _ => path.as_mut_os_string().push(".txt"),
  }

  if let Some(parent) = path.parent() {
    std::fs::create_dir_all(parent)?;
  }
  std::fs::write(&path, text)?;
  Ok(path)
}
