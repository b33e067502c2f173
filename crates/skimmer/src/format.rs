//! Filesystem-safe name formatting.
//!
//! Every artifact the pipeline writes (PDFs, extracted text, summary JSON)
//! is named after user- or provider-controlled strings, so all of them pass
//! through [`sanitize_filename`] first. The sanitizer is idempotent: running
//! it over its own output changes nothing.

use super::*;

lazy_static! {
  /// Characters that are unsafe in filenames on at least one supported
  /// platform: `\ / : * ? " < > |`
  static ref FORBIDDEN: Regex = Regex::new(r#"[\\/:*?"<>|]"#).unwrap();
  /// Runs of whitespace, collapsed to a single underscore by
  /// [`format_title`].
  static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
}

/// Replaces every filesystem-unsafe character with an underscore.
///
/// # Examples
///
/// ```
/// use skimmer::format::sanitize_filename;
///
/// assert_eq!(sanitize_filename("a/b:c?.pdf"), "a_b_c_.pdf");
/// ```
pub fn sanitize_filename(name: &str) -> String {
  FORBIDDEN.replace_all(name, "_").into_owned()
}

/// Formats a paper title into a stable filename stem.
///
/// Sanitizes the title, collapses whitespace runs to underscores, and
/// truncates to `limit` characters when one is given. Used to build the
/// `source_year_title` stems under which PDFs and extracted text are stored.
pub fn format_title(title: &str, limit: Option<usize>) -> String {
  let name = sanitize_filename(title.trim());
  let name = WHITESPACE.replace_all(&name, "_").into_owned();
  match limit {
    Some(limit) => name.chars().take(limit).collect(),
    None => name,
  }
}
