#![allow(missing_docs, clippy::missing_docs_in_private_items)]
//! Tabular CSV exports of the record store.
//!
//! UTF-8, header row first, one row per record. These are for download and
//! spreadsheet viewing, not round-trip import.

use super::*;

/// Format all records as a paper-list CSV.
pub fn papers_csv(records: &[PaperRecord]) -> String {
  let mut output = String::new();
  output.push_str("id,title,authors,year,source,query,searched_at,url,pdf_url,downloaded,summarized\n");

  for record in records {
    let id = csv_escape(&record.id);
    let title = csv_escape(&record.title);
    let authors = csv_escape(&record.authors);
    let year = csv_escape(&record.year);
    let query = csv_escape(&record.query);
    let url = csv_escape(&record.url);
    let pdf_url = csv_escape(&record.pdf_url);
    output.push_str(&format!(
      "{id},{title},{authors},{year},{},{query},{},{url},{pdf_url},{},{}\n",
      record.source,
      record.searched_at.to_rfc3339(),
      record.downloaded as u8,
      record.summarized as u8,
    ));
  }

  output
}

/// Format the summarized records as a summary-list CSV.
pub fn summaries_csv(records: &[PaperRecord]) -> String {
  let mut output = String::new();
  output.push_str(
    "id,title,source,year,background,purpose,novelty,method,results,discussion,concerns,conclusion,future_work,keywords\n",
  );

  for record in records.iter().filter(|record| record.summarized) {
    let summary = &record.summary;
    let fields = [
      &record.id,
      &record.title,
      &record.source.to_string(),
      &record.year,
      &summary.background,
      &summary.purpose,
      &summary.novelty,
      &summary.method,
      &summary.results,
      &summary.discussion,
      &summary.concerns,
      &summary.conclusion,
      &summary.future_work,
      &summary.keywords.join("; "),
    ]
    .map(|field| csv_escape(field));
    output.push_str(&fields.join(","));
    output.push('\n');
  }

  output
}

/// Escape a string for CSV output.
fn csv_escape(s: &str) -> String {
  if s.contains(',') || s.contains('"') || s.contains('\n') || s.contains('\r') {
    format!("\"{}\"", s.replace('"', "\"\""))
  } else if s.starts_with('=') || s.starts_with('+') || s.starts_with('-') || s.starts_with('@') {
    // Prevent formula injection in spreadsheets
    format!("'{s}")
  } else {
    s.to_string()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn record(summarized: bool) -> PaperRecord {
    PaperRecord {
      id:           "arXiv:1".to_string(),
      title:        "Commas, and \"Quotes\"".to_string(),
      authors:      "A. Author".to_string(),
      year:         "2024".to_string(),
      source:       PaperSource::Arxiv,
      query:        "q".to_string(),
      searched_at:  Utc::now(),
      url:          "http://arxiv.org/abs/1".to_string(),
      pdf_url:      "http://arxiv.org/pdf/1".to_string(),
      pdf_path:     None,
      text_path:    None,
      summary_path: None,
      downloaded:   summarized,
      summarized,
      summary:      Summary {
        conclusion: "=SUM(A1:A2) is not a formula here".to_string(),
        keywords: vec!["k1".to_string(), "k2".to_string()],
        ..Default::default()
      },
    }
  }

  #[test]
  fn papers_csv_has_header_and_escaped_rows() {
    let csv = papers_csv(&[record(false)]);
    let mut lines = csv.lines();
    assert_eq!(
      lines.next().unwrap(),
      "id,title,authors,year,source,query,searched_at,url,pdf_url,downloaded,summarized"
    );
    let row = lines.next().unwrap();
    assert!(row.starts_with("arXiv:1,\"Commas, and \"\"Quotes\"\"\",A. Author,2024,arXiv,q,"));
    assert!(row.ends_with(",0,0"));
  }

  #[test]
  fn summaries_csv_includes_only_summarized_records() {
    let csv = summaries_csv(&[record(false), record(true)]);
    assert_eq!(csv.lines().count(), 2); // header + one row

    let row = csv.lines().nth(1).unwrap();
    assert!(row.contains("'=SUM(A1:A2) is not a formula here"));
    assert!(row.contains("k1; k2"));
  }
}
