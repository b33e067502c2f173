//! Open-access PDF retrieval.
//!
//! Downloading is the flakiest stage of the pipeline: hosts rate limit,
//! redirect to paywalls, or block non-browser clients outright. A failed
//! fetch is therefore an *expected* outcome, not an error — [`fetch_pdf`]
//! returns `Ok(None)` for transport failures and non-success statuses, and
//! the caller asks the user to supply the file manually. Only local
//! filesystem failures surface as real errors.

use std::time::Duration;

use url::Url;

use super::*;

/// Some PDF hosts reject clients without a browser-looking user agent.
const USER_AGENT: &str = "Mozilla/5.0";

/// Per-request ceiling; slow mirrors are treated as unavailable.
const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Downloads a PDF into `dir`, returning the path it was saved under.
///
/// The filename is taken from `filename` when given, otherwise derived from
/// the URL's final path segment with any query string stripped. Either way
/// it is sanitized for filesystem safety and a `.pdf` suffix is forced on.
/// `dir` is created if absent.
///
/// # Returns
///
/// - `Ok(Some(path))` — the PDF was written to `path`
/// - `Ok(None)` — the host could not be reached or answered with a
///   non-success status; the caller should skip this paper and prompt the
///   user to provide the file out of band
/// - `Err(_)` — a local failure (directory creation, file write)
pub async fn fetch_pdf(
  client: &reqwest::Client,
  pdf_url: &str,
  dir: &Path,
  filename: Option<&str>,
) -> Result<Option<PathBuf>> {
  std::fs::create_dir_all(dir)?;
  let path = dir.join(target_filename(pdf_url, filename));

  let response = match client
    .get(pdf_url)
    .header(reqwest::header::USER_AGENT, USER_AGENT)
    .timeout(FETCH_TIMEOUT)
    .send()
    .await
  {
    Ok(response) => response,
    Err(e) => {
      warn!("PDF download failed for {pdf_url}: {e}");
      return Ok(None);
    },
  };

  if !response.status().is_success() {
    trace!("pdf_url response: {response:?}");
    warn!("PDF host answered {} for {pdf_url}", response.status());
    return Ok(None);
  }

  let bytes = match response.bytes().await {
    Ok(bytes) => bytes,
    Err(e) => {
      warn!("PDF body read failed for {pdf_url}: {e}");
      return Ok(None);
    },
  };

  debug!("Writing PDF to path: {path:?}");
  std::fs::write(&path, &bytes)?;
  Ok(Some(path))
}

/// Resolves the on-disk filename for a download: explicit name or URL tail,
/// sanitized, with a `.pdf` suffix forced on.
fn target_filename(pdf_url: &str, filename: Option<&str>) -> String {
  let name = match filename {
    Some(name) => name.to_string(),
    None => filename_from_url(pdf_url),
  };

  let mut name = format::sanitize_filename(&name);
  if !name.to_lowercase().ends_with(".pdf") {
    name.push_str(".pdf");
  }
  name
}

/// Extracts the final path segment of a URL, dropping any query string.
fn filename_from_url(pdf_url: &str) -> String {
  if let Ok(url) = Url::parse(pdf_url) {
    if let Some(segment) = url.path_segments().and_then(|mut segments| segments.next_back()) {
      if !segment.is_empty() {
        return segment.to_string();
      }
    }
  }

  // Not a parseable URL; fall back to splitting by hand.
  let tail = pdf_url.rsplit('/').next().unwrap_or(pdf_url);
  tail.split('?').next().unwrap_or(tail).to_string()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn filename_derived_from_url_tail_without_query() {
    assert_eq!(filename_from_url("https://arxiv.org/pdf/2301.07041v1?download=1"), "2301.07041v1");
    assert_eq!(filename_from_url("not a url/x.pdf?y"), "x.pdf");
  }

  #[test]
  fn target_filename_forces_pdf_suffix_and_sanitizes() {
    assert_eq!(target_filename("https://arxiv.org/pdf/2301.07041v1", None), "2301.07041v1.pdf");
    assert_eq!(target_filename("https://x/y", Some("a:b/c")), "a_b_c.pdf");
    assert_eq!(target_filename("https://x/y", Some("Already.PDF")), "Already.PDF");
  }

  #[tokio::test]
  async fn failed_fetch_is_a_recoverable_miss() {
    use wiremock::{matchers::method, Mock, MockServer, ResponseTemplate};

    let server = MockServer::start().await;
    Mock::given(method("GET")).respond_with(ResponseTemplate::new(403)).mount(&server).await;

    let dir = tempdir().unwrap();
    let client = reqwest::Client::new();
    let fetched =
      fetch_pdf(&client, &format!("{}/blocked.pdf", server.uri()), dir.path(), None).await.unwrap();
    assert!(fetched.is_none());
  }

  #[tokio::test]
  async fn successful_fetch_writes_the_file() {
    use wiremock::{
      matchers::{method, path},
      Mock, MockServer, ResponseTemplate,
    };

    let server = MockServer::start().await;
    Mock::given(method("GET"))
      .and(path("/files/paper"))
      .respond_with(ResponseTemplate::new(200).set_body_bytes(b"%PDF-1.5 fake".to_vec()))
      .mount(&server)
      .await;

    let dir = tempdir().unwrap();
    let client = reqwest::Client::new();
    let fetched =
      fetch_pdf(&client, &format!("{}/files/paper", server.uri()), dir.path(), None).await.unwrap();

    let path = fetched.unwrap();
    assert_eq!(path.file_name().unwrap().to_str().unwrap(), "paper.pdf");
    assert_eq!(std::fs::read(path).unwrap(), b"%PDF-1.5 fake");
  }
}
