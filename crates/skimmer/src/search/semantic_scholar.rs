//! Keyword search against the Semantic Scholar Graph API.
//!
//! Uses the `/graph/v1/paper/search` endpoint with an explicit field list.
//! Semantic Scholar reports open-access PDFs through the `openAccessPdf`
//! object; results where that object is missing or carries an empty URL are
//! dropped. The unauthenticated API is aggressively rate limited, which is
//! why the pipeline treats this adapter as optional.

use super::*;

/// Default base URL for the Semantic Scholar Graph API.
const GRAPH_API_URL: &str = "https://api.semanticscholar.org/graph/v1";

/// Fields requested from the search endpoint.
const SEARCH_FIELDS: &str = "title,authors,year,venue,url,openAccessPdf,abstract";

/// Venue label used when the provider reports none.
const UNKNOWN_VENUE: &str = "不明";

/// Internal representation of a paper-search response envelope.
#[derive(Debug, Deserialize)]
struct SearchResponse {
  /// The page of matching papers
  #[serde(default)]
  data: Vec<S2Paper>,
}

/// Internal representation of one paper from the search response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct S2Paper {
  /// Paper title
  #[serde(default)]
  title:           Option<String>,
  /// Author list
  #[serde(default)]
  authors:         Vec<S2Author>,
  /// Publication year
  #[serde(default)]
  year:            Option<i64>,
  /// Venue or journal name
  #[serde(default)]
  venue:           Option<String>,
  /// Landing page URL on semanticscholar.org
  #[serde(default)]
  url:             Option<String>,
  /// Open-access PDF location, when one is known
  #[serde(default)]
  open_access_pdf: Option<S2OpenAccessPdf>,
  /// Abstract text
  #[serde(default, rename = "abstract")]
  abstract_text:   Option<String>,
}

/// Internal representation of an author entry.
#[derive(Debug, Deserialize)]
struct S2Author {
  /// Author's display name
  #[serde(default)]
  name: String,
}

/// Internal representation of the `openAccessPdf` object.
#[derive(Debug, Deserialize)]
struct S2OpenAccessPdf {
  /// Direct PDF URL; may be empty even when the object is present
  #[serde(default)]
  url: String,
}

/// Keyword-search client for Semantic Scholar.
///
/// # Examples
///
/// ```no_run
/// # use skimmer::{prelude::*, search::SemanticScholarSearch};
/// # async fn example() -> Result<(), SkimmerError> {
/// let candidates = SemanticScholarSearch::new().search("protein folding", 5).await?;
/// # Ok(())
/// # }
/// ```
pub struct SemanticScholarSearch {
  /// Internal web client used to connect to the API.
  client:   reqwest::Client,
  /// API base, overridable for tests.
  base_url: String,
}

impl SemanticScholarSearch {
  /// Creates a new Semantic Scholar search client.
  pub fn new() -> Self {
    Self { client: reqwest::Client::new(), base_url: GRAPH_API_URL.to_string() }
  }

  /// Overrides the API base URL, mainly for pointing tests at a stub
  /// server.
  pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
    self.base_url = base_url.into();
    self
  }

  /// Converts a parsed response into candidates, dropping papers without a
  /// usable open-access PDF URL.
  fn collect_candidates(response: SearchResponse) -> Vec<PaperMeta> {
    response
      .data
      .into_iter()
      .filter_map(|paper| {
        let pdf_url = paper.open_access_pdf.map(|pdf| pdf.url).filter(|url| !url.is_empty())?;

        Some(PaperMeta {
          source:        PaperSource::SemanticScholar,
          title:         paper.title.unwrap_or_default(),
          authors:       paper
            .authors
            .iter()
            .map(|author| author.name.as_str())
            .collect::<Vec<_>>()
            .join(", "),
          year:          paper.year.map(|year| year.to_string()).unwrap_or_default(),
          venue:         paper
            .venue
            .filter(|venue| !venue.is_empty())
            .unwrap_or_else(|| UNKNOWN_VENUE.to_string()),
          url:           paper.url.unwrap_or_default(),
          pdf_url,
          abstract_text: paper.abstract_text.unwrap_or_default(),
        })
      })
      .collect()
  }
}

impl Default for SemanticScholarSearch {
  fn default() -> Self { Self::new() }
}

#[async_trait]
impl SearchAdapter for SemanticScholarSearch {
  async fn search(&self, keyword: &str, limit: usize) -> Result<Vec<PaperMeta>> {
    let url = format!("{}/paper/search", self.base_url);
    debug!("Searching Semantic Scholar for {keyword:?} (limit {limit})");

    let response = self
      .client
      .get(&url)
      .query(&[
        ("query", keyword.to_string()),
        ("limit", limit.to_string()),
        ("fields", SEARCH_FIELDS.to_string()),
      ])
      .send()
      .await?;

    let status = response.status();
    if !status.is_success() {
      return Err(SkimmerError::Api(format!("Semantic Scholar returned {status}")));
    }

    let body = response.text().await?;
    trace!("Semantic Scholar response: {body}");

    let parsed: SearchResponse = serde_json::from_str(&body)
      .map_err(|e| SkimmerError::Api(format!("Failed to parse search response: {e}")))?;

    Ok(Self::collect_candidates(parsed))
  }

  fn provider(&self) -> &'static str { "Semantic Scholar" }
}

#[cfg(test)]
mod tests {
  use super::*;

  /// Three results: a complete one, one with an empty `openAccessPdf.url`,
  /// and one with no `openAccessPdf` at all. Only the first may survive.
  const RESPONSE: &str = r#"{
    "total": 3,
    "data": [
      {
        "title": "Deep Residual Learning",
        "authors": [{"name": "Kaiming He"}, {"name": "Xiangyu Zhang"}],
        "year": 2016,
        "venue": "CVPR",
        "url": "https://www.semanticscholar.org/paper/abc123",
        "openAccessPdf": {"url": "https://arxiv.org/pdf/1512.03385"},
        "abstract": "Deeper neural networks are more difficult to train."
      },
      {
        "title": "Paywalled Paper",
        "authors": [{"name": "A. Author"}],
        "year": 2021,
        "venue": "",
        "url": "https://www.semanticscholar.org/paper/def456",
        "openAccessPdf": {"url": ""},
        "abstract": null
      },
      {
        "title": "No PDF Object",
        "authors": [],
        "year": null,
        "venue": null,
        "url": "https://www.semanticscholar.org/paper/ghi789",
        "openAccessPdf": null,
        "abstract": null
      }
    ]
  }"#;

  #[test]
  fn papers_without_open_access_pdf_are_dropped() {
    let parsed: SearchResponse = serde_json::from_str(RESPONSE).unwrap();
    let candidates = SemanticScholarSearch::collect_candidates(parsed);

    assert_eq!(candidates.len(), 1);
    let paper = &candidates[0];
    assert_eq!(paper.source, PaperSource::SemanticScholar);
    assert_eq!(paper.title, "Deep Residual Learning");
    assert_eq!(paper.authors, "Kaiming He, Xiangyu Zhang");
    assert_eq!(paper.year, "2016");
    assert_eq!(paper.venue, "CVPR");
    assert_eq!(paper.pdf_url, "https://arxiv.org/pdf/1512.03385");
  }

  #[test]
  fn missing_venue_gets_the_unknown_label() {
    let response = SearchResponse {
      data: vec![S2Paper {
        title:           Some("T".into()),
        authors:         vec![],
        year:            None,
        venue:           None,
        url:             Some("https://x/1".into()),
        open_access_pdf: Some(S2OpenAccessPdf { url: "https://x/1.pdf".into() }),
        abstract_text:   None,
      }],
    };
    let candidates = SemanticScholarSearch::collect_candidates(response);
    assert_eq!(candidates[0].venue, UNKNOWN_VENUE);
    assert_eq!(candidates[0].year, "");
  }

  #[tokio::test]
  async fn rate_limit_rejection_surfaces_as_api_error() {
    use wiremock::{matchers::method, Mock, MockServer, ResponseTemplate};

    let server = MockServer::start().await;
    Mock::given(method("GET")).respond_with(ResponseTemplate::new(429)).mount(&server).await;

    let adapter = SemanticScholarSearch::new().with_base_url(server.uri());
    assert!(matches!(adapter.search("anything", 1).await, Err(SkimmerError::Api(_))));
  }
}
