//! Keyword search against the arXiv Atom feed API.
//!
//! arXiv's query endpoint (`http://export.arxiv.org/api/query`) returns an
//! Atom XML feed. Entries are deserialized with quick-xml and kept only when
//! they carry a `link` of type `application/pdf`.

use quick_xml::de::from_str;

use super::*;

/// Default endpoint for the arXiv query API.
const ARXIV_API_URL: &str = "http://export.arxiv.org/api/query";

/// Internal representation of the arXiv API's Atom feed response.
#[derive(Debug, Deserialize)]
struct Feed {
  /// A `Feed` from arXiv may contain multiple `Entry`s
  #[serde(rename = "entry", default)]
  entries: Vec<Entry>,
}

/// Internal representation of a paper entry from arXiv's API response.
#[derive(Debug, Deserialize)]
struct Entry {
  /// arXiv URL (e.g., "http://arxiv.org/abs/2301.07041v1")
  id:        String,
  /// Paper title (may contain LaTeX markup and folded newlines)
  title:     String,
  /// Paper abstract
  summary:   String,
  /// Publication date, RFC 3339
  published: String,
  /// List of paper authors
  #[serde(rename = "author", default)]
  authors:   Vec<EntryAuthor>,
  /// Alternate and related links; the PDF link lives here
  #[serde(rename = "link", default)]
  links:     Vec<EntryLink>,
}

/// Internal representation of an author from arXiv's API response.
#[derive(Debug, Deserialize)]
struct EntryAuthor {
  /// Author's full name
  name: String,
}

/// Internal representation of a `link` element from arXiv's API response.
#[derive(Debug, Deserialize)]
struct EntryLink {
  /// Link target
  #[serde(rename = "@href")]
  href:         String,
  /// MIME type of the target, when given
  #[serde(rename = "@type", default)]
  content_type: Option<String>,
}

/// Keyword-search client for arXiv.
///
/// # Examples
///
/// ```no_run
/// # use skimmer::{prelude::*, search::ArxivSearch};
/// # async fn example() -> Result<(), SkimmerError> {
/// let candidates = ArxivSearch::new().search("diffusion models", 10).await?;
/// # Ok(())
/// # }
/// ```
pub struct ArxivSearch {
  /// Internal web client used to connect to the API.
  client:   reqwest::Client,
  /// Endpoint to query, overridable for tests.
  base_url: String,
}

impl ArxivSearch {
  /// Creates a new arXiv search client.
  pub fn new() -> Self {
    Self { client: reqwest::Client::new(), base_url: ARXIV_API_URL.to_string() }
  }

  /// Overrides the API endpoint, mainly for pointing tests at a stub
  /// server.
  pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
    self.base_url = base_url.into();
    self
  }

  /// Converts a parsed feed into candidates, dropping entries without a
  /// PDF link.
  fn collect_candidates(feed: Feed) -> Vec<PaperMeta> {
    feed
      .entries
      .into_iter()
      .filter_map(|entry| {
        let pdf_url = entry
          .links
          .iter()
          .find(|link| link.content_type.as_deref() == Some("application/pdf"))
          .map(|link| link.href.clone())?;

        Some(PaperMeta {
          source:        PaperSource::Arxiv,
          title:         entry.title.split_whitespace().collect::<Vec<_>>().join(" "),
          authors:       entry
            .authors
            .iter()
            .map(|author| author.name.as_str())
            .collect::<Vec<_>>()
            .join(", "),
          year:          entry.published.chars().take(4).collect(),
          venue:         "arXiv".to_string(),
          url:           entry.id,
          pdf_url,
          abstract_text: entry.summary.trim().to_string(),
        })
      })
      .collect()
  }
}

impl Default for ArxivSearch {
  fn default() -> Self { Self::new() }
}

#[async_trait]
impl SearchAdapter for ArxivSearch {
  async fn search(&self, keyword: &str, limit: usize) -> Result<Vec<PaperMeta>> {
    debug!("Searching arXiv for {keyword:?} (limit {limit})");

    let response = self
      .client
      .get(&self.base_url)
      .query(&[
        ("search_query", format!("all:{keyword}")),
        ("start", "0".to_string()),
        ("max_results", limit.to_string()),
      ])
      .send()
      .await?;

    let status = response.status();
    if !status.is_success() {
      return Err(SkimmerError::Api(format!("arXiv query returned {status}")));
    }

    let body = response.text().await?;
    trace!("arXiv response: {body}");

    let feed: Feed =
      from_str(&body).map_err(|e| SkimmerError::Api(format!("Failed to parse Atom feed: {e}")))?;

    Ok(Self::collect_candidates(feed))
  }

  fn provider(&self) -> &'static str { "arXiv" }
}

#[cfg(test)]
mod tests {
  use super::*;

  /// Two entries, the second of which has no PDF link and must be dropped.
  const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <entry>
    <id>http://arxiv.org/abs/1706.03762v7</id>
    <title>Attention Is All
  You Need</title>
    <summary>  The dominant sequence transduction models are based on RNNs.  </summary>
    <published>2017-06-12T17:57:34Z</published>
    <author><name>Ashish Vaswani</name></author>
    <author><name>Noam Shazeer</name></author>
    <link href="http://arxiv.org/abs/1706.03762v7" rel="alternate" type="text/html"/>
    <link title="pdf" href="http://arxiv.org/pdf/1706.03762v7" rel="related" type="application/pdf"/>
  </entry>
  <entry>
    <id>http://arxiv.org/abs/9999.00001v1</id>
    <title>No PDF Here</title>
    <summary>Withdrawn.</summary>
    <published>2020-01-01T00:00:00Z</published>
    <author><name>Someone</name></author>
    <link href="http://arxiv.org/abs/9999.00001v1" rel="alternate" type="text/html"/>
  </entry>
</feed>"#;

  #[test]
  fn entries_without_pdf_links_are_dropped() {
    let feed: Feed = from_str(FEED).unwrap();
    let candidates = ArxivSearch::collect_candidates(feed);

    assert_eq!(candidates.len(), 1);
    let paper = &candidates[0];
    assert_eq!(paper.source, PaperSource::Arxiv);
    assert_eq!(paper.title, "Attention Is All You Need");
    assert_eq!(paper.authors, "Ashish Vaswani, Noam Shazeer");
    assert_eq!(paper.year, "2017");
    assert_eq!(paper.pdf_url, "http://arxiv.org/pdf/1706.03762v7");
    assert_eq!(paper.abstract_text, "The dominant sequence transduction models are based on RNNs.");
  }

  #[tokio::test]
  async fn search_hits_the_configured_endpoint() {
    use wiremock::{
      matchers::{method, path, query_param},
      Mock, MockServer, ResponseTemplate,
    };

    let server = MockServer::start().await;
    Mock::given(method("GET"))
      .and(path("/api/query"))
      .and(query_param("search_query", "all:attention"))
      .and(query_param("max_results", "3"))
      .respond_with(ResponseTemplate::new(200).set_body_string(FEED))
      .mount(&server)
      .await;

    let adapter = ArxivSearch::new().with_base_url(format!("{}/api/query", server.uri()));
    let candidates = adapter.search("attention", 3).await.unwrap();
    assert_eq!(candidates.len(), 1);
  }

  #[tokio::test]
  async fn provider_errors_surface_as_api_errors() {
    use wiremock::{matchers::method, Mock, MockServer, ResponseTemplate};

    let server = MockServer::start().await;
    Mock::given(method("GET")).respond_with(ResponseTemplate::new(503)).mount(&server).await;

    let adapter = ArxivSearch::new().with_base_url(format!("{}/api/query", server.uri()));
    assert!(matches!(adapter.search("anything", 1).await, Err(SkimmerError::Api(_))));
  }
}
