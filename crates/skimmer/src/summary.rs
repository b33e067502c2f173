//! Structured summarization via a chat-completion language model.
//!
//! The summarizer sends a paper's cleaned text to the model with a fixed
//! ten-item instruction and validates the reply against the [`Summary`]
//! schema. Three things can go wrong, and each is kept distinct so the
//! pipeline can report it precisely:
//!
//! - the call itself fails (rate limit, auth, network) — [`SkimmerError::Llm`]
//! - the reply is not JSON — [`SkimmerError::SummaryParse`]
//! - the reply is JSON but misses required keys or has wrong value shapes —
//!   [`SkimmerError::SummarySchema`]
//!
//! Models routinely wrap JSON replies in Markdown code fences despite being
//! told not to, so the fence is stripped before parsing.
//!
//! # Examples
//!
//! ```no_run
//! use skimmer::summary::{LlmConfig, Summarizer};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let summarizer = Summarizer::new(LlmConfig::from_env()?);
//! let summary = summarizer.summarize("論文本文...").await?;
//! println!("結論: {}", summary.conclusion);
//! # Ok(())
//! # }
//! ```

use super::*;

/// Default chat-completions API base.
const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Default model for summarization.
const DEFAULT_MODEL: &str = "gpt-4o";

/// Low sampling temperature; summaries should be stable across runs.
const DEFAULT_TEMPERATURE: f64 = 0.3;

lazy_static! {
  /// Leading/trailing Markdown code fence, with or without a language tag.
  static ref CODE_FENCE: Regex = Regex::new(r"^```(?:json)?\s*|\s*```$").unwrap();
}

/// Language-model connection settings.
///
/// Constructed once at process start and handed to [`Summarizer::new`];
/// there is no global client state. The API key is the only value sourced
/// from the environment.
#[derive(Debug, Clone)]
pub struct LlmConfig {
  /// Bearer token for the API
  pub api_key:     String,
  /// API base URL, e.g. `https://api.openai.com/v1`
  pub base_url:    String,
  /// Model identifier
  pub model:       String,
  /// Sampling temperature
  pub temperature: f64,
}

impl LlmConfig {
  /// Creates a configuration with the given API key and default endpoint,
  /// model, and temperature.
  pub fn new(api_key: impl Into<String>) -> Self {
    Self {
      api_key:     api_key.into(),
      base_url:    DEFAULT_BASE_URL.to_string(),
      model:       DEFAULT_MODEL.to_string(),
      temperature: DEFAULT_TEMPERATURE,
    }
  }

  /// Reads the API key from the `OPENAI_API_KEY` environment variable.
  pub fn from_env() -> Result<Self> {
    let api_key = std::env::var("OPENAI_API_KEY")
      .map_err(|_| SkimmerError::Config("OPENAI_API_KEY is not set".to_string()))?;
    Ok(Self::new(api_key))
  }

  /// Overrides the API base URL.
  pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
    self.base_url = base_url.into();
    self
  }

  /// Overrides the model identifier.
  pub fn with_model(mut self, model: impl Into<String>) -> Self {
    self.model = model.into();
    self
  }
}

/// Request body for the chat-completions endpoint.
#[derive(Serialize)]
struct ChatRequest<'a> {
  /// Model identifier
  model:       &'a str,
  /// Single-turn conversation carrying the summarization prompt
  messages:    Vec<ChatMessage<'a>>,
  /// Sampling temperature
  temperature: f64,
}

/// One conversation message.
#[derive(Serialize)]
struct ChatMessage<'a> {
  /// Message role, always "user" here
  role:    &'a str,
  /// Message content
  content: &'a str,
}

/// Response envelope from the chat-completions endpoint.
#[derive(Deserialize)]
struct ChatResponse {
  /// Completion alternatives; only the first is used
  choices: Vec<ChatChoice>,
}

/// One completion alternative.
#[derive(Deserialize)]
struct ChatChoice {
  /// The generated message
  message: ChatResponseMessage,
}

/// The generated message payload.
#[derive(Deserialize)]
struct ChatResponseMessage {
  /// Generated text content
  content: String,
}

/// Produces validated ten-field summaries from paper text.
pub struct Summarizer {
  /// Internal web client used to reach the API.
  client: reqwest::Client,
  /// Connection settings.
  config: LlmConfig,
}

impl Summarizer {
  /// Creates a summarizer from the given configuration.
  pub fn new(config: LlmConfig) -> Self { Self { client: reqwest::Client::new(), config } }

  /// Summarizes `text` into the fixed ten-field shape.
  ///
  /// # Errors
  ///
  /// - [`SkimmerError::Llm`] when the API call fails or returns an
  ///   unreadable envelope
  /// - [`SkimmerError::SummaryParse`] when the model's reply is not JSON
  /// - [`SkimmerError::SummarySchema`] when the reply does not match the
  ///   summary schema
  pub async fn summarize(&self, text: &str) -> Result<Summary> {
    let prompt = build_prompt(text);
    let request = ChatRequest {
      model:       &self.config.model,
      messages:    vec![ChatMessage { role: "user", content: &prompt }],
      temperature: self.config.temperature,
    };

    let url = format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'));
    debug!("Requesting summary from {url} ({} chars of text)", text.len());

    let response =
      self.client.post(&url).bearer_auth(&self.config.api_key).json(&request).send().await?;

    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
      return Err(SkimmerError::Llm(format!("chat completion returned {status}: {body}")));
    }

    let completion: ChatResponse = serde_json::from_str(&body)
      .map_err(|e| SkimmerError::Llm(format!("unexpected chat completion payload: {e}")))?;
    let content = completion
      .choices
      .into_iter()
      .next()
      .map(|choice| choice.message.content)
      .ok_or_else(|| SkimmerError::Llm("chat completion contained no choices".to_string()))?;

    trace!("Model reply: {content}");
    parse_summary(&content)
  }
}

/// Builds the fixed summarization prompt around the paper text.
fn build_prompt(text: &str) -> String {
  format!(
    r#"以下の論文本文を読み、次の10項目ごとに簡潔にまとめてください。

1. 背景
2. 目的
3. 新規性
4. 方法
5. 結果
6. 考察
7. 懸念点
8. 結論
9. 今後の展望
10. キーワード

出力は次の形式のJSONで返してください。キーワードはリスト形式で返してください：
{{
  "背景": "...",
  "目的": "...",
  "新規性": "...",
  "方法": "...",
  "結果": "...",
  "考察": "...",
  "懸念点": "...",
  "結論": "...",
  "今後の展望": "...",
  "キーワード": ["...", "...", "..."]
}}

以下が論文本文です：
{text}

必ずJSON形式のみを返してください。説明文や前置きは一切不要です。"#
  )
}

/// Parses and validates a raw model reply into a [`Summary`].
///
/// Strips any Markdown code fence, parses the remainder as JSON, and then
/// checks it against the ten-field schema. Exposed separately from
/// [`Summarizer::summarize`] so validation can be exercised without a live
/// model.
pub fn parse_summary(raw: &str) -> Result<Summary> {
  let cleaned = strip_code_fence(raw);

  let value: serde_json::Value = serde_json::from_str(&cleaned)
    .map_err(|source| SkimmerError::SummaryParse { source, payload: cleaned.clone() })?;

  serde_json::from_value(value)
    .map_err(|e| SkimmerError::SummarySchema { message: e.to_string(), payload: cleaned })
}

/// Removes a wrapping Markdown code fence from a model reply.
fn strip_code_fence(raw: &str) -> String {
  CODE_FENCE.replace_all(raw.trim(), "").trim().to_string()
}

/// Writes a summary as pretty-printed JSON next to its siblings in `dir`,
/// named after the sanitized stem of `pdf_path`. Returns the path written.
///
/// Reading the file back yields the summary field-for-field; the document
/// uses the same Japanese keys the model was asked to produce.
pub fn save_summary(
  summary: &Summary,
  pdf_path: impl AsRef<Path>,
  dir: impl AsRef<Path>,
) -> Result<PathBuf> {
  let stem = pdf_path
    .as_ref()
    .file_stem()
    .map(|stem| stem.to_string_lossy().into_owned())
    .unwrap_or_default();
  let safe_stem = format::sanitize_filename(&stem);

  let dir = dir.as_ref();
  std::fs::create_dir_all(dir)?;
  let path = dir.join(format!("{safe_stem}.json"));

  std::fs::write(&path, serde_json::to_string_pretty(summary)?)?;
  debug!("Saved summary to {path:?}");
  Ok(path)
}

#[cfg(test)]
mod tests {
  use super::*;

  /// A complete, valid reply body.
  const VALID: &str = r#"{
    "背景": "大規模モデルの計算コストが課題となっている。",
    "目的": "推論コストの削減。",
    "新規性": "疎な注意機構の提案。",
    "方法": "ベンチマークでの比較実験。",
    "結果": "精度を保ちながら30%高速化。",
    "考察": "長系列で特に有効。",
    "懸念点": "短系列では効果が小さい。",
    "結論": "実用的な高速化手法である。",
    "今後の展望": "他のタスクへの適用。",
    "キーワード": ["attention", "efficiency", "transformer"]
  }"#;

  #[test]
  fn parses_a_bare_json_reply() {
    let summary = parse_summary(VALID).unwrap();
    assert_eq!(summary.purpose, "推論コストの削減。");
    assert_eq!(summary.keywords, vec!["attention", "efficiency", "transformer"]);
  }

  #[test]
  fn parses_a_fence_wrapped_reply() {
    let wrapped = format!("```json\n{VALID}\n```");
    let summary = parse_summary(&wrapped).unwrap();
    assert_eq!(summary.background, "大規模モデルの計算コストが課題となっている。");

    // fences without a language tag too
    let wrapped = format!("```\n{VALID}\n```");
    assert!(parse_summary(&wrapped).is_ok());
  }

  #[test]
  fn non_json_reply_is_a_parse_failure_with_payload() {
    match parse_summary("申し訳ありませんが、要約できません。") {
      Err(SkimmerError::SummaryParse { payload, .. }) => {
        assert!(payload.contains("申し訳"));
      },
      other => panic!("expected SummaryParse, got {other:?}"),
    }
  }

  #[test]
  fn missing_keywords_field_fails_schema_validation() {
    let mut value: serde_json::Value = serde_json::from_str(VALID).unwrap();
    value.as_object_mut().unwrap().remove("キーワード");
    let without_keywords = value.to_string();

    match parse_summary(&without_keywords) {
      Err(SkimmerError::SummarySchema { message, payload }) => {
        assert!(message.contains("キーワード"), "message was {message:?}");
        assert!(!payload.is_empty());
      },
      other => panic!("expected SummarySchema, got {other:?}"),
    }
  }

  #[test]
  fn wrong_value_shape_fails_schema_validation() {
    let mut value: serde_json::Value = serde_json::from_str(VALID).unwrap();
    value["キーワード"] = serde_json::json!("not a list");
    assert!(matches!(
      parse_summary(&value.to_string()),
      Err(SkimmerError::SummarySchema { .. })
    ));
  }

  #[test]
  fn saved_summary_reads_back_identically() {
    let summary = parse_summary(VALID).unwrap();
    let dir = tempdir().unwrap();

    let path = save_summary(&summary, "data/pdf/arXiv_2017_Attention.pdf", dir.path()).unwrap();
    assert!(path.ends_with("arXiv_2017_Attention.json"));

    let restored: Summary =
      serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(restored, summary);
  }

  #[tokio::test]
  async fn upstream_rejection_is_an_llm_error() {
    use wiremock::{matchers::method, Mock, MockServer, ResponseTemplate};

    let server = MockServer::start().await;
    Mock::given(method("POST"))
      .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
      .mount(&server)
      .await;

    let summarizer = Summarizer::new(LlmConfig::new("key").with_base_url(server.uri()));
    match summarizer.summarize("text").await {
      Err(SkimmerError::Llm(message)) => assert!(message.contains("429")),
      other => panic!("expected Llm error, got {other:?}"),
    }
  }

  #[tokio::test]
  async fn fenced_model_reply_round_trips_through_the_api() {
    use wiremock::{
      matchers::{method, path},
      Mock, MockServer, ResponseTemplate,
    };

    let server = MockServer::start().await;
    let reply = serde_json::json!({
      "choices": [{"message": {"role": "assistant", "content": format!("```json\n{VALID}\n```")}}]
    });
    Mock::given(method("POST"))
      .and(path("/chat/completions"))
      .respond_with(ResponseTemplate::new(200).set_body_json(reply))
      .mount(&server)
      .await;

    let summarizer = Summarizer::new(LlmConfig::new("key").with_base_url(server.uri()));
    let summary = summarizer.summarize("本文").await.unwrap();
    assert_eq!(summary.conclusion, "実用的な高速化手法である。");
  }
}
