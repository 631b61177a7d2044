use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SummaryError};
use crate::models::SummaryFormat;

const GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const SAFETY_FINISH_REASON: &str = "SAFETY";
/// Best-effort match on the provider's free-text error for a bad key.
const INVALID_KEY_MARKER: &str = "api key not valid";

/// Produces summary text for a video URL.
#[async_trait]
pub trait SummaryGenerator: Send + Sync {
    async fn generate(
        &self,
        url: &str,
        format: SummaryFormat,
    ) -> std::result::Result<String, SummaryError>;
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
    tools: Vec<Tool>,
}

#[derive(Debug, Serialize)]
struct Tool {
    google_search: GoogleSearch,
}

#[derive(Debug, Serialize)]
struct GoogleSearch {}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
    finish_reason: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated text parts of the first candidate.
    fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|part| part.text.as_deref())
                    .collect::<String>()
            })
            .unwrap_or_default()
    }
}

/// Everything that can go wrong inside one generation call, before it is
/// reduced to a user-facing [`SummaryError`].
#[derive(Debug, thiserror::Error)]
enum GenerationFailure {
    #[error("no API key configured")]
    MissingApiKey,

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("API error ({status}): {body}")]
    Provider { status: StatusCode, body: String },

    #[error("unreadable response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("{}", SummaryError::GenerationBlocked)]
    Blocked,

    #[error("{}", SummaryError::GenerationEmpty)]
    Empty,
}

impl GenerationFailure {
    fn into_user_error(self) -> SummaryError {
        if self.to_string().to_lowercase().contains(INVALID_KEY_MARKER) {
            return SummaryError::ServiceMisconfigured;
        }

        match self {
            GenerationFailure::MissingApiKey => SummaryError::ServiceMisconfigured,
            GenerationFailure::Blocked => SummaryError::GenerationBlocked,
            GenerationFailure::Empty => SummaryError::GenerationEmpty,
            GenerationFailure::Transport(_)
            | GenerationFailure::Provider { .. }
            | GenerationFailure::Decode(_) => SummaryError::ServiceUnavailable,
        }
    }
}

pub struct Summarizer {
    client: Client,
    api_key: Option<String>,
    model: String,
}

impl Summarizer {
    pub fn new(api_key: Option<String>, model: impl Into<String>) -> Result<Self> {
        let client = Client::builder().build()?;
        Ok(Self {
            client,
            api_key,
            model: model.into(),
        })
    }

    pub fn model_version(&self) -> &str {
        &self.model
    }

    async fn request_summary(
        &self,
        url: &str,
        format: SummaryFormat,
    ) -> std::result::Result<String, GenerationFailure> {
        let api_key = self
            .api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or(GenerationFailure::MissingApiKey)?;

        let request = GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: Some(build_prompt(url, format)),
                }],
            }],
            tools: vec![Tool {
                google_search: GoogleSearch {},
            }],
        };

        let response = self
            .client
            .post(format!("{}/{}:generateContent", GEMINI_API_URL, self.model))
            .header("x-goog-api-key", api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(GenerationFailure::Provider { status, body });
        }

        extract_summary(&body)
    }
}

#[async_trait]
impl SummaryGenerator for Summarizer {
    async fn generate(
        &self,
        url: &str,
        format: SummaryFormat,
    ) -> std::result::Result<String, SummaryError> {
        tracing::info!("Generating summary for {} in format: {}", url, format);

        self.request_summary(url, format).await.map_err(|failure| {
            tracing::error!("Error generating summary: {}", failure);
            failure.into_user_error()
        })
    }
}

fn build_prompt(url: &str, format: SummaryFormat) -> String {
    format!(
        r#"Please generate a summary for the YouTube video at the following URL: {url}

**Requested Format:** {label}

**Instructions:**
{instruction}

**Summary:**"#,
        label = format.label(),
        instruction = format.instruction(),
    )
}

/// Apply the success checks to a raw `generateContent` response body.
fn extract_summary(body: &str) -> std::result::Result<String, GenerationFailure> {
    let response: GenerateContentResponse = serde_json::from_str(body)?;

    let blocked = match response.candidates.first() {
        None => true,
        Some(candidate) => candidate.finish_reason.as_deref() == Some(SAFETY_FINISH_REASON),
    };
    if blocked {
        return Err(GenerationFailure::Blocked);
    }

    let text = response.text().trim().to_string();
    if text.is_empty() {
        return Err(GenerationFailure::Empty);
    }

    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_embeds_url_label_and_instruction() {
        let prompt = build_prompt("https://youtu.be/abc123", SummaryFormat::Abstract);
        assert!(prompt.contains("https://youtu.be/abc123"));
        assert!(prompt.contains("**Requested Format:** Abstract (1-2 sentences)"));
        assert!(prompt.contains(SummaryFormat::Abstract.instruction()));
    }

    #[test]
    fn request_enables_search_tool() {
        let request = GenerateContentRequest {
            contents: vec![],
            tools: vec![Tool {
                google_search: GoogleSearch {},
            }],
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["tools"][0]["google_search"], serde_json::json!({}));
    }

    #[test]
    fn extracts_and_trims_candidate_text() {
        let body = r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"  X is a short "},{"text":"overview.\n"}]},"finishReason":"STOP"}]}"#;
        assert_eq!(extract_summary(body).unwrap(), "X is a short overview.");
    }

    #[test]
    fn safety_finish_reason_is_blocked() {
        let body = r#"{"candidates":[{"finishReason":"SAFETY"}]}"#;
        let failure = extract_summary(body).unwrap_err();
        assert_eq!(failure.into_user_error(), SummaryError::GenerationBlocked);
    }

    #[test]
    fn no_candidates_is_blocked() {
        let body = r#"{"promptFeedback":{"blockReason":"OTHER"}}"#;
        let failure = extract_summary(body).unwrap_err();
        assert_eq!(failure.into_user_error(), SummaryError::GenerationBlocked);
    }

    #[test]
    fn whitespace_only_text_is_empty() {
        let body = r#"{"candidates":[{"content":{"parts":[{"text":"  \n "}]},"finishReason":"STOP"}]}"#;
        let failure = extract_summary(body).unwrap_err();
        assert_eq!(failure.into_user_error(), SummaryError::GenerationEmpty);
    }

    #[test]
    fn invalid_key_maps_to_misconfigured_without_leaking_detail() {
        let failure = GenerationFailure::Provider {
            status: StatusCode::BAD_REQUEST,
            body: r#"{"error":{"code":400,"message":"API key not valid. Please pass a valid API key.","status":"INVALID_ARGUMENT"}}"#.to_string(),
        };
        let error = failure.into_user_error();
        assert_eq!(error, SummaryError::ServiceMisconfigured);
        assert!(!error.to_string().contains("API key not valid"));
    }

    #[test]
    fn missing_key_maps_to_misconfigured() {
        assert_eq!(
            GenerationFailure::MissingApiKey.into_user_error(),
            SummaryError::ServiceMisconfigured
        );
    }

    #[test]
    fn other_provider_errors_collapse_to_unavailable() {
        let failure = GenerationFailure::Provider {
            status: StatusCode::SERVICE_UNAVAILABLE,
            body: "backend overloaded at shard 7".to_string(),
        };
        assert_eq!(failure.into_user_error(), SummaryError::ServiceUnavailable);

        let decode = extract_summary("not json").unwrap_err();
        assert_eq!(decode.into_user_error(), SummaryError::ServiceUnavailable);
    }

    #[tokio::test]
    async fn unconfigured_summarizer_reports_misconfiguration() {
        let summarizer = Summarizer::new(None, "gemini-2.5-flash").unwrap();
        let err = summarizer
            .generate("https://youtu.be/abc123", SummaryFormat::KeyTopics)
            .await
            .unwrap_err();
        assert_eq!(err, SummaryError::ServiceMisconfigured);
    }
}
