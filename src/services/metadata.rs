use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::error::{Result, SummaryError};
use crate::models::VideoDetails;

const USER_AGENT: &str = "yt-summarizer/1.0";

/// Looks up the display title and thumbnail for a video URL.
#[async_trait]
pub trait MetadataResolver: Send + Sync {
    async fn resolve(&self, url: &str) -> std::result::Result<VideoDetails, SummaryError>;
}

#[derive(Debug, Deserialize)]
struct OEmbedResponse {
    title: Option<String>,
    thumbnail_url: Option<String>,
    error: Option<serde_json::Value>,
}

/// oEmbed lookup through noembed.com, which needs no API key.
pub struct NoembedResolver {
    client: Client,
    endpoint: String,
}

impl NoembedResolver {
    pub fn new(endpoint: impl Into<String>) -> Result<Self> {
        let client = Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    fn lookup_url(&self, video_url: &str) -> String {
        format!("{}?url={}", self.endpoint, urlencoding::encode(video_url))
    }
}

#[async_trait]
impl MetadataResolver for NoembedResolver {
    async fn resolve(&self, url: &str) -> std::result::Result<VideoDetails, SummaryError> {
        let response = match self.client.get(self.lookup_url(url)).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!("Error fetching video details for {}: {}", url, e);
                return Err(SummaryError::UnexpectedError);
            }
        };

        let status = response.status();
        if !status.is_success() {
            tracing::error!("Video details service returned {} for {}", status, url);
            return Err(SummaryError::MetadataServiceUnreachable {
                status: status.as_u16(),
            });
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                tracing::error!("Error reading video details for {}: {}", url, e);
                return Err(SummaryError::UnexpectedError);
            }
        };

        interpret_oembed(&body)
    }
}

/// Turn an oEmbed payload into details, or the matching user-facing error.
fn interpret_oembed(body: &str) -> std::result::Result<VideoDetails, SummaryError> {
    let payload: OEmbedResponse = serde_json::from_str(body).map_err(|e| {
        tracing::error!("Malformed video details payload: {}", e);
        SummaryError::MetadataIncomplete
    })?;

    if payload.error.as_ref().is_some_and(is_set) {
        tracing::warn!("Video details service rejected URL: {:?}", payload.error);
        return Err(SummaryError::MetadataNotFound);
    }

    match (non_empty(payload.title), non_empty(payload.thumbnail_url)) {
        (Some(title), Some(thumbnail)) => Ok(VideoDetails { title, thumbnail }),
        _ => Err(SummaryError::MetadataIncomplete),
    }
}

/// `null`, `false`, `0` and `""` count as no error.
fn is_set(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Null => false,
        serde_json::Value::Bool(flag) => *flag,
        serde_json::Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        serde_json::Value::String(s) => !s.is_empty(),
        serde_json::Value::Array(_) | serde_json::Value::Object(_) => true,
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    use super::*;

    /// Answer a single request with `response` and return the endpoint URL.
    async fn serve_once(response: String) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = [0u8; 4096];
            let _ = socket.read(&mut request).await;
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
        });
        format!("http://{addr}/embed")
    }

    fn http_response(status_line: &str, body: &str) -> String {
        format!(
            "HTTP/1.1 {status_line}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
            body.len()
        )
    }

    #[test]
    fn complete_payload_resolves() {
        let details = interpret_oembed(
            r#"{"title":"Intro to X","thumbnail_url":"http://img.example/t.jpg","provider_name":"YouTube"}"#,
        )
        .unwrap();
        assert_eq!(details.title, "Intro to X");
        assert_eq!(details.thumbnail, "http://img.example/t.jpg");
    }

    #[test]
    fn error_field_means_not_found() {
        let err = interpret_oembed(r#"{"error":"no matching providers found","url":"x"}"#)
            .unwrap_err();
        assert_eq!(err, SummaryError::MetadataNotFound);
        assert!(err.to_string().starts_with("Video not found"));
    }

    #[test]
    fn null_error_field_is_ignored() {
        let details =
            interpret_oembed(r#"{"error":null,"title":"T","thumbnail_url":"http://t"}"#).unwrap();
        assert_eq!(details.title, "T");
    }

    #[test]
    fn falsy_error_field_is_ignored() {
        for error in ["false", r#""""#, "0"] {
            let body = format!(r#"{{"error":{error},"title":"T","thumbnail_url":"http://t"}}"#);
            assert!(interpret_oembed(&body).is_ok(), "error {error} should be ignored");
        }
        assert_eq!(
            interpret_oembed(r#"{"error":true,"title":"T","thumbnail_url":"http://t"}"#),
            Err(SummaryError::MetadataNotFound)
        );
    }

    #[test]
    fn missing_or_blank_fields_are_incomplete() {
        assert_eq!(
            interpret_oembed(r#"{"title":"Only title"}"#),
            Err(SummaryError::MetadataIncomplete)
        );
        assert_eq!(
            interpret_oembed(r#"{"title":"  ","thumbnail_url":"http://t"}"#),
            Err(SummaryError::MetadataIncomplete)
        );
    }

    #[test]
    fn garbage_body_is_incomplete() {
        assert_eq!(
            interpret_oembed("<html>502 Bad Gateway</html>"),
            Err(SummaryError::MetadataIncomplete)
        );
    }

    #[test]
    fn lookup_url_percent_encodes_target() {
        let resolver = NoembedResolver::new("https://noembed.com/embed").unwrap();
        assert_eq!(
            resolver.lookup_url("https://www.youtube.com/watch?v=abc123&t=5"),
            "https://noembed.com/embed?url=https%3A%2F%2Fwww.youtube.com%2Fwatch%3Fv%3Dabc123%26t%3D5"
        );
    }

    #[tokio::test]
    async fn resolves_over_http() {
        let endpoint = serve_once(http_response(
            "200 OK",
            r#"{"title":"Intro to X","thumbnail_url":"http://img.example/t.jpg"}"#,
        ))
        .await;
        let resolver = NoembedResolver::new(endpoint).unwrap();

        let details = resolver.resolve("https://youtu.be/abc123").await.unwrap();
        assert_eq!(details.title, "Intro to X");
    }

    #[tokio::test]
    async fn error_status_reports_unreachable_service() {
        let endpoint = serve_once(http_response("500 Internal Server Error", "")).await;
        let resolver = NoembedResolver::new(endpoint).unwrap();

        let err = resolver.resolve("https://youtu.be/abc123").await.unwrap_err();
        assert_eq!(err, SummaryError::MetadataServiceUnreachable { status: 500 });
        assert!(err.to_string().contains("(Status: 500)"));
    }

    #[tokio::test]
    async fn connection_failure_is_unexpected() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let resolver = NoembedResolver::new(format!("http://{addr}/embed")).unwrap();

        let err = resolver.resolve("https://youtu.be/abc123").await.unwrap_err();
        assert_eq!(err, SummaryError::UnexpectedError);
    }
}
