//! Blocking client for the Ollama `/api/chat` endpoint.

use autodeck_core::summarize::NO_CONTENT_PLACEHOLDER;
use autodeck_core::{
    slide_prompt, Error, MissingContentPolicy, ModelReply, Result, Summarizer, SummarizerConfig,
};
use reqwest::blocking::Client;
use reqwest::header::{HeaderValue, CONTENT_TYPE};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Summarizes chunks by asking a local Ollama model for slide content.
///
/// Exactly one request is made per chunk. Every failure, timeouts
/// included, comes back as [`ModelReply::Failure`].
#[derive(Debug, Clone)]
pub struct OllamaClient {
    client: Client,
    url: String,
    model: String,
    timeout: Duration,
    missing_content: MissingContentPolicy,
}

impl OllamaClient {
    /// Build a client from the summarizer settings.
    pub fn new(config: &SummarizerConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::HttpError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            url: config.chat_url(),
            model: config.model.clone(),
            timeout: config.timeout,
            missing_content: config.missing_content,
        })
    }

    /// Full URL requests are sent to.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Model identifier sent with each request.
    pub fn model(&self) -> &str {
        &self.model
    }

    fn send(&self, chunk: &str) -> std::result::Result<(StatusCode, String), String> {
        let prompt = slide_prompt(chunk);
        let body = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: &prompt,
            }],
            stream: false,
        };

        let resp = self
            .client
            .post(&self.url)
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .json(&body)
            .send()
            .map_err(|e| self.describe(e))?;

        let status = resp.status();
        let text = resp.text().map_err(|e| self.describe(e))?;
        Ok((status, text))
    }

    fn describe(&self, err: reqwest::Error) -> String {
        if err.is_timeout() {
            format!("request timed out after {}s", self.timeout.as_secs_f64())
        } else if err.is_connect() {
            format!("could not connect to {}: {}", self.url, err)
        } else {
            err.to_string()
        }
    }
}

impl Summarizer for OllamaClient {
    fn summarize(&self, chunk: &str) -> ModelReply {
        log::debug!("POST {} ({} chars, model {})", self.url, chunk.chars().count(), self.model);
        match self.send(chunk) {
            Ok((status, body)) => reply_from_response(status, &body, self.missing_content),
            Err(reason) => ModelReply::failure(reason),
        }
    }
}

/// Turn a raw HTTP reply into a [`ModelReply`].
pub fn reply_from_response(
    status: StatusCode,
    body: &str,
    missing_content: MissingContentPolicy,
) -> ModelReply {
    let parsed: std::result::Result<ChatResponse, _> = serde_json::from_str(body);

    if !status.is_success() {
        let detail = match parsed {
            Ok(ChatResponse {
                error: Some(error), ..
            }) => error,
            _ => body.trim().to_string(),
        };
        return ModelReply::failure(format!("service returned {}: {}", status, detail));
    }

    let parsed = match parsed {
        Ok(parsed) => parsed,
        Err(e) => return ModelReply::failure(format!("malformed reply: {}", e)),
    };

    match parsed.message.and_then(|m| m.content) {
        Some(content) => ModelReply::Success(content),
        None => match missing_content {
            MissingContentPolicy::Placeholder => {
                log::warn!("Reply had no message content; using placeholder");
                ModelReply::Success(NO_CONTENT_PLACEHOLDER.to_string())
            }
            MissingContentPolicy::Failure => match parsed.error {
                Some(error) => ModelReply::failure(error),
                None => ModelReply::failure("reply had no message content"),
            },
        },
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: Option<AssistantMessage>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_shape() {
        let prompt = slide_prompt("text");
        let body = ChatRequest {
            model: "llama3",
            messages: vec![ChatMessage {
                role: "user",
                content: &prompt,
            }],
            stream: false,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["model"], "llama3");
        assert_eq!(json["stream"], false);
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"].as_array().unwrap().len(), 1);
        assert!(json["messages"][0]["content"]
            .as_str()
            .unwrap()
            .contains("\n\ntext\n\n"));
    }

    #[test]
    fn test_content_extracted() {
        let body = r#"{"model":"llama3","message":{"role":"assistant","content":"Title\nA"},"done":true}"#;
        let reply = reply_from_response(StatusCode::OK, body, MissingContentPolicy::Placeholder);
        assert_eq!(reply, ModelReply::Success("Title\nA".into()));
    }

    #[test]
    fn test_missing_content_placeholder() {
        let reply = reply_from_response(StatusCode::OK, r#"{"done":true}"#, MissingContentPolicy::Placeholder);
        assert_eq!(reply, ModelReply::Success(NO_CONTENT_PLACEHOLDER.into()));

        let reply = reply_from_response(
            StatusCode::OK,
            r#"{"message":{"role":"assistant"}}"#,
            MissingContentPolicy::Placeholder,
        );
        assert_eq!(reply, ModelReply::Success(NO_CONTENT_PLACEHOLDER.into()));
    }

    #[test]
    fn test_missing_content_strict() {
        let reply = reply_from_response(StatusCode::OK, r#"{"done":true}"#, MissingContentPolicy::Failure);
        assert_eq!(
            reply,
            ModelReply::Failure("Error: reply had no message content".into())
        );
    }

    #[test]
    fn test_error_status() {
        let reply = reply_from_response(
            StatusCode::NOT_FOUND,
            r#"{"error":"model \"llama9\" not found"}"#,
            MissingContentPolicy::Placeholder,
        );
        assert_eq!(
            reply,
            ModelReply::Failure("Error: service returned 404 Not Found: model \"llama9\" not found".into())
        );

        let reply = reply_from_response(
            StatusCode::BAD_GATEWAY,
            "upstream down\n",
            MissingContentPolicy::Placeholder,
        );
        assert_eq!(
            reply,
            ModelReply::Failure("Error: service returned 502 Bad Gateway: upstream down".into())
        );
    }

    #[test]
    fn test_html_error_page_gives_one_line_title() {
        let body = "<html>\n<head><title>502 Bad Gateway</title></head>\n<body>nginx</body>\n</html>\n";
        let reply = reply_from_response(StatusCode::BAD_GATEWAY, body, MissingContentPolicy::Placeholder);

        let slide = autodeck_core::parse_reply(&reply);
        assert!(!slide.title.contains('\n'), "{:?}", slide.title);
        assert!(slide.title.starts_with("Error: service returned 502 Bad Gateway: <html>"));
        assert!(slide.title.ends_with("<body>nginx</body> </html>"));
        assert!(slide.bullets.is_empty());
    }

    #[test]
    fn test_malformed_body() {
        let reply = reply_from_response(StatusCode::OK, "<html>", MissingContentPolicy::Placeholder);
        assert!(matches!(reply, ModelReply::Failure(ref r) if r.starts_with("Error: malformed reply")));

        let reply = reply_from_response(StatusCode::OK, "[1,2]", MissingContentPolicy::Placeholder);
        assert!(reply.is_failure());
    }

    #[test]
    fn test_client_url() {
        let config = SummarizerConfig::new().with_endpoint("http://127.0.0.1:9999/");
        let client = OllamaClient::new(&config).unwrap();
        assert_eq!(client.url(), "http://127.0.0.1:9999/api/chat");
        assert_eq!(client.model(), "llama3");
    }
}
