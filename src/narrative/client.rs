//! Text-generation client
//!
//! [`NarrativeClient`] is the seam between sessions and the hosted model.
//! [`GeminiClient`] talks to the Generative Language `generateContent` endpoint.

use super::session::ChatMessage;
use crate::config::NarrativeSettings;
use crate::error::{RatioError, RatioResult};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Everything the model receives for one call
#[derive(Debug, Clone, PartialEq)]
pub struct NarrativeRequest {
    pub system_instruction: Option<String>,
    pub messages: Vec<ChatMessage>,
}

#[async_trait]
pub trait NarrativeClient: Send + Sync {
    async fn generate(&self, request: &NarrativeRequest) -> RatioResult<String>;
}

//==============================================================================
// Wire format
//==============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentPayload<'a> {
    contents: Vec<Content<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

fn build_payload(request: &NarrativeRequest) -> GenerateContentPayload<'_> {
    GenerateContentPayload {
        contents: request
            .messages
            .iter()
            .map(|m| Content {
                role: Some(m.role.as_str()),
                parts: vec![Part { text: &m.text }],
            })
            .collect(),
        system_instruction: request.system_instruction.as_deref().map(|text| Content {
            role: None,
            parts: vec![Part { text }],
        }),
    }
}

/// Concatenated text of the first candidate
fn parse_response(body: &str) -> RatioResult<String> {
    let response: GenerateContentResponse = serde_json::from_str(body)?;
    let text: String = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|content| content.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(RatioError::Narrative(
            "model returned no text candidates".to_string(),
        ));
    }
    Ok(text)
}

//==============================================================================
// Gemini
//==============================================================================

pub struct GeminiClient {
    client: Client,
    endpoint: String,
    model: String,
    api_key: String,
}

impl GeminiClient {
    /// Fails when the settings carry no API key
    pub fn new(settings: &NarrativeSettings) -> RatioResult<Self> {
        let api_key = settings
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                RatioError::Config(
                    "no API key configured for narrative generation (set GEMINI_API_KEY or narrative.api_key)"
                        .to_string(),
                )
            })?;

        Ok(Self {
            client: Client::new(),
            endpoint: settings.endpoint.trim_end_matches('/').to_string(),
            model: settings.model.clone(),
            api_key: api_key.to_string(),
        })
    }

    pub fn url(&self) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.endpoint, self.model)
    }
}

#[async_trait]
impl NarrativeClient for GeminiClient {
    async fn generate(&self, request: &NarrativeRequest) -> RatioResult<String> {
        let payload = build_payload(request);
        debug!(model = %self.model, messages = request.messages.len(), "sending generateContent request");

        let response = self
            .client
            .post(self.url())
            .header("x-goog-api-key", &self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| RatioError::Narrative(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to decode error response".to_string());
            warn!(%status, "narrative API returned an error");
            return Err(RatioError::Narrative(format!(
                "API returned {}: {}",
                status, error_text
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| RatioError::Narrative(format!("failed to read response: {}", e)))?;
        parse_response(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn settings(api_key: Option<&str>) -> NarrativeSettings {
        NarrativeSettings {
            api_key: api_key.map(str::to_string),
            ..NarrativeSettings::default()
        }
    }

    #[test]
    fn test_new_requires_api_key() {
        assert!(matches!(
            GeminiClient::new(&settings(None)),
            Err(RatioError::Config(_))
        ));
        assert!(GeminiClient::new(&settings(Some(""))).is_err());
        assert!(GeminiClient::new(&settings(Some("key"))).is_ok());
    }

    #[test]
    fn test_url() {
        let mut s = settings(Some("key"));
        s.endpoint = "http://localhost:9000/".to_string();
        s.model = "m1".to_string();
        let client = GeminiClient::new(&s).unwrap();
        assert_eq!(client.url(), "http://localhost:9000/v1beta/models/m1:generateContent");
    }

    #[test]
    fn test_payload_shape() {
        let request = NarrativeRequest {
            system_instruction: Some("be brief".to_string()),
            messages: vec![ChatMessage::user("hi"), ChatMessage::model("hello")],
        };
        let value = serde_json::to_value(build_payload(&request)).unwrap();
        assert_eq!(
            value,
            json!({
                "contents": [
                    {"role": "user", "parts": [{"text": "hi"}]},
                    {"role": "model", "parts": [{"text": "hello"}]}
                ],
                "systemInstruction": {"parts": [{"text": "be brief"}]}
            })
        );
    }

    #[test]
    fn test_payload_without_instruction() {
        let request = NarrativeRequest {
            system_instruction: None,
            messages: vec![ChatMessage::user("hi")],
        };
        let value = serde_json::to_value(build_payload(&request)).unwrap();
        assert!(value.get("systemInstruction").is_none());
    }

    #[test]
    fn test_parse_response_concatenates_parts() {
        let body = json!({
            "candidates": [
                {"content": {"role": "model", "parts": [{"text": "Assets "}, {"text": "grew."}]}},
                {"content": {"parts": [{"text": "ignored"}]}}
            ]
        })
        .to_string();
        assert_eq!(parse_response(&body).unwrap(), "Assets grew.");
    }

    #[test]
    fn test_parse_response_without_candidates() {
        let err = parse_response("{\"candidates\": []}").unwrap_err();
        assert!(matches!(err, RatioError::Narrative(_)));
        assert!(parse_response("{}").is_err());
    }

    #[test]
    fn test_parse_response_invalid_json() {
        assert!(matches!(parse_response("not json"), Err(RatioError::Json(_))));
    }
}
