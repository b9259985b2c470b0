use crate::error::GenerationError;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use url::Url;

pub const DEFAULT_CHAT_MODEL: &str = "gemini-1.5-flash-latest";
pub const DEFAULT_TEMPERATURE: f32 = 0.3;
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/";

/// Synchronous request/response client for a hosted chat model.
pub trait ChatModel {
    fn complete(&self, prompt: &str) -> Result<String, GenerationError>;
}

#[derive(Debug, Clone, Serialize)]
struct GenerateRequest {
    contents: Vec<RequestContent>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Clone, Serialize)]
struct RequestContent {
    role: String,
    parts: Vec<TextPart>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct TextPart {
    text: String,
}

#[derive(Debug, Clone, Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Debug, Clone, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Clone, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Clone, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<TextPart>,
}

/// Client for the hosted `generateContent` chat endpoint.
pub struct GeminiChatClient {
    base_url: String,
    model: String,
    api_key: String,
    temperature: f32,
    client: Client,
}

impl GeminiChatClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_CHAT_MODEL.to_string(),
            api_key: api_key.into(),
            temperature: DEFAULT_TEMPERATURE,
            client: Client::new(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    fn endpoint(&self) -> Result<Url, GenerationError> {
        let base = Url::parse(&self.base_url)?;
        Ok(base.join(&format!("v1beta/models/{}:generateContent", self.model))?)
    }
}

impl ChatModel for GeminiChatClient {
    fn complete(&self, prompt: &str) -> Result<String, GenerationError> {
        let payload = GenerateRequest {
            contents: vec![RequestContent {
                role: "user".to_string(),
                parts: vec![TextPart {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: self.temperature,
            },
        };

        let response = self
            .client
            .post(self.endpoint()?)
            .header("x-goog-api-key", &self.api_key)
            .json(&payload)
            .send()?;

        if !response.status().is_success() {
            return Err(GenerationError::Api {
                status: response.status().as_u16(),
                details: response.text().unwrap_or_default(),
            });
        }

        let parsed: GenerateResponse = response.json()?;
        response_text(&parsed)
    }
}

fn response_text(response: &GenerateResponse) -> Result<String, GenerationError> {
    let text = response
        .candidates
        .first()
        .and_then(|candidate| candidate.content.as_ref())
        .map(|content| {
            content
                .parts
                .iter()
                .map(|part| part.text.as_str())
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(GenerationError::EmptyResponse);
    }

    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_payload_has_expected_wire_shape() {
        let payload = GenerateRequest {
            contents: vec![RequestContent {
                role: "user".to_string(),
                parts: vec![TextPart {
                    text: "What is the capital?".to_string(),
                }],
            }],
            generation_config: GenerationConfig { temperature: 0.3 },
        };

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["contents"][0]["role"], "user");
        assert_eq!(json["contents"][0]["parts"][0]["text"], "What is the capital?");
        let temperature = json["generationConfig"]["temperature"].as_f64().unwrap();
        assert!((temperature - 0.3).abs() < 1e-6);
    }

    #[test]
    fn response_text_joins_candidate_parts() {
        let parsed: GenerateResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[{"text":"Testville"},{"text":" is the capital."}]}}]}"#,
        )
        .unwrap();

        assert_eq!(response_text(&parsed).unwrap(), "Testville is the capital.");
    }

    #[test]
    fn empty_candidates_are_an_error() {
        let parsed: GenerateResponse = serde_json::from_str(r#"{"candidates":[]}"#).unwrap();
        assert!(matches!(
            response_text(&parsed),
            Err(GenerationError::EmptyResponse)
        ));

        let parsed: GenerateResponse = serde_json::from_str(r#"{}"#).unwrap();
        assert!(matches!(
            response_text(&parsed),
            Err(GenerationError::EmptyResponse)
        ));
    }

    #[test]
    fn endpoint_includes_model_name() {
        let client = GeminiChatClient::new("test-key").with_model("gemini-1.5-flash-latest");
        let endpoint = client.endpoint().unwrap();
        assert_eq!(
            endpoint.as_str(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash-latest:generateContent"
        );
    }
}
