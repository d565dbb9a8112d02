// provider/gemini.rs — Gemini generateContent client.
//
// Single request / single response, no streaming. The request carries the
// system instruction plus the normalized history and the new user turn; the
// reply is the first candidate's first text part.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::ProviderConfig;

use super::{ChatProvider, ProviderError, ProviderTurn, TurnRole};

pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(cfg: &ProviderConfig) -> Result<Self, ProviderError> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(cfg.timeout))
            .build()?;
        Ok(Self {
            http,
            api_key: cfg.api_key.clone(),
            model: cfg.model.clone(),
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
        })
    }
}

// ─── Wire types ───────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize, Clone)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<TurnRole>,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    system_instruction: Content,
    contents: Vec<Content>,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: Option<ApiErrorBody>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: String,
}

fn turn_content(role: TurnRole, text: &str) -> Content {
    Content {
        role: Some(role),
        parts: vec![Part {
            text: text.to_string(),
        }],
    }
}

impl GenerateContentRequest {
    fn build(system_instruction: &str, history: &[ProviderTurn], message: &str) -> Self {
        let mut contents: Vec<Content> = history
            .iter()
            .map(|t| turn_content(t.role, &t.text))
            .collect();
        contents.push(turn_content(TurnRole::User, message));

        Self {
            system_instruction: Content {
                role: None,
                parts: vec![Part {
                    text: system_instruction.to_string(),
                }],
            },
            contents,
        }
    }
}

#[async_trait]
impl ChatProvider for GeminiClient {
    async fn generate(
        &self,
        system_instruction: &str,
        history: &[ProviderTurn],
        message: &str,
    ) -> Result<String, ProviderError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );
        let body = GenerateContentRequest::build(system_instruction, history, message);

        let resp = self
            .http
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            // Pull the provider's own message out of the error envelope when
            // it has one; the raw body otherwise.
            let text = resp.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorEnvelope>(&text)
                .ok()
                .and_then(|e| e.error)
                .map(|e| e.message)
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| format!("provider request failed with status {status}"));
            return Err(ProviderError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: GenerateContentResponse = resp.json().await?;
        parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|c| c.parts.into_iter().next())
            .map(|p| p.text)
            .filter(|t| !t.is_empty())
            .ok_or(ProviderError::Empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_serializes_in_provider_vocabulary() {
        let history = vec![
            ProviderTurn {
                role: TurnRole::User,
                text: "hi".into(),
            },
            ProviderTurn {
                role: TurnRole::Model,
                text: "hello".into(),
            },
        ];
        let req = GenerateContentRequest::build("be brief", &history, "what now?");
        let json = serde_json::to_value(&req).unwrap();

        assert_eq!(json["systemInstruction"]["parts"][0]["text"], "be brief");
        assert_eq!(json["contents"][0]["role"], "user");
        assert_eq!(json["contents"][1]["role"], "model");
        // The new message is appended as the final user turn.
        assert_eq!(json["contents"][2]["role"], "user");
        assert_eq!(json["contents"][2]["parts"][0]["text"], "what now?");
        // System instruction carries no role field.
        assert!(json["systemInstruction"].get("role").is_none());
    }

    #[test]
    fn response_text_is_first_candidate_part() {
        let raw = r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"The wifi password is ABC123."}]}}]}"#;
        let parsed: GenerateContentResponse = serde_json::from_str(raw).unwrap();
        let text = parsed.candidates[0].content.as_ref().unwrap().parts[0]
            .text
            .clone();
        assert_eq!(text, "The wifi password is ABC123.");
    }

    #[test]
    fn error_envelope_message_is_extracted() {
        let raw = r#"{"error":{"code":429,"message":"rate limited","status":"RESOURCE_EXHAUSTED"}}"#;
        let parsed: ApiErrorEnvelope = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.error.unwrap().message, "rate limited");
    }
}
