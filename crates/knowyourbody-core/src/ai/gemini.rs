use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{ChatBackend, RemoteCallError, SessionHandle};
use crate::persona::DEFAULT_MODEL;

pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct GeminiPart {
    text: String,
}

#[derive(Serialize, Debug)]
struct GeminiContent {
    role: &'static str,
    parts: Vec<GeminiPart>,
}

#[derive(Serialize, Debug)]
struct GeminiInstruction {
    parts: Vec<GeminiPart>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    system_instruction: GeminiInstruction,
    contents: Vec<GeminiContent>,
}

#[derive(Deserialize)]
struct GeminiResponsePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize)]
struct GeminiResponseContent {
    #[serde(default)]
    parts: Vec<GeminiResponsePart>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiResponseContent>,
}

#[derive(Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl GeminiClient {
    pub fn new(api_key: &str) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.to_string(),
            model: DEFAULT_MODEL.to_string(),
            base_url: GEMINI_API_BASE.to_string(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/{}:generateContent", self.base_url, self.model)
    }

    fn build_request(session: &SessionHandle, text: &str) -> GeminiRequest {
        let mut contents = Vec::with_capacity(session.history().len() * 2 + 1);
        for exchange in session.history() {
            contents.push(GeminiContent {
                role: "user",
                parts: vec![GeminiPart { text: exchange.user.clone() }],
            });
            contents.push(GeminiContent {
                role: "model",
                parts: vec![GeminiPart { text: exchange.reply.clone() }],
            });
        }
        contents.push(GeminiContent {
            role: "user",
            parts: vec![GeminiPart { text: text.to_string() }],
        });

        GeminiRequest {
            system_instruction: GeminiInstruction {
                parts: vec![GeminiPart {
                    text: session.system_instruction().to_string(),
                }],
            },
            contents,
        }
    }

    fn parse_response(response: GeminiResponse) -> Result<String, RemoteCallError> {
        let candidate = response
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| RemoteCallError::Malformed("no candidates in response".to_string()))?;

        let text: String = candidate
            .content
            .map(|c| c.parts)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|p| p.text)
            .collect();

        if text.is_empty() {
            return Err(RemoteCallError::Malformed("candidate has no text".to_string()));
        }
        Ok(text)
    }
}

#[async_trait]
impl ChatBackend for GeminiClient {
    async fn send_turn(
        &self,
        session: &SessionHandle,
        text: &str,
    ) -> Result<String, RemoteCallError> {
        let request = Self::build_request(session, text);

        debug!(model = %self.model, turns = request.contents.len(), "Gemini request");

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| RemoteCallError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(RemoteCallError::Service { status, body });
        }

        let gemini_response: GeminiResponse = response
            .json()
            .await
            .map_err(|e| RemoteCallError::Malformed(e.to_string()))?;
        Self::parse_response(gemini_response)
    }
}
