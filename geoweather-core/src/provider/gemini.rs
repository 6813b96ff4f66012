use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::{
    config::{DEFAULT_GEMINI_BASE_URL, DEFAULT_MODEL},
    coordinate::Coordinate,
    error::WeatherError,
    model::{GroundingSource, WeatherQueryResult},
};

use super::{
    WeatherProvider,
    parse::{build_prompt, parse_weather_text},
};

const UNTITLED_SOURCE: &str = "Source Document";

/// Weather lookup through Gemini `generateContent` with Google Search grounding.
#[derive(Clone)]
pub struct GeminiProvider {
    api_key: String,
    model: String,
    base_url: String,
    http: Client,
}

impl std::fmt::Debug for GeminiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiProvider")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl GeminiProvider {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            http: Client::new(),
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

    async fn generate(&self, prompt: String) -> Result<GenerateContentResponse, WeatherError> {
        let url = format!("{}/v1beta/models/{}:generateContent", self.base_url, self.model);
        let request = GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".into()),
                parts: vec![Part { text: Some(prompt) }],
            }],
            // A JSON response MIME type cannot be combined with tools, so the
            // format is requested in the prompt instead.
            tools: vec![Tool {
                google_search: GoogleSearch {},
            }],
        };

        let res = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "failed to send request to Gemini");
                WeatherError::Generic(e.to_string())
            })?;

        let status = res.status();
        let body = res.text().await.map_err(|e| {
            tracing::error!(error = %e, "failed to read Gemini response body");
            WeatherError::Generic(e.to_string())
        })?;

        if !status.is_success() {
            let (service_status, message) = match serde_json::from_str::<ErrorEnvelope>(&body) {
                Ok(env) => (env.error.status, env.error.message),
                Err(_) => (None, truncate_body(&body)),
            };
            tracing::error!(%status, ?service_status, message = %message, "Gemini request failed");
            return Err(WeatherError::from_service(
                status.as_u16(),
                service_status.as_deref(),
                &message,
            ));
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(error = %e, body = %truncate_body(&body), "unexpected Gemini envelope");
            WeatherError::Generic(format!("Unexpected response from the weather service: {e}"))
        })
    }
}

#[async_trait]
impl WeatherProvider for GeminiProvider {
    #[instrument(skip(self), level = "info")]
    async fn get_weather(
        &self,
        coordinate: &Coordinate,
    ) -> Result<WeatherQueryResult, WeatherError> {
        let response = self.generate(build_prompt(coordinate)).await?;

        let raw_text = response.text();
        tracing::debug!(model = %self.model, raw_text = %raw_text, "Gemini answered");

        let details = parse_weather_text(&raw_text)?;
        let grounding_sources = response.grounding_sources();

        Ok(WeatherQueryResult {
            coordinate: *coordinate,
            details,
            raw_text,
            grounding_sources,
            retrieved_at: Utc::now(),
        })
    }
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
    tools: Vec<Tool>,
}

#[derive(Debug, Serialize, Deserialize, Default)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
struct Tool {
    google_search: GoogleSearch,
}

#[derive(Debug, Serialize)]
struct GoogleSearch {}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
    #[serde(default)]
    grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct GroundingMetadata {
    #[serde(default)]
    grounding_chunks: Vec<GroundingChunk>,
}

#[derive(Debug, Deserialize)]
struct GroundingChunk {
    web: Option<WebChunk>,
}

#[derive(Debug, Deserialize)]
struct WebChunk {
    uri: Option<String>,
    title: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    status: Option<String>,
}

impl GenerateContentResponse {
    /// Text parts of the first candidate, concatenated.
    pub(crate) fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| content.parts.iter().filter_map(|p| p.text.as_deref()).collect())
            .unwrap_or_default()
    }

    /// Web citations of the first candidate, skipping chunks without a URI.
    pub(crate) fn grounding_sources(&self) -> Vec<GroundingSource> {
        let Some(metadata) = self.candidates.first().and_then(|c| c.grounding_metadata.as_ref())
        else {
            return Vec::new();
        };

        metadata
            .grounding_chunks
            .iter()
            .filter_map(|chunk| chunk.web.as_ref())
            .filter_map(|web| {
                let uri = web.uri.as_deref()?.trim();
                if uri.is_empty() {
                    return None;
                }
                let title = web
                    .title
                    .as_deref()
                    .filter(|t| !t.is_empty())
                    .unwrap_or(UNTITLED_SOURCE);
                Some(GroundingSource {
                    uri: uri.to_string(),
                    title: title.to_string(),
                })
            })
            .collect()
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.chars().count() > MAX {
        format!("{}...", body.chars().take(MAX).collect::<String>())
    } else {
        body.to_string()
    }
}
