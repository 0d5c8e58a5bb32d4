//! Client for the Gemini generateContent REST API.
//!
//! A thin synchronous wrapper: send one prompt, demand a JSON reply, parse
//! it into the itinerary structure. A failed call surfaces as an error
//! response; there is no retry.

use anyhow::{Context, Result};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, instrument};

use crate::domain::ai::GeneratedItinerary;
use crate::error::ApiError;

/// Client for the Gemini API.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

#[derive(Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
    #[serde(rename = "safetySettings")]
    safety_settings: Vec<SafetySetting>,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f64,
    #[serde(rename = "topP")]
    top_p: f64,
    #[serde(rename = "topK")]
    top_k: u32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
    // Forces the model to answer with bare JSON
    #[serde(rename = "responseMimeType")]
    response_mime_type: &'static str,
}

#[derive(Serialize)]
struct SafetySetting {
    category: &'static str,
    threshold: &'static str,
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
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

impl GeminiClient {
    pub fn new(
        base_url: &str,
        model: &str,
        api_key: Option<String>,
        timeout_seconds: u64,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .context("Failed to create HTTP client")?;

        tracing::info!(
            model = model,
            configured = api_key.is_some(),
            "Gemini client initialized"
        );

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key,
        })
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Generate an itinerary from the prompt. One blocking call; the reply
    /// must be valid JSON in the `GeneratedItinerary` structure.
    #[instrument(skip(self, prompt))]
    pub async fn generate_itinerary(&self, prompt: &str) -> Result<GeneratedItinerary, ApiError> {
        let Some(api_key) = &self.api_key else {
            error!("GEMINI_API_KEY is not configured");
            return Err(ApiError::internal("AI service is not configured"));
        };

        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );

        let body = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: 0.7,
                top_p: 0.8,
                top_k: 40,
                max_output_tokens: 8192,
                response_mime_type: "application/json",
            },
            safety_settings: vec![
                SafetySetting {
                    category: "HARM_CATEGORY_DANGEROUS_CONTENT",
                    threshold: "BLOCK_MEDIUM_AND_ABOVE",
                },
                SafetySetting {
                    category: "HARM_CATEGORY_HARASSMENT",
                    threshold: "BLOCK_MEDIUM_AND_ABOVE",
                },
            ],
        };

        debug!(url = %url, "Gemini request");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "Gemini request failed");
                ApiError::Internal(anyhow::anyhow!("AI service unavailable: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            error!(status = %status, detail = %detail, "Gemini error response");
            return match status {
                StatusCode::BAD_REQUEST => {
                    Err(ApiError::bad_request("AI service rejected the request"))
                }
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                    Err(ApiError::internal("AI service authentication failed"))
                }
                _ => Err(ApiError::internal(format!("AI service error: {status}"))),
            };
        }

        let reply: GenerateContentResponse = response.json().await.map_err(|e| {
            error!(error = %e, "Failed to read Gemini response");
            ApiError::Internal(anyhow::anyhow!("Invalid AI service response: {}", e))
        })?;

        let text = reply
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|c| c.parts.into_iter().next())
            .map(|p| p.text)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                error!("Empty Gemini response");
                ApiError::internal("Empty response from AI service")
            })?;

        parse_itinerary_reply(&text)
    }
}

/// Parse the model's reply, stripping accidental markdown fences.
pub fn parse_itinerary_reply(text: &str) -> Result<GeneratedItinerary, ApiError> {
    let cleaned = strip_code_fences(text.trim());

    serde_json::from_str(cleaned).map_err(|e| {
        error!(error = %e, "Failed to parse AI response as JSON");
        ApiError::internal("Failed to parse AI response as JSON")
    })
}

fn strip_code_fences(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    // drop the info string ("json") up to the first newline
    let body = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => rest,
    };
    body.rsplit_once("```").map(|(b, _)| b).unwrap_or(body).trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLAN: &str = r#"{
        "total_estimated_cost": 18000,
        "cost_breakdown": {
            "accommodation": 6000, "food": 4000, "transportation": 5000,
            "activities": 2000, "miscellaneous": 1000
        },
        "daily_itinerary": [
            {"day": 1, "title": "Arrival", "activities": ["Check in"],
             "accommodation": "Teahouse", "meals": "Dinner", "tips": ""}
        ],
        "best_time_to_visit": "Autumn",
        "what_to_pack": [],
        "important_notes": []
    }"#;

    #[test]
    fn parses_bare_json() {
        let plan = parse_itinerary_reply(PLAN).unwrap();
        assert_eq!(plan.daily_itinerary.len(), 1);
    }

    #[test]
    fn strips_markdown_fences() {
        let fenced = format!("```json\n{PLAN}\n```");
        let plan = parse_itinerary_reply(&fenced).unwrap();
        assert_eq!(plan.daily_itinerary[0].title, "Arrival");

        let fenced_no_lang = format!("```\n{PLAN}\n```");
        assert!(parse_itinerary_reply(&fenced_no_lang).is_ok());
    }

    #[test]
    fn invalid_json_is_an_error() {
        let err = parse_itinerary_reply("not json at all").unwrap_err();
        assert!(matches!(err, ApiError::Internal(_)));
    }

    #[test]
    fn request_body_shape_matches_the_api() {
        let body = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part { text: "hello" }],
            }],
            generation_config: GenerationConfig {
                temperature: 0.7,
                top_p: 0.8,
                top_k: 40,
                max_output_tokens: 8192,
                response_mime_type: "application/json",
            },
            safety_settings: vec![],
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["contents"][0]["parts"][0]["text"], "hello");
        assert_eq!(json["generationConfig"]["responseMimeType"], "application/json");
        assert_eq!(json["generationConfig"]["topK"], 40);
    }
}
