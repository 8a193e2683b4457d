//! ============================================================================
//! Gemini Stylist - StylistBackend over the Gemini generateContent API
//! ============================================================================
//! - Classification / trip planning / critique use the text model with a
//!   JSON response schema
//! - Try-on generation uses the image model and returns the first inline image
//! ============================================================================

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use super::prompts;
use super::{StylistBackend, TripPlanRequest, TryOnRequest};
use crate::config::WardrobeConfig;
use crate::types::{CriticVerdict, ImageData, ItemAnalysis, TripPlan, WardrobeError};

/// Stylist backed by Google's Gemini models
pub struct GeminiStylist {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    text_model: String,
    image_model: String,
}

impl GeminiStylist {
    /// Create a stylist with default endpoint and models
    pub fn new(api_key: String) -> Self {
        Self::from_parts(api_key, &WardrobeConfig::default())
    }

    pub fn from_config(config: &WardrobeConfig) -> Result<Self, WardrobeError> {
        let api_key = config.require_api_key()?.to_string();
        Ok(Self::from_parts(api_key, config))
    }

    fn from_parts(api_key: String, config: &WardrobeConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            base_url: config.gemini_base_url.trim_end_matches('/').to_string(),
            text_model: config.text_model.clone(),
            image_model: config.image_model.clone(),
        }
    }

    /// POST a generateContent request to the given model
    async fn call(&self, model: &str, request: &GenerateRequest) -> Result<GenerateResponse> {
        let url = format!("{}/models/{}:generateContent", self.base_url, model);
        debug!("Calling Gemini {} with {} parts", model, request.part_count());

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| anyhow!("Failed to call Gemini API: {}", e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("Gemini API error {}: {}", status, body));
        }

        response
            .json()
            .await
            .map_err(|e| anyhow!("Failed to parse Gemini response: {}", e))
    }

    /// Structured call: text model, JSON response constrained by `schema`
    async fn call_json<T: DeserializeOwned>(&self, parts: Vec<Part>, schema: Value) -> Result<T> {
        let request = GenerateRequest {
            contents: vec![Content::user(parts)],
            generation_config: Some(GenerationConfig {
                response_mime_type: Some("application/json".to_string()),
                response_schema: Some(schema),
                response_modalities: None,
            }),
        };
        let response = self.call(&self.text_model, &request).await?;
        let text = response.text().ok_or_else(|| anyhow!("Empty response from model"))?;
        parse_json_text(&text)
    }

    /// Image call: image model, first inline image part of the response
    async fn call_image(&self, parts: Vec<Part>) -> Result<ImageData> {
        let request = GenerateRequest {
            contents: vec![Content::user(parts)],
            generation_config: Some(GenerationConfig {
                response_mime_type: None,
                response_schema: None,
                response_modalities: Some(vec!["IMAGE".to_string()]),
            }),
        };
        let response = self.call(&self.image_model, &request).await?;
        let inline = response
            .first_inline_data()
            .ok_or_else(|| anyhow!("No image data in response"))?;
        ImageData::from_base64(inline.mime_type.clone(), &inline.data).map_err(|e| anyhow!("{}", e))
    }
}

fn ai_error(e: anyhow::Error) -> WardrobeError {
    WardrobeError::Ai(format!("{:#}", e))
}

#[async_trait]
impl StylistBackend for GeminiStylist {
    async fn classify_item(&self, image: &ImageData) -> Result<ItemAnalysis, WardrobeError> {
        info!("Classifying item image ({} bytes)", image.bytes.len());
        let parts = vec![Part::image(image), Part::text(prompts::CLASSIFY_PROMPT)];
        self.call_json(parts, prompts::classify_schema())
            .await
            .map_err(ai_error)
    }

    async fn plan_trip(&self, request: &TripPlanRequest) -> Result<TripPlan, WardrobeError> {
        info!(
            "Planning trip to {} with {} inventory items",
            request.destination,
            request.inventory.len()
        );
        let parts = vec![Part::text(&prompts::trip_prompt(request))];
        self.call_json(parts, prompts::trip_schema())
            .await
            .map_err(ai_error)
    }

    async fn generate_try_on(&self, request: &TryOnRequest) -> Result<ImageData, WardrobeError> {
        info!(
            "Generating {} try-on with {} garments",
            request.angle.as_str(),
            request.garments.len()
        );

        // Order matters: the prompt refers to the face as the first image and
        // the consistency reference as the last one.
        let mut parts = Vec::with_capacity(request.garments.len() + 3);
        if let Some(face) = &request.face {
            parts.push(Part::image(face));
        }
        for garment in &request.garments {
            parts.push(Part::image(&garment.image));
        }
        if let Some(reference) = &request.reference {
            parts.push(Part::image(reference));
        }
        parts.push(Part::text(&prompts::try_on_prompt(request)));

        let image = self.call_image(parts).await.map_err(ai_error)?;
        info!("Try-on image generated: {} bytes", image.bytes.len());
        Ok(image)
    }

    async fn critique(
        &self,
        image: &ImageData,
        face: Option<&ImageData>,
    ) -> Result<CriticVerdict, WardrobeError> {
        let mut parts = vec![Part::image(image)];
        if let Some(face) = face {
            parts.push(Part::image(face));
        }
        parts.push(Part::text(prompts::CRITIQUE_PROMPT));

        let verdict: CriticVerdict = self
            .call_json(parts, prompts::critique_schema())
            .await
            .map_err(ai_error)?;
        Ok(verdict.normalized())
    }
}

/// Parse model text as JSON, tolerating a surrounding markdown code fence
fn parse_json_text<T: DeserializeOwned>(text: &str) -> Result<T> {
    let body = strip_code_fence(text);
    if body.is_empty() {
        return Err(anyhow!("Empty response from model"));
    }
    serde_json::from_str(body).context("Model returned malformed JSON")
}

fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    if let Some(after_start) = trimmed.strip_prefix("```") {
        // Skip language identifier if present
        let body_start = after_start.find('\n').map(|i| i + 1).unwrap_or(0);
        let body = &after_start[body_start..];
        if let Some(end) = body.rfind("```") {
            return body[..end].trim();
        }
    }
    trimmed
}

// ============================================================================
// Gemini API Types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

impl GenerateRequest {
    fn part_count(&self) -> usize {
        self.contents.iter().map(|c| c.parts.len()).sum()
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

impl Content {
    fn user(parts: Vec<Part>) -> Self {
        Self {
            role: Some("user".to_string()),
            parts,
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

impl Part {
    fn text(text: &str) -> Self {
        Self {
            text: Some(text.to_string()),
            inline_data: None,
        }
    }

    fn image(image: &ImageData) -> Self {
        Self {
            text: None,
            inline_data: Some(InlineData {
                mime_type: image.mime_type.clone(),
                data: image.to_base64(),
            }),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_modalities: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

impl GenerateResponse {
    fn parts(&self) -> impl Iterator<Item = &Part> {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .into_iter()
            .flat_map(|c| c.parts.iter())
    }

    /// Concatenated text parts of the first candidate
    fn text(&self) -> Option<String> {
        let text: String = self.parts().filter_map(|p| p.text.as_deref()).collect();
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }

    fn first_inline_data(&self) -> Option<&InlineData> {
        self.parts().find_map(|p| p.inline_data.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_json_text_with_fence() {
        let text = "```json\n{\"category\":\"Top\",\"subCategory\":\"Tee\",\"primaryColor\":\"White\",\"season\":\"Summer\",\"styleTags\":[\"casual\"]}\n```";
        let analysis: ItemAnalysis = parse_json_text(text).unwrap();
        assert_eq!(analysis.sub_category, "Tee");
        assert_eq!(analysis.style_tags, vec!["casual"]);
    }

    #[test]
    fn test_parse_json_text_rejects_missing_fields() {
        let text = "{\"category\":\"Top\"}";
        assert!(parse_json_text::<ItemAnalysis>(text).is_err());
    }

    #[test]
    fn test_parse_json_text_rejects_empty() {
        assert!(parse_json_text::<ItemAnalysis>("   ").is_err());
    }

    #[test]
    fn test_response_text_and_image_extraction() {
        let json = serde_json::json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [
                        { "text": "here you go" },
                        { "inlineData": { "mimeType": "image/png", "data": "AAEC" } }
                    ]
                }
            }]
        });
        let response: GenerateResponse = serde_json::from_value(json).unwrap();
        assert_eq!(response.text().as_deref(), Some("here you go"));
        let inline = response.first_inline_data().unwrap();
        assert_eq!(inline.mime_type, "image/png");
        let image = ImageData::from_base64(inline.mime_type.clone(), &inline.data).unwrap();
        assert_eq!(image.bytes, vec![0, 1, 2]);
    }

    #[test]
    fn test_empty_candidates_yield_nothing() {
        let response: GenerateResponse = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(response.text().is_none());
        assert!(response.first_inline_data().is_none());
    }

    #[test]
    fn test_request_serializes_camel_case() {
        let request = GenerateRequest {
            contents: vec![Content::user(vec![
                Part::image(&ImageData::new("image/jpeg", vec![9])),
                Part::text("hi"),
            ])],
            generation_config: Some(GenerationConfig {
                response_mime_type: Some("application/json".into()),
                response_schema: None,
                response_modalities: None,
            }),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json["contents"][0]["parts"][0]["inlineData"]["mimeType"],
            "image/jpeg"
        );
        assert_eq!(
            json["generationConfig"]["responseMimeType"],
            "application/json"
        );
        assert!(json["generationConfig"].get("responseSchema").is_none());
        assert_eq!(request.part_count(), 2);
    }

    #[test]
    fn test_from_config_requires_key() {
        assert!(GeminiStylist::from_config(&WardrobeConfig::default()).is_err());
        let config = WardrobeConfig {
            gemini_api_key: Some("k".into()),
            gemini_base_url: "http://localhost:9/v1beta/".into(),
            ..WardrobeConfig::default()
        };
        let stylist = GeminiStylist::from_config(&config).unwrap();
        assert_eq!(stylist.base_url, "http://localhost:9/v1beta");
    }
}
