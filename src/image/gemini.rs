//! Gemini (Google) image generation and editing client.

use crate::error::{PersonaError, Result};
use crate::image::service::ImageService;
use crate::image::types::{DataUrl, ImageSize};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Instruction text prepended to the prompt when a reference image is
/// attached, so the model treats the first part as visual grounding.
const REFERENCE_PREFIX: &str = "Create a character based on this visual reference. ";

/// All generations are square; the UI exposes only size tiers.
const ASPECT_RATIO: &str = "1:1";

/// Known body phrase Gemini returns (as a 404) when the selected AI
/// Studio key does not grant access to the model. Fragile by nature;
/// classified here once so callers only see a typed `Auth` error.
const KEY_REJECTED_PHRASE: &str = "Requested entity was not found";

/// Gemini image model variants used by this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeminiModel {
    /// Gemini 3 Pro Image - full-quality character generation.
    Gen3ProImage,
    /// Gemini 2.5 Flash Image - fast conversational editing.
    Flash25Image,
}

impl GeminiModel {
    /// Returns the API model identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gen3ProImage => "gemini-3-pro-image-preview",
            Self::Flash25Image => "gemini-2.5-flash-image",
        }
    }
}

/// Builder for [`GeminiClient`].
#[derive(Debug, Clone, Default)]
pub struct GeminiClientBuilder {
    api_key: Option<String>,
    generate_model: Option<GeminiModel>,
    edit_model: Option<GeminiModel>,
}

impl GeminiClientBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API key. Falls back to `GOOGLE_API_KEY` env var.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Overrides the model used for generation.
    pub fn generate_model(mut self, model: GeminiModel) -> Self {
        self.generate_model = Some(model);
        self
    }

    /// Overrides the model used for editing.
    pub fn edit_model(mut self, model: GeminiModel) -> Self {
        self.edit_model = Some(model);
        self
    }

    /// Builds the client, resolving the API key.
    pub fn build(self) -> Result<GeminiClient> {
        let api_key = self
            .api_key
            .or_else(|| std::env::var("GOOGLE_API_KEY").ok())
            .ok_or_else(|| {
                PersonaError::Auth("GOOGLE_API_KEY not set and no API key provided".into())
            })?;

        Ok(GeminiClient {
            client: reqwest::Client::new(),
            api_key,
            generate_model: self.generate_model.unwrap_or(GeminiModel::Gen3ProImage),
            edit_model: self.edit_model.unwrap_or(GeminiModel::Flash25Image),
        })
    }
}

/// Client for the Gemini `generateContent` image endpoints.
///
/// One call per operation: no retries, no timeouts, no rate limiting.
/// Failures propagate to the caller as typed [`PersonaError`]s.
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    generate_model: GeminiModel,
    edit_model: GeminiModel,
}

impl GeminiClient {
    /// Creates a new [`GeminiClientBuilder`].
    pub fn builder() -> GeminiClientBuilder {
        GeminiClientBuilder::new()
    }

    async fn invoke(&self, model: GeminiModel, body: &GeminiRequest) -> Result<Option<DataUrl>> {
        let url = format!(
            "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent",
            model.as_str(),
        );

        tracing::debug!(model = model.as_str(), "sending generateContent request");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(parse_error(status.as_u16(), &text));
        }

        let parsed: GeminiResponse = response.json().await?;

        // Prompt-level blocks come back as HTTP 200 with feedback attached.
        if let Some(feedback) = parsed.prompt_feedback {
            if let Some(reason) = feedback.block_reason {
                let msg = feedback
                    .block_reason_message
                    .unwrap_or_else(|| format!("Prompt blocked: {}", reason));
                return Err(PersonaError::ContentBlocked(msg));
            }
        }

        let inline = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|content| content.parts.into_iter().find_map(|p| p.inline_data));

        match inline {
            Some(part) => {
                let decoded = DataUrl::parse(&part.data)?;
                let mime = if part.mime_type.is_empty() {
                    "image/png".to_string()
                } else {
                    part.mime_type
                };
                Ok(Some(DataUrl::new(mime, decoded.data().to_vec())))
            }
            None => Ok(None),
        }
    }
}

#[async_trait]
impl ImageService for GeminiClient {
    async fn generate(
        &self,
        prompt: &str,
        size: ImageSize,
        reference: Option<&str>,
    ) -> Result<DataUrl> {
        let body = GeminiRequest::for_generation(prompt, size, reference)?;
        self.invoke(self.generate_model, &body)
            .await?
            .ok_or(PersonaError::NoImageGenerated)
    }

    async fn edit(&self, image: &str, instruction: &str) -> Result<DataUrl> {
        let body = GeminiRequest::for_edit(image, instruction)?;
        self.invoke(self.edit_model, &body)
            .await?
            .ok_or(PersonaError::EditFailed)
    }
}

fn parse_error(status: u16, text: &str) -> PersonaError {
    if status == 401 || status == 403 {
        return PersonaError::Auth(text.to_string());
    }
    // An unselected or non-billing key surfaces as a 404 with this body.
    if text.contains(KEY_REJECTED_PHRASE) {
        return PersonaError::Auth(text.to_string());
    }
    let lower = text.to_lowercase();
    if lower.contains("safety") || lower.contains("blocked") || lower.contains("prohibited") {
        return PersonaError::ContentBlocked(text.to_string());
    }
    PersonaError::Api {
        status,
        message: text.to_string(),
    }
}

// Request/Response wire types

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    // Repeated field in the REST schema: always a JSON array.
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GeminiConfig>,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    parts: Vec<GeminiRequestPart>,
}

/// A part in a Gemini request - text or inline image data.
#[derive(Debug, Serialize)]
#[serde(untagged)]
enum GeminiRequestPart {
    Text { text: String },
    InlineData { inline_data: GeminiInlineData },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiInlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiConfig {
    response_modalities: Vec<String>,
    image_config: GeminiImageConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiImageConfig {
    aspect_ratio: String,
    image_size: String,
}

impl GeminiRequest {
    /// Builds a generation request: optional reference image first, then
    /// the (possibly prefixed) text prompt, pinned to 1:1 at `size`.
    fn for_generation(prompt: &str, size: ImageSize, reference: Option<&str>) -> Result<Self> {
        let mut parts = Vec::new();

        let text = match reference {
            Some(raw) => {
                let reference = DataUrl::parse(raw)?;
                parts.push(GeminiRequestPart::InlineData {
                    inline_data: GeminiInlineData {
                        mime_type: reference.mime_type().to_string(),
                        data: reference.base64_data(),
                    },
                });
                format!("{}{}", REFERENCE_PREFIX, prompt)
            }
            None => prompt.to_string(),
        };
        parts.push(GeminiRequestPart::Text { text });

        Ok(Self {
            contents: vec![GeminiContent { parts }],
            generation_config: Some(GeminiConfig {
                response_modalities: vec!["IMAGE".to_string()],
                image_config: GeminiImageConfig {
                    aspect_ratio: ASPECT_RATIO.to_string(),
                    image_size: size.as_str().to_string(),
                },
            }),
        })
    }

    /// Builds an edit request: the existing image followed by the
    /// instruction text. The edit endpoint takes no image config.
    fn for_edit(image: &str, instruction: &str) -> Result<Self> {
        let image = DataUrl::parse(image)?;

        Ok(Self {
            contents: vec![GeminiContent {
                parts: vec![
                    GeminiRequestPart::InlineData {
                        inline_data: GeminiInlineData {
                            mime_type: image.mime_type().to_string(),
                            data: image.base64_data(),
                        },
                    },
                    GeminiRequestPart::Text {
                        text: instruction.to_string(),
                    },
                ],
            }],
            generation_config: None,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiContentResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
    #[serde(default)]
    block_reason_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiContentResponse {
    #[serde(default)]
    parts: Vec<GeminiPartResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPartResponse {
    #[serde(default)]
    inline_data: Option<InlineData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    #[serde(default)]
    mime_type: String,
    data: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_identifiers() {
        assert_eq!(
            GeminiModel::Gen3ProImage.as_str(),
            "gemini-3-pro-image-preview"
        );
        assert_eq!(GeminiModel::Flash25Image.as_str(), "gemini-2.5-flash-image");
    }

    #[test]
    fn test_builder_with_explicit_key() {
        let client = GeminiClient::builder().api_key("test-key").build();
        assert!(client.is_ok());
    }

    #[test]
    fn test_generation_request_without_reference() {
        let req = GeminiRequest::for_generation("A sloth", ImageSize::OneK, None).unwrap();
        assert_eq!(req.contents.len(), 1);
        assert_eq!(req.contents[0].parts.len(), 1);

        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["contents"][0]["parts"][0]["text"], "A sloth");
        assert_eq!(
            json["generationConfig"]["imageConfig"]["aspectRatio"],
            "1:1"
        );
        assert_eq!(json["generationConfig"]["imageConfig"]["imageSize"], "1K");
        assert_eq!(json["generationConfig"]["responseModalities"][0], "IMAGE");
    }

    #[test]
    fn test_generation_request_with_reference() {
        let reference = "data:image/jpeg;base64,aGVsbG8=";
        let req =
            GeminiRequest::for_generation("A sloth", ImageSize::TwoK, Some(reference)).unwrap();
        assert_eq!(req.contents[0].parts.len(), 2);

        let json = serde_json::to_value(&req).unwrap();
        // Reference image goes first, as inline data with its real MIME.
        assert_eq!(
            json["contents"][0]["parts"][0]["inline_data"]["mimeType"],
            "image/jpeg"
        );
        assert_eq!(
            json["contents"][0]["parts"][0]["inline_data"]["data"],
            "aGVsbG8="
        );
        // Prompt gains the reference-context prefix.
        let text = json["contents"][0]["parts"][1]["text"].as_str().unwrap();
        assert!(text.starts_with("Create a character based on this visual reference. "));
        assert!(text.ends_with("A sloth"));
    }

    #[test]
    fn test_generation_request_rejects_bad_reference() {
        let result = GeminiRequest::for_generation("x", ImageSize::OneK, Some("!!!"));
        assert!(result.is_err());
    }

    #[test]
    fn test_edit_request_shape() {
        let req = GeminiRequest::for_edit("data:image/png;base64,aGVsbG8=", "make it red").unwrap();
        assert_eq!(req.contents[0].parts.len(), 2);
        assert!(req.generation_config.is_none());

        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(
            json["contents"][0]["parts"][0]["inline_data"]["mimeType"],
            "image/png"
        );
        assert_eq!(json["contents"][0]["parts"][1]["text"], "make it red");
        assert!(json.get("generationConfig").is_none());
    }

    #[test]
    fn test_edit_request_accepts_bare_base64() {
        // The session may hold a raw payload with no data: prefix.
        let req = GeminiRequest::for_edit("aGVsbG8=", "brighter").unwrap();
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(
            json["contents"][0]["parts"][0]["inline_data"]["mimeType"],
            "image/png"
        );
    }

    #[test]
    fn test_contents_serializes_as_list() {
        // The endpoint declares contents as a repeated field; a bare
        // object in its place is rejected with a 400.
        let gen = GeminiRequest::for_generation("A sloth", ImageSize::OneK, None).unwrap();
        let json = serde_json::to_value(&gen).unwrap();
        assert!(json["contents"].is_array());

        let edit = GeminiRequest::for_edit("aGVsbG8=", "brighter").unwrap();
        let json = serde_json::to_value(&edit).unwrap();
        assert!(json["contents"].is_array());
        assert_eq!(json["contents"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_response_deserialization() {
        let json = r#"{
            "candidates": [{
                "content": {
                    "parts": [{
                        "inlineData": {
                            "mimeType": "image/png",
                            "data": "iVBORw0KGgo="
                        }
                    }]
                }
            }]
        }"#;
        let resp: GeminiResponse = serde_json::from_str(json).unwrap();
        let content = resp.candidates[0].content.as_ref().unwrap();
        let inline = content.parts[0].inline_data.as_ref().unwrap();
        assert_eq!(inline.mime_type, "image/png");
    }

    #[test]
    fn test_response_without_image_part() {
        let json = r#"{"candidates": [{"content": {"parts": [{}]}}]}"#;
        let resp: GeminiResponse = serde_json::from_str(json).unwrap();
        let content = resp.candidates[0].content.as_ref().unwrap();
        assert!(content.parts[0].inline_data.is_none());
    }

    #[test]
    fn test_response_prompt_feedback_block() {
        let json = r#"{
            "candidates": [],
            "promptFeedback": {
                "blockReason": "SAFETY",
                "blockReasonMessage": "Prompt was blocked due to safety"
            }
        }"#;
        let resp: GeminiResponse = serde_json::from_str(json).unwrap();
        assert!(resp.candidates.is_empty());
        let feedback = resp.prompt_feedback.unwrap();
        assert_eq!(feedback.block_reason.as_deref(), Some("SAFETY"));
    }

    #[test]
    fn test_parse_error_auth_statuses() {
        assert!(matches!(
            parse_error(401, "unauthorized"),
            PersonaError::Auth(_)
        ));
        assert!(matches!(parse_error(403, "forbidden"), PersonaError::Auth(_)));
    }

    #[test]
    fn test_parse_error_key_rejection_phrase() {
        // The unselected-key rejection arrives as a 404 with this body.
        let err = parse_error(404, "Requested entity was not found.");
        assert!(err.is_credential_error());
    }

    #[test]
    fn test_parse_error_passthrough() {
        let err = parse_error(500, "internal error");
        assert!(matches!(
            err,
            PersonaError::Api {
                status: 500,
                ..
            }
        ));
        assert!(!err.is_credential_error());
    }

    #[test]
    fn test_parse_error_safety() {
        assert!(matches!(
            parse_error(400, "blocked by safety system"),
            PersonaError::ContentBlocked(_)
        ));
    }
}
