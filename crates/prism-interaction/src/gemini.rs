//! GeminiCapability - Direct REST API implementation of the generative capability.
//!
//! Talks to the Generative Language API: Imagen `:predict` for generation,
//! `:generateContent` for edits, suggestions, and prompt refinement.
//! Configuration is loaded from secret.json with environment-variable
//! fallback.

use std::env;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use prism_core::capability::{
    ContentPart, GenerateOptions, GeneratedImage, GenerativeCapability,
};
use prism_core::error::{CapabilityError, NO_REFINED_PROMPT};
use prism_core::image::ImagePayload;

use crate::config::{GeminiConfig, load_secret_config};

const DEFAULT_TEXT_MODEL: &str = "gemini-2.5-flash";
const DEFAULT_IMAGE_MODEL: &str = "imagen-4.0-generate-001";
const DEFAULT_EDIT_MODEL: &str = "gemini-2.5-flash-image";
const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

const SUGGESTIONS_INSTRUCTION: &str = r#"Analyze this product image. Provide 3 concise and creative prompts for an e-commerce photoshoot. The prompts should suggest a new background, lighting, and props to make the product look more appealing. The output must be a valid JSON array of strings.

Example output:
[
  "Place the product on a rustic wooden table with warm, soft lighting from the side.",
  "Create a minimalist scene with a solid pastel background and a single, elegant prop.",
  "Showcase the product on a reflective black surface with dramatic, cinematic lighting."
]"#;

const TRANSLATE_INSTRUCTION: &str = "You are an expert prompt engineer for AI image generation. Your task is to interpret the following text, which may be in Bangla, English, or a mix (Banglish). Translate it into clear English, then rewrite it into a professional, descriptive, and effective prompt suitable for a high-quality e-commerce product image. The final output must be ONLY the refined English prompt string, with no extra text, labels, or explanations.";

/// Generative-capability implementation that talks to the Gemini HTTP API.
#[derive(Clone)]
pub struct GeminiCapability {
    client: Client,
    api_key: String,
    text_model: String,
    image_model: String,
    edit_model: String,
    api_base: String,
}

impl GeminiCapability {
    /// Creates a capability with the provided API key and default models.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            text_model: DEFAULT_TEXT_MODEL.to_string(),
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
            edit_model: DEFAULT_EDIT_MODEL.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }

    /// Loads configuration from secret.json, falling back to environment
    /// variables (`GEMINI_API_KEY`, `GEMINI_TEXT_MODEL`, `GEMINI_IMAGE_MODEL`,
    /// `GEMINI_EDIT_MODEL`).
    pub fn try_from_env() -> Result<Self, String> {
        // Try loading from secret.json first
        if let Ok(secret_config) = load_secret_config() {
            if let Some(gemini_config) = secret_config.gemini {
                return Ok(Self::from_secret(gemini_config));
            }
        }

        // Fallback to environment variables
        let api_key = env::var("GEMINI_API_KEY").map_err(|_| {
            "GEMINI_API_KEY not found in ~/.config/prism/secret.json or environment variables"
                .to_string()
        })?;

        let mut capability = Self::new(api_key);
        if let Ok(model) = env::var("GEMINI_TEXT_MODEL") {
            capability.text_model = model;
        }
        if let Ok(model) = env::var("GEMINI_IMAGE_MODEL") {
            capability.image_model = model;
        }
        if let Ok(model) = env::var("GEMINI_EDIT_MODEL") {
            capability.edit_model = model;
        }
        Ok(capability)
    }

    /// Builds a capability from a parsed secret.json section.
    pub fn from_secret(config: GeminiConfig) -> Self {
        let mut capability = Self::new(config.api_key);
        if let Some(model) = config.text_model {
            capability.text_model = model;
        }
        if let Some(model) = config.image_model {
            capability.image_model = model;
        }
        if let Some(model) = config.edit_model {
            capability.edit_model = model;
        }
        capability
    }

    /// Overrides the text (analysis/refinement) model after construction.
    pub fn with_text_model(mut self, model: impl Into<String>) -> Self {
        self.text_model = model.into();
        self
    }

    /// Overrides the image-generation model after construction.
    pub fn with_image_model(mut self, model: impl Into<String>) -> Self {
        self.image_model = model.into();
        self
    }

    /// Overrides the image-edit model after construction.
    pub fn with_edit_model(mut self, model: impl Into<String>) -> Self {
        self.edit_model = model.into();
        self
    }

    /// Overrides the API base URL (useful for proxies and tests).
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    fn generate_content_url(&self, model: &str) -> String {
        format!(
            "{}/models/{model}:generateContent?key={}",
            self.api_base, self.api_key
        )
    }

    fn predict_url(&self, model: &str) -> String {
        format!("{}/models/{model}:predict?key={}", self.api_base, self.api_key)
    }

    async fn post_json<Req, Resp>(&self, url: String, body: &Req) -> Result<Resp, CapabilityError>
    where
        Req: Serialize + Sync,
        Resp: serde::de::DeserializeOwned,
    {
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|err| CapabilityError::request(format!("Gemini API request failed: {err}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read Gemini error body".to_string());
            tracing::warn!("[GeminiCapability] Request failed with HTTP {status}");
            return Err(map_http_error(status, body_text));
        }

        response.json().await.map_err(|err| {
            CapabilityError::invalid_response(format!("Failed to parse Gemini response: {err}"))
        })
    }
}

#[async_trait]
impl GenerativeCapability for GeminiCapability {
    async fn generate_image(
        &self,
        prompt: &str,
        options: &GenerateOptions,
    ) -> Result<Vec<GeneratedImage>, CapabilityError> {
        tracing::debug!("[GeminiCapability] POST {}:predict", self.image_model);
        let request = predict_request(prompt, options);
        let response: PredictResponse = self
            .post_json(self.predict_url(&self.image_model), &request)
            .await?;
        decode_predictions(response, &options.output_mime_type)
    }

    async fn edit_images(
        &self,
        prompt: &str,
        images: &[ImagePayload],
    ) -> Result<Vec<ContentPart>, CapabilityError> {
        tracing::debug!(
            "[GeminiCapability] POST {}:generateContent ({} images)",
            self.edit_model,
            images.len()
        );
        let request = edit_request(prompt, images);
        let response: GenerateContentResponse = self
            .post_json(self.generate_content_url(&self.edit_model), &request)
            .await?;
        extract_content_parts(response)
    }

    async fn analyze_image_for_suggestions(
        &self,
        image: &ImagePayload,
    ) -> Result<String, CapabilityError> {
        tracing::debug!(
            "[GeminiCapability] POST {}:generateContent (suggestions)",
            self.text_model
        );
        let request = suggestions_request(image);
        let response: GenerateContentResponse = self
            .post_json(self.generate_content_url(&self.text_model), &request)
            .await?;
        extract_text(response).ok_or_else(|| {
            CapabilityError::invalid_response("Gemini returned no text for suggestions")
        })
    }

    async fn refine_text_prompt(
        &self,
        text: &str,
        style_image: Option<&ImagePayload>,
    ) -> Result<String, CapabilityError> {
        tracing::debug!(
            "[GeminiCapability] POST {}:generateContent (refine, style_image: {})",
            self.text_model,
            style_image.is_some()
        );
        let request = refine_request(text, style_image);
        let response: GenerateContentResponse = self
            .post_json(self.generate_content_url(&self.text_model), &request)
            .await?;
        refined_from_response(response)
    }
}

// ============================================================================
// Request builders
// ============================================================================

fn predict_request(prompt: &str, options: &GenerateOptions) -> PredictRequest {
    PredictRequest {
        instances: vec![PredictInstance {
            prompt: prompt.to_string(),
        }],
        parameters: PredictParameters {
            sample_count: options.count,
            aspect_ratio: options.aspect_ratio.to_string(),
            output_mime_type: options.output_mime_type.clone(),
        },
    }
}

/// Inline image parts first, the instruction text last.
fn edit_request(prompt: &str, images: &[ImagePayload]) -> GenerateContentRequest {
    let mut parts: Vec<Part> = images.iter().map(Part::from_payload).collect();
    parts.push(Part::Text {
        text: prompt.to_string(),
    });

    GenerateContentRequest {
        contents: vec![Content {
            role: "user".to_string(),
            parts,
        }],
        generation_config: Some(GenerationConfig {
            response_modalities: Some(vec!["IMAGE".to_string()]),
            response_mime_type: None,
            response_schema: None,
        }),
    }
}

/// The product image followed by the analysis instruction, constrained to
/// a JSON array-of-strings response.
fn suggestions_request(image: &ImagePayload) -> GenerateContentRequest {
    GenerateContentRequest {
        contents: vec![Content {
            role: "user".to_string(),
            parts: vec![
                Part::from_payload(image),
                Part::Text {
                    text: SUGGESTIONS_INSTRUCTION.to_string(),
                },
            ],
        }],
        generation_config: Some(GenerationConfig {
            response_modalities: None,
            response_mime_type: Some("application/json".to_string()),
            response_schema: Some(ResponseSchema::array_of_strings()),
        }),
    }
}

/// Text-only refinement, or instruction-then-reference-image when a style
/// image is given.
fn refine_request(text: &str, style_image: Option<&ImagePayload>) -> GenerateContentRequest {
    let parts = match style_image {
        Some(image) => vec![
            Part::Text {
                text: style_refine_instruction(text),
            },
            Part::from_payload(image),
        ],
        None => vec![Part::Text {
            text: translate_refine_instruction(text),
        }],
    };

    GenerateContentRequest {
        contents: vec![Content {
            role: "user".to_string(),
            parts,
        }],
        generation_config: None,
    }
}

fn translate_refine_instruction(text: &str) -> String {
    format!("{TRANSLATE_INSTRUCTION}\n\nInput Text: \"{text}\"")
}

fn style_refine_instruction(text: &str) -> String {
    format!(
        r#"You are an expert prompt engineer for AI image generation. Your task is to create a detailed prompt for editing a primary product image based on a reference image's style.

1. **Analyze the Reference Image's Style**: Examine the reference image for its artistic style, focusing on:
   - **Lighting**: e.g., soft, hard, dramatic, natural, direction.
   - **Color Palette**: e.g., warm, cool, monochromatic, dominant colors.
   - **Composition**: e.g., centered, minimalist, rule of thirds.
   - **Mood & Atmosphere**: e.g., luxurious, rustic, professional, cozy.
   - **Background & Environment**: e.g., studio, nature, abstract.

2. **Interpret the User's Goal**: The user's text is: "{text}". Translate this to understand their core intent.

3. **Synthesize the Final Prompt**: Create a single, professional, descriptive prompt. This new prompt must instruct the AI to do the following:
   - Place the user's main product into a new scene.
   - The new scene's style (lighting, background, mood) must perfectly match the style you analyzed from the reference image.
   - **Crucially, the prompt must explicitly state that the product itself—its color, shape, material, texture, and any logos or text—must remain IDENTICAL and UNCHANGED from the original product image.** The goal is to change ONLY the environment, not the product.

**Output Format**: The final output must be ONLY the refined English prompt string, with no extra text, labels, titles, or explanations."#
    )
}

// ============================================================================
// Response handling
// ============================================================================

fn decode_predictions(
    response: PredictResponse,
    fallback_mime_type: &str,
) -> Result<Vec<GeneratedImage>, CapabilityError> {
    let mut images = Vec::new();
    for prediction in response.predictions {
        let Some(encoded) = prediction.bytes_base64_encoded else {
            continue;
        };
        let bytes = BASE64_STANDARD.decode(&encoded).map_err(|err| {
            CapabilityError::invalid_response(format!("Prediction is not valid base64: {err}"))
        })?;
        images.push(GeneratedImage {
            bytes,
            mime_type: prediction
                .mime_type
                .unwrap_or_else(|| fallback_mime_type.to_string()),
        });
    }
    Ok(images)
}

/// Maps the first candidate's parts to typed content parts, preserving
/// response order.
fn extract_content_parts(
    response: GenerateContentResponse,
) -> Result<Vec<ContentPart>, CapabilityError> {
    let parts = response
        .candidates
        .and_then(|candidates| candidates.into_iter().next())
        .and_then(|candidate| candidate.content)
        .map(|content| content.parts)
        .unwrap_or_default();

    let mut typed = Vec::new();
    for part in parts {
        if let Some(inline) = part.inline_data {
            let bytes = BASE64_STANDARD.decode(&inline.data).map_err(|err| {
                CapabilityError::invalid_response(format!(
                    "Inline image part is not valid base64: {err}"
                ))
            })?;
            typed.push(ContentPart::InlineImage {
                mime_type: inline.mime_type.unwrap_or_else(|| "image/png".to_string()),
                bytes,
            });
        } else if let Some(text) = part.text {
            typed.push(ContentPart::Text(text));
        }
    }
    Ok(typed)
}

fn extract_text(response: GenerateContentResponse) -> Option<String> {
    response
        .candidates
        .and_then(|candidates| candidates.into_iter().next())
        .and_then(|candidate| candidate.content)
        .and_then(|content| content.parts.into_iter().find_map(|part| part.text))
}

fn refined_from_response(response: GenerateContentResponse) -> Result<String, CapabilityError> {
    let refined = extract_text(response)
        .map(|text| text.trim().to_string())
        .unwrap_or_default();
    if refined.is_empty() {
        return Err(CapabilityError::empty(NO_REFINED_PROMPT));
    }
    Ok(refined)
}

fn map_http_error(status: StatusCode, body: String) -> CapabilityError {
    let message = serde_json::from_str::<ErrorWrapper>(&body)
        .map(|wrapper| {
            let status_text = wrapper.error.status.unwrap_or_default();
            let msg = wrapper.error.message.unwrap_or_else(|| body.clone());
            if status_text.is_empty() {
                msg
            } else {
                format!("{status_text}: {msg}")
            }
        })
        .unwrap_or_else(|_| body.clone());

    CapabilityError::http(status.as_u16(), message)
}

// ============================================================================
// Wire structs
// ============================================================================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineDataPayload,
    },
}

impl Part {
    fn from_payload(payload: &ImagePayload) -> Self {
        Self::InlineData {
            inline_data: InlineDataPayload {
                mime_type: payload.mime_type.clone(),
                data: payload.base64.clone(),
            },
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineDataPayload {
    mime_type: String,
    data: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    response_modalities: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<ResponseSchema>,
}

#[derive(Serialize)]
struct ResponseSchema {
    #[serde(rename = "type")]
    schema_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    items: Option<Box<ResponseSchema>>,
}

impl ResponseSchema {
    fn array_of_strings() -> Self {
        Self {
            schema_type: "ARRAY".to_string(),
            items: Some(Box::new(Self {
                schema_type: "STRING".to_string(),
                items: None,
            })),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PredictRequest {
    instances: Vec<PredictInstance>,
    parameters: PredictParameters,
}

#[derive(Serialize)]
struct PredictInstance {
    prompt: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PredictParameters {
    sample_count: u32,
    aspect_ratio: String,
    output_mime_type: String,
}

#[derive(Deserialize)]
struct PredictResponse {
    #[serde(default)]
    predictions: Vec<Prediction>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Prediction {
    bytes_base64_encoded: Option<String>,
    mime_type: Option<String>,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponsePart {
    text: Option<String>,
    inline_data: Option<InlineDataResponse>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineDataResponse {
    mime_type: Option<String>,
    data: String,
}

#[derive(Deserialize)]
struct ErrorWrapper {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[allow(dead_code)]
    code: Option<i32>,
    message: Option<String>,
    status: Option<String>,
}
