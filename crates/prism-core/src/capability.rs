//! Generative capability trait and its typed request/response model.
//!
//! The studio treats the remote image model as an external collaborator
//! behind this interface; orchestration never assumes a transport or a
//! response shape beyond what these types express.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::error::CapabilityError;
use crate::image::ImagePayload;

/// Output aspect ratio for image generation.
///
/// `Display`/`FromStr` use the wire strings the API expects (`"1:1"`, ...).
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
pub enum AspectRatio {
    #[default]
    #[serde(rename = "1:1")]
    #[strum(serialize = "1:1")]
    Square,
    #[serde(rename = "16:9")]
    #[strum(serialize = "16:9")]
    Widescreen,
    #[serde(rename = "9:16")]
    #[strum(serialize = "9:16")]
    Portrait,
    #[serde(rename = "4:3")]
    #[strum(serialize = "4:3")]
    Landscape,
    #[serde(rename = "3:4")]
    #[strum(serialize = "3:4")]
    Tall,
}

impl AspectRatio {
    /// Human-readable label for selection chips.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Square => "Square (1:1)",
            Self::Widescreen => "Widescreen (16:9)",
            Self::Portrait => "Portrait (9:16)",
            Self::Landscape => "Landscape (4:3)",
            Self::Tall => "Tall (3:4)",
        }
    }
}

/// Visual style appended to every generation prompt.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum StylePreset {
    #[default]
    Photorealistic,
    Illustration,
    Minimalist,
    Cinematic,
    Fantasy,
}

impl StylePreset {
    /// Human-readable label for selection chips.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Photorealistic => "Photorealistic",
            Self::Illustration => "Illustration",
            Self::Minimalist => "Minimalist",
            Self::Cinematic => "Cinematic",
            Self::Fantasy => "Fantasy",
        }
    }
}

/// Options for a single image-generation call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateOptions {
    pub aspect_ratio: AspectRatio,
    /// Number of images to request.
    pub count: u32,
    /// Mime type the capability should produce, e.g. `image/png`.
    pub output_mime_type: String,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            aspect_ratio: AspectRatio::default(),
            count: 1,
            output_mime_type: "image/png".to_string(),
        }
    }
}

impl GenerateOptions {
    /// Default options with the given aspect ratio.
    pub fn with_aspect_ratio(aspect_ratio: AspectRatio) -> Self {
        Self {
            aspect_ratio,
            ..Self::default()
        }
    }
}

/// A generated image as returned by the capability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedImage {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

impl GeneratedImage {
    /// Re-encodes the raw bytes as an [`ImagePayload`].
    pub fn to_payload(&self) -> ImagePayload {
        ImagePayload::from_bytes(&self.bytes, &self.mime_type)
    }
}

/// One part of a multimodal edit response, typed at the boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContentPart {
    Text(String),
    InlineImage { mime_type: String, bytes: Vec<u8> },
}

impl ContentPart {
    /// Check if this part carries inline image bytes
    pub fn is_inline_image(&self) -> bool {
        matches!(self, Self::InlineImage { .. })
    }
}

/// The remote generative model consumed by the studio.
///
/// All four operations are fallible and independent; failures are opaque
/// [`CapabilityError`]s that orchestration normalizes for display.
/// Implementations are injected as `Arc<dyn GenerativeCapability>`; there
/// is no process-wide client.
#[async_trait]
pub trait GenerativeCapability: Send + Sync {
    /// Generates `options.count` images from a text prompt.
    async fn generate_image(
        &self,
        prompt: &str,
        options: &GenerateOptions,
    ) -> Result<Vec<GeneratedImage>, CapabilityError>;

    /// Edits the given images per the prompt, returning the model's
    /// content parts in response order.
    async fn edit_images(
        &self,
        prompt: &str,
        images: &[ImagePayload],
    ) -> Result<Vec<ContentPart>, CapabilityError>;

    /// Analyzes a product image and returns prompt suggestions as JSON
    /// text expected to parse as an array of strings. Validation happens
    /// upstream.
    async fn analyze_image_for_suggestions(
        &self,
        image: &ImagePayload,
    ) -> Result<String, CapabilityError>;

    /// Rewrites free-form text into a refined generation prompt,
    /// optionally matching the style of a reference image.
    async fn refine_text_prompt(
        &self,
        text: &str,
        style_image: Option<&ImagePayload>,
    ) -> Result<String, CapabilityError>;
}
