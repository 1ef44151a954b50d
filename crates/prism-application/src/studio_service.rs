//! Studio Service
//!
//! Orchestrates the generative capability behind the studio workflows:
//! prompt-based image generation, multi-image editing, suggestion analysis,
//! and Banglish prompt refinement. All remote failures are funneled into
//! the user-facing `StudioError` taxonomy.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use prism_core::capability::{
    AspectRatio, ContentPart, GenerateOptions, GenerativeCapability, StylePreset,
};
use prism_core::error::{NO_EDITED_IMAGE_RETURNED, NO_IMAGE_GENERATED, Result, StudioError};
use prism_core::image::{DataUrl, ImagePayload};

/// Outcome of a prompt refinement, paired with the style reference that
/// shaped it (if any).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefinementResult {
    /// The user's text as it was submitted for refinement.
    pub source_text: String,
    /// The refined English prompt returned by the model.
    pub refined_text: String,
    /// The style reference image, when the refinement was style-driven.
    pub style_image: Option<ImagePayload>,
}

/// Service coordinating studio operations over an injected generative
/// capability.
pub struct StudioService {
    capability: Arc<dyn GenerativeCapability>,
}

impl StudioService {
    /// Creates a new `StudioService` backed by the given capability.
    pub fn new(capability: Arc<dyn GenerativeCapability>) -> Self {
        Self { capability }
    }

    /// Generates an image from a prompt, aspect ratio, and style preset.
    ///
    /// The style preset is appended to the prompt (`"{prompt}, {style} style"`)
    /// before it is sent. The first returned image is encoded as a data URL.
    ///
    /// # Errors
    ///
    /// Returns `StudioError::EmptyResult` when the capability produced no
    /// images, or `StudioError::Remote` with a normalized message when the
    /// call failed.
    pub async fn generate(
        &self,
        prompt: &str,
        aspect_ratio: AspectRatio,
        style: StylePreset,
    ) -> Result<DataUrl> {
        let full_prompt = format!("{prompt}, {style} style");
        tracing::info!(
            "[StudioService] Generating image (aspect: {}, style: {})",
            aspect_ratio,
            style
        );

        let options = GenerateOptions::with_aspect_ratio(aspect_ratio);
        let images = self
            .capability
            .generate_image(&full_prompt, &options)
            .await?;

        match images.into_iter().next() {
            Some(image) => Ok(DataUrl::encode(&image.to_payload())),
            None => {
                tracing::warn!("[StudioService] Generation returned no images");
                Err(StudioError::empty_result(NO_IMAGE_GENERATED))
            }
        }
    }

    /// Applies a prompt-driven edit to one or more images.
    ///
    /// Images are sent in the order given; the first inline image part in
    /// the response becomes the result. Text parts are ignored.
    ///
    /// # Errors
    ///
    /// Returns `StudioError::Validation` when `images` is empty (checked
    /// before any remote call), and `StudioError::EmptyResult` when the
    /// response carried no image part.
    pub async fn apply_edit(&self, prompt: &str, images: &[ImagePayload]) -> Result<DataUrl> {
        if images.is_empty() {
            return Err(StudioError::validation(
                "At least one image must be provided for editing.",
            ));
        }

        tracing::info!("[StudioService] Editing with {} image(s)", images.len());
        let parts = self.capability.edit_images(prompt, images).await?;

        for part in parts {
            if let ContentPart::InlineImage { mime_type, bytes } = part {
                return Ok(DataUrl::encode(&ImagePayload::from_bytes(
                    &bytes, mime_type,
                )));
            }
        }

        tracing::warn!("[StudioService] Edit response contained no image part");
        Err(StudioError::empty_result(NO_EDITED_IMAGE_RETURNED))
    }

    /// Asks the model for photoshoot prompt suggestions for a product image.
    ///
    /// The capability is expected to answer with a JSON array of strings;
    /// anything else is rejected as a format error.
    pub async fn fetch_suggestions(&self, product_image: &DataUrl) -> Result<Vec<String>> {
        let payload = product_image.decode()?;
        tracing::info!("[StudioService] Requesting prompt suggestions");

        let raw = self
            .capability
            .analyze_image_for_suggestions(&payload)
            .await?;

        serde_json::from_str::<Vec<String>>(raw.trim())
            .map_err(|_| StudioError::format("Invalid JSON response format for suggestions."))
    }

    /// Translates free text (Bangla, English, or Banglish) into a refined
    /// English image prompt.
    pub async fn translate_and_refine(&self, free_text: &str) -> Result<RefinementResult> {
        let text = free_text.trim();
        if text.is_empty() {
            return Err(StudioError::validation(
                "Please enter text to translate and refine.",
            ));
        }

        tracing::info!("[StudioService] Refining free text ({} chars)", text.len());
        let refined = self.capability.refine_text_prompt(text, None).await?;

        Ok(RefinementResult {
            source_text: text.to_string(),
            refined_text: refined,
            style_image: None,
        })
    }

    /// Refines a suggestion into a full edit prompt that matches the style
    /// of the given reference image.
    pub async fn refine_with_style_reference(
        &self,
        suggestion_text: &str,
        reference_image: &DataUrl,
    ) -> Result<RefinementResult> {
        let payload = reference_image.decode()?;
        tracing::info!("[StudioService] Refining from style reference");

        let refined = self
            .capability
            .refine_text_prompt(suggestion_text, Some(&payload))
            .await?;

        Ok(RefinementResult {
            source_text: suggestion_text.to_string(),
            refined_text: refined,
            style_image: Some(payload),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use prism_core::capability::GeneratedImage;
    use prism_core::error::CapabilityError;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    type CapResult<T> = std::result::Result<T, CapabilityError>;

    struct MockCapability {
        generate_result: CapResult<Vec<GeneratedImage>>,
        edit_result: CapResult<Vec<ContentPart>>,
        suggestions_result: CapResult<String>,
        refine_result: CapResult<String>,
        seen_prompts: Mutex<Vec<String>>,
        seen_refinements: Mutex<Vec<(String, bool)>>,
        calls: AtomicUsize,
    }

    impl Default for MockCapability {
        fn default() -> Self {
            Self {
                generate_result: Ok(Vec::new()),
                edit_result: Ok(Vec::new()),
                suggestions_result: Ok(String::new()),
                refine_result: Ok(String::new()),
                seen_prompts: Mutex::new(Vec::new()),
                seen_refinements: Mutex::new(Vec::new()),
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl MockCapability {
        fn with_generate(result: CapResult<Vec<GeneratedImage>>) -> Arc<Self> {
            Arc::new(Self {
                generate_result: result,
                ..Self::default()
            })
        }

        fn with_edit(result: CapResult<Vec<ContentPart>>) -> Arc<Self> {
            Arc::new(Self {
                edit_result: result,
                ..Self::default()
            })
        }

        fn with_suggestions(result: CapResult<String>) -> Arc<Self> {
            Arc::new(Self {
                suggestions_result: result,
                ..Self::default()
            })
        }

        fn with_refine(result: CapResult<String>) -> Arc<Self> {
            Arc::new(Self {
                refine_result: result,
                ..Self::default()
            })
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl GenerativeCapability for MockCapability {
        async fn generate_image(
            &self,
            prompt: &str,
            _options: &GenerateOptions,
        ) -> CapResult<Vec<GeneratedImage>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen_prompts.lock().unwrap().push(prompt.to_string());
            self.generate_result.clone()
        }

        async fn edit_images(
            &self,
            _prompt: &str,
            _images: &[ImagePayload],
        ) -> CapResult<Vec<ContentPart>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.edit_result.clone()
        }

        async fn analyze_image_for_suggestions(
            &self,
            _image: &ImagePayload,
        ) -> CapResult<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.suggestions_result.clone()
        }

        async fn refine_text_prompt(
            &self,
            text: &str,
            style_image: Option<&ImagePayload>,
        ) -> CapResult<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen_refinements
                .lock()
                .unwrap()
                .push((text.to_string(), style_image.is_some()));
            self.refine_result.clone()
        }
    }

    fn sample_image() -> GeneratedImage {
        GeneratedImage {
            bytes: b"ABC".to_vec(),
            mime_type: "image/png".to_string(),
        }
    }

    #[tokio::test]
    async fn test_generate_appends_style_to_prompt() {
        let mock = MockCapability::with_generate(Ok(vec![sample_image()]));
        let service = StudioService::new(mock.clone());

        service
            .generate("a red mug", AspectRatio::Square, StylePreset::Cinematic)
            .await
            .unwrap();

        let prompts = mock.seen_prompts.lock().unwrap();
        assert_eq!(prompts.as_slice(), ["a red mug, cinematic style"]);
    }

    #[tokio::test]
    async fn test_generate_encodes_first_image() {
        let mock = MockCapability::with_generate(Ok(vec![sample_image()]));
        let service = StudioService::new(mock);

        let url = service
            .generate("a red mug", AspectRatio::Square, StylePreset::Photorealistic)
            .await
            .unwrap();
        assert_eq!(url.as_str(), "data:image/png;base64,QUJD");
    }

    #[tokio::test]
    async fn test_generate_empty_result_is_sentinel() {
        let mock = MockCapability::with_generate(Ok(Vec::new()));
        let service = StudioService::new(mock);

        let err = service
            .generate("a red mug", AspectRatio::Square, StylePreset::Photorealistic)
            .await
            .unwrap_err();
        assert!(err.is_empty_result());
        assert_eq!(err.to_string(), NO_IMAGE_GENERATED);
    }

    #[tokio::test]
    async fn test_generate_maps_quota_failure() {
        let mock = MockCapability::with_generate(Err(CapabilityError::http(
            429,
            "RESOURCE_EXHAUSTED: quota exceeded",
        )));
        let service = StudioService::new(mock);

        let err = service
            .generate("a red mug", AspectRatio::Square, StylePreset::Photorealistic)
            .await
            .unwrap_err();
        assert!(err.is_remote());
        assert!(err.to_string().contains("exceeded your API quota"));
    }

    #[tokio::test]
    async fn test_apply_edit_requires_images() {
        let mock = MockCapability::with_edit(Ok(Vec::new()));
        let service = StudioService::new(mock.clone());

        let err = service.apply_edit("new background", &[]).await.unwrap_err();
        assert!(err.is_validation());
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn test_apply_edit_returns_first_inline_image() {
        let mock = MockCapability::with_edit(Ok(vec![
            ContentPart::Text("sure, here you go".to_string()),
            ContentPart::InlineImage {
                mime_type: "image/png".to_string(),
                bytes: b"ABC".to_vec(),
            },
            ContentPart::InlineImage {
                mime_type: "image/webp".to_string(),
                bytes: b"XYZ".to_vec(),
            },
        ]));
        let service = StudioService::new(mock);

        let url = service
            .apply_edit("new background", &[ImagePayload::new("QQ==", "image/png")])
            .await
            .unwrap();
        assert_eq!(url.as_str(), "data:image/png;base64,QUJD");
    }

    #[tokio::test]
    async fn test_apply_edit_without_image_part_is_sentinel() {
        let mock =
            MockCapability::with_edit(Ok(vec![ContentPart::Text("no can do".to_string())]));
        let service = StudioService::new(mock);

        let err = service
            .apply_edit("new background", &[ImagePayload::new("QQ==", "image/png")])
            .await
            .unwrap_err();
        assert!(err.is_empty_result());
        assert_eq!(err.to_string(), NO_EDITED_IMAGE_RETURNED);
    }

    #[tokio::test]
    async fn test_fetch_suggestions_parses_json_array() {
        let mock = MockCapability::with_suggestions(Ok(
            r#"  ["rustic table", "pastel backdrop", "black mirror"]  "#.to_string(),
        ));
        let service = StudioService::new(mock);

        let suggestions = service
            .fetch_suggestions(&DataUrl::new("data:image/png;base64,QQ=="))
            .await
            .unwrap();
        assert_eq!(
            suggestions,
            ["rustic table", "pastel backdrop", "black mirror"]
        );
    }

    #[tokio::test]
    async fn test_fetch_suggestions_rejects_malformed_json() {
        for raw in ["not json at all", r#"{"prompts": []}"#, r#"[1, 2, 3]"#] {
            let mock = MockCapability::with_suggestions(Ok(raw.to_string()));
            let service = StudioService::new(mock);

            let err = service
                .fetch_suggestions(&DataUrl::new("data:image/png;base64,QQ=="))
                .await
                .unwrap_err();
            assert!(err.is_format());
            assert_eq!(
                err.to_string(),
                "Invalid JSON response format for suggestions."
            );
        }
    }

    #[tokio::test]
    async fn test_translate_and_refine_validates_blank_text() {
        let mock = MockCapability::with_refine(Ok("unused".to_string()));
        let service = StudioService::new(mock.clone());

        let err = service.translate_and_refine("   ").await.unwrap_err();
        assert!(err.is_validation());
        assert_eq!(
            err.to_string(),
            "Please enter text to translate and refine."
        );
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn test_translate_and_refine_trims_source_text() {
        let mock = MockCapability::with_refine(Ok("A refined prompt".to_string()));
        let service = StudioService::new(mock.clone());

        let result = service
            .translate_and_refine("  background bodlao  ")
            .await
            .unwrap();
        assert_eq!(result.source_text, "background bodlao");
        assert_eq!(result.refined_text, "A refined prompt");
        assert!(result.style_image.is_none());

        let refinements = mock.seen_refinements.lock().unwrap();
        assert_eq!(
            refinements.as_slice(),
            [("background bodlao".to_string(), false)]
        );
    }

    #[tokio::test]
    async fn test_refine_with_style_reference_carries_payload() {
        let mock = MockCapability::with_refine(Ok("A styled prompt".to_string()));
        let service = StudioService::new(mock.clone());

        let result = service
            .refine_with_style_reference(
                "Match the mood",
                &DataUrl::new("data:image/webp;base64,UkVG"),
            )
            .await
            .unwrap();
        assert_eq!(result.refined_text, "A styled prompt");
        assert_eq!(
            result.style_image,
            Some(ImagePayload::new("UkVG", "image/webp"))
        );

        let refinements = mock.seen_refinements.lock().unwrap();
        assert_eq!(
            refinements.as_slice(),
            [("Match the mood".to_string(), true)]
        );
    }

    #[tokio::test]
    async fn test_refine_with_style_reference_rejects_bad_data_url() {
        let mock = MockCapability::with_refine(Ok("unused".to_string()));
        let service = StudioService::new(mock.clone());

        let err = service
            .refine_with_style_reference("Match the mood", &DataUrl::new("garbage"))
            .await
            .unwrap_err();
        assert!(err.is_format());
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn test_refine_empty_reply_is_sentinel() {
        let mock = MockCapability::with_refine(Err(CapabilityError::empty(
            "The model did not return a refined prompt.",
        )));
        let service = StudioService::new(mock);

        let err = service.translate_and_refine("some text").await.unwrap_err();
        assert!(err.is_empty_result());
        assert_eq!(
            err.to_string(),
            "The model did not return a refined prompt."
        );
    }
}
