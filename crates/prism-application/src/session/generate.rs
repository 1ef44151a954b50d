//! Generate-mode session state.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use prism_core::capability::{AspectRatio, StylePreset};
use prism_core::error::{Result, StudioError};
use prism_core::history::PromptHistory;
use prism_core::image::DataUrl;

use crate::studio_service::StudioService;

/// State for a text-to-image generation session.
///
/// Holds the selected aspect ratio and style preset, the navigable prompt
/// history, and the most recent result. The prompt history only records
/// prompts whose generation succeeded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateSession {
    id: String,
    /// Aspect ratio for the next generation.
    pub aspect_ratio: AspectRatio,
    /// Style preset appended to the prompt for the next generation.
    pub style: StylePreset,
    prompt_history: PromptHistory,
    result: Option<DataUrl>,
    created_at: String,
    updated_at: String,
}

impl GenerateSession {
    pub fn new() -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            id: Uuid::new_v4().to_string(),
            aspect_ratio: AspectRatio::default(),
            style: StylePreset::default(),
            prompt_history: PromptHistory::default(),
            result: None,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    /// Generates an image for `prompt` with the session's current settings.
    ///
    /// On success the result replaces the previous one and the prompt is
    /// recorded in the history. A failed run leaves the session untouched.
    pub async fn run_generate(
        &mut self,
        service: &StudioService,
        prompt: &str,
    ) -> Result<DataUrl> {
        if prompt.trim().is_empty() {
            return Err(StudioError::validation("Please enter a prompt."));
        }

        let image = service
            .generate(prompt, self.aspect_ratio, self.style)
            .await?;

        self.result = Some(image.clone());
        self.prompt_history.submit(prompt);
        self.touch();

        tracing::info!("[GenerateSession] Stored result for session {}", self.id);
        Ok(image)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// The most recent successful generation, if any.
    pub fn result(&self) -> Option<&DataUrl> {
        self.result.as_ref()
    }

    pub fn prompt_history(&self) -> &PromptHistory {
        &self.prompt_history
    }

    /// Mutable access for prompt navigation and live-edit tracking.
    pub fn prompt_history_mut(&mut self) -> &mut PromptHistory {
        &mut self.prompt_history
    }

    pub fn created_at(&self) -> &str {
        &self.created_at
    }

    pub fn updated_at(&self) -> &str {
        &self.updated_at
    }

    fn touch(&mut self) {
        self.updated_at = chrono::Utc::now().to_rfc3339();
    }
}

impl Default for GenerateSession {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use prism_core::capability::{
        ContentPart, GenerateOptions, GeneratedImage, GenerativeCapability,
    };
    use prism_core::error::CapabilityError;
    use prism_core::image::ImagePayload;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    type CapResult<T> = std::result::Result<T, CapabilityError>;

    struct StubCapability {
        generate_result: CapResult<Vec<GeneratedImage>>,
        calls: AtomicUsize,
    }

    impl StubCapability {
        fn new(generate_result: CapResult<Vec<GeneratedImage>>) -> Arc<Self> {
            Arc::new(Self {
                generate_result,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl GenerativeCapability for StubCapability {
        async fn generate_image(
            &self,
            _prompt: &str,
            _options: &GenerateOptions,
        ) -> CapResult<Vec<GeneratedImage>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.generate_result.clone()
        }

        async fn edit_images(
            &self,
            _prompt: &str,
            _images: &[ImagePayload],
        ) -> CapResult<Vec<ContentPart>> {
            Ok(Vec::new())
        }

        async fn analyze_image_for_suggestions(
            &self,
            _image: &ImagePayload,
        ) -> CapResult<String> {
            Ok(String::new())
        }

        async fn refine_text_prompt(
            &self,
            _text: &str,
            _style_image: Option<&ImagePayload>,
        ) -> CapResult<String> {
            Ok(String::new())
        }
    }

    fn sample_image() -> GeneratedImage {
        GeneratedImage {
            bytes: b"ABC".to_vec(),
            mime_type: "image/png".to_string(),
        }
    }

    #[tokio::test]
    async fn test_run_generate_validates_blank_prompt() {
        let stub = StubCapability::new(Ok(vec![sample_image()]));
        let service = StudioService::new(stub.clone());
        let mut session = GenerateSession::new();

        let err = session.run_generate(&service, "   ").await.unwrap_err();
        assert!(err.is_validation());
        assert_eq!(err.to_string(), "Please enter a prompt.");
        assert_eq!(stub.calls.load(Ordering::SeqCst), 0);
        assert!(session.result().is_none());
    }

    #[tokio::test]
    async fn test_run_generate_stores_result_and_prompt() {
        let stub = StubCapability::new(Ok(vec![sample_image()]));
        let service = StudioService::new(stub);
        let mut session = GenerateSession::new();
        session.style = StylePreset::Minimalist;

        let url = session.run_generate(&service, "a red mug").await.unwrap();
        assert_eq!(url.as_str(), "data:image/png;base64,QUJD");
        assert_eq!(session.result(), Some(&url));
        assert_eq!(session.prompt_history().entries(), ["a red mug"]);
    }

    #[tokio::test]
    async fn test_run_generate_failure_leaves_session_untouched() {
        let stub = StubCapability::new(Err(CapabilityError::http(500, "internal error")));
        let service = StudioService::new(stub);
        let mut session = GenerateSession::new();

        let err = session.run_generate(&service, "a red mug").await.unwrap_err();
        assert!(err.is_remote());
        assert!(session.result().is_none());
        assert!(session.prompt_history().entries().is_empty());
    }
}
