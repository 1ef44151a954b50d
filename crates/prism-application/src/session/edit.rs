//! Edit-mode session state.
//!
//! Ties the uploaded product and reference images to the edit history,
//! the prompt history, and the suggestion/refinement workflows. History
//! commits and prompt submissions happen strictly after a successful
//! remote call, so a failed edit never disturbs what is on screen.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use prism_core::error::{Result, StudioError};
use prism_core::history::{EditHistory, PromptHistory};
use prism_core::image::DataUrl;

use crate::studio_service::{RefinementResult, StudioService};

/// Canned starting points for style-based refinement, as (label, prompt)
/// pairs.
pub const STYLE_REFINEMENT_SUGGESTIONS: [(&str, &str); 3] = [
    (
        "Match Style & Mood",
        "Match the overall style, lighting, and mood of the reference image.",
    ),
    (
        "Adopt Color Palette",
        "Adopt the color palette from the reference image.",
    ),
    (
        "Match Background",
        "Recreate the background and composition of the reference image.",
    ),
];

/// State for an image-editing session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditSession {
    id: String,
    product_image: Option<DataUrl>,
    reference_image: Option<DataUrl>,
    history: EditHistory,
    prompt_history: PromptHistory,
    suggestions: Vec<String>,
    refinement: Option<RefinementResult>,
    created_at: String,
    updated_at: String,
}

impl EditSession {
    pub fn new() -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            id: Uuid::new_v4().to_string(),
            product_image: None,
            reference_image: None,
            history: EditHistory::default(),
            prompt_history: PromptHistory::default(),
            suggestions: Vec::new(),
            refinement: None,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    /// Replaces the product image.
    ///
    /// The edit history and suggestions belong to the previous product, so
    /// both are cleared. The reference image is kept.
    pub fn set_product_image(&mut self, image: Option<DataUrl>) {
        self.product_image = image;
        self.history.reset();
        self.suggestions.clear();
        self.touch();
    }

    /// Replaces the style reference image without disturbing other state.
    pub fn set_reference_image(&mut self, image: Option<DataUrl>) {
        self.reference_image = image;
        self.touch();
    }

    /// Runs a prompt-driven edit against the currently displayed image.
    ///
    /// The source sent to the capability is the history entry under the
    /// cursor, or the uploaded product image when the cursor sits on the
    /// original. A reference image, when present, is appended after the
    /// source. On success the result is committed to the history (discarding
    /// any redo branch) and the prompt is recorded.
    pub async fn run_edit(&mut self, service: &StudioService, prompt: &str) -> Result<DataUrl> {
        let Some(product) = self.product_image.as_ref() else {
            return Err(StudioError::validation("Please upload a product image."));
        };
        if prompt.trim().is_empty() {
            return Err(StudioError::validation("Please enter a prompt."));
        }

        let source = self.history.current().unwrap_or(product);
        let mut payloads = vec![source.decode()?];
        if let Some(reference) = self.reference_image.as_ref() {
            payloads.push(reference.decode()?);
        }

        let result = service.apply_edit(prompt, &payloads).await?;

        self.history.commit(result.clone());
        self.prompt_history.submit(prompt);
        self.touch();

        tracing::info!(
            "[EditSession] Committed edit {} for session {}",
            self.history.cursor(),
            self.id
        );
        Ok(result)
    }

    /// Fetches photoshoot prompt suggestions for the uploaded product image.
    pub async fn run_fetch_suggestions(&mut self, service: &StudioService) -> Result<Vec<String>> {
        let Some(product) = self.product_image.as_ref() else {
            return Err(StudioError::validation("Please upload a product image."));
        };

        let suggestions = service.fetch_suggestions(product).await?;
        self.suggestions = suggestions.clone();
        self.touch();
        Ok(suggestions)
    }

    /// Translates free text into a refined English prompt and stores the
    /// refinement. Returns the refined text.
    pub async fn run_translate(&mut self, service: &StudioService, text: &str) -> Result<String> {
        let refinement = service.translate_and_refine(text).await?;
        let refined = refinement.refined_text.clone();
        self.refinement = Some(refinement);
        self.touch();
        Ok(refined)
    }

    /// Refines a suggestion into a style-matching edit prompt using the
    /// reference image. Returns the refined text.
    pub async fn run_refine_from_style(
        &mut self,
        service: &StudioService,
        suggestion_text: &str,
    ) -> Result<String> {
        let Some(reference) = self.reference_image.as_ref() else {
            return Err(StudioError::validation(
                "A reference image is required to refine from style.",
            ));
        };

        let refinement = service
            .refine_with_style_reference(suggestion_text, reference)
            .await?;
        let refined = refinement.refined_text.clone();
        self.refinement = Some(refinement);
        self.touch();
        Ok(refined)
    }

    /// The image currently on screen: the history entry under the cursor,
    /// falling back to the uploaded product image.
    pub fn display_image(&self) -> Option<&DataUrl> {
        self.history.current().or(self.product_image.as_ref())
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn product_image(&self) -> Option<&DataUrl> {
        self.product_image.as_ref()
    }

    pub fn reference_image(&self) -> Option<&DataUrl> {
        self.reference_image.as_ref()
    }

    pub fn history(&self) -> &EditHistory {
        &self.history
    }

    /// Mutable access for undo/redo and cursor jumps.
    pub fn history_mut(&mut self) -> &mut EditHistory {
        &mut self.history
    }

    pub fn prompt_history(&self) -> &PromptHistory {
        &self.prompt_history
    }

    /// Mutable access for prompt navigation and live-edit tracking.
    pub fn prompt_history_mut(&mut self) -> &mut PromptHistory {
        &mut self.prompt_history
    }

    pub fn suggestions(&self) -> &[String] {
        &self.suggestions
    }

    pub fn refinement(&self) -> Option<&RefinementResult> {
        self.refinement.as_ref()
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

impl Default for EditSession {
    fn default() -> Self {
        Self::new()
    }
}
