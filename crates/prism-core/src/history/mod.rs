//! History controllers for the edit and prompt workflows.
//!
//! The two controllers are structurally similar but intentionally kept
//! separate: one tracks produced image artifacts with branch-discarding
//! undo/redo, the other tracks cursor-navigable prompt text with live-edit
//! preservation and bounded move-to-front deduplication. Their truncation
//! rules differ, so merging them would entangle unrelated invariants.
//!
//! # Module Structure
//!
//! - `edit`: undo/redo stack of edit results (`EditHistory`)
//! - `prompt`: bounded navigable prompt history (`PromptHistory`)

mod edit;
mod prompt;

// Re-export public API
pub use edit::EditHistory;
pub use prompt::PromptHistory;
