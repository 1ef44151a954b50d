//! Bounded, navigable history of submitted prompts.

use serde::{Deserialize, Serialize};

/// Command-line style history of previously submitted prompts.
///
/// Entries are unique and ordered most recent first; resubmitting an
/// existing prompt moves it to the front. The cursor walks the entries
/// (`-1` = not browsing, the input box holds live typed text), and the
/// live text is preserved so it can be restored when navigation returns
/// to the front.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptHistory {
    entries: Vec<String>,
    cursor: i64,
    pending_typed_text: String,
}

impl Default for PromptHistory {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            cursor: -1,
            pending_typed_text: String::new(),
        }
    }
}

impl PromptHistory {
    /// Oldest entries are evicted beyond this bound.
    pub const MAX_ENTRIES: usize = 50;

    pub fn new() -> Self {
        Self::default()
    }

    /// Records a successfully submitted prompt.
    ///
    /// The text is trimmed (blank submissions are ignored), any existing
    /// equal entry is moved to the front, the list is truncated to
    /// [`MAX_ENTRIES`](Self::MAX_ENTRIES), and browsing stops with the
    /// submitted text as the live text.
    pub fn submit(&mut self, text: &str) {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return;
        }
        self.entries.retain(|entry| entry != trimmed);
        self.entries.insert(0, trimmed.to_string());
        self.entries.truncate(Self::MAX_ENTRIES);
        self.cursor = -1;
        self.pending_typed_text = trimmed.to_string();
    }

    /// Tracks the input box content as the user types.
    ///
    /// Typing cancels history browsing.
    pub fn on_live_edit(&mut self, text: &str) {
        self.pending_typed_text = text.to_string();
        self.cursor = -1;
    }

    /// Steps toward older entries and returns the text to display.
    ///
    /// `None` means the cursor is already on the oldest entry (or there is
    /// no history) and the display should not change.
    pub fn navigate_older(&mut self) -> Option<&str> {
        if self.entries.is_empty() || self.cursor >= self.entries.len() as i64 - 1 {
            return None;
        }
        self.cursor += 1;
        Some(self.entries[self.cursor as usize].as_str())
    }

    /// Steps toward newer entries and returns the text to display.
    ///
    /// Stepping past the newest entry leaves browsing mode and restores
    /// the preserved live text. `None` means not browsing at all.
    pub fn navigate_newer(&mut self) -> Option<&str> {
        if self.cursor > 0 {
            self.cursor -= 1;
            Some(self.entries[self.cursor as usize].as_str())
        } else if self.cursor == 0 {
            self.cursor = -1;
            Some(self.pending_typed_text.as_str())
        } else {
            None
        }
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn cursor(&self) -> i64 {
        self.cursor
    }

    pub fn pending_typed_text(&self) -> &str {
        &self.pending_typed_text
    }
}
