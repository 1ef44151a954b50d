//! Linear undo/redo history of edit artifacts.

use serde::{Deserialize, Serialize};

use crate::image::DataUrl;

/// Linear, branch-discarding undo/redo history for the edit workflow.
///
/// `entries[k]` is the result of the k-th successful edit. The cursor
/// selects the entry currently shown; `-1` is a distinguished position
/// meaning "viewing the original source image", which is held out of band
/// by the owning session and never stored here.
///
/// Only [`commit`](Self::commit) and [`reset`](Self::reset) mutate
/// `entries`; every other operation moves the cursor alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditHistory {
    entries: Vec<DataUrl>,
    cursor: i64,
}

impl Default for EditHistory {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            cursor: -1,
        }
    }
}

impl EditHistory {
    /// Creates an empty history positioned on the original image.
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears all entries. Called when the source image changes.
    pub fn reset(&mut self) {
        self.entries.clear();
        self.cursor = -1;
    }

    /// Records a new edit result after the cursor, discarding any entries
    /// beyond it (redoing past an edit point and committing destroys the
    /// abandoned redo branch).
    pub fn commit(&mut self, url: DataUrl) {
        self.entries.truncate((self.cursor + 1) as usize);
        self.entries.push(url);
        self.cursor = self.entries.len() as i64 - 1;
    }

    /// Steps back one entry. No-op when already on the original image.
    pub fn undo(&mut self) {
        if self.cursor > -1 {
            self.cursor -= 1;
        }
    }

    /// Steps forward one entry. No-op when already on the newest entry.
    pub fn redo(&mut self) {
        if self.cursor < self.entries.len() as i64 - 1 {
            self.cursor += 1;
        }
    }

    /// Moves the cursor directly to `index` (thumbnail selection), clamped
    /// into the valid range `[-1, entries.len() - 1]`.
    pub fn jump_to(&mut self, index: i64) {
        self.cursor = index.clamp(-1, self.entries.len() as i64 - 1);
    }

    /// The entry under the cursor, or `None` when viewing the original.
    pub fn current(&self) -> Option<&DataUrl> {
        if self.cursor > -1 {
            self.entries.get(self.cursor as usize)
        } else {
            None
        }
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > -1
    }

    pub fn can_redo(&self) -> bool {
        self.cursor < self.entries.len() as i64 - 1
    }

    pub fn entries(&self) -> &[DataUrl] {
        &self.entries
    }

    pub fn cursor(&self) -> i64 {
        self.cursor
    }
}
