//! Item cursor for navigating questions and cards.

use serde::{Deserialize, Serialize};

/// How a cursor behaves at the ends of its range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CursorPolicy {
    /// Stop at the first and last item.
    Clamp,
    /// Wrap from the last item to the first and back.
    Wrap,
}

/// A position within an ordered list of items.
///
/// A cursor over zero items never moves.
///
/// # Examples
///
/// ```
/// use studyai_core::{Cursor, CursorPolicy};
///
/// let mut cards = Cursor::new(3, CursorPolicy::Wrap);
/// cards.prev();
/// assert_eq!(cards.index(), 2);
///
/// let mut questions = Cursor::new(3, CursorPolicy::Clamp);
/// questions.prev();
/// assert_eq!(questions.index(), 0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cursor {
    index: usize,
    len: usize,
    policy: CursorPolicy,
}

impl Cursor {
    /// Creates a cursor at the first item.
    #[must_use]
    pub const fn new(len: usize, policy: CursorPolicy) -> Self {
        Self {
            index: 0,
            len,
            policy,
        }
    }

    /// Current position.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Number of items.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if there are no items.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Moves forward one item.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) {
        if self.len == 0 {
            return;
        }
        self.index = match self.policy {
            CursorPolicy::Clamp => (self.index + 1).min(self.len - 1),
            CursorPolicy::Wrap => (self.index + 1) % self.len,
        };
    }

    /// Moves back one item.
    pub fn prev(&mut self) {
        if self.len == 0 {
            return;
        }
        self.index = match self.policy {
            CursorPolicy::Clamp => self.index.saturating_sub(1),
            CursorPolicy::Wrap => (self.index + self.len - 1) % self.len,
        };
    }

    /// Jumps to an item, clamped to the valid range.
    pub fn jump(&mut self, index: usize) {
        if self.len > 0 {
            self.index = index.min(self.len - 1);
        }
    }

    /// Progress through the items as a whole percentage, `(index + 1) / len`.
    #[must_use]
    pub fn progress_percent(&self) -> u8 {
        if self.len == 0 {
            return 0;
        }
        #[allow(
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss,
            clippy::cast_precision_loss
        )]
        let percent = (((self.index + 1) as f64 / self.len as f64) * 100.0).round() as u8;
        percent
    }
}
