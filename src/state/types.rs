use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Errors produced by the state core.
///
/// Every action is validated against the content tree before anything is
/// mutated; unknown ids are hard errors, applied uniformly (never a silent
/// no-op for some actions and an error for others).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StateError {
    /// The id does not exist in the content tree at the expected level.
    #[error("unknown item id '{0}'")]
    ItemNotFound(String),

    /// Comment text was empty after sanitization.
    #[error("comment text cannot be empty")]
    EmptyComment,

    /// Comment text exceeded the accepted length.
    #[error("comment text too long ({len} chars, max {max})")]
    CommentTooLong { len: usize, max: usize },

    /// Tag label was empty after sanitization.
    #[error("tag label cannot be empty")]
    EmptyTagLabel,
}

// ============================================================================
// Overlay Values
// ============================================================================

/// Emoji reaction recorded on an objective.
///
/// In emoji mode, `Happy` is what counts as done for aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmojiStatus {
    Happy,
    Neutral,
    Sad,
    #[default]
    None,
}

/// A tag attached to an objective.
///
/// Tags are owned by value: two objectives may carry visually identical tags
/// that are independent instances. Within one objective, tags are unique by
/// id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: String,
    pub label: String,
    /// Display color, e.g. "#7aa2f7". Opaque to the core.
    pub color: String,
}

/// A comment left on an objective. Immutable once created; comments accumulate
/// in insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    /// Monotonic id within the objective, stable across reloads.
    pub id: u64,
    pub text: String,
    /// Unix timestamp (seconds) of creation.
    pub timestamp: i64,
}

/// The per-item mutable overlay: everything the user can change about an item
/// without touching the content tree.
///
/// An item with no recorded state reads as [`ItemState::DEFAULT`]. Only
/// objectives use `completed`, `emoji`, `tags`, `comments`, and
/// `text_override`; `hidden` applies to all three levels and `collapsed` to
/// topics and lessons. The store does not enforce that split — the controller
/// routes actions to valid targets.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemState {
    pub completed: bool,
    pub hidden: bool,
    pub collapsed: bool,
    pub emoji: EmojiStatus,
    pub tags: Vec<Tag>,
    pub comments: Vec<Comment>,
    /// User-edited objective text. The authored text in the content tree is
    /// never mutated; clearing the override restores it.
    pub text_override: Option<String>,
}

impl ItemState {
    /// State of an item that was never touched.
    pub const DEFAULT: ItemState = ItemState {
        completed: false,
        hidden: false,
        collapsed: false,
        emoji: EmojiStatus::None,
        tags: Vec::new(),
        comments: Vec::new(),
        text_override: None,
    };

    pub fn is_default(&self) -> bool {
        *self == Self::DEFAULT
    }
}

// ============================================================================
// Overlay Map
// ============================================================================

/// Overlay states keyed by item id.
///
/// Reads never allocate: an unknown id yields a reference to the shared
/// default state. Writes that leave an item at the default prune the entry so
/// persisted snapshots stay minimal.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemStates(HashMap<String, ItemState>);

impl ItemStates {
    pub fn get(&self, id: &str) -> &ItemState {
        static DEFAULT: ItemState = ItemState::DEFAULT;
        self.0.get(id).unwrap_or(&DEFAULT)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub(crate) fn put(&mut self, id: &str, state: ItemState) {
        if state.is_default() {
            self.0.remove(id);
        } else {
            self.0.insert(id.to_owned(), state);
        }
    }
}
