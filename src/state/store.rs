use std::collections::BTreeSet;

use chrono::Utc;

use crate::storage::ProgressStore;

use super::types::{Comment, EmojiStatus, ItemState, ItemStates, Tag};

/// Store key for the bookmarked-lessons set (shared across subjects).
pub const BOOKMARKS_KEY: &str = "bookmarked-lessons";

// ============================================================================
// Write Outcome
// ============================================================================

/// Result of one mutation against the tracker.
///
/// `changed == false` means the mutation was an idempotent no-op: nothing was
/// written to memory or the store. `persisted == false` means the in-memory
/// change applied but the durable write failed — the caller surfaces that as
/// a warning, never as a rollback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteOutcome {
    pub changed: bool,
    pub persisted: bool,
}

impl WriteOutcome {
    pub(crate) const UNCHANGED: WriteOutcome = WriteOutcome {
        changed: false,
        persisted: true,
    };
}

// ============================================================================
// ProgressTracker
// ============================================================================

/// The per-user mutable overlay for one subject, write-through to the
/// persistence port.
///
/// Reads are in-memory and immediate; every effective mutation serializes the
/// overlay snapshot under `progress-<subjectId>` (bookmarks under their own
/// key). The tracker never talks to a concrete storage API — any
/// [`ProgressStore`] adapter will do.
pub struct ProgressTracker<S> {
    subject_id: String,
    progress_key: String,
    states: ItemStates,
    bookmarks: BTreeSet<String>,
    store: S,
}

impl<S: ProgressStore> ProgressTracker<S> {
    /// Load the overlay for `subject_id` from the store.
    ///
    /// A missing snapshot starts empty; a snapshot that fails to read or
    /// parse also starts empty, with a warning — stale progress is
    /// recoverable, a refusal to start is not.
    pub async fn open(subject_id: impl Into<String>, store: S) -> Self {
        let subject_id = subject_id.into();
        let progress_key = format!("progress-{subject_id}");

        let states = match store.get(&progress_key).await {
            Ok(Some(value)) => serde_json::from_value(value).unwrap_or_else(|e| {
                tracing::warn!(key = %progress_key, error = %e, "Corrupt progress snapshot, starting empty");
                ItemStates::default()
            }),
            Ok(None) => ItemStates::default(),
            Err(e) => {
                tracing::warn!(key = %progress_key, error = %e, "Failed to load progress, starting empty");
                ItemStates::default()
            }
        };

        let bookmarks = match store.get(BOOKMARKS_KEY).await {
            Ok(Some(value)) => serde_json::from_value(value).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Corrupt bookmark list, starting empty");
                BTreeSet::new()
            }),
            Ok(None) => BTreeSet::new(),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load bookmarks, starting empty");
                BTreeSet::new()
            }
        };

        Self {
            subject_id,
            progress_key,
            states,
            bookmarks,
            store,
        }
    }

    pub fn subject_id(&self) -> &str {
        &self.subject_id
    }

    pub fn progress_key(&self) -> &str {
        &self.progress_key
    }

    /// Read-only view of the overlay for the aggregation layer.
    pub fn states(&self) -> &ItemStates {
        &self.states
    }

    pub fn bookmarks(&self) -> &BTreeSet<String> {
        &self.bookmarks
    }

    pub fn is_bookmarked(&self, lesson_id: &str) -> bool {
        self.bookmarks.contains(lesson_id)
    }

    pub(crate) fn store(&self) -> &S {
        &self.store
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    pub async fn set_completed(&mut self, id: &str, completed: bool) -> WriteOutcome {
        self.update(id, |s| s.completed = completed).await
    }

    pub async fn set_hidden(&mut self, id: &str, hidden: bool) -> WriteOutcome {
        self.update(id, |s| s.hidden = hidden).await
    }

    pub async fn set_collapsed(&mut self, id: &str, collapsed: bool) -> WriteOutcome {
        self.update(id, |s| s.collapsed = collapsed).await
    }

    pub async fn set_emoji(&mut self, id: &str, emoji: EmojiStatus) -> WriteOutcome {
        self.update(id, |s| s.emoji = emoji).await
    }

    /// Add a tag, deduplicated by tag id: re-adding an existing id is a
    /// no-op, like every other idempotent setter.
    pub async fn add_tag(&mut self, id: &str, tag: Tag) -> WriteOutcome {
        self.update(id, |s| {
            if !s.tags.iter().any(|t| t.id == tag.id) {
                s.tags.push(tag);
            }
        })
        .await
    }

    pub async fn remove_tag(&mut self, id: &str, tag_id: &str) -> WriteOutcome {
        self.update(id, |s| s.tags.retain(|t| t.id != tag_id)).await
    }

    /// Append a comment. Unlike the setters this is never a no-op: every call
    /// appends, in insertion order. Returns the created comment alongside the
    /// outcome.
    pub async fn add_comment(&mut self, id: &str, text: String) -> (WriteOutcome, Comment) {
        let mut state = self.states.get(id).clone();
        let comment = Comment {
            id: state.comments.iter().map(|c| c.id).max().unwrap_or(0) + 1,
            text,
            timestamp: Utc::now().timestamp(),
        };
        state.comments.push(comment.clone());
        self.states.put(id, state);

        let persisted = self.persist_states().await;
        (
            WriteOutcome {
                changed: true,
                persisted,
            },
            comment,
        )
    }

    /// Set or clear the user's objective-text override.
    pub async fn set_text_override(&mut self, id: &str, text: Option<String>) -> WriteOutcome {
        self.update(id, |s| s.text_override = text).await
    }

    /// Flip a lesson's bookmark. Bookmarks live under their own store key.
    pub async fn toggle_bookmark(&mut self, lesson_id: &str) -> WriteOutcome {
        if !self.bookmarks.remove(lesson_id) {
            self.bookmarks.insert(lesson_id.to_owned());
        }
        let persisted = match serde_json::to_value(&self.bookmarks) {
            Ok(value) => match self.store.set(BOOKMARKS_KEY, value).await {
                Ok(()) => true,
                Err(e) => {
                    tracing::warn!(key = BOOKMARKS_KEY, error = %e, "Bookmark write failed");
                    false
                }
            },
            Err(e) => {
                tracing::warn!(error = %e, "Bookmark encode failed");
                false
            }
        };
        WriteOutcome {
            changed: true,
            persisted,
        }
    }

    // ========================================================================
    // Internal Helpers
    // ========================================================================

    /// Apply a mutation to one item's state. Equal-value writes are detected
    /// by comparison and skipped entirely (no store write, no re-render
    /// trigger for the caller).
    async fn update(&mut self, id: &str, f: impl FnOnce(&mut ItemState)) -> WriteOutcome {
        let old = self.states.get(id);
        let mut new = old.clone();
        f(&mut new);
        if new == *old {
            return WriteOutcome::UNCHANGED;
        }

        self.states.put(id, new);
        let persisted = self.persist_states().await;
        WriteOutcome {
            changed: true,
            persisted,
        }
    }

    /// Write the overlay snapshot through to the store. The in-memory state
    /// is already updated and stays updated whatever happens here.
    async fn persist_states(&self) -> bool {
        let value = match serde_json::to_value(&self.states) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(key = %self.progress_key, error = %e, "Snapshot encode failed");
                return false;
            }
        };
        match self.store.set(&self.progress_key, value).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(key = %self.progress_key, error = %e, "Progress write failed");
                false
            }
        }
    }
}
