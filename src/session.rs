//! Session: one user, one subject, one logical writer.
//!
//! Owns the content library handle, the per-subject overlay tracker, and the
//! session-wide flags (emoji mode, expand all). Every user action enters
//! through [`Session::dispatch`]; every render reads through
//! [`Session::subject_view`]. Actions are handled to completion in order —
//! two rapid toggles are two flips, never coalesced.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::content::{ContentIndex, ContentLibrary, ItemLevel, Lesson, Subject};
use crate::preferences::{PreferenceManager, PREFS_KEY};
use crate::state::controller::{self, Action, Effect, Outcome};
use crate::state::store::ProgressTracker;
use crate::state::types::StateError;
use crate::storage::ProgressStore;
use crate::view::{self, SubjectView};

// ============================================================================
// Session
// ============================================================================

pub struct Session<S> {
    library: Arc<ContentLibrary>,
    subject_id: String,
    pub(crate) tracker: ProgressTracker<S>,
    prefs: PreferenceManager,
    emoji_mode: bool,
    expand_all: bool,
    celebrations: bool,
    /// Optional effect subscribers. Delivery is fire-and-forget: state is
    /// already mutated and observable before anything is sent.
    effect_tx: Vec<mpsc::UnboundedSender<Effect>>,
}

impl<S: ProgressStore> Session<S> {
    /// Open a session on one subject, loading its overlay from the store.
    ///
    /// # Errors
    ///
    /// `StateError::ItemNotFound` when the subject id is not in the library.
    pub async fn open(
        library: Arc<ContentLibrary>,
        store: S,
        subject_id: &str,
        prefs: PreferenceManager,
    ) -> Result<Self, StateError> {
        if library.subject(subject_id).is_none() {
            return Err(StateError::ItemNotFound(subject_id.to_owned()));
        }

        let tracker = ProgressTracker::open(subject_id, store).await;
        let emoji_mode = prefs.emoji_mode();
        let expand_all = prefs.expand_all();
        let celebrations = prefs.celebrations();
        tracing::debug!(subject = %subject_id, emoji_mode, expand_all, "Session opened");

        Ok(Self {
            library,
            subject_id: subject_id.to_owned(),
            tracker,
            prefs,
            emoji_mode,
            expand_all,
            celebrations,
            effect_tx: Vec::new(),
        })
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn subject_id(&self) -> &str {
        &self.subject_id
    }

    pub fn subject(&self) -> &Subject {
        self.library
            .subject(&self.subject_id)
            .expect("subject validated at open")
    }

    pub fn emoji_mode(&self) -> bool {
        self.emoji_mode
    }

    pub fn expand_all(&self) -> bool {
        self.expand_all
    }

    pub fn celebrations(&self) -> bool {
        self.celebrations
    }

    pub(crate) fn index(&self) -> &ContentIndex {
        self.library
            .index(&self.subject_id)
            .expect("subject validated at open")
    }

    pub(crate) fn find_lesson(&self, lesson_id: &str) -> Option<&Lesson> {
        self.subject()
            .topics
            .iter()
            .flat_map(|t| t.lessons.iter())
            .find(|l| l.id == lesson_id)
    }

    // ========================================================================
    // Dispatch
    // ========================================================================

    /// Apply one user action. The mutation (if any) is complete and readable
    /// before this returns; effects are delivered to subscribers afterwards.
    pub async fn dispatch(&mut self, action: Action) -> Result<Outcome, StateError> {
        tracing::debug!(?action, "Dispatching action");
        let outcome = controller::apply(self, action).await?;

        if !outcome.effects.is_empty() {
            self.effect_tx.retain(|tx| {
                outcome.effects.iter().all(|e| tx.send(e.clone()).is_ok())
            });
        }
        Ok(outcome)
    }

    /// Subscribe to effects. Dropping the receiver unsubscribes.
    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<Effect> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.effect_tx.push(tx);
        rx
    }

    /// Build the render-ready view of the whole subject.
    pub fn subject_view(&self) -> SubjectView {
        view::subject_view(
            self.subject(),
            self.tracker.states(),
            self.tracker.bookmarks(),
            self.emoji_mode,
            self.expand_all,
        )
    }

    // ========================================================================
    // Internal Helpers (used by the controller)
    // ========================================================================

    pub(crate) fn require(&self, id: &str, level: ItemLevel) -> Result<(), StateError> {
        if self.index().level_of(id) == Some(level) {
            Ok(())
        } else {
            Err(StateError::ItemNotFound(id.to_owned()))
        }
    }

    /// Topics and lessons collapse; objectives have no children.
    pub(crate) fn require_collapsible(&self, id: &str) -> Result<(), StateError> {
        match self.index().level_of(id) {
            Some(ItemLevel::Topic) | Some(ItemLevel::Lesson) => Ok(()),
            _ => Err(StateError::ItemNotFound(id.to_owned())),
        }
    }

    /// Flip a session-wide flag and persist it as a preference. Per-item
    /// collapsed flags are never touched by `expand_all` — dropping the
    /// override reveals each item's own state again.
    pub(crate) async fn set_flag(
        &mut self,
        name: &str,
        value: bool,
    ) -> Result<Outcome, StateError> {
        let current = match name {
            "emoji_mode" => &mut self.emoji_mode,
            "expand_all" => &mut self.expand_all,
            _ => unreachable!("unknown session flag"),
        };
        if *current == value {
            return Ok(Outcome::unchanged());
        }
        *current = value;

        let mut effects = Vec::new();
        if let Err(e) = self
            .prefs
            .set(self.tracker.store(), name, &value.to_string())
            .await
        {
            tracing::warn!(flag = name, error = %e, "Preference write failed");
            effects.push(Effect::PersistenceWarning {
                key: PREFS_KEY.to_owned(),
            });
        }
        Ok(Outcome {
            changed: true,
            effects,
        })
    }
}
