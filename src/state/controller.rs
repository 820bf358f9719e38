//! Action dispatch: the single entry point for user-driven state transitions.
//!
//! The presentation layer never mutates state directly; it sends one of the
//! [`Action`] variants through [`crate::Session::dispatch`], which validates
//! the target against the content tree, applies the mutation to the overlay,
//! and reports which side-channel [`Effect`]s the mutation produced.

use crate::content::ItemLevel;
use crate::session::Session;
use crate::state::aggregate;
use crate::storage::ProgressStore;
use crate::util::{clean_user_text, MAX_COMMENT_LENGTH};

use super::store::{WriteOutcome, BOOKMARKS_KEY};
use super::types::{EmojiStatus, StateError, Tag};

// ============================================================================
// Actions
// ============================================================================

/// Item levels a hide/unhide action can target.
pub type Level = ItemLevel;

/// One user action against the tree.
///
/// Ids are routed internally, replacing per-level callback chains: a UI layer
/// needs exactly one dispatch function however deeply an item is nested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Flip an objective's completed flag. Always legal, no guards.
    ToggleObjective { objective_id: String },
    /// Set an objective's emoji reaction. Re-sending the currently active
    /// status clears it to none (click-active-to-clear).
    SetEmoji {
        objective_id: String,
        status: EmojiStatus,
    },
    SetHidden {
        level: Level,
        id: String,
        hidden: bool,
    },
    ToggleHidden { level: Level, id: String },
    /// Collapse or expand a topic or lesson. Objectives have no children and
    /// are not collapsible.
    SetCollapsed { id: String, collapsed: bool },
    ToggleCollapsed { id: String },
    AddTag { objective_id: String, tag: Tag },
    RemoveTag {
        objective_id: String,
        tag_id: String,
    },
    AddComment {
        objective_id: String,
        text: String,
    },
    /// Override an objective's display text. Empty text clears the override,
    /// restoring the authored text.
    EditObjective {
        objective_id: String,
        text: String,
    },
    ToggleBookmark { lesson_id: String },
    /// Session-wide flags. Persisted as preferences, not per-item state.
    SetEmojiMode(bool),
    SetExpandAll(bool),
}

// ============================================================================
// Effects
// ============================================================================

/// Side-channel notifications produced by a successful dispatch.
///
/// Effects are advisory: the mutation is already applied and observable
/// before any effect is delivered, and nothing depends on an effect being
/// consumed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// An objective just became done under the active mode — the UI may play
    /// a transient celebration.
    ObjectiveCelebrated { objective_id: String },
    /// Every visible objective of this lesson is now done.
    LessonCompleted { lesson_id: String },
    /// The in-memory change applied but the durable write under `key` failed.
    PersistenceWarning { key: String },
}

/// What one dispatch did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    /// False when the action was an idempotent no-op.
    pub changed: bool,
    pub effects: Vec<Effect>,
}

impl Outcome {
    pub(crate) fn unchanged() -> Self {
        Outcome {
            changed: false,
            effects: Vec::new(),
        }
    }
}

// ============================================================================
// Dispatch
// ============================================================================

/// Apply one action to a session.
///
/// Unknown ids (or ids at the wrong level) fail with
/// [`StateError::ItemNotFound`] before anything is mutated; this policy is
/// uniform across every action.
pub(crate) async fn apply<S: ProgressStore>(
    session: &mut Session<S>,
    action: Action,
) -> Result<Outcome, StateError> {
    match action {
        Action::ToggleObjective { objective_id } => {
            session.require(&objective_id, ItemLevel::Objective)?;
            let state = session.tracker.states().get(&objective_id);
            let was_done = aggregate::effective_done(state, session.emoji_mode());
            let completed = !state.completed;
            let write = session.tracker.set_completed(&objective_id, completed).await;
            Ok(done_outcome(session, &objective_id, write, was_done))
        }

        Action::SetEmoji {
            objective_id,
            status,
        } => {
            session.require(&objective_id, ItemLevel::Objective)?;
            let state = session.tracker.states().get(&objective_id);
            let was_done = aggregate::effective_done(state, session.emoji_mode());
            // Click-active-to-clear: re-sending the current status resets it
            let next = if status == state.emoji {
                EmojiStatus::None
            } else {
                status
            };
            let write = session.tracker.set_emoji(&objective_id, next).await;
            Ok(done_outcome(session, &objective_id, write, was_done))
        }

        Action::SetHidden { level, id, hidden } => {
            session.require(&id, level)?;
            // Hidden is local to this node: descendants' flags are never
            // touched, the aggregate layer handles the transitive effect.
            let write = session.tracker.set_hidden(&id, hidden).await;
            Ok(plain_outcome(session, write))
        }

        Action::ToggleHidden { level, id } => {
            session.require(&id, level)?;
            let hidden = !session.tracker.states().get(&id).hidden;
            let write = session.tracker.set_hidden(&id, hidden).await;
            Ok(plain_outcome(session, write))
        }

        Action::SetCollapsed { id, collapsed } => {
            session.require_collapsible(&id)?;
            let write = session.tracker.set_collapsed(&id, collapsed).await;
            Ok(plain_outcome(session, write))
        }

        Action::ToggleCollapsed { id } => {
            session.require_collapsible(&id)?;
            let collapsed = !session.tracker.states().get(&id).collapsed;
            let write = session.tracker.set_collapsed(&id, collapsed).await;
            Ok(plain_outcome(session, write))
        }

        Action::AddTag { objective_id, tag } => {
            session.require(&objective_id, ItemLevel::Objective)?;
            let label = clean_user_text(&tag.label).ok_or(StateError::EmptyTagLabel)?;
            let write = session
                .tracker
                .add_tag(&objective_id, Tag { label, ..tag })
                .await;
            Ok(plain_outcome(session, write))
        }

        Action::RemoveTag {
            objective_id,
            tag_id,
        } => {
            session.require(&objective_id, ItemLevel::Objective)?;
            let write = session.tracker.remove_tag(&objective_id, &tag_id).await;
            Ok(plain_outcome(session, write))
        }

        Action::AddComment {
            objective_id,
            text,
        } => {
            session.require(&objective_id, ItemLevel::Objective)?;
            let text = clean_user_text(&text).ok_or(StateError::EmptyComment)?;
            let len = text.chars().count();
            if len > MAX_COMMENT_LENGTH {
                return Err(StateError::CommentTooLong {
                    len,
                    max: MAX_COMMENT_LENGTH,
                });
            }
            let (write, _comment) = session.tracker.add_comment(&objective_id, text).await;
            Ok(plain_outcome(session, write))
        }

        Action::EditObjective {
            objective_id,
            text,
        } => {
            session.require(&objective_id, ItemLevel::Objective)?;
            let write = session
                .tracker
                .set_text_override(&objective_id, clean_user_text(&text))
                .await;
            Ok(plain_outcome(session, write))
        }

        Action::ToggleBookmark { lesson_id } => {
            session.require(&lesson_id, ItemLevel::Lesson)?;
            let write = session.tracker.toggle_bookmark(&lesson_id).await;
            let mut outcome = Outcome {
                changed: write.changed,
                effects: Vec::new(),
            };
            if !write.persisted {
                outcome.effects.push(Effect::PersistenceWarning {
                    key: BOOKMARKS_KEY.to_owned(),
                });
            }
            Ok(outcome)
        }

        Action::SetEmojiMode(on) => session.set_flag("emoji_mode", on).await,
        Action::SetExpandAll(on) => session.set_flag("expand_all", on).await,
    }
}

/// Outcome for mutations that cannot complete anything: just the change bit
/// plus a persistence warning when the write-through failed.
fn plain_outcome<S: ProgressStore>(session: &Session<S>, write: WriteOutcome) -> Outcome {
    let mut outcome = Outcome {
        changed: write.changed,
        effects: Vec::new(),
    };
    if !write.persisted {
        outcome.effects.push(Effect::PersistenceWarning {
            key: session.tracker.progress_key().to_owned(),
        });
    }
    outcome
}

/// Outcome for completion-affecting mutations on an objective: celebration
/// effects fire when the objective *became* done under the active mode
/// (`was_done` is the pre-mutation predicate, so an objective that stays done
/// through an unrelated overlay change never re-celebrates), and a
/// lesson-completed effect when its whole lesson is now done.
fn done_outcome<S: ProgressStore>(
    session: &Session<S>,
    objective_id: &str,
    write: WriteOutcome,
    was_done: bool,
) -> Outcome {
    let mut outcome = plain_outcome(session, write);
    if !outcome.changed {
        return outcome;
    }

    let states = session.tracker.states();
    let emoji_mode = session.emoji_mode();
    if was_done || !aggregate::effective_done(states.get(objective_id), emoji_mode) {
        return outcome;
    }

    if session.celebrations() {
        outcome.effects.push(Effect::ObjectiveCelebrated {
            objective_id: objective_id.to_owned(),
        });
    }

    // Did this complete the owning lesson?
    let lesson_id = session
        .index()
        .lesson_of_objective(objective_id)
        .map(str::to_owned);
    if let Some(lesson_id) = lesson_id {
        if let Some(lesson) = session.find_lesson(&lesson_id) {
            let counts = aggregate::lesson_counts(lesson, states, emoji_mode);
            if counts.visible > 0 && counts.done == counts.visible {
                outcome.effects.push(Effect::LessonCompleted { lesson_id });
            }
        }
    }

    outcome
}
