//! Pure derivations over the content tree and the overlay.
//!
//! Nothing here mutates anything or touches storage: every function takes a
//! snapshot of [`ItemStates`] and computes what the presentation layer needs.
//! Hidden items are excluded from both rendering and counting, and the
//! exclusion is transitive by composition: a hidden lesson's objectives
//! contribute nothing regardless of their own flags, without any flag ever
//! being propagated downward.

use crate::content::{Lesson, Objective, Subject, Topic};

use super::types::{EmojiStatus, ItemState, ItemStates};

// ============================================================================
// Count Types
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LessonCounts {
    /// Objectives with `hidden == false`.
    pub visible: usize,
    /// Visible objectives that are done under the active mode.
    pub done: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TopicCounts {
    pub total: usize,
    pub completed: usize,
}

// ============================================================================
// Predicates
// ============================================================================

/// The mode-dependent "done" predicate used by every aggregate.
///
/// Emoji mode counts a happy reaction as done; checkbox mode counts the
/// completed flag. The two overlays are otherwise independent.
pub fn effective_done(state: &ItemState, emoji_mode: bool) -> bool {
    if emoji_mode {
        state.emoji == EmojiStatus::Happy
    } else {
        state.completed
    }
}

/// Whether an item's children render.
///
/// The session-wide expand-all flag overrides any individual collapse, but
/// never mutates it: dropping the flag restores each item's own state.
pub fn is_expanded(id: &str, states: &ItemStates, expand_all: bool) -> bool {
    expand_all || !states.get(id).collapsed
}

// ============================================================================
// Visibility Filters
// ============================================================================

/// A topic's lessons with `hidden == false`, in authored order.
pub fn visible_lessons<'a>(topic: &'a Topic, states: &ItemStates) -> Vec<&'a Lesson> {
    topic
        .lessons
        .iter()
        .filter(|l| !states.get(&l.id).hidden)
        .collect()
}

/// A lesson's objectives with `hidden == false`, in authored order.
pub fn visible_objectives<'a>(lesson: &'a Lesson, states: &ItemStates) -> Vec<&'a Objective> {
    lesson
        .objectives
        .iter()
        .filter(|o| !states.get(&o.id).hidden)
        .collect()
}

// ============================================================================
// Counts and Percentages
// ============================================================================

pub fn lesson_counts(lesson: &Lesson, states: &ItemStates, emoji_mode: bool) -> LessonCounts {
    let mut counts = LessonCounts { visible: 0, done: 0 };
    for objective in &lesson.objectives {
        let state = states.get(&objective.id);
        if state.hidden {
            continue;
        }
        counts.visible += 1;
        if effective_done(state, emoji_mode) {
            counts.done += 1;
        }
    }
    counts
}

/// Objective totals across a topic's *visible* lessons. A hidden lesson
/// contributes zero to both sides, whatever its internal objective states.
pub fn topic_counts(topic: &Topic, states: &ItemStates, emoji_mode: bool) -> TopicCounts {
    let mut counts = TopicCounts {
        total: 0,
        completed: 0,
    };
    for lesson in visible_lessons(topic, states) {
        let lc = lesson_counts(lesson, states, emoji_mode);
        counts.total += lc.visible;
        counts.completed += lc.done;
    }
    counts
}

pub fn topic_progress_percent(topic: &Topic, states: &ItemStates, emoji_mode: bool) -> f64 {
    let counts = topic_counts(topic, states, emoji_mode);
    percent(counts.completed, counts.total)
}

/// Overall subject progress across all visible topics.
pub fn subject_progress_percent(subject: &Subject, states: &ItemStates, emoji_mode: bool) -> f64 {
    let mut total = 0;
    let mut completed = 0;
    for topic in &subject.topics {
        if states.get(&topic.id).hidden {
            continue;
        }
        let counts = topic_counts(topic, states, emoji_mode);
        total += counts.total;
        completed += counts.completed;
    }
    percent(completed, total)
}

/// Zero objectives means zero percent, never NaN.
fn percent(done: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        done as f64 / total as f64 * 100.0
    }
}
