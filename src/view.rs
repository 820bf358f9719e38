//! View models: the read-only shapes a presentation layer binds to.
//!
//! Built fresh from the content tree + overlay snapshot on every render;
//! hidden items are already filtered out and all counts are precomputed, so
//! a UI layer only needs these structs plus the `Action` dispatch entry
//! point.

use std::collections::BTreeSet;

use crate::content::{Lesson, Subject, Topic};
use crate::state::aggregate;
use crate::state::types::{Comment, EmojiStatus, ItemStates, Tag};
use crate::util::slug::thread_slug;

// ============================================================================
// View Structs
// ============================================================================

#[derive(Debug, Clone)]
pub struct SubjectView {
    pub id: String,
    pub title: String,
    pub description: String,
    pub progress_percent: f64,
    /// Visible topics only, in authored order.
    pub topics: Vec<TopicView>,
}

#[derive(Debug, Clone)]
pub struct TopicView {
    pub id: String,
    pub title: String,
    pub description: String,
    pub is_expanded: bool,
    pub completed_count: usize,
    pub total_count: usize,
    pub progress_percent: f64,
    /// Visible lessons only, in authored order.
    pub lessons: Vec<LessonView>,
}

#[derive(Debug, Clone)]
pub struct LessonView {
    pub id: String,
    pub title: String,
    pub is_expanded: bool,
    pub bookmarked: bool,
    pub visible_count: usize,
    pub done_count: usize,
    /// Visible objectives only, in authored order.
    pub objectives: Vec<ObjectiveView>,
}

#[derive(Debug, Clone)]
pub struct ObjectiveView {
    pub id: String,
    /// Display text: the user's override when set, else the authored text.
    pub text: String,
    pub completed: bool,
    pub emoji: EmojiStatus,
    /// Done under the active mode — what progress bars should show.
    pub effective_done: bool,
    pub tags: Vec<Tag>,
    pub comments: Vec<Comment>,
    /// Deterministic reference for the external discussion thread.
    pub thread_slug: String,
}

// ============================================================================
// Builders
// ============================================================================

pub fn subject_view(
    subject: &Subject,
    states: &ItemStates,
    bookmarks: &BTreeSet<String>,
    emoji_mode: bool,
    expand_all: bool,
) -> SubjectView {
    SubjectView {
        id: subject.id.clone(),
        title: subject.title.clone(),
        description: subject.description.clone(),
        progress_percent: aggregate::subject_progress_percent(subject, states, emoji_mode),
        topics: subject
            .topics
            .iter()
            .filter(|t| !states.get(&t.id).hidden)
            .map(|t| topic_view(t, states, bookmarks, emoji_mode, expand_all))
            .collect(),
    }
}

pub fn topic_view(
    topic: &Topic,
    states: &ItemStates,
    bookmarks: &BTreeSet<String>,
    emoji_mode: bool,
    expand_all: bool,
) -> TopicView {
    let counts = aggregate::topic_counts(topic, states, emoji_mode);
    TopicView {
        id: topic.id.clone(),
        title: topic.title.clone(),
        description: topic.description.clone(),
        is_expanded: aggregate::is_expanded(&topic.id, states, expand_all),
        completed_count: counts.completed,
        total_count: counts.total,
        progress_percent: aggregate::topic_progress_percent(topic, states, emoji_mode),
        lessons: aggregate::visible_lessons(topic, states)
            .into_iter()
            .map(|l| lesson_view(l, states, bookmarks, emoji_mode, expand_all))
            .collect(),
    }
}

pub fn lesson_view(
    lesson: &Lesson,
    states: &ItemStates,
    bookmarks: &BTreeSet<String>,
    emoji_mode: bool,
    expand_all: bool,
) -> LessonView {
    let counts = aggregate::lesson_counts(lesson, states, emoji_mode);
    LessonView {
        id: lesson.id.clone(),
        title: lesson.title.clone(),
        is_expanded: aggregate::is_expanded(&lesson.id, states, expand_all),
        bookmarked: bookmarks.contains(&lesson.id),
        visible_count: counts.visible,
        done_count: counts.done,
        objectives: aggregate::visible_objectives(lesson, states)
            .into_iter()
            .map(|o| {
                let state = states.get(&o.id);
                let text = state.text_override.clone().unwrap_or_else(|| o.text.clone());
                ObjectiveView {
                    id: o.id.clone(),
                    thread_slug: thread_slug(&o.id, &text),
                    text,
                    completed: state.completed,
                    emoji: state.emoji,
                    effective_done: aggregate::effective_done(state, emoji_mode),
                    tags: state.tags.clone(),
                    comments: state.comments.clone(),
                }
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use crate::content::Objective;
    use crate::state::types::ItemState;

    use super::*;

    fn subject() -> Subject {
        Subject {
            id: "s1".into(),
            title: "Subject".into(),
            description: "desc".into(),
            topics: vec![Topic {
                id: "t1".into(),
                title: "Topic".into(),
                description: String::new(),
                lessons: vec![Lesson {
                    id: "l1".into(),
                    title: "Lesson".into(),
                    objectives: vec![
                        Objective {
                            id: "o1".into(),
                            text: "First objective".into(),
                        },
                        Objective {
                            id: "o2".into(),
                            text: "Second objective".into(),
                        },
                    ],
                    sections: Vec::new(),
                }],
            }],
        }
    }

    fn with(states: &mut ItemStates, id: &str, f: impl FnOnce(&mut ItemState)) {
        let mut s = states.get(id).clone();
        f(&mut s);
        states.put(id, s);
    }

    #[test]
    fn view_filters_hidden_and_counts() {
        let mut states = ItemStates::default();
        with(&mut states, "o1", |s| s.completed = true);
        with(&mut states, "o2", |s| s.hidden = true);

        let view = subject_view(&subject(), &states, &BTreeSet::new(), false, false);
        assert_eq!(view.progress_percent, 100.0);
        let lesson = &view.topics[0].lessons[0];
        assert_eq!(lesson.visible_count, 1);
        assert_eq!(lesson.done_count, 1);
        assert_eq!(lesson.objectives.len(), 1);
        assert_eq!(lesson.objectives[0].id, "o1");
    }

    #[test]
    fn hidden_topic_is_filtered_from_view() {
        let mut states = ItemStates::default();
        with(&mut states, "t1", |s| s.hidden = true);

        let view = subject_view(&subject(), &states, &BTreeSet::new(), false, false);
        assert!(view.topics.is_empty());
        assert_eq!(view.progress_percent, 0.0);
    }

    #[test]
    fn override_text_feeds_display_and_slug() {
        let mut states = ItemStates::default();
        with(&mut states, "o1", |s| {
            s.text_override = Some("Edited text".into())
        });

        let view = subject_view(&subject(), &states, &BTreeSet::new(), false, false);
        let objective = &view.topics[0].lessons[0].objectives[0];
        assert_eq!(objective.text, "Edited text");
        assert_eq!(objective.thread_slug, "edited-text-o1");
    }

    #[test]
    fn expand_all_forces_expansion_in_view() {
        let mut states = ItemStates::default();
        with(&mut states, "t1", |s| s.collapsed = true);
        with(&mut states, "l1", |s| s.collapsed = true);

        let collapsed = subject_view(&subject(), &states, &BTreeSet::new(), false, false);
        assert!(!collapsed.topics[0].is_expanded);
        assert!(!collapsed.topics[0].lessons[0].is_expanded);

        let expanded = subject_view(&subject(), &states, &BTreeSet::new(), false, true);
        assert!(expanded.topics[0].is_expanded);
        assert!(expanded.topics[0].lessons[0].is_expanded);
    }

    #[test]
    fn bookmarks_mark_lessons() {
        let mut bookmarks = BTreeSet::new();
        bookmarks.insert("l1".to_owned());

        let view = subject_view(
            &subject(),
            &ItemStates::default(),
            &bookmarks,
            false,
            false,
        );
        assert!(view.topics[0].lessons[0].bookmarked);
    }

    #[test]
    fn emoji_mode_drives_effective_done() {
        let mut states = ItemStates::default();
        with(&mut states, "o1", |s| {
            s.completed = true;
            s.emoji = EmojiStatus::Sad;
        });

        let checkbox = subject_view(&subject(), &states, &BTreeSet::new(), false, false);
        assert!(checkbox.topics[0].lessons[0].objectives[0].effective_done);

        let emoji = subject_view(&subject(), &states, &BTreeSet::new(), true, false);
        assert!(!emoji.topics[0].lessons[0].objectives[0].effective_done);
    }
}
