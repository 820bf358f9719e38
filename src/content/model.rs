use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Errors raised while loading or validating content.
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("failed to read content file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid content JSON in '{file}': {source}")]
    Parse {
        file: String,
        #[source]
        source: serde_json::Error,
    },

    /// Item ids are used as overlay map keys, so they must be unique within a
    /// subject.
    #[error("duplicate item id '{id}' in subject '{subject}'")]
    DuplicateId { subject: String, id: String },

    #[error("duplicate subject id '{0}'")]
    DuplicateSubject(String),
}

// ============================================================================
// Content Entities
// ============================================================================
//
// The content tree is authored externally and read-only at runtime. Nothing
// in the core mutates these structs; all user-visible change lives in the
// overlay (state::types::ItemState).

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subject {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub topics: Vec<Topic>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Topic {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub lessons: Vec<Lesson>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lesson {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub objectives: Vec<Objective>,
    #[serde(default)]
    pub sections: Vec<Section>,
}

/// Leaf trackable item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Objective {
    pub id: String,
    pub text: String,
}

/// A content page inside a lesson. Opaque to the state core: sections are
/// rendered by the presentation layer and never counted or mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Section {
    Text {
        title: String,
        body: String,
    },
    Image {
        title: String,
        source: String,
        #[serde(default)]
        caption: String,
    },
    Quiz {
        title: String,
        questions: Vec<QuizQuestion>,
    },
    Flashcards {
        title: String,
        cards: Vec<Flashcard>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub prompt: String,
    pub choices: Vec<String>,
    /// Index into `choices`.
    pub answer: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Flashcard {
    pub front: String,
    pub back: String,
}

// ============================================================================
// Content Index
// ============================================================================

/// Which level of the tree an id belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemLevel {
    Topic,
    Lesson,
    Objective,
}

/// Per-subject id lookup built once at load time.
///
/// Validates the uniqueness invariant (every id is an overlay map key) and
/// answers the two questions the controller asks on every action: does this
/// id exist at the expected level, and which lesson owns this objective.
#[derive(Debug, Clone)]
pub struct ContentIndex {
    levels: HashMap<String, ItemLevel>,
    lesson_of_objective: HashMap<String, String>,
    topic_of_lesson: HashMap<String, String>,
}

impl ContentIndex {
    pub fn build(subject: &Subject) -> Result<Self, ContentError> {
        let mut levels = HashMap::new();
        let mut lesson_of_objective = HashMap::new();
        let mut topic_of_lesson = HashMap::new();

        let mut insert = |id: &str, level: ItemLevel| -> Result<(), ContentError> {
            if levels.insert(id.to_owned(), level).is_some() {
                return Err(ContentError::DuplicateId {
                    subject: subject.id.clone(),
                    id: id.to_owned(),
                });
            }
            Ok(())
        };

        for topic in &subject.topics {
            insert(&topic.id, ItemLevel::Topic)?;
            for lesson in &topic.lessons {
                insert(&lesson.id, ItemLevel::Lesson)?;
                topic_of_lesson.insert(lesson.id.clone(), topic.id.clone());
                for objective in &lesson.objectives {
                    insert(&objective.id, ItemLevel::Objective)?;
                    lesson_of_objective.insert(objective.id.clone(), lesson.id.clone());
                }
            }
        }

        Ok(Self {
            levels,
            lesson_of_objective,
            topic_of_lesson,
        })
    }

    pub fn level_of(&self, id: &str) -> Option<ItemLevel> {
        self.levels.get(id).copied()
    }

    /// The lesson that owns an objective.
    pub fn lesson_of_objective(&self, objective_id: &str) -> Option<&str> {
        self.lesson_of_objective.get(objective_id).map(String::as_str)
    }

    /// The topic that owns a lesson.
    pub fn topic_of_lesson(&self, lesson_id: &str) -> Option<&str> {
        self.topic_of_lesson.get(lesson_id).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subject() -> Subject {
        serde_json::from_value(serde_json::json!({
            "id": "algebra",
            "title": "Algebra",
            "topics": [{
                "id": "t1",
                "title": "Linear equations",
                "lessons": [{
                    "id": "l1",
                    "title": "Slope",
                    "objectives": [
                        {"id": "o1", "text": "Define slope"},
                        {"id": "o2", "text": "Compute slope from two points"}
                    ],
                    "sections": [
                        {"kind": "text", "title": "Intro", "body": "..."},
                        {"kind": "quiz", "title": "Check", "questions": [
                            {"prompt": "2+2?", "choices": ["3", "4"], "answer": 1}
                        ]}
                    ]
                }]
            }]
        }))
        .unwrap()
    }

    #[test]
    fn index_resolves_levels_and_owners() {
        let index = ContentIndex::build(&subject()).unwrap();
        assert_eq!(index.level_of("t1"), Some(ItemLevel::Topic));
        assert_eq!(index.level_of("l1"), Some(ItemLevel::Lesson));
        assert_eq!(index.level_of("o2"), Some(ItemLevel::Objective));
        assert_eq!(index.level_of("nope"), None);
        assert_eq!(index.lesson_of_objective("o1"), Some("l1"));
        assert_eq!(index.topic_of_lesson("l1"), Some("t1"));
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let mut s = subject();
        s.topics[0].lessons[0].objectives[1].id = "o1".into();
        let err = ContentIndex::build(&s).unwrap_err();
        assert!(matches!(err, ContentError::DuplicateId { ref id, .. } if id == "o1"));
    }

    #[test]
    fn duplicate_across_levels_is_rejected() {
        let mut s = subject();
        s.topics[0].lessons[0].id = "t1".into();
        assert!(ContentIndex::build(&s).is_err());
    }

    #[test]
    fn sections_parse_as_tagged_enum() {
        let s = subject();
        let sections = &s.topics[0].lessons[0].sections;
        assert!(matches!(sections[0], Section::Text { .. }));
        assert!(matches!(sections[1], Section::Quiz { .. }));
    }
}
