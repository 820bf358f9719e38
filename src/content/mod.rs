//! Read-only content tree: subjects, topics, lessons, objectives, sections.
//!
//! Content is authored externally and loaded once per session; the state core
//! never creates, deletes, or mutates content entities. Everything the user
//! changes lives in the overlay (`state` module), keyed by the ids defined
//! here.

mod loader;
mod model;

pub use loader::ContentLibrary;
pub use model::{
    ContentError, ContentIndex, Flashcard, ItemLevel, Lesson, Objective, QuizQuestion, Section,
    Subject, Topic,
};
