//! lectern — a study tracker core for hierarchical checklists.
//!
//! The library is split along the data flow:
//!
//! - [`content`]: the read-only tree (Subject → Topic → Lesson → Objective)
//!   supplied by a content directory, never mutated at runtime.
//! - [`state`]: the per-user overlay (completion, emoji reactions,
//!   hidden/collapsed flags, tags, comments), pure aggregation over it, and
//!   the action-dispatch controller.
//! - [`storage`]: the key-value persistence port with in-memory and SQLite
//!   adapters.
//! - [`view`]: render-ready view models a presentation layer binds to.
//! - [`session`]: the façade tying one subject, one overlay, and the session
//!   flags together behind `dispatch`/`subject_view`.

pub mod config;
pub mod content;
pub mod preferences;
pub mod session;
pub mod state;
pub mod storage;
pub mod util;
pub mod view;

pub use config::Config;
pub use content::ContentLibrary;
pub use preferences::PreferenceManager;
pub use session::Session;
pub use state::{Action, Effect, EmojiStatus, Level, Outcome, StateError, Tag};
pub use storage::{Database, MemoryStore, ProgressStore};
