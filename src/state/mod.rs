//! The mutable half of the system: per-item overlay state, pure aggregation,
//! and the action-dispatch controller.

pub mod aggregate;
pub mod controller;
pub mod store;
pub mod types;

pub use controller::{Action, Effect, Level, Outcome};
pub use store::{ProgressTracker, WriteOutcome, BOOKMARKS_KEY};
pub use types::{Comment, EmojiStatus, ItemState, ItemStates, StateError, Tag};
