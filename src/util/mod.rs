//! Text hygiene for user-entered input.
//!
//! Comments, tag labels, and objective edits are typed by the user and later
//! rendered in a terminal, so control characters and ANSI escape sequences
//! are stripped before the text enters the overlay.

mod text;

pub mod slug;

pub use text::{clean_user_text, strip_control_chars};

/// Maximum accepted length for a single comment, in characters.
pub const MAX_COMMENT_LENGTH: usize = 2_000;
