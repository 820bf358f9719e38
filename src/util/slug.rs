//! Discussion-thread slugs for cross-linking objectives.
//!
//! The navigation layer links each objective to an external discussion
//! thread. All it needs from us is a deterministic, readable reference.

/// Build the discussion-thread slug for an objective.
///
/// The slug is the GitHub-style slug of the objective text with the item id
/// appended. Determinism comes from using a fresh slugger per call (no
/// cross-call dedup counters), and distinct ids always produce distinct
/// slugs regardless of text.
pub fn thread_slug(id: &str, text: &str) -> String {
    let mut slugger = github_slugger::Slugger::default();
    let base = slugger.slug(text);
    if base.is_empty() {
        format!("objective-{}", id)
    } else {
        format!("{}-{}", base, id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_is_deterministic() {
        let a = thread_slug("o1", "Explain the chain rule");
        let b = thread_slug("o1", "Explain the chain rule");
        assert_eq!(a, b);
        assert_eq!(a, "explain-the-chain-rule-o1");
    }

    #[test]
    fn distinct_ids_never_collide() {
        let a = thread_slug("o1", "Same text");
        let b = thread_slug("o2", "Same text");
        assert_ne!(a, b);
    }

    #[test]
    fn punctuation_and_case_are_normalized() {
        let slug = thread_slug("o9", "What is Big-O notation?");
        assert!(slug.ends_with("-o9"));
        assert_eq!(slug, slug.to_lowercase());
        assert!(!slug.contains(' '));
        assert!(!slug.contains('?'));
    }

    #[test]
    fn empty_text_falls_back_to_id() {
        assert_eq!(thread_slug("o3", ""), "objective-o3");
        assert_eq!(thread_slug("o3", "???"), "objective-o3");
    }
}
