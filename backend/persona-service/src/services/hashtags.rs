//! Hashtag extraction and normalization.
//!
//! Tags are stored lowercase without the leading `#`, deduplicated, in order
//! of first appearance.

use once_cell::sync::Lazy;
use regex::Regex;

// Hardcoded pattern; a failure here is a source bug, not a runtime condition
static HASHTAG_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"#([A-Za-z0-9_]+)").expect("hardcoded hashtag regex is invalid")
});

fn push_unique(tags: &mut Vec<String>, tag: String) {
    if !tag.is_empty() && !tags.contains(&tag) {
        tags.push(tag);
    }
}

/// Tags written inline in a caption, e.g. `"hello #Foo #foo"` yields `["foo"]`
pub fn extract_hashtags(caption: &str) -> Vec<String> {
    let mut tags = Vec::new();
    for cap in HASHTAG_PATTERN.captures_iter(caption) {
        if let Some(m) = cap.get(1) {
            push_unique(&mut tags, m.as_str().to_lowercase());
        }
    }
    tags
}

/// Normalize client-supplied tags
///
/// Each entry may itself be a comma separated list; entries are trimmed,
/// stripped of leading `#` and lowercased.
pub fn normalize_tags<I, S>(raw: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut tags = Vec::new();
    for entry in raw {
        for piece in entry.as_ref().split(',') {
            let tag = piece.trim().trim_start_matches('#').trim().to_lowercase();
            push_unique(&mut tags, tag);
        }
    }
    tags
}

/// Explicit tags followed by caption tags, without duplicates
pub fn merge_hashtags(explicit: &[String], caption: &str) -> Vec<String> {
    let mut tags = normalize_tags(explicit);
    for tag in extract_hashtags(caption) {
        push_unique(&mut tags, tag);
    }
    tags
}

/// Profile interests: trimmed, lowercased, deduplicated
pub fn normalize_interests<I, S>(raw: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut interests = Vec::new();
    for entry in raw {
        push_unique(&mut interests, entry.as_ref().trim().to_lowercase());
    }
    interests
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_caption_tags_lowercased_and_deduped() {
        assert_eq!(extract_hashtags("hello #Foo #foo"), vec!["foo"]);
        assert_eq!(
            extract_hashtags("#Rust and #rust_lang at #2024!"),
            vec!["rust", "rust_lang", "2024"]
        );
        assert!(extract_hashtags("no tags # here").is_empty());
    }

    #[test]
    fn test_normalize_tags_splits_commas() {
        let raw = vec!["Travel, #Food".to_string(), " food ".to_string(), "".to_string()];
        assert_eq!(normalize_tags(raw), vec!["travel", "food"]);
    }

    #[test]
    fn test_merge_keeps_explicit_first() {
        let explicit = vec!["Beach".to_string()];
        assert_eq!(
            merge_hashtags(&explicit, "sunset #beach #Summer"),
            vec!["beach", "summer"]
        );
    }

    #[test]
    fn test_interests_normalized() {
        assert_eq!(
            normalize_interests(vec![" Rust ", "rust", "Hiking", "  "]),
            vec!["rust", "hiking"]
        );
    }
}
