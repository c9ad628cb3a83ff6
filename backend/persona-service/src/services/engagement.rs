//! Like and comment state transitions on a post.
//!
//! Pure functions over the post's arrays; the caller loads the post, applies
//! the transition and writes the whole post back (last write wins).

use crate::error::{AppError, Result};
use crate::models::Comment;
use chrono::Utc;
use uuid::Uuid;

pub const MAX_COMMENT_CHARS: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LikeOutcome {
    Liked,
    Unliked,
}

/// Remove `profile_id` from `likes` if present, append it otherwise
pub fn toggle_like(likes: &mut Vec<Uuid>, profile_id: Uuid) -> LikeOutcome {
    let before = likes.len();
    likes.retain(|id| *id != profile_id);
    if likes.len() != before {
        LikeOutcome::Unliked
    } else {
        likes.push(profile_id);
        LikeOutcome::Liked
    }
}

/// Trimmed comment text, 1 to 1000 characters
pub fn comment_text(raw: &str) -> Result<String> {
    let text = raw.trim();
    if text.is_empty() {
        return Err(AppError::BadRequest(
            "Please provide text and profile ID".to_string(),
        ));
    }
    if text.chars().count() > MAX_COMMENT_CHARS {
        return Err(AppError::ValidationError(
            "Comment cannot be more than 1000 characters".to_string(),
        ));
    }
    Ok(text.to_string())
}

/// Prepend a new comment; returns its id
pub fn add_comment(comments: &mut Vec<Comment>, profile_id: Uuid, text: String) -> Uuid {
    let comment = Comment {
        id: Uuid::new_v4(),
        profile_id,
        text,
        created_at: Utc::now(),
    };
    let id = comment.id;
    comments.insert(0, comment);
    id
}

pub fn find_comment(comments: &[Comment], comment_id: Uuid) -> Option<&Comment> {
    comments.iter().find(|c| c.id == comment_id)
}

pub fn remove_comment(comments: &mut Vec<Comment>, comment_id: Uuid) -> Option<Comment> {
    let index = comments.iter().position(|c| c.id == comment_id)?;
    Some(comments.remove(index))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_like_is_involution() {
        let profile = Uuid::new_v4();
        let other = Uuid::new_v4();
        let mut likes = vec![other];

        assert_eq!(toggle_like(&mut likes, profile), LikeOutcome::Liked);
        assert_eq!(likes, vec![other, profile]);

        assert_eq!(toggle_like(&mut likes, profile), LikeOutcome::Unliked);
        assert_eq!(likes, vec![other]);
    }

    #[test]
    fn test_toggle_like_collapses_duplicates() {
        let profile = Uuid::new_v4();
        let mut likes = vec![profile, profile];

        assert_eq!(toggle_like(&mut likes, profile), LikeOutcome::Unliked);
        assert!(likes.is_empty());
    }

    #[test]
    fn test_comments_newest_first() {
        let author = Uuid::new_v4();
        let mut comments = Vec::new();
        let first = add_comment(&mut comments, author, "first".into());
        let second = add_comment(&mut comments, author, "second".into());

        assert_eq!(comments[0].id, second);
        assert_eq!(comments[1].id, first);
        assert!(find_comment(&comments, first).is_some());

        let removed = remove_comment(&mut comments, first).unwrap();
        assert_eq!(removed.text, "first");
        assert_eq!(comments.len(), 1);
        assert!(remove_comment(&mut comments, first).is_none());
    }

    #[test]
    fn test_comment_text_bounds() {
        assert_eq!(comment_text("  hi  ").unwrap(), "hi");
        assert!(comment_text("   ").is_err());
        assert!(comment_text(&"x".repeat(1000)).is_ok());
        assert!(comment_text(&"x".repeat(1001)).is_err());
    }
}
