// ============================================================================
// SSG Core - Post Entity
// File: crates/ssg-core/src/domain/post.rs
// ============================================================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Blog post owned by one user. `slug` is the unique key and the file name of
/// the generated page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub owner_username: String,
    pub title: String,
    pub subtitle: String,
    pub author: String,
    pub content: String,
    pub slug: String,
    pub pubdate: NaiveDate,
}

/// Editable fields of a post, as submitted by the editor form.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PostDraft {
    #[validate(length(min = 1, max = 200, message = "Title must be between 1 and 200 characters"))]
    pub title: String,

    #[validate(length(max = 300, message = "Subtitle too long"))]
    pub subtitle: String,

    #[validate(length(max = 100, message = "Author too long"))]
    pub author: String,

    pub content: String,

    pub pubdate: NaiveDate,
}

impl Post {
    pub fn from_draft(owner_username: &str, slug: String, draft: PostDraft) -> Self {
        Self {
            owner_username: owner_username.to_string(),
            title: draft.title.trim().to_string(),
            subtitle: draft.subtitle.trim().to_string(),
            author: draft.author.trim().to_string(),
            content: draft.content,
            slug,
            pubdate: draft.pubdate,
        }
    }

    pub fn is_owned_by(&self, username: &str) -> bool {
        self.owner_username == username
    }

    /// Apply an edit in place. Ownership and slug never change.
    pub fn apply(&mut self, draft: PostDraft) {
        self.title = draft.title.trim().to_string();
        self.subtitle = draft.subtitle.trim().to_string();
        self.author = draft.author.trim().to_string();
        self.content = draft.content;
        self.pubdate = draft.pubdate;
    }

    /// Content split into paragraphs on blank lines, CRLF normalised.
    pub fn paragraphs(&self) -> Vec<String> {
        self.content
            .replace("\r\n", "\n")
            .split("\n\n")
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// `"{title}-{YYYY-MM-DD}"` lowercased, with every run of characters outside
/// `[a-z0-9]` collapsed to a single `-`.
pub fn derive_slug(title: &str, pubdate: NaiveDate) -> String {
    let raw = format!("{}-{}", title, pubdate.format("%Y-%m-%d"));
    let mut slug = String::with_capacity(raw.len());
    for c in raw.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.ends_with('-') && !slug.is_empty() {
            slug.push('-');
        }
    }
    slug.trim_end_matches('-').to_string()
}

pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug.len() <= 256
        && slug.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 9).unwrap()
    }

    #[test]
    fn test_derive_slug() {
        assert_eq!(derive_slug("Hello, World!", date()), "hello-world-2024-03-09");
        assert_eq!(derive_slug("../../etc/passwd", date()), "etc-passwd-2024-03-09");
        assert!(is_valid_slug(&derive_slug("Ünïcode title", date())));
    }

    #[test]
    fn test_is_valid_slug() {
        assert!(is_valid_slug("my-post-2024-03-09"));
        assert!(!is_valid_slug(""));
        assert!(!is_valid_slug("../secret"));
        assert!(!is_valid_slug("Upper"));
    }

    #[test]
    fn test_paragraphs_split_on_blank_lines() {
        let post = Post {
            owner_username: "alice".into(),
            title: "t".into(),
            subtitle: String::new(),
            author: "a".into(),
            content: "first line\r\nstill first\r\n\r\nsecond\n\n\n\nthird".into(),
            slug: "t-2024-03-09".into(),
            pubdate: date(),
        };
        assert_eq!(
            post.paragraphs(),
            vec!["first line\nstill first".to_string(), "second".to_string(), "third".to_string()]
        );
    }
}
