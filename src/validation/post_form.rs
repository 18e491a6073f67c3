use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").unwrap());

pub const TITLE_REQUIRED: &str = "Title is required";
pub const TITLE_TOO_SHORT: &str = "Title must be at least 3 characters";
pub const TITLE_TOO_LONG: &str = "Title must be less than 100 characters";
pub const CONTENT_REQUIRED: &str = "Content is required";
pub const CONTENT_TOO_SHORT: &str = "Content must be at least 10 characters";

/// Field-level validation messages for the post editor. Each field's
/// message is independent so the form can clear one as that field is
/// edited. Purely local; never reaches the network.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostFormErrors {
    pub title: Option<&'static str>,
    pub content: Option<&'static str>,
}

impl PostFormErrors {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.content.is_none()
    }

    pub fn clear_title(&mut self) {
        self.title = None;
    }

    pub fn clear_content(&mut self) {
        self.content = None;
    }
}

impl fmt::Display for PostFormErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<&str> = self.title.into_iter().chain(self.content).collect();
        write!(f, "{}", messages.join("; "))
    }
}

impl std::error::Error for PostFormErrors {}

/// Validate a draft before submission. Content length is measured after
/// stripping markup tags, since the editor hands us HTML.
pub fn validate_post_form(title: &str, content: &str) -> Result<(), PostFormErrors> {
    let mut errors = PostFormErrors::default();

    if title.trim().is_empty() {
        errors.title = Some(TITLE_REQUIRED);
    } else if title.chars().count() < 3 {
        errors.title = Some(TITLE_TOO_SHORT);
    } else if title.chars().count() > 100 {
        errors.title = Some(TITLE_TOO_LONG);
    }

    let text_content = TAG_RE.replace_all(content, "");
    let text_content = text_content.trim();
    if text_content.is_empty() {
        errors.content = Some(CONTENT_REQUIRED);
    } else if text_content.chars().count() < 10 {
        errors.content = Some(CONTENT_TOO_SHORT);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
