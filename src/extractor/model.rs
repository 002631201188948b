use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use url::Url;

static SPACE_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[ \t]+").unwrap());
static NEWLINE_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n\s*\n+").unwrap());

/// Structured decoding of a record's payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub url: Url,
    pub title: String,
    pub site_name: Option<String>,
    pub byline: Option<String>,
    pub language: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub text: String,
    pub html: String,
}

impl Article {
    /// An article with only a url and a title; everything else empty.
    pub fn new(url: Url, title: impl Into<String>) -> Self {
        Self {
            url,
            title: title.into(),
            site_name: None,
            byline: None,
            language: None,
            published_at: None,
            text: String::new(),
            html: String::new(),
        }
    }

    pub fn published_at(&self) -> Option<DateTime<Utc>> {
        self.published_at
    }

    /// Detected language. An empty value counts as undetected.
    pub fn language(&self) -> Option<&str> {
        self.language.as_deref().filter(|l| !l.trim().is_empty())
    }
}

#[derive(Debug)]
pub struct ReadabilityResult {
    pub title: String,
    pub site_name: Option<String>,
    pub byline: Option<String>,
    pub text: String,
    pub html: String,
}

pub fn normalize_whitespace(text: &str) -> String {
    let text = text.trim();

    // Collapse runs of spaces/tabs, then runs of blank lines
    let spaced = SPACE_REGEX.replace_all(text, " ");
    NEWLINE_REGEX.replace_all(&spaced, "\n\n").to_string()
}
