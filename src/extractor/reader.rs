use readability::extractor;
use scraper::{Html, Selector};
use url::Url;

use crate::extractor::model::ReadabilityResult;

const CONTENT_SELECTORS: [&str; 9] = [
    "article",
    "main",
    "[role='main']",
    ".content",
    ".post",
    ".article",
    "#content",
    "#main",
    ".entry-content",
];

const MIN_FALLBACK_TEXT_LENGTH: usize = 100;

/// Pull the readable part out of a page. `document` must be the parsed form of `html`.
pub fn extract(html: &str, document: &Html, url: &Url) -> Option<ReadabilityResult> {
    if let Ok(article) = extractor::extract(&mut html.as_bytes(), url)
        && !article.text.trim().is_empty()
    {
        return Some(ReadabilityResult {
            title: article.title,
            site_name: extract_site_name(document),
            byline: None, // readability crate doesn't provide byline
            text: article.text,
            html: article.content,
        });
    }

    fallback_extract(document)
}

fn extract_site_name(document: &Html) -> Option<String> {
    let selector = Selector::parse("meta[property='og:site_name']").ok()?;
    if let Some(element) = document.select(&selector).next()
        && let Some(content) = element.value().attr("content")
    {
        return Some(content.trim().to_string());
    }

    // "Article Title - Site Name" or "Article Title | Site Name"
    let title_selector = Selector::parse("title").ok()?;
    let title = document
        .select(&title_selector)
        .next()?
        .text()
        .collect::<String>();
    for separator in [" - ", " | "] {
        if let Some(pos) = title.rfind(separator) {
            return Some(title[pos + separator.len()..].trim().to_string());
        }
    }

    None
}

fn fallback_extract(document: &Html) -> Option<ReadabilityResult> {
    let title = extract_title(document)?;
    let (text, html) = extract_main_content(document);

    if text.trim().is_empty() {
        return None;
    }

    Some(ReadabilityResult {
        title,
        site_name: extract_site_name(document),
        byline: None,
        text,
        html,
    })
}

fn extract_title(document: &Html) -> Option<String> {
    if let Ok(selector) = Selector::parse("meta[property='og:title']")
        && let Some(content) = document
            .select(&selector)
            .find_map(|element| element.value().attr("content"))
    {
        return Some(content.to_string());
    }

    ["title", "h1"].iter().find_map(|tag| {
        let selector = Selector::parse(tag).ok()?;
        document
            .select(&selector)
            .map(|element| element.text().collect::<String>().trim().to_string())
            .find(|title| !title.is_empty())
    })
}

fn extract_main_content(document: &Html) -> (String, String) {
    for selector_str in CONTENT_SELECTORS {
        if let Ok(selector) = Selector::parse(selector_str) {
            for element in document.select(&selector) {
                let text = element.text().collect::<String>();
                if text.trim().len() > MIN_FALLBACK_TEXT_LENGTH {
                    return (text, element.html());
                }
            }
        }
    }

    if let Ok(body_selector) = Selector::parse("body")
        && let Some(body) = document.select(&body_selector).next()
    {
        return (body.text().collect::<String>(), body.html());
    }

    (String::new(), String::new())
}
