use ammonia::Builder;
use regex::{Captures, Regex};
use std::sync::LazyLock;
use url::Url;

use crate::extractor::model::{ReadabilityResult, normalize_whitespace};

static HREF_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"href="([^"]+)""#).unwrap());
static SRC_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"src="([^"]+)""#).unwrap());

pub fn sanitize_and_resolve_links(result: &mut ReadabilityResult, base_url: &Url) {
    // Removes scripts, styles and other active content
    let clean_html = Builder::default().clean(&result.html).to_string();

    result.html = resolve_links(&clean_html, base_url);
    result.text = normalize_whitespace(&result.text);
}

fn resolve_links(html: &str, base_url: &Url) -> String {
    let html = resolve_attribute(&HREF_REGEX, "href", html, base_url);
    resolve_attribute(&SRC_REGEX, "src", &html, base_url)
}

fn resolve_attribute(regex: &Regex, attribute: &str, html: &str, base_url: &Url) -> String {
    regex
        .replace_all(html, |caps: &Captures| match base_url.join(&caps[1]) {
            Ok(absolute_url) => format!(r#"{}="{}""#, attribute, absolute_url),
            Err(_) => caps[0].to_string(),
        })
        .into_owned()
}
