use chrono::{TimeZone, Utc};

use crate::config::ParserConfig;
use crate::errors::ParseError;
use crate::extractor::{ArticleParser, HtmlArticleParser};
use crate::record::Record;

const BODY_SENTENCE: &str =
    "This is a valid article with enough content to pass the minimum requirements for extraction. ";

#[test]
fn test_parse_article_record() {
    let html = format!(
        r#"<!DOCTYPE html><html lang="en"><head><title>Valid Article - News Site</title>
        <meta property="article:published_time" content="2020-06-15T08:30:00Z"></head>
        <body><article><h1>Valid Article</h1><p>{}</p><a href="/related">Related</a></article></body></html>"#,
        BODY_SENTENCE.repeat(20)
    );
    let record = http_record("https://example.com/news/valid", "text/html; charset=utf-8", &html);

    let article = HtmlArticleParser::default().parse(&record).unwrap();

    assert!(article.title.contains("Valid Article"));
    assert_eq!(article.site_name, Some("News Site".to_string()));
    assert_eq!(article.language(), Some("en"));
    assert_eq!(
        article.published_at(),
        Some(Utc.with_ymd_and_hms(2020, 6, 15, 8, 30, 0).unwrap())
    );
    assert!(article.text.contains("valid article"));
    assert!(!article.html.contains("<script"));
    assert_eq!(article.url.as_str(), "https://example.com/news/valid");
}

#[test]
fn test_language_detected_from_text_when_undeclared() {
    let html = format!(
        r#"<html><head><title>Undated</title></head><body><article><p>{}</p></article></body></html>"#,
        BODY_SENTENCE.repeat(20)
    );
    let record = http_record("https://example.com/undated", "text/html", &html);

    let article = HtmlArticleParser::default().parse(&record).unwrap();

    assert_eq!(article.language(), Some("en"));
    assert_eq!(article.published_at(), None);
}

#[test]
fn test_non_html_is_unsupported() {
    let record = http_record("https://example.com/doc.pdf", "application/pdf", "%PDF-1.4");
    let result = HtmlArticleParser::default().parse(&record);
    assert!(matches!(result, Err(ParseError::UnsupportedContentType(ct)) if ct == "application/pdf"));
}

#[test]
fn test_invalid_target_uri() {
    let record = http_record("not a uri", "text/html", "<html></html>");
    let result = HtmlArticleParser::default().parse(&record);
    assert!(matches!(result, Err(ParseError::InvalidUrl(_))));
}

#[test]
fn test_payload_without_http_head() {
    let record = Record::new("https://example.com/raw", "<html><body>raw</body></html>");
    let result = HtmlArticleParser::default().parse(&record);
    assert!(matches!(result, Err(ParseError::MalformedHttp(_))));
}

#[test]
fn test_empty_page_has_no_content() {
    let record = http_record("https://example.com/empty", "text/html", "<html><body></body></html>");
    let result = HtmlArticleParser::default().parse(&record);
    assert!(matches!(result, Err(ParseError::NoContent)));
}

#[test]
fn test_unicode_errors_respect_config() {
    let mut payload =
        b"HTTP/1.1 200 OK\r\nContent-Type: text/html; charset=utf-8\r\n\r\n<html><head><title>Broken</title></head><body><article><p>"
            .to_vec();
    payload.extend_from_slice(BODY_SENTENCE.repeat(10).as_bytes());
    payload.extend_from_slice(b"\xff\xfe</p></article></body></html>");
    let record = Record::new("https://example.com/broken", payload);

    let strict = HtmlArticleParser::default().parse(&record);
    assert!(matches!(strict, Err(ParseError::Charset(_))));

    let lenient = HtmlArticleParser::new(ParserConfig::new(true))
        .parse(&record)
        .unwrap();
    assert!(lenient.text.contains("valid article"));
}

fn http_record(uri: &str, content_type: &str, body: &str) -> Record {
    let payload = format!(
        "HTTP/1.1 200 OK\r\nContent-Type: {}\r\nContent-Length: {}\r\n\r\n{}",
        content_type,
        body.len(),
        body
    );
    Record::new(uri, payload)
}
