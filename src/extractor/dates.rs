//! Publication date discovery.
//!
//! Looks at the usual places news sites put a publication timestamp, in
//! order of how trustworthy they tend to be: Open Graph / article meta tags,
//! schema.org `datePublished`, JSON-LD, and finally `<time datetime>`.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use scraper::{Html, Selector};
use serde_json::Value;

const META_SELECTORS: [&str; 10] = [
    "meta[property='article:published_time']",
    "meta[property='og:published_time']",
    "meta[itemprop='datePublished']",
    "meta[name='article:published_time']",
    "meta[name='pubdate']",
    "meta[name='publishdate']",
    "meta[name='date']",
    "meta[name='dc.date.issued']",
    "meta[name='DC.date.issued']",
    "meta[name='DC.date']",
];

const NAIVE_DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y/%m/%d %H:%M:%S",
];

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%Y%m%d"];

pub fn extract_published_at(document: &Html) -> Option<DateTime<Utc>> {
    from_meta(document)
        .or_else(|| from_json_ld(document))
        .or_else(|| from_time_element(document))
}

fn from_meta(document: &Html) -> Option<DateTime<Utc>> {
    META_SELECTORS.iter().find_map(|selector_str| {
        let selector = Selector::parse(selector_str).ok()?;
        document
            .select(&selector)
            .filter_map(|element| element.value().attr("content"))
            .find_map(parse_date)
    })
}

fn from_json_ld(document: &Html) -> Option<DateTime<Utc>> {
    let selector = Selector::parse("script[type='application/ld+json']").ok()?;
    document.select(&selector).find_map(|script| {
        let raw = script.text().collect::<String>();
        let json = serde_json::from_str::<Value>(raw.trim()).ok()?;
        find_date_published(&json)
    })
}

fn find_date_published(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Array(items) => items.iter().find_map(find_date_published),
        Value::Object(map) => map
            .get("datePublished")
            .and_then(Value::as_str)
            .and_then(parse_date)
            .or_else(|| map.get("@graph").and_then(find_date_published)),
        _ => None,
    }
}

fn from_time_element(document: &Html) -> Option<DateTime<Utc>> {
    let selector = Selector::parse("time[datetime]").ok()?;
    document
        .select(&selector)
        .filter_map(|element| element.value().attr("datetime"))
        .find_map(parse_date)
}

/// Parse a timestamp in any of the formats commonly found in page metadata.
/// Values without an offset are taken as UTC; bare dates as midnight UTC.
pub fn parse_date(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(value) {
        return Some(dt.with_timezone(&Utc));
    }
    // "+0000" style offsets, which RFC 3339 does not allow
    if let Ok(dt) = DateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%z") {
        return Some(dt.with_timezone(&Utc));
    }
    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Some(dt.and_utc());
        }
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(value, format) {
            return date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
        }
    }

    None
}
