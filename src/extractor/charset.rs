use encoding_rs::Encoding;
use regex::Regex;
use std::sync::LazyLock;

use crate::errors::ParseError;

/// How far into the body to look for `<meta>` charset declarations.
const SNIFF_LIMIT: usize = 4096;

static CHARSET_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)charset\s*=\s*["']?([^"'\s;]+)"#).unwrap());

static META_CHARSET_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)<meta\s+[^>]*?charset\s*=\s*["']?([^"'\s/>]+)"#).unwrap());

static META_HTTP_EQUIV_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<meta\s+[^>]*?http-equiv\s*=\s*["']?content-type["']?[^>]*?content\s*=\s*["']?[^"'>]*?charset\s*=\s*([^"'\s;/>]+)"#).unwrap()
});

/// Resolve the body encoding: Content-Type header, then `<meta charset>`,
/// then `<meta http-equiv>`, then a chardetng guess.
pub fn detect_encoding(content_type: Option<&str>, body: &[u8]) -> &'static Encoding {
    if let Some(encoding) = content_type.and_then(|ct| label_from(&CHARSET_REGEX, ct)) {
        return encoding;
    }

    let head = &body[..body.len().min(SNIFF_LIMIT)];
    let head_str = String::from_utf8_lossy(head);

    if let Some(encoding) = label_from(&META_CHARSET_REGEX, &head_str)
        .or_else(|| label_from(&META_HTTP_EQUIV_REGEX, &head_str))
    {
        return encoding;
    }

    let mut detector = chardetng::EncodingDetector::new();
    detector.feed(head, body.len() <= SNIFF_LIMIT);
    detector.guess(None, true)
}

fn label_from(regex: &Regex, haystack: &str) -> Option<&'static Encoding> {
    let label = regex.captures(haystack)?.get(1)?.as_str().to_lowercase();
    Encoding::for_label(label.as_bytes())
}

/// Decode `body` to UTF-8. With `lossy` set, malformed sequences become
/// U+FFFD instead of failing.
pub fn decode(body: &[u8], encoding: &'static Encoding, lossy: bool) -> Result<String, ParseError> {
    let (decoded, used, had_errors) = encoding.decode(body);

    if had_errors && !lossy {
        return Err(ParseError::Charset(format!(
            "failed to decode content with encoding: {}",
            used.name()
        )));
    }

    Ok(decoded.into_owned())
}
