use crate::errors::ParseError;

const HEADER_SEPARATOR: &[u8] = b"\r\n\r\n";
const BARE_HEADER_SEPARATOR: &[u8] = b"\n\n";

/// An HTTP response split out of a WARC `response` record block.
#[derive(Debug)]
pub struct HttpResponse<'a> {
    pub status: u16,
    /// Full Content-Type header value, parameters included.
    pub content_type: Option<String>,
    pub body: &'a [u8],
}

impl HttpResponse<'_> {
    /// Missing Content-Type is treated as HTML.
    pub fn is_html(&self) -> bool {
        match self.content_type.as_deref() {
            None => true,
            Some(ct) => {
                let ct = ct.to_ascii_lowercase();
                ct.contains("text/html") || ct.contains("application/xhtml")
            }
        }
    }
}

pub fn parse_response(data: &[u8]) -> Result<HttpResponse<'_>, ParseError> {
    let (header_bytes, body) = split_head(data)
        .ok_or_else(|| ParseError::MalformedHttp("no header/body separator".to_string()))?;

    let head = String::from_utf8_lossy(header_bytes);
    let mut lines = head.lines();

    // "HTTP/1.1 200 OK"
    let status_line = lines.next().unwrap_or_default();
    let mut parts = status_line.split_whitespace();
    let status = match (parts.next(), parts.next()) {
        (Some(version), Some(code)) if version.starts_with("HTTP/") => code
            .parse::<u16>()
            .map_err(|_| ParseError::MalformedHttp(format!("bad status line: {}", status_line)))?,
        _ => {
            return Err(ParseError::MalformedHttp(format!(
                "bad status line: {}",
                status_line
            )));
        }
    };

    let content_type = lines.find_map(|line| {
        let (key, value) = line.split_once(':')?;
        key.trim()
            .eq_ignore_ascii_case("content-type")
            .then(|| value.trim().to_string())
    });

    Ok(HttpResponse {
        status,
        content_type,
        body,
    })
}

fn split_head(data: &[u8]) -> Option<(&[u8], &[u8])> {
    if let Some(pos) = find(data, HEADER_SEPARATOR) {
        return Some((&data[..pos], &data[pos + HEADER_SEPARATOR.len()..]));
    }
    let pos = find(data, BARE_HEADER_SEPARATOR)?;
    Some((&data[..pos], &data[pos + BARE_HEADER_SEPARATOR.len()..]))
}

fn find(data: &[u8], needle: &[u8]) -> Option<usize> {
    data.windows(needle.len()).position(|w| w == needle)
}
