use bytes::Bytes;
use warc::{BufferedBody, WarcHeader};

use crate::errors::ParseError;

const RESPONSE_TYPE: &str = "response";

/// One transaction read from a WARC container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    target_uri: String,
    payload: Bytes,
}

impl Record {
    pub fn new(target_uri: impl Into<String>, payload: impl Into<Bytes>) -> Self {
        Self {
            target_uri: target_uri.into(),
            payload: payload.into(),
        }
    }

    /// Callers check [`is_response`] first: only `response` records are
    /// guaranteed to carry a target URI.
    pub fn from_warc(record: &warc::Record<BufferedBody>) -> Result<Self, ParseError> {
        let target_uri = record
            .header(WarcHeader::TargetURI)
            .ok_or(ParseError::MissingTargetUri)?
            .into_owned();

        Ok(Self {
            target_uri,
            payload: Bytes::copy_from_slice(record.body()),
        })
    }

    pub fn target_uri(&self) -> &str {
        &self.target_uri
    }

    /// The record block: for `response` records, the raw HTTP response.
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }
}

/// Whether a raw WARC record carries an HTTP response.
pub fn is_response(record: &warc::Record<BufferedBody>) -> bool {
    record.header(WarcHeader::WarcType).as_deref() == Some(RESPONSE_TYPE)
}
