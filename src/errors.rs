use thiserror::Error;

/// Failure to turn a record's payload into an [`Article`](crate::extractor::Article).
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("record has no WARC-Target-URI header")]
    MissingTargetUri,

    #[error("invalid target uri: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("malformed http response: {0}")]
    MalformedHttp(String),

    #[error("unsupported content-type: {0}")]
    UnsupportedContentType(String),

    #[error("charset error: {0}")]
    Charset(String),

    #[error("no readable content")]
    NoContent,
}

/// Errors that end or interrupt an archive run.
#[derive(Error, Debug)]
pub enum RunError {
    #[error("failed to parse record {uri}: {source}")]
    Parse {
        uri: String,
        #[source]
        source: ParseError,
    },

    #[error("archive read error: {0}")]
    Archive(String),
}

impl RunError {
    pub fn parse(uri: impl Into<String>, source: ParseError) -> Self {
        Self::Parse {
            uri: uri.into(),
            source,
        }
    }
}
