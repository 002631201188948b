pub mod charset;
pub mod cleaner;
pub mod dates;
pub mod http;
pub mod language;
pub mod model;
pub mod reader;

#[cfg(test)]
mod tests;

pub use model::Article;

use scraper::Html;
use tracing::{debug, instrument};
use url::Url;

use crate::config::ParserConfig;
use crate::errors::ParseError;
use crate::record::Record;

/// Turns a raw record into an [`Article`].
#[cfg_attr(test, mockall::automock)]
pub trait ArticleParser {
    fn parse(&self, record: &Record) -> Result<Article, ParseError>;
}

impl<P: ArticleParser + ?Sized> ArticleParser for &P {
    fn parse(&self, record: &Record) -> Result<Article, ParseError> {
        (**self).parse(record)
    }
}

/// Parses HTML pages out of WARC `response` records.
#[derive(Debug, Clone, Default)]
pub struct HtmlArticleParser {
    config: ParserConfig,
}

impl HtmlArticleParser {
    pub fn new(config: ParserConfig) -> Self {
        Self { config }
    }
}

impl ArticleParser for HtmlArticleParser {
    #[instrument(level = "debug", skip_all, fields(uri = %record.target_uri()))]
    fn parse(&self, record: &Record) -> Result<Article, ParseError> {
        let url = Url::parse(record.target_uri())?;

        // 1. Split the HTTP response and check it is a page
        let response = http::parse_response(record.payload())?;
        if !response.is_html() {
            return Err(ParseError::UnsupportedContentType(
                response.content_type.unwrap_or_default(),
            ));
        }
        debug!(status = response.status, "parsing html response");

        // 2. Decode the body
        let encoding = charset::detect_encoding(response.content_type.as_deref(), response.body);
        let html = charset::decode(
            response.body,
            encoding,
            self.config.ignore_unicode_errors(),
        )?;
        let document = Html::parse_document(&html);

        // 3. Extract readable content, then clean it
        let mut result = reader::extract(&html, &document, &url).ok_or(ParseError::NoContent)?;
        cleaner::sanitize_and_resolve_links(&mut result, &url);

        // 4. Signals used by the record filter
        let language = language::declared_language(&document)
            .or_else(|| language::detect_language(&result.text));
        let published_at = dates::extract_published_at(&document);

        Ok(Article {
            url,
            title: result.title,
            site_name: result.site_name,
            byline: result.byline,
            language,
            published_at,
            text: result.text,
            html: result.html,
        })
    }
}
