//! Record acceptance filter.
//!
//! A record goes through up to three stages, each of which can reject it:
//!
//! 1. host: target URI against the host allow-list, no parsing needed
//! 2. date: publication date against the configured bounds
//! 3. language: detected language against the allowed codes
//!
//! The date and language stages need an [`Article`]. It is parsed the first
//! time one of them runs, reused by the other, and handed back to the caller
//! in the [`FilterResult`] either way.

pub mod date;
pub mod host;
pub mod language;

use std::fmt;
use tracing::debug;

use crate::config::FilterConfig;
use crate::errors::ParseError;
use crate::extractor::{Article, ArticleParser};
use crate::record::Record;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Host,
    Date,
    Language,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Host => "host",
            Stage::Date => "date",
            Stage::Language => "language",
        };
        f.write_str(name)
    }
}

/// Outcome of [`RecordFilter::evaluate`].
#[derive(Debug, Clone, PartialEq)]
pub struct FilterResult {
    pub accepted: bool,
    /// Stage that rejected the record, `None` when accepted.
    pub rejected_at: Option<Stage>,
    /// Present if the caller supplied one or a stage had to parse.
    pub article: Option<Article>,
}

impl FilterResult {
    fn accept(article: Option<Article>) -> Self {
        Self {
            accepted: true,
            rejected_at: None,
            article,
        }
    }

    fn reject(stage: Stage, article: Option<Article>) -> Self {
        Self {
            accepted: false,
            rejected_at: Some(stage),
            article,
        }
    }

    pub fn into_parts(self) -> (bool, Option<Article>) {
        (self.accepted, self.article)
    }
}

/// Applies a fixed [`FilterConfig`] to records, parsing through `P` on demand.
///
/// Holds no mutable state: a single filter can be shared between threads
/// whenever `P` is `Sync`.
#[derive(Debug, Clone)]
pub struct RecordFilter<P> {
    config: FilterConfig,
    parser: P,
}

impl<P: ArticleParser> RecordFilter<P> {
    pub fn new(config: FilterConfig, parser: P) -> Self {
        Self { config, parser }
    }

    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    /// Parse a record with the filter's parser, e.g. for an accepted record
    /// that no stage needed to parse.
    pub fn parse(&self, record: &Record) -> Result<Article, ParseError> {
        self.parser.parse(record)
    }

    /// Decide whether `record` should go on to extraction.
    ///
    /// `article`, when given, must be the decoding of `record`; it is used
    /// as-is and the parser is not called. Otherwise the parser runs at most
    /// once, and only if the date or language stage is configured and the
    /// host stage passed. Parse failures are returned unchanged.
    pub fn evaluate(
        &self,
        record: &Record,
        article: Option<Article>,
    ) -> Result<FilterResult, ParseError> {
        if !host::passes(&self.config, record.target_uri()) {
            debug!(uri = record.target_uri(), stage = %Stage::Host, "record rejected");
            return Ok(FilterResult::reject(Stage::Host, article));
        }

        let mut article = article;

        if self.config.has_date_bounds() {
            let parsed = self.materialize(record, article)?;
            let passed = date::passes(&self.config, parsed.published_at());
            if !passed {
                debug!(
                    uri = record.target_uri(),
                    stage = %Stage::Date,
                    published_at = ?parsed.published_at(),
                    "record rejected"
                );
                return Ok(FilterResult::reject(Stage::Date, Some(parsed)));
            }
            article = Some(parsed);
        }

        if !self.config.languages().is_empty() {
            let parsed = self.materialize(record, article)?;
            let passed = language::passes(&self.config, parsed.language());
            if !passed {
                debug!(
                    uri = record.target_uri(),
                    stage = %Stage::Language,
                    language = ?parsed.language(),
                    "record rejected"
                );
                return Ok(FilterResult::reject(Stage::Language, Some(parsed)));
            }
            article = Some(parsed);
        }

        Ok(FilterResult::accept(article))
    }

    fn materialize(
        &self,
        record: &Record,
        article: Option<Article>,
    ) -> Result<Article, ParseError> {
        match article {
            Some(article) => Ok(article),
            None => self.parser.parse(record),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::MockArticleParser;
    use chrono::{DateTime, TimeZone, Utc};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use url::Url;

    const URI: &str = "http://example.com/a";

    fn day(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    fn article(published_at: Option<DateTime<Utc>>, language: Option<&str>) -> Article {
        let mut article = Article::new(Url::parse(URI).unwrap(), "Title");
        article.published_at = published_at;
        article.language = language.map(str::to_string);
        article
    }

    fn record() -> Record {
        Record::new(URI, "HTTP/1.1 200 OK\r\n\r\n<html></html>")
    }

    /// A parser expected to run exactly `times` times, returning `article`.
    fn parser_returning(article: Article, times: usize) -> MockArticleParser {
        let mut parser = MockArticleParser::new();
        parser
            .expect_parse()
            .times(times)
            .returning(move |_| Ok(article.clone()));
        parser
    }

    fn never_parses() -> MockArticleParser {
        let mut parser = MockArticleParser::new();
        parser.expect_parse().never();
        parser
    }

    #[test]
    fn test_empty_config_accepts_without_parsing() {
        let filter = RecordFilter::new(FilterConfig::default(), never_parses());
        let result = filter.evaluate(&record(), None).unwrap();
        assert_eq!(result.into_parts(), (true, None));
    }

    #[test]
    fn test_host_only_accepts_without_parsing() {
        let config = FilterConfig::builder()
            .valid_hosts(["example.com"])
            .build()
            .unwrap();
        let filter = RecordFilter::new(config, never_parses());

        let result = filter.evaluate(&record(), None).unwrap();
        assert!(result.accepted);
        assert!(result.article.is_none());

        // A supplied article is passed straight back
        let given = article(None, Some("en"));
        let result = filter.evaluate(&record(), Some(given.clone())).unwrap();
        assert_eq!(result.into_parts(), (true, Some(given)));
    }

    #[test]
    fn test_host_rejection_skips_later_stages() {
        let config = FilterConfig::builder()
            .valid_hosts(["other.org"])
            .start_date(day(2020, 1, 1))
            .languages(["en"])
            .build()
            .unwrap();
        let filter = RecordFilter::new(config, never_parses());

        let result = filter.evaluate(&record(), None).unwrap();
        assert!(!result.accepted);
        assert_eq!(result.rejected_at, Some(Stage::Host));
        assert!(result.article.is_none());

        let given = article(Some(day(2020, 5, 5)), Some("en"));
        let result = filter.evaluate(&record(), Some(given.clone())).unwrap();
        assert_eq!(result.rejected_at, Some(Stage::Host));
        assert_eq!(result.article, Some(given));
    }

    #[test]
    fn test_date_after_end_is_rejected_with_article() {
        let config = FilterConfig::builder()
            .start_date(day(2020, 1, 1))
            .end_date(day(2020, 12, 31))
            .strict_date(true)
            .build()
            .unwrap();
        let parsed = article(Some(day(2021, 1, 1)), None);
        let filter = RecordFilter::new(config, parser_returning(parsed.clone(), 1));

        let result = filter.evaluate(&record(), None).unwrap();
        assert!(!result.accepted);
        assert_eq!(result.rejected_at, Some(Stage::Date));
        assert_eq!(result.article, Some(parsed));
    }

    #[test]
    fn test_missing_date_lenient_passes_date_stage() {
        let config = FilterConfig::builder()
            .start_date(day(2020, 1, 1))
            .strict_date(false)
            .build()
            .unwrap();
        let parsed = article(None, None);
        let filter = RecordFilter::new(config, parser_returning(parsed.clone(), 1));

        let result = filter.evaluate(&record(), None).unwrap();
        assert_eq!(result.into_parts(), (true, Some(parsed)));
    }

    #[test]
    fn test_missing_date_strict_is_rejected() {
        let config = FilterConfig::builder()
            .end_date(day(2020, 1, 1))
            .strict_date(true)
            .build()
            .unwrap();
        let filter = RecordFilter::new(config, parser_returning(article(None, None), 1));

        let result = filter.evaluate(&record(), None).unwrap();
        assert_eq!(result.rejected_at, Some(Stage::Date));
        assert!(result.article.is_some());
    }

    #[test]
    fn test_language_mismatch_is_rejected() {
        let config = FilterConfig::builder()
            .languages(["en"])
            .strict_language(true)
            .build()
            .unwrap();
        let parsed = article(None, Some("fr"));
        let filter = RecordFilter::new(config, parser_returning(parsed.clone(), 1));

        let result = filter.evaluate(&record(), None).unwrap();
        assert!(!result.accepted);
        assert_eq!(result.rejected_at, Some(Stage::Language));
        assert_eq!(result.article, Some(parsed));
    }

    #[test]
    fn test_missing_language_strict_is_rejected() {
        let config = FilterConfig::builder()
            .languages(["en"])
            .strict_language(true)
            .build()
            .unwrap();
        let filter = RecordFilter::new(config, parser_returning(article(None, None), 1));

        let result = filter.evaluate(&record(), None).unwrap();
        assert_eq!(result.rejected_at, Some(Stage::Language));
        assert!(result.article.is_some());
    }

    #[test]
    fn test_missing_language_lenient_is_accepted() {
        let config = FilterConfig::builder()
            .languages(["en"])
            .strict_language(false)
            .build()
            .unwrap();
        let filter = RecordFilter::new(config, parser_returning(article(None, None), 1));

        assert!(filter.evaluate(&record(), None).unwrap().accepted);
    }

    #[test]
    fn test_date_and_language_share_one_parse() {
        let config = FilterConfig::builder()
            .valid_hosts(["example.com"])
            .start_date(day(2020, 1, 1))
            .end_date(day(2020, 12, 31))
            .languages(["en"])
            .build()
            .unwrap();
        let parsed = article(Some(day(2020, 7, 1)), Some("en"));
        let filter = RecordFilter::new(config, parser_returning(parsed.clone(), 1));

        let result = filter.evaluate(&record(), None).unwrap();
        assert_eq!(result.into_parts(), (true, Some(parsed)));
    }

    #[test]
    fn test_supplied_article_is_not_reparsed() {
        let config = FilterConfig::builder()
            .start_date(day(2020, 1, 1))
            .languages(["de"])
            .build()
            .unwrap();
        let filter = RecordFilter::new(config, never_parses());

        let given = article(Some(day(2020, 2, 2)), Some("de"));
        let result = filter.evaluate(&record(), Some(given.clone())).unwrap();
        assert_eq!(result.into_parts(), (true, Some(given)));
    }

    #[test]
    fn test_parse_error_propagates() {
        let config = FilterConfig::builder().languages(["en"]).build().unwrap();
        let mut parser = MockArticleParser::new();
        parser
            .expect_parse()
            .times(1)
            .returning(|_| Err(ParseError::NoContent));
        let filter = RecordFilter::new(config, parser);

        let result = filter.evaluate(&record(), None);
        assert!(matches!(result, Err(ParseError::NoContent)));
    }

    #[test]
    fn test_evaluate_is_idempotent() {
        let config = FilterConfig::builder()
            .end_date(day(2020, 1, 1))
            .languages(["en"])
            .build()
            .unwrap();
        let parsed = article(Some(day(2019, 1, 1)), Some("en-us"));
        let filter = RecordFilter::new(config, parser_returning(parsed, 2));

        let first = filter.evaluate(&record(), None).unwrap();
        let second = filter.evaluate(&record(), None).unwrap();
        assert_eq!(first, second);
        assert!(first.accepted);
    }

    struct CountingParser {
        article: Article,
        calls: AtomicUsize,
    }

    impl ArticleParser for CountingParser {
        fn parse(&self, _record: &Record) -> Result<Article, ParseError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.article.clone())
        }
    }

    #[test]
    fn test_shared_between_threads() {
        let config = FilterConfig::builder()
            .start_date(day(2020, 1, 1))
            .languages(["en"])
            .build()
            .unwrap();
        let parser = CountingParser {
            article: article(Some(day(2020, 3, 3)), Some("en")),
            calls: AtomicUsize::new(0),
        };
        let filter = Arc::new(RecordFilter::new(config, parser));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let filter = Arc::clone(&filter);
                std::thread::spawn(move || {
                    (0..25)
                        .map(|_| filter.evaluate(&record(), None).unwrap().accepted)
                        .all(|accepted| accepted)
                })
            })
            .collect();

        for handle in handles {
            assert!(handle.join().unwrap());
        }
        assert_eq!(filter.parser.calls.load(Ordering::SeqCst), 100);
    }

    #[cfg(feature = "fuzz")]
    mod fuzz {
        use super::*;
        use chrono::Duration;
        use proptest::prelude::*;

        fn accept_all_parser(article: Article) -> CountingParser {
            CountingParser {
                article,
                calls: AtomicUsize::new(0),
            }
        }

        proptest! {
            #[test]
            fn test_empty_host_list_never_rejects_on_host(uri in ".*") {
                let filter = RecordFilter::new(
                    FilterConfig::default(),
                    accept_all_parser(article(None, None)),
                );
                let result = filter.evaluate(&Record::new(uri, ""), None).unwrap();
                prop_assert!(result.rejected_at != Some(Stage::Host));
            }

            #[test]
            fn test_date_stage_matches_bounds(
                offset in -1000i64..1000,
                start in proptest::option::of(-500i64..500),
                end in proptest::option::of(-500i64..500),
            ) {
                let base = day(2020, 1, 1);
                let (start, end) = match (start, end) {
                    (Some(s), Some(e)) if e < s => (Some(e), Some(s)),
                    other => other,
                };
                let mut builder = FilterConfig::builder();
                if let Some(s) = start {
                    builder = builder.start_date(base + Duration::days(s));
                }
                if let Some(e) = end {
                    builder = builder.end_date(base + Duration::days(e));
                }
                let published = base + Duration::days(offset);
                let filter = RecordFilter::new(
                    builder.build().unwrap(),
                    accept_all_parser(article(Some(published), None)),
                );

                let expected = start.is_none_or(|s| offset >= s) && end.is_none_or(|e| offset <= e);
                let result = filter.evaluate(&record(), None).unwrap();
                prop_assert_eq!(result.accepted, expected);
                prop_assert!(filter.parser.calls.load(Ordering::SeqCst) <= 1);
            }

            #[test]
            fn test_language_stage_is_substring_any(
                detected in "[a-z]{0,5}",
                allowed in proptest::collection::vec("[a-z]{1,3}", 1..4),
            ) {
                let expected = allowed.iter().any(|a| detected.contains(a.as_str()));
                let config = FilterConfig::builder()
                    .languages(allowed)
                    .strict_language(true)
                    .build()
                    .unwrap();
                let filter = RecordFilter::new(
                    config,
                    accept_all_parser(article(None, Some(detected.as_str()))),
                );

                let result = filter.evaluate(&record(), None).unwrap();
                // an empty detection counts as missing, which strict mode rejects
                prop_assert_eq!(result.accepted, !detected.is_empty() && expected);
            }
        }
    }
}
