//! Streaming driver: runs every record of a WARC container through a
//! [`RecordFilter`] and yields the articles that pass.

pub mod stats;

pub use stats::RunStats;

use tracing::{debug, info, warn};
use warc::BufferedBody;

use crate::config::RunConfig;
use crate::errors::RunError;
use crate::extractor::{Article, ArticleParser};
use crate::filter::RecordFilter;
use crate::record::{Record, is_response};

/// Iterator over the accepted articles of one container.
///
/// Parse failures either end the run (the error is yielded once, then
/// `None`) or, with `continue_after_error`, are logged, counted and skipped.
/// A container read error always ends the run.
pub struct ArchiveRun<'a, I, P> {
    records: I,
    filter: &'a RecordFilter<P>,
    config: RunConfig,
    stats: RunStats,
    finished: bool,
}

impl<'a, I, P> ArchiveRun<'a, I, P>
where
    I: Iterator<Item = Result<warc::Record<BufferedBody>, warc::Error>>,
    P: ArticleParser,
{
    /// `records` is typically `WarcReader::iter_records()`.
    pub fn new(records: I, filter: &'a RecordFilter<P>, config: RunConfig) -> Self {
        Self {
            records,
            filter,
            config,
            stats: RunStats::default(),
            finished: false,
        }
    }

    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    /// Drain the run, discarding articles, and return the final counters.
    pub fn finish(mut self) -> Result<RunStats, RunError> {
        for item in self.by_ref() {
            item?;
        }
        Ok(self.stats)
    }

    fn process(&mut self, raw: warc::Record<BufferedBody>) -> Result<Option<Article>, RunError> {
        if !is_response(&raw) {
            self.stats.non_response += 1;
            return Ok(None);
        }

        let record =
            Record::from_warc(&raw).map_err(|source| RunError::parse("<unknown>", source))?;
        let uri = record.target_uri();

        let result = self
            .filter
            .evaluate(&record, None)
            .map_err(|source| RunError::parse(uri, source))?;

        if let Some(stage) = result.rejected_at {
            self.stats.record_rejection(stage);
            return Ok(None);
        }

        // Downstream always receives an article, even when no stage parsed one
        let article = match result.article {
            Some(article) => article,
            None => self
                .filter
                .parse(&record)
                .map_err(|source| RunError::parse(uri, source))?,
        };

        self.stats.accepted += 1;
        debug!(uri, "record accepted");
        Ok(Some(article))
    }

    fn log_summary(&self) {
        info!(
            scanned = self.stats.scanned,
            accepted = self.stats.accepted,
            rejected = self.stats.rejected(),
            errors = self.stats.errors,
            "archive run finished"
        );
    }
}

impl<I, P> Iterator for ArchiveRun<'_, I, P>
where
    I: Iterator<Item = Result<warc::Record<BufferedBody>, warc::Error>>,
    P: ArticleParser,
{
    type Item = Result<Article, RunError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        loop {
            let raw = match self.records.next() {
                Some(Ok(raw)) => raw,
                Some(Err(err)) => {
                    self.finished = true;
                    return Some(Err(RunError::Archive(err.to_string())));
                }
                None => {
                    self.finished = true;
                    self.log_summary();
                    return None;
                }
            };
            self.stats.scanned += 1;

            match self.process(raw) {
                Ok(Some(article)) => return Some(Ok(article)),
                Ok(None) => continue,
                Err(err) => {
                    self.stats.errors += 1;
                    if self.config.continue_after_error() {
                        warn!("Skipping record: {}", err);
                        continue;
                    }
                    self.finished = true;
                    return Some(Err(err));
                }
            }
        }
    }
}
