pub mod archive;
pub mod config;
pub mod errors;
pub mod extractor;
pub mod filter;
pub mod record;

pub use archive::{ArchiveRun, RunStats};
pub use config::{Config, ConfigError, FilterConfig, ParserConfig, RunConfig};
pub use errors::{ParseError, RunError};
pub use extractor::{Article, ArticleParser, HtmlArticleParser};
pub use filter::{FilterResult, RecordFilter, Stage};
pub use record::Record;
