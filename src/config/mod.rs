//! Configuration for a filtering run.
//!
//! Everything here is fixed before the first record is read and never
//! mutated afterwards. `Config::from_env` loads all three parts from
//! environment variables; `FilterConfig::builder` is the programmatic way
//! in and performs the same validation.

use chrono::{DateTime, NaiveDate, Utc};
use std::env;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Environment variable names.
pub const ENV_VALID_HOSTS: &str = "WARCSIEVE_VALID_HOSTS";
pub const ENV_START_DATE: &str = "WARCSIEVE_START_DATE";
pub const ENV_END_DATE: &str = "WARCSIEVE_END_DATE";
pub const ENV_STRICT_DATE: &str = "WARCSIEVE_STRICT_DATE";
pub const ENV_LANGUAGES: &str = "WARCSIEVE_LANGUAGES";
pub const ENV_STRICT_LANGUAGE: &str = "WARCSIEVE_STRICT_LANGUAGE";
pub const ENV_CONTINUE_AFTER_ERROR: &str = "WARCSIEVE_CONTINUE_AFTER_ERROR";
pub const ENV_IGNORE_UNICODE_ERRORS: &str = "WARCSIEVE_IGNORE_UNICODE_ERRORS";

const DEFAULT_STRICT_DATE: bool = true;
const DEFAULT_STRICT_LANGUAGE: bool = true;
const DEFAULT_CONTINUE_AFTER_ERROR: bool = false;
const DEFAULT_IGNORE_UNICODE_ERRORS: bool = false;

/// Acceptance criteria shared read-only by every record evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterConfig {
    valid_hosts: Vec<String>,
    start_date: Option<DateTime<Utc>>,
    end_date: Option<DateTime<Utc>>,
    strict_date: bool,
    languages: Vec<String>,
    strict_language: bool,
}

impl FilterConfig {
    pub fn builder() -> FilterConfigBuilder {
        FilterConfigBuilder::default()
    }

    /// Host substrings a target URI must contain. Empty means any host.
    pub fn valid_hosts(&self) -> &[String] {
        &self.valid_hosts
    }
    /// Inclusive lower bound on the publication date.
    pub fn start_date(&self) -> Option<DateTime<Utc>> {
        self.start_date
    }
    /// Inclusive upper bound on the publication date.
    pub fn end_date(&self) -> Option<DateTime<Utc>> {
        self.end_date
    }
    /// Reject articles whose publication date cannot be determined.
    pub fn strict_date(&self) -> bool {
        self.strict_date
    }
    /// Language codes a detected language must contain. Empty means any language.
    pub fn languages(&self) -> &[String] {
        &self.languages
    }
    /// Reject articles whose language cannot be determined.
    pub fn strict_language(&self) -> bool {
        self.strict_language
    }

    pub fn has_date_bounds(&self) -> bool {
        self.start_date.is_some() || self.end_date.is_some()
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        let mut builder = Self::builder()
            .valid_hosts(env_list(ENV_VALID_HOSTS))
            .languages(env_list(ENV_LANGUAGES))
            .strict_date(env_bool(ENV_STRICT_DATE, DEFAULT_STRICT_DATE)?)
            .strict_language(env_bool(ENV_STRICT_LANGUAGE, DEFAULT_STRICT_LANGUAGE)?);

        if let Some(value) = env_value(ENV_START_DATE) {
            builder = builder.start_date(parse_date_bound("start_date", &value)?);
        }
        if let Some(value) = env_value(ENV_END_DATE) {
            builder = builder.end_date(parse_date_bound("end_date", &value)?);
        }

        builder.build()
    }
}

impl Default for FilterConfig {
    /// Accepts every record.
    fn default() -> Self {
        Self {
            valid_hosts: Vec::new(),
            start_date: None,
            end_date: None,
            strict_date: DEFAULT_STRICT_DATE,
            languages: Vec::new(),
            strict_language: DEFAULT_STRICT_LANGUAGE,
        }
    }
}

#[derive(Debug, Default)]
pub struct FilterConfigBuilder {
    config: FilterConfig,
}

impl FilterConfigBuilder {
    pub fn valid_hosts<I, S>(mut self, hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.valid_hosts = hosts.into_iter().map(Into::into).collect();
        self
    }

    pub fn start_date(mut self, date: DateTime<Utc>) -> Self {
        self.config.start_date = Some(date);
        self
    }

    pub fn end_date(mut self, date: DateTime<Utc>) -> Self {
        self.config.end_date = Some(date);
        self
    }

    pub fn strict_date(mut self, strict: bool) -> Self {
        self.config.strict_date = strict;
        self
    }

    pub fn languages<I, S>(mut self, languages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.languages = languages.into_iter().map(Into::into).collect();
        self
    }

    pub fn strict_language(mut self, strict: bool) -> Self {
        self.config.strict_language = strict;
        self
    }

    pub fn build(self) -> Result<FilterConfig, ConfigError> {
        let config = self.config;

        // An empty entry is a substring of everything and would disable the stage.
        if config.valid_hosts.iter().any(|h| h.trim().is_empty()) {
            return Err(ConfigError::InvalidValue {
                field: "valid_hosts",
                reason: "host entries must not be blank".to_string(),
            });
        }
        if config.languages.iter().any(|l| l.trim().is_empty()) {
            return Err(ConfigError::InvalidValue {
                field: "languages",
                reason: "language entries must not be blank".to_string(),
            });
        }
        if let (Some(start), Some(end)) = (config.start_date, config.end_date)
            && end < start
        {
            return Err(ConfigError::InvalidValue {
                field: "end_date",
                reason: format!("{} is earlier than start_date {}", end, start),
            });
        }

        Ok(config)
    }
}

/// Behaviour of the archive driver around failing records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunConfig {
    continue_after_error: bool,
}

impl RunConfig {
    pub fn new(continue_after_error: bool) -> Self {
        Self {
            continue_after_error,
        }
    }

    /// Skip records that fail to parse instead of aborting the run.
    pub fn continue_after_error(&self) -> bool {
        self.continue_after_error
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self::new(env_bool(
            ENV_CONTINUE_AFTER_ERROR,
            DEFAULT_CONTINUE_AFTER_ERROR,
        )?))
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self::new(DEFAULT_CONTINUE_AFTER_ERROR)
    }
}

/// Options for the HTML article parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParserConfig {
    ignore_unicode_errors: bool,
}

impl ParserConfig {
    pub fn new(ignore_unicode_errors: bool) -> Self {
        Self {
            ignore_unicode_errors,
        }
    }

    /// Keep replacement characters instead of failing on undecodable bytes.
    pub fn ignore_unicode_errors(&self) -> bool {
        self.ignore_unicode_errors
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self::new(env_bool(
            ENV_IGNORE_UNICODE_ERRORS,
            DEFAULT_IGNORE_UNICODE_ERRORS,
        )?))
    }
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self::new(DEFAULT_IGNORE_UNICODE_ERRORS)
    }
}

/// Everything a run needs, loaded in one go.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Config {
    filter: FilterConfig,
    run: RunConfig,
    parser: ParserConfig,
}

impl Config {
    pub fn new(filter: FilterConfig, run: RunConfig, parser: ParserConfig) -> Self {
        Self {
            filter,
            run,
            parser,
        }
    }

    /// Load from environment variables, falling back to defaults for anything unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            filter: FilterConfig::from_env()?,
            run: RunConfig::from_env()?,
            parser: ParserConfig::from_env()?,
        })
    }

    pub fn filter(&self) -> &FilterConfig {
        &self.filter
    }
    pub fn run(&self) -> RunConfig {
        self.run
    }
    pub fn parser(&self) -> ParserConfig {
        self.parser
    }
}

/// Errors that can occur while building a configuration.
#[derive(Debug)]
pub enum ConfigError {
    InvalidValue { field: &'static str, reason: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidValue { field, reason } => {
                write!(f, "invalid value for '{}': {}", field, reason)
            }
        }
    }
}

impl Error for ConfigError {}

/// Parse a date bound given either as RFC 3339 or as a bare `YYYY-MM-DD`
/// (midnight UTC).
pub fn parse_date_bound(field: &'static str, value: &str) -> Result<DateTime<Utc>, ConfigError> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .ok_or_else(|| ConfigError::InvalidValue {
            field,
            reason: format!("'{}' is neither RFC 3339 nor YYYY-MM-DD", value),
        })
}

fn env_value(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_list(key: &str) -> Vec<String> {
    env_value(key)
        .map(|v| {
            v.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn env_bool(key: &'static str, default: bool) -> Result<bool, ConfigError> {
    let Some(value) = env_value(key) else {
        return Ok(default);
    };
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::InvalidValue {
            field: key,
            reason: format!("'{}' is not a boolean", other),
        }),
    }
}
