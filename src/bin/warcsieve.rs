use anyhow::{Context, Result};
use clap::Parser;
use std::io::{self, BufRead, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;
use warc::WarcReader;

use warcsieve::{
    ArchiveRun, ArticleParser, HtmlArticleParser, RecordFilter, RunConfig, RunStats,
    config::Config,
};

/// Filter WARC containers down to the articles that pass the host, date and
/// language criteria, printed to stdout as JSON lines.
#[derive(Parser, Debug)]
#[command(name = "warcsieve")]
#[command(version, about, long_about = None)]
#[command(after_help = "\
Filter criteria are read from the environment:
  WARCSIEVE_VALID_HOSTS            comma-separated host substrings (default: any)
  WARCSIEVE_START_DATE             RFC 3339 or YYYY-MM-DD (default: unbounded)
  WARCSIEVE_END_DATE               RFC 3339 or YYYY-MM-DD (default: unbounded)
  WARCSIEVE_STRICT_DATE            reject undated articles (default: true)
  WARCSIEVE_LANGUAGES              comma-separated language codes (default: any)
  WARCSIEVE_STRICT_LANGUAGE        reject articles of unknown language (default: true)
  WARCSIEVE_CONTINUE_AFTER_ERROR   skip unparseable records (default: false)
  WARCSIEVE_IGNORE_UNICODE_ERRORS  decode invalid bytes lossily (default: false)")]
struct Cli {
    /// WARC files to filter (`.warc` or `.warc.gz`)
    #[arg(required = true, value_name = "FILE")]
    paths: Vec<PathBuf>,

    /// Emit logs as JSON
    #[arg(long, env = "WARCSIEVE_LOG_JSON")]
    log_json: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr, articles to stdout
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr);
    if cli.log_json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    let config = Config::from_env()?;
    info!("Filter configuration: {:?}", config.filter());

    let filter = RecordFilter::new(
        config.filter().clone(),
        HtmlArticleParser::new(config.parser()),
    );

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let mut total = RunStats::default();

    for path in &cli.paths {
        let stats = process_file(path, &filter, config.run(), &mut out)?;
        log_stats(&path.display().to_string(), &stats);
        total.merge(&stats);
    }

    out.flush()?;
    log_stats(&format!("total ({} files)", cli.paths.len()), &total);
    Ok(())
}

fn log_stats(label: &str, stats: &RunStats) {
    info!(
        "{}: scanned {}, accepted {}, rejected {} (host {}, date {}, language {}), errors {}",
        label,
        stats.scanned,
        stats.accepted,
        stats.rejected(),
        stats.rejected_host,
        stats.rejected_date,
        stats.rejected_language,
        stats.errors
    );
}

fn process_file<P, W>(
    path: &Path,
    filter: &RecordFilter<P>,
    run_config: RunConfig,
    out: &mut W,
) -> Result<RunStats>
where
    P: ArticleParser,
    W: Write,
{
    info!("Processing {}", path.display());

    let is_gzip = path.extension().is_some_and(|ext| ext == "gz");
    if is_gzip {
        let reader = WarcReader::from_path_gzip(path)
            .with_context(|| format!("failed to open {}", path.display()))?;
        write_articles(reader, filter, run_config, out)
    } else {
        let reader = WarcReader::from_path(path)
            .with_context(|| format!("failed to open {}", path.display()))?;
        write_articles(reader, filter, run_config, out)
    }
}

fn write_articles<R, P, W>(
    reader: WarcReader<R>,
    filter: &RecordFilter<P>,
    run_config: RunConfig,
    out: &mut W,
) -> Result<RunStats>
where
    R: BufRead,
    P: ArticleParser,
    W: Write,
{
    let mut run = ArchiveRun::new(reader.iter_records(), filter, run_config);
    for item in run.by_ref() {
        let article = item?;
        serde_json::to_writer(&mut *out, &article)?;
        out.write_all(b"\n")?;
    }
    Ok(*run.stats())
}
