use std::path::{Path, PathBuf};

use chrono::Utc;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use ipa_query_rs::ipa::FeatureTable;
use ipa_query_rs::{
    aggregate_results, load_corpus, CancelToken, Meta, QueryConfig, QueryDriverBuilder, Report, ResultSet,
};
use tracing_subscriber::EnvFilter;

#[path = "query_report/json_report_formatter.rs"]
mod json_report_formatter;

#[derive(Debug, Parser)]
#[command(name = "query_report")]
#[command(about = "Run a phonetic query over a JSON corpus and write a JSON report")]
struct Args {
    #[arg(long, env = "IPA_QUERY_CORPUS")]
    corpus: PathBuf,
    #[arg(long, env = "IPA_QUERY_QUERY")]
    query: PathBuf,
    #[arg(long, env = "IPA_QUERY_OUT")]
    out: Option<PathBuf>,
    /// JSON feature table layered over the builtin one.
    #[arg(long, env = "IPA_QUERY_FEATURES")]
    features: Option<PathBuf>,
    #[arg(long, env = "IPA_QUERY_THREADS")]
    threads: Option<usize>,
    #[arg(long, env = "IPA_QUERY_LOG", default_value = "warn")]
    log: String,
    #[arg(long, env = "IPA_QUERY_NO_PROGRESS", default_value_t = false)]
    no_progress: bool,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let args = Args::parse();
    init_logging(&args.log);
    let repo_root = PathBuf::from(env!("CARGO_MANIFEST_DIR"));

    let features = match &args.features {
        Some(path) => FeatureTable::load(&resolve_path(&repo_root, path))
            .map_err(|err| format!("Failed to load feature table: {err}"))?,
        None => FeatureTable::builtin(),
    };
    let corpus_path = resolve_path(&repo_root, &args.corpus);
    let sessions = load_corpus(&corpus_path, &features)
        .map_err(|err| format!("Failed to load corpus '{}': {err}", corpus_path.display()))?;
    let query_path = resolve_path(&repo_root, &args.query);
    let config = QueryConfig::load(&query_path)
        .map_err(|err| format!("Failed to load query '{}': {err}", query_path.display()))?;
    let out_path = resolve_out_path(&repo_root, args.out.as_ref());

    let mut builder = QueryDriverBuilder::new(config.clone());
    if let Some(threads) = args.threads {
        builder = builder.with_threads(threads);
    }
    let driver = builder
        .build()
        .map_err(|err| format!("Failed to build query driver: {err}"))?;

    let record_count: usize = sessions.iter().map(|s| s.records.len()).sum();
    let progress = if args.no_progress {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(record_count as u64)
    };
    progress.set_style(
        ProgressStyle::with_template("[{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} ({eta}) {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-"),
    );
    progress.set_message(config.describe());

    let sink = ResultSet::new();
    let summary = driver.run_with_progress(&sessions, &sink, &CancelToken::new(), |_| progress.inc(1));
    progress.finish_with_message(format!("{} result(s)", summary.results));

    let results = sink.into_results();
    let aggregates = aggregate_results(&results, &sessions, &config.pcc);
    let report = Report {
        schema_version: 1,
        meta: Meta {
            generated_at: Utc::now().to_rfc3339(),
            query: config.describe(),
            session_count: sessions.len(),
            record_count,
            records_searched: summary.records_searched,
            result_count: results.len(),
            cancelled: summary.cancelled,
        },
        results,
        aggregates,
    };

    json_report_formatter::write_report(&out_path, &report)?;
    println!("{}", out_path.display());
    Ok(())
}

/// `RUST_LOG` wins over `--log`.
fn init_logging(default_directive: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn resolve_path(repo_root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        repo_root.join(path)
    }
}

fn resolve_out_path(repo_root: &Path, out: Option<&PathBuf>) -> PathBuf {
    if let Some(path) = out {
        return resolve_path(repo_root, path);
    }

    let run_id = Utc::now().format("%Y%m%dT%H%M%SZ");
    repo_root
        .join("target")
        .join("query_reports")
        .join(format!("query-report-{run_id}.json"))
}
