use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;
use clap::{Parser, ValueEnum};
use collation_rs::alignment::report::{Meta, REPORT_SCHEMA_VERSION};
use collation_rs::store::Equivalence;
use collation_rs::{
    compute_chapter_statistics, normalize, ChapterCollationResult, CollationReport,
    CollatorConfig, EquivalenceSet, VerseCollator, VerseCollatorBuilder, WitnessDocument,
    WITNESS_COUNT,
};
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

#[path = "collation_report/text_table_report_formatter.rs"]
mod text_table_report_formatter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    /// Print a plain-text variant table to stdout instead of writing JSON.
    Table,
}

#[derive(Debug, Parser)]
#[command(name = "collation_report")]
#[command(about = "Collate three witness transcriptions verse by verse and word by word")]
struct Args {
    /// Witness JSON files (list of chapters, each a list of verses), in slot order.
    #[arg(long = "witness", required = true, num_args = 1)]
    witnesses: Vec<PathBuf>,
    /// Witness labels, in slot order. Defaults to the config names.
    #[arg(long = "name")]
    names: Vec<String>,
    /// 0-based chapter index. Every chapter of the shortest witness when omitted.
    #[arg(long, env = "COLLATION_REPORT_CHAPTER")]
    chapter: Option<usize>,
    /// Keep only verses from these regions. Repeatable.
    #[arg(long = "region")]
    regions: Vec<String>,
    #[arg(long, env = "COLLATION_REPORT_CONFIG")]
    config: Option<PathBuf>,
    /// JSON list of `[a, b]` word pairs counted as equivalent in the statistics.
    #[arg(long, env = "COLLATION_REPORT_EQUIVALENCES")]
    equivalences: Option<PathBuf>,
    /// Collate verses on the current thread only.
    #[arg(long, env = "COLLATION_REPORT_SEQUENTIAL", default_value_t = false)]
    sequential: bool,
    #[arg(
        long,
        env = "COLLATION_REPORT_FORMAT",
        value_enum,
        default_value_t = OutputFormat::Json
    )]
    format: OutputFormat,
    #[arg(long, env = "COLLATION_REPORT_OUT")]
    out: Option<PathBuf>,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    if args.witnesses.len() != WITNESS_COUNT {
        return Err(format!(
            "Expected exactly {WITNESS_COUNT} --witness files, got {}.",
            args.witnesses.len()
        ));
    }
    if !args.names.is_empty() && args.names.len() != WITNESS_COUNT {
        return Err(format!(
            "Expected 0 or {WITNESS_COUNT} --name values, got {}.",
            args.names.len()
        ));
    }

    let config = build_config(&args)?;
    let collator = VerseCollatorBuilder::new(config)
        .build()
        .map_err(|err| format!("Failed to build VerseCollator: {err}"))?;
    let equivalences = load_equivalences(args.equivalences.as_deref())?;

    let documents = collator
        .config()
        .witness_names
        .iter()
        .zip(&args.witnesses)
        .map(|(name, path)| {
            WitnessDocument::load(name.clone(), path)
                .map_err(|err| format!("Failed to load witness '{}': {err}", path.display()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let chapters: Vec<usize> = match args.chapter {
        Some(chapter) => vec![chapter],
        None => {
            let count = documents
                .iter()
                .map(WitnessDocument::chapter_count)
                .min()
                .unwrap_or(0);
            (0..count).collect()
        }
    };
    if chapters.is_empty() {
        return Err("Witness files contain no chapters.".to_string());
    }

    let results = collate_chapters(&collator, &documents, &chapters, args.chapter.is_none())?;
    let statistics = results
        .iter()
        .map(|result| compute_chapter_statistics(result, &equivalences))
        .collect::<Vec<_>>();

    let report = CollationReport {
        schema_version: REPORT_SCHEMA_VERSION,
        meta: Meta {
            generated_at: Utc::now().to_rfc3339(),
            witnesses: collator.config().witness_names.clone(),
            chapter_count: results.len(),
        },
        chapters: results,
        statistics,
    };

    match args.format {
        OutputFormat::Json => {
            let out_path = resolve_out_path(args.out.as_deref());
            write_json_report(&out_path, &report)?;
            println!("{}", out_path.display());
        }
        OutputFormat::Table => {
            print!("{}", text_table_report_formatter::render_report(&report));
        }
    }
    Ok(())
}

fn build_config(args: &Args) -> Result<CollatorConfig, String> {
    let mut config = match args.config.as_deref() {
        Some(path) => CollatorConfig::load(path)
            .map_err(|err| format!("Failed to load config '{}': {err}", path.display()))?,
        None => CollatorConfig::default(),
    };
    if !args.names.is_empty() {
        for (slot, name) in args.names.iter().enumerate() {
            config.witness_names[slot] = name.clone();
        }
    }
    if !args.regions.is_empty() {
        config.allowed_regions = args.regions.clone();
    }
    if args.sequential {
        config.parallel = false;
    }
    Ok(config)
}

fn collate_chapters(
    collator: &VerseCollator,
    documents: &[WitnessDocument],
    chapters: &[usize],
    show_progress: bool,
) -> Result<Vec<ChapterCollationResult>, String> {
    let progress = if show_progress {
        let progress = ProgressBar::new(chapters.len() as u64);
        progress.set_style(
            ProgressStyle::with_template(
                "[{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} ({eta}) {msg}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-"),
        );
        progress.set_message("starting...");
        progress
    } else {
        ProgressBar::hidden()
    };

    let mut results = Vec::with_capacity(chapters.len());
    for &chapter in chapters {
        progress.set_message(format!("chapter {chapter}"));
        let result = collator
            .collate_documents(documents, chapter)
            .map_err(|err| format!("Failed to collate chapter {chapter}: {err}"))?;
        results.push(result);
        progress.inc(1);
    }
    progress.finish_with_message("collation complete");
    Ok(results)
}

fn load_equivalences(path: Option<&Path>) -> Result<EquivalenceSet, String> {
    let Some(path) = path else {
        return Ok(EquivalenceSet::default());
    };
    let data = std::fs::read_to_string(path)
        .map_err(|err| format!("Failed to read equivalences '{}': {err}", path.display()))?;
    let pairs: Vec<(String, String)> = serde_json::from_str(&data)
        .map_err(|err| format!("Failed to parse equivalences '{}': {err}", path.display()))?;
    Ok(pairs
        .iter()
        .map(|(a, b)| Equivalence::new(&normalize(a), &normalize(b)))
        .collect())
}

/// Writes the report as pretty JSON, creating the output directory on demand.
fn write_json_report(path: &Path, report: &CollationReport) -> Result<(), String> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|err| {
            format!("Failed to create report directory '{}': {err}", parent.display())
        })?;
    }
    let file = File::create(path)
        .map_err(|err| format!("Failed to create report '{}': {err}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, report)
        .map_err(|err| format!("Failed to write collation report '{}': {err}", path.display()))?;
    writeln!(writer)
        .and_then(|()| writer.flush())
        .map_err(|err| format!("Failed to flush report '{}': {err}", path.display()))
}

fn resolve_out_path(out: Option<&Path>) -> PathBuf {
    if let Some(path) = out {
        return path.to_path_buf();
    }

    let run_id = Utc::now().format("%Y%m%dT%H%M%SZ");
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("target")
        .join("collation_reports")
        .join(format!("collation-report-{run_id}.json"))
}
