// Entry point and high-level CLI flow.
//
// - `score` (default) loads projects, prints a ranking preview and the
//   portfolio summary, and writes the ranking CSV plus `summary.json`.
// - `stats` prints only the summary, as JSON on stdout.
// - `methodology` explains the weights and reference costs.
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use ieop_report::config::AppConfig;
use ieop_report::error::AppError;
use ieop_report::output;
use ieop_report::portfolio::{ranking_rows, score_all, summarize};
use ieop_report::reference::ReferenceCostTable;
use ieop_report::scoring::ScoringEngine;
use ieop_report::source::{load_with_fallback, FileSource, ProjectSource, RemoteSource};
use ieop_report::telemetry;
use ieop_report::util::format_int;
use std::path::PathBuf;
use tracing::info;

const RANKING_FILE: &str = "ieop_ranking.csv";
const SUMMARY_FILE: &str = "summary.json";

#[derive(Parser, Debug)]
#[command(
    name = "ieop_report",
    about = "Score public works projects with the IEOP efficiency index",
    version
)]
struct Cli {
    /// CSV or JSON file of project records
    #[arg(long, global = true)]
    data: Option<PathBuf>,
    /// JSON endpoint returning a list of project records
    #[arg(long, global = true)]
    remote: Option<String>,
    /// Evaluation date for ongoing projects (YYYY-MM-DD, defaults to today)
    #[arg(long, global = true, value_parser = parse_date)]
    today: Option<NaiveDate>,
    /// Directory for the generated report files
    #[arg(long, global = true)]
    output_dir: Option<PathBuf>,
    /// Number of ranking rows to preview on the console
    #[arg(long, global = true)]
    preview: Option<usize>,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    /// Rank projects, print a preview and write the report files (default)
    Score,
    /// Print portfolio statistics as JSON
    Stats,
    /// Describe how the index is computed
    Methodology,
}

fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

fn main() {
    if let Err(err) = run() {
        eprintln!("application error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let mut config = AppConfig::load()?;

    if let Some(path) = cli.data {
        config.data.path = Some(path);
    }
    if let Some(url) = cli.remote {
        config.data.remote_url = Some(url);
    }
    if let Some(dir) = cli.output_dir {
        config.output.dir = dir;
    }
    if let Some(rows) = cli.preview {
        config.output.preview_rows = rows;
    }

    telemetry::init(&config.telemetry)?;

    let table = ReferenceCostTable::standard();
    let command = cli.command.unwrap_or(Command::Score);
    if command == Command::Methodology {
        print!("{}", output::methodology_text(table));
        return Ok(());
    }

    let file = config.data.path.clone().map(FileSource::new);
    let remote = config
        .data
        .remote_url
        .clone()
        .map(|url| RemoteSource::new(url).with_timeout(config.data.fetch_timeout));
    let mut sources: Vec<&dyn ProjectSource> = Vec::new();
    if let Some(file) = &file {
        sources.push(file);
    }
    if let Some(remote) = &remote {
        sources.push(remote);
    }
    let loaded = load_with_fallback(&sources);

    let today = cli.today.unwrap_or_else(|| Local::now().date_naive());
    let engine = ScoringEngine::new(table, today);
    let results = score_all(&loaded.records, &engine);
    let stats = summarize(&results);
    info!(
        projects = stats.total,
        mean_index = stats.mean_index,
        %today,
        "portfolio scored"
    );

    if command == Command::Stats {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    println!("IEOP report");
    println!(
        "Data: {} ({} projects, evaluated {})\n",
        loaded.origin.label(),
        format_int(results.len()),
        engine.today()
    );

    let rows = ranking_rows(&results);
    println!("Ranking (top {} by IEOP)\n", config.output.preview_rows.min(rows.len()));
    output::preview_table_rows(&rows, config.output.preview_rows);
    output::print_statistics(&stats);

    std::fs::create_dir_all(&config.output.dir)?;
    let ranking_path = config.output.dir.join(RANKING_FILE);
    output::write_csv(&ranking_path, &rows)?;
    let summary_path = config.output.dir.join(SUMMARY_FILE);
    output::write_json(&summary_path, &stats)?;
    println!("(Full ranking exported to {})", ranking_path.display());
    println!("(Summary exported to {})", summary_path.display());
    Ok(())
}
