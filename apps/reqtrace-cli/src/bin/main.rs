use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use reqtrace_core::config::{resolve_with_base, Config};
use reqtrace_engine::Engine;

const USAGE: &str = "Usage: reqtrace <ingest|query|map|trace|validate> [options]

  ingest   [DIR]                  extract requirements from DIR/*.txt
  query    \"<text>\" [DIR]         generate test cases for a free-text query
  map      [DIR] --tests FILE     map test cases to requirements
  trace    [DIR] --tests FILE     traceability matrix and coverage stats
  validate [DIR] --tests FILE     quality checks for test cases

Options:
  --tests FILE   JSON array of test cases to upload first
  --verbose, -v  debug logging on stderr";

struct Args {
    command: String,
    positional: Vec<String>,
    tests: Option<PathBuf>,
    verbose: bool,
}

fn usage_exit() -> ! {
    eprintln!("{USAGE}");
    std::process::exit(1)
}

fn parse_args() -> Args {
    let mut raw = env::args().skip(1);
    let Some(command) = raw.next() else { usage_exit() };
    let mut args = Args { command, positional: Vec::new(), tests: None, verbose: false };
    while let Some(arg) = raw.next() {
        match arg.as_str() {
            "--tests" | "-t" => match raw.next() {
                Some(path) => args.tests = Some(PathBuf::from(path)),
                None => {
                    eprintln!("Error: --tests requires a file path");
                    std::process::exit(1);
                }
            },
            "--verbose" | "-v" => args.verbose = true,
            "--help" | "-h" => usage_exit(),
            _ if !arg.starts_with('-') => args.positional.push(arg.clone()),
            other => {
                eprintln!("Error: unknown option {other}");
                usage_exit()
            }
        }
    }
    args
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn data_dir(config: &Config, arg: Option<&String>) -> anyhow::Result<PathBuf> {
    let raw = match arg {
        Some(dir) => dir.clone(),
        None => config.get::<String>("data.raw_txt_dir").unwrap_or_else(|_| "data/txt".to_string()),
    };
    Ok(resolve_with_base(&env::current_dir()?, raw))
}

fn ingest(engine: &mut Engine, dir: &Path) -> anyhow::Result<()> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")?);
    spinner.set_message(format!("reading {}", dir.display()));
    spinner.enable_steady_tick(Duration::from_millis(100));
    let result = engine.ingest_directory(dir);
    spinner.finish_and_clear();
    let summary = result?;
    tracing::info!(dir = %dir.display(), chunks = summary.chunks, requirements = summary.requirements, "ingest complete");
    Ok(())
}

fn upload(engine: &mut Engine, tests: Option<&Path>) -> anyhow::Result<()> {
    let Some(path) = tests else {
        tracing::warn!("no --tests file given; working with generated test cases only");
        return Ok(());
    };
    let json = fs::read_to_string(path).map_err(|e| anyhow::anyhow!("reading {}: {}", path.display(), e))?;
    let summary = engine.upload_test_cases(&json)?;
    tracing::info!(added = summary.added, rejected = summary.rejected, "uploaded test cases");
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = parse_args();
    init_logging(args.verbose);
    let config = Config::load().map_err(|e| {
        eprintln!("Error loading config: {}", e);
        e
    })?;
    let mut engine = Engine::from_config(&config)?;

    match args.command.as_str() {
        "ingest" => {
            let dir = data_dir(&config, args.positional.first())?;
            ingest(&mut engine, &dir)?;
            print_json(&engine.requirements())?;
        }
        "query" => {
            let Some(query) = args.positional.first() else { usage_exit() };
            let dir = data_dir(&config, args.positional.get(1))?;
            ingest(&mut engine, &dir)?;
            let cases = engine.query(query)?;
            print_json(&serde_json::json!({ "query": query, "test_cases": cases }))?;
        }
        "map" => {
            let dir = data_dir(&config, args.positional.first())?;
            ingest(&mut engine, &dir)?;
            upload(&mut engine, args.tests.as_deref())?;
            let outcome = engine.map();
            let report = engine.coverage_report();
            print_json(&serde_json::json!({ "mapping": outcome, "coverage": report }))?;
        }
        "trace" => {
            let dir = data_dir(&config, args.positional.first())?;
            ingest(&mut engine, &dir)?;
            upload(&mut engine, args.tests.as_deref())?;
            print_json(&engine.traceability())?;
        }
        "validate" => {
            let dir = data_dir(&config, args.positional.first())?;
            ingest(&mut engine, &dir)?;
            upload(&mut engine, args.tests.as_deref())?;
            print_json(&engine.validate())?;
        }
        other => {
            eprintln!("Unknown command: {other}");
            usage_exit()
        }
    }
    Ok(())
}
