//! stylecomb CLI - stylesheet code-style tool
//!
//! Available rules:
//! - align-colons: Pad properties so the colons of a block line up
//! - inline-single-declarations: Put blocks with a single declaration on one line
//! - vendor-prefix-align: Align vendor-prefixed properties and values with their unprefixed form

mod config;
mod output;
mod process;

use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use config::Config;
use output::{ChangeInfo, OutputFormat, Reporter};
use process::{changed_lines, detect_file, is_stylesheet, process_file, write_file, ProcessResult};
use stylecomb_rules::{Comb, RuleRegistry, RuleSettings};

#[derive(Parser)]
#[command(name = "stylecomb")]
#[command(version)]
#[command(about = "Aligns and tidies CSS, Less, Sass and SCSS stylesheets")]
struct Cli {
    /// Files or directories to process
    #[arg(required_unless_present = "list_rules")]
    paths: Vec<PathBuf>,

    /// Check for issues without applying fixes (default mode)
    #[arg(long, conflicts_with = "fix")]
    check: bool,

    /// Apply fixes to files
    #[arg(long, conflicts_with = "check")]
    fix: bool,

    /// Print the settings matching the style the files are already written in
    #[arg(long, conflicts_with_all = ["check", "fix"])]
    detect: bool,

    /// Show verbose output and debug logs
    #[arg(long, short = 'v')]
    verbose: bool,

    /// Rules to run (can be specified multiple times). Overrides config file.
    #[arg(long, short = 'r', value_name = "RULE")]
    rule: Vec<String>,

    /// Output format: text, json, diff
    #[arg(long, value_name = "FORMAT", default_value = "text")]
    format: String,

    /// Shorthand for --format json
    #[arg(long, conflicts_with = "format")]
    json: bool,

    /// Path to config file (default: auto-detect .stylecomb.toml)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Ignore config files
    #[arg(long)]
    no_config: bool,

    /// List available rules and exit
    #[arg(long)]
    list_rules: bool,
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {:#}", "Error".red(), e);
            ExitCode::from(1)
        }
    }
}

/// Log to stderr, filtered by `RUST_LOG` or the verbosity flag
fn init_tracing(verbose: bool) {
    let default = if verbose { "stylecomb=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .try_init();
}

fn run() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let registry = RuleRegistry::new();

    if cli.list_rules {
        println!("{}", "Available rules:".bold());
        for info in registry.list_rules() {
            let dialects: Vec<&str> = info.syntax.iter().map(|s| s.as_str()).collect();
            println!(
                "  {} - {} [{}]",
                info.name.green(),
                info.description,
                dialects.join(", ")
            );
        }
        return Ok(ExitCode::SUCCESS);
    }

    let output_format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::from_str(&cli.format).ok_or_else(|| {
            anyhow::anyhow!(
                "Invalid output format '{}'. Valid options: text, json, diff",
                cli.format
            )
        })?
    };
    let chatty = cli.verbose && output_format == OutputFormat::Text;

    let config = if cli.no_config {
        Config::default()
    } else if let Some(config_path) = &cli.config {
        let cfg = Config::load_path(config_path)?;
        if chatty {
            println!("{}: {}", "Using config".bold(), config_path.display());
        }
        cfg
    } else {
        match Config::load()? {
            Some((cfg, path)) => {
                if chatty {
                    println!("{}: {}", "Using config".bold(), path.display());
                }
                cfg
            }
            None => Config::default(),
        }
    };

    let all_rules = registry.all_names();
    for rule in &cli.rule {
        if !all_rules.contains(&rule.as_str()) {
            eprintln!(
                "{}: Unknown rule '{}'. Use --list-rules to see available rules.",
                "Error".red(),
                rule
            );
            return Ok(ExitCode::from(1));
        }
    }

    let file_paths = collect_files(&cli.paths, &config, output_format);

    if cli.detect {
        return detect(&file_paths, output_format);
    }

    let settings = config.effective_settings(&all_rules, &cli.rule);
    let comb = Comb::new(&settings).context("Invalid rule configuration")?;
    if comb.rules().is_empty() {
        eprintln!("{}: No rules enabled", "Error".red());
        return Ok(ExitCode::from(1));
    }

    let fix_mode = cli.fix;
    let check_mode = !fix_mode;

    if chatty {
        println!("{}: {}", "Mode".bold(), if fix_mode { "fix" } else { "check" });
        println!("{}: {}", "Rules".bold(), comb.rule_names().join(", "));
        println!();
    }

    // Process files in parallel; reporting stays sequential and sorted
    let mut results: Vec<(&PathBuf, Result<ProcessResult>)> = file_paths
        .par_iter()
        .map(|path| (path, process_file(path, &comb)))
        .collect();
    results.sort_by(|a, b| a.0.cmp(b.0));

    let mut reporter = Reporter::new(output_format, cli.verbose);
    for (path, result) in results {
        report_result(path, result, fix_mode, &mut reporter)?;
    }

    let summary = reporter.summary();
    let exit_code = if summary.errors > 0 {
        ExitCode::from(1)
    } else if check_mode && summary.files_with_changes > 0 {
        ExitCode::from(2)
    } else {
        ExitCode::SUCCESS
    };

    reporter.finish(check_mode)?;

    Ok(exit_code)
}

/// Expand `paths` into the stylesheets to process, sorted
fn collect_files(paths: &[PathBuf], config: &Config, format: OutputFormat) -> Vec<PathBuf> {
    let mut file_paths: Vec<PathBuf> = Vec::new();

    for path in paths {
        if path.is_file() {
            file_paths.push(path.clone());
        } else if path.is_dir() {
            for entry in walkdir::WalkDir::new(path)
                .into_iter()
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().is_file() && is_stylesheet(e.path()))
            {
                let file_path = entry.path();
                if config.should_exclude(file_path) {
                    debug!(path = %file_path.display(), "excluded by config");
                } else {
                    file_paths.push(file_path.to_path_buf());
                }
            }
        } else if format != OutputFormat::Json {
            eprintln!("{}: Path does not exist: {}", "Warning".yellow(), path.display());
        }
    }

    file_paths.sort();
    file_paths
}

/// Report a file result and optionally apply fixes
fn report_result(path: &Path, result: Result<ProcessResult>, fix_mode: bool, reporter: &mut Reporter) -> Result<()> {
    match result {
        Ok(result) if !result.has_changes() => {
            reporter.report_skipped(path);
        }
        Ok(result) => {
            let changes = ChangeInfo {
                rules: result.changed_by.iter().map(|r| r.to_string()).collect(),
                changed_lines: changed_lines(&result.old_source, &result.new_source),
            };
            if fix_mode {
                write_file(path, &result.new_source)?;
                reporter.report_fix(path, changes);
            } else {
                reporter.report_check(path, changes, &result.old_source, &result.new_source);
            }
        }
        Err(e) => {
            reporter.report_error(path, &format!("{:#}", e));
        }
    }
    Ok(())
}

#[derive(Serialize)]
struct DetectedConfig {
    rules: RuleSettings,
}

/// Infer settings from every file's detector votes and print them as config
fn detect(file_paths: &[PathBuf], format: OutputFormat) -> Result<ExitCode> {
    let comb = Comb::with_all_rules()?;

    let mut votes: BTreeMap<&str, Vec<bool>> = BTreeMap::new();
    let mut failed = false;
    for (path, detected) in file_paths
        .par_iter()
        .map(|path| (path, detect_file(path, &comb)))
        .collect::<Vec<_>>()
    {
        match detected {
            Ok(detected) => {
                for (rule, mut rule_votes) in detected {
                    votes.entry(rule).or_default().append(&mut rule_votes);
                }
            }
            Err(e) => {
                failed = true;
                eprintln!("{}: {} - {:#}", "Warning".yellow(), path.display(), e);
            }
        }
    }

    let detected = DetectedConfig {
        rules: Comb::infer_settings(&votes),
    };
    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&detected)?);
    } else {
        print!("{}", toml::to_string(&detected)?);
    }

    Ok(if failed { ExitCode::from(1) } else { ExitCode::SUCCESS })
}
