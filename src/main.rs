use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use similar::{ChangeTag, TextDiff};
use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{fmt, EnvFilter};

use sniffwright::{
    discover, Catalog, FileReport, FixOptions, FixOutcome, Resolver, RunOptions, RunReport,
    Ruleset, Runner, Severity,
};

/// Exit code for configuration and usage problems.
const EXIT_CONFIG: i32 = 3;

#[derive(Parser)]
#[command(name = "sniffwright")]
#[command(about = "Check and fix coding standards in PHP, JS and CSS", long_about = None)]
#[command(version)]
struct Cli {
    /// Log more (-v debug, -vv trace); RUST_LOG takes precedence
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Report violations without changing files
    Check {
        /// Files or directories to check
        #[arg(default_value = ".")]
        paths: Vec<PathBuf>,

        /// Standard name, rule reference or ruleset file
        #[arg(short, long, default_value = "PSR12")]
        standard: String,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = Format::Text)]
        format: Format,

        /// Worker threads (0 = one per core)
        #[arg(short, long, default_value_t = 0)]
        jobs: usize,

        /// Stop starting new files after the first file error
        #[arg(long)]
        fail_fast: bool,
    },

    /// Apply fixes until files converge
    Fix {
        /// Files or directories to fix
        #[arg(default_value = ".")]
        paths: Vec<PathBuf>,

        /// Standard name, rule reference or ruleset file
        #[arg(short, long, default_value = "PSR12")]
        standard: String,

        /// Compute fixes without writing them
        #[arg(short = 'n', long)]
        dry_run: bool,

        /// Show unified diff of changes
        #[arg(short, long)]
        diff: bool,

        /// Maximum dispatch passes per file (overrides the ruleset)
        #[arg(long)]
        max_passes: Option<usize>,

        /// Wall-clock budget per file in milliseconds
        #[arg(long)]
        timeout_ms: Option<u64>,

        /// Worker threads (0 = one per core)
        #[arg(short, long, default_value_t = 0)]
        jobs: usize,

        /// Stop starting new files after the first file error
        #[arg(long)]
        fail_fast: bool,
    },

    /// Show the rules a standard enables and their properties
    List {
        /// Standard name, rule reference or ruleset file
        #[arg(short, long, default_value = "PSR12")]
        standard: String,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Check {
            paths,
            standard,
            format,
            jobs,
            fail_fast,
        } => cmd_check(&paths, &standard, format, jobs, fail_fast),

        Commands::Fix {
            paths,
            standard,
            dry_run,
            diff,
            max_passes,
            timeout_ms,
            jobs,
            fail_fast,
        } => {
            let options = RunOptions {
                fix: true,
                dry_run,
                jobs,
                fail_fast,
                fix_options: FixOptions {
                    max_passes,
                    timeout: timeout_ms.map(Duration::from_millis),
                },
            };
            cmd_fix(&paths, &standard, options, diff)
        }

        Commands::List { standard } => cmd_list(&standard).map(|()| 0),
    };

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("{} {err:#}", "error:".red().bold());
            std::process::exit(EXIT_CONFIG);
        }
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = std::env::var("RUST_LOG")
        .ok()
        .and_then(|value| EnvFilter::try_new(value).ok())
        .or_else(|| EnvFilter::try_new(format!("sniffwright={default}")).ok())
        .unwrap_or_else(|| EnvFilter::new("warn"));

    let _ = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .try_init();
}

/// Resolve `--standard` against the built-in catalog.
fn load_ruleset(standard: &str) -> Result<Ruleset> {
    let catalog = Catalog::builtin();
    Resolver::new(&catalog)
        .resolve_reference(standard)
        .with_context(|| format!("could not load standard '{standard}'"))
}

fn run(paths: &[PathBuf], standard: &str, options: RunOptions) -> Result<RunReport> {
    let ruleset = load_ruleset(standard)?;
    let files = discover(paths, ruleset.settings()).context("could not collect files")?;
    if files.is_empty() {
        eprintln!("{}", "No files to check".yellow());
    }
    Ok(Runner::new(Arc::new(ruleset), options).run(&files))
}

/// 0 clean, 1 warnings only, 2 errors or failed files.
fn exit_code(report: &RunReport) -> i32 {
    if report.errors() > 0 || report.failed() > 0 {
        2
    } else if report.warnings() > 0 {
        1
    } else {
        0
    }
}

fn cmd_check(
    paths: &[PathBuf],
    standard: &str,
    format: Format,
    jobs: usize,
    fail_fast: bool,
) -> Result<i32> {
    let options = RunOptions {
        jobs,
        fail_fast,
        ..RunOptions::default()
    };
    let report = run(paths, standard, options)?;

    match format {
        Format::Json => {
            let json = serde_json::json!({
                "totals": {
                    "files": report.files.len(),
                    "errors": report.errors(),
                    "warnings": report.warnings(),
                    "failed": report.failed(),
                    "skipped": report.skipped(),
                },
                "files": &report.files,
            });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        Format::Text => {
            for file in &report.files {
                print_file(file);
            }
            print_summary(&report);
        }
    }
    Ok(exit_code(&report))
}

fn cmd_fix(paths: &[PathBuf], standard: &str, options: RunOptions, show_diff: bool) -> Result<i32> {
    let dry_run = options.dry_run;
    let report = run(paths, standard, options)?;

    if dry_run {
        println!("{}", "[DRY RUN - no files written]".cyan());
    }
    for file in &report.files {
        if let Some(summary) = &file.fix {
            let verb = if dry_run { "Would fix" } else { "Fixed" };
            match summary.outcome {
                FixOutcome::Converged if summary.fixed > 0 => println!(
                    "{} {}: {verb} {} (converged after {} passes)",
                    "✓".green(),
                    file.path.display(),
                    summary.fixed,
                    summary.passes
                ),
                FixOutcome::Converged => {}
                FixOutcome::Exhausted(reason) => println!(
                    "{} {}: {verb} {}, stopped: {reason} after {} passes",
                    "⊙".yellow(),
                    file.path.display(),
                    summary.fixed,
                    summary.passes
                ),
            }
        }
        if show_diff {
            if let Some((before, after)) = &file.rewrite {
                display_diff(&file.path, before, after);
            }
        }
        print_file(file);
    }
    print_summary(&report);
    Ok(exit_code(&report))
}

fn cmd_list(standard: &str) -> Result<()> {
    let ruleset = load_ruleset(standard)?;
    println!("{} ({} rules)", standard.bold(), ruleset.len());
    for rule in ruleset.rules() {
        println!("  {}", rule.code.green());
        for (name, value) in rule.properties.iter() {
            println!("    {name} = {}", value.to_string().dimmed());
        }
        if let Some(level) = rule.overrides.severity {
            println!("    severity = {}", level.to_string().dimmed());
        }
        if let Some(kind) = rule.overrides.kind {
            println!("    type = {}", kind.to_string().dimmed());
        }
    }
    let excluded: Vec<&str> = ruleset.excluded_codes().collect();
    if !excluded.is_empty() {
        println!("{}", "Excluded codes:".bold());
        for code in excluded {
            println!("  - {code}");
        }
    }
    Ok(())
}

fn print_file(file: &FileReport) {
    if let Some(error) = &file.error {
        eprintln!("{} {}: {error}", "✗".red(), file.path.display());
        return;
    }
    if file.skipped {
        println!("{} {}: skipped", "⊘".cyan(), file.path.display());
        return;
    }
    if file.violations.is_empty() {
        return;
    }
    println!(
        "\n{} {} ({} errors, {} warnings)",
        "FILE:".bold(),
        file.path.display(),
        file.errors(),
        file.warnings()
    );
    for v in &file.violations {
        let label = match v.severity {
            Severity::Error => "error".red(),
            Severity::Warning => "warning".yellow(),
        };
        let marker = if v.fixable { " [x]" } else { "" };
        println!(
            "  {:>5}:{:<4} {:<8}{}{} {}",
            v.line,
            v.column,
            label,
            v.message,
            marker.cyan(),
            format!("({})", v.code).dimmed()
        );
    }
}

fn print_summary(report: &RunReport) {
    println!("\n{}", "Summary:".bold());
    println!("  {} files", report.files.len());
    println!("  {} errors", format!("{}", report.errors()).red());
    println!("  {} warnings", format!("{}", report.warnings()).yellow());
    if report.fixed() > 0 || report.files.iter().any(|f| f.fix.is_some()) {
        println!("  {} fixed", format!("{}", report.fixed()).green());
        println!("  {} not converged", format!("{}", report.exhausted()).yellow());
    }
    if report.failed() > 0 {
        println!("  {} failed", format!("{}", report.failed()).red());
    }
    if report.skipped() > 0 {
        println!("  {} skipped", format!("{}", report.skipped()).cyan());
    }
}

/// Show unified diff between original and fixed content
fn display_diff(file: &Path, original: &str, modified: &str) {
    println!("\n{}", format!("--- {} (original)", file.display()).dimmed());
    println!("{}", format!("+++ {} (fixed)", file.display()).dimmed());

    let diff = TextDiff::from_lines(original, modified);
    for change in diff.iter_all_changes() {
        let sign = match change.tag() {
            ChangeTag::Delete => format!("-{change}").red(),
            ChangeTag::Insert => format!("+{change}").green(),
            ChangeTag::Equal => format!(" {change}").normal(),
        };
        print!("{sign}");
    }
}
