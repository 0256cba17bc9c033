use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use sqlsieve_core::{ComplianceFinding, Config, Severity, StatementCategory};
use sqlsieve_engine::Pipeline;
use sqlsieve_sql::Script;

mod output;

const DEFAULT_CONFIG: &str = "sqlsieve.toml";

/// SQLSieve - split SQL scripts into annotated DDL and DML documents
#[derive(Parser)]
#[command(name = "sqlsieve")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to config file (default: $SQLSIEVE_CONFIG, then sqlsieve.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Split a script (or every script in a directory) into annotated documents
    Process {
        /// SQL file or directory of SQL files
        path: PathBuf,

        /// Nomenclature ruleset file
        #[arg(short, long)]
        nomenclature: PathBuf,

        /// Output directory (default: next to each input file); subfolders of a
        /// processed directory are mirrored under it
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Also write a JSON run report per script
        #[arg(short, long)]
        report: bool,

        /// Exit with status 1 when any blocking finding is present
        #[arg(long)]
        fail_on_blocking: bool,
    },

    /// Check a script against the compliance profile without writing documents
    Check {
        /// SQL file to check
        file: PathBuf,
    },

    /// Write a default config file
    InitConfig {
        /// Destination (default: sqlsieve.toml)
        #[arg(default_value = DEFAULT_CONFIG)]
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    let config = load_config(cli.config.as_deref(), cli.verbose)?;

    if cli.verbose {
        eprintln!("{} dialect: {}", "Using".cyan(), config.dialect);
    }

    match cli.command {
        Commands::Process {
            path,
            nomenclature,
            output_dir,
            report,
            fail_on_blocking,
        } => process_command(
            &config,
            &path,
            &nomenclature,
            output_dir.as_deref(),
            report,
            fail_on_blocking,
            cli.verbose,
        ),
        Commands::Check { file } => check_command(&config, &file),
        Commands::InitConfig { path, force } => init_config_command(&path, force),
    }
}

/// Log to stderr; RUST_LOG wins over the verbosity flag
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn load_config(explicit: Option<&Path>, verbose: bool) -> Result<Config> {
    let from_env = std::env::var_os("SQLSIEVE_CONFIG").map(PathBuf::from);

    let path = match (explicit, from_env) {
        (Some(path), _) => Some(path.to_path_buf()),
        (None, Some(path)) => Some(path),
        (None, None) => Some(PathBuf::from(DEFAULT_CONFIG)).filter(|p| p.exists()),
    };

    match path {
        Some(path) => {
            if verbose {
                eprintln!("{} {}", "Loading config from:".cyan(), path.display());
            }
            Config::from_file(&path).with_context(|| format!("Failed to load config {}", path.display()))
        }
        None => {
            if verbose {
                eprintln!("{}", "No config file found, using defaults".yellow());
            }
            Ok(Config::default())
        }
    }
}

/// Process command - split, annotate and write documents
fn process_command(
    config: &Config,
    path: &Path,
    nomenclature_path: &Path,
    output_dir: Option<&Path>,
    write_report: bool,
    fail_on_blocking: bool,
    verbose: bool,
) -> Result<()> {
    let pipeline = Pipeline::from_config(config)?;

    let nomenclature = std::fs::read_to_string(nomenclature_path)
        .with_context(|| format!("Failed to read nomenclature {}", nomenclature_path.display()))?;

    let scripts = output::collect_scripts(path, &config.output)?;
    if scripts.is_empty() {
        eprintln!("{} {}", "No SQL files found in".yellow(), path.display());
        return Ok(());
    }

    // One clock reading per invocation, shared by every script
    let timestamp = Utc::now();
    let mut any_blocking = false;
    let mut targets = output::OutputTargets::new();

    for script_path in &scripts {
        if verbose {
            eprintln!("{} {}", "Processing".cyan(), script_path.display());
        }

        let text = std::fs::read_to_string(script_path)
            .with_context(|| format!("Failed to read SQL file {}", script_path.display()))?;
        let script = Script::new(script_path.display().to_string(), text);
        let result = pipeline.run(&script, &nomenclature, timestamp);

        let dir = output::output_dir_for(script_path, path, output_dir);
        let stem = script.stem();

        let written = output::write_documents(&result, &stem, &dir, &config.output, &mut targets)?;

        println!("\n{} {}", "Processed".bold(), script_path.display().to_string().green());
        for document in &written {
            let line = format!(
                "  {:<13} {:>4} statement(s)  -> {}",
                document.category.short_label(),
                document.statements,
                document.path.display()
            );
            if document.blocking > 0 {
                println!("{}  {}", line, format!("{} blocking", document.blocking).red());
            } else {
                println!("{}", line);
            }
        }

        if !result.ruleset_findings.is_empty() {
            println!(
                "  {}",
                format!("{} nomenclature line(s) skipped", result.ruleset_findings.len()).yellow()
            );
            if verbose {
                for finding in &result.ruleset_findings {
                    println!("    {}", finding);
                }
            }
        }

        if write_report {
            let report_path = output::write_report(&result.report, &stem, &dir, &mut targets)?;
            if verbose {
                eprintln!("{} {}", "Report saved to:".green(), report_path.display());
            }
        }

        any_blocking |= result.has_blocking();
    }

    println!();
    if any_blocking {
        println!("{}", "⚠ Blocking findings present - review before execution".yellow().bold());
        if fail_on_blocking {
            std::process::exit(1);
        }
    } else {
        println!("{}", "✓ No blocking findings".green());
    }

    Ok(())
}

/// Check command - print findings per statement
fn check_command(config: &Config, file: &Path) -> Result<()> {
    let pipeline = Pipeline::from_config(config)?;

    let text = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read SQL file {}", file.display()))?;
    let script = Script::new(file.display().to_string(), text);
    let checked = pipeline.check_script(&script);

    println!("\n{}", "=".repeat(60).bright_blue());
    println!(
        "{} {} ({} profile)",
        "Compliance check:".bold().bright_blue(),
        file.display(),
        pipeline.profile().name()
    );
    println!("{}", "=".repeat(60).bright_blue());

    let mut blocking = 0;
    for entry in &checked {
        let line = line_of(&script.text, entry.statement.start_offset, &entry.statement.raw_text);
        let label = match entry.category {
            StatementCategory::SchemaDefinition => entry.category.short_label().cyan(),
            StatementCategory::DataManipulation => entry.category.short_label().green(),
            StatementCategory::Unclassified => entry.category.short_label().yellow(),
        };
        println!("\n  #{} {} (line {})", entry.statement.ordinal + 1, label, line);

        if entry.findings.is_empty() {
            println!("    {}", "✓ no findings".green());
        }
        for finding in &entry.findings {
            println!("    {}", colorize(finding));
        }

        blocking += entry.findings.iter().filter(|f| f.is_blocking()).count();
    }

    println!();
    println!("Checked {} statement(s), {} blocking finding(s)", checked.len(), blocking);

    if blocking > 0 {
        std::process::exit(1);
    }

    Ok(())
}

/// Init-config command - write defaults
fn init_config_command(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        anyhow::bail!("{} already exists (use --force to overwrite)", path.display());
    }

    Config::default()
        .save_to_file(path)
        .with_context(|| format!("Failed to write config {}", path.display()))?;

    println!("{} {}", "Config written to".green(), path.display());
    Ok(())
}

fn colorize(finding: &ComplianceFinding) -> String {
    let text = finding.to_string();
    match finding.severity {
        Severity::Blocking => text.red().bold().to_string(),
        Severity::Warning => text.yellow().to_string(),
        Severity::Informational => text.dimmed().to_string(),
    }
}

/// 1-indexed line of the first non-whitespace character of a statement
fn line_of(text: &str, start_offset: usize, raw: &str) -> usize {
    let leading = raw.len() - raw.trim_start().len();
    let offset = (start_offset + leading).min(text.len());
    text[..offset].matches('\n').count() + 1
}
