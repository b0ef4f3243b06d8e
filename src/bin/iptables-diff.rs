//! iptables-diff — compare two iptables-save snapshots
//!
//! # Usage
//!
//! ```bash
//! # Capture before and after a change
//! iptables-save > rules-before.txt
//! iptables-save > rules-after.txt
//!
//! # Show what changed
//! iptables-diff --before rules-before.txt --after rules-after.txt
//!
//! # Same, positional and machine readable
//! iptables-diff rules-before.txt rules-after.txt --format json
//! ```

use std::env;
use std::path::PathBuf;
use std::process;

use anyhow::Context;
use clap::{CommandFactory, Parser};
use colored::*;
use iptables_diff::prelude::*;

#[derive(Parser)]
#[command(name = "iptables-diff")]
#[command(version)]
#[command(about = "Compare two sets of iptables rules and show the differences between them")]
#[command(after_help = "To generate the input files, use iptables-save:
    Before changes: iptables-save > rules-before.txt
    After changes:  iptables-save > rules-after.txt

EXAMPLES:
    iptables-diff --before rules-before.txt --after rules-after.txt
    iptables-diff rules-before.txt rules-after.txt --summary

OUTPUT:
    -  removed rule (red)
    +  added rule (green)
    !  table added or removed (yellow)")]
struct Cli {
    /// Snapshots to compare, before then after
    #[arg(value_name = "FILE")]
    files: Vec<PathBuf>,

    /// File containing the initial iptables rules
    #[arg(short, long, value_name = "FILE")]
    before: Option<PathBuf>,

    /// File containing the modified iptables rules
    #[arg(short, long, value_name = "FILE")]
    after: Option<PathBuf>,

    /// Disable color output (also set by a non-empty NO_COLOR)
    #[arg(long)]
    no_color: bool,

    /// Output format (overrides the config file)
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,

    /// Print a summary line after the text report
    #[arg(short, long)]
    summary: bool,

    /// Exit with status 1 when the snapshots differ
    #[arg(long)]
    exit_code: bool,

    /// Read settings from this TOML file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn color_disabled(&self) -> bool {
        self.no_color || env::var_os("NO_COLOR").is_some_and(|v| !v.is_empty())
    }

    /// Resolve the two snapshots from flags and positional arguments.
    fn inputs(&self) -> Result<(PathBuf, PathBuf), DiffError> {
        let mut positional = self.files.iter().cloned();
        let before = self.before.clone().or_else(|| positional.next());
        let after = self.after.clone().or_else(|| positional.next());

        if positional.next().is_some() {
            return Err(DiffError::Usage("too many input files".into()));
        }

        match (before, after) {
            (Some(before), Some(after)) => Ok((before, after)),
            (None, _) => Err(DiffError::Usage("missing the before snapshot".into())),
            (_, None) => Err(DiffError::Usage("missing the after snapshot".into())),
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(&cli);

    let (before, after) = match cli.inputs() {
        Ok(paths) => paths,
        Err(e) => {
            eprintln!("{} {}", error_label(&cli), e);
            eprintln!();
            eprintln!("{}", Cli::command().render_usage());
            eprintln!();
            eprintln!("Try: iptables-diff --help");
            process::exit(2);
        }
    };

    match run(&cli, before, after) {
        Ok(changed) => {
            if changed && cli.exit_code {
                process::exit(1);
            }
        }
        Err(e) => {
            eprintln!("{} {:#}", error_label(&cli), e);
            process::exit(2);
        }
    }
}

/// Load both snapshots, compare them and print the report.
///
/// Returns whether any difference was found.
fn run(cli: &Cli, before: PathBuf, after: PathBuf) -> anyhow::Result<bool> {
    let config = Config::load(cli.config.as_deref()).context("failed to load configuration")?;

    let presentation = Presentation {
        color: config.output.color && !cli.color_disabled(),
    };
    let format = cli.format.unwrap_or(config.output.format);
    let summary = cli.summary || config.output.summary;

    let before = load(&before).context("failed to load before rules")?;
    let after = load(&after).context("failed to load after rules")?;

    let report = compare(&before, &after);

    match format {
        OutputFormat::Text => {
            print!("{}", report.render(&presentation));
            if summary {
                println!();
                let line = report.summary().to_string();
                if presentation.color {
                    println!("{}", line.bold());
                } else {
                    println!("{}", line);
                }
            }
        }
        OutputFormat::Json => println!("{}", to_json(&report)?),
    }

    Ok(report.has_changes())
}

fn init_logging(cli: &Cli) {
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_ansi(!cli.color_disabled())
        .with_target(false)
        .init();
}

fn error_label(cli: &Cli) -> String {
    if cli.color_disabled() {
        "Error:".to_string()
    } else {
        "Error:".red().bold().to_string()
    }
}
