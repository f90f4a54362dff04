// SPDX-License-Identifier: PMPL-1.0-or-later
//! Conformancebot CLI - Accessibility Conformance Normalisation Bot
//!
//! Part of the gitbot-fleet ecosystem.

use clap::{Parser, Subcommand, ValueEnum};
use conformancebot::audit::{run_audit, CapturedResults};
use conformancebot::config::load_config;
use conformancebot::findings::{RawFinding, Severity};
use conformancebot::normalisation::normalise_findings;
use conformancebot::persistence::{read_audit_run, write_audit_run};
use conformancebot::report::{generate_report, OutputFormat};
use conformancebot::standards::{bundled_standards, resolve_standard, WcagLevel};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Accessibility conformance normalisation bot for gitbot-fleet
#[derive(Parser)]
#[command(name = "conformancebot")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Audit every site in a config file (one audit run per site)
    Audit {
        /// Audit config (TOML or JSON)
        config: PathBuf,

        /// Directory for audit-run records (overrides the config's output_dir)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Report format printed when no output directory is set
        #[arg(long, default_value = "text")]
        format: FormatArg,

        /// Exit non-zero when a compliance finding is at or above this severity
        #[arg(long, default_value = "low")]
        fail_on: SeverityArg,

        /// Enable verbose logging
        #[arg(long, short)]
        verbose: bool,
    },

    /// Normalise a JSON array of raw findings
    Normalise {
        /// Raw findings file
        input: PathBuf,

        /// Bundled standard id or path to a standard JSON file
        #[arg(long, default_value = "EN301549_v3.2.1")]
        standard: String,

        /// Enable verbose logging
        #[arg(long, short)]
        verbose: bool,
    },

    /// Render a stored audit-run record
    Report {
        /// Audit-run record file
        record: PathBuf,

        /// Output format
        #[arg(long, default_value = "text")]
        format: FormatArg,

        /// Output file (stdout if not specified)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Standard for criterion titles (defaults to the record's standard)
        #[arg(long)]
        standard: Option<String>,

        /// Exit non-zero when a compliance finding is at or above this severity
        #[arg(long, default_value = "low")]
        fail_on: SeverityArg,

        /// Enable verbose logging
        #[arg(long, short)]
        verbose: bool,
    },

    /// List the standards compiled into this binary
    Standards,
}

/// Output format CLI argument
#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    /// Human-readable text
    Text,
    /// Structured JSON
    Json,
    /// SARIF for IDE/CI
    Sarif,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Text => OutputFormat::Text,
            FormatArg::Json => OutputFormat::Json,
            FormatArg::Sarif => OutputFormat::Sarif,
        }
    }
}

/// Severity threshold CLI argument
#[derive(Debug, Clone, Copy, ValueEnum)]
enum SeverityArg {
    Low,
    Medium,
    High,
    Critical,
}

impl From<SeverityArg> for Severity {
    fn from(arg: SeverityArg) -> Self {
        match arg {
            SeverityArg::Low => Severity::Low,
            SeverityArg::Medium => Severity::Medium,
            SeverityArg::High => Severity::High,
            SeverityArg::Critical => Severity::Critical,
        }
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("conformancebot=debug")
    } else {
        EnvFilter::new("conformancebot=warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Audit {
            config,
            output,
            format,
            fail_on,
            verbose,
        } => {
            init_logging(verbose);
            let config = load_config(&config)?;
            let standard = resolve_standard(&config.standard, &config.base_dir)?;
            let source = CapturedResults::for_config(&config);
            let output_dir = output.or_else(|| {
                config.output_dir.as_ref().map(|dir| config.resolve_path(dir))
            });

            let records = run_audit(&config, &standard, &source);
            for record in &records {
                match output_dir {
                    Some(ref dir) => {
                        let path = write_audit_run(record, dir)?;
                        eprintln!("Saved audit run: {}", path.display());
                    }
                    None => println!("{}", generate_report(record, Some(&standard), format.into())),
                }
            }

            if records.iter().any(|r| r.has_compliance_findings_at(fail_on.into())) {
                std::process::exit(1);
            }
        }

        Commands::Normalise { input, standard, verbose } => {
            init_logging(verbose);
            let standard = resolve_standard(&standard, Path::new("."))?;
            let content = std::fs::read_to_string(&input)?;
            let raw_findings: Vec<RawFinding> = serde_json::from_str(&content)?;
            info!("Normalising {} raw finding(s)", raw_findings.len());

            let normalised = normalise_findings(&raw_findings, Some(&standard));
            println!("{}", serde_json::to_string_pretty(&normalised)?);
        }

        Commands::Report {
            record,
            format,
            output,
            standard,
            fail_on,
            verbose,
        } => {
            init_logging(verbose);
            let record = read_audit_run(&record)?;
            let reference = standard.unwrap_or_else(|| record.standard.standard_id.clone());
            let standard = match resolve_standard(&reference, Path::new(".")) {
                Ok(standard) => Some(standard),
                Err(e) => {
                    warn!("Reporting without criterion titles: {}", e);
                    None
                }
            };
            let report = generate_report(&record, standard.as_ref(), format.into());
            write_output(&report, output.as_deref())?;

            if record.has_compliance_findings_at(fail_on.into()) {
                std::process::exit(1);
            }
        }

        Commands::Standards => {
            for standard in bundled_standards()? {
                println!(
                    "{} (WCAG {}): {} criteria, {} at A, {} at AA",
                    standard.standard_id,
                    standard.wcag_version.as_deref().unwrap_or("?"),
                    standard.len(),
                    standard.at_level(WcagLevel::A).len(),
                    standard.at_level(WcagLevel::AA).len()
                );
            }
        }
    }

    Ok(())
}

/// Write output to file or stdout
fn write_output(content: &str, path: Option<&Path>) -> anyhow::Result<()> {
    match path {
        Some(p) => {
            std::fs::write(p, content)?;
            eprintln!("Report written to {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
