//! CLI entry point for trailguard.
//!
//! This module is intentionally thin: it handles argument parsing, I/O, and exit codes.
//! All business logic lives in the `trailguard-app` crate.

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use clap::{Parser, Subcommand};
use trailguard_app::{
    EXIT_INPUT_ERROR, EXIT_PASS, ExplainOutput, VerifyInput, error_exit_code, format_explanation,
    format_not_found, parse_report_json, render_annotations, render_markdown, render_text,
    run_explain, run_verify, serialize_report, status_exit_code, to_renderable, write_artifact,
};
use trailguard_evidence::RecordFormat;
use trailguard_settings::{Overrides, RuleSetFormat};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "trailguard",
    version,
    about = "Verify tamper-evident audit trails and database configuration evidence"
)]
struct Cli {
    /// Path to trailguard config TOML. A missing file means defaults.
    #[arg(long, default_value = "trailguard.toml")]
    config: Utf8PathBuf,

    /// Override profile (mysql-baseline|empty).
    #[arg(long)]
    profile: Option<String>,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Verify evidence and write the report artifacts.
    Verify {
        /// Audit trail export (JSON Lines or TSV).
        #[arg(long)]
        records: Option<Utf8PathBuf>,

        /// Export format (jsonl|tsv). Inferred from the file extension when omitted.
        #[arg(long)]
        records_format: Option<String>,

        /// Configuration snapshot (flat JSON object).
        #[arg(long)]
        snapshot: Option<Utf8PathBuf>,

        /// Extra rule-set file (TOML, or JSON by extension).
        #[arg(long)]
        rules: Option<Utf8PathBuf>,

        /// Accept gaps in sequence ids.
        #[arg(long)]
        allow_gaps: bool,

        /// Hex hash the chain must end on.
        #[arg(long)]
        expected_head: Option<String>,

        /// Where to write the JSON report.
        #[arg(long, default_value = "artifacts/trailguard/report.json")]
        report_out: Utf8PathBuf,

        /// Write a Markdown report alongside the JSON.
        #[arg(long)]
        write_markdown: bool,

        /// Where to write the Markdown report (if enabled).
        #[arg(long, default_value = "artifacts/trailguard/comment.md")]
        markdown_out: Utf8PathBuf,
    },

    /// Render markdown from an existing JSON report.
    Md {
        /// Path to the JSON report file.
        #[arg(long, default_value = "artifacts/trailguard/report.json")]
        report: Utf8PathBuf,

        /// Where to write the Markdown output (if not specified, prints to stdout).
        #[arg(long, short)]
        output: Option<Utf8PathBuf>,
    },

    /// Render GitHub Actions annotations from an existing JSON report.
    Annotations {
        /// Path to the JSON report file.
        #[arg(long, default_value = "artifacts/trailguard/report.json")]
        report: Utf8PathBuf,

        /// Maximum number of annotations to emit.
        #[arg(long, default_value = "10")]
        max: usize,
    },

    /// Explain a verifier id or violation code with remediation guidance.
    Explain {
        /// The verifier id (e.g. "audit.chain_integrity") or code (e.g. "chain_break").
        identifier: String,
    },
}

struct VerifyArgs {
    records: Option<Utf8PathBuf>,
    records_format: Option<String>,
    snapshot: Option<Utf8PathBuf>,
    rules: Option<Utf8PathBuf>,
    allow_gaps: bool,
    expected_head: Option<String>,
    report_out: Utf8PathBuf,
    write_markdown: bool,
    markdown_out: Utf8PathBuf,
}

fn main() {
    // Logs go to stderr; stdout carries violation lines and rendered output.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.cmd {
        Commands::Verify {
            records,
            records_format,
            snapshot,
            rules,
            allow_gaps,
            expected_head,
            report_out,
            write_markdown,
            markdown_out,
        } => cmd_verify(
            &cli.config,
            cli.profile,
            VerifyArgs {
                records,
                records_format,
                snapshot,
                rules,
                allow_gaps,
                expected_head,
                report_out,
                write_markdown,
                markdown_out,
            },
        ),
        Commands::Md { report, output } => cmd_md(report, output),
        Commands::Annotations { report, max } => cmd_annotations(report, max),
        Commands::Explain { identifier } => cmd_explain(&identifier),
    };

    let code = match result {
        Ok(code) => code,
        Err(err) => {
            eprintln!("trailguard error: {err:#}");
            error_exit_code(&err)
        }
    };
    std::process::exit(code);
}

fn cmd_verify(config: &Utf8Path, profile: Option<String>, args: VerifyArgs) -> anyhow::Result<i32> {
    let cfg_text = read_optional(config).context("read config")?;

    let rules_text = args
        .rules
        .as_deref()
        .map(|path| {
            std::fs::read_to_string(path)
                .with_context(|| format!("read rule set: {path}"))
                .map(|text| (text, RuleSetFormat::from_extension(path.extension())))
        })
        .transpose()?;

    let records_format = args
        .records_format
        .as_deref()
        .map(|f| {
            RecordFormat::parse(f)
                .with_context(|| format!("unknown records format: {f} (expected jsonl or tsv)"))
        })
        .transpose()?;

    let input = VerifyInput {
        config_text: &cfg_text,
        rules_text: rules_text
            .as_ref()
            .map(|(text, format)| (text.as_str(), *format)),
        overrides: Overrides {
            profile,
            allow_gaps: args.allow_gaps.then_some(true),
            expected_head: args.expected_head,
        },
        records: args.records.as_deref(),
        records_format,
        snapshot: args.snapshot.as_deref(),
    };

    let output = run_verify(input)?;
    let envelope = &output.envelope;

    let data = serialize_report(envelope)?;
    write_artifact(&args.report_out, &data).context("write report json")?;

    let renderable = to_renderable(envelope);
    if args.write_markdown {
        let md = render_markdown(&renderable);
        write_artifact(&args.markdown_out, md.as_bytes()).context("write markdown")?;
    }

    for line in render_text(&renderable) {
        println!("{line}");
    }
    eprintln!(
        "trailguard: {} ({} violation(s)); report written to {}",
        envelope.status,
        renderable.violation_count(),
        args.report_out
    );

    Ok(status_exit_code(envelope.status))
}

/// A missing file reads as empty; any other read failure is an error.
fn read_optional(path: &Utf8Path) -> anyhow::Result<String> {
    match std::fs::read_to_string(path) {
        Ok(text) => Ok(text),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path = %path, "config not found; using defaults");
            Ok(String::new())
        }
        Err(e) => Err(e).with_context(|| format!("read {path}")),
    }
}

fn read_report(path: &Utf8Path) -> anyhow::Result<trailguard_render::RenderableReport> {
    let text =
        std::fs::read_to_string(path).with_context(|| format!("read report: {path}"))?;
    let envelope = parse_report_json(&text)?;
    Ok(to_renderable(&envelope))
}

fn cmd_md(report_path: Utf8PathBuf, output: Option<Utf8PathBuf>) -> anyhow::Result<i32> {
    let renderable = read_report(&report_path)?;
    let md = render_markdown(&renderable);

    if let Some(out_path) = output {
        write_artifact(&out_path, md.as_bytes()).context("write markdown output")?;
    } else {
        print!("{md}");
    }

    Ok(EXIT_PASS)
}

fn cmd_annotations(report_path: Utf8PathBuf, max: usize) -> anyhow::Result<i32> {
    let renderable = read_report(&report_path)?;
    for annotation in render_annotations(&renderable, max) {
        println!("{annotation}");
    }
    Ok(EXIT_PASS)
}

fn cmd_explain(identifier: &str) -> anyhow::Result<i32> {
    match run_explain(identifier) {
        ExplainOutput::Found(exp) => {
            print!("{}", format_explanation(&exp));
            Ok(EXIT_PASS)
        }
        ExplainOutput::NotFound {
            identifier,
            available_verifier_ids,
            available_codes,
        } => {
            eprint!(
                "{}",
                format_not_found(&identifier, available_verifier_ids, available_codes)
            );
            Ok(EXIT_INPUT_ERROR)
        }
    }
}
