//! Developer tasks (schema generation, fixture conformance, explain coverage).
//!
//! Keeping this separate avoids bloating the end-user CLI.

use anyhow::{Context, bail};
use schemars::schema_for;
use std::fs;
use std::path::{Path, PathBuf};
use trailguard_test_util::normalize_nondeterministic;
use trailguard_types::explain;

/// Get the project root (parent of xtask directory).
fn project_root() -> PathBuf {
    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR")
        .map(PathBuf::from)
        .or_else(|_| std::env::current_dir())
        .unwrap_or_else(|_| PathBuf::from("."));

    if manifest_dir.ends_with("xtask")
        && let Some(parent) = manifest_dir.parent()
    {
        return parent.to_path_buf();
    }
    manifest_dir
}

fn schemas_dir() -> PathBuf {
    project_root().join("schemas")
}

fn fixtures_dir() -> PathBuf {
    project_root().join("tests").join("fixtures")
}

/// Schema definition with its target filename.
struct SchemaSpec {
    filename: &'static str,
    generate: fn() -> schemars::Schema,
}

fn generate_report_schema() -> schemars::Schema {
    schema_for!(trailguard_types::ReportEnvelope)
}

fn generate_config_schema() -> schemars::Schema {
    schema_for!(trailguard_settings::TrailguardConfigV1)
}

fn generate_rules_schema() -> schemars::Schema {
    schema_for!(trailguard_settings::RuleSetV1)
}

fn schema_specs() -> Vec<SchemaSpec> {
    vec![
        SchemaSpec {
            filename: "trailguard.report.v1.json",
            generate: generate_report_schema,
        },
        SchemaSpec {
            filename: "trailguard.config.v1.json",
            generate: generate_config_schema,
        },
        SchemaSpec {
            filename: "trailguard.rules.v1.json",
            generate: generate_rules_schema,
        },
    ]
}

/// Serialize a schema to pretty-printed JSON with trailing newline.
fn serialize_schema(schema: &schemars::Schema) -> anyhow::Result<String> {
    let mut json = serde_json::to_string_pretty(schema).context("Failed to serialize schema")?;
    json.push('\n');
    Ok(json)
}

fn emit_schemas() -> anyhow::Result<()> {
    let dir = schemas_dir();
    fs::create_dir_all(&dir).context("Failed to create schemas directory")?;

    for entry in schema_specs() {
        let json = serialize_schema(&(entry.generate)())?;
        let path = dir.join(entry.filename);
        fs::write(&path, &json)
            .with_context(|| format!("Failed to write schema to {}", path.display()))?;
        println!("Wrote {}", path.display());
    }

    println!("\nSchemas emitted successfully.");
    Ok(())
}

/// Validate that schemas in the repo match what would be generated.
fn validate_schemas() -> anyhow::Result<()> {
    let dir = schemas_dir();
    let mut missing = Vec::new();
    let mut mismatched = Vec::new();

    for entry in schema_specs() {
        let path = dir.join(entry.filename);
        if !path.exists() {
            missing.push(entry.filename);
            continue;
        }

        let expected = serialize_schema(&(entry.generate)())?;
        let actual = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        if expected != actual {
            mismatched.push(entry.filename);
        }
    }

    if missing.is_empty() && mismatched.is_empty() {
        println!("All schemas are up to date.");
        return Ok(());
    }
    if !missing.is_empty() {
        eprintln!("Missing schemas:");
        for name in &missing {
            eprintln!("  - {name}");
        }
    }
    if !mismatched.is_empty() {
        eprintln!("Schemas out of date:");
        for name in &mismatched {
            eprintln!("  - {name}");
        }
    }
    eprintln!("\nRun `cargo xtask emit-schemas` to regenerate.");
    bail!("Schema validation failed")
}

fn print_help() {
    eprintln!("xtask commands:");
    eprintln!("  help              Show this message");
    eprintln!("  emit-schemas      Generate JSON schemas from Rust types to schemas/");
    eprintln!("  validate-schemas  Check if schemas/ matches generated output (for CI)");
    eprintln!("  print-schema-ids  Print known schema IDs");
    eprintln!("  conform           Validate golden fixture reports against the report schema");
    eprintln!("  conform-full      conform, then run the trailguard binary on every fixture");
    eprintln!("  explain-coverage  Validate all verifier IDs and codes have explanations");
}

/// Token pattern for violation codes.
fn is_valid_token(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_lowercase() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

fn compile_report_schema() -> anyhow::Result<jsonschema::Validator> {
    let schema_value = serde_json::to_value(generate_report_schema())
        .context("Failed to serialize report schema")?;
    jsonschema::draft202012::new(&schema_value)
        .map_err(|e| anyhow::anyhow!("Failed to compile schema: {e}"))
}

/// Fixture directories in name order.
fn fixture_dirs() -> anyhow::Result<Vec<PathBuf>> {
    let mut dirs = Vec::new();
    for entry in fs::read_dir(fixtures_dir()).context("Failed to read tests/fixtures/")? {
        let path = entry?.path();
        if path.is_dir() && path.join("expected.report.json").exists() {
            dirs.push(path);
        }
    }
    dirs.sort();
    Ok(dirs)
}

fn fixture_name(dir: &Path) -> String {
    dir.file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string()
}

fn read_json(path: &Path) -> anyhow::Result<serde_json::Value> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse {} as JSON", path.display()))
}

/// Validate golden reports.
///
/// This checks:
/// 1. Schema validation against the generated `trailguard.report.v1` schema
/// 2. Code hygiene: every violation code is a snake_case token with an explanation
fn conform() -> anyhow::Result<()> {
    let compiled = compile_report_schema()?;
    println!("✓ trailguard.report.v1 schema compiles");

    let mut errors = Vec::new();
    let dirs = fixture_dirs()?;
    for dir in &dirs {
        let name = fixture_name(dir);
        let value = read_json(&dir.join("expected.report.json"))?;

        for err in compiled.iter_errors(&value) {
            errors.push(format!("{name}: schema validation: {err}"));
        }

        let reports = value
            .get("reports")
            .and_then(|v| v.as_array())
            .map(Vec::as_slice)
            .unwrap_or_default();
        for (i, report) in reports.iter().enumerate() {
            let violations = report
                .get("violations")
                .and_then(|v| v.as_array())
                .map(Vec::as_slice)
                .unwrap_or_default();
            for (j, v) in violations.iter().enumerate() {
                let code = v.get("code").and_then(|c| c.as_str()).unwrap_or_default();
                if !is_valid_token(code) {
                    errors.push(format!(
                        "{name}: reports[{i}].violations[{j}].code '{code}' is not a valid token"
                    ));
                } else if explain::lookup_explanation(code).is_none() {
                    errors.push(format!(
                        "{name}: reports[{i}].violations[{j}].code '{code}' has no explanation"
                    ));
                }
            }
        }

        println!("  ✓ {name} validates");
    }

    if dirs.is_empty() {
        bail!("No golden fixtures found in {}", fixtures_dir().display());
    }
    if !errors.is_empty() {
        eprintln!("\nConformance errors:");
        for err in &errors {
            eprintln!("  - {err}");
        }
        bail!("Conformance validation failed with {} errors", errors.len());
    }

    println!("\n✓ All {} golden fixtures pass conformance checks!", dirs.len());
    Ok(())
}

/// Full conformance: golden fixtures plus trailguard binary output.
///
/// Runs the built binary on every fixture, validates the produced report
/// against the schema and compares it with the golden file.
fn conform_full() -> anyhow::Result<()> {
    conform()?;

    println!("\n--- Full conformance: trailguard binary output ---\n");

    let compiled = compile_report_schema()?;
    let bin = project_root().join("target").join("debug").join("trailguard");
    #[cfg(target_os = "windows")]
    let bin = bin.with_extension("exe");

    if !bin.exists() {
        bail!(
            "trailguard binary not found at {}.\n\
            Run `cargo build -p trailguard-cli` first.",
            bin.display()
        );
    }

    let mut errors = Vec::new();
    for dir in fixture_dirs()? {
        let name = fixture_name(&dir);
        let temp_dir = tempfile::tempdir().context("Failed to create temp dir")?;
        let report_out = temp_dir.path().join("report.json");

        let mut cmd = std::process::Command::new(&bin);
        cmd.arg("--config")
            .arg(dir.join("trailguard.toml"))
            .arg("verify")
            .arg("--report-out")
            .arg(&report_out);
        for records in ["records.jsonl", "records.tsv"] {
            if dir.join(records).exists() {
                cmd.arg("--records").arg(dir.join(records));
            }
        }
        if dir.join("snapshot.json").exists() {
            cmd.arg("--snapshot").arg(dir.join("snapshot.json"));
        }

        let output = cmd
            .output()
            .with_context(|| format!("Failed to run trailguard on fixture '{name}'"))?;
        // Verdict exit codes are 0..=2; 3 and 4 mean no report was produced.
        if !matches!(output.status.code(), Some(0..=2)) {
            errors.push(format!(
                "fixture '{name}': trailguard exited with {:?}: {}",
                output.status.code(),
                String::from_utf8_lossy(&output.stderr)
            ));
            continue;
        }

        let report = read_json(&report_out)?;
        for err in compiled.iter_errors(&report) {
            errors.push(format!("fixture '{name}': schema validation: {err}"));
        }

        let golden = read_json(&dir.join("expected.report.json"))?;
        if normalize_nondeterministic(report) != normalize_nondeterministic(golden) {
            errors.push(format!(
                "fixture '{name}': output differs from golden file expected.report.json"
            ));
        } else {
            println!("  ✓ fixture '{name}' matches golden report");
        }
    }

    if !errors.is_empty() {
        eprintln!("\nFull conformance errors:");
        for err in &errors {
            eprintln!("  - {err}");
        }
        bail!(
            "Full conformance validation failed with {} errors",
            errors.len()
        );
    }

    println!("\n✓ Full conformance checks passed!");
    Ok(())
}

/// Validate that all verifier IDs and codes have explanations.
fn explain_coverage() -> anyhow::Result<()> {
    let verifier_ids = explain::all_verifier_ids();
    let codes = explain::all_codes();

    let mut errors = Vec::new();
    for (kind, id) in verifier_ids
        .iter()
        .map(|id| ("Verifier", id))
        .chain(codes.iter().map(|c| ("Code", c)))
    {
        match explain::lookup_explanation(id) {
            Some(exp) => {
                for (field, text) in [
                    ("title", exp.title),
                    ("description", exp.description),
                    ("remediation", exp.remediation),
                ] {
                    if text.is_empty() {
                        errors.push(format!("{kind} '{id}' has empty {field}"));
                    }
                }
            }
            None => errors.push(format!("{kind} '{id}' has no explanation")),
        }
    }

    if errors.is_empty() {
        println!("✓ {} verifier IDs have explanations", verifier_ids.len());
        println!("✓ {} codes have explanations", codes.len());
        println!("\n✓ All explain coverage checks passed!");
        Ok(())
    } else {
        for error in &errors {
            eprintln!("  - {error}");
        }
        bail!(
            "Explain coverage validation failed with {} errors",
            errors.len()
        )
    }
}

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let cmd = args.get(1).map(|s| s.as_str()).unwrap_or("help");

    match cmd {
        "help" | "--help" | "-h" => {
            print_help();
            Ok(())
        }
        "emit-schemas" => emit_schemas(),
        "validate-schemas" => validate_schemas(),
        "conform" => conform(),
        "conform-full" => conform_full(),
        "explain-coverage" => explain_coverage(),
        "print-schema-ids" => {
            println!("{}", trailguard_types::SCHEMA_REPORT_V1);
            println!("{}", trailguard_settings::SCHEMA_CONFIG_V1);
            println!("{}", trailguard_settings::SCHEMA_RULES_V1);
            Ok(())
        }
        other => bail!("unknown xtask command: {other}\n\nRun `cargo xtask help` for usage."),
    }
    .context("xtask failed")
}
