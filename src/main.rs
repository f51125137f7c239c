//! lithology-engine - borehole log interpretation CLI
//!
//! Classifies depth samples, groups them into lithology units and applies
//! interbedding, writing the result as JSON.
//!
//! # Usage
//!
//! ```bash
//! # One borehole, built-in rules, result on stdout
//! lithology-engine --samples bh01.json
//!
//! # Several boreholes in parallel with a project rule table
//! lithology-engine --boreholes project.json --rules lithology_rules.toml --output units.json
//!
//! # Print the built-in rule table as a starting point
//! lithology-engine dump-rules > lithology_rules.toml
//! ```
//!
//! # Environment Variables
//!
//! - `LITHOLOGY_CONFIG`: Engine config TOML (default: ./lithology_config.toml)
//! - `LITHOLOGY_RULES`: Rule table TOML (default: ./lithology_rules.toml)
//! - `RUST_LOG`: Logging level (default: info)

use anyhow::{bail, Context, Result};
use clap::Parser;
use lithology_engine::config::ClassificationMode;
use lithology_engine::{
    run_boreholes, run_pipeline, Borehole, EngineConfig, PipelineOutput, RuleSet, Sample,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "lithology-engine")]
#[command(about = "Lithology classification and interbedding detection for borehole logs")]
#[command(version)]
struct CliArgs {
    /// JSON array of samples: [{"depth": 10.0, "curves": {"gamma": 45.0, "density": 2.4}}, ...]
    #[arg(long, value_name = "JSON", conflicts_with = "boreholes")]
    samples: Option<PathBuf>,

    /// JSON array of boreholes: [{"id": "BH01", "samples": [...]}, ...], processed in parallel
    #[arg(long, value_name = "JSON")]
    boreholes: Option<PathBuf>,

    /// Rule table TOML (default: $LITHOLOGY_RULES, ./lithology_rules.toml, built-in)
    #[arg(long, value_name = "TOML")]
    rules: Option<PathBuf>,

    /// Engine config TOML (default: $LITHOLOGY_CONFIG, ./lithology_config.toml, built-in)
    #[arg(long, value_name = "TOML")]
    config: Option<PathBuf>,

    /// Force samples at or above this depth (m) to "NL"
    #[arg(long, value_name = "METRES")]
    casing_depth: Option<f64>,

    /// Use the two-pass density-then-gamma classifier
    #[arg(long)]
    simple: bool,

    /// Leave unmatched samples as "NL" instead of trying researched defaults
    #[arg(long)]
    no_fallback: bool,

    /// Thin-unit merge threshold (m); 0 or less disables the merge
    #[arg(long, value_name = "METRES")]
    thin_unit_threshold: Option<f64>,

    /// Write JSON here instead of stdout
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<SubCommand>,
}

#[derive(clap::Subcommand, Debug)]
enum SubCommand {
    /// Print the effective engine configuration as TOML
    DumpConfig,
    /// Print the effective rule table as TOML
    DumpRules,
}

// ============================================================================
// Output
// ============================================================================

#[derive(Debug, Serialize)]
struct BoreholeReport {
    id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    output: Option<PipelineOutput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

fn write_json<T: Serialize>(value: &T, output: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize result")?;
    match output {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!(path = %path.display(), "Result written");
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Invalid JSON in {}", path.display()))
}

// ============================================================================
// Setup
// ============================================================================

fn load_config(args: &CliArgs) -> Result<EngineConfig> {
    let mut config = match &args.config {
        Some(path) => EngineConfig::load_from_file(path)?,
        None => EngineConfig::load(),
    };

    if let Some(depth) = args.casing_depth {
        config.classification.casing_depth = Some(depth);
    }
    if args.simple {
        config.classification.mode = ClassificationMode::Simple;
    }
    if args.no_fallback {
        config.classification.fallback = false;
    }
    if let Some(threshold) = args.thin_unit_threshold {
        if threshold <= 0.0 {
            config.merge.thin_units = false;
        } else {
            config.merge.thin_units = true;
            config.merge.thin_unit_threshold = threshold;
        }
    }

    config.validate()?;
    Ok(config)
}

fn load_rules(args: &CliArgs) -> Result<RuleSet> {
    match &args.rules {
        Some(path) => Ok(RuleSet::load_from_file(path)?),
        None => Ok(RuleSet::load()),
    }
}

// ============================================================================
// Main Entry Point
// ============================================================================

fn main() -> Result<()> {
    // Logs go to stderr so JSON on stdout stays clean
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let args = CliArgs::parse();
    let config = load_config(&args)?;
    let rules = load_rules(&args)?;

    match args.command {
        Some(SubCommand::DumpConfig) => {
            print!("{}", config.to_toml()?);
            return Ok(());
        }
        Some(SubCommand::DumpRules) => {
            print!("{}", rules.to_toml()?);
            return Ok(());
        }
        None => {}
    }

    info!(
        mode = ?config.classification.mode,
        rules = rules.rules.len(),
        "Lithology engine starting"
    );

    if let Some(path) = &args.samples {
        let mut samples: Vec<Sample> = read_json(path)?;
        info!(path = %path.display(), samples = samples.len(), "Loaded samples");
        let output = run_pipeline(&mut samples, &rules, &config)
            .with_context(|| format!("Failed to process {}", path.display()))?;
        return write_json(&output, args.output.as_deref());
    }

    if let Some(path) = &args.boreholes {
        let boreholes: Vec<Borehole> = read_json(path)?;
        info!(path = %path.display(), boreholes = boreholes.len(), "Loaded boreholes");
        let reports: Vec<BoreholeReport> = run_boreholes(boreholes, &rules, &config)
            .into_iter()
            .map(|result| match result.result {
                Ok(output) => BoreholeReport {
                    id: result.id,
                    output: Some(output),
                    error: None,
                },
                Err(e) => BoreholeReport {
                    id: result.id,
                    output: None,
                    error: Some(e.to_string()),
                },
            })
            .collect();
        return write_json(&reports, args.output.as_deref());
    }

    bail!("Nothing to do: pass --samples or --boreholes (see --help)")
}
