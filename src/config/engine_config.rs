//! Engine Configuration - classification, interbedding and merge settings as TOML values
//!
//! Every tunable threshold of the engine is a field in this module. Each
//! struct implements `Default` with values matching `config::defaults`, so a
//! run without a config file behaves identically to one with an empty file.

use super::defaults::{
    MAX_INTERBED_LAYER_THICKNESS_M, MAX_SCAN_ITERATIONS, MAX_SEQUENCE_LENGTH, MIN_SEQUENCE_UNITS,
    THICK_UNIT_THRESHOLD_M, THIN_UNIT_THRESHOLD_M,
};
use crate::types::CurveMapping;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming the engine config file.
pub const CONFIG_ENV_VAR: &str = "LITHOLOGY_CONFIG";

/// Config file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "lithology_config.toml";

// ============================================================================
// Top-Level Config
// ============================================================================

/// Root configuration for one engine run.
///
/// Load with `EngineConfig::load()` which searches:
/// 1. `$LITHOLOGY_CONFIG` env var
/// 2. `./lithology_config.toml`
/// 3. Built-in defaults
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Row / fallback classification
    #[serde(default)]
    pub classification: ClassificationConfig,

    /// Standardized curve name → log curve name
    #[serde(default)]
    pub curves: CurveMapping,

    /// Interbedding detection and application
    #[serde(default)]
    pub interbedding: InterbeddingConfig,

    /// Post-hoc section merging
    #[serde(default)]
    pub merge: MergeConfig,
}

impl EngineConfig {
    /// Load configuration using the standard search order:
    /// 1. `$LITHOLOGY_CONFIG` environment variable
    /// 2. `./lithology_config.toml` in the current working directory
    /// 3. Built-in defaults
    pub fn load() -> Self {
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            let p = PathBuf::from(&path);
            if p.exists() {
                match Self::load_from_file(&p) {
                    Ok(config) => {
                        info!(path = %p.display(), "Loaded engine config from {CONFIG_ENV_VAR}");
                        return config;
                    }
                    Err(e) => {
                        warn!(path = %p.display(), error = %e, "Failed to load config from {CONFIG_ENV_VAR}, falling back");
                    }
                }
            } else {
                warn!(path = %path, "{CONFIG_ENV_VAR} points to non-existent file, falling back");
            }
        }

        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.exists() {
            match Self::load_from_file(&local) {
                Ok(config) => {
                    info!("Loaded engine config from ./{LOCAL_CONFIG_FILE}");
                    return config;
                }
                Err(e) => {
                    warn!(error = %e, "Failed to load ./{LOCAL_CONFIG_FILE}, using defaults");
                }
            }
        }

        info!("No {LOCAL_CONFIG_FILE} found — using built-in defaults");
        Self::default()
    }

    /// Load from a specific TOML file path.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        Self::from_toml_str(&contents).map_err(|e| match e {
            ConfigError::Parse(_, inner) => ConfigError::Parse(path.to_path_buf(), inner),
            other => other,
        })
    }

    /// Parse and validate a TOML document.
    ///
    /// Unknown keys only produce warnings; existing files keep loading.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        for w in super::validation::validate_unknown_keys(contents) {
            warn!("{}", w);
        }

        let config: Self =
            toml::from_str(contents).map_err(|e| ConfigError::Parse(PathBuf::new(), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the current config to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::Serialize)
    }

    /// Validate all settings for internal consistency.
    ///
    /// Every problem is collected so a single run reports all of them.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors: Vec<String> = Vec::new();

        if let Some(casing) = self.classification.casing_depth {
            if !casing.is_finite() {
                errors.push(format!(
                    "classification.casing_depth must be finite, got {casing}"
                ));
            }
        }

        let ib = &self.interbedding;
        Self::check_positive(ib.thick_unit_threshold, "interbedding.thick_unit_threshold", &mut errors);
        Self::check_positive(ib.max_layer_thickness, "interbedding.max_layer_thickness", &mut errors);
        if ib.min_sequence_units < 4 {
            errors.push(format!(
                "interbedding.min_sequence_units ({}) must be >= 4 (two cycles of two lithologies)",
                ib.min_sequence_units
            ));
        }
        if ib.max_sequence_length < ib.min_sequence_units {
            errors.push(format!(
                "interbedding.max_sequence_length ({}) must be >= min_sequence_units ({})",
                ib.max_sequence_length, ib.min_sequence_units
            ));
        }
        if ib.max_scan_iterations == 0 {
            errors.push("interbedding.max_scan_iterations must be > 0".to_string());
        }

        Self::check_positive(self.merge.thin_unit_threshold, "merge.thin_unit_threshold", &mut errors);

        for w in &super::validation::validate_ranges(self) {
            warn!("{}", w);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    fn check_positive(value: f64, name: &str, errors: &mut Vec<String>) {
        // NaN fails every comparison, so test finiteness first
        if !value.is_finite() || value <= 0.0 {
            errors.push(format!("{name} must be a finite number > 0, got {value}"));
        }
    }
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(PathBuf, std::io::Error),
    Parse(PathBuf, toml::de::Error),
    Serialize(toml::ser::Error),
    Validation(Vec<String>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(path, e) => write!(f, "Config I/O error ({}): {}", path.display(), e),
            ConfigError::Parse(path, e) => {
                write!(f, "Config parse error ({}): {}", path.display(), e)
            }
            ConfigError::Serialize(e) => write!(f, "Config serialization error: {}", e),
            ConfigError::Validation(errors) => {
                writeln!(f, "Config validation failed:")?;
                for e in errors {
                    writeln!(f, "  - {}", e)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Classification
// ============================================================================

/// Which row classifier to run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassificationMode {
    /// Gamma AND density, first matching rule wins
    #[default]
    Standard,
    /// Density pass, then gamma pass that overwrites (last match wins)
    Simple,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationConfig {
    #[serde(default)]
    pub mode: ClassificationMode,

    /// Use researched defaults for rules whose own range is unset
    #[serde(default = "default_true")]
    pub use_researched_defaults: bool,

    /// Samples at or above this depth (m) are forced to "NL"
    #[serde(default)]
    pub casing_depth: Option<f64>,

    /// Run the nearest-centre / extreme-value fallback on unresolved samples
    #[serde(default = "default_true")]
    pub fallback: bool,
}

impl Default for ClassificationConfig {
    fn default() -> Self {
        Self {
            mode: ClassificationMode::default(),
            use_researched_defaults: true,
            casing_depth: None,
            fallback: true,
        }
    }
}

fn default_true() -> bool {
    true
}

// ============================================================================
// Interbedding
// ============================================================================

/// Which detected candidates the pipeline applies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateSelection {
    /// Detect only; the caller picks candidates and calls the applier itself
    None,
    /// Apply every detected candidate
    #[default]
    All,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterbeddingConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default)]
    pub selection: CandidateSelection,

    /// Maximum units collected by one alternating-sequence walk
    #[serde(default = "default_max_sequence_length")]
    pub max_sequence_length: usize,

    /// Same-code running thickness that ends a walk (m)
    #[serde(default = "default_thick_unit_threshold")]
    pub thick_unit_threshold: f64,

    /// Units at or above this thickness end a walk (m)
    #[serde(default = "default_max_layer_thickness")]
    pub max_layer_thickness: f64,

    #[serde(default = "default_min_sequence_units")]
    pub min_sequence_units: usize,

    /// Hard cap on outer scan iterations
    #[serde(default = "default_max_scan_iterations")]
    pub max_scan_iterations: usize,
}

impl Default for InterbeddingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            selection: CandidateSelection::default(),
            max_sequence_length: MAX_SEQUENCE_LENGTH,
            thick_unit_threshold: THICK_UNIT_THRESHOLD_M,
            max_layer_thickness: MAX_INTERBED_LAYER_THICKNESS_M,
            min_sequence_units: MIN_SEQUENCE_UNITS,
            max_scan_iterations: MAX_SCAN_ITERATIONS,
        }
    }
}

fn default_max_sequence_length() -> usize {
    MAX_SEQUENCE_LENGTH
}
fn default_thick_unit_threshold() -> f64 {
    THICK_UNIT_THRESHOLD_M
}
fn default_max_layer_thickness() -> f64 {
    MAX_INTERBED_LAYER_THICKNESS_M
}
fn default_min_sequence_units() -> usize {
    MIN_SEQUENCE_UNITS
}
fn default_max_scan_iterations() -> usize {
    MAX_SCAN_ITERATIONS
}

// ============================================================================
// Merge
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergeConfig {
    /// Run the thin-unit merge pass
    #[serde(default = "default_true")]
    pub thin_units: bool,

    /// Units thinner than this absorb a following same-lithology unit (m)
    #[serde(default = "default_thin_unit_threshold")]
    pub thin_unit_threshold: f64,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            thin_units: true,
            thin_unit_threshold: THIN_UNIT_THRESHOLD_M,
        }
    }
}

fn default_thin_unit_threshold() -> f64 {
    THIN_UNIT_THRESHOLD_M
}
