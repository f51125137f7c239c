//! Config Validation Tests
//!
//! Typo detection and range validation for the engine config and the
//! lithology rule table, including loading both from disk.

use lithology_engine::config::validation::{
    known_config_keys, suggest_correction, validate_rule_set, validate_unknown_keys,
    validate_unknown_rule_keys,
};
use lithology_engine::config::{CandidateSelection, ClassificationMode, ConfigError, EngineConfig};
use lithology_engine::{LithologyRule, ParamRange, RuleSet};
use std::io::Write;

// ============================================================================
// Typo Detection
// ============================================================================

#[test]
fn typo_in_interbedding_key_warns_with_suggestion() {
    let toml_str = r#"
[interbedding]
max_sequnce_length = 8
"#;
    let warnings = validate_unknown_keys(toml_str);
    assert_eq!(warnings.len(), 1, "Expected exactly 1 warning");
    assert!(warnings[0].field.contains("max_sequnce_length"));
    assert_eq!(
        warnings[0].suggestion.as_deref(),
        Some("interbedding.max_sequence_length")
    );
}

#[test]
fn valid_config_produces_zero_warnings() {
    let toml_str = r#"
[classification]
mode = "simple"
use_researched_defaults = false
casing_depth = 12.5
fallback = false

[curves]
gamma = "GR"
density = "RHOB"

[interbedding]
selection = "none"
max_sequence_length = 8

[merge]
thin_unit_threshold = 0.1
"#;
    assert!(validate_unknown_keys(toml_str).is_empty());
}

#[test]
fn far_off_key_gets_no_suggestion() {
    let known = known_config_keys();
    assert_eq!(suggest_correction("completely_unrelated_section", &known), None);
}

#[test]
fn typo_in_rule_entry_reports_index() {
    let toml_str = r#"
[[rule]]
code = "CO"
gamma_min = 0.0
gamma_max = 60.0

[[rule]]
code = "SS"
gama_min = 20.0
"#;
    let warnings = validate_unknown_rule_keys(toml_str);
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].field, "rule[1].gama_min");
    assert_eq!(warnings[0].suggestion.as_deref(), Some("gamma_min"));
}

// ============================================================================
// Range Validation
// ============================================================================

#[test]
fn defaults_pass_validation() {
    assert!(EngineConfig::default().validate().is_ok());
}

#[test]
fn all_range_errors_are_reported_together() {
    let toml_str = r#"
[interbedding]
thick_unit_threshold = 0.0
max_layer_thickness = -0.2
"#;
    match EngineConfig::from_toml_str(toml_str) {
        Err(ConfigError::Validation(errors)) => {
            assert_eq!(errors.len(), 2, "{errors:?}");
            assert!(errors.iter().any(|e| e.contains("thick_unit_threshold")));
            assert!(errors.iter().any(|e| e.contains("max_layer_thickness")));
        }
        other => panic!("Expected validation error, got {other:?}"),
    }
}

#[test]
fn sequence_length_below_minimum_rejected() {
    let toml_str = r#"
[interbedding]
max_sequence_length = 3
"#;
    assert!(matches!(
        EngineConfig::from_toml_str(toml_str),
        Err(ConfigError::Validation(_))
    ));
}

#[test]
fn duplicate_rule_codes_only_warn() {
    let mut rules = RuleSet::builtin();
    rules.rules.push(LithologyRule::new(
        "CO",
        "Coal (dull)",
        ParamRange::Bounded { min: 0.0, max: 80.0 },
        ParamRange::Unconstrained,
    ));
    let warnings = validate_rule_set(&rules);
    assert!(warnings.iter().any(|w| w.message.contains("Duplicate rule code 'CO'")));
}

#[test]
fn builtin_rules_are_clean() {
    assert!(validate_rule_set(&RuleSet::builtin()).is_empty());
}

// ============================================================================
// Loading From Disk
// ============================================================================

#[test]
fn config_file_overrides_defaults() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
[classification]
mode = "simple"
casing_depth = 8.0

[interbedding]
selection = "none"
"#
    )
    .unwrap();

    let config = EngineConfig::load_from_file(file.path()).unwrap();
    assert_eq!(config.classification.mode, ClassificationMode::Simple);
    assert_eq!(config.classification.casing_depth, Some(8.0));
    assert_eq!(config.interbedding.selection, CandidateSelection::None);
    // Untouched sections keep their defaults
    assert_eq!(config.interbedding.max_sequence_length, 10);
    assert!(config.merge.thin_units);
}

#[test]
fn missing_config_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = EngineConfig::load_from_file(&dir.path().join("absent.toml"));
    assert!(matches!(result, Err(ConfigError::Io(..))));
}

#[test]
fn malformed_config_reports_path() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[interbedding\nenabled = true").unwrap();

    match EngineConfig::load_from_file(file.path()) {
        Err(ConfigError::Parse(path, _)) => assert_eq!(path, file.path()),
        other => panic!("Expected parse error, got {other:?}"),
    }
}

#[test]
fn rule_file_loads_in_declaration_order() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
[[rule]]
code = "CO"
name = "Coal"
gamma_min = 0.0
gamma_max = 60.0
density_min = 1.0
density_max = 1.8
colour = "BK"

[[rule]]
code = "IG"
name = "Igneous"
density_min = 2.85
density_max = 3.3

[[rule]]
code = "NL"
name = "Not Logged"
"#
    )
    .unwrap();

    let rules = RuleSet::load_from_file(file.path()).unwrap();
    let codes: Vec<&str> = rules.rules.iter().map(|r| r.code.as_str()).collect();
    assert_eq!(codes, vec!["CO", "IG", "NL"]);
    assert_eq!(rules.rules[1].gamma, ParamRange::Unconstrained);
    assert_eq!(rules.rules[0].colour, "BK");
    assert!(rules.researched_defaults.is_empty());
}

#[test]
fn half_sentinel_rule_fails_to_load() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
[[rule]]
code = "SS"
gamma_min = -999.25
gamma_max = 75.0
"#
    )
    .unwrap();

    assert!(matches!(
        RuleSet::load_from_file(file.path()),
        Err(ConfigError::Parse(..))
    ));
}

#[test]
fn dumped_config_loads_back() {
    let mut config = EngineConfig::default();
    config.classification.casing_depth = Some(12.5);
    config.merge.thin_units = false;

    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "{}", config.to_toml().unwrap()).unwrap();

    assert_eq!(EngineConfig::load_from_file(file.path()).unwrap(), config);
}
