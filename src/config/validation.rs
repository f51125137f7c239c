//! Engine config and rule table checks
//!
//! Loading is two-pass. The raw document is read as a `toml::Value` and its
//! dotted key paths are compared with the known settings; a misspelt key
//! gets the closest known key (Levenshtein distance <= 3) as a suggestion.
//! Only then does serde build the typed value, followed by range checks.
//! Unknown keys warn and never stop a file from loading.

use crate::config::defaults::NOT_LOGGED;
use crate::types::RuleSet;
use std::collections::HashSet;

/// Something worth telling the user that does not stop the run.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub field: String,
    pub message: String,
    pub suggestion: Option<String>,
}

impl std::fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(ref s) = self.suggestion {
            write!(f, " — did you mean '{s}'?")?;
        }
        Ok(())
    }
}

impl ValidationWarning {
    fn suspicious(field: &str, message: String) -> Self {
        Self {
            field: field.to_string(),
            message,
            suggestion: None,
        }
    }
}

// ============================================================================
// Known Config Keys
// ============================================================================

/// Returns the complete set of valid dotted key paths for `EngineConfig`.
///
/// Maintained by hand to match the struct hierarchy in engine_config.rs.
pub fn known_config_keys() -> HashSet<&'static str> {
    let keys: &[&str] = &[
        // [classification]
        "classification",
        "classification.mode",
        "classification.use_researched_defaults",
        "classification.casing_depth",
        "classification.fallback",
        // [curves]
        "curves",
        "curves.gamma",
        "curves.density",
        "curves.short_space_density",
        "curves.long_space_density",
        // [interbedding]
        "interbedding",
        "interbedding.enabled",
        "interbedding.selection",
        "interbedding.max_sequence_length",
        "interbedding.thick_unit_threshold",
        "interbedding.max_layer_thickness",
        "interbedding.min_sequence_units",
        "interbedding.max_scan_iterations",
        // [merge]
        "merge",
        "merge.thin_units",
        "merge.thin_unit_threshold",
    ];
    keys.iter().copied().collect()
}

/// Valid keys of one `[[rule]]` entry.
pub fn known_rule_keys() -> HashSet<&'static str> {
    [
        "code",
        "name",
        "gamma_min",
        "gamma_max",
        "density_min",
        "density_max",
        "qualifier",
        "shade",
        "hue",
        "colour",
        "weathering",
        "strength",
        "bed_spacing",
        "fill",
    ]
    .into_iter()
    .collect()
}

/// Valid keys of one `[[researched_default]]` entry.
pub fn known_researched_default_keys() -> HashSet<&'static str> {
    ["code", "gamma_min", "gamma_max", "density_min", "density_max"]
        .into_iter()
        .collect()
}

// ============================================================================
// TOML Key Walking
// ============================================================================

/// Recursively walks a `toml::Value` tree and collects all dotted key paths.
///
/// For example, a table `{ a = { b = 1, c = 2 } }` yields:
/// `["a", "a.b", "a.c"]`
pub fn walk_toml_keys(value: &toml::Value, prefix: &str) -> Vec<String> {
    let mut keys = Vec::new();
    if let Some(table) = value.as_table() {
        for (k, v) in table {
            let path = if prefix.is_empty() {
                k.clone()
            } else {
                format!("{prefix}.{k}")
            };
            keys.push(path.clone());
            if v.is_table() {
                keys.extend(walk_toml_keys(v, &path));
            }
        }
    }
    keys
}

// ============================================================================
// Levenshtein Distance
// ============================================================================

/// Compute the Levenshtein edit distance between two strings.
fn levenshtein(a: &str, b: &str) -> usize {
    let b_len = b.chars().count();
    if a.is_empty() {
        return b_len;
    }
    if b.is_empty() {
        return a.chars().count();
    }

    let mut prev: Vec<usize> = (0..=b_len).collect();
    let mut curr = vec![0; b_len + 1];

    for (i, ca) in a.chars().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.chars().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b_len]
}

/// Suggest the closest known key for an unknown key, if within edit distance 3.
///
/// Ties resolve alphabetically so suggestions are stable across runs.
pub fn suggest_correction(unknown: &str, known: &HashSet<&str>) -> Option<String> {
    known
        .iter()
        .map(|&k| (k, levenshtein(unknown, k)))
        .filter(|&(_, dist)| dist <= 3)
        .min_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(b.0)))
        .map(|(k, _)| k.to_string())
}

fn unknown_key_warning(key: String, known: &HashSet<&str>, leaf: &str) -> ValidationWarning {
    let suggestion = suggest_correction(leaf, known);
    ValidationWarning {
        message: format!("Unknown config key '{key}'"),
        field: key,
        suggestion,
    }
}

// ============================================================================
// Unknown Key Validation (entry points)
// ============================================================================

/// Parse a raw engine-config TOML string and warn about unknown keys.
///
/// Unknown keys are reported, never rejected.
pub fn validate_unknown_keys(raw_toml: &str) -> Vec<ValidationWarning> {
    let value: toml::Value = match raw_toml.parse() {
        Ok(v) => v,
        Err(_) => return Vec::new(), // parse errors are handled by serde later
    };

    let known = known_config_keys();
    walk_toml_keys(&value, "")
        .into_iter()
        .filter(|key| !known.contains(key.as_str()))
        .map(|key| {
            let leaf = key.clone();
            unknown_key_warning(key, &known, &leaf)
        })
        .collect()
}

/// Parse a raw rule-table TOML string and warn about unknown keys in
/// `[[rule]]` and `[[researched_default]]` entries.
pub fn validate_unknown_rule_keys(raw_toml: &str) -> Vec<ValidationWarning> {
    let value: toml::Value = match raw_toml.parse() {
        Ok(v) => v,
        Err(_) => return Vec::new(),
    };
    let Some(root) = value.as_table() else {
        return Vec::new();
    };

    let mut warnings = Vec::new();
    for (section, entry) in root {
        let known = match section.as_str() {
            "rule" => known_rule_keys(),
            "researched_default" => known_researched_default_keys(),
            _ => {
                let sections: HashSet<&str> = ["rule", "researched_default"].into_iter().collect();
                warnings.push(unknown_key_warning(section.clone(), &sections, section));
                continue;
            }
        };
        let entries = entry.as_array().map(Vec::as_slice).unwrap_or_default();
        for (i, item) in entries.iter().enumerate() {
            let Some(table) = item.as_table() else {
                continue;
            };
            for key in table.keys().filter(|k| !known.contains(k.as_str())) {
                warnings.push(unknown_key_warning(format!("{section}[{i}].{key}"), &known, key));
            }
        }
    }
    warnings
}

// ============================================================================
// Range Validation
// ============================================================================

/// Flag suspicious but legal values on a parsed `EngineConfig`.
///
/// Impossible values are rejected by `EngineConfig::validate` itself.
pub fn validate_ranges(config: &super::EngineConfig) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    if let Some(casing) = config.classification.casing_depth {
        if casing < 0.0 {
            warnings.push(ValidationWarning::suspicious(
                "classification.casing_depth",
                format!("classification.casing_depth = {casing:.2} is negative — no sample will be masked"),
            ));
        }
    }

    let ib = &config.interbedding;
    if ib.max_layer_thickness > 1.0 {
        warnings.push(ValidationWarning::suspicious(
            "interbedding.max_layer_thickness",
            format!(
                "interbedding.max_layer_thickness = {:.2} m is unusually thick for interbedded layers",
                ib.max_layer_thickness
            ),
        ));
    }
    if ib.max_sequence_length > ib.max_scan_iterations {
        warnings.push(ValidationWarning::suspicious(
            "interbedding.max_sequence_length",
            format!(
                "interbedding.max_sequence_length = {} exceeds max_scan_iterations = {}",
                ib.max_sequence_length, ib.max_scan_iterations
            ),
        ));
    }
    if config.merge.thin_unit_threshold > 1.0 {
        warnings.push(ValidationWarning::suspicious(
            "merge.thin_unit_threshold",
            format!(
                "merge.thin_unit_threshold = {:.2} m would merge most units",
                config.merge.thin_unit_threshold
            ),
        ));
    }

    for (name, value) in [
        ("curves.gamma", &config.curves.gamma),
        ("curves.density", &config.curves.density),
    ] {
        if value.as_deref().map_or(true, str::is_empty) {
            warnings.push(ValidationWarning::suspicious(
                name,
                format!("{name} is not mapped — classification will be skipped"),
            ));
        }
    }

    warnings
}

/// Validate a parsed rule set.
///
/// Bound-level problems are rejected while parsing; what is left here are
/// table-level warnings: duplicate codes and catch-all rules that shadow
/// every rule after them.
pub fn validate_rule_set(rules: &RuleSet) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    if rules.rules.iter().all(|r| r.is_not_logged()) {
        warnings.push(ValidationWarning::suspicious(
            "rule",
            "Rule set has no classifying rules — every sample will stay NL".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    for rule in &rules.rules {
        if !seen.insert(rule.code.as_str()) {
            warnings.push(ValidationWarning::suspicious(
                "rule.code",
                format!("Duplicate rule code '{}' — only the first declaration styles units", rule.code),
            ));
        }
    }

    let mut seen = HashSet::new();
    for default in &rules.researched_defaults {
        if !seen.insert(default.code.as_str()) {
            warnings.push(ValidationWarning::suspicious(
                "researched_default.code",
                format!("Duplicate researched default '{}' — only the first is used", default.code),
            ));
        }
    }

    let classifying: Vec<_> = rules.rules.iter().filter(|r| !r.is_not_logged()).collect();
    if let Some(pos) = classifying
        .iter()
        .position(|r| r.gamma.is_unconstrained() && r.density.is_unconstrained())
    {
        if pos + 1 < classifying.len() {
            warnings.push(ValidationWarning::suspicious(
                "rule",
                format!(
                    "Rule '{}' matches every sample; the {} rule(s) after it can only apply with researched defaults",
                    classifying[pos].code,
                    classifying.len() - pos - 1
                ),
            ));
        }
    }

    if rules.researched_defaults.iter().any(|d| d.code == NOT_LOGGED) {
        warnings.push(ValidationWarning::suspicious(
            "researched_default.code",
            "Researched default for NL is ignored by the fallback classifier".to_string(),
        ));
    }

    warnings
}
