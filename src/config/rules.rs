//! Lithology rule table loader
//!
//! Loads ordered `[[rule]]` and `[[researched_default]]` entries from TOML.
//! Search order: `$LITHOLOGY_RULES` env var → `./lithology_rules.toml` → built-in set.

use super::ConfigError;
use crate::types::RuleSet;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming the rule table file.
pub const RULES_ENV_VAR: &str = "LITHOLOGY_RULES";

/// Rule table looked up in the working directory.
pub const LOCAL_RULES_FILE: &str = "lithology_rules.toml";

impl RuleSet {
    /// Load rules searching:
    /// 1. `$LITHOLOGY_RULES` env var
    /// 2. `./lithology_rules.toml` in CWD
    /// 3. The built-in coal-measures rule set
    pub fn load() -> Self {
        if let Ok(path) = std::env::var(RULES_ENV_VAR) {
            let p = PathBuf::from(&path);
            if p.exists() {
                match Self::load_from_file(&p) {
                    Ok(rules) => return rules,
                    Err(e) => warn!(path = %p.display(), error = %e, "Failed to load rule table, falling back"),
                }
            } else {
                warn!(path = %p.display(), "{RULES_ENV_VAR} file not found");
            }
        }

        let local = PathBuf::from(LOCAL_RULES_FILE);
        if local.exists() {
            match Self::load_from_file(&local) {
                Ok(rules) => return rules,
                Err(e) => warn!(error = %e, "Failed to load ./{LOCAL_RULES_FILE}, using built-in rules"),
            }
        }

        info!("No rule table found — using built-in coal-measures rules");
        Self::builtin()
    }

    /// Load and validate a rule table from a TOML file.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        let rules = Self::from_toml_str(&contents).map_err(|e| match e {
            ConfigError::Parse(_, inner) => ConfigError::Parse(path.to_path_buf(), inner),
            other => other,
        })?;
        info!(
            path = %path.display(),
            rules = rules.rules.len(),
            researched_defaults = rules.researched_defaults.len(),
            "Loaded lithology rules"
        );
        Ok(rules)
    }

    /// Parse a rule table. Bound errors (inverted ranges, half sentinels)
    /// fail the parse; table-level issues only warn.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        for w in super::validation::validate_unknown_rule_keys(contents) {
            warn!("{}", w);
        }

        let rules: Self =
            toml::from_str(contents).map_err(|e| ConfigError::Parse(PathBuf::new(), e))?;

        for w in super::validation::validate_rule_set(&rules) {
            warn!("{}", w);
        }
        Ok(rules)
    }

    /// Serialize the rule table back to TOML, sentinels included.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::Serialize)
    }
}
