//! Depth samples and curve-name resolution

use crate::config::defaults::{INVALID_DATA_VALUE, NOT_LOGGED};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One depth-indexed log sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Depth (m)
    pub depth: f64,
    /// Curve values keyed by the log's own curve names
    #[serde(default)]
    pub curves: BTreeMap<String, f64>,
    /// Assigned lithology code
    #[serde(default = "not_logged")]
    pub lithology: String,
}

fn not_logged() -> String {
    NOT_LOGGED.to_string()
}

impl Sample {
    pub fn new(depth: f64) -> Self {
        Self {
            depth,
            curves: BTreeMap::new(),
            lithology: not_logged(),
        }
    }

    pub fn with_curve(mut self, name: &str, value: f64) -> Self {
        self.curves.insert(name.to_string(), value);
        self
    }

    /// Curve value, treating NaN and the -999.25 null as missing.
    pub fn curve(&self, name: &str) -> Option<f64> {
        self.curves
            .get(name)
            .copied()
            .filter(|v| v.is_finite() && (v - INVALID_DATA_VALUE).abs() > 1e-9)
    }

    pub fn is_not_logged(&self) -> bool {
        self.lithology == NOT_LOGGED
    }
}

/// Mapping from standardized curve names to the log's curve names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurveMapping {
    pub gamma: Option<String>,
    pub density: Option<String>,
    pub short_space_density: Option<String>,
    pub long_space_density: Option<String>,
}

impl Default for CurveMapping {
    fn default() -> Self {
        Self {
            gamma: Some("gamma".to_string()),
            density: Some("density".to_string()),
            short_space_density: Some("short_space_density".to_string()),
            long_space_density: Some("long_space_density".to_string()),
        }
    }
}

/// Curve names actually used for classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCurves {
    pub gamma: String,
    pub density: String,
}

impl CurveMapping {
    pub fn new(gamma: &str, density: &str) -> Self {
        Self {
            gamma: Some(gamma.to_string()),
            density: Some(density.to_string()),
            short_space_density: None,
            long_space_density: None,
        }
    }

    /// Resolve gamma and density against the columns present in `samples`.
    ///
    /// Density priority: primary, then short-space, then long-space. Returns the
    /// standardized names of whatever could not be resolved.
    pub fn resolve(&self, samples: &[Sample]) -> Result<ResolvedCurves, Vec<&'static str>> {
        let present = |name: &Option<String>| {
            name.as_ref()
                .filter(|n| has_column(samples, n))
                .cloned()
        };

        let gamma = present(&self.gamma);
        let density = present(&self.density)
            .or_else(|| present(&self.short_space_density))
            .or_else(|| present(&self.long_space_density));

        match (gamma, density) {
            (Some(gamma), Some(density)) => Ok(ResolvedCurves { gamma, density }),
            (gamma, density) => {
                let mut missing = Vec::new();
                if gamma.is_none() {
                    missing.push("gamma");
                }
                if density.is_none() {
                    missing.push("density");
                }
                Err(missing)
            }
        }
    }
}

/// A column exists when at least one sample carries a value under that name.
pub fn has_column(samples: &[Sample], name: &str) -> bool {
    samples.iter().any(|s| s.curves.contains_key(name))
}
