//! Row Classification
//!
//! Assigns one lithology code to every depth sample from gamma/density
//! thresholds. Two entry points with different override semantics:
//!
//! - [`classify`]: rules in declaration order, first match wins, a classified
//!   sample is never re-classified.
//! - [`classify_simple`]: density-only pass (first match wins) followed by a
//!   gamma-only pass that overwrites every matching sample (last match wins).
//!
//! In both modes samples at or above the casing depth are forced to "NL" and
//! stay that way.

use crate::config::defaults::NOT_LOGGED;
use crate::types::{CurveMapping, LithologyRule, ParamRange, RuleSet, Sample};
use serde::Serialize;
use tracing::{debug, warn};

/// Options for the standard classification mode.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ClassifyOptions {
    /// Substitute a rule's researched default when its own range is unset
    pub use_researched_defaults: bool,
    /// Samples with depth <= this value are forced to "NL"
    pub casing_depth: Option<f64>,
}

/// Outcome of a classification pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ClassificationStatus {
    Applied,
    /// Classification impossible; samples returned untouched.
    MissingCurves { missing: Vec<String> },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassificationSummary {
    pub status: ClassificationStatus,
    /// Samples carrying a code other than "NL"
    pub classified: usize,
    /// Samples forced to "NL" by the casing cutoff
    pub masked: usize,
    pub not_logged: usize,
}

impl ClassificationSummary {
    fn tally(samples: &[Sample], status: ClassificationStatus, casing_depth: Option<f64>) -> Self {
        let not_logged = samples.iter().filter(|s| s.is_not_logged()).count();
        Self {
            status,
            classified: samples.len() - not_logged,
            masked: samples
                .iter()
                .filter(|s| is_cased(s.depth, casing_depth))
                .count(),
            not_logged,
        }
    }

    fn missing(samples: &[Sample], missing: &[&str]) -> Self {
        Self::tally(
            samples,
            ClassificationStatus::MissingCurves {
                missing: missing.iter().map(|m| (*m).to_string()).collect(),
            },
            None,
        )
    }

    pub fn is_applied(&self) -> bool {
        self.status == ClassificationStatus::Applied
    }
}

/// True when `depth` sits at or above the casing cutoff.
pub fn is_cased(depth: f64, casing_depth: Option<f64>) -> bool {
    casing_depth.is_some_and(|casing| depth <= casing)
}

/// Standard classification, in place.
pub fn classify(
    samples: &mut [Sample],
    rules: &RuleSet,
    mapping: &CurveMapping,
    options: &ClassifyOptions,
) -> ClassificationSummary {
    let curves = match mapping.resolve(samples) {
        Ok(curves) => curves,
        Err(missing) => {
            warn!(?missing, "Required curves absent — samples left unclassified");
            return ClassificationSummary::missing(samples, &missing);
        }
    };

    for sample in samples.iter_mut() {
        sample.lithology = NOT_LOGGED.to_string();
    }

    for rule in rules.rules.iter().filter(|r| !r.is_not_logged()) {
        let (gamma, density) = resolve_ranges(rule, rules, options.use_researched_defaults);
        let mut hits = 0usize;

        for sample in samples.iter_mut() {
            if !sample.is_not_logged() || is_cased(sample.depth, options.casing_depth) {
                continue;
            }
            if gamma.contains(sample.curve(&curves.gamma))
                && density.contains(sample.curve(&curves.density))
            {
                sample.lithology.clone_from(&rule.code);
                hits += 1;
            }
        }

        debug!(code = %rule.code, hits, "Rule applied");
    }

    ClassificationSummary::tally(samples, ClassificationStatus::Applied, options.casing_depth)
}

/// Simple two-pass classification, in place.
pub fn classify_simple(
    samples: &mut [Sample],
    rules: &RuleSet,
    mapping: &CurveMapping,
    casing_depth: Option<f64>,
) -> ClassificationSummary {
    let curves = match mapping.resolve(samples) {
        Ok(curves) => curves,
        Err(missing) => {
            warn!(?missing, "Required curves absent — samples left unclassified");
            return ClassificationSummary::missing(samples, &missing);
        }
    };

    for sample in samples.iter_mut() {
        sample.lithology = NOT_LOGGED.to_string();
    }

    let candidates = || rules.rules.iter().filter(|r| !r.is_not_logged());

    // Pass 1: density only, first match wins
    for rule in candidates().filter(|r| !r.density.is_unconstrained()) {
        for sample in samples.iter_mut() {
            if sample.is_not_logged()
                && !is_cased(sample.depth, casing_depth)
                && rule.density.contains(sample.curve(&curves.density))
            {
                sample.lithology.clone_from(&rule.code);
            }
        }
    }

    // Pass 2: gamma only, overwrites, last match wins
    for rule in candidates().filter(|r| !r.gamma.is_unconstrained()) {
        for sample in samples.iter_mut() {
            if !is_cased(sample.depth, casing_depth)
                && rule.gamma.contains(sample.curve(&curves.gamma))
            {
                sample.lithology.clone_from(&rule.code);
            }
        }
    }

    ClassificationSummary::tally(samples, ClassificationStatus::Applied, casing_depth)
}

/// Effective (gamma, density) ranges for a rule.
fn resolve_ranges(
    rule: &LithologyRule,
    rules: &RuleSet,
    use_researched_defaults: bool,
) -> (ParamRange, ParamRange) {
    if !use_researched_defaults {
        return (rule.gamma, rule.density);
    }
    match rules.researched_default(&rule.code) {
        Some(default) => (
            if rule.gamma.is_unset() { default.gamma } else { rule.gamma },
            if rule.density.is_unset() { default.density } else { rule.density },
        ),
        None => (rule.gamma, rule.density),
    }
}
