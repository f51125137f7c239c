//! Fallback classification for samples no rule matched
//!
//! Two stages, evaluated per "NL" sample:
//! 1. Nearest researched-default centre in normalized (gamma, density) space,
//!    accepted within [`FALLBACK_MAX_DISTANCE`] spans.
//! 2. Extreme-value guards, evaluated top to bottom.

use super::classifier::is_cased;
use crate::config::defaults::{FALLBACK_MAX_DISTANCE, NOT_LOGGED};
use crate::types::{CurveMapping, ResearchedDefault, RuleSet, Sample};
use tracing::{debug, warn};

/// Guard on (gamma, density) paired with the code it assigns.
type ExtremeValueRule = (fn(Option<f64>, Option<f64>) -> bool, &'static str);

/// Order matters: first matching guard wins.
const EXTREME_VALUE_RULES: &[ExtremeValueRule] = &[
    (|_, d| d.is_some_and(|d| d < 1.0), "CO"),
    (|_, d| d.is_some_and(|d| d > 3.5), "IG"),
    (|g, _| g.is_some_and(|g| g > 200.0), "SH"),
    (
        |g, d| matches!((g, d), (Some(g), Some(d)) if g < 10.0 && (2.0..2.7).contains(&d)),
        "SS",
    ),
    (
        |g, d| matches!((g, d), (Some(g), Some(d)) if g < 10.0 && (2.7..=3.0).contains(&d)),
        "LS",
    ),
];

/// Resolve "NL" samples left by the row classifier, in place.
///
/// Returns the number of samples that received a code.
pub fn classify_unresolved(
    samples: &mut [Sample],
    rules: &RuleSet,
    mapping: &CurveMapping,
    casing_depth: Option<f64>,
) -> usize {
    let curves = match mapping.resolve(samples) {
        Ok(curves) => curves,
        Err(missing) => {
            warn!(?missing, "Required curves absent — fallback classification skipped");
            return 0;
        }
    };

    let mut resolved = 0;
    for sample in samples.iter_mut() {
        if !sample.is_not_logged() || is_cased(sample.depth, casing_depth) {
            continue;
        }
        let gamma = sample.curve(&curves.gamma);
        let density = sample.curve(&curves.density);

        if let Some(code) = fallback_code(gamma, density, &rules.researched_defaults) {
            sample.lithology = code.to_string();
            resolved += 1;
        }
    }

    debug!(resolved, "Fallback classification complete");
    resolved
}

/// Code for one (gamma, density) pair, or None to stay "NL".
pub fn fallback_code<'a>(
    gamma: Option<f64>,
    density: Option<f64>,
    defaults: &'a [ResearchedDefault],
) -> Option<&'a str> {
    if let (Some(g), Some(d)) = (gamma, density) {
        if let Some((code, distance)) = nearest_default(g, d, defaults) {
            if distance <= FALLBACK_MAX_DISTANCE {
                return Some(code);
            }
        }
    }

    EXTREME_VALUE_RULES
        .iter()
        .find(|(guard, _)| guard(gamma, density))
        .map(|(_, code)| *code)
}

/// Closest researched-default centre; ties keep the earlier entry.
fn nearest_default(
    gamma: f64,
    density: f64,
    defaults: &[ResearchedDefault],
) -> Option<(&str, f64)> {
    let mut best: Option<(&str, f64)> = None;

    for default in defaults.iter().filter(|d| d.code != NOT_LOGGED) {
        let (Some(gc), Some(gs), Some(dc), Some(ds)) = (
            default.gamma.midpoint(),
            default.gamma.span(),
            default.density.midpoint(),
            default.density.span(),
        ) else {
            continue;
        };
        let gs = if gs > 0.0 { gs } else { 1.0 };
        let ds = if ds > 0.0 { ds } else { 1.0 };
        let distance = ((gamma - gc) / gs).hypot((density - dc) / ds);

        if best.map_or(true, |(_, d)| distance < d) {
            best = Some((default.code.as_str(), distance));
        }
    }

    best
}
