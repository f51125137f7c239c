//! Interbedding Application
//!
//! Replaces the original units of selected candidates with one row per
//! lithology component, then merges depth-adjacent interbedded groups.

use super::merger::merge_adjacent_interbedded;
use crate::config::defaults::DEPTH_TOLERANCE_M;
use crate::types::{InterbeddingCandidate, LithologyUnit, RuleSet};
use tracing::{debug, warn};

/// Apply the candidates at `selected` (indices into `candidates`).
///
/// Out-of-range indices and candidates overlapping an already applied one
/// are skipped with a warning.
pub fn apply_interbedding(
    units: &[LithologyUnit],
    candidates: &[InterbeddingCandidate],
    selected: &[usize],
    rules: &RuleSet,
) -> Vec<LithologyUnit> {
    let mut chosen: Vec<&InterbeddingCandidate> = Vec::with_capacity(selected.len());
    for &index in selected {
        match candidates.get(index) {
            Some(candidate) => chosen.push(candidate),
            None => warn!(index, available = candidates.len(), "Ignoring unknown candidate index"),
        }
    }
    chosen.sort_by(|a, b| a.from_depth.total_cmp(&b.from_depth));
    chosen.dedup_by(|a, b| std::ptr::eq(*a, *b));

    let mut output = Vec::with_capacity(units.len());
    let mut next = 0;
    let mut applied_to: Option<f64> = None;

    for candidate in chosen {
        if applied_to.is_some_and(|to| candidate.from_depth < to - DEPTH_TOLERANCE_M) {
            warn!(
                from = candidate.from_depth,
                to = candidate.to_depth,
                "Skipping candidate overlapping an applied interbedded section"
            );
            continue;
        }

        while next < units.len() && units[next].from_depth < candidate.from_depth - DEPTH_TOLERANCE_M {
            output.push(units[next].clone());
            next += 1;
        }

        output.extend(component_rows(candidate, rules));

        while next < units.len()
            && units[next].from_depth >= candidate.from_depth - DEPTH_TOLERANCE_M
            && units[next].to_depth <= candidate.to_depth + DEPTH_TOLERANCE_M
        {
            next += 1;
        }
        applied_to = Some(candidate.to_depth);
    }

    output.extend_from_slice(&units[next..]);
    debug!(input = units.len(), output = output.len(), "Applied interbedding");

    merge_adjacent_interbedded(&output)
}

/// One row per component, each spanning the whole candidate.
pub fn component_rows(candidate: &InterbeddingCandidate, rules: &RuleSet) -> Vec<LithologyUnit> {
    let layer_count = u32::try_from(candidate.units.len()).unwrap_or(u32::MAX);
    candidate
        .components
        .iter()
        .map(|component| {
            let mut row = LithologyUnit::new(
                candidate.from_depth,
                candidate.to_depth,
                &component.code,
                rules.rule(&component.code),
            );
            row.recovered_thickness = candidate.total_thickness;
            row.record_sequence_flag = Some(component.sequence_rank);
            row.interrelationship_code =
                (component.sequence_rank == 1).then_some(candidate.interrelationship_code);
            row.lithology_percent = component.percentage;
            row.layer_count = layer_count;
            row
        })
        .collect()
}
