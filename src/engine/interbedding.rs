//! Interbedding Detection
//!
//! Finds runs of thin, strictly alternating units (e.g. SS/SH/SS/SH) and
//! reduces each run to at most four ranked lithology components.
//!
//! ## Sequence rules
//! - every unit thinner than `max_layer_thickness` (0.2 m)
//! - no "NL" unit, no repeated code, no same-code run above
//!   `thick_unit_threshold` (0.5 m)
//! - at most `max_sequence_length` units, at least `min_sequence_units`
//! - 2 or 3 distinct codes repeating in first-appearance order, at least
//!   two full cycles
//!
//! A sequence that breaks any rule is discarded whole, never truncated.

use crate::config::defaults::{
    MAX_COMPONENTS, MIN_COMPONENT_PERCENT, MINOR_COMPONENT_KEEP_PERCENT, NOT_LOGGED,
};
use crate::config::InterbeddingConfig;
use crate::types::{InterbeddingCandidate, InterrelationshipCode, LithologyComponent, LithologyUnit};
use std::ops::Range;
use tracing::debug;

/// Scan a unit sequence for interbedding candidates.
///
/// Candidates never overlap: the scan resumes after the last unit absorbed
/// by an accepted candidate. The scan silently stops after
/// `max_scan_iterations` steps.
pub fn detect(units: &[LithologyUnit], config: &InterbeddingConfig) -> Vec<InterbeddingCandidate> {
    let mut candidates = Vec::new();
    let mut position = 0;
    let mut iterations = 0;

    while position < units.len() {
        if iterations >= config.max_scan_iterations {
            debug!(position, iterations, "Interbedding scan cap reached");
            break;
        }
        iterations += 1;

        let sequence = extract_alternating_sequence(units, position, config);
        if !sequence.is_empty() {
            let range = position..position + sequence.len();
            if let Some(candidate) = score_sequence(units, range) {
                position += sequence.len();
                candidates.push(candidate);
                continue;
            }
        }
        position += 1;
    }

    debug!(
        units = units.len(),
        candidates = candidates.len(),
        "Interbedding scan complete"
    );
    candidates
}

/// Longest valid alternating sequence starting at `start`, or an empty slice.
pub fn extract_alternating_sequence<'a>(
    units: &'a [LithologyUnit],
    start: usize,
    config: &InterbeddingConfig,
) -> &'a [LithologyUnit] {
    let Some(rest) = units.get(start..) else {
        return &[];
    };

    let mut len = 0;
    let mut run_thickness = 0.0;
    let mut previous: Option<&str> = None;

    for unit in rest {
        if len >= config.max_sequence_length
            || unit.lithology_code == NOT_LOGGED
            || unit.is_interbedded()
            || unit.recovered_thickness >= config.max_layer_thickness
        {
            break;
        }

        let code = unit.lithology_code.as_str();
        let repeated = previous == Some(code);
        run_thickness = if repeated {
            run_thickness + unit.recovered_thickness
        } else {
            unit.recovered_thickness
        };
        if repeated || run_thickness > config.thick_unit_threshold {
            break;
        }

        previous = Some(code);
        len += 1;
    }

    let sequence = &rest[..len];
    if is_valid_alternation(sequence, config.min_sequence_units) {
        sequence
    } else {
        &[]
    }
}

/// Distinct codes in first-appearance order.
pub fn alternation_pattern(sequence: &[LithologyUnit]) -> Vec<&str> {
    let mut pattern: Vec<&str> = Vec::new();
    for unit in sequence {
        if !pattern.contains(&unit.lithology_code.as_str()) {
            pattern.push(&unit.lithology_code);
        }
    }
    pattern
}

fn is_valid_alternation(sequence: &[LithologyUnit], min_units: usize) -> bool {
    if sequence.len() < min_units {
        return false;
    }
    let pattern = alternation_pattern(sequence);
    if !(2..=3).contains(&pattern.len()) || sequence.len() < 2 * pattern.len() {
        return false;
    }
    sequence
        .iter()
        .enumerate()
        .all(|(i, unit)| unit.lithology_code == pattern[i % pattern.len()])
}

/// Reduce `units[range]` to an interbedding candidate.
///
/// Returns None for an empty or all-"NL" range, or when fewer than two
/// components survive the percentage filters.
pub fn score_sequence(units: &[LithologyUnit], range: Range<usize>) -> Option<InterbeddingCandidate> {
    let sequence = units.get(range.clone())?;
    let (first, last) = (sequence.first()?, sequence.last()?);

    let total_thickness: f64 = sequence.iter().map(|u| u.recovered_thickness).sum();
    let mut per_code: Vec<(String, f64)> = Vec::new();
    for unit in sequence {
        add_thickness(&mut per_code, &unit.lithology_code, unit.recovered_thickness);
    }

    let components = rank_components(per_code, total_thickness)?;
    let average_layer_thickness = total_thickness / sequence.len() as f64;

    Some(InterbeddingCandidate {
        source_range: range,
        units: sequence.to_vec(),
        from_depth: first.from_depth,
        to_depth: last.to_depth,
        total_thickness,
        average_layer_thickness,
        interrelationship_code: InterrelationshipCode::from_average_layer_thickness(
            average_layer_thickness,
        ),
        components,
    })
}

/// Accumulate thickness per code, keeping first-appearance order.
pub(crate) fn add_thickness(per_code: &mut Vec<(String, f64)>, code: &str, thickness: f64) {
    match per_code.iter_mut().find(|(c, _)| c == code) {
        Some((_, total)) => *total += thickness,
        None => per_code.push((code.to_string(), thickness)),
    }
}

/// Rank per-code thickness into interbedding components.
///
/// `per_code` must be in first-appearance order; the descending sort is
/// stable so equal thicknesses keep that order. Minor 3rd+ codes (share of
/// non-"NL" thickness <= 10 %) fold into the dominant code, as do codes past
/// the fourth. Percentages are of `total_thickness`, which may include "NL".
pub(crate) fn rank_components(
    per_code: Vec<(String, f64)>,
    total_thickness: f64,
) -> Option<Vec<LithologyComponent>> {
    let mut totals: Vec<(String, f64)> = per_code
        .into_iter()
        .filter(|(code, _)| code != NOT_LOGGED)
        .collect();
    if totals.is_empty() || total_thickness <= 0.0 {
        return None;
    }
    totals.sort_by(|a, b| b.1.total_cmp(&a.1));

    let logged_thickness: f64 = totals.iter().map(|(_, t)| t).sum();
    let minors = totals.split_off(totals.len().min(2));
    let mut kept = totals;

    for (code, thickness) in minors {
        let share = thickness / logged_thickness * 100.0;
        if share > MINOR_COMPONENT_KEEP_PERCENT && kept.len() < MAX_COMPONENTS {
            kept.push((code, thickness));
        } else {
            kept[0].1 += thickness;
        }
    }

    let components: Vec<LithologyComponent> = kept
        .into_iter()
        .map(|(code, thickness)| (code, thickness, thickness / total_thickness * 100.0))
        .enumerate()
        .filter(|(i, (_, _, percentage))| *i == 0 || *percentage >= MIN_COMPONENT_PERCENT)
        .enumerate()
        .map(|(rank, (_, (code, thickness, percentage)))| LithologyComponent {
            code,
            thickness,
            percentage,
            sequence_rank: u8::try_from(rank + 1).unwrap_or(u8::MAX),
        })
        .collect();

    (components.len() >= 2).then_some(components)
}
