//! Section Merging
//!
//! Two independent passes over a unit sequence:
//! - [`merge_adjacent_interbedded`] joins depth-adjacent interbedded groups
//!   that share a dominant lithology into one rescored group
//! - [`merge_thin_units`] absorbs thin units into the following unit of the
//!   same code and qualifier

use super::interbedding::{add_thickness, rank_components};
use crate::config::defaults::{DEPTH_TOLERANCE_M, MAX_COMPONENTS};
use crate::types::{InterrelationshipCode, LithologyUnit};
use tracing::debug;

/// A plain unit, or the stacked component rows of one interbedded interval.
enum Section<'a> {
    Plain(&'a LithologyUnit),
    Group(&'a [LithologyUnit]),
}

fn same_depth(a: f64, b: f64) -> bool {
    (a - b).abs() <= DEPTH_TOLERANCE_M
}

fn sections(units: &[LithologyUnit]) -> Vec<Section<'_>> {
    let mut sections = Vec::new();
    let mut i = 0;
    while i < units.len() {
        let head = &units[i];
        if !head.is_interbedded() {
            sections.push(Section::Plain(head));
            i += 1;
            continue;
        }
        let mut end = i + 1;
        while end < units.len()
            && units[end].is_interbedded()
            && units[end].record_sequence_flag != Some(1)
            && same_depth(units[end].from_depth, head.from_depth)
            && same_depth(units[end].to_depth, head.to_depth)
        {
            end += 1;
        }
        sections.push(Section::Group(&units[i..end]));
        i = end;
    }
    sections
}

fn dominant_code(group: &[LithologyUnit]) -> Option<&str> {
    group
        .iter()
        .find(|row| row.record_sequence_flag == Some(1))
        .or_else(|| group.first())
        .map(|row| row.lithology_code.as_str())
}

fn group_span(group: &[LithologyUnit]) -> (f64, f64) {
    let from = group.first().map_or(0.0, |row| row.from_depth);
    let to = group.first().map_or(0.0, |row| row.to_depth);
    (from, to)
}

fn group_layers(group: &[LithologyUnit]) -> u32 {
    let recorded = group.first().map_or(0, |row| row.layer_count);
    if recorded > 0 {
        recorded
    } else {
        u32::try_from(group.len()).unwrap_or(u32::MAX)
    }
}

/// Merge depth-adjacent interbedded groups that share a dominant code.
///
/// A run stops growing when the next group is not adjacent, has another
/// dominant code, or would take the run past four distinct codes. Runs of
/// two or more groups are rescored into one group; a run whose rescoring
/// keeps fewer than two components is left as it was.
pub fn merge_adjacent_interbedded(units: &[LithologyUnit]) -> Vec<LithologyUnit> {
    let sections = sections(units);
    let mut output = Vec::with_capacity(units.len());
    let mut i = 0;

    while i < sections.len() {
        let group = match sections[i] {
            Section::Plain(unit) => {
                output.push(unit.clone());
                i += 1;
                continue;
            }
            Section::Group(group) => group,
        };

        let dominant = dominant_code(group);
        let mut codes: Vec<&str> = group.iter().map(|row| row.lithology_code.as_str()).collect();
        codes.dedup();
        let mut run = vec![group];
        let mut end = i + 1;

        while let Some(&Section::Group(next)) = sections.get(end) {
            let (_, run_to) = group_span(run[run.len() - 1]);
            let (next_from, _) = group_span(next);
            if !same_depth(run_to, next_from) || dominant_code(next) != dominant {
                break;
            }
            let mut union = codes.clone();
            for row in next.iter() {
                if !union.contains(&row.lithology_code.as_str()) {
                    union.push(&row.lithology_code);
                }
            }
            if union.len() > MAX_COMPONENTS {
                break;
            }
            codes = union;
            run.push(next);
            end += 1;
        }

        match (run.len() > 1).then(|| rescore(&run)).flatten() {
            Some(merged) => {
                debug!(
                    groups = run.len(),
                    from = merged[0].from_depth,
                    to = merged[0].to_depth,
                    "Merged adjacent interbedded groups"
                );
                output.extend(merged);
            }
            None => {
                for group in &run {
                    output.extend_from_slice(group);
                }
            }
        }
        i = end;
    }

    output
}

fn rescore(run: &[&[LithologyUnit]]) -> Option<Vec<LithologyUnit>> {
    let (from_depth, _) = group_span(run.first()?);
    let (_, to_depth) = group_span(run.last()?);

    let mut per_code: Vec<(String, f64)> = Vec::new();
    let mut total_thickness = 0.0;
    let mut layers: u32 = 0;
    for group in run {
        let (from, to) = group_span(group);
        let span = to - from;
        total_thickness += span;
        layers = layers.saturating_add(group_layers(group));
        for row in group.iter() {
            add_thickness(&mut per_code, &row.lithology_code, row.lithology_percent / 100.0 * span);
        }
    }

    let components = rank_components(per_code, total_thickness)?;
    let average = total_thickness / f64::from(layers.max(1));
    let interrelationship = InterrelationshipCode::from_average_layer_thickness(average);

    let rows = components
        .into_iter()
        .map(|component| {
            let template = run
                .iter()
                .copied()
                .flatten()
                .find(|row| row.lithology_code == component.code)
                .cloned();
            let mut row = template.unwrap_or_else(|| {
                LithologyUnit::new(from_depth, to_depth, &component.code, None)
            });
            row.from_depth = from_depth;
            row.to_depth = to_depth;
            row.recovered_thickness = total_thickness;
            row.record_sequence_flag = Some(component.sequence_rank);
            row.interrelationship_code = (component.sequence_rank == 1).then_some(interrelationship);
            row.lithology_percent = component.percentage;
            row.layer_count = layers;
            row
        })
        .collect();
    Some(rows)
}

/// Absorb thin units into the following unit of the same code and qualifier.
///
/// Units are stably sorted by from-depth first. Interbedded rows are passed
/// through untouched and never absorb or get absorbed.
pub fn merge_thin_units(units: &[LithologyUnit], threshold: f64) -> Vec<LithologyUnit> {
    let mut sorted = units.to_vec();
    sorted.sort_by(|a, b| a.from_depth.total_cmp(&b.from_depth));

    let mut output: Vec<LithologyUnit> = Vec::with_capacity(sorted.len());
    let mut iter = sorted.into_iter().peekable();
    let mut absorbed = 0usize;

    while let Some(mut current) = iter.next() {
        if !current.is_interbedded() {
            while current.recovered_thickness < threshold {
                let Some(next) = iter.next_if(|next| {
                    !next.is_interbedded()
                        && next.lithology_code == current.lithology_code
                        && next.lithology_qualifier == current.lithology_qualifier
                }) else {
                    break;
                };
                current.to_depth = next.to_depth;
                current.recompute_thickness();
                absorbed += 1;
            }
        }
        output.push(current);
    }

    if absorbed > 0 {
        debug!(absorbed, threshold, remaining = output.len(), "Merged thin units");
    }
    output
}
