//! Unit Grouping
//!
//! Run-length encodes classified samples into contiguous lithology units.
//! A unit spans from its first sample to the first sample of the next unit,
//! so adjacent units always share a boundary depth. The last unit is closed
//! one sampling interval below its final sample.

use crate::types::{LithologyUnit, RuleSet, Sample};
use thiserror::Error;
use tracing::debug;

/// Structural problems that make grouping impossible.
#[derive(Debug, Error, PartialEq)]
pub enum GroupingError {
    #[error("sample {index} has no usable depth (got {depth})")]
    MissingDepth { index: usize, depth: f64 },

    #[error("sample {index} at depth {depth} has no lithology code")]
    MissingLithology { index: usize, depth: f64 },

    #[error("depths must increase strictly: sample {index} at {depth} follows {previous}")]
    NonIncreasingDepth {
        index: usize,
        depth: f64,
        previous: f64,
    },

    #[error("a single sample cannot define a depth interval")]
    SingleSample,
}

/// Group depth-sorted classified samples into units.
pub fn group_units(samples: &[Sample], rules: &RuleSet) -> Result<Vec<LithologyUnit>, GroupingError> {
    validate(samples)?;
    if samples.is_empty() {
        return Ok(Vec::new());
    }
    if samples.len() == 1 {
        return Err(GroupingError::SingleSample);
    }

    let mut units: Vec<LithologyUnit> = Vec::new();
    let mut run_start = 0;

    for (i, sample) in samples.iter().enumerate().skip(1) {
        if sample.lithology != samples[run_start].lithology {
            units.push(make_unit(&samples[run_start], sample.depth, rules));
            run_start = i;
        }
    }

    let n = samples.len();
    let last_step = samples[n - 1].depth - samples[n - 2].depth;
    units.push(make_unit(
        &samples[run_start],
        samples[n - 1].depth + last_step,
        rules,
    ));

    for unit in &mut units {
        unit.recompute_thickness();
    }

    debug!(samples = n, units = units.len(), "Grouped samples into units");
    Ok(units)
}

fn make_unit(first: &Sample, to_depth: f64, rules: &RuleSet) -> LithologyUnit {
    LithologyUnit::new(
        first.depth,
        to_depth,
        &first.lithology,
        rules.rule(&first.lithology),
    )
}

fn validate(samples: &[Sample]) -> Result<(), GroupingError> {
    let mut previous: Option<f64> = None;
    for (index, sample) in samples.iter().enumerate() {
        if !sample.depth.is_finite() {
            return Err(GroupingError::MissingDepth {
                index,
                depth: sample.depth,
            });
        }
        if sample.lithology.trim().is_empty() {
            return Err(GroupingError::MissingLithology {
                index,
                depth: sample.depth,
            });
        }
        if let Some(previous) = previous {
            if sample.depth <= previous {
                return Err(GroupingError::NonIncreasingDepth {
                    index,
                    depth: sample.depth,
                    previous,
                });
            }
        }
        previous = Some(sample.depth);
    }
    Ok(())
}
