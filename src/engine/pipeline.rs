//! End-to-end borehole processing
//!
//! Chains the stages for one borehole:
//!
//! ```text
//! samples → classify (standard | simple) → fallback → group_units
//!         → detect → apply_interbedding (selection) → merge_thin_units
//! ```

use super::applier::apply_interbedding;
use super::classifier::{classify, classify_simple, ClassificationSummary, ClassifyOptions};
use super::fallback::classify_unresolved;
use super::grouper::{group_units, GroupingError};
use super::interbedding::detect;
use super::merger::merge_thin_units;
use crate::config::{CandidateSelection, ClassificationMode, ConfigError, EngineConfig};
use crate::types::{InterbeddingCandidate, LithologyUnit, RuleSet, Sample};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid engine configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("unit grouping failed: {0}")]
    Grouping(#[from] GroupingError),
}

/// Result of one pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineOutput {
    pub units: Vec<LithologyUnit>,
    /// Every candidate found, applied or not
    pub candidates: Vec<InterbeddingCandidate>,
    /// Indices into `candidates` that were applied to `units`
    pub applied: Vec<usize>,
    pub summary: ClassificationSummary,
    /// Samples resolved by the fallback classifier
    pub fallback_resolved: usize,
}

/// Classify `samples` in place and build the unit sequence.
///
/// With `CandidateSelection::None` the candidates are returned but `units`
/// stays un-interbedded; the caller applies its own choice with
/// [`apply_interbedding`](super::applier::apply_interbedding).
pub fn run_pipeline(
    samples: &mut [Sample],
    rules: &RuleSet,
    config: &EngineConfig,
) -> Result<PipelineOutput, EngineError> {
    config.validate()?;
    let classification = &config.classification;

    let summary = match classification.mode {
        ClassificationMode::Standard => classify(
            samples,
            rules,
            &config.curves,
            &ClassifyOptions {
                use_researched_defaults: classification.use_researched_defaults,
                casing_depth: classification.casing_depth,
            },
        ),
        ClassificationMode::Simple => {
            classify_simple(samples, rules, &config.curves, classification.casing_depth)
        }
    };
    debug!(
        mode = ?classification.mode,
        classified = summary.classified,
        not_logged = summary.not_logged,
        "Classification stage complete"
    );

    let fallback_resolved = if classification.fallback && summary.is_applied() {
        classify_unresolved(samples, rules, &config.curves, classification.casing_depth)
    } else {
        0
    };

    let mut units = group_units(samples, rules)?;

    let candidates = if config.interbedding.enabled {
        detect(&units, &config.interbedding)
    } else {
        Vec::new()
    };

    let applied: Vec<usize> = match config.interbedding.selection {
        CandidateSelection::All => (0..candidates.len()).collect(),
        CandidateSelection::None => Vec::new(),
    };
    if !applied.is_empty() {
        units = apply_interbedding(&units, &candidates, &applied, rules);
    }

    if config.merge.thin_units {
        units = merge_thin_units(&units, config.merge.thin_unit_threshold);
    }

    info!(
        samples = samples.len(),
        units = units.len(),
        candidates = candidates.len(),
        applied = applied.len(),
        fallback_resolved,
        "Borehole processed"
    );

    Ok(PipelineOutput {
        units,
        candidates,
        applied,
        summary,
        fallback_resolved,
    })
}
