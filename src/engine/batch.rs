//! Multi-borehole processing
//!
//! Boreholes share nothing but the rule table and configuration, so each one
//! runs the full pipeline on its own rayon task.

use super::pipeline::{run_pipeline, EngineError, PipelineOutput};
use crate::config::EngineConfig;
use crate::types::{RuleSet, Sample};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// One borehole's depth samples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Borehole {
    pub id: String,
    pub samples: Vec<Sample>,
}

impl Borehole {
    pub fn new(id: impl Into<String>, samples: Vec<Sample>) -> Self {
        Self {
            id: id.into(),
            samples,
        }
    }
}

/// Outcome for one borehole. A failure never affects other boreholes.
#[derive(Debug)]
pub struct BoreholeResult {
    pub id: String,
    /// Samples after classification
    pub samples: Vec<Sample>,
    pub result: Result<PipelineOutput, EngineError>,
}

/// Run every borehole in parallel. Results keep input order.
pub fn run_boreholes(
    boreholes: Vec<Borehole>,
    rules: &RuleSet,
    config: &EngineConfig,
) -> Vec<BoreholeResult> {
    let count = boreholes.len();
    let results: Vec<BoreholeResult> = boreholes
        .into_par_iter()
        .map(|borehole| {
            let Borehole { id, mut samples } = borehole;
            let result = run_pipeline(&mut samples, rules, config);
            if let Err(e) = &result {
                warn!(borehole = %id, error = %e, "Borehole failed");
            }
            BoreholeResult {
                id,
                samples,
                result,
            }
        })
        .collect();

    let failed = results.iter().filter(|r| r.result.is_err()).count();
    info!(boreholes = count, failed, "Batch complete");
    results
}
