//! Lithology Engine: borehole log interpretation
//!
//! Classifies geophysical log samples into lithology codes, groups them into
//! depth units and detects interbedded sections.
//!
//! ## Architecture
//!
//! - **Types**: rules, samples, units and interbedding candidates
//! - **Config**: TOML engine settings and rule tables
//! - **Engine**: classification, grouping, interbedding and merge stages
//!
//! ```no_run
//! use lithology_engine::{run_pipeline, EngineConfig, RuleSet, Sample};
//!
//! let mut samples = vec![
//!     Sample::new(10.0).with_curve("gamma", 45.0).with_curve("density", 2.4),
//!     Sample::new(10.1).with_curve("gamma", 150.0).with_curve("density", 2.6),
//! ];
//! let output = run_pipeline(&mut samples, &RuleSet::builtin(), &EngineConfig::default())?;
//! println!("{} units", output.units.len());
//! # Ok::<(), lithology_engine::EngineError>(())
//! ```

pub mod config;
pub mod types;
pub mod engine;

// Re-export configuration
pub use config::{ConfigError, EngineConfig};

// Re-export commonly used types
pub use types::{
    CurveMapping, InterbeddingCandidate, InterrelationshipCode, LithologyComponent,
    LithologyRule, LithologyUnit, ParamRange, ResearchedDefault, RuleSet, Sample,
};

// Re-export engine entry points
pub use engine::{
    apply_interbedding, classify, classify_simple, classify_unresolved, detect, group_units,
    merge_adjacent_interbedded, merge_thin_units, run_boreholes, run_pipeline, Borehole,
    BoreholeResult, EngineError, GroupingError, PipelineOutput,
};
