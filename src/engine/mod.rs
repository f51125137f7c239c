//! Lithology Engine
//!
//! Turns depth samples carrying gamma and density curves into a sequence of
//! lithology units, with thin alternating runs reduced to ranked
//! interbedding components.
//!
//! ## Architecture
//! - `classifier`: rule-table classification (standard and simple modes)
//! - `fallback`: nearest researched default, then extreme-value guards
//! - `grouper`: run-length grouping of samples into contiguous units
//! - `interbedding`: alternating-sequence detection and component ranking
//! - `applier`: replaces selected candidates with component rows
//! - `merger`: adjacent interbedded merge and thin-unit merge
//! - `pipeline`: all stages for one borehole, driven by `EngineConfig`
//! - `batch`: independent boreholes in parallel (rayon)
//!
//! Every stage is a pure function of its input and configuration.

pub mod classifier;
pub mod fallback;
pub mod grouper;
pub mod interbedding;
pub mod applier;
pub mod merger;
pub mod pipeline;
pub mod batch;

// Re-export public API
pub use classifier::{
    classify, classify_simple, is_cased, ClassificationStatus, ClassificationSummary,
    ClassifyOptions,
};
pub use fallback::{classify_unresolved, fallback_code};
pub use grouper::{group_units, GroupingError};
pub use interbedding::{alternation_pattern, detect, extract_alternating_sequence, score_sequence};
pub use applier::{apply_interbedding, component_rows};
pub use merger::{merge_adjacent_interbedded, merge_thin_units};
pub use pipeline::{run_pipeline, EngineError, PipelineOutput};
pub use batch::{run_boreholes, Borehole, BoreholeResult};
