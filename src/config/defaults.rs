//! Engine-wide default constants.
//!
//! Centralises the thresholds used by classification, interbedding detection
//! and section merging. Grouped by stage for easy discovery.

// ============================================================================
// Data Model
// ============================================================================

/// Null value used by log files and rule tables.
///
/// In both the min and max of a rule parameter it means "don't care".
pub const INVALID_DATA_VALUE: f64 = -999.25;

/// Lithology code for samples no rule could classify ("Not Logged").
pub const NOT_LOGGED: &str = "NL";

// ============================================================================
// Fallback Classification
// ============================================================================

/// Maximum normalized distance (in range spans) for a nearest-centre match.
pub const FALLBACK_MAX_DISTANCE: f64 = 2.0;

// ============================================================================
// Interbedding Detection
// ============================================================================

/// Maximum number of units collected by one alternating-sequence walk.
pub const MAX_SEQUENCE_LENGTH: usize = 10;

/// Same-code running thickness that stops a sequence walk (m).
pub const THICK_UNIT_THRESHOLD_M: f64 = 0.5;

/// Units at or above this thickness can never be part of an interbedded sequence (m).
pub const MAX_INTERBED_LAYER_THICKNESS_M: f64 = 0.2;

/// Minimum number of units in a valid alternating sequence.
pub const MIN_SEQUENCE_UNITS: usize = 4;

/// Hard cap on outer scan iterations over a unit sequence.
pub const MAX_SCAN_ITERATIONS: usize = 1_000;

/// Share of non-NL thickness (%) a 3rd+ lithology needs to stay its own component.
pub const MINOR_COMPONENT_KEEP_PERCENT: f64 = 10.0;

/// Non-dominant components below this percentage are dropped.
pub const MIN_COMPONENT_PERCENT: f64 = 5.0;

/// Maximum number of component rows in one interbedded group.
pub const MAX_COMPONENTS: usize = 4;

/// Average layer thickness limits (m) for the IL / UB / TB interrelationship codes.
pub const INTERLAMINATED_MAX_M: f64 = 0.02;
pub const VERY_THINLY_INTERBEDDED_MAX_M: f64 = 0.06;
pub const THINLY_INTERBEDDED_MAX_M: f64 = 0.2;

// ============================================================================
// Section Merging
// ============================================================================

/// Depth tolerance used when testing two sections for adjacency (m).
pub const DEPTH_TOLERANCE_M: f64 = 1e-6;

/// Units thinner than this are merged into a following same-lithology unit (m).
pub const THIN_UNIT_THRESHOLD_M: f64 = 0.05;
