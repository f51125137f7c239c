//! Lithology units and interbedding candidates

use super::rule::LithologyRule;
use crate::config::defaults::{
    INTERLAMINATED_MAX_M, THINLY_INTERBEDDED_MAX_M, VERY_THINLY_INTERBEDDED_MAX_M,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;

/// Interbedding density class derived from average layer thickness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InterrelationshipCode {
    /// Interlaminated (< 0.02 m)
    #[serde(rename = "IL")]
    Interlaminated,
    /// Very thinly interbedded (< 0.06 m)
    #[serde(rename = "UB")]
    VeryThinlyInterbedded,
    /// Thinly interbedded (< 0.2 m)
    #[serde(rename = "TB")]
    ThinlyInterbedded,
    /// Coarsely interbedded
    #[serde(rename = "CB")]
    CoarselyInterbedded,
}

impl InterrelationshipCode {
    pub fn from_average_layer_thickness(thickness_m: f64) -> Self {
        match thickness_m {
            t if t < INTERLAMINATED_MAX_M => Self::Interlaminated,
            t if t < VERY_THINLY_INTERBEDDED_MAX_M => Self::VeryThinlyInterbedded,
            t if t < THINLY_INTERBEDDED_MAX_M => Self::ThinlyInterbedded,
            _ => Self::CoarselyInterbedded,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Interlaminated => "IL",
            Self::VeryThinlyInterbedded => "UB",
            Self::ThinlyInterbedded => "TB",
            Self::CoarselyInterbedded => "CB",
        }
    }
}

impl fmt::Display for InterrelationshipCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A contiguous depth interval of one lithology, or one component row of an
/// interbedded group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LithologyUnit {
    pub from_depth: f64,
    pub to_depth: f64,
    pub recovered_thickness: f64,
    pub lithology_code: String,
    pub lithology_qualifier: String,
    pub shade: String,
    pub hue: String,
    pub colour: String,
    pub weathering: String,
    pub estimated_strength: String,
    pub bed_spacing: String,
    pub fill: String,
    /// Rank within an interbedded group (1 = dominant). None for plain units.
    pub record_sequence_flag: Option<u8>,
    /// Set on the dominant row of an interbedded group only.
    pub interrelationship_code: Option<InterrelationshipCode>,
    pub lithology_percent: f64,
    /// Number of original layers an interbedded row summarises; 0 for plain units.
    pub layer_count: u32,
}

impl LithologyUnit {
    /// Plain unit, styled from `rule` when one matches the code.
    pub fn new(from_depth: f64, to_depth: f64, code: &str, rule: Option<&LithologyRule>) -> Self {
        let mut unit = Self {
            from_depth,
            to_depth,
            recovered_thickness: to_depth - from_depth,
            lithology_code: code.to_string(),
            lithology_qualifier: String::new(),
            shade: String::new(),
            hue: String::new(),
            colour: String::new(),
            weathering: String::new(),
            estimated_strength: String::new(),
            bed_spacing: String::new(),
            fill: String::new(),
            record_sequence_flag: None,
            interrelationship_code: None,
            lithology_percent: 0.0,
            layer_count: 0,
        };
        if let Some(rule) = rule {
            unit.apply_style(rule);
        }
        unit
    }

    /// Copy the rule's pass-through display fields onto this unit.
    pub fn apply_style(&mut self, rule: &LithologyRule) {
        self.lithology_qualifier.clone_from(&rule.qualifier);
        self.shade.clone_from(&rule.shade);
        self.hue.clone_from(&rule.hue);
        self.colour.clone_from(&rule.colour);
        self.weathering.clone_from(&rule.weathering);
        self.estimated_strength.clone_from(&rule.strength);
        self.bed_spacing.clone_from(&rule.bed_spacing);
        self.fill.clone_from(&rule.fill);
    }

    pub fn recompute_thickness(&mut self) {
        self.recovered_thickness = self.to_depth - self.from_depth;
    }

    pub const fn is_interbedded(&self) -> bool {
        self.record_sequence_flag.is_some()
    }
}

/// One ranked lithology within an interbedded group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LithologyComponent {
    pub code: String,
    /// Summed thickness of this lithology (m)
    pub thickness: f64,
    /// Share of the whole sequence thickness (0-100)
    pub percentage: f64,
    /// 1 = dominant
    pub sequence_rank: u8,
}

/// An alternating run of thin units and its reduced component set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InterbeddingCandidate {
    /// Indices of the replaced units in the sequence the candidate was detected on
    pub source_range: Range<usize>,
    pub units: Vec<LithologyUnit>,
    pub from_depth: f64,
    pub to_depth: f64,
    pub total_thickness: f64,
    pub average_layer_thickness: f64,
    pub interrelationship_code: InterrelationshipCode,
    pub components: Vec<LithologyComponent>,
}

impl InterbeddingCandidate {
    /// Distinct component codes, dominant first.
    pub fn lithologies(&self) -> Vec<&str> {
        self.components.iter().map(|c| c.code.as_str()).collect()
    }

    pub fn dominant(&self) -> Option<&LithologyComponent> {
        self.components.first()
    }
}
