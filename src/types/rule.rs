//! Lithology rule types: curve thresholds plus pass-through display metadata

use crate::config::defaults::{INVALID_DATA_VALUE, NOT_LOGGED};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Rule table errors
#[derive(Debug, Error, PartialEq)]
pub enum RuleError {
    #[error("{param}: -999.25 must be used in both min and max, got ({min}, {max})")]
    HalfSentinel { param: String, min: f64, max: f64 },

    #[error("{param}: min ({min}) is greater than max ({max})")]
    Inverted { param: String, min: f64, max: f64 },

    #[error("{param}: bounds must be finite numbers")]
    NonFinite { param: String },

    #[error("lithology code must not be empty")]
    EmptyCode,
}

/// Threshold on one log curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamRange {
    /// "Don't care": every value matches, including missing ones.
    Unconstrained,
    /// Inclusive range.
    Bounded { min: f64, max: f64 },
}

impl ParamRange {
    /// Build a range from the min/max pair found in rule tables.
    pub fn from_bounds(param: &str, min: f64, max: f64) -> Result<Self, RuleError> {
        let min_null = is_null(min);
        let max_null = is_null(max);
        match (min_null, max_null) {
            (true, true) => Ok(Self::Unconstrained),
            (true, false) | (false, true) => Err(RuleError::HalfSentinel {
                param: param.to_string(),
                min,
                max,
            }),
            (false, false) => {
                if !min.is_finite() || !max.is_finite() {
                    return Err(RuleError::NonFinite {
                        param: param.to_string(),
                    });
                }
                if min > max {
                    return Err(RuleError::Inverted {
                        param: param.to_string(),
                        min,
                        max,
                    });
                }
                Ok(Self::Bounded { min, max })
            }
        }
    }

    /// The min/max pair as written in rule tables.
    pub const fn bounds(self) -> (f64, f64) {
        match self {
            Self::Unconstrained => (INVALID_DATA_VALUE, INVALID_DATA_VALUE),
            Self::Bounded { min, max } => (min, max),
        }
    }

    /// True when the rule leaves this parameter open: "don't care" or exactly (0, 0).
    pub fn is_unset(self) -> bool {
        match self {
            Self::Unconstrained => true,
            Self::Bounded { min, max } => min == 0.0 && max == 0.0,
        }
    }

    pub const fn is_unconstrained(self) -> bool {
        matches!(self, Self::Unconstrained)
    }

    /// Whether a (possibly missing) curve value satisfies this range.
    pub fn contains(self, value: Option<f64>) -> bool {
        match self {
            Self::Unconstrained => true,
            Self::Bounded { min, max } => value.is_some_and(|v| v >= min && v <= max),
        }
    }

    pub fn midpoint(self) -> Option<f64> {
        match self {
            Self::Unconstrained => None,
            Self::Bounded { min, max } => Some((min + max) / 2.0),
        }
    }

    pub fn span(self) -> Option<f64> {
        match self {
            Self::Unconstrained => None,
            Self::Bounded { min, max } => Some(max - min),
        }
    }
}

fn is_null(value: f64) -> bool {
    (value - INVALID_DATA_VALUE).abs() < 1e-9
}

fn null_value() -> f64 {
    INVALID_DATA_VALUE
}

// ============================================================================
// Lithology Rule
// ============================================================================

/// One classification rule. Rules are applied in declaration order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawLithologyRule", into = "RawLithologyRule")]
pub struct LithologyRule {
    pub code: String,
    pub name: String,
    pub gamma: ParamRange,
    pub density: ParamRange,
    pub qualifier: String,
    pub shade: String,
    pub hue: String,
    pub colour: String,
    pub weathering: String,
    pub strength: String,
    pub bed_spacing: String,
    pub fill: String,
}

impl LithologyRule {
    /// Rule with thresholds only; display metadata left empty.
    pub fn new(code: &str, name: &str, gamma: ParamRange, density: ParamRange) -> Self {
        Self {
            code: code.to_string(),
            name: name.to_string(),
            gamma,
            density,
            qualifier: String::new(),
            shade: String::new(),
            hue: String::new(),
            colour: String::new(),
            weathering: String::new(),
            strength: String::new(),
            bed_spacing: String::new(),
            fill: String::new(),
        }
    }

    pub fn with_qualifier(mut self, qualifier: &str) -> Self {
        self.qualifier = qualifier.to_string();
        self
    }

    pub fn with_colour(mut self, colour: &str) -> Self {
        self.colour = colour.to_string();
        self
    }

    pub fn with_fill(mut self, fill: &str) -> Self {
        self.fill = fill.to_string();
        self
    }

    pub fn is_not_logged(&self) -> bool {
        self.code == NOT_LOGGED
    }
}

/// On-disk form of a rule, with the sentinel encoding of "don't care".
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawLithologyRule {
    code: String,
    #[serde(default)]
    name: String,
    #[serde(default = "null_value")]
    gamma_min: f64,
    #[serde(default = "null_value")]
    gamma_max: f64,
    #[serde(default = "null_value")]
    density_min: f64,
    #[serde(default = "null_value")]
    density_max: f64,
    #[serde(default)]
    qualifier: String,
    #[serde(default)]
    shade: String,
    #[serde(default)]
    hue: String,
    #[serde(default)]
    colour: String,
    #[serde(default)]
    weathering: String,
    #[serde(default)]
    strength: String,
    #[serde(default)]
    bed_spacing: String,
    #[serde(default)]
    fill: String,
}

impl TryFrom<RawLithologyRule> for LithologyRule {
    type Error = RuleError;

    fn try_from(raw: RawLithologyRule) -> Result<Self, Self::Error> {
        if raw.code.trim().is_empty() {
            return Err(RuleError::EmptyCode);
        }
        Ok(Self {
            gamma: ParamRange::from_bounds(
                &format!("{}.gamma", raw.code),
                raw.gamma_min,
                raw.gamma_max,
            )?,
            density: ParamRange::from_bounds(
                &format!("{}.density", raw.code),
                raw.density_min,
                raw.density_max,
            )?,
            code: raw.code,
            name: raw.name,
            qualifier: raw.qualifier,
            shade: raw.shade,
            hue: raw.hue,
            colour: raw.colour,
            weathering: raw.weathering,
            strength: raw.strength,
            bed_spacing: raw.bed_spacing,
            fill: raw.fill,
        })
    }
}

impl From<LithologyRule> for RawLithologyRule {
    fn from(rule: LithologyRule) -> Self {
        let (gamma_min, gamma_max) = rule.gamma.bounds();
        let (density_min, density_max) = rule.density.bounds();
        Self {
            code: rule.code,
            name: rule.name,
            gamma_min,
            gamma_max,
            density_min,
            density_max,
            qualifier: rule.qualifier,
            shade: rule.shade,
            hue: rule.hue,
            colour: rule.colour,
            weathering: rule.weathering,
            strength: rule.strength,
            bed_spacing: rule.bed_spacing,
            fill: rule.fill,
        }
    }
}

// ============================================================================
// Researched Default
// ============================================================================

/// Literature gamma/density ranges for a lithology code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawResearchedDefault", into = "RawResearchedDefault")]
pub struct ResearchedDefault {
    pub code: String,
    pub gamma: ParamRange,
    pub density: ParamRange,
}

impl ResearchedDefault {
    pub fn new(code: &str, gamma: (f64, f64), density: (f64, f64)) -> Self {
        Self {
            code: code.to_string(),
            gamma: ParamRange::Bounded {
                min: gamma.0,
                max: gamma.1,
            },
            density: ParamRange::Bounded {
                min: density.0,
                max: density.1,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawResearchedDefault {
    code: String,
    gamma_min: f64,
    gamma_max: f64,
    density_min: f64,
    density_max: f64,
}

impl TryFrom<RawResearchedDefault> for ResearchedDefault {
    type Error = RuleError;

    fn try_from(raw: RawResearchedDefault) -> Result<Self, Self::Error> {
        if raw.code.trim().is_empty() {
            return Err(RuleError::EmptyCode);
        }
        Ok(Self {
            gamma: ParamRange::from_bounds(
                &format!("researched_default.{}.gamma", raw.code),
                raw.gamma_min,
                raw.gamma_max,
            )?,
            density: ParamRange::from_bounds(
                &format!("researched_default.{}.density", raw.code),
                raw.density_min,
                raw.density_max,
            )?,
            code: raw.code,
        })
    }
}

impl From<ResearchedDefault> for RawResearchedDefault {
    fn from(default: ResearchedDefault) -> Self {
        let (gamma_min, gamma_max) = default.gamma.bounds();
        let (density_min, density_max) = default.density.bounds();
        Self {
            code: default.code,
            gamma_min,
            gamma_max,
            density_min,
            density_max,
        }
    }
}

// ============================================================================
// Rule Set
// ============================================================================

/// Ordered lithology rules plus the researched-default table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleSet {
    #[serde(default, rename = "rule")]
    pub rules: Vec<LithologyRule>,
    #[serde(default, rename = "researched_default")]
    pub researched_defaults: Vec<ResearchedDefault>,
}

impl RuleSet {
    pub fn new(rules: Vec<LithologyRule>, researched_defaults: Vec<ResearchedDefault>) -> Self {
        Self {
            rules,
            researched_defaults,
        }
    }

    /// First rule declared with `code`.
    pub fn rule(&self, code: &str) -> Option<&LithologyRule> {
        self.rules.iter().find(|r| r.code == code)
    }

    pub fn researched_default(&self, code: &str) -> Option<&ResearchedDefault> {
        self.researched_defaults.iter().find(|d| d.code == code)
    }

    /// Built-in coal-measures rule set.
    ///
    /// Rule order is the classification priority: coal first, then the
    /// clastics from coarse to fine, carbonates, igneous, and the implicit
    /// Not Logged rule last.
    pub fn builtin() -> Self {
        let bounded = |min: f64, max: f64| ParamRange::Bounded { min, max };
        let rules = vec![
            LithologyRule::new("CO", "Coal", bounded(0.0, 60.0), bounded(1.0, 1.8))
                .with_colour("BK")
                .with_fill("coal"),
            LithologyRule::new("SS", "Sandstone", bounded(20.0, 75.0), bounded(2.2, 2.65))
                .with_colour("LG")
                .with_fill("sandstone"),
            LithologyRule::new("SI", "Siltstone", bounded(75.0, 100.0), bounded(2.3, 2.7))
                .with_colour("MG")
                .with_fill("siltstone"),
            LithologyRule::new("SH", "Shale", bounded(100.0, 200.0), bounded(2.3, 2.8))
                .with_colour("DG")
                .with_fill("shale"),
            LithologyRule::new("LS", "Limestone", bounded(0.0, 30.0), bounded(2.65, 2.85))
                .with_colour("LB")
                .with_fill("limestone"),
            LithologyRule::new("IG", "Igneous", ParamRange::Unconstrained, bounded(2.85, 3.3))
                .with_colour("DG")
                .with_fill("igneous"),
            LithologyRule::new(
                NOT_LOGGED,
                "Not Logged",
                ParamRange::Unconstrained,
                ParamRange::Unconstrained,
            ),
        ];
        let researched_defaults = vec![
            ResearchedDefault::new("CO", (0.0, 60.0), (1.1, 1.8)),
            ResearchedDefault::new("SS", (20.0, 75.0), (2.2, 2.65)),
            ResearchedDefault::new("SI", (75.0, 100.0), (2.3, 2.7)),
            ResearchedDefault::new("SH", (100.0, 200.0), (2.35, 2.8)),
            ResearchedDefault::new("LS", (0.0, 30.0), (2.65, 2.85)),
            ResearchedDefault::new("IG", (0.0, 60.0), (2.8, 3.1)),
        ];
        Self::new(rules, researched_defaults)
    }
}
