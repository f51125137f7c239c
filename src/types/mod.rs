//! Shared data structures for the lithology engine
//!
//! - `rule`: lithology rules, researched defaults and the rule set
//! - `sample`: depth samples and curve-name mapping
//! - `unit`: lithology units, interbedding candidates and their components

mod rule;
mod sample;
mod unit;

pub use rule::*;
pub use sample::*;
pub use unit::*;
