//! Engine Configuration Module
//!
//! Provides run configuration and lithology rule tables loaded from TOML
//! files, with every engine threshold tunable per project.
//!
//! ## Loading Order
//!
//! Engine config:
//! 1. `LITHOLOGY_CONFIG` environment variable (path to TOML file)
//! 2. `lithology_config.toml` in the current working directory
//! 3. Built-in defaults (see [`defaults`])
//!
//! Rule table:
//! 1. `LITHOLOGY_RULES` environment variable
//! 2. `lithology_rules.toml` in the current working directory
//! 3. `RuleSet::builtin()`
//!
//! Configuration is passed explicitly to every engine stage; there is no
//! global state, so independent runs can proceed in parallel.

mod engine_config;
mod rules;
pub mod defaults;
pub mod validation;

pub use engine_config::*;
pub use rules::{LOCAL_RULES_FILE, RULES_ENV_VAR};
