//! Pipeline Regression Tests
//!
//! Exercises the public engine API end to end on synthetic logs and checks
//! the structural properties every output must keep: contiguous units,
//! bounded component sets, stable merges.

use lithology_engine::config::{CandidateSelection, EngineConfig, InterbeddingConfig};
use lithology_engine::engine::{alternation_pattern, ClassifyOptions};
use lithology_engine::{
    apply_interbedding, classify, detect, group_units, merge_thin_units, run_boreholes,
    run_pipeline, Borehole, CurveMapping, EngineError, GroupingError, InterrelationshipCode,
    LithologyRule, LithologyUnit, ParamRange, RuleSet, Sample,
};

// ============================================================================
// Helpers
// ============================================================================

fn units_from(start: f64, layers: &[(&str, f64)]) -> Vec<LithologyUnit> {
    let mut depth = start;
    layers
        .iter()
        .map(|&(code, thickness)| {
            let unit = LithologyUnit::new(depth, depth + thickness, code, None);
            depth += thickness;
            unit
        })
        .collect()
}

/// Samples every `step` m with (gamma, density) taken from a repeating
/// lithology sequence of `run` samples each.
fn synthetic_log(count: usize, step: f64, run: usize, curves: &[(f64, f64)]) -> Vec<Sample> {
    (0..count)
        .map(|i| {
            let (gamma, density) = curves[(i / run) % curves.len()];
            Sample::new(50.0 + i as f64 * step)
                .with_curve("gamma", gamma)
                .with_curve("density", density)
        })
        .collect()
}

const COAL: (f64, f64) = (30.0, 1.4);
const SANDSTONE: (f64, f64) = (50.0, 2.4);
const SILTSTONE: (f64, f64) = (85.0, 2.5);
const SHALE: (f64, f64) = (150.0, 2.6);

// ============================================================================
// Grouping
// ============================================================================

#[test]
fn grouped_units_are_contiguous_with_positive_thickness() {
    let mut samples = synthetic_log(500, 0.02, 7, &[COAL, SANDSTONE, SHALE, SILTSTONE, SANDSTONE]);
    let rules = RuleSet::builtin();
    classify(
        &mut samples,
        &rules,
        &CurveMapping::default(),
        &ClassifyOptions::default(),
    );

    let units = group_units(&samples, &rules).unwrap();
    assert!(!units.is_empty());
    for pair in units.windows(2) {
        assert_eq!(pair[0].to_depth, pair[1].from_depth);
        assert_ne!(pair[0].lithology_code, pair[1].lithology_code);
    }
    for unit in &units {
        assert!(unit.recovered_thickness > 0.0, "{unit:?}");
        assert!((unit.recovered_thickness - (unit.to_depth - unit.from_depth)).abs() < 1e-12);
    }
}

// ============================================================================
// Classification
// ============================================================================

#[test]
fn single_matching_rule_wins_regardless_of_order() {
    let bounded = |min: f64, max: f64| ParamRange::Bounded { min, max };
    let coal = LithologyRule::new("CO", "Coal", bounded(0.0, 40.0), bounded(1.0, 1.8));
    let sandstone = LithologyRule::new("SS", "Sandstone", bounded(41.0, 75.0), bounded(2.2, 2.65));
    let shale = LithologyRule::new("SH", "Shale", bounded(100.0, 200.0), bounded(2.66, 2.8));

    let orders = [
        vec![coal.clone(), sandstone.clone(), shale.clone()],
        vec![shale.clone(), coal.clone(), sandstone.clone()],
        vec![sandstone.clone(), shale.clone(), coal.clone()],
    ];
    for rules in orders {
        let rules = RuleSet::new(rules, Vec::new());
        let mut samples = vec![Sample::new(1.0)
            .with_curve("gamma", 60.0)
            .with_curve("density", 2.4)];
        let options = ClassifyOptions {
            use_researched_defaults: false,
            casing_depth: None,
        };
        classify(&mut samples, &rules, &CurveMapping::default(), &options);
        assert_eq!(samples[0].lithology, "SS");
    }
}

// ============================================================================
// Interbedding Detection
// ============================================================================

#[test]
fn thick_alternation_yields_no_candidates() {
    let depths = [0.0, 5.0, 12.0, 18.0, 25.0, 32.0, 40.0, 48.0, 55.0];
    let codes = ["SS", "SH", "SS", "SH", "SS", "SH", "SS", "SH"];
    let units: Vec<LithologyUnit> = codes
        .iter()
        .zip(depths.windows(2))
        .map(|(code, d)| LithologyUnit::new(d[0], d[1], code, None))
        .collect();

    assert!(detect(&units, &InterbeddingConfig::default()).is_empty());
}

#[test]
fn four_thin_layers_are_very_thinly_interbedded() {
    let units = units_from(10.0, &[("SS", 0.05), ("SH", 0.04), ("SS", 0.06), ("SH", 0.03)]);
    let candidates = detect(&units, &InterbeddingConfig::default());

    assert_eq!(candidates.len(), 1);
    let candidate = &candidates[0];
    assert_eq!(alternation_pattern(&candidate.units), vec!["SS", "SH"]);
    assert!((candidate.average_layer_thickness - 0.045).abs() < 1e-9);
    assert_eq!(
        candidate.interrelationship_code,
        InterrelationshipCode::VeryThinlyInterbedded
    );
    assert_eq!(candidate.interrelationship_code.as_str(), "UB");
}

#[test]
fn candidate_components_stay_within_bounds() {
    let layers: Vec<(&str, f64)> = [
        ("SS", 0.08),
        ("SH", 0.03),
        ("SI", 0.05),
        ("SS", 0.09),
        ("SH", 0.02),
        ("SI", 0.06),
        ("CO", 0.9),
        ("SS", 0.02),
        ("CO", 0.15),
        ("SS", 0.01),
        ("CO", 0.12),
        ("SH", 1.0),
        ("SS", 0.05),
        ("SH", 0.05),
        ("SS", 0.05),
        ("SH", 0.05),
    ]
    .to_vec();
    let units = units_from(0.0, &layers);
    let candidates = detect(&units, &InterbeddingConfig::default());
    assert!(!candidates.is_empty());

    for candidate in &candidates {
        let lithologies = candidate.lithologies();
        assert!((2..=4).contains(&lithologies.len()), "{lithologies:?}");
        for component in &candidate.components {
            assert!(component.sequence_rank == 1 || component.percentage >= 5.0);
        }
        let ranks: Vec<u8> = candidate.components.iter().map(|c| c.sequence_rank).collect();
        assert_eq!(ranks, (1..=ranks.len() as u8).collect::<Vec<_>>());
    }
}

// ============================================================================
// Merging
// ============================================================================

#[test]
fn adjacent_candidates_merge_into_one_group() {
    // 14 alternating layers split by the 10-unit cap into two touching candidates
    let mut layers: Vec<(&str, f64)> = (0..14)
        .map(|i| if i % 2 == 0 { ("SS", 0.06) } else { ("SH", 0.04) })
        .collect();
    layers.push(("CO", 1.0));
    let units = units_from(20.0, &layers);

    let candidates = detect(&units, &InterbeddingConfig::default());
    assert_eq!(candidates.len(), 2);
    assert!((candidates[0].to_depth - candidates[1].from_depth).abs() < 1e-9);
    let spans: f64 = candidates.iter().map(|c| c.to_depth - c.from_depth).sum();

    let output = apply_interbedding(&units, &candidates, &[0, 1], &RuleSet::builtin());

    let group: Vec<&LithologyUnit> = output.iter().filter(|u| u.is_interbedded()).collect();
    assert_eq!(group.len(), 2);
    assert_eq!(group[0].lithology_code, "SS");
    assert_eq!(group[0].record_sequence_flag, Some(1));
    assert_eq!(group[1].lithology_code, "SH");
    for row in &group {
        assert!((row.recovered_thickness - spans).abs() < 1e-9);
        assert!((row.from_depth - 20.0).abs() < 1e-9);
        assert_eq!(row.layer_count, 14);
    }
    assert_eq!(
        group[0].interrelationship_code,
        Some(InterrelationshipCode::VeryThinlyInterbedded)
    );
    assert_eq!(output.last().map(|u| u.lithology_code.as_str()), Some("CO"));
}

#[test]
fn thin_unit_merge_is_idempotent_on_grouped_logs() {
    // 0.01 m sampling with short runs leaves many sub-threshold units
    let mut samples = synthetic_log(300, 0.01, 3, &[SANDSTONE, SANDSTONE, SHALE, COAL, COAL]);
    let rules = RuleSet::builtin();
    classify(
        &mut samples,
        &rules,
        &CurveMapping::default(),
        &ClassifyOptions::default(),
    );
    let units = group_units(&samples, &rules).unwrap();

    let once = merge_thin_units(&units, 0.05);
    let twice = merge_thin_units(&once, 0.05);
    assert_eq!(once, twice);
}

// ============================================================================
// Full Pipeline
// ============================================================================

#[test]
fn pipeline_reads_cli_sample_json() {
    let json = r#"[
        {"depth": 100.00, "curves": {"gamma": 30.0, "density": 1.4}},
        {"depth": 100.05, "curves": {"gamma": 30.0, "density": 1.45}},
        {"depth": 100.10, "curves": {"gamma": 150.0, "density": 2.6}},
        {"depth": 100.15, "curves": {"gamma": 150.0, "density": -999.25}},
        {"depth": 100.20, "curves": {"gamma": 50.0, "density": 2.4}}
    ]"#;
    let mut samples: Vec<Sample> = serde_json::from_str(json).unwrap();
    let mut config = EngineConfig::default();
    config.merge.thin_units = false;

    let output = run_pipeline(&mut samples, &RuleSet::builtin(), &config).unwrap();

    // Null density leaves the fourth sample to the fallback guards; gamma > 200
    // is not met, so it stays "NL"
    let codes: Vec<&str> = samples.iter().map(|s| s.lithology.as_str()).collect();
    assert_eq!(codes, vec!["CO", "CO", "SH", "NL", "SS"]);
    let unit_codes: Vec<&str> = output.units.iter().map(|u| u.lithology_code.as_str()).collect();
    assert_eq!(unit_codes, vec!["CO", "SH", "NL", "SS"]);
    assert!(output.candidates.is_empty());

    let rendered = serde_json::to_value(&output).unwrap();
    assert_eq!(rendered["units"][0]["colour"], "BK");
    assert_eq!(rendered["summary"]["status"]["status"], "applied");
}

#[test]
fn deferred_selection_matches_automatic_application() {
    let curves = [SANDSTONE, SHALE];
    let mut samples = vec![Sample::new(0.0)
        .with_curve("gamma", COAL.0)
        .with_curve("density", COAL.1)];
    samples.extend(synthetic_log(40, 0.01, 5, &curves).into_iter().map(|mut s| {
        s.depth -= 49.99;
        s
    }));
    for i in 0..60 {
        samples.push(
            Sample::new(0.41 + f64::from(i) * 0.01)
                .with_curve("gamma", COAL.0)
                .with_curve("density", COAL.1),
        );
    }
    let rules = RuleSet::builtin();

    let mut automatic_samples = samples.clone();
    let automatic = run_pipeline(&mut automatic_samples, &rules, &EngineConfig::default()).unwrap();

    let mut config = EngineConfig::default();
    config.interbedding.selection = CandidateSelection::None;
    config.merge.thin_units = false;
    let deferred = run_pipeline(&mut samples, &rules, &config).unwrap();
    assert!(!deferred.candidates.is_empty());

    let all: Vec<usize> = (0..deferred.candidates.len()).collect();
    let applied = apply_interbedding(&deferred.units, &deferred.candidates, &all, &rules);
    assert_eq!(merge_thin_units(&applied, 0.05), automatic.units);
}

#[test]
fn batch_matches_single_runs() {
    let logs = [
        synthetic_log(200, 0.05, 4, &[COAL, SANDSTONE]),
        synthetic_log(150, 0.05, 9, &[SHALE, SILTSTONE, SANDSTONE]),
        synthetic_log(80, 0.02, 2, &[SANDSTONE, SHALE]),
    ];
    let rules = RuleSet::builtin();
    let config = EngineConfig::default();

    let boreholes: Vec<Borehole> = logs
        .iter()
        .enumerate()
        .map(|(i, samples)| Borehole::new(format!("BH{i:02}"), samples.clone()))
        .collect();
    let results = run_boreholes(boreholes, &rules, &config);

    for (result, samples) in results.iter().zip(logs.iter()) {
        let mut single = samples.clone();
        let expected = run_pipeline(&mut single, &rules, &config).unwrap();
        let actual = result.result.as_ref().unwrap();
        assert_eq!(actual.units, expected.units, "borehole {}", result.id);
        assert_eq!(result.samples, single);
    }
}

#[test]
fn single_sample_log_fails_only_its_own_borehole() {
    let rules = RuleSet::builtin();
    let config = EngineConfig::default();

    let mut lone = synthetic_log(1, 0.05, 1, &[SANDSTONE]);
    assert!(matches!(
        run_pipeline(&mut lone, &rules, &config),
        Err(EngineError::Grouping(GroupingError::SingleSample))
    ));

    let boreholes = vec![
        Borehole::new("BH-LONE", synthetic_log(1, 0.05, 1, &[SANDSTONE])),
        Borehole::new("BH-FULL", synthetic_log(60, 0.05, 3, &[COAL, SHALE])),
    ];
    let results = run_boreholes(boreholes, &rules, &config);
    assert_eq!(results[0].id, "BH-LONE");
    assert!(results[0].result.is_err());
    assert!(!results[1].result.as_ref().unwrap().units.is_empty());
}
