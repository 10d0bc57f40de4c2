//! Quantified invariants of the suppression engine.
//!
//! These tests check the promises the engine makes regardless of input
//! shape: primary coverage, delta safety along every scanned window,
//! monotonicity under a tighter threshold, idempotence, and byte-stable
//! determinism.

use std::collections::{BTreeMap, BTreeSet};

use proptest::prelude::*;
use serde_json::json;

use shroud_core::{
    DimensionTuple, DimensionValue, SuppressionConfig, to_canonical_string,
};
use shroud_engine::{Record, SuppressedRow, SuppressionOutput, enumerate_axes, suppress};

fn records(rows: &[serde_json::Value]) -> Vec<Record> {
    rows.iter()
        .map(|v| v.as_object().cloned().expect("record must be an object"))
        .collect()
}

fn library_donors() -> Vec<Record> {
    records(&[
        json!({"age": 35, "sex": "M", "library_friend": "Yes", "zip_code": "00000", "count": 3}),
        json!({"age": 25, "sex": "F", "library_friend": "No", "zip_code": "00000", "count": 20}),
        json!({"age": 15, "sex": "M", "library_friend": "Yes", "zip_code": "00001", "count": 12}),
        json!({"age": 55, "sex": "F", "library_friend": "No", "zip_code": "00001", "count": 13}),
    ])
}

fn library_config() -> SuppressionConfig {
    SuppressionConfig::new(["age", "sex", "zip_code", "library_friend"])
        .with_incidence_column("count")
}

fn redacted_tuples(output: &SuppressionOutput) -> BTreeSet<DimensionTuple> {
    output
        .data
        .iter()
        .filter(|r| r.is_redacted)
        .map(|r| r.dims.clone())
        .collect()
}

/// Checks subtraction and delta safety over every axis the engine scanned:
/// wherever a clear cell follows a redacted one in a window (same
/// non-summable values), at least two cells in that slice must be redacted
/// and the running sum minus the redacted predecessor's incidence must clear
/// the threshold. This is exactly the negation of the scan trigger, so it
/// must hold everywhere at the fixed point.
fn assert_delta_safe(
    output: &SuppressionOutput,
    incidences: &BTreeMap<DimensionTuple, u64>,
    config: &SuppressionConfig,
) {
    let non_summable = config.sorted_non_summable_dimensions();

    let mut masked_by_slice: BTreeMap<DimensionTuple, usize> = BTreeMap::new();
    for row in &output.data {
        let entry = masked_by_slice
            .entry(row.dims.project(&non_summable))
            .or_insert(0);
        if row.is_redacted {
            *entry += 1;
        }
    }

    for axis in enumerate_axes(config) {
        let mut ordered: Vec<&SuppressedRow> = output.data.iter().collect();
        ordered.sort_by_cached_key(|row| {
            (
                row.dims.project(&axis.partition_dims),
                row.dims
                    .get(&axis.scan_dim)
                    .cloned()
                    .unwrap_or(DimensionValue::Null),
                row.dims.project(&non_summable),
                row.dims.clone(),
            )
        });

        let mut partition: Option<DimensionTuple> = None;
        let mut run_sum = 0u64;
        let mut previous: Option<&SuppressedRow> = None;

        for row in ordered {
            let key = row.dims.project(&axis.partition_dims);
            if partition.as_ref() != Some(&key) {
                partition = Some(key);
                run_sum = 0;
                previous = None;
            }
            let incidence = incidences[&row.dims];
            run_sum += incidence;

            if let Some(prev) = previous {
                let same_slice = non_summable
                    .iter()
                    .all(|d| row.dims.get(d) == prev.dims.get(d));
                if same_slice && prev.is_redacted && !row.is_redacted {
                    let masked = masked_by_slice[&row.dims.project(&non_summable)];
                    assert!(
                        masked >= 2,
                        "axis {axis}: {} is the only masked cell its slice hides",
                        prev.dims.canonical_string(),
                    );
                    let prev_incidence = incidences[&prev.dims];
                    assert!(
                        run_sum - prev_incidence >= config.threshold,
                        "axis {axis}: {} exposes {} (delta {})",
                        row.dims.canonical_string(),
                        prev.dims.canonical_string(),
                        run_sum - prev_incidence,
                    );
                }
            }
            previous = Some(row);
        }
    }
}

fn incidence_map(
    data: &[Record],
    config: &SuppressionConfig,
) -> BTreeMap<DimensionTuple, u64> {
    data.iter()
        .map(|record| {
            let mut dims = DimensionTuple::new();
            for name in &config.dimensions {
                let value = record
                    .get(name)
                    .map_or(DimensionValue::Null, |v| {
                        DimensionValue::from_json(name, v).expect("scalar value")
                    });
                dims.insert(name.clone(), value);
            }
            let incidence = record
                .get(&config.incidence_column)
                .and_then(serde_json::Value::as_u64)
                .expect("integer incidence");
            (dims, incidence)
        })
        .collect()
}

#[test]
fn primary_coverage_holds() {
    let config = library_config();
    let data = library_donors();
    let output = suppress(&data, &config).expect("suppress");

    for (dims, incidence) in incidence_map(&data, &config) {
        if incidence < config.threshold {
            let row = output
                .data
                .iter()
                .find(|r| r.dims == dims)
                .expect("row present in output");
            assert!(row.is_redacted, "{} left visible", dims.canonical_string());
        }
    }
}

#[test]
fn delta_safety_holds_on_converged_output() {
    let config = library_config();
    let data = library_donors();
    let output = suppress(&data, &config).expect("suppress");
    assert_delta_safe(&output, &incidence_map(&data, &config), &config);

    let config = SuppressionConfig::new(["group", "category"]).with_incidence_column("n");
    let data = records(&[
        json!({"group": "g", "category": "a", "n": 5}),
        json!({"group": "g", "category": "b", "n": 14}),
        json!({"group": "g", "category": "c", "n": 9}),
        json!({"group": "h", "category": "a", "n": 30}),
        json!({"group": "h", "category": "b", "n": 2}),
        json!({"group": "h", "category": "c", "n": 16}),
    ]);
    let output = suppress(&data, &config).expect("suppress");
    assert_delta_safe(&output, &incidence_map(&data, &config), &config);
}

#[test]
fn tighter_threshold_redacts_a_superset() {
    let data = library_donors();

    let loose = suppress(&data, &library_config().with_threshold(11)).expect("t=11");
    let mid = suppress(&data, &library_config().with_threshold(13)).expect("t=13");
    let tight = suppress(&data, &library_config().with_threshold(15)).expect("t=15");

    let loose_set = redacted_tuples(&loose);
    let mid_set = redacted_tuples(&mid);
    let tight_set = redacted_tuples(&tight);

    assert!(loose_set.is_subset(&mid_set));
    assert!(mid_set.is_subset(&tight_set));
}

#[test]
fn first_order_only_matches_the_primary_set_exactly() {
    let config = library_config().with_first_order_only(true);
    let data = library_donors();
    let output = suppress(&data, &config).expect("suppress");

    let expected: BTreeSet<DimensionTuple> = incidence_map(&data, &config)
        .into_iter()
        .filter(|(_, incidence)| *incidence < config.threshold)
        .map(|(dims, _)| dims)
        .collect();
    assert_eq!(redacted_tuples(&output), expected);
}

#[test]
fn recycling_the_output_is_idempotent() {
    let config = library_config();
    let data = library_donors();
    let first = suppress(&data, &config).expect("first run");
    let first_set = redacted_tuples(&first);

    // Recover the input with redacted incidences zeroed; those cells become
    // primary small cells on the second run.
    let recycled: Vec<Record> = data
        .iter()
        .map(|record| {
            let mut record = record.clone();
            let dims: DimensionTuple = config
                .dimensions
                .iter()
                .map(|name| {
                    (
                        name.clone(),
                        DimensionValue::from_json(name, &record[name]).expect("scalar"),
                    )
                })
                .collect();
            if first_set.contains(&dims) {
                record.insert("count".to_string(), json!(0));
            }
            record
        })
        .collect();

    let second = suppress(&recycled, &config).expect("second run");
    assert_eq!(redacted_tuples(&second), first_set);
}

#[test]
fn output_is_byte_stable_across_runs_and_input_order() {
    let config = library_config();
    let data = library_donors();

    let once = suppress(&data, &config).expect("run 1");
    let twice = suppress(&data, &config).expect("run 2");

    let mut reversed = data.clone();
    reversed.reverse();
    let shuffled = suppress(&reversed, &config).expect("run 3");

    let canonical_once = to_canonical_string(&once.data).expect("canonical");
    let canonical_twice = to_canonical_string(&twice.data).expect("canonical");
    let canonical_shuffled = to_canonical_string(&shuffled.data).expect("canonical");

    assert_eq!(canonical_once, canonical_twice);
    assert_eq!(canonical_once, canonical_shuffled);
    assert_eq!(once.stats, shuffled.stats);
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, ..ProptestConfig::default() })]

    #[test]
    fn random_tables_satisfy_primary_coverage_and_determinism(
        counts in prop::collection::vec(0u64..30, 1..12),
    ) {
        // Two dimensions over small category pools; counts drive which cells
        // are small. Tuples are deduplicated by construction.
        let cats = ["a", "b", "c", "d"];
        let groups = ["g1", "g2", "g3"];
        let data: Vec<Record> = counts
            .iter()
            .enumerate()
            .map(|(i, n)| {
                json!({
                    "cat": cats[i % cats.len()],
                    "group": groups[i / cats.len() % groups.len()],
                    "n": n,
                })
                .as_object()
                .cloned()
                .expect("object")
            })
            .collect();
        let config = SuppressionConfig::new(["cat", "group"]).with_incidence_column("n");

        let output = suppress(&data, &config).expect("suppress");

        // Primary coverage.
        for row in &output.data {
            let incidence = incidence_map(&data, &config)[&row.dims];
            if incidence < config.threshold {
                prop_assert!(row.is_redacted);
            }
        }

        // Redaction implies a reason and a non-empty peer group.
        for row in output.data.iter().filter(|r| r.is_redacted) {
            prop_assert!(row.redaction_reason.is_some());
            prop_assert!(!row.peer_group.is_empty());
        }

        // Determinism under re-run and input reversal.
        let rerun = suppress(&data, &config).expect("rerun");
        prop_assert_eq!(
            to_canonical_string(&output.data).expect("canonical"),
            to_canonical_string(&rerun.data).expect("canonical")
        );
        let mut reversed = data.clone();
        reversed.reverse();
        let shuffled = suppress(&reversed, &config).expect("shuffled");
        prop_assert_eq!(
            to_canonical_string(&output.data).expect("canonical"),
            to_canonical_string(&shuffled.data).expect("canonical")
        );

        // Delta safety on the converged output.
        assert_delta_safe(&output, &incidence_map(&data, &config), &config);
    }
}
