//! Integration tests: window aggregates, lags and grouping

use polars::prelude::*;
use temporal_features::prelude::*;
use temporal_features::timeseries::{
    count, group_avg, group_count, group_lag, group_last_k_count, group_last_k_sum,
    group_moment_avg, lag, last_k_count, last_k_sum, moment_avg,
};

fn f64_column(df: &DataFrame, name: &str) -> Vec<Option<f64>> {
    df.column(name)
        .unwrap()
        .as_materialized_series()
        .f64()
        .unwrap()
        .into_iter()
        .collect()
}

fn league() -> DataFrame {
    df!(
        "team" => &["ars", "che", "ars", "liv", "che", "ars", "liv", "che"],
        "goals" => &[2.0, 0.0, 1.0, 3.0, 2.0, 4.0, 1.0, 1.0],
        "result" => &["W", "L", "D", "W", "W", "W", "L", "D"],
    )
    .unwrap()
}

// ============================================================================
// Fixed windows
// ============================================================================

#[test]
fn test_last_k_sum_matches_definition() {
    let df = league();
    let goals = f64_column(&df, "goals");

    for k in 1..=4 {
        let out = last_k_sum(&df, &["goals"], k, true).unwrap();
        let sums = f64_column(&out, "goals");
        assert_eq!(sums.len(), df.height());

        for (i, value) in sums.iter().enumerate() {
            if i < k {
                assert_eq!(*value, None, "row {} with k={} should be undefined", i, k);
            } else {
                let expected: f64 = goals[i - k..i].iter().flatten().sum();
                assert!((value.unwrap() - expected).abs() < 1e-9);
            }
        }
    }
}

#[test]
fn test_last_k_sum_terminal_single_row() {
    let out = last_k_sum(&league(), &["goals"], 3, false).unwrap();
    assert_eq!(out.height(), 1);
    assert_eq!(f64_column(&out, "goals"), vec![Some(6.0)]);
}

#[test]
fn test_window_config_object() {
    let config = AggregationConfig::last_k(2).with_group_by(&["team"]);
    let aggregator = WindowAggregator::new(config).unwrap();
    let out = aggregator.mean(&league(), &["goals"]).unwrap();

    // ars rows 0,2,5 / che rows 1,4,7 / liv rows 3,6
    assert_eq!(
        f64_column(&out, "goals"),
        vec![None, None, Some(2.0), None, Some(0.0), Some(1.5), Some(3.0), Some(1.0)]
    );
}

#[test]
fn test_invalid_window_rejected() {
    let err = last_k_sum(&league(), &["goals"], 0, true).unwrap_err();
    assert!(matches!(err, FeatureError::InvalidParameter { .. }));
}

#[test]
fn test_window_longer_than_table() {
    let out = last_k_sum(&league(), &["goals"], 50, true).unwrap();
    assert!(f64_column(&out, "goals").iter().all(|v| v.is_none()));
}

// ============================================================================
// Exponential windows
// ============================================================================

#[test]
fn test_moment_avg_recurrence() {
    let df = df!("x" => &[2.0, 4.0, 6.0]).unwrap();

    let terminal = moment_avg(&df, &["x"], 0.5, false).unwrap();
    assert_eq!(f64_column(&terminal, "x"), vec![Some(4.5)]);

    let historical = moment_avg(&df, &["x"], 0.5, true).unwrap();
    assert_eq!(f64_column(&historical, "x")[2], Some(3.0));
}

#[test]
fn test_group_moment_avg_terminal() {
    let df = df!(
        "team" => &["a", "b", "a", "a"],
        "x" => &[2.0, 10.0, 4.0, 6.0],
    )
    .unwrap();
    let out = group_moment_avg(&df, &["x"], 0.5, &["team"], false).unwrap();
    assert_eq!(f64_column(&out, "x"), vec![Some(4.5), Some(10.0)]);
}

// ============================================================================
// Grouping preserves row identity
// ============================================================================

#[test]
fn test_grouped_historical_preserves_order() {
    let df = league();

    let sums = group_last_k_sum(&df, &["goals"], 1, &["team"], true).unwrap();
    assert_eq!(sums.height(), df.height());
    // k = 1 is the previous match of the same team
    assert_eq!(
        f64_column(&sums, "goals"),
        vec![None, None, Some(2.0), None, Some(0.0), Some(1.0), Some(3.0), Some(2.0)]
    );

    let lagged = group_lag(&df, 1, &["team"], Some(&["goals"]), true).unwrap();
    assert_eq!(f64_column(&lagged, "goals"), f64_column(&sums, "goals"));
}

#[test]
fn test_group_avg_terminal_one_row_per_group() {
    let out = group_avg(&league(), &["goals"], &["team"], false).unwrap();
    assert_eq!(out.height(), 3);
    let teams: Vec<Option<&str>> = out
        .column("team")
        .unwrap()
        .as_materialized_series()
        .str()
        .unwrap()
        .into_iter()
        .collect();
    assert_eq!(teams, vec![Some("ars"), Some("che"), Some("liv")]);
    assert_eq!(f64_column(&out, "goals")[2], Some(2.0));
}

#[test]
fn test_group_lag_terminal() {
    let out = group_lag(&league(), 1, &["team"], Some(&["goals"]), false).unwrap();
    // second to last value per team; every team has at least two rows
    assert_eq!(f64_column(&out, "goals"), vec![Some(1.0), Some(2.0), Some(3.0)]);

    let too_far = group_lag(&league(), 2, &["team"], Some(&["goals"]), false).unwrap();
    assert_eq!(f64_column(&too_far, "goals"), vec![Some(2.0), Some(0.0), None]);
}

#[test]
fn test_lag_identity() {
    let df = league();
    let once = lag(&df, &["goals"], 0, true).unwrap();
    let twice = lag(&once, &["goals"], 0, true).unwrap();
    assert_eq!(f64_column(&twice, "goals"), f64_column(&df, "goals"));
}

// ============================================================================
// Category counts
// ============================================================================

#[test]
fn test_group_count_historical() {
    let out = group_count(&league(), &["result"], &["team"], true).unwrap();
    assert_eq!(out.height(), 8);
    // wins before each of ars' matches (rows 0, 2, 5): 0 prior, 1, 1
    let wins = f64_column(&out, "result_W");
    assert_eq!(wins[0], None);
    assert_eq!(wins[2], Some(1.0));
    assert_eq!(wins[5], Some(1.0));
}

#[test]
fn test_group_last_k_count_terminal() {
    let out = group_last_k_count(&league(), &["result"], 2, &["team"], false).unwrap();
    assert_eq!(out.height(), 3);
    // che's last two: W, D
    assert_eq!(f64_column(&out, "result_W")[1], Some(1.0));
    assert_eq!(f64_column(&out, "result_D")[1], Some(1.0));
}

#[test]
fn test_category_cap_on_every_entry_point() {
    let venues: Vec<String> = (0..21).map(|i| format!("stadium_{}", i)).collect();
    let teams: Vec<&str> = (0..21).map(|i| if i % 2 == 0 { "a" } else { "b" }).collect();
    let df = df!("venue" => venues, "team" => teams).unwrap();

    let results = vec![
        count(&df, &["venue"], true),
        count(&df, &["venue"], false),
        last_k_count(&df, &["venue"], 3, true),
        last_k_count(&df, &["venue"], 3, false),
        group_count(&df, &["venue"], &["team"], true),
        group_last_k_count(&df, &["venue"], 3, &["team"], false),
    ];
    for result in results {
        assert!(matches!(
            result,
            Err(FeatureError::CardinalityExceeded { found: 21, limit: 20, .. })
        ));
    }
}

#[test]
fn test_count_all_null_column_keeps_row_identity() {
    let df = df!(
        "team" => &["a", "b", "a"],
        "result" => &[None::<&str>, None, None],
    )
    .unwrap();

    let out = count(&df, &["result"], true).unwrap();
    assert_eq!(out.height(), df.height());

    let grouped = group_count(&df, &["result"], &["team"], true).unwrap();
    assert_eq!(grouped.height(), df.height());
}
