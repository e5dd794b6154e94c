//! Differences between two windowed aggregates
//!
//! Both column lists are aggregated with the same window, mode and grouping,
//! then subtracted pairwise: `a[i] - b[i]`, named `{a}_minus_{b}`.

use crate::config::AggregationConfig;
use crate::error::{FeatureError, Result};
use crate::table;
use polars::prelude::*;

use super::window::{Aggregation, WindowAggregator};

/// Pairwise difference of `aggregation` over `a_cols` and `b_cols`
pub fn diff(
    df: &DataFrame,
    a_cols: &[&str],
    b_cols: &[&str],
    config: AggregationConfig,
    aggregation: Aggregation,
) -> Result<DataFrame> {
    if a_cols.len() != b_cols.len() {
        return Err(FeatureError::invalid_parameter(
            "b_cols",
            b_cols.len(),
            format!("expected {} columns to pair with a_cols", a_cols.len()),
        ));
    }
    if aggregation == Aggregation::Count {
        return Err(FeatureError::invalid_parameter(
            "aggregation",
            "Count",
            "differences are defined for sums and means",
        ));
    }

    let keys: Vec<String> = match (&config.group_by, config.historical) {
        (Some(keys), false) => keys.clone(),
        _ => Vec::new(),
    };
    let aggregator = WindowAggregator::new(config)?;
    let a_frame = aggregator.apply(df, a_cols, aggregation)?;
    let b_frame = aggregator.apply(df, b_cols, aggregation)?;

    let mut series = Vec::new();
    for key in &keys {
        series.push(a_frame.column(key)?.as_materialized_series().clone());
    }
    for (a, b) in a_cols.iter().zip(b_cols) {
        let a_values = table::numeric_values(&a_frame, a)?;
        let b_values = table::numeric_values(&b_frame, b)?;
        let diffs = a_values
            .into_iter()
            .zip(b_values)
            .map(|(x, y)| Some(x? - y?))
            .collect();
        series.push(table::value_series(&format!("{}_minus_{}", a, b), diffs));
    }

    table::frame(series)
}

/// Difference of last-`k` sums
pub fn last_k_diff_sum(
    df: &DataFrame,
    a_cols: &[&str],
    b_cols: &[&str],
    k: usize,
    historical: bool,
) -> Result<DataFrame> {
    let config = AggregationConfig::last_k(k).with_historical(historical);
    diff(df, a_cols, b_cols, config, Aggregation::Sum)
}

/// Difference of last-`k` sums within each group
pub fn group_last_k_diff_sum(
    df: &DataFrame,
    a_cols: &[&str],
    b_cols: &[&str],
    k: usize,
    group_by: &[&str],
    historical: bool,
) -> Result<DataFrame> {
    let config = AggregationConfig::last_k(k)
        .with_historical(historical)
        .with_group_by(group_by);
    diff(df, a_cols, b_cols, config, Aggregation::Sum)
}

/// Difference of last-`k` means
pub fn last_k_diff_avg(
    df: &DataFrame,
    a_cols: &[&str],
    b_cols: &[&str],
    k: usize,
    historical: bool,
) -> Result<DataFrame> {
    let config = AggregationConfig::last_k(k).with_historical(historical);
    diff(df, a_cols, b_cols, config, Aggregation::Mean)
}

/// Difference of last-`k` means within each group
pub fn group_last_k_diff_avg(
    df: &DataFrame,
    a_cols: &[&str],
    b_cols: &[&str],
    k: usize,
    group_by: &[&str],
    historical: bool,
) -> Result<DataFrame> {
    let config = AggregationConfig::last_k(k)
        .with_historical(historical)
        .with_group_by(group_by);
    diff(df, a_cols, b_cols, config, Aggregation::Mean)
}
