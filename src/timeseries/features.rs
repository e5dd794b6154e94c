//! Named feature shortcuts
//!
//! Each function is one [`WindowAggregator`] configuration. `historical`
//! selects the per-row causal trace over the terminal summary.

use crate::config::AggregationConfig;
use crate::error::Result;
use polars::prelude::*;

use super::window::WindowAggregator;

fn run(config: AggregationConfig) -> Result<WindowAggregator> {
    WindowAggregator::new(config)
}

/// Sum of the last `k` rows
pub fn last_k_sum(df: &DataFrame, cols: &[&str], k: usize, historical: bool) -> Result<DataFrame> {
    run(AggregationConfig::last_k(k).with_historical(historical))?.sum(df, cols)
}

/// Sum of the last `k` rows within each group
pub fn group_last_k_sum(
    df: &DataFrame,
    cols: &[&str],
    k: usize,
    group_by: &[&str],
    historical: bool,
) -> Result<DataFrame> {
    run(AggregationConfig::last_k(k)
        .with_historical(historical)
        .with_group_by(group_by))?
    .sum(df, cols)
}

/// Cumulative sum of all previous rows
pub fn cum_sum(df: &DataFrame, cols: &[&str], historical: bool) -> Result<DataFrame> {
    run(AggregationConfig::expanding().with_historical(historical))?.sum(df, cols)
}

/// Cumulative sum of all previous rows within each group
pub fn group_sum(df: &DataFrame, cols: &[&str], group_by: &[&str], historical: bool) -> Result<DataFrame> {
    run(AggregationConfig::expanding()
        .with_historical(historical)
        .with_group_by(group_by))?
    .sum(df, cols)
}

/// Mean of the last `k` rows
pub fn last_k_avg(df: &DataFrame, cols: &[&str], k: usize, historical: bool) -> Result<DataFrame> {
    run(AggregationConfig::last_k(k).with_historical(historical))?.mean(df, cols)
}

/// Mean of the last `k` rows within each group
pub fn group_last_k_avg(
    df: &DataFrame,
    cols: &[&str],
    k: usize,
    group_by: &[&str],
    historical: bool,
) -> Result<DataFrame> {
    run(AggregationConfig::last_k(k)
        .with_historical(historical)
        .with_group_by(group_by))?
    .mean(df, cols)
}

/// Mean of all previous rows
pub fn avg(df: &DataFrame, cols: &[&str], historical: bool) -> Result<DataFrame> {
    run(AggregationConfig::expanding().with_historical(historical))?.mean(df, cols)
}

/// Mean of all previous rows within each group
pub fn group_avg(df: &DataFrame, cols: &[&str], group_by: &[&str], historical: bool) -> Result<DataFrame> {
    run(AggregationConfig::expanding()
        .with_historical(historical)
        .with_group_by(group_by))?
    .mean(df, cols)
}

/// Exponentially weighted mean with smoothing factor `alpha`
pub fn moment_avg(df: &DataFrame, cols: &[&str], alpha: f64, historical: bool) -> Result<DataFrame> {
    run(AggregationConfig::exponential(alpha).with_historical(historical))?.mean(df, cols)
}

/// Exponentially weighted mean within each group
pub fn group_moment_avg(
    df: &DataFrame,
    cols: &[&str],
    alpha: f64,
    group_by: &[&str],
    historical: bool,
) -> Result<DataFrame> {
    run(AggregationConfig::exponential(alpha)
        .with_historical(historical)
        .with_group_by(group_by))?
    .mean(df, cols)
}

/// Per-category counts over the last `k` rows
pub fn last_k_count(df: &DataFrame, cols: &[&str], k: usize, historical: bool) -> Result<DataFrame> {
    run(AggregationConfig::last_k(k).with_historical(historical))?.count(df, cols)
}

/// Per-category counts over the last `k` rows within each group
pub fn group_last_k_count(
    df: &DataFrame,
    cols: &[&str],
    k: usize,
    group_by: &[&str],
    historical: bool,
) -> Result<DataFrame> {
    run(AggregationConfig::last_k(k)
        .with_historical(historical)
        .with_group_by(group_by))?
    .count(df, cols)
}

/// Per-category counts over all previous rows
pub fn count(df: &DataFrame, cols: &[&str], historical: bool) -> Result<DataFrame> {
    run(AggregationConfig::expanding().with_historical(historical))?.count(df, cols)
}

/// Per-category counts over all previous rows within each group
pub fn group_count(df: &DataFrame, cols: &[&str], group_by: &[&str], historical: bool) -> Result<DataFrame> {
    run(AggregationConfig::expanding()
        .with_historical(historical)
        .with_group_by(group_by))?
    .count(df, cols)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(df: &DataFrame, name: &str) -> Vec<Option<f64>> {
        df.column(name)
            .unwrap()
            .as_materialized_series()
            .f64()
            .unwrap()
            .into_iter()
            .collect()
    }

    #[test]
    fn test_moment_avg_terminal_and_historical() {
        let df = df!("x" => &[2.0, 4.0, 6.0]).unwrap();

        let terminal = moment_avg(&df, &["x"], 0.5, false).unwrap();
        assert_eq!(values(&terminal, "x"), vec![Some(4.5)]);

        let trace = moment_avg(&df, &["x"], 0.5, true).unwrap();
        assert_eq!(values(&trace, "x"), vec![None, Some(2.0), Some(3.0)]);
    }

    #[test]
    fn test_count_historical() {
        let df = df!("result" => &["W", "L", "W", "W"]).unwrap();
        let out = count(&df, &["result"], true).unwrap();
        assert_eq!(values(&out, "result_W"), vec![None, Some(1.0), Some(1.0), Some(2.0)]);
        assert_eq!(values(&out, "result_L"), vec![None, Some(0.0), Some(1.0), Some(1.0)]);
    }

    #[test]
    fn test_last_k_count_terminal() {
        let df = df!("result" => &["W", "L", "W", "D"]).unwrap();
        let out = last_k_count(&df, &["result"], 2, false).unwrap();
        assert_eq!(out.height(), 1);
        assert_eq!(values(&out, "result_D"), vec![Some(1.0)]);
        assert_eq!(values(&out, "result_L"), vec![Some(0.0)]);
        assert_eq!(values(&out, "result_W"), vec![Some(1.0)]);
    }

    #[test]
    fn test_group_sum_terminal() {
        let df = df!(
            "team" => &[2i64, 1, 2],
            "goals" => &[1.0, 5.0, 2.0],
        )
        .unwrap();
        let out = group_sum(&df, &["goals"], &["team"], false).unwrap();
        assert_eq!(values(&out, "goals"), vec![Some(5.0), Some(3.0)]);
        let keys: Vec<Option<i64>> = out
            .column("team")
            .unwrap()
            .as_materialized_series()
            .i64()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(keys, vec![Some(1), Some(2)]);
    }
}
