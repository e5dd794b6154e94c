//! Window aggregation over whole tables or key partitions

use crate::config::{AggregationConfig, WindowSpec};
use crate::error::{FeatureError, Result};
use crate::preprocessing::CategoryEncoder;
use crate::table;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::group::GroupIndex;
use super::rolling;

/// Aggregation kinds supported by [`WindowAggregator`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Aggregation {
    Sum,
    Mean,
    /// Occurrence count of each category of a categorical column
    Count,
}

/// Kernel pair resolved from a window and an aggregation kind
#[derive(Debug, Clone, Copy)]
enum Kernel {
    FixedSum(usize),
    FixedMean(usize),
    ExpandingSum,
    ExpandingMean,
    Ewm(f64),
}

impl Kernel {
    fn resolve(window: WindowSpec, aggregation: Aggregation) -> Result<Self> {
        match (window, aggregation) {
            (WindowSpec::Fixed { size }, Aggregation::Sum | Aggregation::Count) => {
                Ok(Kernel::FixedSum(size))
            }
            (WindowSpec::Fixed { size }, Aggregation::Mean) => Ok(Kernel::FixedMean(size)),
            (WindowSpec::Expanding, Aggregation::Sum | Aggregation::Count) => {
                Ok(Kernel::ExpandingSum)
            }
            (WindowSpec::Expanding, Aggregation::Mean) => Ok(Kernel::ExpandingMean),
            (WindowSpec::Exponential { alpha }, Aggregation::Mean) => Ok(Kernel::Ewm(alpha)),
            (WindowSpec::Exponential { alpha }, other) => Err(FeatureError::invalid_parameter(
                "window",
                format!("exponential(alpha={})", alpha),
                format!("{:?} requires a fixed or expanding window", other),
            )),
        }
    }

    /// Raw aggregate ending at each row
    fn trace(self, values: &[Option<f64>]) -> Vec<Option<f64>> {
        match self {
            Kernel::FixedSum(k) => rolling::rolling_sum(values, k),
            Kernel::FixedMean(k) => rolling::rolling_mean(values, k),
            Kernel::ExpandingSum => rolling::expanding_sum(values),
            Kernel::ExpandingMean => rolling::expanding_mean(values),
            Kernel::Ewm(alpha) => rolling::ewm_mean(values, alpha),
        }
    }

    /// Causal trace: row i sees only rows before i
    fn historical(self, values: &[Option<f64>]) -> Vec<Option<f64>> {
        rolling::shift(&self.trace(values), 1)
    }

    /// Summary over the most recent window
    fn terminal(self, values: &[Option<f64>]) -> Option<f64> {
        match self {
            Kernel::FixedSum(k) => rolling::tail_sum(values, k),
            Kernel::FixedMean(k) => rolling::tail_mean(values, k),
            Kernel::ExpandingSum => rolling::total_sum(values),
            Kernel::ExpandingMean => rolling::mean(values),
            Kernel::Ewm(alpha) => rolling::final_ewm(values, alpha),
        }
    }
}

/// Computes windowed aggregates as configured by an [`AggregationConfig`].
///
/// Output shape:
/// - historical: one row per input row, same order, columns named as the targets
/// - terminal, ungrouped: a single row
/// - terminal, grouped: key columns followed by one row per group in key order
#[derive(Debug, Clone)]
pub struct WindowAggregator {
    config: AggregationConfig,
}

impl WindowAggregator {
    /// Create an aggregator, validating the configuration
    pub fn new(config: AggregationConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &AggregationConfig {
        &self.config
    }

    /// Windowed sum of numeric columns
    pub fn sum(&self, df: &DataFrame, cols: &[&str]) -> Result<DataFrame> {
        let columns = Self::read_numeric(df, cols)?;
        self.aggregate(df, columns, Aggregation::Sum)
    }

    /// Windowed mean of numeric columns
    pub fn mean(&self, df: &DataFrame, cols: &[&str]) -> Result<DataFrame> {
        let columns = Self::read_numeric(df, cols)?;
        self.aggregate(df, columns, Aggregation::Mean)
    }

    /// Windowed per-category counts of categorical columns.
    ///
    /// Every column is checked against the category cap before anything is
    /// encoded; result columns are named `{column}_{category}`.
    pub fn count(&self, df: &DataFrame, cols: &[&str]) -> Result<DataFrame> {
        Kernel::resolve(self.config.window, Aggregation::Count)?;

        let encoder = CategoryEncoder::new();
        encoder.check_cardinality(df, cols)?;

        let mut columns = Vec::new();
        for col in cols {
            for indicator in encoder.encode(df, col, None)? {
                columns.push((indicator.name, indicator.values));
            }
        }
        self.aggregate(df, columns, Aggregation::Count)
    }

    /// Dispatch on [`Aggregation`]
    pub fn apply(
        &self,
        df: &DataFrame,
        cols: &[&str],
        aggregation: Aggregation,
    ) -> Result<DataFrame> {
        match aggregation {
            Aggregation::Sum => self.sum(df, cols),
            Aggregation::Mean => self.mean(df, cols),
            Aggregation::Count => self.count(df, cols),
        }
    }

    fn read_numeric(df: &DataFrame, cols: &[&str]) -> Result<Vec<(String, Vec<Option<f64>>)>> {
        cols.iter()
            .map(|name| Ok((name.to_string(), table::numeric_values(df, name)?)))
            .collect()
    }

    fn aggregate(
        &self,
        df: &DataFrame,
        columns: Vec<(String, Vec<Option<f64>>)>,
        aggregation: Aggregation,
    ) -> Result<DataFrame> {
        let kernel = Kernel::resolve(self.config.window, aggregation)?;

        debug!(
            rows = df.height(),
            columns = columns.len(),
            window = ?self.config.window,
            historical = self.config.historical,
            grouped = self.config.group_by.is_some(),
            ?aggregation,
            "Computing window aggregate"
        );
        if let WindowSpec::Fixed { size } = self.config.window {
            if size > df.height() {
                warn!(size, rows = df.height(), "Window is longer than the table");
            }
        }

        let series = match (&self.config.group_by, self.config.historical) {
            (None, true) => columns
                .into_iter()
                .map(|(name, values)| table::value_series(&name, kernel.historical(&values)))
                .collect(),
            (None, false) => columns
                .into_iter()
                .map(|(name, values)| table::value_series(&name, vec![kernel.terminal(&values)]))
                .collect(),
            (Some(keys), true) => {
                let index = GroupIndex::build(df, keys)?;
                columns
                    .into_iter()
                    .map(|(name, values)| {
                        let merged = index.map_rows(&values, |group| kernel.historical(group));
                        table::value_series(&name, merged)
                    })
                    .collect()
            }
            (Some(keys), false) => {
                let index = GroupIndex::build(df, keys)?;
                let mut series = index.key_columns();
                for (name, values) in columns {
                    let reduced = index.map_groups(&values, |group| kernel.terminal(group));
                    series.push(table::value_series(&name, reduced));
                }
                series
            }
        };

        let height = if self.config.historical { df.height() } else { 1 };
        table::frame_with_height(series, height)
    }
}
