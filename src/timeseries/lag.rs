//! Lag features, globally or within key partitions

use crate::error::Result;
use crate::table;
use polars::prelude::*;
use tracing::debug;

use super::group::GroupIndex;
use super::rolling;

/// Shift columns by `k` rows.
///
/// Historical mode returns every row (row i holds row i - k, undefined where no
/// such row exists). Otherwise only the last shifted row is returned, i.e. the
/// value `k` rows before the end of the table.
pub fn lag(df: &DataFrame, cols: &[&str], k: usize, historical: bool) -> Result<DataFrame> {
    debug!(rows = df.height(), k, historical, "Computing lag");

    let series = cols
        .iter()
        .map(|name| {
            let shifted = rolling::shift(&table::numeric_values(df, name)?, k);
            let values = if historical {
                shifted
            } else {
                vec![shifted.last().copied().flatten()]
            };
            Ok(table::value_series(name, values))
        })
        .collect::<Result<Vec<_>>>()?;

    table::frame_with_height(series, if historical { df.height() } else { 1 })
}

/// Shift columns by `k` rows within each group.
///
/// `cols = None` lags every numeric column that is not a key. Historical output
/// keeps the input row order; terminal output has one row per group holding the
/// value `k` rows before the group's last row.
pub fn group_lag(
    df: &DataFrame,
    k: usize,
    group_by: &[&str],
    cols: Option<&[&str]>,
    historical: bool,
) -> Result<DataFrame> {
    let names: Vec<String> = match cols {
        Some(cols) => cols.iter().map(|c| c.to_string()).collect(),
        None => table::numeric_column_names(df, group_by),
    };

    let index = GroupIndex::build(df, group_by)?;
    debug!(rows = df.height(), groups = index.n_groups(), k, historical, "Computing group lag");

    let mut series = if historical { Vec::new() } else { index.key_columns() };
    for name in &names {
        let values = table::numeric_values(df, name)?;
        let lagged = if historical {
            index.map_rows(&values, |group| rolling::shift(group, k))
        } else {
            index.map_groups(&values, |group| lag_from_end(group, k))
        };
        series.push(table::value_series(name, lagged));
    }

    table::frame_with_height(series, df.height())
}

fn lag_from_end(values: &[Option<f64>], k: usize) -> Option<f64> {
    if k < values.len() {
        values[values.len() - k - 1]
    } else {
        None
    }
}
