//! Cumulative sums sampled at fixed intervals of a secondary index
//!
//! Converts "running total after each event" into "running total at index
//! checkpoints `interval, 2 * interval, ...`", per group. Rows of each group
//! are ordered by the index column before accumulating.

use crate::config::SegmentConfig;
use crate::error::{FeatureError, Result};
use crate::preprocessing::CategoryEncoder;
use crate::table::{self, KeyValue};
use polars::prelude::*;
use rayon::prelude::*;
use tracing::debug;

use super::group::GroupIndex;

/// Most checkpoints a single group may produce
pub const MAX_CHECKPOINTS: usize = 1_000_000;

/// Checkpoints of one group and the (sorted) row sampled at each.
///
/// `None` means the checkpoint falls before the group's first row.
fn scan_checkpoints(index: &[f64], interval: f64) -> Vec<(f64, Option<usize>)> {
    let Some(&max) = index.last() else {
        return Vec::new();
    };
    let steps = (max / interval).ceil();
    if !(steps >= 1.0) {
        return Vec::new();
    }

    let last = index.len() - 1;
    let mut cursor = 0;
    (1..=steps as usize)
        .map(|step| {
            let checkpoint = interval * step as f64;
            while cursor < last && index[cursor + 1] <= checkpoint {
                cursor += 1;
            }
            let row = (index[cursor] <= checkpoint).then_some(cursor);
            (checkpoint, row)
        })
        .collect()
}

/// Resampled output of one group
struct GroupSegments {
    checkpoints: Vec<f64>,
    /// One vector per target column
    values: Vec<Vec<Option<f64>>>,
}

fn segment_group(
    index: &GroupIndex,
    group: usize,
    positions: &[f64],
    targets: &[Vec<Option<f64>>],
    interval: f64,
) -> Result<GroupSegments> {
    let mut rows = index.partitions()[group].clone();
    rows.sort_by(|&a, &b| positions[a].total_cmp(&positions[b]));
    let sorted_index: Vec<f64> = rows.iter().map(|&r| positions[r]).collect();

    if let Some(&max) = sorted_index.last() {
        let steps = (max / interval).ceil();
        if steps > MAX_CHECKPOINTS as f64 {
            return Err(FeatureError::invalid_parameter(
                "interval",
                interval,
                format!(
                    "group {} needs {} checkpoints, at most {} are allowed",
                    index.keys()[group],
                    steps,
                    MAX_CHECKPOINTS
                ),
            ));
        }
    }

    let scan = scan_checkpoints(&sorted_index, interval);
    if scan.is_empty() {
        return Err(FeatureError::EmptySegment {
            group: index.keys()[group].to_string(),
        });
    }

    let values = targets
        .iter()
        .map(|column| {
            let mut running = 0.0;
            let cumulative: Vec<f64> = rows
                .iter()
                .map(|&r| {
                    running += column[r].unwrap_or(0.0);
                    running
                })
                .collect();
            scan.iter()
                .map(|&(_, row)| Some(row.map_or(0.0, |r| cumulative[r])))
                .collect()
        })
        .collect();

    Ok(GroupSegments {
        checkpoints: scan.into_iter().map(|(c, _)| c).collect(),
        values,
    })
}

fn resample(
    df: &DataFrame,
    targets: Vec<(String, Vec<Option<f64>>)>,
    config: &SegmentConfig,
) -> Result<DataFrame> {
    let positions = table::numeric_values(df, &config.index)?;
    table::require_complete(&config.index, &positions)?;
    // complete after the check above
    let positions: Vec<f64> = positions.into_iter().flatten().collect();
    let infinite = positions.iter().filter(|p| !p.is_finite()).count();
    if infinite > 0 {
        return Err(FeatureError::InvalidInput(format!(
            "Index column '{}' contains {} non-finite values",
            config.index, infinite
        )));
    }

    let index = GroupIndex::build(df, &config.group_by)?;
    debug!(
        rows = df.height(),
        groups = index.n_groups(),
        interval = config.interval,
        "Resampling cumulative sums"
    );

    let columns: Vec<Vec<Option<f64>>> = targets.iter().map(|(_, v)| v.clone()).collect();
    let segments: Vec<GroupSegments> = (0..index.n_groups())
        .into_par_iter()
        .map(|group| segment_group(&index, group, &positions, &columns, config.interval))
        .collect::<Result<_>>()?;

    let mut keys: Vec<Vec<KeyValue>> = vec![Vec::new(); config.group_by.len()];
    let mut values: Vec<Vec<Option<f64>>> = vec![Vec::new(); targets.len()];
    let mut checkpoints: Vec<Option<f64>> = Vec::new();
    for (key, segment) in index.keys().iter().zip(segments) {
        for (column, part) in keys.iter_mut().zip(&key.0) {
            column.extend(std::iter::repeat(part.clone()).take(segment.checkpoints.len()));
        }
        for (column, part) in values.iter_mut().zip(segment.values) {
            column.extend(part);
        }
        checkpoints.extend(segment.checkpoints.into_iter().map(Some));
    }

    let mut series: Vec<Series> = config
        .group_by
        .iter()
        .zip(&keys)
        .map(|(name, column)| table::key_series(name, column))
        .collect();
    for ((name, _), column) in targets.iter().zip(values) {
        series.push(table::value_series(name, column));
    }
    series.push(table::value_series(&config.index, checkpoints));

    table::frame(series)
}

fn empty_result(config: &SegmentConfig, cols: &[String]) -> Result<DataFrame> {
    let mut series: Vec<Series> = config
        .group_by
        .iter()
        .map(|name| table::key_series(name, &[]))
        .collect();
    for name in cols.iter().chain(std::iter::once(&config.index)) {
        series.push(table::value_series(name, Vec::new()));
    }
    table::frame(series)
}

/// Per-group cumulative sums of `cols` sampled every `config.interval` along
/// `config.index`.
///
/// Output columns: group keys, the cumulative targets, then the index column
/// holding each checkpoint. An empty table yields an empty frame.
pub fn group_sum_index(df: &DataFrame, cols: &[&str], config: &SegmentConfig) -> Result<DataFrame> {
    config.validate()?;
    if df.height() == 0 {
        let names: Vec<String> = cols.iter().map(|c| c.to_string()).collect();
        return empty_result(config, &names);
    }

    let targets = cols
        .iter()
        .map(|name| Ok((name.to_string(), table::numeric_values(df, name)?)))
        .collect::<Result<Vec<_>>>()?;
    resample(df, targets, config)
}

/// Per-group cumulative category counts sampled every `config.interval`.
///
/// The category column must be complete; it is one-hot encoded (over
/// `categories` when given, at most 20) and each indicator is resampled as in
/// [`group_sum_index`].
pub fn group_category_count_index(
    df: &DataFrame,
    category_index: &str,
    config: &SegmentConfig,
    categories: Option<&[String]>,
) -> Result<DataFrame> {
    config.validate()?;

    let missing = table::key_values(df, category_index)?
        .iter()
        .filter(|v| v.is_null())
        .count();
    if missing > 0 {
        return Err(FeatureError::MissingValues {
            column: category_index.to_string(),
            count: missing,
        });
    }

    let indicators = CategoryEncoder::new().encode(df, category_index, categories)?;
    let targets: Vec<(String, Vec<Option<f64>>)> = indicators
        .into_iter()
        .map(|indicator| (indicator.name, indicator.values))
        .collect();

    if df.height() == 0 {
        let names: Vec<String> = targets.into_iter().map(|(name, _)| name).collect();
        return empty_result(config, &names);
    }
    resample(df, targets, config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_between_and_beyond() {
        let scan = scan_checkpoints(&[1.0, 3.0], 2.0);
        assert_eq!(scan, vec![(2.0, Some(0)), (4.0, Some(1))]);
    }

    #[test]
    fn test_scan_before_first_row() {
        let scan = scan_checkpoints(&[5.0, 6.0], 2.0);
        assert_eq!(scan, vec![(2.0, None), (4.0, None), (6.0, Some(1))]);
    }

    #[test]
    fn test_scan_ties_take_last_row() {
        let scan = scan_checkpoints(&[1.0, 2.0, 2.0, 7.0], 2.0);
        assert_eq!(scan[0], (2.0, Some(2)));
        assert_eq!(scan[1], (4.0, Some(2)));
        assert_eq!(scan.last(), Some(&(8.0, Some(3))));
    }

    #[test]
    fn test_scan_without_checkpoints() {
        assert!(scan_checkpoints(&[], 1.0).is_empty());
        assert!(scan_checkpoints(&[-3.0, 0.0], 1.0).is_empty());
    }

    #[test]
    fn test_non_positive_index_is_explicit_error() {
        let df = df!(
            "team" => &["a", "a"],
            "minute" => &[-2.0, 0.0],
            "shots" => &[1.0, 1.0],
        )
        .unwrap();
        let config = SegmentConfig::new(&["team"], "minute", 15.0);
        let err = group_sum_index(&df, &["shots"], &config).unwrap_err();
        assert!(matches!(err, FeatureError::EmptySegment { ref group } if group == "(a)"));
    }

    #[test]
    fn test_infinite_index_rejected() {
        let df = df!(
            "team" => &["a", "a"],
            "minute" => &[1.0, f64::INFINITY],
            "shots" => &[1.0, 1.0],
        )
        .unwrap();
        let config = SegmentConfig::new(&["team"], "minute", 2.0);
        let err = group_sum_index(&df, &["shots"], &config).unwrap_err();
        assert!(matches!(err, FeatureError::InvalidInput(_)));
    }

    #[test]
    fn test_checkpoint_count_is_bounded() {
        let df = df!(
            "team" => &["a", "a"],
            "minute" => &[1.0, 1.0e12],
            "shots" => &[1.0, 1.0],
        )
        .unwrap();
        let config = SegmentConfig::new(&["team"], "minute", 1.0);
        let err = group_sum_index(&df, &["shots"], &config).unwrap_err();
        assert!(matches!(err, FeatureError::InvalidParameter { ref name, .. } if name == "interval"));
    }
}
