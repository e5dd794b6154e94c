//! Partitioning by key columns with row-order restoration
//!
//! A [`GroupIndex`] records, for every distinct key, the positions of its rows
//! in ascending order. Per-group results are computed on gathered copies of
//! each partition and then scattered back by original position, so the merged
//! output has exactly the input's row identity and order.

use crate::error::{FeatureError, Result};
use crate::table::{self, GroupKey, KeyValue};
use polars::prelude::*;
use rayon::prelude::*;
use std::collections::BTreeMap;
use tracing::debug;

/// Stable partition index over a table
#[derive(Debug, Clone)]
pub struct GroupIndex {
    group_by: Vec<String>,
    keys: Vec<GroupKey>,
    partitions: Vec<Vec<usize>>,
    n_rows: usize,
}

impl GroupIndex {
    /// Partition `df` by the values of `group_by`; groups are ordered by key
    pub fn build<S: AsRef<str>>(df: &DataFrame, group_by: &[S]) -> Result<Self> {
        if group_by.is_empty() {
            return Err(FeatureError::invalid_parameter(
                "group_by",
                "[]",
                "at least one key column is required",
            ));
        }

        let key_columns: Vec<Vec<KeyValue>> = group_by
            .iter()
            .map(|name| table::key_values(df, name.as_ref()))
            .collect::<Result<_>>()?;

        let n_rows = df.height();
        let mut groups: BTreeMap<GroupKey, Vec<usize>> = BTreeMap::new();
        for row in 0..n_rows {
            let key = GroupKey(key_columns.iter().map(|c| c[row].clone()).collect());
            groups.entry(key).or_default().push(row);
        }

        let (keys, partitions): (Vec<_>, Vec<_>) = groups.into_iter().unzip();
        debug!(rows = n_rows, groups = keys.len(), "Built group index");

        Ok(Self {
            group_by: group_by.iter().map(|s| s.as_ref().to_string()).collect(),
            keys,
            partitions,
            n_rows,
        })
    }

    pub fn n_groups(&self) -> usize {
        self.keys.len()
    }

    pub fn keys(&self) -> &[GroupKey] {
        &self.keys
    }

    /// Row positions of each group, ascending
    pub fn partitions(&self) -> &[Vec<usize>] {
        &self.partitions
    }

    /// Copy one column's values for a partition, in row order
    pub fn gather<T: Clone>(&self, values: &[T], group: usize) -> Vec<T> {
        self.partitions[group]
            .iter()
            .map(|&row| values[row].clone())
            .collect()
    }

    /// Apply a per-group kernel and merge the results back into row order.
    ///
    /// `kernel` receives one group's values and must return one value per input.
    pub fn map_rows<F>(&self, values: &[Option<f64>], kernel: F) -> Vec<Option<f64>>
    where
        F: Fn(&[Option<f64>]) -> Vec<Option<f64>> + Sync,
    {
        let per_group: Vec<Vec<Option<f64>>> = (0..self.n_groups())
            .into_par_iter()
            .map(|group| kernel(&self.gather(values, group)))
            .collect();

        self.scatter(per_group)
    }

    /// Write per-group results back to their original row positions
    pub fn scatter(&self, per_group: Vec<Vec<Option<f64>>>) -> Vec<Option<f64>> {
        let mut merged = vec![None; self.n_rows];
        for (rows, results) in self.partitions.iter().zip(per_group) {
            debug_assert_eq!(rows.len(), results.len());
            for (&row, value) in rows.iter().zip(results) {
                merged[row] = value;
            }
        }
        merged
    }

    /// Apply a per-group reduction, one value per group in key order
    pub fn map_groups<F>(&self, values: &[Option<f64>], reduce: F) -> Vec<Option<f64>>
    where
        F: Fn(&[Option<f64>]) -> Option<f64> + Sync,
    {
        (0..self.n_groups())
            .into_par_iter()
            .map(|group| reduce(&self.gather(values, group)))
            .collect()
    }

    /// Key columns with one row per group
    pub fn key_columns(&self) -> Vec<Series> {
        self.group_by
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let values: Vec<KeyValue> = self.keys.iter().map(|k| k.0[i].clone()).collect();
                table::key_series(name, &values)
            })
            .collect()
    }

    /// Frame of key columns with one row per group
    pub fn key_frame(&self) -> Result<DataFrame> {
        table::frame(self.key_columns())
    }
}
