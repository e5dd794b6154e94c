//! Table access layer
//!
//! Feature operations consume a polars [`DataFrame`] whose row position is the
//! temporal order. This module converts frame columns into plain vectors the
//! window kernels work on, and builds result frames back:
//! - numeric targets read as `Vec<Option<f64>>` (null and NaN are undefined)
//! - key and entity columns read as `Vec<KeyValue>`
//! - key vectors written back with their original value type

use crate::error::{FeatureError, Result};
use polars::prelude::*;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// A single group-key or entity-id value
#[derive(Debug, Clone)]
pub enum KeyValue {
    Int(i64),
    Float(f64),
    Text(String),
    Null,
}

impl KeyValue {
    fn rank(&self) -> u8 {
        match self {
            KeyValue::Int(_) => 0,
            KeyValue::Float(_) => 1,
            KeyValue::Text(_) => 2,
            KeyValue::Null => 3,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, KeyValue::Null)
    }
}

impl PartialEq for KeyValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for KeyValue {}

impl PartialOrd for KeyValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// Nulls sort last, like an unkeyed group tail.
impl Ord for KeyValue {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (KeyValue::Int(a), KeyValue::Int(b)) => a.cmp(b),
            (KeyValue::Float(a), KeyValue::Float(b)) => a.total_cmp(b),
            (KeyValue::Text(a), KeyValue::Text(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl Hash for KeyValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rank().hash(state);
        match self {
            KeyValue::Int(v) => v.hash(state),
            KeyValue::Float(v) => v.to_bits().hash(state),
            KeyValue::Text(v) => v.hash(state),
            KeyValue::Null => {}
        }
    }
}

impl fmt::Display for KeyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyValue::Int(v) => write!(f, "{}", v),
            KeyValue::Float(v) => write!(f, "{}", v),
            KeyValue::Text(v) => write!(f, "{}", v),
            KeyValue::Null => write!(f, "null"),
        }
    }
}

/// Tuple of key values identifying one partition
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupKey(pub Vec<KeyValue>);

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|v| v.to_string()).collect();
        write!(f, "({})", parts.join(", "))
    }
}

fn lookup<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Series> {
    let column = df
        .column(name)
        .map_err(|_| FeatureError::FeatureNotFound(name.to_string()))?;
    Ok(column.as_materialized_series())
}

fn is_numeric(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Boolean
            | DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Names of numeric columns, skipping `exclude`
pub fn numeric_column_names(df: &DataFrame, exclude: &[&str]) -> Vec<String> {
    df.get_columns()
        .iter()
        .filter(|c| is_numeric(c.dtype()) && !exclude.contains(&c.name().as_str()))
        .map(|c| c.name().to_string())
        .collect()
}

/// Read a numeric column as optional floats
pub fn numeric_values(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let series = lookup(df, name)?;
    if !is_numeric(series.dtype()) {
        return Err(FeatureError::InvalidInput(format!(
            "column '{}' has non-numeric type {}",
            name,
            series.dtype()
        )));
    }

    let casted = series.cast(&DataType::Float64)?;
    let values = casted
        .f64()?
        .into_iter()
        .map(|v| v.filter(|x| !x.is_nan()))
        .collect();
    Ok(values)
}

/// Read a key or id column as [`KeyValue`]s
pub fn key_values(df: &DataFrame, name: &str) -> Result<Vec<KeyValue>> {
    let series = lookup(df, name)?;
    let values = match series.dtype() {
        DataType::Boolean
        | DataType::Int8
        | DataType::Int16
        | DataType::Int32
        | DataType::Int64
        | DataType::UInt8
        | DataType::UInt16
        | DataType::UInt32
        | DataType::UInt64 => series
            .cast(&DataType::Int64)?
            .i64()?
            .into_iter()
            .map(|v| v.map_or(KeyValue::Null, KeyValue::Int))
            .collect(),
        DataType::Float32 | DataType::Float64 => series
            .cast(&DataType::Float64)?
            .f64()?
            .into_iter()
            .map(|v| match v {
                Some(x) if x.is_nan() => KeyValue::Null,
                // fold -0.0 into 0.0 so both land in one group
                Some(x) if x == 0.0 => KeyValue::Float(0.0),
                Some(x) => KeyValue::Float(x),
                None => KeyValue::Null,
            })
            .collect(),
        _ => series
            .cast(&DataType::String)?
            .str()?
            .into_iter()
            .map(|v| v.map_or(KeyValue::Null, |s| KeyValue::Text(s.to_string())))
            .collect(),
    };
    Ok(values)
}

/// Build a key column, keeping integer and float keys numeric
pub fn key_series(name: &str, values: &[KeyValue]) -> Series {
    let all_int = values
        .iter()
        .all(|v| matches!(v, KeyValue::Int(_) | KeyValue::Null));
    let all_float = values
        .iter()
        .all(|v| matches!(v, KeyValue::Float(_) | KeyValue::Null));

    if all_int {
        let ints: Vec<Option<i64>> = values
            .iter()
            .map(|v| match v {
                KeyValue::Int(x) => Some(*x),
                _ => None,
            })
            .collect();
        Series::new(name.into(), ints)
    } else if all_float {
        let floats: Vec<Option<f64>> = values
            .iter()
            .map(|v| match v {
                KeyValue::Float(x) => Some(*x),
                _ => None,
            })
            .collect();
        Series::new(name.into(), floats)
    } else {
        let texts: Vec<Option<String>> = values
            .iter()
            .map(|v| (!v.is_null()).then(|| v.to_string()))
            .collect();
        Series::new(name.into(), texts)
    }
}

/// Build a `Float64` result column
pub fn value_series(name: &str, values: Vec<Option<f64>>) -> Series {
    Series::new(name.into(), values)
}

/// Assemble result columns into a frame
pub fn frame(columns: Vec<Series>) -> Result<DataFrame> {
    let columns: Vec<Column> = columns.into_iter().map(Column::from).collect();
    Ok(DataFrame::new(columns)?)
}

/// Like [`frame`], but an empty column set still spans `height` rows
pub fn frame_with_height(columns: Vec<Series>, height: usize) -> Result<DataFrame> {
    if columns.is_empty() {
        // SAFETY: no columns, so there is nothing whose length could disagree with `height`
        return Ok(unsafe { DataFrame::new_no_checks(height, Vec::new()) });
    }
    frame(columns)
}

/// Fail with [`FeatureError::MissingValues`] when any entry is undefined
pub fn require_complete<T>(column: &str, values: &[Option<T>]) -> Result<()> {
    let count = values.iter().filter(|v| v.is_none()).count();
    if count > 0 {
        return Err(FeatureError::MissingValues {
            column: column.to_string(),
            count,
        });
    }
    Ok(())
}
