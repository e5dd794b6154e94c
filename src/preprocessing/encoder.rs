//! One-hot encoding of categorical columns into indicator columns

use crate::error::{FeatureError, Result};
use crate::table::{self, KeyValue};
use polars::prelude::*;
use std::collections::BTreeSet;
use tracing::debug;

/// Largest number of distinct values a column may expand into
pub const MAX_CATEGORIES: usize = 20;

/// A binary indicator for one category of a source column
#[derive(Debug, Clone)]
pub struct IndicatorColumn {
    /// `{column}_{category}`
    pub name: String,
    pub category: String,
    /// 1.0 where the row holds the category, 0.0 otherwise (null rows included)
    pub values: Vec<Option<f64>>,
}

/// Categorical encoder with a cardinality guardrail
#[derive(Debug, Clone)]
pub struct CategoryEncoder {
    max_categories: usize,
}

impl Default for CategoryEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl CategoryEncoder {
    pub fn new() -> Self {
        Self {
            max_categories: MAX_CATEGORIES,
        }
    }

    /// Lower the category cap (the cap never rises above [`MAX_CATEGORIES`])
    pub fn with_max_categories(mut self, max_categories: usize) -> Self {
        self.max_categories = max_categories.min(MAX_CATEGORIES);
        self
    }

    pub fn max_categories(&self) -> usize {
        self.max_categories
    }

    fn ensure_within_cap(&self, column: &str, found: usize) -> Result<()> {
        if found > self.max_categories {
            return Err(FeatureError::CardinalityExceeded {
                column: column.to_string(),
                found,
                limit: self.max_categories,
            });
        }
        Ok(())
    }

    /// Distinct non-null values of a column, sorted ascending
    pub fn categories(&self, df: &DataFrame, column: &str) -> Result<Vec<KeyValue>> {
        let distinct: BTreeSet<KeyValue> = table::key_values(df, column)?
            .into_iter()
            .filter(|v| !v.is_null())
            .collect();
        self.ensure_within_cap(column, distinct.len())?;
        Ok(distinct.into_iter().collect())
    }

    /// Check every column against the cap before any encoding happens
    pub fn check_cardinality(&self, df: &DataFrame, columns: &[&str]) -> Result<()> {
        for column in columns {
            self.categories(df, column)?;
        }
        Ok(())
    }

    /// Expand one column into indicator columns.
    ///
    /// With `categories` given, one indicator per supplied name is produced in
    /// the supplied order; values outside the list encode as all zeros.
    pub fn encode(
        &self,
        df: &DataFrame,
        column: &str,
        categories: Option<&[String]>,
    ) -> Result<Vec<IndicatorColumn>> {
        let labels: Vec<String> = match categories {
            Some(names) => {
                self.ensure_within_cap(column, names.len())?;
                names.to_vec()
            }
            None => self
                .categories(df, column)?
                .iter()
                .map(|v| v.to_string())
                .collect(),
        };

        let rows: Vec<Option<String>> = table::key_values(df, column)?
            .into_iter()
            .map(|v| (!v.is_null()).then(|| v.to_string()))
            .collect();

        debug!(column, categories = labels.len(), rows = rows.len(), "One-hot encoding column");

        let indicators = labels
            .into_iter()
            .map(|category| {
                let values = rows
                    .iter()
                    .map(|v| Some(if v.as_deref() == Some(category.as_str()) { 1.0 } else { 0.0 }))
                    .collect();
                IndicatorColumn {
                    name: format!("{}_{}", column, category),
                    category,
                    values,
                }
            })
            .collect();

        Ok(indicators)
    }

    /// Encode several columns into one indicator frame
    pub fn transform(&self, df: &DataFrame, columns: &[&str]) -> Result<DataFrame> {
        self.check_cardinality(df, columns)?;

        let mut series = Vec::new();
        for column in columns {
            for indicator in self.encode(df, column, None)? {
                series.push(table::value_series(&indicator.name, indicator.values));
            }
        }
        table::frame(series)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn venues(n: usize) -> DataFrame {
        let names: Vec<String> = (0..n).map(|i| format!("v{:02}", i)).collect();
        df!("venue" => names).unwrap()
    }

    #[test]
    fn test_onehot_sorted_categories() {
        let df = df!("result" => &["W", "L", "D", "W"]).unwrap();
        let encoder = CategoryEncoder::new();
        let indicators = encoder.encode(&df, "result", None).unwrap();

        let names: Vec<&str> = indicators.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["result_D", "result_L", "result_W"]);
        assert_eq!(
            indicators[2].values,
            vec![Some(1.0), Some(0.0), Some(0.0), Some(1.0)]
        );
    }

    #[test]
    fn test_null_rows_encode_as_zero() {
        let df = df!("result" => &[Some("W"), None]).unwrap();
        let indicators = CategoryEncoder::new().encode(&df, "result", None).unwrap();
        assert_eq!(indicators.len(), 1);
        assert_eq!(indicators[0].values, vec![Some(1.0), Some(0.0)]);
    }

    #[test]
    fn test_explicit_categories() {
        let df = df!("result" => &["W", "L"]).unwrap();
        let names = vec!["W".to_string(), "D".to_string()];
        let indicators = CategoryEncoder::new()
            .encode(&df, "result", Some(&names))
            .unwrap();

        assert_eq!(indicators[0].name, "result_W");
        assert_eq!(indicators[1].name, "result_D");
        assert_eq!(indicators[1].values, vec![Some(0.0), Some(0.0)]);
    }

    #[test]
    fn test_integer_categories() {
        let df = df!("state" => &[2i64, 0, 1, 2]).unwrap();
        let frame = CategoryEncoder::new().transform(&df, &["state"]).unwrap();
        let names: Vec<String> = frame
            .get_column_names()
            .iter()
            .map(|n| n.to_string())
            .collect();
        assert_eq!(names, vec!["state_0", "state_1", "state_2"]);
    }

    #[test]
    fn test_twenty_categories_allowed() {
        let df = venues(20);
        assert_eq!(CategoryEncoder::new().categories(&df, "venue").unwrap().len(), 20);
    }

    #[test]
    fn test_cap_exceeded() {
        let df = venues(21);
        let err = CategoryEncoder::new().encode(&df, "venue", None).unwrap_err();
        assert!(matches!(
            err,
            FeatureError::CardinalityExceeded { found: 21, limit: 20, .. }
        ));
    }

    #[test]
    fn test_cap_applies_to_supplied_names() {
        let df = venues(1);
        let names: Vec<String> = (0..21).map(|i| i.to_string()).collect();
        assert!(CategoryEncoder::new().encode(&df, "venue", Some(&names)).is_err());
    }

    #[test]
    fn test_lower_cap() {
        let df = df!("result" => &["W", "L", "D"]).unwrap();
        let encoder = CategoryEncoder::new().with_max_categories(2);
        assert!(encoder.check_cardinality(&df, &["result"]).is_err());
        assert_eq!(CategoryEncoder::new().with_max_categories(50).max_categories(), 20);
    }
}
