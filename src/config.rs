//! Feature configuration
//!
//! Every operation takes one explicit configuration value enumerating the
//! options it recognises. Configurations are serde-serializable so feature
//! pipelines can keep them next to their model artifacts.

use crate::error::{FeatureError, Result};
use serde::{Deserialize, Serialize};

/// Window over which an aggregate is computed
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WindowSpec {
    /// Trailing window of the last `size` rows
    Fixed { size: usize },
    /// All rows from the start of the table (or group)
    Expanding,
    /// Exponentially weighted, `S_i = alpha * x_i + (1 - alpha) * S_{i-1}`
    Exponential { alpha: f64 },
}

impl Default for WindowSpec {
    fn default() -> Self {
        WindowSpec::Expanding
    }
}

impl WindowSpec {
    pub fn validate(&self) -> Result<()> {
        match *self {
            WindowSpec::Fixed { size } if size == 0 => Err(FeatureError::invalid_parameter(
                "size",
                size,
                "window size must be at least 1",
            )),
            WindowSpec::Exponential { alpha } if !(alpha > 0.0 && alpha <= 1.0) => {
                Err(FeatureError::invalid_parameter(
                    "alpha",
                    alpha,
                    "smoothing factor must satisfy 0 < alpha <= 1",
                ))
            }
            _ => Ok(()),
        }
    }
}

/// Configuration for window aggregations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregationConfig {
    /// Window specification
    pub window: WindowSpec,
    /// Emit one causal value per row instead of a terminal summary
    pub historical: bool,
    /// Key columns partitioning the table, if any
    pub group_by: Option<Vec<String>>,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            window: WindowSpec::default(),
            historical: true,
            group_by: None,
        }
    }
}

impl AggregationConfig {
    pub fn new(window: WindowSpec) -> Self {
        Self {
            window,
            ..Self::default()
        }
    }

    /// Trailing window of `k` rows
    pub fn last_k(k: usize) -> Self {
        Self::new(WindowSpec::Fixed { size: k })
    }

    pub fn expanding() -> Self {
        Self::new(WindowSpec::Expanding)
    }

    pub fn exponential(alpha: f64) -> Self {
        Self::new(WindowSpec::Exponential { alpha })
    }

    /// Builder method to set the historical flag
    pub fn with_historical(mut self, historical: bool) -> Self {
        self.historical = historical;
        self
    }

    /// Builder method to partition by key columns
    pub fn with_group_by<S: AsRef<str>>(mut self, group_by: &[S]) -> Self {
        self.group_by = Some(group_by.iter().map(|s| s.as_ref().to_string()).collect());
        self
    }

    pub fn validate(&self) -> Result<()> {
        self.window.validate()?;
        if let Some(keys) = &self.group_by {
            if keys.is_empty() {
                return Err(FeatureError::invalid_parameter(
                    "group_by",
                    "[]",
                    "at least one key column is required",
                ));
            }
        }
        Ok(())
    }

    /// Load a configuration from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Configuration for fixed-interval cumulative resampling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentConfig {
    /// Key columns partitioning the table
    pub group_by: Vec<String>,
    /// Secondary ordering column sampled at checkpoints
    pub index: String,
    /// Distance between checkpoints along `index`
    pub interval: f64,
}

impl SegmentConfig {
    pub fn new<S: AsRef<str>>(group_by: &[S], index: &str, interval: f64) -> Self {
        Self {
            group_by: group_by.iter().map(|s| s.as_ref().to_string()).collect(),
            index: index.to_string(),
            interval,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.interval > 0.0 && self.interval.is_finite()) {
            return Err(FeatureError::invalid_parameter(
                "interval",
                self.interval,
                "checkpoint interval must be a positive finite number",
            ));
        }
        if self.group_by.is_empty() {
            return Err(FeatureError::invalid_parameter(
                "group_by",
                "[]",
                "at least one key column is required",
            ));
        }
        Ok(())
    }
}

/// Configuration for the paired form score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormConfig {
    /// Column with the id of entity A
    pub a_id: String,
    /// Column with the id of entity B
    pub b_id: String,
    /// Outcome column: 0 = A loses, 1 = draw, 2 = A wins
    pub outcome: String,
    /// Fraction of score transferred per match, 0 < gamma < 1
    pub gamma: f64,
    pub historical: bool,
}

impl FormConfig {
    pub fn new(a_id: &str, b_id: &str, outcome: &str, gamma: f64) -> Self {
        Self {
            a_id: a_id.to_string(),
            b_id: b_id.to_string(),
            outcome: outcome.to_string(),
            gamma,
            historical: true,
        }
    }

    pub fn with_historical(mut self, historical: bool) -> Self {
        self.historical = historical;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.gamma > 0.0 && self.gamma < 1.0) {
            return Err(FeatureError::invalid_parameter(
                "gamma",
                self.gamma,
                "transfer fraction must satisfy 0 < gamma < 1",
            ));
        }
        Ok(())
    }
}

/// Configuration for the weighted streak
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreakConfig {
    /// Entity id column
    pub team_id: String,
    /// Outcome column: 0 = loss, 1 = draw, 2 = win
    pub outcome: String,
    /// Number of past matches in the window
    pub k: usize,
    pub historical: bool,
}

impl StreakConfig {
    pub fn new(team_id: &str, outcome: &str, k: usize) -> Self {
        Self {
            team_id: team_id.to_string(),
            outcome: outcome.to_string(),
            k,
            historical: true,
        }
    }

    pub fn with_historical(mut self, historical: bool) -> Self {
        self.historical = historical;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.k == 0 {
            return Err(FeatureError::invalid_parameter(
                "k",
                self.k,
                "streak window must cover at least one match",
            ));
        }
        Ok(())
    }
}
