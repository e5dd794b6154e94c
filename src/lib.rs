//! Temporal Features - point-in-time correct features for event-ordered tables
//!
//! This crate computes statistical features over tables whose row order is
//! temporal order (e.g. one row per match), optionally per group (e.g. per
//! team). Every feature comes in two modes:
//! - historical: one value per row, computed from strictly earlier rows only
//! - terminal: one summary over the most recent window (per group if grouped)
//!
//! # Modules
//!
//! - [`timeseries`] - Window aggregates, lags, grouping, resampling, differences
//! - [`sequential`] - Form and weighted streak state simulations
//! - [`preprocessing`] - One-hot encoding with a category cap
//! - [`config`] - Operation configuration values
//! - [`table`] - Column access over polars frames

// Core error handling
pub mod error;

pub mod config;
pub mod preprocessing;
pub mod sequential;
pub mod table;
pub mod timeseries;

pub use error::{FeatureError, Result};

/// Re-export commonly used types
pub mod prelude {
    // Error handling
    pub use crate::error::{FeatureError, Result};

    // Configuration
    pub use crate::config::{AggregationConfig, FormConfig, SegmentConfig, StreakConfig, WindowSpec};

    // Aggregation
    pub use crate::timeseries::{Aggregation, GroupIndex, WindowAggregator};

    // Sequential features
    pub use crate::sequential::{form, weight_streak, FormState, Outcome};

    // Encoding
    pub use crate::preprocessing::{CategoryEncoder, MAX_CATEGORIES};
}
