//! Temporal aggregation module
//!
//! Provides point-in-time correct features over row-ordered tables:
//! - Fixed, expanding and exponentially weighted window aggregates
//! - Lag features
//! - Key partitioning with row-order restoration
//! - Fixed-interval cumulative resampling
//! - Differences of aggregates
//!
//! In historical mode every aggregate at row i is computed from rows before i.

mod diff;
mod features;
mod group;
mod lag;
pub mod rolling;
mod segment;
mod window;

pub use diff::{diff, group_last_k_diff_avg, group_last_k_diff_sum, last_k_diff_avg, last_k_diff_sum};
pub use features::{
    avg, count, cum_sum, group_avg, group_count, group_last_k_avg, group_last_k_count,
    group_last_k_sum, group_moment_avg, group_sum, last_k_avg, last_k_count, last_k_sum,
    moment_avg,
};
pub use group::GroupIndex;
pub use lag::{group_lag, lag};
pub use segment::{group_category_count_index, group_sum_index, MAX_CHECKPOINTS};
pub use window::{Aggregation, WindowAggregator};
