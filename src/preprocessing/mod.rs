//! Categorical preprocessing
//!
//! Provides the one-hot encoder used by category aggregations. Encoding is
//! capped at [`MAX_CATEGORIES`] distinct values per column.

mod encoder;

pub use encoder::{CategoryEncoder, IndicatorColumn, MAX_CATEGORIES};
