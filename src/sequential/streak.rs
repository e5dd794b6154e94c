//! Recency-weighted streak
//!
//! Over an entity's last `L <= k` matches with points `o_1..o_L` (oldest
//! first), `streak = 2 * sum(o_j * j) / (3 * L * (L + 1))`, which is 1.0 for
//! a run of wins and 0.0 for a run of losses.

use crate::config::StreakConfig;
use crate::error::Result;
use crate::table;
use crate::timeseries::{rolling, GroupIndex};
use ndarray::Array1;
use polars::prelude::*;
use tracing::debug;

use super::Outcome;

/// Streak of a window of points, oldest first
pub fn streak_score(points: &[f64]) -> Option<f64> {
    if points.is_empty() {
        return None;
    }
    let len = points.len() as f64;
    let weights = Array1::range(1.0, len + 1.0, 1.0);
    let points = Array1::from_vec(points.to_vec());
    Some(2.0 * points.dot(&weights) / (3.0 * len * (len + 1.0)))
}

/// Streak over the trailing `k` values ending at each row
fn trailing_streak(points: &[Option<f64>], k: usize) -> Vec<Option<f64>> {
    (0..points.len())
        .map(|i| {
            let start = (i + 1).saturating_sub(k);
            let window: Vec<f64> = points[start..=i].iter().flatten().copied().collect();
            streak_score(&window)
        })
        .collect()
}

fn last_k_streak(points: &[Option<f64>], k: usize) -> Option<f64> {
    let start = points.len().saturating_sub(k);
    let window: Vec<f64> = points[start..].iter().flatten().copied().collect();
    streak_score(&window)
}

/// Weighted streak per entity.
///
/// Historical output is a `streak` column in input row order where each row
/// reflects only the entity's earlier matches. Otherwise one row per entity
/// (key column `team_id`, then `streak`) over its last `k` matches.
pub fn weight_streak(df: &DataFrame, config: &StreakConfig) -> Result<DataFrame> {
    config.validate()?;

    let points: Vec<Option<f64>> = table::numeric_values(df, &config.outcome)?
        .into_iter()
        .enumerate()
        .map(|(row, code)| Ok(Some(Outcome::from_code(row, code)?.points())))
        .collect::<Result<_>>()?;

    let index = GroupIndex::build(df, &[config.team_id.as_str()])?;
    debug!(
        rows = df.height(),
        teams = index.n_groups(),
        k = config.k,
        historical = config.historical,
        "Computing weighted streak"
    );

    let k = config.k;
    if config.historical {
        let streaks =
            index.map_rows(&points, |group| rolling::shift(&trailing_streak(group, k), 1));
        table::frame(vec![table::value_series("streak", streaks)])
    } else {
        let mut series = index.key_columns();
        series.push(table::value_series(
            "streak",
            index.map_groups(&points, |group| last_k_streak(group, k)),
        ));
        table::frame(series)
    }
}
