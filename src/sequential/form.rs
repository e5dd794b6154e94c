//! Paired form score
//!
//! After each match a fraction `gamma` of score moves between the two
//! entities: the winner takes `gamma` times the loser's score from the loser,
//! and a draw pulls both scores `gamma` of the way towards each other.

use crate::config::FormConfig;
use crate::error::{FeatureError, Result};
use crate::table::{self, KeyValue};
use polars::prelude::*;
use std::collections::HashMap;
use tracing::debug;

use super::Outcome;

/// Score every entity starts with
pub const INITIAL_SCORE: f64 = 1.0;

/// Per-entity form scores threaded through one pass
#[derive(Debug, Clone, Default)]
pub struct FormState {
    scores: HashMap<KeyValue, f64>,
}

impl FormState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn score(&self, id: &KeyValue) -> f64 {
        self.scores.get(id).copied().unwrap_or(INITIAL_SCORE)
    }

    /// Apply one match and return the scores from before it
    pub fn update(&mut self, a: &KeyValue, b: &KeyValue, outcome: Outcome, gamma: f64) -> (f64, f64) {
        let (sa, sb) = (self.score(a), self.score(b));
        let (na, nb) = match outcome {
            Outcome::Win => (sa + gamma * sb, sb - gamma * sb),
            Outcome::Loss => (sa - gamma * sa, sb + gamma * sa),
            Outcome::Draw => (sa - gamma * (sa - sb), sb - gamma * (sb - sa)),
        };
        self.scores.insert(a.clone(), na);
        self.scores.insert(b.clone(), nb);
        (sa, sb)
    }

    /// Final scores ordered by entity id
    pub fn into_sorted(self) -> Vec<(KeyValue, f64)> {
        let mut scores: Vec<(KeyValue, f64)> = self.scores.into_iter().collect();
        scores.sort_by(|x, y| x.0.cmp(&y.0));
        scores
    }
}

fn require_ids(column: &str, ids: &[KeyValue]) -> Result<()> {
    let count = ids.iter().filter(|id| id.is_null()).count();
    if count > 0 {
        return Err(FeatureError::MissingValues {
            column: column.to_string(),
            count,
        });
    }
    Ok(())
}

/// Form scores over a match table.
///
/// Historical output has columns `a_score` and `b_score` holding both entities'
/// scores before each match. Otherwise the final table of `id` and `score` is
/// returned, one row per entity in id order.
pub fn form(df: &DataFrame, config: &FormConfig) -> Result<DataFrame> {
    config.validate()?;

    let a_ids = table::key_values(df, &config.a_id)?;
    let b_ids = table::key_values(df, &config.b_id)?;
    let codes = table::numeric_values(df, &config.outcome)?;
    require_ids(&config.a_id, &a_ids)?;
    require_ids(&config.b_id, &b_ids)?;

    debug!(rows = df.height(), gamma = config.gamma, historical = config.historical, "Computing form");

    let (state, trace) = a_ids.iter().zip(&b_ids).zip(&codes).enumerate().try_fold(
        (FormState::new(), Vec::with_capacity(df.height())),
        |(mut state, mut trace), (row, ((a, b), code))| {
            let outcome = Outcome::from_code(row, *code)?;
            trace.push(state.update(a, b, outcome, config.gamma));
            Ok::<_, FeatureError>((state, trace))
        },
    )?;

    if config.historical {
        let (a_scores, b_scores): (Vec<Option<f64>>, Vec<Option<f64>>) =
            trace.into_iter().map(|(a, b)| (Some(a), Some(b))).unzip();
        table::frame(vec![
            table::value_series("a_score", a_scores),
            table::value_series("b_score", b_scores),
        ])
    } else {
        let (ids, scores): (Vec<KeyValue>, Vec<Option<f64>>) = state
            .into_sorted()
            .into_iter()
            .map(|(id, score)| (id, Some(score)))
            .unzip();
        table::frame(vec![
            table::key_series("id", &ids),
            table::value_series("score", scores),
        ])
    }
}
