//! Sequential state features
//!
//! Single-pass simulations over match history that carry per-entity state:
//! - [`form`]: paired score transfer between two entities per match
//! - [`weight_streak`]: recency-weighted points over an entity's last matches
//!
//! Every entity starts at a score of 1.0; state lives for one pass only.

mod form;
mod streak;

pub use form::{form, FormState, INITIAL_SCORE};
pub use streak::{streak_score, weight_streak};

use crate::error::{FeatureError, Result};

/// Match outcome from the perspective of the row's (first) entity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Loss,
    Draw,
    Win,
}

impl Outcome {
    /// Decode an outcome code: 0 = loss, 1 = draw, 2 = win
    pub fn from_code(row: usize, code: Option<f64>) -> Result<Self> {
        match code {
            Some(c) if c == 0.0 => Ok(Outcome::Loss),
            Some(c) if c == 1.0 => Ok(Outcome::Draw),
            Some(c) if c == 2.0 => Ok(Outcome::Win),
            other => Err(FeatureError::InvalidOutcome {
                row,
                value: other.map_or_else(|| "null".to_string(), |c| c.to_string()),
            }),
        }
    }

    /// League points: loss 0, draw 1, win 3
    pub fn points(self) -> f64 {
        match self {
            Outcome::Loss => 0.0,
            Outcome::Draw => 1.0,
            Outcome::Win => 3.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_codes() {
        assert_eq!(Outcome::from_code(0, Some(0.0)).unwrap(), Outcome::Loss);
        assert_eq!(Outcome::from_code(0, Some(1.0)).unwrap(), Outcome::Draw);
        assert_eq!(Outcome::from_code(0, Some(2.0)).unwrap(), Outcome::Win);
        assert_eq!(Outcome::Win.points(), 3.0);
    }

    #[test]
    fn test_invalid_outcome_codes() {
        let err = Outcome::from_code(4, Some(3.0)).unwrap_err();
        assert!(matches!(err, FeatureError::InvalidOutcome { row: 4, ref value } if value == "3"));
        assert!(Outcome::from_code(0, Some(1.5)).is_err());
        assert!(matches!(
            Outcome::from_code(1, None),
            Err(FeatureError::InvalidOutcome { ref value, .. }) if value == "null"
        ));
    }
}
