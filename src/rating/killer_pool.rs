use super::strategy::RatingStrategy;
use super::types::{DeltaTables, Outcome, RatingChanges, RatingSnapshot};
use crate::errors::EngineError;

/// Points-based rating for multiplayer games: each rating grows by the
/// points its user earned, zero when the user earned nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct KillerPoolStrategy;

impl RatingStrategy for KillerPoolStrategy {
    fn name(&self) -> &'static str {
        "killer_pool"
    }

    fn calculate(
        &self,
        ratings: &[RatingSnapshot],
        outcome: &Outcome<'_>,
        _tables: &DeltaTables<'_>,
    ) -> Result<RatingChanges, EngineError> {
        let Outcome::Points(points) = *outcome else {
            return Err(EngineError::UnsupportedOutcome { strategy: self.name() });
        };

        Ok(ratings
            .iter()
            .map(|snapshot| {
                let earned = points.get(&snapshot.user_id).copied().unwrap_or(0);
                (snapshot.rating_id, snapshot.rating.saturating_add(earned))
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rating::types::PointsMap;

    #[test]
    fn test_points_are_added_and_missing_users_unchanged() {
        let ratings = vec![
            RatingSnapshot::new(1, 10, 100),
            RatingSnapshot::new(2, 20, 50),
            RatingSnapshot::new(3, 30, 70),
        ];
        let points: PointsMap = [(10, 7), (20, 3)].into_iter().collect();

        let changes = KillerPoolStrategy
            .calculate(&ratings, &Outcome::Points(&points), &DeltaTables::empty())
            .unwrap();

        assert_eq!(changes[&1], 107);
        assert_eq!(changes[&2], 53);
        assert_eq!(changes[&3], 70);
    }

    #[test]
    fn test_points_saturate_at_rating_ceiling() {
        let ratings = vec![RatingSnapshot::new(1, 10, i32::MAX - 1)];
        let points: PointsMap = [(10, 7)].into_iter().collect();

        let changes = KillerPoolStrategy
            .calculate(&ratings, &Outcome::Points(&points), &DeltaTables::empty())
            .unwrap();

        assert_eq!(changes[&1], i32::MAX);
    }

    #[test]
    fn test_winner_outcome_rejected() {
        let ratings = vec![RatingSnapshot::new(1, 10, 100)];
        let err = KillerPoolStrategy
            .calculate(&ratings, &Outcome::Winner(10), &DeltaTables::empty())
            .unwrap_err();

        assert_eq!(err, EngineError::UnsupportedOutcome { strategy: "killer_pool" });
    }
}
