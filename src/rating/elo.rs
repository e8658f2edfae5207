use super::rules::find_rule;
use super::strategy::RatingStrategy;
use super::types::{DeltaTables, Outcome, RatingChanges, RatingSnapshot};
use crate::errors::{EngineError, RuleSide};

/// Table-driven Elo: the rating gap picks a rule, and whether each side was
/// the stronger one picks the `strong` or `weak` adjustment.
#[derive(Debug, Clone, Copy, Default)]
pub struct EloStrategy;

impl RatingStrategy for EloStrategy {
    fn name(&self) -> &'static str {
        "elo"
    }

    fn calculate(
        &self,
        ratings: &[RatingSnapshot],
        outcome: &Outcome<'_>,
        tables: &DeltaTables<'_>,
    ) -> Result<RatingChanges, EngineError> {
        let Outcome::Winner(winner_user_id) = *outcome else {
            return Err(EngineError::UnsupportedOutcome { strategy: self.name() });
        };
        let [first, second] = ratings else {
            return Err(EngineError::UnsupportedOutcome { strategy: self.name() });
        };

        let (winner, loser) = split_winner(first, second, winner_user_id)?;
        let delta = winner.rating.saturating_sub(loser.rating).saturating_abs();

        let winner_rule = find_rule(tables.winners, delta, RuleSide::Winner)?;
        let loser_rule = find_rule(tables.losers, delta, RuleSide::Loser)?;

        let winner_is_stronger = winner.rating >= loser.rating;
        let loser_is_stronger = loser.rating >= winner.rating;

        let mut changes = RatingChanges::new();
        changes.insert(
            winner.rating_id,
            winner.rating.saturating_add(winner_rule.delta_for(winner_is_stronger)),
        );
        changes.insert(
            loser.rating_id,
            loser.rating.saturating_add(loser_rule.delta_for(loser_is_stronger)),
        );
        Ok(changes)
    }
}

fn split_winner<'a>(
    first: &'a RatingSnapshot,
    second: &'a RatingSnapshot,
    winner_user_id: i64,
) -> Result<(&'a RatingSnapshot, &'a RatingSnapshot), EngineError> {
    if first.user_id == winner_user_id {
        Ok((first, second))
    } else if second.user_id == winner_user_id {
        Ok((second, first))
    } else {
        Err(EngineError::WinnerNotInMatch(winner_user_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rating::rules::{DeltaRule, default_loser_rules, default_winner_rules};

    fn calculate(
        ratings: &[RatingSnapshot],
        winner: i64,
        winners: &[DeltaRule],
        losers: &[DeltaRule],
    ) -> Result<RatingChanges, EngineError> {
        EloStrategy.calculate(ratings, &Outcome::Winner(winner), &DeltaTables::new(winners, losers))
    }

    #[test]
    fn test_equal_ratings_move_symmetrically() {
        let winners = vec![DeltaRule::new(0, Some(50), 25, 25), DeltaRule::new(51, None, 0, 0)];
        let losers = vec![DeltaRule::new(0, Some(50), -25, -25), DeltaRule::new(51, None, 0, 0)];
        let a = RatingSnapshot::new(1, 100, 1000);
        let b = RatingSnapshot::new(2, 200, 1000);

        let first_wins = calculate(&[a, b], 100, &winners, &losers).unwrap();
        assert_eq!(first_wins[&1], 1025);
        assert_eq!(first_wins[&2], 975);

        let second_wins = calculate(&[a, b], 200, &winners, &losers).unwrap();
        assert_eq!(second_wins[&1], 975);
        assert_eq!(second_wins[&2], 1025);
    }

    #[test]
    fn test_upset_uses_inclusive_bucket() {
        let a = RatingSnapshot::new(1, 100, 1000);
        let b = RatingSnapshot::new(2, 200, 1200);

        let changes =
            calculate(&[a, b], 100, &default_winner_rules(), &default_loser_rules()).unwrap();

        // delta 200 sits in [101, 200], not [201, ∞)
        assert_eq!(changes[&1], 1035);
        assert_eq!(changes[&2], 1165);
    }

    #[test]
    fn test_expected_win_uses_strong_side() {
        let a = RatingSnapshot::new(1, 100, 1300);
        let b = RatingSnapshot::new(2, 200, 1000);

        let changes =
            calculate(&[a, b], 100, &default_winner_rules(), &default_loser_rules()).unwrap();

        assert_eq!(changes[&1], 1310);
        assert_eq!(changes[&2], 990);
    }

    #[test]
    fn test_extreme_ratings_saturate() {
        let a = RatingSnapshot::new(1, 100, i32::MAX);
        let b = RatingSnapshot::new(2, 200, i32::MIN);

        let changes =
            calculate(&[a, b], 100, &default_winner_rules(), &default_loser_rules()).unwrap();

        assert_eq!(changes[&1], i32::MAX);
        assert_eq!(changes[&2], i32::MIN);
    }

    #[test]
    fn test_missing_rule_fails_loudly() {
        let winners = vec![DeltaRule::new(0, Some(100), 10, 10)];
        let a = RatingSnapshot::new(1, 100, 1000);
        let b = RatingSnapshot::new(2, 200, 1500);

        let err = calculate(&[a, b], 100, &winners, &default_loser_rules()).unwrap_err();
        assert_eq!(err, EngineError::NoMatchingRule { side: RuleSide::Winner, delta: 500 });
    }

    #[test]
    fn test_winner_must_be_in_match() {
        let a = RatingSnapshot::new(1, 100, 1000);
        let b = RatingSnapshot::new(2, 200, 1000);

        let err =
            calculate(&[a, b], 999, &default_winner_rules(), &default_loser_rules()).unwrap_err();
        assert_eq!(err, EngineError::WinnerNotInMatch(999));
    }

    #[test]
    fn test_points_outcome_rejected() {
        let points = Default::default();
        let a = RatingSnapshot::new(1, 100, 1000);
        let b = RatingSnapshot::new(2, 200, 1000);

        let err = EloStrategy
            .calculate(&[a, b], &Outcome::Points(&points), &DeltaTables::empty())
            .unwrap_err();
        assert_eq!(err, EngineError::UnsupportedOutcome { strategy: "elo" });
    }
}
