use std::collections::{BTreeMap, HashMap};

use super::rules::DeltaRule;
use crate::domain::{RatingId, RatingValue, UserId};

/// Pre-match view of one league rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RatingSnapshot {
    pub rating_id: RatingId,
    pub user_id: UserId,
    pub rating: RatingValue,
}

impl RatingSnapshot {
    pub fn new(rating_id: RatingId, user_id: UserId, rating: RatingValue) -> Self {
        Self { rating_id, user_id, rating }
    }
}

/// New rating value per rating id.
pub type RatingChanges = BTreeMap<RatingId, RatingValue>;

/// Points earned per user in a multiplayer game.
pub type PointsMap = HashMap<UserId, i32>;

#[derive(Debug, Clone, Copy)]
pub enum Outcome<'a> {
    /// A decided pairwise match.
    Winner(UserId),
    /// Points-based result of a multiplayer game.
    Points(&'a PointsMap),
}

#[derive(Debug, Clone, Copy)]
pub struct DeltaTables<'a> {
    pub winners: &'a [DeltaRule],
    pub losers: &'a [DeltaRule],
}

impl<'a> DeltaTables<'a> {
    pub fn new(winners: &'a [DeltaRule], losers: &'a [DeltaRule]) -> Self {
        Self { winners, losers }
    }

    pub fn empty() -> DeltaTables<'static> {
        DeltaTables { winners: &[], losers: &[] }
    }
}
