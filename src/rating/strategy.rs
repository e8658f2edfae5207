use super::elo::EloStrategy;
use super::killer_pool::KillerPoolStrategy;
use super::types::{DeltaTables, Outcome, RatingChanges, RatingSnapshot};
use crate::domain::RatingType;
use crate::errors::EngineError;

/// Turns pre-match ratings and a result into new rating values.
pub trait RatingStrategy {
    fn name(&self) -> &'static str;

    fn calculate(
        &self,
        ratings: &[RatingSnapshot],
        outcome: &Outcome<'_>,
        tables: &DeltaTables<'_>,
    ) -> Result<RatingChanges, EngineError>;
}

pub fn strategy_for(rating_type: RatingType) -> Box<dyn RatingStrategy> {
    match rating_type {
        RatingType::Elo => Box::new(EloStrategy),
        RatingType::KillerPool => Box::new(KillerPoolStrategy),
    }
}
