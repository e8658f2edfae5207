pub mod elo;
pub mod killer_pool;
pub mod rules;
pub mod strategy;
pub mod types;

pub use elo::EloStrategy;
pub use killer_pool::KillerPoolStrategy;
pub use rules::{DeltaRule, find_rule, parse_rule_set, validate_rule_set};
pub use strategy::{RatingStrategy, strategy_for};
pub use types::{DeltaTables, Outcome, PointsMap, RatingChanges, RatingSnapshot};
