pub mod points;
pub mod prizes;
pub mod rules;
pub mod summary;

pub use points::{calculate_rating_points, rating_points_for};
pub use prizes::{PrizeBreakdown, calculate_prizes};
pub use rules::{can_join, finish_position_on_elimination, initial_lives, turn_orders};
pub use summary::{FinancialSummary, PlayerFinancials, RatingSummary, RatingSummaryEntry};
