pub mod matches;
pub mod multiplayer;
pub mod rating;
pub mod seeding;

pub use matches::MatchService;
pub use multiplayer::{GameRequest, LivesOutcome, MultiplayerService};
pub use rating::{MatchRating, RatingService};
pub use seeding::{SeedingMethod, SeedingService};
