pub mod settings;

pub use settings::{
    AppConfig, DatabaseSettings, LeagueSettings, LivesTier, MultiplayerSettings, PrizeSplit,
    RatingPointsCurve, SeedingSettings,
};
