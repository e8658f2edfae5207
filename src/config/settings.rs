use log::warn;
use serde::{Deserialize, Serialize};

use crate::domain::{RatingType, RatingValue};

#[derive(Debug, Clone)]
pub struct DatabaseSettings {
    pub path: String,
    pub max_attempts: u32,
    pub busy_timeout_ms: u64,
    pub retry_backoff_ms: u64,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            path: std::env::var("DATABASE_PATH").unwrap_or_else(|_| "cue_league.db".to_string()),
            max_attempts: 3,
            busy_timeout_ms: 2_000,
            retry_backoff_ms: 25,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SeedingSettings {
    /// Rank given to entrants with no result in the referenced tournament.
    pub missing_previous_rank: u32,
    pub club_shuffle_block: usize,
    /// Largest bracket a stage may generate.
    pub max_bracket_size: u32,
}

impl Default for SeedingSettings {
    fn default() -> Self {
        Self {
            missing_previous_rank: 999,
            club_shuffle_block: 4,
            max_bracket_size: 1024,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LeagueSettings {
    pub start_rating: RatingValue,
    pub rating_type: RatingType,
}

impl Default for LeagueSettings {
    fn default() -> Self {
        Self {
            start_rating: 1000,
            rating_type: RatingType::Elo,
        }
    }
}

/// Percentages of the entrance pool paid to first place, second place and
/// the grand-final fund.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrizeSplit {
    pub first: u32,
    pub second: u32,
    pub grand_final: u32,
}

impl Default for PrizeSplit {
    fn default() -> Self {
        Self {
            first: 60,
            second: 20,
            grand_final: 20,
        }
    }
}

impl PrizeSplit {
    pub fn new(first: u32, second: u32, grand_final: u32) -> Self {
        Self { first, second, grand_final }
    }

    pub fn is_valid(&self) -> bool {
        u64::from(self.first) + u64::from(self.second) + u64::from(self.grand_final) == 100
    }

    /// Falls back to 60/20/20 when the percentages don't add up.
    pub fn sanitized(self) -> Self {
        if self.is_valid() {
            return self;
        }
        warn!(
            "Prize split {}/{}/{} does not sum to 100, using default",
            self.first, self.second, self.grand_final
        );
        Self::default()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct LivesTier {
    pub max_players: usize,
    pub lives: u32,
}

/// Points per finish position: every opponent outlasted is worth
/// `per_opponent_outlasted`, the winner gets `winner_bonus` on top.
#[derive(Debug, Clone, Copy)]
pub struct RatingPointsCurve {
    pub per_opponent_outlasted: i32,
    pub winner_bonus: i32,
}

impl Default for RatingPointsCurve {
    fn default() -> Self {
        Self {
            per_opponent_outlasted: 1,
            winner_bonus: 2,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MultiplayerSettings {
    pub min_players: usize,
    /// Checked in order; the first tier whose `max_players` fits wins.
    pub lives_tiers: Vec<LivesTier>,
    pub fallback_lives: u32,
    pub prize_split: PrizeSplit,
    pub rating_points: RatingPointsCurve,
}

impl Default for MultiplayerSettings {
    fn default() -> Self {
        Self {
            min_players: 2,
            lives_tiers: vec![
                LivesTier { max_players: 5, lives: 6 },
                LivesTier { max_players: 10, lives: 5 },
                LivesTier { max_players: 14, lives: 4 },
            ],
            fallback_lives: 3,
            prize_split: PrizeSplit::default(),
            rating_points: RatingPointsCurve::default(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub database: DatabaseSettings,
    pub seeding: SeedingSettings,
    pub league: LeagueSettings,
    pub multiplayer: MultiplayerSettings,
}

impl AppConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_database_path(mut self, path: impl Into<String>) -> Self {
        self.database.path = path.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_split_falls_back_to_default() {
        let split = PrizeSplit::new(50, 30, 30).sanitized();
        assert_eq!(split, PrizeSplit::new(60, 20, 20));

        let custom = PrizeSplit::new(70, 30, 0).sanitized();
        assert_eq!(custom, PrizeSplit::new(70, 30, 0));

        let wrapping = PrizeSplit::new(u32::MAX, 101, 0);
        assert!(!wrapping.is_valid());
        assert_eq!(wrapping.sanitized(), PrizeSplit::new(60, 20, 20));
        assert_eq!(PrizeSplit::new(u32::MAX, 1, 0).sanitized(), PrizeSplit::default());
    }

    #[test]
    fn test_default_lives_tiers() {
        let settings = MultiplayerSettings::default();
        assert_eq!(settings.lives_tiers.len(), 3);
        assert_eq!(settings.fallback_lives, 3);
    }
}
