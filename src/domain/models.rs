use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::status::{GameStatus, MatchStatus, StageStatus};

pub type ParticipantId = i64;
pub type UserId = i64;
pub type RatingId = i64;
pub type RatingValue = i32;

/// Someone entered into a tournament stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub id: ParticipantId,
    pub player_id: Option<i64>,
    pub team_id: Option<i64>,
    /// Team's club for team entries, home club for individuals.
    pub club_id: Option<i64>,
    pub rating: RatingValue,
    pub seed: Option<u32>,
    pub bracket_position: Option<u32>,
}

impl Participant {
    pub fn new(id: ParticipantId, rating: RatingValue) -> Self {
        Self {
            id,
            player_id: None,
            team_id: None,
            club_id: None,
            rating,
            seed: None,
            bracket_position: None,
        }
    }

    pub fn with_club(mut self, club_id: i64) -> Self {
        self.club_id = Some(club_id);
        self
    }

    pub fn affiliation(&self) -> ClubKey {
        self.club_id.map_or(ClubKey::NoClub, ClubKey::Club)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClubKey {
    Club(i64),
    NoClub,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stage {
    pub id: i64,
    pub tournament_id: i64,
    pub name: String,
    pub status: StageStatus,
    pub bracket_size: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RatingType {
    Elo,
    KillerPool,
}

impl RatingType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RatingType::Elo => "elo",
            RatingType::KillerPool => "killer_pool",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "elo" => Some(RatingType::Elo),
            "killer_pool" => Some(RatingType::KillerPool),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct League {
    pub id: i64,
    pub name: String,
    pub rating_type: RatingType,
    pub start_rating: RatingValue,
    pub winner_rules: Vec<crate::rating::DeltaRule>,
    pub loser_rules: Vec<crate::rating::DeltaRule>,
}

/// A user's standing in one league.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rating {
    pub id: RatingId,
    pub league_id: i64,
    pub user_id: UserId,
    pub rating: RatingValue,
    pub position: Option<u32>,
    pub is_active: bool,
    pub is_confirmed: bool,
    pub created_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Match {
    pub id: i64,
    pub league_id: i64,
    pub first_rating_id: RatingId,
    pub second_rating_id: RatingId,
    pub first_score: Option<i32>,
    pub second_score: Option<i32>,
    pub winner_rating_id: Option<RatingId>,
    pub loser_rating_id: Option<RatingId>,
    pub first_rating_before: Option<RatingValue>,
    pub second_rating_before: Option<RatingValue>,
    pub status: MatchStatus,
    pub completed_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MultiplayerGame {
    pub id: i64,
    pub league_id: Option<i64>,
    pub name: String,
    pub status: GameStatus,
    pub entrance_fee: i64,
    pub max_players: Option<u32>,
    pub registration_deadline: Option<NaiveDateTime>,
    pub first_place_percent: u32,
    pub second_place_percent: u32,
    pub grand_final_percent: u32,
    pub initial_lives: Option<u32>,
    pub first_place_prize: Option<i64>,
    pub second_place_prize: Option<i64>,
    pub grand_final_fund: Option<i64>,
    pub started_at: Option<NaiveDateTime>,
    pub completed_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MultiplayerPlayer {
    pub id: i64,
    pub game_id: i64,
    pub user_id: UserId,
    pub lives: u32,
    pub turn_order: Option<u32>,
    pub finish_position: Option<u32>,
    pub eliminated_at: Option<NaiveDateTime>,
    pub rating_points: i32,
    pub penalty_fee: i64,
    pub rebuy_total: i64,
    pub prize_amount: i64,
    pub joined_at: Option<NaiveDateTime>,
}

impl MultiplayerPlayer {
    pub fn is_active(&self) -> bool {
        self.lives > 0 && self.eliminated_at.is_none() && self.finish_position.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardType {
    SkipTurn,
    PassTurn,
    HandShot,
}

impl CardType {
    pub const ALL: [CardType; 3] = [CardType::SkipTurn, CardType::PassTurn, CardType::HandShot];

    pub fn as_str(&self) -> &'static str {
        match self {
            CardType::SkipTurn => "skip_turn",
            CardType::PassTurn => "pass_turn",
            CardType::HandShot => "hand_shot",
        }
    }
}
