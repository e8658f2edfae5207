use serde::Serialize;

/// Seeding lifecycle of a tournament stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StageStatus {
    Unseeded,
    Seeded,
    BracketGenerated,
}

impl StageStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StageStatus::Unseeded => "unseeded",
            StageStatus::Seeded => "seeded",
            StageStatus::BracketGenerated => "bracket_generated",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "unseeded" => Some(StageStatus::Unseeded),
            "seeded" => Some(StageStatus::Seeded),
            "bracket_generated" => Some(StageStatus::BracketGenerated),
            _ => None,
        }
    }

    /// Re-seeding is allowed until a bracket exists.
    pub fn can_transition_to(&self, next: StageStatus) -> bool {
        matches!(
            (self, next),
            (StageStatus::Unseeded, StageStatus::Seeded)
                | (StageStatus::Seeded, StageStatus::Seeded)
                | (StageStatus::Seeded, StageStatus::BracketGenerated)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MatchStatus {
    Pending,
    InProgress,
    MustBeConfirmed,
    Completed,
    Cancelled,
}

impl MatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchStatus::Pending => "pending",
            MatchStatus::InProgress => "in_progress",
            MatchStatus::MustBeConfirmed => "must_be_confirmed",
            MatchStatus::Completed => "completed",
            MatchStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(MatchStatus::Pending),
            "in_progress" => Some(MatchStatus::InProgress),
            "must_be_confirmed" => Some(MatchStatus::MustBeConfirmed),
            "completed" => Some(MatchStatus::Completed),
            "cancelled" => Some(MatchStatus::Cancelled),
            _ => None,
        }
    }

    pub fn is_final(&self) -> bool {
        matches!(self, MatchStatus::Completed | MatchStatus::Cancelled)
    }

    pub fn can_transition_to(&self, next: MatchStatus) -> bool {
        use MatchStatus::*;
        match (self, next) {
            (Pending, InProgress) | (Pending, MustBeConfirmed) => true,
            (InProgress, MustBeConfirmed) => true,
            (Pending | InProgress | MustBeConfirmed, Completed) => true,
            (Pending | InProgress | MustBeConfirmed, Cancelled) => true,
            _ => false,
        }
    }
}

/// Lifecycle of a last-man-standing game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GameStatus {
    Registration,
    InProgress,
    Completed,
    Cancelled,
}

impl GameStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameStatus::Registration => "registration",
            GameStatus::InProgress => "in_progress",
            GameStatus::Completed => "completed",
            GameStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "registration" => Some(GameStatus::Registration),
            "in_progress" => Some(GameStatus::InProgress),
            "completed" => Some(GameStatus::Completed),
            "cancelled" => Some(GameStatus::Cancelled),
            _ => None,
        }
    }
}
