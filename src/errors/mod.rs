use thiserror::Error;

/// Errors raised by the seeding, bracket, rating and multiplayer engines.
///
/// Services return `anyhow::Result` and carry these inside; recover them with
/// `err.downcast_ref::<EngineError>()`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("Invalid bracket size {0}: must be a positive power of two within the configured maximum")]
    InvalidBracketSize(u32),

    #[error("Bracket of size {bracket_size} cannot hold {participants} participants")]
    TooManyParticipants { participants: usize, bracket_size: u32 },

    #[error("No {side} delta rule covers a rating difference of {delta}")]
    NoMatchingRule { side: RuleSide, delta: i32 },

    #[error("Invalid delta rule set: {0}")]
    InvalidRuleSet(String),

    #[error("Seed {0} is assigned more than once")]
    DuplicateSeed(u32),

    #[error("Seeds are not sequential: expected 1..={expected_max}, found {found:?}")]
    NonSequentialSeeds { expected_max: usize, found: Vec<u32> },

    #[error("Stage cannot move from {from} to {to}")]
    InvalidStageTransition { from: String, to: String },

    #[error("Match cannot move from {from} to {to}")]
    InvalidMatchTransition { from: String, to: String },

    #[error("Winner {0} is not a participant of this match")]
    WinnerNotInMatch(i64),

    #[error("Rating strategy {strategy} cannot handle this outcome")]
    UnsupportedOutcome { strategy: &'static str },

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error("Concurrent update conflict persisted after {attempts} attempts")]
    TransientConflict { attempts: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleSide {
    Winner,
    Loser,
}

impl std::fmt::Display for RuleSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RuleSide::Winner => write!(f, "winner"),
            RuleSide::Loser => write!(f, "loser"),
        }
    }
}

impl EngineError {
    pub fn not_found(entity: &'static str, id: i64) -> Self {
        EngineError::NotFound { entity, id }
    }

    /// Only lock/version conflicts are worth re-attempting; everything else
    /// needs a configuration or input fix.
    pub fn is_retryable(&self) -> bool {
        matches!(self, EngineError::TransientConflict { .. })
    }

    /// Message safe to show an end user.
    pub fn client_message(&self) -> String {
        match self {
            EngineError::TransientConflict { .. } => {
                "The league is busy right now, please try again".to_string()
            }
            EngineError::NotFound { entity, .. } => format!("{} not found", entity),
            _ => self.to_string(),
        }
    }
}

/// Pulls a typed engine error back out of an `anyhow` chain.
pub fn engine_error(err: &anyhow::Error) -> Option<&EngineError> {
    err.downcast_ref::<EngineError>()
        .or_else(|| err.chain().find_map(|cause| cause.downcast_ref::<EngineError>()))
}
