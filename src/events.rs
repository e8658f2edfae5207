use std::sync::Mutex;

use log::info;
use serde::Serialize;

use crate::domain::{RatingId, UserId};

/// Transitions other layers (notifications, messaging) react to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum DomainEvent {
    PlayerAddedToLeague { league_id: i64, user_id: UserId },
    PlayerConfirmed { league_id: i64, user_id: UserId },
    MatchCompleted { match_id: i64, winner_rating_id: RatingId, loser_rating_id: RatingId },
    GameCompleted { game_id: i64, winner_user_id: UserId },
}

/// Receives events once the transaction that produced them has committed.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: DomainEvent);
}

#[derive(Debug, Default)]
pub struct LogEventSink;

impl EventSink for LogEventSink {
    fn emit(&self, event: DomainEvent) {
        info!("event: {:?}", event);
    }
}

#[derive(Debug, Default)]
pub struct RecordingEventSink {
    events: Mutex<Vec<DomainEvent>>,
}

impl RecordingEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<DomainEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }
}

impl EventSink for RecordingEventSink {
    fn emit(&self, event: DomainEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}
