#![allow(dead_code)]

use std::sync::Arc;

use cue_league::config::AppConfig;
use cue_league::database::{self, DbPool};
use cue_league::domain::{RatingType, UserId};
use cue_league::events::RecordingEventSink;
use cue_league::rating::rules::{default_loser_rules, default_winner_rules};
use cue_league::services::RatingService;

pub fn memory_pool() -> DbPool {
    let pool = database::create_memory_pool().expect("memory pool");
    let conn = database::get_connection(&pool).expect("connection");
    database::setup::ensure_schema(&conn).expect("schema");
    pool
}

pub fn rating_service(pool: &DbPool) -> (RatingService, Arc<RecordingEventSink>) {
    let events = Arc::new(RecordingEventSink::new());
    let service = RatingService::new(pool.clone(), AppConfig::new(), events.clone());
    (service, events)
}

/// League of the given type whose members are all confirmed.
pub fn league_with(service: &RatingService, rating_type: RatingType, members: &[UserId]) -> i64 {
    let league = service
        .create_league(
            "Test league",
            rating_type,
            None,
            &default_winner_rules(),
            &default_loser_rules(),
        )
        .expect("league");

    for user_id in members {
        assert!(service.add_player(league.id, *user_id).expect("add player"));
        assert!(service.confirm_player(league.id, *user_id).expect("confirm player"));
    }
    league.id
}
