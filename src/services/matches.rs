use std::sync::Arc;

use anyhow::{Result, bail};
use log::info;
use rusqlite::Connection;

use super::rating::{MatchRating, update_ratings_in};
use crate::config::AppConfig;
use crate::database::{self, DbPool, in_transaction, matches, ratings};
use crate::domain::{Match, MatchStatus, UserId};
use crate::errors::EngineError;
use crate::events::{DomainEvent, EventSink};

/// Pairwise league matches from scheduling to completion.
pub struct MatchService {
    pool: DbPool,
    config: AppConfig,
    events: Arc<dyn EventSink>,
}

impl MatchService {
    pub fn new(pool: DbPool, config: AppConfig, events: Arc<dyn EventSink>) -> Self {
        Self { pool, config, events }
    }

    /// Both users need an active rating in the league.
    pub fn create_match(&self, league_id: i64, first_user: UserId, second_user: UserId) -> Result<Match> {
        if first_user == second_user {
            bail!("User {} cannot play against themselves", first_user);
        }

        let mut conn = database::get_connection(&self.pool)?;
        in_transaction(&mut conn, &self.config.database, |tx| {
            let first = ratings::find_active_by_user_league(tx, first_user, league_id)?
                .ok_or(EngineError::not_found("Rating", first_user))?;
            let second = ratings::find_active_by_user_league(tx, second_user, league_id)?
                .ok_or(EngineError::not_found("Rating", second_user))?;
            matches::insert_match(tx, league_id, first.id, second.id)
        })
    }

    pub fn find(&self, match_id: i64) -> Result<Match> {
        let conn = database::get_connection(&self.pool)?;
        load_match(&conn, match_id)
    }

    pub fn start_match(&self, match_id: i64) -> Result<Match> {
        self.transition(match_id, MatchStatus::InProgress)
    }

    /// Records scores and waits for confirmation.
    pub fn submit_result(&self, match_id: i64, first_score: i32, second_score: i32) -> Result<Match> {
        ensure_decided(first_score, second_score)?;

        let mut conn = database::get_connection(&self.pool)?;
        in_transaction(&mut conn, &self.config.database, |tx| {
            let fixture = load_match(tx, match_id)?;
            ensure_transition(&fixture, MatchStatus::MustBeConfirmed)?;
            matches::update_scores(tx, match_id, first_score, second_score)?;
            matches::update_status(tx, match_id, MatchStatus::MustBeConfirmed)?;
            load_match(tx, match_id)
        })
    }

    /// Completes a match with the scores already submitted.
    pub fn confirm_result(&self, match_id: i64) -> Result<MatchRating> {
        let fixture = self.find(match_id)?;
        match (fixture.first_score, fixture.second_score) {
            (Some(first), Some(second)) => self.complete_match(match_id, first, second),
            _ => bail!("Match {} has no submitted result to confirm", match_id),
        }
    }

    /// Stores the final score, rates the match and re-sorts the league.
    pub fn complete_match(&self, match_id: i64, first_score: i32, second_score: i32) -> Result<MatchRating> {
        ensure_decided(first_score, second_score)?;

        let mut conn = database::get_connection(&self.pool)?;
        let rated = in_transaction(&mut conn, &self.config.database, |tx| {
            let fixture = load_match(tx, match_id)?;
            ensure_transition(&fixture, MatchStatus::Completed)?;
            matches::update_scores(tx, match_id, first_score, second_score)?;

            let winner_rating_id = if first_score > second_score {
                fixture.first_rating_id
            } else {
                fixture.second_rating_id
            };
            let winner = ratings::find_by_id(tx, winner_rating_id)?
                .ok_or(EngineError::not_found("Rating", winner_rating_id))?;
            update_ratings_in(tx, match_id, winner.user_id)
        })?;

        info!("Match {} completed {}:{}", match_id, first_score, second_score);
        self.events.emit(DomainEvent::MatchCompleted {
            match_id,
            winner_rating_id: rated.winner_rating_id,
            loser_rating_id: rated.loser_rating_id,
        });
        Ok(rated)
    }

    pub fn cancel_match(&self, match_id: i64) -> Result<Match> {
        self.transition(match_id, MatchStatus::Cancelled)
    }

    fn transition(&self, match_id: i64, next: MatchStatus) -> Result<Match> {
        let mut conn = database::get_connection(&self.pool)?;
        in_transaction(&mut conn, &self.config.database, |tx| {
            let fixture = load_match(tx, match_id)?;
            ensure_transition(&fixture, next)?;
            matches::update_status(tx, match_id, next)?;
            load_match(tx, match_id)
        })
    }
}

fn load_match(conn: &Connection, match_id: i64) -> Result<Match> {
    Ok(matches::find_by_id(conn, match_id)?.ok_or(EngineError::not_found("Match", match_id))?)
}

fn ensure_transition(fixture: &Match, next: MatchStatus) -> Result<(), EngineError> {
    if !fixture.status.can_transition_to(next) {
        return Err(EngineError::InvalidMatchTransition {
            from: fixture.status.as_str().to_string(),
            to: next.as_str().to_string(),
        });
    }
    Ok(())
}

fn ensure_decided(first_score: i32, second_score: i32) -> Result<()> {
    if first_score == second_score {
        bail!("Match cannot end level at {}:{}", first_score, second_score);
    }
    Ok(())
}
