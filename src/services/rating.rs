use std::sync::Arc;

use anyhow::{Result, bail};
use chrono::Utc;
use log::{info, warn};
use rusqlite::Connection;

use crate::config::AppConfig;
use crate::database::{self, DbPool, in_transaction, leagues, matches, multiplayer, ratings};
use crate::domain::{GameStatus, League, Match, Rating, RatingId, RatingType, RatingValue, UserId};
use crate::errors::EngineError;
use crate::events::{DomainEvent, EventSink};
use crate::rating::{
    DeltaRule, DeltaTables, KillerPoolStrategy, Outcome, PointsMap, RatingChanges,
    RatingSnapshot, RatingStrategy, strategy_for, validate_rule_set,
};
use crate::rating::rules::{default_loser_rules, default_winner_rules};

/// Outcome of rating a completed pairwise match.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchRating {
    pub changes: RatingChanges,
    pub winner_rating_id: RatingId,
    pub loser_rating_id: RatingId,
}

/// League standings: membership, rating changes and positions.
pub struct RatingService {
    pool: DbPool,
    config: AppConfig,
    events: Arc<dyn EventSink>,
}

impl RatingService {
    pub fn new(pool: DbPool, config: AppConfig, events: Arc<dyn EventSink>) -> Self {
        Self { pool, config, events }
    }

    pub fn create_league(
        &self,
        name: &str,
        rating_type: RatingType,
        start_rating: Option<RatingValue>,
        winner_rules: &[DeltaRule],
        loser_rules: &[DeltaRule],
    ) -> Result<League> {
        if rating_type == RatingType::Elo {
            validate_rule_set(winner_rules)?;
            validate_rule_set(loser_rules)?;
        }
        let start_rating = start_rating.unwrap_or(self.config.league.start_rating);

        let conn = database::get_connection(&self.pool)?;
        let league = leagues::insert_league(
            &conn,
            name,
            rating_type,
            start_rating,
            winner_rules,
            loser_rules,
        )?;
        info!("Created {} league '{}' ({})", rating_type.as_str(), league.name, league.id);
        Ok(league)
    }

    /// League with the configured rating type and the stock delta tables.
    pub fn create_default_league(&self, name: &str) -> Result<League> {
        self.create_league(
            name,
            self.config.league.rating_type,
            None,
            &default_winner_rules(),
            &default_loser_rules(),
        )
    }

    pub fn replace_rules(&self, league_id: i64, winner_rules: &[DeltaRule], loser_rules: &[DeltaRule]) -> Result<()> {
        validate_rule_set(winner_rules)?;
        validate_rule_set(loser_rules)?;

        let mut conn = database::get_connection(&self.pool)?;
        in_transaction(&mut conn, &self.config.database, |tx| {
            load_league(tx, league_id)?;
            leagues::update_rules(tx, league_id, winner_rules, loser_rules)
        })
    }

    /// Adds the user at the league's starting rating, inactive until
    /// confirmed. Returns false if the user already has a rating there.
    pub fn add_player(&self, league_id: i64, user_id: UserId) -> Result<bool> {
        let mut conn = database::get_connection(&self.pool)?;
        let added = in_transaction(&mut conn, &self.config.database, |tx| {
            let league = load_league(tx, league_id)?;
            if ratings::find_by_user_league(tx, user_id, league_id)?.is_some() {
                return Ok(false);
            }
            ratings::insert_rating(tx, league_id, user_id, league.start_rating)?;
            rearrange_positions_in(tx, league_id)?;
            Ok(true)
        })?;

        if added {
            info!("Added user {} to league {}", user_id, league_id);
            self.events.emit(DomainEvent::PlayerAddedToLeague { league_id, user_id });
        }
        Ok(added)
    }

    /// Activates a pending membership. Returns false if it was already active.
    pub fn confirm_player(&self, league_id: i64, user_id: UserId) -> Result<bool> {
        let mut conn = database::get_connection(&self.pool)?;
        let confirmed = in_transaction(&mut conn, &self.config.database, |tx| {
            let rating = ratings::find_by_user_league(tx, user_id, league_id)?
                .ok_or(EngineError::not_found("Rating", user_id))?;
            if rating.is_active && rating.is_confirmed {
                return Ok(false);
            }
            ratings::set_membership(tx, rating.id, true, true)?;
            rearrange_positions_in(tx, league_id)?;
            Ok(true)
        })?;

        if confirmed {
            self.events.emit(DomainEvent::PlayerConfirmed { league_id, user_id });
        }
        Ok(confirmed)
    }

    pub fn deactivate_player(&self, league_id: i64, user_id: UserId) -> Result<bool> {
        let mut conn = database::get_connection(&self.pool)?;
        in_transaction(&mut conn, &self.config.database, |tx| {
            let rating = ratings::find_by_user_league(tx, user_id, league_id)?
                .ok_or(EngineError::not_found("Rating", user_id))?;
            if !rating.is_active {
                return Ok(false);
            }
            ratings::set_membership(tx, rating.id, false, rating.is_confirmed)?;
            rearrange_positions_in(tx, league_id)?;
            Ok(true)
        })
    }

    pub fn get_active_rating_for_user_league(&self, user_id: UserId, league_id: i64) -> Result<Option<Rating>> {
        let conn = database::get_connection(&self.pool)?;
        ratings::find_active_by_user_league(&conn, user_id, league_id)
    }

    pub fn standings(&self, league_id: i64) -> Result<Vec<Rating>> {
        let conn = database::get_connection(&self.pool)?;
        ratings::list_active_by_league(&conn, league_id)
    }

    /// Rates a match won by `winner_user_id`, completes it and re-sorts the
    /// league.
    pub fn update_ratings(&self, match_id: i64, winner_user_id: UserId) -> Result<RatingChanges> {
        let mut conn = database::get_connection(&self.pool)?;
        let rated = in_transaction(&mut conn, &self.config.database, |tx| {
            update_ratings_in(tx, match_id, winner_user_id)
        })?;

        self.events.emit(DomainEvent::MatchCompleted {
            match_id,
            winner_rating_id: rated.winner_rating_id,
            loser_rating_id: rated.loser_rating_id,
        });
        Ok(rated.changes)
    }

    pub fn apply_rating_points_for_multiplayer_game(&self, game_id: i64) -> Result<RatingChanges> {
        let mut conn = database::get_connection(&self.pool)?;
        in_transaction(&mut conn, &self.config.database, |tx| {
            apply_game_points_in(tx, game_id)
        })
    }

    pub fn rearrange_positions(&self, league_id: i64) -> Result<()> {
        let mut conn = database::get_connection(&self.pool)?;
        in_transaction(&mut conn, &self.config.database, |tx| {
            rearrange_positions_in(tx, league_id)
        })
    }
}

fn load_league(conn: &Connection, league_id: i64) -> Result<League> {
    Ok(leagues::find_by_id(conn, league_id)?.ok_or(EngineError::not_found("League", league_id))?)
}

fn load_rating(conn: &Connection, rating_id: RatingId) -> Result<Rating> {
    Ok(ratings::find_by_id(conn, rating_id)?.ok_or(EngineError::not_found("Rating", rating_id))?)
}

/// Dense 1..N positions for active ratings, best rating first.
pub(crate) fn rearrange_positions_in(conn: &Connection, league_id: i64) -> Result<()> {
    let ordered = ratings::list_active_ids_by_rating(conn, league_id)?;
    for (idx, rating_id) in ordered.iter().enumerate() {
        ratings::update_position(conn, *rating_id, idx as u32 + 1)?;
    }
    ratings::clear_inactive_positions(conn, league_id)?;
    Ok(())
}

pub(crate) fn update_ratings_in(conn: &Connection, match_id: i64, winner_user_id: UserId) -> Result<MatchRating> {
    let fixture = matches::find_by_id(conn, match_id)?.ok_or(EngineError::not_found("Match", match_id))?;
    ensure_open(&fixture)?;

    let league = load_league(conn, fixture.league_id)?;
    let first = load_rating(conn, fixture.first_rating_id)?;
    let second = load_rating(conn, fixture.second_rating_id)?;
    let snapshots = [
        RatingSnapshot::new(first.id, first.user_id, first.rating),
        RatingSnapshot::new(second.id, second.user_id, second.rating),
    ];

    let strategy = strategy_for(league.rating_type);
    let tables = DeltaTables::new(&league.winner_rules, &league.loser_rules);
    let changes = strategy.calculate(&snapshots, &Outcome::Winner(winner_user_id), &tables)?;

    for (rating_id, value) in &changes {
        ratings::update_rating_value(conn, *rating_id, *value)?;
    }

    let (winner_rating_id, loser_rating_id) = if first.user_id == winner_user_id {
        (first.id, second.id)
    } else {
        (second.id, first.id)
    };
    let completed = matches::mark_completed(
        conn,
        match_id,
        winner_rating_id,
        loser_rating_id,
        first.rating,
        second.rating,
        Utc::now().naive_utc(),
    )?;
    if !completed {
        return Err(EngineError::InvalidMatchTransition {
            from: "completed".to_string(),
            to: "completed".to_string(),
        }
        .into());
    }

    rearrange_positions_in(conn, league.id)?;
    info!(
        "Match {} rated with {} strategy: {:?}",
        match_id,
        strategy.name(),
        changes
    );

    Ok(MatchRating {
        changes,
        winner_rating_id,
        loser_rating_id,
    })
}

fn ensure_open(fixture: &Match) -> Result<(), EngineError> {
    if fixture.status.is_final() {
        return Err(EngineError::InvalidMatchTransition {
            from: fixture.status.as_str().to_string(),
            to: "completed".to_string(),
        });
    }
    Ok(())
}

/// Adds each finished player's earned points to their league rating.
/// Only a completed game is accepted, and its points land once: later
/// calls change nothing and return no changes.
pub(crate) fn apply_game_points_in(conn: &Connection, game_id: i64) -> Result<RatingChanges> {
    let game = multiplayer::find_game(conn, game_id)?
        .ok_or(EngineError::not_found("MultiplayerGame", game_id))?;
    if game.status != GameStatus::Completed {
        bail!("Game {} is {}, rating points need a completed game", game_id, game.status.as_str());
    }
    let Some(league_id) = game.league_id else {
        return Ok(RatingChanges::new());
    };
    if !multiplayer::mark_points_applied(conn, game_id, Utc::now().naive_utc())? {
        info!("Rating points of game {} were already applied", game_id);
        return Ok(RatingChanges::new());
    }

    let players = multiplayer::list_players(conn, game_id)?;
    let points: PointsMap = players
        .iter()
        .filter(|p| p.finish_position.is_some())
        .map(|p| (p.user_id, p.rating_points))
        .collect();

    let mut snapshots = Vec::new();
    for user_id in points.keys() {
        match ratings::find_active_by_user_league(conn, *user_id, league_id)? {
            Some(rating) => snapshots.push(RatingSnapshot::new(rating.id, rating.user_id, rating.rating)),
            None => warn!("User {} has no active rating in league {}, skipping points", user_id, league_id),
        }
    }

    let changes = KillerPoolStrategy.calculate(&snapshots, &Outcome::Points(&points), &DeltaTables::empty())?;
    for (rating_id, value) in &changes {
        ratings::update_rating_value(conn, *rating_id, *value)?;
    }
    rearrange_positions_in(conn, league_id)?;

    info!("Applied rating points of game {} to {} ratings", game_id, changes.len());
    Ok(changes)
}
