use std::sync::Arc;

use anyhow::{Result, bail};
use chrono::{NaiveDateTime, Utc};
use log::{debug, info, warn};
use rusqlite::Connection;

use super::rating::apply_game_points_in;
use crate::config::{AppConfig, PrizeSplit};
use crate::database::multiplayer::{self as games, NewGame};
use crate::database::{self, DbPool, in_transaction};
use crate::domain::{CardType, GameStatus, MultiplayerGame, MultiplayerPlayer, UserId};
use crate::errors::EngineError;
use crate::events::{DomainEvent, EventSink};
use crate::multiplayer::{
    FinancialSummary, PrizeBreakdown, RatingSummary, calculate_prizes, calculate_rating_points,
    can_join, finish_position_on_elimination, initial_lives, turn_orders,
};
use crate::rating::PointsMap;

/// What a lost life led to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LivesOutcome {
    Alive { lives: u32 },
    Eliminated { finish_position: u32 },
    /// The elimination left a single player standing.
    GameCompleted { finish_position: u32, winner_user_id: UserId },
}

#[derive(Debug, Clone)]
pub struct GameRequest {
    pub league_id: Option<i64>,
    pub name: String,
    pub entrance_fee: i64,
    pub max_players: Option<u32>,
    pub registration_deadline: Option<NaiveDateTime>,
    pub split: Option<PrizeSplit>,
}

/// Runs last-man-standing games from registration to payout.
pub struct MultiplayerService {
    pool: DbPool,
    config: AppConfig,
    events: Arc<dyn EventSink>,
}

impl MultiplayerService {
    pub fn new(pool: DbPool, config: AppConfig, events: Arc<dyn EventSink>) -> Self {
        Self { pool, config, events }
    }

    pub fn create_game(&self, request: &GameRequest) -> Result<MultiplayerGame> {
        if request.entrance_fee < 0 {
            bail!("Entrance fee cannot be negative: {}", request.entrance_fee);
        }
        let split = request
            .split
            .unwrap_or(self.config.multiplayer.prize_split)
            .sanitized();

        let conn = database::get_connection(&self.pool)?;
        let game = games::insert_game(
            &conn,
            &NewGame {
                league_id: request.league_id,
                name: &request.name,
                entrance_fee: request.entrance_fee,
                max_players: request.max_players,
                registration_deadline: request.registration_deadline,
                split,
            },
        )?;
        info!("Created multiplayer game '{}' ({})", game.name, game.id);
        Ok(game)
    }

    pub fn can_join(&self, game_id: i64, user_id: UserId) -> Result<bool> {
        let conn = database::get_connection(&self.pool)?;
        let game = load_game(&conn, game_id)?;
        let players = games::list_players(&conn, game_id)?;
        Ok(can_join(&game, &players, user_id, Utc::now().naive_utc()))
    }

    /// Registers the user, or returns None when the game does not accept them.
    pub fn join(&self, game_id: i64, user_id: UserId) -> Result<Option<MultiplayerPlayer>> {
        let mut conn = database::get_connection(&self.pool)?;
        in_transaction(&mut conn, &self.config.database, |tx| {
            let game = load_game(tx, game_id)?;
            let players = games::list_players(tx, game_id)?;
            if !can_join(&game, &players, user_id, Utc::now().naive_utc()) {
                debug!("User {} cannot join game {}", user_id, game_id);
                return Ok(None);
            }
            games::insert_player(tx, game_id, user_id).map(Some)
        })
    }

    pub fn cancel(&self, game_id: i64) -> Result<bool> {
        let mut conn = database::get_connection(&self.pool)?;
        in_transaction(&mut conn, &self.config.database, |tx| {
            load_game(tx, game_id)?;
            games::transition_status(tx, game_id, GameStatus::Registration, GameStatus::Cancelled)
        })
    }

    /// Deals turn order, lives and cards. False when the game is not in
    /// registration or has too few players.
    pub fn start(&self, game_id: i64) -> Result<bool> {
        let mut conn = database::get_connection(&self.pool)?;
        let settings = &self.config.multiplayer;
        in_transaction(&mut conn, &self.config.database, |tx| {
            let game = load_game(tx, game_id)?;
            let players = games::list_players(tx, game_id)?;
            if game.status != GameStatus::Registration || players.len() < settings.min_players {
                return Ok(false);
            }

            let lives = initial_lives(players.len(), settings);
            let orders = turn_orders(players.len(), &mut rand::rng());
            for (player, turn_order) in players.iter().zip(orders) {
                games::start_player(tx, player.id, lives, turn_order)?;
                games::grant_cards(tx, player.id)?;
            }
            games::record_start(tx, game_id, lives, Utc::now().naive_utc())?;

            let started =
                games::transition_status(tx, game_id, GameStatus::Registration, GameStatus::InProgress)?;
            if started {
                info!("Game {} started with {} players, {} lives each", game_id, players.len(), lives);
            }
            Ok(started)
        })
    }

    /// Takes a life. The last life eliminates the player, and the
    /// elimination that leaves one player standing completes the game.
    pub fn decrement_lives(&self, player_id: i64) -> Result<LivesOutcome> {
        let mut conn = database::get_connection(&self.pool)?;
        let (game_id, outcome) = in_transaction(&mut conn, &self.config.database, |tx| {
            let (game, player) = load_playing(tx, player_id)?;
            let outcome = self.lose_life(tx, &game, &player)?;
            Ok((game.id, outcome))
        })?;

        if let LivesOutcome::GameCompleted { winner_user_id, .. } = outcome {
            self.events.emit(DomainEvent::GameCompleted { game_id, winner_user_id });
        }
        Ok(outcome)
    }

    fn lose_life(&self, conn: &Connection, game: &MultiplayerGame, player: &MultiplayerPlayer) -> Result<LivesOutcome> {
        let lives = player.lives - 1;
        games::update_lives(conn, player.id, lives)?;
        if lives > 0 {
            return Ok(LivesOutcome::Alive { lives });
        }

        let players = games::list_players(conn, game.id)?;
        let active_before = players.iter().filter(|p| p.is_active() || p.id == player.id).count();
        let now = Utc::now().naive_utc();
        let finish_position = finish_position_on_elimination(active_before);
        games::record_finish(conn, player.id, finish_position, Some(now))?;
        info!(
            "Player {} eliminated from game {} in place {}",
            player.user_id, game.id, finish_position
        );

        let remaining: Vec<&MultiplayerPlayer> = players
            .iter()
            .filter(|p| p.id != player.id && p.is_active())
            .collect();
        let [winner] = remaining.as_slice() else {
            return Ok(LivesOutcome::Eliminated { finish_position });
        };

        if !games::transition_status(conn, game.id, GameStatus::InProgress, GameStatus::Completed)? {
            bail!("Game {} was completed concurrently", game.id);
        }
        games::record_finish(conn, winner.id, 1, None)?;
        self.settle(conn, game, now)?;

        Ok(LivesOutcome::GameCompleted {
            finish_position,
            winner_user_id: winner.user_id,
        })
    }

    /// Stores prizes and rating points and feeds the points into the
    /// league ratings.
    fn settle(&self, conn: &Connection, game: &MultiplayerGame, completed_at: NaiveDateTime) -> Result<()> {
        let players = games::list_players(conn, game.id)?;
        let prizes = prizes_for(game, players.len());
        let points = calculate_rating_points(&players, &self.config.multiplayer.rating_points);

        for player in &players {
            let prize_amount = match player.finish_position {
                Some(1) => prizes.first_place,
                Some(2) => prizes.second_place,
                _ => 0,
            };
            let rating_points = points.get(&player.user_id).copied().unwrap_or(0);
            games::update_results(conn, player.id, rating_points, prize_amount)?;
        }
        games::record_completion(conn, game.id, &prizes, completed_at)?;
        apply_game_points_in(conn, game.id)?;

        info!(
            "Game {} completed: pool {}, first {}, second {}, grand final {}",
            game.id, prizes.total_pool, prizes.first_place, prizes.second_place, prizes.grand_final
        );
        Ok(())
    }

    pub fn increment_lives(&self, player_id: i64) -> Result<u32> {
        let mut conn = database::get_connection(&self.pool)?;
        in_transaction(&mut conn, &self.config.database, |tx| {
            let (_, player) = load_playing(tx, player_id)?;
            let lives = player.lives + 1;
            games::update_lives(tx, player.id, lives)?;
            Ok(lives)
        })
    }

    /// False when the card was already played.
    pub fn use_card(&self, player_id: i64, card: CardType) -> Result<bool> {
        let mut conn = database::get_connection(&self.pool)?;
        let used = in_transaction(&mut conn, &self.config.database, |tx| {
            load_playing(tx, player_id)?;
            games::use_card(tx, player_id, card)
        })?;
        if !used {
            warn!("Player {} already used {}", player_id, card.as_str());
        }
        Ok(used)
    }

    pub fn unused_cards(&self, player_id: i64) -> Result<Vec<String>> {
        let conn = database::get_connection(&self.pool)?;
        games::unused_cards(&conn, player_id)
    }

    /// Adds a time-fund penalty to the player's bill.
    pub fn record_penalty(&self, player_id: i64, amount: i64) -> Result<()> {
        self.add_charge(player_id, amount, games::add_penalty)
    }

    pub fn record_rebuy(&self, player_id: i64, amount: i64) -> Result<()> {
        self.add_charge(player_id, amount, games::add_rebuy)
    }

    fn add_charge(&self, player_id: i64, amount: i64, charge: fn(&Connection, i64, i64) -> Result<()>) -> Result<()> {
        if amount <= 0 {
            bail!("Charge must be positive, got {}", amount);
        }
        let mut conn = database::get_connection(&self.pool)?;
        in_transaction(&mut conn, &self.config.database, |tx| {
            load_player(tx, player_id)?;
            charge(tx, player_id, amount)
        })
    }

    pub fn calculate_prizes(&self, game_id: i64) -> Result<PrizeBreakdown> {
        let conn = database::get_connection(&self.pool)?;
        let game = load_game(&conn, game_id)?;
        let players = games::list_players(&conn, game_id)?;
        Ok(prizes_for(&game, players.len()))
    }

    pub fn calculate_rating_points(&self, game_id: i64) -> Result<PointsMap> {
        let conn = database::get_connection(&self.pool)?;
        load_game(&conn, game_id)?;
        let players = games::list_players(&conn, game_id)?;
        Ok(calculate_rating_points(&players, &self.config.multiplayer.rating_points))
    }

    pub fn financial_summary(&self, game_id: i64) -> Result<FinancialSummary> {
        let conn = database::get_connection(&self.pool)?;
        let game = load_game(&conn, game_id)?;
        let players = games::list_players(&conn, game_id)?;
        Ok(FinancialSummary::build(&game, &players))
    }

    pub fn rating_summary(&self, game_id: i64) -> Result<RatingSummary> {
        let conn = database::get_connection(&self.pool)?;
        let game = load_game(&conn, game_id)?;
        let players = games::list_players(&conn, game_id)?;
        Ok(RatingSummary::build(&game, &players))
    }

    pub fn game(&self, game_id: i64) -> Result<MultiplayerGame> {
        let conn = database::get_connection(&self.pool)?;
        load_game(&conn, game_id)
    }

    pub fn players(&self, game_id: i64) -> Result<Vec<MultiplayerPlayer>> {
        let conn = database::get_connection(&self.pool)?;
        games::list_players(&conn, game_id)
    }
}

fn prizes_for(game: &MultiplayerGame, player_count: usize) -> PrizeBreakdown {
    let split = PrizeSplit::new(
        game.first_place_percent,
        game.second_place_percent,
        game.grand_final_percent,
    );
    calculate_prizes(game.entrance_fee, player_count, split)
}

fn load_game(conn: &Connection, game_id: i64) -> Result<MultiplayerGame> {
    Ok(games::find_game(conn, game_id)?.ok_or(EngineError::not_found("MultiplayerGame", game_id))?)
}

fn load_player(conn: &Connection, player_id: i64) -> Result<MultiplayerPlayer> {
    Ok(games::find_player(conn, player_id)?.ok_or(EngineError::not_found("MultiplayerPlayer", player_id))?)
}

/// The player and their game, provided the game is running and the
/// player is still in it.
fn load_playing(conn: &Connection, player_id: i64) -> Result<(MultiplayerGame, MultiplayerPlayer)> {
    let player = load_player(conn, player_id)?;
    let game = load_game(conn, player.game_id)?;
    if game.status != GameStatus::InProgress {
        bail!("Game {} is {}, not in progress", game.id, game.status.as_str());
    }
    if !player.is_active() {
        bail!("Player {} is already out of game {}", player_id, game.id);
    }
    Ok((game, player))
}
