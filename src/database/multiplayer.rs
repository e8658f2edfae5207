use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use rusqlite::{Connection, OptionalExtension, params};

use super::columns::parse_tag;
use crate::config::PrizeSplit;
use crate::domain::{CardType, GameStatus, MultiplayerGame, MultiplayerPlayer, UserId};
use crate::multiplayer::PrizeBreakdown;

const GAME_COLUMNS: &str = "id, league_id, name, status, entrance_fee, max_players, registration_deadline, first_place_percent, second_place_percent, grand_final_percent, initial_lives, first_place_prize, second_place_prize, grand_final_fund, started_at, completed_at";

const PLAYER_COLUMNS: &str = "id, game_id, user_id, lives, turn_order, finish_position, eliminated_at, rating_points, penalty_fee, rebuy_total, prize_amount, joined_at";

#[derive(Debug, Clone)]
pub struct NewGame<'a> {
    pub league_id: Option<i64>,
    pub name: &'a str,
    pub entrance_fee: i64,
    pub max_players: Option<u32>,
    pub registration_deadline: Option<NaiveDateTime>,
    pub split: PrizeSplit,
}

pub fn insert_game(conn: &Connection, game: &NewGame<'_>) -> Result<MultiplayerGame> {
    let sql = format!(
        "INSERT INTO multiplayer_games (league_id, name, status, entrance_fee, max_players, registration_deadline, first_place_percent, second_place_percent, grand_final_percent) VALUES (?1, ?2, 'registration', ?3, ?4, ?5, ?6, ?7, ?8) RETURNING {}",
        GAME_COLUMNS
    );

    conn.query_row(
        &sql,
        params![
            game.league_id,
            game.name,
            game.entrance_fee,
            game.max_players,
            game.registration_deadline,
            game.split.first,
            game.split.second,
            game.split.grand_final
        ],
        parse_game_row,
    )
    .context("Failed to insert multiplayer game")
}

fn parse_game_row(row: &rusqlite::Row) -> rusqlite::Result<MultiplayerGame> {
    Ok(MultiplayerGame {
        id: row.get(0)?,
        league_id: row.get(1)?,
        name: row.get(2)?,
        status: parse_tag(row, 3, GameStatus::parse)?,
        entrance_fee: row.get(4)?,
        max_players: row.get(5)?,
        registration_deadline: row.get(6)?,
        first_place_percent: row.get(7)?,
        second_place_percent: row.get(8)?,
        grand_final_percent: row.get(9)?,
        initial_lives: row.get(10)?,
        first_place_prize: row.get(11)?,
        second_place_prize: row.get(12)?,
        grand_final_fund: row.get(13)?,
        started_at: row.get(14)?,
        completed_at: row.get(15)?,
    })
}

pub fn find_game(conn: &Connection, id: i64) -> Result<Option<MultiplayerGame>> {
    let sql = format!("SELECT {} FROM multiplayer_games WHERE id = ?1", GAME_COLUMNS);

    conn.query_row(&sql, params![id], parse_game_row)
        .optional()
        .context("Failed to query multiplayer game by id")
}

/// Moves the game from `from` to `to` only if it is still in `from`.
/// Returns false when the game was already moved by someone else.
pub fn transition_status(conn: &Connection, id: i64, from: GameStatus, to: GameStatus) -> Result<bool> {
    let changed = conn
        .execute(
            "UPDATE multiplayer_games SET status = ?1 WHERE id = ?2 AND status = ?3",
            params![to.as_str(), id, from.as_str()],
        )
        .context("Failed to update multiplayer game status")?;
    Ok(changed == 1)
}

pub fn record_start(conn: &Connection, id: i64, initial_lives: u32, started_at: NaiveDateTime) -> Result<()> {
    conn.execute(
        "UPDATE multiplayer_games SET initial_lives = ?1, started_at = ?2 WHERE id = ?3",
        params![initial_lives, started_at, id],
    )
    .context("Failed to record multiplayer game start")?;
    Ok(())
}

pub fn record_completion(
    conn: &Connection,
    id: i64,
    prizes: &PrizeBreakdown,
    completed_at: NaiveDateTime,
) -> Result<()> {
    conn.execute(
        "UPDATE multiplayer_games SET first_place_prize = ?1, second_place_prize = ?2, grand_final_fund = ?3, completed_at = ?4 WHERE id = ?5",
        params![
            prizes.first_place,
            prizes.second_place,
            prizes.grand_final,
            completed_at,
            id
        ],
    )
    .context("Failed to record multiplayer game completion")?;
    Ok(())
}

/// Stamps the game's rating points as applied. Returns false when they
/// already were.
pub fn mark_points_applied(conn: &Connection, id: i64, applied_at: NaiveDateTime) -> Result<bool> {
    let changed = conn
        .execute(
            "UPDATE multiplayer_games SET points_applied_at = ?1 WHERE id = ?2 AND points_applied_at IS NULL",
            params![applied_at, id],
        )
        .context("Failed to mark multiplayer game points as applied")?;
    Ok(changed == 1)
}

pub fn insert_player(conn: &Connection, game_id: i64, user_id: UserId) -> Result<MultiplayerPlayer> {
    let sql = format!(
        "INSERT INTO multiplayer_players (game_id, user_id) VALUES (?1, ?2) RETURNING {}",
        PLAYER_COLUMNS
    );

    conn.query_row(&sql, params![game_id, user_id], parse_player_row)
        .context("Failed to insert multiplayer player")
}

fn parse_player_row(row: &rusqlite::Row) -> rusqlite::Result<MultiplayerPlayer> {
    Ok(MultiplayerPlayer {
        id: row.get(0)?,
        game_id: row.get(1)?,
        user_id: row.get(2)?,
        lives: row.get(3)?,
        turn_order: row.get(4)?,
        finish_position: row.get(5)?,
        eliminated_at: row.get(6)?,
        rating_points: row.get(7)?,
        penalty_fee: row.get(8)?,
        rebuy_total: row.get(9)?,
        prize_amount: row.get(10)?,
        joined_at: row.get(11)?,
    })
}

pub fn find_player(conn: &Connection, id: i64) -> Result<Option<MultiplayerPlayer>> {
    let sql = format!("SELECT {} FROM multiplayer_players WHERE id = ?1", PLAYER_COLUMNS);

    conn.query_row(&sql, params![id], parse_player_row)
        .optional()
        .context("Failed to query multiplayer player by id")
}

/// Players in join order.
pub fn list_players(conn: &Connection, game_id: i64) -> Result<Vec<MultiplayerPlayer>> {
    let sql = format!(
        "SELECT {} FROM multiplayer_players WHERE game_id = ?1 ORDER BY id ASC",
        PLAYER_COLUMNS
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params![game_id], parse_player_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(rows)
}

pub fn start_player(conn: &Connection, id: i64, lives: u32, turn_order: u32) -> Result<()> {
    conn.execute(
        "UPDATE multiplayer_players SET lives = ?1, turn_order = ?2 WHERE id = ?3",
        params![lives, turn_order, id],
    )
    .context("Failed to start multiplayer player")?;
    Ok(())
}

pub fn update_lives(conn: &Connection, id: i64, lives: u32) -> Result<()> {
    conn.execute(
        "UPDATE multiplayer_players SET lives = ?1 WHERE id = ?2",
        params![lives, id],
    )
    .context("Failed to update player lives")?;
    Ok(())
}

pub fn record_finish(
    conn: &Connection,
    id: i64,
    finish_position: u32,
    eliminated_at: Option<NaiveDateTime>,
) -> Result<()> {
    conn.execute(
        "UPDATE multiplayer_players SET finish_position = ?1, eliminated_at = ?2 WHERE id = ?3",
        params![finish_position, eliminated_at, id],
    )
    .context("Failed to record player finish")?;
    Ok(())
}

pub fn update_results(conn: &Connection, id: i64, rating_points: i32, prize_amount: i64) -> Result<()> {
    conn.execute(
        "UPDATE multiplayer_players SET rating_points = ?1, prize_amount = ?2 WHERE id = ?3",
        params![rating_points, prize_amount, id],
    )
    .context("Failed to update player results")?;
    Ok(())
}

pub fn add_penalty(conn: &Connection, id: i64, amount: i64) -> Result<()> {
    conn.execute(
        "UPDATE multiplayer_players SET penalty_fee = penalty_fee + ?1 WHERE id = ?2",
        params![amount, id],
    )
    .context("Failed to add player penalty")?;
    Ok(())
}

pub fn add_rebuy(conn: &Connection, id: i64, amount: i64) -> Result<()> {
    conn.execute(
        "UPDATE multiplayer_players SET rebuy_total = rebuy_total + ?1 WHERE id = ?2",
        params![amount, id],
    )
    .context("Failed to add player rebuy")?;
    Ok(())
}

pub fn grant_cards(conn: &Connection, player_id: i64) -> Result<()> {
    for card in CardType::ALL {
        conn.execute(
            "INSERT INTO multiplayer_cards (player_id, card_type, used) VALUES (?1, ?2, 0) ON CONFLICT (player_id, card_type) DO UPDATE SET used = 0",
            params![player_id, card.as_str()],
        )
        .context("Failed to grant card")?;
    }
    Ok(())
}

/// Flips an unused card to used. False if the card was used already or never granted.
pub fn use_card(conn: &Connection, player_id: i64, card: CardType) -> Result<bool> {
    let changed = conn
        .execute(
            "UPDATE multiplayer_cards SET used = 1 WHERE player_id = ?1 AND card_type = ?2 AND used = 0",
            params![player_id, card.as_str()],
        )
        .context("Failed to use card")?;
    Ok(changed == 1)
}

pub fn unused_cards(conn: &Connection, player_id: i64) -> Result<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT card_type FROM multiplayer_cards WHERE player_id = ?1 AND used = 0 ORDER BY card_type",
    )?;
    let rows = stmt
        .query_map(params![player_id], |row| row.get(0))?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(rows)
}
