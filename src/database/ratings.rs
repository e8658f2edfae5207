use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension, params};

use crate::domain::{Rating, RatingId, RatingValue, UserId};

const COLUMNS: &str = "id, league_id, user_id, rating, position, is_active, is_confirmed, created_at";

pub fn insert_rating(
    conn: &Connection,
    league_id: i64,
    user_id: UserId,
    rating: RatingValue,
) -> Result<Rating> {
    let sql = format!(
        "INSERT INTO ratings (league_id, user_id, rating, is_active, is_confirmed) VALUES (?1, ?2, ?3, 0, 0) RETURNING {}",
        COLUMNS
    );

    conn.query_row(&sql, params![league_id, user_id, rating], parse_rating_row)
        .context("Failed to insert rating")
}

fn parse_rating_row(row: &rusqlite::Row) -> rusqlite::Result<Rating> {
    Ok(Rating {
        id: row.get(0)?,
        league_id: row.get(1)?,
        user_id: row.get(2)?,
        rating: row.get(3)?,
        position: row.get(4)?,
        is_active: row.get(5)?,
        is_confirmed: row.get(6)?,
        created_at: row.get(7)?,
    })
}

pub fn find_by_id(conn: &Connection, id: RatingId) -> Result<Option<Rating>> {
    let sql = format!("SELECT {} FROM ratings WHERE id = ?1", COLUMNS);

    conn.query_row(&sql, params![id], parse_rating_row)
        .optional()
        .context("Failed to query rating by id")
}

pub fn find_by_user_league(conn: &Connection, user_id: UserId, league_id: i64) -> Result<Option<Rating>> {
    let sql = format!("SELECT {} FROM ratings WHERE user_id = ?1 AND league_id = ?2", COLUMNS);

    conn.query_row(&sql, params![user_id, league_id], parse_rating_row)
        .optional()
        .context("Failed to query rating by user and league")
}

pub fn find_active_by_user_league(
    conn: &Connection,
    user_id: UserId,
    league_id: i64,
) -> Result<Option<Rating>> {
    let sql = format!(
        "SELECT {} FROM ratings WHERE user_id = ?1 AND league_id = ?2 AND is_active = 1",
        COLUMNS
    );

    conn.query_row(&sql, params![user_id, league_id], parse_rating_row)
        .optional()
        .context("Failed to query active rating by user and league")
}

/// Active ratings in standings order.
pub fn list_active_by_league(conn: &Connection, league_id: i64) -> Result<Vec<Rating>> {
    let sql = format!(
        "SELECT {} FROM ratings WHERE league_id = ?1 AND is_active = 1 ORDER BY position ASC, id ASC",
        COLUMNS
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params![league_id], parse_rating_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(rows)
}

/// Active rating ids from best to worst; equal ratings keep insertion order.
pub fn list_active_ids_by_rating(conn: &Connection, league_id: i64) -> Result<Vec<RatingId>> {
    let sql = "SELECT id FROM ratings WHERE league_id = ?1 AND is_active = 1 ORDER BY rating DESC, id ASC";

    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params![league_id], |row| row.get(0))?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(rows)
}

pub fn update_rating_value(conn: &Connection, id: RatingId, rating: RatingValue) -> Result<()> {
    conn.execute("UPDATE ratings SET rating = ?1 WHERE id = ?2", params![rating, id])
        .context("Failed to update rating value")?;
    Ok(())
}

pub fn update_position(conn: &Connection, id: RatingId, position: u32) -> Result<()> {
    conn.execute("UPDATE ratings SET position = ?1 WHERE id = ?2", params![position, id])
        .context("Failed to update rating position")?;
    Ok(())
}

pub fn clear_inactive_positions(conn: &Connection, league_id: i64) -> Result<()> {
    conn.execute(
        "UPDATE ratings SET position = NULL WHERE league_id = ?1 AND is_active = 0",
        params![league_id],
    )
    .context("Failed to clear inactive positions")?;
    Ok(())
}

pub fn set_membership(conn: &Connection, id: RatingId, is_active: bool, is_confirmed: bool) -> Result<()> {
    conn.execute(
        "UPDATE ratings SET is_active = ?1, is_confirmed = ?2 WHERE id = ?3",
        params![is_active, is_confirmed, id],
    )
    .context("Failed to update rating membership")?;
    Ok(())
}
