use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use rusqlite::{Connection, OptionalExtension, params};

use super::columns::parse_tag;
use crate::domain::{Match, MatchStatus, RatingId, RatingValue};

const COLUMNS: &str = "id, league_id, first_rating_id, second_rating_id, first_score, second_score, winner_rating_id, loser_rating_id, first_rating_before, second_rating_before, status, completed_at";

pub fn insert_match(
    conn: &Connection,
    league_id: i64,
    first_rating_id: RatingId,
    second_rating_id: RatingId,
) -> Result<Match> {
    let sql = format!(
        "INSERT INTO matches (league_id, first_rating_id, second_rating_id, status) VALUES (?1, ?2, ?3, 'pending') RETURNING {}",
        COLUMNS
    );

    conn.query_row(&sql, params![league_id, first_rating_id, second_rating_id], parse_match_row)
        .context("Failed to insert match")
}

fn parse_match_row(row: &rusqlite::Row) -> rusqlite::Result<Match> {
    Ok(Match {
        id: row.get(0)?,
        league_id: row.get(1)?,
        first_rating_id: row.get(2)?,
        second_rating_id: row.get(3)?,
        first_score: row.get(4)?,
        second_score: row.get(5)?,
        winner_rating_id: row.get(6)?,
        loser_rating_id: row.get(7)?,
        first_rating_before: row.get(8)?,
        second_rating_before: row.get(9)?,
        status: parse_tag(row, 10, MatchStatus::parse)?,
        completed_at: row.get(11)?,
    })
}

pub fn find_by_id(conn: &Connection, id: i64) -> Result<Option<Match>> {
    let sql = format!("SELECT {} FROM matches WHERE id = ?1", COLUMNS);

    conn.query_row(&sql, params![id], parse_match_row)
        .optional()
        .context("Failed to query match by id")
}

pub fn update_status(conn: &Connection, id: i64, status: MatchStatus) -> Result<()> {
    conn.execute(
        "UPDATE matches SET status = ?1 WHERE id = ?2",
        params![status.as_str(), id],
    )
    .context("Failed to update match status")?;
    Ok(())
}

pub fn update_scores(conn: &Connection, id: i64, first_score: i32, second_score: i32) -> Result<()> {
    conn.execute(
        "UPDATE matches SET first_score = ?1, second_score = ?2 WHERE id = ?3",
        params![first_score, second_score, id],
    )
    .context("Failed to update match scores")?;
    Ok(())
}

/// Marks the match completed unless it already reached a final state.
/// Returns false when another writer got there first.
#[allow(clippy::too_many_arguments)]
pub fn mark_completed(
    conn: &Connection,
    id: i64,
    winner_rating_id: RatingId,
    loser_rating_id: RatingId,
    first_rating_before: RatingValue,
    second_rating_before: RatingValue,
    completed_at: NaiveDateTime,
) -> Result<bool> {
    let sql = "UPDATE matches SET status = 'completed', winner_rating_id = ?1, loser_rating_id = ?2, first_rating_before = ?3, second_rating_before = ?4, completed_at = ?5 WHERE id = ?6 AND status NOT IN ('completed', 'cancelled')";

    let changed = conn
        .execute(
            sql,
            params![
                winner_rating_id,
                loser_rating_id,
                first_rating_before,
                second_rating_before,
                completed_at,
                id
            ],
        )
        .context("Failed to mark match completed")?;
    Ok(changed == 1)
}
