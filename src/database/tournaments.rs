use std::collections::HashMap;

use anyhow::{Context, Result};
use rusqlite::{Connection, params};

pub fn insert_tournament(conn: &Connection, name: &str) -> Result<i64> {
    conn.query_row(
        "INSERT INTO tournaments (name) VALUES (?1) RETURNING id",
        params![name],
        |row| row.get(0),
    )
    .context("Failed to insert tournament")
}

pub fn insert_result(
    conn: &Connection,
    tournament_id: i64,
    player_id: i64,
    finish_position: u32,
) -> Result<()> {
    conn.execute(
        "INSERT INTO tournament_results (tournament_id, player_id, finish_position) VALUES (?1, ?2, ?3) ON CONFLICT (tournament_id, player_id) DO UPDATE SET finish_position = excluded.finish_position",
        params![tournament_id, player_id, finish_position],
    )
    .context("Failed to insert tournament result")?;
    Ok(())
}

/// Finish position per player id in the given tournament.
pub fn finish_positions(conn: &Connection, tournament_id: i64) -> Result<HashMap<i64, u32>> {
    let sql = "SELECT player_id, finish_position FROM tournament_results WHERE tournament_id = ?1";

    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params![tournament_id], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, u32>(1)?)))?
        .collect::<rusqlite::Result<HashMap<_, _>>>()?;

    Ok(rows)
}
