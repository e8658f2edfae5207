use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension, params};

use super::columns::parse_tag;
use crate::domain::{Stage, StageStatus};

pub fn insert_stage(conn: &Connection, tournament_id: i64, name: &str) -> Result<Stage> {
    let sql = "INSERT INTO stages (tournament_id, name, status) VALUES (?1, ?2, 'unseeded') RETURNING id, tournament_id, name, status, bracket_size";

    conn.query_row(sql, params![tournament_id, name], parse_stage_row)
        .context("Failed to insert stage")
}

fn parse_stage_row(row: &rusqlite::Row) -> rusqlite::Result<Stage> {
    Ok(Stage {
        id: row.get(0)?,
        tournament_id: row.get(1)?,
        name: row.get(2)?,
        status: parse_tag(row, 3, StageStatus::parse)?,
        bracket_size: row.get(4)?,
    })
}

pub fn find_by_id(conn: &Connection, id: i64) -> Result<Option<Stage>> {
    let sql = "SELECT id, tournament_id, name, status, bracket_size FROM stages WHERE id = ?1";

    conn.query_row(sql, params![id], parse_stage_row)
        .optional()
        .context("Failed to query stage by id")
}

pub fn update_status(conn: &Connection, id: i64, status: StageStatus) -> Result<()> {
    conn.execute(
        "UPDATE stages SET status = ?1 WHERE id = ?2",
        params![status.as_str(), id],
    )
    .context("Failed to update stage status")?;
    Ok(())
}

pub fn update_bracket_size(conn: &Connection, id: i64, bracket_size: u32) -> Result<()> {
    conn.execute(
        "UPDATE stages SET bracket_size = ?1 WHERE id = ?2",
        params![bracket_size, id],
    )
    .context("Failed to update stage bracket size")?;
    Ok(())
}
