use anyhow::{Context, Result};
use rusqlite::{Connection, params};

pub fn insert_club(conn: &Connection, name: &str) -> Result<i64> {
    conn.query_row(
        "INSERT INTO clubs (name) VALUES (?1) RETURNING id",
        params![name],
        |row| row.get(0),
    )
    .context("Failed to insert club")
}

pub fn insert_player(conn: &Connection, name: &str, home_club_id: Option<i64>) -> Result<i64> {
    conn.query_row(
        "INSERT INTO players (name, home_club_id) VALUES (?1, ?2) RETURNING id",
        params![name, home_club_id],
        |row| row.get(0),
    )
    .context("Failed to insert player")
}

pub fn insert_team(conn: &Connection, name: &str, club_id: Option<i64>) -> Result<i64> {
    conn.query_row(
        "INSERT INTO teams (name, club_id) VALUES (?1, ?2) RETURNING id",
        params![name, club_id],
        |row| row.get(0),
    )
    .context("Failed to insert team")
}
