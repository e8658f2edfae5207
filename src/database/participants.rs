use anyhow::{Context, Result};
use rusqlite::{Connection, params};

use crate::domain::{Participant, ParticipantId, RatingValue};

pub fn insert_participant(
    conn: &Connection,
    stage_id: i64,
    player_id: Option<i64>,
    team_id: Option<i64>,
    rating: RatingValue,
) -> Result<ParticipantId> {
    conn.query_row(
        "INSERT INTO participants (stage_id, player_id, team_id, rating) VALUES (?1, ?2, ?3, ?4) RETURNING id",
        params![stage_id, player_id, team_id, rating],
        |row| row.get(0),
    )
    .context("Failed to insert participant")
}

fn parse_participant_row(row: &rusqlite::Row) -> rusqlite::Result<Participant> {
    Ok(Participant {
        id: row.get(0)?,
        player_id: row.get(1)?,
        team_id: row.get(2)?,
        club_id: row.get(3)?,
        rating: row.get(4)?,
        seed: row.get(5)?,
        bracket_position: row.get(6)?,
    })
}

/// Participants in arrival order. A team entry is affiliated with the
/// team's club, an individual with their home club.
pub fn list_by_stage(conn: &Connection, stage_id: i64) -> Result<Vec<Participant>> {
    let sql = "
        SELECT
            sp.id,
            sp.player_id,
            sp.team_id,
            CASE WHEN sp.team_id IS NOT NULL THEN t.club_id ELSE p.home_club_id END AS club_id,
            sp.rating,
            sp.seed,
            sp.bracket_position
        FROM participants sp
        LEFT JOIN teams t ON sp.team_id = t.id
        LEFT JOIN players p ON sp.player_id = p.id
        WHERE sp.stage_id = ?1
        ORDER BY sp.id ASC
    ";

    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params![stage_id], parse_participant_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(rows)
}

pub fn update_seed(conn: &Connection, id: ParticipantId, seed: Option<u32>) -> Result<()> {
    conn.execute(
        "UPDATE participants SET seed = ?1, bracket_position = NULL WHERE id = ?2",
        params![seed, id],
    )
    .context("Failed to update participant seed")?;
    Ok(())
}

pub fn update_bracket_position(conn: &Connection, id: ParticipantId, position: u32) -> Result<()> {
    conn.execute(
        "UPDATE participants SET bracket_position = ?1 WHERE id = ?2",
        params![position, id],
    )
    .context("Failed to update participant bracket position")?;
    Ok(())
}
