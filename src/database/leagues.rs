use anyhow::{Context, Result, anyhow};
use rusqlite::{Connection, OptionalExtension, params};

use crate::domain::{League, RatingType, RatingValue};
use crate::rating::DeltaRule;

struct LeagueRow {
    id: i64,
    name: String,
    rating_type: String,
    start_rating: RatingValue,
    winner_rules: String,
    loser_rules: String,
}

pub fn insert_league(
    conn: &Connection,
    name: &str,
    rating_type: RatingType,
    start_rating: RatingValue,
    winner_rules: &[DeltaRule],
    loser_rules: &[DeltaRule],
) -> Result<League> {
    let sql = "INSERT INTO leagues (name, rating_type, start_rating, winner_rules, loser_rules) VALUES (?1, ?2, ?3, ?4, ?5) RETURNING id, name, rating_type, start_rating, winner_rules, loser_rules";

    let row = conn
        .query_row(
            sql,
            params![
                name,
                rating_type.as_str(),
                start_rating,
                serde_json::to_string(winner_rules)?,
                serde_json::to_string(loser_rules)?
            ],
            parse_league_row,
        )
        .context("Failed to insert league")?;

    into_league(row)
}

pub fn update_rules(
    conn: &Connection,
    league_id: i64,
    winner_rules: &[DeltaRule],
    loser_rules: &[DeltaRule],
) -> Result<()> {
    let sql = "UPDATE leagues SET winner_rules = ?1, loser_rules = ?2 WHERE id = ?3";

    conn.execute(
        sql,
        params![
            serde_json::to_string(winner_rules)?,
            serde_json::to_string(loser_rules)?,
            league_id
        ],
    )
    .context("Failed to update league rules")?;
    Ok(())
}

fn parse_league_row(row: &rusqlite::Row) -> rusqlite::Result<LeagueRow> {
    Ok(LeagueRow {
        id: row.get(0)?,
        name: row.get(1)?,
        rating_type: row.get(2)?,
        start_rating: row.get(3)?,
        winner_rules: row.get(4)?,
        loser_rules: row.get(5)?,
    })
}

fn into_league(row: LeagueRow) -> Result<League> {
    let rating_type = RatingType::parse(&row.rating_type)
        .ok_or_else(|| anyhow!("Unknown rating type '{}' for league {}", row.rating_type, row.id))?;

    Ok(League {
        id: row.id,
        name: row.name,
        rating_type,
        start_rating: row.start_rating,
        winner_rules: serde_json::from_str(&row.winner_rules)
            .with_context(|| format!("Failed to parse winner rules of league {}", row.id))?,
        loser_rules: serde_json::from_str(&row.loser_rules)
            .with_context(|| format!("Failed to parse loser rules of league {}", row.id))?,
    })
}

pub fn find_by_id(conn: &Connection, id: i64) -> Result<Option<League>> {
    let sql = "SELECT id, name, rating_type, start_rating, winner_rules, loser_rules FROM leagues WHERE id = ?1";

    conn.query_row(sql, params![id], parse_league_row)
        .optional()
        .context("Failed to query league by id")?
        .map(into_league)
        .transpose()
}
