pub mod bracket;
pub mod cli;
pub mod config;
pub mod database;
pub mod domain;
pub mod errors;
pub mod events;
pub mod multiplayer;
pub mod rating;
pub mod seeding;
pub mod services;

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use cli::Cli;
use colored::Colorize;
use log::info;

use crate::bracket::{BracketSlot, bracket_positions, check_bracket_size, first_round_pairings};
use crate::cli::{Command, SeedMethod};
use crate::config::AppConfig;
use crate::database::DbPool;
use crate::events::{EventSink, LogEventSink};
use crate::services::{MatchService, MultiplayerService, RatingService, SeedingMethod, SeedingService};

pub fn interpret() -> Command {
    let cli = Cli::parse();
    cli.command
}

fn open_pool(config: &AppConfig) -> Result<DbPool> {
    let pool = database::create_pool(&config.database)?;
    let conn = database::get_connection(&pool)?;
    database::setup::ensure_schema(&conn)?;
    Ok(pool)
}

fn event_sink() -> Arc<dyn EventSink> {
    Arc::new(LogEventSink)
}

pub fn handle_init() -> Result<()> {
    let config = AppConfig::new();
    let pool = database::create_pool(&config.database)?;
    let conn = database::get_connection(&pool)?;
    database::setup::reset_database(&conn)?;
    info!("Database schema reset at {}", config.database.path);
    Ok(())
}

pub fn handle_create_league(name: &str) -> Result<()> {
    let config = AppConfig::new();
    let service = RatingService::new(open_pool(&config)?, config, event_sink());
    let league = service.create_default_league(name)?;
    println!("Created league {} ({})", league.id.to_string().bold(), league.rating_type.as_str());
    Ok(())
}

pub fn handle_bracket(size: u32) -> Result<()> {
    check_bracket_size(size, AppConfig::new().seeding.max_bracket_size)?;
    let positions = bracket_positions(size)?;
    println!("{}", format!("Bracket of {}", size).bold());
    for (seed, slot) in &positions {
        println!("  seed {:>3} -> slot {:>3}", seed, slot);
    }
    Ok(())
}

pub fn handle_seed(
    stage_id: i64,
    method: SeedMethod,
    seeds: &[(i64, u32)],
    groups: usize,
    tournament: Option<i64>,
) -> Result<()> {
    let config = AppConfig::new();
    let service = SeedingService::new(open_pool(&config)?, config);

    let method = match method {
        SeedMethod::Manual => SeedingMethod::Manual(seeds.iter().copied().collect::<HashMap<_, _>>()),
        SeedMethod::Random => SeedingMethod::Random { avoid_same_club: false },
        SeedMethod::RandomClubs => SeedingMethod::Random { avoid_same_club: true },
        SeedMethod::Rating => SeedingMethod::ByRating { group_count: groups },
        SeedMethod::Previous => SeedingMethod::ByPreviousResults {
            tournament_id: tournament.context("--tournament is required for previous-results seeding")?,
        },
    };

    let seeded = service.seed_stage(stage_id, &method)?;
    for participant in &seeded {
        println!(
            "  {:>3}. participant {} (rating {})",
            participant.seed.unwrap_or_default(),
            participant.id,
            participant.rating
        );
    }
    Ok(())
}

pub fn handle_preview(stage_id: i64, groups: usize) -> Result<()> {
    let config = AppConfig::new();
    let service = SeedingService::new(open_pool(&config)?, config);

    for group in service.preview_groups(stage_id, groups)? {
        println!("{}", group.name.bold());
        for participant in &group.participants {
            println!("  participant {} (rating {})", participant.id, participant.rating);
        }
    }
    Ok(())
}

pub fn handle_generate_bracket(stage_id: i64, size: Option<u32>) -> Result<()> {
    let config = AppConfig::new();
    let service = SeedingService::new(open_pool(&config)?, config);

    let slots = service.generate_bracket(stage_id, size)?;
    println!("{}", format!("Stage {}: {}-slot bracket", stage_id, slots.len()).bold());
    for (idx, (home, away)) in first_round_pairings(&slots).iter().enumerate() {
        println!("  match {:>3}: {} vs {}", idx + 1, describe_slot(home), describe_slot(away));
    }
    Ok(())
}

fn describe_slot(slot: &BracketSlot) -> String {
    match slot {
        BracketSlot::Participant(id) => format!("participant {}", id),
        BracketSlot::Bye => "bye".dimmed().to_string(),
    }
}

pub fn handle_standings(league_id: i64) -> Result<()> {
    let config = AppConfig::new();
    let service = RatingService::new(open_pool(&config)?, config, event_sink());

    let table = service.standings(league_id)?;
    println!("{}", format!("League {} standings", league_id).bold());
    for rating in &table {
        let position = rating.position.map_or("-".to_string(), |p| p.to_string());
        let line = format!("  {:>3}. user {:<6} {:>5}", position, rating.user_id, rating.rating);
        if rating.position == Some(1) {
            println!("{}", line.green());
        } else {
            println!("{}", line);
        }
    }
    Ok(())
}

pub fn handle_rearrange(league_id: i64) -> Result<()> {
    let config = AppConfig::new();
    let service = RatingService::new(open_pool(&config)?, config, event_sink());
    service.rearrange_positions(league_id)?;
    info!("Positions of league {} rearranged", league_id);
    Ok(())
}

pub fn handle_complete_match(match_id: i64, first_score: i32, second_score: i32) -> Result<()> {
    let config = AppConfig::new();
    let service = MatchService::new(open_pool(&config)?, config, event_sink());

    let rated = service.complete_match(match_id, first_score, second_score)?;
    for (rating_id, value) in &rated.changes {
        let marker = if *rating_id == rated.winner_rating_id {
            "won".green()
        } else {
            "lost".red()
        };
        println!("  rating {:<6} {:>5} ({})", rating_id, value, marker);
    }
    Ok(())
}

pub fn handle_game_summary(game_id: i64) -> Result<()> {
    let config = AppConfig::new();
    let service = MultiplayerService::new(open_pool(&config)?, config, event_sink());

    let money = service.financial_summary(game_id)?;
    let points = service.rating_summary(game_id)?;

    println!("{}", format!("Game {} ({} players)", game_id, money.player_count).bold());
    println!(
        "  pool {}  first {}  second {}  grand final {}  time fund {}",
        money.total_pool,
        money.first_place_prize,
        money.second_place_prize,
        money.grand_final_fund,
        money.time_fund
    );
    for entry in &points.entries {
        let place = entry.finish_position.map_or("-".to_string(), |p| p.to_string());
        println!("  {:>3}. user {:<6} {:>+4} pts", place, entry.user_id, entry.rating_points);
    }
    Ok(())
}
