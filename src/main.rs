use anyhow::Result;

use cue_league::cli::Command;
use cue_league::errors::engine_error;
use cue_league::{
    handle_bracket, handle_complete_match, handle_create_league, handle_game_summary,
    handle_generate_bracket, handle_init, handle_preview, handle_rearrange, handle_seed,
    handle_standings, interpret,
};

fn main() {
    setup_logging();
    parse_and_execute().unwrap_or_else(|e| {
        match engine_error(&e) {
            Some(engine) => eprintln!("Error: {}", engine.client_message()),
            None => eprintln!("Error: {e:#}"),
        }
        std::process::exit(1);
    });
}

fn setup_logging() {
    sensible_env_logger::init!();
}

fn parse_and_execute() -> Result<()> {
    let command = interpret();
    execute_command(&command)
}

fn execute_command(command: &Command) -> Result<()> {
    match command {
        Command::Init => handle_init(),
        Command::CreateLeague { name } => handle_create_league(name),
        Command::Bracket { size } => handle_bracket(*size),
        Command::Seed { stage, method, seeds, groups, tournament } => {
            handle_seed(*stage, *method, seeds, *groups, *tournament)
        }
        Command::Preview { stage, groups } => handle_preview(*stage, *groups),
        Command::GenerateBracket { stage, size } => handle_generate_bracket(*stage, *size),
        Command::Standings { league } => handle_standings(*league),
        Command::Rearrange { league } => handle_rearrange(*league),
        Command::CompleteMatch { match_id, first_score, second_score } => {
            handle_complete_match(*match_id, *first_score, *second_score)
        }
        Command::GameSummary { game } => handle_game_summary(*game),
    }
}
