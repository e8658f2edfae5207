use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(author, version, about = "cue league seeding, brackets and ratings")]
pub struct Cli {
    /// Command
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
#[clap(rename_all = "kebab-case")]
pub enum Command {
    /// Drop and recreate the database schema
    Init,
    /// Create a league with the configured rating type and default rules
    CreateLeague {
        #[arg(short, long)]
        name: String,
    },
    /// Print the seed-to-slot layout of a bracket
    Bracket {
        /// Number of slots, a power of two
        #[arg(short, long)]
        size: u32,
    },
    /// Assign seeds to a stage's participants
    Seed {
        #[arg(long)]
        stage: i64,
        #[arg(short, long, value_enum)]
        method: SeedMethod,
        /// participant=seed pairs for manual seeding, e.g. 4=1,7=2
        #[arg(long, value_delimiter = ',', value_parser = parse_seed_pair)]
        seeds: Vec<(i64, u32)>,
        /// Group count for rating seeding
        #[arg(short, long, default_value_t = 2)]
        groups: usize,
        /// Finished tournament whose results order the seeds
        #[arg(long)]
        tournament: Option<i64>,
    },
    /// Show how a stage would split into groups
    Preview {
        #[arg(long)]
        stage: i64,
        #[arg(short, long, default_value_t = 2)]
        groups: usize,
    },
    /// Place a seeded stage into a bracket
    GenerateBracket {
        #[arg(long)]
        stage: i64,
        /// Defaults to the smallest power of two that fits
        #[arg(short, long)]
        size: Option<u32>,
    },
    /// Print a league table
    Standings {
        #[arg(long)]
        league: i64,
    },
    /// Recompute league positions from ratings
    Rearrange {
        #[arg(long)]
        league: i64,
    },
    /// Record a final score and rate the match
    CompleteMatch {
        #[arg(long = "match")]
        match_id: i64,
        #[arg(long)]
        first_score: i32,
        #[arg(long)]
        second_score: i32,
    },
    /// Print the money and rating points of a multiplayer game
    GameSummary {
        #[arg(long)]
        game: i64,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedMethod {
    Manual,
    Random,
    RandomClubs,
    Rating,
    Previous,
}

fn parse_seed_pair(value: &str) -> Result<(i64, u32), String> {
    let (participant, seed) = value
        .split_once('=')
        .ok_or_else(|| format!("expected participant=seed, got '{}'", value))?;
    let participant = participant
        .trim()
        .parse()
        .map_err(|_| format!("invalid participant id '{}'", participant))?;
    let seed = seed.trim().parse().map_err(|_| format!("invalid seed '{}'", seed))?;
    Ok((participant, seed))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_seed_pair() {
        assert_eq!(parse_seed_pair("12=3"), Ok((12, 3)));
        assert_eq!(parse_seed_pair(" 4 = 1 "), Ok((4, 1)));
        assert!(parse_seed_pair("4:1").is_err());
        assert!(parse_seed_pair("x=1").is_err());
    }

    #[test]
    fn test_manual_seed_command() {
        let cli = Cli::parse_from([
            "cue_league", "seed", "--stage", "3", "--method", "manual", "--seeds", "10=2,11=1",
        ]);
        assert_eq!(
            cli.command,
            Command::Seed {
                stage: 3,
                method: SeedMethod::Manual,
                seeds: vec![(10, 2), (11, 1)],
                groups: 2,
                tournament: None,
            }
        );
    }

    #[test]
    fn test_complete_match_command() {
        let cli = Cli::parse_from([
            "cue_league", "complete-match", "--match", "9", "--first-score", "5", "--second-score", "3",
        ]);
        assert_eq!(
            cli.command,
            Command::CompleteMatch { match_id: 9, first_score: 5, second_score: 3 }
        );
    }
}
