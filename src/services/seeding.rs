use std::collections::HashMap;

use anyhow::Result;
use log::info;
use rusqlite::Connection;

use crate::bracket::{BracketSlot, bracket_size_for, check_bracket_size, reorder_for_bracket};
use crate::config::AppConfig;
use crate::database::{self, DbPool, in_transaction, participants, stages, tournaments};
use crate::domain::{Participant, ParticipantId, Stage, StageStatus};
use crate::errors::EngineError;
use crate::seeding::{GroupPreview, SeedingEngine, validate};

#[derive(Debug, Clone)]
pub enum SeedingMethod {
    Manual(HashMap<ParticipantId, u32>),
    Random { avoid_same_club: bool },
    ByRating { group_count: usize },
    ByPreviousResults { tournament_id: i64 },
}

impl SeedingMethod {
    fn label(&self) -> &'static str {
        match self {
            SeedingMethod::Manual(_) => "manual",
            SeedingMethod::Random { avoid_same_club: false } => "random",
            SeedingMethod::Random { avoid_same_club: true } => "random (club separation)",
            SeedingMethod::ByRating { .. } => "rating",
            SeedingMethod::ByPreviousResults { .. } => "previous results",
        }
    }
}

/// Seeds stages and turns seeded stages into brackets, persisting each
/// step atomically.
pub struct SeedingService {
    pool: DbPool,
    config: AppConfig,
    engine: SeedingEngine,
}

impl SeedingService {
    pub fn new(pool: DbPool, config: AppConfig) -> Self {
        let engine = SeedingEngine::new(config.seeding.clone());
        Self { pool, config, engine }
    }

    pub fn apply_manual(&self, stage_id: i64, seed_map: HashMap<ParticipantId, u32>) -> Result<Vec<Participant>> {
        self.seed_stage(stage_id, &SeedingMethod::Manual(seed_map))
    }

    pub fn apply_random(&self, stage_id: i64, avoid_same_club: bool) -> Result<Vec<Participant>> {
        self.seed_stage(stage_id, &SeedingMethod::Random { avoid_same_club })
    }

    pub fn apply_by_rating(&self, stage_id: i64, group_count: usize) -> Result<Vec<Participant>> {
        self.seed_stage(stage_id, &SeedingMethod::ByRating { group_count })
    }

    pub fn apply_by_previous_results(&self, stage_id: i64, tournament_id: i64) -> Result<Vec<Participant>> {
        self.seed_stage(stage_id, &SeedingMethod::ByPreviousResults { tournament_id })
    }

    /// Assigns seeds 1..N and marks the stage seeded. Nothing is written
    /// unless the resulting seeds validate.
    pub fn seed_stage(&self, stage_id: i64, method: &SeedingMethod) -> Result<Vec<Participant>> {
        let mut conn = database::get_connection(&self.pool)?;
        let seeded = in_transaction(&mut conn, &self.config.database, |tx| {
            let stage = load_stage(tx, stage_id)?;
            ensure_transition(&stage, StageStatus::Seeded)?;

            let entrants = participants::list_by_stage(tx, stage_id)?;
            let seeded = self.run_method(tx, entrants, method)?;
            validate(&seeded)?;

            for participant in &seeded {
                participants::update_seed(tx, participant.id, participant.seed)?;
            }
            stages::update_status(tx, stage_id, StageStatus::Seeded)?;
            Ok(seeded)
        })?;

        info!(
            "Seeded stage {} ({} participants, {})",
            stage_id,
            seeded.len(),
            method.label()
        );
        Ok(seeded)
    }

    fn run_method(
        &self,
        conn: &Connection,
        entrants: Vec<Participant>,
        method: &SeedingMethod,
    ) -> Result<Vec<Participant>> {
        let seeded = match method {
            SeedingMethod::Manual(seed_map) => self.engine.apply_manual(entrants, seed_map)?,
            SeedingMethod::Random { avoid_same_club } => {
                let mut rng = rand::rng();
                self.engine.apply_random(entrants, *avoid_same_club, &mut rng)
            }
            SeedingMethod::ByRating { group_count } => self.engine.apply_by_rating(entrants, *group_count),
            SeedingMethod::ByPreviousResults { tournament_id } => {
                let previous = tournaments::finish_positions(conn, *tournament_id)?;
                self.engine.apply_by_previous_results(entrants, &previous)
            }
        };
        Ok(seeded)
    }

    pub fn preview_groups(&self, stage_id: i64, group_count: usize) -> Result<Vec<GroupPreview>> {
        let conn = database::get_connection(&self.pool)?;
        load_stage(&conn, stage_id)?;
        let entrants = participants::list_by_stage(&conn, stage_id)?;
        Ok(self.engine.preview_groups(&entrants, group_count))
    }

    pub fn validate_stage(&self, stage_id: i64) -> Result<()> {
        let conn = database::get_connection(&self.pool)?;
        let entrants = participants::list_by_stage(&conn, stage_id)?;
        validate(&entrants)?;
        Ok(())
    }

    /// Places the seeded participants into a bracket of `bracket_size`
    /// slots (default: smallest power of two that fits) and locks the
    /// stage's seeding.
    pub fn generate_bracket(&self, stage_id: i64, bracket_size: Option<u32>) -> Result<Vec<BracketSlot>> {
        let mut conn = database::get_connection(&self.pool)?;
        let slots = in_transaction(&mut conn, &self.config.database, |tx| {
            let stage = load_stage(tx, stage_id)?;
            ensure_transition(&stage, StageStatus::BracketGenerated)?;

            let entrants = participants::list_by_stage(tx, stage_id)?;
            validate(&entrants)?;

            let size = bracket_size.unwrap_or_else(|| bracket_size_for(entrants.len()));
            check_bracket_size(size, self.config.seeding.max_bracket_size)?;
            let slots = reorder_for_bracket(&entrants, size)?;
            for (idx, slot) in slots.iter().enumerate() {
                if let Some(participant_id) = slot.participant() {
                    participants::update_bracket_position(tx, participant_id, idx as u32 + 1)?;
                }
            }

            stages::update_bracket_size(tx, stage_id, size)?;
            stages::update_status(tx, stage_id, StageStatus::BracketGenerated)?;
            Ok(slots)
        })?;

        info!(
            "Generated {}-slot bracket for stage {} ({} byes)",
            slots.len(),
            stage_id,
            slots.iter().filter(|s| s.is_bye()).count()
        );
        Ok(slots)
    }

    pub fn participants(&self, stage_id: i64) -> Result<Vec<Participant>> {
        let conn = database::get_connection(&self.pool)?;
        participants::list_by_stage(&conn, stage_id)
    }

    pub fn stage(&self, stage_id: i64) -> Result<Stage> {
        let conn = database::get_connection(&self.pool)?;
        load_stage(&conn, stage_id)
    }
}

fn load_stage(conn: &Connection, stage_id: i64) -> Result<Stage> {
    Ok(stages::find_by_id(conn, stage_id)?.ok_or(EngineError::not_found("Stage", stage_id))?)
}

fn ensure_transition(stage: &Stage, next: StageStatus) -> Result<(), EngineError> {
    if !stage.status.can_transition_to(next) {
        return Err(EngineError::InvalidStageTransition {
            from: stage.status.as_str().to_string(),
            to: next.as_str().to_string(),
        });
    }
    Ok(())
}
