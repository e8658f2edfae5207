use std::cmp::Reverse;
use std::collections::HashMap;

use log::debug;
use rand::Rng;
use rand::seq::SliceRandom;

use super::distribution::{group_by_key, interleave, shuffle_within_blocks, snake_distribute};
use super::preview::{GroupPreview, group_name};
use super::validation::validate;
use crate::config::SeedingSettings;
use crate::domain::{Participant, ParticipantId};
use crate::errors::EngineError;

/// Assigns seeds 1..N to the participants of a stage.
///
/// Every strategy returns the participants in seed order with `seed` set and
/// any previous bracket position cleared. Nothing here touches storage.
pub struct SeedingEngine {
    settings: SeedingSettings,
}

impl SeedingEngine {
    pub fn new(settings: SeedingSettings) -> Self {
        Self { settings }
    }

    /// Applies an explicit participant → seed map. Participants missing from
    /// the map keep their current seed; the result must still validate.
    pub fn apply_manual(
        &self,
        mut participants: Vec<Participant>,
        seed_map: &HashMap<ParticipantId, u32>,
    ) -> Result<Vec<Participant>, EngineError> {
        for id in seed_map.keys() {
            if !participants.iter().any(|p| p.id == *id) {
                return Err(EngineError::not_found("Participant", *id));
            }
        }

        for participant in participants.iter_mut() {
            if let Some(&seed) = seed_map.get(&participant.id) {
                participant.seed = Some(seed);
                participant.bracket_position = None;
            }
        }

        validate(&participants)?;
        participants.sort_by_key(|p| p.seed);
        Ok(participants)
    }

    pub fn apply_random<R: Rng + ?Sized>(
        &self,
        mut participants: Vec<Participant>,
        avoid_same_club: bool,
        rng: &mut R,
    ) -> Vec<Participant> {
        if !avoid_same_club {
            participants.shuffle(rng);
            return assign_sequential(participants);
        }

        let clubs = group_by_key(participants, Participant::affiliation);
        debug!("Spreading participants across {} club groups", clubs.len());

        let mut spread = interleave(clubs);
        shuffle_within_blocks(&mut spread, self.settings.club_shuffle_block, rng);
        assign_sequential(spread)
    }

    /// Ranks by rating, snakes the ranking across `group_count` groups and
    /// reads the groups back one participant per group per round.
    pub fn apply_by_rating(
        &self,
        participants: Vec<Participant>,
        group_count: usize,
    ) -> Vec<Participant> {
        let ranked = rank_by_rating(participants);
        let groups = snake_distribute(ranked, group_count);
        assign_sequential(interleave(groups))
    }

    /// Orders by finish position in an earlier tournament (best first),
    /// breaking ties by current rating. `previous_ranks` is keyed by player
    /// id; anyone absent gets the configured worst rank. Team entries have
    /// no player id, so they always take that worst rank and fall in
    /// behind every ranked player, ordered among themselves by rating.
    pub fn apply_by_previous_results(
        &self,
        mut participants: Vec<Participant>,
        previous_ranks: &HashMap<i64, u32>,
    ) -> Vec<Participant> {
        let missing = self.settings.missing_previous_rank;
        participants.sort_by_key(|p| {
            let rank = p
                .player_id
                .and_then(|player_id| previous_ranks.get(&player_id).copied())
                .unwrap_or(missing);
            (rank, Reverse(p.rating))
        });
        assign_sequential(participants)
    }

    /// Read-only view of how `group_count` groups would look, using the
    /// current seeds.
    pub fn preview_groups(&self, participants: &[Participant], group_count: usize) -> Vec<GroupPreview> {
        let mut ordered = participants.to_vec();
        ordered.sort_by_key(|p| (p.seed.is_none(), p.seed, Reverse(p.rating)));

        snake_distribute(ordered, group_count)
            .into_iter()
            .enumerate()
            .map(|(idx, members)| GroupPreview {
                name: group_name(idx),
                participants: members,
            })
            .collect()
    }
}

impl Default for SeedingEngine {
    fn default() -> Self {
        Self::new(SeedingSettings::default())
    }
}

fn rank_by_rating(mut participants: Vec<Participant>) -> Vec<Participant> {
    participants.sort_by_key(|p| Reverse(p.rating));
    participants
}

fn assign_sequential(mut ordered: Vec<Participant>) -> Vec<Participant> {
    for (idx, participant) in ordered.iter_mut().enumerate() {
        participant.seed = Some(idx as u32 + 1);
        participant.bracket_position = None;
    }
    ordered
}
