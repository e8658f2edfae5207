use std::collections::HashSet;

use crate::domain::Participant;
use crate::errors::EngineError;

/// Seeds must be exactly 1..=N, each used once.
pub fn validate(participants: &[Participant]) -> Result<(), EngineError> {
    let mut seeds: Vec<u32> = participants.iter().filter_map(|p| p.seed).collect();
    seeds.sort_unstable();

    let mut seen = HashSet::with_capacity(seeds.len());
    for &seed in &seeds {
        if !seen.insert(seed) {
            return Err(EngineError::DuplicateSeed(seed));
        }
    }

    let expected = (1..=participants.len() as u32).collect::<Vec<_>>();
    if seeds != expected {
        return Err(EngineError::NonSequentialSeeds {
            expected_max: participants.len(),
            found: seeds,
        });
    }

    Ok(())
}
