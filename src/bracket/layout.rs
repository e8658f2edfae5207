use serde::Serialize;

use super::positions::bracket_positions;
use crate::domain::{Participant, ParticipantId};
use crate::errors::EngineError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BracketSlot {
    Participant(ParticipantId),
    Bye,
}

impl BracketSlot {
    pub fn participant(&self) -> Option<ParticipantId> {
        match self {
            BracketSlot::Participant(id) => Some(*id),
            BracketSlot::Bye => None,
        }
    }

    pub fn is_bye(&self) -> bool {
        matches!(self, BracketSlot::Bye)
    }
}

/// Lays participants out into `bracket_size` slots.
///
/// Seeded participants land on their canonical position. Anyone without a
/// seed, or with a seed beyond the bracket, fills the remaining gaps in
/// arrival order. Whatever stays empty is a bye.
pub fn reorder_for_bracket(
    participants: &[Participant],
    bracket_size: u32,
) -> Result<Vec<BracketSlot>, EngineError> {
    let positions = bracket_positions(bracket_size)?;
    if participants.len() > bracket_size as usize {
        return Err(EngineError::TooManyParticipants {
            participants: participants.len(),
            bracket_size,
        });
    }

    let mut slots: Vec<Option<ParticipantId>> = vec![None; bracket_size as usize];
    let mut unplaced = Vec::new();

    for participant in participants {
        let position = participant.seed.and_then(|seed| positions.get(&seed));
        match position {
            Some(&pos) if slots[(pos - 1) as usize].is_none() => {
                slots[(pos - 1) as usize] = Some(participant.id);
            }
            _ => unplaced.push(participant.id),
        }
    }

    let mut unplaced = unplaced.into_iter();
    for slot in slots.iter_mut().filter(|s| s.is_none()) {
        match unplaced.next() {
            Some(id) => *slot = Some(id),
            None => break,
        }
    }

    Ok(slots
        .into_iter()
        .map(|slot| slot.map_or(BracketSlot::Bye, BracketSlot::Participant))
        .collect())
}

/// First-round pairs in slot order: (1, 2), (3, 4), ...
pub fn first_round_pairings(slots: &[BracketSlot]) -> Vec<(BracketSlot, BracketSlot)> {
    slots
        .chunks(2)
        .filter_map(|pair| match pair {
            [a, b] => Some((*a, *b)),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded(id: ParticipantId, seed: u32) -> Participant {
        Participant {
            seed: Some(seed),
            ..Participant::new(id, 1000)
        }
    }

    #[test]
    fn test_full_bracket_follows_positions() {
        let participants: Vec<Participant> = (1..=4).map(|s| seeded(s as i64 * 10, s)).collect();
        let slots = reorder_for_bracket(&participants, 4).unwrap();

        assert_eq!(
            slots,
            vec![
                BracketSlot::Participant(10),
                BracketSlot::Participant(40),
                BracketSlot::Participant(30),
                BracketSlot::Participant(20),
            ]
        );
    }

    #[test]
    fn test_missing_seeds_become_byes_against_top_seeds() {
        let participants: Vec<Participant> = (1..=6).map(|s| seeded(s as i64, s)).collect();
        let slots = reorder_for_bracket(&participants, 8).unwrap();
        let pairs = first_round_pairings(&slots);

        assert_eq!(pairs.len(), 4);
        assert_eq!(pairs[0], (BracketSlot::Participant(1), BracketSlot::Bye));
        assert_eq!(pairs[3], (BracketSlot::Bye, BracketSlot::Participant(2)));
        assert_eq!(slots.iter().filter(|s| s.is_bye()).count(), 2);
    }

    #[test]
    fn test_unseeded_fill_gaps_in_arrival_order() {
        let participants = vec![
            seeded(1, 1),
            Participant::new(7, 900),
            seeded(2, 2),
            Participant::new(8, 950),
        ];
        let slots = reorder_for_bracket(&participants, 4).unwrap();

        assert_eq!(
            slots,
            vec![
                BracketSlot::Participant(1),
                BracketSlot::Participant(7),
                BracketSlot::Participant(8),
                BracketSlot::Participant(2),
            ]
        );
    }

    #[test]
    fn test_overflow_rejected() {
        let participants: Vec<Participant> = (1..=5).map(|s| seeded(s as i64, s)).collect();
        let err = reorder_for_bracket(&participants, 4).unwrap_err();

        assert_eq!(
            err,
            EngineError::TooManyParticipants { participants: 5, bracket_size: 4 }
        );
    }

    #[test]
    fn test_invalid_size_rejected() {
        let err = reorder_for_bracket(&[], 6).unwrap_err();
        assert_eq!(err, EngineError::InvalidBracketSize(6));
    }
}
