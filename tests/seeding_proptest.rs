//! Property-based checks for bracket placement and seeding.

use cue_league::bracket::{bracket_positions, bracket_size_for, reorder_for_bracket};
use cue_league::domain::Participant;
use cue_league::errors::EngineError;
use cue_league::seeding::distribution::snake_distribute;
use cue_league::seeding::{SeedingEngine, validate};
use proptest::prelude::*;

fn seeded(seeds: &[u32]) -> Vec<Participant> {
    seeds
        .iter()
        .enumerate()
        .map(|(idx, seed)| {
            let mut participant = Participant::new(idx as i64 + 1, 1000);
            participant.seed = Some(*seed);
            participant
        })
        .collect()
}

// Bracket sizes 2..=128
fn bracket_size_strategy() -> impl Strategy<Value = u32> {
    (1u32..=7).prop_map(|exp| 1 << exp)
}

fn shuffled_seeds(max: usize) -> impl Strategy<Value = Vec<u32>> {
    (1..=max)
        .prop_flat_map(|n| Just((1..=n as u32).collect::<Vec<_>>()).prop_shuffle())
}

proptest! {
    #[test]
    fn test_positions_are_a_permutation(size in bracket_size_strategy()) {
        let positions = bracket_positions(size).unwrap();

        let mut slots: Vec<u32> = positions.values().copied().collect();
        slots.sort();
        prop_assert_eq!(slots, (1..=size).collect::<Vec<_>>());
        prop_assert_eq!(positions.keys().copied().collect::<Vec<_>>(), (1..=size).collect::<Vec<_>>());
    }

    #[test]
    fn test_first_round_opponents_are_complementary(size in bracket_size_strategy()) {
        let positions = bracket_positions(size).unwrap();
        let mut seed_at = vec![0u32; size as usize];
        for (seed, pos) in &positions {
            seed_at[(*pos - 1) as usize] = *seed;
        }

        for pair in seed_at.chunks(2) {
            prop_assert_eq!(pair[0] + pair[1], size + 1);
        }
    }

    #[test]
    fn test_non_powers_of_two_are_rejected(size in 3u32..1000) {
        prop_assume!(!size.is_power_of_two());
        prop_assert_eq!(bracket_positions(size), Err(EngineError::InvalidBracketSize(size)));
    }

    #[test]
    fn test_every_entrant_gets_a_slot(seeds in shuffled_seeds(40)) {
        let participants = seeded(&seeds);
        let size = bracket_size_for(participants.len());
        let slots = reorder_for_bracket(&participants, size).unwrap();

        let placed = slots.iter().filter(|s| !s.is_bye()).count();
        prop_assert_eq!(placed, participants.len());
        prop_assert!(size as usize >= participants.len());
        prop_assert!((size as usize) < participants.len().max(2) * 2);
    }

    #[test]
    fn test_any_permutation_validates(seeds in shuffled_seeds(64)) {
        prop_assert!(validate(&seeded(&seeds)).is_ok());
    }

    #[test]
    fn test_repeated_seed_is_caught(seeds in shuffled_seeds(32), pick in any::<prop::sample::Index>()) {
        prop_assume!(seeds.len() >= 2);
        let mut broken = seeds.clone();
        let victim = pick.index(broken.len() - 1) + 1;
        broken[victim] = broken[0];

        prop_assert_eq!(validate(&seeded(&broken)), Err(EngineError::DuplicateSeed(broken[0])));
    }

    #[test]
    fn test_snake_groups_are_balanced(count in 1usize..200, groups in 1usize..12) {
        let dealt = snake_distribute(1..=count, groups);

        let sizes: Vec<usize> = dealt.iter().map(Vec::len).collect();
        let (min, max) = (sizes.iter().min().unwrap(), sizes.iter().max().unwrap());
        prop_assert!(max - min <= 1);

        // Groups with a full pair of rounds carry the same rank sum.
        let full_pairs = count / (2 * groups);
        let paired_sums: Vec<usize> = dealt
            .iter()
            .map(|group| group.iter().take(full_pairs * 2).sum())
            .collect();
        prop_assert!(paired_sums.windows(2).all(|w| w[0] == w[1]));
    }

    #[test]
    fn test_rating_seeding_always_validates(ratings in prop::collection::vec(800i32..2400, 1..50), groups in 1usize..8) {
        let participants: Vec<Participant> = ratings
            .iter()
            .enumerate()
            .map(|(idx, rating)| Participant::new(idx as i64 + 1, *rating))
            .collect();

        let seeded = SeedingEngine::default().apply_by_rating(participants, groups);
        prop_assert!(validate(&seeded).is_ok());
        let top = ratings.iter().max().unwrap();
        prop_assert_eq!(seeded[0].rating, *top);
    }
}
