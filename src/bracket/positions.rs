use std::collections::BTreeMap;

use crate::errors::EngineError;

pub fn is_power_of_two(n: u32) -> bool {
    n > 0 && n & (n - 1) == 0
}

/// Smallest power-of-two bracket that fits `participants` (never below 2).
pub fn bracket_size_for(participants: usize) -> u32 {
    let needed = participants.max(2) as u32;
    needed.next_power_of_two()
}

/// Accepts a power-of-two size no larger than `max_size`.
pub fn check_bracket_size(bracket_size: u32, max_size: u32) -> Result<(), EngineError> {
    if !is_power_of_two(bracket_size) || bracket_size > max_size {
        return Err(EngineError::InvalidBracketSize(bracket_size));
    }
    Ok(())
}

/// Maps seed number to 1-based bracket position for a single-elimination
/// bracket.
///
/// Seed 1 opens the bracket and seed 2 closes it. Each doubling splits every
/// block into two halves, putting the incoming seed (complement of the
/// existing one) at the inner edge of the pair, so seeds `k` and `k + 1`
/// stay in opposite halves for as long as possible.
pub fn bracket_positions(bracket_size: u32) -> Result<BTreeMap<u32, u32>, EngineError> {
    if !is_power_of_two(bracket_size) {
        return Err(EngineError::InvalidBracketSize(bracket_size));
    }

    let order = seed_order(bracket_size);
    Ok(order
        .iter()
        .enumerate()
        .map(|(idx, &seed)| (seed, idx as u32 + 1))
        .collect())
}

/// Seed occupying each position, left to right.
fn seed_order(bracket_size: u32) -> Vec<u32> {
    if bracket_size == 1 {
        return vec![1];
    }

    let mut order = vec![1, 2];
    let mut groups = 2;
    while groups < bracket_size {
        groups *= 2;
        order = split_groups(&order, groups);
    }
    order
}

fn split_groups(order: &[u32], groups: u32) -> Vec<u32> {
    let mut next = Vec::with_capacity(order.len() * 2);
    for (idx, &seed) in order.iter().enumerate() {
        let opponent = groups + 1 - seed;
        if idx % 2 == 0 {
            next.push(seed);
            next.push(opponent);
        } else {
            next.push(opponent);
            next.push(seed);
        }
    }
    next
}
