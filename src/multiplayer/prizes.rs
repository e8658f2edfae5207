use serde::Serialize;

use crate::config::PrizeSplit;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PrizeBreakdown {
    pub total_pool: i64,
    pub first_place: i64,
    pub second_place: i64,
    pub grand_final: i64,
}

/// Splits the entrance pool. Second place and the grand-final fund are
/// rounded down; first place takes what is left so nothing goes missing.
/// A pool beyond `i64::MAX` saturates there.
pub fn calculate_prizes(entrance_fee: i64, player_count: usize, split: PrizeSplit) -> PrizeBreakdown {
    let split = split.sanitized();
    let players = i64::try_from(player_count).unwrap_or(i64::MAX);
    let total_pool = entrance_fee.saturating_mul(players);
    let second_place = share(total_pool, split.second);
    let grand_final = share(total_pool, split.grand_final);

    PrizeBreakdown {
        total_pool,
        first_place: total_pool - second_place - grand_final,
        second_place,
        grand_final,
    }
}

fn share(total_pool: i64, percent: u32) -> i64 {
    // A valid split keeps each percent at or below 100, so the share fits.
    (i128::from(total_pool) * i128::from(percent) / 100) as i64
}
