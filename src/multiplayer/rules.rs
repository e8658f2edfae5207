use chrono::NaiveDateTime;
use rand::Rng;
use rand::seq::SliceRandom;

use crate::config::MultiplayerSettings;
use crate::domain::{GameStatus, MultiplayerGame, MultiplayerPlayer, UserId};

/// Bigger tables get fewer lives so games finish in reasonable time.
pub fn initial_lives(player_count: usize, settings: &MultiplayerSettings) -> u32 {
    settings
        .lives_tiers
        .iter()
        .find(|tier| player_count <= tier.max_players)
        .map_or(settings.fallback_lives, |tier| tier.lives)
}

/// A random permutation of 1..=count.
pub fn turn_orders<R: Rng + ?Sized>(count: usize, rng: &mut R) -> Vec<u32> {
    let mut orders: Vec<u32> = (1..=count as u32).collect();
    orders.shuffle(rng);
    orders
}

/// The player knocked out while `active_before` players were still in
/// finishes in that place: first out of six is sixth.
pub fn finish_position_on_elimination(active_before: usize) -> u32 {
    active_before as u32
}

pub fn can_join(
    game: &MultiplayerGame,
    players: &[MultiplayerPlayer],
    user_id: UserId,
    now: NaiveDateTime,
) -> bool {
    if game.status != GameStatus::Registration {
        return false;
    }
    if game.registration_deadline.is_some_and(|deadline| now > deadline) {
        return false;
    }
    if game.max_players.is_some_and(|max| players.len() >= max as usize) {
        return false;
    }
    !players.iter().any(|p| p.user_id == user_id)
}
