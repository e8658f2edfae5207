use crate::config::RatingPointsCurve;
use crate::domain::MultiplayerPlayer;
use crate::rating::PointsMap;

/// Never decreases as the finish improves.
pub fn rating_points_for(finish_position: u32, player_count: usize, curve: &RatingPointsCurve) -> i32 {
    let outlasted = (player_count as i32 - finish_position as i32).max(0);
    let bonus = if finish_position == 1 { curve.winner_bonus } else { 0 };
    outlasted * curve.per_opponent_outlasted + bonus
}

/// Points per user for everyone with a finish position.
pub fn calculate_rating_points(players: &[MultiplayerPlayer], curve: &RatingPointsCurve) -> PointsMap {
    players
        .iter()
        .filter_map(|p| {
            p.finish_position
                .map(|pos| (p.user_id, rating_points_for(pos, players.len(), curve)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_better_finish_earns_at_least_as_much() {
        let curve = RatingPointsCurve::default();
        let points: Vec<i32> = (1..=6).map(|pos| rating_points_for(pos, 6, &curve)).collect();

        assert_eq!(points, vec![7, 4, 3, 2, 1, 0]);
        assert!(points.windows(2).all(|w| w[0] >= w[1]));
    }
}
