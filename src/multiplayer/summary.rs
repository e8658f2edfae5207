use serde::Serialize;

use super::prizes::calculate_prizes;
use crate::config::PrizeSplit;
use crate::domain::{MultiplayerGame, MultiplayerPlayer, UserId};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerFinancials {
    pub user_id: UserId,
    pub entrance_fee: i64,
    pub penalty_fee: i64,
    pub rebuy_total: i64,
    pub prize_amount: i64,
}

impl PlayerFinancials {
    pub fn total_paid(&self) -> i64 {
        self.entrance_fee + self.penalty_fee + self.rebuy_total
    }

    pub fn net(&self) -> i64 {
        self.prize_amount - self.total_paid()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinancialSummary {
    pub game_id: i64,
    pub player_count: usize,
    pub entrance_fee: i64,
    pub total_pool: i64,
    pub first_place_prize: i64,
    pub second_place_prize: i64,
    pub grand_final_fund: i64,
    /// Penalties paid into the time fund.
    pub time_fund: i64,
    pub rebuy_total: i64,
    pub players: Vec<PlayerFinancials>,
}

impl FinancialSummary {
    pub fn build(game: &MultiplayerGame, players: &[MultiplayerPlayer]) -> Self {
        let split = PrizeSplit::new(
            game.first_place_percent,
            game.second_place_percent,
            game.grand_final_percent,
        );
        let projected = calculate_prizes(game.entrance_fee, players.len(), split);

        let mut entries: Vec<PlayerFinancials> = players
            .iter()
            .map(|p| PlayerFinancials {
                user_id: p.user_id,
                entrance_fee: game.entrance_fee,
                penalty_fee: p.penalty_fee,
                rebuy_total: p.rebuy_total,
                prize_amount: p.prize_amount,
            })
            .collect();
        entries.sort_by_key(|e| e.user_id);

        Self {
            game_id: game.id,
            player_count: players.len(),
            entrance_fee: game.entrance_fee,
            total_pool: projected.total_pool,
            first_place_prize: game.first_place_prize.unwrap_or(projected.first_place),
            second_place_prize: game.second_place_prize.unwrap_or(projected.second_place),
            grand_final_fund: game.grand_final_fund.unwrap_or(projected.grand_final),
            time_fund: players.iter().map(|p| p.penalty_fee).sum(),
            rebuy_total: players.iter().map(|p| p.rebuy_total).sum(),
            players: entries,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatingSummaryEntry {
    pub user_id: UserId,
    pub finish_position: Option<u32>,
    pub rating_points: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatingSummary {
    pub game_id: i64,
    pub entries: Vec<RatingSummaryEntry>,
}

impl RatingSummary {
    /// Finished players first by place, unfinished ones after.
    pub fn build(game: &MultiplayerGame, players: &[MultiplayerPlayer]) -> Self {
        let mut entries: Vec<RatingSummaryEntry> = players
            .iter()
            .map(|p| RatingSummaryEntry {
                user_id: p.user_id,
                finish_position: p.finish_position,
                rating_points: p.rating_points,
            })
            .collect();
        entries.sort_by_key(|e| (e.finish_position.is_none(), e.finish_position, e.user_id));

        Self {
            game_id: game.id,
            entries,
        }
    }

    pub fn winner(&self) -> Option<UserId> {
        self.entries
            .iter()
            .find(|e| e.finish_position == Some(1))
            .map(|e| e.user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::GameStatus;

    fn game() -> MultiplayerGame {
        MultiplayerGame {
            id: 4,
            league_id: None,
            name: "Killer".to_string(),
            status: GameStatus::InProgress,
            entrance_fee: 100,
            max_players: None,
            registration_deadline: None,
            first_place_percent: 60,
            second_place_percent: 20,
            grand_final_percent: 20,
            initial_lives: Some(6),
            first_place_prize: None,
            second_place_prize: None,
            grand_final_fund: None,
            started_at: None,
            completed_at: None,
        }
    }

    fn player(user_id: UserId, finish_position: Option<u32>, penalty_fee: i64) -> MultiplayerPlayer {
        MultiplayerPlayer {
            id: user_id,
            game_id: 4,
            user_id,
            lives: 0,
            turn_order: None,
            finish_position,
            eliminated_at: None,
            rating_points: 0,
            penalty_fee,
            rebuy_total: 0,
            prize_amount: 0,
            joined_at: None,
        }
    }

    #[test]
    fn test_running_game_shows_projected_prizes() {
        let players = vec![player(2, None, 30), player(1, None, 0), player(3, None, 20)];
        let summary = FinancialSummary::build(&game(), &players);

        assert_eq!(summary.total_pool, 300);
        assert_eq!(summary.first_place_prize, 180);
        assert_eq!(summary.time_fund, 50);
        assert_eq!(summary.players[0].user_id, 1);
        assert_eq!(summary.players[1].total_paid(), 130);
    }

    #[test]
    fn test_unfinished_players_listed_last() {
        let players = vec![player(1, None, 0), player(2, Some(2), 0), player(3, Some(1), 0)];
        let summary = RatingSummary::build(&game(), &players);

        let order: Vec<UserId> = summary.entries.iter().map(|e| e.user_id).collect();
        assert_eq!(order, vec![3, 2, 1]);
        assert_eq!(summary.winner(), Some(3));
    }
}
