mod common;

use cue_league::database::{self, DbPool, matches};
use cue_league::domain::{Match, MatchStatus, RatingType};
use cue_league::errors::{EngineError, engine_error};
use cue_league::events::DomainEvent;
use cue_league::rating::DeltaRule;
use cue_league::services::RatingService;

use common::{league_with, memory_pool, rating_service};

fn positions(service: &RatingService, league_id: i64) -> Vec<(i64, Option<u32>, i32)> {
    service
        .standings(league_id)
        .unwrap()
        .into_iter()
        .map(|r| (r.user_id, r.position, r.rating))
        .collect()
}

/// Ratings are looked up before taking the single in-memory connection.
fn schedule(pool: &DbPool, service: &RatingService, league_id: i64, first: i64, second: i64) -> Match {
    let first = service.get_active_rating_for_user_league(first, league_id).unwrap().unwrap();
    let second = service.get_active_rating_for_user_league(second, league_id).unwrap().unwrap();
    let conn = database::get_connection(pool).unwrap();
    matches::insert_match(&conn, league_id, first.id, second.id).unwrap()
}

#[test]
fn test_members_get_dense_positions() {
    let pool = memory_pool();
    let (service, _) = rating_service(&pool);
    let league_id = league_with(&service, RatingType::Elo, &[10, 20, 30]);

    assert_eq!(
        positions(&service, league_id),
        vec![(10, Some(1), 1000), (20, Some(2), 1000), (30, Some(3), 1000)]
    );
}

#[test]
fn test_adding_twice_is_a_no_op() {
    let pool = memory_pool();
    let (service, events) = rating_service(&pool);
    let league_id = league_with(&service, RatingType::Elo, &[1]);

    assert!(!service.add_player(league_id, 1).unwrap());
    assert!(!service.confirm_player(league_id, 1).unwrap());

    assert_eq!(
        events.events(),
        vec![
            DomainEvent::PlayerAddedToLeague { league_id, user_id: 1 },
            DomainEvent::PlayerConfirmed { league_id, user_id: 1 },
        ]
    );
}

#[test]
fn test_unconfirmed_players_have_no_active_rating() {
    let pool = memory_pool();
    let (service, _) = rating_service(&pool);
    let league_id = league_with(&service, RatingType::Elo, &[1]);

    service.add_player(league_id, 2).unwrap();

    assert!(service.get_active_rating_for_user_league(1, league_id).unwrap().is_some());
    assert!(service.get_active_rating_for_user_league(2, league_id).unwrap().is_none());
    assert_eq!(service.standings(league_id).unwrap().len(), 1);
}

#[test]
fn test_match_result_reorders_standings() {
    let pool = memory_pool();
    let (service, events) = rating_service(&pool);
    let league_id = league_with(&service, RatingType::Elo, &[1, 2, 3]);

    let fixture = schedule(&pool, &service, league_id, 1, 2);

    let changes = service.update_ratings(fixture.id, 2).unwrap();
    assert_eq!(changes.get(&fixture.first_rating_id), Some(&975));
    assert_eq!(changes.get(&fixture.second_rating_id), Some(&1025));

    assert_eq!(
        positions(&service, league_id),
        vec![(2, Some(1), 1025), (3, Some(2), 1000), (1, Some(3), 975)]
    );

    let conn = database::get_connection(&pool).unwrap();
    let stored = matches::find_by_id(&conn, fixture.id).unwrap().unwrap();
    assert_eq!(stored.status, MatchStatus::Completed);
    assert_eq!(stored.winner_rating_id, Some(fixture.second_rating_id));
    assert_eq!(stored.first_rating_before, Some(1000));
    drop(conn);

    assert!(events.events().contains(&DomainEvent::MatchCompleted {
        match_id: fixture.id,
        winner_rating_id: fixture.second_rating_id,
        loser_rating_id: fixture.first_rating_id,
    }));
}

#[test]
fn test_completed_match_cannot_be_rated_again() {
    let pool = memory_pool();
    let (service, _) = rating_service(&pool);
    let league_id = league_with(&service, RatingType::Elo, &[1, 2]);

    let fixture = schedule(&pool, &service, league_id, 1, 2);
    service.update_ratings(fixture.id, 1).unwrap();

    let err = service.update_ratings(fixture.id, 1).unwrap_err();
    assert!(matches!(
        engine_error(&err),
        Some(EngineError::InvalidMatchTransition { .. })
    ));
    let ratings: Vec<i32> = service.standings(league_id).unwrap().iter().map(|r| r.rating).collect();
    assert_eq!(ratings, vec![1025, 975]);
}

#[test]
fn test_winner_must_play_in_the_match() {
    let pool = memory_pool();
    let (service, _) = rating_service(&pool);
    let league_id = league_with(&service, RatingType::Elo, &[1, 2]);

    let fixture = schedule(&pool, &service, league_id, 1, 2);

    let err = service.update_ratings(fixture.id, 99).unwrap_err();
    assert_eq!(engine_error(&err), Some(&EngineError::WinnerNotInMatch(99)));
}

#[test]
fn test_deactivated_player_leaves_the_table() {
    let pool = memory_pool();
    let (service, _) = rating_service(&pool);
    let league_id = league_with(&service, RatingType::Elo, &[1, 2, 3]);

    assert!(service.deactivate_player(league_id, 2).unwrap());
    assert!(!service.deactivate_player(league_id, 2).unwrap());

    assert_eq!(
        positions(&service, league_id),
        vec![(1, Some(1), 1000), (3, Some(2), 1000)]
    );
}

#[test]
fn test_league_rules_must_cover_every_difference() {
    let pool = memory_pool();
    let (service, _) = rating_service(&pool);

    let gappy = vec![DeltaRule::new(0, Some(50), 25, 25), DeltaRule::new(60, None, 10, 40)];
    let losers = vec![DeltaRule::new(0, None, -25, -25)];

    let err = service
        .create_league("Broken", RatingType::Elo, None, &gappy, &losers)
        .unwrap_err();
    assert!(matches!(engine_error(&err), Some(EngineError::InvalidRuleSet(_))));
}

#[test]
fn test_missing_league_is_reported() {
    let pool = memory_pool();
    let (service, _) = rating_service(&pool);

    let err = service.add_player(404, 1).unwrap_err();
    assert_eq!(engine_error(&err), Some(&EngineError::not_found("League", 404)));
}

#[test]
fn test_default_league_uses_configured_type() {
    let pool = memory_pool();
    let (service, _) = rating_service(&pool);

    let league = service.create_default_league("Tuesday ladder").unwrap();
    assert_eq!(league.rating_type, RatingType::Elo);
    assert_eq!(league.start_rating, 1000);
    assert_eq!(league.winner_rules.len(), 4);
}

#[test]
fn test_replaced_rules_drive_the_next_match() {
    let pool = memory_pool();
    let (service, _) = rating_service(&pool);
    let league_id = league_with(&service, RatingType::Elo, &[1, 2]);

    let flat_winners = vec![DeltaRule::new(0, None, 10, 10)];
    let flat_losers = vec![DeltaRule::new(0, None, -10, -10)];
    service.replace_rules(league_id, &flat_winners, &flat_losers).unwrap();

    let fixture = schedule(&pool, &service, league_id, 1, 2);
    let changes = service.update_ratings(fixture.id, 1).unwrap();
    assert_eq!(changes.get(&fixture.first_rating_id), Some(&1010));
    assert_eq!(changes.get(&fixture.second_rating_id), Some(&990));

    let bounded = vec![DeltaRule::new(0, Some(100), 10, 10)];
    let err = service.replace_rules(league_id, &bounded, &flat_losers).unwrap_err();
    assert!(matches!(engine_error(&err), Some(EngineError::InvalidRuleSet(_))));
}
