//! Integration tests for the mission engine over a file-backed database

mod common;

use chrono::Duration;
use uuid::Uuid;

use common::{Fixture, daily, narrative};
use questboard::EngineError;
use questboard::models::{
    Action, DomainEvent, GamificationEvent, NewUser, ProgressStatus, RelatedEntity, XpReason,
};
use questboard::store::{activity, badges, ledger, progress, users};

#[test]
fn test_fresh_completion_grants_every_reward_once() {
    let fx = Fixture::new();
    let mut mission = narrative("first-steps", Action::WriteReview, 3, 120);
    mission.badge_reward = Some("first-review".to_string());
    fx.seed();
    fx.add_mission(&mission);
    let user = fx.player("Ada");

    for expected in 1..=2 {
        let outcome = fx.engine.record_progress(user.id, "first-steps", 1).unwrap();
        assert_eq!(outcome.status, ProgressStatus::InProgress);
        assert_eq!(outcome.progress, expected);
        assert_eq!(outcome.xp_awarded, 0);
    }

    let outcome = fx.engine.record_progress(user.id, "first-steps", 5).unwrap();
    assert_eq!(outcome.status, ProgressStatus::NewlyCompleted);
    assert_eq!(outcome.progress, 7);
    assert_eq!(outcome.target, 3);
    assert_eq!(outcome.xp_awarded, 120);
    assert_eq!(outcome.badge_awarded.as_deref(), Some("first-review"));
    let level_up = outcome.level_up.expect("120 XP crosses level 2");
    assert_eq!((level_up.old_level, level_up.new_level), (1, 2));

    let conn = fx.db.conn();
    let record = progress::get(&conn, user.id, "first-steps").unwrap().unwrap();
    assert!(record.completed);
    assert_eq!(record.completed_at, Some(common::start_time()));

    let stored = users::require(&conn, user.id).unwrap();
    assert_eq!(stored.total_xp, 120);
    assert_eq!(stored.monthly_xp, 120);
    assert_eq!(stored.level, 2);

    let history = ledger::for_user(&conn, user.id, 10).unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].reason, XpReason::MissionCompleted);
    assert_eq!(
        history[0].related,
        Some(RelatedEntity::Mission("first-steps".to_string()))
    );
    assert_eq!(badges::earned_ids(&conn, user.id).unwrap(), vec!["first-review"]);
}

#[test]
fn test_five_reviews_complete_on_the_fifth_call() {
    let fx = Fixture::new();
    let mut mission = narrative("five-reviews", Action::WriteReview, 5, 60);
    mission.badge_reward = Some("critic".to_string());
    fx.seed();
    fx.add_mission(&mission);
    let user = fx.player("Abe");

    for expected in 1..=4 {
        let outcome = fx.engine.record_progress(user.id, "five-reviews", 1).unwrap();
        assert!(!outcome.completed());
        assert_eq!(outcome.progress, expected);
    }
    let fifth = fx.engine.record_progress(user.id, "five-reviews", 1).unwrap();
    assert!(fifth.completed());
    assert_eq!(fifth.progress, 5);
    assert_eq!(fifth.xp_awarded, 60);
    assert_eq!(fifth.badge_awarded.as_deref(), Some("critic"));

    let conn = fx.db.conn();
    let history = ledger::for_user(&conn, user.id, 10).unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].amount, 60);
    assert_eq!(history[0].reason, XpReason::MissionCompleted);
    assert_eq!(badges::earned_ids(&conn, user.id).unwrap(), vec!["critic"]);
}

#[test]
fn test_completed_mission_is_idempotent() {
    let fx = Fixture::new();
    fx.add_mission(&narrative("m", Action::CheckIn, 1, 40));
    let user = fx.player("Bo");

    assert!(fx.engine.record_progress(user.id, "m", 1).unwrap().completed());
    let completed_at = progress::get(&fx.db.conn(), user.id, "m")
        .unwrap()
        .unwrap()
        .completed_at;
    assert!(completed_at.is_some());

    fx.clock.advance(Duration::minutes(5));
    for _ in 0..3 {
        let again = fx.engine.record_progress(user.id, "m", 2).unwrap();
        assert_eq!(again.status, ProgressStatus::AlreadyCompleted);
        assert_eq!(again.progress, 1);
    }
    let absolute = fx.engine.set_progress_absolute(user.id, "m", 9).unwrap();
    assert_eq!(absolute.status, ProgressStatus::AlreadyCompleted);

    let conn = fx.db.conn();
    let record = progress::get(&conn, user.id, "m").unwrap().unwrap();
    assert_eq!(record.completed_at, completed_at);
    assert_eq!(users::require(&conn, user.id).unwrap().total_xp, 40);
    assert_eq!(ledger::for_user(&conn, user.id, 10).unwrap().len(), 1);
    assert_eq!(activity::get(&conn, user.id).unwrap().missions_completed, 1);
}

#[test]
fn test_absolute_progress_overwrites_and_may_decrease() {
    let fx = Fixture::new();
    fx.add_mission(&narrative("photos", Action::UploadPhoto, 10, 50));
    let user = fx.player("Cy");

    assert_eq!(
        fx.engine.set_progress_absolute(user.id, "photos", 6).unwrap().progress,
        6
    );
    assert_eq!(
        fx.engine.set_progress_absolute(user.id, "photos", 4).unwrap().progress,
        4
    );
    let done = fx.engine.set_progress_absolute(user.id, "photos", 12).unwrap();
    assert!(done.completed());
    assert_eq!(done.progress, 12);

    assert!(matches!(
        fx.engine.set_progress_absolute(user.id, "photos", -3),
        Err(EngineError::NegativeProgress { value: -3, .. })
    ));
}

#[test]
fn test_ledger_matches_total_xp() {
    let fx = Fixture::new();
    fx.seed();
    let user = fx.player("Dee");

    fx.engine.grant_xp(user.id, 70, XpReason::Adjustment, None).unwrap();
    fx.engine
        .grant_xp(user.id, -25, XpReason::Adjustment, None)
        .unwrap();
    fx.engine
        .handle_event(&DomainEvent::ReviewCreated {
            user_id: user.id,
            review_id: "r-1".to_string(),
            category: None,
            zone: None,
            meaningful: true,
        })
        .unwrap();

    let conn = fx.db.conn();
    let stored = users::require(&conn, user.id).unwrap();
    assert_eq!(ledger::sum_for_user(&conn, user.id).unwrap(), stored.total_xp);
    // 70 - 25 + review 10 + meaningful bonus 5 + daily-review 20
    assert_eq!(stored.total_xp, 80);
}

#[test]
fn test_negative_adjustment_never_drops_below_level_one() {
    let fx = Fixture::new();
    let user = fx.player("Eve");

    let grant = fx
        .engine
        .grant_xp(user.id, -500, XpReason::Adjustment, None)
        .unwrap();
    assert_eq!(grant.total_xp, -500);
    assert_eq!(grant.level, 1);
    assert!(grant.level_up.is_none());
}

#[test]
fn test_streak_continuity_across_days() {
    let fx = Fixture::new();
    let user = fx.player("Fay");

    let mut last = None;
    for _ in 0..3 {
        last = Some(fx.engine.grant_xp(user.id, 5, XpReason::Adjustment, None).unwrap());
        fx.clock.advance(Duration::days(1));
    }
    assert_eq!(last.unwrap().current_streak, 3);

    // Second grant on the same day keeps the count
    fx.clock.advance(Duration::days(-1));
    let same_day = fx.engine.grant_xp(user.id, 5, XpReason::Adjustment, None).unwrap();
    assert_eq!(same_day.current_streak, 3);
    assert!(!same_day.streak_extended);

    // A missed day starts over
    fx.clock.advance(Duration::days(2));
    let restarted = fx.engine.grant_xp(user.id, 5, XpReason::Adjustment, None).unwrap();
    assert_eq!(restarted.current_streak, 1);

    let stored = users::require(&fx.db.conn(), user.id).unwrap();
    assert_eq!(stored.longest_streak, 3);
    assert_eq!(stored.current_streak, 1);
}

#[test]
fn test_daily_mission_completes_again_after_reset() {
    let fx = Fixture::new();
    fx.add_mission(&daily("daily-votes", Action::CastVote, 2, 10));
    let user = fx.player("Gil");

    fx.engine.record_progress(user.id, "daily-votes", 2).unwrap();
    fx.clock.advance(Duration::days(1));
    fx.runner()
        .run(questboard::jobs::JobKind::DailyReset)
        .unwrap();

    let outcome = fx.engine.record_progress(user.id, "daily-votes", 1).unwrap();
    assert_eq!(outcome.status, ProgressStatus::InProgress);
    assert_eq!(outcome.progress, 1);
    let outcome = fx.engine.record_progress(user.id, "daily-votes", 1).unwrap();
    assert!(outcome.completed());

    assert_eq!(users::require(&fx.db.conn(), user.id).unwrap().total_xp, 20);
}

#[test]
fn test_check_in_event_drives_missions_badges_and_level() {
    let fx = Fixture::new();
    fx.seed();
    let user = fx.player("Hana");

    let events = fx
        .engine
        .handle_event(&DomainEvent::CheckInCreated {
            user_id: user.id,
            check_in_id: "ci-9".to_string(),
            category: Some("cafe".to_string()),
            zone: Some("downtown".to_string()),
            verified: true,
            unique_establishments: 10,
        })
        .unwrap();

    let completed: Vec<&str> = events
        .iter()
        .filter_map(|e| match e {
            GamificationEvent::MissionCompleted { mission_id, .. } => Some(mission_id.as_str()),
            _ => None,
        })
        .collect();
    assert!(completed.contains(&"daily-check-in"));
    assert!(completed.contains(&"story-explorer"));
    assert!(!completed.contains(&"downtown-tour"));

    let earned: Vec<&str> = events
        .iter()
        .filter_map(|e| match e {
            GamificationEvent::BadgeEarned { badge_id, .. } => Some(badge_id.as_str()),
            _ => None,
        })
        .collect();
    assert!(earned.contains(&"city-explorer"));
    assert!(earned.contains(&"wanderer"));
    assert!(earned.contains(&"first-check-in"));
    assert!(
        events
            .iter()
            .any(|e| matches!(e, GamificationEvent::LevelUp { new_level: 2, .. }))
    );

    let conn = fx.db.conn();
    let stored = users::require(&conn, user.id).unwrap();
    // story-explorer 150 + daily-check-in 15 + verified check-in 10
    assert_eq!(stored.total_xp, 175);
    let counters = activity::get(&conn, user.id).unwrap();
    assert_eq!(counters.check_ins, 1);
    assert_eq!(counters.verified_check_ins, 1);
    assert_eq!(counters.unique_establishments, 10);
    assert_eq!(counters.missions_completed, 2);
    let tour = progress::get(&conn, user.id, "downtown-tour").unwrap().unwrap();
    assert_eq!(tour.progress, 1);
}

#[test]
fn test_event_with_unknown_participant_changes_nothing() {
    let fx = Fixture::new();
    fx.seed();
    let voter = fx.player("Ines");
    let vote = DomainEvent::VoteCast {
        voter_id: voter.id,
        vote_id: "v-1".to_string(),
        review_author_id: Uuid::new_v4(),
        helpful: true,
    };

    assert!(matches!(
        fx.engine.handle_event(&vote),
        Err(EngineError::UnknownUser(_))
    ));
    assert!(fx.engine.track_event(&vote).is_empty());

    let conn = fx.db.conn();
    assert_eq!(users::require(&conn, voter.id).unwrap().total_xp, 0);
    assert_eq!(activity::get(&conn, voter.id).unwrap().votes_cast, 0);
    assert!(progress::get(&conn, voter.id, "daily-votes").unwrap().is_none());
}

#[test]
fn test_helpful_vote_rewards_author() {
    let fx = Fixture::new();
    fx.seed();
    let voter = fx.player("Jo");
    let author = fx
        .engine
        .register_user(&NewUser::player("Kai"))
        .unwrap();

    fx.engine
        .handle_event(&DomainEvent::VoteCast {
            voter_id: voter.id,
            vote_id: "v-2".to_string(),
            review_author_id: author.id,
            helpful: true,
        })
        .unwrap();

    let conn = fx.db.conn();
    assert_eq!(users::require(&conn, voter.id).unwrap().total_xp, 1);
    assert_eq!(users::require(&conn, author.id).unwrap().total_xp, 2);
    assert_eq!(activity::get(&conn, author.id).unwrap().helpful_votes_received, 1);
    let story = progress::get(&conn, author.id, "story-helpful").unwrap().unwrap();
    assert_eq!(story.progress, 1);
}
