//! Integration tests for reset jobs, leaderboard refreshes and the job guard

mod common;

use chrono::{Duration, TimeZone, Utc};

use common::{Fixture, daily, narrative, utc, weekly};
use questboard::jobs::{JobKind, JobReport, JobRunner};
use questboard::models::{AccountKind, Action, LeaderboardKind, NewUser, XpReason};
use questboard::store::{progress, users};

#[test]
fn test_resets_are_idempotent_and_scoped_to_cadence() {
    let fx = Fixture::new();
    fx.add_mission(&daily("d", Action::CheckIn, 1, 5));
    fx.add_mission(&weekly("w", Action::CheckIn, 3, 30));
    fx.add_mission(&narrative("n", Action::CheckIn, 10, 50));
    let user = fx.player("Pam");
    for id in ["d", "w", "n"] {
        fx.engine.record_progress(user.id, id, 1).unwrap();
    }

    let runner = fx.runner();
    let JobReport::Reset(first) = runner.run(JobKind::DailyReset).unwrap() else {
        panic!("daily reset did not run");
    };
    assert_eq!(first.missions, 1);
    assert_eq!(first.rows_changed, 1);

    let JobReport::Reset(second) = runner.run(JobKind::DailyReset).unwrap() else {
        panic!("daily reset did not run");
    };
    assert_eq!(second.rows_changed, 0);

    let conn = fx.db.conn();
    let d = progress::get(&conn, user.id, "d").unwrap().unwrap();
    assert_eq!((d.progress, d.completed, d.completed_at), (0, false, None));
    assert_eq!(progress::get(&conn, user.id, "w").unwrap().unwrap().progress, 1);
    assert_eq!(progress::get(&conn, user.id, "n").unwrap().unwrap().progress, 1);
    // Rewards already granted stay granted
    assert_eq!(users::require(&conn, user.id).unwrap().total_xp, 5);
    drop(conn);

    let JobReport::Reset(week) = runner.run(JobKind::WeeklyReset).unwrap() else {
        panic!("weekly reset did not run");
    };
    assert_eq!(week.rows_changed, 1);
    let conn = fx.db.conn();
    assert_eq!(progress::get(&conn, user.id, "w").unwrap().unwrap().progress, 0);
    assert_eq!(progress::get(&conn, user.id, "n").unwrap().unwrap().progress, 1);
}

#[test]
fn test_monthly_reset_zeroes_monthly_xp_only() {
    let fx = Fixture::new();
    fx.seed();
    let user = fx.player("Quinn");
    fx.engine.grant_xp(user.id, 90, XpReason::Adjustment, None).unwrap();
    fx.engine
        .record_progress(user.id, "bakery-month", 2)
        .unwrap();

    let runner = fx.runner();
    let report = runner.run(JobKind::MonthlyReset).unwrap();
    let JobReport::Monthly { xp_rows, missions } = report else {
        panic!("monthly reset did not run");
    };
    assert_eq!(xp_rows, 1);
    assert_eq!(missions.rows_changed, 1);

    let conn = fx.db.conn();
    let stored = users::require(&conn, user.id).unwrap();
    assert_eq!(stored.monthly_xp, 0);
    assert_eq!(stored.total_xp, 90);
    assert_eq!(stored.level, 1);
    assert_eq!(
        progress::get(&conn, user.id, "bakery-month").unwrap().unwrap().progress,
        0
    );
    drop(conn);

    let report = runner.run(JobKind::MonthlyReset).unwrap();
    assert!(matches!(report, JobReport::Monthly { xp_rows: 0, .. }));
}

#[test]
fn test_leaderboard_excludes_non_players_and_inactive_users() {
    let fx = Fixture::new();
    let player = fx.player("Rita");
    let quiet = fx.player("Sam");
    let gone = fx.player("Tess");
    let staff = fx
        .engine
        .register_user(&NewUser::with_kind("Uma", AccountKind::Staff))
        .unwrap();
    let employee = fx
        .engine
        .register_user(&NewUser::with_kind("Vic", AccountKind::Employee))
        .unwrap();

    for (user, xp) in [(&player, 40), (&gone, 500), (&staff, 900), (&employee, 700)] {
        fx.engine.grant_xp(user.id, xp, XpReason::Adjustment, None).unwrap();
    }
    users::set_active(&fx.db.conn(), gone.id, false).unwrap();

    let runner = fx.runner();
    let JobReport::Refreshed(summary) = runner.run(JobKind::LeaderboardRefresh).unwrap() else {
        panic!("refresh did not run");
    };
    assert_eq!(summary.get("global"), Some(&1));
    assert_eq!(summary.len(), LeaderboardKind::all().len());

    let aggregator = runner.aggregator();
    let top = aggregator.top(LeaderboardKind::Global, 10).unwrap();
    assert_eq!(top.len(), 1);
    assert_eq!(top[0].user_id, player.id);
    assert_eq!(top[0].rank, 1);
    assert_eq!(top[0].score, 40);
    for absent in [quiet.id, gone.id, staff.id, employee.id] {
        assert!(
            aggregator
                .rank_of(LeaderboardKind::Global, absent)
                .unwrap()
                .is_none()
        );
    }
}

#[test]
fn test_leaderboard_ties_go_to_older_accounts() {
    let fx = Fixture::new();
    let older = fx.player("Wes");
    fx.clock.advance(Duration::seconds(1));
    let newer = fx.player("Xia");
    fx.engine.grant_xp(newer.id, 25, XpReason::Adjustment, None).unwrap();
    fx.engine.grant_xp(older.id, 25, XpReason::Adjustment, None).unwrap();

    let aggregator = fx.runner().aggregator();
    aggregator.refresh_all(fx.engine.now()).unwrap();

    let top = aggregator.top(LeaderboardKind::Global, 10).unwrap();
    let order: Vec<_> = top.iter().map(|e| (e.rank, e.user_id)).collect();
    assert_eq!(order, vec![(1, older.id), (2, newer.id)]);
}

#[test]
fn test_weekly_board_counts_only_this_week() {
    let fx = Fixture::new();
    let early = fx.player("Yan");
    let late = fx.player("Zoe");
    fx.engine.grant_xp(early.id, 50, XpReason::Adjustment, None).unwrap();

    // Tuesday of the following week
    fx.clock.set(Utc.with_ymd_and_hms(2026, 3, 17, 9, 0, 0).unwrap());
    fx.engine.grant_xp(late.id, 20, XpReason::Adjustment, None).unwrap();
    fx.engine.grant_xp(early.id, -5, XpReason::Adjustment, None).unwrap();

    let runner = fx.runner();
    runner.run(JobKind::LeaderboardRefresh).unwrap();
    let aggregator = runner.aggregator();

    let weekly = aggregator.top(LeaderboardKind::Weekly, 10).unwrap();
    assert_eq!(weekly.len(), 1);
    assert_eq!((weekly[0].user_id, weekly[0].score), (late.id, 20));

    let global = aggregator.top(LeaderboardKind::Global, 10).unwrap();
    let order: Vec<_> = global.iter().map(|e| (e.user_id, e.score)).collect();
    assert_eq!(order, vec![(early.id, 45), (late.id, 20)]);
}

#[test]
fn test_overlapping_runs_are_skipped() {
    let fx = Fixture::new();
    let runner = fx.runner();

    let lease = runner
        .guard()
        .try_acquire(JobKind::LeaderboardRefresh)
        .unwrap()
        .expect("first lease");
    assert_eq!(
        runner.run(JobKind::LeaderboardRefresh).unwrap(),
        JobReport::Skipped
    );

    // A runner on its own connection contends on the lock file
    let other = JobRunner::new(fx.reopen(), utc(), 100);
    assert_eq!(
        other.run(JobKind::LeaderboardRefresh).unwrap(),
        JobReport::Skipped
    );
    // Other kinds are unaffected
    assert!(matches!(
        other.run(JobKind::DailyReset).unwrap(),
        JobReport::Reset(_)
    ));

    drop(lease);
    assert!(matches!(
        runner.run(JobKind::LeaderboardRefresh).unwrap(),
        JobReport::Refreshed(_)
    ));
}
