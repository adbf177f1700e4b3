//! Concurrent writers on one database: shared handles and separate connections

mod common;

use std::sync::{Arc, Barrier};
use std::thread;

use common::{Fixture, narrative, utc};
use questboard::gamification::MissionEngine;
use questboard::models::{Action, ProgressStatus};
use questboard::store::{ledger, progress, users};

const THREADS: usize = 8;

#[test]
fn test_concurrent_increments_are_additive() {
    let fx = Fixture::new();
    fx.add_mission(&narrative("marathon", Action::WriteReview, 10_000, 10));
    let user = fx.player("Lea");
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let engine = fx.engine.clone();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                for _ in 0..25 {
                    engine.record_progress(user.id, "marathon", 1).unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("worker panicked");
    }

    let record = progress::get(&fx.db.conn(), user.id, "marathon").unwrap().unwrap();
    assert_eq!(record.progress, (THREADS * 25) as u32);
    assert!(!record.completed);
}

#[test]
fn test_separate_connections_complete_once() {
    let fx = Fixture::new();
    fx.add_mission(&narrative("sprint", Action::CheckIn, 40, 100));
    let user = fx.player("Milo");
    let barrier = Arc::new(Barrier::new(THREADS));

    // Every worker opens its own connection, like separate processes would
    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let db = fx.reopen();
            let clock = fx.clock.clone();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let engine = MissionEngine::new(db, utc()).with_clock(clock);
                barrier.wait();
                (0..10)
                    .map(|_| engine.record_progress(user.id, "sprint", 1).unwrap().status)
                    .filter(|status| *status == ProgressStatus::NewlyCompleted)
                    .count()
            })
        })
        .collect();
    let completions: usize = handles
        .into_iter()
        .map(|h| h.join().expect("worker panicked"))
        .sum();

    assert_eq!(completions, 1);
    let conn = fx.db.conn();
    let record = progress::get(&conn, user.id, "sprint").unwrap().unwrap();
    assert!(record.completed);
    // The counter freezes at the value that crossed the threshold
    assert_eq!(record.progress, 40);
    assert_eq!(users::require(&conn, user.id).unwrap().total_xp, 100);
    assert_eq!(ledger::for_user(&conn, user.id, 10).unwrap().len(), 1);
}

#[test]
fn test_racing_absolute_totals_complete_once() {
    let fx = Fixture::new();
    fx.add_mission(&narrative("explorer", Action::VisitEstablishments, 5, 60));
    let user = fx.player("Nora");
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|i| {
            let engine = fx.engine.clone();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                engine
                    .set_progress_absolute(user.id, "explorer", 3 + i as i64)
                    .unwrap()
                    .status
            })
        })
        .collect();
    let statuses: Vec<ProgressStatus> = handles
        .into_iter()
        .map(|h| h.join().expect("worker panicked"))
        .collect();

    let completions = statuses
        .iter()
        .filter(|s| **s == ProgressStatus::NewlyCompleted)
        .count();
    assert_eq!(completions, 1);
    let conn = fx.db.conn();
    let record = progress::get(&conn, user.id, "explorer").unwrap().unwrap();
    assert!(record.completed);
    assert!((5..=3 + THREADS as u32 - 1).contains(&record.progress));
    assert_eq!(users::require(&conn, user.id).unwrap().total_xp, 60);
    assert_eq!(ledger::for_user(&conn, user.id, 10).unwrap().len(), 1);
}

#[test]
fn test_absolute_totals_three_and_four_race_to_completion() {
    for round in 0..20 {
        let fx = Fixture::new();
        fx.add_mission(&narrative("places", Action::VisitEstablishments, 4, 25));
        let user = fx.player(&format!("Pat {round}"));
        let barrier = Arc::new(Barrier::new(2));

        let handles: Vec<_> = [3_i64, 4]
            .into_iter()
            .map(|value| {
                let engine = fx.engine.clone();
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    engine
                        .set_progress_absolute(user.id, "places", value)
                        .unwrap()
                        .status
                })
            })
            .collect();
        let completions = handles
            .into_iter()
            .map(|h| h.join().expect("worker panicked"))
            .filter(|status| *status == ProgressStatus::NewlyCompleted)
            .count();

        assert_eq!(completions, 1);
        let conn = fx.db.conn();
        let record = progress::get(&conn, user.id, "places").unwrap().unwrap();
        assert_eq!(record.progress, 4);
        assert!(record.completed);
        assert_eq!(ledger::for_user(&conn, user.id, 10).unwrap().len(), 1);
        assert_eq!(users::require(&conn, user.id).unwrap().total_xp, 25);
    }
}

#[test]
fn test_concurrent_xp_grants_keep_ledger_consistent() {
    let fx = Fixture::new();
    let user = fx.player("Otto");
    let other = fx.reopen();
    let barrier = Arc::new(Barrier::new(2));

    let engines = [
        fx.engine.clone(),
        MissionEngine::new(other, utc()).with_clock(fx.clock.clone()),
    ];
    let handles: Vec<_> = engines
        .into_iter()
        .map(|engine| {
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                for _ in 0..50 {
                    engine
                        .grant_xp(user.id, 3, questboard::models::XpReason::Adjustment, None)
                        .unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("worker panicked");
    }

    let conn = fx.db.conn();
    let stored = users::require(&conn, user.id).unwrap();
    assert_eq!(stored.total_xp, 300);
    assert_eq!(ledger::sum_for_user(&conn, user.id).unwrap(), 300);
}
