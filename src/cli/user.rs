//! User commands

use anyhow::{Context as _, Result};

use questboard::gamification::{LevelInfo, StreakInfo};
use questboard::models::{AccountKind, NewUser, UserId};
use questboard::store::{activity, badges, ledger, progress, users};
use questboard::time_window::local_date;

use super::Context;

/// Register a user and print its id
pub fn add_command(
    ctx: &Context,
    display_name: String,
    kind: AccountKind,
    id: Option<UserId>,
) -> Result<()> {
    let mut new_user = NewUser::with_kind(display_name, kind);
    if let Some(id) = id {
        new_user.id = id;
    }
    let user = ctx
        .engine()?
        .register_user(&new_user)
        .with_context(|| format!("Failed to register {}", new_user.display_name))?;
    println!("{}", user.id);
    Ok(())
}

/// Soft-deactivate a user; it drops off the next leaderboard refresh
pub fn deactivate_command(ctx: &Context, user_id: UserId) -> Result<()> {
    ctx.db.write(|tx| users::set_active(tx, user_id, false))?;
    println!("Deactivated {user_id}");
    Ok(())
}

/// Print a user's level, streak, counters, badges and mission progress
pub fn show_command(ctx: &Context, user_id: UserId) -> Result<()> {
    let offset = ctx.config.offset()?;
    let (user, counters, earned, records, recent) = ctx.db.read(|tx| {
        Ok::<_, questboard::EngineError>((
            users::require(tx, user_id)?,
            activity::get(tx, user_id)?,
            badges::for_user(tx, user_id)?,
            progress::for_user(tx, user_id)?,
            ledger::for_user(tx, user_id, 10)?,
        ))
    })?;

    let level = LevelInfo::new(user.total_xp);
    let today = local_date(chrono::Utc::now(), offset);
    let streak = StreakInfo {
        current: user.current_streak,
        longest: user.longest_streak,
        last_activity_day: user.last_activity_date,
    };

    println!("{} ({}, {})", user.display_name, user.id, user.account_kind);
    if !user.active {
        println!("  deactivated");
    }
    match level.next_level_xp {
        Some(next) => println!(
            "  Level {} {} - {} XP ({:.0}% to {next})",
            level.level,
            level.title,
            user.total_xp,
            level.progress_to_next() * 100.0
        ),
        None => println!("  Level {} {} - {} XP (max)", level.level, level.title, user.total_xp),
    }
    println!("  This month: {} XP", user.monthly_xp);
    println!(
        "  Streak: {} day(s){}, longest {}",
        user.current_streak,
        if streak.is_active(today) { "" } else { " (lapsed)" },
        user.longest_streak
    );
    println!(
        "  Reviews {} ({} meaningful), check-ins {} ({} verified), places {}",
        counters.reviews_written,
        counters.meaningful_reviews,
        counters.check_ins,
        counters.verified_check_ins,
        counters.unique_establishments
    );
    println!(
        "  Votes {}, helpful received {}, follows {}, photos {} ({} approved)",
        counters.votes_cast,
        counters.helpful_votes_received,
        counters.follows,
        counters.photos_uploaded,
        counters.photos_approved
    );

    if !earned.is_empty() {
        println!("\nBadges ({}):", earned.len());
        for badge in &earned {
            println!("  {} ({})", badge.badge_id, badge.earned_at.format("%Y-%m-%d"));
        }
    }

    if !records.is_empty() {
        println!("\nMissions:");
        for record in &records {
            let state = if record.completed { "done" } else { "open" };
            println!("  [{state}] {} - {}", record.mission_id, record.progress);
        }
    }

    if !recent.is_empty() {
        println!("\nRecent XP:");
        for tx in &recent {
            let related = tx
                .related
                .as_ref()
                .map(|r| format!(" ({} {})", r.kind(), r.id()))
                .unwrap_or_default();
            println!(
                "  {} {:+} {}{}",
                tx.created_at.format("%Y-%m-%d %H:%M"),
                tx.amount,
                tx.reason,
                related
            );
        }
    }

    Ok(())
}
