//! Manual mission progress commands

use anyhow::Result;

use questboard::models::{ProgressOutcome, ProgressStatus, UserId};

use super::Context;

pub fn record_command(ctx: &Context, user_id: UserId, mission_id: &str, by: i64) -> Result<()> {
    let outcome = ctx.engine()?.record_progress(user_id, mission_id, by)?;
    print_outcome(&outcome);
    Ok(())
}

pub fn set_command(ctx: &Context, user_id: UserId, mission_id: &str, value: i64) -> Result<()> {
    let outcome = ctx.engine()?.set_progress_absolute(user_id, mission_id, value)?;
    print_outcome(&outcome);
    Ok(())
}

fn print_outcome(outcome: &ProgressOutcome) {
    let status = match outcome.status {
        ProgressStatus::InProgress => "in progress",
        ProgressStatus::NewlyCompleted => "completed",
        ProgressStatus::AlreadyCompleted => "already completed",
        ProgressStatus::Inactive => "inactive",
    };
    println!(
        "{}: {}/{} {}",
        outcome.mission_id, outcome.progress, outcome.target, status
    );
    if outcome.xp_awarded != 0 {
        println!("  +{} XP", outcome.xp_awarded);
    }
    if let Some(badge) = &outcome.badge_awarded {
        println!("  Badge: {badge}");
    }
    for badge in &outcome.badges_unlocked {
        println!("  Badge unlocked: {badge}");
    }
    if let Some(level_up) = &outcome.level_up {
        println!("  Level up! {} -> {} ({})", level_up.old_level, level_up.new_level, level_up.new_title);
    }
}
