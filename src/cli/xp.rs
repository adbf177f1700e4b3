//! Manual XP grants

use anyhow::Result;

use questboard::models::{UserId, XpReason};

use super::Context;

/// Grant (or with a negative amount, claw back) XP
pub fn grant_command(ctx: &Context, user_id: UserId, amount: i64, reason: XpReason) -> Result<()> {
    let grant = ctx.engine()?.grant_xp(user_id, amount, reason, None)?;
    println!(
        "{:+} XP ({}): total {}, month {}, level {}, streak {}",
        grant.amount, reason, grant.total_xp, grant.monthly_xp, grant.level, grant.current_streak
    );
    if let Some(level_up) = &grant.level_up {
        println!("Level up! {} -> {} ({})", level_up.old_level, level_up.new_level, level_up.new_title);
    }
    for badge in &grant.badges_unlocked {
        println!("Badge unlocked: {badge}");
    }
    Ok(())
}
