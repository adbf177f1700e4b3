//! Seed command implementation

use anyhow::Result;

use questboard::gamification::catalog;

use super::Context;

/// Insert the built-in badges and missions that are not present yet
pub fn seed_command(ctx: &Context) -> Result<()> {
    let now = chrono::Utc::now();
    let summary = ctx.db.write(|tx| catalog::seed(tx, now))?;

    println!(
        "Added {} of {} badges and {} of {} missions.",
        summary.badges_added,
        catalog::BADGES.len(),
        summary.missions_added,
        catalog::MISSIONS.len()
    );
    Ok(())
}
