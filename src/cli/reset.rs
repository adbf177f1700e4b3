//! Manual reset runs

use anyhow::Result;

use questboard::jobs::{JobKind, JobReport};

use super::Context;

/// Run one reset job now under the same guard the daemon uses
pub fn reset_command(ctx: &Context, kind: JobKind) -> Result<()> {
    match ctx.runner()?.run(kind)? {
        JobReport::Skipped => println!("{kind} is already running elsewhere; skipped."),
        JobReport::Reset(summary) => println!(
            "{kind}: {} rows reset across {} missions",
            summary.rows_changed, summary.missions
        ),
        JobReport::Monthly { xp_rows, missions } => println!(
            "{kind}: monthly XP cleared for {xp_rows} users, {} rows reset across {} missions",
            missions.rows_changed, missions.missions
        ),
        JobReport::Refreshed(_) => {}
    }
    Ok(())
}
