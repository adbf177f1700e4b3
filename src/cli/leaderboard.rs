//! Leaderboard commands

use anyhow::Result;

use questboard::jobs::{JobKind, JobReport};
use questboard::models::LeaderboardKind;

use super::Context;

pub fn refresh_command(ctx: &Context) -> Result<()> {
    match ctx.runner()?.run(JobKind::LeaderboardRefresh)? {
        JobReport::Refreshed(summary) => {
            for (board, rows) in &summary {
                println!("  {board}: {rows}");
            }
        }
        _ => println!("A refresh is already running elsewhere; skipped."),
    }
    Ok(())
}

pub fn show_command(ctx: &Context, kind: LeaderboardKind, limit: usize) -> Result<()> {
    let rows = ctx.runner()?.aggregator().top(kind, limit)?;
    if rows.is_empty() {
        println!("{} is empty. Run `questboard leaderboard refresh`.", kind.label());
        return Ok(());
    }

    println!(
        "{} (as of {}):\n",
        kind.label(),
        rows[0].refreshed_at.format("%Y-%m-%d %H:%M UTC")
    );
    for row in &rows {
        if kind == LeaderboardKind::TopCheckIns {
            println!(
                "  {:>3}. {:<24} {:>6} ({} total)",
                row.rank, row.display_name, row.score, row.secondary_score
            );
        } else {
            println!("  {:>3}. {:<24} {:>6}", row.rank, row.display_name, row.score);
        }
    }
    Ok(())
}
