//! Scheduler daemon

use anyhow::Result;

use questboard::jobs::Scheduler;

use super::Context;

/// Run resets and leaderboard refreshes until Ctrl-C
pub async fn run_command(ctx: Context) -> Result<()> {
    let scheduler = Scheduler::new(ctx.runner()?, ctx.config.scheduler.clone());
    scheduler
        .run(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for Ctrl-C: {}", e);
                std::future::pending::<()>().await;
            }
            tracing::info!("Shutdown requested");
        })
        .await
}
