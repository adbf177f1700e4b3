use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use questboard::jobs::JobKind;
use questboard::models::{AccountKind, LeaderboardKind, UserId, XpReason};

mod cli;

#[derive(Parser)]
#[command(name = "questboard")]
#[command(about = "Missions, XP, badges and leaderboards for a directory and review platform")]
#[command(version)]
struct Cli {
    /// Path to the config file (defaults to ~/.questboard/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Path to the database (overrides database.path from the config)
    #[arg(short, long, global = true)]
    database: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the configuration file and the database
    Init {
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },

    /// Install the built-in missions and badges (existing ids are kept)
    Seed,

    /// Manage users
    User {
        #[command(subcommand)]
        action: UserAction,
    },

    /// Move mission progress by hand
    Progress {
        #[command(subcommand)]
        action: ProgressAction,
    },

    /// Grant XP by hand
    Xp {
        #[command(subcommand)]
        action: XpAction,
    },

    /// Apply a domain event given as JSON (`-` reads stdin)
    Event { json: String },

    /// Run a reset job now
    Reset { cadence: ResetCadenceArg },

    /// Refresh or show leaderboards
    Leaderboard {
        #[command(subcommand)]
        action: LeaderboardAction,
    },

    /// Run the scheduler until Ctrl-C
    Run,
}

#[derive(Subcommand)]
enum UserAction {
    /// Register a user and print its id
    Add {
        display_name: String,
        /// player, employee or staff
        #[arg(long, default_value = "player", value_parser = cli::parse_account_kind)]
        kind: AccountKind,
        /// Use this id instead of a random one
        #[arg(long)]
        id: Option<UserId>,
    },
    /// Deactivate a user (kept, but left off leaderboards)
    Deactivate { user_id: UserId },
    /// Show level, streak, badges and missions
    Show { user_id: UserId },
}

#[derive(Subcommand)]
enum ProgressAction {
    /// Add to a mission counter
    Record {
        user_id: UserId,
        mission_id: String,
        #[arg(long, default_value_t = 1, allow_negative_numbers = true)]
        by: i64,
    },
    /// Set a mission counter to a total
    Set {
        user_id: UserId,
        mission_id: String,
        #[arg(allow_negative_numbers = true)]
        value: i64,
    },
}

#[derive(Subcommand)]
enum XpAction {
    /// Append an XP transaction (negative amounts allowed)
    Grant {
        user_id: UserId,
        #[arg(allow_negative_numbers = true)]
        amount: i64,
        #[arg(long, default_value = "adjustment", value_parser = cli::parse_reason)]
        reason: XpReason,
    },
}

#[derive(Subcommand)]
enum LeaderboardAction {
    /// Recompute every board now
    Refresh,
    /// Print the latest snapshot of a board
    Show {
        #[arg(value_parser = cli::parse_board)]
        board: LeaderboardKind,
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ResetCadenceArg {
    Daily,
    Weekly,
    Monthly,
}

impl From<ResetCadenceArg> for JobKind {
    fn from(arg: ResetCadenceArg) -> Self {
        match arg {
            ResetCadenceArg::Daily => JobKind::DailyReset,
            ResetCadenceArg::Weekly => JobKind::WeeklyReset,
            ResetCadenceArg::Monthly => JobKind::MonthlyReset,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = cli.config.as_deref();
    let database = cli.database.as_deref();

    // Only `init` runs without opening the config and database
    let ctx = || cli::Context::open(config, database);
    match cli.command {
        Commands::Init { force } => cli::init::init_command(config, database, force)?,
        Commands::Seed => cli::seed::seed_command(&ctx()?)?,
        Commands::User { action } => match action {
            UserAction::Add {
                display_name,
                kind,
                id,
            } => cli::user::add_command(&ctx()?, display_name, kind, id)?,
            UserAction::Deactivate { user_id } => cli::user::deactivate_command(&ctx()?, user_id)?,
            UserAction::Show { user_id } => cli::user::show_command(&ctx()?, user_id)?,
        },
        Commands::Progress { action } => match action {
            ProgressAction::Record {
                user_id,
                mission_id,
                by,
            } => cli::progress::record_command(&ctx()?, user_id, &mission_id, by)?,
            ProgressAction::Set {
                user_id,
                mission_id,
                value,
            } => cli::progress::set_command(&ctx()?, user_id, &mission_id, value)?,
        },
        Commands::Xp { action } => match action {
            XpAction::Grant {
                user_id,
                amount,
                reason,
            } => cli::xp::grant_command(&ctx()?, user_id, amount, reason)?,
        },
        Commands::Event { json } => cli::event::event_command(&ctx()?, &json)?,
        Commands::Reset { cadence } => cli::reset::reset_command(&ctx()?, cadence.into())?,
        Commands::Leaderboard { action } => match action {
            LeaderboardAction::Refresh => cli::leaderboard::refresh_command(&ctx()?)?,
            LeaderboardAction::Show { board, limit } => {
                cli::leaderboard::show_command(&ctx()?, board, limit)?
            }
        },
        Commands::Run => cli::run::run_command(ctx()?).await?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_init_parses_without_context_arguments() {
        let cli = Cli::try_parse_from(["questboard", "init", "--force"]).unwrap();
        assert!(matches!(cli.command, Commands::Init { force: true }));
    }
}
