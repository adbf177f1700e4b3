//! Feed a domain event to the engine

use std::io::Read;

use anyhow::{Context as _, Result};

use questboard::models::DomainEvent;

use super::Context;

/// Apply one JSON-encoded event (`-` reads stdin) and print the resulting
/// notifications as JSON lines
pub fn event_command(ctx: &Context, json: &str) -> Result<()> {
    let raw = if json == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read event from stdin")?;
        buf
    } else {
        json.to_string()
    };

    let event: DomainEvent = serde_json::from_str(&raw).context("Invalid event JSON")?;
    let notifications = ctx.engine()?.handle_event(&event)?;
    for notification in &notifications {
        println!("{}", serde_json::to_string(notification)?);
    }
    Ok(())
}
