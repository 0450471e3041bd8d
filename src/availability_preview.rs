//! Prints the dates an owner's weekly availability projects to.
//!
//! ```text
//! availability-preview <mentoring|tutoring|counselling> <owner-id> [horizon-days] [timezone]
//! ```

use color_eyre::eyre::{Result, WrapErr, eyre};
use dotenv::dotenv;
use mentorhub_client::{ApiClient, ClientConfig, SessionContext, ViewScope};
use mentorhub_core::{models::role::Role, scheduling::projector::Horizon};
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;
use uuid::Uuid;

const USAGE: &str =
    "usage: availability-preview <mentoring|tutoring|counselling> <owner-id> [horizon-days] [timezone]";

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    dotenv().ok();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::WARN)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args: Vec<String> = std::env::args().skip(1).collect();
    let role: Role = args
        .first()
        .ok_or_else(|| eyre!(USAGE))?
        .parse()
        .wrap_err(USAGE)?;
    let owner_id: Uuid = args
        .get(1)
        .ok_or_else(|| eyre!(USAGE))?
        .parse()
        .wrap_err("owner-id must be a UUID")?;
    let horizon = args
        .get(2)
        .map(|days| -> Result<Horizon> {
            let days = days.parse().wrap_err("horizon-days must be a number")?;
            Ok(Horizon::new(days)?)
        })
        .transpose()?;
    let timezone = args.get(3).map(String::as_str);

    let client = ApiClient::new(ClientConfig::from_env()?, SessionContext::new())?;
    let scope = ViewScope::new();

    // Ctrl-C cancels whatever is in flight
    let token = scope.token().clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            token.cancel();
        }
    });

    let slots = client.list_availability(role, owner_id, scope.token()).await?;
    let projection = client
        .project_availability(role, owner_id, horizon, timezone, scope.token())
        .await?;
    info!(slots = slots.len(), horizon = projection.horizon_days, "Fetched availability");

    let descriptor = role.descriptor();
    println!(
        "{} {} availability from {} for {} days",
        descriptor.owner_label, owner_id, projection.today, projection.horizon_days
    );
    for slot in &slots {
        let dates = projection
            .projections
            .iter()
            .find(|projected| projected.availability_id == slot.id)
            .map(|projected| projected.dates.as_slice())
            .unwrap_or_default();
        let weekday = slot
            .weekday()
            .map(|day| day.to_string())
            .unwrap_or_else(|| "?".to_string());
        let state = if slot.is_active { "" } else { " (paused)" };
        println!(
            "  {} {}-{}{}",
            weekday,
            slot.start_time.format("%H:%M"),
            slot.end_time.format("%H:%M"),
            state
        );
        for date in dates {
            println!("    {}", date);
        }
    }

    Ok(())
}
