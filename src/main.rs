//! ServiceRoute Worker - travel-aware appointment slot suggestions
//!
//! Serves slot suggestions, bookings and the inbound task queue over NATS, or
//! runs a single suggestion/booking from the command line.

mod cli;
mod config;
mod defaults;
mod error;
mod handlers;
mod services;
mod store;
mod types;

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Duration;
use clap::Parser;
use tracing::{error, info};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{Cli, Command};
use crate::services::booking::{client_name_from_text, BookingService};
use crate::services::geocoding::{create_geocoder, Geocoder};
use crate::services::task_inbox;
use crate::store::{create_store, AppointmentStore, PgAppointmentStore};
use crate::types::{ConfirmSlotRequest, SuggestSlotsRequest};

#[tokio::main]
async fn main() -> Result<()> {
    // Logs directory - use LOGS_DIR env var or default to ../logs (relative to worker)
    let logs_dir = std::env::var("LOGS_DIR")
        .unwrap_or_else(|_| "../logs".to_string());
    std::fs::create_dir_all(&logs_dir).ok();

    // File appender for persistent logs (daily rotation)
    let file_appender = RollingFileAppender::new(
        Rotation::DAILY,
        &logs_dir,
        "worker.log",
    );
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    // Initialize logging - stderr (stdout carries CLI output) and file
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,serviceroute_worker=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::fmt::layer().with_writer(non_blocking).with_ansi(false))
        .init();

    let cli = Cli::parse();

    let config = config::Config::from_env()?;
    info!("Configuration loaded");

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config).await,
        Command::Migrate => {
            let url = config
                .database_url
                .as_deref()
                .context("DATABASE_URL must be set to run migrations")?;
            let store = PgAppointmentStore::connect(url).await?;
            store.run_migrations().await
        }
        Command::Suggest { location, days } => {
            let booking = booking_service(&config).await?;
            let response = booking
                .suggest(SuggestSlotsRequest {
                    text: Some(location),
                    location: None,
                    days_to_check: days,
                })
                .await?;
            println!("{}", serde_json::to_string_pretty(&response)?);
            Ok(())
        }
        Command::Book { location, start, client, notes } => {
            let booking = booking_service(&config).await?;
            let resolved = booking
                .resolve_location(&SuggestSlotsRequest {
                    text: Some(location.clone()),
                    ..Default::default()
                })
                .await?;
            let duration = Duration::minutes(i64::from(config.preferences.appointment_duration_minutes));
            let appointment = booking
                .confirm(ConfirmSlotRequest {
                    client_name: client.unwrap_or_else(|| client_name_from_text(&location)),
                    location: resolved,
                    start,
                    end: start + duration,
                    notes,
                })
                .await?;
            println!("{}", serde_json::to_string_pretty(&appointment)?);
            Ok(())
        }
    }
}

async fn booking_service(config: &config::Config) -> Result<BookingService> {
    let geocoder: Arc<dyn Geocoder> = Arc::from(create_geocoder(config)?);
    let store: Arc<dyn AppointmentStore> = Arc::from(create_store(config).await?);
    Ok(BookingService::new(
        geocoder,
        store,
        config.preferences.clone(),
        config.days_to_check,
    ))
}

async fn serve(config: config::Config) -> Result<()> {
    info!("Starting ServiceRoute Worker...");

    let booking = booking_service(&config).await?;

    // Connect to NATS (supports optional NATS_USER/NATS_PASSWORD auth).
    let nats_client = match (std::env::var("NATS_USER"), std::env::var("NATS_PASSWORD")) {
        (Ok(user), Ok(password)) if !user.is_empty() => {
            async_nats::ConnectOptions::new()
                .user_and_password(user, password)
                .connect(&config.nats_url)
                .await?
        }
        _ => async_nats::connect(&config.nats_url).await?,
    };
    info!("Connected to NATS at {}", config.nats_url);

    let (task_sender, task_inbox) = task_inbox::channel(config.task_queue_capacity);
    info!("Inbound task queue holds up to {} tasks", task_sender.capacity());

    if let Err(e) = handlers::start_handlers(nats_client, booking, task_sender, task_inbox).await {
        error!("Handler error: {}", e);
        return Err(e);
    }

    Ok(())
}
