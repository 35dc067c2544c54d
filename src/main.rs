//! Application entry point for meetpoint.
//!
//! Initializes all components and starts the HTTP server.

use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use dotenv::dotenv;
use log::debug;
use log::info;

use meetpoint::clock::SystemClock;
use meetpoint::config::Config;
use meetpoint::event::EventBus;
use meetpoint::event::SubscriptionCreatedEvent;
use meetpoint::logging::setup_logging;
use meetpoint::mail::LogMailTransport;
use meetpoint::mail::Mailer;
use meetpoint::repository::Repository;
use meetpoint::service::Services;
use meetpoint::subscriber::subscription_mail_subscriber::SubscriptionMailSubscriber;
use meetpoint::web::build_router;
use meetpoint::web::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    let init_start = Instant::now();
    let config = load_config()?;
    let event_bus = Arc::new(EventBus::new());

    let db = setup_database(&config, init_start).await?;
    let services = setup_services(db, &config, event_bus.clone());

    setup_subscribers(&event_bus);

    run(config, services, init_start).await
}

fn load_config() -> Result<Arc<Config>> {
    debug!("Loading configuration...");
    let config = Arc::new(Config::load()?);
    setup_logging(&config)?;
    info!("Starting meetpoint...");
    Ok(config)
}

async fn setup_database(config: &Config, init_start: Instant) -> Result<Arc<Repository>> {
    debug!("Setting up Repository...");
    let db = Arc::new(Repository::new(&config.db_url, &config.db_path).await?);

    info!("Running database migrations...");
    db.run_migrations().await?;
    info!(
        "Database setup complete ({:.2}s).",
        init_start.elapsed().as_secs_f64()
    );

    Ok(db)
}

fn setup_services(db: Arc<Repository>, config: &Config, event_bus: Arc<EventBus>) -> Arc<Services> {
    debug!("Setting up Services...");
    Arc::new(Services::new(
        db,
        Arc::new(SystemClock),
        event_bus,
        config.uploads_path.clone(),
    ))
}

fn setup_subscribers(event_bus: &EventBus) {
    debug!("Setting up Subscribers...");

    let mail_subscriber = Arc::new(SubscriptionMailSubscriber::new(
        Arc::new(Mailer::new()),
        Arc::new(LogMailTransport),
    ));

    event_bus.register_subscriber::<SubscriptionCreatedEvent, _>(mail_subscriber);
}

async fn run(config: Arc<Config>, services: Arc<Services>, init_start: Instant) -> Result<()> {
    let state = AppState::new(services, config.clone());
    let router = build_router(state);

    let listener = tokio::net::TcpListener::bind(&config.http_addr).await?;
    info!(
        "meetpoint is up on {} in {:.2}s. Press Ctrl+C to stop.",
        config.http_addr,
        init_start.elapsed().as_secs_f64()
    );

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shut down.");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Ctrl+C received, shutting down.");
    }
}
