//! Dependency wiring (composition root)

use crate::config::Settings;
use anyhow::{Context, Result};
use blackoutbox_core::application::{Stores, Watchdog};
use blackoutbox_core::port::time_provider::SystemTimeProvider;
use blackoutbox_core::port::TimeProvider;
use blackoutbox_infra_sqlite::{create_pool, run_migrations, sqlite_stores};
use blackoutbox_infra_system::{CupsSpooler, HttpHealthProbe};
use std::sync::Arc;
use tracing::info;

pub struct App {
    pub settings: Settings,
    pub stores: Stores,
    pub watchdog: Watchdog,
    pub clock: Arc<dyn TimeProvider>,
}

pub async fn build_app(settings: Settings) -> Result<App> {
    let database_url = settings.database_url();
    info!(database_url = %database_url, "Initializing database...");

    let pool = create_pool(&database_url)
        .await
        .context("DB pool creation failed")?;
    let version = run_migrations(&pool).await.context("Migration failed")?;
    info!(schema_version = version, "Database ready");

    let stores = sqlite_stores(pool);
    let clock: Arc<dyn TimeProvider> = Arc::new(SystemTimeProvider);
    let spooler = Arc::new(CupsSpooler::new(settings.spooler_config()));
    let probe = Arc::new(
        HttpHealthProbe::new(settings.probe_timeout()).context("Health probe setup failed")?,
    );

    let watchdog = Watchdog::new(
        stores.clone(),
        spooler,
        probe,
        Arc::clone(&clock),
        settings.watchdog_settings(),
    );

    Ok(App {
        settings,
        stores,
        watchdog,
        clock,
    })
}
