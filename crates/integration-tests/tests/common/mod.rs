//! Shared wiring: real SQLite stores (in memory) around scripted doubles
#![allow(dead_code)]

use blackoutbox_core::application::{Stores, Watchdog, WatchdogSettings};
use blackoutbox_core::domain::{Document, Template, Trigger, TriggerId};
use blackoutbox_core::port::health_probe::mocks::ScriptedHealthProbe;
use blackoutbox_core::port::spooler::mocks::MockSpooler;
use blackoutbox_core::port::time_provider::mocks::ManualClock;
use blackoutbox_core::port::HealthProbe;
use blackoutbox_infra_sqlite::{create_pool, run_migrations, sqlite_stores};
use std::sync::Arc;

pub struct Harness {
    pub stores: Stores,
    pub spooler: Arc<MockSpooler>,
    pub clock: Arc<ManualClock>,
    pub watchdog: Watchdog,
}

pub async fn memory_stores() -> Stores {
    let pool = create_pool("sqlite::memory:").await.unwrap();
    run_migrations(&pool).await.unwrap();
    sqlite_stores(pool)
}

pub async fn harness(probe: Arc<dyn HealthProbe>) -> Harness {
    harness_with(probe, WatchdogSettings::default()).await
}

pub async fn harness_with(probe: Arc<dyn HealthProbe>, settings: WatchdogSettings) -> Harness {
    let stores = memory_stores().await;
    let spooler = Arc::new(MockSpooler::new());
    let clock = Arc::new(ManualClock::new(0));

    let watchdog = Watchdog::new(
        stores.clone(),
        spooler.clone(),
        probe,
        clock.clone(),
        settings,
    );

    Harness {
        stores,
        spooler,
        clock,
        watchdog,
    }
}

pub fn scripted(code: u16) -> Arc<ScriptedHealthProbe> {
    Arc::new(ScriptedHealthProbe::always(code))
}

impl Harness {
    pub async fn add_trigger(&self, system: &str, url: &str, buffer_seconds: i64) -> TriggerId {
        let trigger = Trigger::new(0, system, url, buffer_seconds, self.clock_now());
        self.stores.triggers.insert(&trigger).await.unwrap()
    }

    pub async fn add_document(&self, system: &str, file_reference: &str, path: &str) -> i64 {
        let document = Document::new(0, system, file_reference, path);
        self.stores.documents.insert(&document).await.unwrap()
    }

    pub async fn add_template(&self, system: &str, file_reference: &str, path: &str) -> i64 {
        let template = Template::new(0, system, file_reference, path, self.clock_now());
        self.stores.templates.insert(&template).await.unwrap()
    }

    pub async fn trigger(&self, id: TriggerId) -> Trigger {
        self.stores.triggers.find_by_id(id).await.unwrap().unwrap()
    }

    fn clock_now(&self) -> i64 {
        use blackoutbox_core::port::TimeProvider;
        self.clock.now_secs()
    }
}
