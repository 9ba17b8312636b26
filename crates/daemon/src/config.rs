//! Daemon configuration
//!
//! Layers, lowest precedence first: built-in defaults, an optional TOML file,
//! then `BLACKOUTBOX_*` environment variables (`__` separates nested keys,
//! e.g. `BLACKOUTBOX_DATABASE__URL`).

use anyhow::{Context, Result};
use blackoutbox_core::application::{EscalationPolicy, SchedulerConfig, WatchdogSettings};
use blackoutbox_infra_system::CupsSpoolerConfig;
use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

const ENV_PREFIX: &str = "BLACKOUTBOX";

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    pub database: DatabaseSettings,
    pub scheduler: SchedulerSettings,
    pub monitor: MonitorSettings,
    pub spooler: SpoolerSettings,
    pub logging: LoggingSettings,
    /// How long `run` waits for an in-flight tick after a stop signal
    pub shutdown_grace_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database: DatabaseSettings::default(),
            scheduler: SchedulerSettings::default(),
            monitor: MonitorSettings::default(),
            spooler: SpoolerSettings::default(),
            logging: LoggingSettings::default(),
            shutdown_grace_secs: 60,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DatabaseSettings {
    pub url: String,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            url: "blackoutbox.db".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SchedulerSettings {
    pub tick_interval_secs: u64,
    pub stuck_job_threshold_secs: u64,
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            tick_interval_secs: 30,
            stuck_job_threshold_secs: 300,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct MonitorSettings {
    pub retry_threshold: u32,
    pub probe_timeout_secs: u64,
    pub slow_response_secs: u64,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            retry_threshold: 3,
            probe_timeout_secs: 5,
            slow_response_secs: 5,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SpoolerSettings {
    pub submit_command: String,
    pub queue_command: String,
    pub destination: Option<String>,
    pub command_timeout_secs: Option<u64>,
}

impl Default for SpoolerSettings {
    fn default() -> Self {
        Self {
            submit_command: "lp".to_string(),
            queue_command: "lpq".to_string(),
            destination: None,
            command_timeout_secs: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingSettings {
    pub format: LogFormat,
    /// Enables a daily rolling log file in this directory
    pub directory: Option<String>,
}

impl Settings {
    /// Load settings from defaults, `file` (if any) and the environment
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();

        if let Some(path) = file {
            let path_str = path
                .to_str()
                .with_context(|| format!("config path is not UTF-8: {}", path.display()))?;
            builder = builder.add_source(File::new(path_str, FileFormat::Toml).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings: Settings = builder
            .build()
            .context("Failed to read configuration")?
            .try_deserialize()
            .context("Invalid configuration")?;

        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<()> {
        if self.scheduler.tick_interval_secs == 0 {
            anyhow::bail!("scheduler.tick_interval_secs must be greater than 0");
        }
        if self.monitor.retry_threshold == 0 {
            anyhow::bail!("monitor.retry_threshold must be greater than 0");
        }
        if self.monitor.probe_timeout_secs == 0 {
            anyhow::bail!("monitor.probe_timeout_secs must be greater than 0");
        }
        Ok(())
    }

    /// Database URL with `~` expanded
    pub fn database_url(&self) -> String {
        let url = self.database.url.as_str();
        match url.strip_prefix("sqlite://") {
            Some(path) => format!("sqlite://{}", shellexpand::tilde(path)),
            None => shellexpand::tilde(url).into_owned(),
        }
    }

    pub fn watchdog_settings(&self) -> WatchdogSettings {
        WatchdogSettings {
            policy: EscalationPolicy::new(self.monitor.retry_threshold),
            slow_response_threshold: Duration::from_secs(self.monitor.slow_response_secs),
            scheduler: SchedulerConfig {
                tick_interval: Duration::from_secs(self.scheduler.tick_interval_secs),
                stuck_job_threshold: Duration::from_secs(self.scheduler.stuck_job_threshold_secs),
            },
        }
    }

    pub fn spooler_config(&self) -> CupsSpoolerConfig {
        CupsSpoolerConfig {
            submit_command: self.spooler.submit_command.clone(),
            queue_command: self.spooler.queue_command.clone(),
            destination: self.spooler.destination.clone(),
            command_timeout: self.spooler.command_timeout_secs.map(Duration::from_secs),
        }
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.monitor.probe_timeout_secs)
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace_secs)
    }
}
