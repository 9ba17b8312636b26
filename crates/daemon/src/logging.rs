//! Tracing subscriber setup
//!
//! One registry, one `EnvFilter` (`RUST_LOG`, default `blackoutbox=info`),
//! and a stack of output layers: console (pretty or JSON), an optional daily
//! rolling JSON file, and the optional OpenTelemetry exporter.

use crate::config::{LogFormat, LoggingSettings};
use crate::telemetry::{self, TelemetrySetup};
#[cfg(feature = "telemetry")]
use crate::telemetry::TelemetryGuard;
use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry};

pub type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

const DEFAULT_FILTER: &str = "blackoutbox=info";
const LOG_FILE_PREFIX: &str = "blackoutbox.log";

/// Must be held for the life of the process
pub struct LoggingGuard {
    _file: Option<WorkerGuard>,
    #[cfg(feature = "telemetry")]
    telemetry: Option<TelemetryGuard>,
}

impl LoggingGuard {
    /// Flush exporters before exit
    pub fn shutdown(self) {
        #[cfg(feature = "telemetry")]
        {
            if let Some(telemetry) = self.telemetry {
                telemetry.shutdown();
            }
        }
    }
}

pub fn init_logging(settings: &LoggingSettings) -> Result<LoggingGuard> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(DEFAULT_FILTER))
        .context("Failed to create env filter")?;

    let mut layers: Vec<BoxedLayer> = Vec::new();

    layers.push(match settings.format {
        // Production: JSON structured logging
        LogFormat::Json => fmt::layer().json().with_writer(std::io::stderr).boxed(),
        // Development: pretty formatting with colors
        LogFormat::Pretty => fmt::layer().pretty().with_writer(std::io::stderr).boxed(),
    });

    let file_guard = match &settings.directory {
        Some(directory) => {
            let directory = shellexpand::tilde(directory).into_owned();
            let appender = tracing_appender::rolling::daily(&directory, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            layers.push(
                fmt::layer()
                    .json()
                    .with_ansi(false)
                    .with_writer(writer)
                    .boxed(),
            );
            Some(guard)
        }
        None => None,
    };

    // Telemetry problems must not keep the daemon from starting
    let mut telemetry_note = None;
    #[cfg(feature = "telemetry")]
    let mut telemetry_guard = None;
    match telemetry::init_telemetry() {
        #[cfg(feature = "telemetry")]
        Ok(TelemetrySetup::Enabled(layer, guard)) => {
            layers.push(layer);
            telemetry_guard = Some(guard);
        }
        Ok(TelemetrySetup::Disabled) => {}
        #[cfg(not(feature = "telemetry"))]
        Ok(TelemetrySetup::Unsupported) => {
            telemetry_note =
                Some("OTEL_EXPORTER_OTLP_ENDPOINT set but feature 'telemetry' not enabled".to_string());
        }
        Err(e) => telemetry_note = Some(format!("Failed to initialize OpenTelemetry: {e:#}")),
    }

    tracing_subscriber::registry()
        .with(layers)
        .with(env_filter)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    if let Some(note) = telemetry_note {
        tracing::warn!("{} (continuing without it)", note);
    }

    Ok(LoggingGuard {
        _file: file_guard,
        #[cfg(feature = "telemetry")]
        telemetry: telemetry_guard,
    })
}
