//! OpenTelemetry integration (feature `telemetry`)
//!
//! # Environment Variables
//!
//! - `OTEL_EXPORTER_OTLP_ENDPOINT`: OTLP endpoint (e.g., http://localhost:4317)
//! - `OTEL_SERVICE_NAME`: Service name (default: blackoutbox)
//!
//! # Example
//!
//! ```text
//! OTEL_EXPORTER_OTLP_ENDPOINT=http://localhost:4317 \
//! OTEL_SERVICE_NAME=blackoutbox-dev \
//!     blackoutbox run
//! ```

#[cfg(feature = "telemetry")]
use crate::logging::BoxedLayer;
use anyhow::Result;

/// Keeps the exporter alive; flushes pending spans on shutdown
#[cfg(feature = "telemetry")]
pub struct TelemetryGuard {
    provider: opentelemetry_sdk::trace::TracerProvider,
}

#[cfg(feature = "telemetry")]
impl TelemetryGuard {
    pub fn shutdown(self) {
        if let Err(e) = self.provider.shutdown() {
            eprintln!("Failed to flush OpenTelemetry spans: {e}");
        }
    }
}

/// What happened when telemetry was requested
pub enum TelemetrySetup {
    /// No endpoint configured
    Disabled,
    /// Endpoint configured but the binary was built without the feature
    #[cfg(not(feature = "telemetry"))]
    Unsupported,
    #[cfg(feature = "telemetry")]
    Enabled(BoxedLayer, TelemetryGuard),
}

/// Build the OTLP tracing layer if an endpoint is configured
pub fn init_telemetry() -> Result<TelemetrySetup> {
    match std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT") {
        Ok(endpoint) => init_telemetry_impl(&endpoint),
        Err(_) => Ok(TelemetrySetup::Disabled),
    }
}

#[cfg(not(feature = "telemetry"))]
fn init_telemetry_impl(_endpoint: &str) -> Result<TelemetrySetup> {
    Ok(TelemetrySetup::Unsupported)
}

#[cfg(feature = "telemetry")]
fn init_telemetry_impl(endpoint: &str) -> Result<TelemetrySetup> {
    use opentelemetry::trace::TracerProvider as _;
    use opentelemetry::KeyValue;
    use opentelemetry_otlp::WithExportConfig;
    use opentelemetry_sdk::{runtime, trace::TracerProvider, Resource};
    use tracing_subscriber::Layer;

    let service_name =
        std::env::var("OTEL_SERVICE_NAME").unwrap_or_else(|_| "blackoutbox".to_string());

    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint)
        .build()?;

    let provider = TracerProvider::builder()
        .with_batch_exporter(exporter, runtime::Tokio)
        .with_resource(Resource::new(vec![KeyValue::new(
            "service.name",
            service_name.clone(),
        )]))
        .build();

    let tracer = provider.tracer(service_name);
    opentelemetry::global::set_tracer_provider(provider.clone());

    let layer = tracing_opentelemetry::layer().with_tracer(tracer).boxed();
    Ok(TelemetrySetup::Enabled(layer, TelemetryGuard { provider }))
}
