//! Observability wiring.
//!
//! Installs a `tracing-subscriber` registry with an `EnvFilter`, a JSON or
//! human-readable formatting layer, and, when an OTLP endpoint is configured,
//! a `tracing-opentelemetry` layer exporting spans over gRPC.

use anyhow::Context;
use opentelemetry::trace::TracerProvider as _;
use opentelemetry::KeyValue;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::trace::TracerProvider;
use opentelemetry_sdk::{runtime, Resource};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::{LogFormat, TelemetryConfig};

/// Filter applied when `RUST_LOG` is not set.
const DEFAULT_FILTER: &str = "info";

/// Flushes and shuts down trace export when dropped.
pub struct TelemetryGuard {
    provider: Option<TracerProvider>,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        if let Some(provider) = self.provider.take() {
            if let Err(e) = provider.shutdown() {
                eprintln!("failed to shut down trace exporter: {e}");
            }
        }
    }
}

/// Installs the global subscriber. Must be called once, inside the Tokio runtime.
pub fn init(config: &TelemetryConfig) -> anyhow::Result<TelemetryGuard> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let (json, pretty) = match config.log_format {
        LogFormat::Json => (
            Some(fmt::layer().json().with_current_span(true).with_span_list(false)),
            None,
        ),
        LogFormat::Pretty => (None, Some(fmt::layer().with_target(false))),
    };

    let provider = match &config.otlp_endpoint {
        Some(endpoint) => Some(
            otlp_provider(endpoint, &config.service_name)
                .with_context(|| format!("failed to set up OTLP export to {endpoint}"))?,
        ),
        None => None,
    };
    let otel = provider
        .as_ref()
        .map(|p| tracing_opentelemetry::layer().with_tracer(p.tracer(deployer::SERVICE_SLUG)));

    tracing_subscriber::registry()
        .with(filter)
        .with(json)
        .with(pretty)
        .with(otel)
        .try_init()
        .context("failed to install tracing subscriber")?;

    if let Some(endpoint) = &config.otlp_endpoint {
        tracing::info!(%endpoint, "exporting traces over OTLP");
    }

    Ok(TelemetryGuard { provider })
}

fn otlp_provider(endpoint: &str, service_name: &str) -> anyhow::Result<TracerProvider> {
    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint)
        .build()?;

    let resource = Resource::new(vec![KeyValue::new(
        "service.name",
        service_name.to_string(),
    )]);

    Ok(TracerProvider::builder()
        .with_batch_exporter(exporter, runtime::Tokio)
        .with_resource(resource)
        .build())
}
