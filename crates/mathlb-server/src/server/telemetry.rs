//! # Logging and metrics
//!
//! Logs always go through `tracing-subscriber`: a pretty, human-readable
//! `fmt` layer filtered by `RUST_LOG` (default `info`), with thread ids,
//! file/line and local RFC 3339 timestamps.
//!
//! ## Feature matrix
//!
//! - `metrics`: Records OpenTelemetry metrics for forwarded calls.
//! - `stdout`: Exports those metrics to stdout every few seconds.
//!
//! Without `metrics`, the recording helpers at the bottom of this module
//! compile to no-ops so call sites stay unconditional.
//!
//! ```bash
//! cargo run --bin mathlb-server --features metrics,stdout -- lb.json
//! ```

#[cfg(all(feature = "stdout", not(feature = "metrics")))]
compile_error!("The 'stdout' feature requires the 'metrics' feature to be enabled.");

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[cfg(feature = "metrics")]
use opentelemetry::{
    InstrumentationScope, KeyValue,
    metrics::{Counter, Histogram, Meter},
};
#[cfg(feature = "metrics")]
use opentelemetry_sdk::{Resource, metrics as sdkmetrics};
#[cfg(feature = "metrics")]
use opentelemetry_semantic_conventions as semvcns;
#[cfg(feature = "metrics")]
use std::sync::OnceLock;

pub struct TelemetryProviders {
    #[cfg(feature = "metrics")]
    pub meter_provider: sdkmetrics::SdkMeterProvider,
}

impl TelemetryProviders {
    /// Flushes and stops any exporters. Called once on shutdown.
    pub fn shutdown(&self) {
        #[cfg(feature = "metrics")]
        {
            if let Err(err) = self.meter_provider.force_flush() {
                eprintln!("Error flushing metrics: {err:#?}");
            }
            if let Err(err) = self.meter_provider.shutdown() {
                eprintln!("Error shutting down meter: {err:#?}");
            }
        }
    }
}

pub fn init_telemetry() -> anyhow::Result<TelemetryProviders> {
    #[cfg(feature = "metrics")]
    let meter_provider = {
        let provider = init_metrics();
        opentelemetry::global::set_meter_provider(provider.clone());
        let scope = InstrumentationScope::builder("mathlb")
            .with_version(env!("CARGO_PKG_VERSION"))
            .with_schema_url(semvcns::SCHEMA_URL)
            .build();
        init_metric_handles(opentelemetry::global::meter_with_scope(scope));
        provider
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_thread_ids(true)
                .with_line_number(true)
                .with_target(false)
                .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339())
                .with_file(true)
                .pretty(),
        )
        .try_init()?;

    Ok(TelemetryProviders {
        #[cfg(feature = "metrics")]
        meter_provider,
    })
}

#[cfg(feature = "metrics")]
fn init_metrics() -> sdkmetrics::SdkMeterProvider {
    let resource = Resource::builder()
        .with_service_name("mathlb")
        .with_attribute(KeyValue::new(
            semvcns::resource::SERVICE_VERSION,
            env!("CARGO_PKG_VERSION"),
        ))
        .build();
    let builder = sdkmetrics::SdkMeterProvider::builder().with_resource(resource);

    #[cfg(feature = "stdout")]
    let builder = {
        let exporter = opentelemetry_stdout::MetricExporter::default();
        let reader = sdkmetrics::PeriodicReader::builder(exporter)
            .with_interval(std::time::Duration::from_secs(5))
            .build();
        builder.with_reader(reader)
    };

    builder.build()
}

#[cfg(feature = "metrics")]
static REQUESTS: OnceLock<Counter<u64>> = OnceLock::new();
#[cfg(feature = "metrics")]
static FORWARD_ERRORS: OnceLock<Counter<u64>> = OnceLock::new();
#[cfg(feature = "metrics")]
static FORWARD_DURATION_MS: OnceLock<Histogram<f64>> = OnceLock::new();

#[cfg(feature = "metrics")]
fn init_metric_handles(meter: Meter) {
    let _ = REQUESTS.set(
        meter
            .u64_counter("requests")
            .with_description("Inbound GetFactors calls")
            .build(),
    );

    let _ = FORWARD_ERRORS.set(
        meter
            .u64_counter("forward_errors")
            .with_description("Calls that ended in an error, from the pool or a worker")
            .build(),
    );

    let _ = FORWARD_DURATION_MS.set(
        meter
            .f64_histogram("forward_duration")
            .with_unit("ms")
            .with_description("Time spent waiting on the selected worker")
            .build(),
    );
}

#[cfg(feature = "metrics")]
pub fn increment_requests() {
    if let Some(counter) = REQUESTS.get() {
        counter.add(1, &[]);
    }
}

#[cfg(not(feature = "metrics"))]
pub fn increment_requests() {}

#[cfg(feature = "metrics")]
pub fn increment_forward_errors() {
    if let Some(counter) = FORWARD_ERRORS.get() {
        counter.add(1, &[]);
    }
}

#[cfg(not(feature = "metrics"))]
pub fn increment_forward_errors() {}

#[cfg(feature = "metrics")]
pub fn record_forward_duration(duration_ms: f64) {
    if let Some(histogram) = FORWARD_DURATION_MS.get() {
        histogram.record(duration_ms, &[]);
    }
}

#[cfg(not(feature = "metrics"))]
pub fn record_forward_duration(_duration_ms: f64) {}
