//! # Telemetry Features
//!
//! Logs always go to the console through `tracing_subscriber::fmt`. On top of
//! that, spans and metrics can be exported with OpenTelemetry to Honeycomb or
//! stdout.
//!
//! ## Feature matrix
//!
//! - `traces`: OpenTelemetry distributed tracing (every facade call is a span).
//! - `metrics`: OpenTelemetry metrics (request counts, car lifecycle counters,
//!   peer call latency).
//! - `honeycomb`: the Honeycomb OTLP exporter.
//! - `stdout`: the stdout exporter.
//!
//! ## Feature constraints
//!
//! - Exporters require at least one of `traces` or `metrics`.
//! - `honeycomb` and `stdout` can be enabled together.
//!
//! ## Example usage
//!
//! ```bash
//! cargo run --features traces,metrics,honeycomb
//! cargo run --features traces,stdout
//! ```
//!
//! The Honeycomb exporter reads `HONEYCOMB_API_KEY`, `HONEYCOMB_DATASET`,
//! `HONEYCOMB_ENDPOINT` and `HONEYCOMB_COMPRESSION`.

#[cfg(all(
    feature = "honeycomb",
    not(any(feature = "traces", feature = "metrics"))
))]
compile_error!(
    "The 'honeycomb' feature requires at least one of 'traces' or 'metrics' to be enabled."
);

#[cfg(all(feature = "stdout", not(any(feature = "traces", feature = "metrics"))))]
compile_error!(
    "The 'stdout' feature requires at least one of 'traces' or 'metrics' to be enabled."
);

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[cfg(all(feature = "honeycomb", any(feature = "metrics", feature = "traces")))]
use opentelemetry_otlp::{Compression, Protocol, WithExportConfig, WithTonicConfig};
#[cfg(all(feature = "honeycomb", feature = "metrics"))]
use opentelemetry_sdk::metrics::Temporality;
#[cfg(feature = "honeycomb")]
use tonic::metadata::MetadataMap;
#[cfg(all(feature = "honeycomb", any(feature = "metrics", feature = "traces")))]
use tonic::transport::ClientTlsConfig;

#[cfg(feature = "metrics")]
use opentelemetry::metrics::{Counter, Histogram, Meter, UpDownCounter};
#[cfg(feature = "metrics")]
use opentelemetry_sdk::metrics as sdkmetrics;
#[cfg(feature = "metrics")]
use std::sync::OnceLock;

#[cfg(any(feature = "metrics", feature = "traces"))]
use opentelemetry::{InstrumentationScope, KeyValue};
#[cfg(any(feature = "metrics", feature = "traces"))]
use opentelemetry_sdk::Resource;
#[cfg(any(feature = "metrics", feature = "traces"))]
use opentelemetry_semantic_conventions as semvcns;

#[cfg(feature = "traces")]
use opentelemetry::trace::TracerProvider;
#[cfg(feature = "traces")]
use opentelemetry_sdk::propagation::TraceContextPropagator;
#[cfg(feature = "traces")]
use opentelemetry_sdk::trace as sdktrace;

const SERVICE_NAME: &str = "workshop";

pub struct TelemetryProviders {
    #[cfg(feature = "traces")]
    pub tracer_provider: sdktrace::SdkTracerProvider,
    #[cfg(feature = "metrics")]
    pub meter_provider: sdkmetrics::SdkMeterProvider,
}

impl TelemetryProviders {
    /// Flushes and stops the exporters. Errors are printed, there is no
    /// subscriber left to log them to.
    pub fn shutdown(self) {
        #[cfg(feature = "traces")]
        {
            if let Err(err) = self.tracer_provider.force_flush() {
                eprintln!("Error flushing traces: {err:#?}");
            }
            if let Err(err) = self.tracer_provider.shutdown() {
                eprintln!("Error shutting down tracer: {err:#?}");
            }
        }

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
    #[cfg(feature = "traces")]
    opentelemetry::global::set_text_map_propagator(TraceContextPropagator::new());

    #[cfg(feature = "traces")]
    let tracer_provider = init_tracer()?;

    #[cfg(feature = "metrics")]
    let meter_provider = init_metrics()?;

    #[cfg(any(feature = "metrics", feature = "traces"))]
    let scope = InstrumentationScope::builder(SERVICE_NAME)
        .with_version(env!("CARGO_PKG_VERSION"))
        .with_schema_url(semvcns::SCHEMA_URL)
        .build();

    // Console output is unrelated to the `opentelemetry_stdout` exporter.
    let registry = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_thread_ids(true)
                .with_line_number(true)
                .with_target(false)
                .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339())
                .with_file(true)
                .pretty(),
        );

    #[cfg(feature = "traces")]
    let registry = {
        opentelemetry::global::set_tracer_provider(tracer_provider.clone());
        registry.with(
            tracing_opentelemetry::layer()
                .with_tracer(tracer_provider.tracer_with_scope(scope.clone()))
                .with_error_records_to_exceptions(true),
        )
    };

    #[cfg(feature = "metrics")]
    let registry = {
        opentelemetry::global::set_meter_provider(meter_provider.clone());
        let meter = opentelemetry::global::meter_with_scope(scope);
        init_metric_handles(meter);

        registry.with(tracing_opentelemetry::MetricsLayer::new(
            meter_provider.clone(),
        ))
    };

    registry.init();

    Ok(TelemetryProviders {
        #[cfg(feature = "traces")]
        tracer_provider,
        #[cfg(feature = "metrics")]
        meter_provider,
    })
}

/// Applies the Honeycomb settings read from the environment to an OTLP
/// exporter builder. Spans and metrics share them.
#[cfg(all(feature = "honeycomb", any(feature = "metrics", feature = "traces")))]
fn with_honeycomb<B>(builder: B) -> anyhow::Result<B>
where
    B: WithTonicConfig + WithExportConfig,
{
    use anyhow::Context;
    use std::str::FromStr;

    let var = |name: &str| std::env::var(name).with_context(|| format!("missing `{name}`"));

    let mut metadata = MetadataMap::new();
    metadata.insert(
        "x-honeycomb-team",
        var("HONEYCOMB_API_KEY")?.parse().context("invalid API key")?,
    );
    metadata.insert(
        "x-honeycomb-dataset",
        var("HONEYCOMB_DATASET")?.parse().context("invalid dataset")?,
    );
    let compression =
        Compression::from_str(&var("HONEYCOMB_COMPRESSION")?.to_ascii_lowercase())?;

    Ok(builder
        .with_tls_config(ClientTlsConfig::new().with_native_roots())
        .with_metadata(metadata)
        .with_compression(compression)
        .with_timeout(std::time::Duration::from_secs(10))
        .with_endpoint(var("HONEYCOMB_ENDPOINT")?)
        .with_protocol(Protocol::Grpc))
}

#[cfg(any(feature = "metrics", feature = "traces"))]
fn resource() -> Resource {
    Resource::builder()
        .with_service_name(SERVICE_NAME)
        .with_schema_url(
            [KeyValue::new(
                semvcns::resource::SERVICE_VERSION,
                env!("CARGO_PKG_VERSION"),
            )],
            semvcns::SCHEMA_URL,
        )
        .build()
}

#[cfg(feature = "metrics")]
fn init_metrics() -> anyhow::Result<sdkmetrics::SdkMeterProvider> {
    let builder = sdkmetrics::SdkMeterProvider::builder().with_resource(resource());

    #[cfg(feature = "stdout")]
    let builder = builder.with_reader(
        sdkmetrics::PeriodicReader::builder(opentelemetry_stdout::MetricExporter::default())
            .with_interval(std::time::Duration::from_secs(5))
            .build(),
    );

    #[cfg(feature = "honeycomb")]
    let builder = {
        use anyhow::Context;

        let exporter = with_honeycomb(opentelemetry_otlp::MetricExporter::builder().with_tonic())?
            .with_temporality(Temporality::Delta)
            .build()
            .context("failed to build metrics exporter")?;
        builder.with_periodic_exporter(exporter)
    };

    Ok(builder.build())
}

/// Spans are exported in batches every 5 seconds.
#[cfg(feature = "traces")]
fn batched<E>(exporter: E) -> sdktrace::BatchSpanProcessor
where
    E: sdktrace::SpanExporter + 'static,
{
    sdktrace::BatchSpanProcessor::builder(exporter)
        .with_batch_config(
            sdktrace::BatchConfigBuilder::default()
                .with_scheduled_delay(std::time::Duration::from_secs(5))
                .with_max_queue_size(2048)
                .build(),
        )
        .build()
}

#[cfg(feature = "traces")]
fn init_tracer() -> anyhow::Result<sdktrace::SdkTracerProvider> {
    let builder = sdktrace::SdkTracerProvider::builder().with_resource(resource());

    #[cfg(feature = "stdout")]
    let builder =
        builder.with_span_processor(batched(opentelemetry_stdout::SpanExporter::default()));

    #[cfg(feature = "honeycomb")]
    let builder = {
        use anyhow::Context;

        let exporter = with_honeycomb(opentelemetry_otlp::SpanExporter::builder().with_tonic())?
            .build()
            .context("failed to build tracer exporter")?;
        builder.with_span_processor(batched(exporter))
    };

    Ok(builder.build())
}

#[cfg(feature = "metrics")]
static REQUESTS: OnceLock<Counter<u64>> = OnceLock::new();
#[cfg(feature = "metrics")]
static REQUEST_ERRORS: OnceLock<Counter<u64>> = OnceLock::new();
#[cfg(feature = "metrics")]
static CARS_ACCEPTED: OnceLock<Counter<u64>> = OnceLock::new();
#[cfg(feature = "metrics")]
static CARS_PAINTED: OnceLock<Counter<u64>> = OnceLock::new();
#[cfg(feature = "metrics")]
static CARS_RETRIEVED: OnceLock<Counter<u64>> = OnceLock::new();
#[cfg(feature = "metrics")]
static CARS_IN_STORE: OnceLock<UpDownCounter<i64>> = OnceLock::new();
#[cfg(feature = "metrics")]
static PEER_CALL_FAILURES: OnceLock<Counter<u64>> = OnceLock::new();
#[cfg(feature = "metrics")]
static PEER_CALL_DURATION_MS: OnceLock<Histogram<f64>> = OnceLock::new();

#[cfg(feature = "metrics")]
fn init_metric_handles(meter: Meter) {
    let _ = REQUESTS.set(
        meter
            .u64_counter("requests")
            .with_description("Total gRPC requests, by operation")
            .build(),
    );

    let _ = REQUEST_ERRORS.set(
        meter
            .u64_counter("request_errors")
            .with_description("Failed gRPC requests, by operation")
            .build(),
    );

    let _ = CARS_ACCEPTED.set(
        meter
            .u64_counter("cars_accepted")
            .with_description("Cars taken into the workshop")
            .build(),
    );

    let _ = CARS_PAINTED.set(
        meter
            .u64_counter("cars_painted")
            .with_description("Paint completions recorded")
            .build(),
    );

    let _ = CARS_RETRIEVED.set(
        meter
            .u64_counter("cars_retrieved")
            .with_description("Painted cars handed back")
            .build(),
    );

    let _ = CARS_IN_STORE.set(
        meter
            .i64_up_down_counter("cars_in_store")
            .with_description("Cars currently held by the workshop")
            .build(),
    );

    let _ = PEER_CALL_FAILURES.set(
        meter
            .u64_counter("peer_call_failures")
            .with_description("Failed calls to the peer service")
            .build(),
    );

    let _ = PEER_CALL_DURATION_MS.set(
        meter
            .f64_histogram("peer_call_duration")
            .with_unit("ms")
            .with_description("Round trip of calls to the peer service")
            .build(),
    );
}

// Convenience functions that compile to no-ops when metrics are disabled
#[cfg(feature = "metrics")]
pub fn increment_requests(operation: &'static str) {
    if let Some(counter) = REQUESTS.get() {
        counter.add(1, &[KeyValue::new("operation", operation)]);
    }
}

#[cfg(not(feature = "metrics"))]
pub fn increment_requests(_operation: &'static str) {}

#[cfg(feature = "metrics")]
pub fn increment_request_errors(operation: &'static str) {
    if let Some(counter) = REQUEST_ERRORS.get() {
        counter.add(1, &[KeyValue::new("operation", operation)]);
    }
}

#[cfg(not(feature = "metrics"))]
pub fn increment_request_errors(_operation: &'static str) {}

#[cfg(feature = "metrics")]
pub fn increment_cars_accepted() {
    if let Some(counter) = CARS_ACCEPTED.get() {
        counter.add(1, &[]);
    }
    if let Some(counter) = CARS_IN_STORE.get() {
        counter.add(1, &[]);
    }
}

#[cfg(not(feature = "metrics"))]
pub fn increment_cars_accepted() {}

#[cfg(feature = "metrics")]
pub fn increment_cars_painted() {
    if let Some(counter) = CARS_PAINTED.get() {
        counter.add(1, &[]);
    }
}

#[cfg(not(feature = "metrics"))]
pub fn increment_cars_painted() {}

#[cfg(feature = "metrics")]
pub fn increment_cars_retrieved() {
    if let Some(counter) = CARS_RETRIEVED.get() {
        counter.add(1, &[]);
    }
    if let Some(counter) = CARS_IN_STORE.get() {
        counter.add(-1, &[]);
    }
}

#[cfg(not(feature = "metrics"))]
pub fn increment_cars_retrieved() {}

#[cfg(feature = "metrics")]
pub fn increment_peer_call_failures() {
    if let Some(counter) = PEER_CALL_FAILURES.get() {
        counter.add(1, &[]);
    }
}

#[cfg(not(feature = "metrics"))]
pub fn increment_peer_call_failures() {}

#[cfg(feature = "metrics")]
pub fn record_peer_call_duration(duration_ms: f64) {
    if let Some(histogram) = PEER_CALL_DURATION_MS.get() {
        histogram.record(duration_ms, &[]);
    }
}

#[cfg(not(feature = "metrics"))]
pub fn record_peer_call_duration(_duration_ms: f64) {}
