//! Structured logging for the console, with optional OTLP export of spans
//! and log records.

use anyhow::Result;
use opentelemetry::{trace::TracerProvider, KeyValue};
use opentelemetry_appender_tracing::layer::OpenTelemetryTracingBridge;
use opentelemetry_otlp::{LogExporter, SpanExporter, WithExportConfig};
use opentelemetry_sdk::{
    logs::LoggerProvider,
    propagation::TraceContextPropagator,
    runtime,
    trace::{RandomIdGenerator, Sampler, TracerProvider as SdkTracerProvider},
    Resource,
};
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Clone, Debug)]
pub struct TelemetryConfig {
    pub service_name: String,
    /// Default filter directive; `RUST_LOG` overrides it
    pub log_level: String,
    /// OTLP gRPC collector. `None` keeps output local.
    pub otlp_endpoint: Option<String>,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "netadmin-console".to_string(),
            log_level: "info".to_string(),
            otlp_endpoint: None,
        }
    }
}

impl TelemetryConfig {
    fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.log_level))
    }
}

/// Installed global subscriber. Call [`Telemetry::shutdown`] before exit so
/// batched exports are flushed.
pub struct Telemetry {
    exporters: Option<OtlpExporters>,
}

struct OtlpExporters {
    tracer_provider: SdkTracerProvider,
    logger_provider: LoggerProvider,
}

impl Telemetry {
    /// Install the global subscriber: JSON to stdout, plus OTLP when an
    /// endpoint is configured
    pub fn init(config: &TelemetryConfig) -> Result<Self> {
        let Some(endpoint) = &config.otlp_endpoint else {
            tracing_subscriber::registry()
                .with(config.env_filter())
                .with(json_fmt_layer())
                .try_init()?;
            return Ok(Self { exporters: None });
        };

        opentelemetry::global::set_text_map_propagator(TraceContextPropagator::new());
        let exporters = OtlpExporters::connect(&config.service_name, endpoint)?;

        let tracer = exporters.tracer_provider.tracer("netadmin");
        // Span layer ahead of the log bridge so exported records carry trace ids
        tracing_subscriber::registry()
            .with(config.env_filter())
            .with(tracing_opentelemetry::layer().with_tracer(tracer))
            .with(OpenTelemetryTracingBridge::new(&exporters.logger_provider))
            .with(json_fmt_layer())
            .try_init()?;

        debug!(endpoint = %endpoint, "exporting telemetry over OTLP");
        Ok(Self {
            exporters: Some(exporters),
        })
    }

    pub fn exports_otlp(&self) -> bool {
        self.exporters.is_some()
    }

    /// Flush and stop the OTLP exporters, if any
    pub fn shutdown(self) {
        let Some(exporters) = self.exporters else {
            return;
        };
        if let Err(e) = exporters.tracer_provider.shutdown() {
            eprintln!("Error shutting down tracer provider: {:?}", e);
        }
        if let Err(e) = exporters.logger_provider.shutdown() {
            eprintln!("Error shutting down logger provider: {:?}", e);
        }
    }
}

fn json_fmt_layer<S>() -> impl tracing_subscriber::Layer<S>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    tracing_subscriber::fmt::layer()
        .json()
        .with_span_list(true)
        .with_current_span(true)
}

impl OtlpExporters {
    fn connect(service_name: &str, endpoint: &str) -> Result<Self> {
        let resource = Resource::new(vec![KeyValue::new(
            opentelemetry_semantic_conventions::resource::SERVICE_NAME,
            service_name.to_string(),
        )]);

        let span_exporter = SpanExporter::builder()
            .with_tonic()
            .with_endpoint(endpoint)
            .build()?;
        let tracer_provider = SdkTracerProvider::builder()
            .with_batch_exporter(span_exporter, runtime::Tokio)
            .with_sampler(Sampler::AlwaysOn)
            .with_id_generator(RandomIdGenerator::default())
            .with_resource(resource.clone())
            .build();

        let log_exporter = LogExporter::builder()
            .with_tonic()
            .with_endpoint(endpoint)
            .build()?;
        let logger_provider = LoggerProvider::builder()
            .with_batch_exporter(log_exporter, runtime::Tokio)
            .with_resource(resource)
            .build();

        Ok(Self {
            tracer_provider,
            logger_provider,
        })
    }
}
