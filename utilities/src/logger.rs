use opentelemetry::KeyValue;
use opentelemetry_otlp::{WithExportConfig, new_exporter, new_pipeline};
use opentelemetry_sdk::{Resource, runtime::Tokio, trace::Tracer};
use tracing_appender::{
    non_blocking::WorkerGuard,
    rolling::{RollingFileAppender, Rotation},
};
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};
// exporing the info! warn! etc tracing macro through this Library
pub use tracing;
pub use tracing::*;

use crate::result::Result;

pub fn init_apm(service_name: &str, node_id: &str, endpoint: &str) -> Result<Tracer> {
    let otlp_exporter = new_exporter().http().with_endpoint(endpoint);
    let resource = Resource::new(vec![
        KeyValue::new("service.name", service_name.to_string()),
        KeyValue::new("service.node.id", node_id.to_string()),
        KeyValue::new("service.version", env!("CARGO_PKG_VERSION")),
    ]);
    let tracer = new_pipeline()
        .tracing()
        .with_trace_config(opentelemetry_sdk::trace::config().with_resource(resource))
        .with_exporter(otlp_exporter)
        .install_batch(Tokio)
        .map_err(|e| format!("Error while installing otlp pipeline {e}"))?;
    Ok(tracer)
}

/// Installs the json file layer, the stdout layer and, if an endpoint is given, the otlp exporter.
/// The returned guard must be held for as long as logs should be flushed to the file.
pub fn init_logger(
    service_name: &str,
    node_id: &str,
    level: String,
    apm_endpoint: Option<&str>,
    log_base: &str,
) -> WorkerGuard {
    let file_appender = RollingFileAppender::new(
        Rotation::NEVER,
        format!("{log_base}/{}", service_name),
        format!("{}.log", node_id),
    );
    let (non_blocking, _gaurd) = tracing_appender::non_blocking(file_appender);
    let json_layer = fmt::layer()
        .json()
        .with_writer(non_blocking)
        .with_line_number(true)
        .with_file(true)
        .with_thread_names(true)
        .with_current_span(true)
        .with_target(true)
        .with_span_events(FmtSpan::ENTER | FmtSpan::EXIT)
        .flatten_event(true);
    let stdout_layer = fmt::layer().with_writer(std::io::stdout);
    let filter = EnvFilter::builder()
        .with_default_directive(level.parse::<Level>().unwrap_or(Level::INFO).into())
        .from_env_lossy();

    // apm export is optional
    let mut apm_error = None;
    let telemetery_layer = apm_endpoint.and_then(|endpoint| {
        match init_apm(service_name, node_id, endpoint) {
            Ok(tracer) => Some(tracing_opentelemetry::layer().with_tracer(tracer)),
            Err(e) => {
                apm_error = Some(format!("{e}"));
                None
            }
        }
    });
    tracing_subscriber::registry()
        .with(json_layer)
        .with(stdout_layer)
        .with(filter)
        .with(telemetery_layer)
        .init();
    info!(service = %service_name,node_id = %node_id,"Logging initialized");
    match (apm_endpoint, apm_error) {
        (Some(endpoint), None) => info!(%endpoint, "Exporting traces to apm endpoint"),
        (Some(endpoint), Some(e)) => {
            error!(%endpoint, error = %e, "Error while creating tracer, traces will not be exported")
        }
        (None, _) => debug!("No apm endpoint configured"),
    }
    _gaurd
}
