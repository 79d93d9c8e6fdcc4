//! Send a handful of log records to a collector
//!
//! ```text
//! OTEL_EXPORTER_OTLP_ENDPOINT=http://localhost:4317 \
//! EXPORTER_LOG_FORMAT=json \
//!     cargo run -p otlp-logs-exporter --example send_logs
//! ```

use anyhow::Result;
use otlp_logs_exporter::opentelemetry_proto::tonic::collector::logs::v1::ExportLogsServiceRequest;
use otlp_logs_exporter::opentelemetry_proto::tonic::common::v1::{
    any_value, AnyValue, InstrumentationScope, KeyValue,
};
use otlp_logs_exporter::opentelemetry_proto::tonic::logs::v1::{
    LogRecord, ResourceLogs, ScopeLogs, SeverityNumber,
};
use otlp_logs_exporter::opentelemetry_proto::tonic::resource::v1::Resource;
use otlp_logs_exporter::{ExporterConfig, OtlpLogsExporter};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const SERVICE_NAME: &str = "otlp-logs-demo";

fn string_value(value: &str) -> Option<AnyValue> {
    Some(AnyValue {
        value: Some(any_value::Value::StringValue(value.to_string())),
    })
}

fn build_request(messages: &[&str]) -> ExportLogsServiceRequest {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or_default();

    let log_records = messages
        .iter()
        .map(|message| LogRecord {
            time_unix_nano: now,
            observed_time_unix_nano: now,
            severity_number: SeverityNumber::Info as i32,
            severity_text: "INFO".to_string(),
            body: string_value(message),
            ..Default::default()
        })
        .collect();

    ExportLogsServiceRequest {
        resource_logs: vec![ResourceLogs {
            resource: Some(Resource {
                attributes: vec![KeyValue {
                    key: "service.name".to_string(),
                    value: string_value(SERVICE_NAME),
                }],
                ..Default::default()
            }),
            scope_logs: vec![ScopeLogs {
                scope: Some(InstrumentationScope {
                    name: "send_logs".to_string(),
                    version: otlp_logs_exporter::VERSION.to_string(),
                    ..Default::default()
                }),
                log_records,
                ..Default::default()
            }],
            ..Default::default()
        }],
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let log_format = std::env::var("EXPORTER_LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("otlp_logs_exporter=debug,info"))?;

    match log_format.as_str() {
        "json" => tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json())
            .init(),
        _ => tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().pretty())
            .init(),
    }

    let config = ExporterConfig::from_env()?;
    info!(endpoint = %config.endpoint, "Connecting to collector");

    let exporter = OtlpLogsExporter::from_config(&config).await?;
    exporter
        .send_request(build_request(&["hello from otlp-logs-exporter", "second record"]))
        .await?;

    info!("Logs exported");
    Ok(())
}
