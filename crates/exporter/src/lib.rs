//! OTLP Logs Exporter
//!
//! An OpenTelemetry [`LogExporter`] that sends log batches to an OTLP
//! collector over gRPC, retrying failed exports based on the returned
//! status code.
//!
//! # Example
//!
//! ```no_run
//! use otlp_logs_exporter::{OtlpLogsExporter, RetryPolicy};
//! use opentelemetry_sdk::logs::SdkLoggerProvider;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let exporter = OtlpLogsExporter::new("http://localhost:4317", RetryPolicy::default()).await?;
//!
//!     let provider = SdkLoggerProvider::builder()
//!         .with_batch_exporter(exporter)
//!         .build();
//!
//!     // ... emit logs ...
//!
//!     provider.shutdown()?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod constants;
pub mod error;
pub mod retry;

pub use config::{Compression, ExporterConfig};
pub use error::{Error, Result};
pub use opentelemetry_proto;
pub use retry::{classify_tonic_status, export_with_retry, RetryErrorType, RetryPolicy};

use opentelemetry_proto::tonic::collector::logs::v1::{
    logs_service_client::LogsServiceClient, ExportLogsServiceRequest,
};
use opentelemetry_proto::transform::common::tonic::ResourceAttributesWithSchema;
use opentelemetry_proto::transform::logs::tonic::group_logs_by_resource_and_scope;
use opentelemetry_sdk::error::{OTelSdkError, OTelSdkResult};
use opentelemetry_sdk::logs::{LogBatch, LogExporter};
use opentelemetry_sdk::Resource;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tonic::transport::Channel;
use tracing::{debug, info};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Log exporter that ships batches to an OTLP collector via tonic
///
/// Failed requests are retried according to the exporter's [`RetryPolicy`];
/// see [`classify_tonic_status`] for which statuses are retried.
#[derive(Debug)]
pub struct OtlpLogsExporter {
    client: LogsServiceClient<Channel>,
    retry_policy: RetryPolicy,
    resource: ResourceAttributesWithSchema,
    is_shutdown: AtomicBool,
}

impl OtlpLogsExporter {
    /// Connect to `endpoint` with the default retry policy
    pub async fn with_default_retry(endpoint: &str) -> Result<Self> {
        Self::new(endpoint, RetryPolicy::default()).await
    }

    /// Connect to `endpoint` eagerly
    ///
    /// # Errors
    ///
    /// [`Error::InvalidEndpoint`] if `endpoint` is not a URI,
    /// [`Error::Transport`] if the connection cannot be established.
    pub async fn new(endpoint: &str, retry_policy: RetryPolicy) -> Result<Self> {
        let channel = Channel::from_shared(endpoint.to_string())?
            .connect()
            .await?;
        Ok(Self::with_channel(channel, retry_policy))
    }

    /// Wrap an existing channel, compressing requests and responses with zstd
    pub fn with_channel(channel: Channel, retry_policy: RetryPolicy) -> Self {
        Self::with_compression(channel, retry_policy, Compression::Zstd)
    }

    /// Wrap an existing channel with the given compression in both directions
    ///
    /// [`Compression::None`] leaves requests and responses uncompressed.
    pub fn with_compression(
        channel: Channel,
        retry_policy: RetryPolicy,
        compression: Compression,
    ) -> Self {
        let mut client = LogsServiceClient::new(channel);
        if let Some(encoding) = compression.encoding() {
            client = client.send_compressed(encoding).accept_compressed(encoding);
        }

        Self {
            client,
            retry_policy,
            resource: ResourceAttributesWithSchema::default(),
            is_shutdown: AtomicBool::new(false),
        }
    }

    /// Build an exporter from configuration
    pub async fn from_config(config: &ExporterConfig) -> Result<Self> {
        config.validate()?;

        let endpoint = Channel::from_shared(config.endpoint.clone())?
            .timeout(config.timeout())
            .connect_timeout(config.connect_timeout());

        let channel = if config.lazy_connect {
            endpoint.connect_lazy()
        } else {
            endpoint.connect().await?
        };

        info!(
            endpoint = %config.endpoint,
            compression = ?config.compression,
            max_retries = config.retry.max_retries,
            lazy_connect = config.lazy_connect,
            "OTLP logs exporter configured"
        );

        Ok(Self::with_compression(channel, config.retry, config.compression))
    }

    /// Policy applied to every export
    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry_policy
    }

    /// Whether `shutdown_with_timeout` has been called
    pub fn is_shutdown(&self) -> bool {
        self.is_shutdown.load(Ordering::Acquire)
    }

    /// Export a single logs request
    ///
    /// This function will retry if the request fails based on the exporter's
    /// retry policy.
    pub async fn send_request(&self, request: ExportLogsServiceRequest) -> Result<()> {
        if self.is_shutdown() {
            return Err(Error::Shutdown);
        }
        export_with_retry(&self.client, &self.retry_policy, &request).await
    }
}

impl LogExporter for OtlpLogsExporter {
    async fn export(&self, batch: LogBatch<'_>) -> OTelSdkResult {
        if self.is_shutdown() {
            return Err(OTelSdkError::AlreadyShutdown);
        }

        let resource_logs = group_logs_by_resource_and_scope(batch, &self.resource);
        let request = ExportLogsServiceRequest { resource_logs };

        export_with_retry(&self.client, &self.retry_policy, &request)
            .await
            .map_err(|error| OTelSdkError::InternalFailure(format!("OTLP export error: {error}")))
    }

    fn shutdown_with_timeout(&self, _timeout: Duration) -> OTelSdkResult {
        if self.is_shutdown.swap(true, Ordering::AcqRel) {
            return Err(OTelSdkError::AlreadyShutdown);
        }
        debug!("OTLP logs exporter shut down");
        Ok(())
    }

    fn set_resource(&mut self, resource: &Resource) {
        self.resource = resource.into();
    }
}
