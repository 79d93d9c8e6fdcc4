// Mock OTLP collector shared by the integration tests
#![allow(dead_code)]

use opentelemetry_proto::tonic::collector::logs::v1::logs_service_server::{
    LogsService, LogsServiceServer,
};
use opentelemetry_proto::tonic::collector::logs::v1::{
    ExportLogsPartialSuccess, ExportLogsServiceRequest, ExportLogsServiceResponse,
};
use opentelemetry_proto::tonic::common::v1::{any_value, AnyValue};
use opentelemetry_proto::tonic::logs::v1::{LogRecord, ResourceLogs, ScopeLogs};
use otlp_logs_exporter::RetryPolicy;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::codec::CompressionEncoding;
use tonic::transport::Server;
use tonic::{Code, Request, Response, Status};
use tonic_types::{ErrorDetails, StatusExt};

#[derive(Default)]
struct CollectorState {
    /// Failures returned (in order) before the collector starts accepting
    scripted_failures: VecDeque<Status>,
    received: Vec<ExportLogsServiceRequest>,
    calls: usize,
    rejected_per_request: i64,
}

/// In-process collector that records what it receives
#[derive(Clone, Default)]
pub struct MockCollector {
    state: Arc<Mutex<CollectorState>>,
}

impl MockCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_with(failures: impl IntoIterator<Item = Status>) -> Self {
        let collector = Self::new();
        collector.state.lock().unwrap().scripted_failures = failures.into_iter().collect();
        collector
    }

    /// Accept requests but report `rejected` records as a partial success
    pub fn rejecting(rejected: i64) -> Self {
        let collector = Self::new();
        collector.state.lock().unwrap().rejected_per_request = rejected;
        collector
    }

    pub fn calls(&self) -> usize {
        self.state.lock().unwrap().calls
    }

    pub fn received(&self) -> Vec<ExportLogsServiceRequest> {
        self.state.lock().unwrap().received.clone()
    }

    /// Bind a loopback port and serve until the test runtime shuts down
    pub async fn spawn(&self) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let service = LogsServiceServer::new(self.clone())
            .accept_compressed(CompressionEncoding::Zstd)
            .accept_compressed(CompressionEncoding::Gzip)
            .send_compressed(CompressionEncoding::Zstd)
            .send_compressed(CompressionEncoding::Gzip);

        tokio::spawn(async move {
            Server::builder()
                .add_service(service)
                .serve_with_incoming(TcpListenerStream::new(listener))
                .await
                .unwrap();
        });

        format!("http://{addr}")
    }
}

#[tonic::async_trait]
impl LogsService for MockCollector {
    async fn export(
        &self,
        request: Request<ExportLogsServiceRequest>,
    ) -> Result<Response<ExportLogsServiceResponse>, Status> {
        let mut state = self.state.lock().unwrap();
        state.calls += 1;

        if let Some(status) = state.scripted_failures.pop_front() {
            return Err(status);
        }

        state.received.push(request.into_inner());

        let partial_success = (state.rejected_per_request > 0).then(|| ExportLogsPartialSuccess {
            rejected_log_records: state.rejected_per_request,
            error_message: "record too large".to_string(),
        });

        Ok(Response::new(ExportLogsServiceResponse { partial_success }))
    }
}

/// Retry policy with tiny delays so tests finish quickly
pub fn fast_policy(max_retries: usize) -> RetryPolicy {
    RetryPolicy {
        max_retries,
        initial_delay_ms: 1,
        max_delay_ms: 10,
        jitter_ms: 1,
    }
}

pub fn throttled(delay: Duration) -> Status {
    Status::with_error_details(
        Code::ResourceExhausted,
        "collector overloaded",
        ErrorDetails::with_retry_info(Some(delay)),
    )
}

/// One resource, one scope, one record per message
pub fn logs_request(messages: &[&str]) -> ExportLogsServiceRequest {
    let log_records = messages
        .iter()
        .map(|message| LogRecord {
            body: Some(AnyValue {
                value: Some(any_value::Value::StringValue(message.to_string())),
            }),
            ..Default::default()
        })
        .collect();

    ExportLogsServiceRequest {
        resource_logs: vec![ResourceLogs {
            scope_logs: vec![ScopeLogs {
                log_records,
                ..Default::default()
            }],
            ..Default::default()
        }],
    }
}

pub fn record_count(request: &ExportLogsServiceRequest) -> usize {
    request
        .resource_logs
        .iter()
        .flat_map(|resource| &resource.scope_logs)
        .map(|scope| scope.log_records.len())
        .sum()
}
