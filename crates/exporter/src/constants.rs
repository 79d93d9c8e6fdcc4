// Exporter defaults (no magic values)

/// Default OTLP/gRPC collector endpoint
pub const DEFAULT_ENDPOINT: &str = "http://localhost:4317";

/// Default number of retries after the first failed attempt
pub const DEFAULT_MAX_RETRIES: usize = 3;

/// Default first backoff delay (100ms)
pub const DEFAULT_INITIAL_DELAY_MS: u64 = 100;

/// Default backoff ceiling (1.6s, four doublings of the initial delay)
pub const DEFAULT_MAX_DELAY_MS: u64 = 1600;

/// Default upper bound of random jitter added to each backoff (100ms)
pub const DEFAULT_JITTER_MS: u64 = 100;

/// Default per-request timeout (10s, matches the OTLP exporter spec)
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Default channel connect timeout (5s)
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 5_000;

/// Operation name attached to retry log events
pub const EXPORT_OPERATION_NAME: &str = "otlp_logs_export";

// Environment variables

/// Logs-specific endpoint, takes precedence over `ENV_ENDPOINT`
pub const ENV_LOGS_ENDPOINT: &str = "OTEL_EXPORTER_OTLP_LOGS_ENDPOINT";
pub const ENV_ENDPOINT: &str = "OTEL_EXPORTER_OTLP_ENDPOINT";
pub const ENV_TIMEOUT: &str = "OTEL_EXPORTER_OTLP_TIMEOUT";
pub const ENV_COMPRESSION: &str = "OTEL_EXPORTER_OTLP_COMPRESSION";
pub const ENV_MAX_RETRIES: &str = "OTLP_LOGS_EXPORTER_MAX_RETRIES";
pub const ENV_INITIAL_DELAY_MS: &str = "OTLP_LOGS_EXPORTER_INITIAL_DELAY_MS";
pub const ENV_MAX_DELAY_MS: &str = "OTLP_LOGS_EXPORTER_MAX_DELAY_MS";
pub const ENV_JITTER_MS: &str = "OTLP_LOGS_EXPORTER_JITTER_MS";
