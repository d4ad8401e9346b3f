use crate::board::WorkflowError;
use crate::config::ConfigError;
use crate::telemetry::TelemetryError;

/// Errors that abort startup or the CLI entry point. Request-level workflow
/// failures are answered in the router instead of surfacing here.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("telemetry error: {0}")]
    Telemetry(#[from] TelemetryError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("workflow error: {0}")]
    Workflow(#[from] WorkflowError),
}
