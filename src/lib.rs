//! Role-gated job board service.
//!
//! The [`board`] module owns the application workflow: who may view a job
//! application, who may move it between statuses, and how each role's listing
//! is partitioned. The remaining modules carry the service plumbing
//! (configuration, tracing setup, top-level errors).

pub mod board;
pub mod config;
pub mod error;
pub mod telemetry;
