//! Job board workflow: accounts, postings, and the application lifecycle.
//!
//! The module is split the same way the HTTP surface is consumed: `domain`
//! holds the closed role/status enums and entity records, `repository` the
//! storage traits, `service` the authorization and status-transition rules,
//! and `router` the axum boundary. `memory` provides the in-process stores
//! the binary and the tests run against.

pub mod domain;
pub mod memory;
pub mod repository;
pub mod router;
pub mod service;
pub mod session;

#[cfg(test)]
mod tests;

pub use domain::{
    AccountId, AccountRecord, AccountView, Application, ApplicationId, ApplicationStatus,
    ApplicationView, Job, JobDraft, JobId, JobPage, JobQuery, JobView, ProfileDetails,
    Registration, Role,
};
pub use memory::{MemoryAccounts, MemoryApplications, MemoryJobs};
pub use repository::{AccountRepository, ApplicationRepository, JobRepository, RepositoryError};
pub use router::board_router;
pub use service::{BoardPolicy, BoardService, WorkflowError};
pub use session::{MemorySessions, Session, SessionError, SessionStore, SessionToken};
