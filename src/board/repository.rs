use super::domain::{AccountId, AccountRecord, Application, ApplicationId, Job, JobId};

/// Storage abstraction for accounts so the service module can be exercised
/// against in-memory fakes.
pub trait AccountRepository: Send + Sync {
    /// Insert a new record. Fails with [`RepositoryError::Conflict`] when the
    /// id or email is already taken.
    fn insert(&self, record: AccountRecord) -> Result<AccountRecord, RepositoryError>;
    fn update(&self, record: AccountRecord) -> Result<(), RepositoryError>;
    fn fetch(&self, id: AccountId) -> Result<Option<AccountRecord>, RepositoryError>;
    fn find_by_email(&self, email: &str) -> Result<Option<AccountRecord>, RepositoryError>;
}

/// Storage abstraction for job postings.
pub trait JobRepository: Send + Sync {
    fn insert(&self, job: Job) -> Result<Job, RepositoryError>;
    fn update(&self, job: Job) -> Result<(), RepositoryError>;
    fn fetch(&self, id: JobId) -> Result<Option<Job>, RepositoryError>;
    /// Every posting, active or not, in ascending id order. Ids are assigned
    /// monotonically, so this is insertion order and stable across calls.
    fn all(&self) -> Result<Vec<Job>, RepositoryError>;
}

/// Storage abstraction for applications.
pub trait ApplicationRepository: Send + Sync {
    fn insert(&self, application: Application) -> Result<Application, RepositoryError>;
    fn update(&self, application: Application) -> Result<(), RepositoryError>;
    fn fetch(&self, id: ApplicationId) -> Result<Option<Application>, RepositoryError>;
    /// Every application in ascending id order, stable across calls.
    fn all(&self) -> Result<Vec<Application>, RepositoryError>;
    /// Duplicate-prevention lookup: the application this account already
    /// submitted against this job, if any.
    fn find_for_job_and_applicant(
        &self,
        job: JobId,
        applicant: AccountId,
    ) -> Result<Option<Application>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
