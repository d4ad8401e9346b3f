use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::domain::{AccountId, AccountRecord, Application, ApplicationId, Job, JobId};
use super::repository::{
    AccountRepository, ApplicationRepository, JobRepository, RepositoryError,
};

// BTreeMap keyed by id keeps iteration in insertion order (ids are assigned
// monotonically), which gives the stable listing order the service promises.

fn lock<'a, T>(
    mutex: &'a Mutex<T>,
    store: &'static str,
) -> Result<MutexGuard<'a, T>, RepositoryError> {
    mutex
        .lock()
        .map_err(|_: PoisonError<_>| RepositoryError::Unavailable(format!("{store} store poisoned")))
}

/// In-memory account store used by the binary and the tests.
#[derive(Default, Clone)]
pub struct MemoryAccounts {
    records: Arc<Mutex<BTreeMap<u64, AccountRecord>>>,
}

impl AccountRepository for MemoryAccounts {
    fn insert(&self, record: AccountRecord) -> Result<AccountRecord, RepositoryError> {
        let mut guard = lock(&self.records, "account")?;
        if guard.contains_key(&record.id.0) {
            return Err(RepositoryError::Conflict);
        }
        if guard
            .values()
            .any(|existing| existing.email.eq_ignore_ascii_case(&record.email))
        {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.id.0, record.clone());
        Ok(record)
    }

    fn update(&self, record: AccountRecord) -> Result<(), RepositoryError> {
        let mut guard = lock(&self.records, "account")?;
        if !guard.contains_key(&record.id.0) {
            return Err(RepositoryError::NotFound);
        }
        guard.insert(record.id.0, record);
        Ok(())
    }

    fn fetch(&self, id: AccountId) -> Result<Option<AccountRecord>, RepositoryError> {
        let guard = lock(&self.records, "account")?;
        Ok(guard.get(&id.0).cloned())
    }

    fn find_by_email(&self, email: &str) -> Result<Option<AccountRecord>, RepositoryError> {
        let guard = lock(&self.records, "account")?;
        Ok(guard
            .values()
            .find(|record| record.email.eq_ignore_ascii_case(email))
            .cloned())
    }
}

/// In-memory job posting store.
#[derive(Default, Clone)]
pub struct MemoryJobs {
    records: Arc<Mutex<BTreeMap<u64, Job>>>,
}

impl JobRepository for MemoryJobs {
    fn insert(&self, job: Job) -> Result<Job, RepositoryError> {
        let mut guard = lock(&self.records, "job")?;
        if guard.contains_key(&job.id.0) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(job.id.0, job.clone());
        Ok(job)
    }

    fn update(&self, job: Job) -> Result<(), RepositoryError> {
        let mut guard = lock(&self.records, "job")?;
        if !guard.contains_key(&job.id.0) {
            return Err(RepositoryError::NotFound);
        }
        guard.insert(job.id.0, job);
        Ok(())
    }

    fn fetch(&self, id: JobId) -> Result<Option<Job>, RepositoryError> {
        let guard = lock(&self.records, "job")?;
        Ok(guard.get(&id.0).cloned())
    }

    fn all(&self) -> Result<Vec<Job>, RepositoryError> {
        let guard = lock(&self.records, "job")?;
        Ok(guard.values().cloned().collect())
    }
}

/// In-memory application store.
#[derive(Default, Clone)]
pub struct MemoryApplications {
    records: Arc<Mutex<BTreeMap<u64, Application>>>,
}

impl ApplicationRepository for MemoryApplications {
    fn insert(&self, application: Application) -> Result<Application, RepositoryError> {
        let mut guard = lock(&self.records, "application")?;
        if guard.contains_key(&application.id.0) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(application.id.0, application.clone());
        Ok(application)
    }

    fn update(&self, application: Application) -> Result<(), RepositoryError> {
        let mut guard = lock(&self.records, "application")?;
        if !guard.contains_key(&application.id.0) {
            return Err(RepositoryError::NotFound);
        }
        guard.insert(application.id.0, application);
        Ok(())
    }

    fn fetch(&self, id: ApplicationId) -> Result<Option<Application>, RepositoryError> {
        let guard = lock(&self.records, "application")?;
        Ok(guard.get(&id.0).cloned())
    }

    fn all(&self) -> Result<Vec<Application>, RepositoryError> {
        let guard = lock(&self.records, "application")?;
        Ok(guard.values().cloned().collect())
    }

    fn find_for_job_and_applicant(
        &self,
        job: JobId,
        applicant: AccountId,
    ) -> Result<Option<Application>, RepositoryError> {
        let guard = lock(&self.records, "application")?;
        Ok(guard
            .values()
            .find(|application| application.job_id == job && application.applicant_id == applicant)
            .cloned())
    }
}
