use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;

use super::domain::{
    AccountId, AccountRecord, AccountView, Application, ApplicationId, ApplicationStatus,
    ApplicationView, Job, JobDraft, JobId, JobPage, JobQuery, JobView, ProfileDetails,
    Registration, Role,
};
use super::repository::{
    AccountRepository, ApplicationRepository, JobRepository, RepositoryError,
};
use super::session::{Session, SessionError};

/// Tunables applied by the service: pagination bounds for the public listing
/// and the bcrypt cost used when hashing registration passwords.
#[derive(Debug, Clone)]
pub struct BoardPolicy {
    pub default_page_size: u32,
    pub max_page_size: u32,
    pub bcrypt_cost: u32,
}

impl Default for BoardPolicy {
    fn default() -> Self {
        Self {
            default_page_size: 10,
            max_page_size: 50,
            bcrypt_cost: bcrypt::DEFAULT_COST,
        }
    }
}

static ACCOUNT_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static JOB_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static APPLICATION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_account_id() -> AccountId {
    AccountId(ACCOUNT_SEQUENCE.fetch_add(1, Ordering::Relaxed))
}

fn next_job_id() -> JobId {
    JobId(JOB_SEQUENCE.fetch_add(1, Ordering::Relaxed))
}

fn next_application_id() -> ApplicationId {
    ApplicationId(APPLICATION_SEQUENCE.fetch_add(1, Ordering::Relaxed))
}

/// The application workflow engine: owns every authorization decision and
/// every status transition for the job board. Handlers resolve a [`Session`]
/// and delegate here; repositories only store what this service validated.
pub struct BoardService<A, J, R> {
    accounts: Arc<A>,
    jobs: Arc<J>,
    applications: Arc<R>,
    policy: BoardPolicy,
}

impl<A, J, R> BoardService<A, J, R>
where
    A: AccountRepository + 'static,
    J: JobRepository + 'static,
    R: ApplicationRepository + 'static,
{
    pub fn new(accounts: Arc<A>, jobs: Arc<J>, applications: Arc<R>, policy: BoardPolicy) -> Self {
        Self {
            accounts,
            jobs,
            applications,
            policy,
        }
    }

    /// Create an account with the requested role. The role is immutable after
    /// this point.
    pub fn register(&self, registration: Registration) -> Result<AccountView, WorkflowError> {
        let email = registration.email.trim().to_ascii_lowercase();
        let name = registration.name.trim().to_string();

        if email.is_empty() {
            return Err(WorkflowError::Validation { field: "email" });
        }
        if registration.password.is_empty() {
            return Err(WorkflowError::Validation { field: "password" });
        }
        if name.is_empty() {
            return Err(WorkflowError::Validation { field: "name" });
        }

        if self.accounts.find_by_email(&email)?.is_some() {
            return Err(WorkflowError::Conflict("email already registered"));
        }

        let password_hash = bcrypt::hash(&registration.password, self.policy.bcrypt_cost)
            .map_err(|_| WorkflowError::Credential)?;

        let now = Utc::now();
        let record = AccountRecord {
            id: next_account_id(),
            email,
            name,
            role: registration.role,
            password_hash,
            profile: None,
            created_at: now,
            updated_at: now,
        };

        let stored = self.accounts.insert(record).map_err(|err| match err {
            RepositoryError::Conflict => WorkflowError::Conflict("email already registered"),
            other => WorkflowError::Repository(other),
        })?;
        Ok(stored.view())
    }

    /// Verify a credential pair. The caller issues the session token.
    pub fn authenticate(&self, email: &str, password: &str) -> Result<AccountView, WorkflowError> {
        let record = self
            .accounts
            .find_by_email(email.trim())?
            .ok_or(WorkflowError::NotAuthorized("invalid email or password"))?;

        let verified =
            bcrypt::verify(password, &record.password_hash).map_err(|_| WorkflowError::Credential)?;
        if !verified {
            return Err(WorkflowError::NotAuthorized("invalid email or password"));
        }
        Ok(record.view())
    }

    pub fn profile(&self, session: Session) -> Result<AccountView, WorkflowError> {
        Ok(self.account(session.account_id)?.view())
    }

    /// Replace the caller's profile fields wholesale, as the client submits
    /// the full form on every save.
    pub fn update_profile(
        &self,
        session: Session,
        details: ProfileDetails,
    ) -> Result<AccountView, WorkflowError> {
        let mut record = self.account(session.account_id)?;
        record.profile = Some(details);
        record.updated_at = Utc::now();
        self.accounts.update(record.clone())?;
        Ok(record.view())
    }

    /// Create an active posting owned by the calling employer. Admins are not
    /// employers and may not create postings.
    pub fn create_job(&self, session: Session, draft: JobDraft) -> Result<JobView, WorkflowError> {
        match session.role {
            Role::Employer => {}
            Role::JobSeeker | Role::Admin => {
                return Err(WorkflowError::NotAuthorized(
                    "only employers can create job postings",
                ));
            }
        }
        validate_draft(&draft)?;

        let now = Utc::now();
        let job = Job {
            id: next_job_id(),
            title: draft.title.trim().to_string(),
            description: draft.description.trim().to_string(),
            company: draft.company.trim().to_string(),
            location: draft.location,
            salary: draft.salary,
            job_type: draft.job_type,
            category: draft.category,
            requirements: draft.requirements,
            benefits: draft.benefits,
            employer_id: session.account_id,
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        let stored = self.jobs.insert(job)?;
        self.job_view(&stored)
    }

    /// Replace the mutable fields of a posting. Owner or admin only.
    pub fn update_job(
        &self,
        session: Session,
        id: JobId,
        draft: JobDraft,
    ) -> Result<JobView, WorkflowError> {
        let mut job = self.job(id)?;
        authorize_job_mutation(session, &job)?;
        validate_draft(&draft)?;

        job.title = draft.title.trim().to_string();
        job.description = draft.description.trim().to_string();
        job.company = draft.company.trim().to_string();
        job.location = draft.location;
        job.salary = draft.salary;
        job.job_type = draft.job_type;
        job.category = draft.category;
        job.requirements = draft.requirements;
        job.benefits = draft.benefits;
        job.updated_at = Utc::now();

        self.jobs.update(job.clone())?;
        self.job_view(&job)
    }

    /// Soft delete: the posting drops out of browsing but keeps its history.
    pub fn deactivate_job(&self, session: Session, id: JobId) -> Result<(), WorkflowError> {
        let mut job = self.job(id)?;
        authorize_job_mutation(session, &job)?;
        job.is_active = false;
        job.updated_at = Utc::now();
        self.jobs.update(job)?;
        Ok(())
    }

    /// Public listing of active postings with filters and pagination.
    ///
    /// Admin sessions are refused by policy: the admin surface is the
    /// aggregate listing, not the seeker-facing browse view.
    pub fn browse_jobs(
        &self,
        session: Option<Session>,
        query: JobQuery,
    ) -> Result<JobPage, WorkflowError> {
        if let Some(session) = session {
            if session.role == Role::Admin {
                return Err(WorkflowError::NotAuthorized(
                    "administrators do not browse the public job listing",
                ));
            }
        }

        let search = query.search.as_deref().map(str::to_lowercase);
        let location = query.location.as_deref().map(str::to_lowercase);

        let matching: Vec<Job> = self
            .jobs
            .all()?
            .into_iter()
            .filter(|job| job.is_active)
            .filter(|job| match query.category.as_deref() {
                Some(category) => job.category.as_deref() == Some(category),
                None => true,
            })
            .filter(|job| match query.job_type.as_deref() {
                Some(job_type) => job.job_type.as_deref() == Some(job_type),
                None => true,
            })
            .filter(|job| match location.as_deref() {
                Some(needle) => job
                    .location
                    .as_deref()
                    .is_some_and(|location| location.to_lowercase().contains(needle)),
                None => true,
            })
            .filter(|job| match search.as_deref() {
                Some(needle) => {
                    job.title.to_lowercase().contains(needle)
                        || job.description.to_lowercase().contains(needle)
                }
                None => true,
            })
            .collect();

        let total = matching.len() as u64;
        let page = query.page.unwrap_or(1).max(1);
        let limit = query
            .limit
            .unwrap_or(self.policy.default_page_size)
            .clamp(1, self.policy.max_page_size);
        let offset = (page as usize - 1).saturating_mul(limit as usize);

        let jobs = matching
            .iter()
            .skip(offset)
            .take(limit as usize)
            .map(|job| self.job_view(job))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(JobPage {
            jobs,
            total,
            page,
            limit,
        })
    }

    pub fn job_detail(&self, id: JobId) -> Result<JobView, WorkflowError> {
        let job = self.job(id)?;
        self.job_view(&job)
    }

    /// Admin aggregate listing: every posting, active or not.
    pub fn all_jobs(&self, session: Session) -> Result<Vec<JobView>, WorkflowError> {
        match session.role {
            Role::Admin => {}
            Role::JobSeeker | Role::Employer => {
                return Err(WorkflowError::NotAuthorized(
                    "the aggregate job listing requires an administrator session",
                ));
            }
        }
        self.jobs
            .all()?
            .iter()
            .map(|job| self.job_view(job))
            .collect()
    }

    /// Submit an application against an active posting. Job seekers only;
    /// a second application by the same account to the same job conflicts.
    pub fn submit_application(
        &self,
        session: Session,
        job_id: JobId,
        message: String,
    ) -> Result<ApplicationView, WorkflowError> {
        match session.role {
            Role::JobSeeker => {}
            Role::Employer | Role::Admin => {
                return Err(WorkflowError::NotAuthorized(
                    "only job seekers can submit applications",
                ));
            }
        }

        let job = self.job(job_id)?;
        if !job.is_active {
            return Err(WorkflowError::NotFound("job"));
        }

        if self
            .applications
            .find_for_job_and_applicant(job_id, session.account_id)?
            .is_some()
        {
            return Err(WorkflowError::Conflict(
                "application already submitted for this job",
            ));
        }

        let now = Utc::now();
        let application = Application {
            id: next_application_id(),
            job_id,
            applicant_id: session.account_id,
            status: ApplicationStatus::Pending,
            message,
            created_at: now,
            updated_at: now,
        };

        let stored = self.applications.insert(application).map_err(|err| match err {
            RepositoryError::Conflict => {
                WorkflowError::Conflict("application already submitted for this job")
            }
            other => WorkflowError::Repository(other),
        })?;
        self.application_view(&stored)
    }

    /// Role-partitioned listing: seekers see their own applications, employers
    /// see applications against postings they own, admins see everything.
    /// Order is insertion order, stable across calls.
    pub fn applications_for(
        &self,
        session: Session,
    ) -> Result<Vec<ApplicationView>, WorkflowError> {
        let applications = self.applications.all()?;

        let selected: Vec<Application> = match session.role {
            Role::JobSeeker => applications
                .into_iter()
                .filter(|application| application.applicant_id == session.account_id)
                .collect(),
            Role::Employer => {
                let owned: BTreeSet<JobId> = self
                    .jobs
                    .all()?
                    .into_iter()
                    .filter(|job| job.employer_id == session.account_id)
                    .map(|job| job.id)
                    .collect();
                applications
                    .into_iter()
                    .filter(|application| owned.contains(&application.job_id))
                    .collect()
            }
            Role::Admin => applications,
        };

        selected
            .iter()
            .map(|application| self.application_view(application))
            .collect()
    }

    /// Applications against one posting, for its owner or an admin.
    pub fn applications_for_job(
        &self,
        session: Session,
        job_id: JobId,
    ) -> Result<Vec<ApplicationView>, WorkflowError> {
        let job = self.job(job_id)?;
        match session.role {
            Role::Admin => {}
            Role::Employer if job.employer_id == session.account_id => {}
            Role::Employer => {
                return Err(WorkflowError::NotAuthorized(
                    "not the owner of this job posting",
                ));
            }
            Role::JobSeeker => {
                return Err(WorkflowError::NotAuthorized(
                    "job seekers cannot review applications for a posting",
                ));
            }
        }

        self.applications
            .all()?
            .iter()
            .filter(|application| application.job_id == job_id)
            .map(|application| self.application_view(application))
            .collect()
    }

    /// Overwrite an application's status. Owning employer or admin only; the
    /// transition graph is complete, so any of the three statuses may replace
    /// any other (including itself). Refreshes the update timestamp.
    pub fn update_status(
        &self,
        session: Session,
        application_id: ApplicationId,
        new_status: &str,
    ) -> Result<ApplicationView, WorkflowError> {
        let mut application = self
            .applications
            .fetch(application_id)?
            .ok_or(WorkflowError::NotFound("application"))?;
        let job = self.job(application.job_id)?;

        match session.role {
            Role::Admin => {}
            Role::Employer if job.employer_id == session.account_id => {}
            Role::Employer => {
                return Err(WorkflowError::NotAuthorized(
                    "not the owner of the referenced job posting",
                ));
            }
            Role::JobSeeker => {
                return Err(WorkflowError::NotAuthorized(
                    "job seekers cannot update application status",
                ));
            }
        }

        let status = ApplicationStatus::parse(new_status).ok_or_else(|| {
            WorkflowError::InvalidStatus {
                value: new_status.to_string(),
            }
        })?;

        application.status = status;
        application.updated_at = Utc::now();
        self.applications.update(application.clone())?;
        self.application_view(&application)
    }

    fn account(&self, id: AccountId) -> Result<AccountRecord, WorkflowError> {
        self.accounts
            .fetch(id)?
            .ok_or(WorkflowError::NotFound("account"))
    }

    fn job(&self, id: JobId) -> Result<Job, WorkflowError> {
        self.jobs.fetch(id)?.ok_or(WorkflowError::NotFound("job"))
    }

    fn job_view(&self, job: &Job) -> Result<JobView, WorkflowError> {
        let employer = self
            .accounts
            .fetch(job.employer_id)?
            .ok_or(WorkflowError::NotFound("employer account"))?;
        Ok(job.view(&employer))
    }

    fn application_view(&self, application: &Application) -> Result<ApplicationView, WorkflowError> {
        let job = self.job(application.job_id)?;
        let job_view = self.job_view(&job)?;
        let applicant = self
            .accounts
            .fetch(application.applicant_id)?
            .ok_or(WorkflowError::NotFound("applicant account"))?;
        Ok(application.view(job_view, &applicant))
    }
}

fn validate_draft(draft: &JobDraft) -> Result<(), WorkflowError> {
    if draft.title.trim().is_empty() {
        return Err(WorkflowError::Validation { field: "title" });
    }
    if draft.description.trim().is_empty() {
        return Err(WorkflowError::Validation { field: "description" });
    }
    if draft.company.trim().is_empty() {
        return Err(WorkflowError::Validation { field: "company" });
    }
    Ok(())
}

fn authorize_job_mutation(session: Session, job: &Job) -> Result<(), WorkflowError> {
    match session.role {
        Role::Admin => Ok(()),
        Role::Employer if job.employer_id == session.account_id => Ok(()),
        Role::Employer => Err(WorkflowError::NotAuthorized(
            "not the owner of this job posting",
        )),
        Role::JobSeeker => Err(WorkflowError::NotAuthorized(
            "job seekers cannot manage job postings",
        )),
    }
}

/// Error raised by the board workflow.
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error("not authorized: {0}")]
    NotAuthorized(&'static str),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("{0}")]
    Conflict(&'static str),
    #[error("invalid application status '{value}'")]
    InvalidStatus { value: String },
    #[error("{field} is required")]
    Validation { field: &'static str },
    #[error("credential hashing failed")]
    Credential,
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Session(#[from] SessionError),
}
