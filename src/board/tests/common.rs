use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request};
use axum::response::Response;
use serde_json::Value;

use crate::board::domain::{
    AccountId, Application, ApplicationId, JobDraft, JobId, JobView, Registration, Role,
};
use crate::board::memory::{MemoryAccounts, MemoryApplications, MemoryJobs};
use crate::board::repository::{ApplicationRepository, RepositoryError};
use crate::board::router::board_router;
use crate::board::service::{BoardPolicy, BoardService};
use crate::board::session::{MemorySessions, Session, SessionStore};

pub(super) type TestService = BoardService<MemoryAccounts, MemoryJobs, MemoryApplications>;

pub(super) fn policy() -> BoardPolicy {
    BoardPolicy {
        default_page_size: 10,
        max_page_size: 50,
        // Minimum bcrypt cost keeps registration-heavy tests fast.
        bcrypt_cost: 4,
    }
}

pub(super) fn build_service() -> TestService {
    BoardService::new(
        Arc::new(MemoryAccounts::default()),
        Arc::new(MemoryJobs::default()),
        Arc::new(MemoryApplications::default()),
        policy(),
    )
}

pub(super) fn register(service: &TestService, role: Role, email: &str) -> Session {
    let view = service
        .register(Registration {
            email: email.to_string(),
            password: "hunter2".to_string(),
            name: format!("{} account", role.label()),
            role,
        })
        .expect("registration succeeds");
    Session {
        account_id: view.id,
        role: view.role,
    }
}

pub(super) fn seeker(service: &TestService) -> Session {
    register(service, Role::JobSeeker, "seeker@example.com")
}

pub(super) fn second_seeker(service: &TestService) -> Session {
    register(service, Role::JobSeeker, "seeker2@example.com")
}

pub(super) fn employer(service: &TestService) -> Session {
    register(service, Role::Employer, "employer@example.com")
}

pub(super) fn second_employer(service: &TestService) -> Session {
    register(service, Role::Employer, "employer2@example.com")
}

pub(super) fn admin(service: &TestService) -> Session {
    register(service, Role::Admin, "admin@example.com")
}

pub(super) fn draft(title: &str) -> JobDraft {
    JobDraft {
        title: title.to_string(),
        description: "Build and run production services.".to_string(),
        company: "Initech".to_string(),
        location: Some("Des Moines, IA".to_string()),
        salary: Some("$120,000".to_string()),
        job_type: Some("full-time".to_string()),
        category: Some("engineering".to_string()),
        requirements: None,
        benefits: None,
    }
}

pub(super) fn active_job(service: &TestService, owner: Session) -> JobView {
    service
        .create_job(owner, draft("Backend Engineer"))
        .expect("job creation succeeds")
}

pub(super) struct Harness {
    pub(super) service: Arc<TestService>,
    pub(super) sessions: Arc<MemorySessions>,
    pub(super) router: axum::Router,
}

pub(super) fn harness() -> Harness {
    let service = Arc::new(build_service());
    let sessions = Arc::new(MemorySessions::default());
    let router = board_router(service.clone(), sessions.clone());
    Harness {
        service,
        sessions,
        router,
    }
}

impl Harness {
    pub(super) fn token_for(&self, session: Session) -> String {
        self.sessions.issue(session).expect("token issued").0
    }
}

pub(super) fn json_request(
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    match body {
        Some(value) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                serde_json::to_vec(&value).expect("serializable body"),
            ))
            .expect("valid request"),
        None => builder.body(Body::empty()).expect("valid request"),
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

/// Application store whose every operation fails, for the 500 path.
pub(super) struct UnavailableApplications;

impl ApplicationRepository for UnavailableApplications {
    fn insert(&self, _application: Application) -> Result<Application, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update(&self, _application: Application) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: ApplicationId) -> Result<Option<Application>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn all(&self) -> Result<Vec<Application>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn find_for_job_and_applicant(
        &self,
        _job: JobId,
        _applicant: AccountId,
    ) -> Result<Option<Application>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}
