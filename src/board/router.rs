use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::domain::{
    AccountView, ApplicationId, ApplicationView, JobDraft, JobId, JobQuery, JobView,
    ProfileDetails, Registration, Role,
};
use super::repository::{
    AccountRepository, ApplicationRepository, JobRepository, RepositoryError,
};
use super::service::{BoardService, WorkflowError};
use super::session::{bearer_token, Session, SessionStore};

/// Shared handler state: the workflow service plus the session store used to
/// resolve bearer tokens at request entry.
pub struct BoardState<A, J, R, S> {
    pub service: Arc<BoardService<A, J, R>>,
    pub sessions: Arc<S>,
}

impl<A, J, R, S> Clone for BoardState<A, J, R, S> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            sessions: Arc::clone(&self.sessions),
        }
    }
}

/// Router builder exposing the REST surface of the job board.
pub fn board_router<A, J, R, S>(
    service: Arc<BoardService<A, J, R>>,
    sessions: Arc<S>,
) -> Router
where
    A: AccountRepository + 'static,
    J: JobRepository + 'static,
    R: ApplicationRepository + 'static,
    S: SessionStore + 'static,
{
    let state = BoardState { service, sessions };

    Router::new()
        .route("/api/auth/register", post(register_handler::<A, J, R, S>))
        .route("/api/auth/login", post(login_handler::<A, J, R, S>))
        .route(
            "/api/profile",
            get(profile_handler::<A, J, R, S>).put(update_profile_handler::<A, J, R, S>),
        )
        .route(
            "/api/jobs",
            get(browse_jobs_handler::<A, J, R, S>).post(create_job_handler::<A, J, R, S>),
        )
        .route("/api/jobs/all", get(all_jobs_handler::<A, J, R, S>))
        .route(
            "/api/jobs/:job_id",
            get(job_detail_handler::<A, J, R, S>)
                .put(update_job_handler::<A, J, R, S>)
                .delete(delete_job_handler::<A, J, R, S>),
        )
        .route(
            "/api/applications",
            post(submit_application_handler::<A, J, R, S>),
        )
        .route(
            "/api/applications/my",
            get(my_applications_handler::<A, J, R, S>),
        )
        .route(
            "/api/applications/employer",
            get(employer_applications_handler::<A, J, R, S>),
        )
        .route(
            "/api/applications/all",
            get(all_applications_handler::<A, J, R, S>),
        )
        .route(
            "/api/applications/job/:job_id",
            get(job_applications_handler::<A, J, R, S>),
        )
        .route(
            "/api/applications/:application_id/status",
            put(update_status_handler::<A, J, R, S>),
        )
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct SubmitApplicationRequest {
    pub job_id: JobId,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: String,
}

#[derive(Debug, Serialize)]
struct SessionResponse {
    token: String,
    user: AccountView,
}

#[derive(Debug, Serialize)]
struct UserResponse {
    user: AccountView,
}

#[derive(Debug, Serialize)]
struct JobResponse {
    job: JobView,
}

#[derive(Debug, Serialize)]
struct JobsResponse {
    jobs: Vec<JobView>,
}

#[derive(Debug, Serialize)]
struct ApplicationResponse {
    application: ApplicationView,
}

#[derive(Debug, Serialize)]
struct ApplicationsResponse {
    applications: Vec<ApplicationView>,
}

#[derive(Debug, Serialize)]
struct MessageResponse {
    message: &'static str,
}

impl IntoResponse for WorkflowError {
    fn into_response(self) -> Response {
        let status = match &self {
            WorkflowError::NotAuthorized(_) => StatusCode::FORBIDDEN,
            WorkflowError::NotFound(_) => StatusCode::NOT_FOUND,
            WorkflowError::Conflict(_) => StatusCode::CONFLICT,
            WorkflowError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
            WorkflowError::InvalidStatus { .. } | WorkflowError::Validation { .. } => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            WorkflowError::Credential
            | WorkflowError::Repository(_)
            | WorkflowError::Session(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

fn session_from<S: SessionStore>(
    sessions: &S,
    headers: &HeaderMap,
) -> Result<Session, WorkflowError> {
    let token =
        bearer_token(headers).ok_or(WorkflowError::NotAuthorized("missing bearer token"))?;
    sessions
        .fetch(token)?
        .ok_or(WorkflowError::NotAuthorized("unknown session token"))
}

/// A missing Authorization header is an anonymous caller; a present but
/// unresolvable token is still an error.
fn optional_session<S: SessionStore>(
    sessions: &S,
    headers: &HeaderMap,
) -> Result<Option<Session>, WorkflowError> {
    match bearer_token(headers) {
        None => Ok(None),
        Some(token) => Ok(Some(
            sessions
                .fetch(token)?
                .ok_or(WorkflowError::NotAuthorized("unknown session token"))?,
        )),
    }
}

fn require_role(
    session: Session,
    role: Role,
    reason: &'static str,
) -> Result<Session, WorkflowError> {
    if session.role == role {
        Ok(session)
    } else {
        Err(WorkflowError::NotAuthorized(reason))
    }
}

pub(crate) async fn register_handler<A, J, R, S>(
    State(state): State<BoardState<A, J, R, S>>,
    Json(registration): Json<Registration>,
) -> Result<Response, WorkflowError>
where
    A: AccountRepository + 'static,
    J: JobRepository + 'static,
    R: ApplicationRepository + 'static,
    S: SessionStore + 'static,
{
    let user = state.service.register(registration)?;
    let token = state.sessions.issue(Session {
        account_id: user.id,
        role: user.role,
    })?;
    Ok((
        StatusCode::CREATED,
        Json(SessionResponse {
            token: token.0,
            user,
        }),
    )
        .into_response())
}

pub(crate) async fn login_handler<A, J, R, S>(
    State(state): State<BoardState<A, J, R, S>>,
    Json(request): Json<LoginRequest>,
) -> Result<Response, WorkflowError>
where
    A: AccountRepository + 'static,
    J: JobRepository + 'static,
    R: ApplicationRepository + 'static,
    S: SessionStore + 'static,
{
    let user = state
        .service
        .authenticate(&request.email, &request.password)?;
    let token = state.sessions.issue(Session {
        account_id: user.id,
        role: user.role,
    })?;
    Ok(Json(SessionResponse {
        token: token.0,
        user,
    })
    .into_response())
}

pub(crate) async fn profile_handler<A, J, R, S>(
    State(state): State<BoardState<A, J, R, S>>,
    headers: HeaderMap,
) -> Result<Json<UserResponse>, WorkflowError>
where
    A: AccountRepository + 'static,
    J: JobRepository + 'static,
    R: ApplicationRepository + 'static,
    S: SessionStore + 'static,
{
    let session = session_from(state.sessions.as_ref(), &headers)?;
    let user = state.service.profile(session)?;
    Ok(Json(UserResponse { user }))
}

pub(crate) async fn update_profile_handler<A, J, R, S>(
    State(state): State<BoardState<A, J, R, S>>,
    headers: HeaderMap,
    Json(details): Json<ProfileDetails>,
) -> Result<Json<UserResponse>, WorkflowError>
where
    A: AccountRepository + 'static,
    J: JobRepository + 'static,
    R: ApplicationRepository + 'static,
    S: SessionStore + 'static,
{
    let session = session_from(state.sessions.as_ref(), &headers)?;
    let user = state.service.update_profile(session, details)?;
    Ok(Json(UserResponse { user }))
}

pub(crate) async fn browse_jobs_handler<A, J, R, S>(
    State(state): State<BoardState<A, J, R, S>>,
    headers: HeaderMap,
    Query(query): Query<JobQuery>,
) -> Result<Response, WorkflowError>
where
    A: AccountRepository + 'static,
    J: JobRepository + 'static,
    R: ApplicationRepository + 'static,
    S: SessionStore + 'static,
{
    let session = optional_session(state.sessions.as_ref(), &headers)?;
    let page = state.service.browse_jobs(session, query)?;
    Ok(Json(page).into_response())
}

pub(crate) async fn job_detail_handler<A, J, R, S>(
    State(state): State<BoardState<A, J, R, S>>,
    Path(job_id): Path<u64>,
) -> Result<Json<JobResponse>, WorkflowError>
where
    A: AccountRepository + 'static,
    J: JobRepository + 'static,
    R: ApplicationRepository + 'static,
    S: SessionStore + 'static,
{
    let job = state.service.job_detail(JobId(job_id))?;
    Ok(Json(JobResponse { job }))
}

pub(crate) async fn create_job_handler<A, J, R, S>(
    State(state): State<BoardState<A, J, R, S>>,
    headers: HeaderMap,
    Json(draft): Json<JobDraft>,
) -> Result<Response, WorkflowError>
where
    A: AccountRepository + 'static,
    J: JobRepository + 'static,
    R: ApplicationRepository + 'static,
    S: SessionStore + 'static,
{
    let session = session_from(state.sessions.as_ref(), &headers)?;
    let job = state.service.create_job(session, draft)?;
    Ok((StatusCode::CREATED, Json(JobResponse { job })).into_response())
}

pub(crate) async fn update_job_handler<A, J, R, S>(
    State(state): State<BoardState<A, J, R, S>>,
    headers: HeaderMap,
    Path(job_id): Path<u64>,
    Json(draft): Json<JobDraft>,
) -> Result<Json<JobResponse>, WorkflowError>
where
    A: AccountRepository + 'static,
    J: JobRepository + 'static,
    R: ApplicationRepository + 'static,
    S: SessionStore + 'static,
{
    let session = session_from(state.sessions.as_ref(), &headers)?;
    let job = state.service.update_job(session, JobId(job_id), draft)?;
    Ok(Json(JobResponse { job }))
}

pub(crate) async fn delete_job_handler<A, J, R, S>(
    State(state): State<BoardState<A, J, R, S>>,
    headers: HeaderMap,
    Path(job_id): Path<u64>,
) -> Result<Json<MessageResponse>, WorkflowError>
where
    A: AccountRepository + 'static,
    J: JobRepository + 'static,
    R: ApplicationRepository + 'static,
    S: SessionStore + 'static,
{
    let session = session_from(state.sessions.as_ref(), &headers)?;
    state.service.deactivate_job(session, JobId(job_id))?;
    Ok(Json(MessageResponse {
        message: "job posting deactivated",
    }))
}

pub(crate) async fn all_jobs_handler<A, J, R, S>(
    State(state): State<BoardState<A, J, R, S>>,
    headers: HeaderMap,
) -> Result<Json<JobsResponse>, WorkflowError>
where
    A: AccountRepository + 'static,
    J: JobRepository + 'static,
    R: ApplicationRepository + 'static,
    S: SessionStore + 'static,
{
    let session = session_from(state.sessions.as_ref(), &headers)?;
    let jobs = state.service.all_jobs(session)?;
    Ok(Json(JobsResponse { jobs }))
}

pub(crate) async fn submit_application_handler<A, J, R, S>(
    State(state): State<BoardState<A, J, R, S>>,
    headers: HeaderMap,
    Json(request): Json<SubmitApplicationRequest>,
) -> Result<Response, WorkflowError>
where
    A: AccountRepository + 'static,
    J: JobRepository + 'static,
    R: ApplicationRepository + 'static,
    S: SessionStore + 'static,
{
    let session = session_from(state.sessions.as_ref(), &headers)?;
    let application = state
        .service
        .submit_application(session, request.job_id, request.message)?;
    Ok((
        StatusCode::CREATED,
        Json(ApplicationResponse { application }),
    )
        .into_response())
}

pub(crate) async fn my_applications_handler<A, J, R, S>(
    State(state): State<BoardState<A, J, R, S>>,
    headers: HeaderMap,
) -> Result<Json<ApplicationsResponse>, WorkflowError>
where
    A: AccountRepository + 'static,
    J: JobRepository + 'static,
    R: ApplicationRepository + 'static,
    S: SessionStore + 'static,
{
    let session = session_from(state.sessions.as_ref(), &headers)?;
    let session = require_role(
        session,
        Role::JobSeeker,
        "the personal listing requires a job seeker session",
    )?;
    let applications = state.service.applications_for(session)?;
    Ok(Json(ApplicationsResponse { applications }))
}

pub(crate) async fn employer_applications_handler<A, J, R, S>(
    State(state): State<BoardState<A, J, R, S>>,
    headers: HeaderMap,
) -> Result<Json<ApplicationsResponse>, WorkflowError>
where
    A: AccountRepository + 'static,
    J: JobRepository + 'static,
    R: ApplicationRepository + 'static,
    S: SessionStore + 'static,
{
    let session = session_from(state.sessions.as_ref(), &headers)?;
    let session = require_role(
        session,
        Role::Employer,
        "the employer listing requires an employer session",
    )?;
    let applications = state.service.applications_for(session)?;
    Ok(Json(ApplicationsResponse { applications }))
}

pub(crate) async fn all_applications_handler<A, J, R, S>(
    State(state): State<BoardState<A, J, R, S>>,
    headers: HeaderMap,
) -> Result<Json<ApplicationsResponse>, WorkflowError>
where
    A: AccountRepository + 'static,
    J: JobRepository + 'static,
    R: ApplicationRepository + 'static,
    S: SessionStore + 'static,
{
    let session = session_from(state.sessions.as_ref(), &headers)?;
    let session = require_role(
        session,
        Role::Admin,
        "the aggregate listing requires an administrator session",
    )?;
    let applications = state.service.applications_for(session)?;
    Ok(Json(ApplicationsResponse { applications }))
}

pub(crate) async fn job_applications_handler<A, J, R, S>(
    State(state): State<BoardState<A, J, R, S>>,
    headers: HeaderMap,
    Path(job_id): Path<u64>,
) -> Result<Json<ApplicationsResponse>, WorkflowError>
where
    A: AccountRepository + 'static,
    J: JobRepository + 'static,
    R: ApplicationRepository + 'static,
    S: SessionStore + 'static,
{
    let session = session_from(state.sessions.as_ref(), &headers)?;
    let applications = state
        .service
        .applications_for_job(session, JobId(job_id))?;
    Ok(Json(ApplicationsResponse { applications }))
}

pub(crate) async fn update_status_handler<A, J, R, S>(
    State(state): State<BoardState<A, J, R, S>>,
    headers: HeaderMap,
    Path(application_id): Path<u64>,
    Json(request): Json<StatusUpdateRequest>,
) -> Result<Json<ApplicationResponse>, WorkflowError>
where
    A: AccountRepository + 'static,
    J: JobRepository + 'static,
    R: ApplicationRepository + 'static,
    S: SessionStore + 'static,
{
    let session = session_from(state.sessions.as_ref(), &headers)?;
    let application =
        state
            .service
            .update_status(session, ApplicationId(application_id), &request.status)?;
    Ok(Json(ApplicationResponse { application }))
}
