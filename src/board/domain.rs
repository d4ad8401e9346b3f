use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for registered accounts.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct AccountId(pub u64);

/// Identifier wrapper for job postings.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct JobId(pub u64);

/// Identifier wrapper for submitted applications.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct ApplicationId(pub u64);

/// Closed set of account roles. Every authorization decision dispatches on
/// this enum exhaustively; there are no free-form role strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    JobSeeker,
    Employer,
    Admin,
}

impl Role {
    pub const fn label(self) -> &'static str {
        match self {
            Role::JobSeeker => "job_seeker",
            Role::Employer => "employer",
            Role::Admin => "admin",
        }
    }
}

/// Tri-state application status. The transition graph is complete: every
/// status is reachable from every other status and none is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Pending,
    Accepted,
    Rejected,
}

impl ApplicationStatus {
    pub const ALL: [ApplicationStatus; 3] = [
        ApplicationStatus::Pending,
        ApplicationStatus::Accepted,
        ApplicationStatus::Rejected,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Accepted => "accepted",
            ApplicationStatus::Rejected => "rejected",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(ApplicationStatus::Pending),
            "accepted" => Some(ApplicationStatus::Accepted),
            "rejected" => Some(ApplicationStatus::Rejected),
            _ => None,
        }
    }
}

/// Free-text profile fields a job seeker attaches to their account.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileDetails {
    pub phone: Option<String>,
    pub location: Option<String>,
    pub experience: Option<String>,
    pub skills: Option<String>,
    pub education: Option<String>,
    pub resume: Option<String>,
}

/// Stored account. Deliberately not serializable: the password hash must
/// never reach the wire, responses go through [`AccountView`].
#[derive(Debug, Clone, PartialEq)]
pub struct AccountRecord {
    pub id: AccountId,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub password_hash: String,
    pub profile: Option<ProfileDetails>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Stored job posting. `is_active = false` is the soft-delete state: the
/// posting disappears from browsing but stays visible to its owner and admins.
#[derive(Debug, Clone, PartialEq)]
pub struct Job {
    pub id: JobId,
    pub title: String,
    pub description: String,
    pub company: String,
    pub location: Option<String>,
    pub salary: Option<String>,
    pub job_type: Option<String>,
    pub category: Option<String>,
    pub requirements: Option<String>,
    pub benefits: Option<String>,
    pub employer_id: AccountId,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Stored application. Created as [`ApplicationStatus::Pending`] and mutated
/// only through the explicit status update operation.
#[derive(Debug, Clone, PartialEq)]
pub struct Application {
    pub id: ApplicationId,
    pub job_id: JobId,
    pub applicant_id: AccountId,
    pub status: ApplicationStatus,
    pub message: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields an employer supplies when creating or replacing a posting.
/// Title, description, and company are required; the rest is optional color.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobDraft {
    pub title: String,
    pub description: String,
    pub company: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub salary: Option<String>,
    #[serde(default, rename = "type")]
    pub job_type: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub requirements: Option<String>,
    #[serde(default)]
    pub benefits: Option<String>,
}

/// Registration payload. The role is fixed at registration and never changes.
#[derive(Debug, Clone, Deserialize)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub name: String,
    pub role: Role,
}

/// Browse filters for the public job listing. All filters compose with AND.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobQuery {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default, rename = "type")]
    pub job_type: Option<String>,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub limit: Option<u32>,
}

/// Wire representation of an account, without credentials.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountView {
    pub id: AccountId,
    pub email: String,
    pub name: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_profile: Option<ProfileDetails>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Wire representation of a job posting with the owning employer embedded,
/// so clients never join on foreign keys.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobView {
    pub id: JobId,
    pub title: String,
    pub description: String,
    pub company: String,
    pub location: Option<String>,
    pub salary: Option<String>,
    #[serde(rename = "type")]
    pub job_type: Option<String>,
    pub category: Option<String>,
    pub requirements: Option<String>,
    pub benefits: Option<String>,
    pub employer_id: AccountId,
    pub employer: AccountView,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Wire representation of an application with both related entities embedded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApplicationView {
    pub id: ApplicationId,
    pub job_id: JobId,
    pub job: JobView,
    pub user_id: AccountId,
    pub user: AccountView,
    pub status: ApplicationStatus,
    pub message: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One page of the public job listing.
#[derive(Debug, Clone, Serialize)]
pub struct JobPage {
    pub jobs: Vec<JobView>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
}

impl AccountRecord {
    pub fn view(&self) -> AccountView {
        AccountView {
            id: self.id,
            email: self.email.clone(),
            name: self.name.clone(),
            role: self.role,
            user_profile: self.profile.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

impl Job {
    pub fn view(&self, employer: &AccountRecord) -> JobView {
        JobView {
            id: self.id,
            title: self.title.clone(),
            description: self.description.clone(),
            company: self.company.clone(),
            location: self.location.clone(),
            salary: self.salary.clone(),
            job_type: self.job_type.clone(),
            category: self.category.clone(),
            requirements: self.requirements.clone(),
            benefits: self.benefits.clone(),
            employer_id: self.employer_id,
            employer: employer.view(),
            is_active: self.is_active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

impl Application {
    pub fn view(&self, job: JobView, applicant: &AccountRecord) -> ApplicationView {
        ApplicationView {
            id: self.id,
            job_id: self.job_id,
            job,
            user_id: self.applicant_id,
            user: applicant.view(),
            status: self.status,
            message: self.message.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}
