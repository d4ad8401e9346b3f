use super::common::*;
use crate::board::domain::{ApplicationStatus, JobId, JobQuery, Registration, Role};
use crate::board::service::WorkflowError;

#[test]
fn submit_application_rejects_non_seekers() {
    let service = build_service();
    let owner = employer(&service);
    let job = active_job(&service, owner);

    for session in [owner, admin(&service)] {
        match service.submit_application(session, job.id, "hello".to_string()) {
            Err(WorkflowError::NotAuthorized(_)) => {}
            other => panic!("expected authorization failure, got {other:?}"),
        }
    }
}

#[test]
fn submit_application_requires_an_active_job() {
    let service = build_service();
    let owner = employer(&service);
    let applicant = seeker(&service);
    let job = active_job(&service, owner);

    service
        .deactivate_job(owner, job.id)
        .expect("owner can deactivate");

    match service.submit_application(applicant, job.id, String::new()) {
        Err(WorkflowError::NotFound("job")) => {}
        other => panic!("expected missing job, got {other:?}"),
    }

    match service.submit_application(applicant, JobId(9_999_999), String::new()) {
        Err(WorkflowError::NotFound("job")) => {}
        other => panic!("expected missing job, got {other:?}"),
    }
}

#[test]
fn submit_application_prevents_duplicates() {
    let service = build_service();
    let owner = employer(&service);
    let applicant = seeker(&service);
    let other_applicant = second_seeker(&service);
    let job = active_job(&service, owner);

    service
        .submit_application(applicant, job.id, "first".to_string())
        .expect("first submission succeeds");

    match service.submit_application(applicant, job.id, "second".to_string()) {
        Err(WorkflowError::Conflict(_)) => {}
        other => panic!("expected duplicate conflict, got {other:?}"),
    }

    service
        .submit_application(other_applicant, job.id, "different account".to_string())
        .expect("another seeker may still apply");
}

#[test]
fn submit_application_stores_message_verbatim() {
    let service = build_service();
    let owner = employer(&service);
    let applicant = seeker(&service);
    let job = active_job(&service, owner);

    let application = service
        .submit_application(applicant, job.id, "Experienced".to_string())
        .expect("submission succeeds");

    assert_eq!(application.status, ApplicationStatus::Pending);
    assert_eq!(application.job_id, job.id);
    assert_eq!(application.user_id, applicant.account_id);
    assert_eq!(application.message, "Experienced");
    assert_eq!(application.job.employer_id, owner.account_id);
}

#[test]
fn submit_application_allows_an_empty_message() {
    let service = build_service();
    let owner = employer(&service);
    let applicant = seeker(&service);
    let job = active_job(&service, owner);

    let application = service
        .submit_application(applicant, job.id, String::new())
        .expect("submission succeeds");
    assert_eq!(application.message, "");
}

#[test]
fn listing_partitions_by_role() {
    let service = build_service();
    let first_owner = employer(&service);
    let second_owner = second_employer(&service);
    let first_applicant = seeker(&service);
    let second_applicant = second_seeker(&service);
    let auditor = admin(&service);

    let first_job = service
        .create_job(first_owner, draft("Backend Engineer"))
        .expect("job created");
    let second_job = service
        .create_job(second_owner, draft("Site Reliability Engineer"))
        .expect("job created");

    let a = service
        .submit_application(first_applicant, first_job.id, "a".to_string())
        .expect("submitted");
    let b = service
        .submit_application(second_applicant, first_job.id, "b".to_string())
        .expect("submitted");
    let c = service
        .submit_application(first_applicant, second_job.id, "c".to_string())
        .expect("submitted");

    let mine = service
        .applications_for(first_applicant)
        .expect("seeker listing");
    assert_eq!(
        mine.iter().map(|view| view.id).collect::<Vec<_>>(),
        vec![a.id, c.id]
    );
    assert!(mine
        .iter()
        .all(|view| view.user_id == first_applicant.account_id));

    let employer_side = service
        .applications_for(first_owner)
        .expect("employer listing");
    assert_eq!(
        employer_side.iter().map(|view| view.id).collect::<Vec<_>>(),
        vec![a.id, b.id]
    );
    assert!(employer_side
        .iter()
        .all(|view| view.job.employer_id == first_owner.account_id));

    let everything = service.applications_for(auditor).expect("admin listing");
    assert_eq!(
        everything.iter().map(|view| view.id).collect::<Vec<_>>(),
        vec![a.id, b.id, c.id]
    );

    // Stable across repeated calls.
    let again = service.applications_for(auditor).expect("admin listing");
    assert_eq!(
        again.iter().map(|view| view.id).collect::<Vec<_>>(),
        everything.iter().map(|view| view.id).collect::<Vec<_>>()
    );
}

#[test]
fn update_status_allows_every_transition_pair() {
    let service = build_service();
    let owner = employer(&service);
    let applicant = seeker(&service);
    let job = active_job(&service, owner);
    let application = service
        .submit_application(applicant, job.id, String::new())
        .expect("submitted");

    for from in ApplicationStatus::ALL {
        for to in ApplicationStatus::ALL {
            service
                .update_status(owner, application.id, from.label())
                .expect("set starting status");
            let updated = service
                .update_status(owner, application.id, to.label())
                .expect("transition allowed");
            assert_eq!(updated.status, to, "transition {from:?} -> {to:?}");
        }
    }
}

#[test]
fn update_status_rejects_the_applicant() {
    let service = build_service();
    let owner = employer(&service);
    let applicant = seeker(&service);
    let job = active_job(&service, owner);
    let application = service
        .submit_application(applicant, job.id, String::new())
        .expect("submitted");

    match service.update_status(applicant, application.id, "accepted") {
        Err(WorkflowError::NotAuthorized(_)) => {}
        other => panic!("expected authorization failure, got {other:?}"),
    }
}

#[test]
fn update_status_rejects_non_owner_employers() {
    let service = build_service();
    let owner = employer(&service);
    let outsider = second_employer(&service);
    let applicant = seeker(&service);
    let job = active_job(&service, owner);
    let application = service
        .submit_application(applicant, job.id, String::new())
        .expect("submitted");

    match service.update_status(outsider, application.id, "accepted") {
        Err(WorkflowError::NotAuthorized(_)) => {}
        other => panic!("expected authorization failure, got {other:?}"),
    }
}

#[test]
fn update_status_allows_admins_on_any_application() {
    let service = build_service();
    let owner = employer(&service);
    let applicant = seeker(&service);
    let auditor = admin(&service);
    let job = active_job(&service, owner);
    let application = service
        .submit_application(applicant, job.id, String::new())
        .expect("submitted");

    let updated = service
        .update_status(auditor, application.id, "rejected")
        .expect("admin override");
    assert_eq!(updated.status, ApplicationStatus::Rejected);
}

#[test]
fn update_status_rejects_unknown_labels() {
    let service = build_service();
    let owner = employer(&service);
    let applicant = seeker(&service);
    let job = active_job(&service, owner);
    let application = service
        .submit_application(applicant, job.id, String::new())
        .expect("submitted");

    match service.update_status(owner, application.id, "archived") {
        Err(WorkflowError::InvalidStatus { value }) => assert_eq!(value, "archived"),
        other => panic!("expected invalid status, got {other:?}"),
    }

    // The failed update must not have touched the record.
    let listing = service.applications_for(owner).expect("listing");
    assert_eq!(listing[0].status, ApplicationStatus::Pending);
}

#[test]
fn update_status_refreshes_the_update_timestamp() {
    let service = build_service();
    let owner = employer(&service);
    let applicant = seeker(&service);
    let job = active_job(&service, owner);
    let application = service
        .submit_application(applicant, job.id, String::new())
        .expect("submitted");

    let updated = service
        .update_status(owner, application.id, "accepted")
        .expect("transition allowed");
    assert!(updated.updated_at >= application.updated_at);
    assert_eq!(updated.created_at, application.created_at);
}

#[test]
fn update_status_requires_an_existing_application() {
    let service = build_service();
    let owner = employer(&service);

    match service.update_status(owner, crate::board::ApplicationId(42_424_242), "accepted") {
        Err(WorkflowError::NotFound("application")) => {}
        other => panic!("expected missing application, got {other:?}"),
    }
}

#[test]
fn create_job_is_employer_only() {
    let service = build_service();

    for session in [seeker(&service), admin(&service)] {
        match service.create_job(session, draft("Backend Engineer")) {
            Err(WorkflowError::NotAuthorized(_)) => {}
            other => panic!("expected authorization failure, got {other:?}"),
        }
    }
}

#[test]
fn create_job_validates_required_fields() {
    let service = build_service();
    let owner = employer(&service);

    let blank = |field: &str| {
        let mut draft = draft("Backend Engineer");
        match field {
            "title" => draft.title = "  ".to_string(),
            "description" => draft.description = String::new(),
            _ => draft.company = String::new(),
        }
        draft
    };

    for field in ["title", "description", "company"] {
        match service.create_job(owner, blank(field)) {
            Err(WorkflowError::Validation { field: reported }) => assert_eq!(reported, field),
            other => panic!("expected validation failure for {field}, got {other:?}"),
        }
    }
}

#[test]
fn browse_filters_and_paginates_active_jobs() {
    let service = build_service();
    let owner = employer(&service);

    let kept = service
        .create_job(owner, draft("Backend Engineer"))
        .expect("created");
    let mut editorial = draft("Copy Editor");
    editorial.category = Some("editorial".to_string());
    editorial.location = Some("Remote".to_string());
    editorial.description = "Polish sponsored listings.".to_string();
    service.create_job(owner, editorial).expect("created");
    let retired = service
        .create_job(owner, draft("Legacy Maintainer"))
        .expect("created");
    service
        .deactivate_job(owner, retired.id)
        .expect("deactivated");

    let all_active = service
        .browse_jobs(None, JobQuery::default())
        .expect("anonymous browse");
    assert_eq!(all_active.total, 2);
    assert!(all_active.jobs.iter().all(|job| job.is_active));

    let search = service
        .browse_jobs(
            None,
            JobQuery {
                search: Some("backend".to_string()),
                ..JobQuery::default()
            },
        )
        .expect("search");
    assert_eq!(search.total, 1);
    assert_eq!(search.jobs[0].id, kept.id);

    let by_category = service
        .browse_jobs(
            None,
            JobQuery {
                category: Some("editorial".to_string()),
                ..JobQuery::default()
            },
        )
        .expect("category filter");
    assert_eq!(by_category.total, 1);
    assert_eq!(by_category.jobs[0].title, "Copy Editor");

    let by_location = service
        .browse_jobs(
            None,
            JobQuery {
                location: Some("remo".to_string()),
                ..JobQuery::default()
            },
        )
        .expect("location filter");
    assert_eq!(by_location.total, 1);

    let page_two = service
        .browse_jobs(
            None,
            JobQuery {
                page: Some(2),
                limit: Some(1),
                ..JobQuery::default()
            },
        )
        .expect("pagination");
    assert_eq!(page_two.total, 2);
    assert_eq!(page_two.jobs.len(), 1);
    assert_eq!(page_two.page, 2);
    assert_eq!(page_two.limit, 1);
}

#[test]
fn browse_rejects_admin_sessions() {
    let service = build_service();
    let owner = employer(&service);
    active_job(&service, owner);

    match service.browse_jobs(Some(admin(&service)), JobQuery::default()) {
        Err(WorkflowError::NotAuthorized(_)) => {}
        other => panic!("expected authorization failure, got {other:?}"),
    }

    // Seekers and anonymous callers keep access.
    assert!(service
        .browse_jobs(Some(seeker(&service)), JobQuery::default())
        .is_ok());
    assert!(service.browse_jobs(None, JobQuery::default()).is_ok());
}

#[test]
fn job_mutation_respects_ownership() {
    let service = build_service();
    let owner = employer(&service);
    let outsider = second_employer(&service);
    let auditor = admin(&service);
    let job = active_job(&service, owner);

    match service.update_job(outsider, job.id, draft("Hijacked")) {
        Err(WorkflowError::NotAuthorized(_)) => {}
        other => panic!("expected authorization failure, got {other:?}"),
    }

    let renamed = service
        .update_job(owner, job.id, draft("Senior Backend Engineer"))
        .expect("owner edits");
    assert_eq!(renamed.title, "Senior Backend Engineer");

    let admin_edit = service
        .update_job(auditor, job.id, draft("Staff Backend Engineer"))
        .expect("admin edits");
    assert_eq!(admin_edit.title, "Staff Backend Engineer");

    match service.deactivate_job(seeker(&service), job.id) {
        Err(WorkflowError::NotAuthorized(_)) => {}
        other => panic!("expected authorization failure, got {other:?}"),
    }
}

#[test]
fn register_rejects_duplicate_emails() {
    let service = build_service();
    register(&service, Role::JobSeeker, "taken@example.com");

    match service.register(Registration {
        email: "Taken@Example.com".to_string(),
        password: "hunter2".to_string(),
        name: "Second".to_string(),
        role: Role::Employer,
    }) {
        Err(WorkflowError::Conflict(_)) => {}
        other => panic!("expected duplicate conflict, got {other:?}"),
    }
}

#[test]
fn register_validates_required_fields() {
    let service = build_service();

    let attempt = |email: &str, password: &str, name: &str| {
        service.register(Registration {
            email: email.to_string(),
            password: password.to_string(),
            name: name.to_string(),
            role: Role::JobSeeker,
        })
    };

    match attempt("", "hunter2", "Dana") {
        Err(WorkflowError::Validation { field: "email" }) => {}
        other => panic!("expected email validation, got {other:?}"),
    }
    match attempt("dana@example.com", "", "Dana") {
        Err(WorkflowError::Validation { field: "password" }) => {}
        other => panic!("expected password validation, got {other:?}"),
    }
    match attempt("dana@example.com", "hunter2", "   ") {
        Err(WorkflowError::Validation { field: "name" }) => {}
        other => panic!("expected name validation, got {other:?}"),
    }
}

#[test]
fn authenticate_checks_the_password() {
    let service = build_service();
    register(&service, Role::JobSeeker, "dana@example.com");

    let user = service
        .authenticate("dana@example.com", "hunter2")
        .expect("correct password");
    assert_eq!(user.role, Role::JobSeeker);

    match service.authenticate("dana@example.com", "wrong") {
        Err(WorkflowError::NotAuthorized(_)) => {}
        other => panic!("expected authorization failure, got {other:?}"),
    }
    match service.authenticate("nobody@example.com", "hunter2") {
        Err(WorkflowError::NotAuthorized(_)) => {}
        other => panic!("expected authorization failure, got {other:?}"),
    }
}

#[test]
fn update_profile_stores_the_submitted_fields() {
    let service = build_service();
    let session = seeker(&service);

    let details = crate::board::ProfileDetails {
        phone: Some("515-555-0100".to_string()),
        location: Some("Des Moines".to_string()),
        skills: Some("Rust, SQL".to_string()),
        ..Default::default()
    };

    let user = service
        .update_profile(session, details.clone())
        .expect("profile saved");
    assert_eq!(user.user_profile, Some(details));
    assert!(user.updated_at >= user.created_at);
}

#[test]
fn all_jobs_is_admin_only_and_includes_inactive_postings() {
    let service = build_service();
    let owner = employer(&service);
    let auditor = admin(&service);
    let job = active_job(&service, owner);
    service
        .deactivate_job(owner, job.id)
        .expect("deactivated");

    let listing = service.all_jobs(auditor).expect("admin listing");
    assert_eq!(listing.len(), 1);
    assert!(!listing[0].is_active);

    match service.all_jobs(owner) {
        Err(WorkflowError::NotAuthorized(_)) => {}
        other => panic!("expected authorization failure, got {other:?}"),
    }
}

#[test]
fn applications_for_job_checks_ownership() {
    let service = build_service();
    let owner = employer(&service);
    let outsider = second_employer(&service);
    let applicant = seeker(&service);
    let auditor = admin(&service);
    let job = active_job(&service, owner);
    service
        .submit_application(applicant, job.id, String::new())
        .expect("submitted");

    assert_eq!(
        service
            .applications_for_job(owner, job.id)
            .expect("owner listing")
            .len(),
        1
    );
    assert_eq!(
        service
            .applications_for_job(auditor, job.id)
            .expect("admin listing")
            .len(),
        1
    );

    match service.applications_for_job(outsider, job.id) {
        Err(WorkflowError::NotAuthorized(_)) => {}
        other => panic!("expected authorization failure, got {other:?}"),
    }
    match service.applications_for_job(applicant, job.id) {
        Err(WorkflowError::NotAuthorized(_)) => {}
        other => panic!("expected authorization failure, got {other:?}"),
    }
    match service.applications_for_job(owner, JobId(777_777)) {
        Err(WorkflowError::NotFound("job")) => {}
        other => panic!("expected missing job, got {other:?}"),
    }
}

#[test]
fn repository_failures_surface_as_workflow_errors() {
    use std::sync::Arc;

    use crate::board::memory::{MemoryAccounts, MemoryJobs};

    let service = crate::board::BoardService::new(
        Arc::new(MemoryAccounts::default()),
        Arc::new(MemoryJobs::default()),
        Arc::new(UnavailableApplications),
        policy(),
    );
    let owner = {
        let view = service
            .register(Registration {
                email: "owner@example.com".to_string(),
                password: "hunter2".to_string(),
                name: "Owner".to_string(),
                role: Role::Employer,
            })
            .expect("registration succeeds");
        crate::board::Session {
            account_id: view.id,
            role: view.role,
        }
    };
    let applicant = {
        let view = service
            .register(Registration {
                email: "applicant@example.com".to_string(),
                password: "hunter2".to_string(),
                name: "Applicant".to_string(),
                role: Role::JobSeeker,
            })
            .expect("registration succeeds");
        crate::board::Session {
            account_id: view.id,
            role: view.role,
        }
    };
    let job = service
        .create_job(owner, draft("Backend Engineer"))
        .expect("job created");

    match service.submit_application(applicant, job.id, String::new()) {
        Err(WorkflowError::Repository(_)) => {}
        other => panic!("expected repository failure, got {other:?}"),
    }
}
