use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use axum_prometheus::PrometheusMetricLayer;
use clap::{Args, Parser, Subcommand};
use job_board::board::{
    board_router, BoardPolicy, BoardService, JobDraft, MemoryAccounts, MemoryApplications,
    MemoryJobs, MemorySessions, Registration, Role, Session, WorkflowError,
};
use job_board::config::AppConfig;
use job_board::error::AppError;
use job_board::telemetry;
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::json;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
struct OpsState {
    readiness: Arc<AtomicBool>,
    metrics: PrometheusHandle,
}

#[derive(Parser, Debug)]
#[command(
    name = "Job Board",
    about = "Run the role-gated job board service from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
}

#[derive(Args, Debug, Default)]
struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    port: Option<u16>,
    /// Preload demo accounts, a posting, and one application
    #[arg(long)]
    seed_demo: bool,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run_cli().await {
        eprintln!("application error: {err}");
        std::process::exit(1);
    }
}

async fn run_cli() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => run_server(args).await,
    }
}

async fn run_server(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let ops_state = OpsState {
        readiness: readiness_flag.clone(),
        metrics: prometheus_handle,
    };

    let policy = BoardPolicy {
        default_page_size: config.board.default_page_size,
        max_page_size: config.board.max_page_size,
        ..BoardPolicy::default()
    };
    let service = Arc::new(BoardService::new(
        Arc::new(MemoryAccounts::default()),
        Arc::new(MemoryJobs::default()),
        Arc::new(MemoryApplications::default()),
        policy,
    ));
    let sessions = Arc::new(MemorySessions::default());

    if args.seed_demo {
        seed_demo(service.as_ref())?;
    }

    let ops = Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .with_state(ops_state);

    let app = board_router(service, sessions)
        .merge(ops)
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "job board service ready");

    axum::serve(listener, app).await?;
    Ok(())
}

fn seed_demo<A, J, R>(service: &BoardService<A, J, R>) -> Result<(), WorkflowError>
where
    A: job_board::board::AccountRepository + 'static,
    J: job_board::board::JobRepository + 'static,
    R: job_board::board::ApplicationRepository + 'static,
{
    let employer = service.register(Registration {
        email: "employer@demo.local".to_string(),
        password: "employer-demo".to_string(),
        name: "Harbor Light Media".to_string(),
        role: Role::Employer,
    })?;
    let seeker = service.register(Registration {
        email: "seeker@demo.local".to_string(),
        password: "seeker-demo".to_string(),
        name: "Dana Whitfield".to_string(),
        role: Role::JobSeeker,
    })?;
    let admin = service.register(Registration {
        email: "admin@demo.local".to_string(),
        password: "admin-demo".to_string(),
        name: "Site Admin".to_string(),
        role: Role::Admin,
    })?;

    let employer_session = Session {
        account_id: employer.id,
        role: employer.role,
    };
    let job = service.create_job(
        employer_session,
        JobDraft {
            title: "Backend Engineer".to_string(),
            description: "Own the listing and application services.".to_string(),
            company: "Harbor Light Media".to_string(),
            location: Some("Des Moines, IA".to_string()),
            salary: Some("$120,000".to_string()),
            job_type: Some("full-time".to_string()),
            category: Some("engineering".to_string()),
            requirements: Some("Rust, HTTP services".to_string()),
            benefits: Some("Health, 401k".to_string()),
        },
    )?;
    service.create_job(
        employer_session,
        JobDraft {
            title: "Content Editor".to_string(),
            description: "Edit and publish sponsored listings.".to_string(),
            company: "Harbor Light Media".to_string(),
            location: Some("Remote".to_string()),
            salary: None,
            job_type: Some("part-time".to_string()),
            category: Some("editorial".to_string()),
            requirements: None,
            benefits: None,
        },
    )?;

    let seeker_session = Session {
        account_id: seeker.id,
        role: seeker.role,
    };
    service.submit_application(
        seeker_session,
        job.id,
        "Five years of backend experience, happy to share references.".to_string(),
    )?;

    info!(
        employer = %employer.email,
        seeker = %seeker.email,
        admin = %admin.email,
        "seeded demo accounts (passwords follow the <role>-demo pattern)"
    );
    Ok(())
}

async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn readiness_endpoint(State(state): State<OpsState>) -> impl IntoResponse {
    let ready = state.readiness.load(Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

async fn metrics_endpoint(State(state): State<OpsState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
