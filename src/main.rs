use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use axum_prometheus::PrometheusMetricLayer;
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use metrics_exporter_prometheus::PrometheusHandle;
use recruit_ai::config::AppConfig;
use recruit_ai::error::AppError;
use recruit_ai::telemetry;
use recruit_ai::workflows::interview::{
    Candidate, InterviewArtifact, InterviewWorkflow, JobDescription, OfflineTailor,
};
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
struct AppState {
    readiness: Arc<AtomicBool>,
    metrics: PrometheusHandle,
    workflow: Arc<InterviewWorkflow>,
}

#[derive(Parser, Debug)]
#[command(
    name = "Interview Orchestrator",
    about = "Screen candidates, generate interview questions, and schedule interviews",
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
    /// Run the interview pipeline from the command line
    Interview {
        #[command(subcommand)]
        command: InterviewCommand,
    },
}

#[derive(Args, Debug, Default)]
struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    port: Option<u16>,
}

#[derive(Subcommand, Debug)]
enum InterviewCommand {
    /// Evaluate a candidate batch against a job description
    Run(InterviewRunArgs),
}

#[derive(Args, Debug)]
struct InterviewRunArgs {
    /// JSON file holding the job description and candidate batch
    #[arg(long)]
    input: PathBuf,
    /// Interview start time, RFC 3339 (defaults to tomorrow 10:00 UTC)
    #[arg(long)]
    when: Option<String>,
}

/// Batch input shared by the CLI file and the HTTP request body.
#[derive(Debug, Deserialize)]
struct InterviewRunRequest {
    jd: JobDescription,
    candidates: Vec<Candidate>,
    #[serde(default)]
    when: Option<DateTime<Utc>>,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    match cli.command.unwrap_or(Command::Serve(ServeArgs::default())) {
        Command::Serve(args) => run_server(args).await,
        Command::Interview {
            command: InterviewCommand::Run(args),
        } => run_interview(args),
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

    let workflow = InterviewWorkflow::from_config(
        config.pipeline.clone(),
        Box::new(OfflineTailor),
        None,
    )?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let state = AppState {
        readiness: readiness_flag.clone(),
        metrics: prometheus_handle,
        workflow: Arc::new(workflow),
    };

    let app = Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .route("/api/v1/interview/run", post(interview_run_endpoint))
        .layer(prometheus_layer)
        .with_state(state);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "interview orchestrator ready");

    axum::serve(listener, app).await?;
    Ok(())
}

fn run_interview(args: InterviewRunArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let raw = std::fs::read_to_string(&args.input)?;
    let request: InterviewRunRequest = serde_json::from_str(&raw)
        .map_err(|err| AppError::InvalidInput(format!("unable to parse {}: {err}", args.input.display())))?;

    let when = match args.when.as_deref() {
        Some(raw) => Some(
            DateTime::parse_from_rfc3339(raw)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|err| AppError::InvalidInput(format!("invalid --when value: {err}")))?,
        ),
        None => request.when,
    };

    let workflow = InterviewWorkflow::from_config(
        config.pipeline.clone(),
        Box::new(OfflineTailor),
        None,
    )?;
    let artifact = workflow.run(request.jd, request.candidates, when)?;

    render_artifact(&artifact);
    println!(
        "{}",
        serde_json::to_string_pretty(&artifact).map_err(std::io::Error::other)?
    );
    Ok(())
}

async fn healthcheck() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn readiness_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        serde_json::json!({ "status": "ready" })
    } else {
        serde_json::json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

async fn metrics_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

async fn interview_run_endpoint(
    State(state): State<AppState>,
    Json(payload): Json<InterviewRunRequest>,
) -> Result<Json<InterviewArtifact>, AppError> {
    let artifact = state
        .workflow
        .run(payload.jd, payload.candidates, payload.when)?;
    Ok(Json(artifact))
}

fn render_artifact(artifact: &InterviewArtifact) {
    println!("Interview pipeline run");
    println!("  Role: {}", artifact.jd_title);
    println!("  Must-haves: {}", artifact.must_haves.join(", "));
    println!(
        "  Shortlist ({} of {} candidates{}):",
        artifact.metrics.shortlist_len,
        artifact.metrics.num_candidates,
        if artifact.metrics.needed_widening {
            ", widened"
        } else {
            ""
        }
    );
    for entry in &artifact.shortlist {
        println!("    {:<24} {:.4}", entry.name, entry.score);
    }
    println!("  Questions: {}", artifact.questions.len());
    println!(
        "  Schema ok: {}{}",
        artifact.schema_ok,
        if artifact.violations.is_empty() {
            String::new()
        } else {
            format!(" ({} violation(s))", artifact.violations.len())
        }
    );
    println!(
        "  Invite: {}",
        artifact.artifacts.invite_ics.display()
    );
    println!();
}
