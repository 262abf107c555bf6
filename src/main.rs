use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use axum_prometheus::PrometheusMetricLayer;
use clap::{Args, Parser, Subcommand};
use metrics_exporter_prometheus::PrometheusHandle;
use nis2_compass::assessment::{
    assessment_router, AnalysisResult, AnswerCsvImporter, AssessmentService,
    ClassificationEngine, ClassificationOutcome, CountryCode, CountryRuleTable,
    MemoryAssessmentRepository, OrganizationId, OrganizationProfile, QuestionCatalog, Sector,
    SectorTable,
};
use nis2_compass::assessment::{CategoryCatalog, ScoringEngine};
use nis2_compass::config::AppConfig;
use nis2_compass::error::AppError;
use nis2_compass::telemetry;
use serde_json::json;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
struct AppState {
    readiness: Arc<AtomicBool>,
    metrics: PrometheusHandle,
}

#[derive(Parser, Debug)]
#[command(
    name = "NIS2 Compass",
    about = "Classify NIS2 entity obligations and score compliance self-assessments",
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
    /// Classify an organization profile from the command line
    Classify(ClassifyArgs),
    /// Score a CSV answer export and render the gap/recommendation report
    Report(ReportArgs),
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

#[derive(Args, Debug)]
struct ClassifyArgs {
    /// Sector label, e.g. "Banking" or "Public Administration"
    #[arg(long)]
    sector: String,
    /// Subsector label where the sector defines any
    #[arg(long)]
    subsector: Option<String>,
    /// Number of employees
    #[arg(long)]
    employees: u32,
    /// Annual revenue in millions of euros
    #[arg(long)]
    revenue: f64,
    /// ISO-3166 alpha-2 member state code
    #[arg(long)]
    country: String,
    /// Percentage of the population served (public administration only)
    #[arg(long)]
    population_served: Option<f64>,
    /// Services are provided across member-state borders
    #[arg(long)]
    cross_border: bool,
    /// Organization is a designated critical services provider
    #[arg(long)]
    critical_services: bool,
    /// Emit the outcome as JSON instead of text
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct ReportArgs {
    /// CSV answer export with Question Id, Option, Recorded At columns
    #[arg(long)]
    answers_csv: PathBuf,
    /// Emit the analysis as JSON instead of text
    #[arg(long)]
    json: bool,
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
        Command::Classify(args) => run_classify(args),
        Command::Report(args) => run_report(args),
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

    let repository = Arc::new(MemoryAssessmentRepository::default());
    let service = Arc::new(AssessmentService::new(repository, config.scoring)?);

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let state = AppState {
        readiness: readiness_flag.clone(),
        metrics: prometheus_handle,
    };

    let app = Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .with_state(state)
        .merge(assessment_router(service))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "assessment service ready");

    axum::serve(listener, app).await?;
    Ok(())
}

fn run_classify(args: ClassifyArgs) -> Result<(), AppError> {
    let sector = Sector::from_label(&args.sector).ok_or_else(|| {
        AppError::InvalidArgument(format!("'{}' is not a known sector label", args.sector))
    })?;

    let profile = OrganizationProfile {
        organization_id: OrganizationId("cli".to_string()),
        sector,
        subsector: args.subsector,
        employee_count: args.employees,
        annual_revenue_millions: args.revenue,
        country: CountryCode::new(args.country),
        population_served_percent: args.population_served,
        cross_border_services: args.cross_border,
        critical_services_provider: args.critical_services,
    };

    let sectors = SectorTable::nis2();
    let countries = CountryRuleTable::eu27();
    let outcome = ClassificationEngine::new(&sectors, &countries).classify(&profile);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        render_classification(&outcome);
    }
    Ok(())
}

fn run_report(args: ReportArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;

    let catalog = QuestionCatalog::nis2();
    let categories = CategoryCatalog::nis2();
    let import = AnswerCsvImporter::new(&catalog).from_path(&args.answers_csv)?;
    let analysis = ScoringEngine::new(config.scoring).analyze(&import.answers, &catalog, &categories);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&analysis)?);
    } else {
        render_report(&analysis);
    }

    for skipped in &import.skipped {
        eprintln!(
            "skipped row: question '{}', option '{}' ({})",
            skipped.question_id,
            skipped.option,
            skipped.reason.label()
        );
    }
    Ok(())
}

fn render_classification(outcome: &ClassificationOutcome) {
    println!("Entity classification for '{}'", outcome.organization_id.0);
    if let Some(size) = outcome.size_category {
        println!("  size category: {}", size.label());
    }
    match &outcome.verdict {
        Some(verdict) => {
            println!("  entity type:   {}", verdict.entity_type.label());
            println!("  reason:        {}", verdict.reason);
            println!("  matched rule:  {}", verdict.matched_rule);
            if let Some(requirements) = &verdict.requirements {
                println!(
                    "  obligations:   report incidents within {}h; {}; fines up to EUR {}M or {}% of turnover",
                    requirements.incident_reporting_hours,
                    requirements.audit_regime,
                    requirements.penalty_ceiling.max_fine_millions,
                    requirements.penalty_ceiling.turnover_percent,
                );
                for note in &requirements.country_notes {
                    println!("  country note:  {note}");
                }
            }
        }
        None => println!("  entity type:   undetermined (profile is invalid)"),
    }
    for error in &outcome.errors {
        println!("  error [{}]: {}", error.field, error.message);
    }
    for warning in &outcome.warnings {
        println!("  warning: {warning}");
    }
}

fn render_report(analysis: &AnalysisResult) {
    println!("Compliance analysis");
    println!(
        "  overall score: {}%  (assessment {}% complete)",
        analysis.overall_score, analysis.completion_rate
    );

    println!("  category scores:");
    for entry in &analysis.category_scores {
        if entry.answered {
            println!(
                "    {:<28} {:>3}%  ({} answered)",
                entry.category.label(),
                entry.score,
                entry.answered_count
            );
        } else {
            println!("    {:<28} no data", entry.category.label());
        }
    }

    println!("  maturity distribution:");
    for entry in &analysis.maturity_distribution {
        println!("    {:<10} {}", entry.level.label(), entry.count);
    }

    if !analysis.critical_gaps.is_empty() {
        println!("  critical gaps:");
        for gap in &analysis.critical_gaps {
            println!(
                "    [{}] {} - {} ({}%)",
                gap.control,
                gap.title,
                gap.category.label(),
                gap.score
            );
        }
    }

    if !analysis.recommendations.is_empty() {
        println!("  recommendations:");
        for rec in &analysis.recommendations {
            println!(
                "    [{}] {} - {} (effort {}, {})",
                rec.priority.label(),
                rec.title,
                rec.description,
                rec.effort.label(),
                rec.timeline
            );
        }
    }

    if !analysis.orphaned_answers.is_empty() {
        println!("  answers without catalog questions:");
        for question_id in &analysis.orphaned_answers {
            println!("    {}", question_id.as_str());
        }
    }
}

async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn readiness_endpoint(State(state): State<AppState>) -> impl IntoResponse {
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

async fn metrics_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
