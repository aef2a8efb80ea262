use axum::{
    Json, Router,
    http::StatusCode,
    routing::{get, post},
};
use planter_nest::solver::{SolveOptions, Solver};
use planter_nest::types::{CostBreakdown, FabricationEnvelope, PlanterInput, SolverResult};
use serde::{Deserialize, Serialize};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

#[derive(Deserialize, Serialize)]
struct QuoteRequest {
    planter: PlanterInput,
    #[serde(default)]
    fabrication_dims: Option<FabricationEnvelope>,
    #[serde(default)]
    breakdowns: Vec<CostBreakdown>,
    options: SolveOptions,
}

fn check_positive(value: f64, what: &str) -> Result<(), String> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(format!("{what} must be positive"))
    }
}

fn validate(req: &QuoteRequest) -> Result<(), String> {
    check_positive(req.planter.length, "planter length")?;
    check_positive(req.planter.width, "planter width")?;
    check_positive(req.planter.height, "planter height")?;
    for row in &req.options.inventory {
        check_positive(row.width, "sheet width")?;
        check_positive(row.height, "sheet height")?;
        if !row.cost_per_sqft.is_finite() || row.cost_per_sqft < 0.0 {
            return Err(format!("sheet {} has an invalid cost per sqft", row.id));
        }
    }
    Ok(())
}

async fn quote(
    Json(req): Json<QuoteRequest>,
) -> Result<Json<SolverResult>, (StatusCode, String)> {
    tracing::info!(
        body = serde_json::to_string(&req).unwrap_or_default(),
        "POST /quote"
    );

    validate(&req).map_err(|e| (StatusCode::BAD_REQUEST, e))?;

    let solver = Solver::new(req.planter, req.fabrication_dims, req.breakdowns, req.options);
    let result = solver
        .solve()
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;

    Ok(Json(result))
}

#[tokio::main]
async fn main() {
    let _sentry = std::env::var("SENTRY_DSN").ok().map(|dsn| {
        sentry::init((
            dsn,
            sentry::ClientOptions {
                release: sentry::release_name!(),
                ..Default::default()
            },
        ))
    });

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open("development.log")
        .expect("failed to open development.log");

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_target(false)
        .with_ansi(false)
        .with_max_level(Level::INFO)
        .init();

    let port = std::env::var("PORT").unwrap_or_else(|_| "3001".to_string());
    let addr = format!("0.0.0.0:{port}");

    let app = Router::new()
        .route("/up", get(|| async { "ok" }))
        .route("/quote", post(quote))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        );

    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();
    eprintln!("Listening on {addr}");
    axum::serve(listener, app).await.unwrap();
}
