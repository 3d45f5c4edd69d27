use axum::{
    Router,
    extract::Json,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::{Local, NaiveDate};
use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::core::{
    Assumptions, Debt, DebtRow, PortfolioOverview, SimulationResult, Strategy, StrategyComparison,
    compare_strategies, normalize_debts, portfolio_overview, simulate,
};

const DEFAULT_EXTRA_BUDGET: f64 = 500.0;
const DEFAULT_MAX_MONTHS: i64 = 600;

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum CliStrategy {
    Snowball,
    Avalanche,
}

impl From<CliStrategy> for Strategy {
    fn from(value: CliStrategy) -> Self {
        match value {
            CliStrategy::Snowball => Strategy::Snowball,
            CliStrategy::Avalanche => Strategy::Avalanche,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum ApiStrategy {
    #[serde(alias = "Snowball", alias = "debt-snowball", alias = "debtSnowball")]
    Snowball,
    #[serde(alias = "Avalanche", alias = "debt-avalanche", alias = "debtAvalanche")]
    Avalanche,
}

impl From<ApiStrategy> for CliStrategy {
    fn from(value: ApiStrategy) -> Self {
        match value {
            ApiStrategy::Snowball => CliStrategy::Snowball,
            ApiStrategy::Avalanche => CliStrategy::Avalanche,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SimulatePayload {
    debts: Vec<DebtRow>,
    extra_budget: Option<f64>,
    min_floor: Option<f64>,
    max_months: Option<i64>,
    start_date: Option<NaiveDate>,
    strategy: Option<ApiStrategy>,
}

#[derive(Parser, Debug)]
#[command(
    name = "payoff",
    about = "Debt payoff simulator (snowball vs avalanche with a shared extra budget)"
)]
pub struct Cli {
    #[arg(long, help = "JSON file holding an array of debt rows")]
    debts: PathBuf,
    #[arg(
        long,
        default_value_t = DEFAULT_EXTRA_BUDGET,
        help = "Monthly extra budget directed at one focus debt at a time"
    )]
    extra_budget: f64,
    #[arg(
        long,
        default_value_t = 0.0,
        help = "Minimum payment used for debts whose Payment is 0"
    )]
    min_floor: f64,
    #[arg(long, default_value_t = DEFAULT_MAX_MONTHS, allow_negative_numbers = true)]
    max_months: i64,
    #[arg(long, help = "Simulation start date (YYYY-MM-DD), defaults to today")]
    start_date: Option<NaiveDate>,
    #[arg(long, value_enum, default_value_t = CliStrategy::Avalanche)]
    strategy: CliStrategy,
    #[arg(long, help = "Run both strategies and report the difference")]
    compare: bool,
}

#[derive(Debug)]
struct ApiRequest {
    debts: Vec<Debt>,
    assumptions: Assumptions,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SimulateResponse {
    overview: PortfolioOverview,
    #[serde(flatten)]
    result: SimulationResult,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CompareResponse {
    overview: PortfolioOverview,
    #[serde(flatten)]
    comparison: StrategyComparison,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
}

#[derive(Debug, Clone, Copy)]
struct AssumptionArgs {
    extra_budget: f64,
    min_floor: f64,
    max_months: i64,
    start_date: Option<NaiveDate>,
    strategy: CliStrategy,
}

fn build_assumptions(args: AssumptionArgs) -> Result<Assumptions, String> {
    if !args.extra_budget.is_finite() || args.extra_budget < 0.0 {
        return Err("--extra-budget must be >= 0".to_string());
    }

    if !args.min_floor.is_finite() || args.min_floor < 0.0 {
        return Err("--min-floor must be >= 0".to_string());
    }

    if args.max_months <= 0 {
        return Err("--max-months must be > 0".to_string());
    }
    let max_months = u32::try_from(args.max_months)
        .map_err(|_| format!("--max-months must be <= {}", u32::MAX))?;

    Ok(Assumptions {
        extra_budget: args.extra_budget,
        min_floor: args.min_floor,
        max_months,
        start_date: args
            .start_date
            .unwrap_or_else(|| Local::now().date_naive()),
        strategy: args.strategy.into(),
    })
}

fn parse_debt_rows(json: &str) -> Result<Vec<DebtRow>, String> {
    serde_json::from_str::<Vec<DebtRow>>(json).map_err(|e| format!("Invalid debts JSON: {e}"))
}

/// Runs the CLI request and returns pretty-printed JSON for stdout.
pub fn run_cli(cli: Cli) -> Result<String, String> {
    let raw = std::fs::read_to_string(&cli.debts)
        .map_err(|e| format!("cannot read {}: {e}", cli.debts.display()))?;
    let rows = parse_debt_rows(&raw)?;
    let debts = normalize_debts(&rows).map_err(|e| e.to_string())?;
    let assumptions = build_assumptions(AssumptionArgs {
        extra_budget: cli.extra_budget,
        min_floor: cli.min_floor,
        max_months: cli.max_months,
        start_date: cli.start_date,
        strategy: cli.strategy,
    })?;
    let request = ApiRequest { debts, assumptions };

    let rendered = if cli.compare {
        serde_json::to_string_pretty(&build_compare_response(&request)?)
    } else {
        serde_json::to_string_pretty(&build_simulate_response(&request)?)
    };
    rendered.map_err(|e| format!("cannot render result: {e}"))
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = Router::new()
        .route("/api/health", get(health_handler))
        .route("/api/simulate", post(simulate_handler))
        .route("/api/compare", post(compare_handler))
        .fallback(not_found_handler);

    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "payoff HTTP API listening");

    axum::serve(listener, app).await
}

async fn health_handler() -> Response {
    json_response(StatusCode::OK, HealthResponse { status: "ok" })
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn simulate_handler(Json(payload): Json<SimulatePayload>) -> Response {
    simulate_handler_impl(payload).await
}

async fn compare_handler(Json(payload): Json<SimulatePayload>) -> Response {
    compare_handler_impl(payload).await
}

async fn simulate_handler_impl(payload: SimulatePayload) -> Response {
    let outcome =
        api_request_from_payload(payload).and_then(|request| build_simulate_response(&request));
    match outcome {
        Ok(response) => json_response(StatusCode::OK, response),
        Err(msg) => {
            warn!(error = %msg, "rejected simulate request");
            error_response(StatusCode::BAD_REQUEST, &msg)
        }
    }
}

async fn compare_handler_impl(payload: SimulatePayload) -> Response {
    let outcome =
        api_request_from_payload(payload).and_then(|request| build_compare_response(&request));
    match outcome {
        Ok(response) => json_response(StatusCode::OK, response),
        Err(msg) => {
            warn!(error = %msg, "rejected compare request");
            error_response(StatusCode::BAD_REQUEST, &msg)
        }
    }
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store"),
    );
    response
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

#[cfg(test)]
fn api_request_from_json(json: &str) -> Result<ApiRequest, String> {
    let payload = serde_json::from_str::<SimulatePayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
    api_request_from_payload(payload)
}

fn api_request_from_payload(payload: SimulatePayload) -> Result<ApiRequest, String> {
    let debts = normalize_debts(&payload.debts).map_err(|e| e.to_string())?;
    let assumptions = build_assumptions(AssumptionArgs {
        extra_budget: payload.extra_budget.unwrap_or(DEFAULT_EXTRA_BUDGET),
        min_floor: payload.min_floor.unwrap_or(0.0),
        max_months: payload.max_months.unwrap_or(DEFAULT_MAX_MONTHS),
        start_date: payload.start_date,
        strategy: payload
            .strategy
            .map(CliStrategy::from)
            .unwrap_or(CliStrategy::Avalanche),
    })
    .map_err(|msg| {
        msg.replace("--extra-budget", "extraBudget")
            .replace("--min-floor", "minFloor")
            .replace("--max-months", "maxMonths")
    })?;

    Ok(ApiRequest { debts, assumptions })
}

fn build_simulate_response(request: &ApiRequest) -> Result<SimulateResponse, String> {
    let result = simulate(&request.debts, &request.assumptions).map_err(|e| e.to_string())?;
    Ok(SimulateResponse {
        overview: portfolio_overview(&request.debts),
        result,
    })
}

fn build_compare_response(request: &ApiRequest) -> Result<CompareResponse, String> {
    let comparison =
        compare_strategies(&request.debts, &request.assumptions).map_err(|e| e.to_string())?;
    Ok(CompareResponse {
        overview: portfolio_overview(&request.debts),
        comparison,
    })
}
