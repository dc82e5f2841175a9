use axum::{
    Router,
    extract::{Json, Query},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tokio::net::TcpListener;

use crate::core::{RetirementState, RowConfig, Snapshot, Variable, display_text};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
enum ApiVariable {
    Wealth,
    #[serde(alias = "interestRate", alias = "interest_rate", alias = "interest")]
    InterestRate,
    Expenses,
    #[serde(alias = "length", alias = "years")]
    Duration,
}

impl From<ApiVariable> for Variable {
    fn from(value: ApiVariable) -> Self {
        match value {
            ApiVariable::Wealth => Variable::Wealth,
            ApiVariable::InterestRate => Variable::InterestRate,
            ApiVariable::Expenses => Variable::Expenses,
            ApiVariable::Duration => Variable::Duration,
        }
    }
}

impl From<Variable> for ApiVariable {
    fn from(value: Variable) -> Self {
        match value {
            Variable::Wealth => ApiVariable::Wealth,
            Variable::InterestRate => ApiVariable::InterestRate,
            Variable::Expenses => ApiVariable::Expenses,
            Variable::Duration => ApiVariable::Duration,
        }
    }
}

/// One explore step: the caller's saved session (any omitted value falls
/// back to the row's starting value), which variable to solve for, and an
/// optional free-value write expressed either as a real value or as a
/// discrete slider index.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ExplorePayload {
    wealth: Option<f64>,
    interest_rate: Option<f64>,
    expenses: Option<f64>,
    duration: Option<f64>,
    solve_for: Option<ApiVariable>,
    set_variable: Option<ApiVariable>,
    set_value: Option<f64>,
    set_index: Option<u32>,
}

#[derive(Parser, Debug)]
#[command(
    name = "runway",
    about = "Four-variable retirement sustainability explorer (closed-form depletion model)"
)]
struct Cli {
    #[arg(long, default_value_t = 10_000.0, help = "Wealth row minimum in dollars")]
    wealth_min: f64,
    #[arg(long, default_value_t = 5_000_000.0, help = "Wealth row maximum in dollars")]
    wealth_max: f64,
    #[arg(long, default_value_t = 100_000.0, help = "Wealth row starting value")]
    wealth_start: f64,
    #[arg(long, default_value_t = 0.1, help = "Interest row minimum in percent")]
    interest_min: f64,
    #[arg(long, default_value_t = 15.0, help = "Interest row maximum in percent")]
    interest_max: f64,
    #[arg(long, default_value_t = 5.0, help = "Interest row starting value")]
    interest_start: f64,
    #[arg(
        long,
        default_value_t = 1_200.0,
        help = "Expenses row minimum in dollars per year"
    )]
    expenses_min: f64,
    #[arg(
        long,
        default_value_t = 240_000.0,
        help = "Expenses row maximum in dollars per year"
    )]
    expenses_max: f64,
    #[arg(long, default_value_t = 6_000.0, help = "Expenses row starting value")]
    expenses_start: f64,
    #[arg(long, default_value_t = 1.0, help = "Duration row minimum in years")]
    duration_min: f64,
    #[arg(long, default_value_t = 80.0, help = "Duration row maximum in years")]
    duration_max: f64,
    #[arg(long, default_value_t = 25.0, help = "Duration row starting value")]
    duration_start: f64,
    #[arg(long, default_value_t = 1000, help = "Discrete steps per slider control")]
    resolution: u32,
}

#[derive(Copy, Clone, Debug, PartialEq)]
enum WriteKind {
    Real(f64),
    Discrete(u32),
}

#[derive(Copy, Clone, Debug, PartialEq)]
struct FreeWrite {
    variable: Variable,
    kind: WriteKind,
}

#[derive(Debug)]
struct ExploreRequest {
    snapshot: Snapshot,
    write: Option<FreeWrite>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VariableReport {
    value: f64,
    discrete: u32,
    display: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ExploreResponse {
    solve_for: ApiVariable,
    wealth: VariableReport,
    interest_rate: VariableReport,
    expenses: VariableReport,
    duration: VariableReport,
    snapshot: Snapshot,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

fn build_row_configs(cli: &Cli) -> Result<[RowConfig; 4], String> {
    let rows = [
        ("wealth", cli.wealth_min, cli.wealth_max, cli.wealth_start),
        (
            "interest",
            cli.interest_min,
            cli.interest_max,
            cli.interest_start,
        ),
        (
            "expenses",
            cli.expenses_min,
            cli.expenses_max,
            cli.expenses_start,
        ),
        (
            "duration",
            cli.duration_min,
            cli.duration_max,
            cli.duration_start,
        ),
    ];

    for (name, min, max, start) in rows {
        if !min.is_finite() || !max.is_finite() || !start.is_finite() {
            return Err(format!("--{name}-min, --{name}-max, and --{name}-start must be finite"));
        }
        if min >= max {
            return Err(format!("--{name}-min must be less than --{name}-max"));
        }
    }

    if cli.resolution < 2 {
        return Err("--resolution must be at least 2".to_string());
    }

    Ok([
        RowConfig::linear(cli.wealth_min, cli.wealth_max, cli.wealth_start),
        RowConfig::linear(cli.interest_min, cli.interest_max, cli.interest_start),
        RowConfig::linear(cli.expenses_min, cli.expenses_max, cli.expenses_start),
        RowConfig::linear(cli.duration_min, cli.duration_max, cli.duration_start),
    ])
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = Router::new()
        .route("/", get(index_handler))
        .route(
            "/api/explore",
            get(explore_get_handler).post(explore_post_handler),
        )
        .fallback(not_found_handler);

    let listener = TcpListener::bind(addr).await?;
    println!("Retirement explorer API listening on http://{addr}");
    println!("Local access: http://127.0.0.1:{port}/api/explore");

    axum::serve(listener, app).await
}

async fn index_handler() -> Response {
    json_response(
        StatusCode::OK,
        serde_json::json!({
            "service": "runway",
            "endpoints": ["/api/explore"],
        }),
    )
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn explore_get_handler(Query(payload): Query<ExplorePayload>) -> Response {
    explore_handler_impl(payload)
}

async fn explore_post_handler(Json(payload): Json<ExplorePayload>) -> Response {
    explore_handler_impl(payload)
}

fn explore_handler_impl(payload: ExplorePayload) -> Response {
    let cli = default_cli_for_api();
    let response = build_row_configs(&cli)
        .and_then(|configs| explore_request_from_payload(payload, &configs))
        .and_then(|request| run_explore(request, &cli));
    match response {
        Ok(body) => json_response(StatusCode::OK, body),
        Err(msg) => error_response(StatusCode::BAD_REQUEST, &msg),
    }
}

#[cfg(test)]
fn explore_request_from_json(json: &str) -> Result<ExploreRequest, String> {
    let payload = serde_json::from_str::<ExplorePayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
    let cli = default_cli_for_api();
    let configs = build_row_configs(&cli)?;
    explore_request_from_payload(payload, &configs)
}

fn explore_request_from_payload(
    payload: ExplorePayload,
    configs: &[RowConfig; 4],
) -> Result<ExploreRequest, String> {
    let mut values = [
        configs[Variable::Wealth.index()].initial,
        configs[Variable::InterestRate.index()].initial,
        configs[Variable::Expenses.index()].initial,
        configs[Variable::Duration.index()].initial,
    ];
    if let Some(v) = payload.wealth {
        values[Variable::Wealth.index()] = v;
    }
    if let Some(v) = payload.interest_rate {
        values[Variable::InterestRate.index()] = v;
    }
    if let Some(v) = payload.expenses {
        values[Variable::Expenses.index()] = v;
    }
    if let Some(v) = payload.duration {
        values[Variable::Duration.index()] = v;
    }

    let selected = payload
        .solve_for
        .map(Variable::from)
        .unwrap_or(Variable::Expenses);

    let write = match (payload.set_variable, payload.set_value, payload.set_index) {
        (None, None, None) => None,
        (None, _, _) => {
            return Err("setValue/setIndex require setVariable".to_string());
        }
        (Some(_), Some(_), Some(_)) => {
            return Err("setValue and setIndex are mutually exclusive".to_string());
        }
        (Some(_), None, None) => {
            return Err("setVariable requires setValue or setIndex".to_string());
        }
        (Some(variable), Some(value), None) => {
            if !value.is_finite() {
                return Err("setValue must be finite".to_string());
            }
            Some(FreeWrite {
                variable: variable.into(),
                kind: WriteKind::Real(value),
            })
        }
        (Some(variable), None, Some(index)) => Some(FreeWrite {
            variable: variable.into(),
            kind: WriteKind::Discrete(index),
        }),
    };

    Ok(ExploreRequest {
        snapshot: Snapshot {
            values,
            selected: selected.index(),
        },
        write,
    })
}

fn run_explore(request: ExploreRequest, cli: &Cli) -> Result<ExploreResponse, String> {
    let configs = build_row_configs(cli)?;
    let mut state = RetirementState::new(configs, Variable::Expenses, cli.resolution)
        .map_err(|e| e.to_string())?;
    state.restore(request.snapshot).map_err(|e| e.to_string())?;

    if let Some(write) = request.write {
        let outcome = match write.kind {
            WriteKind::Real(value) => state.set_free(write.variable, value),
            WriteKind::Discrete(index) => {
                if index >= cli.resolution {
                    return Err(format!(
                        "setIndex {index} is out of range for resolution {}",
                        cli.resolution
                    ));
                }
                state.set_free_discrete(write.variable, index)
            }
        };
        outcome.map_err(|e| e.to_string())?;
    }

    Ok(build_explore_response(&state))
}

fn build_explore_response(state: &RetirementState) -> ExploreResponse {
    let report = |variable: Variable| VariableReport {
        value: state.display_value(variable),
        discrete: state.discrete(variable),
        display: display_text(state, variable),
    };
    ExploreResponse {
        solve_for: state.solved_variable().into(),
        wealth: report(Variable::Wealth),
        interest_rate: report(Variable::InterestRate),
        expenses: report(Variable::Expenses),
        duration: report(Variable::Duration),
        snapshot: state.snapshot(),
    }
}

fn default_cli_for_api() -> Cli {
    Cli {
        wealth_min: 10_000.0,
        wealth_max: 5_000_000.0,
        wealth_start: 100_000.0,
        interest_min: 0.1,
        interest_max: 15.0,
        interest_start: 5.0,
        expenses_min: 1_200.0,
        expenses_max: 240_000.0,
        expenses_start: 6_000.0,
        duration_min: 1.0,
        duration_max: 80.0,
        duration_start: 25.0,
        resolution: 1000,
    }
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        "no-store".parse().expect("valid header"),
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
