//! Request handlers for the API endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::engine::combined::{self, CombinedRequest};
use crate::engine::{CalcError, ScenarioKind, calculate_named};

use super::AppState;
use super::types::{CalculateRequest, ErrorResponse, IssuesResponse, ScenariosResponse};

/// Runs one per-scenario calculation.
///
/// `POST /calculate` → 200 + `CalculationOutcome` JSON
/// Unknown scenario type or bad parameters → 400 + `ErrorResponse`
pub async fn post_calculate(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CalculateRequest>,
) -> impl IntoResponse {
    match calculate_named(&request.scenario_type, &request.parameters, &state.config) {
        Ok(outcome) => Ok(Json(outcome)),
        Err(err) => {
            let status = match err {
                CalcError::UnsupportedScenario { .. } => StatusCode::BAD_REQUEST,
                CalcError::MissingParameter { .. } | CalcError::InvalidParameter { .. } => {
                    StatusCode::UNPROCESSABLE_ENTITY
                }
            };
            Err((
                status,
                Json(ErrorResponse {
                    error: err.to_string(),
                }),
            ))
        }
    }
}

/// Runs one combined multi-module evaluation.
///
/// `POST /combined` → 200 + `CombinedOutcome` JSON
/// Validation failure → 422 + `IssuesResponse` listing every finding
pub async fn post_combined(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CombinedRequest>,
) -> impl IntoResponse {
    match combined::evaluate(&request, &state.config.costs) {
        Ok(outcome) => Ok(Json(outcome)),
        Err(issues) => Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(IssuesResponse { issues }),
        )),
    }
}

/// Lists the supported scenario types.
///
/// `GET /scenarios` → 200 + `ScenariosResponse`
pub async fn get_scenarios() -> Json<ScenariosResponse> {
    Json(ScenariosResponse {
        scenarios: ScenarioKind::ALL.iter().map(|k| k.as_str()).collect(),
    })
}
