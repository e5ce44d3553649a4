//! Health, goal and projection handlers

use std::sync::Arc;

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::info;

use crate::{AppError, AppState, MAX_EXPENSES};
use stride_core::{Projection, ProjectionRequest};

/// Goal configuration as reported to clients
#[derive(Debug, Serialize)]
pub struct GoalResponse {
    pub target_amount: f64,
    pub horizon_months: u32,
    pub years: f64,
    pub required_monthly_savings: f64,
}

/// GET /api/health - Liveness check
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// GET /api/goal - Savings goal the engine was built with
pub async fn get_goal(State(state): State<Arc<AppState>>) -> Json<GoalResponse> {
    let goal = state.engine.goal();
    Json(GoalResponse {
        target_amount: goal.target_amount,
        horizon_months: goal.horizon_months,
        years: goal.years(),
        required_monthly_savings: goal.required_monthly_savings(),
    })
}

/// POST /api/calculate-projection - Project savings against the goal
pub async fn calculate_projection(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ProjectionRequest>, JsonRejection>,
) -> Result<Json<Projection>, AppError> {
    let request = accept_request(payload)?;

    let projection = state
        .engine
        .project(&request)
        .map_err(AppError::validation)?;

    info!(
        entries = request.expenses.len(),
        categories = projection.expenses_by_category.len(),
        shortfall = projection.shortfall,
        "Calculated projection"
    );

    Ok(Json(projection))
}

/// Unwrap a JSON body and enforce request limits
pub(crate) fn accept_request(
    payload: Result<Json<ProjectionRequest>, JsonRejection>,
) -> Result<ProjectionRequest, AppError> {
    let Json(request) =
        payload.map_err(|rejection| AppError::bad_request(&rejection.body_text()))?;

    if request.expenses.len() > MAX_EXPENSES {
        return Err(AppError::bad_request(&format!(
            "Too many expense entries: {} (max {})",
            request.expenses.len(),
            MAX_EXPENSES
        )));
    }

    Ok(request)
}
