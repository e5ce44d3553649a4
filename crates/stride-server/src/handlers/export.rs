//! Spreadsheet export handler

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{rejection::JsonRejection, Query, State},
    http::{header, Response, StatusCode},
    Json,
};
use serde::Deserialize;
use tracing::info;

use super::projection::accept_request;
use crate::{AppError, AppState};
use stride_core::{build_workbook, ExportFormat, ProjectionRequest};

/// Query parameters for spreadsheet export
#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    /// Output format (default: xlsx)
    pub format: Option<String>,
}

/// POST /api/export-excel - Download the projection as a spreadsheet
pub async fn export_excel(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ExportQuery>,
    payload: Result<Json<ProjectionRequest>, JsonRejection>,
) -> Result<Response<Body>, AppError> {
    let format = match params.format.as_deref() {
        Some(f) => f
            .parse::<ExportFormat>()
            .map_err(|e| AppError::bad_request(&e))?,
        None => ExportFormat::default(),
    };

    let request = accept_request(payload)?;
    let projection = state
        .engine
        .project(&request)
        .map_err(AppError::validation)?;

    let bytes = build_workbook(&request, &projection).encode(format)?;
    info!(
        format = %format,
        entries = request.expenses.len(),
        bytes = bytes.len(),
        "Exported expense workbook"
    );

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, format.content_type())
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", format.filename()),
        )
        .body(Body::from(bytes))
        .map_err(|e| AppError::internal(&e.to_string()))
}
