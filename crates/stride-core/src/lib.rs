//! Stride Core Library
//!
//! Shared functionality for the Stride expense projection tool:
//! - Projection engine (frequency normalization, category aggregation, goal tracking)
//! - Savings goal configuration with embedded defaults and file/env overrides
//! - Goal advice derived from a projection
//! - Spreadsheet export (XLSX and CSV)

pub mod advice;
pub mod engine;
pub mod error;
pub mod export;
pub mod goal;
pub mod models;

pub use advice::{CategoryAmount, GoalAdvice};
pub use engine::ProjectionEngine;
pub use error::{Error, ErrorKind, Issue, Result, ValidationError};
pub use export::{build_workbook, export_request, ExportFormat, Workbook};
pub use goal::GoalConfig;
pub use models::{ExpenseEntry, Frequency, MonthPoint, Projection, ProjectionRequest};
