//! Server API tests

use super::*;
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use serde_json::json;
use std::io::{Cursor, Read};
use stride_core::{ExportFormat, GoalConfig};
use tower::ServiceExt;

fn setup_test_app() -> Router {
    create_router(ProjectionEngine::default(), None, ServerConfig::default())
}

fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn get_body_json(response: axum::response::Response) -> serde_json::Value {
    let body = response.into_body();
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn get_body_bytes(response: axum::response::Response) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

fn scenario() -> serde_json::Value {
    json!({
        "monthly_income": 92000,
        "expenses": [
            { "category": "Savings", "subcategory": "SIP", "amount": 4000, "frequency": "monthly" },
            { "category": "Home", "subcategory": "Gas", "amount": 1000, "frequency": "bimonthly" }
        ]
    })
}

// ========== Health & Goal ==========

#[tokio::test]
async fn test_health() {
    let app = setup_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("x-content-type-options").unwrap(),
        "nosniff"
    );
    assert_eq!(response.headers().get("x-frame-options").unwrap(), "DENY");

    let json = get_body_json(response).await;
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn test_get_default_goal() {
    let app = setup_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/goal")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["target_amount"], 10_000_000.0);
    assert_eq!(json["horizon_months"], 60);
    assert_eq!(json["years"], 5.0);
    let required = json["required_monthly_savings"].as_f64().unwrap();
    assert!((required - 166_666.67).abs() < 0.01);
}

#[tokio::test]
async fn test_custom_goal_flows_into_projection() {
    let goal = GoalConfig::new(1_200_000.0, 12).unwrap();
    let app = create_router(ProjectionEngine::new(goal), None, ServerConfig::default());

    let response = app
        .oneshot(post_json("/api/calculate-projection", scenario()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["required_monthly_savings"], 100_000.0);
    assert_eq!(json["shortfall"], 12_500.0);
}

// ========== Projection ==========

#[tokio::test]
async fn test_calculate_projection_scenario() {
    let app = setup_test_app();

    let response = app
        .oneshot(post_json("/api/calculate-projection", scenario()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["expenses_by_category"]["Savings"], 4000.0);
    assert_eq!(json["expenses_by_category"]["Home"], 500.0);
    assert_eq!(json["total_expenses"], 4500.0);
    assert_eq!(json["monthly_savings"], 87_500.0);
    assert_eq!(json["target_amount"], 10_000_000.0);
    let shortfall = json["shortfall"].as_f64().unwrap();
    assert!((shortfall - 79_166.67).abs() < 0.01);
}

#[tokio::test]
async fn test_calculate_projection_empty_expenses() {
    let app = setup_test_app();

    let response = app
        .oneshot(post_json(
            "/api/calculate-projection",
            json!({ "monthly_income": 50000, "expenses": [] }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert!(json["expenses_by_category"].as_object().unwrap().is_empty());
    assert_eq!(json["total_expenses"], 0.0);
    assert_eq!(json["monthly_savings"], 50_000.0);
}

#[tokio::test]
async fn test_negative_income_is_unprocessable() {
    let app = setup_test_app();

    let response = app
        .oneshot(post_json(
            "/api/calculate-projection",
            json!({ "monthly_income": -1, "expenses": [] }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let json = get_body_json(response).await;
    assert_eq!(json["kind"], "InvalidInput");
    assert_eq!(json["issues"][0]["field"], "monthly_income");
    assert!(json["issues"][0].get("index").is_none());
}

#[tokio::test]
async fn test_negative_amount_is_unprocessable() {
    let app = setup_test_app();

    let response = app
        .oneshot(post_json(
            "/api/calculate-projection",
            json!({
                "monthly_income": 1000,
                "expenses": [
                    { "category": "Home", "subcategory": "Gas", "amount": -5, "frequency": "monthly" }
                ]
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let json = get_body_json(response).await;
    assert_eq!(json["kind"], "InvalidInput");
    let issue = &json["issues"][0];
    assert_eq!(issue["field"], "amount");
    assert_eq!(issue["index"], 0);
    assert_eq!(issue["category"], "Home");
    assert_eq!(issue["subcategory"], "Gas");
}

#[tokio::test]
async fn test_unknown_frequency_is_unprocessable() {
    let app = setup_test_app();

    let response = app
        .oneshot(post_json(
            "/api/calculate-projection",
            json!({
                "monthly_income": 1000,
                "expenses": [
                    { "category": "Home", "subcategory": "Milk", "amount": 300, "frequency": "weekly" }
                ]
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let json = get_body_json(response).await;
    assert_eq!(json["kind"], "UnsupportedFrequency");
    assert_eq!(json["issues"][0]["field"], "frequency");
    assert!(json["error"].as_str().unwrap().contains("weekly"));
}

#[tokio::test]
async fn test_every_issue_is_reported() {
    let app = setup_test_app();

    let response = app
        .oneshot(post_json(
            "/api/calculate-projection",
            json!({
                "monthly_income": 1000,
                "expenses": [
                    { "category": "Home", "subcategory": "Milk", "amount": 300, "frequency": "weekly" },
                    { "category": "", "subcategory": "Gas", "amount": -1, "frequency": "monthly" }
                ]
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let json = get_body_json(response).await;
    assert_eq!(json["kind"], "UnsupportedFrequency");
    let fields: Vec<_> = json["issues"]
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["field"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(fields, vec!["frequency", "category", "amount"]);
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let app = setup_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/calculate-projection")
                .header("content-type", "application/json")
                .body(Body::from("{\"monthly_income\": "))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = get_body_json(response).await;
    assert_eq!(json["kind"], "InvalidInput");
    assert!(json.get("issues").is_none());
}

#[tokio::test]
async fn test_wrong_field_type_is_bad_request() {
    let app = setup_test_app();

    let response = app
        .oneshot(post_json(
            "/api/calculate-projection",
            json!({
                "monthly_income": 1000,
                "expenses": [
                    { "category": "Home", "subcategory": "Gas", "amount": "abc", "frequency": "monthly" }
                ]
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = get_body_json(response).await;
    assert_eq!(json["kind"], "InvalidInput");
    assert!(json.get("issues").is_none());
}

#[tokio::test]
async fn test_missing_content_type_is_bad_request() {
    let app = setup_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/calculate-projection")
                .body(Body::from(scenario().to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_too_many_expenses_rejected() {
    let app = setup_test_app();

    let expenses: Vec<_> = (0..=MAX_EXPENSES)
        .map(|i| json!({ "category": "Home", "subcategory": format!("item {}", i), "amount": 1 }))
        .collect();

    let response = app
        .oneshot(post_json(
            "/api/calculate-projection",
            json!({ "monthly_income": 1000, "expenses": expenses }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = get_body_json(response).await;
    assert!(json["error"].as_str().unwrap().contains("Too many"));
}

// ========== Export ==========

#[tokio::test]
async fn test_export_xlsx() {
    let app = setup_test_app();

    let response = app
        .oneshot(post_json("/api/export-excel", scenario()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("content-type").unwrap(),
        ExportFormat::Xlsx.content_type()
    );
    assert_eq!(
        response.headers().get("content-disposition").unwrap(),
        "attachment; filename=\"expense_tracker.xlsx\""
    );

    let bytes = get_body_bytes(response).await;
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    for part in [
        "xl/workbook.xml",
        "xl/worksheets/sheet1.xml",
        "xl/worksheets/sheet2.xml",
        "xl/worksheets/sheet3.xml",
        "xl/worksheets/sheet4.xml",
    ] {
        assert!(archive.by_name(part).is_ok(), "missing {}", part);
    }

    let mut sheet = String::new();
    archive
        .by_name("xl/worksheets/sheet1.xml")
        .unwrap()
        .read_to_string(&mut sheet)
        .unwrap();
    assert!(sheet.contains("SIP"));
    assert!(sheet.contains("<v>4500</v>"));
}

#[tokio::test]
async fn test_export_csv() {
    let app = setup_test_app();

    let response = app
        .oneshot(post_json("/api/export-excel?format=csv", scenario()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("content-disposition").unwrap(),
        "attachment; filename=\"expense_tracker.csv\""
    );

    let text = String::from_utf8(get_body_bytes(response).await).unwrap();
    assert!(text.contains("Gas"));
    assert!(text.contains("TOTAL MONTHLY EXPENSES,,4500.00"));
}

#[tokio::test]
async fn test_export_invalid_format() {
    let app = setup_test_app();

    let response = app
        .oneshot(post_json("/api/export-excel?format=pdf", scenario()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = get_body_json(response).await;
    assert!(json["error"].as_str().unwrap().contains("pdf"));
}

#[tokio::test]
async fn test_export_rejects_invalid_request() {
    let app = setup_test_app();

    let response = app
        .oneshot(post_json(
            "/api/export-excel",
            json!({ "monthly_income": -1, "expenses": [] }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let json = get_body_json(response).await;
    assert_eq!(json["kind"], "InvalidInput");
}
