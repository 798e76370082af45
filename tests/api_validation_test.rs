//! Write-path validation: every rejection here must happen before the store
//! is touched, so the router is wired to a database that does not exist.

use std::time::Duration;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use serde_json::{Value, json};
use tower::ServiceExt; // for `oneshot`

use clinic_scheduler::{config::Config, db::Db, models::AppState, routes};

fn test_app() -> Router {
    let cfg = Config {
        database_url: "postgres://127.0.0.1:1/unreachable".to_string(),
        bind_addr: "127.0.0.1:0".to_string(),
        db_pool_max: 1,
        db_timeout: Duration::from_secs(1),
    };
    routes::router(AppState { db: Db::new(&cfg) })
}

async fn send_json(app: Router, method: &str, uri: &str, body: Value) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let payload: Value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, payload)
}

fn valid_create_body() -> Value {
    json!({
        "patientId": 1,
        "doctorId": 2,
        "serviceId": 3,
        "cabinetId": 4,
        "startAt": "2024-05-01T10:00:00Z",
        "durationMinutes": 30,
        "status": "NEW"
    })
}

#[tokio::test]
async fn create_rejects_each_non_positive_id() {
    for (camel, pascal) in [
        ("patientId", "PatientId"),
        ("doctorId", "DoctorId"),
        ("serviceId", "ServiceId"),
        ("cabinetId", "CabinetId"),
    ] {
        for bad in [json!(0), json!(-3), json!("abc")] {
            let mut body = valid_create_body();
            body[camel] = bad;

            let (status, payload) =
                send_json(test_app(), "POST", "/api/appointments", body).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);

            let message = payload["error"].as_str().unwrap();
            assert_eq!(message, format!("Invalid {pascal}: must be > 0"));
        }
    }
}

#[tokio::test]
async fn create_rejects_missing_or_empty_start() {
    let mut body = valid_create_body();
    body.as_object_mut().unwrap().remove("startAt");
    let (status, payload) = send_json(test_app(), "POST", "/api/appointments", body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(payload["error"], "Invalid StartAt: required");

    let mut body = valid_create_body();
    body["startAt"] = json!("");
    let (status, payload) = send_json(test_app(), "POST", "/api/appointments", body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(payload["error"], "Invalid StartAt: required");
}

#[tokio::test]
async fn create_rejects_unparseable_start() {
    let mut body = valid_create_body();
    body["startAt"] = json!("next tuesday");
    let (status, payload) = send_json(test_app(), "POST", "/api/appointments", body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(payload["error"], "Invalid StartAt: must be an ISO-8601 timestamp");
}

#[tokio::test]
async fn create_accepts_pascal_case_keys_for_validation() {
    // PascalCase body with one bad field still names that field; the casing of
    // the rest must not trip validation first.
    let body = json!({
        "PatientId": 1,
        "DoctorId": 2,
        "ServiceId": 3,
        "CabinetId": "zero",
        "StartAt": "2024-05-01T10:00:00Z"
    });
    let (status, payload) = send_json(test_app(), "POST", "/api/appointments", body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(payload["error"], "Invalid CabinetId: must be > 0");
}

#[tokio::test]
async fn status_update_rejects_bad_appointment_id() {
    for uri in [
        "/api/appointments/abc/status",
        "/api/appointments/0/status",
        "/api/appointments/-7/status",
    ] {
        let (status, payload) =
            send_json(test_app(), "PATCH", uri, json!({"status": "DONE"})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(payload["error"], "Invalid appointment id");
    }
}

#[tokio::test]
async fn status_update_rejects_missing_or_empty_status() {
    let (status, payload) = send_json(
        test_app(),
        "PATCH",
        "/api/appointments/5/status",
        json!({}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(payload["error"], "Status is required");

    let (status, payload) = send_json(
        test_app(),
        "PATCH",
        "/api/appointments/5/status",
        json!({"status": ""}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(payload["error"], "Status is required");
}

#[tokio::test]
async fn status_update_rejects_unknown_status() {
    let (status, payload) = send_json(
        test_app(),
        "PATCH",
        "/api/appointments/5/status",
        json!({"Status": "BOGUS"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(payload["error"], "Invalid Status: BOGUS");
}
