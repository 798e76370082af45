// src/routes/appointment_routes.rs

use axum::{
    Json, Router,
    extract::{Path, State},
    response::{IntoResponse, Response},
    routing::{get, patch, post},
};
use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::{
    error::ApiError,
    models::{
        AppState, AppointmentListRow, CreateAppointmentResponse, DEFAULT_DURATION_MINUTES,
        DEFAULT_STATUS, StatusUpdateRow, is_known_status,
    },
    normalize::{self, aliases},
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/appointments", get(list_appointments))
        .route("/appointments", post(create_appointment))
        .route("/appointments/{id}/status", patch(set_appointment_status))
}

/* ============================================================
   GET /api/appointments
   ============================================================ */

pub async fn list_appointments(
    State(state): State<AppState>,
) -> Result<Json<Vec<AppointmentListRow>>, ApiError> {
    let pool = state.db.pool().await.map_err(ApiError::db)?;
    let rows = sqlx::query_as::<_, AppointmentListRow>(
        r#"
        SELECT
          a.appointment_id,
          a.start_at,
          a.end_at,
          CAST(ROUND(EXTRACT(EPOCH FROM (a.end_at - a.start_at)) / 60.0) AS INT) AS duration_minutes,
          a.status,
          a.price,
          a.created_at,

          p.patient_id,
          p.patient_code,
          p.display_name AS patient_display_name,

          d.doctor_id,
          d.full_name AS doctor_full_name,

          s.service_id,
          s.service_name,
          s.modality AS service_modality,

          c.cabinet_id,
          c.cabinet_code,
          c.cabinet_name
        FROM appointments a
        LEFT JOIN patients p ON p.patient_id = a.patient_id
        LEFT JOIN doctors d ON d.doctor_id = a.doctor_id
        LEFT JOIN services s ON s.service_id = a.service_id
        LEFT JOIN cabinets c ON c.cabinet_id = a.cabinet_id
        ORDER BY a.start_at DESC
        LIMIT 200
        "#,
    )
    .fetch_all(pool)
    .await
    .map_err(ApiError::db)?;

    Ok(Json(rows))
}

/* ============================================================
   POST /api/appointments (create)
   ============================================================ */

/// Body arrives as loose JSON; both PascalCase and camelCase spellings are
/// accepted via the normalizer's alias tables.
pub async fn create_appointment(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<CreateAppointmentResponse>, ApiError> {
    tracing::debug!(payload = %body, "create appointment request");

    let patient_id = require_ref("PatientId", normalize::int_field(&body, aliases::PATIENT_REF))?;
    let doctor_id = require_ref("DoctorId", normalize::int_field(&body, aliases::DOCTOR_REF))?;
    let service_id = require_ref("ServiceId", normalize::int_field(&body, aliases::SERVICE_REF))?;
    let cabinet_id = require_ref("CabinetId", normalize::int_field(&body, aliases::CABINET_REF))?;

    let start_at = match normalize::text_pick(&body, aliases::START_AT) {
        Some(s) if !s.trim().is_empty() => parse_start_at(&s)?,
        _ => return Err(ApiError::BadRequest("Invalid StartAt: required".into())),
    };

    let duration_minutes = normalize::int_field(&body, aliases::DURATION)
        .and_then(|d| i32::try_from(d).ok())
        .unwrap_or(DEFAULT_DURATION_MINUTES);
    let status = normalize::text_pick(&body, aliases::STATUS)
        .unwrap_or_else(|| DEFAULT_STATUS.to_string());

    let pool = state.db.pool().await.map_err(ApiError::db)?;

    // The procedure is the unit of atomicity: it checks the references, derives
    // end_at, copies the service price and returns the new id.
    let new_appointment_id: i32 =
        sqlx::query_scalar(r#"SELECT appointment_create($1, $2, $3, $4, $5, $6, $7)"#)
            .bind(patient_id)
            .bind(doctor_id)
            .bind(service_id)
            .bind(cabinet_id)
            .bind(start_at)
            .bind(duration_minutes)
            .bind(&status)
            .fetch_one(pool)
            .await
            .map_err(ApiError::db)?;

    tracing::info!(new_appointment_id, "appointment created");

    Ok(Json(CreateAppointmentResponse { new_appointment_id }))
}

fn require_ref(key: &str, value: Option<i64>) -> Result<i32, ApiError> {
    match value {
        Some(n) if n > 0 => {
            i32::try_from(n).map_err(|_| ApiError::BadRequest(format!("Invalid {key}: must be > 0")))
        }
        _ => Err(ApiError::BadRequest(format!("Invalid {key}: must be > 0"))),
    }
}

fn parse_start_at(raw: &str) -> Result<DateTime<Utc>, ApiError> {
    normalize::parse_timestamp(raw).ok_or_else(|| {
        ApiError::BadRequest("Invalid StartAt: must be an ISO-8601 timestamp".into())
    })
}

/* ============================================================
   PATCH /api/appointments/{id}/status
   ============================================================ */

pub async fn set_appointment_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<Response, ApiError> {
    let appointment_id: i32 = id
        .trim()
        .parse()
        .ok()
        .filter(|n| *n > 0)
        .ok_or_else(|| ApiError::BadRequest("Invalid appointment id".into()))?;

    let status = normalize::text_pick(&body, aliases::STATUS)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Status is required".into()))?;

    // Any known status may replace any other; membership in the closed set is
    // the only application-level check.
    if !is_known_status(&status) {
        return Err(ApiError::BadRequest(format!("Invalid Status: {status}")));
    }

    let pool = state.db.pool().await.map_err(ApiError::db)?;

    let row = sqlx::query_as::<_, StatusUpdateRow>(
        r#"SELECT appointment_id, status FROM appointment_set_status($1, $2)"#,
    )
    .bind(appointment_id)
    .bind(&status)
    .fetch_optional(pool)
    .await
    .map_err(ApiError::db)?;

    // The procedure returns the updated row; an unknown id yields no row and
    // the caller gets a bare acknowledgement.
    Ok(match row {
        Some(row) => Json(row).into_response(),
        None => Json(serde_json::json!({ "ok": true })).into_response(),
    })
}
