// src/routes/dictionary_routes.rs
//
// Reference-data listings: doctors, services, cabinets, patients. These rows
// are seeded/maintained outside the API surface; only reads live here.

use axum::{Json, Router, extract::State, routing::get};

use crate::{
    error::ApiError,
    models::{AppState, CabinetRow, DoctorRow, PatientRow, ServiceRow},
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/doctors", get(list_doctors))
        .route("/services", get(list_services))
        .route("/cabinets", get(list_cabinets))
        .route("/patients", get(list_patients))
}

pub async fn list_doctors(
    State(state): State<AppState>,
) -> Result<Json<Vec<DoctorRow>>, ApiError> {
    let pool = state.db.pool().await.map_err(ApiError::db)?;
    let rows = sqlx::query_as::<_, DoctorRow>(
        r#"
        SELECT doctor_id, full_name, specialty
        FROM doctors
        WHERE is_active = TRUE
        ORDER BY full_name
        "#,
    )
    .fetch_all(pool)
    .await
    .map_err(ApiError::db)?;

    Ok(Json(rows))
}

pub async fn list_services(
    State(state): State<AppState>,
) -> Result<Json<Vec<ServiceRow>>, ApiError> {
    let pool = state.db.pool().await.map_err(ApiError::db)?;
    let rows = sqlx::query_as::<_, ServiceRow>(
        r#"
        SELECT service_id, service_name, modality, base_price
        FROM services
        WHERE is_active = TRUE
        ORDER BY modality, service_name
        "#,
    )
    .fetch_all(pool)
    .await
    .map_err(ApiError::db)?;

    Ok(Json(rows))
}

pub async fn list_cabinets(
    State(state): State<AppState>,
) -> Result<Json<Vec<CabinetRow>>, ApiError> {
    let pool = state.db.pool().await.map_err(ApiError::db)?;
    let rows = sqlx::query_as::<_, CabinetRow>(
        r#"
        SELECT cabinet_id, cabinet_code, cabinet_name, modality
        FROM cabinets
        WHERE is_active = TRUE
        ORDER BY modality, cabinet_code
        "#,
    )
    .fetch_all(pool)
    .await
    .map_err(ApiError::db)?;

    Ok(Json(rows))
}

pub async fn list_patients(
    State(state): State<AppState>,
) -> Result<Json<Vec<PatientRow>>, ApiError> {
    let pool = state.db.pool().await.map_err(ApiError::db)?;
    let rows = sqlx::query_as::<_, PatientRow>(
        r#"
        SELECT patient_id, patient_code, display_name
        FROM patients
        ORDER BY patient_code
        "#,
    )
    .fetch_all(pool)
    .await
    .map_err(ApiError::db)?;

    Ok(Json(rows))
}
