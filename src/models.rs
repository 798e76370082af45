use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

use crate::db::Db;

#[derive(Clone)]
pub struct AppState {
    pub db: Db,
}

/* -------------------------
   Appointment status set
--------------------------*/

/// Closed set of dropdown-editable statuses. Values outside this list are
/// stored and transported untouched; only the UI dropdown refuses them.
pub const STATUS_OPTIONS: [&str; 9] = [
    "NEW",
    "NEED_INFO",
    "PRICE_SENT",
    "CONFIRMED",
    "PAYMENT_REPORTED",
    "IN_PROGRESS",
    "READY",
    "DONE",
    "CANCELED",
];

pub fn is_known_status(status: &str) -> bool {
    STATUS_OPTIONS.contains(&status)
}

pub const DEFAULT_STATUS: &str = "NEW";
pub const DEFAULT_DURATION_MINUTES: i32 = 30;

/* -------------------------
   DB Row Models
   (serialized in the wire casing the dictionaries have always used)
--------------------------*/

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "PascalCase")]
pub struct DoctorRow {
    pub doctor_id: i32,
    pub full_name: String,
    pub specialty: Option<String>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "PascalCase")]
pub struct ServiceRow {
    pub service_id: i32,
    pub service_name: String,
    pub modality: Option<String>,
    pub base_price: Option<f64>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "PascalCase")]
pub struct CabinetRow {
    pub cabinet_id: i32,
    pub cabinet_code: String,
    pub cabinet_name: String,
    pub modality: Option<String>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "PascalCase")]
pub struct PatientRow {
    pub patient_id: i32,
    pub patient_code: String,
    pub display_name: String,
}

/// One row of the joined appointment listing. The dictionary joins are LEFT
/// JOINs: an appointment whose reference no longer resolves still appears,
/// with the enrichment fields null.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "PascalCase")]
pub struct AppointmentListRow {
    pub appointment_id: i32,
    pub start_at: DateTime<Utc>,
    pub end_at: Option<DateTime<Utc>>,
    pub duration_minutes: Option<i32>,
    pub status: String,
    pub price: Option<f64>,
    pub created_at: Option<DateTime<Utc>>,

    pub patient_id: Option<i32>,
    pub patient_code: Option<String>,
    pub patient_display_name: Option<String>,

    pub doctor_id: Option<i32>,
    pub doctor_full_name: Option<String>,

    pub service_id: Option<i32>,
    pub service_name: Option<String>,
    pub service_modality: Option<String>,

    pub cabinet_id: Option<i32>,
    pub cabinet_code: Option<String>,
    pub cabinet_name: Option<String>,
}

/* -------------------------
   API DTOs
--------------------------*/

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateAppointmentResponse {
    pub new_appointment_id: i32,
}

#[derive(Debug, Serialize, FromRow)]
#[serde(rename_all = "PascalCase")]
pub struct StatusUpdateRow {
    pub appointment_id: i32,
    pub status: String,
}
