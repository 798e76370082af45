//! Canonical record shapes and the normalizers that produce them.
//!
//! Upstream payloads are loosely shaped: the store historically emitted
//! PascalCase column aliases, other producers emit camelCase or snake_case,
//! and a few fields travel under outright synonyms. Each attribute therefore
//! has an ordered table of accepted key spellings; the first present non-null
//! value wins. Every normalizer is total — any input shape yields a record,
//! worst case the all-default one.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Ordered key spellings accepted for each canonical attribute.
///
/// Order matters: earlier spellings shadow later ones when both are present.
pub mod aliases {
    pub const DOCTOR_ID: &[&str] = &["DoctorId", "doctorId", "id"];
    pub const DOCTOR_FULL_NAME: &[&str] = &["FullName", "fullName", "Name", "name"];
    pub const SPECIALTY: &[&str] = &["Specialty", "specialty"];
    pub const IS_ACTIVE: &[&str] = &["IsActive", "isActive"];

    pub const SERVICE_ID: &[&str] = &["ServiceId", "serviceId", "id"];
    pub const SERVICE_NAME: &[&str] = &[
        "ServiceName",
        "serviceName",
        "Name",
        "name",
        "Title",
        "title",
    ];
    pub const MODALITY: &[&str] = &["Modality", "modality"];
    pub const BASE_PRICE: &[&str] = &[
        "BasePriceUAH",
        "basePriceUAH",
        "BasePrice",
        "basePrice",
        "PriceUAH",
        "priceUAH",
        "Price",
        "price",
    ];

    pub const CABINET_ID: &[&str] = &["CabinetId", "cabinetId", "id"];
    pub const CABINET_CODE: &[&str] = &["CabinetCode", "cabinetCode"];
    pub const CABINET_NAME: &[&str] = &["CabinetName", "cabinetName", "Name", "name"];

    pub const PATIENT_ID: &[&str] = &["PatientId", "patientId", "id"];
    pub const PATIENT_CODE: &[&str] = &["PatientCode", "patientCode"];
    pub const PATIENT_DISPLAY_NAME: &[&str] = &[
        "DisplayName",
        "displayName",
        "FullName",
        "fullName",
        "Name",
        "name",
    ];
    pub const PHONE_LAST4: &[&str] = &[
        "PhoneLast4",
        "phoneLast4",
        "Phone",
        "phone",
        "PhoneNumber",
        "phoneNumber",
    ];

    pub const APPOINTMENT_ID: &[&str] = &["AppointmentId", "appointmentId", "id"];
    // Foreign keys on an appointment never fall back to a bare "id".
    pub const PATIENT_REF: &[&str] = &["PatientId", "patientId"];
    pub const DOCTOR_REF: &[&str] = &["DoctorId", "doctorId"];
    pub const SERVICE_REF: &[&str] = &["ServiceId", "serviceId"];
    pub const CABINET_REF: &[&str] = &["CabinetId", "cabinetId"];
    pub const START_AT: &[&str] = &["StartAt", "startAt", "Start", "start", "start_at"];
    pub const END_AT: &[&str] = &["EndAt", "endAt", "End", "end", "end_at"];
    pub const DURATION: &[&str] = &[
        "DurationMinutes",
        "durationMinutes",
        "Duration",
        "duration",
        "DurationMin",
        "durationMin",
        "DurationMins",
        "durationMins",
        "DurationInMinutes",
        "durationInMinutes",
        "duration_min",
        "duration_minutes",
    ];
    pub const STATUS: &[&str] = &["Status", "status"];
    pub const PRICE: &[&str] = &["PriceUAH", "priceUAH", "Price", "price"];
    pub const CREATED_AT: &[&str] = &["CreatedAt", "createdAt"];
}

/* -------------------------
   Canonical records
--------------------------*/

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Doctor {
    pub doctor_id: i64,
    pub full_name: String,
    pub specialty: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub service_id: i64,
    pub service_name: String,
    pub modality: Option<String>,
    pub base_price: Option<f64>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cabinet {
    pub cabinet_id: i64,
    pub cabinet_code: Option<String>,
    pub cabinet_name: String,
    pub modality: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub patient_id: i64,
    pub patient_code: Option<String>,
    pub display_name: String,
    pub phone_last4: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub appointment_id: i64,
    pub patient_id: i64,
    pub doctor_id: i64,
    pub service_id: i64,
    pub cabinet_id: i64,
    pub start_at: String,
    pub end_at: Option<String>,
    pub duration_minutes: i64,
    pub price: Option<f64>,
    pub status: String,
    pub created_at: Option<String>,
}

/* -------------------------
   Coercion helpers
--------------------------*/

fn pick<'a>(raw: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    let obj = raw.as_object()?;
    for key in keys {
        match obj.get(*key) {
            Some(Value::Null) | None => continue,
            Some(v) => return Some(v),
        }
    }
    None
}

fn as_i64(v: &Value) -> Option<i64> {
    match v {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Value::String(s) => {
            let t = s.trim();
            t.parse::<i64>()
                .ok()
                .or_else(|| t.parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
        }
        _ => None,
    }
}

fn as_f64(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64().filter(|f| f.is_finite()),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

fn as_text(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn as_bool(v: &Value) -> Option<bool> {
    match v {
        Value::Bool(b) => Some(*b),
        // MSSQL-era payloads carried BIT columns as 0/1.
        Value::Number(n) => n.as_f64().map(|f| f != 0.0),
        _ => None,
    }
}

/// First alias that coerces to an integer, if any. Also used by the write
/// handlers to validate loosely-shaped request bodies before touching the
/// store.
pub fn int_field(raw: &Value, keys: &[&str]) -> Option<i64> {
    pick(raw, keys).and_then(as_i64)
}

/// First alias that coerces to text, if any.
pub fn text_pick(raw: &Value, keys: &[&str]) -> Option<String> {
    pick(raw, keys).and_then(|v| as_text(v))
}

fn id_field(raw: &Value, keys: &[&str]) -> i64 {
    int_field(raw, keys).unwrap_or(0)
}

fn text_field(raw: &Value, keys: &[&str]) -> String {
    pick(raw, keys).and_then(|v| as_text(v)).unwrap_or_default()
}

/// Optional text: present-but-empty collapses to `None`.
fn opt_text_field(raw: &Value, keys: &[&str]) -> Option<String> {
    pick(raw, keys).and_then(|v| as_text(v)).filter(|s| !s.is_empty())
}

fn opt_number_field(raw: &Value, keys: &[&str]) -> Option<f64> {
    pick(raw, keys).and_then(as_f64)
}

fn opt_bool_field(raw: &Value, keys: &[&str]) -> Option<bool> {
    pick(raw, keys).and_then(as_bool)
}

/// Lenient ISO-8601 parse: RFC 3339, or a naive timestamp taken as UTC.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let t = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(t) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(t, fmt) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    None
}

/// Whole minutes between two timestamps, rounded; 0 when either side fails to
/// parse or the span is non-positive.
fn duration_between(start: &str, end: &str) -> i64 {
    match (parse_timestamp(start), parse_timestamp(end)) {
        (Some(s), Some(e)) => {
            let ms = (e - s).num_milliseconds();
            if ms <= 0 {
                0
            } else {
                (ms as f64 / 60_000.0).round() as i64
            }
        }
        _ => 0,
    }
}

/* -------------------------
   Normalizers
--------------------------*/

pub fn normalize_doctor(raw: &Value) -> Doctor {
    Doctor {
        doctor_id: id_field(raw, aliases::DOCTOR_ID),
        full_name: text_field(raw, aliases::DOCTOR_FULL_NAME),
        specialty: opt_text_field(raw, aliases::SPECIALTY),
        is_active: opt_bool_field(raw, aliases::IS_ACTIVE),
    }
}

pub fn normalize_service(raw: &Value) -> Service {
    Service {
        service_id: id_field(raw, aliases::SERVICE_ID),
        service_name: text_field(raw, aliases::SERVICE_NAME),
        modality: opt_text_field(raw, aliases::MODALITY),
        base_price: opt_number_field(raw, aliases::BASE_PRICE),
        is_active: opt_bool_field(raw, aliases::IS_ACTIVE),
    }
}

pub fn normalize_cabinet(raw: &Value) -> Cabinet {
    Cabinet {
        cabinet_id: id_field(raw, aliases::CABINET_ID),
        cabinet_code: opt_text_field(raw, aliases::CABINET_CODE),
        cabinet_name: text_field(raw, aliases::CABINET_NAME),
        modality: opt_text_field(raw, aliases::MODALITY),
        is_active: opt_bool_field(raw, aliases::IS_ACTIVE),
    }
}

pub fn normalize_patient(raw: &Value) -> Patient {
    Patient {
        patient_id: id_field(raw, aliases::PATIENT_ID),
        patient_code: opt_text_field(raw, aliases::PATIENT_CODE),
        display_name: text_field(raw, aliases::PATIENT_DISPLAY_NAME),
        phone_last4: opt_text_field(raw, aliases::PHONE_LAST4),
    }
}

pub fn normalize_appointment(raw: &Value) -> Appointment {
    let start_at = text_field(raw, aliases::START_AT);
    let end_at = opt_text_field(raw, aliases::END_AT);

    let mut duration_minutes = pick(raw, aliases::DURATION).and_then(as_i64).unwrap_or(0);
    if duration_minutes == 0 && !start_at.is_empty() {
        if let Some(end) = end_at.as_deref() {
            duration_minutes = duration_between(&start_at, end);
        }
    }

    let status = pick(raw, aliases::STATUS)
        .and_then(|v| as_text(v))
        .unwrap_or_else(|| crate::models::DEFAULT_STATUS.to_string());

    Appointment {
        appointment_id: id_field(raw, aliases::APPOINTMENT_ID),
        patient_id: id_field(raw, aliases::PATIENT_REF),
        doctor_id: id_field(raw, aliases::DOCTOR_REF),
        service_id: id_field(raw, aliases::SERVICE_REF),
        cabinet_id: id_field(raw, aliases::CABINET_REF),
        start_at,
        end_at,
        duration_minutes,
        price: opt_number_field(raw, aliases::PRICE),
        status,
        created_at: opt_text_field(raw, aliases::CREATED_AT),
    }
}
