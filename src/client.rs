//! HTTP transport for the view layer. Thin wrapper over `reqwest` that speaks
//! the `/api` surface and funnels every row through the normalizer.

use reqwest::{Client, Method, StatusCode};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::normalize::{self, Appointment, Cabinet, Doctor, Patient, Service};

#[derive(Debug, Error)]
pub enum ClientError {
    /// Message extracted from an error payload (`message`/`error` field), or
    /// `HTTP <code>` when the body carries neither.
    #[error("{0}")]
    Api(String),
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}

#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
}

/// Create-appointment payload. Sent camelCase; the server accepts either
/// casing through its alias tables.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAppointment {
    pub patient_id: i64,
    pub doctor_id: i64,
    pub service_id: i64,
    pub cabinet_id: i64,
    pub start_at: String,
    pub duration_minutes: i64,
    pub status: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http: Client::new(),
            base_url,
        }
    }

    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Value, ClientError> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(%url, "api request");

        let mut req = self.http.request(method, &url);
        if let Some(body) = body {
            req = req.json(body);
        }
        let res = req.send().await?;

        let status = res.status();
        if !status.is_success() {
            let payload: Option<Value> = res.json().await.ok();
            let message = payload
                .as_ref()
                .and_then(extract_error_message)
                .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));
            return Err(ClientError::Api(message));
        }

        if status == StatusCode::NO_CONTENT {
            return Ok(Value::Null);
        }
        Ok(res.json().await?)
    }

    async fn get_rows(&self, path: &str) -> Result<Vec<Value>, ClientError> {
        match self.request(Method::GET, path, None).await? {
            Value::Array(rows) => Ok(rows),
            _ => Ok(Vec::new()),
        }
    }

    pub async fn doctors(&self) -> Result<Vec<Doctor>, ClientError> {
        let rows = self.get_rows("/api/doctors").await?;
        Ok(rows.iter().map(normalize::normalize_doctor).collect())
    }

    pub async fn services(&self) -> Result<Vec<Service>, ClientError> {
        let rows = self.get_rows("/api/services").await?;
        Ok(rows.iter().map(normalize::normalize_service).collect())
    }

    pub async fn cabinets(&self) -> Result<Vec<Cabinet>, ClientError> {
        let rows = self.get_rows("/api/cabinets").await?;
        Ok(rows.iter().map(normalize::normalize_cabinet).collect())
    }

    pub async fn patients(&self) -> Result<Vec<Patient>, ClientError> {
        let rows = self.get_rows("/api/patients").await?;
        Ok(rows.iter().map(normalize::normalize_patient).collect())
    }

    pub async fn appointments(&self) -> Result<Vec<Appointment>, ClientError> {
        let rows = self.get_rows("/api/appointments").await?;
        Ok(rows.iter().map(normalize::normalize_appointment).collect())
    }

    /// Returns the new appointment id, or `None` when the server acknowledged
    /// without one.
    pub async fn create_appointment(
        &self,
        payload: &CreateAppointment,
    ) -> Result<Option<i64>, ClientError> {
        let body = serde_json::to_value(payload).expect("payload serializes");
        let res = self
            .request(Method::POST, "/api/appointments", Some(&body))
            .await?;
        Ok(normalize::int_field(
            &res,
            &["NewAppointmentId", "newAppointmentId"],
        ))
    }

    pub async fn update_appointment_status(
        &self,
        appointment_id: i64,
        status: &str,
    ) -> Result<(), ClientError> {
        let body = serde_json::json!({ "status": status });
        self.request(
            Method::PATCH,
            &format!("/api/appointments/{appointment_id}/status"),
            Some(&body),
        )
        .await?;
        Ok(())
    }
}

fn extract_error_message(payload: &Value) -> Option<String> {
    for key in ["message", "error"] {
        if let Some(s) = payload.get(key).and_then(Value::as_str) {
            if !s.is_empty() {
                return Some(s.to_string());
            }
        }
    }
    None
}
