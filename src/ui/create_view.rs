//! View-model behind the create form: the four dictionaries load
//! concurrently, the first entry of each becomes the default selection, and
//! submit turns the locally-entered wall-clock time into an absolute
//! timestamp before posting.

use chrono::{DateTime, Duration, Local, LocalResult, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use tokio::try_join;

use crate::client::{ApiClient, ClientError, CreateAppointment};
use crate::models::{DEFAULT_DURATION_MINUTES, DEFAULT_STATUS};
use crate::normalize::{Cabinet, Doctor, Patient, Service};

#[derive(Debug, Clone, PartialEq)]
pub struct SelectOption {
    pub value: i64,
    pub label: String,
}

fn option_label(base: &str, suffix: Option<&str>) -> String {
    match suffix {
        Some(s) if !s.is_empty() => format!("{base} — {s}"),
        _ => base.to_string(),
    }
}

pub struct CreateView {
    client: ApiClient,

    pub doctors: Vec<Doctor>,
    pub services: Vec<Service>,
    pub cabinets: Vec<Cabinet>,
    pub patients: Vec<Patient>,

    pub patient_id: i64,
    pub doctor_id: i64,
    pub service_id: i64,
    pub cabinet_id: i64,

    /// Wall-clock time as entered in the form, no timezone attached yet.
    pub start_at_local: NaiveDateTime,
    pub duration_minutes: i64,
    pub status: String,

    pub loading: bool,
    pub load_error: Option<String>,
    pub submit_error: Option<String>,
    pub created_id: Option<i64>,
}

impl CreateView {
    pub fn new(client: ApiClient) -> Self {
        let in_an_hour = Local::now().naive_local() + Duration::minutes(60);
        Self {
            client,
            doctors: Vec::new(),
            services: Vec::new(),
            cabinets: Vec::new(),
            patients: Vec::new(),
            patient_id: 0,
            doctor_id: 0,
            service_id: 0,
            cabinet_id: 0,
            start_at_local: in_an_hour,
            duration_minutes: DEFAULT_DURATION_MINUTES as i64,
            status: DEFAULT_STATUS.to_string(),
            loading: false,
            load_error: None,
            submit_error: None,
            created_id: None,
        }
    }

    /// Fetch all four dictionaries concurrently and pre-select the first entry
    /// of each.
    pub async fn load(&mut self) {
        self.loading = true;
        self.load_error = None;

        match try_join!(
            self.client.doctors(),
            self.client.services(),
            self.client.cabinets(),
            self.client.patients(),
        ) {
            Ok((doctors, services, cabinets, patients)) => {
                if let Some(p) = patients.first() {
                    self.patient_id = p.patient_id;
                }
                if let Some(s) = services.first() {
                    self.service_id = s.service_id;
                }
                if let Some(d) = doctors.first() {
                    self.doctor_id = d.doctor_id;
                }
                if let Some(c) = cabinets.first() {
                    self.cabinet_id = c.cabinet_id;
                }
                self.doctors = doctors;
                self.services = services;
                self.cabinets = cabinets;
                self.patients = patients;
            }
            Err(e) => self.load_error = Some(e.to_string()),
        }
        self.loading = false;
    }

    pub fn patient_options(&self) -> Vec<SelectOption> {
        self.patients
            .iter()
            .map(|p| SelectOption {
                value: p.patient_id,
                label: option_label(&p.display_name, p.phone_last4.as_deref()),
            })
            .collect()
    }

    pub fn service_options(&self) -> Vec<SelectOption> {
        self.services
            .iter()
            .map(|s| SelectOption {
                value: s.service_id,
                label: option_label(&s.service_name, s.modality.as_deref()),
            })
            .collect()
    }

    pub fn doctor_options(&self) -> Vec<SelectOption> {
        self.doctors
            .iter()
            .map(|d| SelectOption {
                value: d.doctor_id,
                label: option_label(&d.full_name, d.specialty.as_deref()),
            })
            .collect()
    }

    pub fn cabinet_options(&self) -> Vec<SelectOption> {
        self.cabinets
            .iter()
            .map(|c| SelectOption {
                value: c.cabinet_id,
                label: option_label(&c.cabinet_name, c.modality.as_deref()),
            })
            .collect()
    }

    /// Post the create request; on success the returned id is kept for
    /// display.
    pub async fn submit(&mut self) -> Result<Option<i64>, ClientError> {
        self.submit_error = None;
        self.created_id = None;

        let duration_minutes = if self.duration_minutes > 0 {
            self.duration_minutes
        } else {
            DEFAULT_DURATION_MINUTES as i64
        };

        let payload = CreateAppointment {
            patient_id: self.patient_id,
            doctor_id: self.doctor_id,
            service_id: self.service_id,
            cabinet_id: self.cabinet_id,
            start_at: local_to_utc(self.start_at_local)
                .to_rfc3339_opts(SecondsFormat::Millis, true),
            duration_minutes,
            status: self.status.clone(),
        };

        match self.client.create_appointment(&payload).await {
            Ok(id) => {
                self.created_id = id;
                Ok(id)
            }
            Err(e) => {
                self.submit_error = Some(e.to_string());
                Err(e)
            }
        }
    }
}

/// Resolve a wall-clock time in the local timezone. Times skipped by a DST
/// jump fall back to a UTC reading rather than failing the submit.
fn local_to_utc(naive: NaiveDateTime) -> DateTime<Utc> {
    match Local.from_local_datetime(&naive) {
        LocalResult::Single(dt) => dt.with_timezone(&Utc),
        LocalResult::Ambiguous(earliest, _) => earliest.with_timezone(&Utc),
        LocalResult::None => Utc.from_utc_datetime(&naive),
    }
}
