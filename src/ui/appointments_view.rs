//! View-model behind the appointment list: load-once with teardown
//! suppression, inline status changes applied optimistically per row, and CSV
//! export of whatever is currently loaded.

use std::collections::HashSet;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::client::{ApiClient, ClientError};
use crate::models::{STATUS_OPTIONS, is_known_status};
use crate::normalize::Appointment;
use crate::ui::export;

#[derive(Debug, thiserror::Error)]
pub enum StatusChangeError {
    /// A second change for the same row while one is still in flight.
    #[error("status update already in flight for this appointment")]
    AlreadyPending,
    #[error("{0}")]
    Request(#[from] ClientError),
}

#[derive(Default)]
struct ListState {
    rows: Vec<Appointment>,
    loading: bool,
    load_error: Option<String>,
    update_error: Option<String>,
    updating: HashSet<i64>,
}

/// Render-ready copy of the current state.
#[derive(Debug, Clone, Default)]
pub struct ListSnapshot {
    pub rows: Vec<Appointment>,
    pub loading: bool,
    pub load_error: Option<String>,
    pub update_error: Option<String>,
    pub updating: Vec<i64>,
}

pub struct AppointmentsView {
    client: ApiClient,
    state: Mutex<ListState>,
    detached: AtomicBool,
}

impl AppointmentsView {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            state: Mutex::new(ListState::default()),
            detached: AtomicBool::new(false),
        }
    }

    /// Teardown signal. In-flight requests are not aborted at the transport
    /// level; their results are simply never applied.
    pub fn detach(&self) {
        self.detached.store(true, Ordering::SeqCst);
    }

    /// Fetch and normalize the listing. A load error lands in the banner and
    /// leaves previously loaded rows untouched.
    pub async fn load(&self) {
        {
            let mut st = self.state.lock().unwrap();
            st.loading = true;
            st.load_error = None;
        }

        let result = self.client.appointments().await;

        if self.detached.load(Ordering::SeqCst) {
            return;
        }
        let mut st = self.state.lock().unwrap();
        st.loading = false;
        match result {
            Ok(rows) => st.rows = rows,
            Err(e) => st.load_error = Some(e.to_string()),
        }
    }

    /// Optimistic status change: the PATCH goes out first and the single
    /// affected row is patched locally only once the server confirms. At most
    /// one update per row may be in flight; separate rows proceed
    /// independently.
    pub async fn change_status(
        &self,
        appointment_id: i64,
        next: &str,
    ) -> Result<(), StatusChangeError> {
        {
            let mut st = self.state.lock().unwrap();
            if !st.updating.insert(appointment_id) {
                return Err(StatusChangeError::AlreadyPending);
            }
            st.update_error = None;
        }

        let result = self
            .client
            .update_appointment_status(appointment_id, next)
            .await;

        let mut st = self.state.lock().unwrap();
        st.updating.remove(&appointment_id);
        match result {
            Ok(()) => {
                if let Some(row) = st
                    .rows
                    .iter_mut()
                    .find(|r| r.appointment_id == appointment_id)
                {
                    row.status = next.to_string();
                }
                Ok(())
            }
            Err(e) => {
                st.update_error = Some(e.to_string());
                Err(e.into())
            }
        }
    }

    /// The nine known statuses, plus a trailing synthetic entry when the row
    /// carries a value outside the set so it is never silently lost.
    pub fn status_options_for(row: &Appointment) -> Vec<String> {
        let mut options: Vec<String> = STATUS_OPTIONS.iter().map(|s| s.to_string()).collect();
        if !is_known_status(&row.status) {
            options.push(row.status.clone());
        }
        options
    }

    /// Rows with an unrecognized status are display-only.
    pub fn is_editable(row: &Appointment) -> bool {
        is_known_status(&row.status)
    }

    /// Serialize the currently loaded rows; no refetch.
    pub fn export_csv(&self) -> String {
        let st = self.state.lock().unwrap();
        export::build_appointments_csv(&st.rows)
    }

    pub fn snapshot(&self) -> ListSnapshot {
        let st = self.state.lock().unwrap();
        let mut updating: Vec<i64> = st.updating.iter().copied().collect();
        updating.sort_unstable();
        ListSnapshot {
            rows: st.rows.clone(),
            loading: st.loading,
            load_error: st.load_error.clone(),
            update_error: st.update_error.clone(),
            updating,
        }
    }
}
