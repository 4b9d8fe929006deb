// libs/appointment-cell/src/services/lifecycle.rs
use std::sync::Arc;

use chrono::{Local, NaiveDate};
use serde_json::json;
use tracing::{debug, info, instrument, warn};

use shared_database::{Query, StoreGateway};
use shared_models::{Collection, DocumentMapped, Fields};

use crate::models::{Appointment, AppointmentError, AppointmentStatus};

/// Moves CONFIRMED appointments whose day has passed to COMPLETED.
///
/// A sweep is a batch of independent writes. It stops at the first failed
/// write; running it again picks up where it stopped. Documents that cannot
/// be read as appointments are skipped.
pub struct StatusReconciler {
    store: Arc<dyn StoreGateway>,
}

impl StatusReconciler {
    pub fn new(store: Arc<dyn StoreGateway>) -> Self {
        Self { store }
    }

    /// Sweeps against the process-local calendar date.
    pub async fn auto_update_appointment_statuses(&self) -> Result<usize, AppointmentError> {
        self.reconcile_as_of(Local::now().date_naive()).await
    }

    /// Completes every CONFIRMED appointment dated strictly before `today` and
    /// returns how many were updated.
    #[instrument(skip(self))]
    pub async fn reconcile_as_of(&self, today: NaiveDate) -> Result<usize, AppointmentError> {
        let query = Query::new().filter_eq("status", AppointmentStatus::Confirmed.as_str());
        let docs = self.store.query(Collection::Appointments, &query).await?;
        debug!("Found {} confirmed appointments to check", docs.len());

        let mut completed = 0;
        for doc in &docs {
            let appointment = match Appointment::from_document(doc) {
                Ok(appointment) => appointment,
                Err(e) => {
                    warn!("Skipping malformed appointment {}: {}", doc.id, e);
                    continue;
                }
            };

            let Some(date) = appointment.calendar_date() else {
                warn!("Skipping appointment {} with unparseable date '{}'",
                      appointment.id, appointment.date);
                continue;
            };

            if date >= today {
                continue;
            }

            let mut delta = Fields::new();
            delta.insert("status".to_string(), json!(AppointmentStatus::Completed.as_str()));
            self.store
                .update(Collection::Appointments, &appointment.id, delta)
                .await?;

            debug!("Appointment {} ({}) marked completed", appointment.id, appointment.date);
            completed += 1;
        }

        info!("Status sweep for {} completed {} appointments", today, completed);
        Ok(completed)
    }
}
